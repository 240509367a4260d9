//! 비즈니스 로직 서비스.

pub mod account;

pub use account::{AccountService, LoginResponse, RegisterResponse};
