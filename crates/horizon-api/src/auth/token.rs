//! 세션 토큰 발급 및 검증.
//!
//! 학번과 역할을 담은 HS256 서명 토큰을 생성하고 파싱합니다.
//! 토큰은 상태를 갖지 않으며, 서명 검증과 만료 시간만으로 유효성을 판단합니다.

use std::time::Duration;

use chrono::Utc;
use horizon_core::{AuthConfig, Role};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// 토큰 페이로드.
///
/// 서명된 토큰 내부와 요청 extension에만 존재하는 값 타입입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Subject - 학번
    pub sub: String,
    /// 사용자 역할 (정수 ID로 직렬화)
    pub role: Role,
    /// Issued At - 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl TokenPayload {
    /// 학번 반환.
    pub fn student_id(&self) -> &str {
        &self.sub
    }

    /// `now` 시점에 유효한지 확인 (`exp > now`, 허용 오차 없음).
    pub fn is_live_at(&self, now: i64) -> bool {
        self.exp > now
    }
}

/// 토큰 발급 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 서명 실패: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// 토큰 코덱.
///
/// 서버 시작 시 한 번 생성되어 `Arc`로 공유되는 불변 값입니다.
/// 서명 키는 생성 후 변경되지 않습니다.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// 시크릿과 유효 시간으로 코덱 생성.
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// 인증 설정에서 코덱 생성.
    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(&auth.jwt_secret, auth.token_ttl())
    }

    /// 토큰 유효 시간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 토큰 발급.
    ///
    /// `iat = now`, `exp = now + ttl`. 무작위 요소가 없으므로
    /// 같은 초에 같은 입력으로 발급하면 같은 토큰이 나옵니다.
    ///
    /// # Errors
    ///
    /// 서명 실패 시 `TokenError::Signing`.
    pub fn issue(&self, student_id: &str, role: Role) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);

        let payload = TokenPayload {
            sub: student_id.to_string(),
            role,
            iat: now,
            exp: now.saturating_add(ttl),
        };
        self.sign(&payload)
    }

    pub(crate) fn sign(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), payload, &self.encoding_key).map_err(TokenError::from)
    }

    /// 토큰 파싱 및 검증.
    ///
    /// 서명 검증(HMAC, 상수 시간 비교)과 만료 확인(`exp > now`)을 모두 통과해야
    /// `Some`을 반환합니다. 형식 오류, 서명 불일치, 만료는 호출자에게 구분되지 않습니다.
    pub fn parse(&self, token: &str) -> Option<TokenPayload> {
        let data = match decode::<TokenPayload>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(reason = ?e.kind(), "토큰 검증 실패");
                return None;
            }
        };

        // jsonwebtoken은 exp == now를 허용하므로 한 번 더 확인
        let payload = data.claims;
        if !payload.is_live_at(Utc::now().timestamp()) {
            tracing::debug!(exp = payload.exp, "토큰 만료");
            return None;
        }

        Some(payload)
    }
}
