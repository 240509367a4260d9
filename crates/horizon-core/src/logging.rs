//! tracing을 사용한 로깅 인프라.
//!
//! 출력 형식은 실행 모드로 정해집니다 (debug는 pretty, release는 json).
//! 설정 레벨이 `warn` 이하로 낮아도 로그인 성공/실패, 토큰 거부 같은
//! 계정 보안 이벤트는 [`SECURITY_TARGETS`]에 대해 `info`로 남깁니다.

use tracing_subscriber::{
    filter::{LevelFilter, ParseError},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::{LoggingConfig, RunMode};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식 (개발용)
    #[default]
    Pretty,
    /// 로그 집계용 JSON 형식 (운영용)
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl LogFormat {
    /// 실행 모드에 맞는 기본 형식.
    pub fn for_mode(mode: RunMode) -> Self {
        match mode {
            RunMode::Debug => Self::Pretty,
            RunMode::Release => Self::Json,
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("알 수 없는 로그 형식: {}", s)),
        }
    }
}

/// 로그 레벨과 무관하게 `info`로 유지하는 보안 이벤트 target.
pub const SECURITY_TARGETS: &[&str] = &["horizon_api::services::account", "horizon_api::auth"];

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "horizon_api=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_file: true,
        }
    }
}

impl LogConfig {
    /// 새 로그 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 애플리케이션 설정에서 로그 설정을 생성합니다.
    ///
    /// `LOG_FORMAT` 환경 변수가 있으면 실행 모드 기본값보다 우선합니다.
    pub fn from_app(mode: RunMode, logging: &LoggingConfig) -> Self {
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| LogFormat::for_mode(mode));

        Self {
            level: logging.level.clone(),
            format,
            // 운영 모드에서는 파일 위치를 생략
            with_file: mode == RunMode::Debug,
        }
    }
}

/// 설정 레벨로 필터를 만듭니다.
///
/// 전체 상한이 `info`보다 낮으면 [`SECURITY_TARGETS`]에 `info` 지시어를 추가합니다.
/// `off`는 그대로 둡니다.
pub fn build_filter(level: &str) -> Result<EnvFilter, ParseError> {
    let mut filter = EnvFilter::try_new(level)?;

    let quiet = matches!(
        filter.max_level_hint(),
        Some(hint) if hint != LevelFilter::OFF && hint < LevelFilter::INFO
    );
    if quiet {
        for target in SECURITY_TARGETS {
            filter = filter.add_directive(format!("{}=info", target).parse()?);
        }
    }

    Ok(filter)
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 그대로 사용하고 보안 target 보정은 하지 않습니다.
///
/// # 예제
///
/// ```no_run
/// use horizon_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig::new("warn").with_format(LogFormat::Json);
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.level)?,
    };

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_file(config.with_file)
            .with_line_number(config.with_file)
            .boxed(),
        // 수집기에서 필드를 최상위 키로 다루도록 평탄화
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_file(config.with_file)
            .with_line_number(config.with_file)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    tracing::info!(
        format = ?config.format,
        level = %config.level,
        "로깅 초기화 완료"
    );

    Ok(())
}
