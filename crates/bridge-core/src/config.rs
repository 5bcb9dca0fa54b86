//! 설정 관리.
//!
//! 이 모듈은 브리지 서버 설정을 정의하고 관리합니다.
//! 설정은 TOML 파일과 `BRIDGE__` 접두사 환경 변수에서 로드됩니다.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogFormat};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 터미널 설정
    #[serde(default)]
    pub terminal: TerminalConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// 로깅 초기화용 설정으로 변환합니다. 알 수 없는 형식은 pretty로 처리합니다.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig::new(self.level.clone())
            .with_format(self.format.parse().unwrap_or(LogFormat::Pretty))
    }
}

/// 터미널 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TerminalConfig {
    /// 페이퍼 터미널 계좌 파일 경로 (없으면 빈 터미널)
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
    /// `fromDate`가 없을 때 사용하는 조회 시작일
    #[serde(default = "default_history_start")]
    pub history_start: NaiveDate,
}

fn default_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            fixture_path: None,
            history_start: default_history_start(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("BRIDGE")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// `BRIDGE_CONFIG` 환경 변수 또는 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let path = std::env::var("BRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }
}
