//! 트레이딩 터미널 세션 추상화.
//!
//! 터미널 바인딩은 한 번에 하나의 로그인 세션만 유지할 수 있습니다.
//! 이 모듈은 바인딩을 다음 세 가지로 나누어 다룹니다:
//! - [`TerminalConnector`]: 터미널 초기화/로그인/종료를 담당하는 바인딩 구현체
//! - [`TerminalSession`]: 로그인된 세션에서 계좌 정보와 체결 내역을 조회
//! - [`TerminalGateway`]: 세션 접근을 직렬화하고, 소유권이 있는 [`Session`]을 발급
//!
//! `Session`은 drop 시 항상 세션을 닫고 잠금을 해제하므로,
//! 성공/에러/패닉 어느 경로에서도 터미널이 로그인 상태로 남지 않습니다.

mod paper;

pub use paper::{PaperAccount, PaperTerminal};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::domain::{reconstruct, AccountInfo, Deal, Trade};
use crate::error::{TerminalError, TerminalResult};

// =============================================================================
// 자격증명
// =============================================================================

/// 터미널 로그인 자격증명.
///
/// # 보안
/// - 비밀번호는 `SecretString`으로 보관합니다.
/// - `Debug` 구현은 비밀번호를 마스킹합니다.
#[derive(Deserialize)]
pub struct TerminalCredentials {
    /// 계좌 로그인 번호 (숫자 또는 숫자 문자열)
    #[serde(deserialize_with = "login_number")]
    pub login: u64,
    /// 계좌 비밀번호
    pub password: SecretString,
    /// 거래 서버 이름
    pub server: String,
}

impl TerminalCredentials {
    /// 새 자격증명을 생성합니다.
    pub fn new(login: u64, password: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            login,
            password: SecretString::new(password.into().into()),
            server: server.into(),
        }
    }

    /// 비밀번호가 일치하는지 확인합니다.
    pub fn password_matches(&self, expected: &str) -> bool {
        self.password.expose_secret() == expected
    }
}

impl fmt::Debug for TerminalCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalCredentials")
            .field("login", &self.login)
            .field("password", &"[redacted]")
            .field("server", &self.server)
            .finish()
    }
}

fn login_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Login {
        Number(u64),
        Text(String),
    }

    match Login::deserialize(deserializer)? {
        Login::Number(login) => Ok(login),
        Login::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid login: {}", text))),
    }
}

// =============================================================================
// 바인딩 Trait
// =============================================================================

/// 터미널 바인딩 구현체.
///
/// 네이티브 터미널 라이브러리나 페이퍼 터미널이 이 trait를 구현합니다.
#[async_trait]
pub trait TerminalConnector: Send + Sync {
    /// 바인딩 이름 (로그 및 거래 출처 표기용).
    fn name(&self) -> &str;

    /// 실제 터미널이 아닌 모의 데이터를 제공하는지 여부.
    fn is_simulated(&self) -> bool {
        false
    }

    /// 터미널을 초기화합니다. 헬스 체크에서 사용됩니다.
    async fn initialize(&self) -> TerminalResult<()>;

    /// 터미널을 초기화하고 계좌에 로그인합니다.
    ///
    /// # Errors
    ///
    /// - `TerminalError::Initialization`: 터미널 초기화 실패
    /// - `TerminalError::Authentication`: 로그인 실패
    ///
    /// 에러를 반환하기 전에 초기화한 리소스를 모두 해제해야 합니다.
    async fn open(&self, credentials: &TerminalCredentials)
        -> TerminalResult<Box<dyn TerminalSession>>;

    /// 터미널 전체를 종료합니다. 여러 번 호출해도 안전해야 합니다.
    async fn shutdown(&self);
}

/// 로그인된 터미널 세션.
#[async_trait]
pub trait TerminalSession: Send {
    /// 계좌 정보를 조회합니다.
    async fn account_info(&mut self) -> TerminalResult<AccountInfo>;

    /// `[from, to]` 기간의 체결 내역을 조회합니다.
    async fn history_deals(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TerminalResult<Vec<Deal>>;

    /// 세션을 닫습니다. 여러 번 호출해도 안전해야 합니다.
    fn close(&mut self);
}

// =============================================================================
// 게이트웨이
// =============================================================================

/// 단일 세션 터미널에 대한 접근을 직렬화하는 게이트웨이.
#[derive(Clone)]
pub struct TerminalGateway {
    connector: Arc<dyn TerminalConnector>,
    lock: Arc<Mutex<()>>,
}

impl TerminalGateway {
    /// 새 게이트웨이를 생성합니다.
    pub fn new(connector: Arc<dyn TerminalConnector>) -> Self {
        Self {
            connector,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// 바인딩 이름을 반환합니다.
    pub fn name(&self) -> &str {
        self.connector.name()
    }

    /// 바인딩이 모의 데이터를 제공하는지 여부.
    pub fn is_simulated(&self) -> bool {
        self.connector.is_simulated()
    }

    /// 계좌에 로그인하여 세션을 엽니다.
    ///
    /// 다른 세션이 열려 있으면 해제될 때까지 대기합니다.
    /// 반환된 `Session`이 drop되면 세션이 닫히고 잠금이 해제됩니다.
    pub async fn login(&self, credentials: &TerminalCredentials) -> TerminalResult<Session> {
        let guard = Arc::clone(&self.lock).lock_owned().await;

        let inner = self.connector.open(credentials).await.map_err(|e| {
            warn!(login = credentials.login, server = %credentials.server, error = %e, "Terminal login failed");
            e
        })?;

        debug!(login = credentials.login, terminal = self.name(), "Terminal session opened");

        Ok(Session {
            inner,
            login: credentials.login,
            _guard: guard,
        })
    }

    /// 터미널 초기화가 가능한지 확인합니다.
    ///
    /// 세션이 열려 있으면 터미널이 이미 초기화된 상태이므로 대기하지 않고 `true`.
    pub async fn is_available(&self) -> bool {
        let Ok(_guard) = self.lock.try_lock() else {
            return true;
        };

        match self.connector.initialize().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Terminal is not available");
                false
            }
        }
    }

    /// 진행 중인 세션이 끝나기를 기다린 뒤 터미널을 종료합니다.
    pub async fn disconnect(&self) {
        let _guard = self.lock.lock().await;
        self.connector.shutdown().await;
        info!(terminal = self.name(), "Terminal shut down");
    }
}

/// 게이트웨이가 발급한 소유권 있는 터미널 세션.
pub struct Session {
    inner: Box<dyn TerminalSession>,
    login: u64,
    _guard: OwnedMutexGuard<()>,
}

impl Session {
    /// 로그인된 계좌 번호.
    pub fn login(&self) -> u64 {
        self.login
    }

    /// 계좌 정보를 조회합니다.
    pub async fn account_info(&mut self) -> TerminalResult<AccountInfo> {
        self.inner.account_info().await
    }

    /// `[from, to]` 기간의 체결 내역을 조회합니다.
    pub async fn history_deals(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TerminalResult<Vec<Deal>> {
        if from > to {
            return Err(TerminalError::History(format!(
                "invalid range: {} > {}",
                from, to
            )));
        }
        self.inner.history_deals(from, to).await
    }

    /// 기간 내 체결 내역을 조회하여 청산 완료 거래로 재구성합니다.
    pub async fn closed_trades(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TerminalResult<Vec<Trade>> {
        let deals = self.history_deals(from, to).await?;
        Ok(reconstruct(&deals))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.inner.close();
        debug!(login = self.login, "Terminal session released");
    }
}
