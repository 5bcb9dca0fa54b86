//! 페이퍼 터미널 구현.
//!
//! 네이티브 터미널 없이 개발/테스트할 수 있도록, JSON 파일에서 읽은
//! 계좌와 체결 내역을 메모리에 두고 터미널 바인딩처럼 동작합니다.
//!
//! # 파일 형식
//!
//! ```json
//! {
//!   "accounts": [
//!     {
//!       "password": "demo",
//!       "account": { "login": 1001, "server": "Paper-Demo", "balance": 10000, ... },
//!       "deals": [ { "positionId": 1, "type": "buy", "entry": "in", "time": 1704067200, ... } ]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::{TerminalConnector, TerminalCredentials, TerminalSession};
use crate::domain::{AccountInfo, Deal};
use crate::error::{TerminalError, TerminalResult};

/// 페이퍼 터미널 계좌.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperAccount {
    /// 로그인 비밀번호
    pub password: String,
    /// 계좌 정보
    pub account: AccountInfo,
    /// 체결 내역 (파일 순서 유지)
    #[serde(default)]
    pub deals: Vec<Deal>,
}

impl PaperAccount {
    /// 체결 내역이 없는 계좌를 생성합니다.
    pub fn new(account: AccountInfo, password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            account,
            deals: Vec::new(),
        }
    }

    /// 체결 내역을 설정합니다.
    pub fn with_deals(mut self, deals: Vec<Deal>) -> Self {
        self.deals = deals;
        self
    }
}

#[derive(Debug, Deserialize)]
struct PaperFixture {
    #[serde(default)]
    accounts: Vec<PaperAccount>,
}

/// 메모리 기반 터미널.
#[derive(Debug)]
pub struct PaperTerminal {
    accounts: HashMap<u64, Arc<PaperAccount>>,
    /// 설정되면 초기화가 항상 이 메시지로 실패
    offline_reason: Option<String>,
    initialized: AtomicBool,
    open_sessions: Arc<AtomicUsize>,
}

impl PaperTerminal {
    /// 주어진 계좌들로 터미널을 생성합니다.
    pub fn new(accounts: Vec<PaperAccount>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.account.login, Arc::new(account)))
                .collect(),
            offline_reason: None,
            initialized: AtomicBool::new(false),
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 계좌가 없는 터미널 (모든 로그인이 실패).
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// 초기화가 항상 실패하는 터미널 (터미널 미설치 상황).
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            offline_reason: Some(reason.into()),
            ..Self::empty()
        }
    }

    /// JSON 문자열에서 계좌를 로드합니다.
    pub fn from_json(json: &str) -> TerminalResult<Self> {
        let fixture: PaperFixture = serde_json::from_str(json)?;
        Ok(Self::new(fixture.accounts))
    }

    /// JSON 파일에서 계좌를 로드합니다.
    pub fn from_file(path: impl AsRef<Path>) -> TerminalResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TerminalError::Initialization(format!("{}: {}", path.display(), e))
        })?;
        let terminal = Self::from_json(&json)?;

        info!(
            path = %path.display(),
            accounts = terminal.accounts.len(),
            "Paper terminal accounts loaded"
        );
        Ok(terminal)
    }

    /// 등록된 계좌 수.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// 현재 열려 있는 세션 수.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// 터미널 초기화 여부.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> TerminalResult<()> {
        match &self.offline_reason {
            Some(reason) => Err(TerminalError::Initialization(reason.clone())),
            None => {
                self.initialized.store(true, Ordering::SeqCst);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl TerminalConnector for PaperTerminal {
    fn name(&self) -> &str {
        "paper"
    }

    fn is_simulated(&self) -> bool {
        true
    }

    async fn initialize(&self) -> TerminalResult<()> {
        self.ensure_online()
    }

    async fn open(
        &self,
        credentials: &TerminalCredentials,
    ) -> TerminalResult<Box<dyn TerminalSession>> {
        self.ensure_online()?;

        let account = self
            .accounts
            .get(&credentials.login)
            .filter(|account| {
                account.account.server == credentials.server
                    && credentials.password_matches(&account.password)
            })
            .cloned()
            .ok_or_else(|| {
                TerminalError::Authentication(format!(
                    "authorization failed for account {} on {}",
                    credentials.login, credentials.server
                ))
            })?;

        self.open_sessions.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(PaperSession {
            account,
            open_sessions: Arc::clone(&self.open_sessions),
            closed: false,
        }))
    }

    async fn shutdown(&self) {
        self.initialized.store(false, Ordering::SeqCst);
    }
}

/// 페이퍼 터미널 세션.
struct PaperSession {
    account: Arc<PaperAccount>,
    open_sessions: Arc<AtomicUsize>,
    closed: bool,
}

#[async_trait]
impl TerminalSession for PaperSession {
    async fn account_info(&mut self) -> TerminalResult<AccountInfo> {
        Ok(self.account.account.clone())
    }

    async fn history_deals(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TerminalResult<Vec<Deal>> {
        let deals: Vec<Deal> = self
            .account
            .deals
            .iter()
            .filter(|deal| deal.time >= from && deal.time <= to)
            .cloned()
            .collect();

        debug!(
            login = self.account.account.login,
            deals = deals.len(),
            first_ticket = deals.first().map(|deal| deal.ticket),
            last_ticket = deals.last().map(|deal| deal.ticket),
            "Paper history deals fetched"
        );
        Ok(deals)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
