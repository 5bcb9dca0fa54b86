//! 터미널 체결 내역과 거래 기록을 위한 도메인 모델.

mod account;
mod deal;
mod reconstruct;
mod trade;

pub use account::*;
pub use deal::*;
pub use reconstruct::*;
pub use trade::*;
