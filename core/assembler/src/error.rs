use common::derive_more::Display;
use common::ErrorCode;

use ckb_types::{packed, prelude::*, H256};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Display, Hash, PartialEq, Eq)]
pub enum CoreError {
    #[display(fmt = "Input cell {} carries no block number", _0)]
    MissingBlockNumber(String),

    #[display(fmt = "No cell dep is known for script, code hash {}", _0)]
    UnresolvedScript(String),

    #[display(fmt = "Missing {} script info", _0)]
    MissingScriptInfo(String),

    #[display(fmt = "Cannot find header of block {}", _0)]
    HeaderNotFound(u64),

    #[display(fmt = "Header {} is not in header deps", _0)]
    HeaderDepNotFound(String),

    #[display(fmt = "Input cell {} is not a dao withdrawing cell", _0)]
    NotAWithdrawalCell(String),

    #[display(fmt = "Insufficient funds: {}", _0)]
    InsufficientFunds(String),

    #[display(fmt = "Transaction {} is already populated", _0)]
    AlreadyPopulated(String),

    #[display(fmt = "Transaction {} is not committed after {} seconds", _0, _1)]
    SubmissionTimedOut(String, u64),

    #[display(fmt = "Transaction {} has unexpected status {}", _0, _1)]
    UnexpectedTransactionStatus(String, String),

    #[display(fmt = "Signing failed: {}", _0)]
    SigningFailed(String),

    #[display(fmt = "Deposit header must be older than withdrawing header")]
    InvalidWithdrawHeaders,

    #[display(fmt = "Overflow")]
    Overflow,

    #[display(fmt = "Since value {} is too large", _0)]
    InvalidSinceValue(u64),

    #[display(fmt = "Cell {} is not live, status {}", _0, _1)]
    CellNotLive(String, String),

    #[display(fmt = "Cannot find block {}", _0)]
    BlockNotFound(String),

    #[display(fmt = "Ckb client error {}", _0)]
    CkbClientError(String),

    #[display(fmt = "Invalid config {}", _0)]
    InvalidConfig(String),
}

impl std::error::Error for CoreError {}

impl ErrorCode for CoreError {
    fn err_code(&self) -> i32 {
        match self {
            CoreError::MissingBlockNumber(_) => -11001,
            CoreError::UnresolvedScript(_) => -11002,
            CoreError::MissingScriptInfo(_) => -11003,
            CoreError::HeaderNotFound(_) => -11004,
            CoreError::HeaderDepNotFound(_) => -11005,
            CoreError::NotAWithdrawalCell(_) => -11006,
            CoreError::AlreadyPopulated(_) => -11007,
            CoreError::InvalidWithdrawHeaders => -11008,
            CoreError::Overflow => -11009,
            CoreError::InvalidSinceValue(_) => -11010,
            CoreError::InvalidConfig(_) => -11011,

            CoreError::InsufficientFunds(_) => -10050,

            CoreError::CellNotLive(_, _) => -10060,
            CoreError::BlockNotFound(_) => -10061,
            CoreError::CkbClientError(_) => -10062,

            CoreError::SigningFailed(_) => -10070,

            CoreError::SubmissionTimedOut(_, _) => -10080,
            CoreError::UnexpectedTransactionStatus(_, _) => -10081,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

impl CoreError {
    pub(crate) fn client<E: std::fmt::Display>(err: E) -> Self {
        CoreError::CkbClientError(err.to_string())
    }
}

pub(crate) fn out_point_to_string(out_point: &packed::OutPoint) -> String {
    let tx_hash: H256 = out_point.tx_hash().unpack();
    let index: u32 = out_point.index().unpack();
    format!("{:#x}:{}", tx_hash, index)
}
