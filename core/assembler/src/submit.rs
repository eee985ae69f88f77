use crate::error::CoreError;
use crate::InnerResult;

use common::consts::TX_POLL_INTERVAL_SECS;
use common_logger::{json, JsonValue};
use core_ckb_client::CkbRpc;

use ckb_jsonrpc_types::{Status, TxStatus};
use ckb_types::H256;
use log::Level;
use tokio::time::{sleep, Duration};

const MODULE: &str = "submit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxState {
    Submitted,
    Pending,
    Proposed,
    Committed,
    TimedOut,
    Unexpected(String),
}

impl TxState {
    fn from_status(status: Option<&TxStatus>) -> Self {
        match status.map(|tx_status| &tx_status.status) {
            Some(Status::Pending) => TxState::Pending,
            Some(Status::Proposed) => TxState::Proposed,
            Some(Status::Committed) => TxState::Committed,
            #[allow(unreachable_patterns)]
            Some(other) => TxState::Unexpected(format!("{:?}", other).to_lowercase()),
            None => TxState::Unexpected("null".to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TxState::Committed | TxState::TimedOut | TxState::Unexpected(_)
        )
    }
}

/// Polls the node once per second until the transaction is committed.
///
/// Gives up after `timeout_secs + 1` polls, the first one issued right away.
pub async fn wait_for_commit<C: CkbRpc + ?Sized>(
    client: &C,
    tx_hash: H256,
    timeout_secs: u64,
) -> InnerResult<H256> {
    let hash = format!("{:#x}", tx_hash);
    let mut state = TxState::Submitted;

    for attempt in 0..=timeout_secs {
        if attempt > 0 {
            sleep(Duration::from_secs(TX_POLL_INTERVAL_SECS)).await;
        }

        let status = client
            .get_transaction_status(tx_hash.clone())
            .await
            .map_err(CoreError::client)?;
        let next = TxState::from_status(status.as_ref());
        if next != state {
            log_transition(&hash, &state, &next, attempt);
            state = next;
        }

        if state.is_terminal() {
            break;
        }
    }

    match state {
        TxState::Committed => Ok(tx_hash),
        TxState::Unexpected(status) => Err(CoreError::UnexpectedTransactionStatus(hash, status)),
        _ => {
            log_transition(&hash, &state, &TxState::TimedOut, timeout_secs);
            Err(CoreError::SubmissionTimedOut(hash, timeout_secs))
        }
    }
}

fn log_transition(hash: &str, from: &TxState, to: &TxState, attempt: u64) {
    let level = match to {
        TxState::TimedOut | TxState::Unexpected(_) => Level::Warn,
        _ => Level::Info,
    };
    let msg: JsonValue = json!({
        "tx_hash", hash;
        "from", format!("{:?}", from);
        "to", format!("{:?}", to);
        "attempt", attempt
    });
    common_logger::log(level, MODULE, "poll0001", msg);
}
