pub mod client;
pub mod error;

pub use client::CkbRpcClient;
pub use error::ClientError;

use common::{async_trait, Result};

use ckb_jsonrpc_types::{
    BlockView, CellWithStatus, HeaderView, OutPoint, Transaction, TransactionProof, TxStatus,
};
use ckb_types::{core::BlockNumber, H256};

/// The node calls the transaction assembler depends on.
#[async_trait]
pub trait CkbRpc: Sync + Send + 'static {
    async fn get_header_by_number(&self, block_number: BlockNumber) -> Result<Option<HeaderView>>;

    async fn get_live_cell(&self, out_point: OutPoint, with_data: bool) -> Result<CellWithStatus>;

    async fn get_transaction_proof(&self, tx_hashes: Vec<H256>) -> Result<TransactionProof>;

    async fn get_block(&self, block_hash: H256) -> Result<Option<BlockView>>;

    async fn send_transaction(&self, tx: Transaction) -> Result<H256>;

    /// Status part of `get_transaction`, `None` when the node returns null.
    async fn get_transaction_status(&self, tx_hash: H256) -> Result<Option<TxStatus>>;
}
