mod deps_test;

use crate::builder::Signer;
use crate::epoch::Epoch;
use crate::header::HeaderResolver;
use crate::registry::ScriptRegistry;
use crate::skeleton::{CellWithData, TransactionSkeleton};

use common::utils::ScriptInfo;
use common::{anyhow::anyhow, async_trait, DetailedCell, Result};
use common::{DAO, MULTISIG, PW_LOCK, SECP256K1};
use core_ckb_client::CkbRpc;

use ckb_dao_utils::pack_dao_data;
use ckb_jsonrpc_types::{
    BlockView, CellData, CellInfo, CellWithStatus, JsonBytes, OutPoint, Transaction,
    TransactionProof, TxStatus,
};
use ckb_types::core::{
    BlockBuilder, BlockNumber, Capacity, DepType, HeaderBuilder, HeaderView, ScriptHashType,
    TransactionView,
};
use ckb_types::{bytes::Bytes, packed, prelude::*, H256};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ACCOUNT_ARGS: [u8; 20] = [0x11; 20];
pub const OTHER_ARGS: [u8; 20] = [0x22; 20];

pub const DEPOSIT_AR: u64 = 10_000_000_000_000_000;
pub const WITHDRAW_AR: u64 = 10_100_000_000_000_000;

/// In memory chain. Status polls walk through `statuses`, repeating the last
/// one once exhausted.
#[derive(Default)]
pub struct MockCkbRpc {
    headers: HashMap<BlockNumber, HeaderView>,
    live_cells: HashMap<packed::OutPoint, (Option<(packed::CellOutput, Bytes)>, &'static str)>,
    tx_blocks: HashMap<H256, H256>,
    blocks: HashMap<H256, BlockView>,
    statuses: Vec<Option<TxStatus>>,
    header_calls: AtomicUsize,
    status_calls: AtomicUsize,
    sent: Mutex<Vec<packed::Transaction>>,
}

impl MockCkbRpc {
    pub fn new() -> Self {
        MockCkbRpc::default()
    }

    pub fn header(mut self, header: HeaderView) -> Self {
        self.headers.insert(header.number(), header);
        self
    }

    pub fn live_cell(mut self, cell: &DetailedCell, block_hash: H256, header: HeaderView) -> Self {
        self.live_cells.insert(
            cell.out_point.clone(),
            (
                Some((cell.cell_output.clone(), cell.cell_data.clone())),
                "live",
            ),
        );

        let tx_hash: H256 = cell.out_point.tx_hash().unpack();
        self.tx_blocks.insert(tx_hash, block_hash.clone());
        self.blocks.insert(
            block_hash,
            BlockBuilder::default().header(header).build().into(),
        );
        self
    }

    pub fn dead_cell(mut self, out_point: packed::OutPoint) -> Self {
        self.live_cells.insert(out_point, (None, "dead"));
        self
    }

    pub fn statuses(mut self, statuses: Vec<Option<TxStatus>>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn header_calls(&self) -> usize {
        self.header_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<packed::Transaction> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CkbRpc for MockCkbRpc {
    async fn get_header_by_number(
        &self,
        block_number: BlockNumber,
    ) -> Result<Option<ckb_jsonrpc_types::HeaderView>> {
        self.header_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .headers
            .get(&block_number)
            .map(|header| header.clone().into()))
    }

    async fn get_live_cell(&self, out_point: OutPoint, _with_data: bool) -> Result<CellWithStatus> {
        let out_point: packed::OutPoint = out_point.into();
        let (cell, status) = match self.live_cells.get(&out_point) {
            Some((cell, status)) => (cell.clone(), *status),
            None => (None, "unknown"),
        };
        let cell = cell.map(|(output, data)| CellInfo {
            output: output.into(),
            data: Some(CellData {
                hash: packed::CellOutput::calc_data_hash(&data).unpack(),
                content: JsonBytes::from_bytes(data),
            }),
        });
        Ok(CellWithStatus {
            cell,
            status: status.to_string(),
        })
    }

    async fn get_transaction_proof(&self, tx_hashes: Vec<H256>) -> Result<TransactionProof> {
        let block_hash = tx_hashes
            .first()
            .and_then(|hash| self.tx_blocks.get(hash))
            .cloned()
            .ok_or_else(|| anyhow!("transaction not yet in block"))?;
        Ok(TransactionProof {
            block_hash,
            ..Default::default()
        })
    }

    async fn get_block(&self, block_hash: H256) -> Result<Option<BlockView>> {
        Ok(self.blocks.get(&block_hash).cloned())
    }

    async fn send_transaction(&self, tx: Transaction) -> Result<H256> {
        let tx: packed::Transaction = tx.into();
        let hash = tx.calc_tx_hash().unpack();
        self.sent.lock().unwrap().push(tx);
        Ok(hash)
    }

    async fn get_transaction_status(&self, _tx_hash: H256) -> Result<Option<TxStatus>> {
        let call = self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .get(call)
            .or_else(|| self.statuses.last())
            .cloned()
            .flatten())
    }
}

pub struct PassThroughSigner;

#[async_trait]
impl Signer for PassThroughSigner {
    async fn sign(
        &self,
        skeleton: &TransactionSkeleton,
        _account_lock: &packed::Script,
    ) -> Result<TransactionView> {
        Ok(skeleton.to_transaction_view())
    }
}

pub struct FailingSigner;

#[async_trait]
impl Signer for FailingSigner {
    async fn sign(
        &self,
        _skeleton: &TransactionSkeleton,
        _account_lock: &packed::Script,
    ) -> Result<TransactionView> {
        Err(anyhow!("device disconnected"))
    }
}

fn script_info(code_hash: u8, dep_index: u32, dep_type: DepType) -> ScriptInfo {
    let script = packed::ScriptBuilder::default()
        .code_hash(H256([code_hash; 32]).pack())
        .hash_type(ScriptHashType::Type.into())
        .build();
    let out_point = packed::OutPointBuilder::default()
        .tx_hash(H256([0xde; 32]).pack())
        .index(dep_index.pack())
        .build();
    let cell_dep = packed::CellDepBuilder::default()
        .out_point(out_point)
        .dep_type(dep_type.into())
        .build();
    ScriptInfo { script, cell_dep }
}

pub fn registry() -> ScriptRegistry {
    let mut registry = ScriptRegistry::default();
    registry.insert(SECP256K1, script_info(0x01, 0, DepType::DepGroup));
    registry.insert(MULTISIG, script_info(0x02, 1, DepType::DepGroup));
    registry.insert(DAO, script_info(0x03, 2, DepType::Code));
    registry.insert(PW_LOCK, script_info(0x04, 3, DepType::Code));
    registry
}

pub fn script(name: &str, args: &[u8]) -> packed::Script {
    registry()
        .default_script(name)
        .unwrap()
        .as_builder()
        .args(Bytes::from(args.to_vec()).pack())
        .build()
}

pub fn secp_lock(args: [u8; 20]) -> packed::Script {
    script(SECP256K1, &args)
}

pub fn dao_type() -> packed::Script {
    script(DAO, &[])
}

pub fn cell_dep(name: &str) -> packed::CellDep {
    registry().default_cell_dep(name).unwrap()
}

pub fn build_header(number: BlockNumber, epoch: Epoch, ar: u64) -> HeaderView {
    HeaderBuilder::default()
        .number(number.pack())
        .epoch(epoch.full_value().pack())
        .dao(pack_dao_data(
            ar,
            Capacity::zero(),
            Capacity::zero(),
            Capacity::zero(),
        ))
        .build()
}

pub fn random_out_point() -> packed::OutPoint {
    packed::OutPointBuilder::default()
        .tx_hash(H256(rand::random()).pack())
        .index(0u32.pack())
        .build()
}

pub fn new_cell(
    lock: packed::Script,
    type_script: Option<packed::Script>,
    capacity: u64,
    data: Vec<u8>,
    block_number: Option<BlockNumber>,
) -> DetailedCell {
    let cell_output = packed::CellOutputBuilder::default()
        .lock(lock)
        .type_(type_script.pack())
        .capacity(capacity.pack())
        .build();
    let cell = DetailedCell::new(random_out_point(), cell_output, Bytes::from(data));
    match block_number {
        Some(number) => cell.with_block(number, H256(rand::random())),
        None => cell,
    }
}

pub fn new_output(
    lock: packed::Script,
    type_script: Option<packed::Script>,
    capacity: u64,
    data: Vec<u8>,
) -> CellWithData {
    let cell = packed::CellOutputBuilder::default()
        .lock(lock)
        .type_(type_script.pack())
        .capacity(capacity.pack())
        .build();
    CellWithData::new(cell, Bytes::from(data))
}

pub fn resolver(client: MockCkbRpc, known: Vec<HeaderView>) -> HeaderResolver<MockCkbRpc> {
    HeaderResolver::with_headers(Arc::new(client), known)
}

/// Deposit at block 100 in epoch 5, withdrawal started at block 300 in
/// epoch 10.
pub fn dao_headers() -> (HeaderView, HeaderView) {
    (
        build_header(100, Epoch::new(5, 100, 1000), DEPOSIT_AR),
        build_header(300, Epoch::new(10, 0, 1000), WITHDRAW_AR),
    )
}
