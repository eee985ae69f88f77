use crate::capacity::{
    calculate_fee, calculate_tx_size, minimal_change_capacity, net_capacity_delta,
};
use crate::cell::InputCell;
use crate::deps::{add_cell_deps, add_header_deps};
use crate::error::{out_point_to_string, CoreError};
use crate::header::HeaderResolver;
use crate::registry::ScriptRegistry;
use crate::since::add_input_sinces;
use crate::skeleton::{CellWithData, TransactionSkeleton};
use crate::submit::wait_for_commit;
use crate::witness::{add_witness_placeholders, WitnessPolicy};
use crate::InnerResult;

use common::consts::{DEFAULT_FEE_RATE, DEFAULT_TX_TIMEOUT_SECS};
use common::{async_trait, DetailedCell, Result};
use common_logger::json;
use core_ckb_client::CkbRpc;

use ckb_types::core::{HeaderView, TransactionView};
use ckb_types::{bytes::Bytes, packed, prelude::*, H256};
use log::Level;

use std::sync::Arc;

/// Turns a finished skeleton into a fully signed transaction.
#[async_trait]
pub trait Signer: Sync + Send {
    async fn sign(
        &self,
        skeleton: &TransactionSkeleton,
        account_lock: &packed::Script,
    ) -> Result<TransactionView>;
}

/// Runs on a fresh skeleton before any derived field is filled, e.g. to
/// append protocol specific outputs.
#[async_trait]
pub trait PreBuildHook: Sync + Send {
    async fn pre_build(&self, skeleton: TransactionSkeleton) -> InnerResult<TransactionSkeleton>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Start,
    End,
}

pub enum Source {
    Input(Vec<DetailedCell>),
    Output(Vec<CellWithData>),
}

pub struct TransactionBuilder<C> {
    account_lock: packed::Script,
    client: Arc<C>,
    signer: Arc<dyn Signer>,
    registry: Arc<ScriptRegistry>,
    witness_policy: WitnessPolicy,
    pre_build: Option<Arc<dyn PreBuildHook>>,
    fee_rate: u64,
    headers: HeaderResolver<C>,
    inputs: Vec<InputCell>,
    outputs: Vec<CellWithData>,
}

impl<C: CkbRpc> TransactionBuilder<C> {
    pub fn new(
        account_lock: packed::Script,
        client: Arc<C>,
        signer: Arc<dyn Signer>,
        registry: Arc<ScriptRegistry>,
    ) -> Self {
        TransactionBuilder {
            account_lock,
            headers: HeaderResolver::new(Arc::clone(&client)),
            client,
            signer,
            registry,
            witness_policy: WitnessPolicy::default(),
            pre_build: None,
            fee_rate: DEFAULT_FEE_RATE,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_known_headers<I: IntoIterator<Item = HeaderView>>(mut self, headers: I) -> Self {
        headers
            .into_iter()
            .for_each(|header| self.headers.insert(header));
        self
    }

    pub fn with_pre_build(mut self, hook: Arc<dyn PreBuildHook>) -> Self {
        self.pre_build = Some(hook);
        self
    }

    pub fn with_fee_rate(mut self, fee_rate: u64) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    pub fn with_witness_policy(mut self, policy: WitnessPolicy) -> Self {
        self.witness_policy = policy;
        self
    }

    pub fn get_account_lock(&self) -> packed::Script {
        self.account_lock.clone()
    }

    pub fn fee_rate(&self) -> u64 {
        self.fee_rate
    }

    pub fn headers(&self) -> &HeaderResolver<C> {
        &self.headers
    }

    pub fn inputs(&self) -> &[InputCell] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[CellWithData] {
        &self.outputs
    }

    pub fn add(&mut self, source: Source, position: Position) -> InnerResult<()> {
        match source {
            Source::Input(cells) => self.add_inputs(position, cells),
            Source::Output(cells) => {
                self.add_outputs(position, cells);
                Ok(())
            }
        }
    }

    pub fn add_inputs(&mut self, position: Position, cells: Vec<DetailedCell>) -> InnerResult<()> {
        if let Some(cell) = cells.iter().find(|cell| cell.block_number.is_none()) {
            return Err(CoreError::MissingBlockNumber(out_point_to_string(
                &cell.out_point,
            )));
        }

        let classified = cells
            .into_iter()
            .map(|cell| InputCell::classify(cell, &self.registry));
        insert_at(&mut self.inputs, position, classified);
        Ok(())
    }

    pub fn add_outputs(&mut self, position: Position, cells: Vec<CellWithData>) {
        insert_at(&mut self.outputs, position, cells);
    }

    pub async fn build(&mut self) -> InnerResult<TransactionSkeleton> {
        let mut skeleton = TransactionSkeleton::new(self.inputs.clone(), self.outputs.clone());
        if let Some(hook) = self.pre_build.clone() {
            skeleton = hook.pre_build(skeleton).await?;
        }

        let delta = net_capacity_delta(&skeleton, &mut self.headers).await?;
        self.build_with_change(skeleton, delta).await
    }

    /// Balances `skeleton` with a change cell of `delta` minus the fee,
    /// sized from a provisional build that carries the whole delta.
    pub async fn build_with_change(
        &mut self,
        skeleton: TransactionSkeleton,
        delta: i128,
    ) -> InnerResult<TransactionSkeleton> {
        if delta == 0 {
            return self.complete(skeleton).await;
        }

        let min_change = minimal_change_capacity(&self.account_lock)?;
        if delta < i128::from(min_change) {
            return Err(CoreError::InsufficientFunds(format!(
                "capacity left {} is less than minimal change {}",
                delta, min_change
            )));
        }
        let change = u64::try_from(delta).map_err(|_| CoreError::Overflow)?;

        let provisional = self
            .complete(self.with_change(skeleton.clone(), change))
            .await?;
        let tx_size = calculate_tx_size(&provisional.to_transaction_view());
        let fee = calculate_fee(tx_size as u64, self.fee_rate);

        let change = change
            .checked_sub(fee)
            .filter(|change| *change >= min_change)
            .ok_or_else(|| {
                CoreError::InsufficientFunds(format!(
                    "capacity left {} cannot pay fee {} and keep minimal change {}",
                    delta, fee, min_change
                ))
            })?;
        log::debug!(
            "[builder] tx size {}, fee rate {}, fee {}, change {}",
            tx_size,
            self.fee_rate,
            fee,
            change
        );

        self.complete(self.with_change(skeleton, change)).await
    }

    pub async fn build_and_send(&mut self, timeout_secs: u64) -> InnerResult<H256> {
        let skeleton = self.build().await?;
        let tx = self
            .signer
            .sign(&skeleton, &self.account_lock)
            .await
            .map_err(|e| CoreError::SigningFailed(e.to_string()))?;

        let tx_hash = self
            .client
            .send_transaction(tx.data().into())
            .await
            .map_err(CoreError::client)?;
        common_logger::log(
            Level::Info,
            "builder",
            "send0001",
            json!({
                "tx_hash", format!("{:#x}", tx_hash);
                "inputs", skeleton.inputs.len();
                "outputs", skeleton.outputs.len()
            }),
        );

        wait_for_commit(self.client.as_ref(), tx_hash, timeout_secs).await
    }

    pub async fn build_and_send_with_default_timeout(&mut self) -> InnerResult<H256> {
        self.build_and_send(DEFAULT_TX_TIMEOUT_SECS).await
    }

    fn with_change(&self, mut skeleton: TransactionSkeleton, change: u64) -> TransactionSkeleton {
        let change_cell = packed::CellOutput::new_builder()
            .lock(self.account_lock.clone())
            .capacity(change.pack())
            .build();
        skeleton
            .outputs
            .push(CellWithData::new(change_cell, Bytes::new()));
        skeleton
    }

    async fn complete(&mut self, mut skeleton: TransactionSkeleton) -> InnerResult<TransactionSkeleton> {
        add_cell_deps(&mut skeleton, &self.registry)?;
        add_header_deps(&mut skeleton, &mut self.headers).await?;
        add_input_sinces(&mut skeleton, &mut self.headers).await?;
        add_witness_placeholders(
            &mut skeleton,
            &self.account_lock,
            &self.witness_policy,
            &self.registry,
            &mut self.headers,
        )
        .await?;
        Ok(skeleton)
    }
}

fn insert_at<T, I: IntoIterator<Item = T>>(list: &mut Vec<T>, position: Position, items: I) {
    match position {
        Position::Start => {
            let tail = std::mem::take(list);
            list.extend(items);
            list.extend(tail);
        }
        Position::End => list.extend(items),
    }
}
