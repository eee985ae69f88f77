use crate::error::{out_point_to_string, CoreError};
use crate::registry::{is_same_kind, ScriptRegistry};
use crate::InnerResult;

use common::utils::{decode_dao_block_number, is_dao_deposit_data};
use common::{DetailedCell, DAO};
use core_ckb_client::CkbRpc;

use ckb_types::core::BlockNumber;
use ckb_types::{bytes::Bytes, packed, prelude::*, H256};

const LIVE_CELL_STATUS: &str = "live";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DaoState {
    NotDao,
    Deposit,
    Withdrawal { deposit_block_number: BlockNumber },
}

/// An input cell together with its Nervos DAO phase.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InputCell {
    pub cell: DetailedCell,
    pub dao_state: DaoState,
}

impl InputCell {
    pub fn classify(cell: DetailedCell, registry: &ScriptRegistry) -> Self {
        let is_dao = match (cell.cell_output.type_().to_opt(), registry.get(DAO)) {
            (Some(type_script), Some(info)) => is_same_kind(&type_script, &info.script),
            _ => false,
        };

        let dao_state = if !is_dao {
            DaoState::NotDao
        } else if is_dao_deposit_data(&cell.cell_data) {
            DaoState::Deposit
        } else if let Some(deposit_block_number) = decode_dao_block_number(&cell.cell_data) {
            DaoState::Withdrawal {
                deposit_block_number,
            }
        } else {
            log::warn!(
                "[cell] dao typed cell {} has malformed data",
                out_point_to_string(&cell.out_point)
            );
            DaoState::NotDao
        };

        InputCell { cell, dao_state }
    }

    pub fn is_dao_deposit(&self) -> bool {
        self.dao_state == DaoState::Deposit
    }

    pub fn is_dao_withdrawal(&self) -> bool {
        matches!(self.dao_state, DaoState::Withdrawal { .. })
    }

    pub fn block_number(&self) -> InnerResult<BlockNumber> {
        self.cell
            .block_number
            .ok_or_else(|| CoreError::MissingBlockNumber(out_point_to_string(&self.cell.out_point)))
    }

    pub fn deposit_block_number(&self) -> InnerResult<BlockNumber> {
        match self.dao_state {
            DaoState::Withdrawal {
                deposit_block_number,
            } => Ok(deposit_block_number),
            _ => Err(CoreError::NotAWithdrawalCell(out_point_to_string(
                &self.cell.out_point,
            ))),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.cell.cell_output.capacity().unpack()
    }
}

/// Loads a live cell and the block that created it.
pub async fn fetch_live_cell<C: CkbRpc + ?Sized>(
    client: &C,
    out_point: &packed::OutPoint,
) -> InnerResult<DetailedCell> {
    let cell_with_status = client
        .get_live_cell(out_point.clone().into(), true)
        .await
        .map_err(CoreError::client)?;

    if cell_with_status.status != LIVE_CELL_STATUS {
        return Err(CoreError::CellNotLive(
            out_point_to_string(out_point),
            cell_with_status.status,
        ));
    }
    let cell_info = cell_with_status.cell.ok_or_else(|| {
        CoreError::CellNotLive(out_point_to_string(out_point), LIVE_CELL_STATUS.to_string())
    })?;

    let cell_output: packed::CellOutput = cell_info.output.into();
    let cell_data: Bytes = cell_info
        .data
        .map(|data| data.content.into_bytes())
        .unwrap_or_default();

    let tx_hash: H256 = out_point.tx_hash().unpack();
    let proof = client
        .get_transaction_proof(vec![tx_hash])
        .await
        .map_err(CoreError::client)?;
    let block = client
        .get_block(proof.block_hash.clone())
        .await
        .map_err(CoreError::client)?
        .ok_or_else(|| CoreError::BlockNotFound(format!("{:#x}", proof.block_hash)))?;
    let block_number: BlockNumber = block.header.inner.number.value();

    Ok(DetailedCell::new(out_point.clone(), cell_output, cell_data)
        .with_block(block_number, proof.block_hash))
}
