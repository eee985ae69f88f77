use crate::cell::DaoState;
use crate::error::CoreError;
use crate::header::HeaderResolver;
use crate::skeleton::TransactionSkeleton;
use crate::InnerResult;

use common::DetailedCell;
use core_ckb_client::CkbRpc;

use ckb_dao_utils::extract_dao_data;
use ckb_types::core::{Capacity, HeaderView, TransactionView};
use ckb_types::{packed, prelude::*};
use num_bigint::BigUint;

const FEE_RATE_UNIT: u128 = 1000;

// a transaction inside a block also takes its 4 bytes offset slot
const TX_OFFSET_SIZE: usize = 4;

pub fn calculate_fee(tx_size: u64, fee_rate: u64) -> u64 {
    let base = u128::from(tx_size) * u128::from(fee_rate);
    let fee = (base + FEE_RATE_UNIT - 1) / FEE_RATE_UNIT;
    fee.try_into().unwrap_or(u64::MAX)
}

pub fn calculate_tx_size(tx_view: &TransactionView) -> usize {
    tx_view.data().total_size() + TX_OFFSET_SIZE
}

/// Capacity of the smallest cell `lock` can own: no type script, no data.
pub fn minimal_change_capacity(lock: &packed::Script) -> InnerResult<u64> {
    let cell = packed::CellOutput::new_builder().lock(lock.clone()).build();
    let occupied = cell
        .occupied_capacity(Capacity::zero())
        .map_err(|_| CoreError::Overflow)?;
    Ok(occupied.as_u64())
}

pub fn calculate_maximum_withdraw(
    cell: &DetailedCell,
    deposit_header: &HeaderView,
    withdrawing_header: &HeaderView,
) -> InnerResult<u64> {
    if deposit_header.number() >= withdrawing_header.number() {
        return Err(CoreError::InvalidWithdrawHeaders);
    }

    let (deposit_ar, _, _, _) = extract_dao_data(deposit_header.dao());
    let (withdrawing_ar, _, _, _) = extract_dao_data(withdrawing_header.dao());
    if deposit_ar == 0 {
        return Err(CoreError::InvalidWithdrawHeaders);
    }

    let data_capacity = Capacity::bytes(cell.cell_data.len()).map_err(|_| CoreError::Overflow)?;
    let occupied_capacity = cell
        .cell_output
        .occupied_capacity(data_capacity)
        .map_err(|_| CoreError::Overflow)?
        .as_u64();
    let output_capacity: u64 = cell.cell_output.capacity().unpack();
    let counted_capacity = output_capacity
        .checked_sub(occupied_capacity)
        .ok_or(CoreError::Overflow)?;

    let withdraw_counted_capacity =
        BigUint::from(counted_capacity) * BigUint::from(withdrawing_ar) / BigUint::from(deposit_ar);
    let withdraw_counted_capacity: u64 = withdraw_counted_capacity
        .try_into()
        .map_err(|_| CoreError::Overflow)?;

    withdraw_counted_capacity
        .checked_add(occupied_capacity)
        .ok_or(CoreError::Overflow)
}

/// Effective input capacity minus output capacity. Withdrawal phase DAO
/// inputs count with their maximum withdrawable capacity.
pub async fn net_capacity_delta<C: CkbRpc>(
    skeleton: &TransactionSkeleton,
    headers: &mut HeaderResolver<C>,
) -> InnerResult<i128> {
    let mut inputs_capacity = 0u128;
    for input in skeleton.inputs.iter() {
        let capacity = match input.dao_state {
            DaoState::Withdrawal {
                deposit_block_number,
            } => {
                let withdrawing_header = headers.get_header(input.block_number()?).await?;
                let deposit_header = headers.get_header(deposit_block_number).await?;
                calculate_maximum_withdraw(&input.cell, &deposit_header, &withdrawing_header)?
            }
            DaoState::NotDao | DaoState::Deposit => input.capacity(),
        };
        inputs_capacity += u128::from(capacity);
    }

    let inputs_capacity: i128 = inputs_capacity.try_into().map_err(|_| CoreError::Overflow)?;
    let outputs_capacity: i128 = skeleton
        .output_capacity()
        .try_into()
        .map_err(|_| CoreError::Overflow)?;

    Ok(inputs_capacity - outputs_capacity)
}
