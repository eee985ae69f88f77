use crate::cell::InputCell;
use crate::epoch::Epoch;
use crate::error::CoreError;
use crate::header::HeaderResolver;
use crate::skeleton::TransactionSkeleton;
use crate::InnerResult;

use common::consts::MIN_DAO_LOCK_PERIOD;
use core_ckb_client::CkbRpc;

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;

const MAX_SINCE_VALUE: u64 = 0xff_ffff_ffff_ffff;
const SINCE_FLAG_OFFSET: u64 = 56;

#[derive(Serialize, Deserialize, Clone, Debug, Hash, PartialEq, Eq)]
pub enum SinceFlag {
    Relative,
    Absolute,
}

#[derive(Serialize, Deserialize, Clone, Debug, Hash, PartialEq, Eq)]
pub enum SinceType {
    BlockNumber,
    EpochNumber,
    Timestamp,
}

#[derive(Serialize, Deserialize, Clone, Debug, Hash, PartialEq, Eq)]
pub struct SinceConfig {
    pub flag: SinceFlag,
    pub type_: SinceType,
    pub value: u64,
}

pub fn to_since(config: SinceConfig) -> InnerResult<u64> {
    let since = match (config.flag, config.type_) {
        (SinceFlag::Absolute, SinceType::BlockNumber) => 0b0000_0000u64,
        (SinceFlag::Relative, SinceType::BlockNumber) => 0b1000_0000u64,
        (SinceFlag::Absolute, SinceType::EpochNumber) => 0b0010_0000u64,
        (SinceFlag::Relative, SinceType::EpochNumber) => 0b1010_0000u64,
        (SinceFlag::Absolute, SinceType::Timestamp) => 0b0100_0000u64,
        (SinceFlag::Relative, SinceType::Timestamp) => 0b1100_0000u64,
    };
    if config.value > MAX_SINCE_VALUE {
        return Err(CoreError::InvalidSinceValue(config.value));
    }
    Ok((since << SINCE_FLAG_OFFSET) + config.value)
}

/// Earliest epoch at which a deposit made at `deposit` and withdrawn at
/// `withdraw` may be unlocked: the end of the first whole lock period
/// covering the deposited duration.
pub fn calculate_unlock_epoch(deposit: Epoch, withdraw: Epoch) -> InnerResult<Epoch> {
    let mut deposited_epochs = withdraw
        .number()
        .checked_sub(deposit.number())
        .ok_or(CoreError::InvalidWithdrawHeaders)?;

    let withdraw_fraction = Epoch::new(0, withdraw.index(), withdraw.length());
    let deposit_fraction = Epoch::new(0, deposit.index(), deposit.length());
    if withdraw_fraction.compare(&deposit_fraction) == Ordering::Greater {
        deposited_epochs += 1;
    }

    let lock_periods = deposited_epochs
        .checked_add(MIN_DAO_LOCK_PERIOD - 1)
        .ok_or(CoreError::Overflow)?
        / MIN_DAO_LOCK_PERIOD;
    let lock_periods = lock_periods.max(1);
    let unlock_number = lock_periods
        .checked_mul(MIN_DAO_LOCK_PERIOD)
        .and_then(|epochs| epochs.checked_add(deposit.number()))
        .ok_or(CoreError::Overflow)?;

    Ok(Epoch::new(unlock_number, deposit.index(), deposit.length()))
}

pub async fn dao_withdraw_since<C: CkbRpc>(
    input: &InputCell,
    headers: &mut HeaderResolver<C>,
) -> InnerResult<u64> {
    let deposit_block_number = input.deposit_block_number()?;
    let withdraw_header = headers.get_header(input.block_number()?).await?;
    let deposit_header = headers.get_header(deposit_block_number).await?;

    let unlock_epoch = calculate_unlock_epoch(
        deposit_header.epoch().into(),
        withdraw_header.epoch().into(),
    )?;

    to_since(SinceConfig {
        flag: SinceFlag::Absolute,
        type_: SinceType::EpochNumber,
        value: unlock_epoch.full_value(),
    })
}

pub async fn add_input_sinces<C: CkbRpc>(
    skeleton: &mut TransactionSkeleton,
    headers: &mut HeaderResolver<C>,
) -> InnerResult<()> {
    if !skeleton.input_sinces.is_empty() {
        return Err(CoreError::AlreadyPopulated("input_sinces".to_string()));
    }

    for (index, input) in skeleton.inputs.iter().enumerate() {
        if input.is_dao_withdrawal() {
            let since = dao_withdraw_since(input, headers).await?;
            skeleton.input_sinces.insert(index, since);
        }
    }

    Ok(())
}
