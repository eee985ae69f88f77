use crate::error::CoreError;
use crate::header::HeaderResolver;
use crate::registry::ScriptRegistry;
use crate::skeleton::TransactionSkeleton;
use crate::InnerResult;

use common::consts::SIGNATURE_PLACEHOLDER_LEN;
use common::utils::find;
use common::PW_LOCK;
use core_ckb_client::CkbRpc;

use ckb_types::{bytes::Bytes, packed, prelude::*};

use std::collections::HashSet;

/// Lock kinds whose signer expects a placeholder at every input it unlocks,
/// not only the first one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WitnessPolicy {
    pad_all: HashSet<String>,
}

impl Default for WitnessPolicy {
    fn default() -> Self {
        WitnessPolicy::new([PW_LOCK.to_string()])
    }
}

impl WitnessPolicy {
    pub fn new<I: IntoIterator<Item = String>>(pad_all: I) -> Self {
        WitnessPolicy {
            pad_all: pad_all.into_iter().collect(),
        }
    }

    pub fn pads_all(&self, lock: &packed::Script, registry: &ScriptRegistry) -> bool {
        self.pad_all
            .iter()
            .any(|name| registry.is_script(lock, name).unwrap_or(false))
    }
}

pub async fn add_witness_placeholders<C: CkbRpc>(
    skeleton: &mut TransactionSkeleton,
    account_lock: &packed::Script,
    policy: &WitnessPolicy,
    registry: &ScriptRegistry,
    headers: &mut HeaderResolver<C>,
) -> InnerResult<()> {
    if !skeleton.witnesses.is_empty() {
        return Err(CoreError::AlreadyPopulated("witnesses".to_string()));
    }

    let pad_all = policy.pads_all(account_lock, registry);
    let mut padded = false;
    let mut witnesses = Vec::with_capacity(skeleton.inputs.len());

    for input in skeleton.inputs.iter() {
        let mut witness = packed::WitnessArgs::new_builder();

        if input.cell.cell_output.lock() == *account_lock && (pad_all || !padded) {
            witness = witness.lock(Some(Bytes::from(vec![0u8; SIGNATURE_PLACEHOLDER_LEN])).pack());
            padded = true;
        }

        if input.is_dao_withdrawal() {
            let deposit_hash = headers
                .get_header(input.deposit_block_number()?)
                .await?
                .hash();
            let index = find(&deposit_hash, &skeleton.header_deps)
                .ok_or_else(|| CoreError::HeaderDepNotFound(format!("{:#x}", deposit_hash)))?;
            let index = Bytes::from((index as u64).to_le_bytes().to_vec());
            witness = witness.input_type(Some(index).pack());
        }

        witnesses.push(witness.build().as_bytes().pack());
    }

    skeleton.witnesses = witnesses;
    Ok(())
}
