use crate::cell::DaoState;
use crate::error::CoreError;
use crate::header::HeaderResolver;
use crate::registry::{is_same_kind, ScriptRegistry};
use crate::skeleton::TransactionSkeleton;
use crate::InnerResult;

use core_ckb_client::CkbRpc;

use ckb_types::packed;

pub fn add_cell_deps(
    skeleton: &mut TransactionSkeleton,
    registry: &ScriptRegistry,
) -> InnerResult<()> {
    if !skeleton.cell_deps.is_empty() {
        return Err(CoreError::AlreadyPopulated("cell_deps".to_string()));
    }

    let lock_scripts = skeleton
        .inputs
        .iter()
        .map(|input| input.cell.cell_output.lock());
    let type_scripts = skeleton
        .inputs
        .iter()
        .filter_map(|input| input.cell.cell_output.type_().to_opt())
        .chain(
            skeleton
                .outputs
                .iter()
                .filter_map(|output| output.cell.type_().to_opt()),
        );

    let mut scripts: Vec<packed::Script> = Vec::new();
    for script in lock_scripts.chain(type_scripts) {
        if !scripts.iter().any(|known| is_same_kind(known, &script)) {
            scripts.push(script);
        }
    }

    let mut cell_deps: Vec<packed::CellDep> = Vec::new();
    for script in scripts.iter() {
        for cell_dep in registry.cell_deps_of(script)? {
            if !cell_deps.contains(&cell_dep) {
                cell_deps.push(cell_dep);
            }
        }
    }

    skeleton.cell_deps = cell_deps;
    Ok(())
}

pub async fn add_header_deps<C: CkbRpc>(
    skeleton: &mut TransactionSkeleton,
    headers: &mut HeaderResolver<C>,
) -> InnerResult<()> {
    if !skeleton.header_deps.is_empty() {
        return Err(CoreError::AlreadyPopulated("header_deps".to_string()));
    }

    let mut block_numbers = Vec::new();
    for input in skeleton.inputs.iter() {
        match input.dao_state {
            DaoState::NotDao => continue,
            DaoState::Deposit => block_numbers.push(input.block_number()?),
            DaoState::Withdrawal {
                deposit_block_number,
            } => {
                block_numbers.push(input.block_number()?);
                block_numbers.push(deposit_block_number);
            }
        }
    }

    let mut header_deps: Vec<packed::Byte32> = Vec::new();
    for block_number in block_numbers {
        let hash = headers.get_header(block_number).await?.hash();
        if !header_deps.contains(&hash) {
            header_deps.push(hash);
        }
    }

    skeleton.header_deps = header_deps;
    Ok(())
}
