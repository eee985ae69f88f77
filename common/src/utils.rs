use crate::consts::DAO_DATA_LEN;

use ckb_types::packed;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptInfo {
    pub script: packed::Script,
    pub cell_dep: packed::CellDep,
}

pub fn to_fixed_array<const LEN: usize>(input: &[u8]) -> [u8; LEN] {
    assert_eq!(input.len(), LEN);
    let mut list = [0; LEN];
    list.copy_from_slice(input);
    list
}

pub fn is_dao_deposit_data(data: &[u8]) -> bool {
    data.len() == DAO_DATA_LEN && data.iter().all(|b| *b == 0)
}

/// Returns the deposit block number stored in a withdrawing cell, `None` for
/// a deposit cell or a malformed payload.
pub fn decode_dao_block_number(data: &[u8]) -> Option<u64> {
    if data.len() != DAO_DATA_LEN || is_dao_deposit_data(data) {
        return None;
    }
    Some(u64::from_le_bytes(to_fixed_array(&data[0..8])))
}

pub fn encode_dao_block_number(block_number: u64) -> Vec<u8> {
    block_number.to_le_bytes().to_vec()
}

pub fn find<T: Eq>(key: &T, from: &[T]) -> Option<usize> {
    from.iter().position(|item| item == key)
}
