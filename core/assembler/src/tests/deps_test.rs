use super::*;
use crate::cell::{DaoState, InputCell};
use crate::deps::{add_cell_deps, add_header_deps};
use crate::error::CoreError;

use common::consts::ckb;
use common::utils::encode_dao_block_number;

fn classify(cells: Vec<DetailedCell>) -> Vec<InputCell> {
    let registry = registry();
    cells
        .into_iter()
        .map(|cell| InputCell::classify(cell, &registry))
        .collect()
}

fn dao_inputs() -> Vec<InputCell> {
    classify(vec![
        new_cell(
            secp_lock(ACCOUNT_ARGS),
            Some(dao_type()),
            ckb(200),
            vec![0u8; 8],
            Some(100),
        ),
        new_cell(
            secp_lock(ACCOUNT_ARGS),
            Some(dao_type()),
            ckb(200),
            encode_dao_block_number(100),
            Some(300),
        ),
    ])
}

#[test]
fn test_cell_deps_dedup() {
    let inputs = classify(vec![
        new_cell(secp_lock(ACCOUNT_ARGS), None, ckb(100), vec![], Some(1)),
        new_cell(secp_lock(OTHER_ARGS), None, ckb(100), vec![], Some(2)),
        new_cell(secp_lock(ACCOUNT_ARGS), None, ckb(100), vec![], Some(3)),
    ]);
    let outputs = vec![
        new_output(secp_lock(OTHER_ARGS), Some(dao_type()), ckb(150), vec![0u8; 8]),
        new_output(secp_lock(ACCOUNT_ARGS), Some(dao_type()), ckb(150), vec![0u8; 8]),
    ];
    let mut skeleton = TransactionSkeleton::new(inputs, outputs);

    add_cell_deps(&mut skeleton, &registry()).unwrap();
    assert_eq!(skeleton.cell_deps, vec![cell_dep(SECP256K1), cell_dep(DAO)]);

    assert_eq!(
        add_cell_deps(&mut skeleton, &registry()),
        Err(CoreError::AlreadyPopulated("cell_deps".to_string()))
    );
}

#[test]
fn test_cell_deps_independent_of_input_order() {
    let cells = vec![
        new_cell(secp_lock(ACCOUNT_ARGS), None, ckb(100), vec![], Some(1)),
        new_cell(script(PW_LOCK, &OTHER_ARGS), None, ckb(100), vec![], Some(2)),
        new_cell(script(MULTISIG, &[0x33; 20]), Some(dao_type()), ckb(100), vec![0u8; 8], Some(3)),
    ];
    let mut forward = TransactionSkeleton::new(classify(cells.clone()), vec![]);
    let mut backward =
        TransactionSkeleton::new(classify(cells.into_iter().rev().collect()), vec![]);

    add_cell_deps(&mut forward, &registry()).unwrap();
    add_cell_deps(&mut backward, &registry()).unwrap();

    assert_eq!(forward.cell_deps.len(), 4);
    assert_eq!(forward.cell_deps.len(), backward.cell_deps.len());
    assert!(forward
        .cell_deps
        .iter()
        .all(|dep| backward.cell_deps.contains(dep)));
}

#[test]
fn test_unresolved_script() {
    let unknown_lock = packed::ScriptBuilder::default()
        .code_hash(H256([0xee; 32]).pack())
        .build();
    let inputs = classify(vec![new_cell(unknown_lock, None, ckb(100), vec![], Some(1))]);
    let mut skeleton = TransactionSkeleton::new(inputs, vec![]);

    assert!(matches!(
        add_cell_deps(&mut skeleton, &registry()),
        Err(CoreError::UnresolvedScript(_))
    ));
}

#[tokio::test]
async fn test_header_deps_deposit_and_withdrawal() {
    let (deposit_header, withdrawing_header) = dao_headers();
    let mut skeleton = TransactionSkeleton::new(dao_inputs(), vec![]);
    let mut headers = resolver(
        MockCkbRpc::new()
            .header(deposit_header.clone())
            .header(withdrawing_header.clone()),
        vec![],
    );

    add_header_deps(&mut skeleton, &mut headers).await.unwrap();
    assert_eq!(
        skeleton.header_deps,
        vec![deposit_header.hash(), withdrawing_header.hash()]
    );

    assert_eq!(
        add_header_deps(&mut skeleton, &mut headers).await,
        Err(CoreError::AlreadyPopulated("header_deps".to_string()))
    );
}

#[tokio::test]
async fn test_header_deps_withdrawal_only() {
    let (deposit_header, withdrawing_header) = dao_headers();
    let inputs = dao_inputs().into_iter().skip(1).collect();
    let mut skeleton = TransactionSkeleton::new(inputs, vec![]);
    let mut headers = resolver(
        MockCkbRpc::new(),
        vec![deposit_header.clone(), withdrawing_header.clone()],
    );

    add_header_deps(&mut skeleton, &mut headers).await.unwrap();
    assert_eq!(
        skeleton.header_deps,
        vec![withdrawing_header.hash(), deposit_header.hash()]
    );
}

#[tokio::test]
async fn test_header_deps_ignore_ordinary_cells() {
    let inputs = classify(vec![new_cell(
        secp_lock(ACCOUNT_ARGS),
        None,
        ckb(100),
        vec![],
        Some(1),
    )]);
    let mut skeleton = TransactionSkeleton::new(inputs, vec![]);
    let mut headers = resolver(MockCkbRpc::new(), vec![]);

    add_header_deps(&mut skeleton, &mut headers).await.unwrap();
    assert!(skeleton.header_deps.is_empty());
}

#[tokio::test]
async fn test_header_deps_missing_block_number() {
    let cell = new_cell(
        secp_lock(ACCOUNT_ARGS),
        Some(dao_type()),
        ckb(200),
        vec![0u8; 8],
        None,
    );
    let input = InputCell {
        cell,
        dao_state: DaoState::Deposit,
    };
    let mut skeleton = TransactionSkeleton::new(vec![input], vec![]);
    let mut headers = resolver(MockCkbRpc::new(), vec![]);

    assert!(matches!(
        add_header_deps(&mut skeleton, &mut headers).await,
        Err(CoreError::MissingBlockNumber(_))
    ));
}

#[tokio::test]
async fn test_header_resolver_cache() {
    let (deposit_header, _) = dao_headers();
    let client = Arc::new(MockCkbRpc::new().header(deposit_header.clone()));
    let mut headers = HeaderResolver::new(Arc::clone(&client));

    assert_eq!(headers.get_header(100).await.unwrap().hash(), deposit_header.hash());
    assert_eq!(headers.get_header(100).await.unwrap().hash(), deposit_header.hash());
    assert_eq!(client.header_calls(), 1);
    assert!(headers.cached(100).is_some());

    assert!(matches!(
        headers.get_header(101).await,
        Err(CoreError::HeaderNotFound(101))
    ));
}
