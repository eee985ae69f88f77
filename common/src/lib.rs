pub mod consts;
pub mod utils;

pub use {anyhow, async_trait::async_trait, derive_more};

use ckb_types::core::BlockNumber;
use ckb_types::{bytes::Bytes, packed, H256};
use derive_more::Display;

use std::fmt::{Debug, Display};

pub type Result<T> = anyhow::Result<T>;

// built-in script names, keys of the script registry
pub const SECP256K1: &str = "SECP256K1_BLAKE160";
pub const MULTISIG: &str = "SECP256K1_BLAKE160_MULTISIG";
pub const DAO: &str = "DAO";
pub const PW_LOCK: &str = "PW_LOCK";

#[derive(Clone, Debug, PartialEq, Eq)]
enum ErrorKind {
    Builder,
    Client,
    Config,
}

#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display(fmt = "Assembler {:?} Error {:?}", kind, error)]
pub struct AssemblerError<T> {
    kind: ErrorKind,
    error: T,
}

impl<T: Debug + Display> std::error::Error for AssemblerError<T> {}

impl<T: Debug + Display> AssemblerError<T> {
    pub fn builder(error: T) -> Self {
        Self::new(ErrorKind::Builder, error)
    }

    pub fn client(error: T) -> Self {
        Self::new(ErrorKind::Client, error)
    }

    pub fn config(error: T) -> Self {
        Self::new(ErrorKind::Config, error)
    }

    pub fn inner(&self) -> &T {
        &self.error
    }

    fn new(kind: ErrorKind, error: T) -> Self {
        AssemblerError { kind, error }
    }
}

/// Stable numeric code plus human readable message of an error, shared by
/// every error enum of the workspace.
pub trait ErrorCode {
    fn err_code(&self) -> i32;
    fn message(&self) -> String;
}

/// A cell observed on chain together with the block that created it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DetailedCell {
    pub out_point: packed::OutPoint,
    pub cell_output: packed::CellOutput,
    pub cell_data: Bytes,
    pub block_number: Option<BlockNumber>,
    pub block_hash: Option<H256>,
}

impl DetailedCell {
    pub fn new(out_point: packed::OutPoint, cell_output: packed::CellOutput, cell_data: Bytes) -> Self {
        DetailedCell {
            out_point,
            cell_output,
            cell_data,
            block_number: None,
            block_hash: None,
        }
    }

    pub fn with_block(mut self, block_number: BlockNumber, block_hash: H256) -> Self {
        self.block_number = Some(block_number);
        self.block_hash = Some(block_hash);
        self
    }
}
