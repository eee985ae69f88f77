#![allow(clippy::mutable_key_type)]

pub mod builder;
pub mod capacity;
pub mod cell;
pub mod config;
pub mod deps;
pub mod epoch;
pub mod error;
pub mod header;
pub mod registry;
pub mod since;
pub mod skeleton;
pub mod submit;
pub mod witness;

#[cfg(test)]
mod tests;

pub use builder::{PreBuildHook, Position, Signer, Source, TransactionBuilder};
pub use cell::{fetch_live_cell, DaoState, InputCell};
pub use config::AssemblerConfig;
pub use epoch::Epoch;
pub use error::CoreError;
pub use header::HeaderResolver;
pub use registry::ScriptRegistry;
pub use skeleton::{CellWithData, TransactionSkeleton};
pub use submit::TxState;
pub use witness::WitnessPolicy;

pub type InnerResult<T> = Result<T, CoreError>;
