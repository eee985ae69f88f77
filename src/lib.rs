pub use common::{DetailedCell, ErrorCode};
pub use core_assembler::*;
pub use core_ckb_client::{CkbRpc, CkbRpcClient, ClientError};

use common::{anyhow::Result, AssemblerError};
use core_assembler::config::parse;

use ckb_types::{packed, H256};
use log::info;

use std::path::Path;
use std::sync::Arc;

/// Node client, deployed scripts and build settings of one network, the
/// factory of transaction builders.
#[derive(Clone)]
pub struct Assembler {
    ckb_client: Arc<CkbRpcClient>,
    registry: Arc<ScriptRegistry>,
    witness_policy: WitnessPolicy,
    fee_rate: u64,
    tx_timeout_secs: u64,
}

impl Assembler {
    pub fn new(config: &AssemblerConfig) -> Result<Self> {
        let registry = config
            .to_script_registry()
            .map_err(AssemblerError::config)?;
        let ckb_client = CkbRpcClient::new(config.ckb_uri.clone());

        info!(
            "assembler connects to {}, scripts {:?}",
            ckb_client.uri(),
            registry.script_names()
        );

        Ok(Assembler {
            ckb_client: Arc::new(ckb_client),
            registry: Arc::new(registry),
            witness_policy: config.witness_policy(),
            fee_rate: config.fee_rate,
            tx_timeout_secs: config.tx_timeout_secs,
        })
    }

    /// Loads a TOML config, sets up logging and connects.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut config: AssemblerConfig = parse(path)?;
        config.check();
        config.init_logger();
        Assembler::new(&config)
    }

    pub fn builder(
        &self,
        account_lock: packed::Script,
        signer: Arc<dyn Signer>,
    ) -> TransactionBuilder<CkbRpcClient> {
        TransactionBuilder::new(
            account_lock,
            Arc::clone(&self.ckb_client),
            signer,
            Arc::clone(&self.registry),
        )
        .with_fee_rate(self.fee_rate)
        .with_witness_policy(self.witness_policy.clone())
    }

    /// Builds, signs and submits with the configured timeout.
    pub async fn build_and_send(
        &self,
        builder: &mut TransactionBuilder<CkbRpcClient>,
    ) -> Result<H256> {
        let tx_hash = builder
            .build_and_send(self.tx_timeout_secs)
            .await
            .map_err(AssemblerError::builder)?;
        Ok(tx_hash)
    }

    pub async fn fetch_live_cell(&self, out_point: &packed::OutPoint) -> Result<DetailedCell> {
        let cell = fetch_live_cell(self.ckb_client.as_ref(), out_point)
            .await
            .map_err(AssemblerError::client)?;
        Ok(cell)
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn tx_timeout_secs(&self) -> u64 {
        self.tx_timeout_secs
    }
}
