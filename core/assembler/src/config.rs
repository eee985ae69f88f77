use crate::error::CoreError;
use crate::registry::ScriptRegistry;
use crate::witness::WitnessPolicy;
use crate::InnerResult;

use common::anyhow::Result;
use common::consts::{DEFAULT_FEE_RATE, DEFAULT_TX_TIMEOUT_SECS};
use common::utils::ScriptInfo;
use common::PW_LOCK;
use common_logger::LoggerOptions;

use ckb_jsonrpc_types::{CellDep, Script};
use serde::{de::DeserializeOwned, Deserialize};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fs::File, io::Read};

const CONSOLE: &str = "console";
const LOG_FILE_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;

pub fn parse<T: DeserializeOwned>(name: impl AsRef<Path>) -> Result<T> {
    parse_reader(&mut File::open(name)?)
}

#[derive(Deserialize, Default, Debug)]
pub struct AssemblerConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_path")]
    pub log_path: String,

    #[serde(default = "default_ckb_uri")]
    pub ckb_uri: String,

    #[serde(default = "default_fee_rate")]
    pub fee_rate: u64,

    #[serde(default = "default_tx_timeout_secs")]
    pub tx_timeout_secs: u64,

    #[serde(default = "default_pad_all_witness_scripts")]
    pub pad_all_witness_scripts: Vec<String>,

    #[serde(default)]
    pub modules_log_level: HashMap<String, String>,

    pub scripts: Vec<DeployedScript>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DeployedScript {
    pub name: String,
    pub script: String,
    pub cell_dep: String,
}

impl AssemblerConfig {
    pub fn check(&mut self) {
        self.build_uri();
    }

    pub fn to_script_registry(&self) -> InnerResult<ScriptRegistry> {
        let mut registry = ScriptRegistry::default();
        for deployed in self.scripts.iter() {
            let script: Script = serde_json::from_str(&deployed.script).map_err(|e| {
                CoreError::InvalidConfig(format!("decode {} script error {}", deployed.name, e))
            })?;
            let cell_dep: CellDep = serde_json::from_str(&deployed.cell_dep).map_err(|e| {
                CoreError::InvalidConfig(format!("decode {} cell dep error {}", deployed.name, e))
            })?;

            registry.insert(
                &deployed.name,
                ScriptInfo {
                    script: script.into(),
                    cell_dep: cell_dep.into(),
                },
            );
        }
        Ok(registry)
    }

    pub fn witness_policy(&self) -> WitnessPolicy {
        WitnessPolicy::new(self.pad_all_witness_scripts.iter().cloned())
    }

    pub fn init_logger(&self) {
        let log_to_file = self.log_path != CONSOLE;
        common_logger::init(LoggerOptions {
            filter: self.log_level.clone(),
            log_to_console: true,
            console_show_file_and_line: false,
            log_to_file,
            log_path: PathBuf::from(&self.log_path),
            file_size_limit: LOG_FILE_SIZE_LIMIT,
            modules_level: self.modules_log_level.clone(),
        });
    }

    fn build_uri(&mut self) {
        if !self.ckb_uri.starts_with("http") {
            let uri = self.ckb_uri.clone();
            self.ckb_uri = format!("http://{}", uri);
        }
    }
}

fn default_log_level() -> String {
    String::from("INFO")
}

fn default_log_path() -> String {
    String::from(CONSOLE)
}

fn default_ckb_uri() -> String {
    String::from("http://127.0.0.1:8114")
}

fn default_fee_rate() -> u64 {
    DEFAULT_FEE_RATE
}

fn default_tx_timeout_secs() -> u64 {
    DEFAULT_TX_TIMEOUT_SECS
}

fn default_pad_all_witness_scripts() -> Vec<String> {
    vec![PW_LOCK.to_string()]
}

fn parse_reader<R: Read, T: DeserializeOwned>(r: &mut R) -> Result<T> {
    let mut buf = Vec::new();
    r.read_to_end(&mut buf)?;
    Ok(toml::from_slice(&buf)?)
}
