use common::derive_more::Display;
use common::ErrorCode;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Display, Hash, PartialEq, Eq)]
pub enum ClientError {
    #[display(fmt = "Ckb client error {}", _0)]
    ClientError(String),

    #[display(fmt = "Invalid rpc params {}", _0)]
    InvalidRpcParams(String),

    #[display(fmt = "Decode json error {}", _0)]
    DecodeJson(String),

    #[display(fmt = "Ckb rpc error {}: {}", _0, _1)]
    RpcFailure(i64, String),
}

impl std::error::Error for ClientError {}

impl ErrorCode for ClientError {
    fn err_code(&self) -> i32 {
        match self {
            ClientError::ClientError(_) => -12000,
            ClientError::InvalidRpcParams(_) => -12001,
            ClientError::DecodeJson(_) => -12002,
            ClientError::RpcFailure(_, _) => -12003,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
