use crate::{error::ClientError, CkbRpc};

use common::{async_trait, AssemblerError, Result};

use ckb_jsonrpc_types::{
    BlockView, CellWithStatus, HeaderView, OutPoint, Transaction, TransactionProof, TxStatus,
    Uint64,
};
use ckb_types::{core::BlockNumber, H256};
use jsonrpc_core::types::{Call, Id, MethodCall, Output, Params, Request, Value, Version};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const GET_HEADER_BY_NUMBER_REQ: &str = "get_header_by_number";
const GET_LIVE_CELL_REQ: &str = "get_live_cell";
const GET_TRANSACTION_PROOF_REQ: &str = "get_transaction_proof";
const GET_BLOCK_REQ: &str = "get_block";
const SEND_TRANSACTION_REQ: &str = "send_transaction";
const GET_TRANSACTION_REQ: &str = "get_transaction";

// skip the node's output script whitelist, the assembler already balanced
// the transaction and picks its own scripts
const OUTPUTS_VALIDATOR: &str = "passthrough";

#[derive(Deserialize)]
struct TransactionStatusView {
    tx_status: TxStatus,
}

#[derive(Clone, Debug)]
pub struct CkbRpcClient {
    ckb_uri: String,
    client: Client,
    req_builder: RequestBuilder,
}

impl CkbRpcClient {
    pub fn new(uri: String) -> Self {
        CkbRpcClient {
            ckb_uri: uri,
            client: Client::new(),
            req_builder: RequestBuilder::new(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.ckb_uri
    }

    async fn call<P: Serialize, T: DeserializeOwned>(&self, method: &str, params: P) -> Result<T> {
        let (id, request) = self.req_builder.request(method.to_string(), params)?;
        rpc_exec(&self.client, self.ckb_uri.as_str(), &request, id).await
    }
}

#[async_trait]
impl CkbRpc for CkbRpcClient {
    async fn get_header_by_number(&self, block_number: BlockNumber) -> Result<Option<HeaderView>> {
        self.call(GET_HEADER_BY_NUMBER_REQ, (Uint64::from(block_number),))
            .await
    }

    async fn get_live_cell(&self, out_point: OutPoint, with_data: bool) -> Result<CellWithStatus> {
        self.call(GET_LIVE_CELL_REQ, (out_point, with_data)).await
    }

    async fn get_transaction_proof(&self, tx_hashes: Vec<H256>) -> Result<TransactionProof> {
        self.call(GET_TRANSACTION_PROOF_REQ, (tx_hashes,)).await
    }

    async fn get_block(&self, block_hash: H256) -> Result<Option<BlockView>> {
        self.call(GET_BLOCK_REQ, (block_hash,)).await
    }

    async fn send_transaction(&self, tx: Transaction) -> Result<H256> {
        self.call(SEND_TRANSACTION_REQ, (tx, OUTPUTS_VALIDATOR))
            .await
    }

    async fn get_transaction_status(&self, tx_hash: H256) -> Result<Option<TxStatus>> {
        let view: Option<TransactionStatusView> =
            self.call(GET_TRANSACTION_REQ, (tx_hash,)).await?;
        Ok(view.map(|v| v.tx_status))
    }
}

#[derive(Debug)]
struct RequestBuilder {
    id: Arc<AtomicU64>,
}

impl Clone for RequestBuilder {
    fn clone(&self) -> Self {
        let id_clone = Arc::clone(&self.id);
        RequestBuilder { id: id_clone }
    }
}

impl RequestBuilder {
    fn new() -> Self {
        RequestBuilder {
            id: Arc::new(AtomicU64::default()),
        }
    }

    fn next_id(&self) -> Id {
        Id::Num(self.id.fetch_add(1, Ordering::SeqCst))
    }

    fn request<T: Serialize>(&self, method: String, params: T) -> Result<(Id, Request)> {
        let id = self.next_id();
        let request = Request::Single(Call::MethodCall(MethodCall {
            jsonrpc: Some(Version::V2),
            method,
            params: parse_params(&params)?,
            id: id.clone(),
        }));

        Ok((id, request))
    }
}

async fn rpc_exec<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    request: &Request,
    id: Id,
) -> Result<T> {
    log::debug!(
        "sending request {:?}, id {:?}",
        serde_json::to_string(&request)?,
        id
    );

    let response = client
        .post(url)
        .json(request)
        .send()
        .await
        .map_err(|e| AssemblerError::client(ClientError::ClientError(e.to_string())))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AssemblerError::client(ClientError::ClientError(format!(
            "response status code is not success: {}",
            status
        )))
        .into());
    }

    let output: Output = response
        .json()
        .await
        .map_err(|e| AssemblerError::client(ClientError::DecodeJson(e.to_string())))?;

    match output {
        Output::Success(success) => serde_json::from_value(success.result)
            .map_err(|e| AssemblerError::client(ClientError::DecodeJson(e.to_string())).into()),
        Output::Failure(failure) => Err(AssemblerError::client(ClientError::RpcFailure(
            failure.error.code.code(),
            failure.error.message,
        ))
        .into()),
    }
}

fn parse_params<T: Serialize>(params: &T) -> Result<Params> {
    let json = serde_json::to_value(params)
        .map_err(|e| AssemblerError::client(ClientError::InvalidRpcParams(e.to_string())))?;

    match json {
        Value::Array(vec) => Ok(Params::Array(vec)),
        Value::Object(map) => Ok(Params::Map(map)),
        Value::Null => Ok(Params::None),
        _ => Err(AssemblerError::client(ClientError::InvalidRpcParams("ckb rpc".to_string())).into()),
    }
}
