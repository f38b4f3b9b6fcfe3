use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::instrument;

use crate::{
    error::{RPCRequestError, RpcError},
    traits::ChainRpc,
    types::{RpcRequest, RpcResponse, RpcTarget},
};

const CLIENT_NAME: &str = "chain rpc client";
const JSONRPC_VERSION: &str = "1.0";

/// Stateless JSON-RPC over HTTP POST with basic auth to `127.0.0.1:<port>`.
///
/// No retries and no timeout beyond the transport default: a hung node
/// stalls the caller until the connection gives up.
#[derive(Clone)]
pub struct HttpRpcClient {
    client: Client,
    next_id: Arc<AtomicU64>,
}

impl HttpRpcClient {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(Client::builder().build()?))
    }

    pub fn with_client(client: Client) -> Self {
        HttpRpcClient {
            client,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Send one request and hand back the raw HTTP response.
    pub async fn request(
        &self,
        target: &RpcTarget,
        method: &str,
        params: Vec<Value>,
    ) -> Result<reqwest::Response, RPCRequestError> {
        let body = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        self.client
            .post(target.url())
            .basic_auth(&target.user, Some(&target.password))
            .json(&body)
            .send()
            .await
            .map_err(|err| RPCRequestError::new(CLIENT_NAME, method.to_string(), err))
    }
}

#[async_trait]
impl ChainRpc for HttpRpcClient {
    #[instrument(target = "dcl-rpc-client", skip_all, err, fields(method = %method, port = target.port))]
    async fn call(
        &self,
        target: &RpcTarget,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, RpcError> {
        let response = self.request(target, method, params).await?;
        if response.status() != StatusCode::OK {
            return Err(RpcError::Status {
                method: method.to_string(),
                status: response.status().as_u16(),
            });
        }

        let response: RpcResponse = response.json().await.map_err(|err| RpcError::Decode {
            method: method.to_string(),
            source: err.into(),
        })?;
        if let Some(err) = response.error {
            return Err(RpcError::Remote {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            });
        }
        Ok(response.result)
    }
}
