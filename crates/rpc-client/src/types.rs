use dcl_config::ChainRuntimeConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RPC_HOST: &str = "127.0.0.1";

/// Where and how to reach a chain's RPC endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcTarget {
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl RpcTarget {
    pub fn new(port: u16, user: impl Into<String>, password: impl Into<String>) -> Self {
        RpcTarget {
            port,
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}/", RPC_HOST, self.port)
    }
}

impl From<&ChainRuntimeConfig> for RpcTarget {
    fn from(config: &ChainRuntimeConfig) -> Self {
        RpcTarget::new(
            config.rpc_port,
            config.rpc_user.clone(),
            config.rpc_password.clone(),
        )
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoteError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Entry of `listactivesidechains`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidechainInfo {
    pub title: String,
    #[serde(default, rename = "nversion")]
    pub version: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "hashID1")]
    pub hash_id1: Option<String>,
    #[serde(default, rename = "hashID2")]
    pub hash_id2: Option<String>,
}
