use async_trait::async_trait;
use serde_json::Value;

use crate::{RpcError, RpcTarget};

/// One JSON-RPC request to a local chain node.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Returns the `result` member of a successful response.
    async fn call(
        &self,
        target: &RpcTarget,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, RpcError>;
}
