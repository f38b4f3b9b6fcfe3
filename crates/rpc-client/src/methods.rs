use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{ChainRpc, RpcError, RpcTarget, SidechainInfo};

pub const METHOD_STOP: &str = "stop";
pub const METHOD_GET_BLOCK_COUNT: &str = "getblockcount";
pub const METHOD_GET_BALANCE: &str = "getbalance";
pub const METHOD_LIST_ACTIVE_SIDECHAINS: &str = "listactivesidechains";
pub const METHOD_CREATE_SIDECHAIN_PROPOSAL: &str = "createsidechainproposal";
pub const METHOD_GENERATE: &str = "generate";
pub const METHOD_CREATE_WALLET: &str = "createwallet";

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|err| RpcError::Decode {
        method: method.to_string(),
        source: err.into(),
    })
}

/// Typed wrappers for the methods the launcher uses.
#[async_trait]
pub trait ChainRpcExt: ChainRpc {
    async fn stop(&self, target: &RpcTarget) -> Result<(), RpcError> {
        self.call(target, METHOD_STOP, vec![]).await.map(|_| ())
    }

    async fn get_block_count(&self, target: &RpcTarget) -> Result<u64, RpcError> {
        let value = self.call(target, METHOD_GET_BLOCK_COUNT, vec![]).await?;
        decode(METHOD_GET_BLOCK_COUNT, value)
    }

    async fn get_balance(&self, target: &RpcTarget) -> Result<f64, RpcError> {
        let value = self.call(target, METHOD_GET_BALANCE, vec![]).await?;
        decode(METHOD_GET_BALANCE, value)
    }

    async fn list_active_sidechains(
        &self,
        target: &RpcTarget,
    ) -> Result<Vec<SidechainInfo>, RpcError> {
        let value = self
            .call(target, METHOD_LIST_ACTIVE_SIDECHAINS, vec![])
            .await?;
        decode(METHOD_LIST_ACTIVE_SIDECHAINS, value)
    }

    async fn create_sidechain_proposal(
        &self,
        target: &RpcTarget,
        slot: u32,
        title: &str,
    ) -> Result<Value, RpcError> {
        self.call(
            target,
            METHOD_CREATE_SIDECHAIN_PROPOSAL,
            vec![json!(slot), json!(title)],
        )
        .await
    }

    async fn generate(&self, target: &RpcTarget, blocks: u32) -> Result<Value, RpcError> {
        self.call(target, METHOD_GENERATE, vec![json!(blocks)])
            .await
    }

    /// `createwallet name disable_private_keys blank passphrase avoid_reuse descriptors load_on_startup external_signer`
    async fn create_wallet(&self, target: &RpcTarget, name: &str) -> Result<Value, RpcError> {
        let params = vec![
            json!(name),
            json!(false),
            json!(false),
            json!(""),
            json!(true),
            json!(false),
            json!(true),
            json!(false),
        ];
        self.call(target, METHOD_CREATE_WALLET, params).await
    }
}

impl<T: ChainRpc + ?Sized> ChainRpcExt for T {}
