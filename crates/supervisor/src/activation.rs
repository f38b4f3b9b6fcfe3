use std::sync::Arc;

use dcl_config::ChainRuntimeConfig;
use dcl_rpc_client::{ChainRpc, ChainRpcExt, RpcTarget};

/// Blocks mined after a proposal so it clears the activation threshold.
pub const ACTIVATION_BLOCKS: u32 = 201;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The root chain lists the chain as active.
    Confirmed,
    /// Proposal accepted but the chain is not (yet) listed as active.
    Uncertain,
    /// The proposal was never submitted.
    Failed,
}

/// Registers dependent chains with the root chain.
pub struct ActivationCoordinator {
    rpc: Arc<dyn ChainRpc>,
    root: RpcTarget,
}

impl ActivationCoordinator {
    pub fn new(rpc: Arc<dyn ChainRpc>, root: RpcTarget) -> Self {
        ActivationCoordinator { rpc, root }
    }

    /// Any failure to ask the root chain counts as "needs activation".
    pub async fn needs_activation(&self, chain_id: &str) -> bool {
        match self.is_active(chain_id).await {
            Ok(active) => !active,
            Err(err) => {
                log::warn!("[{}] list active sidechains: {}", chain_id, err);
                true
            }
        }
    }

    async fn is_active(&self, chain_id: &str) -> Result<bool, dcl_rpc_client::RpcError> {
        let sidechains = self.rpc.list_active_sidechains(&self.root).await?;
        Ok(sidechains.iter().any(|s| s.title == chain_id))
    }

    pub async fn create_proposal(&self, chain: &ChainRuntimeConfig) -> ActivationOutcome {
        let slot = match chain.slot {
            Some(slot) => slot,
            None => {
                log::error!("[{}] has no registration slot", chain.id);
                return ActivationOutcome::Failed;
            }
        };

        if let Err(err) = self
            .rpc
            .create_sidechain_proposal(&self.root, slot, &chain.id)
            .await
        {
            log::error!("[{}] create sidechain proposal: {}", chain.id, err);
            return ActivationOutcome::Failed;
        }
        log::info!("[{}] proposed in slot {}", chain.id, slot);

        if let Err(err) = self.rpc.generate(&self.root, ACTIVATION_BLOCKS).await {
            log::warn!("[{}] generate {} blocks: {}", chain.id, ACTIVATION_BLOCKS, err);
            return ActivationOutcome::Uncertain;
        }

        match self.is_active(&chain.id).await {
            Ok(true) => ActivationOutcome::Confirmed,
            Ok(false) => ActivationOutcome::Uncertain,
            Err(err) => {
                log::warn!("[{}] confirm activation: {}", chain.id, err);
                ActivationOutcome::Uncertain
            }
        }
    }
}
