use std::{collections::BTreeMap, sync::Arc};

use anyhow::{anyhow, bail, Result};
use dcl_config::{Catalog, ChainRuntimeConfig, ChainSetup};
use dcl_rpc_client::RpcTarget;
use parking_lot::Mutex;

use crate::{poller::PollerHandle, process::strategy_for, state::ChainState};

/// One supervised chain: immutable runtime config plus its lock-guarded state.
pub struct Chain {
    config: ChainRuntimeConfig,
    target: RpcTarget,
    state: Mutex<ChainState>,
    poller: Mutex<Option<PollerHandle>>,
}

impl Chain {
    pub fn new(config: ChainRuntimeConfig) -> Self {
        let state = ChainState::new(config.id.clone(), config.slot);
        Chain {
            target: RpcTarget::from(&config),
            config,
            state: Mutex::new(state),
            poller: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &ChainRuntimeConfig {
        &self.config
    }

    pub fn target(&self) -> &RpcTarget {
        &self.target
    }

    pub fn has_rpc(&self) -> bool {
        strategy_for(self.config.launch).has_rpc()
    }

    pub fn snapshot(&self) -> ChainState {
        self.state.lock().clone()
    }

    /// Run `f` with the state lock held. `f` must not block.
    pub fn update<R>(&self, f: impl FnOnce(&mut ChainState) -> R) -> R {
        f(&mut self.state.lock())
    }

    pub fn has_poller(&self) -> bool {
        self.poller.lock().is_some()
    }

    /// Install a poller unless one exists. Returns `false` when one already
    /// did, in which case `start` is not called.
    pub(crate) fn install_poller(&self, start: impl FnOnce() -> PollerHandle) -> bool {
        let mut poller = self.poller.lock();
        if poller.is_some() {
            return false;
        }
        *poller = Some(start());
        true
    }

    pub(crate) fn take_poller(&self) -> Option<PollerHandle> {
        self.poller.lock().take()
    }
}

/// Chains produced by one bootstrap run.
pub struct ChainTable {
    catalog: Catalog,
    root_id: String,
    chains: BTreeMap<String, Arc<Chain>>,
}

impl ChainTable {
    pub fn new(setup: ChainSetup) -> Result<Self> {
        let ChainSetup { catalog, chains } = setup;
        let mut roots = chains.iter().filter(|c| c.is_root).map(|c| c.id.clone());
        let root_id = roots
            .next()
            .ok_or_else(|| anyhow!("chain setup has no root chain"))?;
        if let Some(other) = roots.next() {
            bail!("chain setup has more than one root: {} and {}", root_id, other);
        }

        let chains = chains
            .into_iter()
            .map(|config| (config.id.clone(), Arc::new(Chain::new(config))))
            .collect();
        Ok(ChainTable {
            catalog,
            root_id,
            chains,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn root(&self) -> &Arc<Chain> {
        &self.chains[&self.root_id]
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Chain>> {
        self.chains.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Chain>> {
        self.chains.values()
    }

    pub fn dependents(&self) -> impl Iterator<Item = &Arc<Chain>> {
        self.chains.values().filter(|c| !c.config.is_root)
    }
}
