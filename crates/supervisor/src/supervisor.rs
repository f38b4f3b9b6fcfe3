use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use dcl_config::{Bootstrap, Catalog, ChainRuntimeConfig, LauncherConfig};
use dcl_rpc_client::{ChainRpc, ChainRpcExt};
use dcl_utils::fs::{is_dir_empty, remove_dir_if_exists};
use parking_lot::RwLock;
use tracing::instrument;

use crate::{
    activation::{ActivationCoordinator, ActivationOutcome},
    chain::{Chain, ChainTable},
    error::{LaunchError, StopError},
    notify::RefreshHook,
    poller::ChainPoller,
    process::{strategy_for, ProcessControl, Termination},
    state::ChainState,
};

const WALLET_NAME: &str = "wallet";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Wait between a submitted activation proposal and the launch.
    pub activation_delay: Duration,
    /// Wait between spawning a wallet-bearing chain and creating its wallet.
    pub wallet_bootstrap_delay: Duration,
}

impl From<&LauncherConfig> for SupervisorOptions {
    fn from(config: &LauncherConfig) -> Self {
        SupervisorOptions {
            activation_delay: config.activation_delay(),
            wallet_bootstrap_delay: config.wallet_bootstrap_delay(),
        }
    }
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        SupervisorOptions::from(&LauncherConfig::default())
    }
}

struct Inner {
    rpc: Arc<dyn ChainRpc>,
    process: Arc<dyn ProcessControl>,
    refresh: Arc<dyn RefreshHook>,
    bootstrap: Arc<dyn Bootstrap>,
    options: SupervisorOptions,
    table: RwLock<Arc<ChainTable>>,
}

/// Application-wide chain supervisor. Cheap to clone.
#[derive(Clone)]
pub struct Supervisor {
    inner: Arc<Inner>,
}

impl Supervisor {
    /// Runs the bootstrap once. Bootstrap failure is fatal to the caller.
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        process: Arc<dyn ProcessControl>,
        refresh: Arc<dyn RefreshHook>,
        bootstrap: Arc<dyn Bootstrap>,
        options: SupervisorOptions,
    ) -> Result<Self> {
        let table = ChainTable::new(bootstrap.bootstrap()?)?;
        let inner = Inner {
            rpc,
            process,
            refresh,
            bootstrap,
            options,
            table: RwLock::new(Arc::new(table)),
        };
        Ok(Supervisor {
            inner: Arc::new(inner),
        })
    }

    fn table(&self) -> Arc<ChainTable> {
        Arc::clone(&self.inner.table.read())
    }

    pub fn chain(&self, id: &str) -> Option<Arc<Chain>> {
        self.table().get(id).cloned()
    }

    pub fn root_id(&self) -> String {
        self.table().root_id().to_string()
    }

    pub fn catalog(&self) -> Catalog {
        self.table().catalog().clone()
    }

    pub fn config(&self, id: &str) -> Option<ChainRuntimeConfig> {
        self.chain(id).map(|chain| chain.config().clone())
    }

    pub fn state(&self, id: &str) -> Option<ChainState> {
        self.chain(id).map(|chain| chain.snapshot())
    }

    /// Snapshot of every chain, ordered by id.
    pub fn states(&self) -> Vec<ChainState> {
        self.table().iter().map(|chain| chain.snapshot()).collect()
    }

    fn poller(&self, chain: &Arc<Chain>) -> ChainPoller {
        ChainPoller::new(
            Arc::clone(chain),
            Arc::clone(&self.inner.rpc),
            Arc::clone(&self.inner.process),
            Arc::clone(&self.inner.refresh),
        )
    }

    /// Start a chain's process and its poller.
    ///
    /// With a poller already installed, only a dead process is respawned;
    /// neither the state nor the poller is touched.
    #[instrument(target = "dcl-supervisor", skip(self))]
    pub async fn launch(&self, id: &str) -> Result<(), LaunchError> {
        let table = self.table();
        let chain = table
            .get(id)
            .cloned()
            .ok_or_else(|| LaunchError::UnknownChain(id.to_string()))?;
        let config = chain.config();

        let alive = self.inner.process.is_running(id);
        if alive && chain.has_poller() {
            log::info!("[{}] already running", id);
            return Ok(());
        }

        if !alive {
            let command = strategy_for(config.launch).command(config, table.root().config());
            let pid = self
                .inner
                .process
                .spawn(id, &command)
                .await
                .map_err(|err| LaunchError::LaunchFailed {
                    chain: id.to_string(),
                    reason: format!("spawn {}: {}", command.program.display(), err),
                })?;
            log::info!("[{}] started with pid {}", id, pid);

            if config.create_wallet && needs_wallet(&config.wallets_dir()) {
                self.schedule_wallet_creation(Arc::clone(&chain));
            }
        }

        let installed = chain.install_poller(|| {
            chain.update(|state| state.mark_waiting());
            self.poller(&chain).spawn()
        });
        if installed {
            self.inner.refresh.refresh();
        }
        Ok(())
    }

    fn schedule_wallet_creation(&self, chain: Arc<Chain>) {
        let rpc = Arc::clone(&self.inner.rpc);
        let delay = self.inner.options.wallet_bootstrap_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match rpc.create_wallet(chain.target(), WALLET_NAME).await {
                Ok(_) => log::info!("[{}] created wallet {}", chain.id(), WALLET_NAME),
                Err(err) => log::warn!("[{}] create wallet: {}", chain.id(), err),
            }
        });
    }

    /// Stop a chain. Stopping the root chain stops every dependent first.
    #[instrument(target = "dcl-supervisor", skip(self))]
    pub async fn stop(&self, id: &str) -> Result<(), StopError> {
        let table = self.table();
        let chain = table
            .get(id)
            .cloned()
            .ok_or_else(|| StopError::UnknownChain(id.to_string()))?;

        if chain.config().is_root {
            for dependent in table.dependents() {
                if let Err(err) = self.stop_one(dependent).await {
                    log::error!("{}", err);
                }
            }
        }
        self.stop_one(&chain).await
    }

    async fn stop_one(&self, chain: &Chain) -> Result<(), StopError> {
        if chain.has_rpc() {
            // Best effort, the kill below does the real work.
            if let Err(err) = self.inner.rpc.stop(chain.target()).await {
                log::debug!("[{}] rpc stop: {}", chain.id(), err);
            }
        }

        let termination = self
            .inner
            .process
            .terminate(chain.id(), &chain.config().bin_name)
            .await
            .map_err(|source| StopError::Terminate {
                chain: chain.id().to_string(),
                source,
            })?;
        if termination == Termination::Terminated {
            log::info!("[{}] stopped", chain.id());
        }

        if chain.update(|state| state.mark_stopped()) {
            self.inner.refresh.refresh();
        }
        Ok(())
    }

    /// Toggle automine on the root chain.
    pub fn set_automine(&self, enabled: bool) {
        let table = self.table();
        let changed = table.root().update(|state| {
            let changed = state.automine != enabled;
            state.automine = enabled;
            changed
        });
        if changed {
            self.inner.refresh.refresh();
        }
    }

    /// Query a chain's balance on demand. Returns whether it changed.
    pub async fn refresh_balance(&self, id: &str) -> Result<bool> {
        let chain = self
            .chain(id)
            .ok_or_else(|| anyhow!("unknown chain {}", id))?;
        let balance = match self.inner.rpc.get_balance(chain.target()).await {
            Ok(balance) => Some(balance),
            Err(err) => {
                log::debug!("[{}] balance: {}", id, err);
                None
            }
        };
        let changed = chain.update(|state| state.apply_balance(balance));
        if changed {
            self.inner.refresh.refresh();
        }
        Ok(changed)
    }

    /// Run one poll for `id` outside its periodic task.
    pub async fn poll_once(&self, id: &str) -> Result<bool> {
        let chain = self
            .chain(id)
            .ok_or_else(|| anyhow!("unknown chain {}", id))?;
        Ok(self.poller(&chain).tick().await)
    }

    pub fn activation(&self) -> ActivationCoordinator {
        let table = self.table();
        ActivationCoordinator::new(Arc::clone(&self.inner.rpc), table.root().target().clone())
    }

    /// Register a dependent chain with the root chain if needed, then launch it.
    #[instrument(target = "dcl-supervisor", skip(self))]
    pub async fn activate_and_launch(&self, id: &str) -> Result<(), LaunchError> {
        let chain = self
            .chain(id)
            .ok_or_else(|| LaunchError::UnknownChain(id.to_string()))?;

        if !chain.config().is_root {
            let coordinator = self.activation();
            if coordinator.needs_activation(id).await {
                match coordinator.create_proposal(chain.config()).await {
                    ActivationOutcome::Confirmed => log::info!("[{}] activated", id),
                    ActivationOutcome::Uncertain => {
                        log::warn!("[{}] activation not confirmed, launching anyway", id)
                    }
                    ActivationOutcome::Failed => {
                        return Err(LaunchError::ActivationFailed {
                            chain: id.to_string(),
                        })
                    }
                }
                tokio::time::sleep(self.inner.options.activation_delay).await;
            }
        }
        self.launch(id).await
    }

    /// Stop everything, wipe every chain's directory and the launcher's own,
    /// cancel all pollers and bootstrap from scratch.
    #[instrument(target = "dcl-supervisor", skip(self))]
    pub async fn reset(&self) -> Result<()> {
        let table = self.table();
        if let Err(err) = self.stop(table.root_id()).await {
            log::error!("reset: {}", err);
        }

        let home = self.inner.bootstrap.home_dir();
        let dirs = std::iter::once(self.inner.bootstrap.launcher_dir())
            .chain(std::iter::once(table.root().config().conf_dir.clone()))
            .chain(table.dependents().map(|chain| chain.config().conf_dir.clone()));
        for dir in dirs {
            if contains_dir(&dir, &home) {
                log::error!("reset: refusing to remove {}", dir.display());
                continue;
            }
            match remove_dir_if_exists(&dir) {
                Ok(()) => log::info!("Removed {}", dir.display()),
                Err(err) => log::error!("remove {}: {}", dir.display(), err),
            }
        }

        cancel_pollers(&table);

        let fresh = ChainTable::new(self.inner.bootstrap.bootstrap()?)?;
        *self.inner.table.write() = Arc::new(fresh);
        self.inner.refresh.refresh();
        Ok(())
    }

    /// Cancel every poller without touching processes or state.
    pub fn shutdown_pollers(&self) {
        cancel_pollers(&self.table());
    }
}

fn cancel_pollers(table: &ChainTable) {
    for chain in table.iter() {
        if let Some(poller) = chain.take_poller() {
            poller.cancel();
        }
    }
}

/// Whether removing `dir` would also remove `target`. Paths are compared
/// canonicalized when both exist.
fn contains_dir(dir: &Path, target: &Path) -> bool {
    match (dir.canonicalize(), target.canonicalize()) {
        (Ok(dir), Ok(target)) => target.starts_with(dir),
        _ => target.starts_with(dir),
    }
}

/// An unreadable wallets dir is treated like an empty one.
fn needs_wallet(wallets_dir: &Path) -> bool {
    is_dir_empty(wallets_dir).unwrap_or(true)
}
