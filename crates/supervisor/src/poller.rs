use std::{sync::Arc, time::Duration};

use dcl_rpc_client::{ChainRpc, ChainRpcExt};
use dcl_utils::AbortOnDropHandle;
use tokio::{
    sync::oneshot,
    time::{interval, MissedTickBehavior},
};

use crate::{chain::Chain, notify::RefreshHook, process::ProcessControl};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running poller task. Dropping it aborts the task.
pub struct PollerHandle {
    cancel: oneshot::Sender<()>,
    task: AbortOnDropHandle<()>,
}

impl PollerHandle {
    /// Ask the poller to exit after its current tick, if any.
    pub fn cancel(self) {
        let _ = self.cancel.send(());
        // Let an in-flight tick finish rather than abort it mid-update.
        drop(self.task.into_inner());
    }
}

/// Periodic liveness and height check for one chain.
#[derive(Clone)]
pub struct ChainPoller {
    chain: Arc<Chain>,
    rpc: Arc<dyn ChainRpc>,
    process: Arc<dyn ProcessControl>,
    refresh: Arc<dyn RefreshHook>,
}

impl ChainPoller {
    pub fn new(
        chain: Arc<Chain>,
        rpc: Arc<dyn ChainRpc>,
        process: Arc<dyn ProcessControl>,
        refresh: Arc<dyn RefreshHook>,
    ) -> Self {
        ChainPoller {
            chain,
            rpc,
            process,
            refresh,
        }
    }

    /// One poll. Returns whether the chain's state changed.
    pub async fn tick(&self) -> bool {
        let config = self.chain.config();

        if config.is_root && self.chain.snapshot().automine {
            if let Err(err) = self.rpc.generate(self.chain.target(), 1).await {
                log::warn!("[{}] automine: {}", config.id, err);
            }
        }

        let changed = if self.chain.has_rpc() {
            let height = match self.rpc.get_block_count(self.chain.target()).await {
                Ok(height) => Some(height),
                Err(err) => {
                    log::trace!("[{}] block count: {}", config.id, err);
                    None
                }
            };
            self.chain.update(|state| state.apply_height(height))
        } else {
            let alive = self.process.is_running(&config.id);
            self.chain.update(|state| state.apply_liveness(alive))
        };

        if changed {
            let state = self.chain.snapshot();
            log::debug!(
                "[{}] {:?} at height {}",
                config.id,
                state.state,
                state.height
            );
            self.refresh.refresh();
        }
        changed
    }

    /// Spawn the polling loop. The first poll happens one interval from now.
    pub fn spawn(self) -> PollerHandle {
        let (cancel, mut cancelled) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut ticker = interval(POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // `interval` fires immediately on the first call.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancelled => break,
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                }
            }
            log::debug!("[{}] poller exited", self.chain.id());
        });
        PollerHandle {
            cancel,
            task: AbortOnDropHandle::from(task),
        }
    }
}
