use std::{sync::Arc, time::Duration};

use anyhow::Result;
use dcl_config::{FsBootstrap, LauncherConfig};
use dcl_rpc_client::HttpRpcClient;
use dcl_supervisor::{
    poller::POLL_INTERVAL, NoopRefresh, OsProcessControl, RefreshHook, Supervisor,
    SupervisorOptions,
};
use tokio::sync::Notify;

use crate::status::{render_table, NotifyRefresh};

/// How long dependents wait for the root chain to answer RPC.
const ROOT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

pub struct RunArgs {
    pub config: LauncherConfig,
    /// Dependent chains to activate and launch once the root chain is up.
    pub chains: Vec<String>,
    pub automine: bool,
    /// Stop the root chain, and with it every dependent, on exit. Chains
    /// otherwise keep running in their own sessions.
    pub stop_on_exit: bool,
}

pub fn build_supervisor(
    config: &LauncherConfig,
    refresh: Arc<dyn RefreshHook>,
) -> Result<Supervisor> {
    Supervisor::new(
        Arc::new(HttpRpcClient::new()?),
        Arc::new(OsProcessControl::new()),
        refresh,
        Arc::new(FsBootstrap::new(config.clone())),
        SupervisorOptions::from(config),
    )
}

pub async fn run(args: RunArgs) -> Result<()> {
    let notify = Arc::new(Notify::new());
    let supervisor = build_supervisor(
        &args.config,
        Arc::new(NotifyRefresh::new(Arc::clone(&notify))),
    )?;

    let root_id = supervisor.root_id();
    supervisor.launch(&root_id).await?;
    if args.automine {
        supervisor.set_automine(true);
    }

    let startup = tokio::spawn(start_dependents(supervisor.clone(), args.chains));

    let signal = sigint_or_sigterm();
    tokio::pin!(signal);
    loop {
        tokio::select! {
            res = &mut signal => {
                if let Err(err) = res {
                    log::error!("signal handler: {}", err);
                }
                break;
            }
            _ = notify.notified() => {
                log::info!("\n{}", render_table(&supervisor.states()));
            }
        }
    }

    startup.abort();
    shutdown(&supervisor, args.stop_on_exit).await?;
    log::info!("Exiting...");
    Ok(())
}

/// Release the launcher's hold on the chains. Processes are left running
/// unless `stop_chains` is set.
pub async fn shutdown(supervisor: &Supervisor, stop_chains: bool) -> Result<()> {
    supervisor.shutdown_pollers();
    if stop_chains {
        supervisor.stop(&supervisor.root_id()).await?;
    } else {
        log::info!("leaving chains running");
    }
    Ok(())
}

async fn start_dependents(supervisor: Supervisor, chains: Vec<String>) {
    if chains.is_empty() {
        return;
    }
    let root_id = supervisor.root_id();
    if !wait_until_running(&supervisor, &root_id, ROOT_STARTUP_TIMEOUT).await {
        log::error!(
            "{} not running after {:?}, skipping {:?}",
            root_id,
            ROOT_STARTUP_TIMEOUT,
            chains
        );
        return;
    }
    for id in chains {
        if let Err(err) = supervisor.activate_and_launch(&id).await {
            log::error!("{}", err);
        }
    }
}

async fn wait_until_running(supervisor: &Supervisor, id: &str, timeout: Duration) -> bool {
    let wait = async {
        while !supervisor.state(id).map_or(false, |state| state.is_running()) {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(timeout, wait).await.is_ok()
}

/// Stop every chain, wipe their directories and regenerate defaults.
pub async fn reset(config: LauncherConfig) -> Result<()> {
    let supervisor = build_supervisor(&config, Arc::new(NoopRefresh))?;
    supervisor.reset().await?;
    log::info!("Reset done");
    Ok(())
}

async fn sigint_or_sigterm() -> Result<()> {
    let int = tokio::signal::ctrl_c();
    #[cfg(unix)]
    let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    #[cfg(unix)]
    tokio::select! {
        res = int => res?,
        _ = term.recv() => {}
    }
    #[cfg(not(unix))]
    int.await?;

    log::info!("received sigint or sigterm, shutting down");
    Ok(())
}
