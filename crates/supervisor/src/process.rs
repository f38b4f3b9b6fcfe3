use std::{collections::HashMap, io, path::PathBuf, process::Stdio};

use async_trait::async_trait;
use dcl_config::{ChainRuntimeConfig, LaunchKind};
use dcl_rpc_client::types::RPC_HOST;
use parking_lot::Mutex;
use tokio::process::{Child, Command};

/// A fully resolved child process invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Start in a new session so the child outlives the launcher.
    pub detach: bool,
    pub inherit_stdout: bool,
    pub inherit_stderr: bool,
}

/// Per chain kind: how to build the command line and whether the chain
/// answers RPC.
pub trait LaunchStrategy: Send + Sync {
    fn command(&self, chain: &ChainRuntimeConfig, root: &ChainRuntimeConfig) -> LaunchCommand;

    fn has_rpc(&self) -> bool {
        true
    }
}

struct ConfFileLaunch;

impl LaunchStrategy for ConfFileLaunch {
    fn command(&self, chain: &ChainRuntimeConfig, _root: &ChainRuntimeConfig) -> LaunchCommand {
        LaunchCommand {
            program: chain.bin_path(),
            args: vec![format!("-conf={}", chain.conf_path().display())],
            detach: true,
            inherit_stdout: true,
            inherit_stderr: false,
        }
    }
}

/// Talks to the root chain directly and stays attached to the launcher.
struct PeerLaunch;

impl LaunchStrategy for PeerLaunch {
    fn command(&self, chain: &ChainRuntimeConfig, root: &ChainRuntimeConfig) -> LaunchCommand {
        LaunchCommand {
            program: chain.bin_path(),
            args: vec![
                "-d".to_string(),
                chain.conf_dir.display().to_string(),
                "-n".to_string(),
                format!("{}:{}", RPC_HOST, chain.rpc_port),
                "-m".to_string(),
                format!("{}:{}", RPC_HOST, root.rpc_port),
                "-u".to_string(),
                root.rpc_user.clone(),
                "-p".to_string(),
                root.rpc_password.clone(),
            ],
            detach: false,
            inherit_stdout: false,
            inherit_stderr: false,
        }
    }

    fn has_rpc(&self) -> bool {
        false
    }
}

struct ScriptLaunch;

impl LaunchStrategy for ScriptLaunch {
    fn command(&self, chain: &ChainRuntimeConfig, _root: &ChainRuntimeConfig) -> LaunchCommand {
        LaunchCommand {
            program: chain.start_script_path(),
            args: vec![],
            detach: true,
            inherit_stdout: true,
            inherit_stderr: true,
        }
    }
}

pub fn strategy_for(kind: LaunchKind) -> &'static dyn LaunchStrategy {
    match kind {
        LaunchKind::ConfFile => &ConfFileLaunch,
        LaunchKind::Peer => &PeerLaunch,
        LaunchKind::Script => &ScriptLaunch,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// A live process was found and signalled.
    Terminated,
    /// Nothing to stop.
    NotRunning,
}

/// OS process management for chain nodes.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// Spawn `command` on behalf of `chain_id`, returning the child pid.
    async fn spawn(&self, chain_id: &str, command: &LaunchCommand) -> io::Result<u32>;

    /// Whether the child spawned for `chain_id` is still alive.
    fn is_running(&self, chain_id: &str) -> bool;

    /// Forcefully terminate `chain_id`'s process. Falls back to looking the
    /// process up by `executable` name when no live child is retained.
    async fn terminate(&self, chain_id: &str, executable: &str) -> io::Result<Termination>;
}

struct TrackedChild {
    child: Child,
    detached: bool,
}

/// Real child processes, retained by chain id.
#[derive(Default)]
pub struct OsProcessControl {
    children: Mutex<HashMap<String, TrackedChild>>,
}

impl OsProcessControl {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessControl for OsProcessControl {
    async fn spawn(&self, chain_id: &str, command: &LaunchCommand) -> io::Result<u32> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(if command.inherit_stdout {
                Stdio::inherit()
            } else {
                Stdio::null()
            })
            .stderr(if command.inherit_stderr {
                Stdio::inherit()
            } else {
                Stdio::null()
            });

        #[cfg(unix)]
        if command.detach {
            unsafe {
                cmd.pre_exec(|| {
                    if libc::setsid() == -1 {
                        return Err(io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        let child = cmd.spawn()?;
        let pid = child
            .id()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child exited before pid read"))?;
        log::debug!(
            "spawned {} for {} with pid {}",
            command.program.display(),
            chain_id,
            pid
        );

        self.children.lock().insert(
            chain_id.to_string(),
            TrackedChild {
                child,
                detached: command.detach,
            },
        );
        Ok(pid)
    }

    fn is_running(&self, chain_id: &str) -> bool {
        match self.children.lock().get_mut(chain_id) {
            Some(tracked) => matches!(tracked.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    async fn terminate(&self, chain_id: &str, executable: &str) -> io::Result<Termination> {
        let tracked = self.children.lock().remove(chain_id);
        if let Some(mut tracked) = tracked {
            if let Ok(None) = tracked.child.try_wait() {
                kill_child(&mut tracked).await?;
                return Ok(Termination::Terminated);
            }
        }

        // No live handle, e.g. the node was started before this launcher.
        // Any unrelated process sharing the executable name matches too.
        match find_pids_by_name(executable)?.first() {
            Some(pid) => kill_pid(*pid),
            None => Ok(Termination::NotRunning),
        }
    }
}

async fn kill_child(tracked: &mut TrackedChild) -> io::Result<()> {
    #[cfg(unix)]
    if tracked.detached {
        if let Some(pid) = tracked.child.id() {
            // The child leads its own session: take the whole group down,
            // including anything a start script spawned.
            if unsafe { libc::kill(-(pid as libc::pid_t), libc::SIGKILL) } == -1 {
                let err = io::Error::last_os_error();
                if err.raw_os_error() != Some(libc::ESRCH) {
                    return Err(err);
                }
            }
            tracked.child.wait().await?;
            return Ok(());
        }
    }
    tracked.child.kill().await
}

#[cfg(unix)]
fn kill_pid(pid: u32) -> io::Result<Termination> {
    if unsafe { libc::kill(pid as libc::pid_t, libc::SIGKILL) } == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(Termination::NotRunning);
        }
        return Err(err);
    }
    Ok(Termination::Terminated)
}

#[cfg(not(unix))]
fn kill_pid(_pid: u32) -> io::Result<Termination> {
    Ok(Termination::NotRunning)
}

/// Kernel `comm` names are truncated to 15 bytes.
#[cfg(target_os = "linux")]
const COMM_LEN: usize = 15;

/// Live (non-zombie) processes whose `comm` matches `name`, lowest pid first.
#[cfg(target_os = "linux")]
fn find_pids_by_name(name: &str) -> io::Result<Vec<u32>> {
    let wanted = &name.as_bytes()[..name.len().min(COMM_LEN)];
    let own_pid = std::process::id();
    let mut pids = Vec::new();
    for entry in std::fs::read_dir("/proc")? {
        let entry = entry?;
        let pid = match entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) {
            Some(pid) if pid != own_pid => pid,
            _ => continue,
        };
        // The process may exit while we scan.
        let stat = match std::fs::read_to_string(entry.path().join("stat")) {
            Ok(stat) => stat,
            Err(_) => continue,
        };
        if let Some((comm, state)) = parse_stat(&stat) {
            if comm.as_bytes() == wanted && state != 'Z' {
                pids.push(pid);
            }
        }
    }
    pids.sort_unstable();
    Ok(pids)
}

#[cfg(not(target_os = "linux"))]
fn find_pids_by_name(_name: &str) -> io::Result<Vec<u32>> {
    Ok(Vec::new())
}

/// `pid (comm) state ...`; comm may itself contain parentheses.
#[cfg(any(target_os = "linux", test))]
fn parse_stat(stat: &str) -> Option<(&str, char)> {
    let open = stat.find('(')?;
    let close = stat.rfind(')')?;
    let comm = stat.get(open + 1..close)?;
    let state = stat.get(close + 1..)?.trim_start().chars().next()?;
    Some((comm, state))
}
