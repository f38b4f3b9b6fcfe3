use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{CATALOG_FILE_NAME, DEFAULT_ACTIVATION_DELAY_MS, DEFAULT_WALLET_BOOTSTRAP_DELAY_MS};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LauncherConfig {
    /// Per-chain directories are resolved against this dir.
    pub home_dir: PathBuf,
    /// Launcher's own state dir, holds the descriptor catalog.
    pub launcher_dir: PathBuf,
    /// Wait between submitting an activation proposal and launching.
    #[serde(default = "default_activation_delay_ms")]
    pub activation_delay_ms: u64,
    #[serde(default = "default_wallet_bootstrap_delay_ms")]
    pub wallet_bootstrap_delay_ms: u64,
}

fn default_activation_delay_ms() -> u64 {
    DEFAULT_ACTIVATION_DELAY_MS
}

fn default_wallet_bootstrap_delay_ms() -> u64 {
    DEFAULT_WALLET_BOOTSTRAP_DELAY_MS
}

impl Default for LauncherConfig {
    fn default() -> Self {
        LauncherConfig {
            home_dir: PathBuf::from("."),
            launcher_dir: PathBuf::from(".dclauncher"),
            activation_delay_ms: DEFAULT_ACTIVATION_DELAY_MS,
            wallet_bootstrap_delay_ms: DEFAULT_WALLET_BOOTSTRAP_DELAY_MS,
        }
    }
}

impl LauncherConfig {
    pub fn with_home_dir(home_dir: PathBuf) -> Self {
        let launcher_dir = home_dir.join(".dclauncher");
        LauncherConfig {
            home_dir,
            launcher_dir,
            ..Default::default()
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.launcher_dir.join(CATALOG_FILE_NAME)
    }

    pub fn activation_delay(&self) -> Duration {
        Duration::from_millis(self.activation_delay_ms)
    }

    pub fn wallet_bootstrap_delay(&self) -> Duration {
        Duration::from_millis(self.wallet_bootstrap_delay_ms)
    }
}
