use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

use crate::{
    Catalog, ChainConf, ChainDescriptor, ChainRuntimeConfig, LaunchKind, LauncherConfig,
    DEFAULT_RPC_PASSWORD, DEFAULT_RPC_USER,
};

/// Everything the supervisor needs from bootstrap: the catalog and one
/// runtime config per catalog entry.
#[derive(Clone, Debug)]
pub struct ChainSetup {
    pub catalog: Catalog,
    pub chains: Vec<ChainRuntimeConfig>,
}

impl ChainSetup {
    pub fn root(&self) -> Result<&ChainRuntimeConfig> {
        self.chains
            .iter()
            .find(|c| c.is_root)
            .ok_or_else(|| anyhow!("chain setup has no root chain"))
    }
}

/// Materializes per-chain config on disk and reads it back.
pub trait Bootstrap: Send + Sync {
    fn bootstrap(&self) -> Result<ChainSetup>;

    /// Launcher's own state directory, removed on a full reset.
    fn launcher_dir(&self) -> PathBuf;

    /// Directory every chain dir lives under. A reset never removes it.
    fn home_dir(&self) -> PathBuf;
}

pub struct FsBootstrap {
    config: LauncherConfig,
}

impl FsBootstrap {
    pub fn new(config: LauncherConfig) -> Self {
        FsBootstrap { config }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    fn load_catalog(&self) -> Result<Catalog> {
        let path = self.config.catalog_path();
        if !path.exists() {
            log::info!("Creating {}", path.display());
            let content = Catalog::default().to_json_pretty()?;
            fs::write(&path, content)
                .with_context(|| format!("write catalog {}", path.display()))?;
        }
        let content =
            fs::read(&path).with_context(|| format!("read catalog {}", path.display()))?;
        let catalog = Catalog::from_json(&content)
            .with_context(|| format!("parse catalog {}", path.display()))?;
        Ok(catalog)
    }

    fn load_chain(&self, descriptor: &ChainDescriptor) -> Result<ChainRuntimeConfig> {
        let conf_dir = self.config.home_dir.join(&descriptor.default_dir);
        ensure_dir(&conf_dir)?;

        let conf_path = conf_dir.join(&descriptor.default_conf_name);
        if !conf_path.exists() {
            log::info!("Writing {}", conf_path.display());
            fs::write(&conf_path, default_conf(descriptor, &conf_dir))
                .with_context(|| format!("write chain conf {}", conf_path.display()))?;
        }

        let content = fs::read_to_string(&conf_path)
            .with_context(|| format!("read chain conf {}", conf_path.display()))?;
        let conf = ChainConf::parse(&content);
        Ok(ChainRuntimeConfig::from_descriptor(
            descriptor, &conf_dir, conf,
        ))
    }
}

impl Bootstrap for FsBootstrap {
    fn bootstrap(&self) -> Result<ChainSetup> {
        ensure_dir(&self.config.launcher_dir)?;
        let catalog = self.load_catalog()?;
        let chains = catalog
            .iter()
            .map(|descriptor| self.load_chain(descriptor))
            .collect::<Result<Vec<_>>>()?;
        Ok(ChainSetup { catalog, chains })
    }

    fn launcher_dir(&self) -> PathBuf {
        self.config.launcher_dir.clone()
    }

    fn home_dir(&self) -> PathBuf {
        self.config.home_dir.clone()
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        log::info!("Creating {}", dir.display());
        fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    }
    Ok(())
}

/// Minimal conf file for a chain that has none yet.
fn default_conf(descriptor: &ChainDescriptor, conf_dir: &Path) -> String {
    let mut lines = match descriptor.launch {
        LaunchKind::Peer => vec![format!("rpcport={}", descriptor.default_port)],
        LaunchKind::ConfFile | LaunchKind::Script => vec![
            "regtest=1".to_string(),
            "server=1".to_string(),
            "splash=0".to_string(),
            format!("rpcuser={}", DEFAULT_RPC_USER),
            format!("rpcpassword={}", DEFAULT_RPC_PASSWORD),
            format!("datadir={}", conf_dir.display()),
            format!("rpcport={}", descriptor.default_port),
        ],
    };
    if let Some(slot) = descriptor.default_slot {
        lines.push(format!("slot={}", slot));
    }
    lines.iter().map(|line| format!("{}\n", line)).collect()
}
