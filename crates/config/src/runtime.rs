use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    ChainConf, ChainDescriptor, LaunchKind, DEFAULT_RPC_PASSWORD, DEFAULT_RPC_USER,
    SCRIPT_BIN_SUBDIR, START_SCRIPT_NAME, WALLETS_SUBDIR,
};

/// Per-chain settings derived at bootstrap and read-mostly afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRuntimeConfig {
    pub id: String,
    pub is_root: bool,
    pub bin_dir: PathBuf,
    pub bin_name: String,
    pub conf_dir: PathBuf,
    pub conf_name: String,
    pub rpc_port: u16,
    pub rpc_user: String,
    pub rpc_password: String,
    /// Registration slot, dependent chains only.
    pub slot: Option<u32>,
    pub refresh_bmm: bool,
    pub bmm_fee: bool,
    pub launch: LaunchKind,
    pub create_wallet: bool,
}

impl ChainRuntimeConfig {
    /// Combine a descriptor with the values read back from its conf file.
    /// Port and slot always come from the descriptor.
    pub fn from_descriptor(descriptor: &ChainDescriptor, conf_dir: &Path, conf: ChainConf) -> Self {
        let bin_dir = match descriptor.launch {
            LaunchKind::Script => SCRIPT_BIN_SUBDIR
                .iter()
                .fold(conf_dir.to_path_buf(), |dir, part| dir.join(part)),
            LaunchKind::ConfFile | LaunchKind::Peer => conf_dir.to_path_buf(),
        };
        ChainRuntimeConfig {
            id: descriptor.id.clone(),
            is_root: descriptor.root,
            bin_dir,
            bin_name: descriptor.bin_name.clone(),
            conf_dir: conf_dir.to_path_buf(),
            conf_name: descriptor.default_conf_name.clone(),
            rpc_port: descriptor.default_port,
            rpc_user: conf.rpc_user.unwrap_or_else(|| DEFAULT_RPC_USER.to_string()),
            rpc_password: conf
                .rpc_password
                .unwrap_or_else(|| DEFAULT_RPC_PASSWORD.to_string()),
            slot: if descriptor.root {
                None
            } else {
                descriptor.default_slot
            },
            refresh_bmm: conf.refresh_bmm,
            bmm_fee: conf.bmm_fee,
            launch: descriptor.launch,
            create_wallet: descriptor.create_wallet,
        }
    }

    pub fn conf_path(&self) -> PathBuf {
        self.conf_dir.join(&self.conf_name)
    }

    pub fn bin_path(&self) -> PathBuf {
        self.bin_dir.join(&self.bin_name)
    }

    pub fn start_script_path(&self) -> PathBuf {
        self.conf_dir.join(START_SCRIPT_NAME)
    }

    pub fn wallets_dir(&self) -> PathBuf {
        WALLETS_SUBDIR
            .iter()
            .fold(self.conf_dir.clone(), |dir, part| dir.join(part))
    }
}
