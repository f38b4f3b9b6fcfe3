use std::{
    collections::BTreeMap,
    path::{Component, Path},
};

use serde::{Deserialize, Serialize};

/// How a chain's process is started and whether it answers RPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchKind {
    /// `<binary> -conf=<path>`
    ConfFile,
    /// Peer-to-peer chain wired to the root chain through discrete flags.
    Peer,
    /// Auxiliary `start.sh` in the conf dir.
    Script,
}

impl Default for LaunchKind {
    fn default() -> Self {
        LaunchKind::ConfFile
    }
}

/// Static catalog entry describing a chain kind and its defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub image_url: String,
    pub bin_name: String,
    pub default_dir: String,
    pub default_conf_name: String,
    pub default_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_slot: Option<u32>,
    #[serde(default)]
    pub root: bool,
    #[serde(default)]
    pub launch: LaunchKind,
    #[serde(default)]
    pub create_wallet: bool,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("invalid catalog json: {0}")]
    Json(String),
    #[error("catalog has no root chain")]
    NoRoot,
    #[error("catalog has more than one root chain: {0:?}")]
    MultipleRoots(Vec<String>),
    #[error("root chain {0} must not have a registration slot")]
    RootWithSlot(String),
    #[error("dependent chain {0} has no registration slot")]
    MissingSlot(String),
    #[error("catalog key {key} does not match descriptor id {id}")]
    MismatchedId { key: String, id: String },
    #[error("chain {id} has an unusable default dir {dir:?}")]
    InvalidDir { id: String, dir: String },
}

/// Descriptor catalog keyed by chain identifier. Exactly one entry is the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    descriptors: BTreeMap<String, ChainDescriptor>,
    root_id: String,
}

impl Catalog {
    pub fn new(descriptors: BTreeMap<String, ChainDescriptor>) -> Result<Self, CatalogError> {
        let mut roots = Vec::new();
        for (key, descriptor) in &descriptors {
            if key != &descriptor.id {
                return Err(CatalogError::MismatchedId {
                    key: key.clone(),
                    id: descriptor.id.clone(),
                });
            }
            if !is_relative_subdir(&descriptor.default_dir) {
                return Err(CatalogError::InvalidDir {
                    id: key.clone(),
                    dir: descriptor.default_dir.clone(),
                });
            }
            if descriptor.root {
                if descriptor.default_slot.is_some() {
                    return Err(CatalogError::RootWithSlot(key.clone()));
                }
                roots.push(key.clone());
            } else if descriptor.default_slot.is_none() {
                return Err(CatalogError::MissingSlot(key.clone()));
            }
        }

        let root_id = match roots.len() {
            0 => return Err(CatalogError::NoRoot),
            1 => roots.remove(0),
            _ => return Err(CatalogError::MultipleRoots(roots)),
        };

        Ok(Catalog {
            descriptors,
            root_id,
        })
    }

    pub fn from_json(content: &[u8]) -> Result<Self, CatalogError> {
        let descriptors: BTreeMap<String, ChainDescriptor> =
            serde_json::from_slice(content).map_err(|err| CatalogError::Json(err.to_string()))?;
        Self::new(descriptors)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.descriptors)
    }

    pub fn get(&self, id: &str) -> Option<&ChainDescriptor> {
        self.descriptors.get(id)
    }

    pub fn root(&self) -> &ChainDescriptor {
        &self.descriptors[&self.root_id]
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.descriptors.values()
    }

    pub fn dependents(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.descriptors.values().filter(|d| !d.root)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// A non-empty relative path that stays below the directory it is joined to.
fn is_relative_subdir(dir: &str) -> bool {
    let mut components = Path::new(dir).components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

fn descriptor(
    id: &str,
    name: &str,
    description: &str,
    bin_name: &str,
    default_port: u16,
    default_slot: Option<u32>,
) -> ChainDescriptor {
    ChainDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        repo_url: String::new(),
        image_url: String::new(),
        bin_name: bin_name.to_string(),
        default_dir: format!(".{}", id),
        default_conf_name: format!("{}.conf", id),
        default_port,
        default_slot,
        root: false,
        launch: LaunchKind::ConfFile,
        create_wallet: false,
    }
}

impl Default for Catalog {
    /// The catalog written on first run when the launcher dir has none.
    fn default() -> Self {
        let drivechain = ChainDescriptor {
            root: true,
            ..descriptor(
                "drivechain",
                "Drivechain",
                "Drivechain mainchain node (regtest)",
                "drivechain-qt",
                18443,
                None,
            )
        };
        let testchain = descriptor(
            "testchain",
            "Testchain",
            "Template sidechain for testing",
            "testchain-qt",
            18743,
            Some(0),
        );
        let bitassets = descriptor(
            "bitassets",
            "BitAssets",
            "Asset issuance sidechain",
            "bitassets-qt",
            19005,
            Some(4),
        );
        let thunder = ChainDescriptor {
            launch: LaunchKind::Peer,
            ..descriptor(
                "thunder",
                "Thunder",
                "Large block sidechain",
                "thunder",
                18009,
                Some(9),
            )
        };
        let latestcore = ChainDescriptor {
            create_wallet: true,
            ..descriptor(
                "latestcore",
                "Latest Core",
                "Latest Bitcoin Core as a sidechain",
                "bitcoin-qt",
                18543,
                Some(10),
            )
        };
        let bitnames = ChainDescriptor {
            launch: LaunchKind::Script,
            ..descriptor(
                "bitnames",
                "BitNames",
                "Name registration sidechain",
                "bitnames",
                18402,
                Some(2),
            )
        };

        let descriptors = [drivechain, testchain, bitassets, thunder, latestcore, bitnames]
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();
        Catalog {
            descriptors,
            root_id: "drivechain".to_string(),
        }
    }
}
