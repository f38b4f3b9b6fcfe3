/// File name of the descriptor catalog inside the launcher dir.
pub const CATALOG_FILE_NAME: &str = "chains.json";
/// Start script of script-launched chains, relative to their conf dir.
pub const START_SCRIPT_NAME: &str = "start.sh";
/// Executables of script-launched chains live under `<conf dir>/usr/bin`.
pub const SCRIPT_BIN_SUBDIR: [&str; 2] = ["usr", "bin"];
/// Wallet dir checked before scheduling wallet creation.
pub const WALLETS_SUBDIR: [&str; 2] = ["regtest", "wallets"];

pub const DEFAULT_RPC_USER: &str = "user";
pub const DEFAULT_RPC_PASSWORD: &str = "password";

pub const DEFAULT_ACTIVATION_DELAY_MS: u64 = 2_000;
pub const DEFAULT_WALLET_BOOTSTRAP_DELAY_MS: u64 = 1_000;
