use anyhow::{Context, Result};
use clap::{Arg, Command};
use dcl_config::LauncherConfig;
use dclauncher_bin::runner::{self, RunArgs};
use std::{env, fs, path::Path};

const COMMAND_RUN: &str = "run";
const COMMAND_RESET: &str = "reset";
const COMMAND_EXAMPLE_CONFIG: &str = "generate-example-config";
const ARG_OUTPUT_PATH: &str = "output-path";
const ARG_CONFIG: &str = "config";
const ARG_CHAIN: &str = "chain";
const ARG_AUTOMINE: &str = "automine";
const ARG_STOP_ON_EXIT: &str = "stop-on-exit";

fn read_config<P: AsRef<Path>>(path: P) -> Result<LauncherConfig> {
    let content = fs::read(&path)
        .with_context(|| format!("read config file from {}", path.as_ref().to_string_lossy()))?;
    let config = toml::from_slice(&content).with_context(|| "parse config file")?;
    Ok(config)
}

fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = match home_dir() {
        Some(home) => LauncherConfig::with_home_dir(home.into()),
        None => LauncherConfig::default(),
    };
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;
    Ok(())
}

fn home_dir() -> Option<String> {
    env::var("HOME").ok().filter(|home| !home.is_empty())
}

fn config_arg() -> Arg<'static> {
    Arg::new(ARG_CONFIG)
        .short('c')
        .takes_value(true)
        .required(true)
        .default_value("./launcher.toml")
        .help("The config file path")
}

fn cli() -> Command<'static> {
    Command::new("dclauncher")
        .about("Supervise local drivechain nodes.")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new(COMMAND_RUN)
                .about("Launch the root chain and the given dependent chains")
                .arg(config_arg())
                .arg(
                    Arg::new(ARG_CHAIN)
                        .long(ARG_CHAIN)
                        .takes_value(true)
                        .multiple_occurrences(true)
                        .help("Dependent chain to activate and launch"),
                )
                .arg(
                    Arg::new(ARG_AUTOMINE)
                        .long(ARG_AUTOMINE)
                        .help("Mine a root chain block on every poll"),
                )
                .arg(
                    Arg::new(ARG_STOP_ON_EXIT)
                        .long(ARG_STOP_ON_EXIT)
                        .help("Stop every chain when the launcher exits"),
                )
                .display_order(0),
        )
        .subcommand(
            Command::new(COMMAND_RESET)
                .about("Stop all chains and delete their data")
                .arg(config_arg())
                .display_order(1),
        )
        .subcommand(
            Command::new(COMMAND_EXAMPLE_CONFIG)
                .about("Generate an example config file")
                .arg(
                    Arg::new(ARG_OUTPUT_PATH)
                        .short('o')
                        .takes_value(true)
                        .required(true)
                        .default_value("./launcher.example.toml")
                        .help("The path of the example config file"),
                )
                .display_order(2),
        )
}

async fn run_cli() -> Result<()> {
    let app = cli();

    // handle subcommands
    let matches = app.clone().get_matches();
    match matches.subcommand() {
        Some((COMMAND_RUN, m)) => {
            let config_path = m.value_of(ARG_CONFIG).context("missing config path")?;
            let config = read_config(&config_path)?;
            let _guard = dcl_telemetry::init()?;
            let chains = m
                .values_of(ARG_CHAIN)
                .map(|values| values.map(str::to_string).collect())
                .unwrap_or_default();
            let args = RunArgs {
                config,
                chains,
                automine: m.is_present(ARG_AUTOMINE),
                stop_on_exit: m.is_present(ARG_STOP_ON_EXIT),
            };
            runner::run(args).await?;
        }
        Some((COMMAND_RESET, m)) => {
            let config_path = m.value_of(ARG_CONFIG).context("missing config path")?;
            let config = read_config(&config_path)?;
            let _guard = dcl_telemetry::init()?;
            runner::reset(config).await?;
        }
        Some((COMMAND_EXAMPLE_CONFIG, m)) => {
            let path = m.value_of(ARG_OUTPUT_PATH).context("missing output path")?;
            let _guard = dcl_telemetry::init()?;
            generate_example_config(path)?;
        }
        _ => {
            app.clone().print_help()?;
        }
    };
    Ok(())
}

/// dclauncher entry
fn main() -> Result<()> {
    let threads = match env::var("DCL_THREADS") {
        Err(env::VarError::NotPresent) => num_cpus::get(),
        Err(e) => return Err(e.into()),
        Ok(v) => v.parse()?,
    };
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()?;

    rt.block_on(run_cli())
}
