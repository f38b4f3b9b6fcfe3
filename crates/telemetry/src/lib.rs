use tracing_appender::non_blocking;
use tracing_subscriber::{prelude::*, EnvFilter};

const ENV_LOG_FORMAT: &str = "DCL_LOG_FORMAT";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum TraceInitError {
    ParseError(#[from] tracing_subscriber::filter::ParseError),
    TryInitError(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var(ENV_LOG_FORMAT).as_deref() {
            Ok("json") => LogFormat::Json,
            Ok(_) | Err(_) => LogFormat::Text,
        }
    }
}

/// Keeps the non-blocking stdout worker alive. Buffered lines are flushed
/// when this is dropped, so hold it until the end of `main`.
pub struct TraceGuard {
    _non_blocking_worker: non_blocking::WorkerGuard,
}

pub fn init() -> Result<TraceGuard, TraceInitError> {
    let format = LogFormat::from_env();

    let env_filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))?;

    let (non_blocking_stdout, _non_blocking_worker) = non_blocking(std::io::stdout());
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking_stdout);
    let fmt_layer = match format {
        LogFormat::Text => fmt_layer.boxed(),
        LogFormat::Json => fmt_layer.json().with_current_span(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter_layer)
        .try_init()?;

    Ok(TraceGuard {
        _non_blocking_worker,
    })
}
