//! Run-scoped context: verbosity, behaviour flags and the log handle.
//!
//! The subscriber is built once and carried in [`SyncContext`]; it is only
//! installed for the duration of a run via [`SyncContext::scope`], so nothing
//! in the crate depends on a process-global logger.

use std::future::Future;
use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

/// Log level selected by repeating `-v`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Error,
    Info,
    Debug,
    Trace,
}

/// `-v` count thresholds, checked from the top
const VERBOSITY_THRESHOLDS: [(u8, Verbosity); 4] = [
    (3, Verbosity::Trace),
    (2, Verbosity::Debug),
    (1, Verbosity::Info),
    (0, Verbosity::Error),
];

impl Verbosity {
    /// Map the `-v` occurrence count to a level; anything above 3 stays at trace
    pub fn from_count(count: u8) -> Self {
        VERBOSITY_THRESHOLDS
            .iter()
            .find(|(min, _)| count >= *min)
            .map_or(Verbosity::Error, |(_, level)| *level)
    }

    /// Raise the level to at least `floor`
    pub fn at_least(self, floor: Verbosity) -> Self {
        self.max(floor)
    }

    /// `EnvFilter` directive for this level.
    ///
    /// Warnings are always shown. Dependencies stay at `warn` so `-vvv`
    /// traces this crate without flooding the output with HTTP internals.
    pub fn directive(self) -> String {
        let level = match self {
            Verbosity::Error => "warn",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        };
        format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level)
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Error
    }
}

/// Build the stdout log subscriber. `RUST_LOG` takes precedence over `verbosity`.
pub fn build_dispatch(verbosity: Verbosity, logging: &LoggingConfig) -> Dispatch {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(logging.color)
        .with_target(false);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match logging.format.as_str() {
        "full" => layer.boxed(),
        _ => layer.compact().boxed(),
    };

    Dispatch::new(tracing_subscriber::registry().with(layer).with(filter))
}

/// Configuration shared by every step of a run
#[derive(Debug, Clone)]
pub struct SyncContext {
    /// Level the log handle was built for
    pub verbosity: Verbosity,
    /// Reserved; accepted on the command line but has no effect yet
    pub clean: bool,
    /// Dry run: log intended actions instead of performing them
    pub noop: bool,
    log: Dispatch,
}

impl SyncContext {
    pub fn new(verbosity: Verbosity, clean: bool, noop: bool, log: Dispatch) -> Self {
        Self {
            verbosity,
            clean,
            noop,
            log,
        }
    }

    /// Context that discards all log output
    pub fn silent(noop: bool) -> Self {
        Self::new(Verbosity::Error, false, noop, Dispatch::none())
    }

    /// Run `future` with this context's log handle as the active subscriber
    pub fn scope<F: Future>(&self, future: F) -> WithDispatch<F> {
        future.with_subscriber(self.log.clone())
    }
}
