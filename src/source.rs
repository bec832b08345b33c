use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::AppConfig;
use crate::data::loader;
use crate::data::model::{ColumnNames, Dataset};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data from {origin}: {message}")]
    Parse { origin: String, message: String },
}

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the sheet comes from.
#[derive(Debug, Clone)]
pub enum Location {
    Http {
        url: String,
        client: reqwest::blocking::Client,
    },
    File(PathBuf),
}

/// Fetches the whole sheet on demand.
#[derive(Debug, Clone)]
pub struct DataSource {
    location: Location,
    columns: ColumnNames,
}

impl DataSource {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, FetchError> {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            let path = endpoint.strip_prefix("file://").unwrap_or(endpoint);
            return Ok(Self::file(path, cfg.columns.clone()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(cfg.request_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            location: Location::Http {
                url: endpoint.to_string(),
                client,
            },
            columns: cfg.columns.clone(),
        })
    }

    pub fn file(path: impl Into<PathBuf>, columns: ColumnNames) -> Self {
        Self {
            location: Location::File(path.into()),
            columns,
        }
    }

    /// Human-readable origin for logs and messages.
    pub fn describe(&self) -> String {
        match &self.location {
            Location::Http { url, .. } => url.clone(),
            Location::File(path) => path.display().to_string(),
        }
    }

    /// One full fetch. Either the complete dataset or an error, never a
    /// partial result.
    pub fn fetch(&self) -> Result<Dataset, FetchError> {
        let origin = self.describe();
        let rows = match &self.location {
            Location::Http { url, client } => {
                let http_err = |source| FetchError::Http {
                    url: url.clone(),
                    source,
                };
                let body = client
                    .get(url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .and_then(|r| r.text())
                    .map_err(http_err)?;
                loader::parse_json(&body)
            }
            Location::File(path) => {
                std::fs::metadata(path).map_err(|source| FetchError::Io {
                    path: origin.clone(),
                    source,
                })?;
                loader::load_file(path)
            }
        }
        .map_err(|e| FetchError::Parse {
            origin,
            message: format!("{e:#}"),
        })?;

        Ok(Dataset::from_rows(rows, &self.columns))
    }
}

// ---------------------------------------------------------------------------
// Poller – periodic background fetch
// ---------------------------------------------------------------------------

/// What caused a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Scheduled,
    Manual,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub trigger: Trigger,
    pub result: Result<Dataset, FetchError>,
}

enum Command {
    Refresh,
    Shutdown,
}

/// Background task fetching the sheet on startup, every `interval` and on
/// [`Poller::refresh`]. Outcomes are delivered in fetch order.
///
/// Manual refreshes do not move the schedule. Dropping the poller stops the
/// task after its current fetch.
pub struct Poller {
    commands: Sender<Command>,
    outcomes: Receiver<FetchOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the task. `notify` runs after every outcome is queued, e.g. to
    /// wake the UI.
    pub fn start<F>(source: DataSource, interval: Duration, notify: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (out_tx, out_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("fault-poller".into())
            .spawn(move || run(source, interval, cmd_rx, out_tx, notify))
            .map_err(|e| log::error!("failed to spawn poller thread: {e}"))
            .ok();

        Self {
            commands: cmd_tx,
            outcomes: out_rx,
            handle,
        }
    }

    /// Request an immediate fetch. Not deduplicated.
    ///
    /// Returns `false` when the task is not running, so no outcome will follow.
    pub fn refresh(&self) -> bool {
        let sent = self.commands.send(Command::Refresh).is_ok();
        if !sent {
            log::warn!("refresh requested but poller is not running");
        }
        sent
    }

    /// Next finished fetch, if any, without blocking.
    pub fn try_recv(&self) -> Option<FetchOutcome> {
        self.outcomes.try_recv().ok()
    }

    /// Wait up to `timeout` for the next finished fetch.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchOutcome> {
        self.outcomes.recv_timeout(timeout).ok()
    }

    /// Stop the task and wait for it to exit.
    pub fn stop(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

fn run<F: Fn()>(
    source: DataSource,
    interval: Duration,
    commands: Receiver<Command>,
    outcomes: Sender<FetchOutcome>,
    notify: F,
) {
    log::info!(
        "polling {} every {}s",
        source.describe(),
        interval.as_secs()
    );

    let mut trigger = Trigger::Startup;
    let mut next_due = Instant::now() + interval;

    loop {
        let started = Instant::now();
        let result = source.fetch();
        match &result {
            Ok(ds) => log::info!(
                "{trigger:?} fetch: {} records in {:?}",
                ds.record_count(),
                started.elapsed()
            ),
            Err(e) => log::error!("{trigger:?} fetch failed: {e}"),
        }
        if outcomes.send(FetchOutcome { trigger, result }).is_err() {
            break;
        }
        notify();

        trigger = loop {
            let now = Instant::now();
            if now >= next_due {
                next_due = now + interval;
                break Trigger::Scheduled;
            }
            match commands.recv_timeout(next_due - now) {
                Ok(Command::Refresh) => break Trigger::Manual,
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                    log::debug!("poller stopped");
                    return;
                }
                Err(RecvTimeoutError::Timeout) => continue,
            }
        };
    }
}
