//! Reload monitor
//!
//! Polls the modification times of the running executable and a watch list.
//! When any of them changes the monitor reports it, and the binary exits with
//! [`RESTART_EXIT_CODE`] so a supervisor can start it again:
//!
//! ```sh
//! err=3
//! while test "$err" -eq 3 ; do
//!     fileserve config.toml
//!     err="$?"
//! done
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Exit status meaning "restart me"; any other status is terminal
pub const RESTART_EXIT_CODE: i32 = 3;

/// Default polling period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Monitor settings
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub watch_files: Vec<PathBuf>,
    /// Track the binary of the running process
    pub watch_executable: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            watch_files: Vec::new(),
            watch_executable: true,
        }
    }
}

/// Outcome of one polling pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadCheck {
    Unchanged,
    Changed(PathBuf),
}

/// Why [`Monitor::run`] returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorExit {
    Changed(PathBuf),
    Stopped,
}

/// Watches files for modification; instances are fully independent
#[derive(Debug)]
pub struct Monitor {
    poll_interval: Duration,
    files: Mutex<Vec<PathBuf>>,
    /// mtime at first observation, None when the file was missing
    baseline: Mutex<HashMap<PathBuf, Option<SystemTime>>>,
    stopped: AtomicBool,
    stop_signal: Notify,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        let mut files = Vec::with_capacity(config.watch_files.len() + 1);
        if config.watch_executable {
            match std::env::current_exe() {
                Ok(exe) => files.push(exe),
                Err(e) => warn!("Cannot locate running executable, not watching it: {e}"),
            }
        }
        for path in config.watch_files {
            files.push(absolute(&path).unwrap_or(path));
        }

        Self {
            poll_interval: config.poll_interval,
            files: Mutex::new(files),
            baseline: Mutex::new(HashMap::new()),
            stopped: AtomicBool::new(false),
            stop_signal: Notify::new(),
        }
    }

    /// Add a file to the watch list, e.g. a configuration file
    pub fn watch_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = absolute(path.as_ref())?;
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        if !files.contains(&path) {
            files.push(path);
        }
        Ok(())
    }

    pub fn watched_files(&self) -> Vec<PathBuf> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Compare every watched file against its baseline
    ///
    /// Files seen for the first time only record a baseline. A file that
    /// appears or disappears counts as a change. Stats the files with
    /// blocking calls; [`run`](Self::run) uses [`poll`](Self::poll) instead.
    pub fn check(&self) -> ReloadCheck {
        let observed = self
            .watched_files()
            .into_iter()
            .map(|path| {
                let mtime = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
                (path, mtime)
            })
            .collect();
        self.compare(observed)
    }

    /// Same as [`check`](Self::check) without blocking the runtime
    pub async fn poll(&self) -> ReloadCheck {
        let files = self.watched_files();
        let mut observed = Vec::with_capacity(files.len());
        for path in files {
            let mtime = tokio::fs::metadata(&path)
                .await
                .and_then(|m| m.modified())
                .ok();
            observed.push((path, mtime));
        }
        self.compare(observed)
    }

    fn compare(&self, observed: Vec<(PathBuf, Option<SystemTime>)>) -> ReloadCheck {
        let mut baseline = self.baseline.lock().unwrap_or_else(PoisonError::into_inner);

        for (path, mtime) in observed {
            match baseline.get(&path) {
                None => {
                    debug!(path = %path.display(), "Recording reload baseline");
                    baseline.insert(path, mtime);
                }
                Some(seen) if *seen != mtime => {
                    warn!("{} changed; reloading...", path.display());
                    return ReloadCheck::Changed(path);
                }
                Some(_) => {}
            }
        }
        ReloadCheck::Unchanged
    }

    /// Poll until a watched file changes or [`stop`](Self::stop) is called
    pub async fn run(&self) -> MonitorExit {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            if self.stopped.load(Ordering::SeqCst) {
                return MonitorExit::Stopped;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    if let ReloadCheck::Changed(path) = self.poll().await {
                        return MonitorExit::Changed(path);
                    }
                }
                () = self.stop_signal.notified() => {
                    return MonitorExit::Stopped;
                }
            }
        }
    }

    /// Stop a running (or future) [`run`](Self::run) loop
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.stop_signal.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
