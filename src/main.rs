use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fileserve::config::{self, Config};
use fileserve::logger;
use fileserve::reload::{Monitor, MonitorConfig, MonitorExit, RESTART_EXIT_CODE};
use fileserve::server::{self, ServerExit, ShutdownHandle, ShutdownReason};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    // Create Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    let exit = runtime.block_on(async_main(cfg, config_path))?;
    // Stop lingering connection tasks before exiting
    runtime.shutdown_timeout(Duration::from_secs(1));

    if exit == ServerExit::Restart {
        std::process::exit(RESTART_EXIT_CODE);
    }
    Ok(())
}

async fn async_main(
    cfg: Config,
    config_path: String,
) -> Result<ServerExit, Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Misconfigured cache or disposition policies abort startup
    let state = Arc::new(config::AppState::new(&cfg)?);
    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let shutdown = Arc::new(ShutdownHandle::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    let monitor = if cfg.reload.enabled {
        let monitor = Arc::new(Monitor::new(MonitorConfig {
            poll_interval: Duration::from_millis(cfg.reload.poll_interval_ms.max(1)),
            watch_files: cfg.reload.watch_files.clone(),
            watch_executable: cfg.reload.watch_executable,
        }));
        if let Some(path) = config_file(&config_path) {
            monitor.watch_file(path)?;
        }
        spawn_monitor(Arc::clone(&monitor), Arc::clone(&shutdown));
        Some(monitor)
    } else {
        None
    };

    let exit = server::start_server_loop(listener, state, Arc::clone(&shutdown)).await;
    if let Some(monitor) = monitor {
        monitor.stop();
    }

    match exit {
        ServerExit::Shutdown => logger::log_shutdown("Server stopped"),
        ServerExit::Restart => logger::log_shutdown("Server stopped for restart"),
    }
    Ok(exit)
}

/// Poll watched files in the background and request a restart on change
fn spawn_monitor(monitor: Arc<Monitor>, shutdown: Arc<ShutdownHandle>) {
    // Establish baselines before serving so early edits are not missed
    monitor.check();

    tokio::spawn(async move {
        tokio::select! {
            exit = monitor.run() => {
                if let MonitorExit::Changed(path) = exit {
                    logger::log_restart_requested(&path);
                    shutdown.trigger(ShutdownReason::Restart);
                }
            }
            _ = shutdown.wait() => monitor.stop(),
        }
    });
}

/// Resolve the configuration file the loader actually read
fn config_file(config_path: &str) -> Option<PathBuf> {
    let path = PathBuf::from(config_path);
    if path.is_file() {
        return Some(path);
    }
    ["toml", "json", "yaml", "yml", "ini"]
        .iter()
        .map(|ext| path.with_extension(ext))
        .find(|candidate| candidate.is_file())
}
