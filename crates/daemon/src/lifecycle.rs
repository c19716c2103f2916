// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: configuration, startup, shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cl_adapters::{FileSource, LogObserver, TcpSource};
use cl_engine::{EngineError, Service};
use cl_storage::GameStore;
use fs2::FileExt;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Config not found at {0}: {1}")]
    ConfigNotFound(PathBuf, std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("source config: {0}")]
    SourceConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] cl_storage::StoreError),
}

/// Which kind of feed the daemon attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    File,
    Tcp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Replay file path, for `kind = "file"`
    pub path: Option<PathBuf>,
    /// Bridge address like `127.0.0.1:7778`, for `kind = "tcp"`
    pub addr: Option<String>,
    #[serde(default = "default_poll_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub id: String,
    pub event: Option<String>,
    pub site: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    /// Start broadcasting this game immediately
    #[serde(default)]
    pub broadcast: bool,
}

/// Daemon configuration, loaded from `chesslink.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory for game files and the pid file
    pub state_dir: PathBuf,
    pub source: Option<SourceConfig>,
    pub game: Option<GameConfig>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LifecycleError::ConfigNotFound(path.to_path_buf(), e))?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join("cld.pid")
    }

    pub fn games_path(&self) -> PathBuf {
        self.state_dir.join("games")
    }
}

/// Running daemon state
pub struct Daemon {
    pub config: Config,
    pub service: Arc<Service>,
    // NOTE(lifetime): held to maintain the exclusive pid lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
}

/// Start the daemon: pid lock, store, service, configured source and game.
pub async fn startup(config: &Config) -> Result<Daemon, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Acquire the lock first so two daemons never share a store.
    let lock_file = File::create(config.lock_path())?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    {
        use std::io::Write;
        let mut lock_file = &lock_file;
        writeln!(lock_file, "{}", std::process::id())?;
    }

    let store = GameStore::open(config.games_path())?;
    let service = Service::new(store);
    let service = match config.source.as_ref() {
        Some(source) => Arc::new(
            service.with_poll_interval(Duration::from_millis(source.poll_interval_ms)),
        ),
        None => Arc::new(service),
    };
    service.subscribe(Arc::new(LogObserver::new()));

    if let Some(game) = config.game.as_ref() {
        service.update_meta(&game.id, |meta| {
            meta.event.clone_from(&game.event);
            meta.site.clone_from(&game.site);
            meta.white.clone_from(&game.white);
            meta.black.clone_from(&game.black);
        })?;

        // Broadcast first so the source's earliest snapshots go on air
        // instead of being discarded as stale backlog.
        if game.broadcast {
            service.start_game(&game.id).await?;
        }

        if let Some(source) = config.source.as_ref() {
            connect_configured_source(&service, &game.id, source).await?;
        }
    } else if config.source.is_some() {
        warn!("source configured without a game, ignoring it");
    }

    info!(state_dir = %config.state_dir.display(), "daemon started");
    Ok(Daemon {
        config: config.clone(),
        service,
        lock_file,
    })
}

async fn connect_configured_source(
    service: &Service,
    game_id: &str,
    source: &SourceConfig,
) -> Result<(), LifecycleError> {
    match source.kind {
        SourceKind::File => {
            let path = source.path.as_ref().ok_or_else(|| {
                LifecycleError::SourceConfig("kind = \"file\" requires `path`".to_string())
            })?;
            let file = FileSource::open(path).await.map_err(EngineError::from)?;
            service.connect_source(game_id, file).await?;
        }
        SourceKind::Tcp => {
            let addr = source.addr.as_ref().ok_or_else(|| {
                LifecycleError::SourceConfig("kind = \"tcp\" requires `addr`".to_string())
            })?;
            let tcp = TcpSource::connect(addr).await.map_err(EngineError::from)?;
            service.connect_source(game_id, tcp).await?;
        }
    }
    Ok(())
}

impl Daemon {
    /// Graceful teardown: detach the source, end any broadcast, drop the
    /// pid file.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        info!("shutting down daemon");
        self.service.shutdown().await?;

        if self.config.lock_path().exists() {
            if let Err(e) = std::fs::remove_file(self.config.lock_path()) {
                warn!(error = %e, "failed to remove pid file");
            }
        }
        info!("daemon shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
