use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config;
use crate::data;
use crate::logging;
use crate::player::{ExternalPlayer, MediaPlayer, PlaybackController, SilentPlayer};
use crate::storage;
use crate::sync::{self, SyncService};
use crate::ui;

pub fn run() -> Result<()> {
    let cfg = config::load(config::LoadOptions::default()).context("load config")?;
    if let Err(err) = logging::init(&cfg.logging) {
        eprintln!("warning: logging disabled: {err:#}");
    }
    let config_path = config::default_path();
    let display_path = friendly_path(config_path.as_ref());

    let store =
        Arc::new(storage::Store::open(storage::Options::default()).context("open storage")?);
    let identity = store.identity().context("load user id")?;
    tracing::info!(user_id = %identity.user_id, "identity loaded");

    let profile = store
        .load_profile()
        .context("load saved profile")?
        .unwrap_or_default();
    let settings = store
        .load_settings()
        .context("load saved settings")?
        .unwrap_or_default();

    let mut fetch_state_on_start = false;
    let status: String;
    let sync_service: Arc<dyn SyncService> = match sync::HttpSyncService::new(sync::ClientConfig {
        endpoint: cfg.sync.endpoint.clone(),
        user_id: identity.user_id.clone(),
        user_agent: cfg.sync.user_agent.clone(),
        timeout: Some(cfg.sync.timeout),
        http_client: None,
    }) {
        Ok(service) => {
            fetch_state_on_start = true;
            status = "Loading your saved videos… j/k to browse, ? for help, q to quit.".to_string();
            Arc::new(service)
        }
        Err(sync::SyncError::Disabled) => {
            tracing::info!("no sync endpoint configured; running offline");
            status = format!(
                "Offline mode: set sync.endpoint in {} to keep likes and favorites. j/k to browse, q to quit.",
                display_path
            );
            Arc::new(sync::DisabledSyncService)
        }
        Err(err) => {
            tracing::warn!(error = %err, "sync disabled");
            status = format!("Sync disabled: {err}");
            Arc::new(sync::DisabledSyncService)
        }
    };

    let player: Box<dyn MediaPlayer> = match ExternalPlayer::new(cfg.player.video_command.clone())
    {
        Ok(player) => Box::new(player),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "external player unavailable");
            Box::new(SilentPlayer)
        }
    };

    let options = ui::Options {
        status_message: status,
        catalog: data::mock_catalog(),
        achievements: data::mock_achievements(),
        profile,
        settings,
        user_id: identity.user_id,
        sync_service,
        store: store.clone(),
        playback: PlaybackController::new(player),
        autoplay: cfg.player.autoplay,
        theme: cfg.ui.theme.clone(),
        swipe_threshold: cfg.ui.swipe_threshold,
        splash_delay: cfg.ui.splash_delay,
        config_path: display_path,
        fetch_state_on_start,
    };

    let mut model = ui::Model::new(options);
    let result = model.run();
    drop(model);

    if let Ok(store) = Arc::try_unwrap(store) {
        if let Err(err) = store.close() {
            tracing::warn!(error = %format!("{err:#}"), "failed to close storage");
        }
    }
    tracing::info!("goshorts exiting");

    result
}

fn friendly_path(path: Option<&std::path::PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/goshorts/config.yaml".to_string()
    }
}
