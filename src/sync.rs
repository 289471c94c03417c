use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::profile::{Profile, Settings};

pub const USER_ID_HEADER: &str = "X-User-Id";

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("sync endpoint is not configured")]
    Disabled,
    #[error("sync endpoint {0:?} is not a valid URL")]
    InvalidEndpoint(String),
    #[error("sync request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sync endpoint answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("sync endpoint rejected the request: {0}")]
    Rejected(String),
}

/// Mutations mirrored to the user-data endpoint, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    SaveVideo { video_id: u64, is_saved: bool },
    LikeVideo { video_id: u64, is_liked: bool },
    UpdateSettings { settings: Settings },
    UpdateProfile {
        profile_name: String,
        avatar_url: Option<String>,
    },
}

impl SyncAction {
    pub fn name(&self) -> &'static str {
        match self {
            SyncAction::SaveVideo { .. } => "save_video",
            SyncAction::LikeVideo { .. } => "like_video",
            SyncAction::UpdateSettings { .. } => "update_settings",
            SyncAction::UpdateProfile { .. } => "update_profile",
        }
    }

    pub fn profile(profile: &Profile) -> Self {
        SyncAction::UpdateProfile {
            profile_name: profile.display_name.clone(),
            avatar_url: profile.avatar.clone(),
        }
    }
}

/// Per-video flags the endpoint remembers for this user. Rows come straight
/// from the user-data table, so a flag that was never written is `null`;
/// `None` leaves the local flag untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVideoState {
    pub video_id: u64,
    #[serde(default)]
    pub is_saved: Option<bool>,
    #[serde(default)]
    pub is_liked: Option<bool>,
}

/// Settings row as stored remotely. Missing or `null` columns keep the
/// local value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub dark_mode: Option<bool>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
    #[serde(default)]
    pub auto_sound: Option<bool>,
}

impl RemoteSettings {
    /// Overlay the remote columns onto `settings`. Returns whether anything
    /// changed.
    pub fn apply_to(&self, settings: &mut Settings) -> bool {
        let before = settings.clone();
        if let Some(dark_mode) = self.dark_mode {
            settings.dark_mode = dark_mode;
        }
        if let Some(language) = self.language.as_deref().map(str::trim) {
            if !language.is_empty() {
                settings.language = language.to_string();
            }
        }
        if let Some(enabled) = self.notifications_enabled {
            settings.notifications_enabled = enabled;
        }
        if let Some(auto_sound) = self.auto_sound {
            settings.auto_sound = auto_sound;
        }
        *settings != before
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProfile {
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl RemoteProfile {
    /// Overlay the remote profile onto `profile`. A blank name keeps the
    /// local one.
    pub fn apply_to(&self, profile: &mut Profile) -> bool {
        let mut changed = self
            .profile_name
            .as_deref()
            .map_or(false, |name| profile.rename(name));
        if let Some(avatar) = self.avatar_url.as_ref().filter(|url| !url.trim().is_empty()) {
            if profile.avatar.as_ref() != Some(avatar) {
                profile.avatar = Some(avatar.clone());
                changed = true;
            }
        }
        changed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteState {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub videos: Vec<RemoteVideoState>,
    #[serde(default)]
    pub settings: Option<RemoteSettings>,
    #[serde(default)]
    pub profile: Option<RemoteProfile>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub trait SyncService: Send + Sync {
    fn fetch_state(&self) -> Result<RemoteState, SyncError>;
    fn push(&self, action: &SyncAction) -> Result<(), SyncError>;
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub user_id: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub http_client: Option<HttpClient>,
}

pub struct HttpSyncService {
    http: HttpClient,
    endpoint: Url,
    user_id: String,
    user_agent: String,
}

impl HttpSyncService {
    pub fn new(config: ClientConfig) -> Result<Self, SyncError> {
        let endpoint = config.endpoint.trim();
        if endpoint.is_empty() {
            return Err(SyncError::Disabled);
        }
        let endpoint =
            Url::parse(endpoint).map_err(|_| SyncError::InvalidEndpoint(endpoint.to_string()))?;
        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(config.timeout.unwrap_or(Duration::from_secs(10)))
                .build()?,
        };
        let user_agent = if config.user_agent.trim().is_empty() {
            format!("goshorts/{}", crate::VERSION)
        } else {
            config.user_agent
        };
        Ok(Self {
            http,
            endpoint,
            user_id: config.user_id,
            user_agent,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn decorate(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .header(USER_ID_HEADER, &self.user_id)
    }
}

impl SyncService for HttpSyncService {
    fn fetch_state(&self) -> Result<RemoteState, SyncError> {
        let resp = self
            .decorate(self.http.get(self.endpoint.clone()))
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SyncError::Status { status, body });
        }
        Ok(resp.json()?)
    }

    fn push(&self, action: &SyncAction) -> Result<(), SyncError> {
        tracing::debug!(action = action.name(), "pushing sync action");
        let resp = self
            .decorate(self.http.post(self.endpoint.clone()))
            .json(action)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SyncError::Status { status, body });
        }
        let text = resp.text()?;
        if text.trim().is_empty() {
            return Ok(());
        }
        match serde_json::from_str::<PushResponse>(&text) {
            Ok(payload) if !payload.success && payload.error.is_some() => {
                Err(SyncError::Rejected(payload.error.unwrap_or_default()))
            }
            Ok(payload) => {
                if let Some(message) = payload.message {
                    tracing::trace!(action = action.name(), %message, "sync acknowledged");
                }
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }
}

/// Stand-in used when no endpoint is configured.
#[derive(Debug, Default)]
pub struct DisabledSyncService;

impl SyncService for DisabledSyncService {
    fn fetch_state(&self) -> Result<RemoteState, SyncError> {
        Err(SyncError::Disabled)
    }

    fn push(&self, _action: &SyncAction) -> Result<(), SyncError> {
        Err(SyncError::Disabled)
    }
}
