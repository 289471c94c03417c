use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROFILE_NAME: &str = "@my_profile";
const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "profile_name", default = "default_profile_name")]
    pub display_name: String,
    #[serde(rename = "avatar_url", default)]
    pub avatar: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            display_name: default_profile_name(),
            avatar: None,
        }
    }
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE_NAME.to_string()
}

impl Profile {
    /// Apply an edited nickname. Blank input keeps the current name.
    pub fn rename(&mut self, raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == self.display_name {
            return false;
        }
        self.display_name = trimmed.to_string();
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_notifications")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub auto_sound: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            language: default_language(),
            notifications_enabled: default_notifications(),
            auto_sound: false,
        }
    }
}

fn default_language() -> String {
    "ru".into()
}

fn default_notifications() -> bool {
    true
}

pub const LANGUAGES: [&str; 2] = ["ru", "en"];

impl Settings {
    pub fn cycle_language(&mut self) {
        let position = LANGUAGES
            .iter()
            .position(|lang| *lang == self.language)
            .unwrap_or(0);
        self.language = LANGUAGES[(position + 1) % LANGUAGES.len()].to_string();
    }
}

/// Read an image file and encode it as a `data:` URL for the avatar.
pub fn avatar_data_url(path: &Path) -> Result<String> {
    let meta = fs::metadata(path)
        .with_context(|| format!("profile: read avatar metadata {}", path.display()))?;
    if meta.len() > MAX_AVATAR_BYTES {
        bail!(
            "profile: avatar {} is larger than {} bytes",
            path.display(),
            MAX_AVATAR_BYTES
        );
    }
    let bytes =
        fs::read(path).with_context(|| format!("profile: read avatar {}", path.display()))?;
    let mime = detect_mime(&bytes);
    if !mime.starts_with("image/") {
        bail!("profile: {} is not an image ({mime})", path.display());
    }
    Ok(format!(
        "data:{mime};base64,{}",
        general_purpose::STANDARD.encode(&bytes)
    ))
}

fn detect_mime(bytes: &[u8]) -> String {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => "image/jpeg".into(),
        Ok(ImageFormat::Png) => "image/png".into(),
        Ok(ImageFormat::Gif) => "image/gif".into(),
        Ok(ImageFormat::WebP) => "image/webp".into(),
        _ => {
            let mut buffer = [0u8; 512];
            let mut cursor = std::io::Cursor::new(bytes);
            let read = cursor.read(&mut buffer).unwrap_or(0);
            tree_magic_mini::from_u8(&buffer[..read]).to_string()
        }
    }
}
