use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::VideoItem;

const EMBED_BASE: &str = "https://www.tiktok.com/embed/v2";
const FALLBACK_AUTHOR: &str = "@tiktok_user";
const FALLBACK_TAG: &str = "tiktok";

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/video/(\d+)").expect("video id regex"));
static AUTHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([a-zA-Z0-9._]+)").expect("author regex"));
static HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").expect("hashtag regex"));

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("video URL is required")]
    Empty,
    #[error("no /video/<id> segment in {0:?}")]
    MissingVideoId(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedVideo {
    pub source_url: String,
    pub external_id: String,
    pub embed_url: String,
    pub author: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl ImportedVideo {
    /// Turn the parsed metadata into a feed entry with fresh counters.
    pub fn into_item(self, id: u64) -> VideoItem {
        VideoItem {
            id,
            video_url: self.embed_url,
            author: self.author,
            description: self.description,
            likes: 0,
            comments: 0,
            shares: 0,
            views: 0,
            live_viewers: 0,
            is_liked: false,
            is_saved: false,
            is_following: false,
            is_trending: false,
            is_live: false,
            tags: self.tags,
            comment_list: Vec::new(),
        }
    }
}

/// Extract video metadata from a share URL such as
/// `https://www.tiktok.com/@user/video/123#tag`.
pub fn parse_video_url(raw: &str) -> Result<ImportedVideo, ImportError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(ImportError::Empty);
    }
    let external_id = VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ImportError::MissingVideoId(url.to_string()))?;

    let author = AUTHOR
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("@{}", m.as_str()))
        .unwrap_or_else(|| FALLBACK_AUTHOR.to_string());

    let mut tags: Vec<String> = HASHTAG
        .captures_iter(url)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    if tags.is_empty() {
        tags.push(FALLBACK_TAG.to_string());
    }

    Ok(ImportedVideo {
        source_url: url.to_string(),
        embed_url: format!("{EMBED_BASE}/{external_id}"),
        description: format!("TikTok video #{external_id}"),
        external_id,
        author,
        tags,
    })
}
