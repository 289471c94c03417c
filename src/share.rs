use anyhow::{anyhow, Context, Result};
use arboard::Clipboard;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::data::VideoItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    Telegram,
    WhatsApp,
    Vk,
    X,
    Facebook,
}

impl ShareTarget {
    pub const ALL: [ShareTarget; 5] = [
        ShareTarget::Telegram,
        ShareTarget::WhatsApp,
        ShareTarget::Vk,
        ShareTarget::X,
        ShareTarget::Facebook,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShareTarget::Telegram => "Telegram",
            ShareTarget::WhatsApp => "WhatsApp",
            ShareTarget::Vk => "VK",
            ShareTarget::X => "X",
            ShareTarget::Facebook => "Facebook",
        }
    }

    /// Deep link that opens the target's share dialog for `video`.
    pub fn link(self, video: &VideoItem) -> String {
        let url = encode(&video.video_url);
        let text = encode(&share_text(video));
        match self {
            ShareTarget::Telegram => format!("https://t.me/share/url?url={url}&text={text}"),
            ShareTarget::WhatsApp => format!("https://wa.me/?text={text}%20{url}"),
            ShareTarget::Vk => format!("https://vk.com/share.php?url={url}&title={text}"),
            ShareTarget::X => format!("https://twitter.com/intent/tweet?url={url}&text={text}"),
            ShareTarget::Facebook => format!("https://www.facebook.com/sharer/sharer.php?u={url}"),
        }
    }
}

pub fn share_text(video: &VideoItem) -> String {
    format!("{} {}", video.author, video.description)
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, NON_ALPHANUMERIC).to_string()
}

pub fn open_in_browser(link: &str) -> Result<()> {
    webbrowser::open(link).with_context(|| format!("open {link} in browser"))
}

pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().map_err(|err| anyhow!("create clipboard: {err}"))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|err| anyhow!("copy to clipboard: {err}"))
}
