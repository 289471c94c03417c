use std::process::{Child, Command, Stdio};

use anyhow::{anyhow, Context, Result};

use crate::data::VideoItem;

pub const URL_PLACEHOLDER: &str = "%URL%";

/// Something that can start and stop playback of one video at a time.
pub trait MediaPlayer: Send {
    fn play(&mut self, video: &VideoItem) -> Result<()>;
    fn pause(&mut self, video: &VideoItem) -> Result<()>;
}

/// Keeps exactly one video playing and hands over on cursor changes.
pub struct PlaybackController {
    player: Box<dyn MediaPlayer>,
    playing: Option<VideoItem>,
}

impl PlaybackController {
    pub fn new(player: Box<dyn MediaPlayer>) -> Self {
        Self {
            player,
            playing: None,
        }
    }

    pub fn playing_id(&self) -> Option<u64> {
        self.playing.as_ref().map(|video| video.id)
    }

    /// Pause whatever is playing and start `video`. No-op when `video` is
    /// already the one playing.
    pub fn switch_to(&mut self, video: &VideoItem) -> Result<()> {
        if self.playing_id() == Some(video.id) {
            return Ok(());
        }
        self.stop()?;
        self.player
            .play(video)
            .with_context(|| format!("play video {}", video.id))?;
        self.playing = Some(video.clone());
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if let Some(previous) = self.playing.take() {
            self.player
                .pause(&previous)
                .with_context(|| format!("pause video {}", previous.id))?;
        }
        Ok(())
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::warn!(?err, "failed to stop playback on shutdown");
        }
    }
}

/// Plays videos in an external player process, looping and muted.
pub struct ExternalPlayer {
    command: Vec<String>,
    child: Option<Child>,
}

impl ExternalPlayer {
    pub fn new(command: Vec<String>) -> Result<Self> {
        if command.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(anyhow!("player command is empty"));
        }
        Ok(Self {
            command,
            child: None,
        })
    }

    fn args_for(&self, url: &str) -> Vec<String> {
        let mut args: Vec<String> = self.command[1..]
            .iter()
            .map(|arg| arg.replace(URL_PLACEHOLDER, url))
            .collect();
        if !self.command.iter().any(|arg| arg.contains(URL_PLACEHOLDER)) {
            args.push(url.to_string());
        }
        args
    }
}

impl MediaPlayer for ExternalPlayer {
    fn play(&mut self, video: &VideoItem) -> Result<()> {
        if video.video_url.trim().is_empty() {
            return Err(anyhow!("video {} has no playback URL", video.id));
        }
        let args = self.args_for(video.video_url.trim());
        tracing::debug!(program = %self.command[0], ?args, "launching player");
        let child = Command::new(&self.command[0])
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("launch {} for {}", self.command[0], video.video_url))?;
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self, _video: &VideoItem) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                child.kill().context("stop player process")?;
            }
            let _ = child.wait();
        }
        Ok(())
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Player used when playback is turned off; remembers nothing.
#[derive(Default)]
pub struct SilentPlayer;

impl MediaPlayer for SilentPlayer {
    fn play(&mut self, _video: &VideoItem) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self, _video: &VideoItem) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mock_catalog;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl MediaPlayer for Recorder {
        fn play(&mut self, video: &VideoItem) -> Result<()> {
            self.events.lock().unwrap().push(format!("play {}", video.id));
            Ok(())
        }

        fn pause(&mut self, video: &VideoItem) -> Result<()> {
            self.events.lock().unwrap().push(format!("pause {}", video.id));
            Ok(())
        }
    }

    #[test]
    fn switching_pauses_previous_then_plays_next() {
        let recorder = Recorder::default();
        let events = recorder.events.clone();
        let catalog = mock_catalog();
        let mut controller = PlaybackController::new(Box::new(recorder));

        controller.switch_to(&catalog[0]).unwrap();
        controller.switch_to(&catalog[0]).unwrap();
        controller.switch_to(&catalog[1]).unwrap();
        assert_eq!(controller.playing_id(), Some(2));
        drop(controller);

        assert_eq!(
            *events.lock().unwrap(),
            vec!["play 1", "pause 1", "play 2", "pause 2"]
        );
    }

    #[test]
    fn placeholder_is_substituted() {
        let player = ExternalPlayer::new(vec![
            "mpv".into(),
            "--loop-file=inf".into(),
            "%URL%".into(),
        ])
        .unwrap();
        assert_eq!(
            player.args_for("https://v.test/a.mp4"),
            vec!["--loop-file=inf", "https://v.test/a.mp4"]
        );
    }

    #[test]
    fn url_is_appended_without_placeholder() {
        let player = ExternalPlayer::new(vec!["vlc".into()]).unwrap();
        assert_eq!(player.args_for("https://v.test/b.mp4"), vec!["https://v.test/b.mp4"]);
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(ExternalPlayer::new(Vec::new()).is_err());
        assert!(ExternalPlayer::new(vec!["  ".into()]).is_err());
    }
}
