use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use ratatui::{Frame, Terminal};
use textwrap::{wrap, Options as WrapOptions};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::data::{Achievement, VideoItem};
use crate::feed::{FeedError, FeedState};
use crate::gesture::{Swipe, SwipeDetector};
use crate::import;
use crate::player::PlaybackController;
use crate::profile::{self, Profile, Settings};
use crate::recommend;
use crate::search;
use crate::share::{self, ShareTarget};
use crate::storage;
use crate::sync::{RemoteState, SyncAction, SyncError, SyncService};
use crate::view::{Overlay, Tab, ViewState};

/// Terminal rows are mapped onto logical pixels so the swipe threshold keeps
/// its touch-screen meaning.
const LOGICAL_PX_PER_ROW: f64 = 24.0;
const TICK_RATE: Duration = Duration::from_millis(120);
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ICON_LIKE: &str = "♥";
const ICON_COMMENTS: &str = "💬";
const ICON_SHARES: &str = "↗";
const ICON_VIEWS: &str = "👁";
const ICON_LIVE: &str = "●";
const ICON_TRENDING: &str = "🔥";
const ICON_SAVED: &str = "★";
const ACHIEVEMENT_BAR_WIDTH: usize = 20;
const SETTINGS_LABELS: [&str; 4] = ["Dark mode", "Language", "Notifications", "Auto sound"];

struct Palette {
    bg: Color,
    panel_bg: Color,
    panel_focused_bg: Color,
    selected_bg: Color,
    border_idle: Color,
    border_focused: Color,
    text_primary: Color,
    text_secondary: Color,
    accent: Color,
    like: Color,
    success: Color,
    error: Color,
}

const SUNSET: Palette = Palette {
    bg: Color::Rgb(40, 28, 38),
    panel_bg: Color::Rgb(52, 36, 50),
    panel_focused_bg: Color::Rgb(74, 48, 66),
    selected_bg: Color::Rgb(102, 62, 84),
    border_idle: Color::Rgb(88, 60, 80),
    border_focused: Color::Rgb(255, 138, 101),
    text_primary: Color::Rgb(250, 236, 226),
    text_secondary: Color::Rgb(204, 178, 176),
    accent: Color::Rgb(255, 138, 101),
    like: Color::Rgb(255, 64, 129),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
};

const MIDNIGHT: Palette = Palette {
    bg: Color::Rgb(17, 17, 27),
    panel_bg: Color::Rgb(24, 24, 37),
    panel_focused_bg: Color::Rgb(49, 50, 68),
    selected_bg: Color::Rgb(69, 71, 90),
    border_idle: Color::Rgb(49, 50, 68),
    border_focused: Color::Rgb(137, 180, 250),
    text_primary: Color::Rgb(205, 214, 244),
    text_secondary: Color::Rgb(166, 173, 200),
    accent: Color::Rgb(137, 180, 250),
    like: Color::Rgb(243, 139, 168),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
};

fn palette_named(name: &str) -> &'static Palette {
    match name.trim().to_ascii_lowercase().as_str() {
        "midnight" | "dark" => &MIDNIGHT,
        _ => &SUNSET,
    }
}

enum AsyncResponse {
    RemoteState {
        result: Result<RemoteState, SyncError>,
    },
    Sync {
        action: &'static str,
        result: Result<(), SyncError>,
    },
}

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= TICK_RATE {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_tick = Instant::now();
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ProfileField {
    Name,
    Avatar,
}

pub struct Options {
    pub status_message: String,
    pub catalog: Vec<VideoItem>,
    pub achievements: Vec<Achievement>,
    pub profile: Profile,
    pub settings: Settings,
    pub user_id: String,
    pub sync_service: Arc<dyn SyncService>,
    pub store: Arc<storage::Store>,
    pub playback: PlaybackController,
    pub autoplay: bool,
    pub theme: String,
    pub swipe_threshold: f64,
    pub splash_delay: Duration,
    pub config_path: String,
    pub fetch_state_on_start: bool,
}

pub struct Model {
    status_message: String,
    feed: FeedState,
    view: ViewState,
    swipe: SwipeDetector,
    achievements: Vec<Achievement>,
    profile: Profile,
    settings: Settings,
    settings_dirty: bool,
    user_id: String,
    sync_service: Arc<dyn SyncService>,
    store: Arc<storage::Store>,
    playback: PlaybackController,
    playing: bool,
    theme: String,
    splash_until: Option<Instant>,
    config_path: String,
    search_query: String,
    search_tag: Option<String>,
    search_editing: bool,
    search_selected: usize,
    favorites_selected: usize,
    overlay_selected: usize,
    comment_draft: String,
    upload_draft: String,
    edit_name: String,
    edit_avatar: String,
    edit_field: ProfileField,
    pending_syncs: usize,
    spinner: Spinner,
    needs_redraw: bool,
    response_tx: Sender<AsyncResponse>,
    response_rx: Receiver<AsyncResponse>,
}

impl Model {
    pub fn new(options: Options) -> Self {
        let (response_tx, response_rx) = unbounded();
        let splash_until = if options.splash_delay.is_zero() {
            None
        } else {
            Some(Instant::now() + options.splash_delay)
        };

        let mut model = Self {
            status_message: options.status_message,
            feed: FeedState::new(options.catalog),
            view: ViewState::default(),
            swipe: SwipeDetector::new(options.swipe_threshold),
            achievements: options.achievements,
            profile: options.profile,
            settings: options.settings,
            settings_dirty: false,
            user_id: options.user_id,
            sync_service: options.sync_service,
            store: options.store,
            playback: options.playback,
            playing: options.autoplay,
            theme: options.theme,
            splash_until,
            config_path: options.config_path,
            search_query: String::new(),
            search_tag: None,
            search_editing: false,
            search_selected: 0,
            favorites_selected: 0,
            overlay_selected: 0,
            comment_draft: String::new(),
            upload_draft: String::new(),
            edit_name: String::new(),
            edit_avatar: String::new(),
            edit_field: ProfileField::Name,
            pending_syncs: 0,
            spinner: Spinner::new(),
            needs_redraw: true,
            response_tx,
            response_rx,
        };

        if options.fetch_state_on_start {
            model.queue_state_fetch();
        }
        model.sync_playback();
        model
    }

    fn queue_state_fetch(&mut self) {
        self.pending_syncs += 1;
        let tx = self.response_tx.clone();
        let service = self.sync_service.clone();
        thread::spawn(move || {
            let result = service.fetch_state();
            let _ = tx.send(AsyncResponse::RemoteState { result });
        });
    }

    fn dispatch_sync(&mut self, action: SyncAction) {
        self.pending_syncs += 1;
        let tx = self.response_tx.clone();
        let service = self.sync_service.clone();
        tracing::debug!(action = action.name(), "dispatching sync call");
        thread::spawn(move || {
            let result = service.push(&action);
            let _ = tx.send(AsyncResponse::Sync {
                action: action.name(),
                result,
            });
        });
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        if let Err(err) = self.playback.stop() {
            tracing::warn!(error = %format!("{err:#}"), "failed to stop playback");
        }

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();

        loop {
            if self.poll_async() {
                self.mark_dirty();
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = TICK_RATE
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key.code) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(err) => {
                                self.status_message = format!("Error: {}", err);
                                self.mark_dirty();
                            }
                        }
                    }
                    Event::Mouse(mouse) => {
                        if let Err(err) = self.handle_mouse(mouse) {
                            self.status_message = format!("Error: {}", err);
                            self.mark_dirty();
                        }
                    }
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= TICK_RATE {
                last_tick = Instant::now();
                if self.tick() {
                    self.mark_dirty();
                }
            }
        }

        Ok(())
    }

    fn tick(&mut self) -> bool {
        let mut changed = false;
        if let Some(until) = self.splash_until {
            if Instant::now() >= until {
                self.splash_until = None;
                changed = true;
            }
        }
        if self.pending_syncs > 0 {
            changed |= self.spinner.advance();
        } else {
            self.spinner.reset();
        }
        changed
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn palette(&self) -> &'static Palette {
        if self.settings.dark_mode {
            &MIDNIGHT
        } else {
            palette_named(&self.theme)
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if self.splash_until.take().is_some() {
            self.mark_dirty();
            return Ok(false);
        }

        if let Some(overlay) = self.view.overlay() {
            return self.handle_overlay_key(overlay, code);
        }

        if self.search_editing {
            self.handle_search_input(code);
            return Ok(false);
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Tab => self.switch_tab(self.view.tab().next()),
            KeyCode::BackTab => self.switch_tab(self.view.tab().previous()),
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if let Some(tab) = Tab::from_hotkey(ch) {
                    self.switch_tab(tab);
                }
            }
            KeyCode::Char('t') => self.open_overlay(Overlay::Trending),
            KeyCode::Char('v') => self.open_overlay(Overlay::Live),
            KeyCode::Char('r') => self.open_overlay(Overlay::Recommendations),
            KeyCode::Char('u') => self.open_overlay(Overlay::Upload),
            KeyCode::Char('o') => self.open_overlay(Overlay::Settings),
            KeyCode::Char('a') => self.open_overlay(Overlay::Achievements),
            KeyCode::Char('e') => self.open_overlay(Overlay::EditProfile),
            KeyCode::Char('?') => self.open_overlay(Overlay::About),
            _ => match self.view.tab() {
                Tab::Home => self.handle_home_key(code)?,
                Tab::Search => self.handle_search_key(code)?,
                Tab::Favorites => self.handle_favorites_key(code)?,
                Tab::Profile => {}
            },
        }
        Ok(false)
    }

    fn handle_home_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.advance(),
            KeyCode::Up | KeyCode::Char('k') => self.retreat(),
            KeyCode::Char('l') => self.toggle_like()?,
            KeyCode::Char('s') => self.toggle_save()?,
            KeyCode::Char('f') => self.toggle_follow()?,
            KeyCode::Char('c') => self.open_overlay(Overlay::Comments),
            KeyCode::Char('x') => self.open_overlay(Overlay::Share),
            KeyCode::Char('p') => self.toggle_playback(),
            _ => {}
        }
        Ok(())
    }

    fn handle_search_key(&mut self, code: KeyCode) -> Result<()> {
        let results = self.search_results();
        match code {
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.search_editing = true;
                self.status_message = "Type to search. Enter or Esc to finish.".to_string();
            }
            KeyCode::Char('g') => self.cycle_search_tag(),
            KeyCode::Char('x') => {
                self.search_query.clear();
                self.search_tag = None;
                self.search_selected = 0;
                self.status_message = "Search filters cleared.".to_string();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.search_selected = step_index(self.search_selected, results.len(), 1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.search_selected = step_index(self.search_selected, results.len(), -1);
            }
            KeyCode::Enter => {
                if let Some(video) = results.get(self.search_selected) {
                    self.jump_to(video.id)?;
                }
            }
            _ => return Ok(()),
        }
        self.mark_dirty();
        Ok(())
    }

    fn handle_search_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Esc => {
                self.search_editing = false;
                let count = self.search_results().len();
                self.status_message = format!("{count} video(s) match.");
            }
            other => {
                if edit_text(&mut self.search_query, other) {
                    self.search_selected = 0;
                }
            }
        }
        self.mark_dirty();
    }

    fn handle_favorites_key(&mut self, code: KeyCode) -> Result<()> {
        let favorites = self.feed.favorites();
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.favorites_selected = step_index(self.favorites_selected, favorites.len(), 1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.favorites_selected = step_index(self.favorites_selected, favorites.len(), -1);
            }
            KeyCode::Enter => {
                if let Some(video) = favorites.get(self.favorites_selected) {
                    self.jump_to(video.id)?;
                }
            }
            KeyCode::Char('s') => {
                if let Some(video) = favorites.get(self.favorites_selected) {
                    self.apply_save(video.id)?;
                    let remaining = favorites.len().saturating_sub(1);
                    self.favorites_selected = self
                        .favorites_selected
                        .min(remaining.saturating_sub(1));
                }
            }
            _ => return Ok(()),
        }
        self.mark_dirty();
        Ok(())
    }

    fn handle_overlay_key(&mut self, overlay: Overlay, code: KeyCode) -> Result<bool> {
        if code == KeyCode::Esc {
            self.close_overlay();
            return Ok(false);
        }
        if code == KeyCode::Char('q') && !overlay.takes_text_input() {
            return Ok(true);
        }

        match overlay {
            Overlay::Trending | Overlay::Live | Overlay::Recommendations => {
                let videos = self.overlay_videos(overlay);
                match code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.overlay_selected = step_index(self.overlay_selected, videos.len(), 1);
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.overlay_selected = step_index(self.overlay_selected, videos.len(), -1);
                    }
                    KeyCode::Enter => {
                        if let Some(video) = videos.get(self.overlay_selected) {
                            self.view.close();
                            self.jump_to(video.id)?;
                        }
                    }
                    _ => {}
                }
            }
            Overlay::Comments => match code {
                KeyCode::Enter => self.submit_comment(),
                other => {
                    edit_text(&mut self.comment_draft, other);
                }
            },
            Overlay::Settings => match code {
                KeyCode::Down | KeyCode::Char('j') => {
                    self.overlay_selected =
                        step_index(self.overlay_selected, SETTINGS_LABELS.len(), 1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.overlay_selected =
                        step_index(self.overlay_selected, SETTINGS_LABELS.len(), -1);
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.toggle_setting(self.overlay_selected),
                _ => {}
            },
            Overlay::Share => {
                let rows = ShareTarget::ALL.len() + 1;
                match code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.overlay_selected = step_index(self.overlay_selected, rows, 1);
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.overlay_selected = step_index(self.overlay_selected, rows, -1);
                    }
                    KeyCode::Enter => self.activate_share(self.overlay_selected)?,
                    _ => {}
                }
            }
            Overlay::Upload => match code {
                KeyCode::Enter => self.submit_upload()?,
                other => {
                    edit_text(&mut self.upload_draft, other);
                }
            },
            Overlay::Achievements => match code {
                KeyCode::Down | KeyCode::Char('j') => {
                    self.overlay_selected =
                        step_index(self.overlay_selected, self.achievements.len(), 1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.overlay_selected =
                        step_index(self.overlay_selected, self.achievements.len(), -1);
                }
                _ => {}
            },
            Overlay::About => {
                if code == KeyCode::Enter {
                    self.close_overlay();
                }
            }
            Overlay::EditProfile => match code {
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    self.edit_field = match self.edit_field {
                        ProfileField::Name => ProfileField::Avatar,
                        ProfileField::Avatar => ProfileField::Name,
                    };
                }
                KeyCode::Enter => self.submit_profile()?,
                other => {
                    let buffer = match self.edit_field {
                        ProfileField::Name => &mut self.edit_name,
                        ProfileField::Avatar => &mut self.edit_avatar,
                    };
                    edit_text(buffer, other);
                }
            },
        }

        self.mark_dirty();
        Ok(false)
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Result<()> {
        if self.splash_until.is_some() || self.view.overlay().is_some() {
            return Ok(());
        }
        if self.view.tab() != Tab::Home {
            return Ok(());
        }

        let y = f64::from(event.row) * LOGICAL_PX_PER_ROW;
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.swipe.touch_start(y),
            MouseEventKind::Drag(MouseButton::Left) => self.swipe.touch_move(y),
            MouseEventKind::Up(MouseButton::Left) => {
                if self.swipe.in_progress() {
                    self.swipe.touch_move(y);
                }
                match self.swipe.touch_end() {
                    Swipe::Up => self.advance(),
                    Swipe::Down => self.retreat(),
                    Swipe::None => {}
                }
            }
            MouseEventKind::ScrollDown => self.advance(),
            MouseEventKind::ScrollUp => self.retreat(),
            _ => {}
        }
        Ok(())
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.view.select_tab(tab) {
            self.search_editing = false;
            self.status_message = format!("{} tab.", tab.title());
            self.mark_dirty();
        }
    }

    fn open_overlay(&mut self, overlay: Overlay) {
        if matches!(overlay, Overlay::Comments | Overlay::Share) && self.feed.current().is_none() {
            self.status_message = "The feed is empty.".to_string();
            self.mark_dirty();
            return;
        }
        self.overlay_selected = 0;
        match overlay {
            Overlay::Comments => self.comment_draft.clear(),
            Overlay::Upload => self.upload_draft.clear(),
            Overlay::EditProfile => {
                self.edit_name = self.profile.display_name.clone();
                self.edit_avatar.clear();
                self.edit_field = ProfileField::Name;
            }
            _ => {}
        }
        self.view.open(overlay);
        self.status_message = format!("{} opened. Esc to close.", overlay.title());
        self.mark_dirty();
    }

    fn close_overlay(&mut self) {
        if let Some(closed) = self.view.close() {
            if closed == Overlay::Settings && self.settings_dirty {
                self.commit_settings();
            } else {
                self.status_message = format!("{} closed.", closed.title());
            }
        }
        self.mark_dirty();
    }

    fn advance(&mut self) {
        if self.feed.next() {
            self.after_cursor_change();
        }
    }

    fn retreat(&mut self) {
        if self.feed.previous() {
            self.after_cursor_change();
        }
    }

    fn jump_to(&mut self, id: u64) -> Result<()> {
        self.view.select_tab(Tab::Home);
        self.search_editing = false;
        if self.feed.select_id(id)? {
            self.after_cursor_change();
        }
        self.mark_dirty();
        Ok(())
    }

    fn after_cursor_change(&mut self) {
        self.sync_playback();
        if let Some(video) = self.feed.current() {
            self.status_message = format!(
                "{} ({}/{})",
                video.author,
                self.feed.index() + 1,
                self.feed.len()
            );
        }
        self.mark_dirty();
    }

    fn sync_playback(&mut self) {
        if !self.playing {
            return;
        }
        let Some(video) = self.feed.current().cloned() else {
            return;
        };
        if let Err(err) = self.playback.switch_to(&video) {
            tracing::warn!(video = video.id, error = %format!("{err:#}"), "playback failed");
            self.status_message = format!("Playback failed: {err:#}");
            self.playing = false;
        }
    }

    fn toggle_playback(&mut self) {
        if self.playing {
            self.playing = false;
            match self.playback.stop() {
                Ok(()) => self.status_message = "Playback stopped.".to_string(),
                Err(err) => self.status_message = format!("Error: {err:#}"),
            }
        } else {
            self.playing = true;
            self.sync_playback();
            if self.playing {
                if let Some(video) = self.feed.current() {
                    self.status_message = format!("Playing {} (looped, muted).", video.author);
                }
            }
        }
        self.mark_dirty();
    }

    fn current_id(&self) -> Result<u64, FeedError> {
        self.feed
            .current()
            .map(|video| video.id)
            .ok_or(FeedError::UnknownVideo(0))
    }

    fn toggle_like(&mut self) -> Result<()> {
        let id = self.current_id()?;
        let is_liked = self.feed.toggle_like(id)?.is_liked;
        self.status_message = if is_liked { "Liked." } else { "Like removed." }.to_string();
        self.dispatch_sync(SyncAction::LikeVideo {
            video_id: id,
            is_liked,
        });
        self.mark_dirty();
        Ok(())
    }

    fn toggle_save(&mut self) -> Result<()> {
        let id = self.current_id()?;
        self.apply_save(id)
    }

    fn apply_save(&mut self, id: u64) -> Result<()> {
        let is_saved = self.feed.toggle_save(id)?.is_saved;
        self.status_message = if is_saved {
            "Saved to favorites."
        } else {
            "Removed from favorites."
        }
        .to_string();
        self.dispatch_sync(SyncAction::SaveVideo {
            video_id: id,
            is_saved,
        });
        self.mark_dirty();
        Ok(())
    }

    fn toggle_follow(&mut self) -> Result<()> {
        let id = self.current_id()?;
        let video = self.feed.toggle_follow(id)?;
        self.status_message = if video.is_following {
            format!("Following {}.", video.author)
        } else {
            format!("Unfollowed {}.", video.author)
        };
        self.mark_dirty();
        Ok(())
    }

    fn cycle_search_tag(&mut self) {
        let tags = search::all_tags(self.feed.items());
        self.search_tag = match self.search_tag.as_deref() {
            None => tags.first().cloned(),
            Some(current) => tags
                .iter()
                .position(|tag| tag == current)
                .and_then(|index| tags.get(index + 1))
                .cloned(),
        };
        self.search_selected = 0;
        self.status_message = match &self.search_tag {
            Some(tag) => format!("Filtering by #{tag}."),
            None => "Showing all tags.".to_string(),
        };
    }

    fn search_results(&self) -> Vec<VideoItem> {
        search::filter(
            self.feed.items(),
            &self.search_query,
            self.search_tag.as_deref(),
        )
    }

    fn overlay_videos(&self, overlay: Overlay) -> Vec<VideoItem> {
        match overlay {
            Overlay::Trending => search::trending(self.feed.items()),
            Overlay::Live => search::live(self.feed.items()),
            Overlay::Recommendations => recommend::recommend(self.feed.history(), self.feed.items()),
            _ => Vec::new(),
        }
    }

    fn submit_comment(&mut self) {
        let length = self.comment_draft.trim().chars().count();
        if length == 0 {
            self.status_message = "Comment is empty.".to_string();
            return;
        }
        tracing::debug!(length, "comment submitted");
        self.comment_draft.clear();
        self.status_message = "Comment sent.".to_string();
    }

    fn toggle_setting(&mut self, row: usize) {
        match row {
            0 => self.settings.dark_mode = !self.settings.dark_mode,
            1 => self.settings.cycle_language(),
            2 => self.settings.notifications_enabled = !self.settings.notifications_enabled,
            3 => self.settings.auto_sound = !self.settings.auto_sound,
            _ => return,
        }
        self.settings_dirty = true;
    }

    fn commit_settings(&mut self) {
        self.settings_dirty = false;
        match self.store.save_settings(&self.settings) {
            Ok(()) => self.status_message = "Settings saved.".to_string(),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "failed to persist settings");
                self.status_message = format!("Settings not saved locally: {err:#}");
            }
        }
        self.dispatch_sync(SyncAction::UpdateSettings {
            settings: self.settings.clone(),
        });
    }

    fn activate_share(&mut self, row: usize) -> Result<()> {
        let Some(video) = self.feed.current().cloned() else {
            return Ok(());
        };
        match ShareTarget::ALL.get(row).copied() {
            Some(target) => {
                share::open_in_browser(&target.link(&video))?;
                self.status_message = format!("Shared via {}.", target.label());
            }
            None => {
                share::copy_to_clipboard(&video.video_url)?;
                self.status_message = "Link copied to clipboard.".to_string();
            }
        }
        self.feed.record_share(video.id)?;
        self.view.close();
        Ok(())
    }

    fn submit_upload(&mut self) -> Result<()> {
        let imported = import::parse_video_url(&self.upload_draft)?;
        let external_id = imported.external_id.clone();
        let existing = self
            .feed
            .find_by_video_url(&imported.embed_url)
            .map(|video| video.id);
        if let Some(existing) = existing {
            tracing::info!(source = %imported.source_url, video = existing, "video already imported");
            self.upload_draft.clear();
            self.view.close();
            self.jump_to(existing)?;
            self.status_message = format!("TikTok video #{external_id} is already in the feed.");
            return Ok(());
        }
        let imported_from = imported.source_url.clone();
        let item = imported.into_item(self.feed.next_free_id());
        self.feed.prepend(item)?;
        tracing::info!(source = %imported_from, external_id = %external_id, "imported video");
        self.upload_draft.clear();
        self.view.close();
        self.status_message = format!("Imported TikTok video #{external_id} at the top of the feed.");
        Ok(())
    }

    fn submit_profile(&mut self) -> Result<()> {
        let mut updated = self.profile.clone();
        let renamed = updated.rename(&self.edit_name);
        let avatar_path = self.edit_avatar.trim();
        let avatar_changed = if avatar_path.is_empty() {
            false
        } else {
            updated.avatar = Some(profile::avatar_data_url(&expand_home(avatar_path))?);
            true
        };

        self.view.close();
        if !renamed && !avatar_changed {
            self.status_message = "Profile unchanged.".to_string();
            return Ok(());
        }

        self.profile = updated;
        if let Err(err) = self.store.save_profile(&self.profile) {
            tracing::warn!(error = %format!("{err:#}"), "failed to persist profile");
        }
        self.dispatch_sync(SyncAction::profile(&self.profile));
        self.status_message = format!("Profile saved as {}.", self.profile.display_name);
        Ok(())
    }

    fn poll_async(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.response_rx.try_recv() {
            self.handle_async_response(message);
            changed = true;
        }
        changed
    }

    fn handle_async_response(&mut self, message: AsyncResponse) {
        self.pending_syncs = self.pending_syncs.saturating_sub(1);
        match message {
            AsyncResponse::RemoteState { result } => match result {
                Ok(state) => self.apply_remote_state(state),
                Err(SyncError::Disabled) => {
                    tracing::debug!("sync disabled; skipping remote state");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to fetch remote state");
                    self.status_message = format!("Could not load saved state: {err}");
                }
            },
            AsyncResponse::Sync { action, result } => match result {
                Ok(()) => tracing::debug!(action, "sync call succeeded"),
                Err(SyncError::Disabled) => tracing::trace!(action, "sync disabled"),
                Err(err) => {
                    tracing::warn!(action, error = %err, "sync call failed");
                    self.status_message = format!("Sync {action} failed: {err}");
                }
            },
        }
    }

    fn apply_remote_state(&mut self, state: RemoteState) {
        let mut restored = 0usize;
        for video in &state.videos {
            match self
                .feed
                .restore_flags(video.video_id, video.is_saved, video.is_liked)
            {
                Ok(true) => restored += 1,
                Ok(false) => {}
                Err(err) => tracing::debug!(error = %err, "ignoring remote flags"),
            }
        }
        if let Some(settings) = state.settings {
            if settings.apply_to(&mut self.settings) {
                if let Err(err) = self.store.save_settings(&self.settings) {
                    tracing::warn!(error = %format!("{err:#}"), "failed to persist remote settings");
                }
            }
        }
        if let Some(profile) = state.profile {
            if profile.apply_to(&mut self.profile) {
                if let Err(err) = self.store.save_profile(&self.profile) {
                    tracing::warn!(error = %format!("{err:#}"), "failed to persist remote profile");
                }
            }
        }
        tracing::info!(restored, "applied remote state");
        if self.settings.notifications_enabled {
            self.status_message = format!("Synced with server ({restored} video(s) restored).");
        }
    }

    fn footer_text(&self) -> String {
        if self.splash_until.is_some() {
            return "Press any key to start".to_string();
        }
        if let Some(overlay) = self.view.overlay() {
            return match overlay {
                Overlay::Trending | Overlay::Live | Overlay::Recommendations => {
                    "j/k select · Enter watch · Esc close".to_string()
                }
                Overlay::Comments => "Type a comment · Enter send · Esc close".to_string(),
                Overlay::Settings => "j/k select · Enter toggle · Esc save and close".to_string(),
                Overlay::Share => "j/k select · Enter share · Esc close".to_string(),
                Overlay::Upload => "Paste a TikTok URL · Enter import · Esc cancel".to_string(),
                Overlay::EditProfile => {
                    "Tab switch field · Enter save · Esc cancel".to_string()
                }
                Overlay::About | Overlay::Achievements => "Esc close · q quit".to_string(),
            };
        }
        match self.view.tab() {
            Tab::Home => "j/k or drag: next/prev · l like · s save · f follow · c comments · x share · p play · t trending · v live · r for you · u upload · ? about · q quit".to_string(),
            Tab::Search if self.search_editing => "Type to search · Enter/Esc done".to_string(),
            Tab::Search => "/ search · g cycle tag · x clear · j/k select · Enter watch · q quit".to_string(),
            Tab::Favorites => "j/k select · Enter watch · s unsave · q quit".to_string(),
            Tab::Profile => "e edit profile · a achievements · o settings · q quit".to_string(),
        }
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let palette = self.palette();
        let full = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(palette.bg)), full);

        if self.splash_until.is_some() {
            self.draw_splash(frame, full);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(full);

        let status_text = if self.pending_syncs > 0 {
            format!("{} {}", self.spinner.frame(), self.status_message)
                .trim()
                .to_string()
        } else {
            self.status_message.clone()
        };
        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .fg(palette.text_primary)
                .bg(palette.panel_focused_bg)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, layout[0]);

        let titles: Vec<Line<'static>> = Tab::ALL
            .iter()
            .map(|tab| Line::from(format!("{} {}", tab.hotkey(), tab.title())))
            .collect();
        let selected = Tab::ALL
            .iter()
            .position(|tab| *tab == self.view.tab())
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(palette.text_secondary).bg(palette.panel_bg))
            .highlight_style(
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .divider("│");
        frame.render_widget(tabs, layout[1]);

        match self.view.tab() {
            Tab::Home => self.draw_home(frame, layout[2]),
            Tab::Search => self.draw_search(frame, layout[2]),
            Tab::Favorites => self.draw_favorites(frame, layout[2]),
            Tab::Profile => self.draw_profile(frame, layout[2]),
        }

        let footer = Paragraph::new(self.footer_text())
            .style(
                Style::default()
                    .fg(palette.text_secondary)
                    .bg(palette.panel_bg)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(footer, layout[3]);

        if let Some(overlay) = self.view.overlay() {
            self.draw_overlay(frame, layout[2], overlay);
        }
    }

    fn draw_splash(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let popup = centered_rect(60, 40, area);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "▶  GoShorts",
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Short videos, one swipe at a time.",
                Style::default().fg(palette.text_secondary),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("v{}", crate::VERSION),
                Style::default().fg(palette.text_secondary),
            )),
        ];
        let splash = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.border_focused))
                    .style(Style::default().bg(palette.panel_bg)),
            );
        frame.render_widget(splash, popup);
    }

    fn panel_block(&self, title: String) -> Block<'static> {
        let palette = self.palette();
        Block::default()
            .title(Span::styled(
                title,
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border_idle))
            .style(Style::default().bg(palette.panel_bg))
    }

    fn draw_home(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let Some(video) = self.feed.current() else {
            let empty = Paragraph::new("No videos yet. Press u to import one.")
                .style(Style::default().fg(palette.text_secondary))
                .alignment(Alignment::Center)
                .block(self.panel_block(" Home ".to_string()));
            frame.render_widget(empty, area);
            return;
        };

        let title = format!(" {}/{} ", self.feed.index() + 1, self.feed.len());
        let width = area.width.saturating_sub(4).max(10) as usize;
        let card = Paragraph::new(self.video_card(video, width))
            .block(
                self.panel_block(title)
                    .border_style(Style::default().fg(palette.border_focused)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(card, area);
    }

    fn video_card(&self, video: &VideoItem, width: usize) -> Text<'static> {
        let palette = self.palette();
        let primary = Style::default().fg(palette.text_primary);
        let secondary = Style::default().fg(palette.text_secondary);
        let mut lines: Vec<Line<'static>> = Vec::new();

        let follow = if video.is_following {
            Span::styled(" ✓ Following ", Style::default().fg(palette.success))
        } else {
            Span::styled(" + Follow (f) ", secondary)
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} ", video.avatar_initial()),
                Style::default()
                    .fg(palette.bg)
                    .bg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                video.author.clone(),
                primary.add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            follow,
        ]));

        let mut badges = Vec::new();
        if video.is_trending {
            badges.push(Span::styled(
                format!("{ICON_TRENDING} Trending  "),
                Style::default().fg(palette.accent),
            ));
        }
        if video.is_live {
            badges.push(Span::styled(
                format!(
                    "{ICON_LIVE} LIVE · {} watching",
                    format_count(video.live_viewers)
                ),
                Style::default()
                    .fg(palette.error)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        if !badges.is_empty() {
            lines.push(Line::from(badges));
        }
        lines.push(Line::from(""));

        for row in wrap(&video.description, WrapOptions::new(width)) {
            lines.push(Line::from(Span::styled(row.into_owned(), primary)));
        }
        lines.push(Line::from(""));

        let tags: Vec<Span<'static>> = video
            .tags
            .iter()
            .map(|tag| Span::styled(format!("#{tag}  "), Style::default().fg(palette.accent)))
            .collect();
        lines.push(Line::from(tags));
        lines.push(Line::from(""));

        let like_style = if video.is_liked {
            Style::default()
                .fg(palette.like)
                .add_modifier(Modifier::BOLD)
        } else {
            secondary
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{ICON_LIKE} {}", format_count(video.likes)), like_style),
            Span::styled(
                format!("   {ICON_COMMENTS} {}", format_count(video.comments)),
                secondary,
            ),
            Span::styled(
                format!("   {ICON_SHARES} {}", format_count(video.shares)),
                secondary,
            ),
            Span::styled(
                format!("   {ICON_VIEWS} {}", format_count(video.views)),
                secondary,
            ),
        ]));

        let mut flags = Vec::new();
        if video.is_saved {
            flags.push(Span::styled(
                format!("{ICON_SAVED} Saved  "),
                Style::default().fg(palette.success),
            ));
        }
        if self.playback.playing_id() == Some(video.id) {
            flags.push(Span::styled(
                "▶ Playing (looped, muted)",
                Style::default().fg(palette.success),
            ));
        }
        if !flags.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(flags));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            truncate_to_width(&video.video_url, width),
            secondary.add_modifier(Modifier::ITALIC),
        )));
        Text::from(lines)
    }

    fn video_lines(&self, videos: &[VideoItem], selected: usize, width: u16) -> Vec<Line<'static>> {
        let palette = self.palette();
        let inner = width.saturating_sub(2);
        videos
            .iter()
            .enumerate()
            .map(|(index, video)| {
                let base = if index == selected {
                    Style::default().bg(palette.selected_bg)
                } else {
                    Style::default()
                };
                let counter = format!("  {ICON_LIKE} {}", format_count(video.likes));
                let author_width = UnicodeWidthStr::width(video.author.as_str()) + 2;
                let room = (inner as usize)
                    .saturating_sub(author_width + UnicodeWidthStr::width(counter.as_str()));
                let mut line = Line::from(vec![
                    Span::styled(
                        video.author.clone(),
                        base.fg(palette.accent).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled("  ", base),
                    Span::styled(
                        truncate_to_width(&video.description, room),
                        base.fg(palette.text_primary),
                    ),
                    Span::styled(counter, base.fg(palette.text_secondary)),
                ]);
                if index == selected {
                    pad_lines_to_width(std::slice::from_mut(&mut line), inner);
                }
                line
            })
            .collect()
    }

    fn draw_video_list(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        title: String,
        videos: &[VideoItem],
        selected: usize,
        empty: &str,
    ) {
        let palette = self.palette();
        let block = self.panel_block(title);
        if videos.is_empty() {
            let paragraph = Paragraph::new(empty.to_string())
                .style(Style::default().fg(palette.text_secondary))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }
        let visible = area.height.saturating_sub(2).max(1) as usize;
        let offset = selected.saturating_sub(visible - 1) as u16;
        let paragraph = Paragraph::new(Text::from(self.video_lines(videos, selected, area.width)))
            .block(block)
            .scroll((offset, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_search(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let cursor = if self.search_editing { "▏" } else { "" };
        let query_style = if self.search_editing {
            Style::default().fg(palette.text_primary)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        let tag_label = match &self.search_tag {
            Some(tag) => format!("#{tag}"),
            None => "all".to_string(),
        };
        let input = Paragraph::new(Text::from(vec![
            Line::from(vec![
                Span::styled("Query: ", Style::default().fg(palette.accent)),
                Span::styled(format!("{}{cursor}", self.search_query), query_style),
            ]),
            Line::from(vec![
                Span::styled("Tag:   ", Style::default().fg(palette.accent)),
                Span::styled(tag_label, Style::default().fg(palette.text_primary)),
            ]),
        ]))
        .block(
            self.panel_block(" Search ".to_string()).border_style(Style::default().fg(
                if self.search_editing {
                    palette.border_focused
                } else {
                    palette.border_idle
                },
            )),
        );
        frame.render_widget(input, chunks[0]);

        let results = self.search_results();
        self.draw_video_list(
            frame,
            chunks[1],
            format!(" Results ({}) ", results.len()),
            &results,
            self.search_selected,
            "Nothing matches.",
        );
    }

    fn draw_favorites(&self, frame: &mut Frame<'_>, area: Rect) {
        let favorites = self.feed.favorites();
        self.draw_video_list(
            frame,
            area,
            format!(" Favorites ({}) ", favorites.len()),
            &favorites,
            self.favorites_selected,
            "No saved videos. Press s on a video to save it.",
        );
    }

    fn draw_profile(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let primary = Style::default().fg(palette.text_primary);
        let secondary = Style::default().fg(palette.text_secondary);
        let initial = self
            .profile
            .display_name
            .trim_start_matches('@')
            .chars()
            .next()
            .map(|ch| ch.to_ascii_uppercase())
            .unwrap_or('?');
        let unlocked = self
            .achievements
            .iter()
            .filter(|achievement| achievement.unlocked)
            .count();

        let lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    format!(" {initial} "),
                    Style::default()
                        .fg(palette.bg)
                        .bg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    self.profile.display_name.clone(),
                    primary.add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                if self.profile.avatar.is_some() {
                    "Custom avatar set"
                } else {
                    "No avatar"
                },
                secondary,
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Favorites: ", secondary),
                Span::styled(self.feed.favorites().len().to_string(), primary),
                Span::styled("   Watched: ", secondary),
                Span::styled(self.feed.history().len().to_string(), primary),
                Span::styled("   Achievements: ", secondary),
                Span::styled(format!("{unlocked}/{}", self.achievements.len()), primary),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Dark mode: ", secondary),
                Span::styled(on_off_label(self.settings.dark_mode), primary),
                Span::styled("   Language: ", secondary),
                Span::styled(self.settings.language.clone(), primary),
                Span::styled("   Notifications: ", secondary),
                Span::styled(on_off_label(self.settings.notifications_enabled), primary),
            ]),
            Line::from(""),
            Line::from(Span::styled(format!("User id: {}", self.user_id), secondary)),
        ];
        let paragraph = Paragraph::new(Text::from(lines))
            .block(self.panel_block(" Profile ".to_string()))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn draw_overlay(&self, frame: &mut Frame<'_>, area: Rect, overlay: Overlay) {
        let palette = self.palette();
        let (percent_x, percent_y) = match overlay {
            Overlay::Upload | Overlay::EditProfile => (70, 40),
            Overlay::Share | Overlay::Settings => (50, 50),
            _ => (75, 75),
        };
        let popup_area = centered_rect(percent_x, percent_y, area);
        frame.render_widget(Clear, popup_area);
        let body = self.overlay_body(overlay, popup_area.width.saturating_sub(2));
        let panel = Paragraph::new(body)
            .block(
                Block::default()
                    .title(Span::styled(
                        format!(" {} ", overlay.title()),
                        Style::default()
                            .fg(palette.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent))
                    .style(Style::default().bg(palette.panel_bg)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(panel, popup_area);
    }

    fn overlay_body(&self, overlay: Overlay, width: u16) -> Text<'static> {
        let palette = self.palette();
        let primary = Style::default().fg(palette.text_primary);
        let secondary = Style::default().fg(palette.text_secondary);
        let accent = Style::default().fg(palette.accent);

        match overlay {
            Overlay::Trending | Overlay::Live | Overlay::Recommendations => {
                let videos = self.overlay_videos(overlay);
                if videos.is_empty() {
                    return Text::from(Span::styled("Nothing here right now.", secondary));
                }
                let mut lines = self.video_lines(&videos, self.overlay_selected, width + 2);
                if overlay == Overlay::Live {
                    for (line, video) in lines.iter_mut().zip(&videos) {
                        line.spans.insert(
                            0,
                            Span::styled(
                                format!("{ICON_LIVE} {:>6} ", format_count(video.live_viewers)),
                                Style::default().fg(palette.error),
                            ),
                        );
                    }
                }
                Text::from(lines)
            }
            Overlay::Comments => {
                let mut lines = Vec::new();
                if let Some(video) = self.feed.current() {
                    for comment in &video.comment_list {
                        lines.push(Line::from(vec![
                            Span::styled(comment.author.clone(), accent.add_modifier(Modifier::BOLD)),
                            Span::styled(format!("  {}", comment.timestamp), secondary),
                        ]));
                        for row in wrap(&comment.text, WrapOptions::new(width.max(10) as usize)) {
                            lines.push(Line::from(Span::styled(row.into_owned(), primary)));
                        }
                        lines.push(Line::from(Span::styled(
                            format!("{ICON_LIKE} {}", format_count(comment.likes)),
                            secondary,
                        )));
                        lines.push(Line::from(""));
                    }
                }
                lines.push(Line::from(vec![
                    Span::styled("> ", accent),
                    Span::styled(format!("{}▏", self.comment_draft), primary),
                ]));
                Text::from(lines)
            }
            Overlay::Settings => {
                let values = [
                    on_off_label(self.settings.dark_mode),
                    self.settings.language.clone(),
                    on_off_label(self.settings.notifications_enabled),
                    on_off_label(self.settings.auto_sound),
                ];
                let mut lines: Vec<Line<'static>> = SETTINGS_LABELS
                    .iter()
                    .zip(values)
                    .enumerate()
                    .map(|(index, (label, value))| {
                        selectable_line(
                            format!("{label:<16}{value}"),
                            index == self.overlay_selected,
                            palette,
                        )
                    })
                    .collect();
                if let Some(line) = lines.get_mut(self.overlay_selected) {
                    pad_lines_to_width(std::slice::from_mut(line), width);
                }
                Text::from(lines)
            }
            Overlay::Share => {
                let mut labels: Vec<String> = ShareTarget::ALL
                    .iter()
                    .map(|target| format!("Share to {}", target.label()))
                    .collect();
                labels.push("Copy link".to_string());
                let mut lines: Vec<Line<'static>> = labels
                    .into_iter()
                    .enumerate()
                    .map(|(index, label)| {
                        selectable_line(label, index == self.overlay_selected, palette)
                    })
                    .collect();
                if let Some(line) = lines.get_mut(self.overlay_selected) {
                    pad_lines_to_width(std::slice::from_mut(line), width);
                }
                Text::from(lines)
            }
            Overlay::Upload => Text::from(vec![
                Line::from(Span::styled("Paste a TikTok video link:", secondary)),
                Line::from(""),
                Line::from(vec![
                    Span::styled("> ", accent),
                    Span::styled(format!("{}▏", self.upload_draft), primary),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "e.g. https://www.tiktok.com/@user/video/7234567890123456789",
                    secondary.add_modifier(Modifier::ITALIC),
                )),
            ]),
            Overlay::About => Text::from(vec![
                Line::from(Span::styled(
                    format!("GoShorts {}", crate::VERSION),
                    accent.add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "A short-video feed for the terminal. Swipe with the mouse or use j/k.",
                    primary,
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("User id:  ", secondary),
                    Span::styled(self.user_id.clone(), primary),
                ]),
                Line::from(vec![
                    Span::styled("Config:   ", secondary),
                    Span::styled(self.config_path.clone(), primary),
                ]),
            ]),
            Overlay::Achievements => {
                let mut lines = Vec::new();
                for (index, achievement) in self.achievements.iter().enumerate() {
                    let marker = if index == self.overlay_selected { "▶ " } else { "  " };
                    let title_style = if achievement.unlocked {
                        Style::default()
                            .fg(palette.success)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        primary
                    };
                    lines.push(Line::from(vec![
                        Span::styled(marker, accent),
                        Span::styled(format!("{} ", achievement.icon), primary),
                        Span::styled(achievement.title.clone(), title_style),
                    ]));
                    lines.push(Line::from(Span::styled(
                        format!("    {}", achievement.description),
                        secondary,
                    )));
                    lines.push(Line::from(Span::styled(
                        format!(
                            "    {} {}/{}",
                            progress_bar(achievement.ratio(), ACHIEVEMENT_BAR_WIDTH),
                            achievement.progress,
                            achievement.target
                        ),
                        accent,
                    )));
                    lines.push(Line::from(""));
                }
                Text::from(lines)
            }
            Overlay::EditProfile => {
                let field_line = |label: &str, value: &str, active: bool| {
                    let cursor = if active { "▏" } else { "" };
                    Line::from(vec![
                        Span::styled(
                            format!("{label:<10}"),
                            if active { accent.add_modifier(Modifier::BOLD) } else { secondary },
                        ),
                        Span::styled(format!("{value}{cursor}"), primary),
                    ])
                };
                Text::from(vec![
                    field_line(
                        "Nickname",
                        &self.edit_name,
                        self.edit_field == ProfileField::Name,
                    ),
                    Line::from(""),
                    field_line(
                        "Avatar",
                        &self.edit_avatar,
                        self.edit_field == ProfileField::Avatar,
                    ),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Avatar is a path to an image file (max 5 MB). Leave empty to keep the current one.",
                        secondary.add_modifier(Modifier::ITALIC),
                    )),
                ])
            }
        }
    }
}

fn selectable_line(label: String, selected: bool, palette: &Palette) -> Line<'static> {
    if selected {
        Line::from(Span::styled(
            format!("▶ {label}"),
            Style::default()
                .fg(palette.text_primary)
                .bg(palette.selected_bg)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            format!("  {label}"),
            Style::default().fg(palette.text_primary),
        ))
    }
}

fn on_off_label(value: bool) -> String {
    if value { "on" } else { "off" }.to_string()
}

fn edit_text(buffer: &mut String, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(ch) => {
            buffer.push(ch);
            true
        }
        KeyCode::Backspace => buffer.pop().is_some(),
        _ => false,
    }
}

fn step_index(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Compact counter: 999, 1.2K, 98.4K, 1.2M. Tenths are truncated.
fn format_count(value: u64) -> String {
    let (scaled, suffix) = match value {
        0..=999 => return value.to_string(),
        1_000..=999_999 => (value / 100, "K"),
        _ => (value / 100_000, "M"),
    };
    let whole = scaled / 10;
    let tenth = scaled % 10;
    if tenth == 0 {
        format!("{whole}{suffix}")
    } else {
        format!("{whole}.{tenth}{suffix}")
    }
}

fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width + 1 > width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}

fn pad_lines_to_width(lines: &mut [Line<'static>], width: u16) {
    let width = width as usize;
    if width == 0 {
        return;
    }

    for line in lines {
        let mut current_width = 0usize;
        for span in &line.spans {
            current_width =
                current_width.saturating_add(UnicodeWidthStr::width(span.content.as_ref()));
        }
        if current_width >= width {
            continue;
        }
        let pad_style = line.spans.last().map(|span| span.style).unwrap_or_default();
        let padding = " ".repeat(width - current_width);
        line.spans.push(Span::styled(padding, pad_style));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(100 - percent_x - (100 - percent_x) / 2),
        ])
        .split(area);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(100 - percent_y - (100 - percent_y) / 2),
        ])
        .split(horizontal[1]);
    vertical[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{mock_achievements, mock_catalog};
    use crate::player::MediaPlayer;
    use crate::sync::{DisabledSyncService, RemoteProfile, RemoteSettings, RemoteVideoState};
    use crossterm::event::KeyModifiers;
    use std::sync::Mutex;
    use tempfile::TempDir;

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

    fn model_with(recorder: Recorder, autoplay: bool) -> (Model, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = storage::Store::open(storage::Options {
            path: Some(dir.path().join("state.db")),
        })
        .unwrap();
        let model = Model::new(Options {
            status_message: String::new(),
            catalog: mock_catalog(),
            achievements: mock_achievements(),
            profile: Profile::default(),
            settings: Settings::default(),
            user_id: "user_test".to_string(),
            sync_service: Arc::new(DisabledSyncService),
            store: Arc::new(store),
            playback: PlaybackController::new(Box::new(recorder)),
            autoplay,
            theme: "sunset".to_string(),
            swipe_threshold: 100.0,
            splash_delay: Duration::ZERO,
            config_path: "~/.config/goshorts/config.yaml".to_string(),
            fetch_state_on_start: false,
        });
        (model, dir)
    }

    fn model() -> (Model, TempDir) {
        model_with(Recorder::default(), false)
    }

    fn press(model: &mut Model, keys: &str) {
        for ch in keys.chars() {
            model.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn mouse(kind: MouseEventKind, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column: 10,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn total_width(line: &Line<'_>) -> usize {
        line.spans
            .iter()
            .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
            .sum()
    }

    #[test]
    fn pad_lines_extends_to_width() {
        let mut lines = vec![Line::from(vec![Span::raw("abc")])];
        pad_lines_to_width(&mut lines, 6);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].spans[1].content.as_ref(), "   ");
        assert_eq!(total_width(&lines[0]), 6);
    }

    #[test]
    fn pad_lines_does_not_shorten() {
        let mut lines = vec![Line::from(vec![Span::raw("abcdef")])];
        pad_lines_to_width(&mut lines, 4);
        assert_eq!(lines[0].spans.len(), 1);
        assert_eq!(total_width(&lines[0]), 6);
    }

    #[test]
    fn format_count_uses_compact_suffixes() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1K");
        assert_eq!(format_count(1_500), "1.5K");
        assert_eq!(format_count(98_400), "98.4K");
        assert_eq!(format_count(1_250_000), "1.2M");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(2.0, 3), "███");
        assert_eq!(progress_bar(0.0, 2), "░░");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        assert_eq!(truncate_to_width("hello", 0), "");
    }

    #[test]
    fn step_index_clamps() {
        assert_eq!(step_index(0, 3, -1), 0);
        assert_eq!(step_index(2, 3, 1), 2);
        assert_eq!(step_index(1, 3, 1), 2);
        assert_eq!(step_index(5, 0, 1), 0);
    }

    #[test]
    fn j_and_k_move_without_wrapping() {
        let (mut model, _dir) = model();
        press(&mut model, "k");
        assert_eq!(model.feed.index(), 0);
        for _ in 0..20 {
            press(&mut model, "j");
        }
        assert_eq!(model.feed.index(), model.feed.len() - 1);
    }

    #[test]
    fn drag_up_past_threshold_advances() {
        let (mut model, _dir) = model();
        model
            .handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 20))
            .unwrap();
        model
            .handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 12))
            .unwrap();
        model
            .handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 12))
            .unwrap();
        assert_eq!(model.feed.index(), 1);

        model
            .handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 10))
            .unwrap();
        model
            .handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 12))
            .unwrap();
        assert_eq!(model.feed.index(), 1);

        model
            .handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5))
            .unwrap();
        model
            .handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 15))
            .unwrap();
        assert_eq!(model.feed.index(), 0);
    }

    #[test]
    fn like_and_save_update_current_video() {
        let (mut model, _dir) = model();
        let before = model.feed.current().unwrap().likes;
        press(&mut model, "ls");
        let video = model.feed.current().unwrap();
        assert!(video.is_liked && video.is_saved);
        assert_eq!(video.likes, before + 1);
        assert_eq!(model.feed.favorites().len(), 1);
        assert_eq!(model.pending_syncs, 2);
    }

    #[test]
    fn tab_switch_keeps_overlay_state() {
        let (mut model, _dir) = model();
        press(&mut model, "2");
        assert_eq!(model.view.tab(), Tab::Search);
        press(&mut model, "t");
        assert_eq!(model.view.overlay(), Some(Overlay::Trending));
        model.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(model.view.overlay(), None);
        assert_eq!(model.view.tab(), Tab::Search);
    }

    #[test]
    fn empty_comment_is_rejected_and_draft_cleared_on_send() {
        let (mut model, _dir) = model();
        press(&mut model, "c");
        press(&mut model, "   ");
        model.handle_key(KeyCode::Enter).unwrap();
        assert!(model.status_message.contains("empty"));
        press(&mut model, "nice!");
        model.handle_key(KeyCode::Enter).unwrap();
        assert!(model.comment_draft.is_empty());
        assert_eq!(model.status_message, "Comment sent.");
        let comments = model.feed.current().unwrap().comment_list.len();
        assert_eq!(comments, 3);
    }

    #[test]
    fn typing_q_in_text_overlay_does_not_quit() {
        let (mut model, _dir) = model();
        press(&mut model, "c");
        assert!(!model.handle_key(KeyCode::Char('q')).unwrap());
        assert_eq!(model.comment_draft, "q");
        model.handle_key(KeyCode::Esc).unwrap();
        assert!(model.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn upload_prepends_imported_video() {
        let (mut model, _dir) = model();
        press(&mut model, "j");
        let current = model.feed.current().unwrap().id;
        press(&mut model, "u");
        press(&mut model, "https://www.tiktok.com/@chef_bob/video/7001#pasta");
        model.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(model.feed.len(), 9);
        let first = &model.feed.items()[0];
        assert_eq!(first.author, "@chef_bob");
        assert_eq!(first.tags, vec!["pasta"]);
        assert_eq!(model.feed.current().unwrap().id, current);
        assert_eq!(model.view.overlay(), None);
    }

    #[test]
    fn invalid_upload_keeps_overlay_open() {
        let (mut model, _dir) = model();
        press(&mut model, "u");
        press(&mut model, "https://example.com/nothing");
        assert!(model.handle_key(KeyCode::Enter).is_err());
        assert_eq!(model.view.overlay(), Some(Overlay::Upload));
        assert_eq!(model.feed.len(), 8);
    }

    #[test]
    fn search_filters_by_query_and_tag() {
        let (mut model, _dir) = model();
        press(&mut model, "2/");
        press(&mut model, "hiking");
        model.handle_key(KeyCode::Enter).unwrap();
        let ids: Vec<u64> = model.search_results().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![8]);

        press(&mut model, "x");
        press(&mut model, "g");
        assert_eq!(model.search_tag.as_deref(), Some("sunset"));
        model.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(model.view.tab(), Tab::Home);
        assert_eq!(model.feed.current().unwrap().id, 1);
    }

    #[test]
    fn settings_are_saved_on_close() {
        let (mut model, _dir) = model();
        press(&mut model, "o");
        model.handle_key(KeyCode::Enter).unwrap();
        model.handle_key(KeyCode::Down).unwrap();
        model.handle_key(KeyCode::Enter).unwrap();
        model.handle_key(KeyCode::Esc).unwrap();
        assert!(model.settings.dark_mode);
        assert_eq!(model.settings.language, "en");
        let stored = model.store.load_settings().unwrap().unwrap();
        assert_eq!(stored, model.settings);
        assert_eq!(model.pending_syncs, 1);
    }

    #[test]
    fn edit_profile_trims_nickname() {
        let (mut model, _dir) = model();
        press(&mut model, "e");
        for _ in 0..model.edit_name.chars().count() {
            model.handle_key(KeyCode::Backspace).unwrap();
        }
        press(&mut model, "  @new_me ");
        model.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(model.profile.display_name, "@new_me");
        assert_eq!(
            model.store.load_profile().unwrap().unwrap().display_name,
            "@new_me"
        );

        press(&mut model, "e");
        for _ in 0..model.edit_name.chars().count() {
            model.handle_key(KeyCode::Backspace).unwrap();
        }
        model.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(model.profile.display_name, "@new_me");
    }

    #[test]
    fn playback_follows_the_cursor() {
        let recorder = Recorder::default();
        let events = recorder.events.clone();
        let (mut model, _dir) = model_with(recorder, true);
        press(&mut model, "jk");
        press(&mut model, "p");
        assert_eq!(
            *events.lock().unwrap(),
            vec!["play 1", "pause 1", "play 2", "pause 2", "play 1", "pause 1"]
        );
    }

    #[test]
    fn remote_state_restores_flags_and_profile() {
        let (mut model, _dir) = model();
        model.pending_syncs = 1;
        model.handle_async_response(AsyncResponse::RemoteState {
            result: Ok(RemoteState {
                videos: vec![
                    RemoteVideoState {
                        video_id: 3,
                        is_saved: Some(true),
                        is_liked: None,
                    },
                    RemoteVideoState {
                        video_id: 404,
                        is_saved: Some(true),
                        is_liked: Some(true),
                    },
                ],
                settings: Some(RemoteSettings {
                    dark_mode: Some(true),
                    ..RemoteSettings::default()
                }),
                profile: Some(RemoteProfile {
                    profile_name: Some("@remote".to_string()),
                    avatar_url: None,
                }),
            }),
        });
        assert_eq!(model.pending_syncs, 0);
        let video = model.feed.get(3).unwrap();
        assert!(video.is_saved && !video.is_liked);
        assert_eq!(model.profile.display_name, "@remote");
        assert!(model.settings.dark_mode);
        assert_eq!(model.settings.language, "ru");
        assert_eq!(model.store.load_settings().unwrap(), Some(model.settings.clone()));
        assert!(model.status_message.contains("1 video"));
    }

    #[test]
    fn importing_same_link_twice_keeps_one_copy() {
        let (mut model, _dir) = model();
        for _ in 0..2 {
            press(&mut model, "u");
            press(&mut model, "https://www.tiktok.com/@a/video/777");
            model.handle_key(KeyCode::Enter).unwrap();
        }
        let copies = model
            .feed
            .items()
            .iter()
            .filter(|video| video.video_url.ends_with("/777"))
            .count();
        assert_eq!(copies, 1);
        assert_eq!(model.feed.len(), 9);
        assert_eq!(model.feed.current().unwrap().video_url, "https://www.tiktok.com/embed/v2/777");
        assert!(model.status_message.contains("already"));
        assert_eq!(model.view.overlay(), None);
    }

    #[test]
    fn sync_failure_is_reported_without_rollback() {
        let (mut model, _dir) = model();
        press(&mut model, "s");
        model.handle_async_response(AsyncResponse::Sync {
            action: "save_video",
            result: Err(SyncError::Rejected("nope".to_string())),
        });
        assert!(model.feed.current().unwrap().is_saved);
        assert!(model.status_message.contains("save_video"));
    }

    #[test]
    fn splash_swallows_first_key() {
        let (mut model, _dir) = model();
        model.splash_until = Some(Instant::now() + Duration::from_secs(60));
        assert!(!model.handle_key(KeyCode::Char('q')).unwrap());
        assert!(model.splash_until.is_none());
        assert!(model.handle_key(KeyCode::Char('q')).unwrap());
    }
}
