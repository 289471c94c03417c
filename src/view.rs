#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Home,
    Search,
    Favorites,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Search, Tab::Favorites, Tab::Profile];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Search => "Search",
            Tab::Favorites => "Favorites",
            Tab::Profile => "Profile",
        }
    }

    pub fn hotkey(self) -> char {
        match self {
            Tab::Home => '1',
            Tab::Search => '2',
            Tab::Favorites => '3',
            Tab::Profile => '4',
        }
    }

    pub fn from_hotkey(ch: char) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.hotkey() == ch)
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Home => Tab::Search,
            Tab::Search => Tab::Favorites,
            Tab::Favorites => Tab::Profile,
            Tab::Profile => Tab::Home,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Tab::Home => Tab::Profile,
            Tab::Search => Tab::Home,
            Tab::Favorites => Tab::Search,
            Tab::Profile => Tab::Favorites,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Trending,
    Live,
    Recommendations,
    Comments,
    Settings,
    Share,
    Upload,
    About,
    Achievements,
    EditProfile,
}

impl Overlay {
    pub fn title(self) -> &'static str {
        match self {
            Overlay::Trending => "Trending",
            Overlay::Live => "Live now",
            Overlay::Recommendations => "For you",
            Overlay::Comments => "Comments",
            Overlay::Settings => "Settings",
            Overlay::Share => "Share",
            Overlay::Upload => "Import video",
            Overlay::About => "About GoShorts",
            Overlay::Achievements => "Achievements",
            Overlay::EditProfile => "Edit profile",
        }
    }

    /// Overlays that capture typed characters instead of hotkeys.
    pub fn takes_text_input(self) -> bool {
        matches!(
            self,
            Overlay::Comments | Overlay::Upload | Overlay::EditProfile
        )
    }
}

/// Active tab plus at most one overlay layered above it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    tab: Tab,
    overlay: Option<Overlay>,
}

impl ViewState {
    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn is_open(&self, overlay: Overlay) -> bool {
        self.overlay == Some(overlay)
    }

    /// Switch tabs. Returns false when the tab was already active.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        if self.tab == tab {
            return false;
        }
        self.tab = tab;
        true
    }

    /// Open `overlay`, replacing whatever overlay was showing.
    pub fn open(&mut self, overlay: Overlay) -> Option<Overlay> {
        self.overlay.replace(overlay)
    }

    /// Open `overlay`, or close it when it is already the open one.
    pub fn toggle(&mut self, overlay: Overlay) -> bool {
        if self.is_open(overlay) {
            self.overlay = None;
            false
        } else {
            self.overlay = Some(overlay);
            true
        }
    }

    pub fn close(&mut self) -> Option<Overlay> {
        self.overlay.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_home_without_overlay() {
        let view = ViewState::default();
        assert_eq!(view.tab(), Tab::Home);
        assert_eq!(view.overlay(), None);
    }

    #[test]
    fn opening_replaces_previous_overlay() {
        let mut view = ViewState::default();
        assert_eq!(view.open(Overlay::Comments), None);
        assert_eq!(view.open(Overlay::Share), Some(Overlay::Comments));
        assert!(view.is_open(Overlay::Share));
        assert!(!view.is_open(Overlay::Comments));
    }

    #[test]
    fn toggle_closes_open_overlay() {
        let mut view = ViewState::default();
        assert!(view.toggle(Overlay::Live));
        assert!(!view.toggle(Overlay::Live));
        assert_eq!(view.overlay(), None);
    }

    #[test]
    fn tab_switch_keeps_overlay() {
        let mut view = ViewState::default();
        view.open(Overlay::Achievements);
        assert!(view.select_tab(Tab::Profile));
        assert!(!view.select_tab(Tab::Profile));
        assert!(view.is_open(Overlay::Achievements));
    }

    #[test]
    fn tab_cycle_round_trips() {
        for tab in Tab::ALL {
            assert_eq!(tab.next().previous(), tab);
            assert_eq!(Tab::from_hotkey(tab.hotkey()), Some(tab));
        }
        assert_eq!(Tab::from_hotkey('9'), None);
    }
}
