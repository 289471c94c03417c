use std::sync::Arc;

use crate::data::VideoItem;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("video {0} is not in the feed")]
    UnknownVideo(u64),
    #[error("video {0} is already in the feed")]
    DuplicateVideo(u64),
    #[error("video {0} has no tags")]
    MissingTags(u64),
}

/// Ordered catalog plus the feed cursor.
///
/// Items are never mutated in place: every action builds a replacement
/// record and swaps it into a copy-on-write collection, so snapshots handed
/// out through [`FeedState::snapshot`] stay untouched.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    items: Arc<Vec<VideoItem>>,
    index: usize,
    history: ViewHistory,
}

impl FeedState {
    pub fn new(items: Vec<VideoItem>) -> Self {
        let mut state = Self {
            items: Arc::new(items),
            index: 0,
            history: ViewHistory::default(),
        };
        state.mark_current_viewed();
        state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&VideoItem> {
        self.items.get(self.index)
    }

    pub fn items(&self) -> &[VideoItem] {
        &self.items
    }

    pub fn snapshot(&self) -> Arc<Vec<VideoItem>> {
        self.items.clone()
    }

    pub fn get(&self, id: u64) -> Option<&VideoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Item whose playback URL is `url`, ignoring surrounding whitespace.
    pub fn find_by_video_url(&self, url: &str) -> Option<&VideoItem> {
        let url = url.trim();
        self.items.iter().find(|item| item.video_url.trim() == url)
    }

    pub fn history(&self) -> &ViewHistory {
        &self.history
    }

    /// Advance to the next video. Returns false at the end of the feed.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.items.len() {
            self.index += 1;
            self.mark_current_viewed();
            true
        } else {
            false
        }
    }

    /// Go back one video. Returns false on the first item.
    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            self.mark_current_viewed();
            true
        } else {
            false
        }
    }

    /// Move the cursor to `index`, clamped into range.
    pub fn select(&mut self, index: usize) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let target = index.min(self.items.len() - 1);
        if target == self.index {
            return false;
        }
        self.index = target;
        self.mark_current_viewed();
        true
    }

    pub fn select_id(&mut self, id: u64) -> Result<bool, FeedError> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(FeedError::UnknownVideo(id))?;
        Ok(self.select(position))
    }

    pub fn toggle_like(&mut self, id: u64) -> Result<&VideoItem, FeedError> {
        self.replace(id, |item| {
            let is_liked = !item.is_liked;
            let likes = if is_liked {
                item.likes.saturating_add(1)
            } else {
                item.likes.saturating_sub(1)
            };
            VideoItem {
                is_liked,
                likes,
                ..item.clone()
            }
        })
    }

    pub fn toggle_save(&mut self, id: u64) -> Result<&VideoItem, FeedError> {
        self.replace(id, |item| VideoItem {
            is_saved: !item.is_saved,
            ..item.clone()
        })
    }

    pub fn toggle_follow(&mut self, id: u64) -> Result<&VideoItem, FeedError> {
        self.replace(id, |item| VideoItem {
            is_following: !item.is_following,
            ..item.clone()
        })
    }

    pub fn record_share(&mut self, id: u64) -> Result<&VideoItem, FeedError> {
        self.replace(id, |item| VideoItem {
            shares: item.shares.saturating_add(1),
            ..item.clone()
        })
    }

    /// Bring an item's liked/saved flags in line with remembered state.
    /// `None` keeps the local flag. Returns whether anything changed.
    pub fn restore_flags(
        &mut self,
        id: u64,
        is_saved: Option<bool>,
        is_liked: Option<bool>,
    ) -> Result<bool, FeedError> {
        let item = self.get(id).ok_or(FeedError::UnknownVideo(id))?;
        let save_differs = is_saved.map_or(false, |saved| saved != item.is_saved);
        let like_differs = is_liked.map_or(false, |liked| liked != item.is_liked);
        if save_differs {
            self.toggle_save(id)?;
        }
        if like_differs {
            self.toggle_like(id)?;
        }
        Ok(save_differs || like_differs)
    }

    /// Insert an imported video at the top of the feed. The cursor keeps
    /// pointing at the video that was current before.
    pub fn prepend(&mut self, item: VideoItem) -> Result<(), FeedError> {
        if item.tags.is_empty() {
            return Err(FeedError::MissingTags(item.id));
        }
        if self.get(item.id).is_some() {
            return Err(FeedError::DuplicateVideo(item.id));
        }
        let was_empty = self.items.is_empty();
        Arc::make_mut(&mut self.items).insert(0, item);
        if was_empty {
            self.index = 0;
            self.mark_current_viewed();
        } else {
            self.index += 1;
        }
        Ok(())
    }

    /// Saved videos in feed order.
    pub fn favorites(&self) -> Vec<VideoItem> {
        self.items
            .iter()
            .filter(|item| item.is_saved)
            .cloned()
            .collect()
    }

    pub fn next_free_id(&self) -> u64 {
        self.items.iter().map(|item| item.id).max().unwrap_or(0) + 1
    }

    fn replace<F>(&mut self, id: u64, update: F) -> Result<&VideoItem, FeedError>
    where
        F: FnOnce(&VideoItem) -> VideoItem,
    {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(FeedError::UnknownVideo(id))?;
        let updated = update(&self.items[position]);
        let items = Arc::make_mut(&mut self.items);
        items[position] = updated;
        Ok(&items[position])
    }

    fn mark_current_viewed(&mut self) {
        if let Some(id) = self.current().map(|item| item.id) {
            self.history.record(id);
        }
    }
}

/// Visited video ids in first-visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewHistory {
    ids: Vec<u64>,
}

impl ViewHistory {
    pub fn from_ids<I: IntoIterator<Item = u64>>(ids: I) -> Self {
        let mut history = Self::default();
        for id in ids {
            history.record(id);
        }
        history
    }

    pub fn record(&mut self, id: u64) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mock_catalog;

    fn feed() -> FeedState {
        FeedState::new(mock_catalog())
    }

    #[test]
    fn next_stops_at_last_item() {
        let mut state = feed();
        let len = state.len();
        for i in 0..len {
            assert_eq!(state.index(), i);
            let moved = state.next();
            assert_eq!(moved, i + 1 < len);
        }
        assert_eq!(state.index(), len - 1);
    }

    #[test]
    fn previous_stops_at_first_item() {
        let mut state = feed();
        assert!(!state.previous());
        assert_eq!(state.index(), 0);
        state.next();
        assert!(state.previous());
        assert_eq!(state.index(), 0);
    }

    #[test]
    fn select_clamps_to_range() {
        let mut state = feed();
        assert!(state.select(999));
        assert_eq!(state.index(), state.len() - 1);
        assert!(!FeedState::new(Vec::new()).select(3));
    }

    #[test]
    fn like_toggle_is_net_identity() {
        let mut state = feed();
        let before = state.current().cloned().unwrap();
        let liked = state.toggle_like(before.id).unwrap().clone();
        assert!(liked.is_liked);
        assert_eq!(liked.likes, before.likes + 1);
        let unliked = state.toggle_like(before.id).unwrap().clone();
        assert_eq!(unliked, before);
    }

    #[test]
    fn updates_do_not_touch_snapshots() {
        let mut state = feed();
        let snapshot = state.snapshot();
        let id = snapshot[0].id;
        state.toggle_save(id).unwrap();
        assert!(!snapshot[0].is_saved);
        assert!(state.get(id).unwrap().is_saved);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut state = feed();
        assert_eq!(
            state.toggle_follow(4242).unwrap_err(),
            FeedError::UnknownVideo(4242)
        );
    }

    #[test]
    fn favorites_lists_saved_items_in_order() {
        let mut state = feed();
        state.toggle_save(3).unwrap();
        state.toggle_save(1).unwrap();
        let ids: Vec<u64> = state.favorites().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn share_counts_up() {
        let mut state = feed();
        let before = state.get(2).unwrap().shares;
        assert_eq!(state.record_share(2).unwrap().shares, before + 1);
    }

    #[test]
    fn history_records_visits_once() {
        let mut state = feed();
        state.next();
        state.previous();
        state.next();
        assert_eq!(state.history().ids(), &[1, 2]);
    }

    #[test]
    fn restore_flags_only_touches_differences() {
        let mut state = feed();
        let before = state.get(5).unwrap().likes;
        assert!(state.restore_flags(5, Some(true), Some(true)).unwrap());
        assert!(!state.restore_flags(5, Some(true), Some(true)).unwrap());
        let item = state.get(5).unwrap();
        assert!(item.is_saved && item.is_liked);
        assert_eq!(item.likes, before + 1);
        assert!(state.restore_flags(99, Some(true), None).is_err());
    }

    #[test]
    fn missing_remote_flags_keep_local_ones() {
        let mut state = feed();
        state.toggle_save(4).unwrap();
        assert!(!state.restore_flags(4, None, None).unwrap());
        assert!(state.restore_flags(4, None, Some(true)).unwrap());
        let item = state.get(4).unwrap();
        assert!(item.is_saved && item.is_liked);
    }

    #[test]
    fn prepend_keeps_current_video() {
        let mut state = feed();
        state.next();
        let current = state.current().unwrap().id;
        let mut item = state.current().unwrap().clone();
        item.id = state.next_free_id();
        state.prepend(item).unwrap();
        assert_eq!(state.current().unwrap().id, current);
        assert_eq!(state.items()[0].id, 9);
    }

    #[test]
    fn finds_items_by_video_url() {
        let mut state = feed();
        let mut item = state.items()[0].clone();
        item.id = state.next_free_id();
        item.video_url = "https://www.tiktok.com/embed/v2/777".to_string();
        state.prepend(item).unwrap();
        let found = state
            .find_by_video_url(" https://www.tiktok.com/embed/v2/777 ")
            .unwrap();
        assert_eq!(found.id, 9);
        assert!(state
            .find_by_video_url("https://www.tiktok.com/embed/v2/778")
            .is_none());
    }

    #[test]
    fn prepend_rejects_duplicates_and_untagged() {
        let mut state = feed();
        let duplicate = state.items()[0].clone();
        assert_eq!(
            state.prepend(duplicate).unwrap_err(),
            FeedError::DuplicateVideo(1)
        );
        let mut untagged = state.items()[0].clone();
        untagged.id = 77;
        untagged.tags.clear();
        assert_eq!(
            state.prepend(untagged).unwrap_err(),
            FeedError::MissingTags(77)
        );
    }
}
