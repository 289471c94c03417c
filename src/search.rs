use crate::data::VideoItem;

/// Case-insensitive substring match on description or author, optionally
/// narrowed to a single tag. An empty query and no tag match everything.
pub fn filter(items: &[VideoItem], query: &str, tag: Option<&str>) -> Vec<VideoItem> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| matches_query(item, &needle))
        .filter(|item| tag.map_or(true, |tag| item.has_tag(tag)))
        .cloned()
        .collect()
}

fn matches_query(item: &VideoItem, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    item.description.to_lowercase().contains(needle) || item.author.to_lowercase().contains(needle)
}

/// Distinct tags in first-seen order.
pub fn all_tags(items: &[VideoItem]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in items.iter().flat_map(|item| item.tags.iter()) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

/// Trending videos, most viewed first.
pub fn trending(items: &[VideoItem]) -> Vec<VideoItem> {
    let mut picks: Vec<VideoItem> = items.iter().filter(|item| item.is_trending).cloned().collect();
    picks.sort_by(|a, b| b.views.cmp(&a.views));
    picks
}

/// Live streams, largest audience first.
pub fn live(items: &[VideoItem]) -> Vec<VideoItem> {
    let mut picks: Vec<VideoItem> = items.iter().filter(|item| item.is_live).cloned().collect();
    picks.sort_by(|a, b| b.live_viewers.cmp(&a.live_viewers));
    picks
}
