use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: u64,
    pub video_url: String,
    pub author: String,
    pub description: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub live_viewers: u64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub is_following: bool,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_live: bool,
    pub tags: Vec<String>,
    #[serde(default)]
    pub comment_list: Vec<Comment>,
}

impl VideoItem {
    /// First letter of the handle, used as the avatar glyph.
    pub fn avatar_initial(&self) -> char {
        self.author
            .trim_start_matches('@')
            .chars()
            .next()
            .map(|ch| ch.to_uppercase().next().unwrap_or(ch))
            .unwrap_or('?')
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub author: String,
    pub text: String,
    pub timestamp: String,
    #[serde(default)]
    pub likes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub progress: u32,
    pub target: u32,
    pub unlocked: bool,
}

impl Achievement {
    pub fn ratio(&self) -> f64 {
        if self.target == 0 {
            return 1.0;
        }
        (f64::from(self.progress) / f64::from(self.target)).clamp(0.0, 1.0)
    }
}

const SAMPLE_VIDEO_URL: &str =
    "https://sample-videos.com/video321/mp4/720/big_buck_bunny_720p_1mb.mp4";

struct Seed {
    id: u64,
    author: &'static str,
    description: &'static str,
    likes: u64,
    comments: u64,
    shares: u64,
    views: u64,
    trending: bool,
    live_viewers: Option<u64>,
    tags: &'static [&'static str],
}

const SEEDS: &[Seed] = &[
    Seed {
        id: 1,
        author: "@sunny_vibes",
        description: "Enjoying the golden hour #sunset #nature",
        likes: 15_200,
        comments: 342,
        shares: 128,
        views: 98_400,
        trending: true,
        live_viewers: None,
        tags: &["sunset", "nature", "relax"],
    },
    Seed {
        id: 2,
        author: "@beach_life",
        description: "Summer vibes only #beach #summer",
        likes: 23_400,
        comments: 567,
        shares: 234,
        views: 154_000,
        trending: false,
        live_viewers: Some(1_240),
        tags: &["beach", "summer", "travel"],
    },
    Seed {
        id: 3,
        author: "@travel_tales",
        description: "Best sunrise ever! #travel #adventure",
        likes: 45_600,
        comments: 892,
        shares: 445,
        views: 310_500,
        trending: true,
        live_viewers: None,
        tags: &["travel", "adventure", "nature"],
    },
    Seed {
        id: 4,
        author: "@pet_corner",
        description: "My cat discovered the treadmill #funny #animals",
        likes: 88_100,
        comments: 2_310,
        shares: 1_904,
        views: 1_250_000,
        trending: true,
        live_viewers: None,
        tags: &["funny", "animals", "cute", "comedy"],
    },
    Seed {
        id: 5,
        author: "@kitchen_hacks",
        description: "Three-minute breakfast that actually works #food #lifehack",
        likes: 12_750,
        comments: 198,
        shares: 610,
        views: 75_300,
        trending: false,
        live_viewers: Some(830),
        tags: &["food", "lifehack", "cooking"],
    },
    Seed {
        id: 6,
        author: "@dance_daily",
        description: "New routine, who is joining? #dance #music",
        likes: 67_300,
        comments: 1_450,
        shares: 980,
        views: 640_000,
        trending: false,
        live_viewers: Some(5_600),
        tags: &["dance", "music", "comedy"],
    },
    Seed {
        id: 7,
        author: "@puppy_squad",
        description: "Puppies vs. the first snow #animals #cute",
        likes: 54_900,
        comments: 1_020,
        shares: 1_330,
        views: 480_200,
        trending: true,
        live_viewers: None,
        tags: &["animals", "cute", "winter"],
    },
    Seed {
        id: 8,
        author: "@mountain_mia",
        description: "Hiking above the clouds #travel #nature #adventure",
        likes: 31_800,
        comments: 640,
        shares: 390,
        views: 221_000,
        trending: false,
        live_viewers: None,
        tags: &["travel", "nature", "adventure", "hiking"],
    },
];

/// Hardcoded feed shown when nothing else is available.
pub fn mock_catalog() -> Vec<VideoItem> {
    SEEDS
        .iter()
        .map(|seed| VideoItem {
            id: seed.id,
            video_url: SAMPLE_VIDEO_URL.to_string(),
            author: seed.author.to_string(),
            description: seed.description.to_string(),
            likes: seed.likes,
            comments: seed.comments,
            shares: seed.shares,
            views: seed.views,
            live_viewers: seed.live_viewers.unwrap_or(0),
            is_liked: false,
            is_saved: false,
            is_following: false,
            is_trending: seed.trending,
            is_live: seed.live_viewers.is_some(),
            tags: seed.tags.iter().map(|tag| tag.to_string()).collect(),
            comment_list: mock_comments(seed.id),
        })
        .collect()
}

fn mock_comments(video_id: u64) -> Vec<Comment> {
    let base = video_id * 100;
    vec![
        Comment {
            id: base + 1,
            author: "@alex_k".into(),
            text: "This made my day!".into(),
            timestamp: "2h ago".into(),
            likes: 124,
        },
        Comment {
            id: base + 2,
            author: "@marina.v".into(),
            text: "Where was this filmed?".into(),
            timestamp: "5h ago".into(),
            likes: 37,
        },
        Comment {
            id: base + 3,
            author: "@dmitry_p".into(),
            text: "Saved it, watching again tomorrow".into(),
            timestamp: "1d ago".into(),
            likes: 9,
        },
    ]
}

pub fn mock_achievements() -> Vec<Achievement> {
    vec![
        Achievement {
            id: 1,
            title: "First Like".into(),
            description: "Like your first video".into(),
            icon: "Heart".into(),
            progress: 1,
            target: 1,
            unlocked: true,
        },
        Achievement {
            id: 2,
            title: "Collector".into(),
            description: "Save 10 videos to favorites".into(),
            icon: "Bookmark".into(),
            progress: 4,
            target: 10,
            unlocked: false,
        },
        Achievement {
            id: 3,
            title: "Explorer".into(),
            description: "Watch 50 videos".into(),
            icon: "Compass".into(),
            progress: 50,
            target: 50,
            unlocked: true,
        },
        Achievement {
            id: 4,
            title: "Influencer".into(),
            description: "Share 25 videos with friends".into(),
            icon: "Share2".into(),
            progress: 7,
            target: 25,
            unlocked: false,
        },
        Achievement {
            id: 5,
            title: "Night Owl".into(),
            description: "Watch videos after midnight 5 times".into(),
            icon: "Moon".into(),
            progress: 2,
            target: 5,
            unlocked: false,
        },
    ]
}
