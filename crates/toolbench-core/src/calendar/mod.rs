//! Social media content calendar.
//!
//! [`ContentCalendar`] owns the posts and calendar settings and is the only
//! place they are mutated. Month views and statistics live in [`grid`].

pub mod grid;

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::storage::{merge_by_id, Identified, MergeSummary, ToolKey, Transferable};

pub use grid::{CalendarStats, DayCell, MonthGrid};

/// Publishing platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Instagram,
    Facebook,
    Twitter,
    LinkedIn,
    TikTok,
    YouTube,
    Telegram,
    Blog,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Twitter,
        Platform::LinkedIn,
        Platform::TikTok,
        Platform::YouTube,
        Platform::Telegram,
        Platform::Blog,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "instagram" | "ig" => Some(Platform::Instagram),
            "facebook" | "fb" => Some(Platform::Facebook),
            "twitter" | "x" => Some(Platform::Twitter),
            "linkedin" => Some(Platform::LinkedIn),
            "tiktok" => Some(Platform::TikTok),
            "youtube" | "yt" => Some(Platform::YouTube),
            "telegram" | "tg" => Some(Platform::Telegram),
            "blog" => Some(Platform::Blog),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter / X",
            Platform::LinkedIn => "LinkedIn",
            Platform::TikTok => "TikTok",
            Platform::YouTube => "YouTube",
            Platform::Telegram => "Telegram",
            Platform::Blog => "Blog",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Platform::Instagram => "📸",
            Platform::Facebook => "📘",
            Platform::Twitter => "🐦",
            Platform::LinkedIn => "💼",
            Platform::TikTok => "🎵",
            Platform::YouTube => "▶️",
            Platform::Telegram => "✈️",
            Platform::Blog => "📝",
        }
    }

    /// Maximum post length in characters. `None` means unlimited.
    pub fn char_limit(&self) -> Option<usize> {
        match self {
            Platform::Instagram => Some(2_200),
            Platform::Facebook => Some(63_206),
            Platform::Twitter => Some(280),
            Platform::LinkedIn => Some(3_000),
            Platform::TikTok => Some(2_200),
            Platform::YouTube => Some(5_000),
            Platform::Telegram => Some(4_096),
            Platform::Blog => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Publication status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
}

impl PostStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "scheduled" => Some(PostStatus::Scheduled),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Scheduled => "Scheduled",
            PostStatus::Published => "Published",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub platform: Platform,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields of a new post. `platform: None` uses the calendar default.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub platform: Option<Platform>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub status: PostStatus,
    pub tags: Vec<String>,
}

/// Partial update of a post. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub platform: Option<Platform>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the time
    pub time: Option<Option<NaiveTime>>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
}

/// First day of the week in month views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Some(WeekStart::Monday),
            "sunday" | "sun" => Some(WeekStart::Sunday),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub week_start: WeekStart,
    pub default_platform: Platform,
}

/// Everything the calendar persists under its storage key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentCalendar {
    pub posts: Vec<Post>,
    pub settings: CalendarSettings,
}

/// Trim, drop a leading `#`, lowercase and de-duplicate tags.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().trim_start_matches('#').to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn check_content(content: &str, platform: Platform) -> Result<(), ValidationError> {
    let len = content.chars().count();
    match platform.char_limit() {
        Some(limit) if len > limit => Err(ValidationError::TooLong {
            field: "content".to_string(),
            len,
            limit,
        }),
        _ => Ok(()),
    }
}

impl ContentCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the post whose id equals `id` or uniquely starts with it.
    fn position(&self, id: &str) -> Result<usize, ValidationError> {
        let not_found = || ValidationError::NotFound {
            kind: "post",
            id: id.to_string(),
        };
        if id.is_empty() {
            return Err(not_found());
        }
        if let Some(index) = self.posts.iter().position(|p| p.id == id) {
            return Ok(index);
        }
        let mut matches = self
            .posts
            .iter()
            .enumerate()
            .filter(|(_, p)| p.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some((index, _)), None) => Ok(index),
            _ => Err(not_found()),
        }
    }

    /// Create a post.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequired`] if the title or date is
    /// missing and [`ValidationError::TooLong`] if the content exceeds the
    /// platform limit.
    pub fn add(&mut self, new: NewPost) -> Result<&Post, ValidationError> {
        let mut missing = Vec::new();
        if new.title.trim().is_empty() {
            missing.push("title".to_string());
        }
        if new.date.is_none() {
            missing.push("date".to_string());
        }
        let date = match new.date {
            Some(date) if missing.is_empty() => date,
            _ => return Err(ValidationError::MissingRequired { fields: missing }),
        };
        let platform = new.platform.unwrap_or(self.settings.default_platform);
        check_content(&new.content, platform)?;

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4().to_string(),
            title: new.title.trim().to_string(),
            content: new.content,
            platform,
            date,
            time: new.time,
            status: new.status,
            tags: normalize_tags(new.tags),
            created_at: now,
            updated_at: now,
        };
        debug!(id = %post.id, %date, platform = ?platform, "post added");
        self.posts.push(post);
        let index = self.posts.len() - 1;
        Ok(&self.posts[index])
    }

    /// Apply `patch` to the post `id`. Nothing changes if validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] for an unknown id, or the same
    /// errors as [`ContentCalendar::add`] for the patched post.
    pub fn update(&mut self, id: &str, patch: PostPatch) -> Result<&Post, ValidationError> {
        let index = self.position(id)?;
        let mut post = self.posts[index].clone();
        if let Some(title) = patch.title {
            post.title = title.trim().to_string();
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(platform) = patch.platform {
            post.platform = platform;
        }
        if let Some(date) = patch.date {
            post.date = date;
        }
        if let Some(time) = patch.time {
            post.time = time;
        }
        if let Some(status) = patch.status {
            post.status = status;
        }
        if let Some(tags) = patch.tags {
            post.tags = normalize_tags(tags);
        }

        if post.title.is_empty() {
            return Err(ValidationError::missing("title"));
        }
        check_content(&post.content, post.platform)?;

        post.updated_at = Utc::now();
        self.posts[index] = post;
        Ok(&self.posts[index])
    }

    /// Remove the post `id`, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: &str) -> Result<Post, ValidationError> {
        let index = self.position(id)?;
        Ok(self.posts.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.position(id).ok().map(|index| &self.posts[index])
    }

    /// Posts on `date`, untimed posts first, then by time.
    pub fn posts_on(&self, date: NaiveDate) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().filter(|p| p.date == date).collect();
        posts.sort_by_key(|p| p.time);
        posts
    }

    /// Posts in the given month, ordered by date and time.
    pub fn posts_in_month(&self, year: i32, month: u32) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| p.date.year() == year && p.date.month() == month)
            .collect();
        posts.sort_by_key(|p| (p.date, p.time));
        posts
    }

    /// All posts ordered by date and time.
    pub fn sorted_posts(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by_key(|p| (p.date, p.time));
        posts
    }
}

impl Transferable for ContentCalendar {
    const TOOL: ToolKey = ToolKey::Calendar;
    const KEYS: &'static [&'static str] = &["posts", "settings"];

    fn merge(&mut self, incoming: Self) -> MergeSummary {
        merge_by_id(&mut self.posts, incoming.posts)
    }

    fn record_count(&self) -> usize {
        self.posts.len()
    }
}
