use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Articles
// ============================================================================

/// A news item as returned by `/news` and `/news/search`.
///
/// `link` is the identity key (summary cache, de-duplication in the UI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Publication time exactly as the feed reported it.
    #[serde(default)]
    pub published: Option<String>,
}

// ============================================================================
// Preferences
// ============================================================================

/// The user's interests and custom sources, owned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub categories: Vec<String>,
    /// Insertion order is display order; duplicates are not rejected here.
    #[serde(default)]
    pub custom_rss_feeds: Vec<String>,
}

impl Preferences {
    /// False means the user still has to pick interests (onboarding).
    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Categories from the known vocabulary, in vocabulary order.
    /// Ids the client does not recognize are skipped.
    pub fn known_categories(&self) -> BTreeSet<Category> {
        self.categories
            .iter()
            .filter_map(|id| id.parse().ok())
            .collect()
    }
}

/// Fixed topical vocabulary offered during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Tech,
    Sports,
    Business,
    Entertainment,
    World,
    Health,
    Science,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Tech,
        Category::Sports,
        Category::Business,
        Category::Entertainment,
        Category::World,
        Category::Health,
        Category::Science,
    ];

    /// Wire identifier sent to `PUT /preferences`.
    pub fn id(self) -> &'static str {
        match self {
            Category::Tech => "Tech",
            Category::Sports => "Sports",
            Category::Business => "Business",
            Category::Entertainment => "Entertainment",
            Category::World => "World",
            Category::Health => "Health",
            Category::Science => "Science",
        }
    }

    /// Human-readable label for the selector.
    pub fn label(self) -> &'static str {
        match self {
            Category::Tech => "Technology",
            Category::World => "World News",
            other => other.id(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

// ============================================================================
// Request / Response Bodies
// ============================================================================

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

/// Login/signup response. The backend also echoes the user profile; only the
/// token matters to the client.
#[derive(Deserialize)]
pub(crate) struct AuthResponse {
    pub token: String,
}

#[derive(Serialize)]
pub(crate) struct CategoriesUpdate {
    pub categories: Vec<&'static str>,
}

#[derive(Serialize)]
pub(crate) struct FeedUrlRequest<'a> {
    pub feed_url: &'a str,
}

#[derive(Serialize)]
pub(crate) struct SummarizeRequest<'a> {
    pub article_url: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct SummarizeResponse {
    pub summary: String,
}
