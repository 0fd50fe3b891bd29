use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    // Tags are short labels: alphanumeric, underscores, hyphens. Empty means untagged.
    static ref TAG_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]*$").unwrap();
}

/// Input structure for creating or updating a task.
///
/// Ownership is deliberately absent: the owner always comes from the
/// authenticated identity. Unknown fields such as `author_id` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,

    #[serde(default)]
    #[validate(
        length(max = 50),
        regex(
            path = "TAG_REGEX",
            message = "Tag must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub tag: String,

    /// Time spent, in minutes.
    #[validate(range(min = 0))]
    pub duration: i32,

    pub date: DateTime<Utc>,
}

/// A time-tracking entry as stored in the `tasks` table and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tag: String,
    pub duration: i32,
    pub date: DateTime<Utc>,
    /// Display name of the owner, copied at creation/update time.
    pub author: String,
    /// Owner of the task.
    pub author_id: Uuid,
}

/// Parses a query value, treating a blank value like a missing key.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Query parameters accepted by `GET /api/tasks`.
///
/// There is no owner field; see [`TaskFilter::from_query`].
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct TaskQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub id: Option<Uuid>,
    /// Case-insensitive substring of the title.
    #[validate(length(max = 200))]
    pub title: Option<String>,
    /// Case-insensitive substring of the description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub duration_min: Option<i32>,
    #[validate(range(min = 0))]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub duration_max: Option<i32>,
    pub tag: Option<String>,
    /// Exact author display name.
    pub author: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date_to: Option<DateTime<Utc>>,
}

/// A sparse task filter. Every present field must hold (logical AND); absent
/// fields impose no constraint. The owner constraint is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFilter {
    owner_id: Uuid,
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_min: Option<i32>,
    pub duration_max: Option<i32>,
    pub tag: Option<String>,
    pub author: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl TaskFilter {
    /// A filter matching every task owned by `owner_id`.
    pub fn for_owner(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            id: None,
            title: None,
            description: None,
            duration_min: None,
            duration_max: None,
            tag: None,
            author: None,
            date_from: None,
            date_to: None,
        }
    }

    /// Builds a filter from client query parameters, scoped to `owner_id`.
    /// Empty strings count as absent.
    pub fn from_query(query: TaskQuery, owner_id: Uuid) -> Self {
        Self {
            owner_id,
            id: query.id,
            title: non_empty(query.title),
            description: non_empty(query.description),
            duration_min: query.duration_min,
            duration_max: query.duration_max,
            tag: non_empty(query.tag),
            author: non_empty(query.author),
            date_from: query.date_from,
            date_to: query.date_to,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Evaluates the filter against a single task.
    pub fn matches(&self, task: &Task) -> bool {
        fn contains_ci(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        task.author_id == self.owner_id
            && self.id.map_or(true, |id| task.id == id)
            && self
                .title
                .as_deref()
                .map_or(true, |t| contains_ci(&task.title, t))
            && self
                .description
                .as_deref()
                .map_or(true, |d| contains_ci(&task.description, d))
            && self.duration_min.map_or(true, |min| task.duration >= min)
            && self.duration_max.map_or(true, |max| task.duration <= max)
            && self.tag.as_deref().map_or(true, |tag| task.tag == tag)
            && self.author.as_deref().map_or(true, |a| task.author == a)
            && self.date_from.map_or(true, |from| task.date >= from)
            && self.date_to.map_or(true, |to| task.date <= to)
    }
}
