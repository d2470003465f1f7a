//! Event resource and its sanitisation rules.
//!
//! Candidate events arriving from a transport go through [`Event::prepare`]
//! and then [`Event::validate`] before they reach a repository. Preparation
//! trims and HTML-escapes the text fields and resets every server-owned
//! field; validation rejects what is still unusable afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Error, User, UserId};

/// Maximum stored length, in characters, of `title` and `content`.
pub const MAX_TEXT_CHARS: usize = 255;

/// Store-assigned event identifier. Zero until persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    /// Identifier of an event that has not been stored yet.
    pub const UNASSIGNED: Self = Self(0);

    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether the store has assigned this identifier.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An event authored by a user.
///
/// `author` is a read-time snapshot looked up from `author_id`; it is never
/// written back to the store and is cleared by [`Event::prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub author: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
}

impl EventDraft {
    /// Trim and escape the text fields, as [`Event::prepare`] does.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            title: escape_html(self.title.trim()),
            content: escape_html(self.content.trim()),
            author_id: self.author_id,
        }
    }

    /// Sanitise a copy of the draft and check it, without stamping or
    /// persisting anything.
    ///
    /// Lets a transport reject unusable input before it resolves the caller.
    ///
    /// # Errors
    /// The same rules as [`Event::validate`].
    pub fn check(&self) -> Result<(), EventValidationError> {
        let sanitized = self.clone().sanitized();
        check_fields(&sanitized.title, &sanitized.content, sanitized.author_id)
    }
}

fn check_fields(title: &str, content: &str, author_id: UserId) -> Result<(), EventValidationError> {
    if title.is_empty() {
        return Err(EventValidationError::MissingTitle);
    }
    if content.is_empty() {
        return Err(EventValidationError::MissingContent);
    }
    if !author_id.is_assigned() {
        return Err(EventValidationError::MissingAuthor);
    }
    if title.chars().count() > MAX_TEXT_CHARS {
        return Err(EventValidationError::TitleTooLong {
            max: MAX_TEXT_CHARS,
        });
    }
    if content.chars().count() > MAX_TEXT_CHARS {
        return Err(EventValidationError::ContentTooLong {
            max: MAX_TEXT_CHARS,
        });
    }
    Ok(())
}

impl Event {
    /// Build an unprepared candidate from client input.
    ///
    /// Timestamps start at `now`; [`Event::prepare`] restamps them anyway.
    #[must_use]
    pub fn candidate(draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: EventId::UNASSIGNED,
            title: draft.title,
            content: draft.content,
            author_id: draft.author_id,
            author: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Normalise a candidate before validation.
    ///
    /// Trims and escapes `title` and `content`, zeroes the identifier, drops
    /// the author snapshot and stamps both timestamps with `now`. Applying it
    /// twice yields the same text fields as applying it once.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use events_backend::domain::{Event, EventDraft, UserId};
    ///
    /// let now = Utc::now();
    /// let event = Event::candidate(
    ///     EventDraft {
    ///         title: "  <b>Launch</b> ".to_owned(),
    ///         content: "Tom & Jerry".to_owned(),
    ///         author_id: UserId::new(1),
    ///     },
    ///     now,
    /// )
    /// .prepare(now);
    /// assert_eq!(event.title, "&lt;b&gt;Launch&lt;/b&gt;");
    /// assert_eq!(event.content, "Tom &amp; Jerry");
    /// ```
    #[must_use]
    pub fn prepare(self, now: DateTime<Utc>) -> Self {
        Self {
            id: EventId::UNASSIGNED,
            title: escape_html(self.title.trim()),
            content: escape_html(self.content.trim()),
            author_id: self.author_id,
            author: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check a prepared event.
    ///
    /// # Errors
    /// Returns the first failing rule, checked in the order title, content,
    /// author.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        check_fields(&self.title, &self.content, self.author_id)
    }

    /// Attach the author snapshot.
    #[must_use]
    pub fn with_author(mut self, author: User) -> Self {
        self.author = Some(author);
        self
    }
}

/// Reasons a prepared event is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    #[error("Required Title")]
    MissingTitle,
    #[error("Required Content")]
    MissingContent,
    #[error("Required Author")]
    MissingAuthor,
    #[error("Title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("Content must be at most {max} characters")]
    ContentTooLong { max: usize },
}

impl EventValidationError {
    /// Wire name of the offending field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingTitle | Self::TitleTooLong { .. } => "title",
            Self::MissingContent | Self::ContentTooLong { .. } => "content",
            Self::MissingAuthor => "authorId",
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingTitle | Self::MissingContent | Self::MissingAuthor => "required",
            Self::TitleTooLong { .. } | Self::ContentTooLong { .. } => "too_long",
        }
    }
}

impl From<EventValidationError> for Error {
    fn from(error: EventValidationError) -> Self {
        Self::unprocessable(error.to_string()).with_details(json!({
            "field": error.field(),
            "code": error.code(),
        }))
    }
}

/// Row shape emitted by the streaming list path.
///
/// Stream consumers only receive the author identifier, so no author lookup
/// is made for these rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventSummary {
    fn from(value: Event) -> Self {
        Self {
            id: value.id,
            title: value.title,
            content: value.content,
            author_id: value.author_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

const ENTITIES: [&str; 6] = ["&amp;", "&lt;", "&gt;", "&quot;", "&#34;", "&#39;"];

/// Escape `& < > " '` as HTML entities, leaving existing entities intact.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (index, ch) in input.char_indices() {
        match ch {
            '&' => {
                let rest = input.get(index..).unwrap_or_default();
                if ENTITIES.iter().any(|entity| rest.starts_with(entity)) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
