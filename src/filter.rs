//! Predicates over messages and their AND-composition.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::models::{Message, Platform};

/// A pure predicate over a single message.
///
/// Implementations must not keep state between calls. Closures of type
/// `Fn(&Message) -> bool` implement this trait too.
pub trait MessageFilter: Send + Sync {
    /// Whether `message` passes this filter
    fn matches(&self, message: &Message) -> bool;
}

impl<F> MessageFilter for F
where
    F: Fn(&Message) -> bool + Send + Sync,
{
    fn matches(&self, message: &Message) -> bool {
        self(message)
    }
}

/// Accepts messages sent by, or sent directly to, one user.
#[derive(Debug, Clone)]
pub struct ParticipantFilter {
    user_id: String,
}

impl ParticipantFilter {
    /// Filter on `user_id`
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl MessageFilter for ParticipantFilter {
    fn matches(&self, message: &Message) -> bool {
        message.involves(&self.user_id)
    }
}

/// Accepts messages strictly newer than an instant.
#[derive(Debug, Clone, Copy)]
pub struct CursorFilter {
    after: DateTime<Utc>,
}

impl CursorFilter {
    /// Exclusive lower bound at `after`
    #[must_use]
    pub const fn new(after: DateTime<Utc>) -> Self {
        Self { after }
    }
}

impl MessageFilter for CursorFilter {
    fn matches(&self, message: &Message) -> bool {
        message.timestamp > self.after
    }
}

/// Accepts messages sent over one platform.
#[derive(Debug, Clone)]
pub struct PlatformFilter {
    platform: Platform,
}

impl PlatformFilter {
    /// Filter on `platform`
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl MessageFilter for PlatformFilter {
    fn matches(&self, message: &Message) -> bool {
        message.platform == self.platform
    }
}

/// Accepts messages posted to one group.
#[derive(Debug, Clone)]
pub struct GroupFilter {
    group_id: String,
}

impl GroupFilter {
    /// Filter on `group_id`
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
        }
    }
}

impl MessageFilter for GroupFilter {
    fn matches(&self, message: &Message) -> bool {
        message.to.group_id() == Some(self.group_id.as_str())
    }
}

/// Ordered set of filters combined with short-circuiting AND.
///
/// An empty pipeline accepts every message.
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn MessageFilter>>,
}

impl FilterPipeline {
    /// Create an empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter
    pub fn push(&mut self, filter: impl MessageFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Builder-style [`push`](Self::push)
    #[must_use]
    pub fn with(mut self, filter: impl MessageFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    /// Whether every filter accepts `message`
    #[must_use]
    pub fn accepts(&self, message: &Message) -> bool {
        self.filters.iter().all(|filter| filter.matches(message))
    }

    /// Number of filters
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// True when no filter is installed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("filters", &self.filters.len())
            .finish()
    }
}
