//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the core domain and external
//! adapters: the browser-automation collaborator, the source of bulletin
//! records consumed by the cache, and the wall clock.

use crate::record::DataRecord;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Handle to one browsing context (a document/window) inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(usize);

impl ContextHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Handle to a located element. Only meaningful to the session that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pub context: ContextHandle,
    pub id: usize,
}

/// Which browsing context to switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextTarget {
    /// Contexts are numbered in the order they were opened, from zero.
    Index(usize),
    MostRecent,
}

/// Structural locator for an element of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// First element matching a CSS selector, optionally required to contain
    /// a text fragment (case-insensitive, whitespace-normalized).
    Css {
        selector: String,
        #[serde(default)]
        contains: Option<String>,
    },
    /// First `target` element that follows, in document order, the first
    /// `heading` element whose text contains `heading_text`.
    AfterHeading {
        heading: String,
        heading_text: String,
        target: String,
    },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css {
            selector: selector.into(),
            contains: None,
        }
    }

    pub fn css_containing(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::Css {
            selector: selector.into(),
            contains: Some(text.into()),
        }
    }

    pub fn after_heading(
        heading: impl Into<String>,
        heading_text: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Locator::AfterHeading {
            heading: heading.into(),
            heading_text: heading_text.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css {
                selector,
                contains: None,
            } => write!(f, "{selector}"),
            Locator::Css {
                selector,
                contains: Some(text),
            } => write!(f, "{selector} containing '{text}'"),
            Locator::AfterHeading {
                heading,
                heading_text,
                target,
            } => write!(f, "{target} after {heading} '{heading_text}'"),
        }
    }
}

/// Factory for browsing sessions.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Start a new, exclusively owned session.
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>>;
}

/// One browser-automation session.
///
/// Dropping a session releases it; `close` is the orderly path.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load a page into a new browsing context and return its handle.
    async fn load_page(&mut self, url: &str) -> Result<ContextHandle>;

    /// Wait until the located element is present and actionable in `context`,
    /// or fail once `timeout` elapses.
    async fn wait_until_actionable(
        &mut self,
        context: ContextHandle,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<NodeHandle>;

    /// Click/follow the element. Following a link opens a new browsing context.
    async fn activate(&mut self, node: &NodeHandle) -> Result<()>;

    /// Make another context current and return its handle.
    fn switch_context(&mut self, target: ContextTarget) -> Result<ContextHandle>;

    /// Visible text of the element, whitespace-normalized.
    async fn text_of(&mut self, node: &NodeHandle) -> Result<String>;

    /// Close the session.
    async fn close(&mut self) -> Result<()>;
}

/// Source of bulletin records for a date.
///
/// `Err` means acquisition could not start at all; any partial failure after
/// that is carried inside the record as diagnostics.
#[async_trait]
pub trait BulletinSource: Send + Sync {
    async fn fetch(&self, date: NaiveDate) -> Result<DataRecord>;
}

/// Wall clock, injected so time-dependent behavior is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
