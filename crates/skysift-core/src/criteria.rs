//! Structured search criteria.
//!
//! [`SearchCriteria`] holds every filter facet the query compiler knows
//! about. Each facet is independently optional: an empty collection or
//! [`TriState::Any`] means "no constraint", never "match nothing".
//!
//! Set-valued facets are stored as vectors so compiled output is
//! reproducible; the builder methods skip values that are already present.
//!
//! ```rust
//! use skysift_core::criteria::{SearchCriteria, TriState};
//!
//! let criteria = SearchCriteria::new()
//!     .with_text("rust async")
//!     .with_language("en")
//!     .with_hashtag("rustlang")
//!     .with_is_reply(TriState::No);
//! assert_eq!(criteria.languages, vec!["en".to_string()]);
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};

use crate::error::{Error, Result};

/// Moderation labels the index knows about out of the box.
///
/// Searches usually exclude all of them; callers can opt back in per label.
pub const KNOWN_LABELS: &[&str] = &[
    "!hide",
    "!warn",
    "!no-unauthenticated",
    "porn",
    "sexual",
    "nudity",
    "graphic-media",
];

// ============================================================================
// TriState
// ============================================================================

/// Three-valued filter: require true, require false, or don't care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriState {
    /// The property must hold.
    Yes,
    /// The property must not hold.
    No,
    /// No constraint.
    #[default]
    Any,
}

impl TriState {
    /// Clause prefix for this state, or `None` for [`TriState::Any`].
    pub fn sign(self) -> Option<char> {
        match self {
            Self::Yes => Some('+'),
            Self::No => Some('-'),
            Self::Any => None,
        }
    }

    /// Returns `true` unless this is [`TriState::Any`].
    pub fn is_constrained(self) -> bool {
        !matches!(self, Self::Any)
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Any,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl FromStr for TriState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "+" => Ok(Self::Yes),
            "no" | "n" | "false" | "-" => Ok(Self::No),
            "any" | "" | "*" => Ok(Self::Any),
            _ => Err(Error::invalid_value("tri-state", s)),
        }
    }
}

// ============================================================================
// SortOrder
// ============================================================================

/// Result ordering requested from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Most recent first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Index relevance score.
    Relevance,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newest => write!(f, "newest"),
            Self::Oldest => write!(f, "oldest"),
            Self::Relevance => write!(f, "relevance"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "desc" => Ok(Self::Newest),
            "oldest" | "asc" => Ok(Self::Oldest),
            "relevance" => Ok(Self::Relevance),
            _ => Err(Error::invalid_value("sort", s)),
        }
    }
}

// ============================================================================
// EmbedKind
// ============================================================================

/// Kind of embed attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmbedKind {
    /// Image gallery.
    Image,
    /// Video.
    Video,
    /// External link card.
    External,
    /// Quoted record.
    Record,
    /// Quoted record with attached media.
    RecordWithMedia,
    /// Any other kind the index reports; passed through verbatim.
    Other(String),
}

impl EmbedKind {
    /// Name used by the index for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::External => "external",
            Self::Record => "record",
            Self::RecordWithMedia => "record_with_media",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EmbedKind {
    fn from(s: &str) -> Self {
        match s.trim() {
            "image" | "images" => Self::Image,
            "video" => Self::Video,
            "external" => Self::External,
            "record" => Self::Record,
            "record_with_media" | "recordWithMedia" => Self::RecordWithMedia,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for EmbedKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(s.into())
    }
}

// ============================================================================
// Timestamp
// ============================================================================

/// A date bound for the search window.
///
/// Absolute instants are fixed; local wall-clock times are resolved against
/// a timezone when the request is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    /// A fixed instant.
    Absolute(DateTime<Utc>),
    /// A wall-clock datetime without offset.
    Local(NaiveDateTime),
}

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

impl Timestamp {
    /// Resolves this bound to an instant, reading local times in `tz`.
    ///
    /// A local time that falls in a DST gap is read as UTC.
    pub fn resolve<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            Self::Absolute(instant) => *instant,
            Self::Local(naive) => tz
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| naive.and_utc()),
        }
    }

    /// Absolute ISO-8601 string with millisecond precision and `Z` suffix.
    pub fn to_iso_string<Tz: TimeZone>(&self, tz: &Tz) -> String {
        self.resolve(tz)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    /// Accepts RFC 3339 (absolute), a bare `YYYY-MM-DD` date (UTC midnight),
    /// or a datetime without offset (local).
    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self::Absolute(dt.with_timezone(&Utc)));
        }

        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            let midnight = NaiveDateTime::new(date, NaiveTime::default());
            return Ok(Self::Absolute(midnight.and_utc()));
        }

        LOCAL_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .map(Self::Local)
            .ok_or_else(|| {
                Error::invalid_timestamp(s, "expected RFC 3339, YYYY-MM-DD, or YYYY-MM-DDTHH:MM")
            })
    }
}

// ============================================================================
// SearchCriteria
// ============================================================================

/// Every filter facet of a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Free text; only used together with at least one language.
    pub text: String,
    /// Language codes to search the text in.
    pub languages: Vec<String>,
    /// Hashtags, in the order given.
    pub hashtags: Vec<String>,
    /// Result ordering.
    pub sort: SortOrder,
    /// Restrict to these author DIDs.
    pub author_ids: Vec<String>,
    /// Only posts created before this bound.
    pub before: Option<Timestamp>,
    /// Only posts created after this bound.
    pub after: Option<Timestamp>,
    /// Reply filter.
    pub is_reply: TriState,
    /// Labelled-post filter.
    pub has_label: TriState,
    /// Tagged-post filter.
    pub has_tag: TriState,
    /// Embed filter.
    pub has_embed: TriState,
    /// Posts the indexer failed to process.
    pub has_error: TriState,
    /// Posts must carry one of these labels.
    pub include_labels: Vec<String>,
    /// Posts must carry none of these labels.
    pub exclude_labels: Vec<String>,
    /// Posts must carry one of these embed kinds.
    pub embed_types: Vec<EmbedKind>,
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

impl SearchCriteria {
    /// Criteria with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Adds a language code.
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        push_unique(&mut self.languages, code.into());
        self
    }

    /// Adds several language codes.
    pub fn with_languages<I, S>(self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        codes
            .into_iter()
            .fold(self, |c, code| c.with_language(code))
    }

    /// Appends a hashtag (leading `#` is stripped).
    pub fn with_hashtag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let tag = tag.strip_prefix('#').unwrap_or(&tag).to_string();
        self.hashtags.push(tag);
        self
    }

    /// Sets the result ordering.
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Restricts to an author DID.
    pub fn with_author(mut self, did: impl Into<String>) -> Self {
        push_unique(&mut self.author_ids, did.into());
        self
    }

    /// Sets the upper date bound.
    pub fn with_before(mut self, ts: Timestamp) -> Self {
        self.before = Some(ts);
        self
    }

    /// Sets the lower date bound.
    pub fn with_after(mut self, ts: Timestamp) -> Self {
        self.after = Some(ts);
        self
    }

    /// Sets the reply filter.
    pub fn with_is_reply(mut self, state: TriState) -> Self {
        self.is_reply = state;
        self
    }

    /// Sets the labelled-post filter.
    pub fn with_has_label(mut self, state: TriState) -> Self {
        self.has_label = state;
        self
    }

    /// Sets the tagged-post filter.
    pub fn with_has_tag(mut self, state: TriState) -> Self {
        self.has_tag = state;
        self
    }

    /// Sets the embed filter.
    pub fn with_has_embed(mut self, state: TriState) -> Self {
        self.has_embed = state;
        self
    }

    /// Sets the indexing-error filter.
    pub fn with_has_error(mut self, state: TriState) -> Self {
        self.has_error = state;
        self
    }

    /// Requires a label.
    pub fn include_label(mut self, label: impl Into<String>) -> Self {
        push_unique(&mut self.include_labels, label.into());
        self
    }

    /// Excludes a label.
    pub fn exclude_label(mut self, label: impl Into<String>) -> Self {
        push_unique(&mut self.exclude_labels, label.into());
        self
    }

    /// Excludes every entry of [`KNOWN_LABELS`] not explicitly included.
    pub fn exclude_known_labels(self) -> Self {
        KNOWN_LABELS.iter().fold(self, |c, label| {
            if c.include_labels.iter().any(|l| l == label) {
                c
            } else {
                c.exclude_label(*label)
            }
        })
    }

    /// Requires an embed kind.
    pub fn with_embed_type(mut self, kind: impl Into<EmbedKind>) -> Self {
        push_unique(&mut self.embed_types, kind.into());
        self
    }

    /// Returns `true` when no facet constrains the search.
    pub fn is_unconstrained(&self) -> bool {
        let unconstrained = Self {
            sort: self.sort,
            ..Self::default()
        };
        *self == unconstrained
    }
}

// ============================================================================
// Tests
// ============================================================================
