use serde::{Deserialize, Serialize};

/// The branch name that `pep440-branch` and `pep440-post-branch` treat as the release branch.
pub const DEFAULT_BRANCH: &str = "master";

/// Where in version-control history a build was made. This is the sole input to
/// [`render`](crate::render).
///
/// Pieces are assembled by whatever inspects the repository; this crate never does so itself
/// (see [`describe`](crate::describe) for parsing text that was already captured). When `error`
/// is non-empty, every other field is ignored.
///
/// Serialized field names are hyphenated (`closest-tag`), and every field but `error` may be
/// omitted from a document:
///
/// ```
/// use verstamp::Pieces;
///
/// let pieces: Pieces = serde_json::from_str(r#"{"closest-tag": "v1.2.3", "distance": 1, "short": "abc"}"#).unwrap();
/// assert_eq!(Some("v1.2.3"), pieces.closest_tag.as_deref());
/// assert_eq!(None, pieces.branch);
/// assert!(!pieces.has_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Pieces {
    /// Set when no metadata could be determined. Absent and empty both mean no error.
    #[serde(default)]
    pub error: Option<String>,

    /// The nearest reachable tag, verbatim. `None` if no tag is reachable.
    #[serde(default)]
    pub closest_tag: Option<String>,

    /// Commits since `closest_tag`, or since the root commit when untagged.
    #[serde(default)]
    pub distance: u64,

    /// Whether the working tree has uncommitted modifications.
    #[serde(default)]
    pub dirty: bool,

    /// Abbreviated commit hash.
    #[serde(default)]
    pub short: String,

    /// Full commit hash. Passed through to the result untouched.
    #[serde(default)]
    pub long: String,

    /// ISO-8601 commit date. Passed through to the result untouched.
    #[serde(default)]
    pub date: Option<String>,

    /// Current branch, or `None` for a detached HEAD not contained in any branch.
    #[serde(default)]
    pub branch: Option<String>,
}

impl Pieces {
    /// Pieces for a commit `distance` commits past `tag`, on the default branch.
    pub fn tagged(tag: impl Into<String>, distance: u64, short: impl Into<String>) -> Self {
        Self {
            closest_tag: Some(tag.into()),
            distance,
            short: short.into(),
            branch: Some(DEFAULT_BRANCH.to_owned()),
            ..Self::default()
        }
    }

    /// Pieces for a commit with no reachable tag, on the default branch.
    pub fn untagged(distance: u64, short: impl Into<String>) -> Self {
        Self {
            distance,
            short: short.into(),
            branch: Some(DEFAULT_BRANCH.to_owned()),
            ..Self::default()
        }
    }

    /// Pieces signalling that metadata could not be determined.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sets `dirty`.
    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    /// Sets `branch`.
    pub fn with_branch(mut self, branch: Option<impl Into<String>>) -> Self {
        self.branch = branch.map(Into::into);
        self
    }

    /// Sets `long`.
    pub fn with_long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    /// Sets `date`.
    pub fn with_date(mut self, date: Option<impl Into<String>>) -> Self {
        self.date = date.map(Into::into);
        self
    }

    /// Returns the error message, if there is a non-empty one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }

    /// Returns true if the collaborator reported an error. The other fields are then meaningless.
    pub fn has_error(&self) -> bool {
        self.error_message().is_some()
    }

    /// Returns true if `branch` is [`DEFAULT_BRANCH`]. A missing branch is not the default one.
    pub fn on_default_branch(&self) -> bool {
        self.branch.as_deref() == Some(DEFAULT_BRANCH)
    }
}
