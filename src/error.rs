/// Errors that can occur when selecting a [`Style`](crate::Style) by name.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StyleError {
    /// The name does not belong to any supported style.
    #[error("Unknown style `{name}`, expected one of: {expected}")]
    Unknown {
        /// The name that was given.
        name: String,
        /// Comma-separated list of the accepted names.
        expected: String,
    },
}

/// Errors that can occur when turning captured `git` output into [`Pieces`](crate::Pieces).
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DescribeError {
    /// The describe output has a `-` but is not of the form `TAG-NUM-gHEX`.
    #[error("Unable to parse git-describe output: `{describe}`")]
    Unparseable {
        /// The describe output, with any `-dirty` marker removed.
        describe: String,
    },

    /// The tag found by describe does not carry the configured prefix.
    #[error("Tag `{tag}` doesn't start with prefix `{prefix}`")]
    TagPrefixMismatch {
        /// The full tag name.
        tag: String,
        /// The expected prefix.
        prefix: String,
    },

    /// No tag is reachable and the commit count needed as the distance was not given.
    #[error("No tag reachable from `{short}` and no commit count given")]
    MissingCommitCount {
        /// The bare hash describe gave.
        short: String,
    },

    /// The commit date is not in git's `%ci` format.
    #[error("Unable to parse commit date `{date}`: {source}")]
    UnparseableDate {
        /// The date text that was given.
        date: String,
        /// The underlying parse error.
        source: chrono::ParseError,
    },
}
