//! Turning text already captured from `git` into [`Pieces`].
//!
//! Nothing here runs a process or reads a file. The caller runs, for example,
//!
//! ```text
//! git describe --tags --dirty --always --long --match '<tag_prefix>*'
//! git rev-parse HEAD
//! git rev-parse --abbrev-ref HEAD
//! git branch --contains        # only needed for a detached HEAD
//! git rev-list HEAD --count    # only needed when no tag is reachable
//! git show -s --format=%ci HEAD
//! ```
//!
//! and hands the output to the functions below.

use crate::{error::DescribeError, pieces::Pieces, DEFAULT_BRANCH};
use chrono::DateTime;
use tracing::{trace, warn};

const DIRTY_SUFFIX: &str = "-dirty";

/// Captured output of the commands that describe a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescribeInput<'a> {
    /// Output of `git describe --tags --dirty --always --long`.
    pub describe: &'a str,

    /// Output of `git rev-parse HEAD`.
    pub full_revision: &'a str,

    /// Prefix that tags must carry. It is removed from the closest tag.
    pub tag_prefix: &'a str,

    /// Output of `git rev-list HEAD --count`, used as the distance when no tag is reachable.
    /// Required in that case.
    pub commit_count: Option<u64>,
}

/// Parses `git describe --long` output into [`Pieces`].
///
/// `branch` and `date` are left unset; see [`resolve_branch`] and [`iso_commit_date`].
///
/// # Examples
///
/// ```
/// use verstamp::describe::{parse_describe, DescribeInput};
///
/// let pieces = parse_describe(&DescribeInput {
///     describe: "v1.2.3-4-gabc1234-dirty\n",
///     full_revision: "abc1234def",
///     tag_prefix: "v",
///     commit_count: None,
/// })
/// .unwrap();
/// assert_eq!(Some("1.2.3"), pieces.closest_tag.as_deref());
/// assert_eq!(4, pieces.distance);
/// assert_eq!("abc1234", pieces.short);
/// assert!(pieces.dirty);
/// ```
///
/// # Errors
///
/// - [`DescribeError::Unparseable`] if the output contains `-` but is not `TAG-NUM-gHEX`.
/// - [`DescribeError::TagPrefixMismatch`] if `TAG` does not start with `tag_prefix`.
/// - [`DescribeError::MissingCommitCount`] if the output is a bare hash and `commit_count` is
///   `None`.
pub fn parse_describe(input: &DescribeInput<'_>) -> Result<Pieces, DescribeError> {
    let describe = input.describe.trim();
    let (describe, dirty) = match describe.strip_suffix(DIRTY_SUFFIX) {
        Some(rest) => (rest, true),
        None => (describe, false),
    };

    let mut pieces = Pieces {
        error: None,
        dirty,
        long: input.full_revision.trim().to_owned(),
        ..Pieces::default()
    };

    if describe.contains('-') {
        let (tag, distance, short) = split_long_describe(describe).ok_or_else(|| {
            warn!(describe, "unparseable git-describe output");
            DescribeError::Unparseable {
                describe: describe.to_owned(),
            }
        })?;
        let closest_tag =
            tag.strip_prefix(input.tag_prefix)
                .ok_or_else(|| DescribeError::TagPrefixMismatch {
                    tag: tag.to_owned(),
                    prefix: input.tag_prefix.to_owned(),
                })?;
        pieces.closest_tag = Some(closest_tag.to_owned());
        pieces.distance = distance;
        pieces.short = short.to_owned();
    } else {
        // no tag reachable, `--always` gave the bare hash
        pieces.distance = input
            .commit_count
            .ok_or_else(|| DescribeError::MissingCommitCount {
                short: describe.to_owned(),
            })?;
        pieces.short = describe.to_owned();
    }

    trace!(?pieces, "parsed git-describe output");
    Ok(pieces)
}

/// Splits `TAG-NUM-gHEX` from the right, so that `TAG` may itself contain `-`.
fn split_long_describe(describe: &str) -> Option<(&str, u64, &str)> {
    let mut parts = describe.rsplitn(3, '-');
    let hash = parts.next()?;
    let distance = parts.next()?;
    let tag = parts.next()?;

    let short = hash.strip_prefix('g')?;
    if tag.is_empty()
        || short.is_empty()
        || !short.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        || distance.is_empty()
        || !distance.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((tag, distance.parse().ok()?, short))
}

/// Picks a branch for a detached HEAD from `git branch --contains` output.
///
/// The `(HEAD detached at ...)` pseudo-entry is ignored. [`DEFAULT_BRANCH`] wins if present,
/// otherwise the first listed branch. Returns `None` if no branch contains the commit.
pub fn branch_from_contains(listing: &str) -> Option<String> {
    let branches: Vec<&str> = listing
        .lines()
        .map(|line| line.trim_start_matches('*').trim())
        .filter(|branch| !branch.is_empty() && !branch.starts_with('('))
        .collect();

    if branches.contains(&DEFAULT_BRANCH) {
        return Some(DEFAULT_BRANCH.to_owned());
    }
    branches.first().map(|branch| (*branch).to_owned())
}

/// Resolves the current branch from `git rev-parse --abbrev-ref HEAD` output, falling back to
/// [`branch_from_contains`] when HEAD is detached.
pub fn resolve_branch(abbrev_ref: &str, contains_listing: &str) -> Option<String> {
    match abbrev_ref.trim() {
        "HEAD" => branch_from_contains(contains_listing),
        "" => None,
        branch => Some(branch.to_owned()),
    }
}

/// Converts `git show -s --format=%ci` output (`2016-05-31 13:02:11 +0200`) into ISO-8601
/// (`2016-05-31T13:02:11+0200`).
///
/// Only the last non-empty line is read, since signature verification output can precede it.
///
/// # Errors
///
/// - [`DescribeError::UnparseableDate`] if that line is not in `%ci` format.
pub fn iso_commit_date(raw: &str) -> Result<String, DescribeError> {
    let line = raw
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    DateTime::parse_from_str(line, "%Y-%m-%d %H:%M:%S %z")
        .map(|date| date.format("%Y-%m-%dT%H:%M:%S%z").to_string())
        .map_err(|source| DescribeError::UnparseableDate {
            date: line.to_owned(),
            source,
        })
}
