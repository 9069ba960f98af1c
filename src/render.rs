use crate::{pieces::Pieces, style::Style};
use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// The version rendered when the pieces carry an error.
pub const UNKNOWN_VERSION: &str = "unknown";

/// The release that untagged history is counted from.
const UNTAGGED_BASE: &str = "0";

const POST: &str = ".post";

/// The outcome of [`render`]: the version string, plus the pieces' provenance fields passed
/// through for downstream consumers.
///
/// Serialized field names are hyphenated (`full-revisionid`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Rendered {
    /// The rendered version, or [`UNKNOWN_VERSION`].
    pub version: String,

    /// The full commit hash. `None` when the pieces carry an error and no hash.
    pub full_revisionid: Option<String>,

    /// The pieces' `dirty` flag. `None` when the pieces carry an error.
    pub dirty: Option<bool>,

    /// The pieces' error message, if any.
    pub error: Option<String>,

    /// The commit date. `None` when the pieces carry an error.
    pub date: Option<String>,
}

impl Display for Rendered {
    /// Writes the version string only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// Renders `pieces` in the given [`Style`].
///
/// This never fails: if the pieces carry an error, the version is [`UNKNOWN_VERSION`] whatever
/// the style, and none of the other fields are consulted.
///
/// # Examples
///
/// ```
/// use verstamp::prelude::*;
///
/// let pieces = Pieces::tagged("v1.2.3", 1, "abc").with_dirty(true);
/// assert_eq!("v1.2.3+1.gabc.dirty", render(&pieces, Style::Pep440).version);
/// assert_eq!("v1.2.3.post1.dev0+gabc", render(&pieces, Style::Pep440Post).version);
/// assert_eq!("v1.2.3-1-gabc-dirty", render(&pieces, Style::GitDescribe).version);
///
/// let failed = Pieces::failed("Not a git repo");
/// assert_eq!("unknown", render(&failed, Style::Pep440Pre).version);
/// ```
pub fn render(pieces: &Pieces, style: Style) -> Rendered {
    if let Some(message) = pieces.error_message() {
        debug!(%style, error = message, "pieces carry an error, version is unknown");
        return Rendered {
            version: UNKNOWN_VERSION.to_owned(),
            full_revisionid: Some(pieces.long.clone()).filter(|long| !long.is_empty()),
            dirty: None,
            error: Some(message.to_owned()),
            date: None,
        };
    }

    let version = match style {
        Style::Pep440 => render_pep440(pieces, false),
        Style::Pep440Branch => render_pep440(pieces, !pieces.on_default_branch()),
        Style::Pep440Old => render_pep440_old(pieces),
        Style::Pep440Post => render_pep440_post(pieces),
        Style::Pep440PostBranch => render_pep440_post_branch(pieces),
        Style::Pep440Pre => render_pep440_pre(pieces),
        Style::GitDescribe => render_git_describe(pieces),
    };
    debug!(%style, %version, "rendered version");

    Rendered {
        version,
        full_revisionid: Some(pieces.long.clone()),
        dirty: Some(pieces.dirty),
        error: None,
        date: pieces.date.clone(),
    }
}

/// Like [`render`], but returns only the version string.
pub fn render_version(pieces: &Pieces, style: Style) -> String {
    render(pieces, style).version
}

/// Splits a trailing post-release segment off a tag.
///
/// If `tag` ends in `.post` followed only by ASCII digits (or nothing), returns the text before
/// it and the post number, which is 0 when there are no digits. Otherwise returns the whole tag
/// and `None`. Only the last `.post` is considered.
///
/// ```
/// use verstamp::split_post;
///
/// assert_eq!(("v1.2.3", Some(1)), split_post("v1.2.3.post1"));
/// assert_eq!(("v1.2.3", Some(0)), split_post("v1.2.3.post"));
/// assert_eq!(("v1.2.3", None), split_post("v1.2.3"));
/// assert_eq!(("v1.2.3.post1a", None), split_post("v1.2.3.post1a"));
/// ```
pub fn split_post(tag: &str) -> (&str, Option<u64>) {
    let Some(index) = tag.rfind(POST) else {
        return (tag, None);
    };
    let digits = &tag[index + POST.len()..];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (tag, None);
    }

    let post = if digits.is_empty() {
        0
    } else {
        match digits.parse::<u64>() {
            Ok(post) => post,
            Err(_) => {
                // too many digits for a u64
                trace!(tag, "post number out of range, treating as no post segment");
                return (tag, None);
            }
        }
    };
    trace!(tag, post, "split post segment");
    (&tag[..index], Some(post))
}

/// The tag, when the pieces sit exactly on it with a clean tree.
fn exact_release(pieces: &Pieces) -> Option<&str> {
    match pieces.closest_tag.as_deref() {
        Some(tag) if pieces.distance == 0 && !pieces.dirty => Some(tag),
        _ => None,
    }
}

fn marker(cond: bool, text: &'static str) -> &'static str {
    if cond {
        text
    } else {
        ""
    }
}

/// `TAG[.dev0]+DISTANCE.gHEX[.dirty]`, or `0[.dev0]+untagged.DISTANCE.gHEX[.dirty]`.
fn render_pep440(pieces: &Pieces, dev_branch: bool) -> String {
    if let Some(tag) = exact_release(pieces) {
        return tag.to_owned();
    }
    let (base, untagged) = match pieces.closest_tag.as_deref() {
        Some(tag) => (tag, ""),
        None => (UNTAGGED_BASE, "untagged."),
    };
    format!(
        "{base}{dev}+{untagged}{distance}.g{short}{dirty}",
        dev = marker(dev_branch, ".dev0"),
        distance = pieces.distance,
        short = pieces.short,
        dirty = marker(pieces.dirty, ".dirty"),
    )
}

fn release_base(pieces: &Pieces) -> &str {
    pieces.closest_tag.as_deref().unwrap_or(UNTAGGED_BASE)
}

/// `TAG.postDISTANCE[.dev0]`. Dirty is marked with `.dev0`.
fn render_pep440_old(pieces: &Pieces) -> String {
    if let Some(tag) = exact_release(pieces) {
        return tag.to_owned();
    }
    format!(
        "{base}.post{distance}{dev}",
        base = release_base(pieces),
        distance = pieces.distance,
        dev = marker(pieces.dirty, ".dev0"),
    )
}

/// `TAG.postDISTANCE[.dev0]+gHEX`. Dirty is marked with `.dev0`.
fn render_pep440_post(pieces: &Pieces) -> String {
    if let Some(tag) = exact_release(pieces) {
        return tag.to_owned();
    }
    format!(
        "{base}.post{distance}{dev}+g{short}",
        base = release_base(pieces),
        distance = pieces.distance,
        dev = marker(pieces.dirty, ".dev0"),
        short = pieces.short,
    )
}

/// `TAG.postDISTANCE[.dev0]+gHEX[.dirty]`. Here `.dev0` marks a non-default branch.
fn render_pep440_post_branch(pieces: &Pieces) -> String {
    if let Some(tag) = exact_release(pieces) {
        return tag.to_owned();
    }
    format!(
        "{base}.post{distance}{dev}+g{short}{dirty}",
        base = release_base(pieces),
        distance = pieces.distance,
        dev = marker(!pieces.on_default_branch(), ".dev0"),
        short = pieces.short,
        dirty = marker(pieces.dirty, ".dirty"),
    )
}

/// `TAG.postN.devDISTANCE`, where `N` is one past the tag's own post number, or 0 if it has none.
/// Dirtiness is never shown.
fn render_pep440_pre(pieces: &Pieces) -> String {
    let distance = pieces.distance;
    match pieces.closest_tag.as_deref() {
        Some(tag) if distance == 0 => tag.to_owned(),
        Some(tag) => {
            let (prefix, post) = split_post(tag);
            let next_post = post.map_or(0, |post| post.saturating_add(1));
            format!("{prefix}{POST}{next_post}.dev{distance}")
        }
        None => format!("{UNTAGGED_BASE}{POST}0.dev{distance}"),
    }
}

/// `TAG[-DISTANCE-gHEX][-dirty]`, or the bare short hash when untagged.
fn render_git_describe(pieces: &Pieces) -> String {
    let distance = pieces.distance;
    let base = match pieces.closest_tag.as_deref() {
        Some(tag) if distance > 0 => format!("{tag}-{distance}-g{}", pieces.short),
        Some(tag) => tag.to_owned(),
        None if distance > 0 => pieces.short.clone(),
        None => String::new(),
    };
    base + marker(pieces.dirty, "-dirty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;
    use rstest::rstest;

    const DATE: &str = "2016-05-31T13:02:11+0200";

    /// Pieces shaped the way a collaborator produces them: no hash when sitting on the tag.
    fn pieces(tag: Option<&str>, distance: u64, dirty: bool, branch: &str) -> Pieces {
        let (short, long) = if distance > 0 {
            ("abc", "abcdefg")
        } else {
            ("", "")
        };
        Pieces {
            error: Some(String::new()),
            closest_tag: tag.map(str::to_owned),
            distance,
            dirty,
            short: short.to_owned(),
            long: long.to_owned(),
            date: Some(DATE.to_owned()),
            branch: Some(branch.to_owned()),
        }
    }

    fn assert_rendered(
        style: Style,
        tag: Option<&str>,
        distance: u64,
        dirty: bool,
        branch: &str,
        expected: &str,
    ) {
        let version = render_version(&pieces(tag, distance, dirty, branch), style);
        assert_eq!(
            expected, version,
            "{style} with tag {tag:?}, distance {distance}, dirty {dirty}, branch {branch}"
        );
    }

    #[rstest]
    #[case(Some("v1.2.3"), 0, false, "v1.2.3")]
    #[case(Some("v1.2.3"), 0, true, "v1.2.3+0.g.dirty")]
    #[case(Some("v1.2.3"), 1, false, "v1.2.3+1.gabc")]
    #[case(Some("v1.2.3"), 1, true, "v1.2.3+1.gabc.dirty")]
    #[case(None, 0, false, "0+untagged.0.g")]
    #[case(None, 0, true, "0+untagged.0.g.dirty")]
    #[case(None, 1, false, "0+untagged.1.gabc")]
    #[case(None, 1, true, "0+untagged.1.gabc.dirty")]
    fn test_pep440(
        #[case] tag: Option<&str>,
        #[case] distance: u64,
        #[case] dirty: bool,
        #[case] expected: &str,
    ) {
        assert_rendered(Style::Pep440, tag, distance, dirty, "master", expected);
        // branch-blind
        assert_rendered(Style::Pep440, tag, distance, dirty, "feature", expected);
    }

    #[rstest]
    #[case(Some("v1.2.3"), 0, false, "master", "v1.2.3")]
    #[case(Some("v1.2.3"), 0, true, "master", "v1.2.3+0.g.dirty")]
    #[case(Some("v1.2.3"), 1, false, "master", "v1.2.3+1.gabc")]
    #[case(Some("v1.2.3"), 1, true, "master", "v1.2.3+1.gabc.dirty")]
    #[case(None, 0, false, "master", "0+untagged.0.g")]
    #[case(None, 0, true, "master", "0+untagged.0.g.dirty")]
    #[case(None, 1, false, "master", "0+untagged.1.gabc")]
    #[case(None, 1, true, "master", "0+untagged.1.gabc.dirty")]
    #[case(Some("v1.2.3"), 0, false, "feature", "v1.2.3")]
    #[case(Some("v1.2.3"), 0, true, "feature", "v1.2.3.dev0+0.g.dirty")]
    #[case(Some("v1.2.3"), 1, false, "feature", "v1.2.3.dev0+1.gabc")]
    #[case(Some("v1.2.3"), 1, true, "feature", "v1.2.3.dev0+1.gabc.dirty")]
    #[case(None, 0, false, "feature", "0.dev0+untagged.0.g")]
    #[case(None, 0, true, "feature", "0.dev0+untagged.0.g.dirty")]
    #[case(None, 1, false, "feature", "0.dev0+untagged.1.gabc")]
    #[case(None, 1, true, "feature", "0.dev0+untagged.1.gabc.dirty")]
    fn test_pep440_branch(
        #[case] tag: Option<&str>,
        #[case] distance: u64,
        #[case] dirty: bool,
        #[case] branch: &str,
        #[case] expected: &str,
    ) {
        assert_rendered(Style::Pep440Branch, tag, distance, dirty, branch, expected);
    }

    #[rstest]
    #[case(Some("v1.2.3"), 0, false, "v1.2.3")]
    #[case(Some("v1.2.3"), 0, true, "v1.2.3.post0.dev0")]
    #[case(Some("v1.2.3"), 1, false, "v1.2.3.post1")]
    #[case(Some("v1.2.3"), 1, true, "v1.2.3.post1.dev0")]
    #[case(None, 0, false, "0.post0")]
    #[case(None, 0, true, "0.post0.dev0")]
    #[case(None, 1, false, "0.post1")]
    #[case(None, 1, true, "0.post1.dev0")]
    fn test_pep440_old(
        #[case] tag: Option<&str>,
        #[case] distance: u64,
        #[case] dirty: bool,
        #[case] expected: &str,
    ) {
        assert_rendered(Style::Pep440Old, tag, distance, dirty, "master", expected);
        assert_rendered(Style::Pep440Old, tag, distance, dirty, "feature", expected);
    }

    #[rstest]
    #[case(Some("v1.2.3"), 0, false, "v1.2.3")]
    #[case(Some("v1.2.3"), 0, true, "v1.2.3.post0.dev0+g")]
    #[case(Some("v1.2.3"), 1, false, "v1.2.3.post1+gabc")]
    #[case(Some("v1.2.3"), 1, true, "v1.2.3.post1.dev0+gabc")]
    #[case(None, 0, false, "0.post0+g")]
    #[case(None, 0, true, "0.post0.dev0+g")]
    #[case(None, 1, false, "0.post1+gabc")]
    #[case(None, 1, true, "0.post1.dev0+gabc")]
    fn test_pep440_post(
        #[case] tag: Option<&str>,
        #[case] distance: u64,
        #[case] dirty: bool,
        #[case] expected: &str,
    ) {
        assert_rendered(Style::Pep440Post, tag, distance, dirty, "master", expected);
        assert_rendered(Style::Pep440Post, tag, distance, dirty, "feature", expected);
    }

    #[rstest]
    #[case(Some("v1.2.3"), 0, false, "master", "v1.2.3")]
    #[case(Some("v1.2.3"), 0, true, "master", "v1.2.3.post0+g.dirty")]
    #[case(Some("v1.2.3"), 1, false, "master", "v1.2.3.post1+gabc")]
    #[case(Some("v1.2.3"), 1, true, "master", "v1.2.3.post1+gabc.dirty")]
    #[case(None, 0, false, "master", "0.post0+g")]
    #[case(None, 0, true, "master", "0.post0+g.dirty")]
    #[case(None, 1, false, "master", "0.post1+gabc")]
    #[case(None, 1, true, "master", "0.post1+gabc.dirty")]
    #[case(Some("v1.2.3"), 0, false, "feature", "v1.2.3")]
    #[case(Some("v1.2.3"), 0, true, "feature", "v1.2.3.post0.dev0+g.dirty")]
    #[case(Some("v1.2.3"), 1, false, "feature", "v1.2.3.post1.dev0+gabc")]
    #[case(Some("v1.2.3"), 1, true, "feature", "v1.2.3.post1.dev0+gabc.dirty")]
    #[case(None, 0, false, "feature", "0.post0.dev0+g")]
    #[case(None, 0, true, "feature", "0.post0.dev0+g.dirty")]
    #[case(None, 1, false, "feature", "0.post1.dev0+gabc")]
    #[case(None, 1, true, "feature", "0.post1.dev0+gabc.dirty")]
    fn test_pep440_post_branch(
        #[case] tag: Option<&str>,
        #[case] distance: u64,
        #[case] dirty: bool,
        #[case] branch: &str,
        #[case] expected: &str,
    ) {
        assert_rendered(Style::Pep440PostBranch, tag, distance, dirty, branch, expected);
    }

    #[rstest]
    #[case(Some("v1.2.3"), 0, "v1.2.3")]
    #[case(Some("v1.2.3"), 1, "v1.2.3.post0.dev1")]
    #[case(None, 0, "0.post0.dev0")]
    #[case(None, 1, "0.post0.dev1")]
    #[case(Some("v1.2.3.post"), 0, "v1.2.3.post")]
    #[case(Some("v1.2.3.post1"), 0, "v1.2.3.post1")]
    #[case(Some("v1.2.3.post"), 1, "v1.2.3.post1.dev1")]
    #[case(Some("v1.2.3.post1"), 1, "v1.2.3.post2.dev1")]
    #[case(Some("v1.2.3.post9"), 12, "v1.2.3.post10.dev12")]
    #[case(Some("v1.2.3.postfix"), 2, "v1.2.3.postfix.post0.dev2")]
    fn test_pep440_pre(#[case] tag: Option<&str>, #[case] distance: u64, #[case] expected: &str) {
        // dirtiness never shows in this style
        for dirty in [false, true] {
            assert_rendered(Style::Pep440Pre, tag, distance, dirty, "master", expected);
            assert_rendered(Style::Pep440Pre, tag, distance, dirty, "feature", expected);
        }
    }

    #[rstest]
    #[case(Some("v1.2.3"), 0, false, "v1.2.3")]
    #[case(Some("v1.2.3"), 0, true, "v1.2.3-dirty")]
    #[case(Some("v1.2.3"), 1, false, "v1.2.3-1-gabc")]
    #[case(Some("v1.2.3"), 1, true, "v1.2.3-1-gabc-dirty")]
    #[case(None, 0, false, "")]
    #[case(None, 0, true, "-dirty")]
    #[case(None, 1, false, "abc")]
    #[case(None, 1, true, "abc-dirty")]
    fn test_git_describe(
        #[case] tag: Option<&str>,
        #[case] distance: u64,
        #[case] dirty: bool,
        #[case] expected: &str,
    ) {
        assert_rendered(Style::GitDescribe, tag, distance, dirty, "master", expected);
        assert_rendered(Style::GitDescribe, tag, distance, dirty, "feature", expected);
    }

    #[test]
    fn test_error_is_unknown_for_every_style() {
        let shapes = [
            Pieces::failed("Not a git repo"),
            // stale fields next to an error must not leak into the version
            Pieces {
                error: Some("git not found".to_owned()),
                ..pieces(Some("v1.2.3"), 0, false, "master")
            },
            Pieces {
                error: Some("git not found".to_owned()),
                ..pieces(None, 5, true, "feature")
            },
        ];
        for (style, pieces) in iproduct!(Style::ALL, shapes.iter()) {
            let rendered = render(pieces, style);
            assert_eq!(UNKNOWN_VERSION, rendered.version, "{style}");
            assert_eq!(pieces.error, rendered.error);
            assert_eq!(None, rendered.dirty);
            assert_eq!(None, rendered.date);
        }
    }

    #[test]
    fn test_error_keeps_full_revisionid_when_known() {
        let pieces = Pieces::failed("no tags").with_long("abcdefg");
        let rendered = render(&pieces, Style::Pep440);
        assert_eq!(Some("abcdefg"), rendered.full_revisionid.as_deref());
        assert_eq!(None, render(&Pieces::failed("no tags"), Style::Pep440).full_revisionid);
    }

    #[test]
    fn test_exact_tag_is_verbatim() {
        let tags = ["v1.2.3", "1.0", "release-2024+build.7", "v1.2.3.post4", "weird tag"];
        for (style, tag) in iproduct!(Style::ALL, tags) {
            assert_rendered(style, Some(tag), 0, false, "feature", tag);
        }
    }

    #[test]
    fn test_branch_and_dirty_markers_coexist() {
        let pieces = pieces(Some("v1.2.3"), 1, true, "feature");
        assert_eq!(
            "v1.2.3.dev0+1.gabc.dirty",
            render_version(&pieces, Style::Pep440Branch)
        );
        assert_eq!(
            "v1.2.3.post1.dev0+gabc.dirty",
            render_version(&pieces, Style::Pep440PostBranch)
        );
    }

    #[test]
    fn test_missing_branch_is_not_default() {
        let pieces = Pieces::tagged("v1.2.3", 2, "abc").with_branch(None::<String>);
        assert_eq!("v1.2.3.dev0+2.gabc", render_version(&pieces, Style::Pep440Branch));
        assert_eq!("v1.2.3.post2.dev0+gabc", render_version(&pieces, Style::Pep440PostBranch));
    }

    #[test]
    fn test_passthrough_fields() {
        let pieces = pieces(Some("v1.2.3"), 1, true, "master");
        let rendered = render(&pieces, Style::GitDescribe);
        assert_eq!(Some("abcdefg"), rendered.full_revisionid.as_deref());
        assert_eq!(Some(true), rendered.dirty);
        assert_eq!(None, rendered.error);
        assert_eq!(Some(DATE), rendered.date.as_deref());
        assert_eq!("v1.2.3-1-gabc-dirty", rendered.to_string());
    }

    #[test]
    fn test_render_is_deterministic() {
        let inputs = iproduct!(
            [Some("v1.2.3"), Some("v1.2.3.post1"), None],
            [0, 1, 7],
            [false, true],
            ["master", "feature"]
        );
        for ((tag, distance, dirty, branch), style) in iproduct!(inputs, Style::ALL) {
            let pieces = pieces(tag, distance, dirty, branch);
            let before = pieces.clone();
            assert_eq!(render(&pieces, style), render(&pieces, style));
            assert_eq!(before, pieces);
        }
    }

    #[test]
    fn test_rendered_serializes_hyphenated() {
        let rendered = render(&pieces(Some("v1.2.3"), 1, false, "master"), Style::Pep440);
        let json = serde_json::to_value(&rendered).unwrap();
        assert_eq!("v1.2.3+1.gabc", json["version"]);
        assert_eq!("abcdefg", json["full-revisionid"]);
        assert_eq!(false, json["dirty"]);
    }

    #[rstest]
    #[case("v1.2.3.post1", "v1.2.3", Some(1))]
    #[case("v1.2.3.post", "v1.2.3", Some(0))]
    #[case("v1.2.3.post007", "v1.2.3", Some(7))]
    #[case("1.0.post2.post3", "1.0.post2", Some(3))]
    #[case("v1.2.3", "v1.2.3", None)]
    #[case("v1.2.3.post1a", "v1.2.3.post1a", None)]
    #[case("v1.2.3.post1.dev2", "v1.2.3.post1.dev2", None)]
    #[case("v1.2.3post1", "v1.2.3post1", None)]
    #[case("v1.post99999999999999999999999", "v1.post99999999999999999999999", None)]
    #[case(".post", "", Some(0))]
    #[case("", "", None)]
    fn test_split_post(#[case] tag: &str, #[case] prefix: &str, #[case] post: Option<u64>) {
        assert_eq!((prefix, post), split_post(tag));
    }

    #[test]
    fn test_pre_saturates_huge_post_number() {
        let tag = format!("v1.post{}", u64::MAX);
        let pieces = Pieces::tagged(tag, 1, "abc");
        assert_eq!(
            format!("v1.post{}.dev1", u64::MAX),
            render_version(&pieces, Style::Pep440Pre)
        );
    }
}
