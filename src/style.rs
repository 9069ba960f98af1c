use crate::error::StyleError;
use core::{
    fmt::{self, Display},
    str::FromStr,
};

/// A named version-string grammar.
///
/// Each style is its own grammar. They deliberately disagree on how a dirty tree or a
/// non-default branch is marked, so do not expect one style to be a refinement of another.
///
/// | Style | Tagged, 1 commit, dirty | Untagged, 1 commit, clean |
/// |---|---|---|
/// | `pep440` | `v1.2.3+1.gabc.dirty` | `0+untagged.1.gabc` |
/// | `pep440-branch` | `v1.2.3+1.gabc.dirty` (`.dev0` before `+` off `master`) | `0+untagged.1.gabc` |
/// | `pep440-old` | `v1.2.3.post1.dev0` | `0.post1` |
/// | `pep440-post` | `v1.2.3.post1.dev0+gabc` | `0.post1+gabc` |
/// | `pep440-post-branch` | `v1.2.3.post1+gabc.dirty` (`.dev0` before `+` off `master`) | `0.post1+gabc` |
/// | `pep440-pre` | `v1.2.3.post0.dev1` | `0.post0.dev1` |
/// | `git-describe` | `v1.2.3-1-gabc-dirty` | `abc` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Style {
    /// Tag, then a local version segment with distance and hash.
    #[default]
    #[value(name = "pep440")]
    Pep440,
    /// Like `pep440`, with `.dev0` when not on the default branch.
    #[value(name = "pep440-branch")]
    Pep440Branch,
    /// Post-release segment only, `.dev0` when dirty.
    #[value(name = "pep440-old")]
    Pep440Old,
    /// Post-release segment and a `+g<hash>` local segment, `.dev0` when dirty.
    #[value(name = "pep440-post")]
    Pep440Post,
    /// Post-release segment, `.dev0` off the default branch, `.dirty` when dirty.
    #[value(name = "pep440-post-branch")]
    Pep440PostBranch,
    /// Next post-release as a dev pre-release. Ignores dirtiness.
    #[value(name = "pep440-pre")]
    Pep440Pre,
    /// `TAG-NUM-gHEX[-dirty]`, like `git describe --tags --dirty --always`.
    #[value(name = "git-describe")]
    GitDescribe,
}

impl Style {
    /// Every style, in declaration order.
    pub const ALL: [Style; 7] = [
        Style::Pep440,
        Style::Pep440Branch,
        Style::Pep440Old,
        Style::Pep440Post,
        Style::Pep440PostBranch,
        Style::Pep440Pre,
        Style::GitDescribe,
    ];

    /// Returns the canonical name of this style, e.g. `pep440-post-branch`.
    pub fn name(&self) -> &'static str {
        match self {
            Style::Pep440 => "pep440",
            Style::Pep440Branch => "pep440-branch",
            Style::Pep440Old => "pep440-old",
            Style::Pep440Post => "pep440-post",
            Style::Pep440PostBranch => "pep440-post-branch",
            Style::Pep440Pre => "pep440-pre",
            Style::GitDescribe => "git-describe",
        }
    }

    fn expected_names() -> String {
        Self::ALL
            .iter()
            .map(Style::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = StyleError;

    /// Parses a style by its canonical name. The empty string and `default` both select
    /// [`Style::default`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "default" {
            return Ok(Style::default());
        }
        Self::ALL
            .into_iter()
            .find(|style| style.name() == s)
            .ok_or_else(|| StyleError::Unknown {
                name: s.to_owned(),
                expected: Self::expected_names(),
            })
    }
}
