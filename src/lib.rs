//! # verstamp
//!
//! A library for rendering version strings from version-control metadata.
//!
//! Instead of keeping a version number in a file, a build can describe where it sits in history
//! (the nearest tag, how many commits past it, whether the working tree is dirty, which branch)
//! and let verstamp turn that description into a version string in one of several dialects.
//!
//! ## Examples
//!
//! Render a version from [`Pieces`] in a [`Style`]:
//!
//! ```
//! use verstamp::prelude::*;
//!
//! let pieces = Pieces::tagged("1.2.3", 4, "abc1234");
//! let rendered = render(&pieces, Style::Pep440);
//! assert_eq!(rendered.version, "1.2.3+4.gabc1234");
//!
//! // sitting exactly on a tag with a clean tree gives the tag back
//! let pieces = Pieces::tagged("1.2.3", 0, "");
//! assert_eq!(render_version(&pieces, Style::Pep440Post), "1.2.3");
//! ```
//!
//! Or, parse text captured from `git` first:
//!
//! ```
//! use verstamp::prelude::*;
//!
//! let pieces = parse_describe(&DescribeInput {
//!     describe: "v1.2.3.post1-2-gabc1234",
//!     full_revision: "abc1234...",
//!     tag_prefix: "v",
//!     commit_count: None,
//! })
//! .unwrap();
//! assert_eq!(render_version(&pieces, Style::Pep440Pre), "1.2.3.post2.dev2");
//! ```
//!
//! ## Important Terms
//!
//! - **Pieces**: Where a build sits in version-control history. It's modeled by the [`Pieces`]
//!   struct and is the sole input to rendering. The pieces may instead carry an error, in which
//!   case the version is always `unknown`.
//! - **Style**: A version-string grammar, modeled by the [`Style`] enum.
//! - **Distance**: The number of commits since the nearest reachable tag.
//! - **Dirty**: The working tree has uncommitted changes.
//!
//! ## Styles
//!
//! In the table below, the tag is `v1.2.3`, the short hash is `abc`, and "off master" means the
//! branch is anything but `master`.
//!
//! | Style | 0 commits, clean | 1 commit, clean | 1 commit, dirty | 1 commit, clean, off master | Untagged, 1 commit, clean |
//! |---|---|---|---|---|---|
//! | `pep440` | `v1.2.3` | `v1.2.3+1.gabc` | `v1.2.3+1.gabc.dirty` | `v1.2.3+1.gabc` | `0+untagged.1.gabc` |
//! | `pep440-branch` | `v1.2.3` | `v1.2.3+1.gabc` | `v1.2.3+1.gabc.dirty` | `v1.2.3.dev0+1.gabc` | `0+untagged.1.gabc` |
//! | `pep440-old` | `v1.2.3` | `v1.2.3.post1` | `v1.2.3.post1.dev0` | `v1.2.3.post1` | `0.post1` |
//! | `pep440-post` | `v1.2.3` | `v1.2.3.post1+gabc` | `v1.2.3.post1.dev0+gabc` | `v1.2.3.post1+gabc` | `0.post1+gabc` |
//! | `pep440-post-branch` | `v1.2.3` | `v1.2.3.post1+gabc` | `v1.2.3.post1+gabc.dirty` | `v1.2.3.post1.dev0+gabc` | `0.post1+gabc` |
//! | `pep440-pre` | `v1.2.3` | `v1.2.3.post0.dev1` | `v1.2.3.post0.dev1` | `v1.2.3.post0.dev1` | `0.post0.dev1` |
//! | `git-describe` | `v1.2.3` | `v1.2.3-1-gabc` | `v1.2.3-1-gabc-dirty` | `v1.2.3-1-gabc` | `abc` |
//!
//! `pep440-pre` also bumps a post-release segment already in the tag: `v1.2.3.post1` one commit
//! later renders as `v1.2.3.post2.dev1`. See [`split_post`].
//!
//! ## Prelude
//!
//! verstamp provides a prelude module for convenience. It contains everything needed to interact
//! with the library.
//!
//! Use it with:
//!
//! ```
//! use verstamp::prelude::*;
//! ```
#![warn(missing_docs)]

pub mod describe;
mod error;
mod pieces;
mod render;
mod style;

pub use crate::error::{DescribeError, StyleError};
pub use crate::pieces::{Pieces, DEFAULT_BRANCH};
pub use crate::render::{render, render_version, split_post, Rendered, UNKNOWN_VERSION};
pub use crate::style::Style;

/// A convenience module appropriate for glob imports (`use verstamp::prelude::*;`).
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::describe::{parse_describe, DescribeInput};
    #[doc(no_inline)]
    pub use crate::render::{render, render_version};
    #[doc(no_inline)]
    pub use crate::DescribeError;
    #[doc(no_inline)]
    pub use crate::Pieces;
    #[doc(no_inline)]
    pub use crate::Rendered;
    #[doc(no_inline)]
    pub use crate::Style;
    #[doc(no_inline)]
    pub use crate::StyleError;
}
