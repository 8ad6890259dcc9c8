//! The three-tier migration target and its comparison contract.
//!
//! A target decides *when* a tribe runs relative to the others:
//!
//! - [`Target::First`] precedes every versioned target,
//! - [`Target::Literal`] targets run in semantic-version order, and
//! - [`Target::Always`] runs on every migration pass, after all
//!   versioned targets.
//!
//! Comparisons are fallible methods rather than operator impls: a
//! `Literal` whose string does not parse must surface an error, never be
//! silently treated as unequal or unordered.
//!
//! # Examples
//!
//! ```
//! use caravan_target::Target;
//!
//! let checkpoint = Target::literal("2.1.0");
//! assert!(Target::literal("1.0.15").less_than(&checkpoint).unwrap());
//! assert!(checkpoint.less_than(&Target::Always).unwrap());
//! assert!(Target::literal("2.1.0+build.5").equals(&checkpoint).unwrap());
//! ```

use std::cmp::Ordering;
use std::fmt;

use semver::Version;

use crate::error::{Error, Result};

/// The ordering token attached to a migration tribe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Runs before any versioned target.
    First,
    /// A semantic-version string, e.g. `"2.1.0"`.
    Literal(String),
    /// Runs on every migration pass, after all versioned targets.
    Always,
}

impl Target {
    /// Create a `Literal` target from any string-like value.
    pub fn literal(version: impl Into<String>) -> Self {
        Self::Literal(version.into())
    }

    /// Check that this target is well-formed.
    ///
    /// `First` and `Always` are always valid; `Literal` is valid iff its
    /// string parses as a semantic version
    /// (`MAJOR.MINOR.PATCH[-prerelease][+build]`).
    pub fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    /// Parse this target into its ordered form.
    pub fn resolve(&self) -> Result<ResolvedTarget> {
        match self {
            Self::First => Ok(ResolvedTarget::First),
            Self::Always => Ok(ResolvedTarget::Always),
            Self::Literal(raw) => {
                let version = Version::parse(raw).map_err(|source| Error::InvalidTarget {
                    target: raw.clone(),
                    source,
                })?;
                Ok(ResolvedTarget::Literal(version))
            }
        }
    }

    /// Semantic equality between two targets.
    ///
    /// `First == First` and `Always == Always`; two `Literal`s are equal
    /// iff their parsed versions have equal precedence (build metadata
    /// does not participate, pre-release does). Any mixed pairing is
    /// `false` without parsing anything, so the only error is a
    /// `Literal`/`Literal` pairing with an unparseable operand.
    pub fn equals(&self, other: &Target) -> Result<bool> {
        match (self, other) {
            (Self::First, Self::First) | (Self::Always, Self::Always) => Ok(true),
            (Self::Literal(_), Self::Literal(_)) => {
                Ok(self.resolve()?.cmp(&other.resolve()?) == Ordering::Equal)
            }
            _ => Ok(false),
        }
    }

    /// Strict ordering between two targets.
    ///
    /// `First` precedes everything except another `First`, any `Literal`
    /// precedes `Always`, two `Literal`s compare by semantic-version
    /// precedence, and `Always` is never less than anything. Fails if
    /// either operand is an unparseable `Literal`.
    pub fn less_than(&self, other: &Target) -> Result<bool> {
        Ok(self.resolve()?.cmp(&other.resolve()?) == Ordering::Less)
    }

    /// `less_than || equals`, short-circuiting on the first error.
    pub fn less_or_equal(&self, other: &Target) -> Result<bool> {
        Ok(self.less_than(other)? || self.equals(other)?)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Always => f.write_str("always"),
            Self::Literal(raw) => f.write_str(raw),
        }
    }
}

/// A target parsed into its ordered form.
///
/// Carries the total order the planner sorts by: `First`, then `Literal`
/// targets by semantic-version precedence, then `Always`. Build metadata
/// does not participate in the order, so `1.0.0+1` and `1.0.0+2` compare
/// equal.
#[derive(Debug, Clone)]
pub enum ResolvedTarget {
    First,
    Literal(Version),
    Always,
}

impl ResolvedTarget {
    fn tier(&self) -> u8 {
        match self {
            Self::First => 0,
            Self::Literal(_) => 1,
            Self::Always => 2,
        }
    }
}

impl Ord for ResolvedTarget {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Literal(lhs), Self::Literal(rhs)) => lhs.cmp_precedence(rhs),
            _ => self.tier().cmp(&other.tier()),
        }
    }
}

impl PartialOrd for ResolvedTarget {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ResolvedTarget {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ResolvedTarget {}
