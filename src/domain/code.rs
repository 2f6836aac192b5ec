use std::{fmt, ops::Range, str::FromStr};

use serde::{Deserialize, Serialize};

/// Composite sector labels and the representative code each one collapses
/// to.
///
/// These are the only non-numeric values the `Code` column may contain.
const COMPOSITE_LABELS: [(&str, u64); 3] = [("31-33", 31), ("44-45", 44), ("48-49", 48)];

/// A classification code.
///
/// The hierarchy is encoded one decimal digit per level: `311` is a child of
/// `31`, `3111` a child of `311`, and so on. Three sectors (31, 44 and 48)
/// cover several two-digit codes and therefore own a wider range of children.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Code(u64);

impl Code {
    /// The synthetic root of the hierarchy.
    ///
    /// Its children are the two-digit sector codes.
    pub const ROOT: Self = Self(0);

    /// Creates a code from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value of the code.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is the synthetic root.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == Self::ROOT.0
    }

    /// The half-open range of codes that are direct children of this code.
    ///
    /// | code  | range        |
    /// |-------|--------------|
    /// | 0     | `0..100`     |
    /// | 31    | `310..340`   |
    /// | 44    | `440..460`   |
    /// | 48    | `480..500`   |
    /// | n     | `10n..10n+10`|
    ///
    /// Bounds saturate at [`u64::MAX`].
    #[must_use]
    pub const fn child_range(self) -> Range<u64> {
        match self.0 {
            0 => 0..100,
            31 => 310..340,
            44 => 440..460,
            48 => 480..500,
            n => n.saturating_mul(10)..n.saturating_add(1).saturating_mul(10),
        }
    }

    /// Returns `true` if `other` falls within this code's child range.
    #[must_use]
    pub const fn is_parent_of(self, other: Self) -> bool {
        let range = self.child_range();
        range.start <= other.0 && other.0 < range.end
    }
}

impl From<u64> for Code {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Code> for u64 {
    fn from(code: Code) -> Self {
        code.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a value in the `Code` column is neither a known
/// composite label nor a non-negative integer.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Malformed classification code '{0}': expected a non-negative integer")]
pub struct MalformedCodeError(pub(crate) String);

impl MalformedCodeError {
    /// The offending value, as it appeared in the source table.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl FromStr for Code {
    type Err = MalformedCodeError;

    /// Parses a code, collapsing the composite sector labels (`31-33`,
    /// `44-45`, `48-49`) to their representative code.
    ///
    /// Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some((_, code)) = COMPOSITE_LABELS
            .iter()
            .find(|(label, _)| *label == trimmed)
        {
            return Ok(Self(*code));
        }

        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| MalformedCodeError(s.to_string()))
    }
}

impl TryFrom<i64> for Code {
    type Error = MalformedCodeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| MalformedCodeError(value.to_string()))
    }
}

impl TryFrom<&str> for Code {
    type Error = MalformedCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}
