//! String ordering strategies.
//!
//! Tag names, attribute names and attribute values are compared through a
//! [`Collation`] chosen at configuration time. Two strategies are offered,
//! each with a case-sensitive and a case-insensitive variant:
//!
//! - [`Strategy::Ordinal`] compares Unicode scalar values.
//! - [`Strategy::Linguistic`] is a locale-neutral, dictionary-like order:
//!   letters compare without regard to case first, and only when two strings
//!   are otherwise equal does case decide, lowercase first. This puts
//!   `apple`, `Apple`, `banana` in that order where ordinal comparison would
//!   yield `Apple`, `apple`, `banana`.
//!
//! No locale tables are involved; the same input sorts the same way on every
//! machine.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How characters are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Code point order.
    Ordinal,
    /// Case-folded order with a lowercase-first tie-break.
    #[default]
    Linguistic,
}

/// Whether letter case is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

/// A string comparison function selected by strategy and case sensitivity.
///
/// ```
/// use std::cmp::Ordering;
/// use sortxml::Collation;
///
/// let ordinal = Collation::ordinal();
/// assert_eq!(ordinal.compare("B", "a"), Ordering::Less);
///
/// let linguistic = Collation::linguistic();
/// assert_eq!(linguistic.compare("B", "a"), Ordering::Greater);
/// assert_eq!(linguistic.compare("a", "A"), Ordering::Less);
///
/// let folded = Collation::linguistic().ignore_case();
/// assert_eq!(folded.compare("GUID", "guid"), Ordering::Equal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Collation {
    pub strategy: Strategy,
    pub case: CaseSensitivity,
}

impl Collation {
    #[must_use]
    pub const fn new(strategy: Strategy, case: CaseSensitivity) -> Self {
        Self { strategy, case }
    }

    /// Case-sensitive code point order.
    #[must_use]
    pub const fn ordinal() -> Self {
        Self::new(Strategy::Ordinal, CaseSensitivity::Sensitive)
    }

    /// Case-sensitive linguistic order (the default).
    #[must_use]
    pub const fn linguistic() -> Self {
        Self::new(Strategy::Linguistic, CaseSensitivity::Sensitive)
    }

    /// Returns the case-insensitive variant of this collation.
    #[must_use]
    pub const fn ignore_case(self) -> Self {
        Self::new(self.strategy, CaseSensitivity::Insensitive)
    }

    #[must_use]
    pub fn is_case_sensitive(&self) -> bool {
        self.case == CaseSensitivity::Sensitive
    }

    /// Compares two strings under this collation.
    #[must_use]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.strategy, self.case) {
            (Strategy::Ordinal, CaseSensitivity::Sensitive) => a.cmp(b),
            (Strategy::Ordinal, CaseSensitivity::Insensitive) => upper(a).cmp(upper(b)),
            (Strategy::Linguistic, CaseSensitivity::Insensitive) => lower(a).cmp(lower(b)),
            (Strategy::Linguistic, CaseSensitivity::Sensitive) => lower(a)
                .cmp(lower(b))
                .then_with(|| case_tie_break(a, b))
                .then_with(|| a.cmp(b)),
        }
    }

    /// Returns `true` if the two strings compare equal.
    #[must_use]
    pub fn equals(&self, a: &str, b: &str) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

fn upper(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().map(|c| simple(c, c.to_uppercase()))
}

fn lower(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().map(|c| simple(c, c.to_lowercase()))
}

/// Simple case mapping: one char to one char. A char whose full mapping
/// expands (`ß` to `SS`) maps to itself.
fn simple(c: char, mut mapped: impl Iterator<Item = char>) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(m), None) => m,
        _ => c,
    }
}

/// At the first position where the strings differ only by case, the
/// lowercase character sorts first.
fn case_tie_break(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        return match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => x.cmp(&y),
        };
    }
    a.chars().count().cmp(&b.chars().count())
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.strategy {
            Strategy::Ordinal => "ordinal",
            Strategy::Linguistic => "linguistic",
        };
        if self.is_case_sensitive() {
            f.write_str(strategy)
        } else {
            write!(f, "{strategy}-ignore-case")
        }
    }
}

/// Parses the names produced by `Display`: `ordinal`, `linguistic`,
/// `ordinal-ignore-case`, `linguistic-ignore-case`.
impl FromStr for Collation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        let (base, case) = match lowered.strip_suffix("-ignore-case") {
            Some(base) => (base, CaseSensitivity::Insensitive),
            None => (lowered.as_str(), CaseSensitivity::Sensitive),
        };
        let strategy = match base {
            "ordinal" => Strategy::Ordinal,
            "linguistic" => Strategy::Linguistic,
            _ => return Err(format!("unknown collation '{s}'")),
        };
        Ok(Self::new(strategy, case))
    }
}
