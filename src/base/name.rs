//! Case-insensitive identifiers.

use smol_str::SmolStr;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An identifier as written in Pascal source.
///
/// Pascal identifiers are case-insensitive: `Count`, `COUNT` and `count`
/// all name the same thing. `Name` keeps the spelling it was created with
/// (for display and reporting) next to a case-folded key used for
/// equality, ordering and hashing.
///
/// Dotted names such as `System.SysUtils` are plain `Name`s; use
/// [`Name::segments`] to split them.
#[derive(Clone)]
pub struct Name {
    text: SmolStr,
    folded: SmolStr,
}

impl Name {
    /// Create a name from its source spelling.
    pub fn new(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        Self {
            text: SmolStr::new(text),
            folded: fold(text),
        }
    }

    /// The spelling this name was created with.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The case-folded key.
    #[inline]
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Compare against a raw string, ignoring case.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        if other.is_ascii() {
            self.folded.eq_ignore_ascii_case(other)
        } else {
            *self.folded == *fold(other)
        }
    }

    /// Split a dotted name into its segments.
    pub fn segments(&self) -> impl Iterator<Item = Name> + '_ {
        self.text.split('.').map(Name::new)
    }

    /// Join two names with a dot (`System` + `SysUtils` → `System.SysUtils`).
    pub fn join(&self, other: &Name) -> Name {
        Name::new(format!("{}.{}", self.text, other.text))
    }

    /// Whether this name ends with `.suffix`, or is equal to `suffix`.
    pub fn ends_with_segments(&self, suffix: &Name) -> bool {
        if self == suffix {
            return true;
        }
        self.folded.len() > suffix.folded.len()
            && self.folded.ends_with(suffix.folded.as_str())
            && self.folded.as_bytes()[self.folded.len() - suffix.folded.len() - 1] == b'.'
    }
}

fn fold(text: &str) -> SmolStr {
    if text.is_ascii() {
        if text.bytes().any(|b| b.is_ascii_uppercase()) {
            SmolStr::new(text.to_ascii_lowercase())
        } else {
            SmolStr::new(text)
        }
    } else {
        SmolStr::new(text.to_lowercase())
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.text)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Name::new(text)
    }
}

impl From<SmolStr> for Name {
    fn from(text: SmolStr) -> Self {
        let folded = fold(&text);
        Self { text, folded }
    }
}
