use std::fmt;

#[cfg(not(target_arch = "wasm32"))]
use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};

pub(crate) const ESCAPE_CHARS: &str = "|()[]{}\"';`, \t\n";

/// Type for symbol names.
///
/// Symbols are interned by name in the runtime, so two symbols are the same
/// object exactly when their names agree. Equality and hashing are therefore
/// by name for every equivalence relation.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Arbitrary))]
pub struct Symbol {
    name: String,
}

impl Symbol {
    pub fn new<A: AsRef<str>>(name: A) -> Self {
        Self {
            name: name.as_ref().to_owned(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the symbol has to be written with `|...|` to read back.
    pub fn needs_escaping(&self) -> bool {
        self.name.is_empty() || self.name.chars().any(|c| ESCAPE_CHARS.contains(c))
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_escaping() {
            write!(f, "|{}|", self.name.replace('|', "\\|"))
        } else {
            write!(f, "{}", self.name)
        }
    }
}
