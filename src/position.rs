use std::fmt;

#[cfg(not(target_arch = "wasm32"))]
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

/// Source code position attached to a syntax-wrapped value
///
/// Unlike positions in a parser's AST, a position here is part of the
/// wrapped value's identity: two syntax objects are only equivalent when they
/// come from the same place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pos {
    No,
    Pos {
        source: u16,
        offset: usize,
        line: usize,
        column: usize,
    },
}

impl Pos {
    pub fn new(source: u16, offset: usize, line: usize, column: usize) -> Self {
        Self::Pos {
            source,
            offset,
            line,
            column,
        }
    }

    /// Retrieves the line, if present
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::No => None,
            Self::Pos { line, .. } => Some(*line),
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::No => write!(f, "?"),
            Self::Pos {
                source,
                line,
                column,
                ..
            } => write!(f, "{source}:{line}:{column}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Arbitrary for Pos {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(Pos::No),
            (any::<u16>(), 0..4096usize, 1..512usize, 1..120usize)
                .prop_map(|(source, offset, line, column)| Pos::new(source, offset, line, column))
        ]
        .boxed()
    }
}
