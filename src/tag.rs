#[cfg(not(target_arch = "wasm32"))]
use proptest_derive::Arbitrary;
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;
use strum::{EnumIter, FromRepr};

/// A tag for values. Each variant family of `Value` folds its tag into the
/// hash code last, after its content, so that differently shaped values with
/// similar content land in different buckets.
///
/// The numeric values are part of the hash contract and must never change.
/// `10` is unassigned.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize_repr,
    Deserialize_repr,
    FromRepr,
    EnumIter,
)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Arbitrary))]
#[repr(u16)]
pub enum ExprTag {
    Undef = 0,
    Void = 1,
    Eof = 2,
    Null = 3,
    True = 4,
    False = 5,
    Symbol = 6,
    Fixnum = 7,
    Bignum = 8,
    Rational = 9,
    Flonum = 11,
    Complex = 12,
    Char = 13,
    Str = 14,
    Bytes = 15,
    Pair = 16,
    Box = 17,
    MPair = 18,
    Vector = 19,
    Record = 20,
    Table = 21,
    Promise = 22,
    Values = 23,
    Procedure = 24,
    Special = 25,
    Env = 26,
    Port = 27,
    Tagged = 28,
    Error = 29,
    Syntax = 30,
}

impl ExprTag {
    /// The tag as it enters the hash fold
    #[inline]
    pub const fn code(self) -> u64 {
        self as u64
    }

    /// Heap aggregates that the structural relation looks into and that may
    /// therefore close a cycle.
    pub fn is_mutable_aggregate(&self) -> bool {
        matches!(
            self,
            Self::Box | Self::MPair | Self::Vector | Self::Record | Self::Table
        )
    }
}

impl From<ExprTag> for u16 {
    fn from(val: ExprTag) -> Self {
        val as u16
    }
}

impl From<ExprTag> for u64 {
    fn from(val: ExprTag) -> Self {
        val as u64
    }
}

impl TryFrom<u16> for ExprTag {
    type Error = anyhow::Error;

    fn try_from(x: u16) -> Result<Self, anyhow::Error> {
        Self::from_repr(x).ok_or_else(|| anyhow::anyhow!("invalid ExprTag: {x}"))
    }
}

impl fmt::Display for ExprTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprTag::Undef => write!(f, "undef#"),
            ExprTag::Void => write!(f, "void#"),
            ExprTag::Eof => write!(f, "eof#"),
            ExprTag::Null => write!(f, "null#"),
            ExprTag::True => write!(f, "true#"),
            ExprTag::False => write!(f, "false#"),
            ExprTag::Symbol => write!(f, "symbol#"),
            ExprTag::Fixnum => write!(f, "fixnum#"),
            ExprTag::Bignum => write!(f, "bignum#"),
            ExprTag::Rational => write!(f, "rational#"),
            ExprTag::Flonum => write!(f, "flonum#"),
            ExprTag::Complex => write!(f, "complex#"),
            ExprTag::Char => write!(f, "char#"),
            ExprTag::Str => write!(f, "str#"),
            ExprTag::Bytes => write!(f, "bytes#"),
            ExprTag::Pair => write!(f, "pair#"),
            ExprTag::Box => write!(f, "box#"),
            ExprTag::MPair => write!(f, "mpair#"),
            ExprTag::Vector => write!(f, "vector#"),
            ExprTag::Record => write!(f, "record#"),
            ExprTag::Table => write!(f, "table#"),
            ExprTag::Promise => write!(f, "promise#"),
            ExprTag::Values => write!(f, "values#"),
            ExprTag::Procedure => write!(f, "procedure#"),
            ExprTag::Special => write!(f, "special#"),
            ExprTag::Env => write!(f, "env#"),
            ExprTag::Port => write!(f, "port#"),
            ExprTag::Tagged => write!(f, "tagged#"),
            ExprTag::Error => write!(f, "error#"),
            ExprTag::Syntax => write!(f, "syntax#"),
        }
    }
}
