use std::{borrow::Cow, rc::Rc};

use num_bigint::BigInt;
use num_traits::One;

use crate::{
    num::{reduce, to_fixnum, Complex},
    position::Pos,
    store::Ref,
    symbol::Symbol,
    tag::ExprTag,
};

/// A runtime datum. Immediates are held inline; everything with identity lives
/// in a `Store` and is reached through a `Ref`.
///
/// Pairs and the wrapper variants share their components through `Rc`, so
/// cloning a `Value` never copies a structure. Cycles can only be closed
/// through the mutable aggregates of the store, which is what keeps `Rc`
/// leak-free here.
#[derive(Clone, Debug)]
pub enum Value {
    Undef,
    Uninit(Symbol),
    Void,
    Eof,
    Null,
    True,
    False,
    Symbol(Symbol),
    Fixnum(i64),
    Bignum(Rc<BigInt>),
    Rational(Rc<(Value, Value)>),
    Flonum(f64),
    Complex(Complex),
    Char(char),
    Str(Ref),
    Bytes(Ref),
    Pair(Rc<(Value, Value)>),
    Box(Ref),
    MPair(Ref),
    Vector(Ref),
    Record(Ref),
    Table(Ref),
    Promise(Ref),
    Values(Rc<Value>),
    Procedure(Ref),
    Special(Ref),
    Env(Ref),
    Port(Ref),
    Tagged(Rc<(Value, Value)>),
    Error(Ref),
    Syntax(Pos, Rc<Value>),
}

impl Value {
    #[inline]
    pub fn boolean(b: bool) -> Self {
        if b {
            Value::True
        } else {
            Value::False
        }
    }

    #[inline]
    pub fn symbol(name: &str) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    /// An exact integer in its narrowest representation
    pub fn integer<N: Into<BigInt>>(n: N) -> Self {
        let n = n.into();
        match to_fixnum(&n) {
            Some(x) => Value::Fixnum(x),
            None => Value::Bignum(Rc::new(n)),
        }
    }

    /// A bignum as given, without narrowing. Normalization narrows it later.
    #[inline]
    pub fn bignum<N: Into<BigInt>>(n: N) -> Self {
        Value::Bignum(Rc::new(n.into()))
    }

    /// A rational as given, without reducing it. Normalization reduces it later.
    #[inline]
    pub fn rational(num: Value, den: Value) -> Self {
        Value::Rational(Rc::new((num, den)))
    }

    #[inline]
    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex(Complex::new(re, im))
    }

    #[inline]
    pub fn cons(car: Value, cdr: Value) -> Self {
        Value::Pair(Rc::new((car, cdr)))
    }

    /// A proper list of the given elements
    pub fn list<I>(elts: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        elts.into_iter()
            .rev()
            .fold(Value::Null, |acc, elt| Value::cons(elt, acc))
    }

    #[inline]
    pub fn tagged(tag: Value, payload: Value) -> Self {
        Value::Tagged(Rc::new((tag, payload)))
    }

    #[inline]
    pub fn syntax(pos: Pos, payload: Value) -> Self {
        Value::Syntax(pos, Rc::new(payload))
    }

    #[inline]
    pub fn values(payload: Value) -> Self {
        Value::Values(Rc::new(payload))
    }

    pub fn tag(&self) -> ExprTag {
        match self {
            Value::Undef | Value::Uninit(_) => ExprTag::Undef,
            Value::Void => ExprTag::Void,
            Value::Eof => ExprTag::Eof,
            Value::Null => ExprTag::Null,
            Value::True => ExprTag::True,
            Value::False => ExprTag::False,
            Value::Symbol(_) => ExprTag::Symbol,
            Value::Fixnum(_) => ExprTag::Fixnum,
            Value::Bignum(_) => ExprTag::Bignum,
            Value::Rational(_) => ExprTag::Rational,
            Value::Flonum(_) => ExprTag::Flonum,
            Value::Complex(_) => ExprTag::Complex,
            Value::Char(_) => ExprTag::Char,
            Value::Str(_) => ExprTag::Str,
            Value::Bytes(_) => ExprTag::Bytes,
            Value::Pair(_) => ExprTag::Pair,
            Value::Box(_) => ExprTag::Box,
            Value::MPair(_) => ExprTag::MPair,
            Value::Vector(_) => ExprTag::Vector,
            Value::Record(_) => ExprTag::Record,
            Value::Table(_) => ExprTag::Table,
            Value::Promise(_) => ExprTag::Promise,
            Value::Values(_) => ExprTag::Values,
            Value::Procedure(_) => ExprTag::Procedure,
            Value::Special(_) => ExprTag::Special,
            Value::Env(_) => ExprTag::Env,
            Value::Port(_) => ExprTag::Port,
            Value::Tagged(_) => ExprTag::Tagged,
            Value::Error(_) => ExprTag::Error,
            Value::Syntax(..) => ExprTag::Syntax,
        }
    }

    /// The store reference of values that have object identity
    pub fn reference(&self) -> Option<Ref> {
        match self {
            Value::Str(r)
            | Value::Bytes(r)
            | Value::Box(r)
            | Value::MPair(r)
            | Value::Vector(r)
            | Value::Record(r)
            | Value::Table(r)
            | Value::Promise(r)
            | Value::Procedure(r)
            | Value::Special(r)
            | Value::Env(r)
            | Value::Port(r)
            | Value::Error(r) => Some(*r),
            _ => None,
        }
    }

    /// Exact integer view of fixnums and bignums
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::Fixnum(n) => Some(BigInt::from(*n)),
            Value::Bignum(n) => Some((**n).clone()),
            _ => None,
        }
    }

    /// Reduces the value to its canonical representation:
    /// - bignums that fit a fixnum become fixnums
    /// - rationals are reduced to lowest terms with a positive denominator,
    ///   and collapse to an integer when the denominator is one
    /// - complex numbers without an imaginary part become flonums
    ///
    /// Only the outermost variant is rewritten; wrapped payloads are left
    /// alone. Rationals with a zero or non-integer component are kept as is.
    pub fn normalized(&self) -> Cow<'_, Value> {
        match self {
            Value::Bignum(n) => match to_fixnum(n) {
                Some(x) => Cow::Owned(Value::Fixnum(x)),
                None => Cow::Borrowed(self),
            },
            Value::Rational(parts) => {
                let (num, den) = &**parts;
                let (Some(num), Some(den)) = (num.as_bigint(), den.as_bigint()) else {
                    return Cow::Borrowed(self);
                };
                match reduce(&num, &den) {
                    Some((num, den)) if den.is_one() => Cow::Owned(Value::integer(num)),
                    Some((num, den)) => Cow::Owned(Value::rational(
                        Value::integer(num),
                        Value::integer(den),
                    )),
                    None => Cow::Borrowed(self),
                }
            }
            Value::Complex(c) if c.is_real() => Cow::Owned(Value::Flonum(c.re)),
            _ => Cow::Borrowed(self),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Fixnum(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Flonum(x)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::boolean(b)
    }
}
