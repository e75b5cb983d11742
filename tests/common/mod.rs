//! Equivalence oracle for the integration tests.
//!
//! The runtime's `eq?`, `eqv?` and `equal?` are not part of this crate, so
//! the tests carry a reference implementation of them. The hash laws are
//! checked equality first: a pair of values is only required to hash alike
//! once the oracle has said they are equivalent.
#![allow(dead_code)]

use std::collections::HashSet;

use proptest::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};
use valhash::{Equivalence, Object, RecordKind, Ref, Store, Value};

pub fn init_tracing() {
    let subscriber = Registry::default()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env());
    // other tests may have installed one already
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn equivalent(store: &Store, equiv: Equivalence, a: &Value, b: &Value) -> bool {
    Oracle {
        store,
        assumed: HashSet::new(),
    }
    .equiv(a, b, equiv)
}

struct Oracle<'a> {
    store: &'a Store,
    /// Aggregate pairs currently assumed equal, which is what lets `equal?`
    /// decide cyclic graphs
    assumed: HashSet<(Ref, Ref)>,
}

impl Oracle<'_> {
    fn equiv(&mut self, a: &Value, b: &Value, equiv: Equivalence) -> bool {
        let (a, b) = (a.normalized(), b.normalized());
        match (&*a, &*b) {
            (Value::Undef | Value::Uninit(_), Value::Undef | Value::Uninit(_)) => true,
            (Value::Void, Value::Void)
            | (Value::Eof, Value::Eof)
            | (Value::Null, Value::Null)
            | (Value::True, Value::True)
            | (Value::False, Value::False) => true,
            (Value::Symbol(x), Value::Symbol(y)) => x == y,
            (Value::Fixnum(x), Value::Fixnum(y)) => x == y,
            (Value::Bignum(x), Value::Bignum(y)) => x == y,
            (Value::Rational(x), Value::Rational(y)) => {
                self.equiv(&x.0, &y.0, equiv) && self.equiv(&x.1, &y.1, equiv)
            }
            (Value::Flonum(x), Value::Flonum(y)) => x == y,
            (Value::Complex(x), Value::Complex(y)) => x == y,
            (Value::Char(x), Value::Char(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => {
                x == y || (equiv.by_content() && self.store.fetch_string(&a) == self.store.fetch_string(&b))
            }
            (Value::Bytes(x), Value::Bytes(y)) => {
                x == y || (equiv.by_content() && self.store.fetch_bytes(&a) == self.store.fetch_bytes(&b))
            }
            (Value::Pair(x), Value::Pair(y)) => {
                self.equiv(&x.0, &y.0, equiv) && self.equiv(&x.1, &y.1, equiv)
            }
            (Value::Box(x), Value::Box(y))
            | (Value::MPair(x), Value::MPair(y))
            | (Value::Vector(x), Value::Vector(y))
            | (Value::Record(x), Value::Record(y))
            | (Value::Table(x), Value::Table(y)) => {
                x == y || (equiv.by_content() && self.aggregates(*x, *y))
            }
            (Value::Promise(x), Value::Promise(y))
            | (Value::Procedure(x), Value::Procedure(y))
            | (Value::Special(x), Value::Special(y))
            | (Value::Env(x), Value::Env(y))
            | (Value::Port(x), Value::Port(y))
            | (Value::Error(x), Value::Error(y)) => x == y,
            (Value::Values(x), Value::Values(y)) => self.equiv(x, y, equiv),
            (Value::Tagged(x), Value::Tagged(y)) => {
                self.equiv(&x.0, &y.0, Equivalence::Shallow) && self.equiv(&x.1, &y.1, equiv)
            }
            (Value::Syntax(p, x), Value::Syntax(q, y)) => p == q && self.equiv(x, y, equiv),
            _ => false,
        }
    }

    fn all(&mut self, xs: &[Value], ys: &[Value]) -> bool {
        xs.len() == ys.len()
            && xs
                .iter()
                .zip(ys)
                .all(|(x, y)| self.equiv(x, y, Equivalence::Structural))
    }

    fn aggregates(&mut self, x: Ref, y: Ref) -> bool {
        if !self.assumed.insert((x, y)) {
            return true;
        }
        let store = self.store;
        match (store.fetch(x), store.fetch(y)) {
            (Some(Object::Box(a)), Some(Object::Box(b))) => {
                self.equiv(a, b, Equivalence::Structural)
            }
            (Some(Object::MPair(a0, a1)), Some(Object::MPair(b0, b1))) => {
                self.equiv(a0, b0, Equivalence::Structural)
                    && self.equiv(a1, b1, Equivalence::Structural)
            }
            (Some(Object::Vector(a)), Some(Object::Vector(b))) => self.all(a, b),
            (Some(Object::Record(a)), Some(Object::Record(b))) => {
                let same_kind = match (a.kind, b.kind) {
                    (RecordKind::RecordType, RecordKind::RecordType)
                    | (RecordKind::Other, RecordKind::Other) => true,
                    (RecordKind::Instance(s), RecordKind::Instance(t)) => s == t,
                    _ => false,
                };
                same_kind && self.all(&a.fields, &b.fields)
            }
            (Some(Object::Table(a)), Some(Object::Table(b))) => {
                a.equiv == b.equiv
                    && a.entries.len() == b.entries.len()
                    && a.entries.iter().all(|(k, v)| {
                        b.entries.iter().any(|(l, w)| {
                            self.equiv(k, l, Equivalence::Structural)
                                && self.equiv(v, w, Equivalence::Structural)
                        })
                    })
            }
            _ => false,
        }
    }
}

/// A description of a value that can be materialized into a store any number
/// of times, each time with fresh objects
#[derive(Clone, Debug)]
pub enum Shape {
    Fixnum(i64),
    Flonum(f64),
    Ratio(i64, i64),
    Symbol(String),
    Char(char),
    Str(String),
    Bytes(Vec<u8>),
    Pair(Box<Shape>, Box<Shape>),
    Boxed(Box<Shape>),
    MPair(Box<Shape>, Box<Shape>),
    Vector(Vec<Shape>),
    /// A vector whose last element is the vector itself
    SelfVector(Vec<Shape>),
    Table(Vec<(String, Shape)>),
    Tagged(Box<Shape>),
}

impl Shape {
    /// Materializes the shape. With `reversed`, table entries are inserted
    /// back to front.
    pub fn build(&self, store: &mut Store, reversed: bool) -> Value {
        match self {
            Shape::Fixnum(n) => Value::Fixnum(*n),
            Shape::Flonum(x) => Value::Flonum(*x),
            Shape::Ratio(n, d) => Value::rational(Value::Fixnum(*n), Value::Fixnum(*d)),
            Shape::Symbol(s) => Value::symbol(s),
            Shape::Char(c) => Value::Char(*c),
            Shape::Str(s) => store.string(s),
            Shape::Bytes(b) => store.bytes(b.clone()),
            Shape::Pair(car, cdr) => {
                let car = car.build(store, reversed);
                Value::cons(car, cdr.build(store, reversed))
            }
            Shape::Boxed(x) => {
                let x = x.build(store, reversed);
                store.make_box(x)
            }
            Shape::MPair(fst, snd) => {
                let fst = fst.build(store, reversed);
                let snd = snd.build(store, reversed);
                store.mpair(fst, snd)
            }
            Shape::Vector(xs) => {
                let elts = xs.iter().map(|x| x.build(store, reversed)).collect();
                store.vector(elts)
            }
            Shape::SelfVector(xs) => {
                let elts = xs.iter().map(|x| x.build(store, reversed)).collect();
                let v = store.vector(elts);
                store.vector_push(&v, v.clone()).unwrap();
                v
            }
            Shape::Table(entries) => {
                let t = store.table(Equivalence::Structural);
                let mut built = entries
                    .iter()
                    .map(|(k, v)| (Value::symbol(k), v.build(store, reversed)))
                    .collect::<Vec<_>>();
                if reversed {
                    built.reverse();
                }
                for (k, v) in built {
                    store.table_insert(&t, k, v).unwrap();
                }
                t
            }
            Shape::Tagged(x) => {
                let x = x.build(store, reversed);
                Value::tagged(Value::symbol("tag"), x)
            }
        }
    }
}

pub fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Shape::Fixnum),
        (-1e6..1e6f64).prop_map(Shape::Flonum),
        (-100i64..100, 1i64..100).prop_map(|(n, d)| Shape::Ratio(n, d)),
        "[a-z]{1,6}".prop_map(Shape::Symbol),
        any::<char>().prop_map(Shape::Char),
        ".{0,8}".prop_map(Shape::Str),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Shape::Bytes),
    ];
    leaf.prop_recursive(5, 64, 6, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Pair(a.into(), b.into())),
            inner.clone().prop_map(|x| Shape::Boxed(x.into())),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::MPair(a.into(), b.into())),
            prop::collection::vec(inner.clone(), 0..5).prop_map(Shape::Vector),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Shape::SelfVector),
            prop::collection::btree_map("[a-z]{1,4}", inner.clone(), 0..4)
                .prop_map(|m| Shape::Table(m.into_iter().collect())),
            inner.prop_map(|x| Shape::Tagged(x.into())),
        ]
    })
}
