//! Hash codes for `Value`s, consistent with the three equivalence relations
//! of the runtime.
//!
//! Every variant folds its components with `acc * 31 + part`, left to right,
//! and then folds its `ExprTag` last. The relations only differ in how far the
//! traversal looks:
//!
//! | relation     | strings, byte vectors | box, mpair, vector, record, table |
//! |--------------|-----------------------|-----------------------------------|
//! | `Identity`   | by reference          | by reference                      |
//! | `Shallow`    | by reference          | by reference                      |
//! | `Structural` | by content            | by content, cycles cut off        |
//!
//! Pairs, rationals and wrappers are always looked into, with the active
//! relation. The tag of a tagged value is always hashed with `Shallow`.
use std::hash::{Hash, Hasher};

use fxhash::{FxHashSet, FxHasher64};
#[cfg(not(target_arch = "wasm32"))]
use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    config::{Settings, MAX_ON_STACK_CAPACITY},
    num::canonical_bits,
    store::{Object, RecordKind, Ref, Store},
    tag::ExprTag,
    value::Value,
};

/// Multiplier of the hash fold
pub const HASH_MULTIPLIER: u64 = 31;

/// Contribution of a back-edge into an aggregate that is already being hashed
pub const CYCLE_SENTINEL: u64 = 0;

/// The equivalence relation a hash code has to respect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Arbitrary))]
pub enum Equivalence {
    /// Same object
    Identity,
    /// Same simple value, otherwise same object
    Shallow,
    /// Deep content equality
    Structural,
}

impl Equivalence {
    /// Whether strings, byte vectors and mutable aggregates are hashed by
    /// their content rather than by their reference
    #[inline]
    pub fn by_content(self) -> bool {
        matches!(self, Equivalence::Structural)
    }

    /// Hashes `value` under this relation with the default settings
    pub fn hash(self, store: &Store, value: &Value) -> u64 {
        ValueHasher::new(store, self).hash(value)
    }
}

#[inline]
fn mix(acc: u64, part: u64) -> u64 {
    acc.wrapping_mul(HASH_MULTIPLIER).wrapping_add(part)
}

#[inline]
fn finish(acc: u64, tag: ExprTag) -> u64 {
    mix(acc, tag.code())
}

/// Hashes values of one `Store` under one `Equivalence`.
///
/// The on-stack set lives in the hasher and is emptied at the start of each
/// top-level `hash` call, so a hasher can be reused for many values. It must
/// not be shared between threads; every thread builds its own.
///
/// Hashing never reads configuration on its own. To hash with the process
/// settings, pass them in:
///
/// ```
/// use valhash::{config::valhash_config, Equivalence, Store, Value, ValueHasher};
///
/// let store = Store::new();
/// let mut hasher =
///     ValueHasher::with_settings(&store, Equivalence::Structural, valhash_config(None, None));
/// hasher.hash(&Value::Fixnum(1));
/// ```
pub struct ValueHasher<'a> {
    store: &'a Store,
    equiv: Equivalence,
    seed: u64,
    on_stack: FxHashSet<Ref>,
}

impl<'a> ValueHasher<'a> {
    /// A hasher with the default settings
    pub fn new(store: &'a Store, equiv: Equivalence) -> Self {
        Self::with_settings(store, equiv, &Settings::default())
    }

    pub fn with_settings(store: &'a Store, equiv: Equivalence, settings: &Settings) -> Self {
        // only the structural relation ever fills the set
        let capacity = if equiv.by_content() {
            settings.on_stack_capacity.min(MAX_ON_STACK_CAPACITY)
        } else {
            0
        };
        Self {
            store,
            equiv,
            seed: settings.hash_seed,
            on_stack: FxHashSet::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    #[inline]
    pub fn equivalence(&self) -> Equivalence {
        self.equiv
    }

    pub fn hash(&mut self, value: &Value) -> u64 {
        self.on_stack.clear();
        let res = self.hash_value(value, self.equiv);
        debug_assert!(self.on_stack.is_empty());
        res
    }

    /// Deterministic hash of a leaf datum
    fn leaf<T: Hash + ?Sized>(&self, x: &T) -> u64 {
        let mut state = FxHasher64::default();
        self.seed.hash(&mut state);
        x.hash(&mut state);
        state.finish()
    }

    #[inline]
    fn reference(&self, r: Ref) -> u64 {
        self.leaf(&r.index())
    }

    fn hash_value(&mut self, value: &Value, equiv: Equivalence) -> u64 {
        let value = value.normalized();
        match &*value {
            Value::Undef | Value::Uninit(_) => finish(0, ExprTag::Undef),
            Value::Void => finish(0, ExprTag::Void),
            Value::Eof => finish(0, ExprTag::Eof),
            Value::Null => finish(0, ExprTag::Null),
            Value::True => finish(0, ExprTag::True),
            Value::False => finish(0, ExprTag::False),
            Value::Symbol(sym) => finish(self.leaf(sym), ExprTag::Symbol),
            Value::Fixnum(n) => finish(self.leaf(n), ExprTag::Fixnum),
            Value::Bignum(n) => finish(self.leaf(&**n), ExprTag::Bignum),
            Value::Rational(parts) => {
                let num = self.hash_value(&parts.0, equiv);
                let den = self.hash_value(&parts.1, equiv);
                finish(mix(num, den), ExprTag::Rational)
            }
            Value::Flonum(x) => finish(self.leaf(&canonical_bits(*x)), ExprTag::Flonum),
            Value::Complex(c) => finish(self.leaf(&c.canonical_bits()), ExprTag::Complex),
            Value::Char(c) => finish(self.leaf(c), ExprTag::Char),
            Value::Str(r) => {
                let content = match self.store.fetch(*r) {
                    Some(Object::Str(s)) if equiv.by_content() => self.leaf(s.as_str()),
                    _ => self.identity_fallback(*r, ExprTag::Str, equiv),
                };
                finish(content, ExprTag::Str)
            }
            Value::Bytes(r) => {
                let content = match self.store.fetch(*r) {
                    Some(Object::Bytes(bytes)) if equiv.by_content() => {
                        bytes.iter().fold(0, |acc, b| mix(acc, u64::from(*b)))
                    }
                    _ => self.identity_fallback(*r, ExprTag::Bytes, equiv),
                };
                finish(content, ExprTag::Bytes)
            }
            Value::Pair(parts) => self.hash_list(parts, equiv),
            Value::Box(r) => self.hash_aggregate(*r, ExprTag::Box, equiv),
            Value::MPair(r) => self.hash_aggregate(*r, ExprTag::MPair, equiv),
            Value::Vector(r) => self.hash_aggregate(*r, ExprTag::Vector, equiv),
            Value::Record(r) => self.hash_aggregate(*r, ExprTag::Record, equiv),
            Value::Table(r) => self.hash_aggregate(*r, ExprTag::Table, equiv),
            Value::Promise(r) => finish(self.reference(*r), ExprTag::Promise),
            Value::Values(v) => finish(self.hash_value(v, equiv), ExprTag::Values),
            Value::Procedure(r) => finish(self.reference(*r), ExprTag::Procedure),
            Value::Special(r) => finish(self.reference(*r), ExprTag::Special),
            Value::Env(r) => finish(self.reference(*r), ExprTag::Env),
            Value::Port(r) => finish(self.reference(*r), ExprTag::Port),
            Value::Tagged(parts) => {
                let tag = self.hash_value(&parts.0, Equivalence::Shallow);
                let payload = self.hash_value(&parts.1, equiv);
                finish(mix(tag, payload), ExprTag::Tagged)
            }
            Value::Error(r) => finish(self.reference(*r), ExprTag::Error),
            Value::Syntax(pos, v) => {
                let pos = self.leaf(pos);
                finish(mix(pos, self.hash_value(v, equiv)), ExprTag::Syntax)
            }
        }
    }

    /// Hashes a chain of pairs, walking the cdr spine iteratively so that
    /// long lists do not grow the call stack
    fn hash_list(&mut self, head: &(Value, Value), equiv: Equivalence) -> u64 {
        let mut cars = vec![&head.0];
        let mut tail = &head.1;
        while let Value::Pair(next) = tail {
            cars.push(&next.0);
            tail = &next.1;
        }
        let tail = self.hash_value(tail, equiv);
        cars.into_iter().rev().fold(tail, |cdr, car| {
            finish(mix(self.hash_value(car, equiv), cdr), ExprTag::Pair)
        })
    }

    /// Reference contribution, used for the identity relations and for
    /// references that do not resolve to an object of the expected kind
    fn identity_fallback(&self, r: Ref, tag: ExprTag, equiv: Equivalence) -> u64 {
        if equiv.by_content() {
            debug!(%r, %tag, "malformed reference, hashing by identity");
        }
        self.reference(r)
    }

    fn hash_aggregate(&mut self, r: Ref, tag: ExprTag, equiv: Equivalence) -> u64 {
        debug_assert!(tag.is_mutable_aggregate());
        if !equiv.by_content() {
            return finish(self.reference(r), tag);
        }
        if !self.on_stack.insert(r) {
            trace!(%r, %tag, "cycle back-edge");
            return CYCLE_SENTINEL;
        }
        let store = self.store;
        let res = match store.fetch(r) {
            Some(Object::Box(value)) if tag == ExprTag::Box => self.hash_value(value, equiv),
            Some(Object::MPair(fst, snd)) if tag == ExprTag::MPair => {
                let fst = self.hash_value(fst, equiv);
                mix(fst, self.hash_value(snd, equiv))
            }
            Some(Object::Vector(elts)) if tag == ExprTag::Vector => elts
                .iter()
                .fold(0, |acc, elt| mix(acc, self.hash_value(elt, equiv))),
            Some(Object::Record(record)) if tag == ExprTag::Record => {
                let seed = match record.kind {
                    RecordKind::RecordType => 1,
                    RecordKind::Instance(ty) => self.reference(ty),
                    RecordKind::Other => 0,
                };
                record
                    .fields
                    .iter()
                    .fold(seed, |acc, field| mix(acc, self.hash_value(field, equiv)))
            }
            // Entries are summed, so the result does not depend on their order
            Some(Object::Table(table)) if tag == ExprTag::Table => {
                table.entries.iter().fold(0u64, |acc, (key, value)| {
                    let key = self.hash_value(key, equiv);
                    acc.wrapping_add(mix(key, self.hash_value(value, equiv)))
                })
            }
            _ => self.identity_fallback(r, tag, equiv),
        };
        self.on_stack.remove(&r);
        finish(res, tag)
    }
}

/// Hash consistent with object identity (`eq?`)
pub fn identity_hash(store: &Store, value: &Value) -> u64 {
    Equivalence::Identity.hash(store, value)
}

/// Hash consistent with `eqv?`
pub fn shallow_hash(store: &Store, value: &Value) -> u64 {
    Equivalence::Shallow.hash(store, value)
}

/// Hash consistent with deep equality (`equal?`), terminating on cyclic values
pub fn structural_hash(store: &Store, value: &Value) -> u64 {
    Equivalence::Structural.hash(store, value)
}
