#![doc = include_str!("../README.md")]
#![deny(unreachable_pub)]

pub mod config;
pub mod error;
pub mod hash;
pub mod multimap;
mod num;
mod position;
pub mod store;
mod symbol;
pub mod tag;
pub mod value;

pub use error::StoreError;
pub use hash::{identity_hash, shallow_hash, structural_hash, Equivalence, ValueHasher};
pub use multimap::MultiMap;
pub use num::Complex;
pub use position::Pos;
pub use store::{Object, Record, RecordKind, Ref, Store, Table};
pub use symbol::Symbol;
pub use tag::ExprTag;
pub use value::Value;
