use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::StoreError, hash::Equivalence, tag::ExprTag, value::Value};

/// Identity handle of a heap object.
///
/// A `Ref` is an index into the `Store` that allocated it. Indices are never
/// reused, so two `Ref`s are equal exactly when they name the same object,
/// whatever that object currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ref(pub(crate) usize);

impl Ref {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}>", self.0)
    }
}

/// What a record's kind slot says about it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    /// The record describes a record type
    RecordType,
    /// The record is an instance of the record type behind the `Ref`
    Instance(Ref),
    /// Anything the runtime did not classify
    Other,
}

#[derive(Clone, Debug)]
pub struct Record {
    pub kind: RecordKind,
    pub fields: Vec<Value>,
}

/// Hash table contents. Keys are unique with respect to `equiv`; keeping them
/// so is the business of the table implementation, the store only holds the
/// entries.
#[derive(Clone, Debug)]
pub struct Table {
    pub equiv: Equivalence,
    pub entries: Vec<(Value, Value)>,
}

/// Heap objects. Promises, procedures, special forms, environments, ports and
/// errors only carry a label here; their hash never depends on their content.
#[derive(Clone, Debug)]
pub enum Object {
    Str(String),
    Bytes(Vec<u8>),
    Box(Value),
    MPair(Value, Value),
    Vector(Vec<Value>),
    Record(Record),
    Table(Table),
    Opaque(ExprTag, String),
}

impl Object {
    pub fn tag(&self) -> ExprTag {
        match self {
            Object::Str(_) => ExprTag::Str,
            Object::Bytes(_) => ExprTag::Bytes,
            Object::Box(_) => ExprTag::Box,
            Object::MPair(..) => ExprTag::MPair,
            Object::Vector(_) => ExprTag::Vector,
            Object::Record(_) => ExprTag::Record,
            Object::Table(_) => ExprTag::Table,
            Object::Opaque(tag, _) => *tag,
        }
    }
}

/// Arena holding every object with identity. Values refer to objects through
/// `Ref`s, which is how cyclic graphs are represented.
#[derive(Debug, Default)]
pub struct Store {
    objects: Vec<Object>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn alloc(&mut self, obj: Object) -> Ref {
        let r = Ref(self.objects.len());
        self.objects.push(obj);
        r
    }

    #[inline]
    pub fn fetch(&self, r: Ref) -> Option<&Object> {
        self.objects.get(r.0)
    }

    /// Resolves `target` to its object, checking it is of the `expected` kind
    fn fetch_mut(&mut self, target: &Value, expected: ExprTag) -> Result<&mut Object, StoreError> {
        let found = target.tag();
        let r = match target.reference() {
            Some(r) if found == expected => r,
            _ => return Err(StoreError::KindMismatch { expected, found }),
        };
        let obj = self.objects.get_mut(r.0).ok_or(StoreError::Dangling(r))?;
        if obj.tag() != expected {
            return Err(StoreError::KindMismatch {
                expected,
                found: obj.tag(),
            });
        }
        Ok(obj)
    }

    pub fn string(&mut self, s: &str) -> Value {
        Value::Str(self.alloc(Object::Str(s.to_owned())))
    }

    pub fn bytes<B: Into<Vec<u8>>>(&mut self, bytes: B) -> Value {
        Value::Bytes(self.alloc(Object::Bytes(bytes.into())))
    }

    pub fn make_box(&mut self, value: Value) -> Value {
        Value::Box(self.alloc(Object::Box(value)))
    }

    pub fn mpair(&mut self, fst: Value, snd: Value) -> Value {
        Value::MPair(self.alloc(Object::MPair(fst, snd)))
    }

    pub fn vector(&mut self, elts: Vec<Value>) -> Value {
        Value::Vector(self.alloc(Object::Vector(elts)))
    }

    /// A record type meta-object. Its fields are the type name followed by
    /// the field names, all as symbols.
    pub fn record_type(&mut self, name: &str, field_names: &[&str]) -> Value {
        let fields = std::iter::once(name)
            .chain(field_names.iter().copied())
            .map(Value::symbol)
            .collect();
        Value::Record(self.alloc(Object::Record(Record {
            kind: RecordKind::RecordType,
            fields,
        })))
    }

    /// An instance of `record_type`. Fails if `record_type` is not a record.
    pub fn record(&mut self, record_type: &Value, fields: Vec<Value>) -> Result<Value, StoreError> {
        let ty = match record_type {
            Value::Record(r) => *r,
            other => {
                return Err(StoreError::KindMismatch {
                    expected: ExprTag::Record,
                    found: other.tag(),
                })
            }
        };
        Ok(self.record_with_kind(RecordKind::Instance(ty), fields))
    }

    pub fn record_with_kind(&mut self, kind: RecordKind, fields: Vec<Value>) -> Value {
        Value::Record(self.alloc(Object::Record(Record { kind, fields })))
    }

    pub fn table(&mut self, equiv: Equivalence) -> Value {
        Value::Table(self.alloc(Object::Table(Table {
            equiv,
            entries: Vec::new(),
        })))
    }

    /// Allocates an object that is only ever compared by identity. `tag`
    /// picks the variant; tags of other families fall back to a promise.
    pub fn opaque(&mut self, tag: ExprTag, label: &str) -> Value {
        let tag = match tag {
            ExprTag::Procedure
            | ExprTag::Special
            | ExprTag::Env
            | ExprTag::Port
            | ExprTag::Error => tag,
            _ => ExprTag::Promise,
        };
        let r = self.alloc(Object::Opaque(tag, label.to_owned()));
        match tag {
            ExprTag::Procedure => Value::Procedure(r),
            ExprTag::Special => Value::Special(r),
            ExprTag::Env => Value::Env(r),
            ExprTag::Port => Value::Port(r),
            ExprTag::Error => Value::Error(r),
            _ => Value::Promise(r),
        }
    }

    pub fn fetch_string(&self, value: &Value) -> Option<&str> {
        match value {
            Value::Str(r) => match self.fetch(*r)? {
                Object::Str(s) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn fetch_bytes(&self, value: &Value) -> Option<&[u8]> {
        match value {
            Value::Bytes(r) => match self.fetch(*r)? {
                Object::Bytes(b) => Some(b),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn fetch_vector(&self, value: &Value) -> Option<&[Value]> {
        match value {
            Value::Vector(r) => match self.fetch(*r)? {
                Object::Vector(elts) => Some(elts),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn fetch_record(&self, value: &Value) -> Option<&Record> {
        match value {
            Value::Record(r) => match self.fetch(*r)? {
                Object::Record(record) => Some(record),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn fetch_table(&self, value: &Value) -> Option<&Table> {
        match value {
            Value::Table(r) => match self.fetch(*r)? {
                Object::Table(table) => Some(table),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn set_box(&mut self, target: &Value, value: Value) -> Result<(), StoreError> {
        if let Object::Box(slot) = self.fetch_mut(target, ExprTag::Box)? {
            *slot = value;
        }
        Ok(())
    }

    pub fn set_mpair_fst(&mut self, target: &Value, value: Value) -> Result<(), StoreError> {
        if let Object::MPair(fst, _) = self.fetch_mut(target, ExprTag::MPair)? {
            *fst = value;
        }
        Ok(())
    }

    pub fn set_mpair_snd(&mut self, target: &Value, value: Value) -> Result<(), StoreError> {
        if let Object::MPair(_, snd) = self.fetch_mut(target, ExprTag::MPair)? {
            *snd = value;
        }
        Ok(())
    }

    pub fn vector_push(&mut self, target: &Value, value: Value) -> Result<(), StoreError> {
        if let Object::Vector(elts) = self.fetch_mut(target, ExprTag::Vector)? {
            elts.push(value);
        }
        Ok(())
    }

    pub fn vector_set(&mut self, target: &Value, index: usize, value: Value) -> Result<(), StoreError> {
        if let Object::Vector(elts) = self.fetch_mut(target, ExprTag::Vector)? {
            let len = elts.len();
            let slot = elts
                .get_mut(index)
                .ok_or(StoreError::OutOfBounds { index, len })?;
            *slot = value;
        }
        Ok(())
    }

    pub fn record_set(&mut self, target: &Value, index: usize, value: Value) -> Result<(), StoreError> {
        if let Object::Record(record) = self.fetch_mut(target, ExprTag::Record)? {
            let len = record.fields.len();
            let slot = record
                .fields
                .get_mut(index)
                .ok_or(StoreError::OutOfBounds { index, len })?;
            *slot = value;
        }
        Ok(())
    }

    /// Adds an entry to a table. The caller has already established that
    /// `key` is not present under the table's equivalence.
    pub fn table_insert(&mut self, target: &Value, key: Value, value: Value) -> Result<(), StoreError> {
        if let Object::Table(table) = self.fetch_mut(target, ExprTag::Table)? {
            table.entries.push((key, value));
        }
        Ok(())
    }
}
