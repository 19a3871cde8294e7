//! Keyed composite records built from parallel series.

use crate::error::{Result, SeriesError};
use crate::series::{BoxSeries, Series};
use crate::Rational;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dynamically typed record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Rational(Rational),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Rational(r) if r.is_integer() => Some(r.to_integer()),
            _ => None,
        }
    }

    /// Exact rational view. Integers convert losslessly; floats do not.
    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            Value::Int(n) => Some(Rational::from_integer(*n)),
            Value::Rational(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Rational(r) => Some(*r.numer() as f64 / *r.denom() as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Value::Int(n.into())
    }
}

impl From<Rational> for Value {
    fn from(r: Rational) -> Self {
        Value::Rational(r)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

/// One element of a record series: field name to value, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_int()
    }

    pub fn rational(&self, name: &str) -> Option<Rational> {
        self.get(name)?.as_rational()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Builder returned by [`record`].
#[derive(Default)]
pub struct RecordBuilder {
    fields: Vec<(String, BoxSeries<'static, Value>)>,
}

/// Start building a record series.
///
/// ```ignore
/// let notes = record()
///     .field("grade", s![0, 2, 4])
///     .field("duration", s![r(1, 4)].repeat_forever()?)
///     .build()?;
/// ```
pub fn record() -> RecordBuilder {
    RecordBuilder::default()
}

impl RecordBuilder {
    pub fn field<S>(mut self, name: impl Into<String>, series: S) -> Self
    where
        S: Series + 'static,
        S::Item: Into<Value>,
    {
        self.fields.push((name.into(), series.map(Into::into).boxed()));
        self
    }

    pub fn build(self) -> Result<RecordSeries> {
        if self.fields.is_empty() {
            return Err(SeriesError::EmptyRecord);
        }
        for (i, (name, _)) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|(other, _)| other == name) {
                return Err(SeriesError::DuplicateField(name.clone()));
            }
        }
        Ok(RecordSeries {
            fields: self.fields,
            done: false,
        })
    }
}

/// Series of [`Record`]s. Each read pulls one value from every field; the
/// series ends when any field ends.
pub struct RecordSeries {
    fields: Vec<(String, BoxSeries<'static, Value>)>,
    done: bool,
}

impl Series for RecordSeries {
    type Item = Record;

    fn next_value(&mut self) -> Option<Record> {
        if self.done {
            return None;
        }
        let mut record = Record::new();
        for (name, series) in &mut self.fields {
            match series.next_value() {
                Some(value) => {
                    record.fields.insert(name.clone(), value);
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
        Some(record)
    }

    fn restart(&mut self) -> bool {
        if !self.can_restart() {
            return false;
        }
        for (_, series) in &mut self.fields {
            series.restart();
        }
        self.done = false;
        true
    }

    fn can_restart(&self) -> bool {
        self.fields.iter().all(|(_, series)| series.can_restart())
    }
}
