// used to (de)serialize snapshots, e.g. when a change log is read from JSON
use serde::{Deserialize, Serialize};

// used for dates and timestamps in the snapshots
use chrono::{NaiveDate, NaiveDateTime};
// used for decimal numbers
use bigdecimal::BigDecimal;

// used when parsing a string to a decimal
use std::str::FromStr;
// used to print out readable forms of a value
use std::fmt;
// used to overload common operations for datatypes
use std::ops;

/// The broad family a value belongs to, used by type checks on value views.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ValueType {
    Bytes,
    Boolean,
    Text,
    Date,
    DateTime,
    Number,
    NotIdentified,
}
impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ValueType::Bytes => "BYTES",
            ValueType::Boolean => "BOOLEAN",
            ValueType::Text => "TEXT",
            ValueType::Date => "DATE",
            ValueType::DateTime => "DATE_TIME",
            ValueType::Number => "NUMBER",
            ValueType::NotIdentified => "NOT_IDENTIFIED",
        };
        write!(f, "{}", name)
    }
}

#[derive(Eq, PartialEq, Hash, PartialOrd, Ord, Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decimal(BigDecimal);

impl Decimal {
    pub fn from_str(s: &str) -> Option<Decimal> {
        match BigDecimal::from_str(s) {
            Ok(decimal) => Some(Decimal(decimal)),
            _ => None,
        }
    }
}
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl ops::Deref for Decimal {
    type Target = BigDecimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl From<BigDecimal> for Decimal {
    fn from(d: BigDecimal) -> Self {
        Decimal(d)
    }
}

/// The raw content of one cell of a snapshot.
#[derive(Eq, PartialEq, Hash, Clone, Debug, Serialize, Deserialize)]
pub enum ValueKind {
    Null,
    Boolean(bool),
    Number(i64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Bytes(Vec<u8>),
}
impl ValueKind {
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueKind::Null => ValueType::NotIdentified,
            ValueKind::Boolean(_) => ValueType::Boolean,
            ValueKind::Number(_) | ValueKind::Decimal(_) => ValueType::Number,
            ValueKind::Text(_) => ValueType::Text,
            ValueKind::Date(_) => ValueType::Date,
            ValueKind::DateTime(_) => ValueType::DateTime,
            ValueKind::Bytes(_) => ValueType::Bytes,
        }
    }
}
impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueKind::Null => write!(f, "null"),
            ValueKind::Boolean(b) => write!(f, "{}", b),
            ValueKind::Number(n) => write!(f, "{}", n),
            ValueKind::Decimal(d) => write!(f, "{}", d),
            ValueKind::Text(s) => write!(f, "\"{}\"", s),
            ValueKind::Date(d) => write!(f, "{}", d),
            ValueKind::DateTime(d) => write!(f, "{}", d),
            ValueKind::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

// Conversions so that expected values can be written as plain literals.
impl From<bool> for ValueKind {
    fn from(b: bool) -> Self {
        ValueKind::Boolean(b)
    }
}
impl From<i64> for ValueKind {
    fn from(n: i64) -> Self {
        ValueKind::Number(n)
    }
}
impl From<i32> for ValueKind {
    fn from(n: i32) -> Self {
        ValueKind::Number(n.into())
    }
}
impl From<&str> for ValueKind {
    fn from(s: &str) -> Self {
        ValueKind::Text(s.to_owned())
    }
}
impl From<String> for ValueKind {
    fn from(s: String) -> Self {
        ValueKind::Text(s)
    }
}
impl From<NaiveDate> for ValueKind {
    fn from(d: NaiveDate) -> Self {
        ValueKind::Date(d)
    }
}
impl From<NaiveDateTime> for ValueKind {
    fn from(d: NaiveDateTime) -> Self {
        ValueKind::DateTime(d)
    }
}
impl From<Decimal> for ValueKind {
    fn from(d: Decimal) -> Self {
        ValueKind::Decimal(d)
    }
}
impl<T: Into<ValueKind>> From<Option<T>> for ValueKind {
    fn from(o: Option<T>) -> Self {
        o.map_or(ValueKind::Null, Into::into)
    }
}

// ------------- Value -------------
/// A cell together with the name of the column it was read from.
#[derive(Eq, PartialEq, Hash, Clone, Debug, Serialize, Deserialize)]
pub struct Value {
    #[serde(default)]
    column_name: Option<String>,
    kind: ValueKind,
}
impl Value {
    pub fn new(column_name: Option<String>, kind: ValueKind) -> Self {
        Self { column_name, kind }
    }
    pub fn named(column_name: &str, kind: impl Into<ValueKind>) -> Self {
        Self::new(Some(column_name.to_owned()), kind.into())
    }
    pub fn column_name(&self) -> Option<&str> {
        self.column_name.as_deref()
    }
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }
    pub fn value_type(&self) -> ValueType {
        self.kind.value_type()
    }
    pub fn is_null(&self) -> bool {
        self.kind == ValueKind::Null
    }
    // A value keeps its column name, so rows can hand out copies without losing it.
    pub(crate) fn with_column_name(mut self, column_name: &str) -> Self {
        self.column_name = Some(column_name.to_owned());
        self
    }
}
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
