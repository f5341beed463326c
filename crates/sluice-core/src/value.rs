//! Cell-level value kinds and the tagged `Value` type.
//!
//! Dates are `i32` days since 1970-01-01 and timestamps are `i64`
//! microseconds since the epoch (UTC), so comparisons are integer operations.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::temporal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Int64,
    Float64,
    String,
    Date,
    Timestamp,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int64 => "int64",
            ValueKind::Float64 => "float64",
            ValueKind::String => "string",
            ValueKind::Date => "date",
            ValueKind::Timestamp => "timestamp",
        }
    }

    /// Kinds the statistics engine folds as numbers.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueKind::Int64 | ValueKind::Float64 | ValueKind::Date | ValueKind::Timestamp
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Least general kind able to hold values of both `a` and `b`.
///
/// `Null` is the identity; Int64/Float64 join to Float64; Date/Timestamp join
/// to Timestamp; every other mixed pair joins to String. The join is
/// commutative and never narrows.
pub fn widen(a: ValueKind, b: ValueKind) -> ValueKind {
    use ValueKind::*;
    match (a, b) {
        (x, y) if x == y => x,
        (Null, y) => y,
        (x, Null) => x,
        (Int64, Float64) | (Float64, Int64) => Float64,
        (Date, Timestamp) | (Timestamp, Date) => Timestamp,
        _ => String,
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(i32),
    Timestamp(i64),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int64,
            Value::Float(_) => ValueKind::Float64,
            Value::Str(_) => ValueKind::String,
            Value::Date(_) => ValueKind::Date,
            Value::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used by aggregates; `None` for non-numeric kinds.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Date(v) => Some(*v as f64),
            Value::Timestamp(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Total order over non-null values of comparable kinds.
    ///
    /// Int64 and Float64 compare numerically; Date compares with Timestamp at
    /// midnight. Mismatched kinds fall back to comparing their kind order.
    pub fn cmp_non_null(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Str(a), Str(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (Date(a), Timestamp(b)) => temporal::date_to_timestamp(*a).cmp(b),
            (Timestamp(a), Date(b)) => a.cmp(&temporal::date_to_timestamp(*b)),
            (a, b) => kind_rank(a.kind()).cmp(&kind_rank(b.kind())),
        }
    }
}

fn kind_rank(kind: ValueKind) -> u8 {
    match kind {
        ValueKind::Null => 0,
        ValueKind::Bool => 1,
        ValueKind::Int64 => 2,
        ValueKind::Float64 => 3,
        ValueKind::Date => 4,
        ValueKind::Timestamp => 5,
        ValueKind::String => 6,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&temporal::format_date(*d)),
            Value::Timestamp(ts) => f.write_str(&temporal::format_timestamp(*ts)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ValueKind; 7] = [
        ValueKind::Null,
        ValueKind::Bool,
        ValueKind::Int64,
        ValueKind::Float64,
        ValueKind::String,
        ValueKind::Date,
        ValueKind::Timestamp,
    ];

    #[test]
    fn widen_null_is_identity() {
        for k in ALL {
            assert_eq!(widen(ValueKind::Null, k), k);
            assert_eq!(widen(k, ValueKind::Null), k);
        }
    }

    #[test]
    fn widen_is_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(widen(a, b), widen(b, a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn widen_never_narrows() {
        // Joining the result with either input again changes nothing.
        for a in ALL {
            for b in ALL {
                let w = widen(a, b);
                assert_eq!(widen(w, a), w);
                assert_eq!(widen(w, b), w);
            }
        }
    }

    #[test]
    fn widen_numeric_and_temporal_families() {
        assert_eq!(widen(ValueKind::Int64, ValueKind::Float64), ValueKind::Float64);
        assert_eq!(widen(ValueKind::Date, ValueKind::Timestamp), ValueKind::Timestamp);
        assert_eq!(widen(ValueKind::Int64, ValueKind::Date), ValueKind::String);
        assert_eq!(widen(ValueKind::Bool, ValueKind::Int64), ValueKind::String);
    }

    #[test]
    fn mixed_numeric_compare() {
        assert_eq!(Value::Int(2).cmp_non_null(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(
            Value::Date(1).cmp_non_null(&Value::Timestamp(86_400_000_000)),
            Ordering::Equal
        );
    }
}
