//! Conversion from driver values into record field types.
//!
//! [`FromValue`] is the per-field half of a record mapping: each setter
//! registered through [`RecordMap`](crate::record::RecordMap) converts the
//! column's [`Value`] with it before assigning. NULL never reaches a plain
//! field (the materializer skips it); `Option<T>` accepts it for callers that
//! want to tell NULL apart from a default.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::value::Value;

/// A value could not be converted into the requested field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    /// Field type that was requested
    pub expected: &'static str,
    /// What the driver produced
    pub actual: &'static str,
}

impl ConversionError {
    fn new(expected: &'static str, actual: &Value) -> Self {
        Self {
            expected,
            actual: actual.type_name(),
        }
    }

    fn out_of_range(expected: &'static str) -> Self {
        Self {
            expected,
            actual: "Int (out of range)",
        }
    }
}

/// A field type that can be assigned from a column value.
pub trait FromValue: Sized {
    /// Name used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Convert a driver value into this type.
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "Value";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Bool(b) => Ok(b as i64),
            other => Err(ConversionError::new(Self::TYPE_NAME, &other)),
        }
    }
}

macro_rules! narrow_int {
    ($ty:ty, $name:literal) => {
        impl FromValue for $ty {
            const TYPE_NAME: &'static str = $name;

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                let wide = i64::from_value(value)
                    .map_err(|e| ConversionError { expected: $name, ..e })?;
                <$ty>::try_from(wide).map_err(|_| ConversionError::out_of_range($name))
            }
        }
    };
}

narrow_int!(i32, "i32");
narrow_int!(i16, "i16");
narrow_int!(u32, "u32");
narrow_int!(u64, "u64");

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(ConversionError::new(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        f64::from_value(value)
            .map(|f| f as f32)
            .map_err(|e| ConversionError { expected: Self::TYPE_NAME, ..e })
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            // SQLite and friends store booleans as integers
            Value::Int(i) => Ok(i != 0),
            other => Err(ConversionError::new(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(ConversionError::new(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    const TYPE_NAME: &'static str = "Vec<u8>";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::String(s) => Ok(s.into_bytes()),
            other => Err(ConversionError::new(Self::TYPE_NAME, &other)),
        }
    }
}

impl FromValue for NaiveDate {
    const TYPE_NAME: &'static str = "NaiveDate";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match &value {
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| ConversionError::new(Self::TYPE_NAME, &value)),
            other => Err(ConversionError::new(Self::TYPE_NAME, other)),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

impl FromValue for NaiveDateTime {
    const TYPE_NAME: &'static str = "NaiveDateTime";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match &value {
            Value::String(s) => {
                let s = s.trim();
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                    .ok_or_else(|| ConversionError::new(Self::TYPE_NAME, &value))
            }
            Value::Int(secs) => DateTime::from_timestamp(*secs, 0)
                .map(|dt| dt.naive_utc())
                .ok_or(ConversionError::out_of_range(Self::TYPE_NAME)),
            other => Err(ConversionError::new(Self::TYPE_NAME, other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    const TYPE_NAME: &'static str = "DateTime<Utc>";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        if let Value::String(s) = &value {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
                return Ok(dt.with_timezone(&Utc));
            }
        }
        NaiveDateTime::from_value(value)
            .map(|naive| naive.and_utc())
            .map_err(|e| ConversionError { expected: Self::TYPE_NAME, ..e })
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
