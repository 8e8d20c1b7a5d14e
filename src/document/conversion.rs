// License: MIT

use crate::{IvoryError, Value};

impl TryFrom<Value> for String {
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(IvoryError::TypeError {
                message: format!("Expected string, got {}", other.type_name()),
                hint: Some("Use a quoted string value in your config".into()),
            }),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(IvoryError::TypeError {
                message: format!("Expected boolean, got {}", other.type_name()),
                hint: Some("Use true or false".into()),
            }),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Integer(n) => Ok(n),
            other => Err(IvoryError::TypeError {
                message: format!("Expected integer, got {}", other.type_name()),
                hint: Some("Use a whole number in your config".into()),
            }),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(n) => Ok(n),
            Value::Integer(n) => Ok(n as f64),
            other => Err(IvoryError::TypeError {
                message: format!("Expected number, got {}", other.type_name()),
                hint: Some("Use a number value in your config".into()),
            }),
        }
    }
}

fn unsigned_in_range(value: &Value, max: u64, target: &str) -> Result<u64, IvoryError> {
    match value {
        Value::Integer(n) if *n >= 0 && (*n as u64) <= max => Ok(*n as u64),
        Value::Integer(n) => Err(IvoryError::TypeError {
            message: format!("Number {} out of range for {}", n, target),
            hint: Some(format!("Use a number between 0 and {}", max)),
        }),
        other => Err(IvoryError::TypeError {
            message: format!("Expected integer, got {}", other.type_name()),
            hint: Some("Use a whole number in your config".into()),
        }),
    }
}

impl TryFrom<Value> for u16 {
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        unsigned_in_range(&value, u16::MAX as u64, "u16").map(|n| n as u16)
    }
}

impl TryFrom<Value> for u32 {
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        unsigned_in_range(&value, u32::MAX as u64, "u32").map(|n| n as u32)
    }
}

impl TryFrom<Value> for u64 {
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        unsigned_in_range(&value, u64::MAX, "u64")
    }
}

impl TryFrom<Value> for usize {
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        unsigned_in_range(&value, usize::MAX as u64, "usize").map(|n| n as usize)
    }
}

impl<T> TryFrom<Value> for Vec<T>
where
    T: TryFrom<Value, Error = IvoryError>,
{
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => {
                let mut result = Vec::with_capacity(items.len());
                for item in items {
                    result.push(T::try_from(item)?);
                }
                Ok(result)
            }
            other => Err(IvoryError::TypeError {
                message: format!("Expected array, got {}", other.type_name()),
                hint: Some("Use an array [...] in your config".into()),
            }),
        }
    }
}

impl<T> TryFrom<Value> for Option<T>
where
    T: TryFrom<Value, Error = IvoryError>,
{
    type Error = IvoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(None),
            other => Ok(Some(T::try_from(other)?)),
        }
    }
}
