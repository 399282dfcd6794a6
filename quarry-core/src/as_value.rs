use crate::{Error, Result, Value};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{any, fmt::Display};
use time::{Date, PrimitiveDateTime, Time, format_description::BorrowedFormatItem, macros::format_description};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Every field of an entity must implement it: `as_empty_value` gives the type descriptor of
/// the field, `as_value` reads it into statement arguments and `try_from_value` writes scanned
/// cells back.
///
/// `try_from_value` accepts the canonical variant and, where it makes sense, other widths
/// (range checked) or a textual representation. Sessions are free to return loosely typed
/// cells, SQLite for instance hands every integer back as `Int64` and dates as `Varchar`.
///
/// ```rust
/// use quarry_core::{AsValue, Value};
/// let v = 18i8.as_value();
/// assert!(matches!(v, Value::Int8(Some(18))));
/// let n: i8 = AsValue::try_from_value(Value::Int64(Some(18))).unwrap();
/// assert_eq!(n, 18);
/// ```
pub trait AsValue {
    /// The NULL prototype of this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn narrow<S, D>(value: S) -> Result<D>
where
    S: Copy + Display,
    D: TryFrom<S>,
{
    D::try_from(value).map_err(|_| {
        Error::msg(format!(
            "Value {value} is out of range for {}",
            any::type_name::<D>()
        ))
    })
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {value:?} to {}",
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $(
                        #[allow(unreachable_patterns)]
                        $pat_rest => $expr_rest,
                    )*
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}

macro_rules! impl_as_integer {
    ($source:ty, $destination:path) => {
        impl_as_value!(
            $source,
            $destination,
            Value::Int8(Some(v)) => narrow(v),
            Value::Int16(Some(v)) => narrow(v),
            Value::Int32(Some(v)) => narrow(v),
            Value::Int64(Some(v)) => narrow(v),
            Value::UInt8(Some(v)) => narrow(v),
            Value::UInt16(Some(v)) => narrow(v),
            Value::UInt32(Some(v)) => narrow(v),
            Value::UInt64(Some(v)) => narrow(v),
            Value::Boolean(Some(v)) => Ok(v as _),
            Value::Decimal(Some(v)) => {
                if !v.is_integer() {
                    return Err(Error::msg(format!(
                        "Value {v}: Decimal is not an integer, cannot convert to {}",
                        any::type_name::<Self>(),
                    )));
                }
                v.to_i128()
                    .ok_or_else(|| Error::msg(format!("Value {v}: Decimal does not fit into i128")))
                    .and_then(narrow)
            },
            Value::Varchar(Some(ref v)) => v.trim().parse::<$source>().map_err(|e| {
                Error::msg(format!(
                    "Cannot parse `{v}` as {}: {e}",
                    any::type_name::<Self>(),
                ))
            }),
        );
    };
}
impl_as_integer!(i8, Value::Int8);
impl_as_integer!(i16, Value::Int16);
impl_as_integer!(i32, Value::Int32);
impl_as_integer!(i64, Value::Int64);
impl_as_integer!(u8, Value::UInt8);
impl_as_integer!(u16, Value::UInt16);
impl_as_integer!(u32, Value::UInt32);
impl_as_integer!(u64, Value::UInt64);

impl_as_value!(
    bool,
    Value::Boolean,
    Value::Int8(Some(v)) => Ok(v != 0),
    Value::Int16(Some(v)) => Ok(v != 0),
    Value::Int32(Some(v)) => Ok(v != 0),
    Value::Int64(Some(v)) => Ok(v != 0),
    Value::UInt8(Some(v)) => Ok(v != 0),
    Value::UInt16(Some(v)) => Ok(v != 0),
    Value::UInt32(Some(v)) => Ok(v != 0),
    Value::UInt64(Some(v)) => Ok(v != 0),
    Value::Varchar(Some(ref v)) => match v.as_str() {
        x if x.eq_ignore_ascii_case("true") || x.eq_ignore_ascii_case("t") || x == "1" => Ok(true),
        x if x.eq_ignore_ascii_case("false") || x.eq_ignore_ascii_case("f") || x == "0" => Ok(false),
        _ => Err(Error::msg(format!("Cannot parse boolean from `{v}`"))),
    },
);

macro_rules! impl_as_float {
    ($source:ty, $destination:path, $to:ident) => {
        impl_as_value!(
            $source,
            $destination,
            Value::Float32(Some(v)) => Ok(v as _),
            Value::Float64(Some(v)) => Ok(v as _),
            Value::Int8(Some(v)) => Ok(v as _),
            Value::Int16(Some(v)) => Ok(v as _),
            Value::Int32(Some(v)) => Ok(v as _),
            Value::Int64(Some(v)) => Ok(v as _),
            Value::UInt8(Some(v)) => Ok(v as _),
            Value::UInt16(Some(v)) => Ok(v as _),
            Value::UInt32(Some(v)) => Ok(v as _),
            Value::UInt64(Some(v)) => Ok(v as _),
            Value::Decimal(Some(v)) => v
                .$to()
                .ok_or_else(|| Error::msg(format!("Value {v}: Decimal does not fit into {}", any::type_name::<Self>()))),
            Value::Varchar(Some(ref v)) => v.trim().parse::<$source>().map_err(|e| {
                Error::msg(format!("Cannot parse `{v}` as {}: {e}", any::type_name::<Self>()))
            }),
        );
    };
}
impl_as_float!(f32, Value::Float32, to_f32);
impl_as_float!(f64, Value::Float64, to_f64);

impl_as_value!(String, Value::Varchar);

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v.into_vec()),
            Value::Varchar(Some(v)) => Ok(v.into_bytes()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(Decimal::from(v)),
            Value::Int16(Some(v)) => Ok(Decimal::from(v)),
            Value::Int32(Some(v)) => Ok(Decimal::from(v)),
            Value::Int64(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt8(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt16(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt32(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt64(Some(v)) => Ok(Decimal::from(v)),
            Value::Float32(Some(v)) => Decimal::from_f32(v).ok_or_else(|| mismatch::<Self>(&value)),
            Value::Float64(Some(v)) => Decimal::from_f64(v).ok_or_else(|| mismatch::<Self>(&value)),
            Value::Varchar(Some(ref v)) => v
                .trim()
                .parse::<Decimal>()
                .map_err(|e| Error::msg(format!("Cannot parse `{v}` as Decimal: {e}"))),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl_as_value!(
    Uuid,
    Value::Uuid,
    Value::Varchar(Some(ref v)) => Uuid::parse_str(v)
        .map_err(|e| Error::msg(format!("Cannot parse `{v}` as Uuid: {e}"))),
    Value::Blob(Some(ref v)) => Uuid::from_slice(v)
        .map_err(|e| Error::msg(format!("Cannot build a Uuid from {} bytes: {e}", v.len()))),
);

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
pub const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond]");
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");

macro_rules! parse_time {
    ($value:expr, $($format:tt),+ $(,)?) => {
        'value: {
            $(
                if let Ok(result) = <Self>::parse($value, format_description!($format)) {
                    break 'value Ok(result);
                }
            )+
            Err(Error::msg(format!(
                "Cannot parse `{}` as {}",
                $value,
                any::type_name::<Self>()
            )))
        }
    };
}

impl_as_value!(
    Date,
    Value::Date,
    Value::Varchar(Some(ref v)) => parse_time!(v.trim(), "[year]-[month]-[day]"),
);

impl_as_value!(
    Time,
    Value::Time,
    Value::Varchar(Some(ref v)) => parse_time!(
        v.trim(),
        "[hour]:[minute]:[second].[subsecond]",
        "[hour]:[minute]:[second]",
        "[hour]:[minute]",
    ),
);

impl_as_value!(
    PrimitiveDateTime,
    Value::Timestamp,
    Value::Varchar(Some(ref v)) => parse_time!(
        v.trim(),
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]",
        "[year]-[month]-[day]T[hour]:[minute]:[second]",
        "[year]-[month]-[day]T[hour]:[minute]",
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
        "[year]-[month]-[day] [hour]:[minute]:[second]",
        "[year]-[month]-[day] [hour]:[minute]",
    ),
);

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Self::new(<T as AsValue>::try_from_value(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    #[test]
    fn integers() {
        assert_eq!(i8::try_from_value(Value::Int64(Some(18))).unwrap(), 18);
        assert!(i8::try_from_value(Value::Int64(Some(300))).is_err());
        assert!(u32::try_from_value(Value::Int64(Some(-1))).is_err());
        assert_eq!(u64::try_from_value(Value::Int64(Some(42))).unwrap(), 42);
        assert_eq!(i64::try_from_value(Value::Varchar(Some(" 12 ".into()))).unwrap(), 12);
        assert!(i32::try_from_value(Value::Varchar(Some("12abc".into()))).is_err());
        assert_eq!(
            i16::try_from_value(Value::Decimal(Some(Decimal::new(1200, 2)))).unwrap(),
            12
        );
        assert!(i16::try_from_value(Value::Decimal(Some(Decimal::new(1234, 2)))).is_err());
    }

    #[test]
    fn floats_and_bools() {
        assert_eq!(f32::try_from_value(Value::Float64(Some(1.5))).unwrap(), 1.5);
        assert_eq!(f64::try_from_value(Value::Int64(Some(3))).unwrap(), 3.0);
        assert!(bool::try_from_value(Value::Int64(Some(1))).unwrap());
        assert!(!bool::try_from_value(Value::Varchar(Some("false".into()))).unwrap());
        assert!(bool::try_from_value(Value::Varchar(Some("maybe".into()))).is_err());
    }

    #[test]
    fn temporal_from_text() {
        assert_eq!(
            Date::try_from_value(Value::Varchar(Some("2024-02-29".into()))).unwrap(),
            date!(2024 - 02 - 29)
        );
        assert_eq!(
            Time::try_from_value(Value::Varchar(Some("12:00:10".into()))).unwrap(),
            time!(12:00:10)
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value(Value::Varchar(Some(
                "2024-02-29 12:00:10.25".into()
            )))
            .unwrap(),
            datetime!(2024-02-29 12:00:10.25)
        );
        let timestamp = datetime!(2001-09-11 08:46:00.5);
        let text = timestamp.format(TIMESTAMP_FORMAT).unwrap();
        assert_eq!(
            PrimitiveDateTime::try_from_value(Value::Varchar(Some(text))).unwrap(),
            timestamp
        );
    }

    #[test]
    fn options_and_mismatches() {
        assert_eq!(Option::<String>::try_from_value(Value::Varchar(None)).unwrap(), None);
        assert_eq!(Option::<i64>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::as_empty_value(), Value::Int32(None));
        assert_eq!(Some(5i32).as_value(), Value::Int32(Some(5)));
        assert!(String::try_from_value(Value::Int64(Some(1))).is_err());
        let id = Uuid::from_u128(0x1234);
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(id.to_string()))).unwrap(),
            id
        );
    }
}
