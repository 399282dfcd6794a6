use crate::error_message_from_ptr;
use libsqlite3_sys::*;
use quarry_core::{DATE_FORMAT, Error, Result, TIME_FORMAT, TIMESTAMP_FORMAT, Value};
use rust_decimal::prelude::ToPrimitive;
use std::{
    borrow::Cow,
    ffi::{CStr, c_char, c_int, c_void},
    fmt::Display,
};

unsafe fn bind_text(statement: *mut sqlite3_stmt, index: c_int, v: &str) -> c_int {
    unsafe {
        sqlite3_bind_text(
            statement,
            index,
            v.as_ptr() as *const c_char,
            v.len() as c_int,
            SQLITE_TRANSIENT(),
        )
    }
}

fn formatted<E: Display>(value: std::result::Result<String, E>) -> Result<String> {
    value.map_err(|e| Error::msg(format!("Cannot format the parameter: {e}")))
}

/// Binds `value` to the 1-based parameter `index`.
pub(crate) fn bind_value(statement: *mut sqlite3_stmt, index: c_int, value: &Value) -> Result<()> {
    unsafe {
        let rc = match value {
            v if v.is_null() => sqlite3_bind_null(statement, index),
            Value::Boolean(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int32(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
            Value::UInt8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::UInt16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::UInt32(Some(v)) => sqlite3_bind_int64(statement, index, *v as sqlite3_int64),
            Value::UInt64(Some(v)) => {
                let Ok(v) = sqlite3_int64::try_from(*v) else {
                    let error = Error::msg(format!(
                        "Cannot bind u64 value `{v}` into a sqlite integer because it's out of bounds"
                    ));
                    log::error!("{error:#}");
                    return Err(error);
                };
                sqlite3_bind_int64(statement, index, v)
            }
            Value::Float32(Some(v)) => sqlite3_bind_double(statement, index, *v as f64),
            Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
            Value::Decimal(Some(v)) => sqlite3_bind_double(
                statement,
                index,
                v.to_f64().ok_or_else(|| {
                    Error::msg(format!("Cannot convert the Decimal value `{v}` to f64"))
                })?,
            ),
            Value::Varchar(Some(v)) => bind_text(statement, index, v),
            Value::Blob(Some(v)) => sqlite3_bind_blob(
                statement,
                index,
                v.as_ptr() as *const c_void,
                v.len() as c_int,
                SQLITE_TRANSIENT(),
            ),
            Value::Date(Some(v)) => bind_text(statement, index, &formatted(v.format(DATE_FORMAT))?),
            Value::Time(Some(v)) => bind_text(statement, index, &formatted(v.format(TIME_FORMAT))?),
            Value::Timestamp(Some(v)) => {
                bind_text(statement, index, &formatted(v.format(TIMESTAMP_FORMAT))?)
            }
            Value::Uuid(Some(v)) => bind_text(statement, index, &v.to_string()),
            _ => {
                let error = Error::msg(format!("Cannot use a {value:?} as a query parameter"));
                log::error!("{error:#}");
                return Err(error);
            }
        };
        if rc != SQLITE_OK {
            let db = sqlite3_db_handle(statement);
            let query = sqlite3_sql(statement);
            let error = Error::msg(format!(
                "Cannot bind parameter {index} to query `{}`: {}",
                if query.is_null() {
                    Cow::Borrowed("")
                } else {
                    CStr::from_ptr(query).to_string_lossy()
                },
                error_message_from_ptr(sqlite3_errmsg(db)),
            ));
            log::error!("{error:#}");
            return Err(error);
        }
        Ok(())
    }
}
