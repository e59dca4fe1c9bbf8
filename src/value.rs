use std::error::Error;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;
use uuid::Uuid;

/// A typed statement parameter.
///
/// One enum covers every column type the schema uses, so statement builders
/// and repositories never touch driver-specific parameter types directly:
/// ```rust
/// use agora_db::value::SqlValue;
///
/// let params = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("water supply".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Identifier column (uuid)
    Uuid(Uuid),
    /// Text/string value
    Text(String),
    /// Integer value (64-bit; narrowed to the column's wire type on encode)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Timestamp with time zone
    Timestamp(DateTime<Utc>),
    /// JSON value
    Json(JsonValue),
    /// NULL value
    Null,
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_uuid(&self) -> Option<&Uuid> {
        if let SqlValue::Uuid(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let SqlValue::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let SqlValue::Bool(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        if let SqlValue::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }
}

impl From<Uuid> for SqlValue {
    fn from(value: Uuid) -> Self {
        SqlValue::Uuid(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<JsonValue> for SqlValue {
    fn from(value: JsonValue) -> Self {
        SqlValue::Json(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Uuid(u) => u.to_sql(ty, out),
            SqlValue::Text(s) => s.to_sql(ty, out),
            // Narrow to the wire type the server expects; the schema's
            // counter columns are INT, not BIGINT.
            SqlValue::Int(i) => match ty.name() {
                "int2" => i16::try_from(*i)?.to_sql(ty, out),
                "int4" => i32::try_from(*i)?.to_sql(ty, out),
                _ => i.to_sql(ty, out),
            },
            SqlValue::Float(f) => match ty.name() {
                "float4" => {
                    #[allow(clippy::cast_possible_truncation)]
                    let narrowed = *f as f32;
                    narrowed.to_sql(ty, out)
                }
                _ => f.to_sql(ty, out),
            },
            SqlValue::Bool(b) => (*b).to_sql(ty, out),
            SqlValue::Timestamp(ts) => ts.to_sql(ty, out),
            SqlValue::Json(j) => j.to_sql(ty, out),
            SqlValue::Null => Ok(IsNull::Yes),
        }
    }

    fn accepts(ty: &Type) -> bool {
        match *ty {
            Type::UUID => true,
            // Integer types
            Type::INT2 | Type::INT4 | Type::INT8 => true,
            // Floating point types
            Type::FLOAT4 | Type::FLOAT8 => true,
            // Text types
            Type::TEXT | Type::VARCHAR | Type::CHAR | Type::NAME => true,
            // Boolean type
            Type::BOOL => true,
            // Date/time types
            Type::TIMESTAMP | Type::TIMESTAMPTZ | Type::DATE => true,
            // JSON types
            Type::JSON | Type::JSONB => true,
            // Extension-defined types (OIDs past the builtin range), such as
            // the PostGIS geometry column, stay bindable so an absent
            // location can encode as NULL.
            ref other => other.oid() >= 16384,
        }
    }

    to_sql_checked!();
}

/// Tri-state assignment for nullable columns in partial updates.
///
/// Distinguishes "leave unchanged" from "explicitly set NULL" without the
/// ambiguity of a nested `Option<Option<T>>`:
/// ```rust
/// use agora_db::value::Setter;
/// use uuid::Uuid;
///
/// let keep: Setter<Uuid> = Setter::default();
/// assert!(keep.is_keep());
/// let clear = Setter::<Uuid>::Null;
/// let assign = Setter::Set(Uuid::new_v4());
/// # let _ = (clear, assign);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Setter<T> {
    /// Leave the column unchanged.
    #[default]
    Keep,
    /// Set the column to NULL.
    Null,
    /// Set the column to the given value.
    Set(T),
}

impl<T> Setter<T> {
    /// Check whether this assignment leaves the column unchanged.
    #[must_use]
    pub fn is_keep(&self) -> bool {
        matches!(self, Setter::Keep)
    }
}
