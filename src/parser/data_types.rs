//! MySQL column type vocabulary
//!
//! Declared types are mapped onto a closed set of type names. An exact match is
//! used as-is, a handful of common synonyms are folded onto their canonical
//! name, and anything else falls back to `VARCHAR`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Family a data type belongs to, used for grouping in type pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeFamily {
    Numeric,
    String,
    DateTime,
    Binary,
    Other,
}

/// A column data type from the closed MySQL vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Tinyint,
    Smallint,
    Mediumint,
    Int,
    Bigint,
    Decimal,
    Float,
    Double,
    Char,
    Varchar,
    Tinytext,
    Text,
    Mediumtext,
    Longtext,
    Date,
    Time,
    Datetime,
    Timestamp,
    Year,
    Binary,
    Varbinary,
    Tinyblob,
    Blob,
    Mediumblob,
    Longblob,
    Boolean,
    Enum,
    Set,
    Json,
    Uuid,
}

/// The type unknown declarations fall back to.
pub const FALLBACK_TYPE: DataType = DataType::Varchar;

impl DataType {
    /// Every type in vocabulary order (numeric, string, date-time, binary, other).
    pub const ALL: [DataType; 30] = [
        DataType::Tinyint,
        DataType::Smallint,
        DataType::Mediumint,
        DataType::Int,
        DataType::Bigint,
        DataType::Decimal,
        DataType::Float,
        DataType::Double,
        DataType::Char,
        DataType::Varchar,
        DataType::Tinytext,
        DataType::Text,
        DataType::Mediumtext,
        DataType::Longtext,
        DataType::Date,
        DataType::Time,
        DataType::Datetime,
        DataType::Timestamp,
        DataType::Year,
        DataType::Binary,
        DataType::Varbinary,
        DataType::Tinyblob,
        DataType::Blob,
        DataType::Mediumblob,
        DataType::Longblob,
        DataType::Boolean,
        DataType::Enum,
        DataType::Set,
        DataType::Json,
        DataType::Uuid,
    ];

    /// Canonical upper-case spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Tinyint => "TINYINT",
            DataType::Smallint => "SMALLINT",
            DataType::Mediumint => "MEDIUMINT",
            DataType::Int => "INT",
            DataType::Bigint => "BIGINT",
            DataType::Decimal => "DECIMAL",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Char => "CHAR",
            DataType::Varchar => "VARCHAR",
            DataType::Tinytext => "TINYTEXT",
            DataType::Text => "TEXT",
            DataType::Mediumtext => "MEDIUMTEXT",
            DataType::Longtext => "LONGTEXT",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Datetime => "DATETIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Year => "YEAR",
            DataType::Binary => "BINARY",
            DataType::Varbinary => "VARBINARY",
            DataType::Tinyblob => "TINYBLOB",
            DataType::Blob => "BLOB",
            DataType::Mediumblob => "MEDIUMBLOB",
            DataType::Longblob => "LONGBLOB",
            DataType::Boolean => "BOOLEAN",
            DataType::Enum => "ENUM",
            DataType::Set => "SET",
            DataType::Json => "JSON",
            DataType::Uuid => "UUID",
        }
    }

    pub fn family(&self) -> TypeFamily {
        match self {
            DataType::Tinyint
            | DataType::Smallint
            | DataType::Mediumint
            | DataType::Int
            | DataType::Bigint
            | DataType::Decimal
            | DataType::Float
            | DataType::Double => TypeFamily::Numeric,
            DataType::Char
            | DataType::Varchar
            | DataType::Tinytext
            | DataType::Text
            | DataType::Mediumtext
            | DataType::Longtext => TypeFamily::String,
            DataType::Date
            | DataType::Time
            | DataType::Datetime
            | DataType::Timestamp
            | DataType::Year => TypeFamily::DateTime,
            DataType::Binary
            | DataType::Varbinary
            | DataType::Tinyblob
            | DataType::Blob
            | DataType::Mediumblob
            | DataType::Longblob => TypeFamily::Binary,
            DataType::Boolean | DataType::Enum | DataType::Set | DataType::Json | DataType::Uuid => {
                TypeFamily::Other
            }
        }
    }

    /// Exact lookup of an upper-case type name.
    pub fn from_name(name: &str) -> Option<DataType> {
        DataType::ALL.iter().copied().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of mapping a declared type name onto the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMapping {
    Exact(DataType),
    Alias(DataType),
    /// Not recognised; carries the fallback type.
    Unknown(DataType),
}

impl TypeMapping {
    pub fn data_type(&self) -> DataType {
        match self {
            TypeMapping::Exact(t) | TypeMapping::Alias(t) | TypeMapping::Unknown(t) => *t,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TypeMapping::Unknown(_))
    }
}

/// Map a raw declared type name (any case) onto the vocabulary.
pub fn map_data_type(raw_type: &str) -> TypeMapping {
    let upper = raw_type.to_uppercase();
    if let Some(exact) = DataType::from_name(&upper) {
        return TypeMapping::Exact(exact);
    }

    match upper.as_str() {
        "INTEGER" => TypeMapping::Alias(DataType::Int),
        "BOOL" => TypeMapping::Alias(DataType::Boolean),
        "LONG" => TypeMapping::Alias(DataType::Longtext),
        _ => TypeMapping::Unknown(FALLBACK_TYPE),
    }
}
