//! Declared fields and their kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CatalogueError;
use crate::value::Value;

/// The kind of a declared field.
///
/// Kinds are deliberately close to the SQL type system rather than to any
/// host-language type system; the driver maps them to vendor types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// 16-bit integer.
    SmallInt,
    /// Double-precision float.
    Float,
    /// Fixed-precision decimal.
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// Unbounded text.
    Text,
    /// Bounded text.
    Varchar {
        /// Maximum length in characters.
        max_length: u32,
    },
    /// Boolean.
    Bool,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Timestamp with time zone.
    TimestampTz,
    /// Integer foreign key referencing `<table>.id`.
    ForeignKey {
        /// The referenced table name.
        table: String,
    },
    /// Generated tsvector column. Only used internally by the FTS
    /// installer; hosts do not declare fields of this kind.
    TsVector,
}

impl FieldKind {
    /// Whether values of this kind are textual (candidates for `_like`
    /// prefix-match indices).
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Varchar { .. })
    }

    /// The referenced table, if this is a foreign key.
    pub fn fk_target(&self) -> Option<&str> {
        match self {
            FieldKind::ForeignKey { table } => Some(table),
            _ => None,
        }
    }

    /// The declared maximum length, if this kind carries one.
    pub fn max_length(&self) -> Option<u32> {
        match self {
            FieldKind::Varchar { max_length } => Some(*max_length),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Int => write!(f, "int"),
            FieldKind::BigInt => write!(f, "bigint"),
            FieldKind::SmallInt => write!(f, "smallint"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::Decimal { precision, scale } => {
                write!(f, "decimal({},{})", precision, scale)
            }
            FieldKind::Text => write!(f, "text"),
            FieldKind::Varchar { max_length } => write!(f, "varchar({})", max_length),
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Time => write!(f, "time"),
            FieldKind::TimestampTz => write!(f, "timestamptz"),
            FieldKind::ForeignKey { table } => write!(f, "fk({})", table),
            FieldKind::TsVector => write!(f, "tsvector"),
        }
    }
}

impl FromStr for FieldKind {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "int" => return Ok(FieldKind::Int),
            "bigint" => return Ok(FieldKind::BigInt),
            "smallint" => return Ok(FieldKind::SmallInt),
            "float" => return Ok(FieldKind::Float),
            "text" => return Ok(FieldKind::Text),
            "bool" => return Ok(FieldKind::Bool),
            "date" => return Ok(FieldKind::Date),
            "time" => return Ok(FieldKind::Time),
            "timestamptz" => return Ok(FieldKind::TimestampTz),
            "tsvector" => return Ok(FieldKind::TsVector),
            _ => {}
        }

        // Parameterised kinds: kind(args)
        let (head, args) = s
            .split_once('(')
            .and_then(|(head, rest)| rest.strip_suffix(')').map(|args| (head, args)))
            .ok_or_else(|| CatalogueError::InvalidKind(s.to_string()))?;

        match head {
            "varchar" => {
                let max_length: u32 = args
                    .trim()
                    .parse()
                    .map_err(|_| CatalogueError::InvalidKind(s.to_string()))?;
                Ok(FieldKind::Varchar { max_length })
            }
            "decimal" => {
                let (p, sc) = args
                    .split_once(',')
                    .ok_or_else(|| CatalogueError::InvalidKind(s.to_string()))?;
                let precision: u8 = p
                    .trim()
                    .parse()
                    .map_err(|_| CatalogueError::InvalidKind(s.to_string()))?;
                let scale: u8 = sc
                    .trim()
                    .parse()
                    .map_err(|_| CatalogueError::InvalidKind(s.to_string()))?;
                Ok(FieldKind::Decimal { precision, scale })
            }
            "fk" => {
                let table = args.trim();
                if table.is_empty() {
                    return Err(CatalogueError::InvalidKind(s.to_string()));
                }
                Ok(FieldKind::ForeignKey {
                    table: table.to_string(),
                })
            }
            _ => Err(CatalogueError::InvalidKind(s.to_string())),
        }
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A declared field of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as the host refers to it.
    pub name: String,
    /// Column name in the database. Defaults to the field name.
    #[serde(default)]
    pub column: Option<String>,
    /// Field kind.
    pub kind: FieldKind,
    /// Whether NULL values are allowed.
    #[serde(default)]
    pub nullable: bool,
    /// Declared default value. Ignored when `auto_now` is set.
    #[serde(default)]
    pub default: Option<Value>,
    /// Whether the column defaults to the current timestamp at row-write
    /// time. Only meaningful for timestamp fields.
    #[serde(default)]
    pub auto_now: bool,
    /// Whether values must be unique.
    #[serde(default)]
    pub unique: bool,
    /// Whether a btree index is maintained for this field.
    #[serde(default)]
    pub indexed: bool,
    /// Whether this field is the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether the primary key auto-increments (serial).
    #[serde(default)]
    pub auto_increment: bool,
}

impl FieldDef {
    /// Create a field with the given name and kind. Not nullable, not
    /// indexed, no default.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            column: None,
            kind,
            nullable: false,
            default: None,
            auto_now: false,
            unique: false,
            indexed: false,
            primary_key: false,
            auto_increment: false,
        }
    }

    /// Create an auto-incrementing integer primary key.
    pub fn serial_pk(name: impl Into<String>) -> Self {
        let mut field = Self::new(name, FieldKind::Int);
        field.primary_key = true;
        field.auto_increment = true;
        field
    }

    /// Create an integer foreign key referencing `<table>.id`.
    pub fn foreign_key(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::ForeignKey {
                table: table.into(),
            },
        )
    }

    /// Set an explicit column name.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Allow NULL values.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Default the column to the write-time timestamp.
    pub fn auto_now(mut self) -> Self {
        self.auto_now = true;
        self
    }

    /// Require values to be unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Maintain a btree index for this field.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// The effective column name.
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    /// The referenced table, if this field is a foreign key.
    pub fn fk_target(&self) -> Option<&str> {
        self.kind.fk_target()
    }
}
