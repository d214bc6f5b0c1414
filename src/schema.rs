//! The contract for the one and only table: column names, types and
//! constraints, the closed set of category tags, and the value containers
//! that move rows in and out of the store.
//!
//! Everything else in the crate derives its knowledge of the table from
//! here, so a schema change is a change to this module and nothing else.

use std::fmt;

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};

use crate::error::{Result, StoreError};

/// Name of the single table this store manages.
pub const TABLE: &str = "products";

// Names of the columns.
pub const COL_ID: &str = "id";
pub const COL_NAME: &str = "name";
pub const COL_DESCRIPTION: &str = "description";
pub const COL_CATEGORY: &str = "category";
pub const COL_PRICE: &str = "price";
pub const COL_QUANTITY: &str = "quantity";
pub const COL_SUPPLIER_NAME: &str = "supplier_name";
pub const COL_SUPPLIER_EMAIL: &str = "supplier_email";
pub const COL_REORDER_QUANTITY: &str = "reorder_quantity";

/// Sentinel stored when a row was created without a category. It is the
/// schema default but never a valid tag in a write request.
pub const CATEGORY_NONE: &str = "none";

/// One column of the table: name, SQLite type and constraint clause.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub constraints: &'static str,
}

// Declaration order matters: it is the order used for CREATE TABLE and for
// unprojected query results.
const COLUMNS: [Column; 9] = [
    Column { name: COL_ID, sql_type: "integer", constraints: "primary key autoincrement" },
    Column { name: COL_NAME, sql_type: "text", constraints: "not null" },
    Column { name: COL_DESCRIPTION, sql_type: "text", constraints: "" },
    Column { name: COL_CATEGORY, sql_type: "text", constraints: "not null default 'none'" },
    Column { name: COL_PRICE, sql_type: "integer", constraints: "not null default 0" },
    Column { name: COL_QUANTITY, sql_type: "integer", constraints: "not null default 0" },
    Column { name: COL_SUPPLIER_NAME, sql_type: "text", constraints: "not null" },
    Column { name: COL_SUPPLIER_EMAIL, sql_type: "text", constraints: "not null" },
    Column { name: COL_REORDER_QUANTITY, sql_type: "integer", constraints: "default 1" },
];

/// The ordered column declarations of the table.
pub fn columns() -> &'static [Column] {
    &COLUMNS
}

/// Whether `name` is a declared column of the table.
pub fn is_column(name: &str) -> bool {
    COLUMNS.iter().any(|c| c.name == name)
}

/// The idempotent table creation statement, assembled from the column
/// declarations so the two can never drift apart.
pub fn create_table_sql() -> String {
    let definitions: Vec<String> = COLUMNS
        .iter()
        .map(|c| {
            let mut definition = format!("{} {}", c.name, c.sql_type);
            if !c.constraints.is_empty() {
                definition.push(' ');
                definition.push_str(c.constraints);
            }
            definition
        })
        .collect();
    format!(
        "create table if not exists {} (\n    {}\n);",
        TABLE,
        definitions.join(",\n    ")
    )
}

// ------------- Category -------------

/// The closed set of product classification tags. Changing a tag's
/// validity is a schema change, not a runtime one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Hotels,
    Nightlife,
    Shopping,
    Visits,
    Shows,
    Restaurants,
    Leisure,
    Transport,
    Culture,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Hotels,
        Category::Nightlife,
        Category::Shopping,
        Category::Visits,
        Category::Shows,
        Category::Restaurants,
        Category::Leisure,
        Category::Transport,
        Category::Culture,
    ];

    /// The textual tag stored in the category column.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Hotels => "hotels",
            Category::Nightlife => "nightlife",
            Category::Shopping => "shopping",
            Category::Visits => "visits",
            Category::Shows => "shows",
            Category::Restaurants => "restaurants",
            Category::Leisure => "leisure",
            Category::Transport => "transport",
            Category::Culture => "culture",
        }
    }

    pub fn parse(tag: &str) -> Option<Category> {
        Category::ALL.iter().find(|c| c.tag() == tag).copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Whether `tag` belongs to the enumerated category set. The `none`
/// sentinel does not.
pub fn is_valid_category(tag: &str) -> bool {
    Category::parse(tag).is_some()
}

// ------------- Value -------------

/// A single cell value as it travels between caller and storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Null,
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s.to_owned()) }
}
impl From<String> for Value {
    fn from(s: String) -> Self { Value::Text(s) }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self { Value::Integer(i) }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Value::Null),
            ValueRef::Integer(i) => Ok(Value::Integer(i)),
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(s) => Ok(Value::Text(s.to_owned())),
                Err(e) => Err(FromSqlError::Other(Box::new(e))),
            },
            // The declared schema holds only integers and text.
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

// ------------- Values -------------

/// An ordered mapping from column name to value, carrying the columns of
/// one write request or one projected result row. Partial by design: a
/// column absent from the map is a column the caller did not touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    entries: Vec<(String, Value)>,
}

impl Values {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Set a column, replacing any earlier value for the same column.
    pub fn put(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column.to_owned(), value)),
        }
    }

    /// Builder-style [`put`](Self::put).
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.put(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }
}

// ------------- Record -------------

/// One fully materialized inventory row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: i64,
    pub quantity: i64,
    pub supplier_name: String,
    pub supplier_email: String,
    pub reorder_quantity: i64,
}

impl Record {
    /// Materialize a record from an unprojected result row.
    pub fn from_values(values: &Values) -> Result<Record> {
        let text = |column: &str| -> Result<String> {
            values
                .get(column)
                .and_then(|v| v.as_text())
                .map(str::to_owned)
                .ok_or_else(|| StoreError::Persistence(format!("row is missing text column {column}")))
        };
        let integer = |column: &str| -> Result<i64> {
            values
                .get(column)
                .and_then(Value::as_integer)
                .ok_or_else(|| StoreError::Persistence(format!("row is missing integer column {column}")))
        };
        Ok(Record {
            id: integer(COL_ID)?,
            name: text(COL_NAME)?,
            description: values
                .get(COL_DESCRIPTION)
                .and_then(|v| v.as_text())
                .map(str::to_owned),
            category: text(COL_CATEGORY)?,
            price: integer(COL_PRICE)?,
            quantity: integer(COL_QUANTITY)?,
            supplier_name: text(COL_SUPPLIER_NAME)?,
            supplier_email: text(COL_SUPPLIER_EMAIL)?,
            reorder_quantity: integer(COL_REORDER_QUANTITY)?,
        })
    }
}
