//! SQLite persistence for the product table.
//!
//! The [`Store`] owns the connection and is the sole owner of row state:
//! callers get copies out and merge changes back in through it. Writes are
//! serialized by the connection itself. The schema is created lazily on
//! first access and never migrated; `ensure_schema` is idempotent.
//!
//! Filters are deliberately small: equality and range comparisons over
//! declared columns, combined with AND. No joins, no expressions.

use std::cell::Cell;

use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::schema::{self, COL_ID, Record, TABLE, Value, Values};

/// System-assigned row identifier. Unique, never reused, never supplied
/// by the caller.
pub type RowId = i64;

// ------------- Filter -------------

/// Comparison operators allowed in a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    fn sql(self) -> &'static str {
        match self {
            Cmp::Eq => "=",
            Cmp::Ne => "<>",
            Cmp::Lt => "<",
            Cmp::Le => "<=",
            Cmp::Gt => ">",
            Cmp::Ge => ">=",
        }
    }
}

/// A conjunction of column/value predicates. The empty filter matches
/// every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Cmp, Value)>,
}

impl Filter {
    /// Match all rows.
    pub fn all() -> Filter {
        Filter::default()
    }

    /// Match the row with the given identifier.
    pub fn id(key: RowId) -> Filter {
        Filter::all().and(COL_ID, Cmp::Eq, key)
    }

    /// Add a predicate, ANDed with the existing ones.
    pub fn and(mut self, column: &str, cmp: Cmp, value: impl Into<Value>) -> Filter {
        self.clauses.push((column.to_owned(), cmp, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    fn check_columns(&self) -> Result<()> {
        for (column, _, _) in &self.clauses {
            check_column(column)?;
        }
        Ok(())
    }

    /// The WHERE fragment (without the keyword) and its parameters, or
    /// `None` for the match-all filter.
    fn where_clause(&self) -> Option<(String, Vec<&Value>)> {
        if self.clauses.is_empty() {
            return None;
        }
        let fragment = self
            .clauses
            .iter()
            .map(|(column, cmp, _)| format!("{} {} ?", column, cmp.sql()))
            .collect::<Vec<_>>()
            .join(" and ");
        let params = self.clauses.iter().map(|(_, _, value)| value).collect();
        Some((fragment, params))
    }
}

// ------------- Sort order -------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Sort order for collection queries: one column, one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SortOrder {
    pub column: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn ascending(column: &str) -> SortOrder {
        SortOrder { column: column.to_owned(), direction: Direction::Ascending }
    }
    pub fn descending(column: &str) -> SortOrder {
        SortOrder { column: column.to_owned(), direction: Direction::Descending }
    }

    fn sql(&self) -> String {
        let direction = match self.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        format!("{} {}", self.column, direction)
    }
}

fn check_column(column: &str) -> Result<()> {
    if schema::is_column(column) {
        Ok(())
    } else {
        Err(StoreError::UnknownColumn(column.to_owned()))
    }
}

// ------------- Store -------------

/// Durable storage for product rows, one table in one SQLite database.
pub struct Store {
    db: Connection,
    schema_ready: Cell<bool>,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &str) -> Result<Store> {
        Ok(Store { db: Connection::open(path)?, schema_ready: Cell::new(false) })
    }

    /// An in-memory store, used by tests and throwaway setups.
    pub fn open_in_memory() -> Result<Store> {
        Ok(Store { db: Connection::open_in_memory()?, schema_ready: Cell::new(false) })
    }

    /// Create the table if it does not already exist. Idempotent; runs at
    /// most once per store, lazily on first access.
    pub fn ensure_schema(&self) -> Result<()> {
        if self.schema_ready.get() {
            return Ok(());
        }
        self.db.execute_batch(&schema::create_table_sql())?;
        self.schema_ready.set(true);
        Ok(())
    }

    /// Append a new row and return its assigned identifier.
    pub fn insert(&self, values: &Values) -> Result<RowId> {
        self.ensure_schema()?;
        if values.is_empty() {
            return Err(StoreError::StorageWriteFailed("no columns to insert".to_owned()));
        }
        check_writable(values)?;
        let columns: Vec<&str> = values.iter().map(|(column, _)| column).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "insert into {} ({}) values ({})",
            TABLE,
            columns.join(", "),
            placeholders
        );
        self.db
            .execute(&sql, params_from_iter(values.iter().map(|(_, value)| value)))
            .map_err(|e| StoreError::StorageWriteFailed(e.to_string()))?;
        let id = self.db.last_insert_rowid();
        debug!(id, "row inserted");
        Ok(id)
    }

    /// Rows matching `filter`, projected to `projection` (all declared
    /// columns when `None`), in `order` (storage order when `None`).
    ///
    /// The result is materialized: a finite snapshot of matching rows.
    /// Restarting the sequence is re-running the query.
    pub fn query(
        &self,
        filter: &Filter,
        projection: Option<&[&str]>,
        order: Option<&SortOrder>,
    ) -> Result<Vec<Values>> {
        self.ensure_schema()?;
        filter.check_columns()?;
        let columns: Vec<&str> = match projection {
            Some(columns) => {
                for column in columns {
                    check_column(column)?;
                }
                columns.to_vec()
            }
            None => schema::columns().iter().map(|c| c.name).collect(),
        };
        let mut sql = format!("select {} from {}", columns.join(", "), TABLE);
        let params = match filter.where_clause() {
            Some((fragment, params)) => {
                sql.push_str(" where ");
                sql.push_str(&fragment);
                params
            }
            None => Vec::new(),
        };
        if let Some(order) = order {
            check_column(&order.column)?;
            sql.push_str(" order by ");
            sql.push_str(&order.sql());
        }
        let mut statement = self.db.prepare(&sql)?;
        let rows = statement.query_map(params_from_iter(params), |row| {
            let mut values = Values::new();
            for (i, column) in columns.iter().enumerate() {
                values.put(column, row.get::<_, Value>(i)?);
            }
            Ok(values)
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Like [`query`](Self::query) without projection, materializing
    /// typed [`Record`]s.
    pub fn query_records(&self, filter: &Filter, order: Option<&SortOrder>) -> Result<Vec<Record>> {
        self.query(filter, None, order)?
            .iter()
            .map(Record::from_values)
            .collect()
    }

    /// Merge `values` into every row matching `filter`. Returns the
    /// number of rows changed; 0 is a valid outcome.
    pub fn update(&self, filter: &Filter, values: &Values) -> Result<usize> {
        self.ensure_schema()?;
        if values.is_empty() {
            return Ok(0);
        }
        check_writable(values)?;
        filter.check_columns()?;
        let assignments = values
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("update {TABLE} set {assignments}");
        let mut params: Vec<&Value> = values.iter().map(|(_, value)| value).collect();
        if let Some((fragment, filter_params)) = filter.where_clause() {
            sql.push_str(" where ");
            sql.push_str(&fragment);
            params.extend(filter_params);
        }
        let count = self
            .db
            .execute(&sql, params_from_iter(params))
            .map_err(|e| StoreError::StorageWriteFailed(e.to_string()))?;
        debug!(count, "rows updated");
        Ok(count)
    }

    /// Remove every row matching `filter`. Returns the number of rows
    /// removed; 0 is a valid outcome.
    pub fn delete(&self, filter: &Filter) -> Result<usize> {
        self.ensure_schema()?;
        filter.check_columns()?;
        let mut sql = format!("delete from {TABLE}");
        let params = match filter.where_clause() {
            Some((fragment, params)) => {
                sql.push_str(" where ");
                sql.push_str(&fragment);
                params
            }
            None => Vec::new(),
        };
        let count = self
            .db
            .execute(&sql, params_from_iter(params))
            .map_err(|e| StoreError::StorageWriteFailed(e.to_string()))?;
        debug!(count, "rows deleted");
        Ok(count)
    }
}

// The row identifier is assigned by the store on insert and is immutable
// afterwards, so no write request may carry it.
fn check_writable(values: &Values) -> Result<()> {
    for (column, _) in values.iter() {
        check_column(column)?;
    }
    if values.contains(COL_ID) {
        return Err(StoreError::StorageWriteFailed(
            "row identifier is assigned by the store".to_owned(),
        ));
    }
    Ok(())
}
