//! Identifier routing.
//!
//! Incoming resource identifiers take the form
//! `res://<authority>/products` for the whole collection and
//! `res://<authority>/products/<n>` for a single row. The router is an
//! explicitly constructed, immutable object holding the compiled pattern;
//! classification is a pure function of the identifier.

use std::fmt;

use regex::Regex;

use crate::error::{Result, StoreError};
use crate::schema::TABLE;

/// The two shapes a recognized identifier can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// All rows of the table.
    Collection,
    /// One row, addressed by its numeric key.
    Item(i64),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Collection => f.write_str(TABLE),
            Target::Item(key) => write!(f, "{TABLE}/{key}"),
        }
    }
}

/// Maps incoming identifiers onto [`Target`]s for one registered
/// authority. Stateless beyond the compiled pattern.
#[derive(Debug)]
pub struct Router {
    authority: String,
    pattern: Regex,
}

impl Router {
    pub fn new(authority: &str) -> Result<Router> {
        let pattern = Regex::new(&format!(
            r"^res://{}/{}(?:/(\d+))?$",
            regex::escape(authority),
            TABLE
        ))
        .map_err(|e| StoreError::Config(format!("bad identifier pattern: {e}")))?;
        Ok(Router { authority: authority.to_owned(), pattern })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Classify an identifier as collection or item. Anything that does
    /// not match the registered authority and path is unrecognized, which
    /// is fatal for the requested operation.
    pub fn classify(&self, identifier: &str) -> Result<Target> {
        let captures = self
            .pattern
            .captures(identifier)
            .ok_or_else(|| StoreError::UnrecognizedIdentifier(identifier.to_owned()))?;
        match captures.get(1) {
            None => Ok(Target::Collection),
            Some(key) => key
                .as_str()
                .parse()
                .map(Target::Item)
                // all-digit but out of range for a row identifier
                .map_err(|_| StoreError::UnrecognizedIdentifier(identifier.to_owned())),
        }
    }

    /// The identifier addressing the whole collection.
    pub fn collection_identifier(&self) -> String {
        format!("res://{}/{}", self.authority, TABLE)
    }

    /// The identifier addressing one row.
    pub fn item_identifier(&self, key: i64) -> String {
        format!("res://{}/{}/{}", self.authority, TABLE, key)
    }
}
