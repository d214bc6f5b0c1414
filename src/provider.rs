//! The access layer facade.
//!
//! One request runs end-to-end through here: route the identifier,
//! validate the values when the operation mutates, delegate to the store,
//! and publish a change event when the mutation had effect. The provider
//! itself keeps no state across calls; every operation re-reads or
//! re-writes through the store.
//!
//! Item identifiers always pin the filter to their own key, regardless of
//! any caller-supplied filter. This is done by explicit filter rewriting
//! here, not by the store.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::info;

use crate::error::{Result, StoreError};
use crate::notify::ChangeHub;
use crate::persist::{Filter, RowId, SortOrder, Store};
use crate::router::{Router, Target};
use crate::schema::{COL_REORDER_QUANTITY, Record, TABLE, Value, Values};
use crate::validate;

/// The rows produced by one query, together with the identifier they were
/// produced for. A collaborator that wants to observe invalidation of
/// this result subscribes with [`Snapshot::target`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    identifier: String,
    target: Target,
    rows: Vec<Values>,
}

impl Snapshot {
    /// The identifier this snapshot answers for.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn rows(&self) -> &[Values] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Values> {
        self.rows
    }

    /// Materialize typed records. Only meaningful for unprojected
    /// queries, where every declared column is present.
    pub fn records(&self) -> Result<Vec<Record>> {
        self.rows.iter().map(Record::from_values).collect()
    }
}

/// Facade over router, validator, store and change hub.
pub struct InventoryProvider {
    router: Router,
    store: Store,
    hub: Arc<ChangeHub>,
}

impl InventoryProvider {
    /// Wire a provider together. The router and hub are built by the
    /// process at startup and handed in; nothing here is ambient.
    pub fn new(router: Router, store: Store, hub: Arc<ChangeHub>) -> InventoryProvider {
        InventoryProvider { router, store, hub }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The hub a collaborator subscribes to for change events.
    pub fn hub(&self) -> &Arc<ChangeHub> {
        &self.hub
    }

    /// Handle a query request. Item identifiers pin the filter to their
    /// own key; the caller-supplied filter applies to collection queries
    /// only.
    pub fn query(
        &self,
        identifier: &str,
        projection: Option<&[&str]>,
        filter: &Filter,
        order: Option<&SortOrder>,
    ) -> Result<Snapshot> {
        let target = self.router.classify(identifier)?;
        let effective = match target {
            Target::Collection => Cow::Borrowed(filter),
            Target::Item(key) => Cow::Owned(Filter::id(key)),
        };
        let rows = self.store.query(&effective, projection, order)?;
        info!(identifier, rows = rows.len(), "query");
        Ok(Snapshot { identifier: identifier.to_owned(), target, rows })
    }

    /// Handle an insert request. Only meaningful for the collection
    /// identifier; validation failures abort before storage is touched.
    /// On success a change event scoped to the collection is published.
    pub fn insert(&self, identifier: &str, values: &Values) -> Result<RowId> {
        match self.router.classify(identifier)? {
            Target::Item(_) => Err(StoreError::UnsupportedOperation(format!(
                "insert is not supported for item identifier {identifier}"
            ))),
            Target::Collection => {
                validate::check(values)?;
                let id = self.store.insert(&clamp_reorder(values))?;
                info!(identifier, id, "product inserted");
                self.hub.publish(Target::Collection, identifier);
                Ok(id)
            }
        }
    }

    /// Handle an update request. An empty value map is a no-op returning
    /// 0; only present columns are validated; a change event is published
    /// iff at least one row changed.
    pub fn update(&self, identifier: &str, values: &Values, filter: &Filter) -> Result<usize> {
        let target = self.router.classify(identifier)?;
        if values.is_empty() {
            info!(identifier, "nothing to update");
            return Ok(0);
        }
        validate::check(values)?;
        let effective = match target {
            Target::Collection => Cow::Borrowed(filter),
            Target::Item(key) => Cow::Owned(Filter::id(key)),
        };
        let count = self.store.update(&effective, &clamp_reorder(values))?;
        info!(identifier, count, "update");
        if count > 0 {
            self.hub.publish(target, identifier);
        }
        Ok(count)
    }

    /// Handle a delete request. An absent filter on the collection means
    /// all rows; a change event is published iff at least one row was
    /// removed.
    pub fn delete(&self, identifier: &str, filter: &Filter) -> Result<usize> {
        let target = self.router.classify(identifier)?;
        let effective = match target {
            Target::Collection => Cow::Borrowed(filter),
            Target::Item(key) => Cow::Owned(Filter::id(key)),
        };
        let count = self.store.delete(&effective)?;
        info!(identifier, count, "delete");
        if count > 0 {
            self.hub.publish(target, identifier);
        }
        Ok(count)
    }

    /// The MIME-like type tag of the data behind an identifier. Purely
    /// informational, no side effects.
    pub fn type_of(&self, identifier: &str) -> Result<String> {
        match self.router.classify(identifier)? {
            Target::Collection => Ok(format!(
                "vnd.stockroom.dir/{}/{}",
                self.router.authority(),
                TABLE
            )),
            Target::Item(_) => Ok(format!(
                "vnd.stockroom.item/{}/{}",
                self.router.authority(),
                TABLE
            )),
        }
    }
}

// The reorder quantity is clamped to a positive number of units at this
// boundary, so a stored row can always be reordered as-is.
fn clamp_reorder(values: &Values) -> Cow<'_, Values> {
    match values.get(COL_REORDER_QUANTITY) {
        Some(Value::Integer(units)) if *units < 1 => {
            let mut clamped = values.clone();
            clamped.put(COL_REORDER_QUANTITY, 1);
            Cow::Owned(clamped)
        }
        _ => Cow::Borrowed(values),
    }
}
