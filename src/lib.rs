//! Stockroom – a single-table inventory store behind a resource-oriented
//! access layer.
//!
//! Callers address data with textual identifiers: `res://<authority>/products`
//! names the whole collection, `res://<authority>/products/<n>` names one row
//! by its numeric key. The [`provider::InventoryProvider`] facade routes the
//! identifier, validates the written columns, executes against the SQLite
//! table, and publishes a change event after every effective mutation so
//! dependent views can re-query.
//!
//! ## Modules
//! * [`schema`] – The table contract: columns, category tags, [`schema::Values`]
//!   write maps and the typed [`schema::Record`].
//! * [`router`] – Identifier classification into collection or item targets.
//! * [`validate`] – Fixed-order, first-failure validation of write requests.
//! * [`persist`] – SQLite persistence: schema creation and CRUD execution.
//! * [`notify`] – The publish/subscribe hub for change events.
//! * [`provider`] – The facade composing all of the above.
//! * [`server`] – A localhost HTTP shim for out-of-process collaborators.
//!
//! ## Validation
//! Only the columns present in a request are checked, so partial updates may
//! omit anything the caller is not changing. Checks run in a fixed order and
//! stop at the first violation; see [`validate::Violation`].
//!
//! ## Notifications
//! Events are scoped by the exact target written: an item update notifies
//! observers of that item, an insert notifies observers of the collection.
//! A mutation that matched no rows publishes nothing.
//!
//! ## Quick Start
//! ```
//! use std::sync::Arc;
//! use stockroom::notify::ChangeHub;
//! use stockroom::persist::{Filter, Store};
//! use stockroom::provider::InventoryProvider;
//! use stockroom::router::Router;
//! use stockroom::schema::Values;
//!
//! let provider = InventoryProvider::new(
//!     Router::new("net.stockroom.local").unwrap(),
//!     Store::open_in_memory().unwrap(),
//!     Arc::new(ChangeHub::new()),
//! );
//! let tour = Values::new()
//!     .with("name", "Tour A")
//!     .with("category", "culture")
//!     .with("price", 2500)
//!     .with("supplier_name", "Acme")
//!     .with("supplier_email", "a@x.com");
//! let id = provider.insert("res://net.stockroom.local/products", &tour).unwrap();
//! let snapshot = provider
//!     .query("res://net.stockroom.local/products", None, &Filter::all(), None)
//!     .unwrap();
//! assert_eq!(id, 1);
//! assert_eq!(snapshot.len(), 1);
//! ```

pub mod error;
pub mod notify;
pub mod persist;
pub mod provider;
pub mod router;
pub mod schema;
pub mod server;
pub mod validate;
