//! Write-request validation.
//!
//! A write request carries only the columns being written, so validation is
//! scoped to the columns that are present: a partial update may omit any
//! required column without being rejected, since the caller is not required
//! to resupply unchanged fields. Presence of required columns on insert is
//! left to the table's own not-null constraints.
//!
//! Checks run in a fixed order and stop at the first violation.

use thiserror::Error;

use crate::schema::{
    self, COL_CATEGORY, COL_NAME, COL_PRICE, COL_REORDER_QUANTITY, COL_SUPPLIER_EMAIL,
    COL_SUPPLIER_NAME, Value, Values,
};

/// The first rule a write request broke.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    #[error("product name must not be empty")]
    MissingName,
    #[error("category tag must not be empty")]
    MissingCategory,
    #[error("category tag is not a recognized tag")]
    InvalidCategory,
    #[error("price must be a non-zero amount")]
    MissingPrice,
    #[error("supplier name must not be empty")]
    MissingSupplierName,
    #[error("supplier email must not be empty")]
    MissingSupplierEmail,
    #[error("reorder quantity must be a number of units")]
    MissingReorderQuantity,
}

fn non_empty_text(value: &Value) -> Option<&str> {
    value.as_text().filter(|s| !s.is_empty())
}

/// Check the present columns of a write request, in the fixed order
/// name, category, price, supplier name, supplier email, reorder
/// quantity. Returns the first violation encountered.
pub fn check(values: &Values) -> Result<(), Violation> {
    if let Some(name) = values.get(COL_NAME) {
        if non_empty_text(name).is_none() {
            return Err(Violation::MissingName);
        }
    }

    if let Some(category) = values.get(COL_CATEGORY) {
        match non_empty_text(category) {
            None => return Err(Violation::MissingCategory),
            Some(tag) if !schema::is_valid_category(tag) => {
                return Err(Violation::InvalidCategory);
            }
            Some(_) => {}
        }
    }

    // A price of zero counts as missing, matching the store's convention
    // that priced goods are never given away.
    if let Some(price) = values.get(COL_PRICE) {
        match price.as_integer() {
            Some(amount) if amount != 0 => {}
            _ => return Err(Violation::MissingPrice),
        }
    }

    if let Some(supplier) = values.get(COL_SUPPLIER_NAME) {
        if non_empty_text(supplier).is_none() {
            return Err(Violation::MissingSupplierName);
        }
    }

    if let Some(email) = values.get(COL_SUPPLIER_EMAIL) {
        if non_empty_text(email).is_none() {
            return Err(Violation::MissingSupplierEmail);
        }
    }

    if let Some(reorder) = values.get(COL_REORDER_QUANTITY) {
        if reorder.as_integer().is_none() {
            return Err(Violation::MissingReorderQuantity);
        }
    }

    Ok(())
}
