//! Data store status read definitions.

#[cfg(doc)]
use crate::domain::{Client, Product, Purchase};

/// Number of records kept in the data store.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RowCounts {
    /// Number of [`Purchase`]s.
    pub purchases: i64,

    /// Number of [`Client`]s.
    pub clients: i64,

    /// Number of [`Product`]s.
    pub products: i64,
}
