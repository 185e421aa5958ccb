//! [`Query`] collection related to the data store status.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the number of records kept in the data store.
pub type RowCounts = DatabaseQuery<By<read::RowCounts, ()>>;
