//! [`Query`] collection related to the multiple [`Product`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Product, read};

use super::DatabaseQuery;

/// Queries a list of [`Product`]s, newest first.
pub type List = DatabaseQuery<By<Vec<Product>, read::product::list::Filter>>;
