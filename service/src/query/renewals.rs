//! [`Query`] collection related to the [`Renewal`] history.

use common::operations::By;

#[cfg(doc)]
use crate::{domain::Client, Query};
use crate::domain::{client, Renewal};

use super::DatabaseQuery;

/// Queries the [`Renewal`]s of a [`Client`], newest first.
pub type ByClient = DatabaseQuery<By<Vec<Renewal>, client::Id>>;
