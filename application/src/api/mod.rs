//! GraphQL API definitions.

pub mod client;
mod mutation;
pub mod product;
pub mod purchase;
mod query;
pub mod report;
pub mod scalar;

use juniper::EmptySubscription;

use crate::Context;

pub use self::{
    client::Client, mutation::Mutation, product::Product, purchase::Purchase,
    query::Query,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;
