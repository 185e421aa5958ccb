//! Report [`Query`] definitions.

pub mod cards;
pub mod expenses;
pub mod products;

#[cfg(doc)]
use crate::Query;

pub use self::{cards::Cards, expenses::Expenses, products::Products};
