//! Report definitions.

use common::Money;
use derive_more::From;
use juniper::graphql_object;
use service::read;

use crate::{api::purchase::Card, AsError, Context, Error};

/// Converts the provided count into a GraphQL `Int`.
fn int(count: u32) -> Result<i32, Error> {
    i32::try_from(count).map_err(AsError::into_error)
}

/// Summary of the purchases charged on a single card.
#[derive(Clone, Debug, From)]
pub struct CardSummary(read::purchase::summary::CardSummary);

/// Summary of the purchases charged on a single card.
#[graphql_object(context = Context)]
impl CardSummary {
    /// Summarized card.
    #[must_use]
    pub fn card(&self) -> Card {
        self.0.card.clone().into()
    }

    /// Number of purchases charged on the card.
    pub fn purchases(&self) -> Result<i32, Error> {
        int(self.0.purchases)
    }

    /// Total amount of the purchases.
    #[must_use]
    pub fn total(&self) -> Money {
        self.0.total
    }

    /// Number of installments of all the purchases.
    pub fn installments_total(&self) -> Result<i32, Error> {
        int(self.0.installments_total)
    }

    /// Number of already paid installments.
    pub fn installments_paid(&self) -> Result<i32, Error> {
        int(self.0.installments_paid)
    }

    /// Number of installments still to be paid.
    pub fn installments_pending(&self) -> Result<i32, Error> {
        int(self.0.installments_pending)
    }

    /// Amount already paid.
    #[must_use]
    pub fn amount_paid(&self) -> Money {
        self.0.amount_paid
    }

    /// Amount still to be paid.
    #[must_use]
    pub fn amount_open(&self) -> Money {
        self.0.amount_open
    }
}

/// Overall expenses statistics.
#[derive(Clone, Debug, From)]
pub struct Expenses(read::purchase::summary::Overview);

/// Overall expenses statistics.
#[graphql_object(name = "ExpensesReport", context = Context)]
impl Expenses {
    /// Total amount of all the purchases.
    #[must_use]
    pub fn total_spent(&self) -> Money {
        self.0.total_spent
    }

    /// Amount still to be paid.
    #[must_use]
    pub fn total_open(&self) -> Money {
        self.0.total_open
    }

    /// Amount already paid.
    #[must_use]
    pub fn total_paid(&self) -> Money {
        self.0.total_paid
    }

    /// Number of all the purchases.
    pub fn purchases(&self) -> Result<i32, Error> {
        int(self.0.purchases)
    }

    /// Number of the pending purchases.
    pub fn pending(&self) -> Result<i32, Error> {
        int(self.0.pending)
    }

    /// Number of the paid purchases.
    pub fn paid(&self) -> Result<i32, Error> {
        int(self.0.paid)
    }

    /// Breakdown by card.
    #[must_use]
    pub fn cards(&self) -> Vec<CardSummary> {
        self.0.cards.iter().cloned().map(Into::into).collect()
    }
}

/// Statistics of all the products.
#[derive(Clone, Copy, Debug, From)]
pub struct Products(read::product::Statistics);

/// Statistics of all the products.
#[graphql_object(name = "ProductsReport", context = Context)]
impl Products {
    /// Number of all the products.
    pub fn total(&self) -> Result<i32, Error> {
        int(self.0.total)
    }

    /// Number of the sold products.
    pub fn sold(&self) -> Result<i32, Error> {
        int(self.0.sold)
    }

    /// Number of the products still in stock.
    pub fn available(&self) -> Result<i32, Error> {
        int(self.0.available)
    }

    /// Selling value of the products still in stock.
    #[must_use]
    pub fn stock_value(&self) -> Money {
        self.0.stock_value
    }

    /// Selling value of the sold products.
    #[must_use]
    pub fn sold_value(&self) -> Money {
        self.0.sold_value
    }

    /// Profit of the sold products.
    #[must_use]
    pub fn profit(&self) -> Money {
        self.0.profit
    }
}

/// Number of records kept in the data store.
#[derive(Clone, Copy, Debug, From)]
pub struct StoreStatus(read::RowCounts);

/// Number of records kept in the data store.
#[graphql_object(context = Context)]
impl StoreStatus {
    /// Number of the stored purchases.
    pub fn purchases(&self) -> Result<i32, Error> {
        i32::try_from(self.0.purchases).map_err(AsError::into_error)
    }

    /// Number of the stored clients.
    pub fn clients(&self) -> Result<i32, Error> {
        i32::try_from(self.0.clients).map_err(AsError::into_error)
    }

    /// Number of the stored products.
    pub fn products(&self) -> Result<i32, Error> {
        i32::try_from(self.0.products).map_err(AsError::into_error)
    }
}

#[cfg(test)]
mod spec {
    use super::int;

    #[test]
    fn counts_overflowing_int_are_internal_errors() {
        assert_eq!(int(42).unwrap(), 42);

        let err = int(u32::MAX).unwrap_err();
        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
    }
}
