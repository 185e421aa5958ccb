//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Purchase` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PURCHASE_NOT_EXISTS` - the `Purchase` with the specified ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "purchase",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn purchase(
        id: api::purchase::Id,
        ctx: &Context,
    ) -> Result<api::Purchase, Error> {
        ctx.service()
            .execute(query::purchase::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| PurchaseError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists the `Purchase`s, the most recently made first.
    #[tracing::instrument(
        skip_all,
        fields(
            card = ?card.as_ref().map(ToString::to_string),
            gql.name = "purchases",
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn purchases(
        card: Option<api::purchase::Card>,
        status: Option<api::purchase::Status>,
        ctx: &Context,
    ) -> Result<Vec<api::Purchase>, Error> {
        ctx.service()
            .execute(query::purchases::List::by(read::purchase::list::Filter {
                card: card.map(Into::into),
                status: status.map(Into::into),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Lists the pending card invoices, ordered by card and period.
    #[tracing::instrument(
        skip_all,
        fields(
            card = ?card.as_ref().map(ToString::to_string),
            gql.name = "pendingInvoices",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn pending_invoices(
        card: Option<api::purchase::Card>,
        ctx: &Context,
    ) -> Result<Vec<api::purchase::invoice::Group>, Error> {
        ctx.service()
            .execute(query::purchases::PendingInvoices {
                card: card.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Summarizes the `Purchase`s of every card.
    ///
    /// Configured cards are always present, even without any `Purchase`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cardsReport",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cards_report(
        ctx: &Context,
    ) -> Result<Vec<api::report::CardSummary>, Error> {
        ctx.service()
            .execute(query::report::Cards)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Calculates the overall expenses statistics.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "expensesReport",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn expenses_report(
        ctx: &Context,
    ) -> Result<api::report::Expenses, Error> {
        ctx.service()
            .execute(query::report::Expenses)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Client` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "client",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn client(
        id: api::client::Id,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        ctx.service()
            .execute(query::client::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ClientError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists the `Client`s, the most recently registered first.
    ///
    /// The `name` matches every `Client` whose name contains any of its
    /// words.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "clients",
            name = ?name.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn clients(
        name: Option<api::client::Name>,
        status: Option<api::client::Status>,
        ctx: &Context,
    ) -> Result<Vec<api::Client>, Error> {
        ctx.service()
            .execute(query::clients::List::by(read::client::list::Filter {
                name: name.map(Into::into),
                status: status.map(Into::into),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Returns the `Product` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PRODUCT_NOT_EXISTS` - the `Product` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "product",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn product(
        id: api::product::Id,
        ctx: &Context,
    ) -> Result<api::Product, Error> {
        ctx.service()
            .execute(query::product::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ProductError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists the `Product`s, the most recently registered first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "products",
            otel.name = Self::SPAN_NAME,
            sold = ?sold,
        ),
    )]
    pub async fn products(
        sold: Option<bool>,
        ctx: &Context,
    ) -> Result<Vec<api::Product>, Error> {
        ctx.service()
            .execute(query::products::List::by(read::product::list::Filter {
                sold,
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Calculates the statistics of all the `Product`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "productsReport",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn products_report(
        ctx: &Context,
    ) -> Result<api::report::Products, Error> {
        ctx.service()
            .execute(query::report::Products)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Counts the records kept in the data store.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "storeStatus",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn store_status(
        ctx: &Context,
    ) -> Result<api::report::StoreStatus, Error> {
        ctx.service()
            .execute(query::status::RowCounts::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum ClientError {
        #[code = "CLIENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Client` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum ProductError {
        #[code = "PRODUCT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Product` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum PurchaseError {
        #[code = "PURCHASE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Purchase` with the specified ID does not exist"]
        NotExists,
    }
}
