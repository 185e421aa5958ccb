//! GraphQL [`Mutation`]s definitions.

use common::{Date, Money};
use juniper::graphql_object;
use service::{command, domain::purchase::LedgerError, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `Purchase`.
    ///
    /// `installmentAmount` defaults to the `totalAmount` split evenly between
    /// the installments, and `invoiceDay` defaults to the 10th.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `MISSING_REQUIRED_FIELD` - one of the required fields is omitted;
    /// - `INVALID_INSTALLMENT_COUNT` - `installmentCount` is not positive;
    /// - `INVALID_INVOICE_DAY` - `invoiceDay` is not within `1..=31`;
    /// - `INVALID_PURCHASE_DATE` - installments would be billed past 9999-12.
    #[tracing::instrument(
        skip_all,
        fields(
            card = ?input.card.as_ref().map(ToString::to_string),
            gql.name = "createPurchase",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_purchase(
        input: api::purchase::Input,
        ctx: &Context,
    ) -> Result<api::Purchase, Error> {
        let cmd = command::CreatePurchase::try_from(input).map_err(ctx.error())?;

        ctx.service()
            .execute(cmd)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Edits the `Purchase` with the specified ID.
    ///
    /// Changing the amounts or the number of installments recalculates the
    /// paid and open amounts of the `Purchase`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PURCHASE_NOT_EXISTS` - the `Purchase` with the specified ID does not
    ///                           exist;
    /// - `INVALID_INSTALLMENT_COUNT` - `installmentCount` is not positive;
    /// - `INVALID_INSTALLMENTS_PAID` - `installmentsPaid` is negative;
    /// - `INVALID_INVOICE_DAY` - `invoiceDay` is not within `1..=31`;
    /// - `INVALID_PURCHASE_DATE` - installments would be billed past 9999-12.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updatePurchase",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_purchase(
        id: api::purchase::Id,
        changes: api::purchase::Changes,
        ctx: &Context,
    ) -> Result<api::Purchase, Error> {
        let cmd = changes.into_command(id).map_err(ctx.error())?;

        ctx.service()
            .execute(cmd)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Purchase` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PURCHASE_NOT_EXISTS` - the `Purchase` with the specified ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deletePurchase",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_purchase(
        id: api::purchase::Id,
        ctx: &Context,
    ) -> Result<api::Purchase, Error> {
        ctx.service()
            .execute(command::DeletePurchase {
                purchase_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Pays the next installment of the `Purchase` with the specified ID.
    ///
    /// If the `installment` number is provided, it must be the next unpaid
    /// one.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PURCHASE_NOT_EXISTS` - the `Purchase` with the specified ID does not
    ///                           exist;
    /// - `PURCHASE_ALREADY_SETTLED` - all the installments are paid already;
    /// - `INVALID_INSTALLMENT_INDEX` - the `installment` is not the next
    ///                                 unpaid one.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "payPurchaseInstallment",
            id = %id,
            installment = ?installment,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn pay_purchase_installment(
        id: api::purchase::Id,
        installment: Option<i32>,
        ctx: &Context,
    ) -> Result<api::purchase::InstallmentPayment, Error> {
        let installment = installment
            .map(api::purchase::installment_number)
            .transpose()
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::PayPurchaseInstallment {
                purchase_id: id.into(),
                installment,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Purchase` with the specified ID as fully paid.
    ///
    /// Settling an already paid `Purchase` changes nothing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PURCHASE_NOT_EXISTS` - the `Purchase` with the specified ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "settlePurchase",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn settle_purchase(
        id: api::purchase::Id,
        ctx: &Context,
    ) -> Result<api::Purchase, Error> {
        ctx.service()
            .execute(command::SettlePurchase {
                purchase_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Pays the invoice of the provided card for the provided period, paying
    /// the next installment of every `Purchase` billed in it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NO_MATCHING_INVOICE` - no pending `Purchase` is billed in the
    ///                           requested invoice.
    #[tracing::instrument(
        skip_all,
        fields(
            card = %card,
            gql.name = "payCardInvoice",
            otel.name = Self::SPAN_NAME,
            period = %period,
        ),
    )]
    pub async fn pay_card_invoice(
        card: api::purchase::Card,
        period: api::purchase::InvoicePeriod,
        ctx: &Context,
    ) -> Result<api::purchase::invoice::Payment, Error> {
        ctx.service()
            .execute(command::PayCardInvoice {
                card: card.into(),
                period: period.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Registers a new `Client`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `MISSING_REQUIRED_FIELD` - one of the required fields is omitted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createClient",
            name = ?input.name.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_client(
        input: api::client::Input,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        ctx.service()
            .execute(command::CreateClient::from(input))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Edits the `Client` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateClient",
            id = %id,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn update_client(
        id: api::client::Id,
        input: api::client::Input,
        status: Option<api::client::Status>,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        ctx.service()
            .execute(input.into_update(id, status))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Client` with the specified ID along with its renewals.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteClient",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_client(
        id: api::client::Id,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        ctx.service()
            .execute(command::DeleteClient {
                client_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Renews the subscription of the `Client` with the specified ID until
    /// the provided `dueDate`, recording a `ClientRenewal`.
    ///
    /// `price` defaults to the current plan price of the `Client`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            due_date = %due_date,
            gql.name = "renewClient",
            id = %id,
            otel.name = Self::SPAN_NAME,
            plan = ?plan.as_ref().map(ToString::to_string),
        ),
    )]
    pub async fn renew_client(
        id: api::client::Id,
        plan: Option<api::client::Plan>,
        price: Option<Money>,
        due_date: Date,
        ctx: &Context,
    ) -> Result<api::client::RenewResult, Error> {
        ctx.service()
            .execute(command::RenewClient {
                client_id: id.into(),
                plan: plan.map(Into::into),
                price,
                due_date,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Registers a new `Product`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_BATCH_SIZE` - `batchSize` is not positive.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createProduct",
            name = ?input.name.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_product(
        input: api::product::Input,
        ctx: &Context,
    ) -> Result<api::Product, Error> {
        let draft = input.try_into().map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateProduct { draft })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Registers a new `Product` from the JSON `payload` of the provided
    /// historical `shape`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PRODUCT_PAYLOAD` - the `payload` doesn't match the `shape`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createProductFromPayload",
            otel.name = Self::SPAN_NAME,
            shape = ?shape,
        ),
    )]
    pub async fn create_product_from_payload(
        shape: api::product::ProductShape,
        payload: String,
        ctx: &Context,
    ) -> Result<api::Product, Error> {
        let draft = shape.parse(&payload).map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateProduct { draft })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the description of the `Product` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PRODUCT_NOT_EXISTS` - the `Product` with the specified ID does not
    ///                          exist;
    /// - `INVALID_BATCH_SIZE` - `batchSize` is not positive.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateProduct",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_product(
        id: api::product::Id,
        input: api::product::Input,
        ctx: &Context,
    ) -> Result<api::Product, Error> {
        let draft = input.try_into().map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateProduct {
                product_id: id.into(),
                draft,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Product` with the specified ID as sold.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PRODUCT_NOT_EXISTS` - the `Product` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "sellProduct",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn sell_product(
        id: api::product::Id,
        ctx: &Context,
    ) -> Result<api::Product, Error> {
        ctx.service()
            .execute(command::SellProduct {
                product_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Product` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PRODUCT_NOT_EXISTS` - the `Product` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteProduct",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_product(
        id: api::product::Id,
        ctx: &Context,
    ) -> Result<api::Product, Error> {
        ctx.service()
            .execute(command::DeleteProduct {
                product_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

/// Builds the [`Error`] of the omitted required `field`.
fn missing_field(field: &str) -> Error {
    Error {
        code: "MISSING_REQUIRED_FIELD",
        status_code: http::StatusCode::BAD_REQUEST,
        message: format!("`{field}` field is required"),
        backtrace: None,
    }
}

define_error! {
    enum NotExistsError {
        #[code = "CLIENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Client` with the specified ID does not exist"]
        Client,

        #[code = "PRODUCT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Product` with the specified ID does not exist"]
        Product,

        #[code = "PURCHASE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Purchase` with the specified ID does not exist"]
        Purchase,
    }
}

define_error! {
    enum CalendarError {
        #[code = "INVALID_PURCHASE_DATE"]
        #[status = BAD_REQUEST]
        #[message = "`Purchase` installments must be billed no later than \
                     9999-12"]
        Beyond,
    }
}

impl AsError for command::create_purchase::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MissingRequiredField(field) => Some(missing_field(field)),
            Self::BeyondCalendar => Some(CalendarError::Beyond.into()),
        }
    }
}

impl AsError for command::update_purchase::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PurchaseNotExists(_) => Some(NotExistsError::Purchase.into()),
            Self::BeyondCalendar => Some(CalendarError::Beyond.into()),
        }
    }
}

impl AsError for command::delete_purchase::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PurchaseNotExists(_) => Some(NotExistsError::Purchase.into()),
        }
    }
}

impl AsError for command::settle_purchase::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PurchaseNotExists(_) => Some(NotExistsError::Purchase.into()),
        }
    }
}

impl AsError for command::pay_purchase_installment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PURCHASE_ALREADY_SETTLED"]
                #[status = BAD_REQUEST]
                #[message = "All the installments of the `Purchase` are paid \
                             already"]
                AlreadySettled,

                #[code = "INVALID_INSTALLMENT_INDEX"]
                #[status = BAD_REQUEST]
                #[message = "Requested installment is not the next unpaid one"]
                InvalidInstallmentIndex,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Ledger(LedgerError::AlreadySettled) => {
                Some(Error::AlreadySettled.into())
            }
            Self::Ledger(e @ LedgerError::InvalidInstallmentIndex { .. }) => {
                Some(crate::Error {
                    message: e.to_string(),
                    ..Error::InvalidInstallmentIndex.into()
                })
            }
            Self::PurchaseNotExists(_) => Some(NotExistsError::Purchase.into()),
        }
    }
}

impl AsError for command::pay_card_invoice::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NO_MATCHING_INVOICE"]
                #[status = NOT_FOUND]
                #[message = "No pending `Purchase` is billed in the requested \
                             invoice"]
                NoMatchingInvoice,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoMatchingInvoice { .. } => {
                Some(Error::NoMatchingInvoice.into())
            }
        }
    }
}

impl AsError for command::create_client::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MissingRequiredField(field) => Some(missing_field(field)),
        }
    }
}

impl AsError for command::update_client::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ClientNotExists(_) => Some(NotExistsError::Client.into()),
        }
    }
}

impl AsError for command::delete_client::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ClientNotExists(_) => Some(NotExistsError::Client.into()),
        }
    }
}

impl AsError for command::renew_client::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ClientNotExists(_) => Some(NotExistsError::Client.into()),
        }
    }
}

impl AsError for command::create_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MissingRequiredField(field) => Some(missing_field(field)),
        }
    }
}

impl AsError for command::update_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProductNotExists(_) => Some(NotExistsError::Product.into()),
        }
    }
}

impl AsError for command::sell_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProductNotExists(_) => Some(NotExistsError::Product.into()),
        }
    }
}

impl AsError for command::delete_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProductNotExists(_) => Some(NotExistsError::Product.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command,
        domain::{
            client,
            purchase::{self, InvoicePeriod, LedgerError},
        },
    };

    use crate::AsError as _;

    #[test]
    fn missing_field_names_the_field() {
        let err = command::create_purchase::ExecutionError::MissingRequiredField(
            "card",
        )
        .as_error();

        assert_eq!(err.code, "MISSING_REQUIRED_FIELD");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "`card` field is required");
    }

    #[test]
    fn purchases_past_calendar_end_are_bad_requests() {
        let err =
            command::create_purchase::ExecutionError::BeyondCalendar.as_error();
        assert_eq!(err.code, "INVALID_PURCHASE_DATE");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);

        let err =
            command::update_purchase::ExecutionError::BeyondCalendar.as_error();
        assert_eq!(err.code, "INVALID_PURCHASE_DATE");
    }

    #[test]
    fn ledger_errors_are_bad_requests() {
        use command::pay_purchase_installment::ExecutionError as E;

        let err = E::Ledger(LedgerError::AlreadySettled).as_error();
        assert_eq!(err.code, "PURCHASE_ALREADY_SETTLED");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);

        let err = E::Ledger(LedgerError::InvalidInstallmentIndex {
            number: 3,
            paid: 0,
            count: 4,
        })
        .as_error();
        assert_eq!(err.code, "INVALID_INSTALLMENT_INDEX");
        assert!(err.message.contains("#3"), "{}", err.message);
    }

    #[test]
    fn missing_entities_are_not_found() {
        let err = command::renew_client::ExecutionError::ClientNotExists(
            client::Id::new(),
        )
        .as_error();
        assert_eq!(err.code, "CLIENT_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);

        let err = command::pay_card_invoice::ExecutionError::NoMatchingInvoice {
            card: purchase::Card::new("Nubank").unwrap(),
            period: InvoicePeriod::new(2024, 3).unwrap(),
        }
        .as_error();
        assert_eq!(err.code, "NO_MATCHING_INVOICE");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }
}
