//! [`Client`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar};
use service::{command, domain, query, Query as _};
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A subscriber of an IPTV plan.
#[derive(Clone, Debug, From, Into)]
pub struct Client(domain::Client);

/// A subscriber of an IPTV plan.
#[graphql_object(context = Context)]
impl Client {
    /// Unique identifier of this `Client`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `Client`.
    #[must_use]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Phone this `Client` is reachable by.
    #[must_use]
    pub fn phone(&self) -> Phone {
        self.0.phone.clone().into()
    }

    /// Price of the plan this `Client` pays.
    #[must_use]
    pub fn plan_price(&self) -> Money {
        self.0.plan_price
    }

    /// Kind of this `Client`.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.0.kind.clone().into()
    }

    /// Plan this `Client` is subscribed to.
    #[must_use]
    pub fn plan(&self) -> Plan {
        self.0.plan.clone().into()
    }

    /// `Date` the current subscription period ends on.
    #[must_use]
    pub fn due_date(&self) -> Date {
        self.0.due_date
    }

    /// Reseller this `Client` was sold by.
    #[must_use]
    pub fn reseller(&self) -> Option<Reseller> {
        self.0.reseller.clone().map(Into::into)
    }

    /// Server this `Client` is served from.
    #[must_use]
    pub fn server(&self) -> Server {
        self.0.server.clone().into()
    }

    /// Notes about this `Client`.
    #[must_use]
    pub fn notes(&self) -> Option<Notes> {
        self.0.notes.clone().map(Into::into)
    }

    /// Status of this `Client`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Client` was registered.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// Renewals of this `Client`, the most recent first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.renewals",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn renewals(&self, ctx: &Context) -> Result<Vec<Renewal>, Error> {
        ctx.service()
            .execute(query::renewals::ByClient::by(self.0.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }
}

/// A renewal of a `Client` subscription.
///
/// Keeps a snapshot of the `Client` at the moment of the renewal.
#[derive(Clone, Debug, From, Into)]
pub struct Renewal(domain::Renewal);

/// A renewal of a `Client` subscription.
///
/// Keeps a snapshot of the `Client` at the moment of the renewal.
#[graphql_object(name = "ClientRenewal", context = Context)]
impl Renewal {
    /// Unique identifier of this `ClientRenewal`.
    #[must_use]
    pub fn id(&self) -> RenewalId {
        self.0.id.into()
    }

    /// ID of the renewed `Client`.
    #[must_use]
    pub fn client_id(&self) -> Id {
        self.0.client_id.into()
    }

    /// Name of the `Client` at the moment of this `ClientRenewal`.
    #[must_use]
    pub fn client_name(&self) -> Name {
        self.0.client_name.clone().into()
    }

    /// Phone of the `Client` at the moment of this `ClientRenewal`.
    #[must_use]
    pub fn client_phone(&self) -> Phone {
        self.0.client_phone.clone().into()
    }

    /// Kind of the `Client` at the moment of this `ClientRenewal`.
    #[must_use]
    pub fn client_kind(&self) -> Kind {
        self.0.client_kind.clone().into()
    }

    /// Plan the `Client` was subscribed to before.
    #[must_use]
    pub fn previous_plan(&self) -> Plan {
        self.0.previous_plan.clone().into()
    }

    /// Plan the `Client` is subscribed to from now on.
    #[must_use]
    pub fn new_plan(&self) -> Plan {
        self.0.new_plan.clone().into()
    }

    /// Price paid for this `ClientRenewal`.
    #[must_use]
    pub fn price(&self) -> Money {
        self.0.price
    }

    /// Due `Date` before this `ClientRenewal`.
    #[must_use]
    pub fn previous_due_date(&self) -> Date {
        self.0.previous_due_date
    }

    /// Due `Date` after this `ClientRenewal`.
    #[must_use]
    pub fn new_due_date(&self) -> Date {
        self.0.new_due_date
    }

    /// Reseller of the `Client`.
    #[must_use]
    pub fn reseller(&self) -> Option<Reseller> {
        self.0.reseller.clone().map(Into::into)
    }

    /// Server of the `Client`.
    #[must_use]
    pub fn server(&self) -> Server {
        self.0.server.clone().into()
    }

    /// `DateTime` when this `ClientRenewal` happened.
    #[must_use]
    pub fn renewed_at(&self) -> DateTime {
        self.0.renewed_at.coerce()
    }
}

/// Output of the `renewClient` mutation.
#[derive(Clone, Debug, From)]
pub struct RenewResult(command::renew_client::Output);

/// Output of the `renewClient` mutation.
#[graphql_object(name = "ClientRenewResult", context = Context)]
impl RenewResult {
    /// Renewed `Client`.
    #[must_use]
    pub fn client(&self) -> Client {
        self.0.client.clone().into()
    }

    /// Recorded `ClientRenewal`.
    #[must_use]
    pub fn renewal(&self) -> Renewal {
        self.0.renewal.clone().into()
    }
}

/// Description of a `Client`.
///
/// Every field except `reseller` and `notes` is required for a new `Client`.
/// On editing, omitted fields are kept as they are.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "ClientInput")]
pub struct Input {
    /// Name of the `Client`.
    pub name: Option<Name>,

    /// Phone the `Client` is reachable by.
    pub phone: Option<Phone>,

    /// Price of the plan the `Client` pays.
    pub plan_price: Option<Money>,

    /// Kind of the `Client`.
    pub kind: Option<Kind>,

    /// Plan the `Client` is subscribed to.
    pub plan: Option<Plan>,

    /// `Date` the current subscription period ends on.
    pub due_date: Option<Date>,

    /// Reseller the `Client` was sold by.
    pub reseller: Option<Reseller>,

    /// Server the `Client` is served from.
    pub server: Option<Server>,

    /// Notes about the `Client`.
    pub notes: Option<Notes>,
}

impl From<Input> for command::CreateClient {
    fn from(input: Input) -> Self {
        Self {
            name: input.name.map(Into::into),
            phone: input.phone.map(Into::into),
            plan_price: input.plan_price,
            kind: input.kind.map(Into::into),
            plan: input.plan.map(Into::into),
            due_date: input.due_date,
            reseller: input.reseller.map(Into::into),
            server: input.server.map(Into::into),
            notes: input.notes.map(Into::into),
        }
    }
}

impl Input {
    /// Converts this [`Input`] into a [`command::UpdateClient`] of the
    /// `Client` with the provided `id`.
    #[must_use]
    pub fn into_update(
        self,
        id: Id,
        status: Option<Status>,
    ) -> command::UpdateClient {
        command::UpdateClient {
            name: self.name.map(Into::into),
            phone: self.phone.map(Into::into),
            plan_price: self.plan_price,
            kind: self.kind.map(Into::into),
            plan: self.plan.map(Into::into),
            due_date: self.due_date,
            reseller: self.reseller.map(Into::into),
            server: self.server.map(Into::into),
            notes: self.notes.map(Into::into),
            status: status.map(Into::into),
            ..command::UpdateClient::new(id.into())
        }
    }
}

/// Unique identifier of a `Client`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::client::Id)]
#[into(domain::client::Id)]
#[graphql(name = "ClientId", transparent)]
pub struct Id(Uuid);

/// Unique identifier of a `ClientRenewal`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::renewal::Id)]
#[into(domain::renewal::Id)]
#[graphql(name = "ClientRenewalId", transparent)]
pub struct RenewalId(Uuid);

/// Name of a `Client`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "ClientName", with = scalar::Via::<domain::client::Name>)]
pub struct Name(domain::client::Name);

/// Phone number of a `Client`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "ClientPhone", with = scalar::Via::<domain::client::Phone>)]
pub struct Phone(domain::client::Phone);

/// Kind of a `Client` (direct customer, reseller panel, etc).
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "ClientKind", with = scalar::Via::<domain::client::Kind>)]
pub struct Kind(domain::client::Kind);

/// Subscription plan of a `Client` (monthly, quarterly, etc).
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "ClientPlan", with = scalar::Via::<domain::client::Plan>)]
pub struct Plan(domain::client::Plan);

/// Reseller a `Client` was sold by.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ClientReseller",
    with = scalar::Via::<domain::client::Reseller>,
)]
pub struct Reseller(domain::client::Reseller);

/// Server a `Client` is served from.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "ClientServer", with = scalar::Via::<domain::client::Server>)]
pub struct Server(domain::client::Server);

/// Notes about a `Client`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "ClientNotes", with = scalar::Via::<domain::client::Notes>)]
pub struct Notes(domain::client::Notes);

/// Status of a `Client`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ClientStatus")]
pub enum Status {
    /// Subscription is in use.
    Active,

    /// Subscription is no longer in use.
    Inactive,
}

impl From<domain::client::Status> for Status {
    fn from(status: domain::client::Status) -> Self {
        use domain::client::Status as S;
        match status {
            S::Active => Self::Active,
            S::Inactive => Self::Inactive,
        }
    }
}

impl From<Status> for domain::client::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Active => Self::Active,
            Status::Inactive => Self::Inactive,
        }
    }
}
