//! [`Product`]-related definitions.

use std::num::NonZeroU32;

use common::{DateTime, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar};
use service::domain::{self, product::legacy};
use uuid::Uuid;

use crate::{
    api::scalar::{self, Decimal},
    define_error, AsError, Context, Error,
};

/// A product batch with its cost calculation.
#[derive(Clone, Debug, From, Into)]
pub struct Product(domain::Product);

/// A product batch with its cost calculation.
#[graphql_object(context = Context)]
impl Product {
    /// Unique identifier of this `Product`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `Product`.
    #[must_use]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// URL of this `Product` image.
    #[must_use]
    pub fn image_url(&self) -> Option<ImageUrl> {
        self.0.image_url.clone().map(Into::into)
    }

    /// Fabric this `Product` is cut from.
    #[must_use]
    pub fn fabric(&self) -> Fabric {
        Fabric(self.0.fabric.clone())
    }

    /// Costs of producing a single item.
    #[must_use]
    pub fn unit_costs(&self) -> UnitCosts {
        UnitCosts(self.0.unit_costs)
    }

    /// Trims this `Product` is finished with.
    #[must_use]
    pub fn trims(&self) -> Vec<Trim> {
        self.0.trims.iter().cloned().map(Trim).collect()
    }

    /// Profit margin applied over the production cost.
    #[must_use]
    pub fn profit_percent(&self) -> Percent {
        self.0.profit_percent
    }

    /// Profit of a single item.
    #[must_use]
    pub fn unit_profit(&self) -> Money {
        self.0.unit_profit
    }

    /// Selling price of a single item.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.0.unit_price
    }

    /// Number of items in the batch.
    pub fn batch_size(&self) -> Result<i32, Error> {
        i32::try_from(self.0.batch_size.get()).map_err(AsError::into_error)
    }

    /// Cost of the materials (fabric and trims) of a single item.
    #[must_use]
    pub fn materials_cost(&self) -> Money {
        self.0.materials_cost()
    }

    /// Total production cost of a single item.
    #[must_use]
    pub fn production_cost(&self) -> Money {
        self.0.production_cost()
    }

    /// Selling price of the whole batch.
    #[must_use]
    pub fn batch_total(&self) -> Money {
        self.0.batch_total()
    }

    /// Profit of the whole batch.
    #[must_use]
    pub fn batch_profit(&self) -> Money {
        self.0.batch_profit()
    }

    /// Indicator whether the batch is sold.
    #[must_use]
    pub fn is_sold(&self) -> bool {
        self.0.is_sold()
    }

    /// `DateTime` when this `Product` was registered.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when the batch was sold.
    #[must_use]
    pub fn sold_at(&self) -> Option<DateTime> {
        self.0.sold_at.map(|at| at.coerce())
    }
}

/// Fabric roll a `Product` is cut from.
#[derive(Clone, Debug)]
pub struct Fabric(domain::product::Fabric);

/// Fabric roll a `Product` is cut from.
#[graphql_object(name = "ProductFabric", context = Context)]
impl Fabric {
    /// Kind of the fabric.
    #[must_use]
    pub fn kind(&self) -> Option<FabricKind> {
        self.0.kind.clone().map(Into::into)
    }

    /// Price paid for the whole roll.
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.0.total_price
    }

    /// Length of the whole roll, in meters.
    #[must_use]
    pub fn total_length(&self) -> Decimal {
        self.0.total_length.into()
    }

    /// Width of the roll, in meters.
    #[must_use]
    pub fn width(&self) -> Decimal {
        self.0.width.into()
    }

    /// Length used for a single item, in meters.
    #[must_use]
    pub fn used_length(&self) -> Decimal {
        self.0.used_length.into()
    }

    /// Cost of the fabric used for a single item.
    ///
    /// `null` if the roll length is unknown.
    #[must_use]
    pub fn cost_per_item(&self) -> Option<Money> {
        self.0.cost_per_item()
    }
}

/// Costs of producing a single item of a `Product`.
#[derive(Clone, Copy, Debug)]
pub struct UnitCosts(domain::product::UnitCosts);

/// Costs of producing a single item of a `Product`.
#[graphql_object(name = "ProductUnitCosts", context = Context)]
impl UnitCosts {
    /// Cost of the fabric.
    #[must_use]
    pub fn fabric(&self) -> Money {
        self.0.fabric
    }

    /// Cost of the trims.
    #[must_use]
    pub fn trims(&self) -> Money {
        self.0.trims
    }

    /// Cost of the labor.
    #[must_use]
    pub fn labor(&self) -> Money {
        self.0.labor
    }

    /// Cost of the packaging.
    #[must_use]
    pub fn packaging(&self) -> Money {
        self.0.packaging
    }

    /// Cost of the transport.
    #[must_use]
    pub fn transport(&self) -> Money {
        self.0.transport
    }
}

/// Trim a `Product` is finished with.
#[derive(Clone, Debug)]
pub struct Trim(domain::product::Trim);

/// Trim a `Product` is finished with.
#[graphql_object(name = "ProductTrim", context = Context)]
impl Trim {
    /// Name of this `ProductTrim`.
    #[must_use]
    pub fn name(&self) -> TrimName {
        self.0.name.clone().into()
    }

    /// Price of this `ProductTrim` per item.
    #[must_use]
    pub fn price(&self) -> Money {
        self.0.price
    }
}

/// `Product` description with every field optional.
///
/// Derived fields missing here are calculated out of the provided ones.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "ProductInput")]
pub struct Input {
    /// Name of the `Product`.
    pub name: Option<Name>,

    /// URL of the `Product` image.
    pub image_url: Option<ImageUrl>,

    /// Kind of the fabric.
    pub fabric_kind: Option<FabricKind>,

    /// Price paid for the whole fabric roll.
    pub fabric_total_price: Option<Money>,

    /// Length of the whole fabric roll, in meters.
    pub fabric_total_length: Option<Decimal>,

    /// Width of the fabric roll, in meters.
    pub fabric_width: Option<Decimal>,

    /// Fabric length used for a single item, in meters.
    pub fabric_used_length: Option<Decimal>,

    /// Fabric cost of a single item. Calculated out of the fabric roll if
    /// omitted.
    pub fabric_cost: Option<Money>,

    /// Trims cost of a single item. Calculated out of the `trims` if
    /// omitted.
    pub trims_cost: Option<Money>,

    /// Labor cost of a single item.
    pub labor_cost: Option<Money>,

    /// Packaging cost of a single item.
    pub packaging_cost: Option<Money>,

    /// Transport cost of a single item.
    pub transport_cost: Option<Money>,

    /// Trims the `Product` is finished with.
    pub trims: Option<Vec<TrimInput>>,

    /// Profit margin applied over the production cost.
    pub profit_percent: Option<Percent>,

    /// Profit of a single item.
    pub unit_profit: Option<Money>,

    /// Selling price of a single item.
    pub unit_price: Option<Money>,

    /// Number of items in the batch.
    pub batch_size: Option<i32>,
}

impl TryFrom<Input> for domain::product::Draft {
    type Error = Error;

    fn try_from(input: Input) -> Result<Self, Self::Error> {
        let batch_size = input
            .batch_size
            .map(|size| {
                u32::try_from(size)
                    .ok()
                    .and_then(NonZeroU32::new)
                    .ok_or_else(|| Error::from(InputError::BatchSize))
            })
            .transpose()?;

        Ok(Self {
            name: input.name.map(Into::into),
            image_url: input.image_url.map(Into::into),
            fabric_kind: input.fabric_kind.map(Into::into),
            fabric_total_price: input.fabric_total_price,
            fabric_total_length: input.fabric_total_length.map(Into::into),
            fabric_width: input.fabric_width.map(Into::into),
            fabric_used_length: input.fabric_used_length.map(Into::into),
            fabric_cost: input.fabric_cost,
            trims_cost: input.trims_cost,
            labor_cost: input.labor_cost,
            packaging_cost: input.packaging_cost,
            transport_cost: input.transport_cost,
            trims: input
                .trims
                .map(|trims| trims.into_iter().map(Into::into).collect()),
            profit_percent: input.profit_percent,
            unit_profit: input.unit_profit,
            unit_price: input.unit_price,
            batch_size,
        })
    }
}

/// Trim a `Product` is finished with.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ProductTrimInput")]
pub struct TrimInput {
    /// Name of the trim.
    pub name: TrimName,

    /// Price of the trim per item.
    pub price: Money,
}

impl From<TrimInput> for domain::product::Trim {
    fn from(input: TrimInput) -> Self {
        Self {
            name: input.name.into(),
            price: input.price,
        }
    }
}

/// Historical shape a `Product` payload may come in.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum ProductShape {
    /// Unit costs named `custo_unitario_*`, price named
    /// `preco_venda_unitario`.
    Current,

    /// Unit costs named `custo_*`, production cost named
    /// `custo_producao_total`, price named `preco_venda_final`.
    ProductionTotal,

    /// Unit costs named `custo_*`, production cost named `custo_total`.
    Legacy,
}

impl ProductShape {
    /// Parses the provided JSON `payload` of this [`ProductShape`] into a
    /// [`domain::product::Draft`].
    ///
    /// # Errors
    ///
    /// With [`InputError::Payload`] if the `payload` doesn't match this
    /// [`ProductShape`].
    pub fn parse(self, payload: &str) -> Result<domain::product::Draft, Error> {
        let shape = match self {
            Self::Current => legacy::Shape::Current,
            Self::ProductionTotal => legacy::Shape::ProductionTotal,
            Self::Legacy => legacy::Shape::Legacy,
        };
        shape.parse(payload).map_err(|e| Error {
            message: format!("{}: {e}", InputError::Payload),
            ..InputError::Payload.into()
        })
    }
}

/// Unique identifier of a `Product`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::product::Id)]
#[into(domain::product::Id)]
#[graphql(name = "ProductId", transparent)]
pub struct Id(Uuid);

/// Name of a `Product`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "ProductName", with = scalar::Via::<domain::product::Name>)]
pub struct Name(domain::product::Name);

/// URL of a `Product` image.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ProductImageUrl",
    with = scalar::Via::<domain::product::ImageUrl>,
)]
pub struct ImageUrl(domain::product::ImageUrl);

/// Kind of a fabric.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(with = scalar::Via::<domain::product::FabricKind>)]
pub struct FabricKind(domain::product::FabricKind);

/// Name of a `ProductTrim`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ProductTrimName",
    with = scalar::Via::<domain::product::TrimName>,
)]
pub struct TrimName(domain::product::TrimName);

define_error! {
    enum InputError {
        #[code = "INVALID_BATCH_SIZE"]
        #[status = BAD_REQUEST]
        #[message = "Batch size must be a positive number"]
        BatchSize,

        #[code = "INVALID_PRODUCT_PAYLOAD"]
        #[status = BAD_REQUEST]
        #[message = "Payload doesn't match the `Product` shape"]
        Payload,
    }
}

#[cfg(test)]
mod spec {
    use service::domain::product::Draft;

    use super::{Input, InputError, ProductShape};
    use crate::Error;

    #[test]
    fn rejects_non_positive_batch_size() {
        for size in [0, -3] {
            let err = Draft::try_from(Input {
                batch_size: Some(size),
                ..Input::default()
            })
            .unwrap_err();

            assert_eq!(err.code, Error::from(InputError::BatchSize).code);
        }
    }

    #[test]
    fn converts_batch_size() {
        let draft = Draft::try_from(Input {
            batch_size: Some(12),
            ..Input::default()
        })
        .unwrap();

        assert_eq!(draft.batch_size.map(|s| s.get()), Some(12));
    }

    #[test]
    fn parses_legacy_payload() {
        let draft = ProductShape::Legacy
            .parse(r#"{"nome_produto": "Vestido", "quantidade_lote": 3}"#)
            .unwrap();

        assert_eq!(draft.name.unwrap().to_string(), "Vestido");
        assert_eq!(draft.batch_size.map(|s| s.get()), Some(3));
    }

    #[test]
    fn rejects_malformed_payload() {
        let err = ProductShape::Current.parse("[1, 2, 3]").unwrap_err();

        assert_eq!(err.code, "INVALID_PRODUCT_PAYLOAD");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
