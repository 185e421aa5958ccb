//! [`Product`] definitions.

pub mod legacy;

use std::num::NonZeroU32;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money, Percent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{define_id, define_text};

/// Sewn product priced with a production cost calculator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Product {
    /// ID of this [`Product`].
    pub id: Id,

    /// [`Name`] of this [`Product`].
    pub name: Name,

    /// [`ImageUrl`] of this [`Product`] photo, if any.
    pub image_url: Option<ImageUrl>,

    /// [`Fabric`] this [`Product`] is made of.
    pub fabric: Fabric,

    /// [`UnitCosts`] of producing a single item.
    pub unit_costs: UnitCosts,

    /// [`Trim`]s a single item is finished with.
    pub trims: Vec<Trim>,

    /// Markup applied on top of the production cost.
    pub profit_percent: Percent,

    /// Profit of selling a single item.
    pub unit_profit: Money,

    /// Selling price of a single item.
    pub unit_price: Money,

    /// Number of items produced in a batch.
    pub batch_size: NonZeroU32,

    /// [`DateTime`] when this [`Product`] was registered.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the batch of this [`Product`] was sold, if it was.
    pub sold_at: Option<SaleDateTime>,
}

impl Product {
    /// Returns the cost of the materials of a single item.
    #[must_use]
    pub fn materials_cost(&self) -> Money {
        self.unit_costs.materials()
    }

    /// Returns the total cost of producing a single item.
    #[must_use]
    pub fn production_cost(&self) -> Money {
        self.unit_costs.production()
    }

    /// Returns the selling price of the whole batch.
    #[must_use]
    pub fn batch_total(&self) -> Money {
        self.unit_price.times(self.batch_size.get())
    }

    /// Returns the profit of selling the whole batch.
    #[must_use]
    pub fn batch_profit(&self) -> Money {
        self.unit_profit.times(self.batch_size.get())
    }

    /// Indicates whether the batch of this [`Product`] is sold.
    #[must_use]
    pub fn is_sold(&self) -> bool {
        self.sold_at.is_some()
    }

    /// Marks this [`Product`] as sold, keeping the first sale moment if it was
    /// sold already.
    pub fn sell(&mut self) {
        if self.sold_at.is_none() {
            self.sold_at = Some(common::DateTime::now().coerce());
        }
    }

    /// Returns this [`Product`] with the provided `changes` applied.
    ///
    /// Derived values (fabric cost per item, trims cost, unit profit and
    /// price) are computed again unless provided explicitly, so they keep
    /// following the changed inputs.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn revise(&self, changes: Draft) -> Self {
        let mut base = self.to_draft();
        if changes.changes_fabric() {
            base.fabric_cost = None;
        }
        if changes.trims.is_some() {
            base.trims_cost = None;
        }
        if changes.changes_pricing() {
            base.unit_profit = None;
            if changes.unit_price.is_none() {
                base.unit_price = None;
            }
        }

        let mut revised = changes
            .or(base)
            .build(self.id, self.created_at)
            .expect("`Name` is always present in the base `Draft`");
        revised.sold_at = self.sold_at;
        revised
    }

    /// Returns a [`Draft`] describing this [`Product`].
    #[must_use]
    pub fn to_draft(&self) -> Draft {
        Draft {
            name: Some(self.name.clone()),
            image_url: self.image_url.clone(),
            fabric_kind: self.fabric.kind.clone(),
            fabric_total_price: Some(self.fabric.total_price),
            fabric_total_length: Some(self.fabric.total_length),
            fabric_width: Some(self.fabric.width),
            fabric_used_length: Some(self.fabric.used_length),
            fabric_cost: Some(self.unit_costs.fabric),
            trims_cost: Some(self.unit_costs.trims),
            labor_cost: Some(self.unit_costs.labor),
            packaging_cost: Some(self.unit_costs.packaging),
            transport_cost: Some(self.unit_costs.transport),
            trims: Some(self.trims.clone()),
            profit_percent: Some(self.profit_percent),
            unit_profit: Some(self.unit_profit),
            unit_price: Some(self.unit_price),
            batch_size: Some(self.batch_size),
        }
    }
}

define_id! {
    #[doc = "ID of a [`Product`]."]
    Id
}

define_text! {
    #[doc = "Name of a [`Product`]."]
    Name(max = 512)
}

define_text! {
    #[doc = "URL of a [`Product`] photo."]
    ImageUrl(max = 2048)
}

define_text! {
    #[doc = "Kind of a [`Fabric`] (cotton, linen, etc)."]
    FabricKind(max = 128)
}

define_text! {
    #[doc = "Name of a [`Trim`]."]
    TrimName(max = 256)
}

/// Fabric roll a [`Product`] is cut from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fabric {
    /// [`FabricKind`] of this [`Fabric`], if known.
    pub kind: Option<FabricKind>,

    /// Price paid for the whole roll.
    pub total_price: Money,

    /// Length of the whole roll, in meters.
    pub total_length: Decimal,

    /// Width of the roll, in meters.
    pub width: Decimal,

    /// Length used for a single item, in meters.
    pub used_length: Decimal,
}

impl Fabric {
    /// Returns the cost of the fabric used for a single item, proportional to
    /// the used length of the roll.
    ///
    /// [`None`] is returned if the roll length is unknown.
    #[must_use]
    pub fn cost_per_item(&self) -> Option<Money> {
        (self.total_length > Decimal::ZERO).then(|| {
            Money::new(
                self.total_price
                    .amount()
                    .saturating_mul(self.used_length)
                    .checked_div(self.total_length)
                    .unwrap_or(Decimal::MAX),
            )
        })
    }
}

/// Costs of producing a single item of a [`Product`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UnitCosts {
    /// Cost of the fabric.
    pub fabric: Money,

    /// Cost of the trims (buttons, zippers, labels, etc).
    pub trims: Money,

    /// Cost of the labor.
    pub labor: Money,

    /// Cost of the packaging.
    pub packaging: Money,

    /// Cost of the transport.
    pub transport: Money,
}

impl UnitCosts {
    /// Returns the cost of the materials (fabric and trims).
    #[must_use]
    pub fn materials(&self) -> Money {
        self.fabric + self.trims
    }

    /// Returns the total production cost.
    #[must_use]
    pub fn production(&self) -> Money {
        self.materials() + self.labor + self.packaging + self.transport
    }
}

/// Single trim a [`Product`] is finished with.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Trim {
    /// [`TrimName`] of this [`Trim`].
    #[serde(alias = "nome")]
    pub name: TrimName,

    /// Price of this [`Trim`] per item.
    #[serde(alias = "valor", alias = "custo")]
    pub price: Money,
}

/// [`Product`] description with every field optional.
///
/// Each input shape a [`Product`] may come in is mapped into a [`Draft`]
/// first (see [`legacy`]), and only then built into a [`Product`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Draft {
    /// [`Name`] of the [`Product`].
    pub name: Option<Name>,

    /// [`ImageUrl`] of the [`Product`] photo.
    pub image_url: Option<ImageUrl>,

    /// [`FabricKind`] of the [`Fabric`].
    pub fabric_kind: Option<FabricKind>,

    /// [`Fabric::total_price`].
    pub fabric_total_price: Option<Money>,

    /// [`Fabric::total_length`].
    pub fabric_total_length: Option<Decimal>,

    /// [`Fabric::width`].
    pub fabric_width: Option<Decimal>,

    /// [`Fabric::used_length`].
    pub fabric_used_length: Option<Decimal>,

    /// [`UnitCosts::fabric`].
    ///
    /// Derived from the [`Fabric`] usage when omitted.
    pub fabric_cost: Option<Money>,

    /// [`UnitCosts::trims`].
    ///
    /// Derived from the [`Draft::trims`] when omitted.
    pub trims_cost: Option<Money>,

    /// [`UnitCosts::labor`].
    pub labor_cost: Option<Money>,

    /// [`UnitCosts::packaging`].
    pub packaging_cost: Option<Money>,

    /// [`UnitCosts::transport`].
    pub transport_cost: Option<Money>,

    /// [`Trim`]s of the [`Product`].
    pub trims: Option<Vec<Trim>>,

    /// [`Product::profit_percent`].
    pub profit_percent: Option<Percent>,

    /// [`Product::unit_profit`].
    ///
    /// Derived from the [`Draft::unit_price`] or the
    /// [`Draft::profit_percent`] when omitted.
    pub unit_profit: Option<Money>,

    /// [`Product::unit_price`].
    ///
    /// Derived from the production cost and the [`Draft::unit_profit`] when
    /// omitted.
    pub unit_price: Option<Money>,

    /// [`Product::batch_size`], `1` when omitted.
    pub batch_size: Option<NonZeroU32>,
}

impl Draft {
    /// Fills the fields missing in this [`Draft`] from the `base` one.
    #[must_use]
    pub fn or(self, base: Self) -> Self {
        Self {
            name: self.name.or(base.name),
            image_url: self.image_url.or(base.image_url),
            fabric_kind: self.fabric_kind.or(base.fabric_kind),
            fabric_total_price: self
                .fabric_total_price
                .or(base.fabric_total_price),
            fabric_total_length: self
                .fabric_total_length
                .or(base.fabric_total_length),
            fabric_width: self.fabric_width.or(base.fabric_width),
            fabric_used_length: self
                .fabric_used_length
                .or(base.fabric_used_length),
            fabric_cost: self.fabric_cost.or(base.fabric_cost),
            trims_cost: self.trims_cost.or(base.trims_cost),
            labor_cost: self.labor_cost.or(base.labor_cost),
            packaging_cost: self.packaging_cost.or(base.packaging_cost),
            transport_cost: self.transport_cost.or(base.transport_cost),
            trims: self.trims.or(base.trims),
            profit_percent: self.profit_percent.or(base.profit_percent),
            unit_profit: self.unit_profit.or(base.unit_profit),
            unit_price: self.unit_price.or(base.unit_price),
            batch_size: self.batch_size.or(base.batch_size),
        }
    }

    /// Indicates whether this [`Draft`] changes any fabric field.
    fn changes_fabric(&self) -> bool {
        self.fabric_total_price.is_some()
            || self.fabric_total_length.is_some()
            || self.fabric_width.is_some()
            || self.fabric_used_length.is_some()
    }

    /// Indicates whether this [`Draft`] changes anything the unit profit or
    /// price are derived from.
    fn changes_pricing(&self) -> bool {
        self.changes_fabric()
            || self.trims.is_some()
            || self.fabric_cost.is_some()
            || self.trims_cost.is_some()
            || self.labor_cost.is_some()
            || self.packaging_cost.is_some()
            || self.transport_cost.is_some()
            || self.profit_percent.is_some()
            || self.unit_price.is_some()
    }

    /// Builds a [`Product`] out of this [`Draft`].
    ///
    /// [`None`] is returned if the [`Name`] is missing.
    #[must_use]
    pub fn build(self, id: Id, created_at: CreationDateTime) -> Option<Product> {
        let fabric = Fabric {
            kind: self.fabric_kind,
            total_price: self.fabric_total_price.unwrap_or_default(),
            total_length: self.fabric_total_length.unwrap_or_default(),
            width: self.fabric_width.unwrap_or_default(),
            used_length: self.fabric_used_length.unwrap_or_default(),
        };
        let trims = self.trims.unwrap_or_default();

        let unit_costs = UnitCosts {
            fabric: self
                .fabric_cost
                .or_else(|| fabric.cost_per_item())
                .unwrap_or_default(),
            trims: self
                .trims_cost
                .unwrap_or_else(|| trims.iter().map(|t| t.price).sum()),
            labor: self.labor_cost.unwrap_or_default(),
            packaging: self.packaging_cost.unwrap_or_default(),
            transport: self.transport_cost.unwrap_or_default(),
        };
        let cost = unit_costs.production();

        let profit_percent = self.profit_percent.unwrap_or_default();
        let unit_profit = self
            .unit_profit
            .or_else(|| self.unit_price.map(|price| price - cost))
            .unwrap_or_else(|| profit_percent.of(cost));
        let unit_price = self.unit_price.unwrap_or(cost + unit_profit);

        Some(Product {
            id,
            name: self.name?,
            image_url: self.image_url,
            fabric,
            unit_costs,
            trims,
            profit_percent,
            unit_profit,
            unit_price,
            batch_size: self.batch_size.unwrap_or(NonZeroU32::MIN),
            created_at,
            sold_at: None,
        })
    }
}

/// [`DateTime`] when a [`Product`] was registered.
pub type CreationDateTime = DateTimeOf<(Product, unit::Creation)>;

/// [`DateTime`] when a [`Product`] batch was sold.
pub type SaleDateTime = DateTimeOf<(Product, unit::Sale)>;
