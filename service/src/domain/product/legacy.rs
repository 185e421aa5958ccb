//! Adapters of the historical [`Product`] input shapes into a [`Draft`].
//!
//! Over time products were submitted in several shapes, differing mostly in
//! how the unit costs, the selling price and the batch size are named. Each
//! shape has its own [`Deserialize`] definition here, mapped into the
//! canonical [`Draft`].

use std::num::NonZeroU32;

use common::{Money, Percent};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

#[cfg(doc)]
use super::Product;
use super::{Draft, FabricKind, ImageUrl, Name, Trim};

/// Known input shape of a [`Product`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Shape {
    /// Unit costs named `custo_unitario_*`, price named
    /// `preco_venda_unitario`.
    Current,

    /// Unit costs named `custo_*`, production cost named
    /// `custo_producao_total`, price named `preco_venda_final`.
    ProductionTotal,

    /// Unit costs named `custo_*`, production cost named `custo_total`.
    Legacy,
}

impl Shape {
    /// Parses the provided JSON `input` of this [`Shape`] into a [`Draft`].
    ///
    /// # Errors
    ///
    /// If the `input` is not a JSON object of this [`Shape`].
    pub fn parse(self, input: &str) -> Result<Draft, serde_json::Error> {
        Ok(match self {
            Self::Current => serde_json::from_str::<Current>(input)?.into(),
            Self::ProductionTotal => {
                serde_json::from_str::<ProductionTotal>(input)?.into()
            }
            Self::Legacy => serde_json::from_str::<Legacy>(input)?.into(),
        })
    }
}

/// Fabric fields shared by all the shapes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FabricFields {
    #[serde(alias = "tecido_tipo", alias = "tipo_tecido")]
    kind: Option<String>,
    #[serde(rename = "valor_total_tecido", deserialize_with = "lenient")]
    total_price: Option<Decimal>,
    #[serde(rename = "comprimento_total_tecido", deserialize_with = "lenient")]
    total_length: Option<Decimal>,
    #[serde(rename = "largura_tecido", deserialize_with = "lenient")]
    width: Option<Decimal>,
    #[serde(rename = "metragem_utilizada", deserialize_with = "lenient")]
    used_length: Option<Decimal>,
}

/// [`Shape::Current`] definition.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Current {
    nome_produto: Option<String>,
    imagem_url: Option<String>,
    #[serde(flatten)]
    fabric: FabricFields,
    #[serde(deserialize_with = "lenient")]
    custo_unitario_tecido: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    custo_unitario_aviamentos: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    custo_unitario_mo: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    custo_unitario_embalagem: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    custo_unitario_transporte: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    porcentagem_lucro: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    lucro_unitario: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    preco_venda_unitario: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    quantidade_produtos: Option<Decimal>,
    aviamentos_data: Option<Vec<Trim>>,
}

impl From<Current> for Draft {
    fn from(s: Current) -> Self {
        Self {
            name: s.nome_produto.and_then(Name::new),
            image_url: s.imagem_url.and_then(ImageUrl::new),
            fabric_cost: s.custo_unitario_tecido.map(Money::new),
            trims_cost: s.custo_unitario_aviamentos.map(Money::new),
            labor_cost: s.custo_unitario_mo.map(Money::new),
            packaging_cost: s.custo_unitario_embalagem.map(Money::new),
            transport_cost: s.custo_unitario_transporte.map(Money::new),
            trims: s.aviamentos_data,
            profit_percent: s.porcentagem_lucro.and_then(Percent::new),
            unit_profit: s.lucro_unitario.map(Money::new),
            unit_price: s.preco_venda_unitario.map(Money::new),
            batch_size: s.quantidade_produtos.and_then(batch_size),
            ..fabric(s.fabric)
        }
    }
}

/// [`Shape::ProductionTotal`] definition.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductionTotal {
    nome_produto: Option<String>,
    imagem_url: Option<String>,
    #[serde(flatten)]
    fabric: FabricFields,
    #[serde(flatten)]
    costs: CostFields,
    /// Ignored, as the production cost is always derived from its parts.
    #[serde(deserialize_with = "lenient")]
    custo_producao_total: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    preco_venda_final: Option<Decimal>,
}

impl From<ProductionTotal> for Draft {
    fn from(s: ProductionTotal) -> Self {
        Self {
            name: s.nome_produto.and_then(Name::new),
            image_url: s.imagem_url.and_then(ImageUrl::new),
            unit_price: s.preco_venda_final.map(Money::new),
            ..s.costs.into_draft(fabric(s.fabric))
        }
    }
}

/// [`Shape::Legacy`] definition.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Legacy {
    nome_produto: Option<String>,
    imagem_url: Option<String>,
    #[serde(flatten)]
    fabric: FabricFields,
    #[serde(flatten)]
    costs: CostFields,
    /// Ignored, as the production cost is always derived from its parts.
    #[serde(deserialize_with = "lenient")]
    custo_total: Option<Decimal>,
    #[serde(deserialize_with = "lenient", alias = "preco_venda_final")]
    preco_venda: Option<Decimal>,
}

impl From<Legacy> for Draft {
    fn from(s: Legacy) -> Self {
        Self {
            name: s.nome_produto.and_then(Name::new),
            image_url: s.imagem_url.and_then(ImageUrl::new),
            unit_price: s.preco_venda.map(Money::new),
            ..s.costs.into_draft(fabric(s.fabric))
        }
    }
}

/// `custo_*` cost fields shared by the [`Shape::ProductionTotal`] and the
/// [`Shape::Legacy`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CostFields {
    #[serde(deserialize_with = "lenient")]
    custo_tecido: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    custo_aviamentos: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    custo_mao_obra: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    custo_embalagem: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    custo_transporte: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    porcentagem_lucro: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    valor_lucro: Option<Decimal>,
    #[serde(deserialize_with = "lenient")]
    quantidade_lote: Option<Decimal>,
    detalhes_aviamentos: Option<Vec<Trim>>,
}

impl CostFields {
    /// Fills the cost-related fields of the provided [`Draft`].
    fn into_draft(self, draft: Draft) -> Draft {
        Draft {
            fabric_cost: self.custo_tecido.map(Money::new),
            trims_cost: self.custo_aviamentos.map(Money::new),
            labor_cost: self.custo_mao_obra.map(Money::new),
            packaging_cost: self.custo_embalagem.map(Money::new),
            transport_cost: self.custo_transporte.map(Money::new),
            trims: self.detalhes_aviamentos,
            profit_percent: self.porcentagem_lucro.and_then(Percent::new),
            unit_profit: self.valor_lucro.map(Money::new),
            batch_size: self.quantidade_lote.and_then(batch_size),
            ..draft
        }
    }
}

/// Creates a [`Draft`] with only the fabric fields filled.
fn fabric(f: FabricFields) -> Draft {
    Draft {
        fabric_kind: f.kind.and_then(FabricKind::new),
        fabric_total_price: f.total_price.map(Money::new),
        fabric_total_length: f.total_length,
        fabric_width: f.width,
        fabric_used_length: f.used_length,
        ..Draft::default()
    }
}

/// Converts the provided quantity into a batch size, if it's a positive
/// integer.
fn batch_size(quantity: Decimal) -> Option<NonZeroU32> {
    use rust_decimal::prelude::ToPrimitive as _;

    quantity
        .is_integer()
        .then(|| quantity.to_u32())
        .flatten()
        .and_then(NonZeroU32::new)
}

/// Deserializes a number that may come as a JSON number, a numeric string, an
/// empty string or `null`.
fn lenient<'de, D>(d: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_json::Value;

    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map(Some)
            .map_err(D::Error::custom),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .replace(',', ".")
            .parse()
            .map(Some)
            .map_err(D::Error::custom),
        v @ (Value::Bool(_) | Value::Array(_) | Value::Object(_)) => {
            Err(D::Error::custom(format!("expected a number, found `{v}`")))
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{DateTime, Money};

    use super::{
        super::{Draft, Id},
        Shape,
    };

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn parses_current_shape() {
        let draft = Shape::Current
            .parse(
                r#"{
                    "nome_produto": "Tote bag",
                    "tecido_tipo": "canvas",
                    "valor_total_tecido": "80",
                    "comprimento_total_tecido": 10,
                    "metragem_utilizada": 0.5,
                    "custo_unitario_tecido": 4,
                    "custo_unitario_aviamentos": "1.5",
                    "custo_unitario_mo": 12,
                    "custo_unitario_embalagem": "",
                    "custo_unitario_transporte": null,
                    "porcentagem_lucro": 60,
                    "lucro_unitario": 10.5,
                    "preco_venda_unitario": 28,
                    "quantidade_produtos": "3",
                    "aviamentos_data": [{"nome": "Zipper", "valor": 1.5}]
                }"#,
            )
            .unwrap();

        assert_eq!(draft.fabric_kind.as_ref().unwrap().to_string(), "canvas");
        assert_eq!(draft.fabric_total_price, Some(money("80.00")));
        assert_eq!(draft.labor_cost, Some(money("12.00")));
        assert_eq!(draft.packaging_cost, None);
        assert_eq!(draft.batch_size.unwrap().get(), 3);
        assert_eq!(draft.trims.as_ref().unwrap().len(), 1);

        let p = draft.build(Id::new(), DateTime::now().coerce()).unwrap();
        assert_eq!(p.production_cost(), money("17.50"));
        assert_eq!(p.unit_price, money("28.00"));
        assert_eq!(p.unit_profit, money("10.50"));
        assert_eq!(p.batch_total(), money("84.00"));
    }

    #[test]
    fn parses_production_total_shape() {
        let draft = Shape::ProductionTotal
            .parse(
                r#"{
                    "nome_produto": "Apron",
                    "tipo_tecido": "linen",
                    "custo_tecido": 9,
                    "custo_aviamentos": 1,
                    "custo_mao_obra": 15,
                    "custo_embalagem": 2,
                    "custo_transporte": 3,
                    "custo_producao_total": 999,
                    "valor_lucro": 10,
                    "preco_venda_final": 40,
                    "quantidade_lote": 4
                }"#,
            )
            .unwrap();

        let p = draft.build(Id::new(), DateTime::now().coerce()).unwrap();
        assert_eq!(p.production_cost(), money("30.00"));
        assert_eq!(p.unit_price, money("40.00"));
        assert_eq!(p.batch_total(), money("160.00"));
        assert_eq!(p.batch_profit(), money("40.00"));
    }

    #[test]
    fn parses_legacy_shape() {
        let draft = Shape::Legacy
            .parse(
                r#"{
                    "nome_produto": "Scarf",
                    "custo_tecido": "5,50",
                    "custo_mao_obra": 4.5,
                    "custo_total": 10,
                    "porcentagem_lucro": 100
                }"#,
            )
            .unwrap();

        let p = draft.build(Id::new(), DateTime::now().coerce()).unwrap();
        assert_eq!(p.production_cost(), money("10.00"));
        assert_eq!(p.unit_profit, money("10.00"));
        assert_eq!(p.unit_price, money("20.00"));
        assert_eq!(p.batch_size.get(), 1);
    }

    #[test]
    fn missing_name_is_kept_empty() {
        let draft = Shape::Legacy.parse(r#"{"nome_produto": "  "}"#).unwrap();

        assert_eq!(draft, Draft::default());
    }

    #[test]
    fn rejects_non_numeric_costs() {
        assert!(Shape::Current
            .parse(r#"{"custo_unitario_mo": "a lot"}"#)
            .is_err());
        assert!(Shape::Legacy.parse(r#"{"custo_tecido": true}"#).is_err());
        assert!(Shape::Legacy.parse("[]").is_err());
    }
}
