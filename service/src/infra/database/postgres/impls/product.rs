//! [`Product`]-related [`Database`] implementations.

use std::num::NonZeroU32;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use postgres_types::Json;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        product::{self, Fabric, Trim, UnitCosts},
        Product,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `products` table.
const COLUMNS: &str = "\
    id, name, image_url, \
    fabric_kind, fabric_total_price, fabric_total_length, \
    fabric_width, fabric_used_length, \
    fabric_cost, trims_cost, labor_cost, packaging_cost, transport_cost, \
    trims, profit_percent, unit_profit, unit_price, batch_size, \
    created_at, sold_at";

/// Reads a [`Product`] from the provided [`Row`].
fn from_row(row: &Row) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("name"),
        image_url: row.get("image_url"),
        fabric: Fabric {
            kind: row.get("fabric_kind"),
            total_price: row.get("fabric_total_price"),
            total_length: row.get("fabric_total_length"),
            width: row.get("fabric_width"),
            used_length: row.get("fabric_used_length"),
        },
        unit_costs: UnitCosts {
            fabric: row.get("fabric_cost"),
            trims: row.get("trims_cost"),
            labor: row.get("labor_cost"),
            packaging: row.get("packaging_cost"),
            transport: row.get("transport_cost"),
        },
        trims: row.get::<_, Json<Vec<Trim>>>("trims").0,
        profit_percent: row.get("profit_percent"),
        unit_profit: row.get("unit_profit"),
        unit_price: row.get("unit_price"),
        batch_size: u32::try_from(row.get::<_, i64>("batch_size"))
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MIN),
        created_at: row.get("created_at"),
        sold_at: row.get("sold_at"),
    }
}

impl<C> Database<Select<By<Option<Product>, product::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Product>, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM products \
             WHERE id = $1::UUID",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Product>, read::product::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Product>, read::product::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::product::list::Filter { sold } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM products \
             WHERE $1::BOOL IS NULL \
                OR (sold_at IS NOT NULL) = $1::BOOL \
             ORDER BY created_at DESC",
        );
        Ok(self
            .query(sql.as_str(), &[&sold])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Product>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Product>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(product): Insert<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(product)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Product>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(product): Update<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        let Product {
            id,
            name,
            image_url,
            fabric,
            unit_costs,
            trims,
            profit_percent,
            unit_profit,
            unit_price,
            batch_size,
            created_at,
            sold_at,
        } = product;
        let trims = Json(trims);
        let batch_size = i64::from(batch_size.get());

        const SQL: &str = "\
            INSERT INTO products (\
                id, name, image_url, \
                fabric_kind, fabric_total_price, fabric_total_length, \
                fabric_width, fabric_used_length, \
                fabric_cost, trims_cost, labor_cost, \
                packaging_cost, transport_cost, \
                trims, profit_percent, unit_profit, unit_price, batch_size, \
                created_at, sold_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, \
                $4::VARCHAR, $5::NUMERIC, $6::NUMERIC, \
                $7::NUMERIC, $8::NUMERIC, \
                $9::NUMERIC, $10::NUMERIC, $11::NUMERIC, \
                $12::NUMERIC, $13::NUMERIC, \
                $14::JSONB, $15::NUMERIC, $16::NUMERIC, $17::NUMERIC, \
                $18::INT8, \
                $19::TIMESTAMPTZ, $20::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                image_url = EXCLUDED.image_url, \
                fabric_kind = EXCLUDED.fabric_kind, \
                fabric_total_price = EXCLUDED.fabric_total_price, \
                fabric_total_length = EXCLUDED.fabric_total_length, \
                fabric_width = EXCLUDED.fabric_width, \
                fabric_used_length = EXCLUDED.fabric_used_length, \
                fabric_cost = EXCLUDED.fabric_cost, \
                trims_cost = EXCLUDED.trims_cost, \
                labor_cost = EXCLUDED.labor_cost, \
                packaging_cost = EXCLUDED.packaging_cost, \
                transport_cost = EXCLUDED.transport_cost, \
                trims = EXCLUDED.trims, \
                profit_percent = EXCLUDED.profit_percent, \
                unit_profit = EXCLUDED.unit_profit, \
                unit_price = EXCLUDED.unit_price, \
                batch_size = EXCLUDED.batch_size, \
                sold_at = EXCLUDED.sold_at";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &image_url,
                &fabric.kind,
                &fabric.total_price,
                &fabric.total_length,
                &fabric.width,
                &fabric.used_length,
                &unit_costs.fabric,
                &unit_costs.trims,
                &unit_costs.labor,
                &unit_costs.packaging,
                &unit_costs.transport,
                &trims,
                &profit_percent,
                &unit_profit,
                &unit_price,
                &batch_size,
                &created_at,
                &sold_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Product, product::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Product, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM products \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Product, product::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Product, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM products \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
