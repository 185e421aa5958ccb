//! [`Purchase`]-related [`Database`] implementations.

use std::num::NonZeroU16;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{purchase, Purchase},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `purchases` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, name, store, card, \
    total_amount, purchase_date, \
    installment_count, installment_amount, installments_paid, \
    amount_open, amount_paid, status, \
    last_invoice_paid, invoice_day, notes, \
    created_at, updated_at";

/// Reads the installment counter `column` of the provided purchase [`Row`].
///
/// Values outside of the `u16` range (or zero counts) are clamped into it with
/// a warning.
fn counter(row: &Row, column: &str) -> u16 {
    clamp_counter(row.get("id"), column, row.get(column))
}

/// Clamps the raw `value` of the installment counter `column` of the
/// [`Purchase`] with the provided `id` into the `u16` range.
fn clamp_counter(id: purchase::Id, column: &str, value: i32) -> u16 {
    let min = u16::from(column == "installment_count");
    let clamped = u16::try_from(value.max(0))
        .unwrap_or(u16::MAX)
        .max(min);
    if i32::from(clamped) != value {
        log::warn!(
            "`Purchase(id: {id})` has out-of-range `{column}` {value}, \
             using {clamped}",
        );
    }
    clamped
}

/// Reads a [`Purchase`] from the provided [`Row`].
fn from_row(row: &Row) -> Purchase {
    Purchase {
        id: row.get("id"),
        name: row.get("name"),
        store: row.get("store"),
        card: row.get("card"),
        total_amount: row.get("total_amount"),
        purchase_date: row.get("purchase_date"),
        installment_count: NonZeroU16::new(counter(row, "installment_count"))
            .unwrap_or(NonZeroU16::MIN),
        installment_amount: row.get("installment_amount"),
        installments_paid: counter(row, "installments_paid"),
        amount_open: row.get("amount_open"),
        amount_paid: row.get("amount_paid"),
        status: row.get("status"),
        last_invoice_paid: row.get("last_invoice_paid"),
        invoice_day: row.get("invoice_day"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Purchase>, purchase::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Purchase>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Purchase>, purchase::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM purchases \
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

impl<C> Database<Select<By<Vec<Purchase>, read::purchase::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Purchase>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Purchase>, read::purchase::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::purchase::list::Filter { card, status } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];
        if let Some(card) = &card {
            ps.push(card);
            conditions.push(format!("card = ${}::VARCHAR", ps.len()));
        }
        if let Some(status) = &status {
            ps.push(status);
            conditions.push(format!("status = ${}::TEXT", ps.len()));
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM purchases \
             {filtering} \
             ORDER BY purchase_date DESC, created_at DESC",
            filtering = if conditions.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", conditions.iter().join(" AND "))
            },
        );
        Ok(self
            .query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Purchase>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Purchase>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(purchase): Insert<Purchase>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(purchase)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Purchase>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(purchase): Update<Purchase>,
    ) -> Result<Self::Ok, Self::Err> {
        let Purchase {
            id,
            name,
            store,
            card,
            total_amount,
            purchase_date,
            installment_count,
            installment_amount,
            installments_paid,
            amount_open,
            amount_paid,
            status,
            last_invoice_paid,
            invoice_day,
            notes,
            created_at,
            updated_at,
        } = purchase;
        let installment_count = i32::from(installment_count.get());
        let installments_paid = i32::from(installments_paid);

        const SQL: &str = "\
            INSERT INTO purchases (\
                id, name, store, card, \
                total_amount, purchase_date, \
                installment_count, installment_amount, installments_paid, \
                amount_open, amount_paid, status, \
                last_invoice_paid, invoice_day, notes, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::NUMERIC, $6::DATE, \
                $7::INT4, $8::NUMERIC, $9::INT4, \
                $10::NUMERIC, $11::NUMERIC, $12::TEXT, \
                $13::DATE, $14::INT2, $15::VARCHAR, \
                $16::TIMESTAMPTZ, $17::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                store = EXCLUDED.store, \
                card = EXCLUDED.card, \
                total_amount = EXCLUDED.total_amount, \
                purchase_date = EXCLUDED.purchase_date, \
                installment_count = EXCLUDED.installment_count, \
                installment_amount = EXCLUDED.installment_amount, \
                installments_paid = EXCLUDED.installments_paid, \
                amount_open = EXCLUDED.amount_open, \
                amount_paid = EXCLUDED.amount_paid, \
                status = EXCLUDED.status, \
                last_invoice_paid = EXCLUDED.last_invoice_paid, \
                invoice_day = EXCLUDED.invoice_day, \
                notes = EXCLUDED.notes, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &store,
                &card,
                &total_amount,
                &purchase_date,
                &installment_count,
                &installment_amount,
                &installments_paid,
                &amount_open,
                &amount_paid,
                &status,
                &last_invoice_paid,
                &invoice_day,
                &notes,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Purchase, purchase::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Purchase, purchase::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM purchases \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Purchase, purchase::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Purchase, purchase::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM purchases \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

#[cfg(test)]
mod spec {
    use super::{clamp_counter, purchase};

    #[test]
    fn keeps_counters_in_range() {
        let id = purchase::Id::new();

        assert_eq!(clamp_counter(id, "installment_count", 12), 12);
        assert_eq!(clamp_counter(id, "installments_paid", 0), 0);
        assert_eq!(clamp_counter(id, "installments_paid", 65_535), u16::MAX);
    }

    #[test]
    fn clamps_out_of_range_counters() {
        let id = purchase::Id::new();

        assert_eq!(clamp_counter(id, "installments_paid", -3), 0);
        assert_eq!(clamp_counter(id, "installments_paid", 70_000), u16::MAX);
        assert_eq!(clamp_counter(id, "installment_count", 0), 1);
        assert_eq!(clamp_counter(id, "installment_count", -1), 1);
        assert_eq!(clamp_counter(id, "installment_count", 70_000), u16::MAX);
    }
}
