//! [`Client`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{client, Client, Renewal},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `clients` table.
const COLUMNS: &str = "\
    id, name, phone, plan_price, kind, plan, due_date, \
    reseller, server, notes, status, created_at";

/// Reads a [`Client`] from the provided [`Row`].
fn from_row(row: &Row) -> Client {
    Client {
        id: row.get("id"),
        name: row.get("name"),
        phone: row.get("phone"),
        plan_price: row.get("plan_price"),
        kind: row.get("kind"),
        plan: row.get("plan"),
        due_date: row.get("due_date"),
        reseller: row.get("reseller"),
        server: row.get("server"),
        notes: row.get("notes"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Client>, client::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM clients \
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

impl<C> Database<Select<By<Vec<Client>, read::client::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Client>, read::client::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::client::list::Filter { name, status } = by.into_inner();

        let name_pattern = name.as_ref().map(|n| FuzzPattern::new(n.as_ref()));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];
        if let Some(pattern) = &name_pattern {
            ps.push(pattern);
            conditions.push(format!(
                "LOWER(name) SIMILAR TO LOWER(${}::VARCHAR)",
                ps.len(),
            ));
        }
        if let Some(status) = &status {
            ps.push(status);
            conditions.push(format!("status = ${}::TEXT", ps.len()));
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM clients \
             {filtering} \
             ORDER BY created_at DESC",
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

impl<C> Database<Insert<Client>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Client>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(client): Insert<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(client)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Client>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(client): Update<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        let Client {
            id,
            name,
            phone,
            plan_price,
            kind,
            plan,
            due_date,
            reseller,
            server,
            notes,
            status,
            created_at,
        } = client;

        const SQL: &str = "\
            INSERT INTO clients (\
                id, name, phone, plan_price, kind, plan, due_date, \
                reseller, server, notes, status, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::NUMERIC, \
                $5::VARCHAR, $6::VARCHAR, $7::DATE, \
                $8::VARCHAR, $9::VARCHAR, $10::VARCHAR, $11::TEXT, \
                $12::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                phone = EXCLUDED.phone, \
                plan_price = EXCLUDED.plan_price, \
                kind = EXCLUDED.kind, \
                plan = EXCLUDED.plan, \
                due_date = EXCLUDED.due_date, \
                reseller = EXCLUDED.reseller, \
                server = EXCLUDED.server, \
                notes = EXCLUDED.notes, \
                status = EXCLUDED.status";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &phone,
                &plan_price,
                &kind,
                &plan,
                &due_date,
                &reseller,
                &server,
                &notes,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Client, client::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Client, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        // `renewals` rows are removed by the `ON DELETE CASCADE` constraint.
        const SQL: &str = "\
            DELETE FROM clients \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Client, client::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Client, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM clients \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<Renewal>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(renewal): Insert<Renewal>,
    ) -> Result<Self::Ok, Self::Err> {
        let Renewal {
            id,
            client_id,
            client_name,
            client_phone,
            client_kind,
            previous_plan,
            new_plan,
            price,
            previous_due_date,
            new_due_date,
            reseller,
            server,
            renewed_at,
        } = renewal;

        const SQL: &str = "\
            INSERT INTO renewals (\
                id, client_id, \
                client_name, client_phone, client_kind, \
                previous_plan, new_plan, price, \
                previous_due_date, new_due_date, \
                reseller, server, renewed_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::VARCHAR, $7::VARCHAR, $8::NUMERIC, \
                $9::DATE, $10::DATE, \
                $11::VARCHAR, $12::VARCHAR, $13::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &client_id,
                &client_name,
                &client_phone,
                &client_kind,
                &previous_plan,
                &new_plan,
                &price,
                &previous_due_date,
                &new_due_date,
                &reseller,
                &server,
                &renewed_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Renewal>, client::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Renewal>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Renewal>, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let client_id = by.into_inner();

        const SQL: &str = "\
            SELECT id, client_id, \
                   client_name, client_phone, client_kind, \
                   previous_plan, new_plan, price, \
                   previous_due_date, new_due_date, \
                   reseller, server, renewed_at \
            FROM renewals \
            WHERE client_id = $1::UUID \
            ORDER BY renewed_at DESC";
        Ok(self
            .query(SQL, &[&client_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Renewal {
                id: row.get("id"),
                client_id: row.get("client_id"),
                client_name: row.get("client_name"),
                client_phone: row.get("client_phone"),
                client_kind: row.get("client_kind"),
                previous_plan: row.get("previous_plan"),
                new_plan: row.get("new_plan"),
                price: row.get("price"),
                previous_due_date: row.get("previous_due_date"),
                new_due_date: row.get("new_due_date"),
                reseller: row.get("reseller"),
                server: row.get("server"),
                renewed_at: row.get("renewed_at"),
            })
            .collect())
    }
}
