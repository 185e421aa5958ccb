//! In-memory [`Database`] used in tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tracerr::Traced;

use crate::{
    domain::{client, product, purchase, Client, Product, Purchase, Renewal},
    infra::database::{self, postgres, Database},
    read, Config, Service,
};

/// In-memory [`Database`] keeping everything in [`HashMap`]s.
///
/// Transactions are no-ops: every write is visible immediately.
#[derive(Clone, Debug, Default)]
pub(crate) struct Mock(Arc<Mutex<State>>);

/// Data stored in a [`Mock`].
#[derive(Debug, Default)]
struct State {
    purchases: HashMap<purchase::Id, Purchase>,
    clients: HashMap<client::Id, Client>,
    renewals: Vec<Renewal>,
    products: HashMap<product::Id, Product>,

    /// [`Purchase`]s whose updates fail.
    broken_purchases: HashSet<purchase::Id>,
}

impl Mock {
    /// Wraps this [`Mock`] into a [`Service`] with the default [`Config`].
    pub(crate) fn service(self) -> Service<Self> {
        Service::new(Config::default(), self)
    }

    /// Wraps this [`Mock`] into a [`Service`] with the provided [`Config`].
    pub(crate) fn service_with(self, config: Config) -> Service<Self> {
        Service::new(config, self)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    /// Stores the provided [`Purchase`] directly.
    pub(crate) fn with_purchase(self, p: Purchase) -> Self {
        _ = self.state().purchases.insert(p.id, p);
        self
    }

    /// Stores the provided [`Client`] directly.
    pub(crate) fn with_client(self, c: Client) -> Self {
        _ = self.state().clients.insert(c.id, c);
        self
    }

    /// Stores the provided [`Product`] directly.
    pub(crate) fn with_product(self, p: Product) -> Self {
        _ = self.state().products.insert(p.id, p);
        self
    }

    /// Makes every following update of the [`Purchase`] with the provided ID
    /// fail.
    pub(crate) fn break_purchase(self, id: purchase::Id) -> Self {
        _ = self.state().broken_purchases.insert(id);
        self
    }

    /// Returns the stored [`Purchase`] with the provided ID.
    pub(crate) fn purchase(&self, id: purchase::Id) -> Option<Purchase> {
        self.state().purchases.get(&id).cloned()
    }

    /// Returns all the stored [`Purchase`]s.
    pub(crate) fn purchases(&self) -> Vec<Purchase> {
        self.state().purchases.values().cloned().collect()
    }

    /// Returns the stored [`Client`] with the provided ID.
    pub(crate) fn client(&self, id: client::Id) -> Option<Client> {
        self.state().clients.get(&id).cloned()
    }

    /// Returns all the stored [`Renewal`]s.
    pub(crate) fn renewals(&self) -> Vec<Renewal> {
        self.state().renewals.clone()
    }

    /// Returns the stored [`Product`] with the provided ID.
    pub(crate) fn product(&self, id: product::Id) -> Option<Product> {
        self.state().products.get(&id).cloned()
    }
}

/// Error returned by the broken operations of a [`Mock`].
fn failure() -> Traced<database::Error> {
    tracerr::new!(database::Error::Postgres(postgres::Error::PoolError(
        postgres::connection::PoolError::Closed,
    )))
}

impl Database<Transact> for Mock {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

/// Implements the keyed CRUD [`Database`] operations of an entity.
macro_rules! impl_crud {
    ($entity:ty, $id:ty, $field:ident) => {
        impl Database<Select<By<Option<$entity>, $id>>> for Mock {
            type Ok = Option<$entity>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<$entity>, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                Ok(self.state().$field.get(&by.into_inner()).cloned())
            }
        }

        impl Database<Insert<$entity>> for Mock {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Insert(v): Insert<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                _ = self.state().$field.insert(v.id, v);
                Ok(())
            }
        }

        impl Database<Delete<By<$entity, $id>>> for Mock {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Delete(by): Delete<By<$entity, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                _ = self.state().$field.remove(&by.into_inner());
                Ok(())
            }
        }

        impl Database<Lock<By<$entity, $id>>> for Mock {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                _: Lock<By<$entity, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                Ok(())
            }
        }
    };
}

impl_crud!(Purchase, purchase::Id, purchases);
impl_crud!(Client, client::Id, clients);
impl_crud!(Product, product::Id, products);

impl Database<Update<Purchase>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(p): Update<Purchase>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state.broken_purchases.contains(&p.id) {
            return Err(failure());
        }
        _ = state.purchases.insert(p.id, p);
        Ok(())
    }
}

impl Database<Update<Client>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(c): Update<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.state().clients.insert(c.id, c);
        Ok(())
    }
}

impl Database<Update<Product>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(p): Update<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.state().products.insert(p.id, p);
        Ok(())
    }
}

impl Database<Select<By<Vec<Purchase>, read::purchase::list::Filter>>>
    for Mock
{
    type Ok = Vec<Purchase>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Purchase>, read::purchase::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut list = self
            .state()
            .purchases
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect::<Vec<_>>();
        list.sort_by(|a, b| {
            (b.purchase_date, b.created_at).cmp(&(a.purchase_date, a.created_at))
        });
        Ok(list)
    }
}

impl Database<Select<By<Vec<Client>, read::client::list::Filter>>> for Mock {
    type Ok = Vec<Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Client>, read::client::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut list = self
            .state()
            .clients
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect::<Vec<_>>();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}

impl Database<Select<By<Vec<Product>, read::product::list::Filter>>>
    for Mock
{
    type Ok = Vec<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Product>, read::product::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut list = self
            .state()
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect::<Vec<_>>();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}

impl Database<Insert<Renewal>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(r): Insert<Renewal>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().renewals.push(r);
        Ok(())
    }
}

impl Database<Select<By<Vec<Renewal>, client::Id>>> for Mock {
    type Ok = Vec<Renewal>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Renewal>, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let client_id = by.into_inner();
        Ok(self
            .state()
            .renewals
            .iter()
            .rev()
            .filter(|r| r.client_id == client_id)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<read::RowCounts, ()>>> for Mock {
    type Ok = read::RowCounts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::RowCounts, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state();
        Ok(read::RowCounts {
            purchases: state.purchases.len().try_into().unwrap(),
            clients: state.clients.len().try_into().unwrap(),
            products: state.products.len().try_into().unwrap(),
        })
    }
}
