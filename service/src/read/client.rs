//! [`Client`]-related read definitions.

#[cfg(doc)]
use crate::domain::Client;

pub mod list {
    //! [`Client`] list definitions.

    use crate::domain::{client, Client};

    /// Filter of a [`Client`] list.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`client::Name`] (or its part) to fuzzy search for.
        pub name: Option<client::Name>,

        /// [`client::Status`] of the [`Client`]s.
        pub status: Option<client::Status>,
    }

    impl Filter {
        /// Indicates whether the provided [`Client`] passes this [`Filter`].
        ///
        /// A [`Client`] matches the [`Filter::name`] if its name contains any
        /// of the searched words, ignoring case.
        #[must_use]
        pub fn matches(&self, c: &Client) -> bool {
            let name_matches = self.name.as_ref().map_or(true, |n| {
                let name = AsRef::<str>::as_ref(&c.name).to_lowercase();
                AsRef::<str>::as_ref(n)
                    .split_whitespace()
                    .any(|word| name.contains(&word.to_lowercase()))
            });
            name_matches && self.status.map_or(true, |s| s == c.status)
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{client, Client};

    use super::list::Filter;

    fn client(name: &str, status: client::Status) -> Client {
        Client {
            id: client::Id::new(),
            name: client::Name::new(name).unwrap(),
            phone: client::Phone::new("11987654321").unwrap(),
            plan_price: "35.00".parse().unwrap(),
            kind: client::Kind::new("customer").unwrap(),
            plan: client::Plan::new("monthly").unwrap(),
            due_date: "2024-03-10".parse().unwrap(),
            reseller: None,
            server: client::Server::new("alpha").unwrap(),
            notes: None,
            status,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn fuzzy_name_search() {
        let maria = client("Maria da Silva", client::Status::Active);
        let joao = client("João Souza", client::Status::Active);

        let filter = Filter {
            name: client::Name::new("SILVA pereira"),
            status: None,
        };
        assert!(filter.matches(&maria));
        assert!(!filter.matches(&joao));

        let filter = Filter {
            name: client::Name::new("joão"),
            status: None,
        };
        assert!(filter.matches(&joao));
    }

    #[test]
    fn status_filter() {
        let active = client("Maria", client::Status::Active);
        let inactive = client("Maria", client::Status::Inactive);

        let filter = Filter {
            name: None,
            status: Some(client::Status::Inactive),
        };
        assert!(!filter.matches(&active));
        assert!(filter.matches(&inactive));
        assert!(Filter::default().matches(&active));
    }
}
