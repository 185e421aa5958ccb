//! [`Product`]-related read definitions.

use common::Money;

use crate::domain::Product;

pub mod list {
    //! [`Product`] list definitions.

    use crate::domain::Product;

    /// Filter of a [`Product`] list.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Whether the [`Product`]s batch is sold.
        pub sold: Option<bool>,
    }

    impl Filter {
        /// Indicates whether the provided [`Product`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, p: &Product) -> bool {
            self.sold.map_or(true, |sold| sold == p.is_sold())
        }
    }
}

/// Statistics of all the [`Product`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Statistics {
    /// Number of all the [`Product`]s.
    pub total: u32,

    /// Number of sold [`Product`]s.
    pub sold: u32,

    /// Number of [`Product`]s available for sale.
    pub available: u32,

    /// Selling value of the unsold batches.
    pub stock_value: Money,

    /// Selling value of the sold batches.
    pub sold_value: Money,

    /// Profit of the sold batches.
    pub profit: Money,
}

impl Statistics {
    /// Collects the [`Statistics`] of the provided [`Product`]s.
    pub fn of<'p>(products: impl IntoIterator<Item = &'p Product>) -> Self {
        products.into_iter().fold(Self::default(), |mut s, p| {
            s.total += 1;
            if p.is_sold() {
                s.sold += 1;
                s.sold_value += p.batch_total();
                s.profit += p.batch_profit();
            } else {
                s.available += 1;
                s.stock_value += p.batch_total();
            }
            s
        })
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::domain::product::spec::product;

    use super::{list::Filter, Statistics};

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn collects_statistics() {
        let mut sold = product("Scarf", "20.00", "35.00", 2);
        sold.sell();
        let products = [
            sold,
            product("Apron", "10.00", "25.00", 4),
            product("Tote bag", "5.00", "12.50", 1),
        ];

        let stats = Statistics::of(&products);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.sold, 1);
        assert_eq!(stats.available, 2);
        assert_eq!(stats.stock_value, money("112.50"));
        assert_eq!(stats.sold_value, money("70.00"));
        assert_eq!(stats.profit, money("30.00"));
    }

    #[test]
    fn empty_statistics() {
        assert_eq!(Statistics::of([]), Statistics::default());
    }

    #[test]
    fn sold_filter() {
        let mut sold = product("Scarf", "20.00", "35.00", 2);
        sold.sell();
        let unsold = product("Apron", "10.00", "25.00", 4);

        let only_sold = Filter { sold: Some(true) };
        assert!(only_sold.matches(&sold));
        assert!(!only_sold.matches(&unsold));
        assert!(Filter { sold: Some(false) }.matches(&unsold));
        assert!(Filter::default().matches(&sold));
    }
}
