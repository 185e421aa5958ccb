//! [`Purchase`]-related read definitions.

#[cfg(doc)]
use crate::domain::Purchase;

pub mod list {
    //! [`Purchase`] list definitions.

    use crate::domain::purchase;
    #[cfg(doc)]
    use crate::domain::Purchase;

    /// Filter of a [`Purchase`] list.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`purchase::Card`] the [`Purchase`]s were charged on.
        pub card: Option<purchase::Card>,

        /// [`purchase::Status`] of the [`Purchase`]s.
        pub status: Option<purchase::Status>,
    }

    impl Filter {
        /// Indicates whether the provided [`Purchase`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, p: &purchase::Purchase) -> bool {
            self.card.as_ref().map_or(true, |c| *c == p.card)
                && self.status.map_or(true, |s| s == p.status)
        }
    }
}

pub mod invoice {
    //! Card invoice definitions, derived from the pending [`Purchase`]s.

    use std::{collections::BTreeMap, num::NonZeroU16};

    use common::Money;

    use crate::domain::{
        purchase::{self, InvoicePeriod},
        Purchase,
    };

    /// Invoice of a single [`purchase::Card`] for a single [`InvoicePeriod`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Group {
        /// [`purchase::Card`] this [`Group`] is issued for.
        pub card: purchase::Card,

        /// [`InvoicePeriod`] this [`Group`] is issued for.
        pub period: InvoicePeriod,

        /// Total amount of all the [`LineItem`]s.
        pub total: Money,

        /// [`LineItem`]s of this [`Group`].
        pub items: Vec<LineItem>,
    }

    /// Single installment billed in an invoice [`Group`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct LineItem {
        /// ID of the billed [`Purchase`].
        pub purchase_id: purchase::Id,

        /// [`purchase::Name`] of the billed [`Purchase`].
        pub name: purchase::Name,

        /// 1-based number of the billed installment.
        pub installment: u16,

        /// Total number of installments of the billed [`Purchase`].
        pub count: NonZeroU16,

        /// Billed amount.
        pub amount: Money,
    }

    /// Groups the next unpaid installments of the provided [`Purchase`]s by
    /// their [`purchase::Card`] and [`InvoicePeriod`].
    ///
    /// Only pending [`Purchase`]s with installments left are considered. The
    /// returned [`Group`]s are ordered by [`purchase::Card`], then by
    /// [`InvoicePeriod`].
    pub fn group<'p>(
        purchases: impl IntoIterator<Item = &'p Purchase>,
    ) -> Vec<Group> {
        let mut groups =
            BTreeMap::<(purchase::Card, InvoicePeriod), Group>::new();

        for p in purchases {
            if p.status != purchase::Status::Pending
                || p.installments_remaining() == 0
            {
                continue;
            }

            let period = p.next_invoice_period();
            let group = groups
                .entry((p.card.clone(), period))
                .or_insert_with(|| Group {
                    card: p.card.clone(),
                    period,
                    total: Money::ZERO,
                    items: vec![],
                });
            group.total += p.installment_amount;
            group.items.push(LineItem {
                purchase_id: p.id,
                name: p.name.clone(),
                installment: p.installments_paid + 1,
                count: p.installment_count,
                amount: p.installment_amount,
            });
        }

        groups.into_values().collect()
    }

    /// Selects the [`Purchase`]s whose next invoice is the one of the provided
    /// `card` and `period`.
    pub fn plan<'p>(
        purchases: impl IntoIterator<Item = &'p Purchase>,
        card: &purchase::Card,
        period: InvoicePeriod,
    ) -> Vec<purchase::Id> {
        purchases
            .into_iter()
            .filter(|p| p.card == *card && p.is_billed_in(period))
            .map(|p| p.id)
            .collect()
    }
}

pub mod summary {
    //! Aggregated [`Purchase`] statistics.

    use std::collections::HashMap;

    use common::Money;

    use crate::domain::{purchase, Purchase};

    /// Statistics of the [`Purchase`]s charged on a single
    /// [`purchase::Card`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct CardSummary {
        /// [`purchase::Card`] this [`CardSummary`] is about.
        pub card: purchase::Card,

        /// Number of [`Purchase`]s.
        pub purchases: u32,

        /// Total amount of the [`Purchase`]s.
        pub total: Money,

        /// Total number of installments.
        pub installments_total: u32,

        /// Number of paid installments.
        pub installments_paid: u32,

        /// Number of installments still to be paid.
        pub installments_pending: u32,

        /// Amount already paid.
        pub amount_paid: Money,

        /// Amount still to be paid.
        pub amount_open: Money,
    }

    impl CardSummary {
        /// Creates an empty [`CardSummary`] of the provided
        /// [`purchase::Card`].
        #[must_use]
        pub fn empty(card: purchase::Card) -> Self {
            Self {
                card,
                purchases: 0,
                total: Money::ZERO,
                installments_total: 0,
                installments_paid: 0,
                installments_pending: 0,
                amount_paid: Money::ZERO,
                amount_open: Money::ZERO,
            }
        }

        /// Accounts the provided [`Purchase`] in this [`CardSummary`].
        fn add(&mut self, p: &Purchase) {
            self.purchases += 1;
            self.total += p.total_amount;
            self.installments_total += u32::from(p.installment_count.get());
            self.installments_paid += u32::from(p.installments_paid);
            if p.status == purchase::Status::Pending {
                self.installments_pending +=
                    u32::from(p.installments_remaining());
                self.amount_paid += p.amount_paid;
                self.amount_open += p.amount_open;
            } else {
                self.amount_paid += p.total_amount;
            }
        }
    }

    /// Builds [`CardSummary`]s of the provided [`Purchase`]s.
    ///
    /// Every one of the `known` [`purchase::Card`]s is present in the result
    /// (in the given order), even without any [`Purchase`]. Other
    /// [`purchase::Card`]s follow, ordered by name.
    pub fn by_card<'p>(
        known: &[purchase::Card],
        purchases: impl IntoIterator<Item = &'p Purchase>,
    ) -> Vec<CardSummary> {
        let mut summaries = known
            .iter()
            .cloned()
            .map(CardSummary::empty)
            .collect::<Vec<_>>();
        let mut index = summaries
            .iter()
            .enumerate()
            .map(|(i, s)| (s.card.clone(), i))
            .collect::<HashMap<_, _>>();
        let known_len = summaries.len();

        for p in purchases {
            let i = *index.entry(p.card.clone()).or_insert_with(|| {
                summaries.push(CardSummary::empty(p.card.clone()));
                summaries.len() - 1
            });
            summaries[i].add(p);
        }

        summaries[known_len..].sort_by(|a, b| a.card.cmp(&b.card));
        summaries
    }

    /// Overall statistics of all the [`Purchase`]s.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Overview {
        /// Total amount of all the [`Purchase`]s.
        pub total_spent: Money,

        /// Amount still to be paid.
        pub total_open: Money,

        /// Amount already paid.
        pub total_paid: Money,

        /// Number of all the [`Purchase`]s.
        pub purchases: u32,

        /// Number of pending [`Purchase`]s.
        pub pending: u32,

        /// Number of paid [`Purchase`]s.
        pub paid: u32,

        /// Per-[`purchase::Card`] breakdown, ordered by name.
        pub cards: Vec<CardSummary>,
    }

    impl Overview {
        /// Builds the [`Overview`] of the provided [`Purchase`]s.
        pub fn of<'p>(
            purchases: impl IntoIterator<Item = &'p Purchase> + Clone,
        ) -> Self {
            let mut this = Self {
                total_spent: Money::ZERO,
                total_open: Money::ZERO,
                total_paid: Money::ZERO,
                purchases: 0,
                pending: 0,
                paid: 0,
                cards: by_card(&[], purchases.clone()),
            };
            for p in purchases {
                this.total_spent += p.total_amount;
                this.purchases += 1;
                if p.status == purchase::Status::Pending {
                    this.total_open += p.amount_open;
                    this.total_paid += p.amount_paid;
                    this.pending += 1;
                } else {
                    this.total_paid += p.total_amount;
                    this.paid += 1;
                }
            }
            this
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::domain::purchase::{self, fixture::purchase, InvoicePeriod};

    use super::{invoice, list, summary};

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn card(name: &str) -> purchase::Card {
        purchase::Card::new(name).unwrap()
    }

    fn period(year: i32, month: u8) -> InvoicePeriod {
        InvoicePeriod::new(year, month).unwrap()
    }

    #[test]
    fn groups_by_card_and_period() {
        let mut paid_once = purchase("Nubank", "200.00", 2, "2024-02-20");
        _ = paid_once.pay_next_installment().unwrap();
        let mut settled = purchase("Nubank", "80.00", 1, "2024-03-01");
        settled.settle();

        let purchases = [
            purchase("Santander", "90.00", 3, "2024-03-05"),
            purchase("Nubank", "300.00", 3, "2024-03-15"),
            paid_once,
            purchase("Nubank", "40.00", 2, "2024-04-01"),
            settled,
        ];

        let groups = invoice::group(&purchases);

        let keys = groups
            .iter()
            .map(|g| (g.card.to_string(), g.period))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            [
                ("Nubank".to_owned(), period(2024, 3)),
                ("Nubank".to_owned(), period(2024, 4)),
                ("Santander".to_owned(), period(2024, 3)),
            ],
        );

        let march = &groups[0];
        assert_eq!(march.total, money("200.00"));
        assert_eq!(march.items.len(), 2);
        assert_eq!(march.items[0].purchase_id, purchases[1].id);
        assert_eq!(march.items[0].installment, 1);
        assert_eq!(march.items[1].purchase_id, purchases[2].id);
        assert_eq!(march.items[1].installment, 2);

        assert_eq!(groups[1].total, money("20.00"));
        assert_eq!(groups[2].total, money("30.00"));
    }

    #[test]
    fn skips_exhausted_but_pending() {
        let mut p = purchase("Nubank", "100.00", 2, "2024-01-10");
        p.installments_paid = 2;

        assert!(invoice::group([&p]).is_empty());
    }

    #[test]
    fn plans_only_matching_period() {
        let due_now = purchase("X", "100.00", 2, "2024-03-10");
        let due_later = purchase("X", "100.00", 2, "2024-04-10");
        let other_card = purchase("Y", "100.00", 2, "2024-03-10");
        let purchases = [due_now.clone(), due_later, other_card];

        let ids = invoice::plan(&purchases, &card("X"), period(2024, 3));

        assert_eq!(ids, [due_now.id]);
        assert!(
            invoice::plan(&purchases, &card("X"), period(2024, 6)).is_empty()
        );
    }

    #[test]
    fn summary_is_seeded_with_known_cards() {
        let mut paid = purchase("Renner", "60.00", 2, "2024-01-10");
        paid.settle();
        let mut partial = purchase("Nubank", "300.00", 3, "2024-01-10");
        _ = partial.pay_next_installment().unwrap();
        let purchases =
            [partial, paid, purchase("Amazon", "10.00", 1, "2024-01-10")];

        let summaries = summary::by_card(
            &[card("Santander"), card("Nubank"), card("Renner")],
            &purchases,
        );

        let cards = summaries
            .iter()
            .map(|s| s.card.to_string())
            .collect::<Vec<_>>();
        assert_eq!(cards, ["Santander", "Nubank", "Renner", "Amazon"]);

        assert_eq!(summaries[0], summary::CardSummary::empty(card("Santander")));

        let nubank = &summaries[1];
        assert_eq!(nubank.purchases, 1);
        assert_eq!(nubank.total, money("300.00"));
        assert_eq!(nubank.installments_total, 3);
        assert_eq!(nubank.installments_paid, 1);
        assert_eq!(nubank.installments_pending, 2);
        assert_eq!(nubank.amount_paid, money("100.00"));
        assert_eq!(nubank.amount_open, money("200.00"));

        let renner = &summaries[2];
        assert_eq!(renner.installments_pending, 0);
        assert_eq!(renner.amount_paid, money("60.00"));
        assert_eq!(renner.amount_open, Money::ZERO);
    }

    #[test]
    fn overview_totals() {
        let mut paid = purchase("Renner", "60.00", 2, "2024-01-10");
        paid.settle();
        let mut partial = purchase("Nubank", "300.00", 3, "2024-01-10");
        _ = partial.pay_next_installment().unwrap();
        let purchases = [partial, paid];

        let overview = summary::Overview::of(&purchases);

        assert_eq!(overview.total_spent, money("360.00"));
        assert_eq!(overview.total_paid, money("160.00"));
        assert_eq!(overview.total_open, money("200.00"));
        assert_eq!(overview.purchases, 2);
        assert_eq!(overview.pending, 1);
        assert_eq!(overview.paid, 1);
        assert_eq!(overview.cards.len(), 2);
        assert_eq!(overview.cards[0].card, card("Nubank"));
    }

    #[test]
    fn list_filter() {
        let mut paid = purchase("Renner", "60.00", 2, "2024-01-10");
        paid.settle();
        let pending = purchase("Renner", "60.00", 2, "2024-01-10");

        let filter = list::Filter {
            card: Some(card("Renner")),
            status: Some(purchase::Status::Paid),
        };
        assert!(filter.matches(&paid));
        assert!(!filter.matches(&pending));
        assert!(list::Filter::default().matches(&pending));
        assert!(!list::Filter {
            card: Some(card("Nubank")),
            status: None,
        }
        .matches(&pending));
    }
}
