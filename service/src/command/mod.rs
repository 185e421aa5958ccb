//! [`Command`] definition.

pub mod create_client;
pub mod create_product;
pub mod create_purchase;
pub mod delete_client;
pub mod delete_product;
pub mod delete_purchase;
pub mod pay_card_invoice;
pub mod pay_purchase_installment;
pub mod renew_client;
pub mod sell_product;
pub mod settle_purchase;
pub mod update_client;
pub mod update_product;
pub mod update_purchase;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_client::CreateClient, create_product::CreateProduct,
    create_purchase::CreatePurchase, delete_client::DeleteClient,
    delete_product::DeleteProduct, delete_purchase::DeletePurchase,
    pay_card_invoice::PayCardInvoice,
    pay_purchase_installment::PayPurchaseInstallment,
    renew_client::RenewClient, sell_product::SellProduct,
    settle_purchase::SettlePurchase, update_client::UpdateClient,
    update_product::UpdateProduct, update_purchase::UpdatePurchase,
};
