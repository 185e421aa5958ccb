//! Read entities definitions.

pub mod client;
pub mod product;
pub mod purchase;
pub mod status;

pub use self::status::RowCounts;
