//! [`Handler`] abstractions.

use std::future::Future;

/// Asynchronous handler of `Args`.
///
/// Every command, query and storage operation in the workspace is expressed
/// as an implementation of this trait for the corresponding arguments type.
pub trait Handler<Args = ()> {
    /// Type of a successful [`Handler`] outcome.
    type Ok;

    /// Type of a failed [`Handler`] outcome.
    type Err;

    /// Handles the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
