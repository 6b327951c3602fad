//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of `Args`.
///
/// Every seam of the application is a [`Handler`] of some operation: commands
/// and queries of the service, statements of the database, background tasks,
/// and resolvers of product images. A single type usually implements
/// [`Handler`] for many different `Args`.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
