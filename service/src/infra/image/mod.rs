//! [`ImageResolver`]-related implementations.

#[cfg(feature = "scraper")]
pub mod scraper;
#[cfg(test)]
pub mod stub;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "scraper")]
pub use self::scraper::Scraper;
#[cfg(test)]
pub use self::stub::Stub;

/// Operation resolving an image representing a product.
pub use common::Handler as ImageResolver;

/// [`ImageResolver`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "scraper")]
    /// [`Scraper`] error.
    Scraper(scraper::Error),

    #[cfg(test)]
    /// [`Stub`] error.
    Stub(stub::Error),
}
