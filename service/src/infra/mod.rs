//! Infrastructure layer.

pub mod database;
pub mod image;
pub mod revocation;

#[cfg(test)]
pub use self::{database::Memory, image::Stub};
pub use self::{
    database::Database, image::ImageResolver, revocation::Revocations,
};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
#[cfg(feature = "scraper")]
pub use self::image::{scraper, Scraper};
