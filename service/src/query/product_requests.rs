//! [`Query`] collection related to the multiple [`ProductRequest`]s.
//!
//! [`ProductRequest`]: crate::domain::ProductRequest

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::read::product_request::list;

use super::DatabaseQuery;

/// Queries a [`list::Page`] of [`ProductRequest`]s owned by a single [`User`].
///
/// [`ProductRequest`]: crate::domain::ProductRequest
/// [`User`]: crate::domain::User
pub type List = DatabaseQuery<By<list::Page, list::Selector>>;
