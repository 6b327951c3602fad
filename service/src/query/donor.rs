//! [`Query`] collection related to a single [`Donor`].

use common::operations::By;

use crate::domain::{donor, Donor};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Donor`] by its [`donor::Id`].
///
/// Resolves to [`None`] if no [`Donor`] has the [`donor::Id`].
pub type ById = DatabaseQuery<By<Option<Donor>, donor::Id>>;
