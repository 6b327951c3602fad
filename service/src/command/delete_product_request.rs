//! [`Command`] for deleting a [`ProductRequest`].

use common::operations::Delete;
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{ProductRequest, User};
use crate::{
    domain::{product_request, user},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`ProductRequest`] owned by the specified
/// [`User`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteProductRequest {
    /// ID of the [`ProductRequest`] to delete.
    pub id: product_request::Id,

    /// ID of the [`User`] owning the [`ProductRequest`].
    pub owner_id: user::Id,
}

impl<Db, Ir> Command<DeleteProductRequest> for Service<Db, Ir>
where
    Db: Database<
        Delete<product_request::OwnedId>,
        Ok = bool,
        Err = Traced<database::Error>,
    >,
{
    type Ok = product_request::Id;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProductRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProductRequest { id, owner_id } = cmd;

        let deleted = self
            .database()
            .execute(Delete(product_request::OwnedId { id, owner_id }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !deleted {
            return Err(tracerr::new!(E::NotExists(id)));
        }

        Ok(id)
    }
}

/// Error of [`DeleteProductRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`ProductRequest`] does not exist or is owned by another [`User`].
    #[display("`ProductRequest(id: {_0})` does not exist")]
    #[from(ignore)]
    NotExists(#[error(not(source))] product_request::Id),
}
