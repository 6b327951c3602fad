//! [`Command`] for updating a [`ProductRequest`].

use common::{operations::Update, Date};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{product_request::Priority, User};
use crate::{
    domain::{product_request, user, ProductRequest},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating [`Priority`] and the required-by [`Date`] of a
/// [`ProductRequest`] owned by the specified [`User`].
#[derive(Clone, Copy, Debug)]
pub struct UpdateProductRequest {
    /// ID of the [`ProductRequest`] to update.
    pub id: product_request::Id,

    /// ID of the [`User`] owning the [`ProductRequest`].
    pub owner_id: user::Id,

    /// New [`Priority`] of the [`ProductRequest`].
    pub priority: product_request::Priority,

    /// New [`Date`] the requested product is required by.
    pub required_by: Date,
}

impl<Db, Ir> Command<UpdateProductRequest> for Service<Db, Ir>
where
    Db: Database<
        Update<product_request::Patch>,
        Ok = Option<ProductRequest>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ProductRequest;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProductRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProductRequest {
            id,
            owner_id,
            priority,
            required_by,
        } = cmd;

        self.database()
            .execute(Update(product_request::Patch {
                target: product_request::OwnedId { id, owner_id },
                priority,
                required_by,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::NotExists(id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`UpdateProductRequest`] [`Command`] execution.
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
