//! [`Command`] definition.

pub mod authorize_session;
pub mod create_donor;
pub mod create_product_request;
pub mod create_session;
pub mod create_user;
pub mod delete_product_request;
pub mod revoke_session;
pub mod update_product_request;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_session::AuthorizeSession, create_donor::CreateDonor,
    create_product_request::CreateProductRequest,
    create_session::CreateSession, create_user::CreateUser,
    delete_product_request::DeleteProductRequest,
    revoke_session::RevokeSession,
    update_product_request::UpdateProductRequest,
};
