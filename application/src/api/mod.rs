//! GraphQL API definitions.

pub mod donor;
mod mutation;
pub mod product_request;
mod query;
pub mod scalar;
pub mod session;
mod subscription;
pub mod user;

use crate::define_error;

pub use self::{
    donor::Donor, mutation::Mutation, product_request::ProductRequest,
    query::Query, subscription::Subscription, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PaginationError {
        #[code = "INVALID_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Page must be positive and limit must be in 1..=100 range"]
        Invalid,
    }
}
