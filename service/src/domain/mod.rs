//! Domain definitions.

pub mod contact;
pub mod donor;
pub mod password;
pub mod product_request;
pub mod session;
pub mod user;

pub use self::{
    donor::Donor, product_request::ProductRequest, session::Session,
    user::User,
};
