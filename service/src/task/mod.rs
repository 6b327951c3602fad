//! Background [`Task`]s definitions.

mod background;
pub mod purge_revoked_sessions;

pub use common::Handler as Task;

pub use self::{
    background::{Background, Failure},
    purge_revoked_sessions::PurgeRevokedSessions,
};
