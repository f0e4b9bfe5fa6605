//! Portal page use cases.
//!
//! Each use case borrows the shared repository and exposes an `execute`
//! method. They are cheap to build and are created per request.

mod create;
mod find;
mod list;
mod update;

pub use create::*;
pub use find::*;
pub use list::*;
pub use update::*;

use crate::error::ApplicationError;

pub type Result<T> = std::result::Result<T, ApplicationError>;

/// Identifier of a created or updated portal page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortalPageId {
    pub id: i64,
}
