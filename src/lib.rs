//! Bookworm application library: catalog, shelves, and users on top of the
//! external book API.

pub mod backend;
pub mod modules;
pub mod session;
pub mod utils;

pub use backend::{BackendApi, HttpBackend};
pub use session::{Session, SessionResolver};
