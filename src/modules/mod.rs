pub mod books;
pub mod shelf;
pub mod users;

use std::sync::Arc;

use bookworm_authz::SessionCookie;
use bookworm_kernel::{settings::Settings, ModuleRegistry};

use crate::backend::BackendApi;
use crate::session::SessionResolver;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    backend: Arc<dyn BackendApi>,
    settings: &Settings,
) {
    let sessions = SessionResolver::new(backend.clone(), SessionCookie::new(&settings.auth));

    registry.register_custom(books::create_module(backend));
    registry.register_custom(shelf::create_module(sessions.clone()));
    registry.register_custom(users::create_module(sessions));
}
