use std::sync::Arc;

use anyhow::Context;
use bookworm_app::{modules, HttpBackend};
use bookworm_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load Bookworm settings")?;
    bookworm_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = %settings.backend.base_url,
        "bookworm bootstrap starting"
    );

    let backend = Arc::new(HttpBackend::new(&settings).context("failed to build API client")?);

    let mut registry = ModuleRegistry::new();
    registry.register_core(bookworm_authz::create_module(&settings.auth));
    modules::register_all(&mut registry, backend, &settings);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_core_modules(&ctx).await?;
    registry.init_custom_modules(&ctx).await?;
    registry.start_core_modules(&ctx).await?;
    registry.start_custom_modules(&ctx).await?;

    let app = bookworm_http::build_router(&registry, &settings);
    let app = bookworm_authz::protect(app, &settings.auth);

    let served = bookworm_http::serve(app, &settings).await;

    registry.stop_custom_modules().await?;
    registry.stop_core_modules().await?;

    served?;
    tracing::info!("bookworm shut down cleanly");
    Ok(())
}
