use anyhow::Context;
use std::fmt;
use std::sync::Arc;

use crate::module::{InitCtx, Module};

/// Core modules run in this order; the HTTP server is started separately
/// once every module is running.
const CORE_MODULE_ORDER: &[&str] = &["auth"];

#[derive(Debug, Clone, Copy)]
enum Phase {
    Init,
    Start,
    Stop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Init => "initialize",
            Phase::Start => "start",
            Phase::Stop => "stop",
        })
    }
}

/// Module registry for managing module lifecycle with core/custom separation
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            custom_modules: Vec::new(),
        }
    }

    /// Register a core module. Core modules only run when listed in the core order.
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        self.core_modules.push(module);
    }

    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// All registered modules, core first.
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        self.core_modules
            .iter()
            .chain(self.custom_modules.iter())
            .collect()
    }

    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules().into_iter().find(|module| module.name() == name)
    }

    pub fn core_module_count(&self) -> usize {
        self.core_modules.len()
    }

    pub fn custom_module_count(&self) -> usize {
        self.custom_modules.len()
    }

    pub async fn init_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing core modules in order: {:?}", CORE_MODULE_ORDER);
        self.run_phase(&self.ordered_core(), "core", Phase::Init, Some(ctx))
            .await
    }

    pub async fn init_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} custom modules", self.custom_modules.len());
        self.run_phase(&self.custom(), "custom", Phase::Init, Some(ctx))
            .await
    }

    pub async fn start_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("starting core modules in order: {:?}", CORE_MODULE_ORDER);
        self.run_phase(&self.ordered_core(), "core", Phase::Start, Some(ctx))
            .await
    }

    pub async fn start_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("starting {} custom modules", self.custom_modules.len());
        self.run_phase(&self.custom(), "custom", Phase::Start, Some(ctx))
            .await
    }

    /// Stop custom modules in reverse registration order.
    pub async fn stop_custom_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping {} custom modules", self.custom_modules.len());
        let mut modules = self.custom();
        modules.reverse();
        self.run_phase(&modules, "custom", Phase::Stop, None).await
    }

    /// Stop core modules in reverse core order.
    pub async fn stop_core_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping core modules in reverse order");
        let mut modules = self.ordered_core();
        modules.reverse();
        self.run_phase(&modules, "core", Phase::Stop, None).await
    }

    fn ordered_core(&self) -> Vec<&Arc<dyn Module>> {
        CORE_MODULE_ORDER
            .iter()
            .filter_map(|&name| self.core_modules.iter().find(|m| m.name() == name))
            .collect()
    }

    fn custom(&self) -> Vec<&Arc<dyn Module>> {
        self.custom_modules.iter().collect()
    }

    async fn run_phase(
        &self,
        modules: &[&Arc<dyn Module>],
        kind: &str,
        phase: Phase,
        ctx: Option<&InitCtx<'_>>,
    ) -> anyhow::Result<()> {
        for module in modules {
            tracing::info!(module = module.name(), %phase, "{kind} module lifecycle");

            let result = match (phase, ctx) {
                (Phase::Init, Some(ctx)) => module.init(ctx).await,
                (Phase::Start, Some(ctx)) => module.start(ctx).await,
                (Phase::Stop, _) => module.stop().await,
                (_, None) => Err(anyhow::anyhow!("{phase} requires an init context")),
            };

            result.with_context(|| {
                format!("failed to {phase} {kind} module '{}'", module.name())
            })?;
        }

        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
