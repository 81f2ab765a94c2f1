//! Builder for creating and configuring Orchestrator instances.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::Orchestrator;
use crate::{
    config::Settings,
    drafter::{DraftingOracle, PlanDrafter},
    error::{OrionError, Result},
    executor::PlanExecutor,
    store::{MemoryPlanStore, PlanStore, SqlitePlanStore},
    tools::{HttpToolInvoker, ToolInvoker},
    webhook::{SubscriptionRegistry, WebhookDispatcher},
};

/// Builder for creating and configuring Orchestrator instances.
///
/// Anything not supplied explicitly is derived from [`Settings`]: the oracle,
/// the HTTP tool invoker, the webhook registry and signing secret, and the
/// timeouts.
#[derive(Default)]
pub struct OrchestratorBuilder {
    settings: Settings,
    database_path: Option<PathBuf>,
    in_memory: bool,
    store: Option<Arc<dyn PlanStore>>,
    oracle: Option<Arc<dyn DraftingOracle>>,
    invoker: Option<Arc<dyn ToolInvoker>>,
    registry: Option<SubscriptionRegistry>,
    tools: Option<Vec<String>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the settings everything else falls back to.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/orion/orion.db` or `~/.local/share/orion/orion.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Keeps plans in memory instead of SQLite.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Uses a caller-provided plan store.
    pub fn with_store(mut self, store: Arc<dyn PlanStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn DraftingOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_invoker(mut self, invoker: Arc<dyn ToolInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    pub fn with_registry(mut self, registry: SubscriptionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Tool names advertised to the drafting oracle.
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the configured orchestrator.
    ///
    /// # Errors
    ///
    /// Returns `OrionError::FileSystem` if the database path or webhook map
    /// is unusable, `OrionError::Database` if database initialization fails,
    /// `OrionError::Configuration` if an HTTP client cannot be built.
    pub async fn build(self) -> Result<Orchestrator> {
        let settings = self.settings;

        let store: Arc<dyn PlanStore> = match (self.store, self.in_memory) {
            (Some(store), _) => store,
            (None, true) => Arc::new(MemoryPlanStore::new()),
            (None, false) => {
                let db_path = match self.database_path {
                    Some(path) => path,
                    None => Self::default_database_path()?,
                };
                Arc::new(SqlitePlanStore::open(db_path).await?)
            }
        };

        let oracle: Arc<dyn DraftingOracle> = match self.oracle {
            Some(oracle) => oracle,
            None => Arc::new(settings.oracle()?),
        };
        let mut drafter = PlanDrafter::new(oracle);
        if let Some(tools) = self.tools {
            drafter = drafter.with_tools(tools);
        }

        let invoker: Arc<dyn ToolInvoker> = match self.invoker {
            Some(invoker) => invoker,
            None => Arc::new(HttpToolInvoker::new(
                settings.tool_base_url.clone(),
                settings.tool_timeout(),
            )?),
        };
        let executor = PlanExecutor::new(invoker).with_idle_delay(settings.idle_delay());

        let registry = match self.registry {
            Some(registry) => registry,
            None => settings.registry()?,
        };
        let mut dispatcher = WebhookDispatcher::new(registry, settings.webhook_timeout())?;
        if let Some(codec) = settings.webhook_codec()? {
            dispatcher = dispatcher.with_signing(codec);
        }

        Ok(Orchestrator::new(drafter, store, executor, dispatcher))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("orion")
            .place_data_file("orion.db")
            .map_err(|e| OrionError::XdgDirectory(e.to_string()))
    }
}
