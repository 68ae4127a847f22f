// Application context
// Built once at start-up and passed to every flow that reads or writes shared state

use crate::api::{HttpRemoteApi, RemoteApi};
use crate::config::ClientConfig;
use crate::navigation::{HistoryNavigator, Navigator};
use crate::notification::{Notifier, ToastCenter};
use crate::search::{DateBounds, JsonFileStorage, SearchContext};
use crate::session::{AuthStatus, SessionStore};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;

/// Source of the current local date.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct AppContext {
    config: ClientConfig,
    api: Arc<dyn RemoteApi>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    session: SessionStore,
    search: SearchContext,
    clock: Clock,
}

/// A running context together with the concrete navigation and toast
/// implementations the UI shell reads from.
pub struct AppHandles {
    pub context: Arc<AppContext>,
    pub navigator: Arc<HistoryNavigator>,
    pub toasts: Arc<ToastCenter>,
}

impl AppContext {
    /// Context pinned to a single day.
    pub fn new(
        config: ClientConfig,
        api: Arc<dyn RemoteApi>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        today: NaiveDate,
    ) -> Self {
        Self::with_clock(config, api, navigator, notifier, Arc::new(move || today))
    }

    pub fn with_clock(
        config: ClientConfig,
        api: Arc<dyn RemoteApi>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        clock: Clock,
    ) -> Self {
        let today = clock();
        let search = match &config.search_state_path {
            Some(path) => SearchContext::with_storage(today, Box::new(JsonFileStorage::new(path))),
            None => SearchContext::new(today),
        };

        Self {
            config,
            api,
            navigator,
            notifier,
            session: SessionStore::new(),
            search,
            clock,
        }
    }

    /// Validates any existing credential so the session leaves `Unknown`.
    pub async fn start(&self) -> AuthStatus {
        let status = self.session.refresh(self.api.as_ref()).await;
        info!(?status, "application context started");
        status
    }

    /// Wires the HTTP client, in-memory history and toast centre from
    /// configuration, then validates the session.
    pub async fn launch(config: ClientConfig) -> anyhow::Result<AppHandles> {
        config.validate()?;
        let api = Arc::new(HttpRemoteApi::new(&config)?);
        let navigator = Arc::new(HistoryNavigator::default());
        let toasts = Arc::new(ToastCenter::new(config.toast_duration()));

        let context = Arc::new(Self::with_clock(
            config,
            api,
            navigator.clone(),
            toasts.clone(),
            Arc::new(|| Local::now().date_naive()),
        ));
        context.start().await;

        Ok(AppHandles {
            context,
            navigator,
            toasts,
        })
    }

    pub async fn launch_from_env() -> anyhow::Result<AppHandles> {
        let config = ClientConfig::from_env()?;
        Self::launch(config).await
    }

    pub fn shutdown(self) {
        info!(
            authenticated = ?self.session.status().is_authenticated(),
            destination = %self.search.read().destination,
            "application context shut down"
        );
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &dyn RemoteApi {
        self.api.as_ref()
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn search(&self) -> &SearchContext {
        &self.search
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    // Recomputed on every call so a long-running session rolls over at midnight
    pub fn date_bounds(&self) -> DateBounds {
        DateBounds::from_today(self.today())
    }
}
