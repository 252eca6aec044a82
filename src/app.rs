use anyhow::{Context, Result};
use skycast_auth::{open_store, AlwaysConfirm, Confirmer, Navigator, SessionContext};
use skycast_core::Config;
use skycast_services::{AccountService, AdminView, ApiClient, HistoryView, WeatherView};
use std::path::Path;
use std::sync::Arc;

use crate::terminal::{StdinConfirmer, TerminalNavigator};

/// Wiring of one client instance: config, session and the views.
pub struct App {
    config: Config,
    api: Arc<ApiClient>,
    session: Arc<SessionContext>,
    confirmer: Arc<dyn Confirmer>,
}

impl App {
    /// Load configuration and restore any persisted session.
    ///
    /// With `assume_yes`, destructive actions are not confirmed interactively.
    pub fn new(config_path: Option<&Path>, assume_yes: bool) -> Result<Self> {
        let (config, _) = match config_path {
            Some(path) => Config::load_validated_from(path)?,
            None => Config::load_validated()?,
        };

        let api = ApiClient::new(&config.api).context("Failed to create HTTP client")?;
        let store = open_store(config.auth.credential_store, &config.config_dir);
        let navigator: Arc<dyn Navigator> = Arc::new(TerminalNavigator);
        let session =
            SessionContext::restore(store, navigator).context("Failed to read saved session")?;

        let confirmer: Arc<dyn Confirmer> = if assume_yes {
            Arc::new(AlwaysConfirm)
        } else {
            Arc::new(StdinConfirmer)
        };

        tracing::debug!("Using service at {}", api.base_url());

        Ok(Self {
            config,
            api: Arc::new(api),
            session: Arc::new(session),
            confirmer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> Arc<HistoryView> {
        Arc::new(HistoryView::new(
            self.api.clone(),
            self.session.clone(),
            self.confirmer.clone(),
        ))
    }

    /// Weather view; `hours` and `days` override the configured forecast sizes.
    pub fn weather(&self, hours: Option<usize>, days: Option<usize>) -> WeatherView {
        let mut display = self.config.display.clone();
        if let Some(hours) = hours {
            display.forecast_hours = hours;
        }
        if let Some(days) = days {
            display.forecast_days = days;
        }
        WeatherView::new(
            self.api.clone(),
            self.session.clone(),
            self.history(),
            display,
        )
    }

    pub fn account(&self) -> AccountService {
        AccountService::new(
            self.api.clone(),
            self.session.clone(),
            self.confirmer.clone(),
        )
    }

    pub fn admin(&self) -> AdminView {
        AdminView::new(
            self.api.clone(),
            self.session.clone(),
            self.config.admin.page_size,
        )
    }
}
