pub mod config;
pub mod error;
pub mod preferences;
pub mod request_seq;

pub use config::{
    AdminConfig, ApiConfig, AuthConfig, Config, CredentialBackend, DisplayConfig, ValidationResult,
};
pub use error::{
    AppError, AuthError, ConfigError, IntegrityError, NetworkError, RemoteError, Result,
    ValidationError,
};
pub use preferences::{Role, TemperatureUnit, UserPreferences, WindSpeedUnit};
pub use request_seq::{RequestSequence, Ticket};

/// Initialize logging for the client.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::info!("SkyCast core initialized");
    Ok(())
}
