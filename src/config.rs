use anyhow::Result;
use ::config::{Config, Environment, File};
use diagnosis::{EmailSettings, PlantIdClient, PlantIdSettings, ResendNotifier};
use migration::{Migrator, MigratorTrait};
use moka::future::Cache;
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{debug, info, trace, warn};

use crate::schemas::AppState;

const DEFAULT_JWT_SECRET: &str = "agrismart-development-secret-change-me";

/// Application settings.
///
/// Layered from built-in defaults, an optional `agrismart.toml` in the
/// working directory and `AGRISMART__*` environment variables
/// (`AGRISMART__PLANT_ID__API_KEY`, `AGRISMART__AUTH__JWT_SECRET`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub auth: AuthSettings,
    pub upload: UploadSettings,
    pub plant_id: PlantIdSettings,
    pub email: EmailSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://agrismart.db?mode=rwc".to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            auth: AuthSettings::default(),
            upload: UploadSettings::default(),
            plant_id: PlantIdSettings::default(),
            email: EmailSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    /// Token lifetime, 30 days by default.
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub reset_token_ttl_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: 24 * 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            reset_token_ttl_secs: 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_image_bytes: usize,
    /// Hard limit on request bodies. Kept above `max_image_bytes` so the
    /// pipeline reports oversize images itself.
    pub max_request_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_image_bytes: diagnosis::upload::MAX_IMAGE_BYTES,
            max_request_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Settings {
    /// Loads settings from `.env`, `agrismart.toml` and the environment.
    ///
    /// The unprefixed `PLANT_ID_API_KEY`, `RESEND_API_KEY` and
    /// `JWT_SECRET_KEY` variables are honoured as well.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings: Settings = Config::builder()
            .add_source(File::with_name("agrismart").required(false))
            .add_source(Environment::with_prefix("AGRISMART").separator("__"))
            .set_override_option("plant_id.api_key", std::env::var("PLANT_ID_API_KEY").ok())?
            .set_override_option("email.api_key", std::env::var("RESEND_API_KEY").ok())?
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET_KEY").ok())?
            .build()?
            .try_deserialize()?;

        if settings.auth.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("Using the built-in JWT secret, set AGRISMART__AUTH__JWT_SECRET in production");
        }
        Ok(settings)
    }
}

/// Connects to the database and applies pending migrations.
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    trace!("Applying migrations");
    Migrator::up(&db, None).await?;
    debug!("Database schema is up to date");
    Ok(db)
}

/// Builds the shared state around an open connection.
pub fn build_app_state(db: DatabaseConnection, settings: Settings) -> Result<AppState> {
    let identifier = PlantIdClient::new(settings.plant_id.clone())?;
    let notifier = ResendNotifier::new(settings.email.clone())?;

    if settings.plant_id.api_key().is_none() {
        warn!("Plant.id API key not configured, scans will use fallback results");
    }
    if settings.email.api_key().is_none() {
        info!("Email provider not configured, emails will only be logged");
    }

    let reset_tokens = Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(settings.auth.reset_token_ttl_secs))
        .build();

    Ok(AppState {
        db,
        reset_tokens,
        settings: Arc::new(settings),
        identifier: Arc::new(identifier),
        notifier: Arc::new(notifier),
    })
}

/// Initialize application configuration and state
pub async fn initialize_app_state(settings: Settings) -> Result<AppState> {
    let db = connect_and_migrate(&settings.database_url).await?;
    build_app_state(db, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.auth.token_ttl_hours, 720);
        assert_eq!(settings.upload.max_image_bytes, 10 * 1024 * 1024);
        assert!(settings.upload.max_request_bytes > settings.upload.max_image_bytes);
        assert!(settings.plant_id.api_key().is_none());
    }

    #[test]
    fn partial_sources_fill_in_defaults() {
        let settings: Settings = Config::builder()
            .set_override("bind_address", "127.0.0.1:8080")
            .unwrap()
            .set_override("upload.max_image_bytes", 1024)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.bind_address, "127.0.0.1:8080");
        assert_eq!(settings.upload.max_image_bytes, 1024);
        assert_eq!(settings.upload.dir, PathBuf::from("uploads"));
        assert_eq!(settings.email.app_name, "Agri Smart Detect");
    }
}
