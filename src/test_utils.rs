#[cfg(test)]
pub mod test_utils {
    use crate::config::Settings;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use async_trait::async_trait;
    use axum::Router;
    use common::PlantDetails;
    use diagnosis::{EmailMessage, NotifyError, Notifier, PlantIdError, PlantIdentifier, Suggestion};
    use migration::{Migrator, MigratorTrait};
    use moka::future::Cache;
    use sea_orm::{Database, DatabaseConnection};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Identifier answering with a fixed suggestion, or failing when none is set.
    pub struct StubIdentifier {
        suggestion: Option<Suggestion>,
        calls: AtomicUsize,
    }

    impl StubIdentifier {
        pub fn suggesting(plant_name: &str, probability: f64, description: &str) -> Self {
            Self {
                suggestion: Some(Suggestion {
                    plant_name: plant_name.to_string(),
                    probability,
                    details: PlantDetails {
                        description: Some(description.to_string()),
                        ..PlantDetails::default()
                    },
                    similar_images: vec![],
                }),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                suggestion: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlantIdentifier for StubIdentifier {
        async fn identify(&self, _image: &[u8]) -> Result<Suggestion, PlantIdError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.suggestion.clone().ok_or(PlantIdError::UnexpectedStatus(503))
        }

        fn is_configured(&self) -> bool {
            self.suggestion.is_some()
        }
    }

    /// Notifier that keeps every message it is asked to send.
    #[derive(Default)]
    pub struct RecordingNotifier {
        fail: bool,
        sent: Mutex<Vec<EmailMessage>>,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<EmailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(message.clone());
            if self.fail {
                return Err(NotifyError::Rejected {
                    status: 500,
                    body: "mail server down".to_string(),
                });
            }
            Ok(())
        }

        fn is_configured(&self) -> bool {
            !self.fail
        }
    }

    /// Settings with a cheap bcrypt cost and a private upload directory.
    pub fn test_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.bcrypt_cost = 4;
        settings.upload.dir = std::env::temp_dir().join(format!("agrismart-test-{}", uuid::Uuid::new_v4()));
        settings
    }

    /// Create AppState around the given integrations
    pub async fn setup_test_app_state_with(
        identifier: Arc<dyn PlantIdentifier>,
        notifier: Arc<dyn Notifier>,
    ) -> AppState {
        let db = setup_test_db().await;
        let settings = test_settings();
        let reset_tokens = Cache::builder()
            .time_to_live(Duration::from_secs(settings.auth.reset_token_ttl_secs))
            .build();

        AppState {
            db,
            reset_tokens,
            settings: Arc::new(settings),
            identifier,
            notifier,
        }
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        setup_test_app_state_with(
            Arc::new(StubIdentifier::suggesting("Zea mays", 0.91, "Healthy green maize leaves")),
            Arc::new(RecordingNotifier::default()),
        )
        .await
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG and defaults to WARN. The
    /// returned guard removes the subscriber when dropped.
    pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let state = setup_test_app_state().await;
        create_router(state)
    }
}
