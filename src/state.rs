use std::sync::Arc;

use sqlx::PgPool;

use crate::assets::cloudinary::CloudinaryStore;
use crate::assets::AssetStore;
use crate::config::Config;
use crate::email::{QuoteNotifier, SystemMailer};
use crate::rate_limit::{LoginRateLimiter, SubmissionRateLimiter};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    /// `None` when the asset store is not configured; uploads then fail.
    pub assets: Option<Arc<dyn AssetStore>>,
    /// `None` when SMTP is not configured; quotes are still accepted.
    pub notifier: Option<Arc<dyn QuoteNotifier>>,
    pub submission_limiter: SubmissionRateLimiter,
    pub login_limiter: LoginRateLimiter,
}

impl AppState {
    /// Build the collaborators described by `config`.
    pub fn from_config(pool: PgPool, config: Config) -> Self {
        let assets = config.cloudinary.clone().and_then(|c| {
            match CloudinaryStore::new(c) {
                Ok(store) => {
                    tracing::info!("Asset store configured");
                    Some(Arc::new(store) as Arc<dyn AssetStore>)
                }
                Err(e) => {
                    tracing::warn!("Asset store not available: {e}");
                    None
                }
            }
        });
        if assets.is_none() {
            tracing::warn!("Asset store not configured; image uploads will be rejected");
        }

        let notifier = config.smtp.as_ref().and_then(|smtp| {
            match SystemMailer::new(smtp, &config.notify_email) {
                Ok(mailer) => {
                    tracing::info!("System SMTP configured");
                    Some(Arc::new(mailer) as Arc<dyn QuoteNotifier>)
                }
                Err(e) => {
                    tracing::warn!("System SMTP not available: {e}");
                    None
                }
            }
        });

        Self {
            pool,
            config,
            assets,
            notifier,
            submission_limiter: SubmissionRateLimiter::default(),
            login_limiter: LoginRateLimiter::new(),
        }
    }
}
