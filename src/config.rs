use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    pub upload_delay: Duration,
    pub notify_email: String,
    pub smtp: Option<SmtpConfig>,
    pub cloudinary: Option<CloudinaryConfig>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let jwt_ttl = parse_ttl(&env_or("JWT_EXPIRES_IN", "1d"))
            .map_err(|e| format!("Invalid JWT_EXPIRES_IN: {e}"))?;

        let host: IpAddr = env_or("PORTFOLIO_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PORTFOLIO_HOST: {e}"))?;

        let port: u16 = env_or("PORTFOLIO_PORT", "4000")
            .parse()
            .map_err(|e| format!("Invalid PORTFOLIO_PORT: {e}"))?;

        // 10 files of 5MB plus form fields and multipart framing
        let max_body_size: usize = env_or("PORTFOLIO_MAX_BODY_SIZE", "57671680")
            .parse()
            .map_err(|e| format!("Invalid PORTFOLIO_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("PORTFOLIO_LOG_LEVEL", "info");

        let upload_delay_ms: u64 = env_or("PORTFOLIO_UPLOAD_DELAY_MS", "500")
            .parse()
            .map_err(|e| format!("Invalid PORTFOLIO_UPLOAD_DELAY_MS: {e}"))?;

        let notify_email = env_or("ADMIN_EMAIL", "admin@example.com");

        let smtp = match (
            std::env::var("PORTFOLIO_SMTP_HOST").ok(),
            std::env::var("PORTFOLIO_SMTP_PORT").ok(),
            std::env::var("PORTFOLIO_SMTP_USER").ok(),
            std::env::var("PORTFOLIO_SMTP_PASS").ok(),
            std::env::var("PORTFOLIO_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid PORTFOLIO_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        let cloudinary = match (
            std::env::var("CLOUDINARY_CLOUD_NAME").ok(),
            std::env::var("CLOUDINARY_API_KEY").ok(),
            std::env::var("CLOUDINARY_API_SECRET").ok(),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                folder: env_or("CLOUDINARY_FOLDER", "portfolio/projects"),
            }),
            _ => None,
        };

        let bootstrap_admin = match (
            std::env::var("PORTFOLIO_BOOTSTRAP_ADMIN_EMAIL").ok(),
            std::env::var("PORTFOLIO_BOOTSTRAP_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password,
                name: env_or("PORTFOLIO_BOOTSTRAP_ADMIN_NAME", "System Administrator"),
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_ttl,
            host,
            port,
            max_body_size,
            log_level,
            upload_delay: Duration::from_millis(upload_delay_ms),
            notify_email,
            smtp,
            cloudinary,
            bootstrap_admin,
        })
    }
}

/// Parse a token lifetime such as `1d`, `12h`, `30m`, `45s` or bare seconds.
pub fn parse_ttl(value: &str) -> Result<chrono::Duration, String> {
    let value = value.trim();
    let (digits, unit) = match value.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&value[..idx], Some(c)),
        Some(_) => (value, None),
        None => return Err("empty duration".to_string()),
    };

    let amount: i64 = digits
        .parse()
        .map_err(|_| format!("'{value}' is not a duration"))?;
    if amount <= 0 {
        return Err(format!("'{value}' must be positive"));
    }

    let ttl = match unit {
        Some('d') => chrono::Duration::try_days(amount),
        Some('h') => chrono::Duration::try_hours(amount),
        Some('m') => chrono::Duration::try_minutes(amount),
        Some('s') | None => chrono::Duration::try_seconds(amount),
        Some(other) => return Err(format!("unknown duration unit '{other}'")),
    };

    // Token expiry is computed as now + ttl, so it must fit in a timestamp.
    ttl.filter(|ttl| chrono::Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| format!("'{value}' is out of range"))
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
