use dotenvy::dotenv;
use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub typing_ttl_seconds: u64,
    pub presence_ttl_seconds: u64,
    pub upload_url_ttl_seconds: u64,
    pub download_url_ttl_seconds: u64,
    /// Administrative mode: serve history queries with no chat id (all
    /// conversations). Off by default; see routes::messages.
    pub allow_unscoped_history: bool,
    pub s3: Option<S3Config>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL missing".into()))?;
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| AppError::Config("JWT_SECRET missing".into()))?;
        if jwt_secret.len() < 32 {
            return Err(AppError::Config(
                "JWT_SECRET must be at least 32 bytes".into(),
            ));
        }

        let token_ttl_minutes = env_parse("TOKEN_TTL_MINUTES", 12 * 60);
        let typing_ttl_seconds = env_parse("TYPING_TTL_SECONDS", 10);
        let presence_ttl_seconds = env_parse("PRESENCE_TTL_SECONDS", 60);
        let upload_url_ttl_seconds = env_parse("UPLOAD_URL_TTL_SECONDS", 900);
        let download_url_ttl_seconds = env_parse("DOWNLOAD_URL_TTL_SECONDS", 86_400);
        let allow_unscoped_history = env::var("HISTORY_ALLOW_UNSCOPED")
            .unwrap_or_else(|_| "false".to_string())
            .eq_ignore_ascii_case("true");

        let s3 = match env::var("S3_BUCKET") {
            Ok(bucket) if !bucket.trim().is_empty() => {
                let region = env::var("S3_REGION")
                    .map_err(|_| AppError::Config("S3_REGION missing".into()))?;
                let access_key_id = env::var("AWS_ACCESS_KEY_ID")
                    .map_err(|_| AppError::Config("AWS_ACCESS_KEY_ID missing".into()))?;
                let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY")
                    .map_err(|_| AppError::Config("AWS_SECRET_ACCESS_KEY missing".into()))?;
                let endpoint = env::var("S3_ENDPOINT").ok().filter(|e| !e.trim().is_empty());
                Some(S3Config {
                    bucket,
                    region,
                    access_key_id,
                    secret_access_key,
                    endpoint,
                })
            }
            _ => None,
        };

        Ok(Self {
            port,
            database_url,
            redis_url,
            jwt_secret,
            token_ttl_minutes,
            typing_ttl_seconds,
            presence_ttl_seconds,
            upload_url_ttl_seconds,
            download_url_ttl_seconds,
            allow_unscoped_history,
            s3,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            port: 3000,
            database_url: "postgres://localhost/relay_test".into(),
            redis_url: "redis://127.0.0.1:6379/0".into(),
            jwt_secret: "test-secret-test-secret-test-secret!".into(),
            token_ttl_minutes: 60,
            typing_ttl_seconds: 10,
            presence_ttl_seconds: 60,
            upload_url_ttl_seconds: 900,
            download_url_ttl_seconds: 86_400,
            allow_unscoped_history: false,
            s3: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_short_typing_ttl() {
        let cfg = Config::test_defaults();
        // Typing signals must self-clear quickly; presence lives longer.
        assert!(cfg.typing_ttl_seconds < cfg.presence_ttl_seconds);
        assert!(cfg.upload_url_ttl_seconds < cfg.download_url_ttl_seconds);
        assert!(!cfg.allow_unscoped_history);
    }
}
