use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;

use crate::domain::local_time::parse_utc_offset;
use crate::infrastructure::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub supabase_url: String,
    pub supabase_secret_key: String,
    pub post_photos_bucket: String,
    pub timelapse_bucket: String,
    pub storage_request_timeout_secs: u64,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
    pub ffmpeg_bin: String,
    pub encoder_threads: usize,
    pub local_utc_offset: FixedOffset,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = Env { lookup };

        let database_url = env.required("DATABASE_URL")?;
        let supabase_url = env.required("SUPABASE_URL")?;
        let supabase_secret_key = env.required("SUPABASE_SECRET_KEY")?;

        let db_max_connections = env.parse_positive("DB_MAX_CONNECTIONS", 5u32)?;
        let run_migrations = env.parse_bool("RUN_MIGRATIONS", false)?;
        let post_photos_bucket = env.or_default("POST_PHOTOS_BUCKET", "post_photos");
        let timelapse_bucket = env.or_default("TIMELAPSE_BUCKET", "timelapses");
        let storage_request_timeout_secs =
            env.parse_positive("STORAGE_REQUEST_TIMEOUT_SECS", 30u64)?;

        let http_addr = env.or_default("HTTP_ADDR", "0.0.0.0:8000");
        let cors_origins = parse_cors_origins(&env.or_default(
            "CORS_ORIGINS",
            "http://localhost:3000,https://emolog-psi.vercel.app",
        ));
        let log_level = env
            .get("LOG_LEVEL")
            .or_else(|| env.get("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());
        let raw_log_format = env.or_default("LOG_FORMAT", "compact");
        let log_format = LogFormat::parse(&raw_log_format)
            .ok_or_else(|| anyhow!("LOG_FORMAT must be 'compact' or 'json', got '{raw_log_format}'"))?;
        let http_request_body_limit_bytes =
            env.parse_positive("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024usize)?;
        let http_concurrency_limit = env.parse_positive("HTTP_CONCURRENCY_LIMIT", 64usize)?;
        let http_request_timeout_secs = env.parse_positive("HTTP_REQUEST_TIMEOUT_SECS", 120u64)?;

        let ffmpeg_bin = env.or_default("FFMPEG_BIN", "ffmpeg");
        let encoder_threads = env.parse_positive("ENCODER_THREADS", 2usize)?;

        let raw_offset = env.or_default("LOCAL_UTC_OFFSET", "+09:00");
        let local_utc_offset = parse_utc_offset(&raw_offset)
            .ok_or_else(|| anyhow!("LOCAL_UTC_OFFSET must look like +09:00, got '{raw_offset}'"))?;

        Ok(Self {
            database_url,
            db_max_connections,
            run_migrations,
            supabase_url,
            supabase_secret_key,
            post_photos_bucket,
            timelapse_bucket,
            storage_request_timeout_secs,
            http_addr,
            cors_origins,
            log_level,
            log_format,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
            ffmpeg_bin,
            encoder_threads,
            local_utc_offset,
        })
    }
}

struct Env<F: Fn(&str) -> Option<String>> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.get(key)
            .ok_or_else(|| anyhow!("{key} is required and must not be empty"))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_positive<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + PartialEq + Default + Copy,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let value = match self.get(key) {
            Some(raw) => raw
                .parse::<T>()
                .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?,
            None => default,
        };

        if value == T::default() {
            return Err(anyhow!("{key} must be > 0"));
        }
        Ok(value)
    }

    fn parse_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key).map(|raw| raw.to_ascii_lowercase()) {
            None => Ok(default),
            Some(raw) => match raw.as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(anyhow!("{key} must be a boolean, got '{raw}'")),
            },
        }
    }
}

fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
