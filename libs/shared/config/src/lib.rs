use std::env;
use std::str::FromStr;
use tracing::warn;

/// Where appointment, schedule and staff records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgREST tables behind `SUPABASE_URL`.
    Supabase,
    /// In-process tables, lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "supabase" | "postgrest" => Ok(StorageBackend::Supabase),
            "memory" | "in-memory" | "in_memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub storage_backend: StorageBackend,
    pub booking_max_attempts: u32,
    pub booking_retry_backoff_ms: u64,
    pub schedule_range_max_days: i64,
    pub access_token_ttl_minutes: i64,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            storage_backend: StorageBackend::Memory,
            booking_max_attempts: 3,
            booking_retry_backoff_ms: 25,
            schedule_range_max_days: 90,
            access_token_ttl_minutes: 480,
            port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            });
        let supabase_anon_key = env::var("SUPABASE_ANON_PUBLIC_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                String::new()
            });
        let supabase_jwt_secret = env::var("SUPABASE_JWT_SECRET")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_JWT_SECRET not set, using empty value");
                String::new()
            });

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse().unwrap_or_else(|e: String| {
                warn!("{}, falling back to in-memory storage", e);
                StorageBackend::Memory
            }),
            Err(_) if !supabase_url.is_empty() && !supabase_anon_key.is_empty() => {
                StorageBackend::Supabase
            }
            Err(_) => {
                warn!("STORAGE_BACKEND not set and Supabase not configured, using in-memory storage");
                StorageBackend::Memory
            }
        };

        let config = Self {
            supabase_url,
            supabase_anon_key,
            supabase_jwt_secret,
            storage_backend,
            booking_max_attempts: parse_or("BOOKING_MAX_ATTEMPTS", defaults.booking_max_attempts),
            booking_retry_backoff_ms: parse_or("BOOKING_RETRY_BACKOFF_MS", defaults.booking_retry_backoff_ms),
            schedule_range_max_days: parse_or("SCHEDULE_RANGE_MAX_DAYS", defaults.schedule_range_max_days),
            access_token_ttl_minutes: parse_or("ACCESS_TOKEN_TTL_MINUTES", defaults.access_token_ttl_minutes),
            port: parse_or("PORT", defaults.port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        let storage_ready = match self.storage_backend {
            StorageBackend::Supabase => {
                !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
            }
            StorageBackend::Memory => true,
        };

        storage_ready && !self.supabase_jwt_secret.is_empty()
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
