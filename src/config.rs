use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub login_delay_ms: u64,
    pub confirm_delay_ms: u64,
    pub booking_window_days: u32,
    pub otp_secret: String,
    pub otp_ttl_secs: i64,
    pub demo_mode: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_var("PORT", 3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| ":memory:".to_string()),
            login_delay_ms: parse_var("LOGIN_DELAY_MS", 1000),
            confirm_delay_ms: parse_var("CONFIRM_DELAY_MS", 1500),
            booking_window_days: parse_var("BOOKING_WINDOW_DAYS", 7),
            otp_secret: env::var("OTP_SECRET").unwrap_or_else(|_| "changeme".to_string()),
            otp_ttl_secs: parse_var("OTP_TTL_SECS", 300),
            demo_mode: env::var("DEMO_MODE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(true),
        }
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
