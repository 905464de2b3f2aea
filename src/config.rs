use dotenvy::dotenv;
use std::env;

use crate::engine::LeavePolicy;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Decision thresholds for the rule evaluator.
    pub policy: LeavePolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_register_per_min: env::var("RATE_REGISTER_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            policy: policy_from_env(),
        }
    }
}

/// Policy thresholds default to the fixed business rules; each one can be
/// overridden with a POLICY_* env var.
fn policy_from_env() -> LeavePolicy {
    let defaults = LeavePolicy::default();

    LeavePolicy {
        max_leave_days: env_or("POLICY_MAX_LEAVE_DAYS", defaults.max_leave_days),
        workday_hours: env_or("POLICY_WORKDAY_HOURS", defaults.workday_hours),
        team_absence_reject_pct: env_or(
            "POLICY_TEAM_ABSENCE_REJECT_PCT",
            defaults.team_absence_reject_pct,
        ),
        fast_track_max_days: env_or("POLICY_FAST_TRACK_MAX_DAYS", defaults.fast_track_max_days),
        fast_track_absence_pct: env_or(
            "POLICY_FAST_TRACK_ABSENCE_PCT",
            defaults.fast_track_absence_pct,
        ),
        fast_track_impact: env_or("POLICY_FAST_TRACK_IMPACT", defaults.fast_track_impact),
        high_impact: env_or("POLICY_HIGH_IMPACT", defaults.high_impact),
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
