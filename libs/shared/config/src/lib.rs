use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub chat_base_url: String,
    pub chat_bot_token: String,
    pub reconcile_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            chat_base_url: env::var("CHAT_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("CHAT_BASE_URL not set, using empty value");
                    String::new()
                }),
            chat_bot_token: env::var("CHAT_BOT_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("CHAT_BOT_TOKEN not set, using empty value");
                    String::new()
                }),
            reconcile_interval_secs: env::var("RECONCILE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_notification_configured(&self) -> bool {
        !self.chat_base_url.is_empty() && !self.chat_bot_token.is_empty()
    }
}
