use clap::{Parser, ValueEnum};
use std::time::Duration;

// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "gpt-cache-gateway")]
#[command(about = "Caching gateway in front of a text-generation API and a key-value store")]
pub struct Args {
    // Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Credentials for the generation API
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub openai_api_key: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com")]
    pub openai_base_url: String,

    // Model used when a request does not name one
    #[arg(short, long, env = "GPT_MODEL", default_value = "gpt-3.5-turbo")]
    pub model: String,

    #[arg(long, env = "GPT_TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f32,

    // Deadline for a single generation call, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 60)]
    pub upstream_timeout: u64,

    // Redis connection string; the in-memory store is used when unset
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    #[arg(long, env = "GPT_TABLE", default_value = "GPT_Transactions")]
    pub gpt_table: String,

    #[arg(long, env = "CONTACTS_TABLE", default_value = "User")]
    pub contacts_table: String,

    #[arg(long, env = "MEMBERSHIP_TABLE", default_value = "Memberships")]
    pub membership_table: String,

    #[arg(long, env = "POWERPLAY_TABLE", default_value = "Powerplays")]
    pub powerplay_table: String,

    // Shared secret for purging the generation cache; purge is refused when unset
    #[arg(long, env = "PURGE_SECRET", hide_env_values = true)]
    pub purge_secret: Option<String>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Args {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_tables() {
        let args = Args::try_parse_from(["gpt-cache-gateway"]).unwrap();
        assert_eq!(args.gpt_table, "GPT_Transactions");
        assert_eq!(args.contacts_table, "User");
        assert_eq!(args.membership_table, "Memberships");
        assert_eq!(args.powerplay_table, "Powerplays");
        assert_eq!(args.model, "gpt-3.5-turbo");
        assert_eq!(args.log_format, LogFormat::Pretty);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "gpt-cache-gateway",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--purge-secret",
            "s3cret",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.bind_addr(), "127.0.0.1:9000");
        assert_eq!(args.purge_secret.as_deref(), Some("s3cret"));
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
