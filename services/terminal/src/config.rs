use std::net::SocketAddr;

use anyhow::Result;

use crate::db::DbConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub dev_mode: bool,
    /// Refuse locations that would not rest on the tier below.
    pub require_stack_support: bool,
    pub database: DbConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr = std::env::var("QUAYSIDE_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let log_level = std::env::var("QUAYSIDE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let dev_mode = env_flag("QUAYSIDE_DEV").unwrap_or(false);

        let require_stack_support = env_flag("QUAYSIDE_REQUIRE_STACK_SUPPORT").unwrap_or(true);

        let database = DbConfig::from_env();

        Ok(Self {
            listen_addr,
            log_level,
            dev_mode,
            require_stack_support,
            database,
        })
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", true)]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("0", false)]
    #[case("false", false)]
    #[case("yes", false)]
    fn test_parse_flag(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(parse_flag(raw), expected);
    }
}
