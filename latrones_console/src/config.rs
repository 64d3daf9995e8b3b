use std::time::Duration;

use anyhow::Context;
use latrones_client::settings::GameSettings;
use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    // Can also be given on the command line, which takes precedence.
    pub server_address: Option<String>,
    // Pre-filled into the settings form; applied with "restart".
    pub settings: Option<GameSettings>,
    // Overrides how long a move animates before the board is updated.
    #[serde(with = "humantime_serde")]
    pub swap_delay: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            server_address: None,
            settings: None,
            swap_delay: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub fn read_config_file(filename: &str) -> anyhow::Result<ConsoleConfig> {
    let contents = std::fs::read_to_string(filename)
        .with_context(|| format!("Failed to read config file '{filename}'."))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file '{filename}'."))
}


#[cfg(test)]
mod tests {
    use latrones_client::force::Force;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
server_address: localhost:5000
settings:
  time_budget_seconds: 120
  user_color: dark
  play_against_bot: false
  board_size: 10
swap_delay: 50ms
request_timeout: 1m
"#;
        let config: ConsoleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config, ConsoleConfig {
            server_address: Some("localhost:5000".to_owned()),
            settings: Some(GameSettings {
                time_budget_seconds: 120,
                user_color: Force::Dark,
                play_against_bot: false,
                board_size: 10,
            }),
            swap_delay: Some(Duration::from_millis(50)),
            request_timeout: Duration::from_secs(60),
        });
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: ConsoleConfig = serde_yaml::from_str("swap_delay: 1s").unwrap();
        assert_eq!(config.swap_delay, Some(Duration::from_secs(1)));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.server_address, None);
    }
}
