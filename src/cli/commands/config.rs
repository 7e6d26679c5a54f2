//! `config`: print the effective configuration.

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

const REDACTED: &str = "<redacted>";

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show the Telegram token instead of redacting it
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct ConfigOutput {
    #[serde(flatten)]
    pub config: Config,
    #[serde(skip)]
    yaml: String,
}

impl ConfigOutput {
    pub fn new(mut config: Config, show_secrets: bool) -> Result<Self> {
        if !show_secrets {
            if let Some(token) = config.telegram.token.as_mut() {
                *token = REDACTED.to_string();
            }
        }
        let yaml = render_yaml(&config)?;
        Ok(Self { config, yaml })
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        self.yaml.clone()
    }
}

fn render_yaml<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).context("Failed to render configuration as YAML")
}

pub async fn execute(args: ConfigArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load(config_path).context("Failed to load configuration")?;
    output(&ConfigOutput::new(config, args.show_secrets)?, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted_by_default() {
        let mut config = Config::default();
        config.telegram.token = Some("123:secret".to_string());

        let out = ConfigOutput::new(config.clone(), false).unwrap();
        assert!(!out.to_human().contains("123:secret"));
        assert!(out.to_human().contains(REDACTED));
        assert_eq!(out.to_json()["telegram"]["token"], REDACTED);
        assert!(out.to_json().get("yaml").is_none());

        let out = ConfigOutput::new(config, true).unwrap();
        assert_eq!(out.to_json()["telegram"]["token"], "123:secret");
    }

    #[test]
    fn test_human_output_round_trips_as_yaml() {
        let out = ConfigOutput::new(Config::default(), false).unwrap();
        let parsed: Config = serde_yaml::from_str(&out.to_human()).unwrap();
        assert_eq!(parsed.engine.capacity, Config::default().engine.capacity);
    }

    struct Unrenderable;

    impl serde::Serialize for Unrenderable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot render"))
        }
    }

    #[test]
    fn test_render_failure_is_reported() {
        let err = render_yaml(&Unrenderable).unwrap_err();
        assert!(format!("{err:#}").contains("cannot render"));
    }
}
