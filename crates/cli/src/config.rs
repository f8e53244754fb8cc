//! Environment-driven CLI configuration.

use std::path::PathBuf;

use anyhow::{Context, bail};

use storekeep_core::StoreId;

pub const STORE_ID_ENV: &str = "STOREKEEP_STORE_ID";
pub const STORE_NAME_ENV: &str = "STOREKEEP_STORE_NAME";

#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// JSON script to run.
    pub script: PathBuf,
    /// Overrides the script's store id.
    pub store_id: Option<StoreId>,
    /// Overrides the script's store name.
    pub store_name: Option<String>,
}

impl CliConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        mut args: impl Iterator<Item = String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let Some(script) = args.next() else {
            bail!("usage: storekeep <script.json>");
        };

        let store_id = lookup(STORE_ID_ENV)
            .map(StoreId::new)
            .transpose()
            .with_context(|| format!("invalid {STORE_ID_ENV}"))?;
        let store_name = lookup(STORE_NAME_ENV).filter(|name| !name.trim().is_empty());

        Ok(Self {
            script: PathBuf::from(script),
            store_id,
            store_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn script_argument_is_required() {
        let err = CliConfig::from_lookup(args(&[]), |_| None).unwrap_err();
        assert!(err.to_string().contains("usage"));
    }

    #[test]
    fn env_overrides_are_picked_up() {
        let config = CliConfig::from_lookup(args(&["ops.json"]), |key| match key {
            STORE_ID_ENV => Some("main".to_string()),
            STORE_NAME_ENV => Some("Main Store".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.script, PathBuf::from("ops.json"));
        assert_eq!(config.store_id, Some(StoreId::new("main").unwrap()));
        assert_eq!(config.store_name.as_deref(), Some("Main Store"));
    }

    #[test]
    fn blank_store_id_is_an_error() {
        let err = CliConfig::from_lookup(args(&["ops.json"]), |key| {
            (key == STORE_ID_ENV).then(|| " ".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains(STORE_ID_ENV));
    }
}
