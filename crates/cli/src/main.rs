use anyhow::Context;

use storekeep_cli::{CliConfig, Script};

fn main() -> anyhow::Result<()> {
    storekeep_observability::init();

    let config = CliConfig::from_env()?;
    let raw = std::fs::read_to_string(&config.script)
        .with_context(|| format!("failed to read {}", config.script.display()))?;

    let script = Script::from_json(&raw)?;
    let report = match script.run(config.store_id, config.store_name) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "script aborted");
            return Err(err);
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
