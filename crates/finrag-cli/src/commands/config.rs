use crate::output::OutputWriter;
use crate::setup;
use anyhow::Result;
use finrag_core::config::CliConfigOverrides;
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use tabled::Tabled;

const CREDENTIAL_KEYS: &[&str] = &["OPENAI_API_KEY", "PINECONE_API_KEY"];

#[derive(Serialize)]
struct ConfigEntry {
    value: String,
    source: String,
}

#[derive(Serialize)]
struct ConfigOutput {
    values: BTreeMap<String, ConfigEntry>,

    /// Presence only; secrets are never printed
    credentials: BTreeMap<String, bool>,
}

pub fn execute(config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = setup::resolve_config(config_file, CliConfigOverrides::default())?;
    let inspection_map = config.to_inspection_map();

    let credentials: BTreeMap<String, bool> = CREDENTIAL_KEYS
        .iter()
        .map(|key| (key.to_string(), env::var(key).map(|v| !v.is_empty()).unwrap_or(false)))
        .collect();

    if output.is_json() {
        let values = inspection_map
            .into_iter()
            .map(|(key, (value, source))| (key, ConfigEntry { value, source: source.to_string() }))
            .collect();
        return output.result(ConfigOutput { values, credentials });
    }

    output.section("Configuration Values");

    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let rows: Vec<ConfigRow> = inspection_map
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: source.to_string() })
        .collect();
    output.table(rows);

    output.section("Credentials");
    for (key, present) in &credentials {
        output.kv(key, if *present { "set" } else { "missing" });
    }

    output.section("Configuration Precedence");
    output.info("CLI arguments > Environment variables > Config file > Defaults");

    Ok(())
}
