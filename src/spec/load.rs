use super::build::build_routes;
use super::manifest::Manifest;
use super::types::RouteTable;
use anyhow::Context;
use std::path::Path;
use tracing::info;

/// Parse manifest text. YAML is a superset of JSON, but JSON files go through
/// `serde_json` so their error messages carry JSON line/column positions.
pub fn parse_manifest(content: &str, yaml: bool) -> anyhow::Result<Manifest> {
    let manifest = if yaml {
        serde_yaml::from_str(content).context("invalid YAML route manifest")?
    } else {
        serde_json::from_str(content).context("invalid JSON route manifest")?
    };
    Ok(manifest)
}

/// Read a manifest file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON.
pub fn load_manifest(file_path: impl AsRef<Path>) -> anyhow::Result<Manifest> {
    let file_path = file_path.as_ref();
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read route manifest {}", file_path.display()))?;
    let yaml = matches!(
        file_path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    parse_manifest(&content, yaml)
        .with_context(|| format!("failed to parse route manifest {}", file_path.display()))
}

/// Load and register a manifest file in one step.
pub fn load_routes(file_path: impl AsRef<Path>) -> anyhow::Result<RouteTable> {
    let file_path = file_path.as_ref();
    let manifest = load_manifest(file_path)?;
    let table = build_routes(&manifest)
        .with_context(|| format!("failed to register routes from {}", file_path.display()))?;
    info!(
        manifest = %file_path.display(),
        routes_count = table.routes.len(),
        "Route manifest loaded"
    );
    Ok(table)
}
