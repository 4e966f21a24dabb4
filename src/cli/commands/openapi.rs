use anyhow::{Context, Result};
use utoipa::OpenApi;

use crate::cli::OpenApiFormat;
use crate::schemas::ApiDoc;

pub fn render_openapi(format: OpenApiFormat) -> Result<String> {
    let doc = ApiDoc::openapi();
    match format {
        OpenApiFormat::Json => serde_json::to_string_pretty(&doc).context("Failed to serialize OpenAPI as JSON"),
        OpenApiFormat::Yaml => serde_yaml::to_string(&doc).context("Failed to serialize OpenAPI as YAML"),
    }
}

pub fn print_openapi(format: OpenApiFormat) -> Result<()> {
    println!("{}", render_openapi(format)?);
    Ok(())
}
