use serde_json::{json, Value};
use std::io::Read;

use crate::cli::OutputFormat;
use crate::url_builder::QueryParams;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print an API payload; text mode still prints JSON, just compact
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => match value {
            Value::String(s) => println!("{}", s),
            Value::Null => {}
            other => println!("{}", serde_json::to_string(other)?),
        },
    }
    Ok(())
}

/// Split a `key=value` argument
pub fn parse_key_value(raw: &str) -> anyhow::Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(anyhow::anyhow!("expected key=value, got '{}'", raw)),
    }
}

/// Build query params from repeated `--param key=value` flags
pub fn params_from_args(args: &[String]) -> anyhow::Result<QueryParams> {
    let pairs = args
        .iter()
        .map(|raw| parse_key_value(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(QueryParams::from_pairs(pairs))
}

/// Body from `--data`, else stdin
pub fn read_json_body(data: Option<String>) -> anyhow::Result<Value> {
    let raw = match data {
        Some(raw) => raw,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("request body is not valid JSON: {}", e))
}
