use std::time::Duration;

use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::{
    utils::{output_error, output_success},
    OutputFormat,
};

const DEFAULT_URL: &str = "http://localhost:8000";

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from API /health endpoint")]
    Health {
        #[arg(long, help = "Server base URL (defaults to PWM_SERVER_URL or http://localhost:8000)")]
        url: Option<String>,
    },

    #[command(about = "Show server information from API root endpoint")]
    Info {
        #[arg(long, help = "Server base URL (defaults to PWM_SERVER_URL or http://localhost:8000)")]
        url: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health { url } => {
            let base = base_url(url)?;
            let (status, body) = fetch(&base, "health").await?;

            if status.is_success() {
                output_success(
                    output_format,
                    &format!("{} is healthy", base),
                    Some(json!({ "status": status.as_u16(), "data": body["data"] })),
                )
            } else {
                output_error(
                    output_format,
                    &format!("{} reported {}", base, status),
                    Some("SERVER_UNHEALTHY"),
                )?;
                anyhow::bail!("server unhealthy")
            }
        }
        ServerCommands::Info { url } => {
            let base = base_url(url)?;
            let (_, body) = fetch(&base, "").await?;
            output_success(output_format, &format!("Server {}", base), Some(body["data"].clone()))
        }
    }
}

fn base_url(url: Option<String>) -> anyhow::Result<url::Url> {
    let raw = url
        .or_else(|| std::env::var("PWM_SERVER_URL").ok())
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    Ok(url::Url::parse(&raw)?)
}

async fn fetch(base: &url::Url, path: &str) -> anyhow::Result<(reqwest::StatusCode, Value)> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;
    let response = client.get(base.join(path)?).send().await?;
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins() {
        let url = base_url(Some("http://example.test:9000".into())).unwrap();
        assert_eq!(url.join("health").unwrap().as_str(), "http://example.test:9000/health");
    }

    #[test]
    fn malformed_url_is_an_error() {
        assert!(base_url(Some("not a url".into())).is_err());
    }
}
