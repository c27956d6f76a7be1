use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::port::{CommandError, RemoteCommandPort};

/// [`RemoteCommandPort`] that posts commands to the backend's HTTP server.
#[derive(Clone)]
pub struct HttpCommandPort {
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    kind: String,
    message: String,
}

impl HttpCommandPort {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base = sanitize_base_url(base_url.into())?;
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn command_url(&self, command: &str) -> Result<Url, CommandError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| CommandError::Transport(format!("invalid base URL: {err}")))?;
        url.set_path(&format!("commands/{command}"));
        Ok(url)
    }
}

#[async_trait]
impl RemoteCommandPort for HttpCommandPort {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError> {
        let url = self.command_url(command)?;
        let response = self
            .client
            .post(url)
            .json(&args)
            .send()
            .await
            .map_err(|err| CommandError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|err| CommandError::Decode {
                command: command.to_string(),
                message: err.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => Err(CommandError::Application {
                kind: err.kind,
                message: err.message,
            }),
            Err(_) => Err(CommandError::Transport(format!(
                "backend returned {status} for `{command}`: {body}"
            ))),
        }
    }
}

fn sanitize_base_url(mut base: String) -> Result<String> {
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    while base.ends_with('/') {
        base.pop();
    }
    let _ = Url::parse(&base).context("invalid base URL")?;
    Ok(base)
}
