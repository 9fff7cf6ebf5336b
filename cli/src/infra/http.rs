//! HTTP infrastructure: implements `HttpProbe` with reqwest.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::trace;

use crate::application::ports::HttpProbe;
use crate::domain::Observation;

/// Production `HttpProbe` backed by a shared reqwest client.
///
/// Redirects are not followed: the probe reports exactly what the endpoint
/// answers.
pub struct ReqwestHttpProbe {
    client: reqwest::Client,
}

impl ReqwestHttpProbe {
    /// Build a probe whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("tfprobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpProbe for ReqwestHttpProbe {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Observation {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return Observation::Transport(error_chain(&e)),
        };
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => {
                trace!(url, status, body_len = body.len(), "response received");
                Observation::Response { status, body }
            }
            Err(e) => Observation::Transport(format!("reading body: {}", error_chain(&e))),
        }
    }
}

/// Render an error with its full `source()` chain, e.g.
/// `error sending request: dns error: failed to lookup address`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
