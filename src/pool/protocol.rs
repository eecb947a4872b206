//! HTTP wire protocol spoken to parsing workers.
//!
//! * `GET {health_path}` answers any 2xx once the worker can parse.
//! * `POST {parse_path}` with [`ParseRequest`] as JSON answers a JSON array of
//!   [`AddressComponent`]s. Any non-2xx status is a parse failure for that text.

use crate::error::{Error, Result};
use crate::parser::AddressComponent;
use serde::{Deserialize, Serialize};

/// Body of a parse request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequest {
    /// Free-text address
    pub address: String,
}

/// Probe a worker's health endpoint once.
pub(crate) async fn probe(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

/// Send one parse request and decode the components.
pub(crate) async fn parse(
    client: &reqwest::Client,
    ordinal: usize,
    url: &str,
    text: &str,
) -> Result<Vec<AddressComponent>> {
    let request = ParseRequest {
        address: text.to_string(),
    };
    let response = client
        .post(url)
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            if e.is_connect() {
                Error::refused(ordinal, e.to_string())
            } else {
                Error::transport(ordinal, e.to_string())
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = body.trim();
        let message = if detail.is_empty() {
            format!("worker returned {status}")
        } else {
            format!("worker returned {status}: {detail}")
        };
        return Err(Error::parse(text, message));
    }

    response.json::<Vec<AddressComponent>>().await.map_err(|e| {
        if e.is_decode() {
            Error::parse(text, format!("invalid worker response: {e}"))
        } else {
            Error::transport(ordinal, e.to_string())
        }
    })
}
