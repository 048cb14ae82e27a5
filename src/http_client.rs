use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// GET a store endpoint with the project key sent both as `apikey` and as bearer.
pub fn fetch_store_json(client: &Client, url: &str, api_key: &str) -> Result<String> {
    let resp = client
        .get(url)
        .header(USER_AGENT, concat!("wc26_pickem/", env!("CARGO_PKG_VERSION")))
        .header(ACCEPT, "application/json")
        .header("apikey", api_key)
        .header(AUTHORIZATION, format!("Bearer {api_key}"))
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }
    Ok(body)
}
