//! Blocking download of remote inputs.

use anyhow::{bail, Context, Result};
use std::time::Duration;

const TIMEOUT_SECS: u64 = 300;

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// GET `url` and return the body. Non-2xx responses are errors; retrying is
/// left to the caller.
pub fn download(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()?;
    tracing::info!(%url, "downloading");
    let response = client.get(url).send().with_context(|| format!("GET {url}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("GET {url} returned {status}");
    }
    let body = response.bytes().context("read response body")?;
    tracing::info!(bytes = body.len(), "download complete");
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_urls() {
        assert!(is_url("https://covid.ourworldindata.org/data/owid-covid-data.csv"));
        assert!(is_url("http://localhost/x.csv"));
        assert!(!is_url("data/owid-covid-data.csv"));
        assert!(!is_url("httpdata.csv"));
    }
}
