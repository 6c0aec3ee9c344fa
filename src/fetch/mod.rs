mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;

/// Fetches a URL through the given client and returns the response body.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
