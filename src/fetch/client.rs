use async_trait::async_trait;
use reqwest::{Request, Response};

/// Minimal HTTP execution seam, so feed fetching can be composed with
/// auth wrappers and faked in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
