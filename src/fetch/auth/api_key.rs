use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::HeaderName;

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// `header_name` is the header field to set and `key` is the raw value
/// written into it.
pub struct ApiKey<C> {
    pub inner: C,
    pub header_name: String,
    pub key: String,
}

impl<C> ApiKey<C> {
    /// Convenience constructor for the NS open-data gateway, which expects
    /// the key in an `Ocp-Apim-Subscription-Key` header.
    pub fn subscription(inner: C, key: String) -> Self {
        Self {
            inner,
            header_name: "Ocp-Apim-Subscription-Key".to_string(),
            key,
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let header_name = HeaderName::from_bytes(self.header_name.as_bytes())
            .expect("ApiKey: invalid header name");
        req.headers_mut()
            .insert(header_name, self.key.parse().expect("ApiKey: invalid header value"));
        self.inner.execute(req).await
    }
}
