use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes HTTP requests for source fetching.
///
/// Kept as a trait so callers can wrap the transport (custom headers,
/// recording, test doubles) without touching the fetch logic.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
