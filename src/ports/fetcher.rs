use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

/// Obtains a remote source video as a local file.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait VideoFetcher: Send + Sync {
    /// Fetch `url` into `dest`. A non-success HTTP status is an error.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), Box<dyn Error + Send + Sync>>;
}
