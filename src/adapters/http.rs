use async_trait::async_trait;
use bytes::Buf;
use futures::{Stream, TryStreamExt};
use std::error::Error;
use std::io;
use std::path::Path;
use tokio::{fs::File, io::BufWriter};
use tokio_util::io::StreamReader;

use crate::ports::fetcher::VideoFetcher;

/// Streams HTTP sources to disk without holding whole videos in memory.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        stream_to_file(dest, response.bytes_stream()).await?;
        Ok(())
    }
}

// Save a `Stream` to a file
async fn stream_to_file<S, B, E>(path: &Path, stream: S) -> io::Result<()>
where
    S: Stream<Item = Result<B, E>>,
    B: Buf,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    tokio::io::copy(&mut body_reader, &mut file).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stream_to_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("src.mp4");

        type E = std::io::Error;

        let test_data = "fake video payload";
        let mock_stream = stream::iter(vec![Ok::<Bytes, E>(Bytes::from(test_data))]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(result.is_ok());

        let file_contents = fs::read_to_string(file_path).unwrap();
        assert_eq!(file_contents, test_data);
    }

    #[tokio::test]
    async fn test_stream_to_file_error() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("src.mp4");

        let mock_stream = stream::iter(vec![
            Ok::<Bytes, &str>(Bytes::from("partial")),
            Err("connection reset"),
        ]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(result.is_err());
    }
}
