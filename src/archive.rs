use std::fs::File;
use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::HiriseError;

/// Transfers one URL to one local file. The archive guarantees nothing about
/// partial files left behind by an interrupted transfer; callers decide
/// whether to overwrite.
pub trait ArchiveClient: Send + Sync {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), HiriseError>;
}

#[derive(Clone)]
pub struct HttpArchiveClient {
    client: Client,
}

impl HttpArchiveClient {
    pub fn new() -> Result<Self, HiriseError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("hirise-dl/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| HiriseError::ArchiveHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| HiriseError::ArchiveHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(
        url: &str,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, HiriseError> {
        if response.status().is_success() {
            return Ok(response);
        }
        Err(HiriseError::ArchiveStatus {
            status: response.status().as_u16(),
            url: url.to_string(),
        })
    }

    fn send_with_retries(&self, url: &str) -> Result<reqwest::blocking::Response, HiriseError> {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            let response = self.client.get(url).send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(HiriseError::ArchiveHttp(err.to_string()));
                }
            }
        }
    }
}

impl ArchiveClient for HttpArchiveClient {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), HiriseError> {
        let response = self.send_with_retries(url)?;
        let mut response = Self::handle_status(url, response)?;
        let mut file =
            File::create(destination).map_err(|err| HiriseError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| HiriseError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
