use crate::Result;
use crate::error::ScrapeError;
use crate::models::ScrapeConfig;
use reqwest::blocking::Client;

pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetcher. One GET, no retries.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|source| ScrapeError::Fetch {
                url: config.target_url.clone(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        log::info!("🔍 GET {}", url);

        let fetch_err = |source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(fetch_err)?;
        log::info!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
