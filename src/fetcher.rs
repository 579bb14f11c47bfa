use crate::config::ScraperConfig;
use crate::models::{Identifier, MetricResult, MetricSpec, ScraperError};
use crate::scraper_logic::extract_from_str;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use tracing::{info, warn};

/// `<base>/<identifier>`, with the identifier percent-encoded.
pub fn build_url(base_url: &str, identifier: &Identifier) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(identifier.as_str())
    )
}

fn header_value(name: HeaderName, raw: &str) -> Result<HeaderValue, ScraperError> {
    HeaderValue::from_str(raw)
        .map_err(|e| ScraperError::Config(format!("invalid {} {:?}: {}", name, raw, e)))
}

/// Fetches quote pages with a browser-like client.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    base_url: String,
}

impl Fetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(USER_AGENT, &config.user_agent)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value(ACCEPT_LANGUAGE, &config.accept_language)?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn url_for(&self, identifier: &Identifier) -> String {
        build_url(&self.base_url, identifier)
    }

    /// One GET, no retries. Anything but a 2xx is an error.
    pub async fn fetch_document(&self, identifier: &Identifier) -> Result<String, ScraperError> {
        let url = self.url_for(identifier);
        info!("fetching {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("{} answered {}", url, status);
            return Err(ScraperError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.text().await?)
    }

    /// Fetch, parse and extract in one go.
    pub async fn analyze(
        &self,
        identifier: &Identifier,
        spec: &MetricSpec,
    ) -> Result<MetricResult, ScraperError> {
        let body = self.fetch_document(identifier).await?;
        let result = extract_from_str(&body, spec);
        info!("extracted {} for {}", result.name, identifier);
        Ok(result)
    }
}
