//! Fast path: plain HTTP with a desktop browser's headers.

use anyhow::{Context, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use log::debug;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use std::time::Duration;

use super::backend::FetchBackend;
use super::challenge::{CHALLENGE_HEADER, classify_response};
use super::outcome::FetchResult;
use crate::config::ScrapeConfig;

#[derive(Debug, Clone)]
pub struct FastHttp {
    client: reqwest::Client,
}

impl FastHttp {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        Self::with_options(
            config.user_agent(),
            config.request_timeout(),
            config.proxy_url(),
        )
    }

    pub fn with_options(user_agent: &str, timeout: Duration, proxy: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let mut builder = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(timeout);

        if let Some(proxy) = proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy).with_context(|| format!("Invalid proxy URL '{proxy}'"))?,
            );
        }

        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    async fn fetch_once(&self, url: &str, referer: Option<&str>) -> FetchResult {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return FetchResult::TransientFailure(format!("request error: {e}")),
        };

        let status = response.status().as_u16();
        let challenge = response
            .headers()
            .get(CHALLENGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchResult::TransientFailure(format!("body read error: {e}")),
        };

        debug!("HTTP {status} for {url} ({} bytes)", body.len());
        classify_response(status, challenge.as_deref(), body)
    }
}

impl FetchBackend for FastHttp {
    fn name(&self) -> &'static str {
        "http"
    }

    fn fetch<'a>(&'a self, url: &'a str, referer: Option<&'a str>) -> BoxFuture<'a, FetchResult> {
        self.fetch_once(url, referer).boxed()
    }
}
