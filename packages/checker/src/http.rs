//! HTTP client wrapper for talking to the registry.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, REFERER};
use reqwest::redirect::Policy;

use crate::config::FetcherConfig;
use crate::cookies::CookieJar;
use crate::error::{CheckerError, Result};

/// Create a configured HTTP client.
///
/// Redirects are never followed: the form flow needs to read the
/// `Location` header of the submission response itself.
///
/// # Arguments
/// * `config` - Fetcher configuration (user agent, timeout, TLS verification)
/// * `cookies` - File-backed jar; `None` keeps cookies in memory for the client's lifetime
pub fn create_client(config: &FetcherConfig, cookies: Option<Arc<CookieJar>>) -> Result<Client> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .redirect(Policy::none());

    if !config.verify_ssl {
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder = match cookies {
        Some(jar) => builder.cookie_provider(jar),
        None => builder.cookie_store(true),
    };

    builder.build().map_err(CheckerError::Client)
}

/// GET a URL and return the response body as text.
///
/// 4xx and 5xx responses are failures. Any error is tagged with `url`.
pub fn get_text(client: &Client, url: &str) -> Result<String> {
    tracing::debug!(url, "GET");
    let response = send_checked(client.get(url), url)?;
    response
        .text()
        .map_err(|e| CheckerError::fetch(url, e))
}

/// POST url-encoded form fields, sending `referer` as the Referer header.
///
/// Returns the raw response so the caller can inspect its headers.
pub fn post_form(
    client: &Client,
    url: &str,
    fields: &[(&str, &str)],
    referer: &str,
) -> Result<Response> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();

    tracing::debug!(url, fields = fields.len(), "POST");
    send_checked(
        client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(REFERER, referer)
            .body(body),
        url,
    )
}

fn send_checked(request: reqwest::blocking::RequestBuilder, url: &str) -> Result<Response> {
    let response = request.send().map_err(|e| CheckerError::fetch(url, e))?;
    let status = response.status();
    tracing::debug!(url, status = %status, "Response received");

    response
        .error_for_status()
        .map_err(|e| CheckerError::fetch(url, e))
}
