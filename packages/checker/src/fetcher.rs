//! Obtaining the raw result markup for a registration number.

use std::sync::Arc;

use reqwest::blocking::Client;

use crate::config::{FetchMode, FetcherConfig};
use crate::cookies::CookieJar;
use crate::error::{CheckerError, FetchFailure, Result};
use crate::form::{extract_form_build_id, redirect_location, submission_fields};
use crate::http::{create_client, get_text, post_form};

/// Source of raw markup for a lookup, enabling stub sources in tests.
pub trait Fetcher {
    /// Fetch the markup that holds the registration record.
    fn get_contents(&self) -> Result<String>;
}

/// Fetches a registration record from the Kemenag registry.
pub struct PorsiFetcher {
    nomor_porsi: String,
    config: FetcherConfig,
    client: Client,
    cookies: Option<Arc<CookieJar>>,
}

impl PorsiFetcher {
    /// Build a fetcher and its HTTP client.
    ///
    /// The registration number is used verbatim; the registry decides
    /// whether it is valid.
    pub fn new(nomor_porsi: impl Into<String>, config: FetcherConfig) -> Result<Self> {
        let cookies = config
            .cookie_file
            .as_ref()
            .map(|path| Arc::new(CookieJar::load(path)));
        let client = create_client(&config, cookies.clone())?;

        Ok(Self {
            nomor_porsi: nomor_porsi.into(),
            config,
            client,
            cookies,
        })
    }

    pub fn nomor_porsi(&self) -> &str {
        &self.nomor_porsi
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// URL of the data endpoint for this number (direct mode).
    pub fn direct_url(&self) -> String {
        format!("{}/{}", self.config.url, self.nomor_porsi)
    }

    fn fetch_direct(&self) -> Result<String> {
        get_text(&self.client, &self.direct_url())
    }

    /// Form page, submission, then the page the submission redirects to.
    fn fetch_via_form(&self) -> Result<String> {
        let form_url = self.config.url.as_str();

        let form_page = get_text(&self.client, form_url)?;
        let form_build_id = extract_form_build_id(&form_page, &self.config.form_html_id())
            .ok_or_else(|| CheckerError::fetch(form_url, FetchFailure::TokenNotFound))?;
        tracing::debug!(form_build_id = %form_build_id, "Found form token");

        let fields = submission_fields(&self.nomor_porsi, &form_build_id, &self.config.form_id);
        let response = post_form(&self.client, form_url, &fields, form_url)?;
        let result_url =
            redirect_location(&response).map_err(|e| CheckerError::fetch(form_url, e))?;
        tracing::debug!(location = %result_url, "Form redirected");

        get_text(&self.client, result_url.as_str())
    }

    fn save_cookies(&self) {
        if let Some(jar) = &self.cookies {
            if let Err(e) = jar.save() {
                tracing::warn!(path = %jar.path().display(), error = %e, "Failed to save cookies");
            }
        }
    }
}

impl Fetcher for PorsiFetcher {
    fn get_contents(&self) -> Result<String> {
        let contents = match self.config.mode {
            FetchMode::Direct => self.fetch_direct(),
            FetchMode::Form => self.fetch_via_form(),
        };
        self.save_cookies();

        if let Err(e) = &contents {
            tracing::debug!(nomor_porsi = %self.nomor_porsi, error = %e, "Lookup failed");
        }
        contents
    }
}
