//! Configuration constants and the fetcher configuration.

use std::path::PathBuf;

/// Data endpoint used by the direct fetch mode; the number is appended as a path segment.
pub const DIRECT_URL: &str = "https://haji.kemenag.go.id/v3/basisdata/xml";

/// Search form page used by the form fetch mode.
pub const FORM_URL: &str = "https://haji.kemenag.go.id/v3/node/955358";

/// Drupal `form_id` of the search form.
pub const FORM_ID: &str = "webform_client_form_955358";

/// Value of the submit button the form expects.
pub const FORM_SUBMIT_OP: &str = "Cari";

/// Browser user agent sent with every request.
///
/// The registry answers differently to non-browser clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/73.0.3683.86 Safari/537.36";

/// HTTP timeout in seconds, applied to each request.
pub const HTTP_TIMEOUT_SECS: u64 = 5;

/// How the raw markup is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FetchMode {
    /// Single GET to `{url}/{nomor_porsi}`.
    #[default]
    Direct,

    /// GET the search form, POST it, then GET the redirect target.
    Form,
}

impl FetchMode {
    /// Default base URL for this mode.
    #[must_use]
    pub fn default_url(self) -> &'static str {
        match self {
            Self::Direct => DIRECT_URL,
            Self::Form => FORM_URL,
        }
    }
}

/// Configuration for a [`PorsiFetcher`](crate::fetcher::PorsiFetcher).
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub mode: FetchMode,
    pub url: String,
    pub user_agent: String,
    /// `*.kemenag.go.id` has historically served an incomplete certificate
    /// chain, so verification is off unless asked for.
    pub verify_ssl: bool,
    pub timeout_secs: u64,
    /// JSON cookie jar on disk. `None` keeps cookies in memory only.
    pub cookie_file: Option<PathBuf>,
    pub form_id: String,
}

impl FetcherConfig {
    /// Create a config builder starting from the defaults.
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder {
            mode: FetchMode::default(),
            url: None,
            user_agent: USER_AGENT.into(),
            verify_ssl: false,
            timeout_secs: HTTP_TIMEOUT_SECS,
            cookie_file: None,
            form_id: FORM_ID.into(),
        }
    }

    /// HTML `id` attribute of the search form (`form_id` with dashes).
    #[must_use]
    pub fn form_html_id(&self) -> String {
        self.form_id.replace('_', "-")
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for constructing a `FetcherConfig`.
pub struct FetcherConfigBuilder {
    mode: FetchMode,
    url: Option<String>,
    user_agent: String,
    verify_ssl: bool,
    timeout_secs: u64,
    cookie_file: Option<PathBuf>,
    form_id: String,
}

impl FetcherConfigBuilder {
    pub fn mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the base URL. Without it the mode's default URL is used.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn cookie_file(mut self, cookie_file: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(cookie_file.into());
        self
    }

    pub fn form_id(mut self, form_id: impl Into<String>) -> Self {
        self.form_id = form_id.into();
        self
    }

    pub fn build(self) -> FetcherConfig {
        let url = self
            .url
            .unwrap_or_else(|| self.mode.default_url().to_string());

        FetcherConfig {
            mode: self.mode,
            url: url.trim_end_matches('/').to_string(),
            user_agent: self.user_agent,
            verify_ssl: self.verify_ssl,
            timeout_secs: self.timeout_secs,
            cookie_file: self.cookie_file,
            form_id: self.form_id,
        }
    }
}
