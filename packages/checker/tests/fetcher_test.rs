//! Fetch tests against a mocked registry.
//!
//! The fetcher uses a blocking client, so the mock server is started on a
//! runtime driven by hand and requests are made outside of it.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use porsi_haji_checker::config::USER_AGENT;
use porsi_haji_checker::{
    extract_record, Extractor, FetchMode, Fetcher, FetcherConfig, Lookup, PorsiFetcher,
};

const FORM_PATH: &str = "/v3/node/955358";
const RESULT_PATH: &str = "/v3/node/955358/hasil";

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Mock server plus the runtime it was started on.
struct MockRegistry {
    // Dropped before the runtime.
    server: MockServer,
    rt: Runtime,
}

impl MockRegistry {
    fn start() -> Self {
        let rt = Runtime::new().expect("Failed to start runtime");
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn uri(&self) -> String {
        self.server.uri()
    }

    fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .expect("Request recording is enabled")
    }

    fn form_config(&self) -> FetcherConfig {
        FetcherConfig::builder()
            .mode(FetchMode::Form)
            .url(format!("{}{FORM_PATH}", self.uri()))
            .build()
    }

    fn mount_form_page(&self, body: String) {
        self.mount(
            Mock::given(method("GET"))
                .and(path(FORM_PATH))
                .respond_with(ResponseTemplate::new(200).set_body_string(body)),
        );
    }

    fn mount_result_page(&self) {
        self.mount(
            Mock::given(method("GET"))
                .and(path(RESULT_PATH))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(load_fixture("result.20190501.html")),
                ),
        );
    }
}

#[test]
fn test_direct_fetch_returns_record() {
    let registry = MockRegistry::start();
    registry.mount(
        Mock::given(method("GET"))
            .and(path("/v3/basisdata/xml/300012345"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(load_fixture("result.20190501.html")),
            ),
    );

    let config = FetcherConfig::builder()
        .url(format!("{}/v3/basisdata/xml", registry.uri()))
        .build();
    let fetcher = PorsiFetcher::new("300012345", config).expect("Failed to build fetcher");

    let Lookup::Found(record) = Extractor::new(fetcher).lookup().clone() else {
        panic!("Lookup should succeed");
    };
    assert_eq!(record.nomor_porsi, "300012345");
    assert_eq!(record.nama, "ABDULLAH HAMBA ALLAH");

    // The user agent contains commas, so it is compared whole rather than
    // through a header matcher.
    let requests = registry.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0]
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok()),
        Some(USER_AGENT)
    );
}

#[test]
fn test_direct_fetch_error_status() {
    let registry = MockRegistry::start();
    registry.mount(
        Mock::given(method("GET"))
            .and(path("/v3/basisdata/xml/999"))
            .respond_with(ResponseTemplate::new(404)),
    );

    let config = FetcherConfig::builder()
        .url(format!("{}/v3/basisdata/xml", registry.uri()))
        .build();
    let fetcher = PorsiFetcher::new("999", config).expect("Failed to build fetcher");

    let err = fetcher.get_contents().unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "Error fetching {}/v3/basisdata/xml/999. Message: The requested URL returned error: 404 Not Found",
            registry.uri()
        )
    );
}

#[test]
fn test_form_flow_submits_token_and_follows_location() {
    let registry = MockRegistry::start();
    registry.mount_form_page(load_fixture("form_page.html"));
    registry.mount(
        Mock::given(method("POST"))
            .and(path(FORM_PATH))
            .and(header("referer", format!("{}{FORM_PATH}", registry.uri()).as_str()))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("submitted%5Bnomor_porsi%5D=300012345"))
            .and(body_string_contains("form_build_id=form-pQ7xLr2sVb9_cKd0"))
            .and(body_string_contains("form_id=webform_client_form_955358"))
            .and(body_string_contains("op=Cari"))
            .respond_with(ResponseTemplate::new(302).insert_header(
                "location",
                format!("{}{RESULT_PATH}?sid=77", registry.uri()).as_str(),
            )),
    );
    registry.mount_result_page();

    let fetcher =
        PorsiFetcher::new("300012345", registry.form_config()).expect("Failed to build fetcher");
    let markup = fetcher.get_contents().expect("Form flow should succeed");
    let record = extract_record(&markup);
    assert_eq!(record.provinsi, "JAWA TIMUR");
    assert_eq!(record.perkiraan_tahun_berangkat_hijriah, "1444");

    let requests = registry.requests();
    let methods: Vec<String> = requests.iter().map(|r| r.method.to_string()).collect();
    assert_eq!(methods, vec!["GET", "POST", "GET"]);

    let body = String::from_utf8_lossy(&requests[1].body).to_string();
    assert!(body.contains("details%5Bsid%5D=&"));
    assert!(body.contains("details%5Bpage_num%5D=1"));
    assert!(body.contains("details%5Bpage_count%5D=1"));
    assert!(body.contains("details%5Bfinished%5D=0"));
    assert_eq!(requests[2].url.query(), Some("sid=77"));
}

#[test]
fn test_form_flow_resolves_relative_location() {
    let registry = MockRegistry::start();
    registry.mount_form_page(load_fixture("form_page.html"));
    registry.mount(
        Mock::given(method("POST"))
            .and(path(FORM_PATH))
            .respond_with(ResponseTemplate::new(302).insert_header("location", RESULT_PATH)),
    );
    registry.mount_result_page();

    let fetcher =
        PorsiFetcher::new("300012345", registry.form_config()).expect("Failed to build fetcher");
    let markup = fetcher.get_contents().expect("Form flow should succeed");
    assert_eq!(extract_record(&markup).kuota, "15123");
}

#[test]
fn test_form_flow_without_token() {
    let registry = MockRegistry::start();
    registry.mount_form_page("<html><body><p>Sedang dalam pemeliharaan</p></body></html>".into());

    let fetcher =
        PorsiFetcher::new("300012345", registry.form_config()).expect("Failed to build fetcher");
    let err = fetcher.get_contents().unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("Error fetching {}{FORM_PATH}. Message: token not found", registry.uri())
    );
    assert_eq!(registry.requests().len(), 1, "No submission without a token");
}

#[test]
fn test_form_flow_without_location() {
    let registry = MockRegistry::start();
    registry.mount_form_page(load_fixture("form_page.html"));
    registry.mount(
        Mock::given(method("POST"))
            .and(path(FORM_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<p>Nomor porsi tidak ditemukan</p>"),
            ),
    );

    let fetcher =
        PorsiFetcher::new("300012345", registry.form_config()).expect("Failed to build fetcher");
    let extractor = Extractor::new(fetcher);

    assert_eq!(
        extractor.lookup(),
        &Lookup::failed(format!(
            "Error fetching {}{FORM_PATH}. Message: no redirect location",
            registry.uri()
        ))
    );
}

#[test]
fn test_form_flow_persists_cookies() {
    let registry = MockRegistry::start();
    registry.mount(
        Mock::given(method("GET"))
            .and(path(FORM_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "SESSd41d8=abc123; path=/; HttpOnly")
                    .set_body_string(load_fixture("form_page.html")),
            ),
    );
    registry.mount(
        Mock::given(method("POST"))
            .and(path(FORM_PATH))
            .and(header("cookie", "SESSd41d8=abc123"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", RESULT_PATH)),
    );
    registry.mount_result_page();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let cookie_file = dir.path().join("porsi").join("cookies.json");
    let config = FetcherConfig::builder()
        .mode(FetchMode::Form)
        .url(format!("{}{FORM_PATH}", registry.uri()))
        .cookie_file(&cookie_file)
        .build();

    let fetcher = PorsiFetcher::new("300012345", config).expect("Failed to build fetcher");
    fetcher.get_contents().expect("Form flow should succeed");

    let saved = fs::read_to_string(&cookie_file).expect("Cookie file should be written");
    assert!(saved.contains("SESSd41d8"));
}
