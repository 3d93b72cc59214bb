//! Search form handling for the form fetch mode.
//!
//! The registry search is a Drupal webform. A submission is only accepted
//! with the `form_build_id` token rendered into the form page, and a
//! successful submission answers with a redirect to the result page.

use reqwest::blocking::Response;
use reqwest::header::LOCATION;
use scraper::{Html, Selector};
use url::Url;

use crate::config::FORM_SUBMIT_OP;
use crate::error::FetchFailure;

/// Find the `form_build_id` token inside the form with HTML id `form_html_id`.
///
/// Returns `None` when the form, the input or its value is missing.
pub fn extract_form_build_id(html: &str, form_html_id: &str) -> Option<String> {
    let selector =
        Selector::parse(&format!(r#"form[id="{form_html_id}"] input[name="form_build_id"]"#))
            .ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .find_map(|input| input.value().attr("value"))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Fields of a search submission, in the order the browser sends them.
pub fn submission_fields<'a>(
    nomor_porsi: &'a str,
    form_build_id: &'a str,
    form_id: &'a str,
) -> Vec<(&'static str, &'a str)> {
    vec![
        ("submitted[nomor_porsi]", nomor_porsi),
        ("details[sid]", ""),
        ("details[page_num]", "1"),
        ("details[page_count]", "1"),
        ("details[finished]", "0"),
        ("op", FORM_SUBMIT_OP),
        ("form_build_id", form_build_id),
        ("form_id", form_id),
    ]
}

/// Read the redirect target of a submission response.
///
/// Relative locations are resolved against the URL the response came from.
pub fn redirect_location(response: &Response) -> Result<Url, FetchFailure> {
    let location = response
        .headers()
        .get(LOCATION)
        .ok_or(FetchFailure::NoRedirectLocation)?;
    let location = location
        .to_str()
        .map_err(|_| {
            FetchFailure::InvalidLocation(String::from_utf8_lossy(location.as_bytes()).into_owned())
        })?
        .trim();

    if location.is_empty() {
        return Err(FetchFailure::NoRedirectLocation);
    }

    response
        .url()
        .join(location)
        .map_err(|_| FetchFailure::InvalidLocation(location.to_string()))
}
