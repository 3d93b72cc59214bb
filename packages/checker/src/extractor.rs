//! Field extraction from the registry's result markup.
//!
//! The result page is a Drupal view. Each value sits in a `<strong>` that
//! follows a label `<span>` whose class identifies the field:
//!
//! ```html
//! <div class="views-field views-field-text-1">
//!   <span class="views-label views-label-text-1">Nomor Porsi</span>
//!   <strong class="field-content">300012345</strong>
//! </div>
//! ```

use std::cell::OnceCell;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::record::{Field, Lookup, Record};

/// One selector per field, in output order.
#[allow(clippy::expect_used)] // Static selectors that are guaranteed to be valid
static FIELD_SELECTORS: LazyLock<Vec<(Field, Selector)>> = LazyLock::new(|| {
    Field::ALL
        .iter()
        .map(|&field| {
            let css = format!(r#"span[class="{}"] ~ strong"#, field.label_class());
            (field, Selector::parse(&css).expect("valid selector"))
        })
        .collect()
});

/// Extract the registration record from result markup.
///
/// Fields are looked up independently; a field whose label is missing is
/// left empty. Markup that is not HTML at all yields an all-empty record.
pub fn extract_record(markup: &str) -> Record {
    let document = Html::parse_document(markup);
    let mut record = Record::default();

    for (field, selector) in FIELD_SELECTORS.iter() {
        match document.select(selector).next() {
            Some(element) => record.set(*field, &element.text().collect::<String>()),
            None => tracing::debug!(field = field.key(), "Field not found in markup"),
        }
    }

    record
}

/// Runs one lookup through a [`Fetcher`] and renders the outcome.
///
/// The outcome is computed on first use and cached, so repeated calls
/// neither refetch nor reparse.
pub struct Extractor<F> {
    fetcher: F,
    lookup: OnceCell<Lookup>,
}

impl<F: Fetcher> Extractor<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            lookup: OnceCell::new(),
        }
    }

    #[cfg(test)]
    fn is_done(&self) -> bool {
        self.lookup.get().is_some()
    }

    /// Fetch and extract, or return the cached outcome.
    ///
    /// A fetch failure short-circuits extraction: the outcome carries the
    /// error message only.
    pub fn lookup(&self) -> &Lookup {
        self.lookup
            .get_or_init(|| match self.fetcher.get_contents() {
                Ok(markup) => Lookup::Found(extract_record(&markup)),
                Err(e) => Lookup::failed(e),
            })
    }

    /// The lookup outcome as JSON.
    pub fn parse(&self) -> Result<String> {
        self.lookup().to_json()
    }
}
