//! Porsi Haji Checker - Look up a hajj queue registration number.
//!
//! This crate fetches the Kemenag registry page for a registration number
//! ("nomor porsi"), extracts the eight record fields from the markup and
//! renders them as JSON.
//!
//! # Example
//!
//! ```
//! use porsi_haji_checker::extract_record;
//!
//! let html = r#"<div>
//!   <span class="views-label views-label-text-6">Perkiraan Tahun Berangkat (H)</span>
//!   <strong> 1444 </strong>
//! </div>"#;
//! let record = extract_record(html);
//! assert_eq!(record.perkiraan_tahun_berangkat_hijriah, "1444");
//! assert_eq!(record.nama, "");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Defaults and the fetcher configuration
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client construction and request helpers
//! - [`cookies`]: File-backed cookie jar
//! - [`form`]: Search form token and submission handling
//! - [`fetcher`]: Direct and form-based markup fetching
//! - [`record`]: Record fields and JSON rendering
//! - [`extractor`]: Field extraction and the lookup state
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod form;
pub mod http;
pub mod record;

// Re-export commonly used items
pub use config::{FetchMode, FetcherConfig};
pub use error::{CheckerError, Result};
pub use extractor::{extract_record, Extractor};
pub use fetcher::{Fetcher, PorsiFetcher};
pub use record::{Field, Lookup, Record};
