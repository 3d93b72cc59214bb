//! The eight-field registration record and its JSON rendering.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;

/// A field of the registration record, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    NomorPorsi,
    Nama,
    KabupatenKota,
    Provinsi,
    Kuota,
    PosisiPorsiKuota,
    PerkiraanTahunBerangkatHijriah,
    PerkiraanTahunBerangkatMasehi,
}

impl Field {
    /// All fields in output order.
    pub const ALL: [Field; 8] = [
        Field::NomorPorsi,
        Field::Nama,
        Field::KabupatenKota,
        Field::Provinsi,
        Field::Kuota,
        Field::PosisiPorsiKuota,
        Field::PerkiraanTahunBerangkatHijriah,
        Field::PerkiraanTahunBerangkatMasehi,
    ];

    /// JSON key of the field.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::NomorPorsi => "nomor_porsi",
            Self::Nama => "nama",
            Self::KabupatenKota => "kabupaten_kota",
            Self::Provinsi => "provinsi",
            Self::Kuota => "kuota",
            Self::PosisiPorsiKuota => "posisi_porsi_kuota",
            Self::PerkiraanTahunBerangkatHijriah => "perkiraan_tahun_berangkat_hijriah",
            Self::PerkiraanTahunBerangkatMasehi => "perkiraan_tahun_berangkat_masehi",
        }
    }

    /// Exact `class` attribute of the label `<span>` in front of the value.
    ///
    /// The numbering is the registry's, which is why `nama` has no suffix.
    #[must_use]
    pub fn label_class(self) -> &'static str {
        match self {
            Self::NomorPorsi => "views-label views-label-text-1",
            Self::Nama => "views-label views-label-text",
            Self::KabupatenKota => "views-label views-label-text-2",
            Self::Provinsi => "views-label views-label-text-3",
            Self::Kuota => "views-label views-label-text-4",
            Self::PosisiPorsiKuota => "views-label views-label-text-5",
            Self::PerkiraanTahunBerangkatHijriah => "views-label views-label-text-6",
            Self::PerkiraanTahunBerangkatMasehi => "views-label views-label-text-7",
        }
    }
}

/// Parsed registration record. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub nomor_porsi: String,
    pub nama: String,
    pub kabupaten_kota: String,
    pub provinsi: String,
    pub kuota: String,
    pub posisi_porsi_kuota: String,
    pub perkiraan_tahun_berangkat_hijriah: String,
    pub perkiraan_tahun_berangkat_masehi: String,
}

impl Record {
    /// Value of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::NomorPorsi => &self.nomor_porsi,
            Field::Nama => &self.nama,
            Field::KabupatenKota => &self.kabupaten_kota,
            Field::Provinsi => &self.provinsi,
            Field::Kuota => &self.kuota,
            Field::PosisiPorsiKuota => &self.posisi_porsi_kuota,
            Field::PerkiraanTahunBerangkatHijriah => &self.perkiraan_tahun_berangkat_hijriah,
            Field::PerkiraanTahunBerangkatMasehi => &self.perkiraan_tahun_berangkat_masehi,
        }
    }

    /// Store a trimmed value for a field.
    pub fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::NomorPorsi => &mut self.nomor_porsi,
            Field::Nama => &mut self.nama,
            Field::KabupatenKota => &mut self.kabupaten_kota,
            Field::Provinsi => &mut self.provinsi,
            Field::Kuota => &mut self.kuota,
            Field::PosisiPorsiKuota => &mut self.posisi_porsi_kuota,
            Field::PerkiraanTahunBerangkatHijriah => &mut self.perkiraan_tahun_berangkat_hijriah,
            Field::PerkiraanTahunBerangkatMasehi => &mut self.perkiraan_tahun_berangkat_masehi,
        };
        *slot = value.trim().to_string();
    }
}

/// Outcome of one lookup.
///
/// Serialized untagged: either the eight record keys, or a lone `error` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Lookup {
    Found(Record),
    Failed { error: String },
}

impl Lookup {
    pub fn failed(error: impl ToString) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    /// Render as JSON: records pretty with four-space indentation, errors
    /// on a single line.
    pub fn to_json(&self) -> Result<String> {
        match self {
            Self::Found(record) => to_pretty_json(record),
            Self::Failed { error } => Ok(error_json(error)),
        }
    }
}

/// Single-line `{"error":...}` document.
pub fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Serialize a value as pretty JSON indented with four spaces.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
