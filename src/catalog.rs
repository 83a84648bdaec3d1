//! Immutable photo metadata catalog.
//!
//! A catalog is loaded wholesale from the gallery generator's output, either the
//! plain `gallery_metadata.json` object or the `photo_metadata.js` module that
//! wraps the same object in a `const` declaration. Every record is validated on
//! load; a single bad record fails the whole load.

use log::{debug, info};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use crate::photo_record::{PhotoRecord, RecordDefect};

const JS_MODULE_HEADER: &str = "// Auto-generated photo metadata";
const JS_BINDING: &str = "photoMetadata";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog is not a valid metadata document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Malformed record `{key}`: {defect}")]
    MalformedRecord {
        key: String,
        #[source]
        defect: RecordDefect,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    records: Vec<PhotoRecord>,
    index: HashMap<String, usize>,
    fingerprint: String,
}

impl Catalog {
    /// Parses and validates a serialized catalog.
    pub fn load(source: impl AsRef<[u8]>) -> CatalogResult<Self> {
        let source = source.as_ref();
        let document = strip_js_module(source);
        let RawEntries(entries) = serde_json::from_slice(document)?;

        let mut records = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match serde_json::from_value::<PhotoRecord>(value) {
                Ok(record) => records.push((key, record)),
                Err(e) => {
                    return Err(CatalogError::MalformedRecord {
                        key,
                        defect: RecordDefect::Decode(e.to_string()),
                    })
                }
            }
        }

        let catalog = Self::build(records, fingerprint_of(source))?;
        debug!(
            "Loaded catalog with {} photos in {} categories",
            catalog.len(),
            catalog.categories().len()
        );
        Ok(catalog)
    }

    pub fn load_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let catalog = Self::load(&bytes)?;
        info!(
            "Loaded {} photos from {} (fingerprint {})",
            catalog.len(),
            path.display(),
            catalog.fingerprint()
        );
        Ok(catalog)
    }

    /// Builds a catalog from typed records, keyed by their own filenames.
    pub fn from_records(records: impl IntoIterator<Item = PhotoRecord>) -> CatalogResult<Self> {
        let entries: Vec<(String, PhotoRecord)> = records
            .into_iter()
            .map(|record| (record.filename.clone(), record))
            .collect();
        let mut catalog = Self::build(entries, String::new())?;
        catalog.fingerprint = fingerprint_of(catalog.to_json_string()?.as_bytes());
        Ok(catalog)
    }

    fn build(entries: Vec<(String, PhotoRecord)>, fingerprint: String) -> CatalogResult<Self> {
        let mut records = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());

        for (key, record) in entries {
            let malformed = |defect| CatalogError::MalformedRecord {
                key: key.clone(),
                defect,
            };

            if index.contains_key(&key) {
                return Err(malformed(RecordDefect::DuplicateKey));
            }
            if record.filename != key {
                return Err(malformed(RecordDefect::KeyMismatch {
                    filename: record.filename.clone(),
                }));
            }
            record.validate().map_err(malformed)?;

            index.insert(key, records.len());
            records.push(record);
        }

        Ok(Self {
            records,
            index,
            fingerprint,
        })
    }

    pub fn get(&self, filename: &str) -> Option<&PhotoRecord> {
        self.index.get(filename).map(|&i| &self.records[i])
    }

    /// Records in source order, optionally restricted to one category.
    pub fn list<'s, 'c>(
        &'s self,
        category: Option<&'c str>,
    ) -> impl Iterator<Item = &'s PhotoRecord> + 'c
    where
        's: 'c,
    {
        self.records
            .iter()
            .filter(move |record| category.is_none_or(|c| record.category == c))
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.category.as_str()).collect()
    }

    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.category.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Display order of the gallery page: manual order first, then the EXIF
    /// capture time (undated photos last), then filename.
    pub fn gallery_order(&self) -> Vec<&PhotoRecord> {
        let mut ordered: Vec<&PhotoRecord> = self.records.iter().collect();
        ordered.sort_by(|a, b| {
            a.gallery_order()
                .cmp(&b.gallery_order())
                .then_with(|| capture_key(a).cmp(&capture_key(b)))
                .then_with(|| a.filename.cmp(&b.filename))
        });
        ordered
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// SHA-256 of the bytes this catalog was loaded from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn to_json_string(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The catalog in the generator's JavaScript module form.
    pub fn to_js_module(&self) -> CatalogResult<String> {
        Ok(format!(
            "{}\nconst {} = {};\n",
            JS_MODULE_HEADER,
            JS_BINDING,
            self.to_json_string()?
        ))
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.filename, record)?;
        }
        map.end()
    }
}

fn capture_key(record: &PhotoRecord) -> (bool, &str) {
    match record.exif.taken_at() {
        Some(taken) => (false, taken),
        None => (true, record.filename.as_str()),
    }
}

pub(crate) fn fingerprint_of(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Returns the JSON object inside a `const photoMetadata = {...};` module, or
/// the input unchanged when it is already plain JSON.
fn strip_js_module(source: &[u8]) -> &[u8] {
    let mut rest = source.trim_ascii();

    while rest.starts_with(b"//") {
        rest = match rest.iter().position(|&b| b == b'\n') {
            Some(newline) => rest[newline + 1..].trim_ascii_start(),
            None => &[],
        };
    }

    let is_declaration = [&b"const "[..], b"let ", b"var ", b"export "]
        .iter()
        .any(|keyword| rest.starts_with(keyword));
    if !is_declaration {
        return rest;
    }

    match rest.iter().position(|&b| b == b'=') {
        Some(eq) => {
            let body = rest[eq + 1..].trim_ascii();
            body.strip_suffix(b";").unwrap_or(body).trim_ascii_end()
        }
        None => rest,
    }
}

/// Top-level entries in document order, duplicates included.
struct RawEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object keyed by photo filename")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
