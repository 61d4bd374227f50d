//! Core data types for the collector.
//!
//! Occurrence records are schema-less: every record carries whatever Darwin
//! Core fields the API sent for it, in document order.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Local, NaiveDate, SecondsFormat};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Darwin Core field holding the date (and usually time) of the event.
pub const EVENT_DATE_FIELD: &str = "eventDate";

/// Darwin Core field holding the locality name.
pub const LOCALITY_FIELD: &str = "locality";

/// Make a value safe to embed in a single file name.
///
/// Path separators become underscores so the name never creates
/// subdirectories.
///
/// # Examples
/// ```
/// use simba_collector::types::file_name_component;
///
/// assert_eq!(file_name_component("Penha/SC"), "Penha_SC");
/// assert_eq!(file_name_component("Balneário Piçarras"), "Balneário Piçarras");
/// ```
pub fn file_name_component(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

/// A single occurrence: an ordered mapping of field name to text value.
///
/// Inserting an existing key replaces its value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceRecord {
    fields: Vec<(String, String)>,
}

impl OccurrenceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the previous value if the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Self::get), but treats an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Leading `YYYY-MM-DD` of the event date, if it is a real calendar day.
    ///
    /// Datetimes (`T` or space separated) and intervals (`start/end`) yield
    /// their first day.
    pub fn event_day(&self) -> Option<&str> {
        self.get_non_empty(EVENT_DATE_FIELD)
            .and_then(|date| date.get(..10))
            .filter(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OccurrenceRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for OccurrenceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OccurrenceRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = OccurrenceRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut record = OccurrenceRecord::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    record.insert(key, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Query filters a collection was made with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub municipality: String,
    pub start_date: String,
}

/// Records returned by one API call, together with the filters used.
///
/// `count` is computed from `records` on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionResult {
    filters: Filters,
    count: usize,
    records: Vec<OccurrenceRecord>,
}

impl CollectionResult {
    pub fn new(
        municipality: impl Into<String>,
        start_date: impl Into<String>,
        records: Vec<OccurrenceRecord>,
    ) -> Self {
        Self {
            filters: Filters {
                municipality: municipality.into(),
                start_date: start_date.into(),
            },
            count: records.len(),
            records,
        }
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn records(&self) -> &[OccurrenceRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest event day across all records, compared lexically.
    pub fn latest_event_day(&self) -> Option<&str> {
        self.records.iter().filter_map(OccurrenceRecord::event_day).max()
    }

    /// End of the covered period: the latest event day, or the start date
    /// when no record carries an event date.
    pub fn end_date(&self) -> &str {
        self.latest_event_day()
            .unwrap_or(self.filters.start_date.as_str())
    }

    /// File name used when saving without an explicit name.
    ///
    /// # Examples
    /// ```
    /// use simba_collector::types::CollectionResult;
    ///
    /// let result = CollectionResult::new("Penha", "2025-01-01", Vec::new());
    /// assert_eq!(result.default_filename(), "simba_Penha_2025-01-01_to_2025-01-01.json");
    /// ```
    pub fn default_filename(&self) -> String {
        format!(
            "simba_{}_{}_to_{}.json",
            file_name_component(&self.filters.municipality),
            self.end_date(),
            file_name_component(&self.filters.start_date)
        )
    }
}

/// Listing of the data files available to the web viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    files: Vec<String>,
    #[serde(rename = "lastUpdated")]
    last_updated: String,
    count: usize,
}

impl FileManifest {
    /// Build a manifest stamped with the current local time.
    pub fn new<I, S>(filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_timestamp(
            filenames,
            Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        )
    }

    /// Build a manifest with a fixed timestamp. Names are deduplicated and sorted.
    pub fn with_timestamp<I, S>(filenames: I, last_updated: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files: Vec<String> = filenames
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            count: files.len(),
            files,
            last_updated: last_updated.into(),
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn last_updated(&self) -> &str {
        &self.last_updated
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.binary_search_by(|f| f.as_str().cmp(filename)).is_ok()
    }
}
