//! Aggregates over published datasets.
//!
//! These are the numbers the web viewer charts: occurrences per year
//! (optionally for one locality), the most frequent species and the month
//! with the most occurrences.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::config::FILES_INDEX_NAME;
use crate::error::{CollectorError, Result};
use crate::index::{list_json_files, read_manifest};
use crate::types::{CollectionResult, OccurrenceRecord, LOCALITY_FIELD};

/// Label used for records without any taxon information.
pub const UNIDENTIFIED_SPECIES: &str = "Unidentified species";

/// First run of four digits in a file name.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})").expect("valid regex"));

/// Extract the dataset year from a file name.
///
/// # Examples
/// ```
/// use simba_collector::stats::year_from_filename;
///
/// assert_eq!(year_from_filename("simba_Penha_2023.json"), Some(2023));
/// assert_eq!(year_from_filename("notes.json"), None);
/// ```
pub fn year_from_filename(filename: &str) -> Option<u16> {
    YEAR_PATTERN
        .captures(filename)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Species label of a record: scientific name, then vernacular name, then
/// genus when a taxon rank is given.
pub fn species_label(record: &OccurrenceRecord) -> &str {
    record
        .get_non_empty("scientificName")
        .or_else(|| record.get_non_empty("vernacularName"))
        .or_else(|| {
            record
                .get_non_empty("taxonRank")
                .and_then(|_| record.get_non_empty("genus"))
        })
        .unwrap_or(UNIDENTIFIED_SPECIES)
}

/// One dataset file and its parsed content.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub filename: String,
    pub year: u16,
    pub result: CollectionResult,
}

/// Load every dataset of a directory.
///
/// Files listed in the directory's manifest are used when there is one,
/// otherwise all JSON files. Files without a year in their name are skipped,
/// as are files that fail to read or parse (logged).
pub fn load_datasets(dir: &Path) -> Result<Vec<Dataset>> {
    let manifest_path = dir.join(FILES_INDEX_NAME);
    let filenames = if manifest_path.is_file() {
        read_manifest(&manifest_path)?.files().to_vec()
    } else {
        list_json_files(dir)?
    };

    let mut datasets = Vec::new();
    for filename in filenames {
        let Some(year) = year_from_filename(&filename) else {
            tracing::debug!(file = %filename, "No year in file name, skipping");
            continue;
        };

        match read_dataset(&dir.join(&filename)) {
            Ok(result) => datasets.push(Dataset {
                filename,
                year,
                result,
            }),
            Err(e) => tracing::warn!(file = %filename, error = %e, "Skipping unreadable dataset"),
        }
    }
    Ok(datasets)
}

fn read_dataset(path: &Path) -> Result<CollectionResult> {
    let content = fs::read_to_string(path).map_err(CollectorError::file("read", path))?;
    Ok(serde_json::from_str(&content)?)
}

/// Aggregates over a set of datasets, one per year.
#[derive(Debug, Clone, Default)]
pub struct DatasetStats {
    by_year: BTreeMap<u16, Dataset>,
}

impl DatasetStats {
    /// Group datasets by year. When several files share a year, the one
    /// loaded last wins.
    pub fn new(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        let mut by_year = BTreeMap::new();
        for dataset in datasets {
            if let Some(previous) = by_year.insert(dataset.year, dataset) {
                tracing::debug!(
                    file = %previous.filename,
                    "Replaced by a later dataset of the same year"
                );
            }
        }
        Self { by_year }
    }

    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.by_year.keys().copied()
    }

    fn records(&self) -> impl Iterator<Item = &OccurrenceRecord> {
        self.by_year.values().flat_map(|d| d.result.records())
    }

    /// Occurrences per year, for all localities or just one.
    pub fn yearly_occurrences(&self, locality: Option<&str>) -> BTreeMap<u16, usize> {
        self.by_year
            .iter()
            .map(|(&year, dataset)| {
                let count = match locality {
                    None => dataset.result.count(),
                    Some(wanted) => dataset
                        .result
                        .records()
                        .iter()
                        .filter(|r| r.get(LOCALITY_FIELD) == Some(wanted))
                        .count(),
                };
                (year, count)
            })
            .collect()
    }

    /// Distinct non-empty localities, sorted.
    pub fn localities(&self) -> Vec<String> {
        self.records()
            .filter_map(|r| r.get_non_empty(LOCALITY_FIELD))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The `n` most frequent species, most frequent first, ties by name.
    pub fn top_species(&self, n: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in self.records() {
            *counts.entry(species_label(record)).or_default() += 1;
        }

        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(species, count)| (species.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    /// Month (1-12) with the most occurrences across all years, with its count.
    ///
    /// Records whose event date does not parse are ignored. On a tie the
    /// earlier month wins.
    pub fn seasonal_peak(&self) -> Option<(u32, usize)> {
        let mut per_month = [0usize; 12];
        for record in self.records() {
            let Some(day) = record.event_day() else {
                continue;
            };
            if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
                per_month[date.month0() as usize] += 1;
            }
        }

        per_month
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .fold(None, |best: Option<(u32, usize)>, (month0, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((month0 as u32 + 1, count)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EVENT_DATE_FIELD;
    use pretty_assertions::assert_eq;

    fn record(fields: &[(&str, &str)]) -> OccurrenceRecord {
        fields.iter().copied().collect()
    }

    fn dataset(filename: &str, records: Vec<OccurrenceRecord>) -> Dataset {
        Dataset {
            filename: filename.to_string(),
            year: year_from_filename(filename).unwrap(),
            result: CollectionResult::new("Penha", "2024-01-01", records),
        }
    }

    fn sample_stats() -> DatasetStats {
        DatasetStats::new(vec![
            dataset(
                "simba_Penha_2023.json",
                vec![
                    record(&[
                        ("scientificName", "Chelonia mydas"),
                        (LOCALITY_FIELD, "Armação"),
                        (EVENT_DATE_FIELD, "2023-07-02T10:00:00"),
                    ]),
                    record(&[
                        ("vernacularName", "Pinguim-de-magalhães"),
                        (LOCALITY_FIELD, "Centro"),
                        (EVENT_DATE_FIELD, "2023-07-15T09:00:00"),
                    ]),
                ],
            ),
            dataset(
                "simba_Penha_2024.json",
                vec![
                    record(&[
                        ("scientificName", "Chelonia mydas"),
                        (LOCALITY_FIELD, "Armação"),
                        (EVENT_DATE_FIELD, "2024-01-20T08:00:00"),
                    ]),
                    record(&[("taxonRank", "genus"), ("genus", "Sula")]),
                    record(&[(EVENT_DATE_FIELD, "not a date")]),
                ],
            ),
        ])
    }

    #[test]
    fn test_year_from_filename() {
        assert_eq!(year_from_filename("simba_Penha_2025.json"), Some(2025));
        assert_eq!(
            year_from_filename("simba_Penha_2025-03-05_to_2025-01-01.json"),
            Some(2025)
        );
        assert_eq!(year_from_filename("simba_Penha.json"), None);
    }

    #[test]
    fn test_species_label_fallbacks() {
        assert_eq!(
            species_label(&record(&[("scientificName", "Sula leucogaster")])),
            "Sula leucogaster"
        );
        assert_eq!(
            species_label(&record(&[("scientificName", ""), ("vernacularName", "Atobá")])),
            "Atobá"
        );
        assert_eq!(
            species_label(&record(&[("taxonRank", "genus"), ("genus", "Sula")])),
            "Sula"
        );
        assert_eq!(species_label(&record(&[("genus", "Sula")])), UNIDENTIFIED_SPECIES);
    }

    #[test]
    fn test_yearly_occurrences() {
        let stats = sample_stats();
        assert_eq!(
            stats.yearly_occurrences(None),
            BTreeMap::from([(2023, 2), (2024, 3)])
        );
        assert_eq!(
            stats.yearly_occurrences(Some("Armação")),
            BTreeMap::from([(2023, 1), (2024, 1)])
        );
        assert_eq!(stats.years().collect::<Vec<_>>(), vec![2023, 2024]);
    }

    #[test]
    fn test_localities() {
        assert_eq!(
            sample_stats().localities(),
            vec!["Armação".to_string(), "Centro".to_string()]
        );
    }

    #[test]
    fn test_top_species() {
        let top = sample_stats().top_species(2);
        assert_eq!(
            top,
            vec![
                ("Chelonia mydas".to_string(), 2),
                ("Pinguim-de-magalhães".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_seasonal_peak() {
        assert_eq!(sample_stats().seasonal_peak(), Some((7, 2)));
        assert_eq!(DatasetStats::default().seasonal_peak(), None);
    }

    #[test]
    fn test_same_year_last_dataset_wins() {
        let stats = DatasetStats::new(vec![
            dataset("simba_Penha_2024.json", vec![OccurrenceRecord::new()]),
            dataset("simba_Penha_2024-05-01_to_2024-01-01.json", Vec::new()),
        ]);
        assert_eq!(stats.yearly_occurrences(None), BTreeMap::from([(2024, 0)]));
    }
}
