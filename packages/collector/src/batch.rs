//! Batch collection over a fixed set of cities and years.
//!
//! Each (city, year) pair is one unit: one API call starting at January 1st
//! of that year, saved as `simba_{city}_{year}.json`. Units are independent;
//! a failed unit is reported and the run moves on.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::collector::Collector;
use crate::config::{DEFAULT_BATCH_CITIES, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_YEARS};
use crate::error::CollectorError;
use crate::types::file_name_component;

/// Cities and years to collect, and the pause between API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub cities: Vec<String>,
    pub years: Vec<u16>,
    pub delay: Duration,
}

impl Default for BatchPlan {
    fn default() -> Self {
        Self {
            cities: DEFAULT_BATCH_CITIES.iter().map(|c| c.to_string()).collect(),
            years: DEFAULT_BATCH_YEARS.to_vec(),
            delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl BatchPlan {
    pub fn with_cities(mut self, cities: Vec<String>) -> Self {
        self.cities = cities;
        self
    }

    pub fn with_years(mut self, years: Vec<u16>) -> Self {
        self.years = years;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// All (city, year) pairs, cities outermost.
    pub fn units(&self) -> Vec<BatchUnit> {
        self.cities
            .iter()
            .flat_map(|city| {
                self.years.iter().map(move |&year| BatchUnit {
                    city: city.clone(),
                    year,
                })
            })
            .collect()
    }
}

/// One city-year pair of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUnit {
    pub city: String,
    pub year: u16,
}

impl BatchUnit {
    pub fn start_date(&self) -> String {
        format!("{}-01-01", self.year)
    }

    pub fn filename(&self) -> String {
        format!("simba_{}_{}.json", file_name_component(&self.city), self.year)
    }
}

/// What happened to one unit.
#[derive(Debug)]
pub enum UnitOutcome {
    /// Records were collected and saved.
    Saved { records: usize, path: PathBuf },
    /// The API returned no records; the empty result was saved anyway.
    Empty { path: PathBuf },
    /// Collection or saving failed.
    Failed(CollectorError),
}

impl UnitOutcome {
    /// Both saved and empty results count towards the success total.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Result of a whole batch run.
#[derive(Debug)]
pub struct BatchSummary {
    pub units: Vec<(BatchUnit, UnitOutcome)>,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.units.len()
    }

    pub fn succeeded(&self) -> usize {
        self.units.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&BatchUnit, &CollectorError)> {
        self.units.iter().filter_map(|(unit, outcome)| match outcome {
            UnitOutcome::Failed(e) => Some((unit, e)),
            _ => None,
        })
    }
}

/// Collect and save a single unit.
pub fn collect_unit(collector: &Collector, unit: &BatchUnit) -> UnitOutcome {
    let start_date = unit.start_date();
    let result = match collector.collect(&unit.city, &start_date) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(city = %unit.city, year = unit.year, error = %e, "Collection failed");
            return UnitOutcome::Failed(e);
        }
    };

    let filename = PathBuf::from(unit.filename());
    match collector.save(&result, Some(&filename)) {
        Ok(path) if result.is_empty() => UnitOutcome::Empty { path },
        Ok(path) => UnitOutcome::Saved {
            records: result.count(),
            path,
        },
        Err(e) => {
            tracing::warn!(city = %unit.city, year = unit.year, error = %e, "Saving failed");
            UnitOutcome::Failed(e)
        }
    }
}

/// Run every unit of the plan in order, sleeping `plan.delay` between calls.
///
/// `on_unit` is invoked after each unit, e.g. to print progress.
pub fn run_batch<F>(collector: &Collector, plan: &BatchPlan, mut on_unit: F) -> BatchSummary
where
    F: FnMut(&BatchUnit, &UnitOutcome),
{
    let units = plan.units();
    let total = units.len();
    let mut results = Vec::with_capacity(total);

    for (i, unit) in units.into_iter().enumerate() {
        if i > 0 && !plan.delay.is_zero() {
            thread::sleep(plan.delay);
        }

        let outcome = collect_unit(collector, &unit);
        on_unit(&unit, &outcome);
        results.push((unit, outcome));
    }

    let summary = BatchSummary { units: results };
    tracing::info!(
        succeeded = summary.succeeded(),
        attempted = summary.attempted(),
        "Batch collection finished"
    );
    summary
}
