//! # Financial Dashboard
//!
//! The data pipeline behind a sidebar-navigated financial reporting dashboard
//! (Home, Variable Costs, Net/Gross Revenue, Spreadsheet Integration).
//!
//! ## Core Concepts
//!
//! - **Period expansion**: a start and end month become an ordered list of
//!   month slots, each a display label paired with its date
//! - **Primary categories**: catalog entries with a numeric range; the only
//!   series drawn at random (planned and actual per month)
//! - **Derived categories**: roll-ups such as total cost or net revenue,
//!   computed arithmetically from series already generated for the same query
//! - **Aggregation**: totals per selection (tagged by role), chart points,
//!   top-N rankings, KPI cards and exports
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_dashboard::*;
//!
//! let pipeline = DashboardPipeline::new(catalog::revenue_catalog())?;
//! let snapshot = pipeline.build(&DateRange::new(1, 2025, 10, 2025))?;
//!
//! let aggregator = pipeline.aggregator();
//! let totals = aggregator.totals(&snapshot.series, Some("Resultado"));
//! let pie = aggregator.top_categories(&snapshot.series, 5);
//! ```

pub mod aggregate;
pub mod catalog;
pub mod derive;
pub mod display;
pub mod error;
pub mod export;
pub mod generator;
pub mod integration;
pub mod page;
pub mod period;
pub mod schema;

pub use aggregate::{variance_pct, Aggregator, CategoryChart, ChartPoint, Totals};
pub use derive::{DerivationPlan, DerivationStep, Term};
pub use display::{format_brl, format_percent, format_trend, KpiCard};
pub use error::{DashboardError, Result};
pub use generator::SeriesGenerator;
pub use integration::{IntegrationEntry, IntegrationHistory, ParsedSheet, SpreadsheetFormat};
pub use page::{Page, PageState};
pub use period::*;
pub use schema::*;

use chrono::NaiveDate;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Planned vs actual figures of a primary category for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanActualRecord {
    pub month: String,
    pub year: i32,
    pub planned: f64,
    pub actual: f64,
    /// First day of the month
    pub date: NaiveDate,
}

/// Single computed figure of a derived category for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    pub month: String,
    pub year: i32,
    pub value: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum CategorySeries {
    Primary(Vec<PlanActualRecord>),
    Derived(Vec<ValueRecord>),
}

impl CategorySeries {
    pub fn len(&self) -> usize {
        match self {
            Self::Primary(records) => records.len(),
            Self::Derived(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The figure roll-ups read: `actual` for primaries, `value` for derived.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        match self {
            Self::Primary(records) => records.get(index).map(|r| r.actual),
            Self::Derived(records) => records.get(index).map(|r| r.value),
        }
    }

    pub fn total_planned(&self) -> f64 {
        match self {
            Self::Primary(records) => records.iter().map(|r| r.planned).sum(),
            Self::Derived(_) => 0.0,
        }
    }

    pub fn total_actual(&self) -> f64 {
        match self {
            Self::Primary(records) => records.iter().map(|r| r.actual).sum(),
            Self::Derived(records) => records.iter().map(|r| r.value).sum(),
        }
    }

    pub fn as_primary(&self) -> Option<&[PlanActualRecord]> {
        match self {
            Self::Primary(records) => Some(records),
            Self::Derived(_) => None,
        }
    }

    pub fn as_derived(&self) -> Option<&[ValueRecord]> {
        match self {
            Self::Derived(records) => Some(records),
            Self::Primary(_) => None,
        }
    }
}

pub type SeriesMap = BTreeMap<String, CategorySeries>;

/// Everything generated for one query: the expanded months and one series
/// per primary and derived category, each with exactly one record per month.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub range: DateRange,
    pub months: Vec<MonthSlot>,
    pub series: SeriesMap,
}

impl DashboardSnapshot {
    pub fn month_count(&self) -> usize {
        self.months.len()
    }

    pub fn labels(&self) -> Vec<String> {
        month_labels(&self.months)
    }

    pub fn series_for(&self, category: &str) -> Option<&CategorySeries> {
        self.series.get(category)
    }
}

/// One page's pipeline: a catalog plus its derivation plan, resolved once.
#[derive(Debug, Clone)]
pub struct DashboardPipeline {
    catalog: DashboardCatalog,
    plan: DerivationPlan,
}

impl DashboardPipeline {
    pub fn new(catalog: DashboardCatalog) -> Result<Self> {
        catalog.validate()?;
        let plan = DerivationPlan::new(&catalog)?;

        debug!(
            "Catalog '{}' has {} primary and {} derived categories",
            catalog.name,
            catalog.categories.len(),
            plan.steps().len()
        );

        Ok(Self { catalog, plan })
    }

    pub fn catalog(&self) -> &DashboardCatalog {
        &self.catalog
    }

    pub fn plan(&self) -> &DerivationPlan {
        &self.plan
    }

    pub fn generator(&self) -> SeriesGenerator<'_> {
        SeriesGenerator::new(&self.catalog)
    }

    pub fn aggregator(&self) -> Aggregator<'_> {
        Aggregator::new(&self.catalog)
    }

    pub fn expand(&self, range: &DateRange) -> Vec<MonthSlot> {
        range.expand(self.catalog.locale)
    }

    pub fn build(&self, range: &DateRange) -> Result<DashboardSnapshot> {
        self.build_with_rng(range, &mut rand::thread_rng())
    }

    /// Generates every primary series and then the roll-ups.
    ///
    /// An inverted range is rejected before anything is generated, so no
    /// partial snapshot is ever returned.
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        range: &DateRange,
        rng: &mut R,
    ) -> Result<DashboardSnapshot> {
        range.validate()?;

        let months = self.expand(range);
        let mut series = self.generator().generate_all(&months, rng);
        self.plan.apply(&mut series, &months)?;

        info!(
            "Built '{}' dashboard for {} to {} ({} months, {} series)",
            self.catalog.name,
            range.start,
            range.end,
            months.len(),
            series.len()
        );

        Ok(DashboardSnapshot {
            range: *range,
            months,
            series,
        })
    }

    /// Derives the roll-ups over caller-supplied primary series instead of
    /// generated ones. Each supplied series must cover every month of `range`.
    pub fn build_from_primaries(
        &self,
        range: &DateRange,
        primaries: SeriesMap,
    ) -> Result<DashboardSnapshot> {
        range.validate()?;

        let months = self.expand(range);
        for (name, records) in &primaries {
            derive::check_length(name, records, months.len())?;
        }
        let mut series = primaries;
        self.plan.apply(&mut series, &months)?;

        Ok(DashboardSnapshot {
            range: *range,
            months,
            series,
        })
    }
}

pub fn build_dashboard(catalog: DashboardCatalog, range: &DateRange) -> Result<DashboardSnapshot> {
    DashboardPipeline::new(catalog)?.build(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_series_matches_month_count() {
        let pipeline = DashboardPipeline::new(catalog::revenue_catalog()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let snapshot = pipeline
            .build_with_rng(&DateRange::new(11, 2024, 2, 2026), &mut rng)
            .unwrap();

        assert_eq!(snapshot.month_count(), 16);
        for (name, series) in &snapshot.series {
            assert_eq!(series.len(), 16, "series '{}' has wrong length", name);
        }

        let expected = pipeline.catalog().categories.len() + pipeline.catalog().derived.len();
        assert_eq!(snapshot.series.len(), expected);
    }

    #[test]
    fn test_inverted_range_yields_no_snapshot() {
        let pipeline = DashboardPipeline::new(catalog::variable_costs_catalog()).unwrap();
        let result = pipeline.build(&DateRange::new(6, 2025, 1, 2025));
        assert!(matches!(result, Err(DashboardError::InvalidRange { .. })));
    }

    #[test]
    fn test_derived_values_follow_generated_actuals() {
        let pipeline = DashboardPipeline::new(catalog::home_catalog()).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let snapshot = pipeline
            .build_with_rng(&DateRange::new(1, 2025, 10, 2025), &mut rng)
            .unwrap();

        let fixed = snapshot
            .series_for(catalog::FIXED_COST)
            .and_then(|s| s.as_derived())
            .unwrap();
        for (idx, record) in fixed.iter().enumerate() {
            let expected: f64 = catalog::FIXED_COST_COMPONENTS
                .iter()
                .map(|name| snapshot.series_for(name).unwrap().value_at(idx).unwrap())
                .sum();
            assert_eq!(record.value, expected);
        }
    }

    #[test]
    fn test_series_serialize_with_kind_tag() {
        let series = CategorySeries::Derived(vec![ValueRecord {
            month: "Jan".to_string(),
            year: 2025,
            value: 10.0,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }]);
        let json = serde_json::to_string(&series).unwrap();
        assert!(json.contains("\"kind\":\"derived\""));
        assert!(json.contains("\"date\":\"2025-01-01\""));
    }
}
