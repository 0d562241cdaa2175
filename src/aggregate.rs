use crate::schema::{DashboardCatalog, DerivedRole, MonthLocale};
use crate::{CategorySeries, PlanActualRecord, SeriesMap, ValueRecord};
use serde::Serialize;
use std::cmp::Ordering;

/// Headline figures for a selection. The variant follows the declared role
/// of the selected category, so each one only carries the fields it means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Totals {
    PlanVsActual {
        total_planned: f64,
        total_actual: f64,
        variance_pct: f64,
    },
    Cost {
        total: f64,
    },
    GrossRevenue {
        total: f64,
    },
    NetRevenue {
        total: f64,
    },
    Result {
        total: f64,
    },
}

impl Totals {
    pub fn plan_vs_actual(total_planned: f64, total_actual: f64) -> Self {
        Self::PlanVsActual {
            total_planned,
            total_actual,
            variance_pct: variance_pct(total_planned, total_actual),
        }
    }

    pub fn for_role(role: DerivedRole, total: f64) -> Self {
        match role {
            DerivedRole::Cost => Self::Cost { total },
            DerivedRole::GrossRevenue => Self::GrossRevenue { total },
            DerivedRole::NetRevenue => Self::NetRevenue { total },
            DerivedRole::Result => Self::Result { total },
        }
    }

    /// Actual total for plan/actual selections, the roll-up total otherwise.
    pub fn headline(&self) -> f64 {
        match *self {
            Self::PlanVsActual { total_actual, .. } => total_actual,
            Self::Cost { total }
            | Self::GrossRevenue { total }
            | Self::NetRevenue { total }
            | Self::Result { total } => total,
        }
    }

    pub fn variance(&self) -> Option<f64> {
        match *self {
            Self::PlanVsActual { variance_pct, .. } => Some(variance_pct),
            _ => None,
        }
    }
}

/// `(actual − planned) / planned × 100`, or 0 when nothing was planned.
pub fn variance_pct(planned: f64, actual: f64) -> f64 {
    if planned == 0.0 {
        return 0.0;
    }
    (actual - planned) / planned * 100.0
}

/// A pie slice or bar. `value` is the magnitude used for proportions; the
/// sign survives in `signed_value` for tooltips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
    pub signed_value: f64,
    pub deduction: bool,
}

impl ChartPoint {
    pub fn new(name: &str, signed_value: f64, deduction: bool) -> Self {
        Self {
            name: name.to_string(),
            value: signed_value.abs(),
            signed_value,
            deduction,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.signed_value < 0.0
    }

    /// Percentage of `total` this point represents.
    pub fn share_of(&self, total: f64) -> f64 {
        if total == 0.0 {
            return 0.0;
        }
        self.value / total * 100.0
    }
}

pub fn total_magnitude(points: &[ChartPoint]) -> f64 {
    points.iter().map(|p| p.value).sum()
}

/// Month-by-month data for the detail chart of a selected category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CategoryChart<'s> {
    PlanVsActual(&'s [PlanActualRecord]),
    Values(&'s [ValueRecord]),
    NoData,
}

impl CategoryChart<'_> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

fn selected(selection: Option<&str>) -> Option<&str> {
    selection.map(str::trim).filter(|s| !s.is_empty())
}

pub struct Aggregator<'a> {
    catalog: &'a DashboardCatalog,
}

impl<'a> Aggregator<'a> {
    pub fn new(catalog: &'a DashboardCatalog) -> Self {
        Self { catalog }
    }

    /// Totals for the selection, or `None` when the selected category has no
    /// data (unknown name, missing or empty series). An empty selection
    /// always sums the overview categories.
    pub fn totals(&self, series: &SeriesMap, selection: Option<&str>) -> Option<Totals> {
        let Some(category) = selected(selection) else {
            return Some(self.overview_totals(series));
        };

        let data = series.get(category).filter(|s| !s.is_empty())?;

        if let Some(derived) = self.catalog.find_derived(category) {
            return Some(Totals::for_role(derived.role, data.total_actual()));
        }

        match data {
            CategorySeries::Primary(_) => Some(Totals::plan_vs_actual(
                data.total_planned(),
                data.total_actual(),
            )),
            CategorySeries::Derived(_) => None,
        }
    }

    pub fn overview_totals(&self, series: &SeriesMap) -> Totals {
        let (planned, actual) = self
            .catalog
            .overview_categories()
            .iter()
            .filter_map(|c| series.get(&c.name))
            .fold((0.0, 0.0), |(planned, actual), s| {
                (planned + s.total_planned(), actual + s.total_actual())
            });

        Totals::plan_vs_actual(planned, actual)
    }

    /// Chart-ready points for the selection:
    /// - nothing selected: one point per overview category, `Σ actual`
    /// - primary selected: planned and actual sums, zero points dropped
    /// - derived selected: one point per month
    pub fn chart_points(&self, series: &SeriesMap, selection: Option<&str>) -> Vec<ChartPoint> {
        let Some(category) = selected(selection) else {
            return self.overview_points(series);
        };

        match series.get(category) {
            Some(CategorySeries::Primary(records)) => {
                let deduction = self.catalog.is_deduction(category);
                let (planned_label, actual_label) = self.plan_actual_labels();
                let planned: f64 = records.iter().map(|r| r.planned).sum();
                let actual: f64 = records.iter().map(|r| r.actual).sum();

                [
                    ChartPoint::new(planned_label, planned, deduction),
                    ChartPoint::new(actual_label, actual, deduction),
                ]
                .into_iter()
                .filter(|p| p.value > 0.0)
                .collect()
            }
            Some(CategorySeries::Derived(records)) => records
                .iter()
                .map(|r| ChartPoint::new(&r.month, r.value, false))
                .collect(),
            None => Vec::new(),
        }
    }

    fn overview_points(&self, series: &SeriesMap) -> Vec<ChartPoint> {
        self.catalog
            .overview_categories()
            .iter()
            .filter_map(|c| {
                series.get(&c.name).map(|s| {
                    ChartPoint::new(
                        &c.name,
                        s.total_actual(),
                        self.catalog.is_deduction(&c.name),
                    )
                })
            })
            .collect()
    }

    /// The `n` overview categories with the largest actual magnitude.
    pub fn top_categories(&self, series: &SeriesMap, n: usize) -> Vec<ChartPoint> {
        let mut points = self.overview_points(series);
        points.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
        points.truncate(n);
        points
    }

    pub fn category_chart<'s>(&self, series: &'s SeriesMap, category: &str) -> CategoryChart<'s> {
        match series.get(category) {
            Some(CategorySeries::Primary(records)) if !records.is_empty() => {
                CategoryChart::PlanVsActual(records)
            }
            Some(CategorySeries::Derived(records)) if !records.is_empty() => {
                CategoryChart::Values(records)
            }
            _ => CategoryChart::NoData,
        }
    }

    /// Totals of every catalog category that has a series, primaries first.
    pub fn breakdown(&self, series: &SeriesMap) -> Vec<(String, Totals)> {
        self.catalog
            .categories
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.catalog.derived.iter().map(|d| d.name.as_str()))
            .filter_map(|name| {
                self.totals(series, Some(name))
                    .map(|totals| (name.to_string(), totals))
            })
            .collect()
    }

    fn plan_actual_labels(&self) -> (&'static str, &'static str) {
        match self.catalog.locale {
            MonthLocale::PtBr => ("Previsto", "Realizado"),
            MonthLocale::EnUs => ("Planned", "Actual"),
        }
    }
}
