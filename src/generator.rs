use crate::period::MonthSlot;
use crate::schema::{CategoryRange, DashboardCatalog};
use crate::{CategorySeries, PlanActualRecord, SeriesMap};
use log::{debug, warn};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Draws planned/actual series for the primary categories of a catalog.
///
/// The generator holds no state of its own; every call takes the random
/// source explicitly so seeded or stubbed generators can be used.
pub struct SeriesGenerator<'a> {
    catalog: &'a DashboardCatalog,
}

impl<'a> SeriesGenerator<'a> {
    pub fn new(catalog: &'a DashboardCatalog) -> Self {
        Self { catalog }
    }

    /// Range for `category`, or the catalog's fallback when the name is unknown.
    pub fn range_for(&self, category: &str) -> CategoryRange {
        match self.catalog.find_category(category) {
            Some(definition) => definition.range,
            None => {
                warn!(
                    "Category '{}' not found in catalog '{}', using fallback range",
                    category, self.catalog.name
                );
                self.catalog.fallback_range
            }
        }
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        months: &[MonthSlot],
        category: &str,
        rng: &mut R,
    ) -> Vec<PlanActualRecord> {
        let range = self.range_for(category);
        generate_with_range(months, &range, rng)
    }

    /// One primary series per catalog category, keyed by name.
    pub fn generate_all<R: Rng + ?Sized>(&self, months: &[MonthSlot], rng: &mut R) -> SeriesMap {
        let mut series = SeriesMap::new();
        for definition in &self.catalog.categories {
            let records = generate_with_range(months, &definition.range, rng);
            series.insert(definition.name.clone(), CategorySeries::Primary(records));
        }

        debug!(
            "Generated {} primary series over {} months",
            series.len(),
            months.len()
        );

        series
    }

    /// KPI trend in percent, uniform in ±spread and rounded to one decimal.
    pub fn draw_trend<R: Rng + ?Sized>(&self, category: Option<&str>, rng: &mut R) -> f64 {
        let spread = match category {
            Some(name) => self.catalog.trend_spread_for(name),
            None => self.catalog.fallback_trend_spread(),
        };
        draw_trend_with_spread(spread, rng)
    }
}

/// For month index `i`: `planned = floor(min + i·step + r·(max − min))` and
/// `actual = floor(planned + (r − 0.5)·2·step)`, with a fresh `r` in [0, 1)
/// for each draw.
pub fn generate_with_range<R: Rng + ?Sized>(
    months: &[MonthSlot],
    range: &CategoryRange,
    rng: &mut R,
) -> Vec<PlanActualRecord> {
    months
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let base = range.min + index as f64 * range.step_variation;
            let planned = (base + rng.gen::<f64>() * range.spread()).floor();
            let actual =
                (planned + (rng.gen::<f64>() - 0.5) * range.step_variation * 2.0).floor();

            PlanActualRecord {
                month: slot.label.clone(),
                year: slot.year(),
                planned,
                actual,
                date: slot.date,
            }
        })
        .collect()
}

pub fn draw_trend_with_spread<R: Rng + ?Sized>(spread: f64, rng: &mut R) -> f64 {
    if !spread.is_finite() || spread <= 0.0 {
        return 0.0;
    }
    let trend = Uniform::new(-spread, spread).sample(rng);
    (trend * 10.0).round() / 10.0
}
