use crate::aggregate::{CategoryChart, ChartPoint, Totals};
use crate::catalog::{self, GROSS_REVENUE, NET_REVENUE, RESULT};
use crate::display::{highlights, kpi_cards, KpiCard};
use crate::error::{DashboardError, Result};
use crate::period::{year_options, DateRange};
use crate::schema::DashboardCatalog;
use crate::{DashboardPipeline, DashboardSnapshot};
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;

pub const INVALID_RANGE_ALERT: &str = "A data inicial deve ser anterior ou igual à data final.";

/// Most recent year offered by the range selectors.
pub const LATEST_YEAR: i32 = 2025;
pub const YEAR_OPTION_COUNT: usize = 10;

/// Entries of the sidebar, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Page {
    Home,
    VariableCosts,
    Revenue,
    Integration,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Home,
        Page::VariableCosts,
        Page::Revenue,
        Page::Integration,
    ];

    pub fn route(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::VariableCosts => "/CustosVariaveis",
            Page::Revenue => "/ReceitaLiquida",
            Page::Integration => "/Integracao",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Início",
            Page::VariableCosts => "Custos Variáveis",
            Page::Revenue => "Receita Líquida/Bruta",
            Page::Integration => "Integração Planilha",
        }
    }

    pub fn from_route(route: &str) -> Option<Page> {
        Self::ALL.into_iter().find(|page| page.route() == route)
    }

    /// Catalog behind the page, `None` for pages without generated data.
    pub fn catalog(&self) -> Option<DashboardCatalog> {
        match self {
            Page::Home => Some(catalog::home_catalog()),
            Page::VariableCosts => Some(catalog::variable_costs_catalog()),
            Page::Revenue => Some(catalog::revenue_catalog()),
            Page::Integration => None,
        }
    }

    pub fn default_range(&self) -> Option<DateRange> {
        match self {
            Page::Home | Page::Revenue => Some(DateRange::new(1, LATEST_YEAR, 10, LATEST_YEAR)),
            Page::VariableCosts => Some(DateRange::new(1, LATEST_YEAR, 12, LATEST_YEAR)),
            Page::Integration => None,
        }
    }

    /// Home shows a fixed window with no range selectors.
    pub fn has_range_filter(&self) -> bool {
        matches!(self, Page::VariableCosts | Page::Revenue)
    }

    /// Roll-ups shown as a fixed card row above the overview.
    pub fn headline_categories(&self) -> &'static [&'static str] {
        match self {
            Page::Revenue => &[GROSS_REVENUE, NET_REVENUE, RESULT],
            _ => &[],
        }
    }

    pub fn year_options(&self) -> Vec<i32> {
        year_options(LATEST_YEAR, YEAR_OPTION_COUNT)
    }
}

/// Query state of one data page: the applied range, the selected category
/// and the snapshot generated for that range.
///
/// The snapshot is only redrawn when a different valid range is applied
/// (or on [`PageState::refresh_with_rng`]); selecting a category reuses it.
#[derive(Debug, Clone)]
pub struct PageState {
    page: Page,
    pipeline: DashboardPipeline,
    selected: Option<String>,
    snapshot: DashboardSnapshot,
    alert: Option<String>,
}

impl PageState {
    pub fn for_page(page: Page) -> Result<Self> {
        Self::for_page_with_rng(page, &mut rand::thread_rng())
    }

    pub fn for_page_with_rng<R: Rng + ?Sized>(page: Page, rng: &mut R) -> Result<Self> {
        let (Some(catalog), Some(range)) = (page.catalog(), page.default_range()) else {
            return Err(DashboardError::PageWithoutData(page.title().to_string()));
        };
        Self::with_catalog(page, catalog, range, rng)
    }

    /// Page state over any catalog, starting at `range`.
    pub fn with_catalog<R: Rng + ?Sized>(
        page: Page,
        catalog: DashboardCatalog,
        range: DateRange,
        rng: &mut R,
    ) -> Result<Self> {
        let pipeline = DashboardPipeline::new(catalog)?;
        let snapshot = pipeline.build_with_rng(&range, rng)?;

        info!(
            "Opened page '{}' ({}) for {} to {}",
            page.title(),
            page.route(),
            range.start,
            range.end
        );

        Ok(Self {
            page,
            pipeline,
            selected: None,
            snapshot,
            alert: None,
        })
    }

    pub fn apply_range(&mut self, range: DateRange) -> Result<()> {
        self.apply_range_with_rng(range, &mut rand::thread_rng())
    }

    /// Regenerates the snapshot for a new range.
    ///
    /// A rejected range keeps the previous snapshot and returns the error. The
    /// alert is set only when the start lies after the end; any other outcome
    /// clears it. Re-applying the current range keeps the current values.
    pub fn apply_range_with_rng<R: Rng + ?Sized>(
        &mut self,
        range: DateRange,
        rng: &mut R,
    ) -> Result<()> {
        if let Err(e) = range.validate() {
            warn!("Rejected range on '{}': {}", self.page.title(), e);
            self.alert = matches!(e, DashboardError::InvalidRange { .. })
                .then(|| INVALID_RANGE_ALERT.to_string());
            return Err(e);
        }

        self.alert = None;

        if range == self.snapshot.range {
            debug!("Range {} to {} unchanged, keeping snapshot", range.start, range.end);
            return Ok(());
        }

        self.snapshot = self.pipeline.build_with_rng(&range, rng)?;
        Ok(())
    }

    /// Redraws every random value for the current range.
    pub fn refresh_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.snapshot = self.pipeline.build_with_rng(&self.snapshot.range, rng)?;
        Ok(())
    }

    /// Empty or blank names clear the selection.
    pub fn select_category(&mut self, category: Option<&str>) {
        self.selected = category
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn pipeline(&self) -> &DashboardPipeline {
        &self.pipeline
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    pub fn range(&self) -> DateRange {
        self.snapshot.range
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn is_single_month(&self) -> bool {
        self.snapshot.range.is_single_month()
    }

    pub fn category_options(&self) -> Vec<&str> {
        self.pipeline.catalog().selectable_categories()
    }

    pub fn totals(&self) -> Option<Totals> {
        self.pipeline
            .aggregator()
            .totals(&self.snapshot.series, self.selected_category())
    }

    pub fn chart_points(&self) -> Vec<ChartPoint> {
        self.pipeline
            .aggregator()
            .chart_points(&self.snapshot.series, self.selected_category())
    }

    pub fn top_categories(&self, n: usize) -> Vec<ChartPoint> {
        self.pipeline
            .aggregator()
            .top_categories(&self.snapshot.series, n)
    }

    /// Detail chart of the selected category; no selection reads as no data.
    pub fn category_chart(&self) -> CategoryChart<'_> {
        match self.selected_category() {
            Some(category) => self
                .pipeline
                .aggregator()
                .category_chart(&self.snapshot.series, category),
            None => CategoryChart::NoData,
        }
    }

    /// KPI cards for the current selection with freshly drawn trends.
    pub fn kpi_cards_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<KpiCard> {
        let Some(totals) = self.totals() else {
            return Vec::new();
        };

        let generator = self.pipeline.generator();
        let trends: Vec<f64> = (0..3)
            .map(|_| generator.draw_trend(self.selected_category(), rng))
            .collect();

        kpi_cards(&totals, &trends)
    }

    pub fn kpi_cards(&self) -> Vec<KpiCard> {
        self.kpi_cards_with_rng(&mut rand::thread_rng())
    }

    /// The page's fixed headline cards, independent of the selection.
    pub fn headline_cards_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<KpiCard> {
        let aggregator = self.pipeline.aggregator();
        let generator = self.pipeline.generator();

        self.page
            .headline_categories()
            .iter()
            .copied()
            .filter_map(|name| {
                let totals = aggregator.totals(&self.snapshot.series, Some(name))?;
                let trend = generator.draw_trend(Some(name), rng);
                kpi_cards(&totals, &[trend]).into_iter().next()
            })
            .collect()
    }

    /// Highlight sentences built from the top category and overall variance.
    pub fn highlights(&self) -> Vec<String> {
        let aggregator = self.pipeline.aggregator();
        let top = aggregator.top_categories(&self.snapshot.series, 1);
        let totals = aggregator.overview_totals(&self.snapshot.series);
        highlights(
            &top,
            &totals,
            &self.snapshot.range,
            self.pipeline.catalog().locale,
        )
    }
}
