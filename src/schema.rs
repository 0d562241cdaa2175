use crate::error::{DashboardError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

fn default_trend_spread() -> f64 {
    5.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum CategoryRole {
    #[schemars(description = "Operating cost line (feed, labour, fees...). Positive values are money spent.")]
    Cost,

    #[schemars(description = "Sales or sales-linked revenue line. Positive values are money earned.")]
    Revenue,

    #[schemars(
        description = "Deduction from sales (discounts, freight). Generated with negative ranges and flagged as a deduction in tooltips."
    )]
    Deduction,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum DerivedRole {
    #[schemars(description = "A cost roll-up such as fixed cost or total cost")]
    Cost,

    #[schemars(description = "Operating revenue before deductions")]
    GrossRevenue,

    #[schemars(description = "Operating revenue after deductions")]
    NetRevenue,

    #[schemars(description = "Final result of the period (revenue minus cost)")]
    Result,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CategoryRange {
    #[schemars(description = "Lower bound of the planned value for the first month")]
    pub min: f64,

    #[schemars(description = "Upper bound of the planned value for the first month")]
    pub max: f64,

    #[serde(alias = "variation")]
    #[schemars(
        description = "Month-over-month drift added to the base, also the half-width of the actual-vs-planned perturbation"
    )]
    pub step_variation: f64,
}

impl CategoryRange {
    pub const FALLBACK: CategoryRange = CategoryRange {
        min: 5000.0,
        max: 15000.0,
        step_variation: 500.0,
    };

    pub fn new(min: f64, max: f64, step_variation: f64) -> Self {
        Self {
            min,
            max,
            step_variation,
        }
    }

    pub fn spread(&self) -> f64 {
        self.max - self.min
    }

    pub fn validate(&self, category: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || !self.step_variation.is_finite() {
            return Err(DashboardError::InvalidCategoryRange {
                category: category.to_string(),
                details: "bounds and step variation must be finite numbers".to_string(),
            });
        }

        if self.min > self.max {
            return Err(DashboardError::InvalidCategoryRange {
                category: category.to_string(),
                details: format!("min {} is greater than max {}", self.min, self.max),
            });
        }

        if self.step_variation < 0.0 {
            return Err(DashboardError::InvalidCategoryRange {
                category: category.to_string(),
                details: format!("step variation {} is negative", self.step_variation),
            });
        }

        Ok(())
    }
}

impl Default for CategoryRange {
    fn default() -> Self {
        Self::FALLBACK
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CategoryDefinition {
    #[schemars(description = "Display name of the category, also its key in the series map")]
    pub name: String,

    pub role: CategoryRole,

    pub range: CategoryRange,

    #[serde(default = "default_trend_spread")]
    #[schemars(
        description = "KPI trend is drawn uniformly from [-trend_spread, +trend_spread] percent. Defaults to 5."
    )]
    pub trend_spread: f64,
}

impl CategoryDefinition {
    pub fn new(name: &str, role: CategoryRole, min: f64, max: f64, step_variation: f64) -> Self {
        Self {
            name: name.to_string(),
            role,
            range: CategoryRange::new(min, max, step_variation),
            trend_spread: default_trend_spread(),
        }
    }

    pub fn with_trend_spread(mut self, spread: f64) -> Self {
        self.trend_spread = spread;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "rule", rename_all = "PascalCase")]
pub enum DerivationRule {
    #[schemars(description = "Month-by-month sum of the named categories (primary actuals or derived values)")]
    Sum { categories: Vec<String> },

    #[schemars(description = "Month-by-month sum of every primary category carrying one of the listed roles")]
    SumOfRoles { roles: Vec<CategoryRole> },

    #[schemars(description = "Month-by-month minuend minus subtrahend")]
    Difference { minuend: String, subtrahend: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct DerivedCategory {
    pub name: String,

    #[schemars(description = "Which headline figure this roll-up represents; drives the totals variant")]
    pub role: DerivedRole,

    pub rule: DerivationRule,

    #[serde(default = "default_trend_spread")]
    pub trend_spread: f64,
}

impl DerivedCategory {
    pub fn new(name: &str, role: DerivedRole, rule: DerivationRule) -> Self {
        Self {
            name: name.to_string(),
            role,
            rule,
            trend_spread: default_trend_spread(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum MonthLocale {
    #[schemars(description = "Brazilian Portuguese labels: Jan, Fev, Mar, Abr...")]
    PtBr,

    #[schemars(description = "English labels: Jan, Feb, Mar, Apr...")]
    EnUs,
}

impl Default for MonthLocale {
    fn default() -> Self {
        Self::PtBr
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct DashboardCatalog {
    #[schemars(description = "Name of the page or report this catalog feeds")]
    pub name: String,

    #[serde(default)]
    pub locale: MonthLocale,

    #[serde(default)]
    #[schemars(description = "Range used for category names missing from the catalog")]
    pub fallback_range: CategoryRange,

    #[schemars(description = "Primary categories, in display order. Only these draw random values.")]
    pub categories: Vec<CategoryDefinition>,

    #[serde(default)]
    #[schemars(description = "Roll-up categories computed from the primaries, in any order")]
    pub derived: Vec<DerivedCategory>,

    #[serde(default)]
    #[schemars(
        description = "Roles summed and charted when no category is selected. Empty means every primary category."
    )]
    pub overview_roles: Vec<CategoryRole>,
}

impl DashboardCatalog {
    pub fn new(name: &str, categories: Vec<CategoryDefinition>) -> Self {
        Self {
            name: name.to_string(),
            locale: MonthLocale::default(),
            fallback_range: CategoryRange::FALLBACK,
            categories,
            derived: Vec::new(),
            overview_roles: Vec::new(),
        }
    }

    pub fn with_derived(mut self, derived: Vec<DerivedCategory>) -> Self {
        self.derived = derived;
        self
    }

    pub fn with_overview_roles(mut self, roles: Vec<CategoryRole>) -> Self {
        self.overview_roles = roles;
        self
    }

    pub fn with_locale(mut self, locale: MonthLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn find_category(&self, name: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn find_derived(&self, name: &str) -> Option<&DerivedCategory> {
        self.derived.iter().find(|d| d.name == name)
    }

    pub fn is_primary(&self, name: &str) -> bool {
        self.find_category(name).is_some()
    }

    pub fn is_derived(&self, name: &str) -> bool {
        self.find_derived(name).is_some()
    }

    pub fn is_deduction(&self, name: &str) -> bool {
        self.find_category(name)
            .map(|c| c.role == CategoryRole::Deduction)
            .unwrap_or(false)
    }

    pub fn categories_with_roles<'a>(
        &'a self,
        roles: &'a [CategoryRole],
    ) -> impl Iterator<Item = &'a CategoryDefinition> + 'a {
        self.categories.iter().filter(move |c| roles.contains(&c.role))
    }

    /// Primary categories shown when nothing is selected.
    pub fn overview_categories(&self) -> Vec<&CategoryDefinition> {
        if self.overview_roles.is_empty() {
            return self.categories.iter().collect();
        }
        self.categories_with_roles(&self.overview_roles).collect()
    }

    /// Names offered in a category selector: overview primaries, then roll-ups.
    pub fn selectable_categories(&self) -> Vec<&str> {
        self.overview_categories()
            .into_iter()
            .map(|c| c.name.as_str())
            .chain(self.derived.iter().map(|d| d.name.as_str()))
            .collect()
    }

    pub fn trend_spread_for(&self, name: &str) -> f64 {
        self.find_category(name)
            .map(|c| c.trend_spread)
            .or_else(|| self.find_derived(name).map(|d| d.trend_spread))
            .unwrap_or_else(default_trend_spread)
    }

    pub fn fallback_trend_spread(&self) -> f64 {
        default_trend_spread()
    }

    /// Checks ranges and name uniqueness. Derivation references and ordering
    /// are checked when the derivation plan is built.
    pub fn validate(&self) -> Result<()> {
        self.fallback_range.validate("<fallback>")?;

        let mut seen: HashSet<&str> = HashSet::new();
        for category in &self.categories {
            category.range.validate(&category.name)?;
            if !seen.insert(category.name.as_str()) {
                return Err(DashboardError::DuplicateCategory(category.name.clone()));
            }
        }

        for derived in &self.derived {
            if !seen.insert(derived.name.as_str()) {
                return Err(DashboardError::DuplicateCategory(derived.name.clone()));
            }
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DashboardCatalog)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
