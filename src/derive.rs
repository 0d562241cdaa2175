use crate::error::{DashboardError, Result};
use crate::period::MonthSlot;
use crate::schema::{DashboardCatalog, DerivationRule, DerivedCategory, DerivedRole};
use crate::{CategorySeries, SeriesMap, ValueRecord};
use log::debug;
use std::collections::HashSet;

/// One signed reference inside a roll-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub category: String,
    pub coefficient: f64,
}

impl Term {
    fn plus(category: &str) -> Self {
        Self {
            category: category.to_string(),
            coefficient: 1.0,
        }
    }

    fn minus(category: &str) -> Self {
        Self {
            category: category.to_string(),
            coefficient: -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivationStep {
    pub name: String,
    pub role: DerivedRole,
    pub terms: Vec<Term>,
}

/// Derived categories resolved to flat term lists and sorted so every step
/// only reads primaries or steps that come before it.
#[derive(Debug, Clone)]
pub struct DerivationPlan {
    steps: Vec<DerivationStep>,
}

impl DerivationPlan {
    pub fn new(catalog: &DashboardCatalog) -> Result<Self> {
        let mut pending: Vec<DerivationStep> = catalog
            .derived
            .iter()
            .map(|derived| resolve_step(catalog, derived))
            .collect::<Result<_>>()?;

        let derived_names: HashSet<&str> =
            catalog.derived.iter().map(|d| d.name.as_str()).collect();

        let mut ordered: Vec<DerivationStep> = Vec::with_capacity(pending.len());
        let mut done: HashSet<String> = HashSet::new();

        // Stable Kahn's algorithm: always take the first pending step whose
        // derived dependencies are satisfied, so catalog order is kept where possible.
        while !pending.is_empty() {
            let ready = pending.iter().position(|step| {
                step.terms.iter().all(|term| {
                    !derived_names.contains(term.category.as_str()) || done.contains(&term.category)
                })
            });

            match ready {
                Some(idx) => {
                    let step = pending.remove(idx);
                    done.insert(step.name.clone());
                    ordered.push(step);
                }
                None => {
                    let names: Vec<&str> = pending.iter().map(|s| s.name.as_str()).collect();
                    return Err(DashboardError::DerivationCycle(names.join(", ")));
                }
            }
        }

        debug!(
            "Derivation order for '{}': [{}]",
            catalog.name,
            ordered
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self { steps: ordered })
    }

    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    pub fn order(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Adds every roll-up to `series`, month by month over `months`.
    ///
    /// Reads primary `actual` and derived `value` fields only; nothing is
    /// drawn at random here. Every source must hold one record per month.
    /// On error `series` is left untouched.
    pub fn apply(&self, series: &mut SeriesMap, months: &[MonthSlot]) -> Result<()> {
        let mut derived = SeriesMap::new();

        for step in &self.steps {
            let mut sources = Vec::with_capacity(step.terms.len());
            for term in &step.terms {
                let source = derived
                    .get(&term.category)
                    .or_else(|| series.get(&term.category))
                    .ok_or_else(|| DashboardError::MissingSeries(term.category.clone()))?;
                check_length(&term.category, source, months.len())?;
                sources.push((term.coefficient, source));
            }

            let records: Vec<ValueRecord> = months
                .iter()
                .enumerate()
                .map(|(index, slot)| ValueRecord {
                    month: slot.label.clone(),
                    year: slot.year(),
                    value: sources
                        .iter()
                        .filter_map(|(coefficient, source)| {
                            source.value_at(index).map(|v| coefficient * v)
                        })
                        .sum(),
                    date: slot.date,
                })
                .collect();

            derived.insert(step.name.clone(), CategorySeries::Derived(records));
        }

        series.extend(derived);
        Ok(())
    }
}

pub(crate) fn check_length(category: &str, series: &CategorySeries, expected: usize) -> Result<()> {
    if series.len() != expected {
        return Err(DashboardError::SeriesLengthMismatch {
            category: category.to_string(),
            expected,
            found: series.len(),
        });
    }
    Ok(())
}

fn resolve_step(catalog: &DashboardCatalog, derived: &DerivedCategory) -> Result<DerivationStep> {
    let terms = match &derived.rule {
        DerivationRule::Sum { categories } => categories.iter().map(|c| Term::plus(c)).collect(),
        DerivationRule::SumOfRoles { roles } => catalog
            .categories_with_roles(roles)
            .map(|c| Term::plus(&c.name))
            .collect(),
        DerivationRule::Difference {
            minuend,
            subtrahend,
        } => vec![Term::plus(minuend), Term::minus(subtrahend)],
    };

    for term in &terms {
        let known = catalog.is_primary(&term.category) || catalog.is_derived(&term.category);
        if !known {
            return Err(DashboardError::UnknownReference {
                derived: derived.name.clone(),
                reference: term.category.clone(),
            });
        }
    }

    Ok(DerivationStep {
        name: derived.name.clone(),
        role: derived.role,
        terms,
    })
}
