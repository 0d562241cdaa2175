use crate::aggregate::{Aggregator, Totals};
use crate::display::{format_brl, format_percent, kpi_cards};
use crate::error::{DashboardError, Result};
use crate::schema::DashboardCatalog;
use crate::{CategorySeries, DashboardSnapshot};
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Month")]
    month: &'a str,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Planned")]
    planned: Option<f64>,
    #[serde(rename = "Actual")]
    actual: Option<f64>,
    #[serde(rename = "Value")]
    value: Option<f64>,
}

impl DashboardSnapshot {
    /// Series names in catalog order (primaries, then roll-ups), followed by
    /// any series the catalog does not know about.
    pub fn export_order<'s>(&'s self, catalog: &'s DashboardCatalog) -> Vec<&'s str> {
        let mut names: Vec<&str> = catalog
            .categories
            .iter()
            .map(|c| c.name.as_str())
            .chain(catalog.derived.iter().map(|d| d.name.as_str()))
            .filter(|name| self.series.contains_key(*name))
            .collect();

        for name in self.series.keys() {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }

        names
    }

    /// One CSV row per category and month. Primary rows fill Planned/Actual,
    /// derived rows fill Value.
    pub fn write_csv<W: Write>(&self, catalog: &DashboardCatalog, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        for name in self.export_order(catalog) {
            let Some(series) = self.series.get(name) else {
                continue;
            };

            match series {
                CategorySeries::Primary(records) => {
                    for r in records {
                        wtr.serialize(ExportRow {
                            category: name,
                            month: &r.month,
                            year: r.year,
                            date: r.date,
                            planned: Some(r.planned),
                            actual: Some(r.actual),
                            value: None,
                        })?;
                    }
                }
                CategorySeries::Derived(records) => {
                    for r in records {
                        wtr.serialize(ExportRow {
                            category: name,
                            month: &r.month,
                            year: r.year,
                            date: r.date,
                            planned: None,
                            actual: None,
                            value: Some(r.value),
                        })?;
                    }
                }
            }
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv(&self, catalog: &DashboardCatalog) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(catalog, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            DashboardError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Printable report: overview KPIs, per-category totals and the monthly
    /// roll-up table.
    pub fn to_markdown(&self, catalog: &DashboardCatalog) -> String {
        let aggregator = Aggregator::new(catalog);
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", catalog.name));
        output.push_str(&format!(
            "Período: {} a {} ({} meses)\n\n",
            self.range.start,
            self.range.end,
            self.month_count()
        ));

        output.push_str("## Indicadores\n\n");
        output.push_str("| Indicador | Valor |\n|---|---|\n");
        for card in kpi_cards(&aggregator.overview_totals(&self.series), &[]) {
            output.push_str(&format!("| {} | {} |\n", card.title, card.formatted_value()));
        }
        output.push('\n');

        output.push_str("## Totais por Categoria\n\n");
        output.push_str("| Categoria | Previsto | Realizado | Variação |\n|---|---|---|---|\n");
        for (name, totals) in aggregator.breakdown(&self.series) {
            let row = match totals {
                Totals::PlanVsActual {
                    total_planned,
                    total_actual,
                    variance_pct,
                } => format!(
                    "| {} | {} | {} | {} |\n",
                    name,
                    format_brl(total_planned),
                    format_brl(total_actual),
                    format_percent(variance_pct)
                ),
                other => format!("| {} | - | {} | - |\n", name, format_brl(other.headline())),
            };
            output.push_str(&row);
        }
        output.push('\n');

        let derived: Vec<&str> = catalog
            .derived
            .iter()
            .map(|d| d.name.as_str())
            .filter(|name| self.series.contains_key(*name))
            .collect();

        if !derived.is_empty() {
            output.push_str("## Consolidado Mensal\n\n");
            output.push_str(&format!("| Mês | {} |\n", derived.join(" | ")));
            output.push_str(&format!("|---|{}\n", "---|".repeat(derived.len())));

            for (index, slot) in self.months.iter().enumerate() {
                let cells: Vec<String> = derived
                    .iter()
                    .map(|name| {
                        self.series
                            .get(*name)
                            .and_then(|s| s.value_at(index))
                            .map(format_brl)
                            .unwrap_or_else(|| "-".to_string())
                    })
                    .collect();
                output.push_str(&format!(
                    "| {} | {} |\n",
                    slot.label_with_year(),
                    cells.join(" | ")
                ));
            }
        }

        output
    }
}
