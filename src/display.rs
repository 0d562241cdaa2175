//! Text and card values handed to the dashboard renderers.
//!
//! Currency follows pt-BR conventions (`R$ 1.234,56`); percentages keep one
//! decimal with a dot, as the KPI cards show them.

use crate::aggregate::{ChartPoint, Totals};
use crate::period::{month_label, DateRange};
use crate::schema::MonthLocale;
use serde::Serialize;

pub const NO_DATA_MESSAGE: &str = "Sem dados para a categoria ou período selecionado.";
pub const DEDUCTION_SUFFIX: &str = " (dedução)";

/// `R$ 1.234,56`, or `-R$ 1.234,56` for negative values.
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}R$ {},{:02}",
        sign,
        group_thousands(cents / 100),
        cents % 100
    )
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// `12.3%`
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", without_negative_zero(value))
}

/// `+3.2%` / `-1.0%`
pub fn format_trend(trend: f64) -> String {
    let trend = without_negative_zero(trend);
    if trend >= 0.0 {
        format!("+{:.1}%", trend)
    } else {
        format!("{:.1}%", trend)
    }
}

fn without_negative_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub title: String,
    pub value: f64,
    pub trend: f64,
    pub is_percentage: bool,
}

impl KpiCard {
    pub fn currency(title: &str, value: f64, trend: f64) -> Self {
        Self {
            title: title.to_string(),
            value,
            trend,
            is_percentage: false,
        }
    }

    pub fn percentage(title: &str, value: f64, trend: f64) -> Self {
        Self {
            title: title.to_string(),
            value,
            trend,
            is_percentage: true,
        }
    }

    pub fn formatted_value(&self) -> String {
        if self.is_percentage {
            format_percent(self.value)
        } else {
            format_brl(self.value)
        }
    }

    pub fn formatted_trend(&self) -> String {
        format_trend(self.trend)
    }

    pub fn is_positive_trend(&self) -> bool {
        self.trend >= 0.0
    }
}

/// Card title for a single-figure totals variant.
pub fn totals_title(totals: &Totals) -> &'static str {
    match totals {
        Totals::PlanVsActual { .. } => "Total Realizado",
        Totals::Cost { .. } => "Custo",
        Totals::GrossRevenue { .. } => "Receita Bruta",
        Totals::NetRevenue { .. } => "Receita Líquida",
        Totals::Result { .. } => "Resultado",
    }
}

/// Cards for a totals value. Plan/actual totals give three cards (planned,
/// actual, variance); the roll-up variants give one. Trends are taken in
/// order from `trends`, missing ones read as 0.
pub fn kpi_cards(totals: &Totals, trends: &[f64]) -> Vec<KpiCard> {
    let trend = |i: usize| trends.get(i).copied().unwrap_or(0.0);

    match *totals {
        Totals::PlanVsActual {
            total_planned,
            total_actual,
            variance_pct,
        } => vec![
            KpiCard::currency("Total Previsto", total_planned, trend(0)),
            KpiCard::currency("Total Realizado", total_actual, trend(1)),
            KpiCard::percentage("Variação", round_one_decimal(variance_pct), trend(2)),
        ],
        _ => vec![KpiCard::currency(
            totals_title(totals),
            totals.headline(),
            trend(0),
        )],
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Value and series name shown when hovering a chart point.
pub fn tooltip(point: &ChartPoint) -> (String, String) {
    let name = if point.deduction {
        format!("{}{}", point.name, DEDUCTION_SUFFIX)
    } else {
        point.name.clone()
    };
    (format_brl(point.signed_value), name)
}

/// Pie slice label, `"Nutrição: 18.4%"`.
pub fn pie_label(point: &ChartPoint, total: f64) -> String {
    format!("{}: {}", point.name, format_percent(point.share_of(total)))
}

/// `"Out/2025"` for the last month of the range.
pub fn period_label(range: &DateRange, locale: MonthLocale) -> String {
    match month_label(range.end.month, locale) {
        Some(label) => format!("{}/{}", label, range.end.year),
        None => range.end.to_string(),
    }
}

/// Home page highlight sentences.
pub fn highlights(
    top: &[ChartPoint],
    totals: &Totals,
    range: &DateRange,
    locale: MonthLocale,
) -> Vec<String> {
    let period = period_label(range, locale);
    let lead = match top.first() {
        Some(point) => format!(
            "{} lidera com {} em gastos até {}.",
            point.name,
            format_brl(point.value),
            period
        ),
        None => format!("Sem gastos registrados até {}.", period),
    };

    let variance = round_one_decimal(totals.variance().unwrap_or(0.0));

    vec![
        lead,
        format!(
            "Variação de {} em relação ao previsto em {}.",
            format_trend(variance),
            range.end.year
        ),
        "Acesse Custos Variáveis para análises detalhadas por categoria e período.".to_string(),
    ]
}
