use financial_dashboard::aggregate::total_magnitude;
use financial_dashboard::display::{pie_label, tooltip};
use financial_dashboard::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("📊 Custos Variáveis - Relatório\n");

    let mut rng = StdRng::seed_from_u64(2025);
    let mut state = PageState::for_page_with_rng(Page::VariableCosts, &mut rng)?;

    // An inverted range is rejected and the page keeps its data
    if let Err(e) = state.apply_range_with_rng(DateRange::new(12, 2025, 6, 2025), &mut rng) {
        println!("⚠️  {} ({})", state.alert().unwrap_or_default(), e);
    }

    state.apply_range_with_rng(DateRange::new(1, 2025, 6, 2025), &mut rng)?;
    println!(
        "Período: {} a {} ({} meses)\n",
        state.range().start,
        state.range().end,
        state.snapshot().month_count()
    );

    for card in state.kpi_cards_with_rng(&mut rng) {
        println!(
            "  {:<16} {:>18}   {}",
            card.title,
            card.formatted_value(),
            card.formatted_trend()
        );
    }

    println!("\nPrincipais categorias:");
    let top = state.top_categories(5);
    let total = total_magnitude(&top);
    for point in &top {
        let (value, _) = tooltip(point);
        println!("  {:<40} {}", pie_label(point, total), value);
    }

    state.select_category(Some(catalog::FIXED_COST));
    if let CategoryChart::Values(records) = state.category_chart() {
        println!("\n{} por mês:", catalog::FIXED_COST);
        for record in records {
            println!("  {}/{}  {}", record.month, record.year, format_brl(record.value));
        }
    }

    let path = "variable_costs.csv";
    let file = File::create(path)?;
    state
        .snapshot()
        .write_csv(state.pipeline().catalog(), file)?;
    println!("\n✅ CSV exported to {}", path);

    let report_path = "variable_costs.md";
    std::fs::write(
        report_path,
        state.snapshot().to_markdown(state.pipeline().catalog()),
    )?;
    println!("✅ Report exported to {}", report_path);

    Ok(())
}
