use financial_dashboard::catalog::{self, RESULT};
use financial_dashboard::display::{highlights, NO_DATA_MESSAGE};
use financial_dashboard::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("💰 Receita Líquida/Bruta\n");

    let mut state = PageState::for_page(Page::Revenue)?;

    for card in state.headline_cards_with_rng(&mut rand::thread_rng()) {
        println!(
            "  {:<16} {:>18}   {}",
            card.title,
            card.formatted_value(),
            card.formatted_trend()
        );
    }

    println!("\nVisão geral das receitas:");
    for point in state.chart_points() {
        let (value, name) = display::tooltip(&point);
        println!("  {:<45} {}", name, value);
    }

    state.select_category(Some(RESULT));
    match state.category_chart() {
        CategoryChart::Values(records) => {
            println!("\n{} por mês:", RESULT);
            for record in records {
                println!("  {:<4} {}", record.month, format_brl(record.value));
            }
        }
        CategoryChart::PlanVsActual(_) => {}
        CategoryChart::NoData => println!("{}", NO_DATA_MESSAGE),
    }

    // The home page reads the cost catalog over its own fixed window
    let home = DashboardPipeline::new(catalog::home_catalog())?;
    let range = Page::Home.default_range().unwrap_or(DateRange::new(1, 2025, 10, 2025));
    let snapshot = home.build(&range)?;
    let aggregator = home.aggregator();

    println!("\n🏠 Destaques:");
    for line in highlights(
        &aggregator.top_categories(&snapshot.series, 1),
        &aggregator.overview_totals(&snapshot.series),
        &range,
        home.catalog().locale,
    ) {
        println!("  • {}", line);
    }

    println!("\n{}", serde_json::to_string_pretty(&state.totals())?);

    Ok(())
}
