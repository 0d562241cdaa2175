use financial_dashboard::catalog::{
    self, FIXED_COST, FIXED_COST_COMPONENTS, GROSS_REVENUE, NET_REVENUE, RESULT, TOTAL_COST,
};
use financial_dashboard::page::INVALID_RANGE_ALERT;
use financial_dashboard::*;
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn output_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

fn derived_values(snapshot: &DashboardSnapshot, name: &str) -> Vec<f64> {
    snapshot
        .series_for(name)
        .and_then(|s| s.as_derived())
        .map(|records| records.iter().map(|r| r.value).collect())
        .unwrap_or_default()
}

fn actuals(snapshot: &DashboardSnapshot, name: &str) -> Vec<f64> {
    snapshot
        .series_for(name)
        .and_then(|s| s.as_primary())
        .map(|records| records.iter().map(|r| r.actual).collect())
        .unwrap_or_default()
}

fn stub_series(months: &[MonthSlot], actual: &[f64]) -> CategorySeries {
    CategorySeries::Primary(
        months
            .iter()
            .zip(actual)
            .map(|(slot, &value)| PlanActualRecord {
                month: slot.label.clone(),
                year: slot.year(),
                planned: value,
                actual: value,
                date: slot.date,
            })
            .collect(),
    )
}

#[test]
fn test_revenue_page_full_year() {
    let pipeline = DashboardPipeline::new(catalog::revenue_catalog()).unwrap();
    let mut rng = StdRng::seed_from_u64(2025);
    let range = DateRange::new(1, 2025, 10, 2025);
    let snapshot = pipeline.build_with_rng(&range, &mut rng).unwrap();

    assert_eq!(
        snapshot.labels(),
        vec!["Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out"]
    );

    for (name, series) in &snapshot.series {
        assert_eq!(series.len(), 10, "{} should cover every month", name);
    }

    let gross = derived_values(&snapshot, GROSS_REVENUE);
    let net = derived_values(&snapshot, NET_REVENUE);
    let total_cost = derived_values(&snapshot, TOTAL_COST);
    let result = derived_values(&snapshot, RESULT);

    for i in 0..10 {
        let deductions = actuals(&snapshot, "Descontos sobre Vendas")[i]
            + actuals(&snapshot, "Fretes sobre Vendas")[i];
        assert!(
            (net[i] - (gross[i] + deductions)).abs() < 1e-6,
            "net revenue should be gross plus deductions in month {}",
            i
        );
        assert!(
            (result[i] - (net[i] - total_cost[i])).abs() < 1e-6,
            "result should be net revenue minus total cost in month {}",
            i
        );
    }

    let aggregator = pipeline.aggregator();
    match aggregator.totals(&snapshot.series, Some(RESULT)) {
        Some(Totals::Result { total }) => {
            assert!((total - result.iter().sum::<f64>()).abs() < 1e-6);
        }
        other => panic!("expected result totals, got {:?}", other),
    }

    let overview = aggregator.chart_points(&snapshot.series, None);
    assert_eq!(overview.len(), 11);
    assert!(overview.iter().all(|p| p.value >= 0.0));
    assert_eq!(overview.iter().filter(|p| p.deduction).count(), 2);
    for point in &overview {
        assert_eq!(point.value, point.signed_value.abs());
    }

    println!("✓ Revenue page test passed");
}

#[test]
fn test_stubbed_primaries_roll_up_exactly() {
    let pipeline = DashboardPipeline::new(catalog::home_catalog()).unwrap();
    let range = DateRange::new(1, 2025, 2, 2025);
    let months = pipeline.expand(&range);

    let mut primaries = SeriesMap::new();
    for definition in &pipeline.catalog().categories {
        let values = match definition.name.as_str() {
            "Administração" => vec![100.0, 200.0],
            "Mão-de-Obra" => vec![50.0, 60.0],
            _ => vec![0.0, 0.0],
        };
        primaries.insert(definition.name.clone(), stub_series(&months, &values));
    }

    let snapshot = pipeline.build_from_primaries(&range, primaries).unwrap();
    assert_eq!(derived_values(&snapshot, FIXED_COST), vec![150.0, 260.0]);
    assert_eq!(derived_values(&snapshot, TOTAL_COST), vec![150.0, 260.0]);

    let totals = pipeline.aggregator().totals(&snapshot.series, None).unwrap();
    assert_eq!(totals, Totals::plan_vs_actual(410.0, 410.0));
    assert_eq!(totals.variance(), Some(0.0));
}

#[test]
fn test_short_primaries_are_rejected() {
    let pipeline = DashboardPipeline::new(catalog::home_catalog()).unwrap();
    let range = DateRange::new(1, 2025, 3, 2025);
    let months = pipeline.expand(&range);

    let mut primaries = SeriesMap::new();
    for definition in &pipeline.catalog().categories {
        primaries.insert(
            definition.name.clone(),
            stub_series(&months[..1], &[1200.0]),
        );
    }

    let result = pipeline.build_from_primaries(&range, primaries);
    assert!(
        matches!(
            result,
            Err(DashboardError::SeriesLengthMismatch {
                expected: 3,
                found: 1,
                ..
            })
        ),
        "Expected a length mismatch, got {:?}",
        result.map(|s| s.month_count())
    );

    // A full-length set over the same range still rolls up
    let mut primaries = SeriesMap::new();
    for definition in &pipeline.catalog().categories {
        primaries.insert(
            definition.name.clone(),
            stub_series(&months, &[1200.0, 0.0, 0.0]),
        );
    }
    let snapshot = pipeline.build_from_primaries(&range, primaries).unwrap();
    assert_eq!(derived_values(&snapshot, TOTAL_COST).len(), 3);

    println!("✓ Short primary series rejected");
}

#[test]
fn test_multi_year_range_keeps_years_apart() {
    let pipeline = DashboardPipeline::new(catalog::variable_costs_catalog()).unwrap();
    let mut rng = StdRng::seed_from_u64(77);
    let snapshot = pipeline
        .build_with_rng(&DateRange::new(11, 2023, 2, 2025), &mut rng)
        .unwrap();

    assert_eq!(snapshot.month_count(), 16);

    let records = snapshot
        .series_for("Nutrição")
        .and_then(|s| s.as_primary())
        .unwrap();
    let january: Vec<i32> = records
        .iter()
        .filter(|r| r.month == "Jan")
        .map(|r| r.year)
        .collect();
    assert_eq!(january, vec![2024, 2025]);

    for (slot, record) in snapshot.months.iter().zip(records) {
        assert_eq!(slot.date, record.date);
    }
}

#[test]
fn test_zero_draws_are_deterministic() {
    let pipeline = DashboardPipeline::new(catalog::home_catalog()).unwrap();
    let range = DateRange::new(1, 2025, 3, 2025);

    let first = pipeline.build_with_rng(&range, &mut StepRng::new(0, 0)).unwrap();
    let second = pipeline.build_with_rng(&range, &mut StepRng::new(0, 0)).unwrap();
    assert_eq!(first.series, second.series);

    let admin = first
        .series_for("Administração")
        .and_then(|s| s.as_primary())
        .unwrap();
    let planned: Vec<f64> = admin.iter().map(|r| r.planned).collect();
    assert_eq!(planned, vec![1000.0, 1200.0, 1400.0]);

    let fixed = derived_values(&first, FIXED_COST);
    let expected: f64 = FIXED_COST_COMPONENTS
        .iter()
        .map(|name| actuals(&first, name)[0])
        .sum();
    assert_eq!(fixed[0], expected);
}

#[test]
fn test_page_query_lifecycle() {
    let mut rng = StdRng::seed_from_u64(10);
    let mut state = PageState::for_page_with_rng(Page::VariableCosts, &mut rng).unwrap();
    assert_eq!(state.snapshot().month_count(), 12);

    state
        .apply_range_with_rng(DateRange::new(3, 2024, 8, 2024), &mut rng)
        .unwrap();
    assert_eq!(state.snapshot().month_count(), 6);
    let kept = state.snapshot().series.clone();

    let result = state.apply_range_with_rng(DateRange::new(9, 2024, 1, 2024), &mut rng);
    assert!(result.is_err());
    assert_eq!(state.alert(), Some(INVALID_RANGE_ALERT));
    assert_eq!(state.snapshot().series, kept);

    state.select_category(Some(TOTAL_COST));
    match state.totals() {
        Some(Totals::Cost { total }) => assert!(total > 0.0),
        other => panic!("expected cost totals, got {:?}", other),
    }
    assert_eq!(state.chart_points().len(), 6);
    assert_eq!(state.snapshot().series, kept);

    println!("✓ Page lifecycle test passed");
}

#[test]
fn test_catalog_from_json_file() {
    let json = r#"{
        "name": "Granja",
        "locale": "EnUs",
        "categories": [
            { "name": "Feed", "role": "Cost", "range": { "min": 100, "max": 200, "step_variation": 10 } },
            { "name": "Vet", "role": "Cost", "range": { "min": 50, "max": 80, "step_variation": 5 } },
            { "name": "Sales", "role": "Revenue", "range": { "min": 900, "max": 1200, "step_variation": 20 } }
        ],
        "derived": [
            { "name": "Margin", "role": "Result", "rule": { "rule": "Difference", "minuend": "Sales", "subtrahend": "Costs" } },
            { "name": "Costs", "role": "Cost", "rule": { "rule": "SumOfRoles", "roles": ["Cost"] } }
        ]
    }"#;

    let path = output_path("financial_dashboard_catalog.json");
    let mut file = File::create(&path).unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let catalog = DashboardCatalog::from_path(&path).unwrap();
    let pipeline = DashboardPipeline::new(catalog).unwrap();
    assert_eq!(pipeline.plan().order(), vec!["Costs", "Margin"]);

    let snapshot = pipeline
        .build_with_rng(&DateRange::new(1, 2025, 3, 2025), &mut StepRng::new(0, 0))
        .unwrap();
    assert_eq!(snapshot.labels(), vec!["Jan", "Feb", "Mar"]);

    let margin = derived_values(&snapshot, "Margin");
    let sales = actuals(&snapshot, "Sales");
    let costs = derived_values(&snapshot, "Costs");
    for i in 0..3 {
        assert_eq!(margin[i], sales[i] - costs[i]);
    }
}

#[test]
fn test_invalid_catalogs_are_rejected() {
    let mut bad_reference = catalog::home_catalog();
    bad_reference.derived.push(DerivedCategory::new(
        "Extra",
        DerivedRole::Cost,
        DerivationRule::Sum {
            categories: vec!["Aluguel".to_string()],
        },
    ));
    assert!(matches!(
        DashboardPipeline::new(bad_reference).unwrap_err(),
        DashboardError::UnknownReference { .. }
    ));

    let mut bad_range = catalog::home_catalog();
    bad_range.categories[0].range = CategoryRange::new(10.0, 5.0, 1.0);
    assert!(matches!(
        DashboardPipeline::new(bad_range).unwrap_err(),
        DashboardError::InvalidCategoryRange { .. }
    ));
}

#[test]
fn test_exports() {
    let pipeline = DashboardPipeline::new(catalog::revenue_catalog()).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let snapshot = pipeline
        .build_with_rng(&DateRange::new(1, 2025, 10, 2025), &mut rng)
        .unwrap();

    let csv_path = output_path("financial_dashboard_revenue.csv");
    let file = File::create(&csv_path).unwrap();
    snapshot.write_csv(pipeline.catalog(), file).unwrap();

    let written = std::fs::read_to_string(&csv_path).unwrap();
    let expected_rows = 1 + snapshot.series.len() * 10;
    assert_eq!(written.lines().count(), expected_rows);
    assert!(written.starts_with("Category,Month,Year,Date,Planned,Actual,Value"));

    let report = snapshot.to_markdown(pipeline.catalog());
    assert!(report.contains(RESULT));
    assert!(report.contains("| Out/2025 |"));

    println!(
        "✓ Export test passed - output: {}",
        csv_path.display()
    );
}

#[test]
fn test_spreadsheet_integration() {
    let path = output_path("financial_dashboard_upload.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "Categoria,Mes,Previsto,Realizado").unwrap();
    writeln!(file, "Nutrição,Jan,12000,11850").unwrap();
    writeln!(file, "Sanidade,Jan,3000,3120").unwrap();

    let mut history = IntegrationHistory::new();
    let sheet = history.integrate(&path).unwrap();

    assert_eq!(
        sheet.header().unwrap(),
        &["Categoria", "Mes", "Previsto", "Realizado"]
    );
    assert_eq!(sheet.body().len(), 2);
    assert_eq!(history.len(), 1);
    assert!(history.messages()[0].starts_with("financial_dashboard_upload.csv - Integrado em "));

    assert!(history.integrate(output_path("relatorio.txt")).is_err());
    assert_eq!(history.len(), 1);
}

#[test]
fn test_schema_generation() {
    let schema_json = DashboardCatalog::schema_as_json().unwrap();

    let path = output_path("financial_dashboard_schema.json");
    let mut file = File::create(&path).unwrap();
    file.write_all(schema_json.as_bytes()).unwrap();

    assert!(schema_json.contains("CategoryRole"));
    assert!(schema_json.contains("DerivationRule"));
    assert!(schema_json.contains("overview_roles"));

    println!("✓ Schema generation test passed - output: {}", path.display());
}
