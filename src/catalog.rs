//! Built-in catalogs for the dashboard pages.
//!
//! Each page gets its own [`DashboardCatalog`] value; the pipeline never reads
//! these functions directly, so a page can be handed any catalog instead
//! (for example one loaded with [`DashboardCatalog::from_path`]).

use crate::schema::{
    CategoryDefinition, CategoryRole, DashboardCatalog, DerivationRule, DerivedCategory,
    DerivedRole,
};

pub const FIXED_COST: &str = "Custo Fixo";
pub const TOTAL_COST: &str = "Custo Total";
pub const GROSS_REVENUE: &str = "Receita Operacional Bruta";
pub const NET_REVENUE: &str = "Receita Operacional Líquida";
pub const RESULT: &str = "Resultado";

pub const FIXED_COST_COMPONENTS: [&str; 4] = [
    "Administração",
    "Mão-de-Obra",
    "Tarifas",
    "Manutenção e Conservação",
];

pub fn cost_categories() -> Vec<CategoryDefinition> {
    use CategoryRole::Cost;
    vec![
        CategoryDefinition::new("Administração", Cost, 1000.0, 5000.0, 200.0),
        CategoryDefinition::new("Compra de Animais", Cost, 10000.0, 30000.0, 1000.0),
        CategoryDefinition::new("Custos Combustíveis Gerais", Cost, 2000.0, 8000.0, 300.0),
        CategoryDefinition::new("Custos Equip. Proteção Individual", Cost, 500.0, 2000.0, 100.0),
        CategoryDefinition::new("Inseminação", Cost, 3000.0, 10000.0, 400.0),
        CategoryDefinition::new("Manutenção e Conservação", Cost, 4000.0, 12000.0, 500.0),
        CategoryDefinition::new("Mão-de-Obra", Cost, 8000.0, 25000.0, 800.0),
        CategoryDefinition::new("Materiais", Cost, 1500.0, 6000.0, 250.0),
        CategoryDefinition::new("Nutrição", Cost, 7000.0, 20000.0, 600.0),
        CategoryDefinition::new("Sanidade", Cost, 2000.0, 7000.0, 300.0),
        CategoryDefinition::new("Serviços", Cost, 3000.0, 9000.0, 350.0),
        CategoryDefinition::new("Tarifas", Cost, 1000.0, 4000.0, 150.0),
    ]
}

pub fn revenue_categories() -> Vec<CategoryDefinition> {
    use CategoryRole::{Deduction, Revenue};
    vec![
        CategoryDefinition::new("Venda de Cevados", Revenue, 40000.0, 80000.0, 2000.0)
            .with_trend_spread(5.0),
        CategoryDefinition::new("Venda de Matriz/Reprodutor", Revenue, 10000.0, 30000.0, 1000.0)
            .with_trend_spread(4.0),
        CategoryDefinition::new("Venda de Leite", Revenue, 15000.0, 40000.0, 1500.0)
            .with_trend_spread(4.5),
        CategoryDefinition::new("Gtas", Revenue, 1000.0, 3000.0, 100.0).with_trend_spread(2.5),
        CategoryDefinition::new("Fsds", Revenue, 500.0, 2000.0, 80.0).with_trend_spread(2.5),
        CategoryDefinition::new("Funrural", Revenue, 800.0, 2500.0, 90.0).with_trend_spread(2.5),
        CategoryDefinition::new("ICMS", Revenue, 2000.0, 6000.0, 200.0).with_trend_spread(3.0),
        CategoryDefinition::new("Senar", Revenue, 300.0, 1000.0, 50.0).with_trend_spread(2.0),
        CategoryDefinition::new("Fundes", Revenue, 400.0, 1200.0, 60.0).with_trend_spread(2.0),
        CategoryDefinition::new("Descontos sobre Vendas", Deduction, -4000.0, -1000.0, 150.0)
            .with_trend_spread(2.5),
        CategoryDefinition::new("Fretes sobre Vendas", Deduction, -5000.0, -1500.0, 200.0)
            .with_trend_spread(3.0),
    ]
}

fn fixed_cost() -> DerivedCategory {
    DerivedCategory::new(
        FIXED_COST,
        DerivedRole::Cost,
        DerivationRule::Sum {
            categories: FIXED_COST_COMPONENTS.iter().map(|c| c.to_string()).collect(),
        },
    )
}

fn total_cost() -> DerivedCategory {
    DerivedCategory::new(
        TOTAL_COST,
        DerivedRole::Cost,
        DerivationRule::SumOfRoles {
            roles: vec![CategoryRole::Cost],
        },
    )
}

/// Home overview: cost categories over a fixed window.
pub fn home_catalog() -> DashboardCatalog {
    DashboardCatalog::new("Home", cost_categories()).with_derived(vec![fixed_cost(), total_cost()])
}

/// Every primary line, costs first, with cost roll-ups.
pub fn variable_costs_catalog() -> DashboardCatalog {
    let mut categories = cost_categories();
    categories.extend(revenue_categories());
    DashboardCatalog::new("Custos Variáveis", categories)
        .with_derived(vec![fixed_cost(), total_cost()])
}

/// Revenue lines drive the overview; cost lines are generated only so the
/// result can subtract total cost.
pub fn revenue_catalog() -> DashboardCatalog {
    let mut categories = revenue_categories();
    categories.extend(cost_categories());

    DashboardCatalog::new("Receita Líquida/Bruta", categories)
        .with_overview_roles(vec![CategoryRole::Revenue, CategoryRole::Deduction])
        .with_derived(vec![
            DerivedCategory::new(
                GROSS_REVENUE,
                DerivedRole::GrossRevenue,
                DerivationRule::SumOfRoles {
                    roles: vec![CategoryRole::Revenue],
                },
            ),
            DerivedCategory::new(
                NET_REVENUE,
                DerivedRole::NetRevenue,
                DerivationRule::SumOfRoles {
                    roles: vec![CategoryRole::Revenue, CategoryRole::Deduction],
                },
            ),
            total_cost(),
            DerivedCategory::new(
                RESULT,
                DerivedRole::Result,
                DerivationRule::Difference {
                    minuend: NET_REVENUE.to_string(),
                    subtrahend: TOTAL_COST.to_string(),
                },
            ),
        ])
}
