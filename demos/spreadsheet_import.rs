use financial_dashboard::*;
use std::env;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("📥 Integração com Planilha\n");

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        println!("Usage: spreadsheet_import <file.csv|.xls|.xlsx|.xlsb|.ods>...");
        return Ok(());
    }

    let mut history = IntegrationHistory::new();

    for path in &paths {
        match history.integrate(path) {
            Ok(sheet) => {
                if let Some(header) = sheet.header() {
                    println!("{}", header.join(" | "));
                }
                for row in sheet.body().iter().take(10) {
                    println!("{}", row.join(" | "));
                }
                if sheet.body().len() > 10 {
                    println!("... {} more rows", sheet.body().len() - 10);
                }
                println!();
            }
            Err(e) => println!("⚠️  {}: {}\n", path, e),
        }
    }

    println!("Histórico:");
    for message in history.messages() {
        println!("  {}", message);
    }

    Ok(())
}
