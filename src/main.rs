use airtable_export::utils::error::{ExportError, ErrorSeverity};
use airtable_export::utils::logger;
use airtable_export::{
    AirtableClient, AirtableConfig, CliConfig, Command, CsvProjector, ExportManifest, Fields,
    RecordStore, TableConfig, TableExporter,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: CliConfig) -> Result<(), ExportError> {
    // 憑證缺失時在任何網路請求之前失敗
    let airtable = AirtableConfig::from_env()?;
    let client = AirtableClient::new(&airtable)?;
    let exporter = TableExporter::new(client, CsvProjector::new(&config.project_root));

    match config.command {
        Command::Export { table, output } => {
            let summary = exporter
                .export_table(&TableConfig {
                    name: table,
                    filename: output,
                })
                .await?;
            println!(
                "✅ Exported {} records ({} columns) from {} to {}",
                summary.records,
                summary.columns,
                summary.table,
                summary.path.display()
            );
        }
        Command::ExportAll { manifest } => {
            let manifest = ExportManifest::from_file(&manifest)?;
            for summary in exporter.export_all(&manifest.tables).await? {
                println!(
                    "✅ {}: {} records -> {}",
                    summary.table,
                    summary.records,
                    summary.path.display()
                );
            }
        }
        Command::Create { table, fields } => {
            let fields: Fields = serde_json::from_str(&fields)?;
            let record = exporter.store().create(&table, fields).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Update { table, id, fields } => {
            let fields: Fields = serde_json::from_str(&fields)?;
            let record = exporter.store().update(&table, &id, fields).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Delete { table, id } => {
            exporter.store().delete(&table, &id).await?;
            println!("🗑️  Deleted {} from {}", id, table);
        }
    }

    Ok(())
}
