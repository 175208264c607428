use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "airtable-export")]
#[command(about = "Export Airtable tables to CSV and edit individual records")]
pub struct CliConfig {
    /// Directory that every output file must stay inside
    #[arg(long, global = true, default_value = ".")]
    pub project_root: PathBuf,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch every record of a table and write it as CSV
    Export {
        #[arg(long)]
        table: String,
        #[arg(long)]
        output: String,
    },
    /// Export every table listed in a TOML manifest
    ExportAll {
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Create a record from a JSON object of fields
    Create {
        #[arg(long)]
        table: String,
        #[arg(long)]
        fields: String,
    },
    /// Update the given fields of a record, leaving the others untouched
    Update {
        #[arg(long)]
        table: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        fields: String,
    },
    /// Delete a record
    Delete {
        #[arg(long)]
        table: String,
        #[arg(long)]
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export() {
        let config = CliConfig::parse_from([
            "airtable-export",
            "--project-root",
            "/data",
            "export",
            "--table",
            "Tasks",
            "--output",
            "exports/tasks.csv",
        ]);

        assert_eq!(config.project_root, PathBuf::from("/data"));
        match config.command {
            Command::Export { table, output } => {
                assert_eq!(table, "Tasks");
                assert_eq!(output, "exports/tasks.csv");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_update_with_global_flag_after_subcommand() {
        let config = CliConfig::parse_from([
            "airtable-export",
            "update",
            "--table",
            "Tasks",
            "--id",
            "rec1",
            "--fields",
            r#"{"Status":"Done"}"#,
            "-v",
        ]);

        assert!(config.verbose);
        assert_eq!(config.project_root, PathBuf::from("."));
        assert!(matches!(config.command, Command::Update { .. }));
    }
}
