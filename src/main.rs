//! creepmerge CLI - Consolidate creep-test spreadsheets
//!
//! # Commands
//!
//! ```bash
//! creepmerge serve                     # Start HTTP server (port 3000)
//! creepmerge process readings.xlsx     # Consolidate into processed_data.xlsx
//! creepmerge inspect readings.xlsx     # Detection + grouping summary, no output
//! ```

use clap::{Parser, Subcommand};
use creepmerge::{inspect_path, process_path, ProcessSummary};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "creepmerge")]
#[command(about = "Consolidate creep-test spreadsheets by test condition", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidate a spreadsheet and write the processed workbook
    Process {
        /// Input spreadsheet (xlsx or delimited text)
        input: PathBuf,

        /// Output workbook path
        #[arg(short, long, default_value = "processed_data.xlsx")]
        output: PathBuf,
    },

    /// Inspect a spreadsheet: detection results and grouping summary
    Inspect {
        /// Input spreadsheet (xlsx or delimited text)
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process { input, output } => cmd_process(&input, &output),

        Commands::Inspect { input } => cmd_inspect(&input),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_process(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let summary = process_path(input, output)?;
    print_summary(&summary);

    eprintln!("\n💾 Workbook written to: {}", output.display());
    eprintln!("✨ Done!");
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔎 Inspecting: {}", input.display());

    let summary = inspect_path(input)?;
    print_summary(&summary);

    eprintln!("\n✨ Dry run, no output written");
    Ok(())
}

fn print_summary(summary: &ProcessSummary) {
    eprintln!("   Format: {}", summary.format);
    if let Some(ref encoding) = summary.encoding {
        eprintln!("   Encoding: {}", encoding);
    }
    if let Some(delimiter) = summary.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(delimiter));
    }
    eprintln!("   Rows: {}", summary.input_rows);
    eprintln!("   Columns: {}", summary.input_columns.join(", "));
    eprintln!("\n📦 Consolidated: {} test conditions", summary.group_count);
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    creepmerge::server::start_server(port).await
}
