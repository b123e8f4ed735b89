//! Fulfillment cost calculator — CLI front end.
//!
//! ```sh
//! # Quote an FBS order against the remote tariff feed
//! fulfillment-calculator --tariff-url https://example.com/exec \
//!     --model fbs --country "Россия" --weight 3 --units 10 --orders 2
//!
//! # FBO order with storage and insurance, exported to CSV
//! fulfillment-calculator --tariff-file tariffs.json \
//!     --model fbo --country "Казахстан" --city "Алматы" \
//!     --weight 4.5 --units 20 --orders 3 --longest-side 40 \
//!     --storage-days 14 --declared-value 250000 --export quote.csv
//! ```

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fulfillment_calculator::domain::{
    calculate, format_result, Country, FulfillmentModel, OrderRequest, RateTable, RawRecord,
    ResultTable, TABLE_HEADER,
};
use fulfillment_calculator::infra::TariffClient;
use fulfillment_calculator::util::{append_record, export_to_file, CalculationRecord};

/// Price a fulfillment order against the tiered tariff table.
#[derive(Parser, Debug)]
#[command(name = "fulfillment-calculator", version)]
struct Cli {
    /// Tariff feed endpoint (the published spreadsheet web app URL).
    #[arg(long, env = "TARIFF_URL")]
    tariff_url: Option<String>,

    /// Local JSON file with an array of raw tariff records (offline use).
    #[arg(long, conflicts_with = "tariff_url")]
    tariff_file: Option<PathBuf>,

    /// Fulfillment model: FBO or FBS.
    #[arg(long)]
    model: FulfillmentModel,

    /// Destination country name (e.g. "Россия"); unknown names price as Russia.
    #[arg(long)]
    country: String,

    /// Destination city (informational, kept in the history record).
    #[arg(long, default_value = "")]
    city: String,

    /// Shipment weight in kilograms.
    #[arg(long)]
    weight: f64,

    /// Number of units in the shipment.
    #[arg(long)]
    units: u32,

    /// Number of orders to assemble.
    #[arg(long)]
    orders: u32,

    /// Longest package side in centimeters (required for FBO).
    #[arg(long, default_value_t = 0.0)]
    longest_side: f64,

    /// Days of warehouse storage.
    #[arg(long, default_value_t = 0)]
    storage_days: u32,

    /// Declared shipment value for the 0.01% insurance fee.
    #[arg(long, default_value_t = 0.0)]
    declared_value: f64,

    /// Bill express assembly in addition to regular assembly.
    #[arg(long)]
    express: bool,

    /// Write the result table to this CSV file.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Skip appending this calculation to the local history file.
    #[arg(long)]
    no_history: bool,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let table = load_table(&cli).await?;

    let request = OrderRequest {
        model: cli.model,
        country: Country::from_name(&cli.country),
        city: cli.city.clone(),
        weight_kg: cli.weight,
        unit_count: cli.units,
        order_count: cli.orders,
        longest_side_cm: cli.longest_side,
        storage_days: cli.storage_days,
        declared_value: cli.declared_value,
        is_express: cli.express,
    };

    let result = calculate(&table, &request)?;
    let rendered = format_result(&result);
    print_table(&rendered);

    if let Some(path) = &cli.export {
        export_to_file(&rendered, path)?;
        info!("exported result table to {}", path.display());
    }

    if !cli.no_history {
        // History is best effort; a failed save never fails the quote.
        let record = CalculationRecord::new(&request, &result);
        if let Err(error) = append_record(&record) {
            warn!("failed to save calculation history: {error}");
        }
    }

    Ok(())
}

async fn load_table(cli: &Cli) -> Result<RateTable, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.tariff_file {
        let records: Vec<RawRecord> = serde_json::from_str(&fs::read_to_string(path)?)?;
        let table = RateTable::from_records(&records);
        if table.is_empty() {
            return Err(format!("{} contains no usable tariff rows", path.display()).into());
        }
        return Ok(table);
    }

    let url = cli
        .tariff_url
        .as_deref()
        .ok_or("either --tariff-url or --tariff-file is required")?;
    let client = TariffClient::new(url)?;
    Ok(client.get_rate_table().await?.table)
}

fn print_table(table: &ResultTable) {
    let [operation, quantity, rate, total] = TABLE_HEADER;
    println!("{operation:<32} {quantity:<18} {rate:<14} {total}");
    for row in &table.rows {
        println!("{:<32} {:<18} {:<14} {}", row[0], row[1], row[2], row[3]);
    }
    println!();
    println!("{:<32} {:<18} {:<14} {}", table.total_row[0], "", "", table.total_row[3]);
}
