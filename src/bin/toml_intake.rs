use anyhow::Context;
use clap::Parser;
use patient_intake::adapters::spreadsheet::read_table;
use patient_intake::core::columns::resolve;
use patient_intake::core::ConfigProvider;
use patient_intake::domain::model::CanonicalField;
use patient_intake::utils::{logger, validation::Validate};
use patient_intake::{EtlEngine, IntakePipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-intake")]
#[command(about = "Patient intake driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "intake-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Resolve columns and report what would be submitted, without calling the service
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based patient intake");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be submitted");
        return perform_dry_run(config).await;
    }

    let pipeline = IntakePipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Patient intake completed successfully!");
            println!("✅ Patient intake completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Patient intake failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Service: {}", config.wsdl_url());
    println!("  Timeout: {}s", config.timeout_seconds());
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if let Some(format) = config.dob_output_format() {
        println!("  DOB format: {}", format);
    }
    match config.postal_data_path() {
        Some(path) => println!("  Postal data: {}", path),
        None => println!("  Postal data: none (City/State kept as given)"),
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: TomlConfig) -> anyhow::Result<()> {
    let data = std::fs::read(config.input_path())
        .with_context(|| format!("reading {}", config.input_path()))?;
    let table = read_table(&data)?;

    let pipeline = IntakePipeline::new(LocalStorage::default(), config);
    let map = pipeline.column_map()?;
    let bindings = map.bind(&table.headers);

    println!("🔍 Dry Run Analysis:");
    println!();
    println!("🔄 Column Bindings:");
    for field in CanonicalField::ALL {
        let marker = if field.is_required() { "*" } else { " " };
        match bindings.header(field) {
            Some(header) => println!("  {} {:<14} <- {}", marker, field.label(), header),
            None => println!("  {} {:<14} <- (not found)", marker, field.label()),
        }
    }

    println!();
    match resolve(&table, &map) {
        Ok(records) => {
            println!("📊 {} records would be submitted", records.len());
        }
        Err(e) => {
            println!("❌ {}", e.user_friendly_message());
            println!("💡 {}", e.recovery_suggestion());
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
    Ok(())
}
