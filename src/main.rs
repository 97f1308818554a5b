use clap::Parser;
use predict_shim::app::serve::{run, shutdown_signal};
use predict_shim::core::ConfigProvider;
use predict_shim::utils::{logger, validation::Validate};
use predict_shim::{CliConfig, ShimError, TomlConfig};

fn load_config(cli: &CliConfig) -> Result<Box<dyn ConfigProvider>, ShimError> {
    match &cli.config {
        Some(path) => {
            let mut config = TomlConfig::from_file(path)?;
            config.validate()?;

            // logging flags given on the command line still apply
            let logging = config.logging.get_or_insert_with(Default::default);
            logging.verbose |= cli.verbose;
            logging.json |= cli.json_logs;
            logging.monitor |= cli.monitor;
            Ok(Box::new(config))
        }
        None => {
            cli.validate()?;
            Ok(Box::new(cli.clone()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let verbose = config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting predict-shim");
    if verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(config.as_ref(), shutdown_signal()).await {
        tracing::error!("❌ Startup failed: {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    Ok(())
}
