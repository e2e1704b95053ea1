//! Regulator entry point: CLI, config, tracing, and process wiring.

use std::process;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use carbon_regulator::assets::{Asset, Battery};
use carbon_regulator::cli::{self, CliOptions};
use carbon_regulator::config::{ConfigError, RegulatorConfig};
use carbon_regulator::intensity::{NationalGridSource, SimulatedSource};
use carbon_regulator::regulation::{RegulationSettings, RegulationSummary, Regulator, shutdown};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves the configuration: file or preset, then environment, then CLI.
fn load_config(cli: &CliOptions) -> Result<RegulatorConfig, Vec<ConfigError>> {
    let mut config = match (&cli.config, &cli.preset) {
        (Some(path), _) => RegulatorConfig::from_toml_file(path),
        (None, Some(name)) => RegulatorConfig::from_preset(name),
        (None, None) => Ok(RegulatorConfig::national_grid()),
    }
    .map_err(|e| vec![e])?;

    config
        .apply_env(|key| std::env::var(key).ok())
        .map_err(|e| vec![e])?;
    if let Some(secs) = cli.interval_secs {
        config.regulation.interval_secs = Some(secs);
    }

    let errors = config.validate();
    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors)
    }
}

fn build_assets(config: &RegulatorConfig) -> Vec<Box<dyn Asset>> {
    config
        .assets
        .iter()
        .map(|a| {
            Box::new(Battery::new(a.id.clone(), a.max_charge_kw, a.max_discharge_kw))
                as Box<dyn Asset>
        })
        .collect()
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        cli::print_usage();
        return;
    }

    let config = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(errors) => {
            for e in &errors {
                eprintln!("{e}");
            }
            process::exit(1);
        }
    };
    let Some(interval) = config.interval() else {
        eprintln!("config error: regulation.interval_secs - must be > 0");
        process::exit(1);
    };
    let settings = RegulationSettings {
        interval,
        channel_capacity: config.regulation.channel_capacity,
    };
    let assets = build_assets(&config);

    let (trigger, shutdown) = shutdown::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                trigger.trigger();
            }
            Err(e) => error!(error = %e, "cannot listen for ctrl-c, running until killed"),
        }
    });

    let outcome = if config.source.kind == "simulated" {
        info!(seed = config.source.seed, "using simulated intensity source");
        let source = SimulatedSource::new(config.source.seed);
        Regulator::new(source, assets, settings).run(shutdown).await
    } else {
        let timeout = std::time::Duration::from_secs(config.source.timeout_secs);
        let source =
            match NationalGridSource::new(&config.source.base_url, &config.source.endpoint, timeout) {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("error: failed to build HTTP client: {e}");
                    process::exit(1);
                }
            };
        info!(url = source.url(), "using national grid intensity source");
        Regulator::new(source, assets, settings).run(shutdown).await
    };

    match outcome {
        Ok(RegulationSummary { producer, consumer }) => info!(
            cycles = producer.cycles,
            published = producer.published,
            held = producer.held,
            fetch_failures = producer.fetch_failures,
            dispatched = consumer.directives,
            asset_failures = consumer.asset_failures,
            "regulator stopped"
        ),
        Err(e) => {
            error!(error = %e, "regulator failed");
            process::exit(1);
        }
    }
}
