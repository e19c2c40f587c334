use anyhow::Context;
use clap::{Parser, Subcommand};
use scorecast_api::{RestApi, ServiceContext};
use scorecast_core::{
    train, DatasetSchema, EstimatorConfig, ForestParams, Record, SyntheticDataset, TrainingConfig,
};
use scorecast_storage::ArtifactStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Student performance prediction service
#[derive(Parser, Debug)]
#[command(name = "scorecast")]
#[command(about = "Train and serve student performance predictions", long_about = None)]
struct Args {
    /// Path to the data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model and save the artifact bundle
    Train {
        /// JSON file with labeled rows; a synthetic dataset is generated
        /// when omitted
        #[arg(long)]
        data: Option<PathBuf>,

        /// Number of synthetic rows when no data file is given
        #[arg(long, default_value_t = 500)]
        rows: usize,

        /// Estimator to train: "forest" or "linear"
        #[arg(long, default_value = "forest")]
        model: String,

        /// Seed for data synthesis and the train/test split
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Serve predictions over HTTP
    Serve {
        /// HTTP API port
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting scorecast v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    match args.command {
        Command::Train {
            data,
            rows,
            model,
            seed,
        } => run_train(&args.data_dir, data.as_deref(), rows, &model, seed),
        Command::Serve { port } => run_serve(&args.data_dir, port).await,
    }
}

fn run_train(
    data_dir: &Path,
    data: Option<&Path>,
    rows: usize,
    model: &str,
    seed: u64,
) -> anyhow::Result<()> {
    let schema = DatasetSchema::student_performance();

    let dataset: Vec<Record> = match data {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading dataset {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing dataset {}", path.display()))?
        }
        None => {
            info!(rows, seed, "synthesizing training data");
            SyntheticDataset::new(rows).with_seed(seed).generate()
        }
    };
    info!(rows = dataset.len(), "dataset ready");

    let estimator = match model {
        "linear" => EstimatorConfig::Linear,
        "forest" => EstimatorConfig::RandomForest(ForestParams {
            seed,
            ..ForestParams::default()
        }),
        other => anyhow::bail!("unknown model type: {} (expected forest or linear)", other),
    };
    let config = TrainingConfig {
        estimator,
        seed,
        ..TrainingConfig::default()
    };

    let bundle = train(&schema, &dataset, &config)?;
    info!(
        mse = bundle.metrics.mse,
        rmse = bundle.metrics.rmse,
        mae = bundle.metrics.mae,
        r2 = bundle.metrics.r2,
        "training complete"
    );
    if let Some(importances) = &bundle.report.feature_importances {
        for entry in importances.iter().take(10) {
            info!(
                feature = %entry.feature,
                importance = entry.importance,
                "feature importance"
            );
        }
    }

    let store = ArtifactStore::new(data_dir)?;
    store.save(&bundle)?;
    info!("Model saved to {:?}", store.path());
    Ok(())
}

async fn run_serve(data_dir: &Path, port: u16) -> anyhow::Result<()> {
    let store = ArtifactStore::new(data_dir)?;
    let ctx = Arc::new(ServiceContext::with_startup_load(store)?);
    if !ctx.is_ready() {
        warn!("no trained model; predictions will 503 until one is trained and reloaded");
    }

    let ctx_http = ctx.clone();
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(ctx_http, port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("scorecast started successfully");
    info!("HTTP API: http://localhost:{}/", port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
