//! Dropout risk entrypoint. Commands: `scan` (default), `train`, `predict <student-id>`,
//! `importance`. A scan with a non-zero interval runs as a daemon until Ctrl+C.

use dropout_risk::{
    config::AppConfig, logging::StructuredLogger, predictor, service::DropoutService,
    storage::RecordStore,
};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

static STOP: AtomicBool = AtomicBool::new(false);

enum Command {
    Scan,
    Train,
    Predict(String),
    Importance,
}

fn parse_command(mut args: impl Iterator<Item = String>) -> Result<Command, BoxError> {
    match args.next().as_deref() {
        None | Some("scan") => Ok(Command::Scan),
        Some("train") => Ok(Command::Train),
        Some("importance") => Ok(Command::Importance),
        Some("predict") => args
            .next()
            .map(Command::Predict)
            .ok_or_else(|| "usage: dropout-risk predict <student-id>".into()),
        Some(other) => Err(format!("unknown command {:?}", other).into()),
    }
}

fn run_scan(service: &DropoutService, out: &mut impl Write) -> Result<(), BoxError> {
    let report = service.scan_report(&STOP)?;
    for result in &report.results {
        StructuredLogger::emit_json(result, &mut *out)?;
    }
    if report.is_partial() {
        warn!(
            failed = report.failed,
            cancelled = report.cancelled,
            "scan finished with partial results"
        );
    }
    Ok(())
}

fn main() -> Result<(), BoxError> {
    let config_path = std::env::var("DROPOUT_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = AppConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    let command = parse_command(std::env::args().skip(1))?;
    info!(database = ?config.database_path, backend = ?config.scoring.backend, "dropout risk starting");

    let store = Arc::new(RecordStore::open(&config.database_path)?);
    let scorer = predictor::from_config(&config)?;
    let service = DropoutService::new(
        store,
        scorer,
        config.scan.workers,
        config.training.seed,
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Train => {
            let summary = service.train_model()?;
            StructuredLogger::emit_json(&summary, &mut out)?;
        }
        Command::Predict(id) => {
            let prediction = service.predict_for_student(&id)?;
            StructuredLogger::emit_json(&prediction, &mut out)?;
        }
        Command::Importance => {
            let importance = service.get_feature_importance()?;
            StructuredLogger::emit_json(&importance, &mut out)?;
        }
        Command::Scan if config.scan.interval_secs > 0 => {
            let interval_secs = config.scan.interval_secs;
            info!(interval_secs, "daemon mode (Ctrl+C to stop)");
            let _ = ctrlc::set_handler(|| STOP.store(true, Ordering::Relaxed));
            let mut cycle: u64 = 0;
            while !STOP.load(Ordering::Relaxed) {
                cycle += 1;
                if let Err(e) = run_scan(&service, &mut out) {
                    warn!(cycle, error = %e, "scan cycle failed");
                }
                for _ in 0..interval_secs {
                    if STOP.load(Ordering::Relaxed) {
                        break;
                    }
                    std::thread::sleep(Duration::from_secs(1));
                }
            }
            info!("dropout risk stopping");
        }
        Command::Scan => {
            let _ = ctrlc::set_handler(|| STOP.store(true, Ordering::Relaxed));
            run_scan(&service, &mut out)?;
        }
    }

    Ok(())
}
