use std::process;

use chrono::Utc;
use genmon_service::config::AppConfig;
use genmon_service::logging::{self, DataSource, LogLevel};
use genmon_service::run_once;

fn main() {
    // Logging comes up at info until the config says otherwise, so config
    // errors are still reported.
    logging::init_logger(LogLevel::Info, None, false);

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            logging::error(DataSource::System, None, &e.to_string());
            process::exit(1);
        }
    };

    let level = cfg.logging.min_level().unwrap_or(LogLevel::Info);
    logging::init_logger(level, cfg.logging.file.as_deref(), cfg.logging.timestamps);

    match run_once(&cfg, Utc::now()) {
        Ok(summary) => {
            println!(
                "Wrote {} with {} generators.",
                cfg.paths.output_geojson.display(),
                summary.generators
            );
        }
        Err(e) => {
            logging::error(DataSource::System, None, &format!("run aborted: {}", e));
            process::exit(1);
        }
    }
}
