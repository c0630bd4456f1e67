pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod snapshot;
pub mod status;
pub mod unit_code;
pub mod window;

pub use pipeline::{run_once, RunSummary};
