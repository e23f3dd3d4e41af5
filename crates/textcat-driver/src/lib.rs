//! textcat Driver
//!
//! Building blocks for the `textcat-train` and `textcat-score` command-line
//! drivers: declarative dataset loading, document sampling, and a small
//! client for the training/scoring API. [`run`] holds the flows themselves.

pub mod cli;
pub mod client;
pub mod datasets;
pub mod error;
pub mod output;
pub mod run;
pub mod sampling;
pub mod selection;

pub use client::ServiceClient;
pub use datasets::{take_dataset, DatasetLoader, DatasetSpec, DatasetsConfig, Record, RecordStream};
pub use error::{DriverError, Result};
pub use output::score_line;
pub use run::{run_score, run_train, Outcome};
pub use sampling::{collect_documents, TextExtractor};
pub use selection::{parse_selection, ModelSelector, PromptSelector};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber used by both drivers
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        "textcat=debug"
    } else {
        "textcat=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
