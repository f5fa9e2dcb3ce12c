//! Execution context for the job.
//!
//! The context is the only handle to the compute pool and to the input and
//! output roots. It is created once by the driver and passed explicitly to
//! every stage.

mod options;
mod reader;
mod table;
mod writer;

pub use options::{
    parse_option, Compression, EngineOptions, TimestampZone, WriteMode, DEFAULT_IO_CONCURRENCY,
};
pub use table::TableRow;
pub use writer::{WriteSummary, DEFAULT_PARTITION_NAME, SUCCESS_MARKER};

use crate::config::AppConfig;
use crate::error::{EtlError, Result};
use crate::storage::{open_storage, Storage};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct ExecutionContext {
    input: Arc<dyn Storage>,
    output: Arc<dyn Storage>,
    pool: rayon::ThreadPool,
    options: EngineOptions,
    run_id: Uuid,
}

impl ExecutionContext {
    /// Opens both storage roots and starts the compute pool.
    pub async fn create(config: &AppConfig) -> Result<Self> {
        let input = open_storage(&config.input_root, &config.s3).await?;
        let output = open_storage(&config.output_root, &config.s3).await?;
        let context = Self::new(input, output, config.engine.clone(), config.worker_threads)?;
        info!(
            "Execution context {} ready: input {}, output {}, {} compute threads",
            context.run_id,
            config.input_root,
            config.output_root,
            context.pool.current_num_threads()
        );
        Ok(context)
    }

    pub fn new(
        input: Arc<dyn Storage>,
        output: Arc<dyn Storage>,
        options: EngineOptions,
        worker_threads: Option<usize>,
    ) -> Result<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|index| format!("etl-compute-{}", index));
        if let Some(threads) = worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| EtlError::Config(format!("Could not start compute pool: {}", e)))?;

        Ok(Self {
            input,
            output,
            pool,
            options,
            run_id: Uuid::new_v4(),
        })
    }

    pub fn input(&self) -> &dyn Storage {
        self.input.as_ref()
    }

    pub fn output(&self) -> &dyn Storage {
        self.output.as_ref()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Identifies the files written by this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Runs a data-parallel computation on the compute pool.
    pub fn compute<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}
