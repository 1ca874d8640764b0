//! Ingestion jobs and the staged pipeline that runs them.

mod job;
mod runner;
mod sink;

pub use job::{AcquisitionJob, JobSource, JobState};
pub use runner::{IngestionPipeline, JobOutcome, UNPACKED_ACK};
pub use sink::{ErrorSink, MemoryErrorSink, PipelineError, PipelineStage, TracingErrorSink};
