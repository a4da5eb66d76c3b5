mod engine;
mod error;
mod pipeline;
mod stats;

pub use engine::SieveEngine;
pub use error::EngineError;
pub use pipeline::{ClassificationPipeline, PipelineConfig, PipelineHandle, PipelineState};
pub use prism_core::StopToken;
pub use stats::{PipelineReport, PipelineStats};
