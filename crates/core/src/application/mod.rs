// Application Layer - Use Cases and Business Logic

pub mod import;
pub mod pipeline;
pub mod queue;
pub mod validator;
pub mod worker;

// Re-exports
pub use import::{ImportAck, ImportService};
pub use pipeline::{ImportPipeline, PipelineConfig, PipelinePorts};
pub use queue::PriorityQueue;
pub use validator::{ValidationError, Validator};
pub use worker::{
    shutdown_channel, ImportWorker, ShutdownSender, ShutdownToken, WorkerPool, WorkerPoolHandle,
};
