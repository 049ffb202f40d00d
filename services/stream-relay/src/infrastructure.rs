// Infrastructure layer modules
pub mod kinesis_ops;
pub mod logging;
pub mod relay_config;

// Re-exports
pub use kinesis_ops::{AwsKinesisOps, DryRunKinesisOps, KinesisOps, KinesisOpsError, PutRecordOutput};
pub use logging::init_logging;
pub use relay_config::{RelayConfig, RelayConfigError};
