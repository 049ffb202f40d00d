// Domain layer modules
pub mod kinesis_batch;
pub mod partition_key;
pub mod record_payload;

// Re-exports
pub use kinesis_batch::{KinesisBatch, KinesisEventRecord, KinesisRecordData};
pub use partition_key::PartitionKey;
pub use record_payload::{PayloadError, RecordPayload};
