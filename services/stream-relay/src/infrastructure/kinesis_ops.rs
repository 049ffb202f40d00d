//! Kinesis操作モジュール
//!
//! 出力ストリームへのPutRecord発行を提供する。
//! - AwsKinesisOps: AWS SDKによる実発行
//! - DryRunKinesisOps: ローカル実行用（ログ出力のみ）
//!
//! 再試行は行わない。失敗はそのまま呼び出し元に返し、
//! Lambdaの再試行・リドライブポリシーに任せる。

use async_trait::async_trait;
use aws_sdk_kinesis::Client as KinesisClient;
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Kinesis操作のエラー型
#[derive(Debug, Error)]
pub enum KinesisOpsError {
    /// AWS SDK エラー（スロットリング、ネットワーク障害、権限不足など）
    #[error("AWS Kinesis APIエラー: {0}")]
    AwsSdkError(String),
}

/// PutRecordの応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordOutput {
    /// 書き込まれたシャードID
    pub shard_id: String,
    /// 割り当てられたシーケンス番号
    pub sequence_number: String,
}

impl PutRecordOutput {
    pub fn new(shard_id: impl Into<String>, sequence_number: impl Into<String>) -> Self {
        Self {
            shard_id: shard_id.into(),
            sequence_number: sequence_number.into(),
        }
    }
}

/// Kinesis操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait KinesisOps: Send + Sync {
    /// 1レコードをストリームに発行する
    ///
    /// # 引数
    /// * `stream_name` - 発行先ストリーム名
    /// * `data` - レコード本文
    /// * `partition_key` - パーティションキー
    async fn put_record(
        &self,
        stream_name: &str,
        data: Vec<u8>,
        partition_key: &str,
    ) -> Result<PutRecordOutput, KinesisOpsError>;
}

/// 実際のAWS Kinesis SDKを使用したKinesis操作実装
///
/// SDKクライアントはClone可能かつスレッドセーフなので、
/// プロセス起動時に1度だけ作成して全呼び出しで使い回す。
#[derive(Clone)]
pub struct AwsKinesisOps {
    client: KinesisClient,
}

impl AwsKinesisOps {
    /// 新しいAwsKinesisOpsを作成
    pub fn new(client: KinesisClient) -> Self {
        Self { client }
    }

    /// AWS設定からデフォルトのクライアントを作成
    pub async fn from_config() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = KinesisClient::new(&config);
        Self::new(client)
    }
}

#[async_trait]
impl KinesisOps for AwsKinesisOps {
    async fn put_record(
        &self,
        stream_name: &str,
        data: Vec<u8>,
        partition_key: &str,
    ) -> Result<PutRecordOutput, KinesisOpsError> {
        debug!(
            stream_name = %stream_name,
            partition_key = %partition_key,
            data_length = data.len(),
            "Kinesis PutRecord開始"
        );

        let result = self
            .client
            .put_record()
            .stream_name(stream_name)
            .partition_key(partition_key)
            .data(Blob::new(data))
            .send()
            .await;

        match result {
            Ok(response) => {
                let output = PutRecordOutput::new(response.shard_id(), response.sequence_number());

                info!(
                    stream_name = %stream_name,
                    shard_id = %output.shard_id,
                    sequence_number = %output.sequence_number,
                    "Kinesis PutRecord成功"
                );

                Ok(output)
            }
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                warn!(
                    stream_name = %stream_name,
                    error = %message,
                    "Kinesis PutRecordエラー"
                );
                Err(KinesisOpsError::AwsSdkError(message))
            }
        }
    }
}

/// 発行せずにログ出力のみ行うKinesis操作実装（ローカル確認用）
#[derive(Debug, Default)]
pub struct DryRunKinesisOps {
    sequence: AtomicU64,
}

impl DryRunKinesisOps {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KinesisOps for DryRunKinesisOps {
    async fn put_record(
        &self,
        stream_name: &str,
        data: Vec<u8>,
        partition_key: &str,
    ) -> Result<PutRecordOutput, KinesisOpsError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            stream_name = %stream_name,
            partition_key = %partition_key,
            data = %String::from_utf8_lossy(&data),
            "dry-run: PutRecordをスキップ"
        );

        Ok(PutRecordOutput::new("dry-run", sequence.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_record_output_new() {
        let output = PutRecordOutput::new("shardId-000000000000", "4959");

        assert_eq!(output.shard_id, "shardId-000000000000");
        assert_eq!(output.sequence_number, "4959");
    }

    #[test]
    fn test_kinesis_ops_error_display() {
        let error = KinesisOpsError::AwsSdkError("ProvisionedThroughputExceededException".to_string());
        assert_eq!(
            error.to_string(),
            "AWS Kinesis APIエラー: ProvisionedThroughputExceededException"
        );
    }

    #[tokio::test]
    async fn test_dry_run_assigns_increasing_sequence_numbers() {
        let ops = DryRunKinesisOps::new();

        let first = ops
            .put_record("processed_bitcoin_stream", br#"{"a":1}"#.to_vec(), "1.0")
            .await
            .unwrap();
        let second = ops
            .put_record("processed_bitcoin_stream", br#"{"a":2}"#.to_vec(), "2.0")
            .await
            .unwrap();

        assert_eq!(first, PutRecordOutput::new("dry-run", "1"));
        assert_eq!(second, PutRecordOutput::new("dry-run", "2"));
    }
}
