/// Stream Relay
///
/// 入力Kinesisストリームのレコードを1件ずつ
/// decode → parse → 再シリアライズ → PutRecord で出力ストリームへ中継する。
/// フィルタリング・集約・重複排除・内容の変換は行わない。
///
/// レコードはバッチ内の順序どおり逐次処理し、最初に失敗したレコードで
/// バッチ全体を中断する（以降のレコードは発行しない）。
use thiserror::Error;
use tracing::{debug, error, info, info_span, Instrument};

use crate::domain::{KinesisBatch, KinesisEventRecord, PartitionKey, PayloadError, RecordPayload};
use crate::infrastructure::{KinesisOps, KinesisOpsError, PutRecordOutput, RelayConfig};

/// レコード処理のエラー型
#[derive(Debug, Error)]
pub enum RelayError {
    /// base64として不正
    #[error("レコードのbase64デコードに失敗: {0}")]
    Decode(base64::DecodeError),
    /// JSONオブジェクトとして不正
    #[error("レコードのJSONパースに失敗: {0}")]
    Parse(serde_json::Error),
    /// 出力ストリームへの発行に失敗
    #[error("出力ストリームへの発行に失敗: {0}")]
    Publish(#[from] KinesisOpsError),
}

impl From<PayloadError> for RelayError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Decode(e) => RelayError::Decode(e),
            PayloadError::Parse(e) => RelayError::Parse(e),
        }
    }
}

/// バッチ処理のエラー型（失敗したレコード位置を含む）
#[derive(Debug, Error)]
#[error("{index}番目のレコードで処理を中断: {source}")]
pub struct BatchError {
    /// バッチ内の位置（0始まり）
    pub index: usize,
    /// 入力レコードのイベントID
    pub event_id: Option<String>,
    #[source]
    pub source: RelayError,
}

/// バッチ処理の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// 受信したレコード数
    pub received_count: usize,
    /// 発行したレコード数
    pub published_count: usize,
}

/// 入力レコードを出力ストリームへ中継する
///
/// 状態を持たない。出力ストリームのクライアントは外部から注入する。
pub struct StreamRelay<K>
where
    K: KinesisOps,
{
    kinesis: K,
    config: RelayConfig,
}

impl<K> StreamRelay<K>
where
    K: KinesisOps,
{
    /// 新しいStreamRelayを作成
    pub fn new(kinesis: K, config: RelayConfig) -> Self {
        Self { kinesis, config }
    }

    /// バッチ内の全レコードを順に処理する
    ///
    /// # 戻り値
    /// * `Ok(BatchSummary)` - 全レコードを発行した
    /// * `Err(BatchError)` - 途中のレコードで失敗した（以降は未処理）
    pub async fn process_batch(&self, batch: &KinesisBatch) -> Result<BatchSummary, BatchError> {
        let received_count = batch.len();
        info!(
            record_count = received_count,
            stream_name = %self.config.outbound_stream_name(),
            "Kinesisバッチ処理開始"
        );

        let mut summary = BatchSummary {
            received_count,
            published_count: 0,
        };

        for (index, record) in batch.records.iter().enumerate() {
            let span = info_span!(
                "record",
                index = index,
                event_id = record.event_id.as_deref().unwrap_or(""),
                event_source_arn = record.event_source_arn.as_deref().unwrap_or(""),
                source_partition_key = record.kinesis.partition_key.as_deref().unwrap_or(""),
                sequence_number = record.kinesis.sequence_number.as_deref().unwrap_or(""),
                approximate_arrival_timestamp = ?record.kinesis.approximate_arrival_timestamp
            );

            match self.process_record(record).instrument(span).await {
                Ok(_) => summary.published_count += 1,
                Err(e) => {
                    error!(
                        index = index,
                        published_count = summary.published_count,
                        remaining_count = received_count - index,
                        error = %e,
                        "レコード処理に失敗、バッチを中断"
                    );
                    return Err(BatchError {
                        index,
                        event_id: record.event_id.clone(),
                        source: e,
                    });
                }
            }
        }

        info!(
            received_count = summary.received_count,
            published_count = summary.published_count,
            "Kinesisバッチ処理完了"
        );

        Ok(summary)
    }

    /// 単一レコードを処理する
    ///
    /// デコード・パースに失敗した場合は発行しない。
    /// 発行に失敗しても再試行しない。
    pub async fn process_record(
        &self,
        record: &KinesisEventRecord,
    ) -> Result<PutRecordOutput, RelayError> {
        let payload = RecordPayload::decode(&record.kinesis.data)?;

        let keys: Vec<&str> = payload.keys().collect();
        debug!(
            record_type = payload.record_type().unwrap_or(""),
            keys = ?keys,
            "ペイロードをデコード"
        );

        let data = payload.to_bytes()?;
        if self.config.log_payload() {
            debug!(payload = %String::from_utf8_lossy(&data), "再シリアライズ済みペイロード");
        }

        let partition_key = PartitionKey::now();

        let output = self
            .kinesis
            .put_record(
                self.config.outbound_stream_name(),
                data,
                partition_key.as_str(),
            )
            .await?;

        debug!(
            partition_key = %partition_key,
            shard_id = %output.shard_id,
            sequence_number = %output.sequence_number,
            "レコードを発行"
        );

        Ok(output)
    }
}
