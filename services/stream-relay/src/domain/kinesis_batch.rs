/// Kinesisトリガーイベントのモデル
///
/// Lambdaに1回の呼び出しで配信されるレコード群（バッチ）を表す。
/// `kinesis.data`はbase64文字列のまま保持し、デコードはRecordPayloadで行う。
/// （デシリアライズ時にデコードするとレコード単位でDecodeErrorを扱えないため）
use serde::Deserialize;

/// Kinesisトリガーから配信されるバッチ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KinesisBatch {
    /// 配信順のレコード列
    #[serde(rename = "Records", default)]
    pub records: Vec<KinesisEventRecord>,
}

impl KinesisBatch {
    /// レコード列からバッチを作成
    pub fn new(records: Vec<KinesisEventRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// バッチ内の1レコード
///
/// メタデータはログ出力にのみ使用し、処理内容には影響しない。
#[derive(Debug, Clone, Deserialize)]
pub struct KinesisEventRecord {
    /// イベントID（"shardId-000000000000:4954..."形式）
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
    /// 入力ストリームのARN
    #[serde(rename = "eventSourceARN", default)]
    pub event_source_arn: Option<String>,
    /// Kinesisレコード本体
    pub kinesis: KinesisRecordData,
}

impl KinesisEventRecord {
    /// base64データのみを持つレコードを作成（テスト・ローカル実行用）
    pub fn from_data(data: impl Into<String>) -> Self {
        Self {
            event_id: None,
            event_source_arn: None,
            kinesis: KinesisRecordData {
                data: data.into(),
                partition_key: None,
                sequence_number: None,
                approximate_arrival_timestamp: None,
            },
        }
    }
}

/// Kinesisレコードのサブオブジェクト
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisRecordData {
    /// base64エンコードされたJSONペイロード
    pub data: String,
    /// 入力ストリーム側のパーティションキー
    #[serde(default)]
    pub partition_key: Option<String>,
    /// 入力ストリーム側のシーケンス番号
    #[serde(default)]
    pub sequence_number: Option<String>,
    /// 到着時刻（エポック秒）
    #[serde(default)]
    pub approximate_arrival_timestamp: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_EVENT: &str = r#"{
        "Records": [
            {
                "kinesis": {
                    "kinesisSchemaVersion": "1.0",
                    "partitionKey": "1",
                    "sequenceNumber": "49590338271490256608559692538361571095921575989136588898",
                    "data": "eyJ0eXBlIjogImJsb2NrIn0=",
                    "approximateArrivalTimestamp": 1545084650.987
                },
                "eventSource": "aws:kinesis",
                "eventVersion": "1.0",
                "eventID": "shardId-000000000006:49590338271490256608559692538361571095921575989136588898",
                "eventName": "aws:kinesis:record",
                "invokeIdentityArn": "arn:aws:iam::123456789012:role/lambda-role",
                "awsRegion": "us-east-2",
                "eventSourceARN": "arn:aws:kinesis:us-east-2:123456789012:stream/raw_bitcoin_stream"
            }
        ]
    }"#;

    #[test]
    fn test_deserialize_kinesis_trigger_event() {
        let batch: KinesisBatch = serde_json::from_str(SAMPLE_EVENT).unwrap();

        assert_eq!(batch.len(), 1);
        let record = &batch.records[0];
        assert_eq!(record.kinesis.data, "eyJ0eXBlIjogImJsb2NrIn0=");
        assert_eq!(record.kinesis.partition_key.as_deref(), Some("1"));
        assert_eq!(
            record.kinesis.sequence_number.as_deref(),
            Some("49590338271490256608559692538361571095921575989136588898")
        );
        assert_eq!(record.kinesis.approximate_arrival_timestamp, Some(1545084650.987));
        assert!(record.event_id.as_deref().unwrap().starts_with("shardId-000000000006"));
        assert!(record.event_source_arn.as_deref().unwrap().ends_with("raw_bitcoin_stream"));
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let batch: KinesisBatch =
            serde_json::from_str(r#"{"Records":[{"kinesis":{"data":"e30="}}]}"#).unwrap();

        assert_eq!(batch.len(), 1);
        assert!(batch.records[0].event_id.is_none());
        assert!(batch.records[0].kinesis.sequence_number.is_none());
    }

    #[test]
    fn test_deserialize_missing_records_is_empty_batch() {
        let batch: KinesisBatch = serde_json::from_str("{}").unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_deserialize_record_without_data_fails() {
        let result = serde_json::from_str::<KinesisBatch>(r#"{"Records":[{"kinesis":{}}]}"#);
        assert!(result.is_err());
    }
}
