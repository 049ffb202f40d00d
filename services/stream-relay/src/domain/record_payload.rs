/// レコードペイロード
///
/// base64文字列 → バイト列 → JSONオブジェクト → 再シリアライズの変換を担う。
/// スキーマは持たず、キー順を保持した汎用マップとして扱う。
/// 内容（フィールドの削除・型変換）には一切手を加えない。
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use thiserror::Error;

/// ペイロード変換のエラー型
#[derive(Debug, Error)]
pub enum PayloadError {
    /// base64として不正
    #[error("base64デコードに失敗: {0}")]
    Decode(#[from] base64::DecodeError),
    /// JSONオブジェクトとして不正
    #[error("JSONパースに失敗: {0}")]
    Parse(#[from] serde_json::Error),
}

/// デコード済みのJSONオブジェクト
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPayload {
    fields: Map<String, Value>,
}

impl RecordPayload {
    /// base64文字列をデコードしてJSONオブジェクトとしてパースする
    ///
    /// # エラー
    /// - `PayloadError::Decode`: base64として不正
    /// - `PayloadError::Parse`: UTF-8/JSONとして不正、またはトップレベルがオブジェクトでない
    pub fn decode(data: &str) -> Result<Self, PayloadError> {
        let bytes = STANDARD.decode(data)?;
        Self::parse(&bytes)
    }

    /// バイト列をJSONオブジェクトとしてパースする
    pub fn parse(bytes: &[u8]) -> Result<Self, PayloadError> {
        let fields: Map<String, Value> = serde_json::from_slice(bytes)?;
        Ok(Self { fields })
    }

    /// コンパクトなJSONバイト列に再シリアライズする
    pub fn to_bytes(&self) -> Result<Vec<u8>, PayloadError> {
        Ok(serde_json::to_vec(&self.fields)?)
    }

    /// トップレベルのキー一覧（入力順）
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `type`フィールドの値（ログ用、処理分岐には使わない）
    pub fn record_type(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}
