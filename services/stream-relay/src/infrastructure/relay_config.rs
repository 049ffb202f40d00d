// Stream Relay設定
//
// 出力先Kinesisストリーム名とペイロードログ出力有無を環境変数から読み込む。
// AWS認証情報・リージョンはaws-configのデフォルトチェーンに任せる。

use thiserror::Error;

/// 出力ストリーム名のデフォルト値
pub const DEFAULT_OUTBOUND_STREAM_NAME: &str = "processed_bitcoin_stream";

/// Relay設定エラー
#[derive(Debug, Error)]
pub enum RelayConfigError {
    /// 環境変数またはCLI引数の値が不正
    #[error("設定値が不正です: {name}={value}")]
    InvalidValue { name: String, value: String },
}

/// Stream Relayの設定
///
/// # フィールド
/// - `outbound_stream_name`: PutRecordの発行先ストリーム名
/// - `log_payload`: デコード済みペイロード本文をdebugログに出すか
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    outbound_stream_name: String,
    log_payload: bool,
}

impl RelayConfig {
    /// 新しい設定を作成
    pub fn new(outbound_stream_name: impl Into<String>, log_payload: bool) -> Self {
        Self {
            outbound_stream_name: outbound_stream_name.into(),
            log_payload,
        }
    }

    /// 環境変数から設定を読み込み
    ///
    /// # 環境変数
    /// - `OUTBOUND_STREAM_NAME`: 出力先ストリーム名（デフォルト: processed_bitcoin_stream）
    /// - `LOG_PAYLOAD`: `true`/`1`/`false`/`0`（デフォルト: false）
    ///
    /// # 戻り値
    /// - `Err(RelayConfigError)`: 値が空、または真偽値として解釈できない
    pub fn from_env() -> Result<Self, RelayConfigError> {
        let outbound_stream_name = match std::env::var("OUTBOUND_STREAM_NAME") {
            Ok(value) => parse_stream_name("OUTBOUND_STREAM_NAME", &value)?,
            Err(_) => DEFAULT_OUTBOUND_STREAM_NAME.to_string(),
        };

        let log_payload = match std::env::var("LOG_PAYLOAD") {
            Ok(value) => parse_bool("LOG_PAYLOAD", &value)?,
            Err(_) => false,
        };

        Ok(Self {
            outbound_stream_name,
            log_payload,
        })
    }

    /// 出力先ストリーム名を取得
    pub fn outbound_stream_name(&self) -> &str {
        &self.outbound_stream_name
    }

    /// ペイロード本文をログ出力するか
    pub fn log_payload(&self) -> bool {
        self.log_payload
    }

    /// 出力先ストリーム名を上書きした設定を返す
    ///
    /// 前後の空白は除去する。空の場合は`from_env`と同じくエラー。
    pub fn with_outbound_stream_name(mut self, name: &str) -> Result<Self, RelayConfigError> {
        self.outbound_stream_name = parse_stream_name("outbound_stream_name", name)?;
        Ok(self)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OUTBOUND_STREAM_NAME, false)
    }
}

fn parse_stream_name(name: &str, value: &str) -> Result<String, RelayConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RelayConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_bool(name: &str, value: &str) -> Result<bool, RelayConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        _ => Err(RelayConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
