// アプリケーション層モジュール
pub mod stream_relay;

// 再エクスポート
pub use stream_relay::{BatchError, BatchSummary, RelayError, StreamRelay};
