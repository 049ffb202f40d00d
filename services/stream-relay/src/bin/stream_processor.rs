/// Kinesisストリーム中継Lambda関数
///
/// 入力ストリームのレコードをデコード・再シリアライズし、
/// タイムスタンプ由来のパーティションキーで出力ストリームへ発行する。
/// Lambda関数としても、ローカルスクリプトとしても実行可能。
///
/// # 環境変数
/// - OUTBOUND_STREAM_NAME: 出力先ストリーム名（デフォルト: processed_bitcoin_stream）
/// - LOG_PAYLOAD: 再シリアライズしたペイロードをdebugログに出す（デフォルト: false）
/// - RUST_LOG: ログレベル（デフォルト: info）
///
/// # ローカル実行
/// ```bash
/// # Kinesisトリガーイベントを読み込んでdry-run（発行しない）
/// cargo run --bin stream_processor -- --event event.json --dry-run
///
/// # 出力ストリームを指定して実際に発行
/// cargo run --bin stream_processor -- --event event.json --stream-name processed_bitcoin_stream
/// ```
use std::path::PathBuf;

use clap::Parser;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use stream_relay::application::{BatchSummary, StreamRelay};
use stream_relay::domain::KinesisBatch;
use stream_relay::infrastructure::{
    init_logging, AwsKinesisOps, DryRunKinesisOps, KinesisOps, RelayConfig,
};
use tracing::{error, info};

/// コマンドライン引数（ローカル実行用）
#[derive(Parser, Debug)]
#[command(name = "stream_processor")]
#[command(about = "Kinesisトリガーイベントを読み込んで出力ストリームへ中継")]
struct CliArgs {
    /// Kinesisトリガーイベント（{"Records": [...]}）のJSONファイル
    #[arg(long, short = 'e')]
    event: PathBuf,

    /// 出力先ストリーム名
    /// 環境変数OUTBOUND_STREAM_NAMEより優先される
    #[arg(long, short = 's')]
    stream_name: Option<String>,

    /// 発行せずにログ出力のみ行う
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // Lambda環境かどうかを判定
    if std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        info!("Lambda関数として起動");
        run_lambda().await
    } else {
        info!("ローカルスクリプトとして起動");
        run_local(CliArgs::parse()).await
    }
}

/// Lambdaランタイムで実行
///
/// 設定とKinesisクライアントはコールドスタート時に1度だけ作成し、
/// 以降の全呼び出しで共有する。
async fn run_lambda() -> Result<(), Error> {
    let config = load_config()?;
    let kinesis = AwsKinesisOps::from_config().await;
    let relay = StreamRelay::new(kinesis, config);

    let relay = &relay;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<KinesisBatch>| async move {
        handler(relay, event).await
    }))
    .await
}

/// Lambda関数のメインハンドラー
///
/// # 処理フロー
/// 1. バッチ内のレコードを順に中継
/// 2. 失敗した場合はエラーを返す（Lambda再試行をトリガー）
async fn handler<K: KinesisOps>(
    relay: &StreamRelay<K>,
    event: LambdaEvent<KinesisBatch>,
) -> Result<(), Error> {
    let request_id = event.context.request_id.clone();
    let batch = event.payload;

    info!(
        request_id = %request_id,
        record_count = batch.len(),
        "Kinesisイベントを受信"
    );

    let summary = relay_batch(relay, &batch).await?;

    info!(
        request_id = %request_id,
        published_count = summary.published_count,
        "中継処理完了"
    );

    Ok(())
}

/// ローカルでイベントファイルを処理
async fn run_local(args: CliArgs) -> Result<(), Error> {
    let mut config = load_config()?;
    if let Some(stream_name) = args.stream_name.as_deref() {
        config = config.with_outbound_stream_name(stream_name).map_err(|err| {
            error!(error = %err, "--stream-nameが不正");
            err
        })?;
    }

    let content = tokio::fs::read_to_string(&args.event).await.map_err(|err| {
        error!(path = %args.event.display(), error = %err, "イベントファイル読み込み失敗");
        err
    })?;
    let batch: KinesisBatch = serde_json::from_str(&content)?;

    info!(
        path = %args.event.display(),
        record_count = batch.len(),
        stream_name = config.outbound_stream_name(),
        dry_run = args.dry_run,
        "イベントファイルを読み込み"
    );

    let summary = if args.dry_run {
        let relay = StreamRelay::new(DryRunKinesisOps::new(), config);
        relay_batch(&relay, &batch).await?
    } else {
        let relay = StreamRelay::new(AwsKinesisOps::from_config().await, config);
        relay_batch(&relay, &batch).await?
    };

    info!(
        received_count = summary.received_count,
        published_count = summary.published_count,
        "ローカル実行完了"
    );

    Ok(())
}

fn load_config() -> Result<RelayConfig, Error> {
    match RelayConfig::from_env() {
        Ok(config) => {
            info!(
                outbound_stream_name = config.outbound_stream_name(),
                log_payload = config.log_payload(),
                "Relay設定を読み込み"
            );
            Ok(config)
        }
        Err(err) => {
            error!(error = %err, "Relay設定読み込み失敗");
            Err(err.into())
        }
    }
}

async fn relay_batch<K: KinesisOps>(
    relay: &StreamRelay<K>,
    batch: &KinesisBatch,
) -> Result<BatchSummary, Error> {
    relay.process_batch(batch).await.map_err(|err| {
        error!(
            index = err.index,
            event_id = err.event_id.as_deref().unwrap_or(""),
            error = %err,
            "中継処理に失敗"
        );
        Error::from(err)
    })
}
