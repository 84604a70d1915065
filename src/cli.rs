use crate::ai_provider::AiProvider;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "c4d-localizer")]
#[command(about = "Cinema 4D 文字列テーブルのAI一括翻訳ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 文字列テーブルを翻訳して書き出す
    Translate {
        /// .str/.res/.txt ファイルまたはフォルダ
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 出力フォルダ（--zip 時はZIPファイルのパス）
        #[arg(short, long, default_value = "translated")]
        output: PathBuf,

        /// ZIPアーカイブにまとめる（2ファイル以上のとき）
        #[arg(long)]
        zip: bool,

        /// 翻訳済みの行も含めて全行を翻訳し直す
        #[arg(long)]
        all: bool,

        /// 1リクエストあたりの行数
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// 同時リクエスト数
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// AIプロバイダ (gemini/openai)
        #[arg(long)]
        provider: Option<AiProvider>,

        /// モデル名
        #[arg(short, long)]
        model: Option<String>,

        /// 既存ファイルの上書きを確認しない
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// 翻訳状況を表示
    Stats {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// 未翻訳の行を対話的に入力
    Review {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 出力フォルダ
        #[arg(short, long, default_value = "translated")]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// AIプロバイダを設定
        #[arg(long)]
        set_provider: Option<AiProvider>,

        /// OpenAI互換APIのベースURLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// モデル名を設定
        #[arg(long)]
        set_model: Option<String>,

        /// 同時リクエスト数を設定
        #[arg(long)]
        set_concurrency: Option<usize>,

        /// バッチサイズを設定
        #[arg(long)]
        set_batch_size: Option<usize>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
