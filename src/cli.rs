use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "camellia-auction")]
#[command(about = "オークション出品リストとツバキ品種カタログの照合・画像取得ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 出品リストを照合し、画像を取得して結果を出力
    Run {
        #[command(flatten)]
        options: MatchOptions,

        /// 画像の保存先フォルダ
        #[arg(long)]
        images_dir: Option<PathBuf>,

        /// 画像取得の同時実行数（1 = 逐次）
        #[arg(short, long, default_value = "1")]
        jobs: usize,

        /// 画像取得をスキップ
        #[arg(long)]
        no_images: bool,
    },

    /// 照合のみ実行（画像は取得しない）
    Match {
        #[command(flatten)]
        options: MatchOptions,
    },

    /// 設定を表示/編集
    Config {
        /// 画像取得先URL（優先）
        #[arg(long)]
        set_primary_url: Option<String>,

        /// 画像取得先URL（予備）
        #[arg(long)]
        set_backup_url: Option<String>,

        /// 品種カタログのパス
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 画像の保存先フォルダ
        #[arg(long)]
        set_images_dir: Option<PathBuf>,

        /// 初期設定に戻す
        #[arg(long)]
        reset: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 照合系コマンド共通のオプション
#[derive(Args, Clone, Debug)]
pub struct MatchOptions {
    /// 出品リスト（1行1品種のテキスト）
    #[arg(required = true)]
    pub input: PathBuf,

    /// 品種カタログ (xlsx/xls/ods/csv)
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// 照合結果の出力先
    #[arg(short, long, default_value = "auction.csv")]
    pub output: PathBuf,

    /// 照合対応表の出力先
    #[arg(long, default_value = "match_list.csv")]
    pub match_list: PathBuf,

    /// 出力形式 (csv/excel/both)
    #[arg(short, long, default_value = "csv")]
    pub format: ExportFormat,

    /// 採用閾値（0-100）
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// 照合結果の詳細JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, excel, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}
