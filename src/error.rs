use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuctionError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("入力ファイルの読み込みに失敗: {0}")]
    InputRead(String),

    #[error("カタログの読み込みに失敗: {0}")]
    CatalogLoad(String),

    #[error("画像フォルダを作成できません: {0}")]
    ImagesDir(String),

    #[error("出力ファイルの書き込みに失敗: {0}")]
    OutputWrite(String),

    #[error("HTTPクライアントの初期化に失敗: {0}")]
    HttpClient(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] camellia_auction_common::Error),
}

pub type Result<T> = std::result::Result<T, AuctionError>;
