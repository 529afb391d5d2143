use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません: {0}\n\
        --config または SWEEP_CONFIG_PATH で存在するファイルを指定するか、\
        指定を外して ~/.config/sweepflow/config.yaml を使ってください"
    )]
    ConfigFileNotFound(PathBuf),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML の解析に失敗しました: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("設定値が不正です: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
