//! SweepFlow の設定
//!
//! すべての設定値に組み込みのデフォルトがあるため、設定ファイルは省略可能。
//! コマンドラインで指定した値は設定ファイルより優先される。

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sweepflow_cloud::RetryPolicy;

/// 設定ファイルを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "SWEEP_CONFIG_PATH";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// AssumeRole の有効期間の範囲（秒）
pub const MIN_DURATION_SECS: i32 = 900;
pub const MAX_DURATION_SECS: i32 = 43_200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// ベースセッションのプロファイル（未指定ならデフォルトの認証チェーン）
    pub profile: Option<String>,
    pub region: String,
    pub role_name: String,
    pub session_name: String,
    pub duration_secs: i32,
    pub retry: RetrySettings,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            profile: None,
            region: "us-east-1".to_string(),
            role_name: "OrganizationAccountAccessRole".to_string(),
            session_name: "SREAdminReuseCleanup".to_string(),
            duration_secs: MIN_DURATION_SECS,
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 20_000,
        }
    }
}

impl SweepConfig {
    /// YAML を解析して検証する
    pub fn from_yaml(content: &str) -> Result<Self> {
        // 空ファイルはすべてデフォルト値として扱う
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SweepConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::Invalid("region が空です".to_string()));
        }
        if self.role_name.trim().is_empty() {
            return Err(ConfigError::Invalid("role_name が空です".to_string()));
        }
        if self.session_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "session_name が空です".to_string(),
            ));
        }
        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&self.duration_secs) {
            return Err(ConfigError::Invalid(format!(
                "duration_secs は {} から {} の範囲で指定してください（指定値: {}）",
                MIN_DURATION_SECS, MAX_DURATION_SECS, self.duration_secs
            )));
        }
        self.retry_policy()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::no_retry()
            .with_max_attempts(self.retry.max_attempts)
            .with_backoff(
                Duration::from_millis(self.retry.initial_backoff_ms),
                Duration::from_millis(self.retry.max_backoff_ms),
            )
    }
}

/// SweepFlow の設定ディレクトリ（Linux では `~/.config/sweepflow`）
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("sweepflow"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. `explicit`（`--config` で指定）
/// 2. 環境変数 SWEEP_CONFIG_PATH
/// 3. `<config_dir>/sweepflow/config.yaml`
///
/// 1 と 2 で指定したパスは存在しなければエラー。`Ok(None)` はファイルなし（デフォルト値を使う）。
pub fn find_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    if let Some(path) = named {
        if !path.is_file() {
            return Err(ConfigError::ConfigFileNotFound(path));
        }
        return Ok(Some(path));
    }

    // 設定ディレクトリがないプラットフォームでもエラーにしない
    let Ok(dir) = get_config_dir() else {
        return Ok(None);
    };
    let default_path = dir.join(CONFIG_FILE_NAME);
    Ok(default_path.is_file().then_some(default_path))
}

/// 見つかった設定ファイルを読み込む（なければデフォルト値）
pub fn load(explicit: Option<&Path>) -> Result<SweepConfig> {
    match find_config_file(explicit)? {
        Some(path) => SweepConfig::from_file(&path),
        None => Ok(SweepConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_defaults_are_valid() {
        let config = SweepConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.role_name, "OrganizationAccountAccessRole");
        assert_eq!(config.session_name, "SREAdminReuseCleanup");
        assert_eq!(config.duration_secs, 900);
        assert!(config.profile.is_none());
        assert!(!config.retry_policy().retries_enabled());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SweepConfig::from_yaml(
            "profile: osd-staging-1\nretry:\n  max_attempts: 3\n",
        )
        .unwrap();

        assert_eq!(config.profile.as_deref(), Some("osd-staging-1"));
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.max_backoff_ms, 20_000);

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(SweepConfig::from_yaml("").unwrap(), SweepConfig::default());
        assert_eq!(SweepConfig::from_yaml("  \n").unwrap(), SweepConfig::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        // タイプミスしたキーは無視せずエラーにする
        let result = SweepConfig::from_yaml("regoin: eu-west-1\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));

        let result = SweepConfig::from_yaml("retry:\n  attempts: 2\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_validate_duration_bounds() {
        for bad in [0, 899, 43_201] {
            let yaml = format!("duration_secs: {}\n", bad);
            assert!(
                matches!(SweepConfig::from_yaml(&yaml), Err(ConfigError::Invalid(_))),
                "duration {} accepted",
                bad
            );
        }
        assert!(SweepConfig::from_yaml("duration_secs: 43200\n").is_ok());
    }

    #[test]
    fn test_validate_retry() {
        let result = SweepConfig::from_yaml("retry:\n  max_attempts: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result =
            SweepConfig::from_yaml("retry:\n  initial_backoff_ms: 5000\n  max_backoff_ms: 10\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_empty_strings() {
        assert!(SweepConfig::from_yaml("region: \"\"\n").is_err());
        assert!(SweepConfig::from_yaml("role_name: \" \"\n").is_err());
        assert!(SweepConfig::from_yaml("session_name: \"\"\n").is_err());
    }

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("sweepflow"));
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins_over_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let explicit = temp_dir.path().join("explicit.yaml");
        let from_env = temp_dir.path().join("env.yaml");
        fs::write(&explicit, "region: eu-west-1\n").unwrap();
        fs::write(&from_env, "region: ap-northeast-1\n").unwrap();

        temp_env::with_var(CONFIG_PATH_ENV, Some(&from_env), || {
            // --config が環境変数より優先される
            let config = load(Some(&explicit)).unwrap();
            assert_eq!(config.region, "eu-west-1");

            let config = load(None).unwrap();
            assert_eq!(config.region, "ap-northeast-1");
        });
    }

    #[test]
    #[serial]
    fn test_missing_named_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope.yaml");

        temp_env::with_var_unset(CONFIG_PATH_ENV, || {
            let result = find_config_file(Some(&missing));
            assert!(matches!(&result, Err(ConfigError::ConfigFileNotFound(p)) if *p == missing));

            // 見つからなかったパスがメッセージに含まれる
            let message = result.unwrap_err().to_string();
            assert!(message.contains("設定ファイルが見つかりません"));
            assert!(message.contains("nope.yaml"));
        });

        temp_env::with_var(CONFIG_PATH_ENV, Some(&missing), || {
            assert!(matches!(
                load(None),
                Err(ConfigError::ConfigFileNotFound(_))
            ));
        });
    }

    #[test]
    #[serial]
    fn test_default_file_under_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();

        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, None),
                ("XDG_CONFIG_HOME", Some(temp_dir.path().as_os_str())),
            ],
            || {
                // dirs が XDG_CONFIG_HOME を見るのは Linux のみ
                if !cfg!(target_os = "linux") {
                    return;
                }

                assert_eq!(find_config_file(None).unwrap(), None);
                assert_eq!(load(None).unwrap(), SweepConfig::default());

                let dir = temp_dir.path().join("sweepflow");
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join(CONFIG_FILE_NAME), "profile: osd-staging-1\n").unwrap();

                let config = load(None).unwrap();
                assert_eq!(config.profile.as_deref(), Some("osd-staging-1"));
            },
        );
    }
}
