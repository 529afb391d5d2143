use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use sweepflow_cloud::{AccountId, CleanupReport, Orchestrator};
use sweepflow_cloud_aws::{AwsConnector, StsRoleAssumer};
use sweepflow_config::SweepConfig;

/// 設定ファイルの値を上書きするコマンドラインオプション
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// ベースセッションの AWS プロファイル（未指定ならデフォルトの認証チェーン）
    #[arg(long, env = "SWEEP_PROFILE")]
    pub profile: Option<String>,
    /// ベースセッションと各クライアントのリージョン
    #[arg(long, env = "SWEEP_REGION")]
    pub region: Option<String>,
    /// 対象アカウントで引き受けるロール
    #[arg(long, env = "SWEEP_ROLE_NAME")]
    pub role_name: Option<String>,
    /// STS に記録されるセッション名
    #[arg(long, env = "SWEEP_SESSION_NAME")]
    pub session_name: Option<String>,
    /// 一時認証情報の有効期間（秒、900〜43200）
    #[arg(long, env = "SWEEP_DURATION")]
    pub duration: Option<i32>,
    /// AWS 呼び出しごとの試行回数（1 でリトライなし）
    #[arg(long, env = "SWEEP_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,
    /// 設定ファイル（デフォルト: ~/.config/sweepflow/config.yaml）
    #[arg(long, env = "SWEEP_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

impl Overrides {
    /// フラグの値を `config` に重ねて検証する
    pub fn apply(&self, mut config: SweepConfig) -> sweepflow_config::Result<SweepConfig> {
        if let Some(profile) = &self.profile {
            config.profile = Some(profile.clone());
        }
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(role_name) = &self.role_name {
            config.role_name = role_name.clone();
        }
        if let Some(session_name) = &self.session_name {
            config.session_name = session_name.clone();
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.retry.max_attempts = max_attempts;
        }

        config.validate()?;
        Ok(config)
    }
}

pub async fn handle(account: AccountId, overrides: Overrides) -> anyhow::Result<()> {
    let config = match sweepflow_config::load(overrides.config.as_deref())
        .and_then(|config| overrides.apply(config))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "Effective settings");

    println!(
        "{}",
        format!("アカウント {} のリソースを削除中...", account)
            .blue()
            .bold()
    );
    println!("  ロール:         {}", account.role_arn(&config.role_name).cyan());
    println!("  リージョン:     {}", config.region.cyan());
    println!(
        "  プロファイル:   {}",
        config.profile.as_deref().unwrap_or("(デフォルト)").cyan()
    );

    let assumer = StsRoleAssumer::new(config.region.clone())
        .with_profile(config.profile.clone())
        .with_role_name(config.role_name.clone())
        .with_session_name(config.session_name.clone())
        .with_duration_secs(config.duration_secs);
    let orchestrator = Orchestrator::new(assumer, AwsConnector::new(config.retry_policy()));

    let report = match orchestrator.run(&account).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 削除を開始する前にクリーンアップを中止しました".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    print_report(&report);
    Ok(())
}

/// 最終レポートの1行
#[derive(Debug, PartialEq, Eq)]
enum ReportLine {
    Summary(String),
    Failure(String),
}

fn report_lines(report: &CleanupReport) -> Vec<ReportLine> {
    let mut lines = Vec::new();
    for type_report in &report.types {
        lines.push(ReportLine::Summary(type_report.summary_line()));
        if let Some(dependents) = type_report.dependents_line() {
            lines.push(ReportLine::Summary(dependents));
        }
        if let Some(gone) = type_report.already_gone_line() {
            lines.push(ReportLine::Summary(gone));
        }
        lines.extend(
            type_report
                .failure_lines()
                .into_iter()
                .map(ReportLine::Failure),
        );
    }
    lines
}

fn print_report(report: &CleanupReport) {
    if let Some(expiry) = report.credentials_expire_at {
        println!(
            "  認証情報の有効期限: {}",
            expiry.format("%Y-%m-%d %H:%M:%S UTC").to_string().cyan()
        );
    }
    println!();

    for line in report_lines(report) {
        match line {
            ReportLine::Summary(text) => println!("{}", text),
            ReportLine::Failure(text) => println!("  {}", text.red()),
        }
    }

    println!();
    if report.is_clean() {
        println!("{}", "✓ アカウントは空になりました".green().bold());
    } else {
        println!(
            "{}",
            format!(
                "⚠ 削除 {} 件、失敗 {} 件（原因を解消して再実行してください）",
                report.total_deleted(),
                report.total_failures()
            )
            .yellow()
            .bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepflow_cloud::{
        DeletionOutcome, FailedDeletion, ResourceItem, ResourceKind, TypeReport,
    };

    fn account() -> AccountId {
        AccountId::parse("42").unwrap()
    }

    /// フラグの値が設定ファイルの値より優先されることを確認
    #[test]
    fn test_apply_overrides_file_values() {
        let overrides = Overrides {
            profile: Some("osd-staging-1".to_string()),
            region: Some("eu-west-1".to_string()),
            duration: Some(3600),
            max_attempts: Some(3),
            ..Default::default()
        };

        let config = overrides.apply(SweepConfig::default()).unwrap();

        assert_eq!(config.profile.as_deref(), Some("osd-staging-1"));
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.role_name, "OrganizationAccountAccessRole");
        assert_eq!(config.duration_secs, 3600);
        assert!(config.retry_policy().retries_enabled());
    }

    /// 上書き後の設定も検証されることを確認
    #[test]
    fn test_apply_validates_result() {
        let overrides = Overrides {
            duration: Some(60),
            ..Default::default()
        };
        assert!(overrides.apply(SweepConfig::default()).is_err());

        let overrides = Overrides {
            max_attempts: Some(0),
            ..Default::default()
        };
        assert!(overrides.apply(SweepConfig::default()).is_err());
    }

    /// レポートの行がリソース種別の順に並ぶことを確認
    #[test]
    fn test_report_lines() {
        let mut buckets = TypeReport::new(ResourceKind::Bucket);
        buckets.tally.record(&DeletionOutcome::Deleted);
        buckets.failures.push(FailedDeletion {
            item: ResourceItem::Bucket {
                name: "assets".to_string(),
            },
            reason: "BucketNotEmpty: not empty".to_string(),
        });

        let mut zones = TypeReport::new(ResourceKind::HostedZone);
        zones.dependents_removed = 3;
        zones.already_gone = 1;

        let mut report = CleanupReport::new(account());
        report.push(buckets);
        report.push(TypeReport::new(ResourceKind::Snapshot));
        report.push(zones);

        assert_eq!(
            report_lines(&report),
            vec![
                ReportLine::Summary("S3 Buckets deleted: 1".to_string()),
                ReportLine::Summary("Objects deleted: 0".to_string()),
                ReportLine::Failure(
                    "Failed deleting S3 Bucket: assets (BucketNotEmpty: not empty)".to_string()
                ),
                ReportLine::Summary("Snapshots deleted: 0".to_string()),
                ReportLine::Summary("Zones deleted: 0".to_string()),
                ReportLine::Summary("Records deleted: 3".to_string()),
                ReportLine::Summary("Zones already gone: 1".to_string()),
            ]
        );
    }
}
