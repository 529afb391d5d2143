mod commands;

use clap::{Parser, Subcommand};
use sweepflow_cloud::AccountId;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sweep")]
#[command(
    about = "再利用する AWS アカウントを空にする（S3 / EBS / EC2 / Route53）",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// アカウント内のバケット・スナップショット・インスタンス・ボリューム・ホストゾーンをすべて削除
    Clean {
        /// 対象の AWS アカウント ID（数字のみ、12桁にゼロ埋め）
        #[arg(short = 'a', long = "account-id", env = "SWEEP_ACCOUNT_ID")]
        account_id: AccountId,
        /// デバッグログを出力（SDK のリクエスト・レスポンスを含む）
        #[arg(short, long)]
        verbose: bool,
        #[command(flatten)]
        overrides: commands::clean::Overrides,
    },
    /// バージョン情報を表示
    Version,
}

/// ログは stderr に出し、stdout はレポートだけにする
///
/// `RUST_LOG` が設定されていれば `--verbose` より優先される。
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(verbose)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("sweepflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Clean {
            account_id,
            verbose,
            overrides,
        } => {
            init_tracing(verbose);
            commands::clean::handle(account_id, overrides).await?;
        }
    }

    Ok(())
}
