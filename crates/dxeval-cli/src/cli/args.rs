use clap::{Args, Parser, Subcommand};
use dxeval_client::ClientConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "dxeval",
    version,
    about = "Batch evaluation of a diagnosis chat model: generate answers, judge them, analyze verdicts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Send redacted case prompts to the bot and write verification prompts
    Generate(GenerateArgs),
    /// Send verification prompts to the judge bot
    Judge(JudgeArgs),
    /// Count verdicts in a judgment log and write CSV reports
    Analyze(AnalyzeArgs),
    Version,
}

/// Remote chat API settings shared by `generate` and `judge`.
#[derive(Args, Clone, Debug)]
pub struct RemoteArgs {
    /// Chat API base URL
    #[arg(long, env = "DXEVAL_API_URL", default_value = "https://api.metisai.ir")]
    pub api_url: String,

    /// Bearer token for the chat API
    #[arg(long, env = "DXEVAL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Bot to talk to
    #[arg(long, env = "DXEVAL_BOT_ID")]
    pub bot_id: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, env = "DXEVAL_CONNECT_TIMEOUT", default_value_t = 10)]
    pub connect_timeout: u64,

    /// Read timeout in seconds
    #[arg(long, env = "DXEVAL_READ_TIMEOUT", default_value_t = 120)]
    pub read_timeout: u64,

    /// Retries for 429, 5xx and transport errors
    #[arg(long, env = "DXEVAL_MAX_RETRIES", default_value_t = 5)]
    pub max_retries: u32,

    /// Delay between cases in milliseconds
    #[arg(long, env = "DXEVAL_PACING_MS", default_value_t = 200)]
    pub pacing_ms: u64,
}

impl RemoteArgs {
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default().with_url(&self.api_url);
        config.api_key = self.api_key.clone();
        config.bot_id = self.bot_id.clone();
        config.connect_timeout_secs = self.connect_timeout;
        config.read_timeout_secs = self.read_timeout;
        config.with_max_retries(self.max_retries)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    /// Prompt file with case blocks separated by lines of 22 `=`
    #[arg(long)]
    pub input: PathBuf,

    /// Output root; logs go to <out>/results
    #[arg(long, default_value = "out")]
    pub out: PathBuf,

    /// Prompting method name, used for file names
    #[arg(long)]
    pub method: String,

    /// Use a canned reply instead of the remote bot
    #[arg(long)]
    pub dry_run: bool,

    /// Evaluation config (YAML)
    #[arg(long, env = "DXEVAL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args, Clone, Debug)]
pub struct JudgeArgs {
    /// Verification bundle; without it every `judge_inputs` entry of the config is judged
    #[arg(long, requires = "method")]
    pub input: Option<PathBuf>,

    /// Method name for --input
    #[arg(long, requires = "input")]
    pub method: Option<String>,

    /// Output root; logs go to <out>/judgments
    #[arg(long, default_value = "out")]
    pub out: PathBuf,

    /// Use a canned verdict instead of the remote judge
    #[arg(long)]
    pub dry_run: bool,

    /// Evaluation config (YAML)
    #[arg(long, env = "DXEVAL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    /// Judgment log (JSONL)
    #[arg(long)]
    pub log: PathBuf,

    /// Directory for the CSV reports
    #[arg(long, default_value = "out/analysis")]
    pub out: PathBuf,

    /// Skip the per-department rates report
    #[arg(long)]
    pub no_rates: bool,

    /// Evaluation config (YAML)
    #[arg(long, env = "DXEVAL_CONFIG")]
    pub config: Option<PathBuf>,
}
