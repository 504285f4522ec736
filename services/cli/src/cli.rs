use crate::commands::{run_applied, run_apply, run_form, run_jobs, run_plan};
use crate::infra::parse_answer;
use clap::{Args, Parser, Subcommand, ValueEnum};
use internhub::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "internhub",
    about = "Check your placement plan, browse open jobs, and apply from the command line",
    version
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the active job package and course (default command)
    Plan,
    /// List open jobs with whether you can apply to each
    Jobs(JobsArgs),
    /// Show the custom application form attached to a job
    Form(FormArgs),
    /// Apply to an open job, spending one credit
    Apply(ApplyArgs),
    /// List the jobs you have already applied to
    Applied,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ConnectionArgs {
    /// Override the configured backend base URL
    #[arg(long, global = true)]
    pub(crate) api_url: Option<String>,
    /// Override the configured auth token
    #[arg(long, global = true)]
    pub(crate) token: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct JobsArgs {
    /// Output format for the listing
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
    /// Only show jobs you can apply to right now
    #[arg(long)]
    pub(crate) eligible_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct FormArgs {
    /// Job identifier
    pub(crate) job_id: String,
}

#[derive(Args, Debug)]
pub(crate) struct ApplyArgs {
    /// Job identifier
    pub(crate) job_id: String,
    /// Form answer as name=value; repeat for each field
    #[arg(long = "answer", value_parser = parse_answer)]
    pub(crate) answers: Vec<(String, String)>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let connection = cli.connection;

    match cli.command.unwrap_or(Command::Plan) {
        Command::Plan => run_plan(connection).await,
        Command::Jobs(args) => run_jobs(connection, args).await,
        Command::Form(args) => run_form(connection, args).await,
        Command::Apply(args) => run_apply(connection, args).await,
        Command::Applied => run_applied(connection).await,
    }
}
