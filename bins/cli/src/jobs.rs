use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gitlab_api_client::{
    AllJobsOptions, ClientConfig, JobScope, Jobs, PipelineBridgesOptions, PlayJobOptions,
    ResourceBuilder, ResourceId, ScopeFilter, JOB_TOKEN_HEADER,
};
use serde_json::Value;
use tracing::debug;

#[derive(Parser)]
pub struct JobsCmd {
    /// GitLab host, overrides GITLAB_HOST
    #[arg(long, global = true)]
    host: Option<String>,

    /// Job token added as the job-token header, e.g. $CI_JOB_TOKEN
    #[arg(long, global = true)]
    job_token: Option<String>,

    #[command(subcommand)]
    command: JobsCommands,
}

#[derive(Subcommand)]
enum JobsCommands {
    /// List project jobs, or the jobs of one pipeline
    List(ListArgs),

    /// List the bridge jobs of a pipeline
    Bridges(BridgesArgs),

    /// Show a single job
    Show(JobArgs),

    /// Cancel a job
    Cancel(JobArgs),

    /// Retry a job
    Retry(JobArgs),

    /// Play a manual job
    Play(PlayArgs),

    /// Erase a job's artifacts and log
    Erase(JobArgs),

    /// Keep a job's artifacts from expiring
    Keep(JobArgs),

    /// Print a job's log
    Log(JobArgs),

    /// Show the job owning the job token
    Connected(ConnectedArgs),
}

#[derive(Args)]
struct ListArgs {
    /// Project ID or path
    #[arg(short, long)]
    project: String,

    /// Pipeline ID
    #[arg(long)]
    pipeline: Option<String>,

    /// Scope filter, may be repeated
    #[arg(short, long)]
    scope: Vec<JobScope>,

    /// Include retried jobs (pipeline listings only)
    #[arg(long)]
    include_retried: bool,
}

#[derive(Args)]
struct BridgesArgs {
    /// Project ID or path
    #[arg(short, long)]
    project: String,

    /// Pipeline ID
    #[arg(long)]
    pipeline: String,

    /// Scope filter, may be repeated
    #[arg(short, long)]
    scope: Vec<JobScope>,
}

#[derive(Args)]
struct JobArgs {
    /// Project ID or path
    #[arg(short, long)]
    project: String,

    /// Job ID
    #[arg(short, long)]
    job: String,
}

#[derive(Args)]
struct PlayArgs {
    #[command(flatten)]
    target: JobArgs,

    /// Job variable as KEY=VALUE, may be repeated
    #[arg(long = "var", value_parser = parse_variable)]
    variables: Vec<(String, String)>,
}

#[derive(Args)]
struct ConnectedArgs {
    /// List the Kubernetes agents the job may use instead
    #[arg(long)]
    agents: bool,
}

impl JobsCmd {
    pub async fn execute(&self) -> Result<()> {
        let jobs = self.jobs()?;

        let payload = match &self.command {
            JobsCommands::List(args) => jobs.all(args.project.as_str(), Some(list_options(args))).await?,
            JobsCommands::Bridges(args) => {
                let options = scope_filter(&args.scope)
                    .map(|scope| PipelineBridgesOptions::new().with_scope(scope));
                jobs.all_pipeline_bridges(args.project.as_str(), args.pipeline.as_str(), options)
                    .await?
            }
            JobsCommands::Show(args) => jobs.show(project(args), job(args)).await?,
            JobsCommands::Cancel(args) => jobs.cancel(project(args), job(args)).await?,
            JobsCommands::Retry(args) => jobs.retry(project(args), job(args)).await?,
            JobsCommands::Play(args) if args.variables.is_empty() => {
                jobs.play(project(&args.target), job(&args.target)).await?
            }
            JobsCommands::Play(args) => {
                let options = args
                    .variables
                    .iter()
                    .fold(PlayJobOptions::new(), |options, (key, value)| {
                        options.with_variable(key, value)
                    });
                jobs.play_with_variables(project(&args.target), job(&args.target), options)
                    .await?
            }
            JobsCommands::Erase(args) => jobs.erase(project(args), job(args)).await?,
            JobsCommands::Keep(args) => jobs.keep_artifacts(project(args), job(args)).await?,
            JobsCommands::Log(args) => jobs.show_log(project(args), job(args)).await?,
            JobsCommands::Connected(args) if args.agents => {
                jobs.show_connected_job_k8s_agents().await?
            }
            JobsCommands::Connected(_) => jobs.show_connected_job().await?,
        };

        print_payload(&payload)
    }

    fn jobs(&self) -> Result<Jobs> {
        let config = ClientConfig::from_env().context("Failed to load GitLab configuration")?;
        debug!(host = %config.host, "Loaded GitLab configuration");

        let mut builder = ResourceBuilder::from_config(&config);
        if let Some(host) = &self.host {
            builder = builder.host(host.as_str());
        }
        if let Some(token) = &self.job_token {
            builder = builder.header(JOB_TOKEN_HEADER, token.as_str());
        }

        let base = builder.build().context("Invalid GitLab client settings")?;
        Ok(Jobs::new(base))
    }
}

fn list_options(args: &ListArgs) -> AllJobsOptions {
    let mut options = AllJobsOptions::new();
    if let Some(pipeline) = &args.pipeline {
        options = options.with_pipeline(pipeline.as_str());
    }
    if let Some(scope) = scope_filter(&args.scope) {
        options = options.with_scope(scope);
    }
    if args.include_retried {
        options = options.with_include_retried(true);
    }
    options
}

/// A single repeated flag is sent as a plain value, several as an array
fn scope_filter(scopes: &[JobScope]) -> Option<ScopeFilter> {
    match scopes {
        [] => None,
        [scope] => Some(ScopeFilter::One(*scope)),
        scopes => Some(ScopeFilter::Many(scopes.to_vec())),
    }
}

fn project(args: &JobArgs) -> ResourceId {
    ResourceId::from(args.project.as_str())
}

fn job(args: &JobArgs) -> ResourceId {
    ResourceId::from(args.job.as_str())
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {}", raw))
}

fn print_payload(payload: &Value) -> Result<()> {
    match payload {
        Value::String(text) => print!("{}", text),
        Value::Null => {}
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variable() {
        assert_eq!(
            parse_variable("DEPLOY_ENV=staging=eu").unwrap(),
            ("DEPLOY_ENV".to_string(), "staging=eu".to_string())
        );
        assert!(parse_variable("=value").is_err());
        assert!(parse_variable("novalue").is_err());
    }

    #[test]
    fn test_cli_parses_repeated_scopes() {
        let cmd = JobsCmd::try_parse_from([
            "jobs", "list", "--project", "group/app", "--pipeline", "2", "-s", "pending", "-s",
            "running",
        ])
        .unwrap();
        let JobsCommands::List(args) = &cmd.command else {
            panic!("expected list");
        };
        let options = list_options(args);
        assert_eq!(options.pipeline_id, Some(ResourceId::Number(2)));
        assert_eq!(
            options.scope,
            Some(ScopeFilter::Many(vec![JobScope::Pending, JobScope::Running]))
        );
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        assert!(JobsCmd::try_parse_from(["jobs", "list", "-p", "1", "-s", "queued"]).is_err());
    }
}
