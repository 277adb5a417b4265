//! CodeCommit merge command-line tool.
//!
//! Builds and validates merge request envelopes, inspects merge conflicts
//! and available merge options, and generates / validates the client
//! configuration file.

mod conflicts;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use codecommit_core::conflict::ConflictResolution;
use codecommit_core::config::ClientConfig;
use codecommit_core::requests::{
    GetMergeConflictsRequest, GetMergeOptionsRequest, MergeBranchesByFastForwardRequest,
    MergeBranchesBySquashRequest, MergeBranchesByThreeWayRequest,
};
use codecommit_core::{
    CodeCommitClient, ConflictDetailLevel, ConflictResolutionStrategy, MergeOption,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// CodeCommit merge command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "codecommit",
    version,
    about = "Build, validate and send CodeCommit merge requests"
)]
struct Cli {
    /// Path to the TOML configuration file
    /// (default: ~/.config/codecommit/config.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tracing level; overrides `client.log_level`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./codecommit.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,

    /// Build a merge request, print it as JSON, and optionally send it.
    MergeRequest {
        /// How the branches are merged.
        #[arg(long, value_enum, default_value = "three-way")]
        kind: MergeKind,

        #[command(flatten)]
        sides: SidesArgs,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Branch to update (defaults to the destination).
        #[arg(long)]
        target_branch: Option<String>,

        #[arg(long)]
        author_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Commit message for the merge commit.
        #[arg(short, long)]
        message: Option<String>,

        #[arg(long)]
        keep_empty_folders: bool,

        /// JSON file with a conflictResolution payload (AUTOMERGE only).
        #[arg(long)]
        resolution_file: Option<PathBuf>,

        /// Send the request instead of only printing it.
        #[arg(long)]
        send: bool,
    },

    /// List files that conflict when merging two specifiers.
    Conflicts {
        #[command(flatten)]
        sides: SidesArgs,

        #[command(flatten)]
        policy: PolicyArgs,

        /// FAST_FORWARD_MERGE, SQUASH_MERGE or THREE_WAY_MERGE.
        #[arg(long, default_value = "THREE_WAY_MERGE", value_parser = MergeOption::parse)]
        merge_option: MergeOption,

        /// Files per page (1-1000).
        #[arg(long)]
        max_files: Option<i32>,

        /// Follow pagination until every conflicting file is listed.
        #[arg(long)]
        all: bool,

        /// Print the raw result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show which merge options are available between two specifiers.
    Options {
        #[command(flatten)]
        sides: SidesArgs,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MergeKind {
    FastForward,
    Squash,
    ThreeWay,
}

#[derive(Args, Debug)]
struct SidesArgs {
    /// Repository name (defaults to `defaults.repository`).
    #[arg(short, long)]
    repository: Option<String>,

    /// Source branch, tag, HEAD or commit id.
    #[arg(short, long)]
    source: String,

    /// Destination branch, tag, HEAD or commit id.
    #[arg(short, long)]
    destination: String,
}

#[derive(Args, Debug)]
struct PolicyArgs {
    /// FILE_LEVEL or LINE_LEVEL (defaults to `defaults.conflict_detail_level`).
    #[arg(long, value_parser = ConflictDetailLevel::parse)]
    detail_level: Option<ConflictDetailLevel>,

    /// NONE, ACCEPT_SOURCE, ACCEPT_DESTINATION or AUTOMERGE.
    #[arg(long, value_parser = ConflictResolutionStrategy::parse)]
    resolution_strategy: Option<ConflictResolutionStrategy>,
}

/// Sides and policy resolved against the config defaults.
struct Resolved {
    repository: String,
    source: String,
    destination: String,
    detail_level: ConflictDetailLevel,
    strategy: ConflictResolutionStrategy,
}

impl Resolved {
    fn new(sides: SidesArgs, policy: PolicyArgs, config: &ClientConfig) -> Result<Self> {
        let repository = sides
            .repository
            .or_else(|| config.defaults.repository.clone())
            .context("no repository given and `defaults.repository` is not set")?;
        let detail_level = policy
            .detail_level
            .unwrap_or(config.defaults.conflict_detail_level);
        let strategy = policy
            .resolution_strategy
            .unwrap_or(config.defaults.conflict_resolution_strategy);
        Ok(Self {
            repository,
            source: sides.source,
            destination: sides.destination,
            detail_level,
            strategy,
        })
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    let level = cli
        .log_level
        .clone()
        .or_else(|| {
            ClientConfig::load_from_file(&config_path)
                .ok()
                .map(|c| c.client.log_level)
        })
        .unwrap_or_else(|| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_target(false)
        .without_time()
        .init();

    match run(cli.command, &config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style::failure(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config_path: &Path) -> Result<()> {
    match command {
        Commands::Init { output } => cmd_init(&output),
        Commands::Validate => cmd_validate(config_path),
        Commands::MergeRequest {
            kind,
            sides,
            policy,
            target_branch,
            author_name,
            email,
            message,
            keep_empty_folders,
            resolution_file,
            send,
        } => {
            let config = if send {
                load_config(config_path)?
            } else {
                load_config_or_default(config_path)?
            };
            let resolved = Resolved::new(sides, policy, &config)?;
            let commit = CommitArgs {
                author_name: author_name.or_else(|| config.defaults.author_name.clone()),
                email: email.or_else(|| config.defaults.email.clone()),
                message,
                keep_empty_folders,
            };
            let resolution = resolution_file
                .as_deref()
                .map(read_resolution)
                .transpose()?;
            cmd_merge_request(
                &config,
                kind,
                resolved,
                target_branch,
                commit,
                resolution,
                send,
            )
            .await
        }
        Commands::Conflicts {
            sides,
            policy,
            merge_option,
            max_files,
            all,
            json,
        } => {
            let config = load_config(config_path)?;
            let resolved = Resolved::new(sides, policy, &config)?;
            cmd_conflicts(&config, resolved, merge_option, max_files, all, json).await
        }
        Commands::Options { sides, policy } => {
            let config = load_config(config_path)?;
            let resolved = Resolved::new(sides, policy, &config)?;
            cmd_options(&config, resolved).await
        }
    }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("codecommit").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("./codecommit.toml"))
}

fn load_config(path: &Path) -> Result<ClientConfig> {
    ClientConfig::load_and_resolve(path).context("failed to load configuration file")
}

/// Offline commands work without a config file.
fn load_config_or_default(path: &Path) -> Result<ClientConfig> {
    if path.exists() {
        load_config(path)
    } else {
        debug!(path = %path.display(), "no config file, using defaults");
        Ok(ClientConfig::default())
    }
}

fn read_resolution(path: &Path) -> Result<ConflictResolution> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid conflict resolution in {}", path.display()))
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    let rendered = ClientConfig::default_toml().context("failed to render default config")?;
    let contents = format!(
        "# CodeCommit client configuration\n\
         # Set `client.endpoint` or `client.endpoint_env` to override the regional endpoint.\n\n{}",
        rendered
    );
    std::fs::write(output, contents).context("failed to write config file")?;

    println!("{}", style::done(&format!("Default configuration written to {}", output.display())));
    println!();
    println!("Next steps:");
    println!("  1. Set the region and `defaults.repository`");
    println!(
        "  2. Validate with: codecommit validate --config {}",
        output.display()
    );

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let mut config =
        ClientConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    config
        .resolve_env_vars()
        .context("failed to resolve environment variables")?;
    println!("  [OK] Environment variable references processed");

    match config.validate() {
        Ok(()) => println!("  [OK] All fields are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  Endpoint        : {}", config.client.endpoint_url());
    println!("  Region          : {}", config.client.region);
    println!("  Timeout         : {}s", config.client.timeout_secs);
    println!(
        "  Retry           : {} attempts, {}-{} ms",
        config.retry.max_attempts, config.retry.base_delay_ms, config.retry.max_delay_ms
    );
    println!(
        "  Repository      : {}",
        config.defaults.repository.as_deref().unwrap_or("not set")
    );
    println!(
        "  Detail level    : {}",
        config.defaults.conflict_detail_level
    );
    println!(
        "  Strategy        : {}",
        style::strategy(config.defaults.conflict_resolution_strategy)
    );
    println!();
    println!("{}", style::done("Configuration is valid."));

    Ok(())
}

struct CommitArgs {
    author_name: Option<String>,
    email: Option<String>,
    message: Option<String>,
    keep_empty_folders: bool,
}

/// Apply the optional commit fields shared by squash and three-way builders.
macro_rules! with_commit_args {
    ($builder:expr, $commit:expr) => {{
        let mut builder = $builder.keep_empty_folders($commit.keep_empty_folders);
        if let Some(name) = $commit.author_name {
            builder = builder.author_name(name);
        }
        if let Some(email) = $commit.email {
            builder = builder.email(email);
        }
        if let Some(message) = $commit.message {
            builder = builder.commit_message(message);
        }
        builder
    }};
}

/// Apply target branch and resolution payload, then build.
macro_rules! finish_merge {
    ($builder:expr, $target:expr, $resolution:expr) => {{
        let mut builder = $builder;
        if let Some(branch) = $target {
            builder = builder.target_branch(branch);
        }
        if let Some(resolution) = $resolution {
            builder = builder.conflict_resolution(resolution);
        }
        builder.build().context("invalid merge request")?
    }};
}

async fn cmd_merge_request(
    config: &ClientConfig,
    kind: MergeKind,
    r: Resolved,
    target_branch: Option<String>,
    commit: CommitArgs,
    resolution: Option<ConflictResolution>,
    send: bool,
) -> Result<()> {
    match kind {
        MergeKind::FastForward => {
            if resolution.is_some() {
                anyhow::bail!("fast-forward merges take no conflict resolution");
            }
            let mut builder = MergeBranchesByFastForwardRequest::builder()
                .repository_name(&r.repository)
                .source_commit_specifier(&r.source)
                .destination_commit_specifier(&r.destination);
            if let Some(branch) = target_branch {
                builder = builder.target_branch(branch);
            }
            let request = builder.build().context("invalid merge request")?;
            print_json(&request)?;
            if send {
                let client = CodeCommitClient::from_config(config)?;
                let result = client.merge_branches_by_fast_forward(&request).await?;
                print_json(&result)?;
            }
        }
        MergeKind::Squash => {
            let builder = MergeBranchesBySquashRequest::builder()
                .repository_name(&r.repository)
                .source_commit_specifier(&r.source)
                .destination_commit_specifier(&r.destination)
                .conflict_detail_level(r.detail_level)
                .conflict_resolution_strategy(r.strategy);
            let request = finish_merge!(with_commit_args!(builder, commit), target_branch, resolution);
            print_json(&request)?;
            if send {
                let client = CodeCommitClient::from_config(config)?;
                let result = client.merge_branches_by_squash(&request).await?;
                print_json(&result)?;
            }
        }
        MergeKind::ThreeWay => {
            let builder = MergeBranchesByThreeWayRequest::builder()
                .repository_name(&r.repository)
                .source_commit_specifier(&r.source)
                .destination_commit_specifier(&r.destination)
                .conflict_detail_level(r.detail_level)
                .conflict_resolution_strategy(r.strategy);
            let request = finish_merge!(with_commit_args!(builder, commit), target_branch, resolution);
            print_json(&request)?;
            if send {
                let client = CodeCommitClient::from_config(config)?;
                let result = client.merge_branches_by_three_way(&request).await?;
                print_json(&result)?;
            }
        }
    }

    if send {
        eprintln!("{}", style::done("Merge request sent"));
    } else {
        eprintln!("{}", style::note("Request is valid (not sent; use --send)"));
    }
    Ok(())
}

async fn cmd_conflicts(
    config: &ClientConfig,
    r: Resolved,
    merge_option: MergeOption,
    max_files: Option<i32>,
    all: bool,
    json: bool,
) -> Result<()> {
    let mut builder = GetMergeConflictsRequest::builder()
        .repository_name(&r.repository)
        .source_commit_specifier(&r.source)
        .destination_commit_specifier(&r.destination)
        .merge_option(merge_option)
        .conflict_detail_level(r.detail_level)
        .conflict_resolution_strategy(r.strategy);
    if let Some(max) = max_files {
        builder = builder.max_conflict_files(max);
    }
    let request = builder.build().context("invalid conflicts request")?;

    let client = CodeCommitClient::from_config(config)?;
    info!(repository = %r.repository, all, "fetching merge conflicts");
    let result = if all {
        client.get_merge_conflicts_all(&request).await?
    } else {
        client.get_merge_conflicts(&request).await?
    };

    if json {
        print_json(&result)?;
    } else {
        conflicts::print_conflicts(&result);
    }
    Ok(())
}

async fn cmd_options(config: &ClientConfig, r: Resolved) -> Result<()> {
    let request = GetMergeOptionsRequest::builder()
        .repository_name(&r.repository)
        .source_commit_specifier(&r.source)
        .destination_commit_specifier(&r.destination)
        .conflict_detail_level(r.detail_level)
        .conflict_resolution_strategy(r.strategy)
        .build()
        .context("invalid merge options request")?;

    let client = CodeCommitClient::from_config(config)?;
    let result = client.get_merge_options(&request).await?;
    conflicts::print_options(&result);
    Ok(())
}

// ---------------------------------------------------------------------------
// Utilities
// ---------------------------------------------------------------------------

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize")?;
    println!("{}", rendered);
    Ok(())
}
