use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};

use git_clone_all::context::build_dispatch;
use git_clone_all::{
    sweep, Config, Error, ExclusionSet, GitCli, GitHubClient, Owner, SyncContext, SyncEngine,
    SyncOptions, SyncResult, Verbosity,
};

#[derive(Parser)]
#[command(name = "git-clone-all")]
#[command(about = "Clone every repository of a GitHub user or organization")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Mode of operation
    #[arg(value_enum, required = true)]
    mode: Option<Mode>,

    /// User or organization whose repositories are cloned
    #[arg(required = true)]
    owner: Option<String>,

    /// Perform a clean operation (reserved, currently has no effect)
    #[arg(short, long, global = true)]
    clean: bool,

    /// Print debug info
    #[arg(short, long, global = true)]
    debug: bool,

    /// No operation mode: report what would happen without changing anything
    #[arg(short, long, global = true)]
    noop: bool,

    /// Increase verbosity by repeating: -v, -vv, -vvv
    #[arg(short, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path (defaults to XDG config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that receives the <owner>/ folder
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// File listing repository names to skip
    #[arg(long, global = true)]
    exclude_file: Option<PathBuf>,

    /// Continue after a failed clone and report failures at the end
    #[arg(long)]
    keep_going: bool,

    /// Do not clone archived repositories
    #[arg(long)]
    skip_archived: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run git pull in every repository below a directory
    Sweep {
        /// Directory whose immediate subdirectories are updated
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    /// Repositories of a user
    Usr,
    /// Repositories of an organization
    Org,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    let mut verbosity = Verbosity::from_count(cli.verbose);
    if cli.debug {
        verbosity = verbosity.at_least(Verbosity::Debug);
    }
    let dispatch = build_dispatch(verbosity, &config.logging);
    let ctx = SyncContext::new(verbosity, cli.clean, cli.noop, dispatch);

    let run = async {
        if ctx.clean {
            warn!("--clean is reserved and currently has no effect");
        }

        match (cli.command, cli.mode, cli.owner) {
            (Some(Commands::Sweep { dir }), _, _) => cmd_sweep(&ctx, &config, dir).await,
            (None, Some(mode), Some(owner)) => cmd_clone(&ctx, &config, mode, owner).await,
            _ => bail!("missing <MODE> <OWNER> arguments"),
        }
    };

    tokio::select! {
        result = ctx.scope(run) => result,
        _ = tokio::signal::ctrl_c() => bail!("interrupted"),
    }
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<&std::path::Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(path),
        None => Config::load_or_default(),
    }
}

/// Command line flags win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(base_dir) = &cli.base_dir {
        config.base_directory = base_dir.to_string_lossy().into_owned();
    }
    if let Some(exclude_file) = &cli.exclude_file {
        config.exclude_file = exclude_file.to_string_lossy().into_owned();
    }
    if cli.keep_going {
        config.sync.keep_going = true;
    }
    if cli.skip_archived {
        config.sync.skip_archived = true;
    }
}

/// Fetch the owner's catalog and clone what is missing locally
async fn cmd_clone(ctx: &SyncContext, config: &Config, mode: Mode, owner: String) -> Result<()> {
    let owner = match mode {
        Mode::Usr => Owner::User(owner),
        Mode::Org => Owner::Org(owner),
    };

    let exclusions = ExclusionSet::load(&config.exclude_path());

    // fails on a missing token before any request is made
    let client = GitHubClient::from_config(&config.github, config.request_timeout())?;
    let catalog = client
        .list_repositories(&owner)
        .await
        .with_context(|| format!("Failed to fetch repositories of {}", owner))?;

    info!("cloning {} repositories...", catalog.len());

    let options = SyncOptions {
        keep_going: config.sync.keep_going,
        skip_archived: config.sync.skip_archived,
    };
    let engine = SyncEngine::new(GitCli::new(config.git_timeout()), config.base_path(), options);
    let summary = engine.sync(ctx, owner.name(), &catalog, &exclusions).await?;

    // per-repository dry-run lines are info logs; list them when those are filtered out
    if ctx.noop && ctx.verbosity < Verbosity::Info {
        for result in &summary.results {
            if let SyncResult::WouldClone { full_name } = result {
                println!("would clone {}", full_name);
            }
        }
    }

    let verb = if ctx.noop { "Would clone" } else { "Cloned" };
    println!(
        "{} {} of {} repositories ({} already present, {} excluded) in {:.2}s",
        verb,
        summary.cloned,
        summary.total_repositories,
        summary.skipped,
        summary.excluded,
        summary.duration.as_secs_f64()
    );

    if summary.failed > 0 {
        println!("Failed:");
        for result in summary.failures() {
            if let SyncResult::Failed { full_name, error } = result {
                println!("   {}: {}", full_name, error);
            }
        }
        return Err(Error::PartialFailure {
            failed: summary.failed,
            total: summary.total_repositories,
        }
        .into());
    }

    Ok(())
}

/// Pull every working copy below `dir`
async fn cmd_sweep(ctx: &SyncContext, config: &Config, dir: PathBuf) -> Result<()> {
    let exclusions = ExclusionSet::load(&config.exclude_path());
    let git = GitCli::new(config.git_timeout());

    let summary = sweep::sweep(ctx, &git, &dir, &exclusions).await?;

    let verb = if ctx.noop { "Would pull" } else { "Pulled" };
    println!(
        "{} {} repositories ({} excluded, {} failed)",
        verb, summary.pulled, summary.excluded, summary.failed
    );
    Ok(())
}
