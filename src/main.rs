pub mod artifact;
pub mod config;
pub mod error;
pub mod license;
pub mod matcher;
pub mod maven;
pub mod pipeline;
pub mod publish;
pub mod report;
pub mod resolver;
pub mod rules;
pub mod util;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{info, Level};

use crate::config::{ConfigOverrides, PipelineConfig};
use crate::error::AuditError;
use crate::maven::remote_repo::RemoteMavenRepo;
use crate::pipeline::{assemble_programs, Outcome, Pipeline};
use crate::publish::DirectoryPublisher;
use crate::resolver::{DependencyManifest, ManifestResolver, MetadataResolver, RepositoryResolver};

#[derive(Parser)]
#[command(name = "license-audit", version, about = "Completes, filters and verifies the license information of a build's dependencies")]
struct Cli {
    /// More output per occurrence (info, debug, trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the license pipeline for a resolved dependency graph
    Process(ProcessArgs),
}

#[derive(Args)]
struct ProcessArgs {
    /// JSON manifest of the resolved dependency graph
    #[arg(long, value_name = "PATH")]
    manifest: PathBuf,
    /// Maven repository to resolve project metadata from (default: the manifest)
    #[arg(long, value_name = "URL")]
    repository: Option<String>,
    /// Rule file, or directory of *.json rule files
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,
    /// Rule document given directly, evaluated after all other rules
    #[arg(long, value_name = "JSON")]
    inline_rules: Option<String>,
    /// JSON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Fail if any shipped artifact has no license information
    #[arg(long)]
    require_complete: bool,
    /// Skip the whole check
    #[arg(long)]
    disable_check: bool,
    /// Write licenses.xml
    #[arg(long, value_name = "PATH")]
    xml: Option<PathBuf>,
    /// Write licenses.html
    #[arg(long, value_name = "PATH")]
    html: Option<PathBuf>,
    /// Attach the generated reports
    #[arg(long)]
    attach: bool,
    /// Where attached reports go
    #[arg(long, value_name = "DIR", default_value = "target/attached")]
    attach_dir: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Process(args) => run_process(args).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<AuditError>() {
            Some(audit_error) => eprintln!("{}", audit_error),
            None => eprintln!("{:#}", e),
        }
        process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_process(args: ProcessArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let config = config.merge(ConfigOverrides {
        require_complete_license_info: args.require_complete,
        disable_check: args.disable_check,
        attach: args.attach,
        generate_license_xml: args.xml,
        generate_license_html: args.html,
    });

    if config.disable_check {
        info!("license check is disabled");
        return Ok(());
    }

    let manifest = DependencyManifest::load(&args.manifest)?;
    let root = manifest.root_artifact();
    let resolver: Box<dyn MetadataResolver> = match args.repository {
        Some(url) => Box::new(RepositoryResolver::new(manifest, RemoteMavenRepo::new(url)?)),
        None => Box::new(ManifestResolver::new(manifest)),
    };

    let programs = assemble_programs(&config, args.rules.as_deref(), args.inline_rules.as_deref())?;
    let mut publisher = DirectoryPublisher::new(args.attach_dir);

    let outcome = Pipeline::new(&config, programs, resolver.as_ref())
        .with_publisher(&mut publisher)
        .run(root)
        .await?;

    if let Outcome::Completed(dependencies) = outcome {
        info!("{} dependencies checked", dependencies.len());
    }
    Ok(())
}
