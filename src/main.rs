use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use sim2sumo::cli::Args;
use sim2sumo::cloud::{LocalExporter, S3Uploader, Uploader};
use sim2sumo::config::{load_global_config, DatatypeRegistry, GlobalConfig, Overrides};
use sim2sumo::dispatch::Dispatcher;
use sim2sumo::extract::CommandExtractor;
use sim2sumo::help::give_help;
use sim2sumo::metadata::MetadataBuilder;
use sim2sumo::planner::{ExecutionPlan, Planner};
use sim2sumo::utils::summary::{create_plan_summary, create_run_summary, write_summary};

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.debug)?;

    let registry = DatatypeRegistry::standard();

    if let Some(topic) = &args.help_on {
        println!("{}", give_help(&registry, Some(topic)));
        return Ok(());
    }

    info!("Starting sim2sumo in {}", args.runpath.display());

    // Load configuration and build the plan before doing any work
    let global = load_global_config(&args.resolved_config_path())?;
    let plan = build_plan(&args, &registry, &global)?;
    let timestamp = Utc::now().to_rfc3339();

    if args.dry_run {
        print!("{}", plan.to_yaml()?);
        if let Some(path) = &args.summary {
            write_summary(path, &create_plan_summary(&timestamp, &plan)?)?;
        }
        return Ok(());
    }

    if plan.is_empty() {
        info!("Nothing to extract");
        return Ok(());
    }

    run_plan(&args, registry, &global, &plan, &timestamp)
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(debug: bool) -> Result<()> {
    let log_level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

fn build_plan(args: &Args, registry: &DatatypeRegistry, global: &GlobalConfig) -> Result<ExecutionPlan> {
    let overrides = Overrides {
        datafile: args.datafile.clone(),
        datatype: args.datatype.clone(),
    };

    Planner::new(registry, &args.runpath)
        .plan_section(global.section(), &overrides)
        .map_err(|e| {
            error!("{}", e);
            anyhow!(e)
        })
}

/// Select the upload target from the arguments
fn create_uploader(args: &Args) -> Result<Arc<dyn Uploader>> {
    let env = args.env.to_string();
    if let Some(output) = &args.output {
        info!("Exporting to local directory {}", output.display());
        return Ok(Arc::new(LocalExporter::new(output, &env)));
    }
    if let Some(bucket) = &args.bucket {
        let uploader = S3Uploader::new(bucket, &env, args.region.as_deref(), args.profile.as_deref())?;
        return Ok(Arc::new(uploader));
    }
    bail!("No upload target: give --bucket for S3 or --output for a local export")
}

fn run_plan(
    args: &Args,
    registry: DatatypeRegistry,
    global: &GlobalConfig,
    plan: &ExecutionPlan,
    timestamp: &str,
) -> Result<()> {
    let metadata = Arc::new(MetadataBuilder::new(global, registry)?);
    let extractor = Arc::new(CommandExtractor::new(&args.extractor));

    // Create a new runtime for the dispatcher
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let (summary, target) = runtime.block_on(async {
        let uploader = create_uploader(args)?;
        let target = uploader.target_name();
        let dispatcher = Dispatcher::new(extractor, metadata, uploader).with_concurrency(args.threads);
        Ok::<_, anyhow::Error>((dispatcher.dispatch(plan).await, target))
    })?;

    if let Some(path) = &args.summary {
        let report = create_run_summary(timestamp, &args.env.to_string(), &target, &summary)?;
        write_summary(path, &report)?;
        info!("Run summary written to {}", path.display());
    }

    let failed = summary.failed();
    if !failed.is_empty() {
        for outcome in &failed {
            error!("Failed: {}", outcome.unit.label());
        }
        bail!("{} of {} unit(s) failed", failed.len(), summary.len());
    }

    info!("sim2sumo completed successfully, {} unit(s) uploaded", summary.len());
    Ok(())
}
