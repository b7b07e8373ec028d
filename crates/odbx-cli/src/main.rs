//! Command-line front end: result descriptors and VTU/PVD/CSV conversion.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::*;
use odbx_io::{
    ConversionConfig, FrameSelection, HistoryTable, OutputLayout, ResultDescriptor, StepFrames,
    Transcoder, build_collection, descriptor_path, load_archive, write_collection,
};
use odbx_model::{ResultArchive, ResultSource};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Output extra/debug info while converting.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a JSON descriptor of the instances, steps and frames.
    Header {
        /// Result archive to describe.
        input: PathBuf,
        /// Appended to the descriptor file stem.
        #[arg(long, default_value = "")]
        suffix: String,
    },
    /// Convert selected frames to VTU files.
    Convert {
        /// Result archive to convert.
        input: PathBuf,
        /// Instances to include, in output order.
        #[arg(short = 'i', long = "instance", required = true, num_args = 1..)]
        instances: Vec<String>,
        /// Frames to convert as `step:0,1,2`. Can be given more than once;
        /// a repeated step replaces the earlier request.
        #[arg(short = 's', long = "step", required = true)]
        steps: Vec<StepFrames>,
        /// Appended to the output directory and file stems.
        #[arg(long, default_value = "")]
        suffix: String,
        /// Also write the history output of the selected steps as CSV.
        #[arg(long)]
        history: bool,
        /// Also write a PVD collection over the converted frames.
        #[arg(long)]
        collection: bool,
        /// Skip the VTU files.
        #[arg(long = "no-frames")]
        no_frames: bool,
        /// Convert frames on this many threads.
        #[arg(short = 'j', long)]
        jobs: Option<usize>,
        /// TOML conversion settings.
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
}

struct ConvertArgs {
    input: PathBuf,
    instances: Vec<String>,
    selection: FrameSelection,
    suffix: String,
    history: bool,
    collection: bool,
    frames: bool,
    jobs: Option<usize>,
    config: Option<PathBuf>,
}

fn open(input: &Path) -> anyhow::Result<ResultArchive> {
    info!("reading {}", input.display());
    let archive =
        load_archive(input).with_context(|| format!("failed to read {}", input.display()))?;
    debug!(
        "instances: {}; steps: {}",
        archive.instance_names().join(", "),
        archive.step_names().join(", ")
    );
    Ok(archive)
}

fn header(input: &Path, suffix: &str) -> anyhow::Result<()> {
    let archive = open(input)?;
    let descriptor = ResultDescriptor::from_source(&archive)?;
    let path = descriptor_path(input, suffix);
    descriptor
        .write(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Returns the number of frames that failed
fn convert(args: ConvertArgs) -> anyhow::Result<usize> {
    let config = match &args.config {
        Some(path) => ConversionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConversionConfig::default(),
    };
    let archive = open(&args.input)?;

    let layout = OutputLayout::for_input(&args.input, &args.suffix);
    layout
        .create()
        .with_context(|| format!("failed to create {}", layout.dir().display()))?;

    let transcoder = Transcoder::new(
        &archive,
        &args.instances,
        &config.catalog(),
        &config.orientation,
    )?;

    let mut failed = 0;
    if args.frames {
        let outcomes = match args.jobs {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .context("failed to start worker threads")?;
                pool.install(|| transcoder.write_frames_parallel(&layout, &args.selection))
            }
            None => transcoder.write_frames(&layout, &args.selection),
        };
        failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            "converted {} of {} frame(s)",
            outcomes.len() - failed,
            outcomes.len()
        );
    }

    if args.collection {
        let entries = build_collection(&archive, &args.selection)?;
        let path = layout.collection_path();
        write_collection(&path, &entries)?;
        info!("wrote {}", path.display());
    }

    if args.history {
        let table = HistoryTable::collect(&archive, args.selection.step_names())?;
        if table.width() == 0 {
            warn!("selected steps carry no history output");
        } else {
            let path = layout.history_path();
            table.write(&path)?;
            info!("wrote {} ({} columns)", path.display(), table.width());
        }
    }

    Ok(failed)
}

fn run(cli: Cli) -> anyhow::Result<usize> {
    match cli.command {
        Command::Header { input, suffix } => header(&input, &suffix).map(|()| 0),
        Command::Convert {
            input,
            instances,
            steps,
            suffix,
            history,
            collection,
            no_frames,
            jobs,
            config,
        } => {
            if jobs == Some(0) {
                bail!("--jobs must be at least 1");
            }
            convert(ConvertArgs {
                input,
                instances,
                selection: steps.into_iter().collect(),
                suffix,
                history,
                collection,
                frames: !no_frames,
                jobs,
                config,
            })
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::builder().filter_level(log_level).init();

    match run(cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            error!("{failed} frame(s) failed");
            ExitCode::from(1)
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}
