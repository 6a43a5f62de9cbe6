use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use jacoco_import::CoverageKind;
use jacoco_import::analyzer::PrecomputedLayouts;
use jacoco_import::config::{ImportConfig, load_import_config};
use jacoco_import::exec_files::{
    exec_info, merge_exec_files, read_exec_file, render_exec_info, write_exec_file,
};
use jacoco_import::locator::ProjectRelativeLocator;
use jacoco_import::project::FsProjectIndex;
use jacoco_import::sensor::{CoverageImportAdapter, FileScope};
use jacoco_import::sink::{InMemoryCoverageSink, render_measures};

#[derive(Parser, Debug)]
#[command(name = "jacoco-import")]
#[command(about = "Import JaCoCo execution data as line and branch coverage", long_about = None)]
struct Cli {
    /// Project root. Config files and relative paths are resolved against it.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log debug diagnostics (overridden by JACOCO_IMPORT_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print format version, sessions and per-class probe counts.
    Execinfo(ExecInfoArgs),

    /// Merge execution data files of one format version into one file.
    Merge(MergeArgs),

    /// Report whether the unit and integration imports would run.
    Check(ScopeArgs),

    /// Run the imports and print the recorded measures.
    ///
    /// Probe layouts are read from a JSON file produced alongside the
    /// instrumented classes.
    Import(ImportArgs),
}

#[derive(Parser, Debug)]
struct ExecInfoArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(long, short)]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct ScopeArgs {
    /// Analyze test files instead of main files.
    #[arg(long)]
    tests: bool,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    #[arg(long)]
    layouts: PathBuf,

    #[command(flatten)]
    scope: ScopeArgs,

    /// Write the measures as JSON to this file.
    #[arg(long)]
    json_out: Option<PathBuf>,
}

impl ScopeArgs {
    fn scope(&self) -> FileScope {
        if self.tests {
            FileScope::Test
        } else {
            FileScope::Main
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    jacoco_import::logging::init_tracing(cli.verbose);
    let root = dunce::canonicalize(&cli.root)
        .with_context(|| format!("project root {} not found", cli.root.display()))?;

    match cli.command {
        Commands::Execinfo(args) => execinfo(&args),
        Commands::Merge(args) => merge(&args),
        Commands::Check(args) => check(&root, &args),
        Commands::Import(args) => import(&root, &args),
    }
}

fn execinfo(args: &ExecInfoArgs) -> anyhow::Result<()> {
    let infos = args
        .files
        .iter()
        .map(|path| read_exec_file(path).map(|dump| exec_info(path, &dump)))
        .collect::<Result<Vec<_>, _>>()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else {
        infos
            .iter()
            .for_each(|info| print!("{}", render_exec_info(info)));
    }
    Ok(())
}

fn merge(args: &MergeArgs) -> anyhow::Result<()> {
    let merged = merge_exec_files(&args.files)?.context("no execution data files given")?;
    write_exec_file(&args.output, &merged)?;
    tracing::info!(
        output = %args.output.display(),
        files = args.files.len(),
        classes = merged.class_count(),
        "wrote merged execution data"
    );
    Ok(())
}

const KINDS: [CoverageKind; 2] = [CoverageKind::Unit, CoverageKind::Integration];

fn check(root: &Path, args: &ScopeArgs) -> anyhow::Result<()> {
    let config = load_import_config(root)?;
    let index = FsProjectIndex::scan(root, &config);
    let layouts = PrecomputedLayouts::new();
    for kind in KINDS {
        let adapter = adapter(root, &config, &index, &layouts, kind);
        let report = adapter
            .report_file()
            .map_or_else(|| "none".to_string(), |path| path.display().to_string());
        println!(
            "{}: report {report}, runs: {}",
            adapter,
            if adapter.should_run(args.scope()) { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn import(root: &Path, args: &ImportArgs) -> anyhow::Result<()> {
    let config = load_import_config(root)?;
    let layouts = PrecomputedLayouts::load(&args.layouts)?;
    let index = FsProjectIndex::scan(root, &config);
    let mut sink = InMemoryCoverageSink::new();

    for kind in KINDS {
        let adapter = adapter(root, &config, &index, &layouts, kind);
        if adapter.should_run(args.scope.scope()) {
            adapter.execute(&mut sink)?;
        }
    }

    let report = sink.report();
    match &args.json_out {
        Some(path) => {
            let json = serde_json::to_string_pretty(&report)?;
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => print!("{}", render_measures(&report)),
    }
    Ok(())
}

fn adapter<'a>(
    root: &Path,
    config: &'a ImportConfig,
    index: &'a FsProjectIndex,
    layouts: &'a PrecomputedLayouts,
    kind: CoverageKind,
) -> CoverageImportAdapter<'a> {
    CoverageImportAdapter::new(
        root,
        &config.language,
        config,
        &ProjectRelativeLocator,
        index,
        layouts,
    )
    .with_kind(kind)
}
