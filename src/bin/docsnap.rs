//! Docsnap CLI - Deterministic documentation snapshots of a codebase.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use docsnap::builder::{Snapshot, DEFAULT_TREE_DEPTH};
use docsnap::docstring::{extract, read_source, Extraction};
use docsnap::errors::{exit_code, SnapError};
use docsnap::filter::ExclusionRules;
use docsnap::logging::{init_logging, Verbosity};
use docsnap::output::{
    format_pack, format_snapshot, write_report, OutputFormat, PackOptions, SnapshotOptions,
};
use docsnap::tree::render_tree;
use serde::Serialize;
use tracing::debug;

/// Exit code when documentation is missing.
const EXIT_MISSING: i32 = 2;

#[derive(Parser)]
#[command(name = "docsnap")]
#[command(about = "Deterministic documentation snapshots of a codebase")]
#[command(version)]
struct Cli {
    /// More diagnostics on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors on stderr
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot the project tree and Python module docstrings
    Snapshot {
        /// Workspace root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Directory (relative to root) whose Python files are scanned
        #[arg(long, default_value = ".")]
        focus: PathBuf,

        /// Maximum tree depth
        #[arg(long, default_value_t = DEFAULT_TREE_DEPTH)]
        max_depth: usize,

        /// Maximum lines shown per docstring
        #[arg(long, default_value_t = 60)]
        max_docstring_lines: usize,

        /// Maximum characters shown per docstring
        #[arg(long, default_value_t = 4000)]
        max_docstring_chars: usize,

        /// Only list files without a module docstring
        #[arg(long)]
        missing_only: bool,

        /// Exit with status 2 when any module docstring is missing
        #[arg(long)]
        fail_on_missing: bool,

        #[command(flatten)]
        exclude: ExcludeArgs,

        /// Write the report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a docs context pack: tree, docstrings and Markdown headings
    Pack {
        /// Workspace root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Directory (relative to root) whose Python files are scanned
        #[arg(long, default_value = ".")]
        focus: PathBuf,

        /// Maximum tree depth
        #[arg(long, default_value_t = DEFAULT_TREE_DEPTH)]
        tree_depth: usize,

        /// Maximum lines shown per docstring
        #[arg(long, default_value_t = 40)]
        max_docstring_lines: usize,

        /// Maximum characters shown per docstring
        #[arg(long, default_value_t = 2500)]
        max_docstring_chars: usize,

        /// Maximum headings listed per Markdown file
        #[arg(long, default_value_t = 25)]
        max_md_headings: usize,

        #[command(flatten)]
        exclude: ExcludeArgs,

        /// Write the pack here
        #[arg(long)]
        out: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display the filtered directory tree
    Tree {
        /// Root directory to render
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Maximum directory depth
        #[arg(long, default_value_t = DEFAULT_TREE_DEPTH)]
        max_depth: usize,

        #[command(flatten)]
        exclude: ExcludeArgs,
    },

    /// Print the module docstring of one Python file
    Docstring {
        /// Python source file
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct ExcludeArgs {
    /// Additional directory name to exclude (repeatable)
    #[arg(long, value_name = "NAME")]
    exclude_dir: Vec<String>,

    /// Additional file glob to exclude, e.g. "**/*.ipynb" (repeatable)
    #[arg(long, value_name = "GLOB")]
    exclude_glob: Vec<String>,
}

impl ExcludeArgs {
    fn rules(self, defaults: ExclusionRules) -> Result<ExclusionRules, SnapError> {
        Ok(defaults
            .with_dirs(self.exclude_dir)
            .with_globs(self.exclude_glob)?)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(Verbosity {
        quiet: cli.quiet,
        verbose: cli.verbose,
    });
    let json_output = json_flag(&cli.command);

    let result = match cli.command {
        Commands::Snapshot {
            root,
            focus,
            max_depth,
            max_docstring_lines,
            max_docstring_chars,
            missing_only,
            fail_on_missing,
            exclude,
            out,
            json,
        } => exclude
            .rules(ExclusionRules::snapshot_defaults())
            .and_then(|rules| {
                let snapshot = Snapshot::new(root)
                    .focus(focus)
                    .tree_depth(max_depth)
                    .rules(rules);
                let options = SnapshotOptions {
                    format: format_for(json),
                    max_docstring_lines,
                    max_docstring_chars,
                    missing_only,
                };
                run_snapshot(snapshot, &options, out.as_deref(), fail_on_missing)
            }),
        Commands::Pack {
            root,
            focus,
            tree_depth,
            max_docstring_lines,
            max_docstring_chars,
            max_md_headings,
            exclude,
            out,
            json,
        } => exclude
            .rules(ExclusionRules::pack_defaults())
            .and_then(|rules| {
                let snapshot = Snapshot::new(root)
                    .focus(focus)
                    .tree_depth(tree_depth)
                    .rules(rules)
                    .include_markdown(max_md_headings);
                let options = PackOptions {
                    format: format_for(json),
                    max_docstring_lines,
                    max_docstring_chars,
                };
                run_pack(snapshot, &options, &out)
            }),
        Commands::Tree {
            path,
            max_depth,
            exclude,
        } => exclude
            .rules(ExclusionRules::snapshot_defaults())
            .and_then(|rules| run_tree(&path, max_depth, &rules)),
        Commands::Docstring { file } => run_docstring(&file),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "docsnap", &mut std::io::stdout());
            Ok(0)
        }
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            if json_output {
                #[derive(Serialize)]
                struct ErrorOutput {
                    error: String,
                    code: i32,
                }

                let payload = ErrorOutput {
                    error: e.to_string(),
                    code: exit_code(&e),
                };

                let json = serde_json::to_string(&payload)
                    .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
                eprintln!("{json}");
            } else {
                eprintln!("error: {}", e);
            }
            std::process::exit(exit_code(&e));
        }
    }
}

fn json_flag(cmd: &Commands) -> bool {
    match cmd {
        Commands::Snapshot { json, .. } => *json,
        Commands::Pack { json, .. } => *json,
        Commands::Tree { .. } => false,
        Commands::Docstring { .. } => false,
        Commands::Completions { .. } => false,
    }
}

fn format_for(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Markdown
    }
}

/// Print a report, or write it and print where it went.
fn emit(report: &str, out: Option<&Path>) -> Result<(), SnapError> {
    match out {
        Some(path) => {
            write_report(path, report)?;
            println!("{}", path.display());
        }
        None => println!("{report}"),
    }
    Ok(())
}

// --- Snapshot command ---

fn run_snapshot(
    snapshot: Snapshot,
    options: &SnapshotOptions,
    out: Option<&Path>,
    fail_on_missing: bool,
) -> Result<i32, SnapError> {
    let result = snapshot.build()?;
    let report = format_snapshot(&result, options)?;
    emit(&report, out)?;

    if fail_on_missing && result.missing_count() > 0 {
        debug!(missing = result.missing_count(), "failing on missing docstrings");
        return Ok(EXIT_MISSING);
    }
    Ok(0)
}

// --- Pack command ---

fn run_pack(snapshot: Snapshot, options: &PackOptions, out: &Path) -> Result<i32, SnapError> {
    let result = snapshot.build()?;
    let report = format_pack(&result, options)?;
    emit(&report, Some(out))?;
    Ok(0)
}

// --- Tree command ---

fn run_tree(path: &Path, max_depth: usize, rules: &ExclusionRules) -> Result<i32, SnapError> {
    if !path.exists() {
        return Err(SnapError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(SnapError::RootNotDirectory(path.to_path_buf()));
    }

    for line in render_tree(path, max_depth, rules) {
        println!("{line}");
    }
    Ok(0)
}

// --- Docstring command ---

fn run_docstring(file: &Path) -> Result<i32, SnapError> {
    let source = read_source(file).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SnapError::PathNotFound(file.to_path_buf()),
        _ => SnapError::Io(e),
    })?;

    match extract(&source) {
        Extraction::Found(text) => {
            println!("{text}");
            Ok(0)
        }
        Extraction::Missing => {
            eprintln!("no module docstring: {}", file.display());
            Ok(EXIT_MISSING)
        }
    }
}
