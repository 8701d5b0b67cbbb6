//! Docsnap - Deterministic documentation snapshots of a codebase.
//!
//! Docsnap renders a filtered directory tree, extracts the leading
//! documentation literal (the module docstring) of every Python file, and
//! assembles both into a Markdown or JSON report suitable for reviewers and
//! for feeding to language models.
//!
//! # Quick Start
//!
//! ```no_run
//! use docsnap::builder::Snapshot;
//! use docsnap::output::{format_snapshot, SnapshotOptions};
//!
//! let result = Snapshot::new("./my-project")
//!     .focus("src")
//!     .build()
//!     .unwrap();
//!
//! println!("{}", format_snapshot(&result, &SnapshotOptions::default()).unwrap());
//! println!("{} files lack a docstring", result.missing_count());
//! ```
//!
//! # Modules
//!
//! - [`filter`] - Excluded directory names and file globs
//! - [`tree`] - Box-drawing directory tree rendering
//! - [`docstring`] - Two-tier documentation literal extraction
//! - [`truncate`] - Line and character bounds for report text
//! - [`walker`] - Source file discovery
//! - [`markdown`] - Markdown heading outlines
//! - [`builder`] - Fluent API tying the pieces together
//! - [`output`] - Markdown and JSON reports

pub mod filter;
pub mod errors;
pub mod tree;
pub mod docstring;
pub mod truncate;
pub mod walker;
pub mod markdown;
pub mod output;
pub mod builder;
pub mod logging;

// Re-export key types at crate root for convenience
pub use builder::{FileDoc, MarkdownDoc, Snapshot, SnapshotResult};
pub use docstring::{extract, read_source, DocstringParser, Extraction};
pub use errors::{exit_code, SnapError};
pub use filter::{ExclusionRules, FilterError};
pub use markdown::extract_headings;
pub use output::{format_pack, format_snapshot, OutputError, OutputFormat};
pub use tree::render_tree;
pub use truncate::truncate;
pub use walker::{discover_files, WalkError};
