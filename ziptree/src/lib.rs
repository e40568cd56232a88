//! ziptree
//! =======
//!
//! Opens zip-based packages (APKs, AARs, JARs, plain zips) that may embed
//! further zips, presents their content as a tree, and measures every entry
//! twice: its raw size and an estimated download size.
//!
//! ```rust,no_run
//! use ziptree::{aggregate, builder, sort, traversal, ArchiveSession};
//!
//! fn main() -> Result<(), ziptree::error::Error> {
//!     let mut session = ArchiveSession::open("app.apk")?;
//!     let mut root = builder::build(&mut session)?;
//!     aggregate::update_raw_sizes(&mut root, &mut session)?;
//!     aggregate::update_download_sizes(&mut root, &mut session)?;
//!     session.close();
//!
//!     sort::sort(&mut root, sort::by_raw_size_desc);
//!     for node in traversal::preorder(&root) {
//!         println!("{:<10} {}", node.entry().raw_size().unwrap_or(0), node.path());
//!     }
//!     Ok(())
//! }
//! ```

#[macro_use]
extern crate serde_derive;

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod container;
pub mod diagnostics;
pub mod error;
pub mod node;
pub mod session;
pub mod size;
pub mod sort;
pub mod traversal;

pub use config::{DownloadSizeOptions, NestedFailurePolicy, TreeOptions};
pub use container::{Container, ContainerEntry, FileContainer, ZipContainer};
pub use diagnostics::{DiagnosticLevel, Diagnostics, LogDiagnostics, MemoryDiagnostics};
pub use node::{ArchiveEntry, ArchiveNode, EntrySource};
pub use session::{ArchiveSession, ContainerId};
pub use size::{DownloadSizeCalculator, RawSizeCalculator, SizeCalculator, SizeMetric};
