use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use ziptree::aggregate::{update_download_sizes, update_raw_sizes, SizeReport};
use ziptree::builder::build;
use ziptree::sort::{by_download_size_desc, by_name, by_raw_size_desc, sort};
use ziptree::traversal::{dump_tree, preorder};
use ziptree::{ArchiveEntry, ArchiveNode, ArchiveSession, LogDiagnostics, TreeOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeColumns {
    Raw,
    Download,
    Both,
}

impl SizeColumns {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "raw" => Ok(SizeColumns::Raw),
            "download" => Ok(SizeColumns::Download),
            "both" => Ok(SizeColumns::Both),
            other => Err(Error::CliInputError(format!("unknown sizes '{}'", other))),
        }
    }

    fn raw(self) -> bool {
        self != SizeColumns::Download
    }

    fn download(self) -> bool {
        self != SizeColumns::Raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Raw,
    Download,
    Name,
}

impl SortKey {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "raw" => Ok(SortKey::Raw),
            "download" => Ok(SortKey::Download),
            "name" => Ok(SortKey::Name),
            other => Err(Error::CliInputError(format!("unknown sort key '{}'", other))),
        }
    }
}

/// A built and measured tree plus whatever could not be measured.
pub struct Analysis {
    pub root: ArchiveNode,
    pub reports: Vec<SizeReport>,
    pub containers: usize,
}

/// Opens, builds and measures an archive. The session is closed before returning.
pub fn analyze(path: &Path, options: TreeOptions) -> Result<Analysis> {
    let mut session = ArchiveSession::open_with(path, options, LogDiagnostics)?;
    let mut root = build(&mut session)?;
    let reports = vec![
        update_raw_sizes(&mut root, &mut session)?,
        update_download_sizes(&mut root, &mut session)?,
    ];
    let containers = session.container_count();
    session.close();
    Ok(Analysis {
        root,
        reports,
        containers,
    })
}

fn size_cell(size: Option<u64>) -> String {
    size.map_or_else(|| "?".to_string(), |s| s.to_string())
}

/// One line per node: size columns, 10 wide and left aligned, then the path.
pub fn render_tree(root: &ArchiveNode, columns: SizeColumns) -> String {
    dump_tree(root, |node| {
        let entry = node.entry();
        let mut line = String::new();
        if columns.raw() {
            line.push_str(&format!("{:<10} ", size_cell(entry.raw_size())));
        }
        if columns.download() {
            line.push_str(&format!("{:<10} ", size_cell(entry.download_size())));
        }
        line.push_str(entry.full_path());
        line
    })
}

pub fn apply_sort(root: &mut ArchiveNode, key: SortKey) {
    let compare: fn(&ArchiveEntry, &ArchiveEntry) -> std::cmp::Ordering = match key {
        SortKey::Raw => by_raw_size_desc,
        SortKey::Download => by_download_size_desc,
        SortKey::Name => by_name,
    };
    sort(root, compare);
}

fn report_failures<W: Write>(analysis: &Analysis, err: &mut W) -> Result<()> {
    for report in &analysis.reports {
        for failure in &report.failures {
            writeln!(
                err,
                "warning: no {} size for {}: {}",
                report.metric, failure.path, failure.error
            )?;
        }
    }
    Ok(())
}

pub fn show_tree<W: Write, E: Write>(
    path: &Path,
    options: TreeOptions,
    columns: SizeColumns,
    sort_key: Option<SortKey>,
    json: bool,
    out: &mut W,
    err: &mut E,
) -> Result<()> {
    let mut analysis = analyze(path, options)?;
    if let Some(key) = sort_key {
        apply_sort(&mut analysis.root, key);
    }

    if json {
        serde_json::to_writer_pretty(&mut *out, &analysis.root)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", render_tree(&analysis.root, columns))?;
    }
    report_failures(&analysis, err)
}

pub fn show_summary<W: Write, E: Write>(
    path: &Path,
    options: TreeOptions,
    out: &mut W,
    err: &mut E,
) -> Result<()> {
    let analysis = analyze(path, options)?;
    let root = analysis.root.entry();
    let mount_points = preorder(&analysis.root)
        .filter(|n| n.entry().is_mount_point())
        .count();

    writeln!(out, "Archive: {}", path.display())?;
    writeln!(out, "Raw size: {} bytes", size_cell(root.raw_size()))?;
    writeln!(out, "Download size: {} bytes", size_cell(root.download_size()))?;
    writeln!(out, "Entries: {}", analysis.root.node_count() - 1)?;
    writeln!(out, "Nested archives: {}", mount_points)?;
    writeln!(out, "Containers opened: {}", analysis.containers)?;
    report_failures(&analysis, err)
}
