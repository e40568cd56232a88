//! Bottom-up size aggregation
//!
//! Files (mount points included) get their size from the calculator. A
//! directory gets the sum of its direct children. A mount point never takes
//! the sum of its mounted subtree: that subtree is aggregated on its own, one
//! level below, so the outer blob and the nested content are never counted
//! together.
//!
//! A failure on one entry leaves that entry without a size and is recorded in
//! the returned `SizeReport`; the rest of the tree is still computed. A
//! directory whose total overflows `u64` is recorded the same way.

use crate::error::{Error, Result};
use crate::node::ArchiveNode;
use crate::session::ArchiveSession;
use crate::size::{DownloadSizeCalculator, RawSizeCalculator, SizeCalculator, SizeMetric};

#[derive(Debug)]
pub struct SizeFailure {
    pub path: String,
    pub error: Error,
}

#[derive(Debug)]
pub struct SizeReport {
    pub metric: SizeMetric,
    pub failures: Vec<SizeFailure>,
}

impl SizeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn update_sizes(
    root: &mut ArchiveNode,
    session: &mut ArchiveSession,
    calculator: &dyn SizeCalculator,
) -> Result<SizeReport> {
    let mut report = SizeReport {
        metric: calculator.metric(),
        failures: Vec::new(),
    };
    visit(root, session, calculator, &mut report)?;
    if !report.is_complete() {
        log::warn!(
            "{} of {} sizes could not be computed",
            report.failures.len(),
            report.metric
        );
    }
    Ok(report)
}

pub fn update_raw_sizes(root: &mut ArchiveNode, session: &mut ArchiveSession) -> Result<SizeReport> {
    update_sizes(root, session, &RawSizeCalculator)
}

/// Uses the download options the session was opened with.
pub fn update_download_sizes(
    root: &mut ArchiveNode,
    session: &mut ArchiveSession,
) -> Result<SizeReport> {
    let calculator = DownloadSizeCalculator::new(session.options().download);
    update_sizes(root, session, &calculator)
}

fn visit(
    node: &mut ArchiveNode,
    session: &mut ArchiveSession,
    calculator: &dyn SizeCalculator,
    report: &mut SizeReport,
) -> Result<Option<u64>> {
    let metric = calculator.metric();

    if node.entry().is_directory() {
        let mut total = Some(0u64);
        for child in node.children_mut().iter_mut() {
            if let Some(size) = visit(child, session, calculator, report)? {
                total = total.and_then(|t| t.checked_add(size));
            }
        }
        if total.is_none() {
            let error = Error::SizeOverflow(node.path().to_string());
            log::trace!("{error}");
            report.failures.push(SizeFailure {
                path: node.path().to_string(),
                error,
            });
        }
        node.entry_mut().set_size(metric, total);
        return Ok(total);
    }

    // Mounted content is measured separately and not added to this entry.
    for child in node.children_mut().iter_mut() {
        visit(child, session, calculator, report)?;
    }

    let size = match node.entry().source().cloned() {
        Some(source) => {
            let container = session.container_mut(source.container)?;
            match calculator.calculate(container, &source.path) {
                Ok(size) => Some(size),
                Err(Error::SessionClosed) => return Err(Error::SessionClosed),
                Err(error) => {
                    log::trace!("{}: {error}", node.path());
                    report.failures.push(SizeFailure {
                        path: node.path().to_string(),
                        error,
                    });
                    None
                }
            }
        }
        None => None,
    };
    node.entry_mut().set_size(metric, size);
    Ok(size)
}
