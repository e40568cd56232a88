//! Archive sessions
//!
//! An `ArchiveSession` owns the root container of an opened file and every
//! nested container opened while mounting archives found inside it. Containers
//! are kept in acquisition order and released together, newest first, by
//! `close()` or when the session is dropped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::config::TreeOptions;
use crate::container::{sniff_zip, Container, FileContainer, ZipContainer};
use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::error::{Error, Result};
use crate::node::EntrySource;

/// Index of a container in its session, in acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub(crate) usize);

impl ContainerId {
    pub fn index(&self) -> usize {
        self.0
    }
}

pub struct ArchiveSession {
    path: PathBuf,
    containers: Vec<Box<dyn Container>>,
    nested: HashMap<(ContainerId, String), ContainerId>,
    options: TreeOptions,
    diagnostics: Box<dyn Diagnostics>,
    closed: bool,
}

impl std::fmt::Debug for ArchiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSession")
            .field("path", &self.path)
            .field("containers", &self.containers.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl ArchiveSession {
    /// Opens `path` with default options, reporting through the `log` facade.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, TreeOptions::default(), LogDiagnostics)
    }

    pub fn open_with<P, D>(path: P, options: TreeOptions, diagnostics: D) -> Result<Self>
    where
        P: AsRef<Path>,
        D: Diagnostics + 'static,
    {
        options.validate()?;
        let path = path.as_ref();
        let root = open_root(path)?;
        log::debug!("acquired root container {} ({})", root.name(), path.display());

        Ok(ArchiveSession {
            path: path.to_path_buf(),
            containers: vec![root],
            nested: HashMap::new(),
            options,
            diagnostics: Box::new(diagnostics),
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn root_id(&self) -> Result<ContainerId> {
        self.ensure_open()?;
        Ok(ContainerId(0))
    }

    /// Number of containers currently held, the root included.
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn container(&self, id: ContainerId) -> Result<&dyn Container> {
        self.ensure_open()?;
        self.containers
            .get(id.0)
            .map(|c| &**c)
            .ok_or_else(|| Error::EntryNotFound(format!("container #{}", id.0)))
    }

    pub fn container_mut(&mut self, id: ContainerId) -> Result<&mut dyn Container> {
        self.ensure_open()?;
        match self.containers.get_mut(id.0) {
            Some(c) => Ok(&mut **c),
            None => Err(Error::EntryNotFound(format!("container #{}", id.0))),
        }
    }

    /// Opens the zip stored as `path` inside container `parent`.
    ///
    /// Each nested container is opened once; later calls return the same id.
    pub fn open_nested(&mut self, parent: ContainerId, path: &str) -> Result<ContainerId> {
        self.ensure_open()?;
        let key = (parent, path.to_string());
        if let Some(&id) = self.nested.get(&key) {
            return Ok(id);
        }

        let bytes = self.container_mut(parent)?.read_entry(path).map_err(|e| match e {
            Error::Read { source, .. } => Error::Open {
                path: PathBuf::from(path),
                reason: source.to_string(),
            },
            other => other,
        })?;
        let container = ZipContainer::new(path, Cursor::new(bytes))?;

        let id = ContainerId(self.containers.len());
        log::debug!("acquired nested container #{} {}", id.0, path);
        self.containers.push(Box::new(container));
        self.nested.insert(key, id);
        Ok(id)
    }

    /// Raw bytes of a tree entry, for callers that decode entry content.
    pub fn read_entry_bytes(&mut self, source: &EntrySource) -> Result<Vec<u8>> {
        self.container_mut(source.container)?.read_entry(&source.path)
    }

    /// Releases every container, newest first. Calling it again does nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        while let Some(container) = self.containers.pop() {
            log::debug!(
                "released container #{} {}",
                self.containers.len(),
                container.name()
            );
            drop(container);
        }
        self.nested.clear();
        self.closed = true;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::SessionClosed)
        } else {
            Ok(())
        }
    }
}

impl Drop for ArchiveSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn open_root(path: &Path) -> Result<Box<dyn Container>> {
    let open_error = |reason: String| Error::Open {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| open_error(e.to_string()))?;
    if !file.metadata().map_err(|e| open_error(e.to_string()))?.is_file() {
        return Err(open_error("not a regular file".to_string()));
    }
    let mut reader = BufReader::new(file);
    let mut head = Vec::with_capacity(4);
    (&mut reader)
        .take(4)
        .read_to_end(&mut head)
        .map_err(|e| open_error(e.to_string()))?;

    if sniff_zip(&head) {
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| open_error(e.to_string()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let container = ZipContainer::new(name, reader).map_err(|e| open_error(e.to_string()))?;
        Ok(Box::new(container))
    } else {
        drop(reader);
        let container = FileContainer::open(path).map_err(|e| open_error(e.to_string()))?;
        Ok(Box::new(container))
    }
}
