//! Containers
//! ----------
//!
//! A container is a read-only view over the entries of one zip archive, or
//! over a single plain file presented as an archive with one entry.
//!
//! Both flavours answer the same questions: which entries exist, how large
//! they are, what their bytes are, and whether an entry is itself a zip that
//! can be mounted. Nested detection looks at the entry's leading magic bytes,
//! never at its file name, so `.apk`, `.jar`, `.aar` or an extension-less
//! member are all recognised the same way.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Signature of a zip local file header (`PK\x03\x04`).
pub const ZIP_LOCAL_HEADER_MAGIC: u32 = 0x0403_4b50;
/// Signature of the end of central directory record (`PK\x05\x06`); an
/// archive with no entries starts with it.
pub const ZIP_END_OF_CENTRAL_DIR_MAGIC: u32 = 0x0605_4b50;

/// Returns true when `bytes` start like a zip archive.
pub fn sniff_zip(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }
    let magic = LittleEndian::read_u32(&bytes[..4]);
    magic == ZIP_LOCAL_HEADER_MAGIC || magic == ZIP_END_OF_CENTRAL_DIR_MAGIC
}

fn sniff_reader<R: Read>(reader: R) -> std::io::Result<bool> {
    let mut head = Vec::with_capacity(4);
    reader.take(4).read_to_end(&mut head)?;
    Ok(sniff_zip(&head))
}

/// One entry as listed by a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    /// Entry name exactly as stored, `/` separated. Directory markers end in `/`.
    pub path: String,
    /// Declared uncompressed size.
    pub size: u64,
    pub compressed_size: u64,
    pub is_directory: bool,
    /// The entry's content starts with a zip signature.
    pub is_nested_container: bool,
}

pub trait Container {
    /// Display name: the file name for a root, the entry path for a nested one.
    fn name(&self) -> &str;

    /// Entries in central directory order.
    fn entries(&self) -> &[ContainerEntry];

    fn entry(&self, path: &str) -> Result<&ContainerEntry> {
        self.entries()
            .iter()
            .find(|e| e.path == path)
            .ok_or_else(|| Error::EntryNotFound(path.to_string()))
    }

    /// Full uncompressed content of an entry.
    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>>;

    fn is_nested_container(&self, path: &str) -> Result<bool> {
        Ok(self.entry(path)?.is_nested_container)
    }
}

/// Container backed by a zip central directory.
pub struct ZipContainer<R: Read + Seek> {
    name: String,
    archive: ZipArchive<R>,
    entries: Vec<ContainerEntry>,
    index: HashMap<String, usize>,
}

impl<R: Read + Seek> ZipContainer<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Result<Self> {
        let name = name.into();
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());
        let mut index = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let (path, size, compressed_size, is_directory) = {
                let file = archive.by_index_raw(i)?;
                (
                    file.name().to_string(),
                    file.size(),
                    file.compressed_size(),
                    file.is_dir(),
                )
            };

            let is_nested_container = if is_directory || size < 4 {
                false
            } else {
                match archive.by_index(i) {
                    Ok(file) => match sniff_reader(file) {
                        Ok(nested) => nested,
                        Err(err) => {
                            log::trace!("{name}: cannot sniff {path}: {err}");
                            false
                        }
                    },
                    Err(err) => {
                        log::trace!("{name}: cannot sniff {path}: {err}");
                        false
                    }
                }
            };

            // Duplicate names: the first occurrence wins, as with most readers.
            index.entry(path.clone()).or_insert(i);
            entries.push(ContainerEntry {
                path,
                size,
                compressed_size,
                is_directory,
                is_nested_container,
            });
        }

        log::trace!("{name}: listed {} entries", entries.len());
        Ok(ZipContainer {
            name,
            archive,
            entries,
            index,
        })
    }
}

impl<R: Read + Seek> Container for ZipContainer<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> &[ContainerEntry] {
        &self.entries
    }

    fn entry(&self, path: &str) -> Result<&ContainerEntry> {
        self.index
            .get(path)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Error::EntryNotFound(path.to_string()))
    }

    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>> {
        let i = *self
            .index
            .get(path)
            .ok_or_else(|| Error::EntryNotFound(path.to_string()))?;
        let read_error = |source: std::io::Error| Error::Read {
            path: path.to_string(),
            source,
        };

        let mut file = self.archive.by_index(i).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => Error::EntryNotFound(path.to_string()),
            other => read_error(other.into()),
        })?;
        // The declared size is only a hint; never trust it for a large allocation.
        let mut buffer = Vec::with_capacity(file.size().min(1 << 20) as usize);
        file.read_to_end(&mut buffer).map_err(read_error)?;
        Ok(buffer)
    }
}

/// A plain file seen as a container with exactly one entry named after it.
pub struct FileContainer {
    name: String,
    path: PathBuf,
    file: File,
    entries: Vec<ContainerEntry>,
}

impl FileContainer {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        let is_nested_container = sniff_reader(&mut file)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Ok(FileContainer {
            entries: vec![ContainerEntry {
                path: name.clone(),
                size: len,
                compressed_size: len,
                is_directory: false,
                is_nested_container,
            }],
            name,
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Container for FileContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> &[ContainerEntry] {
        &self.entries
    }

    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>> {
        if path != self.name {
            return Err(Error::EntryNotFound(path.to_string()));
        }
        let read_error = |source: std::io::Error| Error::Read {
            path: path.to_string(),
            source,
        };
        self.file.seek(SeekFrom::Start(0)).map_err(read_error)?;
        let mut buffer = Vec::new();
        self.file.read_to_end(&mut buffer).map_err(read_error)?;
        Ok(buffer)
    }
}
