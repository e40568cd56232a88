//! Size calculators
//!
//! Two independent measures are computed for every file:
//!
//! - raw size: the uncompressed length declared by the container;
//! - download size: an estimate of what the entry costs on the wire. The
//!   content is re-encoded with raw deflate at a fixed reference level, and a
//!   constant per-entry overhead stands in for the local header, file name and
//!   timestamps that travel with it.
//!
//! Calculators are stateless, so they can be called in any order, or from
//! several threads over distinct containers.

use std::fmt;
use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::config::DownloadSizeOptions;
use crate::container::Container;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeMetric {
    Raw,
    Download,
}

impl fmt::Display for SizeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeMetric::Raw => f.write_str("raw"),
            SizeMetric::Download => f.write_str("download"),
        }
    }
}

pub trait SizeCalculator {
    /// The entry field this calculator fills in.
    fn metric(&self) -> SizeMetric;

    /// Size of the entry stored as `path` in `container`.
    fn calculate(&self, container: &mut dyn Container, path: &str) -> Result<u64>;
}

/// Declared uncompressed size. Never reads entry content.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawSizeCalculator;

impl SizeCalculator for RawSizeCalculator {
    fn metric(&self) -> SizeMetric {
        SizeMetric::Raw
    }

    fn calculate(&self, container: &mut dyn Container, path: &str) -> Result<u64> {
        Ok(container.entry(path)?.size)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DownloadSizeCalculator {
    level: u32,
    entry_overhead: u64,
}

impl Default for DownloadSizeCalculator {
    fn default() -> Self {
        Self::new(DownloadSizeOptions::default())
    }
}

impl DownloadSizeCalculator {
    pub fn new(options: DownloadSizeOptions) -> Self {
        DownloadSizeCalculator {
            level: options.compression_level.min(9),
            entry_overhead: options.entry_overhead,
        }
    }

    /// Download size of a blob, independent of any container.
    pub fn size_of(&self, content: &[u8]) -> Result<u64> {
        Ok(deflated_len(content, self.level)?.saturating_add(self.entry_overhead))
    }
}

impl SizeCalculator for DownloadSizeCalculator {
    fn metric(&self) -> SizeMetric {
        SizeMetric::Download
    }

    fn calculate(&self, container: &mut dyn Container, path: &str) -> Result<u64> {
        let content = container.read_entry(path)?;
        self.size_of(&content).map_err(|e| match e {
            Error::IoError(source) => Error::Read {
                path: path.to_string(),
                source,
            },
            other => other,
        })
    }
}

/// Counts bytes instead of keeping them.
struct ByteCounter(u64);

impl Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0 += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Length of `content` once compressed with raw deflate at `level`.
pub fn deflated_len(content: &[u8], level: u32) -> Result<u64> {
    let mut encoder = DeflateEncoder::new(ByteCounter(0), Compression::new(level));
    encoder.write_all(content)?;
    Ok(encoder.finish()?.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ZipContainer;
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn container(files: &[(&str, &[u8])]) -> ZipContainer<Cursor<Vec<u8>>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();
        ZipContainer::new("test.zip", Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_deflated_len_matches_flate2() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(data).unwrap();
        let expected = encoder.finish().unwrap().len() as u64;
        assert_eq!(deflated_len(data, 9).unwrap(), expected);
        assert!(expected < data.len() as u64);
    }

    #[test]
    fn test_raw_size_is_declared_size() {
        let mut c = container(&[("res/anim/fade.xml", b"<fade>")]);
        assert_eq!(RawSizeCalculator.calculate(&mut c, "res/anim/fade.xml").unwrap(), 6);
        assert_eq!(RawSizeCalculator.metric(), SizeMetric::Raw);
    }

    #[test]
    fn test_download_size_adds_overhead() {
        let mut c = container(&[("fade.xml", b"<fade>"), ("empty", b"")]);
        let calc = DownloadSizeCalculator::default();

        let size = calc.calculate(&mut c, "fade.xml").unwrap();
        assert_eq!(size, deflated_len(b"<fade>", 9).unwrap() + 30);
        assert!(size > 6);

        // Even an empty entry costs its header.
        let empty = calc.calculate(&mut c, "empty").unwrap();
        assert!(empty >= 30);
    }

    #[test]
    fn test_download_overhead_is_configurable() {
        let calc = DownloadSizeCalculator::new(DownloadSizeOptions {
            compression_level: 6,
            entry_overhead: 0,
        });
        assert_eq!(calc.size_of(b"abc").unwrap(), deflated_len(b"abc", 6).unwrap());
    }

    #[test]
    fn test_missing_entry() {
        let mut c = container(&[("a", b"1")]);
        assert!(matches!(
            RawSizeCalculator.calculate(&mut c, "b"),
            Err(Error::EntryNotFound(_))
        ));
        assert!(matches!(
            DownloadSizeCalculator::default().calculate(&mut c, "b"),
            Err(Error::EntryNotFound(_))
        ));
    }
}
