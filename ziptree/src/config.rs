use crate::error::{Error, Result};

/// What to do when a nested container can't be mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedFailurePolicy {
    /// Keep the entry as a plain leaf and emit a warning.
    RetainAsLeaf,
    /// Fail the whole build.
    Abort,
}

impl Default for NestedFailurePolicy {
    fn default() -> Self {
        NestedFailurePolicy::RetainAsLeaf
    }
}

/// Parameters of the download size estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadSizeOptions {
    /// Deflate level (0-9) used to re-encode every entry.
    #[serde(rename = "compressionLevel")]
    pub compression_level: u32,
    /// Bytes added per entry for the local header and its bookkeeping.
    #[serde(rename = "entryOverhead")]
    pub entry_overhead: u64,
}

pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;
/// Fixed part of a zip local file header.
pub const DEFAULT_ENTRY_OVERHEAD: u64 = 30;
pub const DEFAULT_MAX_MOUNT_DEPTH: usize = 8;

impl Default for DownloadSizeOptions {
    fn default() -> Self {
        DownloadSizeOptions {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            entry_overhead: DEFAULT_ENTRY_OVERHEAD,
        }
    }
}

/// TreeOptions controls tree construction and size estimation.
///
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TreeOptions {
    #[serde(rename = "maxMountDepth")]
    pub max_mount_depth: usize,
    #[serde(rename = "nestedFailure")]
    pub nested_failure: NestedFailurePolicy,
    pub download: DownloadSizeOptions,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            max_mount_depth: DEFAULT_MAX_MOUNT_DEPTH,
            nested_failure: NestedFailurePolicy::default(),
            download: DownloadSizeOptions::default(),
        }
    }
}

impl TreeOptions {
    /// Load TreeOptions from a JSON reader
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let options: TreeOptions = serde_json::from_reader(reader)?;
        options.validate()?;
        Ok(options)
    }

    /// Load TreeOptions from a file path
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn validate(&self) -> Result<()> {
        if self.download.compression_level > 9 {
            return Err(Error::InvalidConfig(format!(
                "compressionLevel must be between 0 and 9, got {}",
                self.download.compression_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let options = TreeOptions::from_reader("{}".as_bytes()).unwrap();
        assert_eq!(options, TreeOptions::default());
        assert_eq!(options.max_mount_depth, 8);
        assert_eq!(options.download.compression_level, 9);
        assert_eq!(options.download.entry_overhead, 30);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{"nestedFailure": "abort", "download": {"entryOverhead": 2}}"#;
        let options = TreeOptions::from_reader(json.as_bytes()).unwrap();
        assert_eq!(options.nested_failure, NestedFailurePolicy::Abort);
        assert_eq!(options.download.entry_overhead, 2);
        assert_eq!(options.download.compression_level, 9);
    }

    #[test]
    fn test_rejects_bad_level() {
        let json = r#"{"download": {"compressionLevel": 12}}"#;
        let err = TreeOptions::from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let json = r#"{"nestedFailure": "explode"}"#;
        assert!(matches!(
            TreeOptions::from_reader(json.as_bytes()),
            Err(Error::JsonError(_))
        ));
    }
}
