#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const FADE_XML: &[u8] = b"<fade>";
pub const CLASSES1_DEX: &[u8] = b"dx";
pub const MANIFEST_XML: &[u8] = b"<manifest/>";

/// Builds a zip in memory. Names ending in `/` become directory markers.
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    zip_bytes_with(files, CompressionMethod::Deflated)
}

pub fn zip_bytes_with(files: &[(&str, &[u8])], method: CompressionMethod) -> Vec<u8> {
    let options = SimpleFileOptions::default().compression_method(method);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// The nested archive of the sample application package.
pub fn instant_run_zip() -> Vec<u8> {
    zip_bytes(&[("instant-run/classes1.dex", CLASSES1_DEX)])
}

/// A small application package: a resource, an embedded zip and a manifest.
pub fn sample_apk(dir: &Path) -> PathBuf {
    let nested = instant_run_zip();
    let bytes = zip_bytes(&[
        ("res/anim/fade.xml", FADE_XML),
        ("instant-run.zip", nested.as_slice()),
        ("AndroidManifest.xml", MANIFEST_XML),
    ]);
    write_file(dir, "test.apk", &bytes)
}
