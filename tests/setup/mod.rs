#![allow(dead_code)]

use assert_cmd::Command;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Cursor, Write};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const FOO_MIME_TYPE: &str = "application/x-foo";
pub const BAR_MIME_TYPE: &str = "application/x-bar";
pub const UNKNOWN_MIME_TYPE: &str = "application/x-unknown";

pub fn setup_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn get_bin() -> Command {
    let mut cmd = Command::cargo_bin("plugin-finder").expect("Failed to find binary");

    // Nothing listens here, so tests never reach a real plugin finder.
    cmd.env("FINDER_BASE_URL", "http://127.0.0.1:9/plugins/")
        .env("PLUGINS_FOLDER_PATH", "plugins")
        .env("APP_ID", "test-app")
        .env("APP_VERSION", "1.0")
        .env("CLIENT_OS", "linux")
        .env("CHROME_LOCALE", "en-US")
        .env_remove("RUST_LOG");

    cmd
}

pub fn get_bin_in(dir: &TempDir) -> Command {
    let mut cmd = get_bin();
    cmd.current_dir(dir.path());
    cmd
}

/// Writes a zip package with the given files and returns its `sha256:` hash.
pub fn create_package(dir: &TempDir, name: &str, files: &[(&str, &str)]) -> String {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (path, content) in files {
        writer
            .start_file(*path, options)
            .expect("Failed to start zip entry");
        writer
            .write_all(content.as_bytes())
            .expect("Failed to write zip entry");
    }
    let package = writer
        .finish()
        .expect("Failed to finish zip package")
        .into_inner();

    fs::write(dir.path().join(name), &package).expect("Failed to write package");
    format!("sha256:{:x}", Sha256::digest(&package))
}

pub fn create_catalog(dir: &TempDir, content: &str) {
    fs::write(dir.path().join("catalog.json"), content).expect("Failed to write catalog.json");
}

pub fn foo_catalog(hash: &str) -> String {
    format!(
        r#"{{
  "{FOO_MIME_TYPE}": {{
    "pid": "foo",
    "name": "Foo Player",
    "version": "2.1",
    "XPILocation": "foo.zip",
    "XPIHash": "{hash}",
    "manualInstallationURL": "https://example.com/foo/manual",
    "needsRestart": "true"
  }}
}}"#
    )
}

pub fn licensed_catalog(hash: &str) -> String {
    format!(
        r#"{{
  "{FOO_MIME_TYPE}": {{
    "pid": "foo",
    "name": "Foo Player",
    "XPILocation": "foo.zip",
    "XPIHash": "{hash}"
  }},
  "{BAR_MIME_TYPE}": {{
    "pid": 42,
    "name": "Bar Viewer",
    "XPILocation": "foo.zip",
    "XPIHash": "{hash}",
    "licenseURL": "https://example.com/bar/license"
  }}
}}"#
    )
}
