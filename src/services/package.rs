use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256, Sha512};
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use url::Url;

/// Fetches, verifies and unpacks plugin packages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageService: Send + Sync {
    /// Reads a package from an `http(s)` URL, a `file` URL or a local path.
    async fn fetch(&self, location: &str) -> Result<Bytes>;

    /// Checks the package against a `<algorithm>:<hex digest>` hash. An empty
    /// hash skips the check.
    fn verify(&self, package: &[u8], hash: &str) -> Result<()>;

    /// Unpacks a zip package into `destination`, replacing what was there.
    async fn unpack(&self, package: Bytes, destination: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Default)]
pub struct DefaultPackageService {
    client: reqwest::Client,
}

impl DefaultPackageService {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Bytes> {
        match self.client.get(url.as_str()).send().await {
            Ok(response) => {
                info!("[GET] {} [{}]", url, response.status());
                let response = response
                    .error_for_status()
                    .map_err(|e| anyhow!("Failed to fetch package: {}", e))?;
                Ok(response.bytes().await?)
            }
            Err(e) => {
                match e.status() {
                    Some(status) => error!("[GET] {} [{}] - Error: {}", url, status, e),
                    None => error!("[GET] {} - Error: {}", url, e),
                }
                Err(anyhow!("Failed to fetch package: {}", e))
            }
        }
    }

    fn digest_hex(algorithm: &str, package: &[u8]) -> Result<String> {
        match algorithm.to_ascii_lowercase().as_str() {
            "sha256" => Ok(format!("{:x}", Sha256::digest(package))),
            "sha512" => Ok(format!("{:x}", Sha512::digest(package))),
            other => bail!("Unsupported package hash algorithm: {}", other),
        }
    }

    fn unpack_archive(package: Bytes, destination: &Path) -> Result<()> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(package)).context("Package is not a zip archive")?;

        if destination.exists() {
            debug!("Removing existing installation: {}", destination.display());
            fs::remove_dir_all(destination)?;
        }
        fs::create_dir_all(destination)?;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let outpath = match file.enclosed_name() {
                Some(path) => destination.join(path),
                None => continue,
            };

            if file.is_dir() {
                fs::create_dir_all(&outpath)?;
                continue;
            }

            if let Some(parent) = outpath.parent()
                && !parent.exists()
            {
                fs::create_dir_all(parent)?;
            }

            let mut outfile = fs::File::create(&outpath)
                .with_context(|| format!("Failed to create {}", outpath.display()))?;
            io::copy(&mut file, &mut outfile)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = file.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PackageService for DefaultPackageService {
    async fn fetch(&self, location: &str) -> Result<Bytes> {
        let path = match Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                return self.fetch_remote(&url).await;
            }
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| anyhow!("Invalid file URL: {}", location))?,
            Ok(url) if url.scheme().len() > 1 => {
                bail!("Unsupported package location scheme: {}", url.scheme())
            }
            // Relative paths and Windows drive letters are plain paths.
            _ => PathBuf::from(location),
        };

        debug!("Reading package from {}", path.display());
        let content = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read package: {}", path.display()))?;
        Ok(Bytes::from(content))
    }

    fn verify(&self, package: &[u8], hash: &str) -> Result<()> {
        let hash = hash.trim();
        if hash.is_empty() {
            return Ok(());
        }

        let (algorithm, expected) = hash
            .split_once(':')
            .ok_or_else(|| anyhow!("Malformed package hash: {}", hash))?;
        let actual = Self::digest_hex(algorithm, package)?;

        if !actual.eq_ignore_ascii_case(expected.trim()) {
            bail!(
                "Package hash mismatch: expected {}, got {}:{}",
                hash,
                algorithm,
                actual
            );
        }
        Ok(())
    }

    async fn unpack(&self, package: Bytes, destination: &Path) -> Result<PathBuf> {
        let destination = destination.to_path_buf();
        let target = destination.clone();
        tokio::task::spawn_blocking(move || Self::unpack_archive(package, &target)).await??;
        Ok(destination)
    }
}
