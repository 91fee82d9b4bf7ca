//! Base product link
//!
//! `<root>/etc/products.d/baseproduct` points at the descriptor shipped by
//! the base product's reference package. It is refreshed after every
//! successful commit so it survives product upgrades.

use std::fs;
use std::io;
use std::path::Path;

use pkgbridge_errors::OpsError;
use regex::Regex;
use tracing::debug;

const PRODUCT_FILE_PATTERN: &str = r"^/etc/products\.d/(.*\.prod)$";

/// File name of the first product descriptor in `files`.
///
/// # Errors
///
/// Returns an error if the descriptor pattern fails to compile.
pub fn product_file(files: &[String]) -> Result<Option<String>, OpsError> {
    let re = Regex::new(PRODUCT_FILE_PATTERN).map_err(|e| OpsError::ProductLink {
        path: PRODUCT_FILE_PATTERN.to_string(),
        message: e.to_string(),
    })?;
    Ok(files
        .iter()
        .find_map(|file| re.captures(file)?.get(1))
        .map(|name| name.as_str().to_string()))
}

/// Point `link` at `target`, replacing whatever is there.
///
/// # Errors
///
/// Returns [`OpsError::ProductLink`] when the old entry cannot be removed or
/// the link cannot be created.
pub fn refresh_link(link: &Path, target: &str) -> Result<(), OpsError> {
    let failure = |err: &io::Error| OpsError::ProductLink {
        path: link.display().to_string(),
        message: err.to_string(),
    };

    match fs::symlink_metadata(link) {
        Ok(_) => fs::remove_file(link).map_err(|e| failure(&e))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(link = %link.display(), "link does not exist yet");
        }
        Err(e) => return Err(failure(&e)),
    }

    create_symlink(target, link).map_err(|e| failure(&e))
}

#[cfg(unix)]
fn create_symlink(target: &str, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn create_symlink(_target: &str, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
