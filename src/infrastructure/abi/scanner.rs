//! ABI file scanner - discovers interface files under configured directories

use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};
use walkdir::WalkDir;

use super::loader::load_file;
use crate::domain::abi::Catalog;

/// Build output directories (Foundry `out/`, Hardhat `artifacts/`)
const ARTIFACT_DIRS: &[&str] = &["out", "artifacts"];

/// Files larger than this are skipped
const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// ABI file scanner
pub struct AbiScanner;

impl AbiScanner {
    /// Scan a single root for ABI JSON files under build output directories
    pub fn scan(root: impl AsRef<Path>) -> Catalog {
        let started = Instant::now();
        let root = root.as_ref();
        let mut catalog = Catalog::new();
        let mut scanned_files = 0;

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    catalog.errors.push(err.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if !Self::path_contains_any(path, ARTIFACT_DIRS) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(meta) => meta,
                Err(err) => {
                    catalog.errors.push(format!("{}: {}", path.display(), err));
                    continue;
                }
            };
            if metadata.len() > MAX_FILE_BYTES {
                debug!(path = %path.display(), "skipping oversized file");
                continue;
            }

            scanned_files += 1;

            match load_file(path) {
                // Artifacts without functions add nothing useful
                Ok(interface) if interface.functions.is_empty() => {}
                Ok(interface) => catalog.insert(interface),
                Err(err) => catalog.errors.push(format!("{:#}", err)),
            }
        }

        info!(
            root = %root.display(),
            files = scanned_files,
            interfaces = catalog.len(),
            errors = catalog.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "abi scan finished"
        );

        catalog
    }

    /// Scan multiple roots; later roots win on name clashes
    pub fn scan_roots(roots: &[PathBuf]) -> Catalog {
        let mut catalog = Catalog::new();
        for root in roots {
            catalog.merge(Self::scan(root));
        }
        catalog
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| matches!(name, ".git" | "target" | "node_modules"))
            .unwrap_or(false)
    }

    /// Check if any path component equals one of `names`
    fn path_contains_any(path: &Path, names: &[&str]) -> bool {
        path.components().any(|component| match component {
            Component::Normal(value) => value
                .to_str()
                .map(|value| names.contains(&value))
                .unwrap_or(false),
            _ => false,
        })
    }
}
