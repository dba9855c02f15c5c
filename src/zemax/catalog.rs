//! Glass catalog store backed by `.agf` files
//!
//! OpticStudio ships its glass catalogs as AGF files under `Glasscat` in
//! the installation root. Each material is an `NM <name> ...` record; that
//! is the only record type the importer needs.

use crate::error::{LensError, LensResult};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct GlassCatalogStore {
    dir: Option<PathBuf>,
}

impl GlassCatalogStore {
    /// A store with no catalog directory; every lookup fails.
    pub fn empty() -> Self {
        Self { dir: None }
    }

    pub fn from_install_root(root: &Path) -> Self {
        Self::with_dir(root.join("Glasscat"))
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Catalog names available on disk (file stems of `*.agf`), sorted.
    pub fn available_catalogs(&self) -> Vec<String> {
        let Some(dir) = &self.dir else {
            return Vec::new();
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };

        let mut catalogs: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                let ext = path.extension()?.to_str()?;
                if ext.eq_ignore_ascii_case("agf") {
                    Some(path.file_stem()?.to_str()?.to_string())
                } else {
                    None
                }
            })
            .collect();
        catalogs.sort();
        catalogs
    }

    /// Material names listed in the named catalog.
    pub fn materials_in_catalog(&self, catalog: &str) -> LensResult<Vec<String>> {
        let path = self.catalog_path(catalog).ok_or_else(|| {
            LensError::Catalog(format!("glass catalog {} not found in AGF files", catalog))
        })?;
        let content = fs::read_to_string(&path).map_err(|e| {
            LensError::Catalog(format!("failed to read {}: {}", path.display(), e))
        })?;

        Ok(content
            .lines()
            .filter_map(|line| {
                let mut tokens = line.split_whitespace();
                match tokens.next() {
                    Some("NM") => tokens.next().map(|name| name.to_string()),
                    _ => None,
                }
            })
            .collect())
    }

    pub fn has_material(&self, catalog: &str, material: &str) -> LensResult<bool> {
        Ok(self
            .materials_in_catalog(catalog)?
            .iter()
            .any(|m| m == material))
    }

    /// Resolve `<dir>/<catalog>.agf` case-insensitively on the extension
    /// and the catalog name.
    fn catalog_path(&self, catalog: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let entries = fs::read_dir(dir).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if ext.eq_ignore_ascii_case("agf") && stem.eq_ignore_ascii_case(catalog) {
                return Some(path);
            }
        }
        None
    }
}
