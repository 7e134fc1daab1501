//! Directory of map files addressed by short references such as `Level2`
//! or `Level2.csv`.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{MapError, Result};
use crate::map::MapModel;

const MAP_EXTENSION: &str = "csv";

#[derive(Debug, Clone)]
pub struct MapCatalog {
    root: PathBuf,
}

impl MapCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        MapCatalog { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a reference to an existing file inside the catalog.
    ///
    /// Only the final path component of the reference is used, so a
    /// reference can never escape the catalog directory.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let file_name = Path::new(reference.trim())
            .file_name()
            .ok_or_else(|| MapError::NotFound(reference.to_string()))?;

        let direct = self.root.join(file_name);
        if direct.is_file() {
            return Ok(direct);
        }
        let with_extension = direct.with_extension(MAP_EXTENSION);
        if direct.extension().is_none() && with_extension.is_file() {
            return Ok(with_extension);
        }
        Err(MapError::NotFound(reference.to_string()))
    }

    pub fn load(&self, reference: &str) -> Result<MapModel> {
        let path = self.resolve(reference)?;
        debug!("Resolved map {reference:?} to {}", path.display());
        MapModel::load(path)
    }

    /// Names (file stems) of all maps in the catalog, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == MAP_EXTENSION) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// The map following `current` in sorted order, wrapping around.
    /// Falls back to the first map when `current` is not in the catalog.
    pub fn next_after(&self, current: &str) -> Result<Option<String>> {
        let names = self.list()?;
        let next = match names.iter().position(|n| n == current) {
            Some(i) => names.get((i + 1) % names.len()).cloned(),
            None => names.first().cloned(),
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(names: &[&str]) -> (tempfile::TempDir, MapCatalog) {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), "4,4,10,0\nstart,5,5\n").unwrap();
        }
        let catalog = MapCatalog::new(dir.path());
        (dir, catalog)
    }

    #[test]
    fn test_resolve_with_and_without_extension() {
        let (_dir, catalog) = catalog_with(&["Level1.csv"]);
        assert!(catalog.resolve("Level1.csv").is_ok());
        assert!(catalog.resolve("Level1").is_ok());
        assert!(matches!(catalog.resolve("Level9"), Err(MapError::NotFound(_))));
    }

    #[test]
    fn test_reference_cannot_escape_root() {
        let (dir, catalog) = catalog_with(&[]);
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("Secret.csv"), "4,4,10,0\n").unwrap();
        let inner = MapCatalog::new(&nested);

        assert!(inner.resolve("../nested/Secret.csv").is_ok());
        assert!(catalog.resolve("nested/Secret.csv").is_err());
        assert!(catalog.resolve("..").is_err());
    }

    #[test]
    fn test_list_and_rotation() {
        let (_dir, catalog) = catalog_with(&["Level2.csv", "Level1.csv", "notes.txt"]);
        assert_eq!(catalog.list().unwrap(), vec!["Level1", "Level2"]);
        assert_eq!(catalog.next_after("Level1").unwrap().as_deref(), Some("Level2"));
        assert_eq!(catalog.next_after("Level2").unwrap().as_deref(), Some("Level1"));
        assert_eq!(catalog.next_after("custom").unwrap().as_deref(), Some("Level1"));
        assert_eq!(catalog.load("Level2").unwrap().name, "Level2");
    }
}
