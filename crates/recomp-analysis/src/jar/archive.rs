//! Read-only entry view over a jar file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use recomp_core::errors::AnalysisError;
use recomp_core::ContentHash;

const CLASS_SUFFIX: &str = ".class";
/// Multi-release and service metadata; classes under it shadow the main tree.
const META_INF: &str = "META-INF/";

/// A jar on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarArchive {
    path: PathBuf,
}

impl JarArchive {
    /// A jar at `path`; nothing is read until asked.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the jar.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for messages, or the full path when there is none.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Hash of the whole jar file.
    pub fn content_hash(&self) -> Result<ContentHash, AnalysisError> {
        Ok(ContentHash::of_file(&self.path)?)
    }

    /// Call `visitor` with the name and bytes of every `.class` entry outside
    /// `META-INF/`. A failure reading one entry is handed to the visitor and
    /// does not stop the walk; a failure opening the archive is returned.
    pub fn visit_class_entries(
        &self,
        mut visitor: impl FnMut(&str, Result<&[u8], AnalysisError>),
    ) -> Result<(), AnalysisError> {
        let file = File::open(&self.path)?;
        let mut archive =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|e| self.archive_error(e))?;

        let mut buf = Vec::new();
        for index in 0..archive.len() {
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    visitor(&format!("#{index}"), Err(self.archive_error(e)));
                    continue;
                }
            };
            if entry.is_dir() || !entry.name().ends_with(CLASS_SUFFIX) || entry.name().starts_with(META_INF) {
                continue;
            }
            let name = entry.name().to_string();
            buf.clear();
            match entry.read_to_end(&mut buf) {
                Ok(_) => visitor(&name, Ok(&buf)),
                Err(e) => visitor(&name, Err(self.archive_error(e))),
            }
        }
        Ok(())
    }

    fn archive_error(&self, e: impl std::fmt::Display) -> AnalysisError {
        AnalysisError::Archive {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}
