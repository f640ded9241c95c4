//! Configuration Transformer
//!
//! Walks a staged tree and, in every directory, merges the environment
//! overlay of each base file onto that base in place.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::services::xml_transform::{XmlDocument, XmlTransformation};
use crate::domain::services::ConfigFileSet;
use crate::error::{StagehandError, StagehandResult};

/// Applies environment overlays for one file extension.
#[derive(Debug, Clone)]
pub struct ConfigTransformer {
    extension: String,
}

impl ConfigTransformer {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Transform every base file under `root` for `environment`.
    ///
    /// Returns the base files that were rewritten.
    pub fn transform_tree(&self, root: &Path, environment: &str) -> StagehandResult<Vec<PathBuf>> {
        let mut transformed = Vec::new();
        self.transform_dir(root, environment, &mut transformed)?;
        Ok(transformed)
    }

    fn transform_dir(
        &self,
        dir: &Path,
        environment: &str,
        transformed: &mut Vec<PathBuf>,
    ) -> StagehandResult<()> {
        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                subdirs.push(entry.path());
            } else if let Some(name) = entry.file_name().to_str() {
                files.push(name.to_string());
            }
        }

        let set = ConfigFileSet::new(files, &self.extension);
        for (base, overlay) in set.transforms_for(environment) {
            let base_path = dir.join(base);
            transform_file(&base_path, &dir.join(overlay))?;
            tracing::debug!(file = %base_path.display(), overlay, "applied configuration overlay");
            transformed.push(base_path);
        }

        subdirs.sort();
        for subdir in subdirs {
            self.transform_dir(&subdir, environment, transformed)?;
        }
        Ok(())
    }
}

/// Merge `overlay` onto `base`, rewriting `base` atomically.
pub fn transform_file(base: &Path, overlay: &Path) -> StagehandResult<()> {
    let (mut document, bom) = read_document(base)?;
    let transformation = XmlTransformation::new(read_document(overlay)?.0);

    let report = transformation
        .apply(&mut document)
        .map_err(|e| StagehandError::TransformFailed {
            file: base.to_path_buf(),
            message: format!("{e} (overlay {})", overlay.display()),
        })?;

    for warning in &report.warnings {
        tracing::warn!(file = %base.display(), "{warning}");
    }

    let mut output = String::new();
    if bom {
        output.push(BOM);
    }
    output.push_str(&document.to_xml());
    write_atomic(base, output.as_bytes())
}

const BOM: char = '\u{feff}';

/// Parse a file, reporting whether it started with a byte order mark.
fn read_document(path: &Path) -> StagehandResult<(XmlDocument, bool)> {
    let source = std::fs::read_to_string(path)?;
    let (source, bom) = match source.strip_prefix(BOM) {
        Some(rest) => (rest, true),
        None => (source.as_str(), false),
    };
    let document = XmlDocument::parse(source).map_err(|e| StagehandError::InvalidXml {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok((document, bom))
}

fn write_atomic(path: &Path, content: &[u8]) -> StagehandResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
