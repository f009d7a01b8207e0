//! Builds a [`ProjectModel`] from raw file contents.
//!
//! Discovery and decoding of files is the caller's job; the loader receives
//! `(relative path, text)` pairs. Every file is attempted, failures are
//! recorded per file, and the batch always yields a model.

use serde_json::Value;

use crate::error::DocumentParseError;

use super::canonical::filter_commented_keys;
use super::{AnalysisUnit, FileType, ProjectModel, ScriptDocument, TypedDocument};

/// A raw input file with its detected type.
#[derive(Debug, Clone, Copy)]
pub struct SourceDocument<'a> {
    pub path: &'a str,
    pub text: &'a str,
    pub file_type: Option<FileType>,
}

impl<'a> SourceDocument<'a> {
    pub fn new(path: &'a str, text: &'a str) -> Self {
        Self {
            path,
            text,
            file_type: detect_file_type(path),
        }
    }
}

/// Detect the document type from a file name.
///
/// `home.page` and `home.page.json` are both pages; `.js` files are scripts.
pub fn detect_file_type(path: &str) -> Option<FileType> {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path).to_lowercase();
    let stem = name.strip_suffix(".json").unwrap_or(&name);
    let ext = stem.rsplit_once('.').map(|(_, ext)| ext)?;

    match ext {
        "page" => Some(FileType::Page),
        "fragment" => Some(FileType::Fragment),
        "dataprovider" | "provider" => Some(FileType::DataProvider),
        "site" => Some(FileType::Site),
        "script" => Some(FileType::Script),
        "js" if !name.ends_with(".json") => Some(FileType::Script),
        _ => None,
    }
}

/// Parses a batch of files into one project model.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader {
    unit: AnalysisUnit,
}

impl Loader {
    /// `unit` says whether the batch is a whole application (archive or
    /// directory) or loose files.
    pub fn new(unit: AnalysisUnit) -> Self {
        Self { unit }
    }

    /// Load every file; files are attempted in iteration order.
    pub fn load<I, P, T>(&self, files: I) -> ProjectModel
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
        T: AsRef<str>,
    {
        let mut model = ProjectModel::new(self.unit);

        for (path, text) in files {
            let source = SourceDocument::new(path.as_ref(), text.as_ref());
            model.completeness_mut().record_file(source.path);

            match self.load_one(&mut model, &source) {
                Ok(file_type) => {
                    log::debug!("loaded {} as {}", source.path, file_type);
                    model.completeness_mut().mark_present(file_type);
                }
                Err(message) => {
                    log::warn!("skipping {}: {}", source.path, message);
                    model.record_parse_error(DocumentParseError::new(source.path, message));
                }
            }
        }

        log::info!(
            "loaded {} of {} files ({} parse errors)",
            model.completeness().files_analyzed().len() - model.parse_errors().len(),
            model.completeness().files_analyzed().len(),
            model.parse_errors().len()
        );

        model
    }

    fn load_one(&self, model: &mut ProjectModel, source: &SourceDocument) -> Result<FileType, String> {
        let file_type = source
            .file_type
            .ok_or_else(|| "unsupported file type".to_string())?;

        if file_type == FileType::Script {
            let script = ScriptDocument::parse(source.path, source.text).map_err(|e| e.to_string())?;
            model.insert_script(script);
            return Ok(file_type);
        }

        let tree: Value = serde_json::from_str(source.text)
            .map_err(|e| format!("invalid JSON: {}", e))?;
        let tree = filter_commented_keys(tree);
        let doc = TypedDocument::from_tree(file_type, source.path, source.text, tree)?;
        model.insert_document(doc)?;

        Ok(file_type)
    }
}
