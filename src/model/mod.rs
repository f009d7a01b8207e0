//! In-memory project model built from low-code application documents.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ (path, text)    │────▶│ Loader       │────▶│ ProjectModel  │
//! └─────────────────┘     │ (JSON, JS)   │     │ (pages, site, │
//!                         └──────┬───────┘     │  scripts, ...)│
//!                                │             └───────┬───────┘
//!                         ┌──────▼───────┐             │
//!                         │ canonical +  │     ┌───────▼───────┐
//!                         │ template     │     │ Completeness  │
//!                         └──────────────┘     │ Tracker       │
//!                                              └───────────────┘
//! ```

pub mod canonical;
mod documents;
mod loader;
mod project;
mod script;

pub use canonical::{filter_commented_keys, filter_commented_keys_in_place, is_commented_key};
pub use documents::{
    walk_objects, Component, DataProvider, DataProviderDocument, FragmentDocument, JsonDocument,
    NavigationEntry, PageDocument, SiteDocument, TypedDocument,
};
pub use loader::{detect_file_type, Loader, SourceDocument};
pub use project::ProjectModel;
pub use script::{ScriptDocument, TemplateLiteral};

pub(crate) use documents::json_kind;

use serde::{Deserialize, Serialize};

/// The five canonical source-file type tags.
///
/// Variants are declared in tag order so sorted collections render
/// alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    DataProvider,
    Fragment,
    Page,
    Script,
    Site,
}

impl FileType {
    /// Every tag, alphabetically.
    pub const ALL: [FileType; 5] = [
        FileType::DataProvider,
        FileType::Fragment,
        FileType::Page,
        FileType::Script,
        FileType::Site,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::DataProvider => "DATA_PROVIDER",
            FileType::Fragment => "FRAGMENT",
            FileType::Page => "PAGE",
            FileType::Script => "SCRIPT",
            FileType::Site => "SITE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DATA_PROVIDER" => Some(FileType::DataProvider),
            "FRAGMENT" => Some(FileType::Fragment),
            "PAGE" => Some(FileType::Page),
            "SCRIPT" => Some(FileType::Script),
            "SITE" => Some(FileType::Site),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether one load call represents a whole application or loose files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisUnit {
    /// An archive or directory supplied as one unit.
    FullApp,
    #[default]
    IndividualFiles,
}

impl AnalysisUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisUnit::FullApp => "full_app",
            AnalysisUnit::IndividualFiles => "individual_files",
        }
    }
}

impl std::fmt::Display for AnalysisUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
