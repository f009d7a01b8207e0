//! The aggregated project model rules run against.

use std::collections::BTreeMap;

use crate::completeness::CompletenessTracker;
use crate::error::DocumentParseError;

use super::{
    AnalysisUnit, DataProviderDocument, FileType, FragmentDocument, JsonDocument, PageDocument,
    ScriptDocument, SiteDocument, TypedDocument,
};

/// Every successfully loaded document of one analysis invocation.
///
/// Rules receive it by shared reference, possibly from several worker
/// threads at once; only the tracker's skipped-check registry is written
/// during a run.
#[derive(Debug, Default)]
pub struct ProjectModel {
    pages: BTreeMap<String, PageDocument>,
    fragments: BTreeMap<String, FragmentDocument>,
    scripts: BTreeMap<String, ScriptDocument>,
    data_provider: Option<DataProviderDocument>,
    site: Option<SiteDocument>,
    parse_errors: Vec<DocumentParseError>,
    completeness: CompletenessTracker,
}

impl ProjectModel {
    pub fn new(analysis_type: AnalysisUnit) -> Self {
        Self {
            completeness: CompletenessTracker::new(analysis_type),
            ..Self::default()
        }
    }

    /// Pages keyed by page id.
    pub fn pages(&self) -> &BTreeMap<String, PageDocument> {
        &self.pages
    }

    pub fn page(&self, id: &str) -> Option<&PageDocument> {
        self.pages.get(id)
    }

    /// Fragments keyed by fragment id.
    pub fn fragments(&self) -> &BTreeMap<String, FragmentDocument> {
        &self.fragments
    }

    pub fn fragment(&self, id: &str) -> Option<&FragmentDocument> {
        self.fragments.get(id)
    }

    /// Scripts keyed by path.
    pub fn scripts(&self) -> &BTreeMap<String, ScriptDocument> {
        &self.scripts
    }

    pub fn data_provider(&self) -> Option<&DataProviderDocument> {
        self.data_provider.as_ref()
    }

    pub fn site(&self) -> Option<&SiteDocument> {
        self.site.as_ref()
    }

    pub fn parse_errors(&self) -> &[DocumentParseError] {
        &self.parse_errors
    }

    pub fn completeness(&self) -> &CompletenessTracker {
        &self.completeness
    }

    /// Every JSON document, pages first, then fragments, data provider, site.
    pub fn json_documents(&self) -> Vec<&dyn JsonDocument> {
        let mut docs: Vec<&dyn JsonDocument> = Vec::new();
        docs.extend(self.pages.values().map(|d| d as &dyn JsonDocument));
        docs.extend(self.fragments.values().map(|d| d as &dyn JsonDocument));
        if let Some(d) = &self.data_provider {
            docs.push(d);
        }
        if let Some(d) = &self.site {
            docs.push(d);
        }
        docs
    }

    /// Number of loaded documents per type. Types with no documents are
    /// reported as zero.
    pub fn file_counts(&self) -> BTreeMap<FileType, usize> {
        BTreeMap::from([
            (FileType::DataProvider, usize::from(self.data_provider.is_some())),
            (FileType::Fragment, self.fragments.len()),
            (FileType::Page, self.pages.len()),
            (FileType::Script, self.scripts.len()),
            (FileType::Site, usize::from(self.site.is_some())),
        ])
    }

    pub(crate) fn completeness_mut(&mut self) -> &mut CompletenessTracker {
        &mut self.completeness
    }

    pub(crate) fn record_parse_error(&mut self, error: DocumentParseError) {
        self.parse_errors.push(error);
    }

    /// Store a validated document. Duplicate ids and second singleton
    /// documents are rejected; the first one loaded wins.
    pub(crate) fn insert_document(&mut self, doc: TypedDocument) -> Result<(), String> {
        match doc {
            TypedDocument::Page(page) => {
                if let Some(existing) = self.pages.get(&page.id) {
                    return Err(format!(
                        "duplicate page id {:?}, already defined in {}",
                        page.id,
                        existing.path()
                    ));
                }
                self.pages.insert(page.id.clone(), page);
            }
            TypedDocument::Fragment(fragment) => {
                if let Some(existing) = self.fragments.get(&fragment.id) {
                    return Err(format!(
                        "duplicate fragment id {:?}, already defined in {}",
                        fragment.id,
                        existing.path()
                    ));
                }
                self.fragments.insert(fragment.id.clone(), fragment);
            }
            TypedDocument::DataProvider(provider) => {
                if let Some(existing) = &self.data_provider {
                    return Err(format!(
                        "only one data provider document is allowed, already loaded {}",
                        existing.path()
                    ));
                }
                self.data_provider = Some(provider);
            }
            TypedDocument::Site(site) => {
                if let Some(existing) = &self.site {
                    return Err(format!(
                        "only one site document is allowed, already loaded {}",
                        existing.path()
                    ));
                }
                self.site = Some(site);
            }
        }
        Ok(())
    }

    pub(crate) fn insert_script(&mut self, script: ScriptDocument) {
        self.scripts.insert(script.path.clone(), script);
    }
}
