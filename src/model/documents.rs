//! Typed JSON documents: pages, fragments, data providers and site metadata.
//!
//! Each document keeps its canonical tree (commented-out keys already
//! removed) next to the header fields validated from that tree. The raw text
//! is kept only for line lookup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FileType;

/// Fields shared by every JSON document.
#[derive(Debug, Clone)]
struct Body {
    path: String,
    raw: String,
    tree: Value,
}

impl Body {
    fn line_of(&self, needle: &str) -> usize {
        line_of(&self.raw, needle)
    }

    fn line_of_entry(&self, key: &str, value: &str) -> usize {
        let key = quoted(key);
        let value = quoted(value);
        self.raw
            .lines()
            .position(|line| has_entry(line, &key, &value))
            .map(|idx| idx + 1)
            .unwrap_or_else(|| self.line_of(&value))
    }
}

/// Whether `line` holds `key: value`, both already quoted.
fn has_entry(line: &str, key: &str, value: &str) -> bool {
    line.match_indices(key).any(|(idx, _)| {
        line[idx + key.len()..]
            .trim_start()
            .strip_prefix(':')
            .map_or(false, |rest| rest.trim_start().starts_with(value))
    })
}

/// 1-based line of the first occurrence of `needle`, 0 if absent.
fn line_of(raw: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    raw.lines()
        .position(|line| line.contains(needle))
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value)
}

/// Visit every JSON object in a tree, depth-first, parents before children.
pub fn walk_objects<'a>(value: &'a Value, visit: &mut dyn FnMut(&'a Map<String, Value>)) {
    match value {
        Value::Object(map) => {
            visit(map);
            for child in map.values() {
                walk_objects(child, visit);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_objects(item, visit);
            }
        }
        _ => {}
    }
}

/// A borrowed view of one UI component object.
#[derive(Debug, Clone, Copy)]
pub struct Component<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> Component<'a> {
    /// Component type (e.g. "table", "button", "fragment").
    pub fn kind(&self) -> Option<&'a str> {
        self.get_str("type")
    }

    pub fn id(&self) -> Option<&'a str> {
        self.get_str("id")
    }

    /// Data provider id this component is bound to.
    pub fn data_source(&self) -> Option<&'a str> {
        self.get_str("dataSource")
    }

    /// Fragment id when this component embeds a fragment.
    pub fn fragment_ref(&self) -> Option<&'a str> {
        if self.kind() == Some("fragment") {
            self.get_str("ref")
        } else {
            None
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.object.get(key).and_then(Value::as_str)
    }

    fn children(&self) -> impl Iterator<Item = Component<'a>> {
        component_list(self.object.get("children"))
    }
}

fn component_list(value: Option<&Value>) -> impl Iterator<Item = Component<'_>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .map(|object| Component { object })
}

/// Flatten a component tree rooted at `tree["components"]`.
fn collect_components(tree: &Value) -> Vec<Component<'_>> {
    let mut out = Vec::new();
    let mut stack: Vec<Component<'_>> = component_list(tree.get("components")).collect();
    stack.reverse();
    while let Some(component) = stack.pop() {
        let mut children: Vec<_> = component.children().collect();
        children.reverse();
        stack.extend(children);
        out.push(component);
    }
    out
}

fn invalid_root(tree: &Value) -> Option<String> {
    if tree.is_object() {
        None
    } else {
        Some(format!("document root must be an object, found {}", json_kind(tree)))
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn validate<T: for<'de> Deserialize<'de>>(tree: &Value) -> Result<T, String> {
    if let Some(msg) = invalid_root(tree) {
        return Err(msg);
    }
    T::deserialize(tree).map_err(|e| format!("schema validation failed: {}", e))
}

#[derive(Deserialize)]
struct PageHeader {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    components: Vec<Value>,
}

/// A page document.
#[derive(Debug, Clone)]
pub struct PageDocument {
    pub id: String,
    pub title: Option<String>,
    body: Body,
}

impl PageDocument {
    /// Validate a canonical tree as a page.
    pub fn from_tree(path: &str, raw: &str, tree: Value) -> Result<Self, String> {
        let header: PageHeader = validate(&tree)?;
        Ok(Self {
            id: header.id,
            title: header.title,
            body: Body {
                path: path.to_string(),
                raw: raw.to_string(),
                tree,
            },
        })
    }

    /// All components, depth-first in document order.
    pub fn components(&self) -> Vec<Component<'_>> {
        collect_components(&self.body.tree)
    }

    /// Fragment ids embedded by this page, in document order.
    pub fn fragment_refs(&self) -> Vec<&str> {
        self.components()
            .iter()
            .filter_map(|c| c.fragment_ref())
            .collect()
    }
}

#[derive(Deserialize)]
struct FragmentHeader {
    id: String,
    #[serde(default)]
    #[allow(dead_code)]
    components: Vec<Value>,
}

/// A reusable fragment embedded by pages.
#[derive(Debug, Clone)]
pub struct FragmentDocument {
    pub id: String,
    body: Body,
}

impl FragmentDocument {
    pub fn from_tree(path: &str, raw: &str, tree: Value) -> Result<Self, String> {
        let header: FragmentHeader = validate(&tree)?;
        Ok(Self {
            id: header.id,
            body: Body {
                path: path.to_string(),
                raw: raw.to_string(),
                tree,
            },
        })
    }

    pub fn components(&self) -> Vec<Component<'_>> {
        collect_components(&self.body.tree)
    }
}

/// One endpoint declared in the data provider document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProvider {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Deserialize)]
struct DataProviderHeader {
    providers: Vec<DataProvider>,
}

/// The application's data provider document.
#[derive(Debug, Clone)]
pub struct DataProviderDocument {
    pub providers: Vec<DataProvider>,
    body: Body,
}

impl DataProviderDocument {
    pub fn from_tree(path: &str, raw: &str, tree: Value) -> Result<Self, String> {
        let header: DataProviderHeader = validate(&tree)?;
        Ok(Self {
            providers: header.providers,
            body: Body {
                path: path.to_string(),
                raw: raw.to_string(),
                tree,
            },
        })
    }

    pub fn provider(&self, id: &str) -> Option<&DataProvider> {
        self.providers.iter().find(|p| p.id == id)
    }
}

/// One site navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Deserialize)]
struct SiteHeader {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "homePage")]
    home_page: Option<String>,
    #[serde(default)]
    navigation: Vec<NavigationEntry>,
}

/// Site-level metadata: name, home page and navigation.
#[derive(Debug, Clone)]
pub struct SiteDocument {
    pub name: Option<String>,
    pub home_page: Option<String>,
    pub navigation: Vec<NavigationEntry>,
    body: Body,
}

impl SiteDocument {
    pub fn from_tree(path: &str, raw: &str, tree: Value) -> Result<Self, String> {
        let header: SiteHeader = validate(&tree)?;
        Ok(Self {
            name: header.name,
            home_page: header.home_page,
            navigation: header.navigation,
            body: Body {
                path: path.to_string(),
                raw: raw.to_string(),
                tree,
            },
        })
    }
}

/// Read access shared by the four JSON document types.
pub trait JsonDocument: Send + Sync {
    fn file_type(&self) -> FileType;
    fn path(&self) -> &str;
    fn tree(&self) -> &Value;
    /// 1-based line of the first line containing `"value"`, 0 if not found.
    fn line_of_string(&self, value: &str) -> usize;
    /// Line of the first `"key": "value"` pair, falling back to
    /// [`JsonDocument::line_of_string`] when no line holds the pair.
    fn line_of_entry(&self, key: &str, value: &str) -> usize;
}

macro_rules! impl_json_document {
    ($ty:ty, $file_type:expr) => {
        impl JsonDocument for $ty {
            fn file_type(&self) -> FileType {
                $file_type
            }

            fn path(&self) -> &str {
                &self.body.path
            }

            fn tree(&self) -> &Value {
                &self.body.tree
            }

            fn line_of_string(&self, value: &str) -> usize {
                self.body.line_of(&quoted(value))
            }

            fn line_of_entry(&self, key: &str, value: &str) -> usize {
                self.body.line_of_entry(key, value)
            }
        }
    };
}

impl_json_document!(PageDocument, FileType::Page);
impl_json_document!(FragmentDocument, FileType::Fragment);
impl_json_document!(DataProviderDocument, FileType::DataProvider);
impl_json_document!(SiteDocument, FileType::Site);

/// A validated JSON document of one of the four tree-shaped types.
#[derive(Debug, Clone)]
pub enum TypedDocument {
    Page(PageDocument),
    Fragment(FragmentDocument),
    DataProvider(DataProviderDocument),
    Site(SiteDocument),
}

impl TypedDocument {
    /// Validate a canonical tree as the given type.
    ///
    /// Scripts are not tree documents; passing `FileType::Script` is an error.
    pub fn from_tree(file_type: FileType, path: &str, raw: &str, tree: Value) -> Result<Self, String> {
        match file_type {
            FileType::Page => PageDocument::from_tree(path, raw, tree).map(TypedDocument::Page),
            FileType::Fragment => {
                FragmentDocument::from_tree(path, raw, tree).map(TypedDocument::Fragment)
            }
            FileType::DataProvider => {
                DataProviderDocument::from_tree(path, raw, tree).map(TypedDocument::DataProvider)
            }
            FileType::Site => SiteDocument::from_tree(path, raw, tree).map(TypedDocument::Site),
            FileType::Script => Err("scripts are not JSON documents".to_string()),
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            TypedDocument::Page(_) => FileType::Page,
            TypedDocument::Fragment(_) => FileType::Fragment,
            TypedDocument::DataProvider(_) => FileType::DataProvider,
            TypedDocument::Site(_) => FileType::Site,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TypedDocument::Page(d) => d.path(),
            TypedDocument::Fragment(d) => d.path(),
            TypedDocument::DataProvider(d) => d.path(),
            TypedDocument::Site(d) => d.path(),
        }
    }

    pub fn tree(&self) -> &Value {
        match self {
            TypedDocument::Page(d) => d.tree(),
            TypedDocument::Fragment(d) => d.tree(),
            TypedDocument::DataProvider(d) => d.tree(),
            TypedDocument::Site(d) => d.tree(),
        }
    }

    pub fn line_of_string(&self, value: &str) -> usize {
        match self {
            TypedDocument::Page(d) => d.line_of_string(value),
            TypedDocument::Fragment(d) => d.line_of_string(value),
            TypedDocument::DataProvider(d) => d.line_of_string(value),
            TypedDocument::Site(d) => d.line_of_string(value),
        }
    }

    pub fn line_of_entry(&self, key: &str, value: &str) -> usize {
        match self {
            TypedDocument::Page(d) => d.line_of_entry(key, value),
            TypedDocument::Fragment(d) => d.line_of_entry(key, value),
            TypedDocument::DataProvider(d) => d.line_of_entry(key, value),
            TypedDocument::Site(d) => d.line_of_entry(key, value),
        }
    }
}
