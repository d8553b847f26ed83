//! Checklist loading from JSON or YAML
//!
//! Three source shapes are accepted:
//!
//! ```text
//! { "title": "...", "items": [ { "id": ..., "category": ..., ... } ] }
//! [ { "id": ..., "category": ..., ... } ]
//! { "<category>": [ { "id": ..., ... } ] }
//! ```
//!
//! Order is preserved in every shape, including category order in the
//! grouped form.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use thiserror::Error;

use super::requirement::{CategoryGroup, ChecklistRequirement};

/// Reference used when a record carries no `iso_clause`
pub const UNSPECIFIED_REFERENCE: &str = "N/A";

/// Checklist format errors. Any of these aborts loading.
#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("Failed to read checklist {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Checklist is not valid structured data: {0}")]
    Parse(String),

    #[error("Checklist entry {entry} is missing required field '{field}'")]
    MissingField { entry: usize, field: &'static str },

    #[error("Duplicate checklist id: {0}")]
    DuplicateId(String),
}

/// Source serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistFormat {
    Json,
    Yaml,
}

impl ChecklistFormat {
    /// Pick the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yml") | Some("yaml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    /// Guess the format from content: JSON documents open with a bracket
    pub fn sniff(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('{') | Some('[') => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// On-disk representation of one checklist entry
#[derive(Debug, Deserialize)]
struct RawRecord {
    id: Option<String>,
    category: Option<String>,
    #[serde(alias = "requirement_title", alias = "title")]
    requirement: Option<String>,
    description: Option<String>,
    #[serde(alias = "standard_reference", alias = "reference")]
    iso_clause: Option<String>,
}

/// Category-keyed records, in source order
#[derive(Debug)]
struct GroupedRecords(Vec<(String, Vec<RawRecord>)>);

impl<'de> Deserialize<'de> for GroupedRecords {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = GroupedRecords;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of category to a list of requirements")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut groups = Vec::new();
                while let Some((category, records)) = map.next_entry::<String, Vec<RawRecord>>()? {
                    groups.push((category, records));
                }
                Ok(GroupedRecords(groups))
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChecklistSource {
    Document {
        #[serde(default)]
        title: Option<String>,
        items: Vec<RawRecord>,
    },
    Flat(Vec<RawRecord>),
    Grouped(GroupedRecords),
}

/// An ordered, validated, read-only set of requirements
#[derive(Debug, Clone, Default)]
pub struct Checklist {
    title: Option<String>,
    requirements: Vec<ChecklistRequirement>,
}

impl Checklist {
    /// Build a checklist from requirements, enforcing id and field invariants
    pub fn new(requirements: Vec<ChecklistRequirement>) -> std::result::Result<Self, ChecklistError> {
        let mut seen = HashSet::new();
        for (i, req) in requirements.iter().enumerate() {
            let entry = i + 1;
            require(&req.id, entry, "id")?;
            require(&req.category, entry, "category")?;
            require(&req.requirement_title, entry, "requirement")?;
            require(&req.description, entry, "description")?;
            if !seen.insert(req.id.as_str()) {
                return Err(ChecklistError::DuplicateId(req.id.clone()));
            }
        }

        Ok(Self {
            title: None,
            requirements,
        })
    }

    /// Load a checklist file; `.yml`/`.yaml` are read as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, ChecklistError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ChecklistError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let checklist = Self::parse(&content, ChecklistFormat::from_path(path))?;
        log::info!(
            "Loaded checklist with {} items from {}",
            checklist.len(),
            path.display()
        );
        Ok(checklist)
    }

    /// Parse checklist content, detecting JSON vs YAML from the content itself
    pub fn from_str_auto(content: &str) -> std::result::Result<Self, ChecklistError> {
        Self::parse(content, ChecklistFormat::sniff(content))
    }

    /// Parse checklist content in the given format
    pub fn parse(content: &str, format: ChecklistFormat) -> std::result::Result<Self, ChecklistError> {
        let source: ChecklistSource = match format {
            ChecklistFormat::Json => {
                serde_json::from_str(content).map_err(|e| ChecklistError::Parse(e.to_string()))?
            }
            ChecklistFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ChecklistError::Parse(e.to_string()))?
            }
        };

        let (title, grouped) = match source {
            ChecklistSource::Document { title, items } => (title, vec![(None, items)]),
            ChecklistSource::Flat(items) => (None, vec![(None, items)]),
            ChecklistSource::Grouped(GroupedRecords(groups)) => (
                None,
                groups
                    .into_iter()
                    .map(|(category, items)| (Some(category), items))
                    .collect(),
            ),
        };

        let mut requirements = Vec::new();
        for (group_category, records) in grouped {
            for record in records {
                let entry = requirements.len() + 1;
                requirements.push(convert_record(record, group_category.as_deref(), entry)?);
            }
        }

        let mut checklist = Self::new(requirements)?;
        checklist.title = title;
        Ok(checklist)
    }

    /// Optional title from the source document
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Requirements in checklist order
    pub fn requirements(&self) -> &[ChecklistRequirement] {
        &self.requirements
    }

    /// Iterate requirements in checklist order
    pub fn iter(&self) -> impl Iterator<Item = &ChecklistRequirement> {
        self.requirements.iter()
    }

    /// Look up a requirement by id
    pub fn get(&self, id: &str) -> Option<&ChecklistRequirement> {
        self.requirements.iter().find(|r| r.id == id)
    }

    /// Number of requirements
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Check if the checklist has no requirements
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Group requirement summaries by category.
    ///
    /// Categories appear in order of first appearance; items keep checklist
    /// order within each category.
    pub fn list_by_category(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        for req in &self.requirements {
            match groups.iter_mut().find(|g| g.category == req.category) {
                Some(group) => group.items.push(req.summary()),
                None => groups.push(CategoryGroup {
                    category: req.category.clone(),
                    items: vec![req.summary()],
                }),
            }
        }
        groups
    }
}

fn require(value: &str, entry: usize, field: &'static str) -> std::result::Result<(), ChecklistError> {
    if value.trim().is_empty() {
        Err(ChecklistError::MissingField { entry, field })
    } else {
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn convert_record(
    record: RawRecord,
    group_category: Option<&str>,
    entry: usize,
) -> std::result::Result<ChecklistRequirement, ChecklistError> {
    let missing = |field| ChecklistError::MissingField { entry, field };

    let id = non_empty(record.id).ok_or_else(|| missing("id"))?;
    let category = non_empty(record.category)
        .or_else(|| non_empty(group_category.map(str::to_string)))
        .ok_or_else(|| missing("category"))?;
    let requirement = non_empty(record.requirement).ok_or_else(|| missing("requirement"))?;
    let description = non_empty(record.description).ok_or_else(|| missing("description"))?;
    let reference = non_empty(record.iso_clause).unwrap_or_else(|| UNSPECIFIED_REFERENCE.to_string());

    Ok(ChecklistRequirement::new(
        id,
        category,
        requirement,
        description,
        reference,
    ))
}
