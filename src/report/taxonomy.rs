use anyhow::{Context, Result};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

use super::types::{ConceptRecord, ViewerData};

/// Label roles understood by the viewer data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum LabelRole {
    #[strum(serialize = "std")]
    Standard,
    #[strum(serialize = "doc")]
    Documentation,
}

const LABEL_LANGUAGES: [&str; 2] = ["en", "en-us"];

/// Read-only label store, passed explicitly to whatever needs label lookups.
#[derive(Debug, Default, Clone)]
pub struct Taxonomy {
    concepts: BTreeMap<String, ConceptRecord>,
}

impl Taxonomy {
    pub(crate) fn from_records(concepts: BTreeMap<String, ConceptRecord>) -> Self {
        Self { concepts }
    }

    /// Read the `concepts` section of a viewer data file; facts are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: ViewerData =
            serde_json::from_str(json).context("Failed to parse taxonomy JSON")?;
        Ok(Self::from_records(data.concepts))
    }

    pub fn insert_label(
        &mut self,
        qname: impl Into<String>,
        role: LabelRole,
        lang: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.concepts
            .entry(qname.into())
            .or_default()
            .labels
            .entry(role.to_string())
            .or_default()
            .insert(lang.into(), text.into());
    }

    pub fn with_label(mut self, qname: &str, role: LabelRole, text: &str) -> Self {
        self.insert_label(qname, role, "en", text);
        self
    }

    pub fn label(&self, qname: &str, role: LabelRole) -> Option<&str> {
        let labels = self.concepts.get(qname)?.labels.get(&role.to_string())?;
        LABEL_LANGUAGES
            .iter()
            .find_map(|lang| labels.get(*lang))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}
