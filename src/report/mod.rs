pub mod taxonomy;
pub mod types;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeMap;

pub use taxonomy::{LabelRole, Taxonomy};
pub use types::{Aspect, AspectKind, Fact, FactDescription, FactValue};

use types::ViewerData;

static VIEWER_DATA_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script#taxonomy-data").expect("static selector"));

/// The fact store of one document: every fact keyed by identifier, plus the
/// taxonomy used to label them.
#[derive(Debug, Default, Clone)]
pub struct Report {
    taxonomy: Taxonomy,
    facts: BTreeMap<String, Fact>,
}

impl Report {
    pub fn new(taxonomy: Taxonomy, facts: impl IntoIterator<Item = Fact>) -> Self {
        Self {
            taxonomy,
            facts: facts
                .into_iter()
                .map(|f| (f.id().to_string(), f))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let data: ViewerData =
            serde_json::from_str(json).context("Failed to parse viewer data JSON")?;
        let facts = data
            .facts
            .into_iter()
            .map(|(id, record)| {
                let fact = record.into_fact(id.clone());
                (id, fact)
            })
            .collect::<BTreeMap<_, _>>();
        log::info!(
            "Loaded {} facts and {} concepts",
            facts.len(),
            data.concepts.len()
        );

        Ok(Self {
            taxonomy: Taxonomy::from_records(data.concepts),
            facts,
        })
    }

    /// Load the viewer data embedded in `<script id="taxonomy-data">`.
    pub fn from_document(document: &Html) -> Result<Self> {
        let script = document
            .select(&VIEWER_DATA_SELECTOR)
            .next()
            .ok_or_else(|| anyhow!("Document has no embedded taxonomy-data script"))?;
        let json = script.text().collect::<String>();
        Self::from_json(&json)
    }

    /// Replace the label store, keeping the facts.
    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn get_fact_by_id(&self, id: &str) -> Option<&Fact> {
        self.facts.get(id)
    }

    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn describe(&self, id: &str) -> Option<FactDescription> {
        let fact = self.get_fact_by_id(id)?;
        let concept = fact.concept().unwrap_or_default().to_string();
        let taxonomy = &self.taxonomy;

        let dimensions = fact
            .aspects()
            .iter()
            .filter(|a| a.kind() == AspectKind::Dimension)
            .map(|a| {
                let dimension = taxonomy
                    .label(a.name(), LabelRole::Standard)
                    .unwrap_or(a.name())
                    .to_string();
                (dimension, a.display_label(taxonomy))
            })
            .collect();

        Some(FactDescription {
            id: fact.id().to_string(),
            label: taxonomy
                .label(&concept, LabelRole::Standard)
                .unwrap_or(concept.as_str())
                .to_string(),
            documentation: taxonomy
                .label(&concept, LabelRole::Documentation)
                .unwrap_or_default()
                .to_string(),
            concept,
            dimensions,
            period: fact
                .aspect(types::PERIOD_ASPECT)
                .map(|a| a.display_label(taxonomy)),
            unit: fact.aspect(types::UNIT_ASPECT).map(|a| a.value().to_string()),
            value: fact.value().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWER_JSON: &str = r#"{
        "concepts": {
            "us-gaap:Revenues": {
                "labels": {
                    "std": { "en": "Revenues" },
                    "doc": { "en-us": "Amount of revenue recognized." }
                }
            },
            "us-gaap:SegmentAxis": { "labels": { "std": { "en": "Segments" } } },
            "acme:RetailMember": { "labels": { "std": { "en": "Retail" } } }
        },
        "facts": {
            "f1": {
                "c": "us-gaap:Revenues",
                "p": "2023-01-01/2023-12-31",
                "u": "iso4217:USD",
                "d": { "us-gaap:SegmentAxis": "acme:RetailMember" },
                "v": "1500"
            },
            "f2": { "c": "dei:EntityRegistrantName", "v": "Acme Corp" }
        }
    }"#;

    #[test]
    fn test_from_json() {
        let report = Report::from_json(VIEWER_JSON).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report.taxonomy().len(), 3);

        let f1 = report.get_fact_by_id("f1").unwrap();
        assert_eq!(f1.value().as_number(), Some(1500.0));
        assert_eq!(f1.aspects().len(), 4);

        let f2 = report.get_fact_by_id("f2").unwrap();
        assert_eq!(f2.value(), &FactValue::Text("Acme Corp".to_string()));
        assert!(report.get_fact_by_id("f3").is_none());
    }

    #[test]
    fn test_from_document() {
        let html = format!(
            r#"<html><head><script type="application/json" id="taxonomy-data">{}</script></head>
            <body><p>hello</p></body></html>"#,
            VIEWER_JSON
        );
        let report = Report::from_document(&Html::parse_document(&html)).unwrap();
        assert_eq!(report.len(), 2);

        let missing = Report::from_document(&Html::parse_document("<p>no data</p>"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(Report::from_json("{ not json").is_err());
        assert!(Report::from_json(r#"{"facts": 3}"#).is_err());
        assert!(Report::from_json(r#"{"facts": {"f1": {"v": "1"}}}"#).is_err());
        assert!(Report::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn test_describe() {
        let report = Report::from_json(VIEWER_JSON).unwrap();
        let description = report.describe("f1").unwrap();

        assert_eq!(description.concept, "us-gaap:Revenues");
        assert_eq!(description.label, "Revenues");
        assert_eq!(description.documentation, "Amount of revenue recognized.");
        assert_eq!(
            description.dimensions,
            vec![("Segments".to_string(), "Retail".to_string())]
        );
        assert_eq!(
            description.period.as_deref(),
            Some("1 Jan 2023 to 31 Dec 2023")
        );
        assert_eq!(description.unit.as_deref(), Some("iso4217:USD"));

        let description = report.describe("f2").unwrap();
        assert_eq!(description.label, "dei:EntityRegistrantName");
        assert_eq!(description.documentation, "");
        assert!(report.describe("nope").is_none());
    }
}
