use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::taxonomy::{LabelRole, Taxonomy};

pub const CONCEPT_ASPECT: &str = "concept";
pub const PERIOD_ASPECT: &str = "period";
pub const UNIT_ASPECT: &str = "unit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Concept,
    Period,
    Unit,
    Dimension,
}

/// A named classification of a fact together with its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aspect {
    name: String,
    kind: AspectKind,
    value: String,
}

impl Aspect {
    pub fn new(name: impl Into<String>, kind: AspectKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }

    pub fn concept(qname: impl Into<String>) -> Self {
        Self::new(CONCEPT_ASPECT, AspectKind::Concept, qname)
    }

    pub fn period(value: impl Into<String>) -> Self {
        Self::new(PERIOD_ASPECT, AspectKind::Period, value)
    }

    pub fn unit(value: impl Into<String>) -> Self {
        Self::new(UNIT_ASPECT, AspectKind::Unit, value)
    }

    pub fn dimension(dimension: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(dimension, AspectKind::Dimension, member)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AspectKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn equal_to(&self, other: &Aspect) -> bool {
        self.value == other.value
    }

    /// Human readable label of the aspect value, if the value has one for `role`.
    ///
    /// Concepts and dimension members are looked up in the taxonomy. Periods are
    /// rendered as dates when they parse; units have no label.
    pub fn value_label(&self, taxonomy: &Taxonomy, role: LabelRole) -> Option<String> {
        match self.kind {
            AspectKind::Concept | AspectKind::Dimension => {
                taxonomy.label(&self.value, role).map(str::to_string)
            }
            AspectKind::Period if role == LabelRole::Standard => format_period(&self.value),
            AspectKind::Period | AspectKind::Unit => None,
        }
    }

    /// Standard label, falling back to the raw value.
    pub fn display_label(&self, taxonomy: &Taxonomy) -> String {
        self.value_label(taxonomy, LabelRole::Standard)
            .unwrap_or_else(|| self.value.clone())
    }
}

fn format_date(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%-d %b %Y").to_string())
}

fn format_period(value: &str) -> Option<String> {
    match value.split_once('/') {
        Some((start, end)) => Some(format!("{} to {}", format_date(start)?, format_date(end)?)),
        None => format_date(value),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    Numeric(f64),
    Text(String),
}

impl FactValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FactValue::Numeric(n) => Some(*n),
            FactValue::Text(_) => None,
        }
    }

    fn from_json(value: Option<serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::Number(n)) => n
                .as_f64()
                .map(FactValue::Numeric)
                .unwrap_or_else(|| FactValue::Text(n.to_string())),
            Some(serde_json::Value::String(s)) => FactValue::from(s),
            Some(serde_json::Value::Null) | None => FactValue::Text(String::new()),
            Some(other) => FactValue::Text(other.to_string()),
        }
    }
}

impl From<String> for FactValue {
    fn from(s: String) -> Self {
        match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => FactValue::Numeric(n),
            _ => FactValue::Text(s),
        }
    }
}

impl From<f64> for FactValue {
    fn from(n: f64) -> Self {
        FactValue::Numeric(n)
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Numeric(n) => write!(f, "{}", n),
            FactValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A single tagged data point of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    id: String,
    aspects: Vec<Aspect>,
    value: FactValue,
}

impl Fact {
    pub fn new(id: impl Into<String>, aspects: Vec<Aspect>, value: impl Into<FactValue>) -> Self {
        Self {
            id: id.into(),
            aspects,
            value: value.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn aspects(&self) -> &[Aspect] {
        &self.aspects
    }

    pub fn aspect(&self, name: &str) -> Option<&Aspect> {
        self.aspects.iter().find(|a| a.name() == name)
    }

    pub fn concept(&self) -> Option<&str> {
        self.aspect(CONCEPT_ASPECT).map(Aspect::value)
    }

    pub fn value(&self) -> &FactValue {
        &self.value
    }
}

/// Inspector-style summary of one fact.
#[derive(Debug, Clone, Serialize)]
pub struct FactDescription {
    pub id: String,
    pub concept: String,
    pub label: String,
    pub documentation: String,
    pub dimensions: Vec<(String, String)>,
    pub period: Option<String>,
    pub unit: Option<String>,
    pub value: FactValue,
}

// Wire format of the viewer data embedded in the document.

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ViewerData {
    #[serde(default)]
    pub concepts: BTreeMap<String, ConceptRecord>,
    #[serde(default)]
    pub facts: BTreeMap<String, FactRecord>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct ConceptRecord {
    /// role -> language -> label text
    #[serde(default)]
    pub labels: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FactRecord {
    #[serde(rename = "c")]
    pub concept: String,
    #[serde(rename = "d", default)]
    pub dimensions: BTreeMap<String, String>,
    #[serde(rename = "p", default)]
    pub period: Option<String>,
    #[serde(rename = "u", default)]
    pub unit: Option<String>,
    #[serde(rename = "v", default)]
    pub value: Option<serde_json::Value>,
}

impl FactRecord {
    pub fn into_fact(self, id: String) -> Fact {
        let mut aspects = vec![Aspect::concept(self.concept)];
        if let Some(period) = self.period {
            aspects.push(Aspect::period(period));
        }
        if let Some(unit) = self.unit {
            aspects.push(Aspect::unit(unit));
        }
        aspects.extend(
            self.dimensions
                .into_iter()
                .map(|(dim, member)| Aspect::dimension(dim, member)),
        );

        Fact {
            id,
            aspects,
            value: FactValue::from_json(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_labels() {
        let taxonomy = Taxonomy::default();
        assert_eq!(
            Aspect::period("2023-12-31").display_label(&taxonomy),
            "31 Dec 2023"
        );
        assert_eq!(
            Aspect::period("2023-01-01/2023-12-31").display_label(&taxonomy),
            "1 Jan 2023 to 31 Dec 2023"
        );
        assert_eq!(Aspect::period("FY2023").display_label(&taxonomy), "FY2023");
        assert_eq!(
            Aspect::period("2023-12-31").value_label(&taxonomy, LabelRole::Documentation),
            None
        );
    }

    #[test]
    fn test_unit_has_no_label() {
        let taxonomy = Taxonomy::default();
        let unit = Aspect::unit("iso4217:USD");
        assert_eq!(unit.value_label(&taxonomy, LabelRole::Standard), None);
        assert_eq!(unit.display_label(&taxonomy), "iso4217:USD");
    }

    #[test]
    fn test_equality_compares_values() {
        assert!(Aspect::period("2023").equal_to(&Aspect::period("2023")));
        assert!(!Aspect::period("2023").equal_to(&Aspect::period("2022")));
        assert!(!Aspect::unit("").equal_to(&Aspect::unit("USD")));
    }

    #[test]
    fn test_fact_value_parsing() {
        assert_eq!(FactValue::from("1234.5".to_string()), FactValue::Numeric(1234.5));
        assert_eq!(FactValue::from(" -42 ".to_string()), FactValue::Numeric(-42.0));
        assert_eq!(
            FactValue::from("Acme Corp".to_string()),
            FactValue::Text("Acme Corp".to_string())
        );
        assert_eq!(
            FactValue::from_json(Some(serde_json::json!(100))),
            FactValue::Numeric(100.0)
        );
        assert_eq!(FactValue::from_json(None), FactValue::Text(String::new()));
    }

    #[test]
    fn test_record_aspect_order() {
        let record: FactRecord = serde_json::from_value(serde_json::json!({
            "c": "us-gaap:Revenues",
            "p": "2023-01-01/2024-01-01",
            "u": "iso4217:USD",
            "d": { "us-gaap:SegmentAxis": "acme:RetailMember" },
            "v": "100"
        }))
        .unwrap();
        let fact = record.into_fact("f1".to_string());

        let names: Vec<&str> = fact.aspects().iter().map(Aspect::name).collect();
        assert_eq!(names, vec!["concept", "period", "unit", "us-gaap:SegmentAxis"]);
        assert_eq!(fact.concept(), Some("us-gaap:Revenues"));
        assert_eq!(fact.value(), &FactValue::Numeric(100.0));
        assert!(fact.aspect("missing").is_none());
    }
}
