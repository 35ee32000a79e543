// Field query mapper.
//
// Each named field is a fixed pipeline of `SelectCommand` steps over the
// serialized document, followed by a terminal `Transform`. Pipelines are
// registered per supplier at construction time; any miss along the way turns
// into `FieldValue::Absent` instead of an error.

pub mod sigma_aldrich;

pub use sigma_aldrich::SigmaAldrichFieldMapper;

use crate::error::Result;
use crate::ghs::Document;
use crate::rules::matches_at_start;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

symbolic_enum! {
    /// The queryable field catalogue.
    pub enum FieldName {
        MetaVersion => "META_VERSION",
        MetaRevisionDate => "META_REVISION_DATE",
        MetaPrintDate => "META_PRINT_DATE",
        ProductName => "PRODUCT_NAME",
        ProductNumber => "PRODUCT_NUMBER",
        CasNumber => "CAS_NUMBER",
        ProductBrand => "PRODUCT_BRAND",
        RecommendedUseAndRestrictions => "RECOMMENDED_USE_AND_RESTRICTIONS",
        SupplierAddress => "SUPPLIER_ADDRESS",
        SupplierTelephone => "SUPPLIER_TELEPHONE",
        SupplierFax => "SUPPLIER_FAX",
        EmergencyTelephone => "EMERGENCY_TELEPHONE",
        IdentificationOther => "IDENTIFICATION_OTHER",
        SubstanceClassification => "SUBSTANCE_CLASSIFICATION",
        Pictogram => "PICTOGRAM",
        SignalWord => "SIGNAL_WORD",
        HazardStatement => "HAZARD_STATEMENT",
        PrecautionaryStatement => "PRECAUTIONARY_STATEMENT",
        HnocHazard => "HNOC_HAZARD",
    }
}

/// Result of a field lookup. Serializes as a string, an array or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<Value>),
    Absent,
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Filter {
    Exact(String),
    /// Matched at the start of the sibling value
    Pattern(Regex),
}

impl Filter {
    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Filter::Exact(expected), Value::String(s)) => s == expected,
            (Filter::Pattern(pattern), Value::String(s)) => matches_at_start(pattern, s),
            _ => false,
        }
    }
}

/// One narrowing step of a field pipeline.
#[derive(Debug, Clone)]
pub struct SelectCommand {
    pub key: String,
    pub filter: Option<Filter>,
}

impl SelectCommand {
    /// Project `key` out of an object.
    pub fn key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            filter: None,
        }
    }

    /// Pick the first array element whose `key` equals `value`.
    pub fn where_value(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            filter: Some(Filter::Exact(value.to_string())),
        }
    }

    /// Pick the first array element whose `key` starts with a case-insensitive match of `pattern`.
    pub fn where_pattern(key: &str, pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            key: key.to_string(),
            filter: Some(Filter::Pattern(regex)),
        })
    }

    pub fn apply<'a>(&self, target: &'a Value) -> Option<&'a Value> {
        match (target, &self.filter) {
            (Value::Object(map), None) => map.get(&self.key),
            (Value::Array(elements), Some(filter)) => elements
                .iter()
                .find(|e| e.get(&self.key).is_some_and(|v| filter.accepts(v))),
            _ => None,
        }
    }
}

/// Terminal step of a field pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    /// First value with a leading colon and whitespace removed
    StripColonPrefix,
    /// All values concatenated, then the leading colon removed
    JoinStripColonPrefix,
    /// `name` of every item, one per line
    JoinItemNames,
    /// "Danger" or "Warning" as printed
    SignalWord,
}

fn strings(value: &Value) -> Option<Vec<&str>> {
    match value {
        Value::String(s) => Some(vec![s.as_str()]),
        Value::Array(values) => values.iter().map(Value::as_str).collect(),
        _ => None,
    }
}

static COLON_PREFIX: OnceLock<Option<Regex>> = OnceLock::new();
static COLON_PREFIX_MULTILINE: OnceLock<Option<Regex>> = OnceLock::new();
static SIGNAL_WORD: OnceLock<Option<Regex>> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn capture(regex: Option<&Regex>, text: &str) -> Option<String> {
    regex?
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

impl Transform {
    pub fn apply(&self, value: &Value) -> FieldValue {
        let result = match self {
            Transform::Identity => match value {
                Value::Null => None,
                Value::String(s) => Some(FieldValue::Text(s.clone())),
                Value::Array(values) => Some(FieldValue::List(values.clone())),
                other => Some(FieldValue::Text(other.to_string())),
            },
            Transform::StripColonPrefix => strings(value)
                .and_then(|v| v.first().copied())
                .and_then(|first| capture(compiled(&COLON_PREFIX, r"^:?\s*(.*)"), first))
                .map(FieldValue::Text),
            Transform::JoinStripColonPrefix => strings(value)
                .and_then(|v| {
                    capture(compiled(&COLON_PREFIX_MULTILINE, r"(?s)^:?\s*(.*)"), &v.concat())
                })
                .map(FieldValue::Text),
            Transform::JoinItemNames => value.as_array().and_then(|items| {
                items
                    .iter()
                    .map(|item| item.get("name").and_then(Value::as_str))
                    .collect::<Option<Vec<_>>>()
                    .map(|names| FieldValue::Text(names.join("\n")))
            }),
            Transform::SignalWord => strings(value)
                .and_then(|v| capture(compiled(&SIGNAL_WORD, r"(?i)(danger|warning)"), &v.concat()))
                .map(FieldValue::Text),
        };
        result.unwrap_or(FieldValue::Absent)
    }
}

/// A registered pipeline for one field.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub commands: Vec<SelectCommand>,
    pub transform: Transform,
}

impl FieldMapping {
    pub fn new(commands: Vec<SelectCommand>, transform: Transform) -> Self {
        Self {
            commands,
            transform,
        }
    }

    pub fn evaluate(&self, target: &Value) -> FieldValue {
        let mut current = target;
        for command in &self.commands {
            match command.apply(current) {
                Some(next) => current = next,
                None => return FieldValue::Absent,
            }
        }
        match current {
            // a TEXT leaf carries its own line as data; only an inline
            // "label: value" holds a value
            Value::String(line) => match line.split_once(':') {
                Some((_, value)) if !value.trim().is_empty() => {
                    self.transform.apply(&Value::String(value.trim().to_string()))
                }
                _ => FieldValue::Absent,
            },
            other => self.transform.apply(other),
        }
    }
}

/// Every field of the catalogue, in catalogue order.
pub type FieldTable = BTreeMap<FieldName, FieldValue>;

/// Fixed per-supplier field registry.
pub trait FieldMapper: Send + Sync {
    /// None for fields this supplier does not provide.
    fn mapping(&self, field: FieldName) -> Option<&FieldMapping>;

    fn get_field(&self, field: FieldName, document: &Value) -> FieldValue {
        self.mapping(field)
            .map(|m| m.evaluate(document))
            .unwrap_or(FieldValue::Absent)
    }

    fn map_all(&self, document: &Document) -> Result<FieldTable> {
        let value = document.to_value()?;
        Ok(FieldName::ALL
            .iter()
            .map(|&field| (field, self.get_field(field, &value)))
            .collect())
    }
}
