// GHS Rev. 9 (2021) safety data sheet model.
//
// Canonical section/subsection titles, hazard pictograms and the assembled,
// read-only document object graph. Every enum serializes by symbolic name.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

symbolic_enum! {
    /// The sixteen GHS sections, plus a placeholder for headers no rule recognises.
    pub enum SectionTitle {
        Identification => "IDENTIFICATION",
        Hazards => "HAZARDS",
        Composition => "COMPOSITION",
        FirstAid => "FIRST_AID",
        FireFighting => "FIRE_FIGHTING",
        AccidentalRelease => "ACCIDENTAL_RELEASE",
        HandlingAndStorage => "HANDLING_AND_STORAGE",
        ExposureControl => "EXPOSURE_CONTROL",
        PhysicalAndChemical => "PHYSICAL_AND_CHEMICAL",
        StabilityAndReactivity => "STABILITY_AND_REACTIVITY",
        Toxicological => "TOXICOLOGICAL",
        Ecological => "ECOLOGICAL",
        Disposal => "DISPOSAL",
        Transport => "TRANSPORT",
        Regulatory => "REGULATORY",
        Other => "OTHER",
        Unknown => "UNKNOWN",
    }
}

impl SectionTitle {
    /// GHS section number, None for `Unknown`.
    pub fn number(&self) -> Option<u8> {
        SectionTitle::ALL
            .iter()
            .position(|t| t == self)
            .filter(|_| *self != SectionTitle::Unknown)
            .map(|i| i as u8 + 1)
    }

    /// The catch-all subsection used when no subsection rule matches.
    pub fn default_subsection(&self) -> SubsectionTitle {
        use SubsectionTitle as S;
        match self {
            SectionTitle::Identification => S::IdentificationOther,
            SectionTitle::Hazards => S::HazardsOther,
            SectionTitle::Composition => S::CompositionOther,
            SectionTitle::FirstAid => S::FirstAidOther,
            SectionTitle::FireFighting => S::FireFightingOther,
            SectionTitle::AccidentalRelease => S::AccidentalReleaseOther,
            SectionTitle::HandlingAndStorage => S::HandlingAndStorageOther,
            SectionTitle::ExposureControl => S::ExposureControlOther,
            SectionTitle::PhysicalAndChemical => S::PhysicalAndChemicalOther,
            SectionTitle::StabilityAndReactivity => S::StabilityAndReactivityOther,
            SectionTitle::Toxicological => S::ToxicologicalOther,
            SectionTitle::Ecological => S::EcologicalOther,
            SectionTitle::Disposal => S::DisposalOther,
            SectionTitle::Transport => S::TransportOther,
            SectionTitle::Regulatory => S::RegulatoryOther,
            SectionTitle::Other => S::OtherOther,
            SectionTitle::Unknown => S::UnknownOther,
        }
    }
}

symbolic_enum! {
    pub enum SubsectionTitle {
        // 1: Identification
        GhsProductIdentifier => "GHS_PRODUCT_IDENTIFIER",
        OtherMeansOfIdentification => "OTHER_MEANS_OF_IDENTIFICATION",
        RecommendedUseAndRestrictions => "RECOMMENDED_USE_AND_RESTRICTIONS",
        SupplierDetails => "SUPPLIER_DETAILS",
        EmergencyPhoneNumber => "EMERGENCY_PHONE_NUMBER",
        IdentificationOther => "IDENTIFICATION_OTHER",
        // 2: Hazards
        GhsSubstanceClassification => "GHS_SUBSTANCE_CLASSIFICATION",
        GhsLabelElements => "GHS_LABEL_ELEMENTS",
        OtherHazards => "OTHER_HAZARDS",
        HazardsOther => "HAZARDS_OTHER",
        // 3: Composition
        SubstanceChemicalIdentity => "SUBSTANCE_CHEMICAL_IDENTITY",
        SubstanceCommonNameSynonyms => "SUBSTANCE_COMMON_NAME_SYNONYMS",
        SubstanceCasNumberIdentifiers => "SUBSTANCE_CAS_NUMBER_IDENTIFIERS",
        SubstanceImpuritiesAdditives => "SUBSTANCE_IMPURITIES_ADDITIVES",
        MixtureIngredients => "MIXTURE_INGREDIENTS",
        CompositionOther => "COMPOSITION_OTHER",
        // 4: First aid
        FirstAidMeasures => "FIRST_AID_MEASURES",
        SymptomsAndEffects => "SYMPTOMS_AND_EFFECTS",
        IndicationMedicalTreatment => "INDICATION_MEDICAL_TREATMENT",
        FirstAidOther => "FIRST_AID_OTHER",
        // 5: Fire fighting
        ExtinguishingMedia => "EXTINGUISHING_MEDIA",
        SpecialHazards => "SPECIAL_HAZARDS",
        FirefighterEquipmentPrecautions => "FIREFIGHTER_EQUIPMENT_PRECAUTIONS",
        FireFightingOther => "FIRE_FIGHTING_OTHER",
        // 6: Accidental release
        PrecautionsEquipmentProcedures => "PRECAUTIONS_EQUIPMENT_PROCEDURES",
        EnvironmentalPrecautions => "ENVIRONMENTAL_PRECAUTIONS",
        ContainmentCleanup => "CONTAINMENT_CLEANUP",
        AccidentalReleaseOther => "ACCIDENTAL_RELEASE_OTHER",
        // 7: Handling and storage
        HandlingPrecautions => "HANDLING_PRECAUTIONS",
        SafeStorageConditions => "SAFE_STORAGE_CONDITIONS",
        HandlingAndStorageOther => "HANDLING_AND_STORAGE_OTHER",
        // 8: Exposure controls
        ControlParameters => "CONTROL_PARAMETERS",
        EngineeringControls => "ENGINEERING_CONTROLS",
        IndividualProtection => "INDIVIDUAL_PROTECTION",
        ExposureControlOther => "EXPOSURE_CONTROL_OTHER",
        // 9: Physical and chemical properties
        PropPhysicalState => "PROP_PHYSICAL_STATE",
        PropColour => "PROP_COLOUR",
        PropOdour => "PROP_ODOUR",
        PropMeltingFreezing => "PROP_MELTING_FREEZING",
        PropBoilingPoint => "PROP_BOILING_POINT",
        PropFlammability => "PROP_FLAMMABILITY",
        PropExplosionFlammabilityLimit => "PROP_EXPLOSION_FLAMMABILITY_LIMIT",
        PropFlashPoint => "PROP_FLASH_POINT",
        PropAutoIgnitionTemperature => "PROP_AUTO_IGNITION_TEMPERATURE",
        PropDecompositionTemperature => "PROP_DECOMPOSITION_TEMPERATURE",
        PropPh => "PROP_PH",
        PropKinematicViscosity => "PROP_KINEMATIC_VISCOSITY",
        PropSolubility => "PROP_SOLUBILITY",
        PropPartitionCoefficient => "PROP_PARTITION_COEFFICIENT",
        PropVapourPressure => "PROP_VAPOUR_PRESSURE",
        PropDensity => "PROP_DENSITY",
        PropVapourDensity => "PROP_VAPOUR_DENSITY",
        PropParticleCharacteristics => "PROP_PARTICLE_CHARACTERISTICS",
        PhysicalAndChemicalOther => "PHYSICAL_AND_CHEMICAL_OTHER",
        // 10: Stability and reactivity
        Reactivity => "REACTIVITY",
        ChemicalStability => "CHEMICAL_STABILITY",
        HazardousReactions => "HAZARDOUS_REACTIONS",
        ConditionsToAvoid => "CONDITIONS_TO_AVOID",
        IncompatibleMaterials => "INCOMPATIBLE_MATERIALS",
        DecompositionProducts => "DECOMPOSITION_PRODUCTS",
        StabilityAndReactivityOther => "STABILITY_AND_REACTIVITY_OTHER",
        // 11: Toxicological
        RoutesOfExposure => "ROUTES_OF_EXPOSURE",
        ToxicologicalCharacteristics => "TOXICOLOGICAL_CHARACTERISTICS",
        EffectsFromExposure => "EFFECTS_FROM_EXPOSURE",
        MeasuresOfToxicity => "MEASURES_OF_TOXICITY",
        ToxicologicalOther => "TOXICOLOGICAL_OTHER",
        // 12: Ecological
        Ecotoxicity => "ECOTOXICITY",
        PersistenceDegradability => "PERSISTENCE_DEGRADABILITY",
        BioaccumulativePotential => "BIOACCUMULATIVE_POTENTIAL",
        MobilityInSoil => "MOBILITY_IN_SOIL",
        EcoOtherAdverseEffects => "ECO_OTHER_ADVERSE_EFFECTS",
        EcologicalOther => "ECOLOGICAL_OTHER",
        // 13: Disposal
        DisposalOther => "DISPOSAL_OTHER",
        // 14: Transport
        TransportUnNumber => "TRANSPORT_UN_NUMBER",
        TransportUnShippingName => "TRANSPORT_UN_SHIPPING_NAME",
        TransportHazardClasses => "TRANSPORT_HAZARD_CLASSES",
        TransportPackingGroup => "TRANSPORT_PACKING_GROUP",
        TransportEnvironmental => "TRANSPORT_ENVIRONMENTAL",
        TransportInBulk => "TRANSPORT_IN_BULK",
        TransportPrecautions => "TRANSPORT_PRECAUTIONS",
        TransportOther => "TRANSPORT_OTHER",
        // 15: Regulatory
        RegulatoryOther => "REGULATORY_OTHER",
        // 16: Other information
        OtherOther => "OTHER_OTHER",
        // Section context could not be classified
        UnknownOther => "UNKNOWN_OTHER",
    }
}

symbolic_enum! {
    /// GHS hazard pictograms.
    pub enum Pictogram {
        Explosive => "PICT_GHS01_EXPLOSIVE",
        Flammable => "PICT_GHS02_FLAMMABLE",
        Oxidizing => "PICT_GHS03_OXIDIZING",
        CompressedGas => "PICT_GHS04_COMPRESSED_GAS",
        Corrosive => "PICT_GHS05_CORROSIVE",
        Toxic => "PICT_GHS06_TOXIC",
        Harmful => "PICT_GHS07_HARMFUL",
        HealthHazard => "PICT_GHS08_HEALTH_HAZARD",
        EnvironmentalHazard => "PICT_GHS09_ENVIRONMENTAL_HAZARD",
    }
}

symbolic_enum! {
    pub enum ItemType {
        Text => "TEXT",
        Field => "FIELD",
        Table => "TABLE",
        Figure => "FIGURE",
    }
}

// ===== ASSEMBLED DOCUMENT =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub text: String,
    #[serde(default)]
    pub remarks: Vec<String>,
}

/// Item payload; the variant doubles as the item type discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemData {
    Text(String),
    Field(Vec<String>),
    Table(TableData),
    Figure(String),
}

/// Smallest unit of content inside a subsection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ItemRecord", try_from = "ItemRecord")]
pub struct Item {
    pub name: String,
    pub data: ItemData,
}

impl Item {
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: ItemData::Text(text.into()),
        }
    }

    pub fn field(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ItemData::Field(values),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self.data {
            ItemData::Text(_) => ItemType::Text,
            ItemData::Field(_) => ItemType::Field,
            ItemData::Table(_) => ItemType::Table,
            ItemData::Figure(_) => ItemType::Figure,
        }
    }
}

/// Wire shape of an item: `{ "type", "name", "data" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    pub data: Value,
}

impl From<Item> for ItemRecord {
    fn from(item: Item) -> Self {
        let item_type = item.item_type();
        let data = match item.data {
            ItemData::Text(s) | ItemData::Figure(s) => Value::String(s),
            ItemData::Field(values) => Value::Array(values.into_iter().map(Value::String).collect()),
            ItemData::Table(table) => serde_json::json!({
                "text": table.text,
                "remarks": table.remarks,
            }),
        };
        ItemRecord {
            item_type,
            name: item.name,
            data,
        }
    }
}

impl TryFrom<ItemRecord> for Item {
    type Error = String;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let data = match record.item_type {
            ItemType::Text => ItemData::Text(coerce_string(record.data)),
            ItemType::Figure => ItemData::Figure(coerce_string(record.data)),
            ItemType::Field => match record.data {
                Value::Array(values) => {
                    ItemData::Field(values.into_iter().map(coerce_string).collect())
                }
                other => ItemData::Field(vec![coerce_string(other)]),
            },
            ItemType::Table => ItemData::Table(
                serde_json::from_value(record.data).map_err(|e| format!("invalid table item: {e}"))?,
            ),
        };
        Ok(Item {
            name: record.name,
            data,
        })
    }
}

/// Payloads we don't recognise are kept as their string form.
fn coerce_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    pub title: SubsectionTitle,
    /// Header text as printed; empty for synthesized default subsections
    pub raw_title: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: SectionTitle,
    pub raw_title: String,
    pub subsections: Vec<Subsection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub pictograms: Vec<Pictogram>,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn section(&self, title: SectionTitle) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> crate::error::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn save_to_json(&self, path: &str, pretty: bool) -> crate::error::Result<()> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Section {
    pub fn subsection(&self, title: SubsectionTitle) -> Option<&Subsection> {
        self.subsections.iter().find(|s| s.title == title)
    }
}

// Outline rendering, same `|-` / `| ` convention as the hierarchy tree.
fn push_child(out: &mut String, rendered: &str) {
    let mut lines = rendered.lines();
    if let Some(first) = lines.next() {
        out.push_str("|-");
        out.push_str(first);
        out.push('\n');
    }
    for line in lines {
        out.push_str("| ");
        out.push_str(line);
        out.push('\n');
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            ItemData::Text(s) | ItemData::Figure(s) => {
                write!(f, "{}: {}", self.item_type(), s)
            }
            ItemData::Field(values) => {
                let mut out = format!("{}: {}\n", self.item_type(), self.name);
                for value in values {
                    push_child(&mut out, value);
                }
                f.write_str(out.trim_end())
            }
            ItemData::Table(table) => {
                let mut out = format!("{}:\n", self.item_type());
                push_child(&mut out, &table.text);
                f.write_str(out.trim_end())
            }
        }
    }
}

impl fmt::Display for Subsection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("Subsection {}:\n", self.title);
        for item in &self.items {
            push_child(&mut out, &item.to_string());
        }
        f.write_str(out.trim_end())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("Section {}:\n", self.title);
        for subsection in &self.subsections {
            push_child(&mut out, &subsection.to_string());
        }
        f.write_str(out.trim_end())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("GHS Rev. 9, 2021 SDS Document\nName: {}\n", self.name);
        if !self.pictograms.is_empty() {
            let names: Vec<&str> = self.pictograms.iter().map(|p| p.as_str()).collect();
            out.push_str(&format!("Pictograms: {}\n", names.join(", ")));
        }
        out.push_str("Content:\n");
        for section in &self.sections {
            push_child(&mut out, &section.to_string());
        }
        f.write_str(out.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document {
            name: "acetone".to_string(),
            pictograms: vec![Pictogram::Flammable],
            sections: vec![Section {
                title: SectionTitle::Identification,
                raw_title: "SECTION 1: Identification".to_string(),
                subsections: vec![Subsection {
                    title: SubsectionTitle::GhsProductIdentifier,
                    raw_title: "1.1 Product identifiers".to_string(),
                    items: vec![
                        Item::field("Product name", vec![": Acetone".to_string()]),
                        Item {
                            name: String::new(),
                            data: ItemData::Table(TableData {
                                text: "a | b".to_string(),
                                remarks: vec!["Remarks x".to_string()],
                            }),
                        },
                    ],
                }],
            }],
        }
    }

    #[test]
    fn json_uses_symbolic_names_and_item_shape() {
        let value = sample().to_value().unwrap();
        assert_eq!(value["pictograms"], json!(["PICT_GHS02_FLAMMABLE"]));
        let section = &value["sections"][0];
        assert_eq!(section["title"], "IDENTIFICATION");
        let subsection = &section["subsections"][0];
        assert_eq!(subsection["title"], "GHS_PRODUCT_IDENTIFIER");
        assert_eq!(
            subsection["items"][0],
            json!({"type": "FIELD", "name": "Product name", "data": [": Acetone"]})
        );
        assert_eq!(subsection["items"][1]["type"], "TABLE");
        assert_eq!(subsection["items"][1]["data"]["remarks"][0], "Remarks x");
    }

    #[test]
    fn document_reads_back_from_json() {
        let doc = sample();
        let parsed: Document = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn unrecognised_text_payloads_are_coerced_to_strings() {
        let item: Item =
            serde_json::from_value(json!({"type": "TEXT", "name": "", "data": 42})).unwrap();
        assert_eq!(item.data, ItemData::Text("42".to_string()));
    }

    #[test]
    fn every_section_has_its_own_default_subsection() {
        assert_eq!(SectionTitle::Identification.default_subsection(), SubsectionTitle::IdentificationOther);
        assert_eq!(SectionTitle::Other.default_subsection(), SubsectionTitle::OtherOther);
        assert_eq!(SectionTitle::Unknown.default_subsection(), SubsectionTitle::UnknownOther);
        assert_eq!(SectionTitle::Regulatory.number(), Some(15));
        assert_eq!(SectionTitle::Unknown.number(), None);
    }

    #[test]
    fn outline_lists_sections_and_items() {
        let text = sample().to_string();
        assert!(text.starts_with("GHS Rev. 9, 2021 SDS Document\nName: acetone"));
        assert!(text.contains("|-Section IDENTIFICATION:"));
        assert!(text.contains("| |-Subsection GHS_PRODUCT_IDENTIFIER:"));
    }
}
