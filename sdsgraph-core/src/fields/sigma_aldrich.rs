use super::{FieldMapper, FieldMapping, FieldName, SelectCommand, Transform};
use crate::error::Result;
use std::collections::HashMap;

/// Field registry for Sigma-Aldrich sheets. The META fields are not printed
/// in a recognisable place on these sheets and stay unregistered.
#[derive(Debug, Clone)]
pub struct SigmaAldrichFieldMapper {
    mappings: HashMap<FieldName, FieldMapping>,
}

/// sections[title] -> subsections[title] -> items
fn items_of(section: &str, subsection: &str) -> Vec<SelectCommand> {
    vec![
        SelectCommand::key("sections"),
        SelectCommand::where_value("title", section),
        SelectCommand::key("subsections"),
        SelectCommand::where_value("title", subsection),
        SelectCommand::key("items"),
    ]
}

/// ... -> items[name =~ pattern] -> data
fn item_data(section: &str, subsection: &str, name: &str) -> Result<Vec<SelectCommand>> {
    let mut commands = items_of(section, subsection);
    commands.push(SelectCommand::where_pattern("name", name)?);
    commands.push(SelectCommand::key("data"));
    Ok(commands)
}

impl SigmaAldrichFieldMapper {
    pub fn new() -> Result<Self> {
        use FieldName as F;
        use Transform as T;

        let registry = vec![
            (F::ProductName, item_data("IDENTIFICATION", "GHS_PRODUCT_IDENTIFIER", r"Product\sname")?, T::StripColonPrefix),
            (F::ProductNumber, item_data("IDENTIFICATION", "GHS_PRODUCT_IDENTIFIER", r"Product\sNumber")?, T::StripColonPrefix),
            (F::CasNumber, item_data("IDENTIFICATION", "GHS_PRODUCT_IDENTIFIER", r"CAS")?, T::StripColonPrefix),
            (F::ProductBrand, item_data("IDENTIFICATION", "GHS_PRODUCT_IDENTIFIER", r"Brand")?, T::StripColonPrefix),
            (
                F::RecommendedUseAndRestrictions,
                item_data("IDENTIFICATION", "RECOMMENDED_USE_AND_RESTRICTIONS", r"Identified\suses")?,
                T::StripColonPrefix,
            ),
            (F::SupplierAddress, item_data("IDENTIFICATION", "SUPPLIER_DETAILS", r"Company")?, T::JoinStripColonPrefix),
            (F::SupplierTelephone, item_data("IDENTIFICATION", "SUPPLIER_DETAILS", r"Telephone")?, T::StripColonPrefix),
            (F::SupplierFax, item_data("IDENTIFICATION", "SUPPLIER_DETAILS", r"Fax")?, T::StripColonPrefix),
            (
                F::EmergencyTelephone,
                item_data("IDENTIFICATION", "EMERGENCY_PHONE_NUMBER", r"Emergency\sPhone")?,
                T::JoinStripColonPrefix,
            ),
            (F::IdentificationOther, items_of("IDENTIFICATION", "IDENTIFICATION_OTHER"), T::Identity),
            (F::SubstanceClassification, items_of("HAZARDS", "GHS_SUBSTANCE_CLASSIFICATION"), T::JoinItemNames),
            // detected symbols live at document scope, not in the label text
            (F::Pictogram, vec![SelectCommand::key("pictograms")], T::Identity),
            (F::SignalWord, item_data("HAZARDS", "GHS_LABEL_ELEMENTS", r"Signal\sword")?, T::SignalWord),
            (F::HazardStatement, item_data("HAZARDS", "GHS_LABEL_ELEMENTS", r"Hazard\sstatement")?, T::Identity),
            (
                F::PrecautionaryStatement,
                item_data("HAZARDS", "GHS_LABEL_ELEMENTS", r"Precautionary\sstatement")?,
                T::Identity,
            ),
            (F::HnocHazard, items_of("HAZARDS", "OTHER_HAZARDS"), T::Identity),
        ];

        Ok(Self {
            mappings: registry
                .into_iter()
                .map(|(field, commands, transform)| (field, FieldMapping::new(commands, transform)))
                .collect(),
        })
    }
}

impl FieldMapper for SigmaAldrichFieldMapper {
    fn mapping(&self, field: FieldName) -> Option<&FieldMapping> {
        self.mappings.get(&field)
    }
}
