use super::engine::{SdsRules, SubsectionRules};
use crate::error::Result;
use crate::ghs::{SectionTitle, SubsectionTitle};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// Sigma-Aldrich headers look like `SECTION 1: Identification of the substance/mixture...`
/// and subsections like `1.1 Product identifiers`.
#[derive(Debug, Clone)]
pub struct SigmaAldrichRules {
    section_identifiers: Vec<Regex>,
    section_discriminators: Vec<(Regex, SectionTitle)>,
    subsection_identifiers: Vec<Regex>,
    subsections: HashMap<SectionTitle, SubsectionRules>,
    fallback: SubsectionRules,
}

fn table(
    section: SectionTitle,
    patterns: &[(&str, SubsectionTitle)],
) -> Result<(SectionTitle, SubsectionRules)> {
    let mut rules = Vec::with_capacity(patterns.len());
    for (pattern, title) in patterns {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        rules.push((regex, *title));
    }
    Ok((
        section,
        SubsectionRules {
            rules,
            default: section.default_subsection(),
        },
    ))
}

impl SigmaAldrichRules {
    pub fn new() -> Result<Self> {
        use SectionTitle as Sec;
        use SubsectionTitle as Sub;

        let mut section_discriminators = Vec::with_capacity(16);
        for title in Sec::ALL {
            if let Some(n) = title.number() {
                section_discriminators.push((Regex::new(&format!(r"SECTION\s{n}\D"))?, *title));
            }
        }

        let tables = vec![
            table(
                Sec::Identification,
                &[
                    (r"Product\sidentifiers", Sub::GhsProductIdentifier),
                    (r"Relevant\sidentified\suses", Sub::RecommendedUseAndRestrictions),
                    (r"Details\sof\sthe\ssupplier", Sub::SupplierDetails),
                    (r"Emergency\stelephone", Sub::EmergencyPhoneNumber),
                ],
            )?,
            table(
                Sec::Hazards,
                &[
                    (r"Classification\sof\sthe\ssubstance", Sub::GhsSubstanceClassification),
                    (r"GHS\sLabel\selements", Sub::GhsLabelElements),
                    (r"Hazards\snot\sotherwise\sclassified", Sub::OtherHazards),
                ],
            )?,
            table(Sec::Composition, &[(r"Mixtures", Sub::MixtureIngredients)])?,
            table(
                Sec::FirstAid,
                &[
                    (r"Description\sof", Sub::FirstAidMeasures),
                    (r"Most\simportant\ssymptoms", Sub::SymptomsAndEffects),
                    (r"Indication\sof\sany\simmediate", Sub::IndicationMedicalTreatment),
                ],
            )?,
            table(
                Sec::FireFighting,
                &[
                    (r"Extinguishing\smedia", Sub::ExtinguishingMedia),
                    (r"Special\shazards", Sub::SpecialHazards),
                    (r"Advice\sfor\sfirefighters", Sub::FirefighterEquipmentPrecautions),
                ],
            )?,
            table(
                Sec::AccidentalRelease,
                &[
                    (r"Personal\sprecautions", Sub::PrecautionsEquipmentProcedures),
                    (r"Environmental\sprecautions", Sub::EnvironmentalPrecautions),
                    (r"Methods\sand\smaterials", Sub::ContainmentCleanup),
                ],
            )?,
            table(
                Sec::HandlingAndStorage,
                &[
                    (r"Precautions\sfor\ssafe\shandling", Sub::HandlingPrecautions),
                    (r"Conditions\sfor\ssafe\sstorage", Sub::SafeStorageConditions),
                ],
            )?,
            table(Sec::ExposureControl, &[(r"Control\sparameters", Sub::ControlParameters)])?,
            table(Sec::PhysicalAndChemical, &[])?,
            table(
                Sec::StabilityAndReactivity,
                &[
                    (r"Reactivity", Sub::Reactivity),
                    (r"Chemical\sstability", Sub::ChemicalStability),
                    (r"Possibility\sof\shazardous\sreactions", Sub::HazardousReactions),
                    (r"Conditions\sto\savoid", Sub::ConditionsToAvoid),
                    (r"Incompatible\smaterials", Sub::IncompatibleMaterials),
                    (r"Hazardous\sdecomposition", Sub::DecompositionProducts),
                ],
            )?,
            table(
                Sec::Toxicological,
                &[(r"toxicological\seffects", Sub::ToxicologicalCharacteristics)],
            )?,
            table(
                Sec::Ecological,
                &[
                    (r"Toxicity", Sub::Ecotoxicity),
                    (r"Persistence\sand\sdegradability", Sub::PersistenceDegradability),
                    (r"Bioaccumulative", Sub::BioaccumulativePotential),
                    (r"Mobility\sin\ssoil", Sub::MobilityInSoil),
                    (r"Other\sadverse\seffects", Sub::EcoOtherAdverseEffects),
                ],
            )?,
            table(Sec::Disposal, &[])?,
            table(Sec::Transport, &[])?,
            table(Sec::Regulatory, &[])?,
            table(Sec::Other, &[])?,
            table(Sec::Unknown, &[])?,
        ];

        Ok(Self {
            section_identifiers: vec![Regex::new(r"([A-Z])+\s+\d?\d?:\s+[\w\s]+")?],
            section_discriminators,
            subsection_identifiers: vec![Regex::new(r"(^\d?\d\.\d)\s+[\w\s]+$")?],
            subsections: tables.into_iter().collect(),
            fallback: SubsectionRules::default_only(Sec::Unknown),
        })
    }
}

impl SdsRules for SigmaAldrichRules {
    fn section_identifiers(&self) -> &[Regex] {
        &self.section_identifiers
    }

    fn section_discriminators(&self) -> &[(Regex, SectionTitle)] {
        &self.section_discriminators
    }

    fn subsection_identifiers(&self) -> &[Regex] {
        &self.subsection_identifiers
    }

    fn subsection_rules(&self, section: SectionTitle) -> &SubsectionRules {
        self.subsections.get(&section).unwrap_or(&self.fallback)
    }

    fn name(&self) -> &str {
        "sigma_aldrich"
    }
}
