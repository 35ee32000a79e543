//! Supplier parsers
//!
//! A parser owns everything supplier-specific: the classification rules, the
//! field registry and its own injector collection. The pipeline itself is
//! shared and provided by the trait:
//!
//! ```text
//! Layout ──► elements ──► HierarchyTree ──► grouped by section
//!    │                                              │
//!    └──► [Injector]* ──► Injections ──► inject ────┴──► assemble ──► Document
//! ```

use crate::assembler;
use crate::config::ParsingConfig;
use crate::error::Result;
use crate::fields::{FieldMapper, SigmaAldrichFieldMapper};
use crate::ghs::Document;
use crate::hierarchy::{HierarchyBuilder, HierarchyTree};
use crate::injection::{inject, InjectionReport, Injections, Injector, PictogramInjector, TableInjector};
use crate::layout::Layout;
use crate::rules::{SdsRules, SigmaAldrichRules};
use crate::types::Supplier;
use tracing::{debug, info};

pub trait SdsParser: Send + Sync {
    /// Parser name for logging
    fn name(&self) -> &str;

    fn rules(&self) -> &dyn SdsRules;

    fn field_mapper(&self) -> &dyn FieldMapper;

    fn builder(&self) -> &HierarchyBuilder;

    fn injectors(&self) -> &[Box<dyn Injector>];

    /// Indentation tree of the layout's text, regrouped under section headers.
    fn parse_to_hierarchy(&self, layout: &Layout) -> Result<HierarchyTree> {
        let mut tree = self.builder().build(layout.positioned_elements())?;
        let rules = self.rules();
        tree.group_under_sections(|text| rules.is_section(text));
        Ok(tree)
    }

    /// Runs every injector; results are joined before anything is merged.
    fn collect_injections(&self, layout: &Layout) -> Result<Injections> {
        let mut injections = Injections::default();
        for injector in self.injectors() {
            let produced = injector.generate_injections(layout)?;
            debug!(
                "injector {}: {} spatial, {} pictograms",
                injector.name(),
                produced.spatial.len(),
                produced.pictograms.len()
            );
            injections.extend(produced);
        }
        Ok(injections)
    }

    fn merge(&self, tree: &mut HierarchyTree, injections: &Injections) -> Result<InjectionReport> {
        inject(tree, &injections.spatial, self.rules())
    }

    fn assemble(&self, tree: &HierarchyTree, layout: &Layout, injections: &Injections) -> Document {
        assembler::assemble(tree, self.rules(), layout.document_name(), &injections.pictograms)
    }

    /// Layout in, classified document out.
    fn parse(&self, layout: &Layout) -> Result<Document> {
        let mut tree = self.parse_to_hierarchy(layout)?;
        let injections = self.collect_injections(layout)?;
        self.merge(&mut tree, &injections)?;
        let document = self.assemble(&tree, layout, &injections);
        info!(
            "{}: assembled {:?} with {} sections",
            self.name(),
            document.name,
            document.sections.len()
        );
        Ok(document)
    }
}

pub struct SigmaAldrichParser {
    rules: SigmaAldrichRules,
    fields: SigmaAldrichFieldMapper,
    builder: HierarchyBuilder,
    injectors: Vec<Box<dyn Injector>>,
}

impl SigmaAldrichParser {
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        let mut parser = Self {
            rules: SigmaAldrichRules::new()?,
            fields: SigmaAldrichFieldMapper::new()?,
            builder: HierarchyBuilder::from_config(&config.hierarchy),
            injectors: Vec::new(),
        };
        if config.tables.enabled {
            parser.register_injector(Box::new(TableInjector::new(config.tables.clone())));
        }
        if config.pictograms.enabled {
            parser.register_injector(Box::new(PictogramInjector::new(config.pictograms.clone())));
        }
        Ok(parser)
    }

    pub fn register_injector(&mut self, injector: Box<dyn Injector>) {
        self.injectors.push(injector);
    }
}

impl SdsParser for SigmaAldrichParser {
    fn name(&self) -> &str {
        "sigma_aldrich"
    }

    fn rules(&self) -> &dyn SdsRules {
        &self.rules
    }

    fn field_mapper(&self) -> &dyn FieldMapper {
        &self.fields
    }

    fn builder(&self) -> &HierarchyBuilder {
        &self.builder
    }

    fn injectors(&self) -> &[Box<dyn Injector>] {
        &self.injectors
    }
}

/// A fresh parser (with fresh injectors) for the configured supplier.
pub fn parser_for(config: &ParsingConfig) -> Result<Box<dyn SdsParser>> {
    match config.supplier {
        Supplier::SigmaAldrich => Ok(Box::new(SigmaAldrichParser::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;

    #[test]
    fn parsers_build_their_own_injectors() {
        let config = ParsingConfig::default();
        let a = SigmaAldrichParser::new(&config).unwrap();
        let b = SigmaAldrichParser::new(&config).unwrap();
        let names: Vec<&str> = a.injectors().iter().map(|i| i.name()).collect();
        assert_eq!(names, ["tables", "pictograms"]);
        assert_eq!(b.injectors().len(), 2);
    }

    #[test]
    fn disabled_injectors_are_not_registered() {
        let config = ParsingConfig {
            tables: TableConfig {
                enabled: false,
                ..TableConfig::default()
            },
            ..ParsingConfig::default()
        };
        let parser = parser_for(&config).unwrap();
        assert_eq!(parser.injectors().len(), 1);
        assert_eq!(parser.name(), "sigma_aldrich");
    }
}
