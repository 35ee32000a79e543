// SDSGraph Core Library
//
// Reconstructs the logical structure of chemical safety data sheets from
// positioned layout fragments and classifies it against the GHS taxonomy.
// Main interface for converting layout dumps to GHS documents and fields.

#[macro_use]
mod macros;

pub mod types;
pub mod error;
pub mod config;
pub mod ghs;
pub mod layout;
pub mod hierarchy;
pub mod rules;
pub mod injection;
pub mod assembler;
pub mod fields;
pub mod parser;
pub mod processor;
pub mod cache;
pub mod storage;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::{Result, SdsError};
pub use config::{ConfigManager, ParsingConfig};
pub use ghs::{Document, Item, ItemData, ItemType, Pictogram, Section, SectionTitle, Subsection, SubsectionTitle};
pub use layout::{JsonLayoutSource, Layout, LayoutSource};
pub use hierarchy::{HierarchyBuilder, HierarchyTree};
pub use rules::{SdsRules, SigmaAldrichRules};
pub use injection::{Injection, InjectionBox, Injector, OverwriteMode};
pub use fields::{FieldMapper, FieldName, FieldTable, FieldValue};
pub use parser::{parser_for, SdsParser, SigmaAldrichParser};
pub use processor::DocumentProcessor;
