//! End-to-end pipeline tests over a recorded layout dump.
//!
//! `test_fixtures/acetone_layout.json` is a two-page Sigma-Aldrich sheet with
//! footer lines, one detected exposure-limit table on page 2 and four
//! pictogram detections (one below the confidence threshold). The assertions
//! work on the serialized document, the same JSON the CLI writes.

use sdsgraph_core::config::{HierarchyConfig, ParsingConfig, PictogramConfig};
use sdsgraph_core::layout::{JsonLayoutSource, Layout, LayoutSource};
use sdsgraph_core::parser::{SdsParser, SigmaAldrichParser};
use sdsgraph_core::processor::DocumentProcessor;
use sdsgraph_core::storage::{DocumentStorage, NoOpStorage};
use sdsgraph_core::{Document, FieldName, FieldValue, SdsError};
use serde_json::{json, Value};
use std::path::PathBuf;

// ============================================================================
// Fixture helpers
// ============================================================================

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures/acetone_layout.json")
}

fn load_layout() -> Layout {
    JsonLayoutSource::new()
        .process_file(&fixture_path())
        .unwrap_or_else(|e| panic!("Invalid fixture {}: {e}", fixture_path().display()))
}

fn parse(config: &ParsingConfig) -> Document {
    let parser = SigmaAldrichParser::new(config).expect("parser");
    parser.parse(&load_layout()).expect("pipeline")
}

fn document_json() -> Value {
    parse(&ParsingConfig::default()).to_value().unwrap()
}

fn section<'a>(doc: &'a Value, title: &str) -> &'a Value {
    doc["sections"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["title"] == title)
        .unwrap_or_else(|| panic!("missing section {title}"))
}

fn subsection<'a>(section: &'a Value, title: &str) -> &'a Value {
    section["subsections"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["title"] == title)
        .unwrap_or_else(|| panic!("missing subsection {title}"))
}

fn item_names(subsection: &Value) -> Vec<&str> {
    subsection["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect()
}

// ============================================================================
// Structure: sections, subsections, items
// ============================================================================

mod structure {
    use super::*;

    #[test]
    fn sections_follow_reading_order() {
        let doc = document_json();
        let titles: Vec<&str> = doc["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["IDENTIFICATION", "HAZARDS", "COMPOSITION", "EXPOSURE_CONTROL"]);
        assert_eq!(doc["name"], "acetone_layout");
    }

    #[test]
    fn identification_subsections_are_classified() {
        let doc = document_json();
        let identification = section(&doc, "IDENTIFICATION");
        let titles: Vec<&str> = identification["subsections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["title"].as_str().unwrap())
            .collect();
        assert_eq!(
            titles,
            [
                "GHS_PRODUCT_IDENTIFIER",
                "RECOMMENDED_USE_AND_RESTRICTIONS",
                "SUPPLIER_DETAILS",
                "EMERGENCY_PHONE_NUMBER"
            ]
        );
        assert_eq!(
            identification["raw_title"],
            "SECTION 1: Identification of the substance/mixture and of the company/undertaking"
        );
    }

    #[test]
    fn label_and_value_columns_become_fields() {
        let doc = document_json();
        let identifiers = subsection(section(&doc, "IDENTIFICATION"), "GHS_PRODUCT_IDENTIFIER");
        assert_eq!(identifiers["raw_title"], "1.1 Product identifiers");
        assert_eq!(item_names(identifiers), ["Product name", "Product Number", "Brand", "CAS-No."]);
        assert_eq!(
            identifiers["items"][0],
            json!({"type": "FIELD", "name": "Product name", "data": [": Acetone"]})
        );

        let supplier = subsection(section(&doc, "IDENTIFICATION"), "SUPPLIER_DETAILS");
        assert_eq!(
            supplier["items"][0]["data"],
            json!([": Sigma-Aldrich Inc.", "3050 SPRUCE ST."])
        );
    }

    #[test]
    fn leaf_lines_become_text_items() {
        let doc = document_json();
        let classification = subsection(section(&doc, "HAZARDS"), "GHS_SUBSTANCE_CLASSIFICATION");
        assert_eq!(
            classification["items"],
            json!([
                {"type": "TEXT", "name": "Flammable liquids (Category 2), H225", "data": "Flammable liquids (Category 2), H225"},
                {"type": "TEXT", "name": "Eye irritation (Category 2A), H319", "data": "Eye irritation (Category 2A), H319"}
            ])
        );
    }

    #[test]
    fn unmatched_subsections_use_the_section_default() {
        let doc = document_json();
        let composition = section(&doc, "COMPOSITION");
        assert_eq!(composition["subsections"][0]["title"], "COMPOSITION_OTHER");
        assert_eq!(composition["subsections"][0]["raw_title"], "3.1 Substances");

        let hnoc = subsection(section(&doc, "HAZARDS"), "OTHER_HAZARDS");
        assert_eq!(hnoc["items"][0]["type"], "TEXT");
    }

    #[test]
    fn footers_and_empty_fragments_never_reach_the_document() {
        let json = parse(&ParsingConfig::default()).to_json().unwrap();
        assert!(!json.contains("Page 1 of 2"));
        assert!(!json.contains("Page 2 of 2"));
        assert!(!json.contains("Merck KGaA"));
    }

    #[test]
    fn raising_the_footer_band_cuts_content() {
        let config = ParsingConfig {
            hierarchy: HierarchyConfig {
                footer_threshold: 230.0,
                ..HierarchyConfig::default()
            },
            ..ParsingConfig::default()
        };
        let doc = parse(&config).to_value().unwrap();
        let composition = section(&doc, "COMPOSITION");
        assert_eq!(item_names(&composition["subsections"][0]), ["Formula"]);
    }

    #[test]
    fn outdenting_past_the_first_level_fails() {
        let layout: Layout = serde_json::from_value(json!({
            "pages": [{"number": 1, "height": 792.0, "elements": [
                {"x0": 30.0, "y0": 700.0, "x1": 300.0, "y1": 710.0, "text": "SECTION 1: Identification"},
                {"x0": 40.0, "y0": 680.0, "x1": 300.0, "y1": 690.0, "text": "Product name"},
                {"x0": 10.0, "y0": 660.0, "x1": 300.0, "y1": 670.0, "text": "stray margin note"}
            ]}]
        }))
        .unwrap();
        let parser = SigmaAldrichParser::new(&ParsingConfig::default()).unwrap();
        match parser.parse(&layout) {
            Err(SdsError::StructuralParse { page, text, .. }) => {
                assert_eq!(page, 1);
                assert_eq!(text, "stray margin note");
            }
            other => panic!("expected structural parse error, got {other:?}"),
        }
    }
}

// ============================================================================
// Injection: tables replace the fragments they were extracted from
// ============================================================================

mod table_injection {
    use super::*;

    #[test]
    fn table_fragments_are_replaced_by_one_table_item() {
        let parser = SigmaAldrichParser::new(&ParsingConfig::default()).unwrap();
        let layout = load_layout();
        let mut tree = parser.parse_to_hierarchy(&layout).unwrap();
        let injections = parser.collect_injections(&layout).unwrap();
        assert_eq!(injections.spatial.len(), 1);

        let report = parser.merge(&mut tree, &injections).unwrap();
        assert_eq!(report.deleted.len(), 9);
        assert!(report.deleted.iter().all(|e| e.deleted && e.page == 2));
        assert_eq!(report.placed, 1);
        assert_eq!(report.fallbacks, 0);
    }

    #[test]
    fn table_lands_under_the_line_above_it() {
        let doc = document_json();
        let parameters = subsection(section(&doc, "EXPOSURE_CONTROL"), "CONTROL_PARAMETERS");
        assert_eq!(
            parameters["items"],
            json!([
                {"type": "FIELD", "name": "Ingredients with workplace control parameters", "data": []},
                {"type": "TABLE", "name": "Table", "data": {
                    "text": "Component | CAS-No. | Value\n\
                             Acetone | 67-64-1 | TWA 250 ppm\n\
                             Acetone | 67-64-1 | STEL 500 ppm USA. ACGIH Threshold Limit Values",
                    "remarks": ["Remarks Central Nervous System impairment"]
                }}
            ])
        );

        // Content below the table keeps its own subsection
        let controls = subsection(section(&doc, "EXPOSURE_CONTROL"), "EXPOSURE_CONTROL_OTHER");
        assert_eq!(controls["raw_title"], "8.2 Exposure controls");
    }

    #[test]
    fn disabled_tables_keep_the_raw_fragments() {
        let mut config = ParsingConfig::default();
        config.tables.enabled = false;
        let doc = parse(&config).to_value().unwrap();
        let parameters = subsection(section(&doc, "EXPOSURE_CONTROL"), "CONTROL_PARAMETERS");
        let ingredients = &parameters["items"][0];
        assert_eq!(ingredients["type"], "FIELD");
        assert!(ingredients["data"]
            .as_array()
            .unwrap()
            .contains(&json!("TWA 250 ppm")));
        assert_eq!(parameters["items"].as_array().unwrap().len(), 1);
    }
}

// ============================================================================
// Pictograms
// ============================================================================

mod pictograms {
    use super::*;

    #[test]
    fn confident_detections_are_sorted_and_deduplicated() {
        let doc = document_json();
        assert_eq!(doc["pictograms"], json!(["PICT_GHS02_FLAMMABLE", "PICT_GHS07_HARMFUL"]));
    }

    #[test]
    fn threshold_is_configurable() {
        let config = ParsingConfig {
            pictograms: PictogramConfig {
                confidence_threshold: 0.4,
                ..PictogramConfig::default()
            },
            ..ParsingConfig::default()
        };
        let doc = parse(&config).to_value().unwrap();
        assert_eq!(
            doc["pictograms"],
            json!(["PICT_GHS02_FLAMMABLE", "PICT_GHS06_TOXIC", "PICT_GHS07_HARMFUL"])
        );
    }
}

// ============================================================================
// Fields
// ============================================================================

mod fields {
    use super::*;

    fn field_table() -> Value {
        let doc = parse(&ParsingConfig::default());
        let parser = SigmaAldrichParser::new(&ParsingConfig::default()).unwrap();
        serde_json::to_value(parser.field_mapper().map_all(&doc).unwrap()).unwrap()
    }

    #[test]
    fn identification_fields() {
        let fields = field_table();
        assert_eq!(fields["PRODUCT_NAME"], "Acetone");
        assert_eq!(fields["PRODUCT_NUMBER"], "179124");
        assert_eq!(fields["PRODUCT_BRAND"], "Sigma-Aldrich");
        assert_eq!(fields["CAS_NUMBER"], "67-64-1");
        assert_eq!(fields["RECOMMENDED_USE_AND_RESTRICTIONS"], "Laboratory chemicals, Synthesis of substances");
        assert_eq!(fields["SUPPLIER_TELEPHONE"], "+1 314 771-5765");
        assert_eq!(fields["EMERGENCY_TELEPHONE"], "800-424-9300 CHEMTREC (USA)");
        assert!(fields["SUPPLIER_ADDRESS"]
            .as_str()
            .unwrap()
            .starts_with("Sigma-Aldrich Inc."));
    }

    #[test]
    fn hazard_fields() {
        let fields = field_table();
        assert_eq!(
            fields["SUBSTANCE_CLASSIFICATION"],
            "Flammable liquids (Category 2), H225\nEye irritation (Category 2A), H319"
        );
        assert_eq!(fields["SIGNAL_WORD"], "Danger");
        assert_eq!(
            fields["HAZARD_STATEMENT"],
            json!(["H225 Highly flammable liquid and vapour.", "H319 Causes serious eye irritation."])
        );
        assert_eq!(fields["PRECAUTIONARY_STATEMENT"], json!(["P210 Keep away from heat."]));
        assert_eq!(fields["PICTOGRAM"], json!(["PICT_GHS02_FLAMMABLE", "PICT_GHS07_HARMFUL"]));
        assert_eq!(fields["HNOC_HAZARD"][0]["name"], "Repeated exposure may cause skin dryness or cracking.");
    }

    #[test]
    fn missing_paths_are_null_not_errors() {
        let fields = field_table();
        assert_eq!(fields["SUPPLIER_FAX"], Value::Null);
        assert_eq!(fields["IDENTIFICATION_OTHER"], Value::Null);
        assert_eq!(fields["META_VERSION"], Value::Null);
        assert_eq!(fields.as_object().unwrap().len(), 19);
    }

    #[test]
    fn single_field_lookup() {
        let doc = parse(&ParsingConfig::default());
        let parser = SigmaAldrichParser::new(&ParsingConfig::default()).unwrap();
        let value = doc.to_value().unwrap();
        assert_eq!(
            parser.field_mapper().get_field(FieldName::CasNumber, &value),
            FieldValue::Text("67-64-1".into())
        );
    }
}

// ============================================================================
// Outline rendering
// ============================================================================

mod outline {
    use super::*;

    #[test]
    fn outline_lists_name_pictograms_and_sections() {
        let outline = parse(&ParsingConfig::default()).to_string();
        let mut lines = outline.lines();
        assert_eq!(lines.next(), Some("GHS Rev. 9, 2021 SDS Document"));
        assert_eq!(lines.next(), Some("Name: acetone_layout"));
        assert_eq!(
            lines.next(),
            Some("Pictograms: PICT_GHS02_FLAMMABLE, PICT_GHS07_HARMFUL")
        );
        assert!(outline.contains("|-Section IDENTIFICATION:"));
        assert!(outline.contains("| |-Subsection GHS_PRODUCT_IDENTIFIER:"));
    }
}

// ============================================================================
// Processor and result cache
// ============================================================================

mod processor {
    use super::*;

    #[test]
    fn second_run_is_served_from_the_cache() {
        let cache_dir = tempfile::tempdir().unwrap();
        let cache_path = cache_dir.path().to_string_lossy().to_string();
        let input = fixture_path().to_string_lossy().to_string();
        let config = ParsingConfig::default();

        let mut processor = DocumentProcessor::new_cli(&cache_path).unwrap();
        let first = processor.process_document_with_config(&input, &config).unwrap();

        let cached: Vec<_> = std::fs::read_dir(cache_dir.path().join("documents"))
            .unwrap()
            .collect();
        assert_eq!(cached.len(), 1);

        let mut fresh = DocumentProcessor::new_cli(&cache_path).unwrap();
        let second = fresh.process_document_with_config(&input, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn config_changes_miss_the_cache() {
        let cache_dir = tempfile::tempdir().unwrap();
        let cache_path = cache_dir.path().to_string_lossy().to_string();
        let input = fixture_path().to_string_lossy().to_string();

        let mut processor = DocumentProcessor::new_cli(&cache_path).unwrap();
        processor
            .process_document_with_config(&input, &ParsingConfig::default())
            .unwrap();
        let mut no_tables = ParsingConfig::default();
        no_tables.tables.enabled = false;
        processor.process_document_with_config(&input, &no_tables).unwrap();

        let entries = std::fs::read_dir(cache_dir.path().join("documents")).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn skip_cache_writes_nothing() {
        let cache_dir = tempfile::tempdir().unwrap();
        let cache_path = cache_dir.path().to_string_lossy().to_string();
        let input = fixture_path().to_string_lossy().to_string();

        let mut processor = DocumentProcessor::new_cli(&cache_path).unwrap();
        processor
            .process_document_with_config_and_profiling(&input, &ParsingConfig::default(), true, true)
            .unwrap();
        let entries = std::fs::read_dir(cache_dir.path().join("documents")).unwrap().count();
        assert_eq!(entries, 0);
    }

    #[test]
    fn in_memory_layouts_bypass_the_cache() {
        let mut processor = DocumentProcessor::new_with_dependencies(
            Box::new(JsonLayoutSource::new()),
            Box::new(NoOpStorage::new()),
        )
        .unwrap();
        let mut layout = load_layout();
        layout.name = None;
        let doc = processor.process_layout(&layout, &ParsingConfig::default()).unwrap();
        assert_eq!(doc.name, "default");

        let fields = processor.extract_fields(&doc, &ParsingConfig::default()).unwrap();
        assert_eq!(fields[&FieldName::ProductName], FieldValue::Text("Acetone".into()));
    }

    #[test]
    fn noop_storage_never_hits() {
        let storage = NoOpStorage::new();
        let key = sdsgraph_core::cache::DocumentCacheKey::new("layout".into(), "config".into());
        assert!(storage.get_document(&key).unwrap().is_none());
    }
}
