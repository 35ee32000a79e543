use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use sdsgraph_core::{DocumentProcessor, ParsingConfig};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

const DOCUMENT_SUFFIX: &str = ".sds.json";
const FIELDS_SUFFIX: &str = ".fields.json";
pub const SUMMARY_FILE: &str = "batch_summary.json";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    /// None disables the result cache
    pub cache_dir: Option<String>,
    pub skip_cache: bool,
    pub profile: bool,
    pub outline: bool,
    /// Worker threads; None lets rayon decide
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub input: String,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields_output: Option<String>,
    pub sections: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub succeeded: usize,
    pub failed: usize,
    pub documents: Vec<DocumentReport>,
}

fn is_output_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with(DOCUMENT_SUFFIX) || name.ends_with(FIELDS_SUFFIX) || name == SUMMARY_FILE
}

/// Expands directories into the `*.json` layout dumps they contain (sorted,
/// not recursive). Our own output files are skipped.
pub fn collect_inputs(paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for raw in paths {
        let path = PathBuf::from(raw);
        if path.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(&path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
                .filter(|p| !is_output_file(p))
                .collect();
            found.sort();
            inputs.extend(found);
        } else if path.is_file() {
            inputs.push(path);
        } else {
            return Err(anyhow!("Input not found: {}", raw));
        }
    }
    Ok(inputs)
}

fn create_processor(options: &BatchOptions) -> Result<DocumentProcessor> {
    match &options.cache_dir {
        Some(cache_dir) => DocumentProcessor::new_cli(cache_dir),
        None => DocumentProcessor::new_uncached(),
    }
}

fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// One output name per input. Inputs sharing a file stem (same name in
/// different directories) get a `-2`, `-3`, ... suffix in input order.
fn output_stems(inputs: &[PathBuf]) -> Vec<String> {
    let mut taken: HashSet<String> = inputs.iter().map(|p| output_stem(p)).collect();
    let mut used: HashSet<String> = HashSet::new();
    let mut stems = Vec::with_capacity(inputs.len());
    for input in inputs {
        let stem = output_stem(input);
        if used.insert(stem.clone()) {
            stems.push(stem);
            continue;
        }
        let mut n = 2;
        let unique = loop {
            let candidate = format!("{stem}-{n}");
            if taken.insert(candidate.clone()) {
                break candidate;
            }
            n += 1;
        };
        warn!(
            "{} shares the output name {:?}, writing it as {:?}",
            input.display(),
            stem,
            unique
        );
        used.insert(unique.clone());
        stems.push(unique);
    }
    stems
}

fn process_one(
    processor: &mut DocumentProcessor,
    input: &Path,
    stem: &str,
    config: &ParsingConfig,
    options: &BatchOptions,
) -> Result<DocumentReport> {
    let start = Instant::now();
    let input_str = input.to_string_lossy().to_string();
    let document = processor.process_document_with_config_and_profiling(
        &input_str,
        config,
        options.profile,
        options.skip_cache,
    )?;

    if options.outline {
        println!("{document}");
    }

    let document_path = options.output_dir.join(format!("{stem}{DOCUMENT_SUFFIX}"));
    let document_output = document_path.to_string_lossy().to_string();
    document.save_to_json(&document_output, config.output.pretty)?;
    println!("💾 Document saved to: {}", document_output);

    let fields_output = if config.output.include_fields {
        let fields = processor.extract_fields(&document, config)?;
        let path = options.output_dir.join(format!("{stem}{FIELDS_SUFFIX}"));
        let json = if config.output.pretty {
            serde_json::to_string_pretty(&fields)?
        } else {
            serde_json::to_string(&fields)?
        };
        fs::write(&path, json)?;
        println!("💾 Fields saved to: {}", path.display());
        Some(path.to_string_lossy().to_string())
    } else {
        None
    };

    Ok(DocumentReport {
        input: input_str,
        status: DocumentStatus::Ok,
        document_output: Some(document_output),
        fields_output,
        sections: document.sections.len(),
        error: None,
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}

fn failure(input: &Path, error: &anyhow::Error) -> DocumentReport {
    error!("{}: {:#}", input.display(), error);
    eprintln!("❌ {} failed: {:#}", input.display(), error);
    DocumentReport {
        input: input.to_string_lossy().to_string(),
        status: DocumentStatus::Failed,
        document_output: None,
        fields_output: None,
        sections: 0,
        error: Some(format!("{error:#}")),
        elapsed_ms: 0,
    }
}

/// Processes every input in parallel. Each worker owns its processor (and so
/// its parser and injectors); a failing document is reported and the rest of
/// the batch carries on.
pub fn run_batch(inputs: &[PathBuf], config: &ParsingConfig, options: &BatchOptions) -> Result<BatchSummary> {
    fs::create_dir_all(&options.output_dir)?;
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!("batch {} starting with {} documents", run_id, inputs.len());

    let mut builder = ThreadPoolBuilder::new();
    if let Some(jobs) = options.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build()?;

    let stems = output_stems(inputs);
    let documents: Vec<DocumentReport> = pool.install(|| {
        inputs
            .par_iter()
            .zip(stems.par_iter())
            .map_init(
                || create_processor(options),
                |processor, (input, stem)| match processor {
                    Ok(processor) => process_one(processor, input, stem, config, options)
                        .unwrap_or_else(|e| failure(input, &e)),
                    Err(e) => failure(input, &anyhow!("could not create processor: {e:#}")),
                },
            )
            .collect()
    });

    let succeeded = documents
        .iter()
        .filter(|d| matches!(d.status, DocumentStatus::Ok))
        .count();
    let summary = BatchSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        succeeded,
        failed: documents.len() - succeeded,
        documents,
    };

    let summary_path = options.output_dir.join(SUMMARY_FILE);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    info!("batch {} summary written to {}", run_id, summary_path.display());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn acetone_layout() -> serde_json::Value {
        json!({
            "name": "acetone",
            "pages": [{
                "number": 1, "width": 612.0, "height": 792.0,
                "elements": [
                    {"x0": 30.0, "y0": 700.0, "x1": 400.0, "y1": 712.0, "text": "SECTION 1: Identification"},
                    {"x0": 30.0, "y0": 680.0, "x1": 400.0, "y1": 692.0, "text": "1.1 Product identifiers"},
                    {"x0": 40.0, "y0": 660.0, "x1": 200.0, "y1": 672.0, "text": "Product name"},
                    {"x0": 220.0, "y0": 660.0, "x1": 400.0, "y1": 672.0, "text": ": Acetone"}
                ]
            }]
        })
    }

    fn options(output_dir: &Path) -> BatchOptions {
        BatchOptions {
            output_dir: output_dir.to_path_buf(),
            cache_dir: None,
            skip_cache: true,
            profile: false,
            outline: false,
            jobs: Some(2),
        }
    }

    #[test]
    fn directories_expand_to_layout_dumps_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("a.sds.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let inputs = collect_inputs(&[dir.path().to_string_lossy().to_string()]).unwrap();
        let names: Vec<String> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.json", "b.json"]);

        assert!(collect_inputs(&["/nonexistent/layout.json".to_string()]).is_err());
    }

    #[test]
    fn same_named_inputs_get_distinct_outputs() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let a1 = first.path().join("a.json");
        let a2 = second.path().join("a.json");
        let taken = first.path().join("a-2.json");
        for path in [&a1, &a2, &taken] {
            fs::write(path, acetone_layout().to_string()).unwrap();
        }

        let inputs = vec![a1, a2, taken];
        assert_eq!(output_stems(&inputs), ["a", "a-3", "a-2"]);

        let summary = run_batch(&inputs, &ParsingConfig::default(), &options(output_dir.path())).unwrap();
        assert_eq!(summary.succeeded, 3);
        let outputs: HashSet<_> = summary
            .documents
            .iter()
            .map(|d| d.document_output.clone().unwrap())
            .collect();
        assert_eq!(outputs.len(), 3);
        for stem in ["a", "a-2", "a-3"] {
            assert!(output_dir.path().join(format!("{stem}{DOCUMENT_SUFFIX}")).exists());
        }
    }

    #[test]
    fn failing_documents_do_not_stop_the_batch() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let good = input_dir.path().join("acetone.json");
        let bad = input_dir.path().join("broken.json");
        fs::write(&good, acetone_layout().to_string()).unwrap();
        fs::write(&bad, "{ not a layout").unwrap();

        let config = ParsingConfig {
            output: sdsgraph_core::config::OutputConfig {
                pretty: false,
                include_fields: true,
            },
            ..ParsingConfig::default()
        };
        let summary = run_batch(&[good, bad], &config, &options(output_dir.path())).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.documents[1].error.is_some());

        let written = fs::read_to_string(output_dir.path().join("acetone.sds.json")).unwrap();
        let document: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(document["name"], "acetone");
        assert_eq!(document["sections"][0]["title"], "IDENTIFICATION");

        let fields: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(output_dir.path().join("acetone.fields.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(fields["PRODUCT_NAME"], "Acetone");
        assert_eq!(fields["META_VERSION"], serde_json::Value::Null);

        assert!(output_dir.path().join(SUMMARY_FILE).exists());
    }
}
