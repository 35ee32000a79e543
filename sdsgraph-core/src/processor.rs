use crate::cache::{DocumentCacheKey, DocumentCacheValue};
use crate::config::ParsingConfig;
use crate::fields::FieldTable;
use crate::ghs::Document;
use crate::layout::{JsonLayoutSource, Layout, LayoutSource};
use crate::parser::{parser_for, SdsParser};
use crate::storage::{calculate_config_hash, calculate_layout_hash, DocumentStorage, FileStorage, NoOpStorage};
use anyhow::{anyhow, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

/// Wall-clock timings per pipeline step, printed as a table at the end of a run.
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        debug!(step = step_name, elapsed_ms = elapsed.as_millis() as u64, "pipeline step finished");
        println!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());
        self.timings.push((step_name.to_string(), elapsed));

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            println!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        println!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

pub struct DocumentProcessor {
    source: Box<dyn LayoutSource>,
    storage: Box<dyn DocumentStorage + Send + Sync>,
    /// Parser built for the config with this hash
    parser: Option<(String, Box<dyn SdsParser>)>,
}

impl DocumentProcessor {
    /// Create DocumentProcessor with full dependency injection
    pub fn new_with_dependencies(
        source: Box<dyn LayoutSource>,
        storage: Box<dyn DocumentStorage + Send + Sync>,
    ) -> Result<Self> {
        Ok(Self {
            source,
            storage,
            parser: None,
        })
    }

    /// Convenience constructor for CLI usage: JSON layout dumps, file cache
    pub fn new_cli(cache_dir: &str) -> Result<Self> {
        let source = Box::new(JsonLayoutSource::new());
        let storage = Box::new(FileStorage::new(cache_dir)?);
        Self::new_with_dependencies(source, storage)
    }

    /// JSON layout dumps without any caching
    pub fn new_uncached() -> Result<Self> {
        Self::new_with_dependencies(Box::new(JsonLayoutSource::new()), Box::new(NoOpStorage::new()))
    }

    fn parser(&mut self, config: &ParsingConfig, config_hash: &str) -> Result<&dyn SdsParser> {
        let stale = self
            .parser
            .as_ref()
            .map_or(true, |(hash, _)| hash != config_hash);
        if stale {
            self.parser = Some((config_hash.to_string(), parser_for(config)?));
        }
        match &self.parser {
            Some((_, parser)) => Ok(parser.as_ref()),
            None => Err(anyhow!("no parser for supplier {}", config.supplier)),
        }
    }

    /// Process document with specific config and profiling
    /// Layout dump + Config → Document, with the result cache in between
    pub fn process_document_with_config_and_profiling(
        &mut self,
        input_path: &str,
        config: &ParsingConfig,
        enable_profiling: bool,
        skip_cache: bool,
    ) -> Result<Document> {
        let start_time = Instant::now();
        let mut profiler = StepProfiler::new(enable_profiling);

        let layout_bytes = std::fs::read(input_path)?;
        let (config_hash, cache_key) = profiler.time_step("Cache Key Generation", || {
            let config_hash = calculate_config_hash(config)?;
            let cache_key = DocumentCacheKey::new(calculate_layout_hash(&layout_bytes), config_hash.clone());
            Ok::<(String, DocumentCacheKey), anyhow::Error>((config_hash, cache_key))
        })?;

        let cached_result = if skip_cache {
            println!("🚫 Skipping cache lookup (--skip-cache enabled)");
            None
        } else {
            profiler.time_step("Cache Lookup", || self.storage.get_document(&cache_key))?
        };

        if let Some(cached) = cached_result {
            println!("🎯 Cache hit: Found document for layout + config combination");
            profiler.print_summary();
            println!(
                "⏱️  Total processing time: {:.0}ms (cached)",
                start_time.elapsed().as_millis()
            );
            return Ok(cached.document);
        }

        println!("📄 Processing document with config: {}", input_path);

        let layout = profiler.time_step("1. Layout Parse", || {
            self.source
                .parse_layout(&layout_bytes)
                .map(|layout| layout.with_name_from_path(Path::new(input_path)))
        })?;
        let document = self.run_pipeline(&layout, config, &config_hash, &mut profiler)?;

        if !skip_cache {
            profiler.time_step("Cache Storage", || {
                let processing_time = start_time.elapsed().as_millis() as u64;
                let cache_value = DocumentCacheValue::new(document.clone(), processing_time);
                self.storage.store_document(&cache_key, &cache_value)
            })?;
        } else {
            println!("🚫 Skipping cache storage (--skip-cache enabled)");
        }

        profiler.print_summary();
        println!(
            "⏱️  Total processing time: {:.0}ms",
            start_time.elapsed().as_millis()
        );
        Ok(document)
    }

    /// Process document with specific config, cache enabled, no profiling
    pub fn process_document_with_config(
        &mut self,
        input_path: &str,
        config: &ParsingConfig,
    ) -> Result<Document> {
        self.process_document_with_config_and_profiling(input_path, config, false, false)
    }

    /// Run the pipeline over an in-memory layout; bypasses the cache
    pub fn process_layout(&mut self, layout: &Layout, config: &ParsingConfig) -> Result<Document> {
        let config_hash = calculate_config_hash(config)?;
        self.run_pipeline(layout, config, &config_hash, &mut StepProfiler::new(false))
    }

    fn run_pipeline(
        &mut self,
        layout: &Layout,
        config: &ParsingConfig,
        config_hash: &str,
        profiler: &mut StepProfiler,
    ) -> Result<Document> {
        let parser = self.parser(config, config_hash)?;

        let mut tree = profiler.time_step("2. Hierarchy Build", || parser.parse_to_hierarchy(layout))?;
        let injections = profiler.time_step("3. Injection Collection", || parser.collect_injections(layout))?;
        let report = profiler.time_step("4. Injection Merge", || parser.merge(&mut tree, &injections))?;
        if report.fallbacks > 0 {
            println!(
                "⚠️  {} injected payload(s) had no anchor and were appended to the last section",
                report.fallbacks
            );
        }
        let document = profiler.time_step("5. Assembly", || parser.assemble(&tree, layout, &injections));

        println!(
            "📋 {} sections, {} pictograms, {} nodes replaced",
            document.sections.len(),
            document.pictograms.len(),
            report.deleted.len()
        );
        Ok(document)
    }

    /// Evaluate the supplier's whole field catalogue against a document
    pub fn extract_fields(&mut self, document: &Document, config: &ParsingConfig) -> Result<FieldTable> {
        let config_hash = calculate_config_hash(config)?;
        let parser = self.parser(config, &config_hash)?;
        Ok(parser.field_mapper().map_all(document)?)
    }

    /// Simple document processing function using default config
    pub fn process_document(&mut self, input_path: &str) -> Result<Document> {
        let default_config = ParsingConfig::default();
        self.process_document_with_config(input_path, &default_config)
    }

    /// Process document with config loaded from file
    pub fn process_document_with_config_file(
        &mut self,
        input_path: &str,
        config_path: &str,
    ) -> Result<Document> {
        let config = ParsingConfig::load_from_file(config_path)?;
        self.process_document_with_config(input_path, &config)
    }
}
