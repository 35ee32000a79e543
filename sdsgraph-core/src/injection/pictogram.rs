use super::{Injections, Injector};
use crate::config::PictogramConfig;
use crate::error::Result;
use crate::ghs::Pictogram;
use crate::layout::Layout;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One template-match result reported by the pictogram-detection collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictogramDetection {
    pub id: Pictogram,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PictogramInjector {
    config: PictogramConfig,
}

impl PictogramInjector {
    pub fn new(config: PictogramConfig) -> Self {
        Self { config }
    }
}

impl Injector for PictogramInjector {
    fn name(&self) -> &str {
        "pictograms"
    }

    fn generate_injections(&self, layout: &Layout) -> Result<Injections> {
        let mut injections = Injections::default();
        if !self.config.enabled {
            return Ok(injections);
        }
        for detection in &layout.pictograms {
            if detection.confidence > self.config.confidence_threshold {
                injections.pictograms.push(detection.id);
            } else {
                debug!(
                    "discarding {} at confidence {:.3}",
                    detection.id, detection.confidence
                );
            }
        }
        Ok(injections)
    }
}
