//! Per-scenario execution context

use std::sync::Arc;

use cinebook_common::{RandomSelector, TemporalNormalizer};

use crate::api::BookingApi;
use crate::config::SamplingConfig;
use crate::index::ResourceIndexBuilder;
use crate::sampler::ConstraintSampler;
use crate::verify::VerificationAggregator;

/// Everything one scenario execution owns. Never shared between scenarios.
pub struct ScenarioContext {
    name: String,
    api: Arc<dyn BookingApi>,
    selector: RandomSelector,
    normalizer: TemporalNormalizer,
    sampling: SamplingConfig,
    checks: VerificationAggregator,
}

impl ScenarioContext {
    pub fn new(
        name: impl Into<String>,
        api: Arc<dyn BookingApi>,
        selector: RandomSelector,
        sampling: SamplingConfig,
        checks: VerificationAggregator,
    ) -> Self {
        Self {
            name: name.into(),
            api,
            selector,
            normalizer: TemporalNormalizer::new(),
            sampling,
            checks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn api(&self) -> Arc<dyn BookingApi> {
        self.api.clone()
    }

    /// Fresh index builder over this scenario's provider
    pub fn index(&self) -> ResourceIndexBuilder {
        ResourceIndexBuilder::new(self.api.clone())
    }

    pub fn sampler(&mut self) -> ConstraintSampler<'_> {
        ConstraintSampler::new(&mut self.selector)
    }

    pub fn selector(&mut self) -> &mut RandomSelector {
        &mut self.selector
    }

    pub fn normalizer(&self) -> TemporalNormalizer {
        self.normalizer
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    pub fn checks(&mut self) -> &mut VerificationAggregator {
        &mut self.checks
    }

    /// Hand the aggregator back for flushing at scenario end
    pub fn into_checks(self) -> VerificationAggregator {
        self.checks
    }
}
