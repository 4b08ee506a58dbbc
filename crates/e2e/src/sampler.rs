//! Constraint-satisfying random sampling with single-step threshold relaxation
//!
//! A pass shuffles the population and walks it, evaluating the predicate one
//! candidate at a time until enough matches are found. If a strict pass finds
//! nothing and the threshold is above 1, exactly one more pass runs at
//! threshold 1. There is no gradual back-off through intermediate values.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use cinebook_common::RandomSelector;

use crate::api::BookingApi;
use crate::error::{E2eError, E2eResult};
use crate::index::ResourceIndexBuilder;

/// Threshold used by the relaxed pass
pub const RELAXED_THRESHOLD: u32 = 1;

/// Supplies the candidate ids for a sampling pass
#[async_trait]
pub trait PopulationSource: Send + Sync {
    async fn fetch_population(&self) -> E2eResult<Vec<String>>;
}

/// Decides whether a candidate satisfies "at least `threshold`"
#[async_trait]
pub trait CandidatePredicate: Send + Sync {
    async fn matches(&self, id: &str, threshold: u32) -> E2eResult<bool>;
}

#[async_trait]
impl PopulationSource for Vec<String> {
    async fn fetch_population(&self) -> E2eResult<Vec<String>> {
        Ok(self.clone())
    }
}

#[async_trait]
impl<F> CandidatePredicate for F
where
    F: Fn(&str, u32) -> bool + Send + Sync,
{
    async fn matches(&self, id: &str, threshold: u32) -> E2eResult<bool> {
        Ok(self(id, threshold))
    }
}

/// All showtime ids currently reachable in the booking hierarchy
pub struct ShowtimePopulation {
    index: ResourceIndexBuilder,
}

impl ShowtimePopulation {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        Self {
            index: ResourceIndexBuilder::new(api),
        }
    }
}

#[async_trait]
impl PopulationSource for ShowtimePopulation {
    async fn fetch_population(&self) -> E2eResult<Vec<String>> {
        Ok(self.index.showtime_ids().await?.into_iter().collect())
    }
}

/// A showtime has at least `threshold` unreserved seats
pub struct SeatAvailability {
    api: Arc<dyn BookingApi>,
}

impl SeatAvailability {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CandidatePredicate for SeatAvailability {
    async fn matches(&self, id: &str, threshold: u32) -> E2eResult<bool> {
        match self.api.fetch_showtime_detail(id).await {
            Ok(detail) => {
                let available = detail.available_seats();
                debug!("Showtime {} has {} free seat(s), need {}", id, available, threshold);
                Ok(available >= threshold as usize)
            }
            // Removed by a concurrent booking or schedule change since the index was built
            Err(e) if e.is_not_found() => {
                debug!("Showtime {} vanished before evaluation", id);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

/// Outcome of a sampling call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleReport {
    pub ids: Vec<String>,
    pub requested: usize,
    pub threshold_used: u32,
    pub relaxed: bool,
    /// Predicate evaluations across all passes
    pub evaluated: usize,
}

impl SampleReport {
    pub fn is_partial(&self) -> bool {
        self.ids.len() < self.requested
    }
}

/// Samples entities that satisfy a threshold predicate
pub struct ConstraintSampler<'a> {
    selector: &'a mut RandomSelector,
}

impl<'a> ConstraintSampler<'a> {
    pub fn new(selector: &'a mut RandomSelector) -> Self {
        Self { selector }
    }

    /// Up to `count` ids satisfying `predicate` at `threshold`, relaxing once to 1
    pub async fn sample<S, P>(
        &mut self,
        source: &S,
        predicate: &P,
        threshold: u32,
        count: usize,
    ) -> E2eResult<Vec<String>>
    where
        S: PopulationSource + ?Sized,
        P: CandidatePredicate + ?Sized,
    {
        Ok(self
            .sample_with_report(source, predicate, threshold, count)
            .await?
            .ids)
    }

    /// Exactly one matching id
    pub async fn sample_one<S, P>(
        &mut self,
        source: &S,
        predicate: &P,
        threshold: u32,
    ) -> E2eResult<String>
    where
        S: PopulationSource + ?Sized,
        P: CandidatePredicate + ?Sized,
    {
        let ids = self.sample(source, predicate, threshold, 1).await?;
        ids.into_iter().next().ok_or(E2eError::NoMatch {
            threshold,
            relaxed_to: None,
        })
    }

    pub async fn sample_with_report<S, P>(
        &mut self,
        source: &S,
        predicate: &P,
        threshold: u32,
        count: usize,
    ) -> E2eResult<SampleReport>
    where
        S: PopulationSource + ?Sized,
        P: CandidatePredicate + ?Sized,
    {
        if count == 0 {
            return Ok(SampleReport {
                ids: Vec::new(),
                requested: 0,
                threshold_used: threshold,
                relaxed: false,
                evaluated: 0,
            });
        }

        let (mut ids, mut evaluated) = self.run_pass(source, predicate, threshold, count).await?;
        let mut threshold_used = threshold;
        let mut relaxed = false;

        if ids.is_empty() && threshold > RELAXED_THRESHOLD {
            warn!(
                "No candidate satisfied threshold {}; retrying once at {}",
                threshold, RELAXED_THRESHOLD
            );
            let (retry_ids, retry_evaluated) = self
                .run_pass(source, predicate, RELAXED_THRESHOLD, count)
                .await?;
            ids = retry_ids;
            evaluated += retry_evaluated;
            threshold_used = RELAXED_THRESHOLD;
            relaxed = true;
        }

        if ids.is_empty() {
            return Err(E2eError::NoMatch {
                threshold,
                relaxed_to: relaxed.then_some(RELAXED_THRESHOLD),
            });
        }

        if ids.len() < count {
            warn!(
                "Found {} of {} requested entities at threshold {}",
                ids.len(),
                count,
                threshold_used
            );
        } else {
            info!(
                "Sampled {} entities at threshold {} ({} evaluated)",
                ids.len(),
                threshold_used,
                evaluated
            );
        }

        Ok(SampleReport {
            ids,
            requested: count,
            threshold_used,
            relaxed,
            evaluated,
        })
    }

    /// One shuffled, short-circuiting walk over a freshly fetched, deduplicated population
    async fn run_pass<S, P>(
        &mut self,
        source: &S,
        predicate: &P,
        threshold: u32,
        count: usize,
    ) -> E2eResult<(Vec<String>, usize)>
    where
        S: PopulationSource + ?Sized,
        P: CandidatePredicate + ?Sized,
    {
        let unique: BTreeSet<String> = source.fetch_population().await?.into_iter().collect();
        let mut candidates: Vec<String> = unique.into_iter().collect();
        self.selector.shuffle(&mut candidates);
        debug!(
            "Evaluating up to {} candidate(s) at threshold {}",
            candidates.len(),
            threshold
        );

        let mut matched = Vec::with_capacity(count);
        let mut evaluated = 0;
        for id in candidates {
            if matched.len() >= count {
                break;
            }
            evaluated += 1;
            if predicate.matches(&id, threshold).await? {
                matched.push(id);
            }
        }
        Ok((matched, evaluated))
    }
}
