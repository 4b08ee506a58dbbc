//! Cinebook E2E Engine
//!
//! Sampling and reconciliation engine for end-to-end runs against the movie
//! booking application:
//! - Flattens the movie -> branch -> showtime hierarchy into deduplicated indices
//! - Samples showtimes that satisfy a seat threshold, relaxing once to 1
//! - Compares date-times from different sources in one canonical form
//! - Collects soft assertions per scenario and reports every failure at the end
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ScenarioRunner (one task each)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioContext                                            │
//! │    ├── ResourceIndexBuilder ── BookingApi (HTTP)            │
//! │    ├── ConstraintSampler ───── RandomSelector               │
//! │    │        └── SeatAvailability ── BookingApi              │
//! │    ├── TemporalNormalizer                                   │
//! │    └── VerificationAggregator ── DiagnosticSink             │
//! │                                └─ ReportSink                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod artifacts;
pub mod config;
pub mod context;
pub mod error;
pub mod index;
pub mod report;
pub mod runner;
pub mod sampler;
pub mod scenarios;
pub mod verify;

pub use api::{BookingApi, HttpBookingApi};
pub use context::ScenarioContext;
pub use error::{E2eError, E2eResult};
pub use index::ResourceIndexBuilder;
pub use runner::{Scenario, ScenarioRunner};
pub use sampler::{CandidatePredicate, ConstraintSampler, PopulationSource};
pub use verify::{VerificationAggregator, VerificationOutcome};
