//! Built-in scenarios reconciling listings, seat maps and showtime details

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::context::ScenarioContext;
use crate::error::E2eResult;
use crate::runner::Scenario;
use crate::sampler::{SeatAvailability, ShowtimePopulation};

/// Sampled showtimes show the same movie, cinema and time in the listing and the detail view
pub struct ShowtimeDetailConsistency;

#[async_trait]
impl Scenario for ShowtimeDetailConsistency {
    fn name(&self) -> &str {
        "showtime-detail-consistency"
    }

    fn tags(&self) -> &[&'static str] {
        &["smoke", "showtimes"]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        let catalog = ctx.index().showtime_catalog().await?;
        let population: Vec<String> = catalog.keys().cloned().collect();
        let predicate = SeatAvailability::new(ctx.api());
        let threshold = ctx.sampling().min_free_seats;
        let count = ctx.sampling().sample_size;

        let ids = ctx.sampler().sample(&population, &predicate, threshold, count).await?;
        info!("Checking {} showtime(s): {:?}", ids.len(), ids);

        let normalizer = ctx.normalizer();
        for id in ids {
            let Some(listing) = catalog.get(&id) else {
                continue;
            };
            let detail = match ctx.api().fetch_showtime_detail(&id).await {
                Ok(detail) => detail,
                Err(e) if e.is_not_found() => {
                    ctx.checks()
                        .record_boolean(false, &format!("showtime {} still exists", id))
                        .await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let listed = normalizer.normalize(&listing.date_time)?;
            let shown = normalizer.normalize(&detail.date_time)?;
            ctx.checks()
                .record_equals(&shown, &listed, &format!("showtime {} date-time", id))
                .await;
            ctx.checks()
                .record_equals(
                    detail.movie_title.trim(),
                    listing.movie_title.trim(),
                    &format!("showtime {} movie title", id),
                )
                .await;
            ctx.checks()
                .record_equals(
                    detail.cinema_name.trim(),
                    listing.branch_name.trim(),
                    &format!("showtime {} cinema name", id),
                )
                .await;
        }
        Ok(())
    }
}

/// A sampled seat map has unique, non-empty seat codes and some free seats
pub struct SeatMapIntegrity;

#[async_trait]
impl Scenario for SeatMapIntegrity {
    fn name(&self) -> &str {
        "seat-map-integrity"
    }

    fn tags(&self) -> &[&'static str] {
        &["seats"]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        let population = ShowtimePopulation::new(ctx.api());
        let predicate = SeatAvailability::new(ctx.api());
        let threshold = ctx.sampling().min_free_seats;

        let id = ctx.sampler().sample_one(&population, &predicate, threshold).await?;
        let detail = ctx.api().fetch_showtime_detail(&id).await?;

        let codes: Vec<&str> = detail.seats.iter().map(|s| s.code.trim()).collect();
        let unique: BTreeSet<&str> = codes.iter().copied().collect();

        ctx.checks()
            .record_boolean(!codes.is_empty(), &format!("showtime {} has a seat map", id))
            .await;
        ctx.checks()
            .record_boolean(
                codes.iter().all(|c| !c.is_empty()),
                &format!("showtime {} seat codes are non-empty", id),
            )
            .await;
        ctx.checks()
            .record_equals(
                &unique.len(),
                &codes.len(),
                &format!("showtime {} seat codes are unique", id),
            )
            .await;
        // Another run may have booked the last seats since sampling
        ctx.checks()
            .record_boolean(
                detail.available_seats() >= 1,
                &format!("showtime {} still has free seats", id),
            )
            .await;
        Ok(())
    }
}

/// Every listed movie has a title and every showtime label is a recognizable date-time
pub struct CatalogLabels;

#[async_trait]
impl Scenario for CatalogLabels {
    fn name(&self) -> &str {
        "catalog-labels"
    }

    fn tags(&self) -> &[&'static str] {
        &["smoke"]
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        let index = ctx.index();
        let movies = index.movie_index().await?;
        let branches = index.branch_index().await?;
        let showtimes = index.showtime_index().await?;

        ctx.checks()
            .record_boolean(!movies.is_empty(), "movie catalog is not empty")
            .await;
        ctx.checks()
            .record_boolean(!branches.is_empty(), "at least one cinema branch screens a movie")
            .await;

        for (id, title) in movies.iter() {
            ctx.checks()
                .record_boolean(!title.trim().is_empty(), &format!("movie {} has a title", id))
                .await;
        }

        let normalizer = ctx.normalizer();
        for (id, label) in showtimes.iter() {
            ctx.checks()
                .record_boolean(
                    normalizer.try_normalize(label).is_some(),
                    &format!("showtime {} date-time '{}' is recognized", id, label),
                )
                .await;
        }
        Ok(())
    }
}

/// Every scenario shipped with the suite
pub fn builtin() -> Vec<Arc<dyn Scenario>> {
    vec![
        Arc::new(ShowtimeDetailConsistency),
        Arc::new(SeatMapIntegrity),
        Arc::new(CatalogLabels),
    ]
}
