//! Flattened, deduplicated indices over the movie -> branch -> showtime hierarchy
//!
//! Every call walks the remote hierarchy again; nothing is cached, so an index
//! always reflects the booking backend at the time of the call. A failed fetch
//! for any parent aborts the whole traversal.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

use cinebook_common::{BranchShowtimes, IdentifierIndex, MovieRef, ShowtimeListing};

use crate::api::BookingApi;
use crate::error::E2eResult;

pub struct ResourceIndexBuilder {
    api: Arc<dyn BookingApi>,
}

impl ResourceIndexBuilder {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        Self { api }
    }

    /// Movie id -> title
    pub async fn movie_index(&self) -> E2eResult<IdentifierIndex> {
        let movies = self.api.fetch_movies().await?;
        Ok(movies.into_iter().map(|m| (m.id, m.title)).collect())
    }

    /// Branch id -> name, across every movie
    pub async fn branch_index(&self) -> E2eResult<IdentifierIndex> {
        let mut index = IdentifierIndex::new();
        for (_, branches) in self.walk().await? {
            for node in branches {
                index.insert(node.branch.id, node.branch.name);
            }
        }
        debug!("Branch index: {} unique branch(es)", index.len());
        Ok(index)
    }

    /// Every showtime id reachable from any movie and branch
    pub async fn showtime_ids(&self) -> E2eResult<BTreeSet<String>> {
        let mut ids = BTreeSet::new();
        for (_, branches) in self.walk().await? {
            for node in branches {
                ids.extend(node.showtimes.into_iter().map(|s| s.id));
            }
        }
        debug!("Showtime index: {} unique showtime(s)", ids.len());
        Ok(ids)
    }

    /// Showtime id -> raw date-time label
    pub async fn showtime_index(&self) -> E2eResult<IdentifierIndex> {
        let mut index = IdentifierIndex::new();
        for (_, branches) in self.walk().await? {
            for node in branches {
                for showtime in node.showtimes {
                    index.insert(showtime.id, showtime.date_time);
                }
            }
        }
        Ok(index)
    }

    /// Showtime id -> where it was first reached in the hierarchy
    pub async fn showtime_catalog(&self) -> E2eResult<BTreeMap<String, ShowtimeListing>> {
        let mut catalog = BTreeMap::new();
        for (movie, branches) in self.walk().await? {
            for node in branches {
                for showtime in node.showtimes {
                    catalog
                        .entry(showtime.id.clone())
                        .or_insert_with(|| ShowtimeListing {
                            showtime_id: showtime.id,
                            movie_id: movie.id.clone(),
                            movie_title: movie.title.clone(),
                            branch_id: node.branch.id.clone(),
                            branch_name: node.branch.name.clone(),
                            date_time: showtime.date_time,
                        });
                }
            }
        }
        Ok(catalog)
    }

    /// Showtime ids screened for one movie, across its branches
    pub async fn showtimes_for_movie(&self, movie_id: &str) -> E2eResult<BTreeSet<String>> {
        let branches = self.api.fetch_showtimes_for_movie(movie_id).await?;
        Ok(branches
            .into_iter()
            .flat_map(|node| node.showtimes.into_iter().map(|s| s.id))
            .collect())
    }

    /// Fetch every movie and its branch/showtime tree, one movie at a time
    async fn walk(&self) -> E2eResult<Vec<(MovieRef, Vec<BranchShowtimes>)>> {
        let movies = self.api.fetch_movies().await?;
        let mut tree = Vec::with_capacity(movies.len());
        for movie in movies {
            let branches = self.api.fetch_showtimes_for_movie(&movie.id).await?;
            tree.push((movie, branches));
        }
        debug!("Walked {} movie(s)", tree.len());
        Ok(tree)
    }
}
