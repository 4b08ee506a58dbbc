//! In-memory booking backend shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use cinebook_common::{
    BranchShowtimes, CinemaBranchRef, MovieRef, SeatRef, ShowtimeDetail, ShowtimeRef,
};
use cinebook_e2e::api::BookingApi;
use cinebook_e2e::{E2eError, E2eResult};

#[derive(Default)]
pub struct FakeBookingApi {
    movies: Vec<MovieRef>,
    showtimes: HashMap<String, Vec<BranchShowtimes>>,
    details: Mutex<HashMap<String, ShowtimeDetail>>,
    broken_movie: Option<String>,
    pub detail_calls: AtomicUsize,
}

impl FakeBookingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn movie(mut self, id: &str, title: &str) -> Self {
        self.movies.push(MovieRef {
            id: id.to_string(),
            title: title.to_string(),
        });
        self
    }

    /// Schedule `showtime_id` for `movie_id` at a branch, with `free` of `total` seats open
    pub fn showtime(
        self,
        movie_id: &str,
        branch: (&str, &str),
        showtime_id: &str,
        date_time: &str,
        free: usize,
        total: usize,
    ) -> Self {
        let title = self
            .movies
            .iter()
            .find(|m| m.id == movie_id)
            .map(|m| m.title.clone())
            .unwrap_or_default();
        let detail = ShowtimeDetail {
            movie_title: title,
            cinema_name: branch.1.to_string(),
            date_time: date_time.to_string(),
            seats: seats(free, total),
        };
        self.showtime_with_detail(movie_id, branch, showtime_id, date_time, detail)
    }

    pub fn showtime_with_detail(
        mut self,
        movie_id: &str,
        branch: (&str, &str),
        showtime_id: &str,
        listed_date_time: &str,
        detail: ShowtimeDetail,
    ) -> Self {
        let nodes = self.showtimes.entry(movie_id.to_string()).or_default();
        let showtime = ShowtimeRef {
            id: showtime_id.to_string(),
            date_time: listed_date_time.to_string(),
            seats: Vec::new(),
        };
        match nodes.iter_mut().find(|n| n.branch.id == branch.0) {
            Some(node) => node.showtimes.push(showtime),
            None => nodes.push(BranchShowtimes {
                branch: CinemaBranchRef {
                    id: branch.0.to_string(),
                    name: branch.1.to_string(),
                },
                showtimes: vec![showtime],
            }),
        }
        self.details
            .lock()
            .entry(showtime_id.to_string())
            .or_insert(detail);
        self
    }

    /// Fetching showtimes for this movie fails with a transport error
    pub fn broken_movie(mut self, movie_id: &str) -> Self {
        self.broken_movie = Some(movie_id.to_string());
        self
    }

    /// Simulate another client removing a showtime
    pub fn remove_showtime(&self, showtime_id: &str) {
        self.details.lock().remove(showtime_id);
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

pub fn seats(free: usize, total: usize) -> Vec<SeatRef> {
    (0..total)
        .map(|i| SeatRef {
            code: format!("A{}", i + 1),
            reserved: i >= free,
        })
        .collect()
}

#[async_trait]
impl BookingApi for FakeBookingApi {
    async fn fetch_movies(&self) -> E2eResult<Vec<MovieRef>> {
        Ok(self.movies.clone())
    }

    async fn fetch_showtimes_for_movie(&self, movie_id: &str) -> E2eResult<Vec<BranchShowtimes>> {
        if self.broken_movie.as_deref() == Some(movie_id) {
            return Err(E2eError::Transport(format!("connection reset fetching {}", movie_id)));
        }
        Ok(self.showtimes.get(movie_id).cloned().unwrap_or_default())
    }

    async fn fetch_showtime_detail(&self, showtime_id: &str) -> E2eResult<ShowtimeDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .get(showtime_id)
            .cloned()
            .ok_or_else(|| E2eError::NotFound {
                kind: "showtime".to_string(),
                id: showtime_id.to_string(),
            })
    }
}
