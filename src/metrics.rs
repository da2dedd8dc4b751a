use std::sync::atomic::{AtomicU64, Ordering};

use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request};

/// Mount point of the static file server.
pub const APP_PREFIX: &str = "/app";

/// Number of requests that reached the static file server since start or the last reset.
#[derive(Debug, Default)]
pub struct HitCounter {
    hits: AtomicU64,
}

impl HitCounter {
    pub fn record(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// Fairing that counts every request under [`APP_PREFIX`], found or not.
pub struct FileserverHits;

#[rocket::async_trait]
impl Fairing for FileserverHits {
    fn info(&self) -> Info {
        Info {
            name: "Fileserver Hits",
            kind: Kind::Request,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        if !is_app_path(request.uri().path().as_str()) {
            return;
        }

        match request.rocket().state::<HitCounter>() {
            Some(counter) => counter.record(),
            None => log::warn!("hit counter not managed; /app request not counted"),
        }
    }
}

fn is_app_path(path: &str) -> bool {
    match path.strip_prefix(APP_PREFIX) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
