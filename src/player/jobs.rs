//! One-shot network work, run off the UI thread.
//!
//! Every job ends by posting exactly one [`Event`]; nothing here touches
//! player or UI state directly.

use std::sync::Arc;
use std::sync::mpsc::SyncSender;
use std::thread;

use tracing::debug;

use crate::catalog::{Catalog, SearchKind, Track, fetch_all};
use crate::lyrics::LyricsSource;

use super::events::Event;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where jobs run. Production uses a thread per job.
pub trait Spawn {
    fn spawn(&self, job: Job);
}

pub struct ThreadSpawn;

impl Spawn for ThreadSpawn {
    fn spawn(&self, job: Job) {
        thread::spawn(job);
    }
}

/// The external collaborators plus the channel results go back on.
pub struct Jobs {
    catalog: Arc<dyn Catalog>,
    lyrics: Arc<dyn LyricsSource>,
    spawner: Box<dyn Spawn>,
    tx: SyncSender<Event>,
}

impl Jobs {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        lyrics: Arc<dyn LyricsSource>,
        spawner: Box<dyn Spawn>,
        tx: SyncSender<Event>,
    ) -> Self {
        Self {
            catalog,
            lyrics,
            spawner,
            tx,
        }
    }

    pub fn sender(&self) -> SyncSender<Event> {
        self.tx.clone()
    }

    pub fn resolve_stream(&self, token: u64, track: Track) {
        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        self.spawner.spawn(Box::new(move || {
            let url = catalog.resolve(&track.id);
            post(&tx, Event::StreamResolved { token, track, url });
        }));
    }

    pub fn fetch_lyrics(&self, token: u64, track: &Track) {
        let source = self.lyrics.clone();
        let tx = self.tx.clone();
        let artist = track.artist.clone().unwrap_or_default();
        let title = track.title.clone().unwrap_or_default();
        let album = track.album_title.clone();
        let duration = track.length().map(|d| d.as_secs_f64());
        self.spawner.spawn(Box::new(move || {
            let raw = source.fetch_lyrics(&artist, &title, album.as_deref(), duration);
            post(&tx, Event::LyricsFetched { token, raw });
        }));
    }

    pub fn fetch_detail(&self, track_id: &str) {
        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        let track_id = track_id.to_string();
        self.spawner.spawn(Box::new(move || {
            let detail = catalog.detail(&track_id);
            post(&tx, Event::DetailFetched { track_id, detail });
        }));
    }

    pub fn search(&self, query: &str, kind: SearchKind) {
        let catalog = self.catalog.clone();
        let tx = self.tx.clone();
        let query = query.to_string();
        self.spawner.spawn(Box::new(move || {
            let results = fetch_all(catalog.as_ref(), &query, kind);
            post(&tx, Event::SearchFinished {
                query,
                kind,
                results,
            });
        }));
    }
}

fn post(tx: &SyncSender<Event>, event: Event) {
    if tx.send(event).is_err() {
        debug!("event receiver gone; dropping job result");
    }
}
