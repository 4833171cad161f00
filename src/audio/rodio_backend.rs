//! `MediaBackend` on top of rodio.
//!
//! The stream URL is downloaded progressively by `stream_download` into a
//! temp file. Once the FLAC header has arrived a helper thread wraps the
//! download in `rodio::Decoder` and appends it to a fresh `Sink` on the
//! shared mixer, while the rest of the file keeps arriving in the background.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use reqwest::{Client, Url};
use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use stream_download::http::HttpStream;
use stream_download::source::SourceStream;
use stream_download::storage::temp::TempStorageProvider;
use stream_download::{Settings as StreamSettings, StreamDownload};
use tokio::runtime::{self, Handle, Runtime};
use tracing::{debug, warn};

use crate::config::ApiSettings;
use crate::error::{Error, Result};

use super::backend::MediaBackend;
use super::types::BackendState;

/// Open the default output device.
///
/// The returned stream must outlive every `RodioBackend` built from its mixer.
pub fn open_output() -> Result<OutputStream> {
    let mut stream =
        OutputStreamBuilder::open_default_stream().map_err(|e| Error::Output(e.to_string()))?;
    // rodio logs to stderr when the stream is dropped, which would land on the TUI.
    stream.log_on_drop(false);
    Ok(stream)
}

#[derive(Default)]
struct Shared {
    url: Option<String>,
    sink: Option<Sink>,
    state: BackendState,
    duration: f64,
    fetching: bool,
    // Pause requested before the sink existed.
    start_paused: bool,
}

/// Bytes buffered before the decoder starts reading.
const PREFETCH_BYTES: u64 = 256 * 1024;

pub struct RodioBackend {
    mixer: Mixer,
    http: Client,
    // Drives the background downloads; lives as long as the backend.
    runtime: Runtime,
    shared: Arc<Mutex<Shared>>,
    // Bumped on every stop/load so a late fetch knows it is stale.
    generation: Arc<AtomicU64>,
}

impl RodioBackend {
    pub fn new(mixer: Mixer, api: &ApiSettings) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(api.timeout_secs.max(1)))
            .user_agent(api.user_agent.clone())
            .build()?;
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("flacterm-stream")
            .enable_all()
            .build()?;
        Ok(Self {
            mixer,
            http,
            runtime,
            shared: Arc::new(Mutex::new(Shared::default())),
            generation: Arc::new(AtomicU64::new(0)),
        })
    }

    fn start_fetch(&self, url: String) {
        let job = FetchJob {
            url,
            generation: self.generation.load(Ordering::SeqCst),
            current: self.generation.clone(),
            http: self.http.clone(),
            runtime: self.runtime.handle().clone(),
            mixer: self.mixer.clone(),
            shared: self.shared.clone(),
        };
        thread::spawn(move || job.run());
    }
}

impl MediaBackend for RodioBackend {
    fn load(&mut self, url: &str, expected_duration: Option<f64>) {
        self.stop();
        if let Ok(mut s) = self.shared.lock() {
            s.url = Some(url.to_string());
            s.duration = expected_duration.unwrap_or(0.0);
        }
    }

    fn play(&mut self) {
        let url = {
            let Ok(mut s) = self.shared.lock() else {
                return;
            };
            if let Some(sink) = &s.sink {
                sink.play();
                s.state = BackendState::Playing;
                return;
            }
            s.start_paused = false;
            if s.fetching {
                return;
            }
            let Some(url) = s.url.clone() else {
                return;
            };
            s.fetching = true;
            s.state = BackendState::Opening;
            url
        };
        self.start_fetch(url);
    }

    fn pause(&mut self) {
        let Ok(mut s) = self.shared.lock() else {
            return;
        };
        if let Some(sink) = &s.sink {
            sink.pause();
            s.state = BackendState::Paused;
        } else if s.fetching {
            s.start_paused = true;
        }
    }

    fn stop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut s) = self.shared.lock() {
            if let Some(sink) = s.sink.take() {
                sink.stop();
            }
            *s = Shared::default();
        }
    }

    fn seek(&mut self, position: f64) {
        let Ok(s) = self.shared.lock() else {
            return;
        };
        if let Some(sink) = &s.sink {
            if let Err(e) = sink.try_seek(Duration::from_secs_f64(position.max(0.0))) {
                warn!(error = %e, "seek failed");
            }
        }
    }

    fn state(&self) -> BackendState {
        let Ok(s) = self.shared.lock() else {
            return BackendState::Error;
        };
        match (&s.sink, s.state) {
            (Some(sink), BackendState::Playing) if sink.empty() => BackendState::Ended,
            (_, state) => state,
        }
    }

    fn position(&self) -> f64 {
        self.shared
            .lock()
            .ok()
            .and_then(|s| s.sink.as_ref().map(|sink| sink.get_pos().as_secs_f64()))
            .unwrap_or(0.0)
    }

    fn duration(&self) -> f64 {
        self.shared.lock().map(|s| s.duration).unwrap_or(0.0)
    }
}

type Download = StreamDownload<TempStorageProvider>;

/// One open-and-decode run for a loaded URL.
struct FetchJob {
    url: String,
    generation: u64,
    current: Arc<AtomicU64>,
    http: Client,
    runtime: Handle,
    mixer: Mixer,
    shared: Arc<Mutex<Shared>>,
}

impl FetchJob {
    fn run(self) {
        debug!(url = %self.url, "opening stream");
        let decoded = self.open().and_then(|(download, len)| {
            let mut builder = Decoder::builder()
                .with_data(download)
                .with_hint("flac")
                .with_seekable(true);
            if let Some(len) = len {
                builder = builder.with_byte_len(len);
            }
            builder.build().map_err(|e| Error::Decode(e.to_string()))
        });

        let Ok(mut s) = self.shared.lock() else {
            return;
        };
        if self.current.load(Ordering::SeqCst) != self.generation {
            debug!(url = %self.url, "stream opened after stop; dropping it");
            return;
        }
        s.fetching = false;

        match decoded {
            Ok(decoder) => {
                if let Some(total) = decoder.total_duration() {
                    s.duration = total.as_secs_f64();
                }
                let sink = Sink::connect_new(&self.mixer);
                sink.append(decoder);
                if s.start_paused {
                    sink.pause();
                    s.state = BackendState::Paused;
                } else {
                    s.state = BackendState::Playing;
                }
                s.sink = Some(sink);
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "could not open stream");
                s.state = BackendState::Error;
            }
        }
    }

    /// Start the download and return once it is under way, with the file
    /// size when the server reports one.
    fn open(&self) -> Result<(Download, Option<u64>)> {
        let url = Url::parse(&self.url).map_err(|e| Error::Stream(format!("bad stream URL: {e}")))?;
        self.runtime.block_on(async {
            let stream = HttpStream::new(self.http.clone(), url)
                .await
                .map_err(|e| Error::Stream(e.to_string()))?;
            let len = stream.content_length();
            debug!(url = %self.url, bytes = ?len, "stream responded");
            let download = StreamDownload::from_stream(
                stream,
                TempStorageProvider::default(),
                StreamSettings::default().prefetch_bytes(PREFETCH_BYTES),
            )
            .await
            .map_err(|e| Error::Stream(e.to_string()))?;
            Ok((download, len))
        })
    }
}
