use std::fs::{self, OpenOptions};
use std::sync::mpsc::SyncSender;
use std::sync::{Arc, Mutex};

use rodio::OutputStream;
use tracing_subscriber::EnvFilter;

use crate::audio::{EngineTiming, PlaybackEngine, RodioBackend, open_output};
use crate::catalog::DabClient;
use crate::config;
use crate::error::Result;
use crate::lyrics::LrcLibClient;
use crate::player::{Event, Jobs, PlaybackController, ThreadSpawn};

/// Route `tracing` output to the log file. The terminal belongs to the TUI,
/// so when the file cannot be opened logging stays off.
pub fn init_logging(settings: &config::Settings) -> bool {
    let path = settings.log_file();
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return false;
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .is_ok()
}

/// The player and the output stream it plays through. The stream has to
/// stay alive for as long as the controller.
pub struct Player {
    pub controller: PlaybackController<RodioBackend>,
    _output: OutputStream,
}

/// Wire catalog, lyrics, audio output and engine into a controller whose
/// events arrive on `tx`'s receiver.
pub fn build_player(settings: &config::Settings, tx: SyncSender<Event>) -> Result<Player> {
    let catalog = DabClient::new(&settings.api)?;
    let lyrics = LrcLibClient::new(&settings.lyrics, &settings.api)?;

    let output = open_output()?;
    let backend = RodioBackend::new(output.mixer().clone(), &settings.api)?;
    let engine = PlaybackEngine::new(backend, EngineTiming::from(&settings.playback));

    let jobs = Jobs::new(
        Arc::new(catalog),
        Arc::new(lyrics),
        Box::new(ThreadSpawn),
        tx,
    );
    Ok(Player {
        controller: PlaybackController::new(engine, jobs, settings),
        _output: output,
    })
}
