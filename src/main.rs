mod app;
mod audio;
mod catalog;
mod config;
mod error;
mod lyrics;
mod player;
mod playlist;
mod queue;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
