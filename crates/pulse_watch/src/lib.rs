use std::{fs::OpenOptions, sync::Mutex};

use error::WatchError;

pub mod api_client;
pub mod app;
pub mod display;
pub mod error;
pub mod live_patch;
pub mod settings;
pub mod socket;
pub mod terminal;

#[cfg(test)]
mod fixtures;

pub fn init_tracing(settings: &settings::WatchSettings) -> Result<(), WatchError> {
    let Some(path) = settings.log_file.as_deref() else {
        return Ok(());
    };

    let level = if settings.is_production() {
        tracing::Level::INFO
    } else {
        tracing::Level::DEBUG
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
