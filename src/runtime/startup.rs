use std::error::Error;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use crate::audio::{AudioEvent, AudioPlayer};
use crate::catalog::CatalogClient;
use crate::config;
use crate::persist::{FileStore, QueuePersistence};
use crate::store::PlayerStore;
use crate::sync::SyncController;

use super::console::Console;

pub type AppConsole = Console<CatalogClient, AudioPlayer>;

/// Wire the store, persistence, audio thread and catalog together.
///
/// The persisted queue is restored before the controller subscribes, so
/// launching never loads or plays anything by itself.
pub fn build(settings: &config::Settings) -> Result<(AppConsole, Receiver<AudioEvent>), Box<dyn Error>> {
    let dir = settings
        .storage_dir()
        .ok_or("no storage directory: set storage.dir or HOME")?;
    tracing::debug!(dir = %dir.display(), "queue storage");
    let persistence = QueuePersistence::new(Arc::new(FileStore::new(dir)));

    let mut store = PlayerStore::new(persistence);
    if store.restore_queue() {
        if let Some(t) = store.state().current_track() {
            println!("restored queue, paused on {}", t.display());
        }
    }

    let (player, events) = AudioPlayer::new(settings.audio.clone())?;
    let mut controller = SyncController::new(player);
    controller.start(&mut store);

    let catalog = CatalogClient::new(&settings.catalog)?;

    Ok((Console::new(catalog, store, controller, settings.clone()), events))
}
