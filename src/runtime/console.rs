use std::io::{self, Write};
use std::time::Duration;

use crate::audio::{AudioEngine, AudioEvent};
use crate::catalog::{Catalog, Track};
use crate::config::Settings;
use crate::store::PlayerStore;
use crate::sync::{SyncController, apply_audio_event};

use super::commands::{Command, HELP};

/// Whether the console should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The command console: the only writer of the store besides audio
/// feedback, and the owner of the sync controller.
pub struct Console<C: Catalog, E: AudioEngine> {
    catalog: C,
    store: PlayerStore,
    controller: SyncController<E>,
    settings: Settings,
    query: Option<String>,
    results: Vec<Track>,
}

impl<C: Catalog, E: AudioEngine> Console<C, E> {
    pub fn new(catalog: C, store: PlayerStore, controller: SyncController<E>, settings: Settings) -> Self {
        Self {
            catalog,
            store,
            controller,
            settings,
            query: None,
            results: Vec::new(),
        }
    }

    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    pub fn controller(&self) -> &SyncController<E> {
        &self.controller
    }

    /// Push an engine notification into the store and reconcile.
    pub fn on_audio_event(&mut self, event: AudioEvent) {
        let announce = matches!(event, AudioEvent::Finished { .. });
        apply_audio_event(&mut self.store, event);
        self.controller.process_pending();

        if announce {
            match self.store.state().current_track() {
                Some(t) if self.store.state().is_playing() => {
                    tracing::info!(id = %t.id, "now playing {}", t.display());
                }
                _ => {}
            }
        }
    }

    /// Run one command, writing any user-facing output to `out`.
    pub fn execute(&mut self, cmd: Command, out: &mut impl Write) -> io::Result<Flow> {
        match cmd {
            Command::Search(query) => {
                self.query = Some(query);
                self.search(1, out)?;
            }
            Command::Page(page) => {
                if self.query.is_some() {
                    self.search(page, out)?;
                } else {
                    writeln!(out, "nothing searched yet")?;
                }
            }
            Command::Play(n) => {
                if let Some(track) = self.resolve(n, out)? {
                    writeln!(out, "playing {}", track.display())?;
                    self.store.set_queue(vec![track], 0);
                }
            }
            Command::Add(n) => {
                if let Some(track) = self.resolve(n, out)? {
                    // Identical neighbours read as one track to the sync
                    // controller, which would stop advancing there.
                    let last_id = self.store.state().queue().last().map(|t| t.id.as_str());
                    if last_id == Some(track.id.as_str()) {
                        writeln!(out, "{} is already last in the queue", track.display())?;
                    } else {
                        writeln!(out, "queued {}", track.display())?;
                        self.store.add_to_queue(track);
                    }
                }
            }
            Command::Remove(i) => {
                if self.in_queue(i, out)? {
                    self.store.remove_from_queue(i);
                }
            }
            Command::Move { from, to } => {
                if self.in_queue(from, out)? && self.in_queue(to, out)? {
                    self.store.move_queue_item(from, to);
                }
            }
            Command::Jump(i) => {
                if self.in_queue(i, out)? {
                    self.store.play_track_at_index(i);
                }
            }
            Command::Toggle => self.store.toggle_play(),
            Command::Pause => self.store.pause(),
            Command::Resume => self.store.play(),
            Command::Next => self.store.next(),
            Command::Prev => self.store.previous(),
            Command::Seek(position) => self.controller.seek_to(position),
            Command::Forward => self.controller.seek_by(self.scrub_secs()),
            Command::Rewind => self.controller.seek_by(-self.scrub_secs()),
            Command::Queue => self.print_queue(out)?,
            Command::Status => self.print_status(out)?,
            Command::Results => self.print_results(out)?,
            Command::Config => match self.settings.to_toml() {
                Ok(text) => write!(out, "{text}")?,
                Err(e) => writeln!(out, "cannot render config: {e}")?,
            },
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }

        self.controller.process_pending();
        Ok(Flow::Continue)
    }

    /// Stop reacting to the store and wait for queued snapshot writes.
    pub fn shutdown(&mut self) {
        self.controller.stop(&mut self.store);
        self.store.flush_persistence();
    }

    fn search(&mut self, page: u32, out: &mut impl Write) -> io::Result<()> {
        let Some(query) = self.query.as_deref() else {
            return Ok(());
        };
        match self.catalog.search(query, page) {
            Ok(found) => {
                writeln!(
                    out,
                    "{} matches for \"{query}\" (page {page})",
                    found.total_matches
                )?;
                self.results = found.tracks;
                self.print_results(out)
            }
            Err(e) => writeln!(out, "search failed: {e}"),
        }
    }

    /// Look up the full detail of search result `n`.
    fn resolve(&self, n: usize, out: &mut impl Write) -> io::Result<Option<Track>> {
        let Some(hit) = self.results.get(n) else {
            writeln!(out, "no search result {}", n + 1)?;
            return Ok(None);
        };
        match self.catalog.track(&hit.id) {
            Ok(track) => Ok(Some(track)),
            Err(e) => {
                writeln!(out, "cannot play {}: {e}", hit.display())?;
                Ok(None)
            }
        }
    }

    fn in_queue(&self, i: usize, out: &mut impl Write) -> io::Result<bool> {
        let ok = i < self.store.state().queue().len();
        if !ok {
            writeln!(out, "no queue entry {}", i + 1)?;
        }
        Ok(ok)
    }

    fn scrub_secs(&self) -> i64 {
        i64::try_from(self.settings.controls.scrub_seconds).unwrap_or(i64::MAX)
    }

    fn print_results(&self, out: &mut impl Write) -> io::Result<()> {
        if self.results.is_empty() {
            return writeln!(out, "no results");
        }
        for (i, t) in self.results.iter().enumerate() {
            writeln!(
                out,
                "{:>3}. {} [{}]",
                i + 1,
                t.display(),
                format_mmss(Duration::from_secs(t.duration_seconds.into()))
            )?;
        }
        Ok(())
    }

    fn print_queue(&self, out: &mut impl Write) -> io::Result<()> {
        let state = self.store.state();
        if state.queue().is_empty() {
            return writeln!(out, "queue is empty");
        }
        for (i, t) in state.queue().iter().enumerate() {
            let marker = if state.current_index() == Some(i) { '>' } else { ' ' };
            writeln!(out, "{marker}{:>3}. {}", i + 1, t.display())?;
        }
        Ok(())
    }

    fn print_status(&self, out: &mut impl Write) -> io::Result<()> {
        let state = self.store.state();
        let Some(track) = state.current_track() else {
            return writeln!(out, "stopped");
        };
        let duration = if state.duration().is_zero() {
            Duration::from_secs(track.duration_seconds.into())
        } else {
            state.duration()
        };
        writeln!(
            out,
            "{} {} {}/{}",
            if state.is_playing() { "playing" } else { "paused" },
            track.display(),
            format_mmss(state.position()),
            format_mmss(duration)
        )
    }
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
