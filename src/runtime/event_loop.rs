use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::audio::AudioEvent;

use super::commands;
use super::console::Flow;
use super::startup::AppConsole;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Input as seen by the main loop.
enum Input {
    Line(String),
    /// stdin closed or failed.
    Closed,
}

/// Read console lines on a helper thread so the main loop can keep
/// draining audio events while waiting for input.
fn spawn_stdin_reader() -> io::Result<Receiver<Input>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(l) => {
                        if tx.send(Input::Line(l)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
            let _ = tx.send(Input::Closed);
        })?;
    Ok(rx)
}

/// Main loop: run commands as lines arrive, feed audio events back into the
/// store in between. Returns when `quit` is entered or stdin closes.
pub fn run(console: &mut AppConsole, events: &Receiver<AudioEvent>) -> Result<(), Box<dyn std::error::Error>> {
    let input = spawn_stdin_reader()?;
    let mut stdout = io::stdout();

    prompt(&mut stdout)?;
    loop {
        while let Ok(event) = events.try_recv() {
            console.on_audio_event(event);
        }

        match input.recv_timeout(POLL_INTERVAL) {
            Ok(Input::Line(line)) => {
                match commands::parse(&line) {
                    Ok(Some(cmd)) => {
                        if console.execute(cmd, &mut stdout)? == Flow::Quit {
                            return Ok(());
                        }
                    }
                    Ok(None) => {}
                    Err(e) => writeln!(stdout, "{e}")?,
                }
                prompt(&mut stdout)?;
            }
            Ok(Input::Closed) | Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("input closed");
                return Ok(());
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}
