use std::str::SplitWhitespace;
use std::time::Duration;

use crate::error::CommandError;

/// One console command. Positions are zero-based here; the console shows
/// and accepts them one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    /// Next page of the last search.
    Page(u32),
    /// Resolve a search result and play it on its own.
    Play(usize),
    /// Resolve a search result and append it to the queue.
    Add(usize),
    Remove(usize),
    Move { from: usize, to: usize },
    Jump(usize),
    Toggle,
    Pause,
    Resume,
    Next,
    Prev,
    Seek(Duration),
    Forward,
    Rewind,
    Queue,
    Status,
    Results,
    Config,
    Help,
    Quit,
}

pub const HELP: &str = "\
search <query>     search the catalog
page <n>           show page <n> of the last search
play <n>           play search result <n>
add <n>            append search result <n> to the queue
remove <i>         remove queue entry <i>
move <from> <to>   reorder the queue
jump <i>           play queue entry <i>
toggle | pause | resume
next | prev
seek <secs>        jump to an absolute position
ff | rew           scrub forward / back
queue | status | results | config
quit";

/// Parse one console line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let Some((word, rest)) = split_word(line) else {
        return Ok(None);
    };
    let mut args = rest.split_whitespace();

    let cmd = match word.to_ascii_lowercase().as_str() {
        "search" | "s" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "search",
                    what: "a query",
                });
            }
            Command::Search(rest.to_string())
        }
        "page" => Command::Page(count(&mut args, "page", "a page number")? as u32),
        "play" | "p" => Command::Play(position(&mut args, "play", "a result number")?),
        "add" | "a" => Command::Add(position(&mut args, "add", "a result number")?),
        "remove" | "rm" => Command::Remove(position(&mut args, "remove", "a queue position")?),
        "move" | "mv" => {
            let from = position(&mut args, "move", "two queue positions")?;
            let to = position(&mut args, "move", "two queue positions")?;
            Command::Move { from, to }
        }
        "jump" | "j" => Command::Jump(position(&mut args, "jump", "a queue position")?),
        "toggle" | "t" => Command::Toggle,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "next" | "n" => Command::Next,
        "prev" | "previous" => Command::Prev,
        "seek" => {
            let secs = match args.next() {
                Some(arg) => arg
                    .parse::<u64>()
                    .map_err(|_| CommandError::InvalidNumber(arg.to_string()))?,
                None => {
                    return Err(CommandError::MissingArgument {
                        command: "seek",
                        what: "a number of seconds",
                    });
                }
            };
            Command::Seek(Duration::from_secs(secs))
        }
        "ff" => Command::Forward,
        "rew" => Command::Rewind,
        "queue" | "q" => Command::Queue,
        "status" => Command::Status,
        "results" | "r" => Command::Results,
        "config" => Command::Config,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(Some(cmd))
}

fn split_word(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    })
}

/// A one-based number, at least 1.
fn count(
    args: &mut SplitWhitespace<'_>,
    command: &'static str,
    what: &'static str,
) -> Result<usize, CommandError> {
    let arg = args
        .next()
        .ok_or(CommandError::MissingArgument { command, what })?;
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(CommandError::InvalidNumber(arg.to_string())),
    }
}

/// A one-based position, returned zero-based.
fn position(
    args: &mut SplitWhitespace<'_>,
    command: &'static str,
    what: &'static str,
) -> Result<usize, CommandError> {
    count(args, command, what).map(|n| n - 1)
}
