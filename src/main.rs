mod audio;
mod catalog;
mod config;
mod error;
mod persist;
mod runtime;
mod store;
mod sync;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
