use std::time::Duration;

mod commands;
mod console;
mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.log);

    let (mut console, events) = startup::build(&settings)?;
    tracing::info!("ready; type `help` for commands");

    let run_result = event_loop::run(&mut console, &events);

    console.shutdown();
    console
        .controller()
        .engine()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));

    run_result
}
