//! A desktop host built on SDL2: window, buzzer, keyboard and a terminal menu to pick programs.

mod audio;
mod display;
mod input;
mod menu;
mod pacer;

pub use audio::Buzzer;
pub use display::Screen;
pub use input::{HostEvent, poll_for_input};
pub use menu::ask_for_program;
pub use pacer::FramePacer;

use crate::{
    clock::FrameQueue, configuration::Settings, machine::Machine, rom::FileRomSource,
    rom::RomSource, session::Session,
};
use log::LevelFilter;

const TITLE: &str = "Chip 8";

/// Installs a logger for this crate's messages. Does nothing if a logger is already set.
pub fn init_logging(level: LevelFilter) {
    let cfg = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("chip_8_frontend")
        .build();

    let _ = simplelog::SimpleLogger::init(level, cfg);
}

/// Opens a window and runs `machine` in it until the window is closed or Escape is pressed.
/// Return opens the program menu again; picking a program stops the current one and loads the
/// new one.
///
/// Logs at `Info` through [`init_logging`]. A logger the caller installed beforehand is kept.
pub fn run<M: Machine>(machine: M, settings: &Settings) -> anyhow::Result<()> {
    init_logging(LevelFilter::Info);
    settings.validate()?;

    let sdl_context = sdl2::init().map_err(anyhow::Error::msg)?;
    let mut buzzer = Buzzer::initialize(&sdl_context, &settings.sound)?;
    let mut screen = Screen::initialize(&sdl_context, TITLE, &settings.window)?;
    let mut event_pump = sdl_context.event_pump().map_err(anyhow::Error::msg)?;

    let clock = FrameQueue::new();
    let source = FileRomSource::from_settings(&settings.roms);
    let mut session = Session::from_settings(machine, clock.clone(), &source, settings)?;
    let mut pacer = FramePacer::new(settings.scheduler.frame_rate);

    session.clear(&mut screen)?;
    screen.show_status(session.status())?;
    select_program(&mut session, &source, &mut screen)?;

    // Main Operating Loop (MOL). One pass per display refresh.
    'MOL: loop {
        for event in poll_for_input(&mut event_pump) {
            match event {
                HostEvent::Quit => break 'MOL,
                HostEvent::SelectProgram => select_program(&mut session, &source, &mut screen)?,
                HostEvent::Key { name, pressed } => {
                    session.key_event(name, pressed);
                }
            }
        }

        // Firing a frame requests the next one, so take a single frame per pass
        if let Some(handle) = clock.pop_due() {
            if session.on_frame(handle, &mut screen).is_err() {
                screen.show_status(session.status())?;
            }
        }

        buzzer.set_sounding(session.is_running() && session.machine().sound_active());

        if !(settings.window.vsync && session.is_running()) {
            pacer.wait();
        }
    }

    buzzer.set_sounding(false);
    Ok(())
}

/// Asks for a program and loads it. Load failures end up in the title bar, not as an error,
/// so another program can be picked.
fn select_program<M, R>(
    session: &mut Session<M, FrameQueue, R>,
    source: &FileRomSource,
    screen: &mut Screen,
) -> anyhow::Result<()>
where
    M: Machine,
    R: RomSource,
{
    if let Some(program) = ask_for_program(source)? {
        // The session records the failure in its status
        let _ = session.load(&program, screen);
        screen.show_status(session.status())?;
    }

    Ok(())
}
