use sdl2::{EventPump, event::Event, keyboard::Scancode};

/// What the host loop should do about one SDL event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Quit,
    /// Open the program menu and load whatever gets picked.
    SelectProgram,
    /// A physical key changed state. `name` is the SDL scancode name, which is what the keypad
    /// layout in the settings refers to.
    Key { name: &'static str, pressed: bool },
}

/// Drains the SDL event queue.
///
/// Scancodes are used over keycodes: a scancode is the physical button, a keycode is the symbol
/// printed on it. Scancodes let keyboards with other layouts be used just like a QWERTY keyboard.
/// Key repeat events are passed through as presses.
pub fn poll_for_input(event_pump: &mut EventPump) -> Vec<HostEvent> {
    event_pump
        .poll_iter()
        .filter_map(|event| match event {
            Event::Quit { .. }
            | Event::KeyDown {
                scancode: Some(Scancode::Escape),
                ..
            } => Some(HostEvent::Quit),
            Event::KeyDown {
                scancode: Some(Scancode::Return),
                repeat: false,
                ..
            } => Some(HostEvent::SelectProgram),
            Event::KeyDown {
                scancode: Some(scancode),
                ..
            } => Some(HostEvent::Key {
                name: scancode.name(),
                pressed: true,
            }),
            Event::KeyUp {
                scancode: Some(scancode),
                ..
            } => Some(HostEvent::Key {
                name: scancode.name(),
                pressed: false,
            }),
            _ => None,
        })
        .collect()
}
