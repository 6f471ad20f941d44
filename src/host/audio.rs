use crate::configuration::SoundSettings;
use sdl2::{
    Sdl,
    audio::{AudioCallback, AudioDevice, AudioSpecDesired},
};

/// Square wave generator fed to SDL's audio callback.
struct SquareWave {
    phase_increment: f32, // Tone (in Hz) divided by the sample rate
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        // A square wave for that "cheap motherboard speaker" kind of sound
        for x in out.iter_mut() {
            *x = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_increment) % 1.0;
        }
    }
}

/// The speaker the machine's sound timer drives. Only talks to SDL when the buzzer actually
/// switches on or off.
pub struct Buzzer {
    device: AudioDevice<SquareWave>,
    sounding: bool,
}

impl Buzzer {
    /// Opens a mono 44.1 kHz playback device playing the configured tone at the configured
    /// volume. The device starts paused.
    pub fn initialize(sdl_context: &Sdl, settings: &SoundSettings) -> anyhow::Result<Self> {
        let audio_subsystem = sdl_context.audio().map_err(anyhow::Error::msg)?;

        let desired_spec = AudioSpecDesired {
            freq: Some(44100),
            channels: Some(1),
            samples: None, // The fallback sample size is fine for a beep
        };
        let device = audio_subsystem
            .open_playback(None, &desired_spec, |spec| SquareWave {
                phase_increment: settings.tone / (spec.freq as f32),
                phase: 0.0,
                volume: settings.volume / 20.0,
            })
            .map_err(anyhow::Error::msg)?;

        Ok(Self {
            device,
            sounding: false,
        })
    }

    pub fn set_sounding(&mut self, sounding: bool) {
        if sounding == self.sounding {
            return;
        }

        if sounding {
            self.device.resume();
        } else {
            self.device.pause();
        }
        self.sounding = sounding;
    }
}
