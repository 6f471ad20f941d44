use crate::{error::ConfigurationError, keypad::KeyMapper, renderer::FrameRenderer};
use config::Config;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Name of the settings file looked up by [`Settings::load`].
pub const SETTINGS_FILE: &str = "settings.toml";

/// Contains all the settings related to the execution loop.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SchedulerSettings {
    /// Number of instructions executed per animation frame. Fixed for the lifetime of a
    /// scheduler.
    pub ticks_per_frame: usize,
    /// Frames per second the host aims for when it cannot rely on vsync.
    pub frame_rate: u32,
}

/// Contains all the settings related to the window and the frame renderer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WindowSettings {
    /// Size of one Chip-8 pixel on the surface, in surface pixels.
    pub scale: u32,
    pub background_color: [u8; 3],
    pub foreground_color: [u8; 3],
    pub fullscreen: bool,
    pub vsync: bool,
}

/// Physical key names bound to each logical key. Index 0 is key 0x0, index 15 is key 0xf.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct KeypadSettings {
    pub layout: Vec<String>,
}

/// Where programs are read from.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RomSettings {
    pub folder: String,
    pub extension: String,
}

/// Contains all the settings related to sound.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SoundSettings {
    pub tone: f32,
    pub volume: f32,
}

/// A container that contains all the settings categories. Used for distribution of the appropriate
/// category of settings to each component.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    pub scheduler: SchedulerSettings,
    pub window: WindowSettings,
    pub keypad: KeypadSettings,
    pub roms: RomSettings,
    pub sound: SoundSettings,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            ticks_per_frame: 10,
            frame_rate: 60,
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            scale: 15,
            background_color: [0, 0, 0],
            foreground_color: [255, 255, 255],
            fullscreen: false,
            vsync: true,
        }
    }
}

impl Default for KeypadSettings {
    fn default() -> Self {
        // +---+---+---+---+       +---+---+---+---+
        // | 1 | 2 | 3 | 4 |       | 1 | 2 | 3 | C |
        // | Q | W | E | R |  -->  | 4 | 5 | 6 | D |
        // | A | S | D | F |       | 7 | 8 | 9 | E |
        // | Z | X | C | V |       | A | 0 | B | F |
        // +---+---+---+---+       +---+---+---+---+
        let layout = [
            "X", "1", "2", "3", "Q", "W", "E", "A", "S", "D", "Z", "C", "4", "R", "F", "V",
        ];

        Self {
            layout: layout.iter().map(|key| key.to_string()).collect(),
        }
    }
}

impl Default for RomSettings {
    fn default() -> Self {
        Self {
            folder: "roms".to_string(),
            extension: "ch8".to_string(),
        }
    }
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            tone: 330.0,
            volume: 0.5,
        }
    }
}

impl Settings {
    /// Loads `settings.toml` from the working directory, creating it with defaults first if it
    /// does not exist.
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::load_from(SETTINGS_FILE)
    }

    /// Loads all the settings in the given toml file into a container and returns it.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let io_error = |source| ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        };

        if !fs::exists(path).map_err(io_error)? {
            Self::create_settings_file(path)?;
        }

        let settings: Settings = Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values the scheduler, renderer or key mapper cannot work with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        // Zero and oversized scales
        FrameRenderer::from_settings(&self.window)?;
        if self.scheduler.ticks_per_frame == 0 {
            return Err(ConfigurationError::ZeroTickBudget);
        }
        if self.scheduler.frame_rate == 0 {
            return Err(ConfigurationError::ZeroFrameRate);
        }
        KeyMapper::from_settings(&self.keypad)?;

        Ok(())
    }

    /// Creates and populates a settings file with the default values.
    fn create_settings_file(path: &Path) -> Result<(), ConfigurationError> {
        #[rustfmt::skip]
        let settings_toml = toml::toml! {
            [scheduler]
            ticks_per_frame = 10
            frame_rate = 60

            [window]
            scale = 15
            background_color = [0, 0, 0]
            foreground_color = [255, 255, 255]
            fullscreen = false
            vsync = true

            [keypad]
            layout = ["X", "1", "2", "3", "Q", "W", "E", "A", "S", "D", "Z", "C", "4", "R", "F", "V"]

            [roms]
            folder = "roms"
            extension = "ch8"

            [sound]
            tone = 330.0
            volume = 0.5
        }.to_string();

        fs::write(path, settings_toml).map_err(|source| ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chip_8_frontend_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let path = scratch_file("created.toml");

        let settings = Settings::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn existing_file_overrides_defaults() {
        let path = scratch_file("custom.toml");
        let mut custom = Settings::default();
        custom.scheduler.ticks_per_frame = 20;
        custom.window.scale = 4;
        custom.roms.folder = "games".to_string();
        fs::write(&path, toml::to_string(&custom).unwrap()).unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings, custom);
    }

    #[test]
    fn invalid_file_is_rejected() {
        let path = scratch_file("zero_scale.toml");
        let mut custom = Settings::default();
        custom.window.scale = 0;
        fs::write(&path, toml::to_string(&custom).unwrap()).unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigurationError::ZeroScale)
        ));
    }

    #[test]
    fn validate_rejects_bad_keypad_layouts() {
        let mut settings = Settings::default();
        settings.keypad.layout.pop();
        assert!(matches!(
            settings.validate(),
            Err(ConfigurationError::LayoutLength(15))
        ));

        let mut settings = Settings::default();
        settings.keypad.layout[0] = "q".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ConfigurationError::DuplicateBinding { first: 0, second: 4, .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_budgets() {
        let mut settings = Settings::default();
        settings.scheduler.ticks_per_frame = 0;
        assert!(matches!(settings.validate(), Err(ConfigurationError::ZeroTickBudget)));

        let mut settings = Settings::default();
        settings.scheduler.frame_rate = 0;
        assert!(matches!(settings.validate(), Err(ConfigurationError::ZeroFrameRate)));
    }

    #[test]
    fn validate_bounds_the_window_scale() {
        let mut settings = Settings::default();
        settings.window.scale = 0;
        assert!(matches!(settings.validate(), Err(ConfigurationError::ZeroScale)));

        settings.window.scale = 100_000_000;
        assert!(matches!(
            settings.validate(),
            Err(ConfigurationError::ScaleTooLarge { scale: 100_000_000, .. })
        ));

        settings.window.scale = crate::renderer::MAX_SCALE;
        assert!(settings.validate().is_ok());
    }
}
