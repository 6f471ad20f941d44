use crate::{
    configuration::KeypadSettings, error::ConfigurationError, machine::Machine, machine::NUM_KEYS,
};
use std::collections::HashMap;

/// Translates physical key names into the 16 logical keys of the Chip-8 keypad.
///
/// Key names are matched case-insensitively, so `"q"` and `"Q"` are the same physical key.
/// Names are whatever the host uses to identify a key (SDL scancode names, DOM key codes...).
#[derive(Clone, Debug)]
pub struct KeyMapper {
    bindings: HashMap<String, usize>,
}

impl KeyMapper {
    /// Builds the mapper from a layout where `layout[k]` is the physical key for logical key `k`.
    pub fn from_layout<S: AsRef<str>>(layout: &[S]) -> Result<Self, ConfigurationError> {
        if layout.len() != NUM_KEYS {
            return Err(ConfigurationError::LayoutLength(layout.len()));
        }

        let mut bindings = HashMap::with_capacity(NUM_KEYS);
        for (logical_key, name) in layout.iter().enumerate() {
            let name = name.as_ref();
            if let Some(first) = bindings.insert(name.to_ascii_uppercase(), logical_key) {
                return Err(ConfigurationError::DuplicateBinding {
                    key: name.to_string(),
                    first,
                    second: logical_key,
                });
            }
        }

        Ok(Self { bindings })
    }

    pub fn from_settings(settings: &KeypadSettings) -> Result<Self, ConfigurationError> {
        Self::from_layout(&settings.layout)
    }

    /// The logical key bound to a physical key, if any.
    pub fn logical_key(&self, physical_key: &str) -> Option<usize> {
        self.bindings
            .get(&physical_key.to_ascii_uppercase())
            .copied()
    }

    /// Forwards a key transition to the machine. Returns `false` for unmapped keys, which are
    /// otherwise ignored.
    pub fn apply<M: Machine + ?Sized>(
        &self,
        machine: &mut M,
        physical_key: &str,
        pressed: bool,
    ) -> bool {
        match self.logical_key(physical_key) {
            Some(index) => {
                machine.set_key(index, pressed);
                true
            }
            None => false,
        }
    }
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::from_layout(&KeypadSettings::default().layout)
            .unwrap_or_else(|err| unreachable!("default keypad layout is valid: {err}"))
    }
}
