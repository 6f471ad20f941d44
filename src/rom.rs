use crate::{configuration::RomSettings, error::FetchError};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

/// Resolves a ROM identifier to the raw program image. No format is imposed on the bytes; they
/// are loaded into memory verbatim.
pub trait RomSource {
    fn fetch(&self, rom: &str) -> Result<Vec<u8>, FetchError>;
}

impl<R: RomSource + ?Sized> RomSource for &R {
    fn fetch(&self, rom: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(rom)
    }
}

/// Reads ROMs from a folder. Identifiers are file names without the extension, so `"pong"` is
/// `<folder>/pong.ch8`.
#[derive(Clone, Debug)]
pub struct FileRomSource {
    folder: PathBuf,
    extension: String,
}

impl FileRomSource {
    pub fn new(folder: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn from_settings(settings: &RomSettings) -> Self {
        Self::new(&settings.folder, &settings.extension)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Names of all ROMs in the folder, sorted. Files with another extension and hidden files
    /// are skipped. A missing folder is created empty.
    pub fn list(&self) -> io::Result<Vec<String>> {
        if !fs::exists(&self.folder)? {
            fs::create_dir_all(&self.folder)?;
        }

        let mut names: Vec<String> = fs::read_dir(&self.folder)?
            .map(|result| result.map(|dir_entry| dir_entry.path()))
            .collect::<Result<Vec<_>, io::Error>>()?
            .iter()
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .is_some_and(|extension| extension == self.extension.as_str())
            })
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();

        names.sort();
        Ok(names)
    }

    fn path_of(&self, rom: &str) -> Option<PathBuf> {
        // Identifiers name a file inside the folder, never a path out of it
        let file_name = Path::new(rom).file_name()?;
        if file_name != rom {
            return None;
        }

        let has_extension = Path::new(rom)
            .extension()
            .is_some_and(|extension| extension == self.extension.as_str());
        if has_extension {
            Some(self.folder.join(rom))
        } else {
            Some(self.folder.join(format!("{rom}.{}", self.extension)))
        }
    }
}

impl RomSource for FileRomSource {
    fn fetch(&self, rom: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.path_of(rom).ok_or_else(|| FetchError::NotFound {
            rom: rom.to_string(),
        })?;

        // std::fs::read_to_string could corrupt the data because String expects UTF-8
        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound {
                rom: rom.to_string(),
            },
            _ => FetchError::Io {
                rom: rom.to_string(),
                source,
            },
        })
    }
}

/// ROMs held in memory, for programs bundled with `include_bytes!` or generated on the fly.
#[derive(Clone, Debug, Default)]
pub struct RomLibrary {
    roms: BTreeMap<String, Vec<u8>>,
}

impl RomLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, program: impl Into<Vec<u8>>) -> Self {
        self.insert(name, program);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, program: impl Into<Vec<u8>>) {
        self.roms.insert(name.into(), program.into());
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roms.keys().map(String::as_str)
    }
}

impl RomSource for RomLibrary {
    fn fetch(&self, rom: &str) -> Result<Vec<u8>, FetchError> {
        self.roms
            .get(rom)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                rom: rom.to_string(),
            })
    }
}
