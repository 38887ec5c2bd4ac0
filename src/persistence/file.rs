use super::{AttendanceBackend, AttendanceMap, PersistenceResult};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Writes the whole attendance map as pretty-printed JSON. The document
/// shape is `{member: {"YYYY-MM-DD": "status"}}`.
pub fn save_map_to_json<P: AsRef<Path>>(map: &AttendanceMap, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, map)?;
    Ok(())
}

pub fn load_map_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<AttendanceMap> {
    let file = File::open(path)?;
    let map: AttendanceMap = serde_json::from_reader(file)?;
    Ok(map)
}

/// File-backed snapshot store. A missing file reads as "nothing stored yet"
/// rather than an error, so first launches start clean.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AttendanceBackend for JsonFileBackend {
    fn save(&self, map: &AttendanceMap) -> PersistenceResult<()> {
        save_map_to_json(map, &self.path)
    }

    fn load(&self) -> PersistenceResult<Option<AttendanceMap>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(serde_json::from_reader(file)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
