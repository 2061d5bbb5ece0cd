//!
//! # Field dumps and their manifest
//!
//! The vectorial scan keeps every iteration's intensity cube for offline
//! reduction. Instead of encoding the sweep parameter in the file name and
//! parsing it back with a float pattern, each dump is listed in an explicit
//! [`Manifest`] of `{parameter, path}` records persisted as TOML next to the
//! `.npy` files.

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use ndarray::ArrayD;
use ndarray_npy::{read_npy, write_npy, ReadNpyError, WriteNpyError};
use serde::{Deserialize, Serialize};

use crate::IntensityField;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot create the dump directory {1}")]
    Dir(#[source] std::io::Error, PathBuf),
    #[error("cannot open the manifest file {1}")]
    Open(#[source] std::io::Error, PathBuf),
    #[error("cannot create the manifest file {1}")]
    Create(#[source] std::io::Error, PathBuf),
    #[error("cannot read the manifest file {1}")]
    Read(#[source] std::io::Error, PathBuf),
    #[error("cannot write the manifest file {1}")]
    Write(#[source] std::io::Error, PathBuf),
    #[error("cannot deserialize the manifest from toml")]
    Load(#[from] toml::de::Error),
    #[error("cannot serialize the manifest into toml")]
    Save(#[from] toml::ser::Error),
    #[error("cannot dump the intensity field")]
    DumpField(#[from] WriteNpyError),
    #[error("cannot load the intensity field back")]
    LoadField(#[from] ReadNpyError),
}

/// One dumped field: the sweep parameter it belongs to and where it landed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub parameter: f64,
    pub path: PathBuf,
}

/// The ordered list of dumped fields of one sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}
impl Manifest {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn push(&mut self, parameter: f64, path: PathBuf) {
        self.entries.push(ManifestEntry { parameter, path });
    }
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// The dump whose parameter is closest to `parameter`
    pub fn nearest(&self, parameter: f64) -> Option<&ManifestEntry> {
        self.entries
            .iter()
            .min_by(|a, b| {
                (a.parameter - parameter)
                    .abs()
                    .total_cmp(&(b.parameter - parameter).abs())
            })
    }
    /// Load the manifest from a toml file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let mut file = File::open(&path)
            .map_err(|e| ManifestError::Open(e, path.as_ref().to_path_buf()))?;
        let mut toml = String::new();
        file.read_to_string(&mut toml)
            .map_err(|e| ManifestError::Read(e, path.as_ref().to_path_buf()))?;
        let manifest: Manifest = toml::from_str(&toml)?;
        Ok(manifest)
    }
    /// Save the manifest to a toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ManifestError> {
        let toml = toml::to_string_pretty(self)?;
        let mut file = File::create(&path)
            .map_err(|e| ManifestError::Create(e, path.as_ref().to_path_buf()))?;
        write!(file, "# zscan field dump manifest\n\n{}", toml)
            .map_err(|e| ManifestError::Write(e, path.as_ref().to_path_buf()))?;
        Ok(())
    }
    /// Load a dumped field back from one of the manifest entries
    pub fn load_field(entry: &ManifestEntry) -> Result<IntensityField, ManifestError> {
        let data: ArrayD<f32> = read_npy(&entry.path)?;
        Ok(IntensityField::new(data))
    }
}

/// Writes one `.npy` file per sweep iteration and keeps the manifest current
///
/// Files are numbered in sweep order; the parameter-to-file mapping lives in
/// the manifest, not in the file names. The manifest is rewritten after every
/// dump so an aborted sweep still leaves a consistent listing behind.
#[derive(Debug)]
pub struct FieldDump {
    dir: PathBuf,
    manifest: Manifest,
    manifest_path: PathBuf,
}
impl FieldDump {
    /// Dumps land in `dir`, the manifest at `dir/manifest.toml`
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, ManifestError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| ManifestError::Dir(e, dir.clone()))?;
        let manifest_path = dir.join("manifest.toml");
        Ok(Self {
            dir,
            manifest: Manifest::new(),
            manifest_path,
        })
    }
    /// Writes `field` as the next numbered dump and records it
    pub fn dump(
        &mut self,
        parameter: f64,
        field: &IntensityField,
    ) -> Result<PathBuf, ManifestError> {
        let path = self
            .dir
            .join(format!("field_{:04}.npy", self.manifest.len()));
        write_npy(&path, field.as_array())?;
        self.manifest.push(parameter, path.clone());
        self.manifest.save(&self.manifest_path)?;
        log::info!(
            "dumped {} samples for sweep point {} to {:?}",
            field.len(),
            parameter,
            path
        );
        Ok(path)
    }
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("zscan-{}-{}", name, std::process::id()))
    }

    #[test]
    fn manifest_toml_round_trip() {
        let dir = scratch("manifest-round-trip");
        std::fs::create_dir_all(&dir).unwrap();
        let mut manifest = Manifest::new();
        manifest.push(60.0, dir.join("field_0000.npy"));
        manifest.push(-100.0, dir.join("field_0001.npy"));
        let path = dir.join("manifest.toml");
        manifest.save(&path).unwrap();
        let reloaded = Manifest::load(&path).unwrap();
        assert_eq!(reloaded, manifest);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn dump_then_load_field_back() {
        let dir = scratch("dump-load");
        let mut dump = FieldDump::new(&dir).unwrap();
        let field = IntensityField::from(Array2::<f32>::from_elem((4, 8), 2.5));
        dump.dump(42.0, &field).unwrap();
        let manifest = Manifest::load(dump.manifest_path()).unwrap();
        assert_eq!(manifest.len(), 1);
        let entry = manifest.nearest(40.0).unwrap();
        assert_eq!(entry.parameter, 42.0);
        let reloaded = Manifest::load_field(entry).unwrap();
        assert_eq!(reloaded, field);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn dumps_are_numbered_in_sweep_order() {
        let dir = scratch("dump-order");
        let mut dump = FieldDump::new(&dir).unwrap();
        let field = IntensityField::from(Array2::<f32>::ones((2, 2)));
        let first = dump.dump(3.0, &field).unwrap();
        let second = dump.dump(-1.0, &field).unwrap();
        assert!(first.ends_with("field_0000.npy"));
        assert!(second.ends_with("field_0001.npy"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
