//! Output and template locations on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::StorageConfig;
use crate::pptx::{self, Presentation};

#[derive(Debug, Clone)]
pub struct Storage {
    output_dir: PathBuf,
    templates_dir: PathBuf,
    template_path: PathBuf,
    output_file: String,
    unique_names: bool,
}

impl Storage {
    pub fn from_config(config: &StorageConfig) -> Self {
        let templates_dir = PathBuf::from(&config.templates_dir);
        Self {
            output_dir: PathBuf::from(&config.output_dir),
            template_path: templates_dir.join(&config.template_file),
            templates_dir,
            output_file: config.output_file.clone(),
            unique_names: config.unique_names,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Create the output and template directories if missing
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        fs::create_dir_all(&self.templates_dir)
    }

    /// The configured template, if it exists
    pub fn template(&self) -> Option<&Path> {
        self.template_path
            .is_file()
            .then_some(self.template_path.as_path())
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// File name for the next generated deck
    pub fn next_file_name(&self) -> String {
        if self.unique_names {
            format!("{}.pptx", uuid::Uuid::new_v4())
        } else {
            self.output_file.clone()
        }
    }

    /// Save `prs` as `file_name` in the output directory.
    ///
    /// The deck is written to a hidden sibling first and renamed into place,
    /// so readers see either the previous file or the complete new one.
    pub fn save(&self, prs: &Presentation, file_name: &str) -> pptx::Result<PathBuf> {
        let target = self.output_dir.join(file_name);
        let temp = self
            .output_dir
            .join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4().simple()));

        if let Err(e) = prs.save(&temp).and_then(|()| Ok(fs::rename(&temp, &target)?)) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        Ok(target)
    }

    /// Path of a downloadable file, or `None` for names that could escape
    /// the output directory or refer to hidden files
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        if !is_safe_file_name(file_name) {
            return None;
        }
        Some(self.output_dir.join(file_name))
    }
}

fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn storage_in(dir: &Path, unique_names: bool) -> Storage {
        let mut config = Config::defaults().unwrap().storage;
        config.output_dir = dir.join("output").to_string_lossy().into_owned();
        config.templates_dir = dir.join("templates").to_string_lossy().into_owned();
        config.unique_names = unique_names;
        Storage::from_config(&config)
    }

    #[test]
    fn test_ensure_dirs_and_template_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path(), false);
        storage.ensure_dirs().unwrap();
        assert!(storage.output_dir().is_dir());
        assert!(storage.templates_dir().is_dir());
        assert_eq!(storage.template(), None);

        fs::write(storage.template_path(), b"placeholder").unwrap();
        assert_eq!(storage.template(), Some(storage.template_path()));
    }

    #[test]
    fn test_file_names() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(storage_in(dir.path(), false).next_file_name(), "output.pptx");

        let unique = storage_in(dir.path(), true);
        let a = unique.next_file_name();
        let b = unique.next_file_name();
        assert!(a.ends_with(".pptx"));
        assert_eq!(a.len(), 36 + ".pptx".len());
        assert_ne!(a, b);
    }

    #[test]
    fn test_save_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path(), false);
        storage.ensure_dirs().unwrap();

        let target = storage.output_dir().join("output.pptx");
        fs::write(&target, b"old").unwrap();

        let prs = Presentation::new().unwrap();
        let saved = storage.save(&prs, "output.pptx").unwrap();
        assert_eq!(saved, target);
        assert!(fs::read(&target).unwrap().starts_with(b"PK"));

        // no temporary files left behind
        let names: Vec<_> = fs::read_dir(storage.output_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["output.pptx"]);
    }

    #[test]
    fn test_resolve_rejects_unsafe_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path(), false);

        assert_eq!(
            storage.resolve("output.pptx"),
            Some(storage.output_dir().join("output.pptx"))
        );
        for name in ["", "../secret", "a/b.pptx", "a\\b.pptx", ".hidden", "..", "x\0y"] {
            assert_eq!(storage.resolve(name), None, "{name:?}");
        }
    }
}
