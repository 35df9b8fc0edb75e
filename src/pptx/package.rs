//! OPC package container: the ZIP archive of named parts behind a `.pptx`.

use std::collections::BTreeMap;
use std::io::{Read, Seek, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::{Error, Result};

/// Name of the part listing content types for every other part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// In-memory set of package parts keyed by part name (no leading slash).
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every file entry of a ZIP archive into memory.
    pub fn read<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = BTreeMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = normalize_part_name(file.name());
            let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
            file.read_to_end(&mut data)?;
            parts.insert(name, data);
        }

        if !parts.contains_key(CONTENT_TYPES_PART) {
            return Err(Error::InvalidPackage(format!(
                "archive has no {CONTENT_TYPES_PART}"
            )));
        }

        Ok(Self { parts })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    pub fn part(&self, name: &str) -> Result<&[u8]> {
        self.get(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Part contents as UTF-8 text (all XML parts in a presentation are UTF-8).
    pub fn part_str(&self, name: &str) -> Result<&str> {
        std::str::from_utf8(self.part(name)?)
            .map_err(|e| Error::InvalidPackage(format!("part {name} is not UTF-8: {e}")))
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.parts.insert(normalize_part_name(&name.into()), data);
    }

    /// Write the package as a deflated ZIP, content types first.
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        if let Some(data) = self.parts.get(CONTENT_TYPES_PART) {
            zip.start_file(CONTENT_TYPES_PART, options)?;
            zip.write_all(data)?;
        }

        for (name, data) in self
            .parts
            .iter()
            .filter(|(name, _)| name.as_str() != CONTENT_TYPES_PART)
        {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        Ok(zip.finish()?)
    }
}

/// Strip the leading slash OPC part names carry in XML references.
pub fn normalize_part_name(name: &str) -> String {
    name.trim_start_matches('/').to_string()
}

/// Name of the relationships part belonging to `part` (`""` is the package root).
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{part}.rels"),
    }
}

/// Directory segments of the folder containing `part`.
fn parent_segments(part: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = part.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();
    segments
}

/// Resolve a relationship target relative to the part that owns it.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments = parent_segments(source_part);
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Relative reference from `source_part` to `target_part`, as stored in rels.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir = parent_segments(source_part);
    let target: Vec<&str> = target_part.split('/').filter(|s| !s.is_empty()).collect();

    let common = source_dir
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = std::iter::repeat("..")
        .take(source_dir.len() - common)
        .collect();
    segments.extend_from_slice(&target[common..]);
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_rels_part_name() {
        assert_eq!(rels_part_name(""), "_rels/.rels");
        assert_eq!(
            rels_part_name("ppt/presentation.xml"),
            "ppt/_rels/presentation.xml.rels"
        );
        assert_eq!(
            rels_part_name("ppt/slides/slide3.xml"),
            "ppt/slides/_rels/slide3.xml.rels"
        );
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("", "ppt/presentation.xml"),
            "ppt/presentation.xml"
        );
        assert_eq!(
            resolve_target("ppt/presentation.xml", "slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "/ppt/media/image1.png"),
            "ppt/media/image1.png"
        );
    }

    #[test]
    fn test_relative_target() {
        assert_eq!(
            relative_target("ppt/slides/slide1.xml", "ppt/slideLayouts/slideLayout2.xml"),
            "../slideLayouts/slideLayout2.xml"
        );
        assert_eq!(
            relative_target("ppt/presentation.xml", "ppt/slides/slide4.xml"),
            "slides/slide4.xml"
        );
        assert_eq!(
            relative_target("", "ppt/presentation.xml"),
            "ppt/presentation.xml"
        );
    }

    #[test]
    fn test_write_then_read_keeps_parts() {
        let mut package = Package::new();
        package.insert("/ppt/presentation.xml", b"<p:presentation/>".to_vec());
        package.insert(CONTENT_TYPES_PART, b"<Types/>".to_vec());

        let cursor = package.write(Cursor::new(Vec::new())).unwrap();
        let read = Package::read(Cursor::new(cursor.into_inner())).unwrap();

        assert_eq!(read.part("ppt/presentation.xml").unwrap(), b"<p:presentation/>");
        assert!(read.contains(CONTENT_TYPES_PART));
    }

    #[test]
    fn test_read_rejects_archive_without_content_types() {
        let mut package = Package::new();
        package.insert("word/document.xml", b"<w:document/>".to_vec());
        let cursor = package.write(Cursor::new(Vec::new())).unwrap();

        let err = Package::read(Cursor::new(cursor.into_inner())).unwrap_err();
        assert!(matches!(err, Error::InvalidPackage(_)));
    }
}
