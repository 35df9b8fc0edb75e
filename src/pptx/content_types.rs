//! `[Content_Types].xml`: default (by extension) and override (by part) types.

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use super::error::Result;
use super::package::normalize_part_name;
use super::xml::{attr, declaration, NS_CONTENT_TYPES};

#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"Default" => {
                        if let (Some(ext), Some(ct)) =
                            (attr(&e, b"Extension")?, attr(&e, b"ContentType")?)
                        {
                            types.defaults.push((ext.to_ascii_lowercase(), ct));
                        }
                    }
                    b"Override" => {
                        if let (Some(part), Some(ct)) =
                            (attr(&e, b"PartName")?, attr(&e, b"ContentType")?)
                        {
                            types.overrides.push((normalize_part_name(&part), ct));
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(types)
    }

    /// Content type of `part`: an override wins over the extension default.
    pub fn content_type(&self, part: &str) -> Option<&str> {
        let part = normalize_part_name(part);
        if let Some((_, ct)) = self.overrides.iter().find(|(name, _)| *name == part) {
            return Some(ct);
        }
        let ext = part.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    pub fn set_default(&mut self, extension: &str, content_type: &str) {
        let extension = extension.to_ascii_lowercase();
        match self.defaults.iter_mut().find(|(e, _)| *e == extension) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.defaults.push((extension, content_type.to_string())),
        }
    }

    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let part = normalize_part_name(part);
        match self.overrides.iter_mut().find(|(name, _)| *name == part) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.overrides.push((part, content_type.to_string())),
        }
    }

    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(declaration()))?;
        writer
            .create_element("Types")
            .with_attribute(("xmlns", NS_CONTENT_TYPES))
            .write_inner_content(|w| {
                for (ext, ct) in &self.defaults {
                    w.create_element("Default")
                        .with_attribute(("Extension", ext.as_str()))
                        .with_attribute(("ContentType", ct.as_str()))
                        .write_empty()?;
                }
                for (part, ct) in &self.overrides {
                    let part_name = format!("/{part}");
                    w.create_element("Override")
                        .with_attribute(("PartName", part_name.as_str()))
                        .with_attribute(("ContentType", ct.as_str()))
                        .write_empty()?;
                }
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(writer.into_inner())
    }
}
