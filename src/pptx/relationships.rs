//! Part relationships (`_rels/*.rels`).

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use super::error::Result;
use super::package::{rels_part_name, resolve_target, Package};
use super::xml::{attr, declaration, NS_PKG_REL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    /// Relationships of `part`; a part without a rels part has none.
    pub fn for_part(package: &Package, part: &str) -> Result<Self> {
        let rels_name = rels_part_name(part);
        if package.contains(&rels_name) {
            Self::parse(package.part_str(&rels_name)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let mut rels = Vec::new();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let (Some(id), Some(rel_type), Some(target)) =
                        (attr(&e, b"Id")?, attr(&e, b"Type")?, attr(&e, b"Target")?)
                    else {
                        continue;
                    };
                    let external = attr(&e, b"TargetMode")?.as_deref() == Some("External");
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { rels })
    }

    pub fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.rel_type == rel_type)
    }

    /// Part name a relationship id points at, resolved against `source_part`.
    pub fn resolve(&self, source_part: &str, id: &str) -> Option<String> {
        self.by_id(id)
            .filter(|r| !r.external)
            .map(|r| resolve_target(source_part, &r.target))
    }

    /// Add an internal relationship and return its new `rIdN`.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let next = self
            .rels
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{next}");
        self.rels.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(declaration()))?;
        writer
            .create_element("Relationships")
            .with_attribute(("xmlns", NS_PKG_REL))
            .write_inner_content(|w| {
                for rel in &self.rels {
                    let mut element = w
                        .create_element("Relationship")
                        .with_attribute(("Id", rel.id.as_str()))
                        .with_attribute(("Type", rel.rel_type.as_str()))
                        .with_attribute(("Target", rel.target.as_str()));
                    if rel.external {
                        element = element.with_attribute(("TargetMode", "External"));
                    }
                    element.write_empty()?;
                }
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::xml::{RT_SLIDE, RT_SLIDE_MASTER};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_and_resolve() {
        let rels = Relationships::parse(SAMPLE).unwrap();
        assert_eq!(
            rels.first_of_type(RT_SLIDE_MASTER).map(|r| r.id.as_str()),
            Some("rId1")
        );
        assert_eq!(
            rels.resolve("ppt/presentation.xml", "rId1").as_deref(),
            Some("ppt/slideMasters/slideMaster1.xml")
        );
        // external targets are not package parts
        assert_eq!(rels.resolve("ppt/presentation.xml", "rId7"), None);
    }

    #[test]
    fn test_add_uses_next_free_id() {
        let mut rels = Relationships::parse(SAMPLE).unwrap();
        assert_eq!(rels.add(RT_SLIDE, "slides/slide1.xml"), "rId8");

        let xml = rels.to_xml().unwrap();
        let reparsed = Relationships::parse(std::str::from_utf8(&xml).unwrap()).unwrap();
        assert_eq!(
            reparsed.by_id("rId8").map(|r| r.target.as_str()),
            Some("slides/slide1.xml")
        );
        assert!(reparsed.by_id("rId7").is_some_and(|r| r.external));
    }
}
