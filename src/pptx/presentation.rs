//! Presentation document: open or create, add slides from layouts, save.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::content_types::ContentTypes;
use super::default_template;
use super::error::{Error, Result};
use super::package::{relative_target, rels_part_name, Package, CONTENT_TYPES_PART};
use super::relationships::Relationships;
use super::slide::{parse_common_slide_name, parse_shapes, Shape, Slide};
use super::xml::{
    attr, prefix_for, qualified, rel_id, CT_MACRO_MAIN, CT_PRESENTATION_MAIN, CT_SLIDE,
    CT_SLIDESHOW_MAIN, CT_TEMPLATE_MAIN, NS_PML, NS_REL, RT_OFFICE_DOCUMENT, RT_SLIDE,
    RT_SLIDE_LAYOUT,
};

/// Lowest id PowerPoint accepts for a `p:sldId`.
const MIN_SLIDE_ID: u32 = 256;

/// A layout of the first slide master.
#[derive(Debug, Clone)]
pub struct SlideLayout {
    partname: String,
    name: String,
    shapes: Vec<Shape>,
}

impl SlideLayout {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partname(&self) -> &str {
        &self.partname
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.is_placeholder())
    }
}

/// An editable presentation package.
#[derive(Debug, Clone)]
pub struct Presentation {
    package: Package,
    content_types: ContentTypes,
    main_part: String,
    layouts: Vec<SlideLayout>,
    slides: Vec<Slide>,
}

impl Presentation {
    /// Start from the built-in default presentation.
    pub fn new() -> Result<Self> {
        Self::from_package(default_template::build()?)
    }

    /// Open a `.pptx` or `.potx` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_package(Package::read(reader)?)
    }

    fn from_package(package: Package) -> Result<Self> {
        let content_types = ContentTypes::parse(package.part_str(CONTENT_TYPES_PART)?)?;

        let root_rels = Relationships::for_part(&package, "")?;
        let main_part = root_rels
            .first_of_type(RT_OFFICE_DOCUMENT)
            .and_then(|rel| root_rels.resolve("", &rel.id))
            .ok_or_else(|| Error::InvalidPackage("no main document relationship".to_string()))?;

        match content_types.content_type(&main_part) {
            Some(CT_PRESENTATION_MAIN | CT_TEMPLATE_MAIN | CT_MACRO_MAIN | CT_SLIDESHOW_MAIN) => {}
            other => {
                return Err(Error::InvalidPackage(format!(
                    "main part is not a presentation (content type {})",
                    other.unwrap_or("unknown")
                )))
            }
        }

        let ids = PresentationIds::parse(package.part_str(&main_part)?)?;
        let pres_rels = Relationships::for_part(&package, &main_part)?;

        let layouts = match ids.master_rel_ids.first() {
            Some(rid) => {
                let master_part = pres_rels.resolve(&main_part, rid).ok_or_else(|| {
                    Error::InvalidPackage(format!("slide master relationship {rid} is dangling"))
                })?;
                load_layouts(&package, &master_part)?
            }
            None => Vec::new(),
        };

        let mut slides = Vec::with_capacity(ids.slide_rel_ids.len());
        for rid in &ids.slide_rel_ids {
            let partname = pres_rels.resolve(&main_part, rid).ok_or_else(|| {
                Error::InvalidPackage(format!("slide relationship {rid} is dangling"))
            })?;
            let slide_rels = Relationships::for_part(&package, &partname)?;
            let layout_partname = slide_rels
                .first_of_type(RT_SLIDE_LAYOUT)
                .and_then(|rel| slide_rels.resolve(&partname, &rel.id))
                .unwrap_or_default();
            let xml = package.part_str(&partname)?;
            slides.push(Slide::parse(partname, layout_partname, xml)?);
        }

        Ok(Self {
            package,
            content_types,
            main_part,
            layouts,
            slides,
        })
    }

    /// Layouts of the first slide master, in master order.
    pub fn slide_layouts(&self) -> &[SlideLayout] {
        &self.layouts
    }

    pub fn slide_layout(&self, index: usize) -> Result<&SlideLayout> {
        self.layouts.get(index).ok_or(Error::LayoutOutOfRange {
            index,
            available: self.layouts.len(),
        })
    }

    /// All slides in presentation order, loaded ones first.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Append a slide based on the layout at `layout_index`.
    pub fn add_slide(&mut self, layout_index: usize) -> Result<&mut Slide> {
        let layout = self.slide_layout(layout_index)?;
        let partname = self.next_slide_partname();
        let slide = Slide::from_layout(partname, &layout.partname, &layout.shapes);

        let index = self.slides.len();
        self.slides.push(slide);
        Ok(&mut self.slides[index])
    }

    fn next_slide_partname(&self) -> String {
        (1..)
            .map(|n| format!("ppt/slides/slide{n}.xml"))
            .find(|name| {
                !self.package.contains(name) && !self.slides.iter().any(|s| s.partname() == name)
            })
            .unwrap_or_default()
    }

    /// Write the presentation to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = self.write_to(BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut package = self.package.clone();
        let mut content_types = self.content_types.clone();

        // a template saved as-is would not open as a .pptx
        if content_types.content_type(&self.main_part) == Some(CT_TEMPLATE_MAIN) {
            content_types.set_override(&self.main_part, CT_PRESENTATION_MAIN);
        }

        let mut pres_rels = Relationships::for_part(&package, &self.main_part)?;
        let mut new_rel_ids = Vec::new();
        for slide in self.slides.iter().filter(|s| s.is_added()) {
            package.insert(slide.partname(), slide.to_xml()?);

            let mut slide_rels = Relationships::default();
            slide_rels.add(
                RT_SLIDE_LAYOUT,
                &relative_target(slide.partname(), slide.layout_partname()),
            );
            package.insert(rels_part_name(slide.partname()), slide_rels.to_xml()?);
            content_types.set_override(slide.partname(), CT_SLIDE);

            new_rel_ids.push(pres_rels.add(
                RT_SLIDE,
                &relative_target(&self.main_part, slide.partname()),
            ));
        }

        if !new_rel_ids.is_empty() {
            let xml = register_slides(self.package.part_str(&self.main_part)?, &new_rel_ids)?;
            package.insert(self.main_part.clone(), xml);
            package.insert(rels_part_name(&self.main_part), pres_rels.to_xml()?);
        }
        package.insert(CONTENT_TYPES_PART, content_types.to_xml()?);

        package.write(writer)
    }
}

fn load_layouts(package: &Package, master_part: &str) -> Result<Vec<SlideLayout>> {
    let master_xml = package.part_str(master_part)?;
    let master_rels = Relationships::for_part(package, master_part)?;

    let mut reader = Reader::from_str(master_xml);
    let mut layouts = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldLayoutId" => {
                let Some(rid) = rel_id(&e)? else { continue };
                let partname = master_rels.resolve(master_part, &rid).ok_or_else(|| {
                    Error::InvalidPackage(format!("slide layout relationship {rid} is dangling"))
                })?;
                let xml = package.part_str(&partname)?;
                layouts.push(SlideLayout {
                    name: parse_common_slide_name(xml)?.unwrap_or_default(),
                    shapes: parse_shapes(xml)?,
                    partname,
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(layouts)
}

/// Relationship ids and slide ids referenced from `presentation.xml`.
#[derive(Debug, Default)]
struct PresentationIds {
    master_rel_ids: Vec<String>,
    slide_rel_ids: Vec<String>,
    max_slide_id: Option<u32>,
}

impl PresentationIds {
    fn parse(xml: &str) -> Result<Self> {
        let mut ids = Self::default();
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"sldMasterId" => ids.master_rel_ids.extend(rel_id(&e)?),
                    b"sldId" => {
                        ids.slide_rel_ids.extend(rel_id(&e)?);
                        if let Some(id) = attr(&e, b"id")?.and_then(|v| v.parse::<u32>().ok()) {
                            ids.max_slide_id = Some(ids.max_slide_id.map_or(id, |m| m.max(id)));
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(ids)
    }
}

/// Children of `p:presentation` that must follow `p:sldIdLst`.
const AFTER_SLIDE_LIST: &[&[u8]] = &[
    b"sldSz",
    b"notesSz",
    b"smartTags",
    b"embeddedFontLst",
    b"custShowLst",
    b"photoAlbum",
    b"custDataLst",
    b"kinsoku",
    b"defaultTextStyle",
    b"modifyVerifier",
    b"extLst",
];

/// Rewrite `presentation.xml` with a `p:sldId` entry per new relationship id.
fn register_slides(xml: &str, rel_ids: &[String]) -> Result<Vec<u8>> {
    let existing = PresentationIds::parse(xml)?;
    let first_id = existing
        .max_slide_id
        .map_or(MIN_SLIDE_ID, |id| id.saturating_add(1).max(MIN_SLIDE_ID));

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut prefixes = ("p".to_string(), "r".to_string());
    let mut depth = 0usize;
    let mut inserted = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if depth == 0 => {
                let (root, pml, rel) = prepare_root(&e)?;
                prefixes = (pml, rel);
                writer.write_event(Event::Start(root))?;
                depth += 1;
            }
            Event::Start(e) if depth == 1 && !inserted && is_after_slide_list(&e) => {
                write_slide_list(&mut writer, &prefixes, first_id, rel_ids, None)?;
                inserted = true;
                writer.write_event(Event::Start(e))?;
                depth += 1;
            }
            Event::Empty(e) if depth == 1 && !inserted && is_after_slide_list(&e) => {
                write_slide_list(&mut writer, &prefixes, first_id, rel_ids, None)?;
                inserted = true;
                writer.write_event(Event::Empty(e))?;
            }
            Event::Empty(e) if depth == 1 && e.local_name().as_ref() == b"sldIdLst" => {
                let list = Some(e.into_owned());
                write_slide_list(&mut writer, &prefixes, first_id, rel_ids, list)?;
                inserted = true;
            }
            Event::End(e) if depth == 2 && !inserted && e.local_name().as_ref() == b"sldIdLst" => {
                write_slide_ids(&mut writer, &prefixes, first_id, rel_ids)?;
                inserted = true;
                writer.write_event(Event::End(e))?;
                depth -= 1;
            }
            Event::Start(e) => {
                writer.write_event(Event::Start(e))?;
                depth += 1;
            }
            Event::End(e) => {
                writer.write_event(Event::End(e))?;
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    if !inserted {
        return Err(Error::InvalidPackage(
            "presentation part has no place for a slide list".to_string(),
        ));
    }
    Ok(writer.into_inner())
}

fn is_after_slide_list(e: &BytesStart<'_>) -> bool {
    AFTER_SLIDE_LIST.contains(&e.local_name().as_ref())
}

/// Root element with the prefixes for the PresentationML and relationship
/// namespaces, declaring `xmlns:r` when the document lacks it.
fn prepare_root(e: &BytesStart<'_>) -> Result<(BytesStart<'static>, String, String)> {
    let mut root = e.to_owned();
    let pml = match prefix_for(e, NS_PML)? {
        Some(prefix) => prefix,
        None => e
            .name()
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
            .unwrap_or_default(),
    };
    let rel = match prefix_for(e, NS_REL)? {
        Some(prefix) => prefix,
        None => {
            root.push_attribute(("xmlns:r", NS_REL));
            "r".to_string()
        }
    };
    Ok((root, pml, rel))
}

fn write_slide_list(
    writer: &mut Writer<Vec<u8>>,
    prefixes: &(String, String),
    first_id: u32,
    rel_ids: &[String],
    element: Option<BytesStart<'static>>,
) -> Result<()> {
    let name = qualified(&prefixes.0, "sldIdLst");
    let start = element.unwrap_or_else(|| BytesStart::new(name.clone()));
    writer.write_event(Event::Start(start))?;
    write_slide_ids(writer, prefixes, first_id, rel_ids)?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_slide_ids(
    writer: &mut Writer<Vec<u8>>,
    prefixes: &(String, String),
    first_id: u32,
    rel_ids: &[String],
) -> Result<()> {
    let name = qualified(&prefixes.0, "sldId");
    let rel_attr = qualified(&prefixes.1, "id");
    for (offset, rid) in (0u32..).zip(rel_ids) {
        let id = first_id.saturating_add(offset).to_string();
        writer
            .create_element(name.as_str())
            .with_attribute(("id", id.as_str()))
            .with_attribute((rel_attr.as_str(), rid.as_str()))
            .write_empty()?;
    }
    Ok(())
}
