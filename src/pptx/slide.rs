//! Slides, placeholder shapes and their text frames.
//!
//! Only what slide authoring needs is modelled: shapes carrying a placeholder
//! (`p:ph`) and the paragraphs of their text body. Slides loaded from an
//! existing package are parsed for inspection and written back untouched.

use std::fmt::Write as _;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::error::Result;
use super::xml::{attr, declaration, NS_DML, NS_PML, NS_REL};

/// Placeholder kinds (`ST_PlaceholderType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderType {
    Title,
    CenterTitle,
    SubTitle,
    Body,
    Object,
    Chart,
    Table,
    ClipArt,
    Diagram,
    Media,
    SlideImage,
    Picture,
    Date,
    Footer,
    Header,
    SlideNumber,
}

impl PlaceholderType {
    /// Parse a `type` attribute; absent or unknown values mean `obj`.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("title") => Self::Title,
            Some("ctrTitle") => Self::CenterTitle,
            Some("subTitle") => Self::SubTitle,
            Some("body") => Self::Body,
            Some("chart") => Self::Chart,
            Some("tbl") => Self::Table,
            Some("clipArt") => Self::ClipArt,
            Some("dgm") => Self::Diagram,
            Some("media") => Self::Media,
            Some("sldImg") => Self::SlideImage,
            Some("pic") => Self::Picture,
            Some("dt") => Self::Date,
            Some("ftr") => Self::Footer,
            Some("hdr") => Self::Header,
            Some("sldNum") => Self::SlideNumber,
            _ => Self::Object,
        }
    }

    /// Attribute value to write, `None` for the schema default `obj`.
    pub const fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::Title => Some("title"),
            Self::CenterTitle => Some("ctrTitle"),
            Self::SubTitle => Some("subTitle"),
            Self::Body => Some("body"),
            Self::Object => None,
            Self::Chart => Some("chart"),
            Self::Table => Some("tbl"),
            Self::ClipArt => Some("clipArt"),
            Self::Diagram => Some("dgm"),
            Self::Media => Some("media"),
            Self::SlideImage => Some("sldImg"),
            Self::Picture => Some("pic"),
            Self::Date => Some("dt"),
            Self::Footer => Some("ftr"),
            Self::Header => Some("hdr"),
            Self::SlideNumber => Some("sldNum"),
        }
    }

    pub const fn is_title(self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle)
    }

    /// Header/footer style placeholders are not copied onto new slides.
    const fn is_layout_only(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Footer | Self::SlideNumber | Self::Header
        )
    }

    const fn shape_basename(self) -> &'static str {
        match self {
            Self::Title | Self::CenterTitle => "Title",
            Self::SubTitle => "Subtitle",
            Self::Body => "Text Placeholder",
            Self::Object => "Content Placeholder",
            Self::Chart => "Chart Placeholder",
            Self::Table => "Table Placeholder",
            Self::ClipArt => "ClipArt Placeholder",
            Self::Diagram => "SmartArt Placeholder",
            Self::Media => "Media Placeholder",
            Self::SlideImage => "Slide Image Placeholder",
            Self::Picture => "Picture Placeholder",
            Self::Date => "Date Placeholder",
            Self::Footer => "Footer Placeholder",
            Self::Header => "Header Placeholder",
            Self::SlideNumber => "Slide Number Placeholder",
        }
    }
}

/// The `p:ph` element of a placeholder shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderFormat {
    pub kind: PlaceholderType,
    /// Placeholder index, 0 when the attribute is absent.
    pub idx: u32,
    pub orient: Option<String>,
    pub size: Option<String>,
}

/// A paragraph; line breaks (`a:br`) are held as `'\u{b}'`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    text: String,
}

impl Paragraph {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the paragraph text; `\n` and `\v` both become line breaks.
    pub fn set_text(&mut self, text: &str) {
        self.text = escape_control_chars(&text.replace('\n', "\u{b}"));
    }
}

/// Characters XML 1.0 cannot carry are written as `_xHHHH_`, the form
/// PowerPoint decodes back. Tab, line feed, carriage return and `\v` stay.
fn escape_control_chars(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' | '\n' | '\r' | '\u{b}' => escaped.push(c),
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => {
                let _ = write!(escaped, "_x{:04X}_", u32::from(c));
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFrame {
    paragraphs: Vec<Paragraph>,
}

impl Default for TextFrame {
    fn default() -> Self {
        Self {
            paragraphs: vec![Paragraph::default()],
        }
    }
}

impl TextFrame {
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    /// Remove all text, leaving a single empty paragraph.
    pub fn clear(&mut self) {
        self.paragraphs = vec![Paragraph::default()];
    }

    /// One paragraph per `\n`-separated line.
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph {
                text: escape_control_chars(line),
            })
            .collect();
    }

    /// Paragraph texts joined with `\n`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    id: u32,
    name: String,
    placeholder: Option<PlaceholderFormat>,
    text_frame: Option<TextFrame>,
}

impl Shape {
    pub const fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn placeholder_format(&self) -> Option<&PlaceholderFormat> {
        self.placeholder.as_ref()
    }

    pub const fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    pub const fn text_frame(&self) -> Option<&TextFrame> {
        self.text_frame.as_ref()
    }

    pub fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        self.text_frame.as_mut()
    }

    pub fn text(&self) -> String {
        self.text_frame.as_ref().map(TextFrame::text).unwrap_or_default()
    }

    /// Replace the shape text, creating a text frame if it has none.
    pub fn set_text(&mut self, text: &str) {
        self.text_frame
            .get_or_insert_with(TextFrame::default)
            .set_text(text);
    }

    fn is_title(&self) -> bool {
        self.placeholder.as_ref().is_some_and(|ph| ph.kind.is_title())
    }
}

/// A slide and the layout it was created from.
#[derive(Debug, Clone)]
pub struct Slide {
    partname: String,
    layout_partname: String,
    shapes: Vec<Shape>,
    added: bool,
}

impl Slide {
    /// New slide carrying a fresh copy of each of the layout's placeholders.
    pub(crate) fn from_layout(
        partname: String,
        layout_partname: &str,
        layout_shapes: &[Shape],
    ) -> Self {
        let mut shapes = Vec::new();
        for ph in layout_shapes
            .iter()
            .filter_map(Shape::placeholder_format)
            .filter(|ph| !ph.kind.is_layout_only())
        {
            let id = u32::try_from(shapes.len()).unwrap_or(u32::MAX - 2) + 2;
            shapes.push(Shape {
                id,
                name: format!("{} {}", ph.kind.shape_basename(), id - 1),
                placeholder: Some(ph.clone()),
                text_frame: Some(TextFrame::default()),
            });
        }

        Self {
            partname,
            layout_partname: layout_partname.to_string(),
            shapes,
            added: true,
        }
    }

    pub(crate) fn parse(partname: String, layout_partname: String, xml: &str) -> Result<Self> {
        Ok(Self {
            partname,
            layout_partname,
            shapes: parse_shapes(xml)?,
            added: false,
        })
    }

    pub fn partname(&self) -> &str {
        &self.partname
    }

    pub fn layout_partname(&self) -> &str {
        &self.layout_partname
    }

    /// Whether the slide was added in this session rather than loaded.
    pub const fn is_added(&self) -> bool {
        self.added
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Title placeholder (`title` or `ctrTitle`), if the slide has one.
    pub fn title(&self) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.is_title())
    }

    pub fn title_mut(&mut self) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.is_title())
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.is_placeholder())
    }

    pub fn placeholders_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        self.shapes.iter_mut().filter(|s| s.is_placeholder())
    }

    /// Placeholder whose `idx` equals `idx`.
    pub fn placeholder(&self, idx: u32) -> Option<&Shape> {
        self.placeholders()
            .find(|s| s.placeholder_format().is_some_and(|ph| ph.idx == idx))
    }

    pub(crate) fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(declaration()))?;
        writer
            .create_element("p:sld")
            .with_attribute(("xmlns:a", NS_DML))
            .with_attribute(("xmlns:r", NS_REL))
            .with_attribute(("xmlns:p", NS_PML))
            .write_inner_content(|w| {
                w.create_element("p:cSld").write_inner_content(|w| {
                    w.create_element("p:spTree").write_inner_content(|w| {
                        write_group_properties(w)?;
                        for shape in &self.shapes {
                            write_shape(w, shape)?;
                        }
                        Ok::<(), quick_xml::Error>(())
                    })?;
                    Ok::<(), quick_xml::Error>(())
                })?;
                w.create_element("p:clrMapOvr").write_inner_content(|w| {
                    w.create_element("a:masterClrMapping").write_empty()?;
                    Ok::<(), quick_xml::Error>(())
                })?;
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(writer.into_inner())
    }
}

type XmlResult = quick_xml::Result<()>;

fn write_group_properties(w: &mut Writer<Vec<u8>>) -> XmlResult {
    w.create_element("p:nvGrpSpPr").write_inner_content(|w| {
        w.create_element("p:cNvPr")
            .with_attribute(("id", "1"))
            .with_attribute(("name", ""))
            .write_empty()?;
        w.create_element("p:cNvGrpSpPr").write_empty()?;
        w.create_element("p:nvPr").write_empty()?;
        Ok::<(), quick_xml::Error>(())
    })?;
    w.create_element("p:grpSpPr").write_inner_content(|w| {
        w.create_element("a:xfrm").write_inner_content(|w| {
            let offsets = [
                ("a:off", "x", "y"),
                ("a:ext", "cx", "cy"),
                ("a:chOff", "x", "y"),
                ("a:chExt", "cx", "cy"),
            ];
            for (name, x, y) in offsets {
                w.create_element(name)
                    .with_attribute((x, "0"))
                    .with_attribute((y, "0"))
                    .write_empty()?;
            }
            Ok::<(), quick_xml::Error>(())
        })?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

fn write_shape(w: &mut Writer<Vec<u8>>, shape: &Shape) -> XmlResult {
    let id = shape.id.to_string();
    w.create_element("p:sp").write_inner_content(|w| {
        w.create_element("p:nvSpPr").write_inner_content(|w| {
            w.create_element("p:cNvPr")
                .with_attribute(("id", id.as_str()))
                .with_attribute(("name", shape.name.as_str()))
                .write_empty()?;
            w.create_element("p:cNvSpPr").write_inner_content(|w| {
                w.create_element("a:spLocks")
                    .with_attribute(("noGrp", "1"))
                    .write_empty()?;
                Ok::<(), quick_xml::Error>(())
            })?;
            match &shape.placeholder {
                Some(ph) => {
                    w.create_element("p:nvPr").write_inner_content(|w| {
                        write_placeholder(w, ph)
                    })?;
                }
                None => {
                    w.create_element("p:nvPr").write_empty()?;
                }
            }
            Ok::<(), quick_xml::Error>(())
        })?;
        w.create_element("p:spPr").write_empty()?;
        if let Some(frame) = &shape.text_frame {
            write_text_frame(w, frame)?;
        }
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

fn write_placeholder(w: &mut Writer<Vec<u8>>, ph: &PlaceholderFormat) -> XmlResult {
    let idx = ph.idx.to_string();
    let mut element = w.create_element("p:ph");
    if let Some(kind) = ph.kind.as_attr() {
        element = element.with_attribute(("type", kind));
    }
    if let Some(orient) = &ph.orient {
        element = element.with_attribute(("orient", orient.as_str()));
    }
    if let Some(size) = &ph.size {
        element = element.with_attribute(("sz", size.as_str()));
    }
    if ph.idx != 0 {
        element = element.with_attribute(("idx", idx.as_str()));
    }
    element.write_empty()?;
    Ok(())
}

fn write_text_frame(w: &mut Writer<Vec<u8>>, frame: &TextFrame) -> XmlResult {
    w.create_element("p:txBody").write_inner_content(|w| {
        w.create_element("a:bodyPr").write_empty()?;
        w.create_element("a:lstStyle").write_empty()?;
        for paragraph in &frame.paragraphs {
            write_paragraph(w, paragraph)?;
        }
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

fn write_paragraph(w: &mut Writer<Vec<u8>>, paragraph: &Paragraph) -> XmlResult {
    if paragraph.text.is_empty() {
        w.create_element("a:p").write_empty()?;
        return Ok(());
    }
    w.create_element("a:p").write_inner_content(|w| {
        for (i, line) in paragraph.text.split('\u{b}').enumerate() {
            if i > 0 {
                w.create_element("a:br").write_empty()?;
            }
            if line.is_empty() {
                continue;
            }
            w.create_element("a:r").write_inner_content(|w| {
                w.create_element("a:rPr")
                    .with_attribute(("lang", "en-US"))
                    .with_attribute(("dirty", "0"))
                    .write_empty()?;
                w.create_element("a:t")
                    .write_text_content(BytesText::new(line))?;
                Ok::<(), quick_xml::Error>(())
            })?;
        }
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

/// Shapes (`p:sp`) of a slide, layout or master part, in document order.
pub(crate) fn parse_shapes(xml: &str) -> Result<Vec<Shape>> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut current: Option<Shape> = None;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sp" => {
                    current = Some(Shape {
                        id: 0,
                        name: String::new(),
                        placeholder: None,
                        text_frame: None,
                    });
                }
                b"cNvPr" => read_non_visual(&mut current, &e)?,
                b"ph" => read_placeholder(&mut current, &e)?,
                b"txBody" => {
                    if let Some(shape) = current.as_mut() {
                        shape.text_frame = Some(TextFrame {
                            paragraphs: Vec::new(),
                        });
                    }
                }
                b"p" => push_paragraph(&mut current),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"cNvPr" => read_non_visual(&mut current, &e)?,
                b"ph" => read_placeholder(&mut current, &e)?,
                b"p" => push_paragraph(&mut current),
                b"br" => push_text(&mut current, "\u{b}"),
                _ => {}
            },
            Event::Text(t) if in_text => push_text(&mut current, &t.unescape()?),
            Event::CData(t) if in_text => {
                push_text(&mut current, &String::from_utf8_lossy(&t));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"sp" => {
                    if let Some(mut shape) = current.take() {
                        if let Some(frame) = shape.text_frame.as_mut() {
                            if frame.paragraphs.is_empty() {
                                frame.paragraphs.push(Paragraph::default());
                            }
                        }
                        shapes.push(shape);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

/// `name` attribute of the `p:cSld` element, if any.
pub(crate) fn parse_common_slide_name(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cSld" => {
                return attr(&e, b"name");
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn read_non_visual(current: &mut Option<Shape>, e: &BytesStart<'_>) -> Result<()> {
    if let Some(shape) = current.as_mut() {
        shape.id = attr(e, b"id")?.and_then(|v| v.parse().ok()).unwrap_or(0);
        shape.name = attr(e, b"name")?.unwrap_or_default();
    }
    Ok(())
}

fn read_placeholder(current: &mut Option<Shape>, e: &BytesStart<'_>) -> Result<()> {
    if let Some(shape) = current.as_mut() {
        shape.placeholder = Some(PlaceholderFormat {
            kind: PlaceholderType::from_attr(attr(e, b"type")?.as_deref()),
            idx: attr(e, b"idx")?.and_then(|v| v.parse().ok()).unwrap_or(0),
            orient: attr(e, b"orient")?,
            size: attr(e, b"sz")?,
        });
    }
    Ok(())
}

fn push_paragraph(current: &mut Option<Shape>) {
    if let Some(frame) = current.as_mut().and_then(|s| s.text_frame.as_mut()) {
        frame.paragraphs.push(Paragraph::default());
    }
}

fn push_text(current: &mut Option<Shape>, text: &str) {
    if let Some(paragraph) = current
        .as_mut()
        .and_then(|s| s.text_frame.as_mut())
        .and_then(|f| f.paragraphs.last_mut())
    {
        paragraph.text.push_str(text);
    }
}
