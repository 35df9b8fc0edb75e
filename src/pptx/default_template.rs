//! Built-in presentation used when no template file is configured.
//!
//! One slide master with a title and a body placeholder, and five layouts in
//! the conventional order: Title Slide, Title and Content, Section Header,
//! Title Only, Blank. Slide size is 4:3 (10in x 7.5in).

use quick_xml::events::{BytesText, Event};
use quick_xml::Writer;

use super::content_types::ContentTypes;
use super::error::Result;
use super::package::{rels_part_name, Package, CONTENT_TYPES_PART};
use super::relationships::Relationships;
use super::slide::PlaceholderType;
use super::xml::{
    declaration, CT_CORE_PROPERTIES, CT_EXTENDED_PROPERTIES, CT_PRESENTATION_MAIN, CT_PRES_PROPS,
    CT_RELATIONSHIPS, CT_SLIDE_LAYOUT, CT_SLIDE_MASTER, CT_TABLE_STYLES, CT_THEME, CT_VIEW_PROPS,
    CT_XML, NS_DML, NS_PML, NS_REL, RT_CORE_PROPERTIES, RT_EXTENDED_PROPERTIES,
    RT_OFFICE_DOCUMENT, RT_PRES_PROPS, RT_SLIDE_LAYOUT, RT_SLIDE_MASTER, RT_TABLE_STYLES,
    RT_THEME, RT_VIEW_PROPS,
};

const SLIDE_WIDTH: i64 = 9_144_000;
const SLIDE_HEIGHT: i64 = 6_858_000;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const MASTER_PART: &str = "ppt/slideMasters/slideMaster1.xml";
const THEME_PART: &str = "ppt/theme/theme1.xml";

type Frame = (i64, i64, i64, i64);

const TITLE_FRAME: Frame = (457_200, 274_638, 8_229_600, 1_143_000);
const BODY_FRAME: Frame = (457_200, 1_600_200, 8_229_600, 4_525_963);

struct PlaceholderDef {
    kind: PlaceholderType,
    idx: u32,
    name: &'static str,
    /// Position override; `None` inherits the master's frame.
    frame: Option<Frame>,
}

struct LayoutDef {
    name: &'static str,
    layout_type: &'static str,
    placeholders: &'static [PlaceholderDef],
}

const LAYOUTS: &[LayoutDef] = &[
    LayoutDef {
        name: "Title Slide",
        layout_type: "title",
        placeholders: &[
            PlaceholderDef {
                kind: PlaceholderType::CenterTitle,
                idx: 0,
                name: "Title 1",
                frame: Some((685_800, 2_130_425, 7_772_400, 1_470_025)),
            },
            PlaceholderDef {
                kind: PlaceholderType::SubTitle,
                idx: 1,
                name: "Subtitle 2",
                frame: Some((1_371_600, 3_886_200, 6_400_800, 1_752_600)),
            },
        ],
    },
    LayoutDef {
        name: "Title and Content",
        layout_type: "obj",
        placeholders: &[
            PlaceholderDef {
                kind: PlaceholderType::Title,
                idx: 0,
                name: "Title 1",
                frame: None,
            },
            PlaceholderDef {
                kind: PlaceholderType::Object,
                idx: 1,
                name: "Content Placeholder 2",
                frame: None,
            },
        ],
    },
    LayoutDef {
        name: "Section Header",
        layout_type: "secHead",
        placeholders: &[
            PlaceholderDef {
                kind: PlaceholderType::Title,
                idx: 0,
                name: "Title 1",
                frame: Some((722_313, 4_406_900, 7_772_400, 1_362_075)),
            },
            PlaceholderDef {
                kind: PlaceholderType::Body,
                idx: 1,
                name: "Text Placeholder 2",
                frame: Some((722_313, 2_906_713, 7_772_400, 1_500_187)),
            },
        ],
    },
    LayoutDef {
        name: "Title Only",
        layout_type: "titleOnly",
        placeholders: &[PlaceholderDef {
            kind: PlaceholderType::Title,
            idx: 0,
            name: "Title 1",
            frame: None,
        }],
    },
    LayoutDef {
        name: "Blank",
        layout_type: "blank",
        placeholders: &[],
    },
];

/// Assemble the default package.
pub fn build() -> Result<Package> {
    let mut package = Package::new();
    let mut content_types = ContentTypes::default();
    content_types.set_default("rels", CT_RELATIONSHIPS);
    content_types.set_default("xml", CT_XML);

    let mut root_rels = Relationships::default();
    root_rels.add(RT_OFFICE_DOCUMENT, PRESENTATION_PART);
    root_rels.add(RT_CORE_PROPERTIES, "docProps/core.xml");
    root_rels.add(RT_EXTENDED_PROPERTIES, "docProps/app.xml");
    package.insert(rels_part_name(""), root_rels.to_xml()?);

    package.insert("docProps/core.xml", core_properties()?);
    content_types.set_override("docProps/core.xml", CT_CORE_PROPERTIES);
    package.insert("docProps/app.xml", app_properties()?);
    content_types.set_override("docProps/app.xml", CT_EXTENDED_PROPERTIES);

    let mut pres_rels = Relationships::default();
    let master_rid = pres_rels.add(RT_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    pres_rels.add(RT_THEME, "theme/theme1.xml");
    pres_rels.add(RT_PRES_PROPS, "presProps.xml");
    pres_rels.add(RT_VIEW_PROPS, "viewProps.xml");
    pres_rels.add(RT_TABLE_STYLES, "tableStyles.xml");
    package.insert(PRESENTATION_PART, presentation(&master_rid)?);
    package.insert(rels_part_name(PRESENTATION_PART), pres_rels.to_xml()?);
    content_types.set_override(PRESENTATION_PART, CT_PRESENTATION_MAIN);

    for (part, body, ct) in [
        ("ppt/presProps.xml", PRES_PROPS, CT_PRES_PROPS),
        ("ppt/viewProps.xml", VIEW_PROPS, CT_VIEW_PROPS),
        ("ppt/tableStyles.xml", TABLE_STYLES, CT_TABLE_STYLES),
        (THEME_PART, THEME, CT_THEME),
    ] {
        package.insert(part, body.as_bytes().to_vec());
        content_types.set_override(part, ct);
    }

    let mut master_rels = Relationships::default();
    let mut layout_rids = Vec::with_capacity(LAYOUTS.len());
    for (i, layout) in LAYOUTS.iter().enumerate() {
        let part = format!("ppt/slideLayouts/slideLayout{}.xml", i + 1);
        layout_rids.push(master_rels.add(
            RT_SLIDE_LAYOUT,
            &format!("../slideLayouts/slideLayout{}.xml", i + 1),
        ));

        let mut layout_rels = Relationships::default();
        layout_rels.add(RT_SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
        package.insert(rels_part_name(&part), layout_rels.to_xml()?);
        package.insert(part.clone(), slide_layout(layout)?);
        content_types.set_override(&part, CT_SLIDE_LAYOUT);
    }
    master_rels.add(RT_THEME, "../theme/theme1.xml");
    package.insert(MASTER_PART, slide_master(&layout_rids)?);
    package.insert(rels_part_name(MASTER_PART), master_rels.to_xml()?);
    content_types.set_override(MASTER_PART, CT_SLIDE_MASTER);

    package.insert(CONTENT_TYPES_PART, content_types.to_xml()?);
    Ok(package)
}

fn presentation(master_rid: &str) -> Result<Vec<u8>> {
    let width = SLIDE_WIDTH.to_string();
    let height = SLIDE_HEIGHT.to_string();
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(declaration()))?;
    writer
        .create_element("p:presentation")
        .with_attribute(("xmlns:a", NS_DML))
        .with_attribute(("xmlns:r", NS_REL))
        .with_attribute(("xmlns:p", NS_PML))
        .with_attribute(("saveSubsetFonts", "1"))
        .write_inner_content(|w| {
            w.create_element("p:sldMasterIdLst").write_inner_content(|w| {
                w.create_element("p:sldMasterId")
                    .with_attribute(("id", "2147483648"))
                    .with_attribute(("r:id", master_rid))
                    .write_empty()?;
                Ok::<(), quick_xml::Error>(())
            })?;
            w.create_element("p:sldSz")
                .with_attribute(("cx", width.as_str()))
                .with_attribute(("cy", height.as_str()))
                .with_attribute(("type", "screen4x3"))
                .write_empty()?;
            w.create_element("p:notesSz")
                .with_attribute(("cx", height.as_str()))
                .with_attribute(("cy", width.as_str()))
                .write_empty()?;
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(writer.into_inner())
}

fn slide_master(layout_rids: &[String]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(declaration()))?;
    writer
        .create_element("p:sldMaster")
        .with_attribute(("xmlns:a", NS_DML))
        .with_attribute(("xmlns:r", NS_REL))
        .with_attribute(("xmlns:p", NS_PML))
        .write_inner_content(|w| {
            w.create_element("p:cSld").write_inner_content(|w| {
                w.create_element("p:bg").write_inner_content(|w| {
                    w.create_element("p:bgRef")
                        .with_attribute(("idx", "1001"))
                        .write_inner_content(|w| {
                            w.create_element("a:schemeClr")
                                .with_attribute(("val", "bg1"))
                                .write_empty()?;
                            Ok::<(), quick_xml::Error>(())
                        })?;
                    Ok::<(), quick_xml::Error>(())
                })?;
                write_shape_tree(w, |w| {
                    write_placeholder_shape(
                        w,
                        2,
                        "Title Placeholder 1",
                        PlaceholderType::Title,
                        0,
                        Some(TITLE_FRAME),
                    )?;
                    write_placeholder_shape(
                        w,
                        3,
                        "Text Placeholder 2",
                        PlaceholderType::Body,
                        1,
                        Some(BODY_FRAME),
                    )
                })?;
                Ok::<(), quick_xml::Error>(())
            })?;
            w.create_element("p:clrMap")
                .with_attributes([
                    ("bg1", "lt1"),
                    ("tx1", "dk1"),
                    ("bg2", "lt2"),
                    ("tx2", "dk2"),
                    ("accent1", "accent1"),
                    ("accent2", "accent2"),
                    ("accent3", "accent3"),
                    ("accent4", "accent4"),
                    ("accent5", "accent5"),
                    ("accent6", "accent6"),
                    ("hlink", "hlink"),
                    ("folHlink", "folHlink"),
                ])
                .write_empty()?;
            w.create_element("p:sldLayoutIdLst").write_inner_content(|w| {
                for (i, rid) in layout_rids.iter().enumerate() {
                    let id = (2_147_483_649_u64 + i as u64).to_string();
                    w.create_element("p:sldLayoutId")
                        .with_attribute(("id", id.as_str()))
                        .with_attribute(("r:id", rid.as_str()))
                        .write_empty()?;
                }
                Ok::<(), quick_xml::Error>(())
            })?;
            w.create_element("p:txStyles").write_inner_content(|w| {
                write_text_style(w, "p:titleStyle", "4400", false)?;
                write_text_style(w, "p:bodyStyle", "3200", true)?;
                write_text_style(w, "p:otherStyle", "1800", false)
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(writer.into_inner())
}

fn slide_layout(layout: &LayoutDef) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(declaration()))?;
    writer
        .create_element("p:sldLayout")
        .with_attribute(("xmlns:a", NS_DML))
        .with_attribute(("xmlns:r", NS_REL))
        .with_attribute(("xmlns:p", NS_PML))
        .with_attribute(("type", layout.layout_type))
        .with_attribute(("preserve", "1"))
        .write_inner_content(|w| {
            w.create_element("p:cSld")
                .with_attribute(("name", layout.name))
                .write_inner_content(|w| {
                    write_shape_tree(w, |w| {
                        for (i, ph) in layout.placeholders.iter().enumerate() {
                            let id = u32::try_from(i).unwrap_or(0) + 2;
                            write_placeholder_shape(w, id, ph.name, ph.kind, ph.idx, ph.frame)?;
                        }
                        Ok(())
                    })
                })?;
            w.create_element("p:clrMapOvr").write_inner_content(|w| {
                w.create_element("a:masterClrMapping").write_empty()?;
                Ok::<(), quick_xml::Error>(())
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(writer.into_inner())
}

type XmlWriter = Writer<Vec<u8>>;

fn write_shape_tree<F>(w: &mut XmlWriter, shapes: F) -> quick_xml::Result<()>
where
    F: FnOnce(&mut XmlWriter) -> quick_xml::Result<()>,
{
    w.create_element("p:spTree").write_inner_content(|w| {
        w.create_element("p:nvGrpSpPr").write_inner_content(|w| {
            w.create_element("p:cNvPr")
                .with_attribute(("id", "1"))
                .with_attribute(("name", ""))
                .write_empty()?;
            w.create_element("p:cNvGrpSpPr").write_empty()?;
            w.create_element("p:nvPr").write_empty()?;
            Ok::<(), quick_xml::Error>(())
        })?;
        w.create_element("p:grpSpPr").write_empty()?;
        shapes(w)
    })?;
    Ok(())
}

fn write_placeholder_shape(
    w: &mut XmlWriter,
    id: u32,
    name: &str,
    kind: PlaceholderType,
    idx: u32,
    frame: Option<Frame>,
) -> quick_xml::Result<()> {
    let id = id.to_string();
    let idx_value = idx.to_string();
    w.create_element("p:sp").write_inner_content(|w| {
        w.create_element("p:nvSpPr").write_inner_content(|w| {
            w.create_element("p:cNvPr")
                .with_attribute(("id", id.as_str()))
                .with_attribute(("name", name))
                .write_empty()?;
            w.create_element("p:cNvSpPr").write_inner_content(|w| {
                w.create_element("a:spLocks")
                    .with_attribute(("noGrp", "1"))
                    .write_empty()?;
                Ok::<(), quick_xml::Error>(())
            })?;
            w.create_element("p:nvPr").write_inner_content(|w| {
                let mut ph = w.create_element("p:ph");
                if let Some(kind) = kind.as_attr() {
                    ph = ph.with_attribute(("type", kind));
                }
                if idx != 0 {
                    ph = ph.with_attribute(("idx", idx_value.as_str()));
                }
                ph.write_empty()?;
                Ok::<(), quick_xml::Error>(())
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;
        match frame {
            Some((x, y, cx, cy)) => {
                let (x, y) = (x.to_string(), y.to_string());
                let (cx, cy) = (cx.to_string(), cy.to_string());
                w.create_element("p:spPr").write_inner_content(|w| {
                    w.create_element("a:xfrm").write_inner_content(|w| {
                        w.create_element("a:off")
                            .with_attribute(("x", x.as_str()))
                            .with_attribute(("y", y.as_str()))
                            .write_empty()?;
                        w.create_element("a:ext")
                            .with_attribute(("cx", cx.as_str()))
                            .with_attribute(("cy", cy.as_str()))
                            .write_empty()?;
                        Ok::<(), quick_xml::Error>(())
                    })?;
                    w.create_element("a:prstGeom")
                        .with_attribute(("prst", "rect"))
                        .write_inner_content(|w| {
                            w.create_element("a:avLst").write_empty()?;
                            Ok::<(), quick_xml::Error>(())
                        })?;
                    Ok::<(), quick_xml::Error>(())
                })?;
            }
            None => {
                w.create_element("p:spPr").write_empty()?;
            }
        }
        w.create_element("p:txBody").write_inner_content(|w| {
            w.create_element("a:bodyPr").write_empty()?;
            w.create_element("a:lstStyle").write_empty()?;
            w.create_element("a:p").write_empty()?;
            Ok::<(), quick_xml::Error>(())
        })?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

fn write_text_style(
    w: &mut XmlWriter,
    element: &str,
    size: &str,
    bulleted: bool,
) -> quick_xml::Result<()> {
    w.create_element(element).write_inner_content(|w| {
        let mut level = w.create_element("a:lvl1pPr");
        if bulleted {
            level = level
                .with_attribute(("marL", "342900"))
                .with_attribute(("indent", "-342900"));
        }
        level.write_inner_content(|w| {
            if bulleted {
                w.create_element("a:buChar")
                    .with_attribute(("char", "\u{2022}"))
                    .write_empty()?;
            }
            w.create_element("a:defRPr")
                .with_attribute(("sz", size))
                .write_inner_content(|w| {
                    w.create_element("a:solidFill").write_inner_content(|w| {
                        w.create_element("a:schemeClr")
                            .with_attribute(("val", "tx1"))
                            .write_empty()?;
                        Ok::<(), quick_xml::Error>(())
                    })?;
                    w.create_element("a:latin")
                        .with_attribute(("typeface", "+mn-lt"))
                        .write_empty()?;
                    Ok::<(), quick_xml::Error>(())
                })?;
            Ok::<(), quick_xml::Error>(())
        })?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

fn core_properties() -> Result<Vec<u8>> {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(declaration()))?;
    writer
        .create_element("cp:coreProperties")
        .with_attribute((
            "xmlns:cp",
            "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
        ))
        .with_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"))
        .with_attribute(("xmlns:dcterms", "http://purl.org/dc/terms/"))
        .with_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"))
        .write_inner_content(|w| {
            w.create_element("dc:title")
                .write_text_content(BytesText::new("Presentation"))?;
            w.create_element("cp:revision")
                .write_text_content(BytesText::new("1"))?;
            for element in ["dcterms:created", "dcterms:modified"] {
                w.create_element(element)
                    .with_attribute(("xsi:type", "dcterms:W3CDTF"))
                    .write_text_content(BytesText::new(&now))?;
            }
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(writer.into_inner())
}

fn app_properties() -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(declaration()))?;
    writer
        .create_element("Properties")
        .with_attribute((
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        ))
        .write_inner_content(|w| {
            w.create_element("Application")
                .write_text_content(BytesText::new(env!("CARGO_PKG_NAME")))?;
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(writer.into_inner())
}

const PRES_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentationPr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#;

const VIEW_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:viewPr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" lastView="sldView"/>"#;

const TABLE_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:tblStyleLst xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" def="{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}"/>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="1F497D"/></a:dk2>
      <a:lt2><a:srgbClr val="EEECE1"/></a:lt2>
      <a:accent1><a:srgbClr val="4F81BD"/></a:accent1>
      <a:accent2><a:srgbClr val="C0504D"/></a:accent2>
      <a:accent3><a:srgbClr val="9BBB59"/></a:accent3>
      <a:accent4><a:srgbClr val="8064A2"/></a:accent4>
      <a:accent5><a:srgbClr val="4BACC6"/></a:accent5>
      <a:accent6><a:srgbClr val="F79646"/></a:accent6>
      <a:hlink><a:srgbClr val="0000FF"/></a:hlink>
      <a:folHlink><a:srgbClr val="800080"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
  <a:objectDefaults/>
  <a:extraClrSchemeLst/>
</a:theme>"#;
