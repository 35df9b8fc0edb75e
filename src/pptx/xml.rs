//! Namespaces, content types, relationship types and small XML helpers
//! shared by the package readers and writers.

use quick_xml::events::BytesStart;

use super::error::Result;

pub const NS_PML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const NS_DML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub const RT_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const RT_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const RT_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub const RT_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const RT_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const RT_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const RT_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub const RT_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
pub const RT_VIEW_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
pub const RT_TABLE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";

pub const CT_PRESENTATION_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const CT_TEMPLATE_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
pub const CT_MACRO_MAIN: &str = "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
pub const CT_SLIDESHOW_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";
pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
pub const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
pub const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
pub const CT_PRES_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
pub const CT_VIEW_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
pub const CT_TABLE_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
pub const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
pub const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";
pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const CT_XML: &str = "application/xml";

/// XML declaration written at the top of every generated part.
pub fn declaration() -> quick_xml::events::BytesDecl<'static> {
    quick_xml::events::BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))
}

/// Value of an unprefixed attribute such as `id` or `type`.
pub fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attribute in e.attributes() {
        let attribute = attribute?;
        if attribute.key.as_ref() == key {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Value of a namespace-prefixed `id` attribute (`r:id`), whatever the prefix.
pub fn rel_id(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attribute in e.attributes() {
        let attribute = attribute?;
        let key = attribute.key;
        let prefixed = key
            .prefix()
            .is_some_and(|prefix| prefix.as_ref() != b"xmlns");
        if prefixed && key.local_name().as_ref() == b"id" {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Prefix bound to `namespace` by an `xmlns:*` declaration on `e`.
pub fn prefix_for(e: &BytesStart<'_>, namespace: &str) -> Result<Option<String>> {
    for attribute in e.attributes() {
        let attribute = attribute?;
        let key = attribute.key;
        if key.prefix().is_some_and(|p| p.as_ref() == b"xmlns")
            && attribute.unescape_value()? == namespace
        {
            return Ok(Some(
                String::from_utf8_lossy(key.local_name().as_ref()).into_owned(),
            ));
        }
    }
    Ok(None)
}

/// Qualify `local` with `prefix` (empty prefix means the default namespace).
pub fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}:{local}")
    }
}
