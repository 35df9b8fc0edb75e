//! MIME type detection module
//!
//! Returns the Content-Type for a served file based on its extension.

use std::path::Path;

pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Get MIME Content-Type based on file extension (case-insensitive)
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let extension = extension.map(str::to_ascii_lowercase);
    match extension.as_deref() {
        // Presentations
        Some("pptx") => PPTX,
        Some("potx") => "application/vnd.openxmlformats-officedocument.presentationml.template",
        Some("ppsx") => "application/vnd.openxmlformats-officedocument.presentationml.slideshow",
        Some("pptm") => "application/vnd.ms-powerpoint.presentation.macroEnabled.12",
        Some("ppt") => "application/vnd.ms-powerpoint",

        // Other documents
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("zip") => "application/zip",
        Some("txt") => "text/plain; charset=utf-8",

        // Default
        _ => "application/octet-stream",
    }
}

/// Content-Type of the file at `path`
pub fn content_type_for(path: &Path) -> &'static str {
    get_content_type(path.extension().and_then(|e| e.to_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_types() {
        assert_eq!(content_type_for(Path::new("output/output.pptx")), PPTX);
        assert_eq!(content_type_for(Path::new("DECK.PPTX")), PPTX);
        assert_eq!(
            get_content_type(Some("potx")),
            "application/vnd.openxmlformats-officedocument.presentationml.template"
        );
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
    }
}
