//! Turns slide specs into a presentation.

use std::path::Path;

use super::request::SlideSpec;
use crate::logger;
use crate::pptx::{self, Presentation, Slide};

/// "Title and Content" in the default master and in most templates
pub const CONTENT_LAYOUT: usize = 1;

/// `idx` of the body placeholder on the content layout
pub const BODY_PLACEHOLDER_IDX: u32 = 1;

/// Open `template` when given, otherwise start from the built-in default
pub fn open_base(template: Option<&Path>) -> pptx::Result<Presentation> {
    match template {
        Some(path) => Presentation::open(path),
        None => Presentation::new(),
    }
}

/// Append one content slide per spec, in order
pub fn add_slides(prs: &mut Presentation, slides: &[SlideSpec]) -> pptx::Result<()> {
    for (index, spec) in slides.iter().enumerate() {
        let slide = prs.add_slide(CONTENT_LAYOUT)?;
        if !fill_slide(slide, spec) {
            logger::log_content_dropped(index);
        }
    }
    Ok(())
}

/// Write title and body text; false when the slide has no body placeholder
fn fill_slide(slide: &mut Slide, spec: &SlideSpec) -> bool {
    if let Some(title) = slide.title_mut() {
        title.set_text(&spec.title);
    }

    let body = slide.placeholders_mut().find(|shape| {
        shape
            .placeholder_format()
            .is_some_and(|ph| ph.idx == BODY_PLACEHOLDER_IDX)
    });
    let Some(frame) = body.and_then(|shape| shape.text_frame_mut()) else {
        return false;
    };

    frame.clear();
    if let Some(first) = frame.paragraphs_mut().first_mut() {
        first.set_text(&spec.content);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::Shape;

    fn spec(title: &str, content: &str) -> SlideSpec {
        SlideSpec {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_slides_follow_input_order() {
        let mut prs = open_base(None).unwrap();
        add_slides(
            &mut prs,
            &[spec("Intro", "Welcome"), spec("untitled", "no content")],
        )
        .unwrap();

        let texts: Vec<(String, String)> = prs
            .slides()
            .iter()
            .map(|s| {
                (
                    s.title().map(Shape::text).unwrap_or_default(),
                    s.placeholder(BODY_PLACEHOLDER_IDX)
                        .map(Shape::text)
                        .unwrap_or_default(),
                )
            })
            .collect();
        assert_eq!(
            texts,
            [
                ("Intro".to_string(), "Welcome".to_string()),
                ("untitled".to_string(), "no content".to_string()),
            ]
        );
    }

    #[test]
    fn test_body_text_goes_into_single_paragraph() {
        let mut prs = open_base(None).unwrap();
        add_slides(&mut prs, &[spec("Agenda", "one\ntwo")]).unwrap();

        let body = prs.slides()[0].placeholder(BODY_PLACEHOLDER_IDX).unwrap();
        let paragraphs = body.text_frame().unwrap().paragraphs();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text(), "one\u{b}two");
    }

    #[test]
    fn test_fill_slide_without_body_placeholder_keeps_title() {
        let mut prs = open_base(None).unwrap();
        // "Title Only"
        let slide = prs.add_slide(3).unwrap();

        assert!(!fill_slide(slide, &spec("Heading", "dropped")));
        assert_eq!(slide.title().map(Shape::text).as_deref(), Some("Heading"));
        assert!(slide.placeholder(BODY_PLACEHOLDER_IDX).is_none());
    }

    #[test]
    fn test_missing_template_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("template.potx");
        assert!(matches!(
            open_base(Some(&missing)),
            Err(pptx::Error::Io(_))
        ));
    }
}
