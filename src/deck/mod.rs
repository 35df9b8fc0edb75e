// Deck module entry
// Request parsing, presentation building and on-disk storage for generated decks

mod builder;
mod request;
mod storage;

use std::time::Instant;

pub use builder::{add_slides, open_base, BODY_PLACEHOLDER_IDX};
pub use request::{GenerationRequest, SlideSpec};
pub use storage::Storage;

use crate::error::ServiceError;
use crate::logger;

/// Build a deck from `slides` and save it; returns the saved file name.
///
/// Blocking: run it on the blocking pool from async code.
pub fn generate(storage: &Storage, slides: &[SlideSpec]) -> Result<String, ServiceError> {
    let started = Instant::now();
    logger::log_generation_started(slides.len());

    let template = storage.template();
    if template.is_none() {
        logger::log_template_missing(storage.template_path());
    }

    let mut prs = open_base(template)?;
    add_slides(&mut prs, slides)?;

    let file_name = storage.next_file_name();
    storage.save(&prs, &file_name)?;

    logger::log_generation_finished(&file_name, slides.len(), started.elapsed());
    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pptx::{Presentation, Shape};
    use std::io::{Cursor, Read, Write};
    use std::path::Path;

    fn storage_in(dir: &std::path::Path) -> Storage {
        let mut config = Config::defaults().unwrap().storage;
        config.output_dir = dir.join("out").to_string_lossy().into_owned();
        config.templates_dir = dir.join("tpl").to_string_lossy().into_owned();
        Storage::from_config(&config)
    }

    fn spec(title: &str, content: &str) -> SlideSpec {
        SlideSpec {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_generate_without_template() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        storage.ensure_dirs().unwrap();

        let name = generate(&storage, &[spec("Intro", "Welcome")]).unwrap();
        assert_eq!(name, "output.pptx");

        let prs = Presentation::open(storage.output_dir().join(&name)).unwrap();
        assert_eq!(prs.slides().len(), 1);
        let slide = &prs.slides()[0];
        assert_eq!(slide.title().map(Shape::text).as_deref(), Some("Intro"));
        assert_eq!(
            slide.placeholder(BODY_PLACEHOLDER_IDX).map(Shape::text).as_deref(),
            Some("Welcome")
        );
    }

    /// Default deck whose second layout is "Title Only" instead of "Title and Content"
    fn write_title_only_template(path: &Path) {
        let bytes = Presentation::new().unwrap().to_bytes().unwrap();
        let mut source = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut title_only = Vec::new();
        source
            .by_name("ppt/slideLayouts/slideLayout4.xml")
            .unwrap()
            .read_to_end(&mut title_only)
            .unwrap();

        let mut out = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
        for i in 0..source.len() {
            let mut part = source.by_index(i).unwrap();
            let name = part.name().to_string();
            let mut data = Vec::new();
            part.read_to_end(&mut data).unwrap();
            if name == "ppt/slideLayouts/slideLayout2.xml" {
                data.clone_from(&title_only);
            }
            out.start_file(name, zip::write::FileOptions::default()).unwrap();
            out.write_all(&data).unwrap();
        }
        out.finish().unwrap();
    }

    #[test]
    fn test_generate_drops_content_without_body_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        storage.ensure_dirs().unwrap();
        write_title_only_template(storage.template_path());

        let name = generate(&storage, &[spec("Heading", "dropped text")]).unwrap();
        let prs = Presentation::open(storage.output_dir().join(name)).unwrap();
        assert_eq!(prs.slide_layouts()[1].name(), "Title Only");
        assert_eq!(prs.slides().len(), 1);

        let slide = &prs.slides()[0];
        assert_eq!(slide.title().map(Shape::text).as_deref(), Some("Heading"));
        assert!(slide.placeholder(BODY_PLACEHOLDER_IDX).is_none());
        assert!(slide
            .shapes()
            .iter()
            .all(|shape| !shape.text().contains("dropped text")));
    }

    #[test]
    fn test_generate_escapes_control_characters() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        storage.ensure_dirs().unwrap();

        let generation = Config::defaults().unwrap().generation;
        let body = br#"{"slides":[{"title":"A\u0001B","content":"x\u001bY"}]}"#;
        let request = GenerationRequest::from_body(body, &generation).unwrap();
        let name = generate(&storage, &request.slides).unwrap();

        let bytes = std::fs::read(storage.output_dir().join(name)).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut slide_xml = Vec::new();
        archive
            .by_name("ppt/slides/slide1.xml")
            .unwrap()
            .read_to_end(&mut slide_xml)
            .unwrap();
        assert!(slide_xml
            .iter()
            .all(|&b| b >= 0x20 || matches!(b, b'\t' | b'\n' | b'\r')));

        let prs = Presentation::open(storage.output_dir().join("output.pptx")).unwrap();
        let slide = &prs.slides()[0];
        assert_eq!(slide.title().map(Shape::text).as_deref(), Some("A_x0001_B"));
        assert_eq!(
            slide.placeholder(BODY_PLACEHOLDER_IDX).map(Shape::text).as_deref(),
            Some("x_x001B_Y")
        );
    }

    #[test]
    fn test_generate_uses_template_and_keeps_its_slides() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        storage.ensure_dirs().unwrap();

        // a template that already carries one slide
        let mut template = Presentation::new().unwrap();
        template
            .add_slide(0)
            .unwrap()
            .title_mut()
            .unwrap()
            .set_text("Cover");
        template.save(storage.template_path()).unwrap();

        let name = generate(&storage, &[spec("A", "a"), spec("B", "b")]).unwrap();
        let prs = Presentation::open(storage.output_dir().join(name)).unwrap();
        let titles: Vec<String> = prs
            .slides()
            .iter()
            .filter_map(|s| s.title().map(Shape::text))
            .collect();
        assert_eq!(titles, ["Cover", "A", "B"]);
    }

    #[test]
    fn test_generate_reports_corrupt_template() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        storage.ensure_dirs().unwrap();
        std::fs::write(storage.template_path(), b"not a zip archive").unwrap();

        let err = generate(&storage, &[spec("A", "a")]).unwrap_err();
        assert!(matches!(err, ServiceError::GenerationFailed(_)));
        assert!(!storage.output_dir().join("output.pptx").exists());
    }
}
