//! Minimal PresentationML (`.pptx`) authoring.
//!
//! A presentation is opened from a file (or built from the default template),
//! slides are added from the layouts of its first slide master, placeholder
//! text is filled in, and the package is written back out. Parts this module
//! does not understand are carried through unchanged.

mod content_types;
mod default_template;
mod error;
mod package;
mod presentation;
mod relationships;
mod slide;
mod xml;

pub use error::{Error, Result};
pub use presentation::{Presentation, SlideLayout};
pub use slide::{Paragraph, PlaceholderFormat, PlaceholderType, Shape, Slide, TextFrame};
