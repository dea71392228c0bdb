//! Host-owned state as seen by the core: document text, selection and the
//! rendered content tree of a static surface.

pub mod content;
pub mod document;
pub mod selection;
