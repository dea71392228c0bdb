//! Rendering decisions for hidden links.
//!
//! This module is split into:
//! - `visibility`: collapsed/expanded decision per link
//! - `decoration`: decoration sets for live, editable surfaces
//! - `static_render`: one-shot replacement on rendered content trees

pub mod decoration;
pub mod static_render;
pub mod visibility;
