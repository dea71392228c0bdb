//! Text-level building blocks with no notion of surfaces or selection.

pub mod keychord;
pub mod pattern;
pub mod scanner;
