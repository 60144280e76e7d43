//! Note processing pipeline.
//!
//! Sequences the summarize and extract tasks for one clinical note, maps
//! untrusted model output into the strict entity schema, and assembles the
//! final response.

pub mod processor;
pub mod validate;

pub use processor::NoteProcessor;
pub use validate::validate_entities;
