//! The step-wise drafting wizard: prompt assembly and draft persistence.

pub mod draft;
pub mod prompt;

pub use draft::Draft;
pub use prompt::{
    build_prompt, build_source_text, default_requirements, render_requirements, Requirement,
    DEFAULT_REQUIREMENTS,
};
