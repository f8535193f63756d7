//! Report assembly and rendering.

pub mod builder;
pub mod generator;

pub use builder::*;
pub use generator::{generate_json_report, generate_markdown_report, stage_title};
