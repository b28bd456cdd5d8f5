// Heuristic extraction of job-posting text into an ExtractedDraft.
// Everything here is synchronous and pure; the AI path lives in normalization.

pub mod budget;
pub mod codec;
pub mod fields;
pub mod handlers;
pub mod languages;
pub mod normalize;
pub mod parser;
pub mod quality;
pub mod sections;
pub mod skills;

pub use parser::parse;
pub use quality::{assess_text_quality, QualityVerdict, TextQuality};
