//! Report assembly and serialization.
//!
//! `xml` holds the sanitizing document model shared by both pipelines;
//! `builder` turns parsed and aligned test data into the document tree.

pub mod builder;
pub mod xml;

pub use builder::{
    aligned_narrative, build_compare_report, build_report, fallback_narrative, steps_block_text,
    CaseOutcome, TestCaseReport,
};
pub use xml::{sanitize_text, XmlElement};
