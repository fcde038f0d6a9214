//! Trade extraction from Periodic Transaction Report text.
//!
//! This crate handles:
//! - Candidate line detection
//! - Field extraction over a cascade of row grammars
//! - Trade kind and option description lookahead
//! - Amount, action and date normalization

pub mod classifier;
pub mod context;
pub mod extractor;
pub mod normalizer;
pub mod parser;
pub mod patterns;

pub use classifier::LineClassifier;
pub use context::ContextResolver;
pub use extractor::{FieldExtractor, Grammar};
pub use normalizer::ValueNormalizer;
pub use parser::{ParseStats, ParsedDocument, PtrParser};
pub use patterns::Patterns;
