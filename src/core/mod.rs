//! Foundation types shared by every other module: spans, identifiers,
//! and the diagnostic taxonomy.

pub mod error;
pub mod interner;
pub mod span;

pub use error::{Diagnostic, ElabError, Severity};
pub use interner::Ident;
pub use span::Span;
