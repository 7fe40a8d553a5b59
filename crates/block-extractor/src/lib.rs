//! # Variability Block Extractor
//!
//! Extracts conditional-compilation structure from C/C++-like source text:
//! every `#if`/`#ifdef`/`#ifndef`/`#elif`/`#else`/`#endif` region becomes a
//! [`Block`] carrying its own condition and its *presence condition* — the
//! conjunction of its condition with every enclosing block's condition — as
//! [`variability_logic::Formula`] values, so downstream analyses can reason
//! about satisfiability and implication instead of string-matching.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     │
//!     ├──> Line Normalization (comment stripping, `\` continuations)
//!     │
//!     ├──> Directive State Machine
//!     │    ├─> nesting stack of open blocks
//!     │    └─> per-depth sibling conditions for #elif/#else negations
//!     │
//!     └──> Condition Parsing
//!          ├─> recursive-descent CPP expression grammar
//!          ├─> boolean translation (Linux macros, fuzzy comparisons)
//!          └─> invalid-condition recovery policy
//! ```
//!
//! ## Example
//!
//! ```rust
//! use variability_block_extractor::{BlockExtractor, ExtractorConfig};
//!
//! let extractor = BlockExtractor::new(ExtractorConfig::default());
//! let blocks = extractor
//!     .extract_str("#ifdef CONFIG_SMP\nint nr_cpus;\n#endif\n", "cpu.c")
//!     .unwrap();
//!
//! assert_eq!(blocks.len(), 1);
//! assert_eq!(blocks[0].start_line, 1);
//! assert_eq!(blocks[0].end_line, 2);
//! assert_eq!(blocks[0].condition.to_string(), "CONFIG_SMP");
//! ```

mod block;
mod config;
mod error;
mod expr;
mod extractor;
mod normalize;
mod parser;
mod translate;

pub use block::Block;
pub use config::{ExtractorConfig, InvalidConditionHandling};
pub use error::{ExpressionError, ExtractorError, Result};
pub use extractor::{BlockExtractor, ExtractionStats};
pub use parser::BlockParser;
pub use translate::{CppConditionParser, PARSING_ERROR_VARIABLE};
