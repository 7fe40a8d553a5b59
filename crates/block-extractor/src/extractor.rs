use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::block::Block;
use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::parser::BlockParser;
use crate::translate::PARSING_ERROR_VARIABLE;

/// Main entry point for extracting preprocessor blocks from source text.
///
/// Holds only configuration; cheap to clone, one instance can be shared per
/// worker and used for any number of files.
#[derive(Debug, Clone, Default)]
pub struct BlockExtractor {
    config: ExtractorConfig,
}

impl BlockExtractor {
    /// Create a new extractor with configuration
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract blocks from an in-memory string.
    pub fn extract_str(&self, content: &str, source_file: &str) -> Result<Vec<Block>> {
        self.extract_reader(content.as_bytes(), source_file)
    }

    /// Extract blocks from a file on disk.
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Vec<Block>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let source_file = path.to_str().unwrap_or("unknown");
        self.extract_reader(BufReader::new(file), source_file)
    }

    /// Extract blocks from any buffered reader. `source_file` only tags the
    /// resulting blocks and error messages; no path resolution happens here.
    pub fn extract_reader<R: BufRead>(&self, reader: R, source_file: &str) -> Result<Vec<Block>> {
        log::debug!("extracting preprocessor blocks from {source_file}");
        BlockParser::new(reader, source_file, &self.config).read_blocks()
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Get parse-quality statistics over an extraction result.
    #[must_use]
    pub fn stats(blocks: &[Block]) -> ExtractionStats {
        let mut stats = ExtractionStats::default();
        for block in blocks {
            count_block(block, &mut stats);
        }
        stats
    }
}

/// Statistics about an extracted block tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Number of block conditions (one per block, including nested ones)
    pub conditions: usize,
    /// Occurrences of the `PARSING_ERROR` sentinel in those conditions,
    /// i.e. how often the recovery policy had to degrade a condition
    pub parsing_errors: usize,
}

impl std::fmt::Display for ExtractionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Conditions: {} | Unparseable: {}",
            self.conditions, self.parsing_errors
        )
    }
}

fn count_block(block: &Block, stats: &mut ExtractionStats) {
    stats.conditions += 1;
    stats.parsing_errors += block.condition.count_occurrences(PARSING_ERROR_VARIABLE);
    for child in &block.children {
        count_block(child, stats);
    }
}
