//! The directive state machine that walks a file and builds the block tree.

use std::io::BufRead;

use variability_logic::Formula;

use crate::block::Block;
use crate::config::{ExtractorConfig, InvalidConditionHandling};
use crate::error::{ExtractorError, Result};
use crate::normalize::{collapse_directive_hash, strip_comments, CommentState};
use crate::translate::{CppConditionParser, PARSING_ERROR_VARIABLE};

/// A block whose closing directive has not been seen yet. Open blocks live
/// on a flat stack and own their already-finished children, so the tree is
/// only assembled at finalization and parent/child never reference each
/// other while mutable.
#[derive(Debug)]
struct OpenBlock {
    start_line: usize,
    condition: Formula,
    presence_condition: Formula,
    children: Vec<Block>,
}

/// A parser that walks through one file and returns all blocks found in it.
///
/// Holds no state shared with anything else; run one parser per file, from
/// as many threads as you like.
pub struct BlockParser<R> {
    input: R,
    source_file: String,
    condition_parser: CppConditionParser,
    invalid_conditions: InvalidConditionHandling,
    add_pseudo_block: bool,
    /// Blocks not nested inside any other block.
    top_blocks: Vec<Block>,
    /// The chain of currently open blocks, outermost first.
    nesting: Vec<OpenBlock>,
    /// Per depth, the conditions of all previous `#if`/`#elif` siblings in
    /// the current chain, used to build the negations for `#elif`/`#else`.
    /// An `#else` empties the list so that any further branch at that depth
    /// is an error. Pushed and popped in lockstep with `nesting`.
    previous_conditions: Vec<Vec<Formula>>,
    comment_state: CommentState,
    /// Line number of the first physical line of the current logical line;
    /// continuations join several physical lines into one logical line.
    current_line: usize,
    /// Physical lines consumed so far.
    physical_line: usize,
}

impl<R: BufRead> BlockParser<R> {
    /// Creates a parser for the given input. `source_file` only tags the
    /// resulting blocks and error messages; nothing is resolved on disk.
    pub fn new(input: R, source_file: impl Into<String>, config: &ExtractorConfig) -> Self {
        Self {
            input,
            source_file: source_file.into(),
            condition_parser: CppConditionParser::new(
                config.handle_linux_macros,
                config.fuzzy_parsing,
            ),
            invalid_conditions: config.invalid_conditions,
            add_pseudo_block: config.add_pseudo_block,
            top_blocks: Vec::new(),
            nesting: Vec::new(),
            previous_conditions: Vec::new(),
            comment_state: CommentState::default(),
            current_line: 0,
            physical_line: 0,
        }
    }

    /// Finds all blocks in the input.
    ///
    /// Consumes the parser: one parser handles exactly one file.
    pub fn read_blocks(mut self) -> Result<Vec<Block>> {
        let mut found_content_outside_top_blocks = false;

        while let Some(raw) = self.next_physical_line()? {
            self.current_line = self.physical_line;

            let mut logical = raw.trim().to_string();
            if logical.starts_with('#') {
                logical = collapse_directive_hash(&logical);

                // line continuation: strip one trailing backslash per round
                // and append the next physical line raw, until none remains
                while logical.ends_with('\\') {
                    logical.pop();
                    if let Some(next) = self.next_physical_line()? {
                        logical.push_str(&next);
                    }
                }
            }

            let (stripped, next_state) = strip_comments(&logical, self.comment_state);
            self.comment_state = next_state;
            let line = stripped.trim();

            if let Some(rest) = line.strip_prefix("#ifdef") {
                self.handle_if(&format!("defined({})", rest.trim()))?;
            } else if let Some(rest) = line.strip_prefix("#ifndef") {
                self.handle_if(&format!("!defined({})", rest.trim()))?;
            } else if let Some(rest) = line.strip_prefix("#if") {
                self.handle_if(rest)?;
            } else if let Some(rest) = line.strip_prefix("#elif") {
                self.handle_elif(rest)?;
            } else if line.starts_with("#else") {
                self.handle_else()?;
            } else if line.starts_with("#endif") {
                self.handle_endif()?;
            } else if !found_content_outside_top_blocks
                && !line.is_empty()
                && self.nesting.is_empty()
            {
                // a non-whitespace character outside of all #if blocks
                found_content_outside_top_blocks = true;
            }
        }

        if let Some(open) = self.nesting.last() {
            return Err(ExtractorError::structural(
                open.start_line,
                "found opening with no closing #endif",
            ));
        }

        Ok(self.build_result(found_content_outside_top_blocks))
    }

    /// Reads one physical line, without its terminator. Counts it.
    fn next_physical_line(&mut self) -> std::io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.physical_line += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }

    fn handle_if(&mut self, expression: &str) -> Result<()> {
        let condition = self.parse_condition(expression)?;
        self.previous_conditions.push(vec![condition.clone()]);
        self.open_block(condition);
        Ok(())
    }

    fn handle_elif(&mut self, expression: &str) -> Result<()> {
        let line = self.current_line;
        let not_previous = match self.previous_conditions.last() {
            None => {
                return Err(ExtractorError::structural(
                    line,
                    "found #elif with no previous #if condition",
                ))
            }
            Some(siblings) if siblings.is_empty() => {
                return Err(ExtractorError::structural(
                    line,
                    "found #elif after an #else condition",
                ))
            }
            Some(siblings) => negate_all(siblings),
        };

        let condition = self.parse_condition(expression)?;
        if let Some(siblings) = self.previous_conditions.last_mut() {
            siblings.push(condition.clone());
        }

        let Some(open) = self.nesting.pop() else {
            return Err(ExtractorError::structural(
                line,
                "found #elif with no previous #if condition",
            ));
        };
        self.finish_block(open);
        self.open_block(Formula::and(not_previous, condition));
        Ok(())
    }

    fn handle_else(&mut self) -> Result<()> {
        let line = self.current_line;
        let not_previous = match self.previous_conditions.last() {
            None => {
                return Err(ExtractorError::structural(
                    line,
                    "found #else with no previous #if condition",
                ))
            }
            Some(siblings) if siblings.is_empty() => {
                return Err(ExtractorError::structural(
                    line,
                    "found #else after an #else condition",
                ))
            }
            Some(siblings) => negate_all(siblings),
        };

        // no further #elif or #else is allowed in this chain
        if let Some(siblings) = self.previous_conditions.last_mut() {
            siblings.clear();
        }

        let Some(open) = self.nesting.pop() else {
            return Err(ExtractorError::structural(
                line,
                "found #else with no previous #if condition",
            ));
        };
        self.finish_block(open);
        self.open_block(not_previous);
        Ok(())
    }

    fn handle_endif(&mut self) -> Result<()> {
        let Some(open) = self.nesting.pop() else {
            return Err(ExtractorError::structural(
                self.current_line,
                "found #endif with no corresponding opening",
            ));
        };
        self.finish_block(open);
        self.previous_conditions.pop();
        Ok(())
    }

    /// Parses one directive condition, applying the configured recovery
    /// policy to expression errors. Recovery is local to this directive;
    /// structural directive misuse never comes through here.
    fn parse_condition(&self, expression: &str) -> Result<Formula> {
        match self.condition_parser.parse(expression) {
            Ok(condition) => Ok(condition),
            Err(source) => match self.invalid_conditions {
                InvalidConditionHandling::Exception => Err(ExtractorError::Expression {
                    line: self.current_line,
                    source,
                }),
                InvalidConditionHandling::True => {
                    log::warn!(
                        "{}:{}: treating unparseable condition as true: {source}",
                        self.source_file,
                        self.current_line
                    );
                    Ok(Formula::True)
                }
                InvalidConditionHandling::ErrorVariable => {
                    log::warn!(
                        "{}:{}: substituting {PARSING_ERROR_VARIABLE} for unparseable condition: {source}",
                        self.source_file,
                        self.current_line
                    );
                    Ok(Formula::var(PARSING_ERROR_VARIABLE))
                }
            },
        }
    }

    /// Opens a block at the current line with the given condition.
    fn open_block(&mut self, condition: Formula) {
        let presence_condition = match self.nesting.last() {
            Some(parent) => Formula::and(parent.presence_condition.clone(), condition.clone()),
            None => condition.clone(),
        };
        self.nesting.push(OpenBlock {
            start_line: self.current_line,
            condition,
            presence_condition,
            children: Vec::new(),
        });
    }

    /// Stamps the end line of a just-closed block and hands it to its
    /// parent, or to the top-level list when nothing encloses it. The block
    /// ends on the line before the directive that closed it.
    fn finish_block(&mut self, open: OpenBlock) {
        let mut block = Block::new(
            self.source_file.clone(),
            open.start_line,
            self.current_line - 1,
            open.condition,
            open.presence_condition,
        );
        block.children = open.children;

        match self.nesting.last_mut() {
            Some(parent) => parent.children.push(block),
            None => self.top_blocks.push(block),
        }
    }

    /// Builds the final list of top-level blocks. If content was found
    /// outside all blocks, one pseudo block with condition true spans the
    /// whole file and the real top blocks nest inside it (+1 on the end
    /// line for the trailing newline).
    fn build_result(mut self, found_content_outside_top_blocks: bool) -> Vec<Block> {
        if found_content_outside_top_blocks && self.add_pseudo_block {
            let children = std::mem::take(&mut self.top_blocks);
            let mut pseudo = Block::new(
                self.source_file,
                1,
                self.current_line + 1,
                Formula::True,
                Formula::True,
            );
            pseudo.children = children;
            vec![pseudo]
        } else {
            self.top_blocks
        }
    }
}

/// Conjunction of the negations of all previous sibling conditions, folded
/// left-to-right in source order.
fn negate_all(siblings: &[Formula]) -> Formula {
    siblings
        .iter()
        .map(|sibling| Formula::not(sibling.clone()))
        .reduce(|left, right| Formula::and(left, right))
        .unwrap_or(Formula::True)
}
