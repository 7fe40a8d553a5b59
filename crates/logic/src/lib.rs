//! Propositional formulas over named variables.
//!
//! This crate holds the boolean algebra shared by the block extractor and by
//! downstream variability analyses: a [`Formula`] is an immutable expression
//! tree over feature/macro names. Equality is structural; no normalization or
//! simplification happens here, so `A && 1` and `A` are different formulas
//! and a caller that wants canonical forms has to build them itself.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A boolean formula over named variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    /// The constant true.
    True,
    /// The constant false.
    False,
    /// A single named variable.
    Variable(String),
    /// Logical not.
    Negation(Box<Formula>),
    /// Logical and of exactly two operands.
    Conjunction(Box<Formula>, Box<Formula>),
    /// Logical or of exactly two operands.
    Disjunction(Box<Formula>, Box<Formula>),
}

impl Formula {
    /// Creates a variable formula.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Negates a formula.
    pub fn not(operand: impl Into<Formula>) -> Self {
        Self::Negation(Box::new(operand.into()))
    }

    /// Conjunction of two formulas.
    pub fn and(left: impl Into<Formula>, right: impl Into<Formula>) -> Self {
        Self::Conjunction(Box::new(left.into()), Box::new(right.into()))
    }

    /// Disjunction of two formulas.
    pub fn or(left: impl Into<Formula>, right: impl Into<Formula>) -> Self {
        Self::Disjunction(Box::new(left.into()), Box::new(right.into()))
    }

    /// All distinct variable names in this formula, in sorted order.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Self::True | Self::False => {}
            Self::Variable(name) => {
                out.insert(name.as_str());
            }
            Self::Negation(operand) => operand.collect_variables(out),
            Self::Conjunction(left, right) | Self::Disjunction(left, right) => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
        }
    }

    /// Number of occurrences of one variable in this formula.
    ///
    /// Counts every occurrence, not just distinct ones, so it can measure how
    /// often a sentinel (e.g. a parsing-error placeholder) was substituted.
    #[must_use]
    pub fn count_occurrences(&self, variable: &str) -> usize {
        match self {
            Self::True | Self::False => 0,
            Self::Variable(name) => usize::from(name == variable),
            Self::Negation(operand) => operand.count_occurrences(variable),
            Self::Conjunction(left, right) | Self::Disjunction(left, right) => {
                left.count_occurrences(variable) + right.count_occurrences(variable)
            }
        }
    }

    /// Binding strength used for parenthesization in [`fmt::Display`].
    const fn precedence(&self) -> u8 {
        match self {
            Self::True | Self::False | Self::Variable(_) => 3,
            Self::Negation(_) => 2,
            Self::Conjunction(_, _) => 1,
            Self::Disjunction(_, _) => 0,
        }
    }

    fn write_with_parent(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        let parens = self.precedence() < parent;
        if parens {
            write!(f, "(")?;
        }
        match self {
            Self::True => write!(f, "1")?,
            Self::False => write!(f, "0")?,
            Self::Variable(name) => write!(f, "{name}")?,
            Self::Negation(operand) => {
                write!(f, "!")?;
                operand.write_with_parent(f, 3)?;
            }
            Self::Conjunction(left, right) => {
                left.write_with_parent(f, 1)?;
                write!(f, " && ")?;
                right.write_with_parent(f, 1)?;
            }
            Self::Disjunction(left, right) => {
                left.write_with_parent(f, 0)?;
                write!(f, " || ")?;
                right.write_with_parent(f, 0)?;
            }
        }
        if parens {
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Formula {
    /// Renders the formula C-style, with parentheses only where precedence
    /// requires them (`!` over `&&` over `||`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with_parent(f, 0)
    }
}

impl From<&str> for Formula {
    fn from(name: &str) -> Self {
        Self::Variable(name.to_string())
    }
}

impl From<String> for Formula {
    fn from(name: String) -> Self {
        Self::Variable(name)
    }
}
