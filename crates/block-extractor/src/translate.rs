//! Translation of raw CPP expression ASTs into boolean formulas.

use variability_logic::Formula;

use crate::error::ExpressionError;
use crate::expr::{parse_expression, BinaryOperator, CppExpression, UnaryOperator};

/// Name of the sentinel variable substituted for unparseable conditions
/// under [`InvalidConditionHandling::ErrorVariable`](crate::InvalidConditionHandling).
pub const PARSING_ERROR_VARIABLE: &str = "PARSING_ERROR";

/// Parses boolean CPP conditions into [`Formula`]s.
///
/// `defined(X)` becomes the variable `X`. What else is accepted depends on
/// the two modes: `handle_linux_macros` admits the kernel's `IS_ENABLED`/
/// `IS_BUILTIN`/`IS_MODULE` macros, and `fuzzy_parsing` admits bare
/// variables and integer comparisons by encoding them as synthetic
/// truthiness variables (`A` → `A_ne_0`, `A == 2` → `A_eq_2`).
#[derive(Debug, Clone)]
pub struct CppConditionParser {
    handle_linux_macros: bool,
    fuzzy_parsing: bool,
}

impl CppConditionParser {
    #[must_use]
    pub fn new(handle_linux_macros: bool, fuzzy_parsing: bool) -> Self {
        Self {
            handle_linux_macros,
            fuzzy_parsing,
        }
    }

    /// Parses the given CPP expression into a boolean formula.
    pub fn parse(&self, expression: &str) -> Result<Formula, ExpressionError> {
        let ast = parse_expression(expression)?;
        self.translate(&ast)
    }

    fn translate(&self, expression: &CppExpression) -> Result<Formula, ExpressionError> {
        match expression {
            CppExpression::IntegerLiteral(0) => Ok(Formula::False),
            CppExpression::IntegerLiteral(_) => Ok(Formula::True),

            CppExpression::Variable(name) => {
                if self.fuzzy_parsing {
                    Ok(Formula::var(format!("{name}_ne_0")))
                } else {
                    Err(ExpressionError::BareVariable(name.clone()))
                }
            }

            CppExpression::Call { function, argument } => {
                self.translate_call(function, argument.as_deref())
            }

            CppExpression::Unary {
                operator: UnaryOperator::Not,
                operand,
            } => Ok(Formula::not(self.translate(operand)?)),

            // -LITERAL is allowed, everything != 0 is true
            CppExpression::Unary {
                operator: UnaryOperator::Minus,
                operand,
            } => match operand.as_ref() {
                CppExpression::IntegerLiteral(value) => Ok(if *value == 0 {
                    Formula::False
                } else {
                    Formula::True
                }),
                _ => Err(ExpressionError::UnsupportedOperator("-".to_string())),
            },

            CppExpression::Binary {
                operator: BinaryOperator::And,
                left,
                right,
            } => Ok(Formula::and(self.translate(left)?, self.translate(right)?)),

            CppExpression::Binary {
                operator: BinaryOperator::Or,
                left,
                right,
            } => Ok(Formula::or(self.translate(left)?, self.translate(right)?)),

            CppExpression::Binary {
                operator,
                left,
                right,
            } => self.fuzzy_comparison(*operator, left, right),
        }
    }

    fn translate_call(
        &self,
        function: &str,
        argument: Option<&CppExpression>,
    ) -> Result<Formula, ExpressionError> {
        let Some(argument) = argument else {
            return Err(ExpressionError::MissingArgument(function.to_string()));
        };
        let CppExpression::Variable(name) = argument else {
            return Err(ExpressionError::NonVariableArgument(function.to_string()));
        };

        match function {
            "defined" => Ok(Formula::var(name.clone())),
            // a tristate option is enabled when built in or built as module
            "IS_ENABLED" if self.handle_linux_macros => Ok(Formula::or(
                Formula::var(name.clone()),
                Formula::var(format!("{name}_MODULE")),
            )),
            "IS_BUILTIN" if self.handle_linux_macros => Ok(Formula::var(name.clone())),
            "IS_MODULE" if self.handle_linux_macros => Ok(Formula::var(format!("{name}_MODULE"))),
            _ => Err(ExpressionError::UnsupportedFunction(function.to_string())),
        }
    }

    /// Encodes a comparison as one opaque variable, `<variable><op><value>`.
    /// When the literal is on the left the comparison is mirrored so the
    /// variable always comes first in the encoded name.
    fn fuzzy_comparison(
        &self,
        operator: BinaryOperator,
        left: &CppExpression,
        right: &CppExpression,
    ) -> Result<Formula, ExpressionError> {
        if !self.fuzzy_parsing {
            return Err(ExpressionError::ComparisonWithoutFuzzy(
                operator.symbol().to_string(),
            ));
        }

        let (variable, switched, value) = match (left, right) {
            (CppExpression::Variable(variable), CppExpression::IntegerLiteral(value)) => {
                (variable, false, value.to_string())
            }
            (CppExpression::IntegerLiteral(value), CppExpression::Variable(variable)) => {
                (variable, true, value.to_string())
            }
            (CppExpression::Variable(variable), CppExpression::Variable(other)) => {
                (variable, false, other.clone())
            }
            _ => return Err(ExpressionError::UnsupportedComparison),
        };

        let tag = match (operator, switched) {
            (BinaryOperator::Equal, _) => "_eq_",
            (BinaryOperator::NotEqual, _) => "_ne_",
            (BinaryOperator::Less, false) | (BinaryOperator::Greater, true) => "_lt_",
            (BinaryOperator::Less, true) | (BinaryOperator::Greater, false) => "_gt_",
            (BinaryOperator::LessOrEqual, false) | (BinaryOperator::GreaterOrEqual, true) => "_le_",
            (BinaryOperator::LessOrEqual, true) | (BinaryOperator::GreaterOrEqual, false) => "_ge_",
            (BinaryOperator::And | BinaryOperator::Or, _) => {
                return Err(ExpressionError::UnsupportedComparison)
            }
        };

        Ok(Formula::var(format!("{variable}{tag}{value}")))
    }
}
