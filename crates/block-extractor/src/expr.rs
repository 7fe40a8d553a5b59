//! Recursive-descent parser for raw CPP `#if` condition expressions.
//!
//! The grammar only accepts the boolean subset of CPP conditions (the
//! translator in [`crate::translate`] decides what the rest means), but the
//! tokenizer knows the full C operator set so that `A + 1` is rejected as an
//! unsupported operator instead of as garbage. Precedence, loosest first:
//! `||`, `&&`, `!`, comparisons, unary `-`, atoms.

use crate::error::ExpressionError;

/// AST of one raw CPP condition, before boolean translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CppExpression {
    IntegerLiteral(i64),
    Variable(String),
    /// Function-call syntax, `defined(X)` and friends. The argument is
    /// syntactically optional; the translator rejects empty calls.
    Call {
        function: String,
        argument: Option<Box<CppExpression>>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<CppExpression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<CppExpression>,
        right: Box<CppExpression>,
    },
}

impl CppExpression {
    fn unary(operator: UnaryOperator, operand: CppExpression) -> Self {
        Self::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    fn binary(operator: BinaryOperator, left: CppExpression, right: CppExpression) -> Self {
        Self::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Logical `!`
    Not,
    /// Unary `-`
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl BinaryOperator {
    pub(crate) const fn symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    const fn is_comparison(self) -> bool {
        !matches!(self, Self::And | Self::Or)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Identifier(String),
    Integer(i64),
    OpenParen,
    CloseParen,
    Not,
    Minus,
    Binary(BinaryOperator),
    /// A C operator the boolean grammar has no production for (`+`, `^`,
    /// `<<`, `?`, ...); kept as a token so errors can name it.
    Unsupported(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Identifier(name) => name.clone(),
            Self::Integer(value) => value.to_string(),
            Self::OpenParen => "(".to_string(),
            Self::CloseParen => ")".to_string(),
            Self::Not => "!".to_string(),
            Self::Minus => "-".to_string(),
            Self::Binary(operator) => operator.symbol().to_string(),
            Self::Unsupported(lexeme) => lexeme.clone(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::OpenParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen);
                i += 1;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::Binary(BinaryOperator::NotEqual));
                i += 2;
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '=' if next == Some('=') => {
                tokens.push(Token::Binary(BinaryOperator::Equal));
                i += 2;
            }
            '=' => {
                tokens.push(Token::Unsupported("=".to_string()));
                i += 1;
            }
            '<' | '>' => {
                if next == Some('=') {
                    let operator = if c == '<' {
                        BinaryOperator::LessOrEqual
                    } else {
                        BinaryOperator::GreaterOrEqual
                    };
                    tokens.push(Token::Binary(operator));
                    i += 2;
                } else if next == Some(c) {
                    // shift operators
                    tokens.push(Token::Unsupported(format!("{c}{c}")));
                    i += 2;
                } else {
                    let operator = if c == '<' {
                        BinaryOperator::Less
                    } else {
                        BinaryOperator::Greater
                    };
                    tokens.push(Token::Binary(operator));
                    i += 1;
                }
            }
            '&' if next == Some('&') => {
                tokens.push(Token::Binary(BinaryOperator::And));
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push(Token::Binary(BinaryOperator::Or));
                i += 2;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '&' | '|' | '+' | '*' | '/' | '%' | '^' | '~' | '?' | ':' | ',' => {
                tokens.push(Token::Unsupported(c.to_string()));
                i += 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Integer(parse_integer(&text)?));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Identifier(chars[start..i].iter().collect()));
            }
            other => return Err(ExpressionError::UnexpectedCharacter(other)),
        }
    }

    Ok(tokens)
}

/// Parses a C integer literal: decimal, `0x` hex or leading-zero octal,
/// with optional `u`/`l` suffixes as used in kernel conditions.
fn parse_integer(text: &str) -> Result<i64, ExpressionError> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);

    let parsed = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse()
    };

    parsed.map_err(|_| ExpressionError::InvalidLiteral(text.to_string()))
}

/// Parses one CPP condition expression into its AST.
pub fn parse_expression(input: &str) -> Result<CppExpression, ExpressionError> {
    let tokens = tokenize(input)?;
    let mut parser = ExpressionParser { tokens, pos: 0 };
    let expression = parser.disjunction()?;

    match parser.peek() {
        None => Ok(expression),
        Some(Token::Unsupported(lexeme)) => {
            Err(ExpressionError::UnsupportedOperator(lexeme.clone()))
        }
        Some(Token::CloseParen) => Err(ExpressionError::UnbalancedParentheses),
        Some(other) => Err(ExpressionError::TrailingInput(other.describe())),
    }
}

struct ExpressionParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExpressionParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn disjunction(&mut self) -> Result<CppExpression, ExpressionError> {
        let mut left = self.conjunction()?;
        while self.eat(&Token::Binary(BinaryOperator::Or)) {
            let right = self.conjunction()?;
            left = CppExpression::binary(BinaryOperator::Or, left, right);
        }
        Ok(left)
    }

    fn conjunction(&mut self) -> Result<CppExpression, ExpressionError> {
        let mut left = self.negation()?;
        while self.eat(&Token::Binary(BinaryOperator::And)) {
            let right = self.negation()?;
            left = CppExpression::binary(BinaryOperator::And, left, right);
        }
        Ok(left)
    }

    fn negation(&mut self) -> Result<CppExpression, ExpressionError> {
        if self.eat(&Token::Not) {
            let operand = self.negation()?;
            return Ok(CppExpression::unary(UnaryOperator::Not, operand));
        }
        self.relational()
    }

    fn relational(&mut self) -> Result<CppExpression, ExpressionError> {
        let left = self.unary_minus()?;
        if let Some(Token::Binary(operator)) = self.peek() {
            if operator.is_comparison() {
                let operator = *operator;
                self.pos += 1;
                let right = self.unary_minus()?;
                return Ok(CppExpression::binary(operator, left, right));
            }
        }
        Ok(left)
    }

    fn unary_minus(&mut self) -> Result<CppExpression, ExpressionError> {
        if self.eat(&Token::Minus) {
            let operand = self.unary_minus()?;
            return Ok(CppExpression::unary(UnaryOperator::Minus, operand));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<CppExpression, ExpressionError> {
        match self.advance() {
            None => Err(ExpressionError::DanglingOperator),
            Some(Token::Integer(value)) => Ok(CppExpression::IntegerLiteral(value)),
            Some(Token::OpenParen) => {
                let inner = self.disjunction()?;
                self.expect_close_paren()?;
                Ok(inner)
            }
            Some(Token::Identifier(name)) => self.call_or_variable(name),
            Some(Token::Unsupported(lexeme)) => Err(ExpressionError::UnsupportedOperator(lexeme)),
            Some(other) => Err(ExpressionError::ExpectedOperand(other.describe())),
        }
    }

    fn call_or_variable(&mut self, name: String) -> Result<CppExpression, ExpressionError> {
        if self.eat(&Token::OpenParen) {
            if self.eat(&Token::CloseParen) {
                return Ok(CppExpression::Call {
                    function: name,
                    argument: None,
                });
            }
            let argument = self.disjunction()?;
            self.expect_close_paren()?;
            return Ok(CppExpression::Call {
                function: name,
                argument: Some(Box::new(argument)),
            });
        }

        // `defined X` without parentheses is valid CPP
        if name == "defined" {
            if let Some(Token::Identifier(argument)) = self.peek().cloned() {
                self.pos += 1;
                return Ok(CppExpression::Call {
                    function: name,
                    argument: Some(Box::new(CppExpression::Variable(argument))),
                });
            }
        }

        Ok(CppExpression::Variable(name))
    }

    fn expect_close_paren(&mut self) -> Result<(), ExpressionError> {
        match self.advance() {
            Some(Token::CloseParen) => Ok(()),
            Some(Token::Unsupported(lexeme)) => Err(ExpressionError::UnsupportedOperator(lexeme)),
            Some(other) => Err(ExpressionError::ExpectedClosingParenthesis(other.describe())),
            None => Err(ExpressionError::UnbalancedParentheses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> CppExpression {
        CppExpression::Variable(name.to_string())
    }

    fn defined(name: &str) -> CppExpression {
        CppExpression::Call {
            function: "defined".to_string(),
            argument: Some(Box::new(var(name))),
        }
    }

    #[test]
    fn parses_defined_call() {
        assert_eq!(parse_expression("defined(A)").unwrap(), defined("A"));
    }

    #[test]
    fn parses_defined_with_space_before_paren() {
        assert_eq!(parse_expression("defined (A)").unwrap(), defined("A"));
    }

    #[test]
    fn parses_defined_without_parens() {
        assert_eq!(parse_expression("defined A").unwrap(), defined("A"));
    }

    #[test]
    fn conjunction_binds_tighter_than_disjunction() {
        let parsed = parse_expression("defined(A) || defined(B) && defined(C)").unwrap();
        assert_eq!(
            parsed,
            CppExpression::binary(
                BinaryOperator::Or,
                defined("A"),
                CppExpression::binary(BinaryOperator::And, defined("B"), defined("C")),
            )
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let parsed = parse_expression("(defined(A) || defined(B)) && defined(C)").unwrap();
        assert_eq!(
            parsed,
            CppExpression::binary(
                BinaryOperator::And,
                CppExpression::binary(BinaryOperator::Or, defined("A"), defined("B")),
                defined("C"),
            )
        );
    }

    #[test]
    fn negation_nests() {
        let parsed = parse_expression("!!defined(A)").unwrap();
        assert_eq!(
            parsed,
            CppExpression::unary(
                UnaryOperator::Not,
                CppExpression::unary(UnaryOperator::Not, defined("A")),
            )
        );
    }

    #[test]
    fn comparison_takes_bare_operands() {
        let parsed = parse_expression("A >= 2").unwrap();
        assert_eq!(
            parsed,
            CppExpression::binary(
                BinaryOperator::GreaterOrEqual,
                var("A"),
                CppExpression::IntegerLiteral(2),
            )
        );
    }

    #[test]
    fn unary_minus_on_literal() {
        let parsed = parse_expression("-2").unwrap();
        assert_eq!(
            parsed,
            CppExpression::unary(UnaryOperator::Minus, CppExpression::IntegerLiteral(2))
        );
    }

    #[test]
    fn integer_literal_forms() {
        assert_eq!(parse_expression("42").unwrap(), CppExpression::IntegerLiteral(42));
        assert_eq!(parse_expression("0x10").unwrap(), CppExpression::IntegerLiteral(16));
        assert_eq!(parse_expression("010").unwrap(), CppExpression::IntegerLiteral(8));
        assert_eq!(parse_expression("0").unwrap(), CppExpression::IntegerLiteral(0));
        assert_eq!(parse_expression("1UL").unwrap(), CppExpression::IntegerLiteral(1));
    }

    #[test]
    fn bad_literal_is_rejected() {
        assert_eq!(
            parse_expression("12ab"),
            Err(ExpressionError::InvalidLiteral("12ab".to_string()))
        );
    }

    #[test]
    fn dangling_operator_is_rejected() {
        assert_eq!(
            parse_expression("defined(A) || "),
            Err(ExpressionError::DanglingOperator)
        );
        assert_eq!(
            parse_expression("defined(A) &&"),
            Err(ExpressionError::DanglingOperator)
        );
    }

    #[test]
    fn unbalanced_parens_are_rejected() {
        assert_eq!(
            parse_expression("(defined(A)"),
            Err(ExpressionError::UnbalancedParentheses)
        );
        assert_eq!(
            parse_expression("defined(A))"),
            Err(ExpressionError::UnbalancedParentheses)
        );
    }

    #[test]
    fn unsupported_operators_are_named() {
        assert_eq!(
            parse_expression("A + 1"),
            Err(ExpressionError::UnsupportedOperator("+".to_string()))
        );
        assert_eq!(
            parse_expression("A ^ 1"),
            Err(ExpressionError::UnsupportedOperator("^".to_string()))
        );
        assert_eq!(
            parse_expression("A << 2"),
            Err(ExpressionError::UnsupportedOperator("<<".to_string()))
        );
        assert_eq!(
            parse_expression("(A + 1) > 5"),
            Err(ExpressionError::UnsupportedOperator("+".to_string()))
        );
        assert_eq!(
            parse_expression("A & B"),
            Err(ExpressionError::UnsupportedOperator("&".to_string()))
        );
    }

    #[test]
    fn chained_comparisons_are_rejected() {
        assert_eq!(
            parse_expression("1 < A < 3"),
            Err(ExpressionError::TrailingInput("<".to_string()))
        );
    }

    #[test]
    fn empty_call_parses_for_translator_to_reject() {
        assert_eq!(
            parse_expression("defined()").unwrap(),
            CppExpression::Call {
                function: "defined".to_string(),
                argument: None,
            }
        );
    }

    #[test]
    fn unexpected_character_is_rejected() {
        assert_eq!(
            parse_expression("defined(@)"),
            Err(ExpressionError::UnexpectedCharacter('@'))
        );
    }
}
