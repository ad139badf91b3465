//! Safe arithmetic evaluator.
//!
//! Recursive descent over `+ - * / %`, parentheses and unary signs. Nothing
//! is ever executed as code. Every failure, including division by zero and
//! unconsumed trailing tokens, is reported as NaN.

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

/// Characters an arithmetic expression may consist of.
const ARITH_CHARS: &str = "0123456789.+-*/%() \t";

/// True if `text` is non-blank and made only of arithmetic characters.
pub fn is_arithmetic_text(text: &str) -> bool {
    let t = text.trim();
    !t.is_empty() && t.chars().all(|c| ARITH_CHARS.contains(c))
}

/// Parse a plain decimal: optional sign, digits, at most one dot.
///
/// Rejects everything else `f64::from_str` would accept (`inf`, `NaN`,
/// exponents) so that comparisons treat such text as non-numeric.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let t = text.trim();
    let digits = t.strip_prefix(['+', '-']).unwrap_or(t);
    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !well_formed {
        return None;
    }
    t.parse().ok()
}

/// Parse a run of digits and dots, ignoring everything from a second dot on.
fn parse_number(run: &str) -> f64 {
    let end = run
        .match_indices('.')
        .nth(1)
        .map_or(run.len(), |(i, _)| i);
    run[..end].parse().unwrap_or(f64::NAN)
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(i, ch)) = chars.peek() {
        let tok = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            },
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = i;
                while let Some(&(j, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = j + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Num(parse_number(&input[i..end])));
                continue;
            },
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            _ => return None,
        };
        tokens.push(tok);
        chars.next();
    }
    Some(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> Option<f64> {
        let mut acc = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == Token::Plus { acc + rhs } else { acc - rhs };
        }
        Some(acc)
    }

    fn term(&mut self) -> Option<f64> {
        let mut acc = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::Percent)) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            acc = match op {
                Token::Star => acc * rhs,
                _ if rhs == 0.0 => f64::NAN,
                Token::Slash => acc / rhs,
                _ => acc % rhs,
            };
        }
        Some(acc)
    }

    fn factor(&mut self) -> Option<f64> {
        match self.bump()? {
            Token::Num(n) => Some(n),
            Token::LParen => {
                let v = self.expr()?;
                match self.bump()? {
                    Token::RParen => Some(v),
                    _ => None,
                }
            },
            Token::Minus => self.factor().map(|v| -v),
            Token::Plus => self.factor(),
            _ => None,
        }
    }
}

/// Evaluate an arithmetic expression. Returns NaN when `input` is not a
/// complete, well-formed expression.
pub fn evaluate(input: &str) -> f64 {
    let Some(tokens) = tokenize(input) else {
        return f64::NAN;
    };
    let mut parser = Parser { tokens, pos: 0 };
    match parser.expr() {
        Some(v) if parser.pos == parser.tokens.len() => v,
        _ => f64::NAN,
    }
}

/// Render a number the way the shell prints it: integral values without a
/// fractional part, `NaN`, `Infinity`, and no negative zero.
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let s = if v > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if v == 0.0 {
        "0".to_string()
    } else {
        format!("{v}")
    }
}
