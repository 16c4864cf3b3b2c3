use itertools::Itertools;
use sqlparser::ast::{Ident, Value};

use crate::ir::{Literal, SemanticType};

/// Quotes a possibly dotted name, bracketing each part.
///
/// `dbo.people` becomes `[dbo].[people]`.
pub fn quote_identifier(name: &str) -> String {
    name.split('.').map(quote_name_part).join(".")
}

/// Quotes a single name part, escaping closing brackets.
pub(super) fn quote_name_part(part: &str) -> String {
    Ident::with_quote('[', part.replace(']', "]]")).to_string()
}

/// Renders a literal, coerced to the type of the column it is bound to.
///
/// Strings are national (`N'...'`) unless the column is known to hold
/// non-unicode text.
pub fn quote_literal(value: &Literal, ty: Option<SemanticType>) -> String {
    match (value, ty) {
        (Literal::Null, _) => Value::Null.to_string(),

        (Literal::String(text), Some(SemanticType::Integer)) => number(leading_integer(text)),
        (Literal::String(text), Some(SemanticType::Float)) => number(leading_float(text)),
        (Literal::String(text), Some(SemanticType::Binary)) => hex(text.as_bytes()),
        (Literal::String(text), Some(SemanticType::NonUnicodeString)) => string(text),
        (Literal::String(text), _) => national(text),

        (Literal::Integer(i), Some(SemanticType::String)) => national(&i.to_string()),
        (Literal::Integer(i), Some(SemanticType::NonUnicodeString)) => string(&i.to_string()),
        (Literal::Integer(i), Some(SemanticType::Float)) => number(*i as f64),
        (Literal::Integer(i), _) => number(i),

        (Literal::Float(f), Some(SemanticType::Integer)) => number(f.trunc() as i64),
        (Literal::Float(f), _) => number(f),

        (Literal::Boolean(b), _) => number(if *b { 1 } else { 0 }),

        (Literal::Date(date), _) => string(&date.format("%Y-%m-%d").to_string()),
        (Literal::DateTime(datetime), Some(SemanticType::Date)) => {
            string(&datetime.format("%Y-%m-%d").to_string())
        }
        (Literal::DateTime(datetime), Some(SemanticType::Time)) => {
            string(&datetime.format("%H:%M:%S%.3f").to_string())
        }
        (Literal::DateTime(datetime), _) => {
            string(&datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        }
        (Literal::Time(time), _) => string(&time.format("%H:%M:%S%.3f").to_string()),

        (Literal::Binary(bytes), _) => hex(bytes),
    }
}

fn number<N: ToString>(n: N) -> String {
    Value::Number(n.to_string(), false).to_string()
}

fn string(text: &str) -> String {
    Value::SingleQuotedString(text.to_string()).to_string()
}

fn national(text: &str) -> String {
    format!("N{}", string(text))
}

fn hex(bytes: &[u8]) -> String {
    format!("0x{}", bytes.iter().map(|b| format!("{b:02X}")).join(""))
}

/// Integer prefix of a string, `0` when there is none.
fn leading_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let end = (text.char_indices())
        .take_while(|(i, c)| c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    text[..end].parse().unwrap_or(0)
}

/// Longest float prefix of a string, `0` when there is none.
fn leading_float(text: &str) -> f64 {
    let text = text.trim_start();
    (0..=text.len())
        .rev()
        .filter(|end| text.is_char_boundary(*end))
        .find_map(|end| text[..end].parse::<f64>().ok())
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}
