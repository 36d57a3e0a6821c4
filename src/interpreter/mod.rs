//! Natural-language math interpreter.
//!
//! `interpret_query` classifies a query (see [`intent`]), runs the matching
//! extractor and returns a fresh [`Response`]. It holds no state: the same
//! input always produces the same response.

pub mod intent;

mod extract;

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::format::format_number;
pub use intent::{classify, ArithmeticOp, Intent, LogFn, TrigFn};

/// Shown when nothing in the query could be understood.
pub const GUIDANCE: &str = "I couldn't understand that query. Try something like \
                            'What's 20% of 500?' or 'Convert 32°F to Celsius'";

/// The answer part of a [`Response`].
///
/// Temperature, trigonometry and logarithm answers are preformatted text;
/// everything else is a plain number. Failures carry their guidance message
/// as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Number(f64),
    Text(String),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Number(value) => write!(f, "{}", format_number(*value)),
            Answer::Text(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    pub result: Answer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Response {
    pub(crate) fn solved(result: Answer, explanation: String, formula: String) -> Self {
        Self {
            success: true,
            result,
            explanation: Some(explanation),
            formula: Some(formula),
        }
    }

    pub(crate) fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: Answer::Text(message.into()),
            explanation: None,
            formula: None,
        }
    }

    /// The numeric answer, if the query succeeded with one.
    pub fn number(&self) -> Option<f64> {
        match self.result {
            Answer::Number(value) if self.success => Some(value),
            _ => None,
        }
    }

    /// Whether the answer can be shown as-is.
    ///
    /// A successful response may still carry `NaN` or an infinity (division
    /// by zero, `log 0`); those must be shown as an error instead.
    pub fn is_displayable(&self) -> bool {
        if !self.success {
            return false;
        }
        match &self.result {
            Answer::Number(value) => value.is_finite(),
            Answer::Text(text) => !(text.contains("NaN") || text.contains("Infinity")),
        }
    }

    /// `(formula, result)` to record in the calculation history. Only finite
    /// numeric answers are recorded.
    pub fn history_record(&self) -> Option<(String, String)> {
        let value = self.number().filter(|v| v.is_finite())?;
        let formula = self.formula.clone()?;
        Some((formula, format_number(value)))
    }
}

/// Interprets a natural-language math query.
pub fn interpret_query(query: &str) -> Response {
    let normalized = intent::normalize(query);
    let intent = intent::classify_normalized(&normalized);
    debug!(%intent, "Classified query");

    let response = match intent {
        Intent::Percentage => extract::percentage(&normalized),
        Intent::TemperatureConversion => extract::temperature(&normalized),
        Intent::SquareRoot => extract::square_root(&normalized),
        Intent::Power => extract::power(&normalized),
        Intent::WordArithmetic(op) => extract::word_arithmetic(&normalized, op),
        Intent::Trigonometry(func) => extract::trigonometry(&normalized, func),
        Intent::Logarithm(func) => extract::logarithm(&normalized, func),
        Intent::RawExpression => extract::raw_expression(query),
    };

    if !response.success {
        debug!(%intent, reason = %response.result, "Query not answered");
    }
    response
}

/// Explains how the answer to `last_query` was obtained.
pub fn explain_last_calculation(last_query: &str, last_result: &str) -> String {
    let response = interpret_query(last_query);
    match (response.explanation, response.formula) {
        (Some(explanation), formula) => format!(
            "{}\n\nFormula: {}",
            explanation,
            formula.unwrap_or_default()
        ),
        (None, _) => format!("I calculated: {} = {}", last_query, last_result),
    }
}
