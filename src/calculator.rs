//! Keypad calculator: button presses in, display text out.
//!
//! Digits accumulate on the display; an operator moves the display into the
//! pending expression (`"12 + "`); `=` evaluates the whole expression with
//! [`evaluate_expression`]. Anything that fails validation or evaluates to a
//! non-finite value puts the keypad in the error state, which only
//! [`Calculator::clear`] leaves.

use std::f64::consts::{E, PI};

use tracing::debug;

use crate::error::CalcError;
use crate::expr::evaluate_expression;
use crate::format::format_number;
use crate::history::HistorySink;

pub const ERROR_DISPLAY: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadState {
    Idle,
    Accumulating,
    PendingOperator,
    Evaluated,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' | '×' | 'x' => Some(Operator::Multiply),
            '/' | '÷' => Some(Operator::Divide),
            _ => None,
        }
    }
}

/// Single-argument keys of the scientific panel. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScientificFn {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Square,
    Log,
    Ln,
    Exp,
    Abs,
    Reciprocal,
    Pi,
    E,
}

impl ScientificFn {
    pub fn name(&self) -> &'static str {
        match self {
            ScientificFn::Sin => "sin",
            ScientificFn::Cos => "cos",
            ScientificFn::Tan => "tan",
            ScientificFn::Sqrt => "sqrt",
            ScientificFn::Square => "square",
            ScientificFn::Log => "log",
            ScientificFn::Ln => "ln",
            ScientificFn::Exp => "exp",
            ScientificFn::Abs => "abs",
            ScientificFn::Reciprocal => "1/x",
            ScientificFn::Pi => "pi",
            ScientificFn::E => "e",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let func = match name.to_lowercase().as_str() {
            "sin" => ScientificFn::Sin,
            "cos" => ScientificFn::Cos,
            "tan" => ScientificFn::Tan,
            "sqrt" | "√" => ScientificFn::Sqrt,
            "square" | "sq" | "x²" => ScientificFn::Square,
            "log" => ScientificFn::Log,
            "ln" => ScientificFn::Ln,
            "exp" => ScientificFn::Exp,
            "abs" => ScientificFn::Abs,
            "1/x" | "inv" => ScientificFn::Reciprocal,
            "pi" | "π" => ScientificFn::Pi,
            "e" => ScientificFn::E,
            _ => return None,
        };
        Some(func)
    }

    pub fn apply(&self, x: f64) -> f64 {
        match self {
            ScientificFn::Sin => x.to_radians().sin(),
            ScientificFn::Cos => x.to_radians().cos(),
            ScientificFn::Tan => x.to_radians().tan(),
            ScientificFn::Sqrt => x.sqrt(),
            ScientificFn::Square => x * x,
            ScientificFn::Log => x.log10(),
            ScientificFn::Ln => x.ln(),
            ScientificFn::Exp => x.exp(),
            ScientificFn::Abs => x.abs(),
            ScientificFn::Reciprocal => 1.0 / x,
            ScientificFn::Pi => PI,
            ScientificFn::E => E,
        }
    }
}

/// A single button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `0`-`9` or `.`
    Digit(char),
    Operator(Operator),
    Equals,
    Clear,
    Delete,
    Function(ScientificFn),
}

impl Key {
    /// Parses a compact key sequence such as `"12+7="` or `"9[sqrt]"`.
    ///
    /// `C` clears, `<` deletes the last character and `[name]` presses a
    /// scientific key. Whitespace is ignored.
    pub fn parse_sequence(input: &str) -> Result<Vec<Key>, CalcError> {
        let mut keys = Vec::new();
        let mut chars = input.chars();

        while let Some(c) = chars.next() {
            let key = match c {
                c if c.is_whitespace() => continue,
                '0'..='9' | '.' => Key::Digit(c),
                '=' => Key::Equals,
                'c' | 'C' => Key::Clear,
                '<' => Key::Delete,
                '[' => {
                    let name: String = chars.by_ref().take_while(|&c| c != ']').collect();
                    let func = ScientificFn::from_name(name.trim())
                        .ok_or_else(|| CalcError::UnknownKey(name.clone()))?;
                    Key::Function(func)
                }
                c => match Operator::from_char(c) {
                    Some(op) => Key::Operator(op),
                    None => return Err(CalcError::UnknownKey(c.to_string())),
                },
            };
            keys.push(key);
        }

        Ok(keys)
    }
}

#[derive(Debug, Clone)]
pub struct Calculator {
    display: String,
    expression: String,
    state: KeypadState,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            display: "0".to_string(),
            expression: String::new(),
            state: KeypadState::Idle,
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Operands and operators entered before the current display value.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn state(&self) -> KeypadState {
        self.state
    }

    pub fn press(&mut self, key: Key, history: &mut impl HistorySink) {
        match key {
            Key::Digit(d) => self.input_digit(d),
            Key::Operator(op) => self.input_operator(op),
            Key::Equals => {
                self.calculate(history);
            }
            Key::Clear => self.clear(),
            Key::Delete => self.delete_last(),
            Key::Function(func) => {
                self.apply_function(func, history);
            }
        }
    }

    /// Appends a digit or decimal point. A fresh display (`0`, or a result
    /// just shown) is replaced rather than extended.
    pub fn input_digit(&mut self, digit: char) {
        if self.state == KeypadState::Error || !(digit.is_ascii_digit() || digit == '.') {
            return;
        }

        let fresh = self.display == "0" || self.state == KeypadState::Evaluated;
        if fresh {
            self.display = if digit == '.' { "0.".to_string() } else { digit.to_string() };
        } else {
            self.display.push(digit);
        }
        self.state = KeypadState::Accumulating;
    }

    pub fn input_operator(&mut self, op: Operator) {
        if self.state == KeypadState::Error {
            return;
        }
        self.expression.push_str(&format!("{} {} ", self.display, op.symbol()));
        self.display = "0".to_string();
        self.state = KeypadState::PendingOperator;
    }

    pub fn delete_last(&mut self) {
        if self.state == KeypadState::Error {
            return;
        }
        if self.display.chars().count() > 1 {
            self.display.pop();
        } else {
            self.display = "0".to_string();
        }
        self.state = KeypadState::Accumulating;
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Evaluates the pending expression with the current display value.
    ///
    /// On success the result is shown, the expression is cleared and the
    /// calculation is handed to `history`. Returns `None` when the keypad
    /// ends up in the error state.
    pub fn calculate(&mut self, history: &mut impl HistorySink) -> Option<f64> {
        if self.state == KeypadState::Error {
            return None;
        }

        let full = format!("{}{}", self.expression, self.display);
        match evaluate_expression(&full) {
            Ok(value) if value.is_finite() => {
                self.display = format_number(value);
                self.expression.clear();
                self.state = KeypadState::Evaluated;
                history.record(&full, &self.display);
                Some(value)
            }
            Ok(value) => {
                debug!(expression = %full, value, "Non-finite keypad result");
                self.fail();
                None
            }
            Err(e) => {
                debug!(expression = %full, error = %e, "Keypad expression rejected");
                self.fail();
                None
            }
        }
    }

    /// Applies a scientific key to the current display value. The pending
    /// expression is kept, so `2 + 9 [sqrt] =` gives `5`.
    pub fn apply_function(&mut self, func: ScientificFn, history: &mut impl HistorySink) -> Option<f64> {
        if self.state == KeypadState::Error {
            return None;
        }

        let Ok(input) = self.display.parse::<f64>() else {
            self.fail();
            return None;
        };
        let value = func.apply(input);
        if !value.is_finite() {
            debug!(function = func.name(), input, "Non-finite scientific result");
            self.fail();
            return None;
        }

        self.display = Self::format_result(value);
        history.record(&format!("{}({})", func.name(), format_number(input)), &self.display);
        self.state = if self.expression.is_empty() {
            KeypadState::Evaluated
        } else {
            KeypadState::Accumulating
        };
        Some(value)
    }

    fn fail(&mut self) {
        self.display = ERROR_DISPLAY.to_string();
        self.expression.clear();
        self.state = KeypadState::Error;
    }

    /// Eight decimals with trailing zeros trimmed. Values that round to zero
    /// print as `0` whatever their sign.
    pub fn format_result(result: f64) -> String {
        let trimmed = format!("{:.8}", result)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
        if trimmed == "-0" {
            "0".to_string()
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::NoHistory;

    fn run(sequence: &str) -> (Calculator, Vec<(String, String)>) {
        let mut calc = Calculator::new();
        let mut log = Vec::new();
        let mut sink = |e: &str, r: &str| log.push((e.to_string(), r.to_string()));
        for key in Key::parse_sequence(sequence).unwrap() {
            calc.press(key, &mut sink);
        }
        (calc, log)
    }

    #[test]
    fn test_simple_calculation() {
        let (calc, log) = run("12+7=");
        assert_eq!(calc.display(), "19");
        assert_eq!(calc.state(), KeypadState::Evaluated);
        assert_eq!(calc.expression(), "");
        assert_eq!(log, [("12 + 7".to_string(), "19".to_string())]);
    }

    #[test]
    fn test_operators_accumulate_with_precedence() {
        let (calc, log) = run("2+3×4=");
        assert_eq!(calc.display(), "14");
        assert_eq!(log[0].0, "2 + 3 × 4");

        let (calc, _) = run("10÷4=");
        assert_eq!(calc.display(), "2.5");
    }

    #[test]
    fn test_state_transitions() {
        let mut calc = Calculator::new();
        assert_eq!(calc.state(), KeypadState::Idle);
        assert_eq!(calc.display(), "0");

        calc.input_digit('5');
        assert_eq!(calc.state(), KeypadState::Accumulating);
        calc.input_operator(Operator::Multiply);
        assert_eq!(calc.state(), KeypadState::PendingOperator);
        assert_eq!(calc.expression(), "5 × ");
        assert_eq!(calc.display(), "0");
        calc.input_digit('3');
        assert_eq!(calc.calculate(&mut NoHistory), Some(15.0));
        assert_eq!(calc.state(), KeypadState::Evaluated);

        // A digit after a result starts a new number.
        calc.input_digit('4');
        assert_eq!(calc.display(), "4");
        calc.clear();
        assert_eq!(calc.state(), KeypadState::Idle);
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let (mut calc, log) = run("8/0=");
        assert_eq!(calc.display(), ERROR_DISPLAY);
        assert_eq!(calc.state(), KeypadState::Error);
        assert!(log.is_empty());

        // Only clear leaves the error state.
        calc.input_digit('1');
        calc.input_operator(Operator::Add);
        assert_eq!(calc.display(), ERROR_DISPLAY);
        assert_eq!(calc.calculate(&mut NoHistory), None);
        calc.clear();
        assert_eq!(calc.display(), "0");
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let (calc, _) = run("1.2.3=");
        assert_eq!(calc.display(), ERROR_DISPLAY);
        assert_eq!(calc.expression(), "");
    }

    #[test]
    fn test_delete_last() {
        let (calc, _) = run("123<");
        assert_eq!(calc.display(), "12");
        let (calc, _) = run("7<");
        assert_eq!(calc.display(), "0");
        let (calc, _) = run(".5");
        assert_eq!(calc.display(), "0.5");
    }

    #[test]
    fn test_scientific_keys() {
        let (calc, log) = run("30[sin]");
        assert_eq!(calc.display(), "0.5");
        assert_eq!(log, [("sin(30)".to_string(), "0.5".to_string())]);

        let (calc, _) = run("2+9[sqrt]=");
        assert_eq!(calc.display(), "5");

        let (calc, _) = run("[pi]");
        assert_eq!(calc.display(), "3.14159265");

        let (calc, _) = run("0[1/x]");
        assert_eq!(calc.state(), KeypadState::Error);
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(
            Key::parse_sequence("1 + [ln] C").unwrap(),
            [
                Key::Digit('1'),
                Key::Operator(Operator::Add),
                Key::Function(ScientificFn::Ln),
                Key::Clear
            ]
        );
        assert_eq!(Key::parse_sequence("2 ^ 3"), Err(CalcError::UnknownKey("^".to_string())));
        assert_eq!(Key::parse_sequence("[cosh]"), Err(CalcError::UnknownKey("cosh".to_string())));
    }

    #[test]
    fn test_format_result() {
        assert_eq!(Calculator::format_result(2.0), "2");
        assert_eq!(Calculator::format_result(0.0), "0");
        assert_eq!(Calculator::format_result(100.5), "100.5");
        assert_eq!(Calculator::format_result(1.0 / 3.0), "0.33333333");
        assert_eq!(Calculator::format_result(-1.2e-16), "0");
        assert_eq!(Calculator::format_result(-0.0), "0");
        assert_eq!(Calculator::format_result(-0.25), "-0.25");
    }

    #[test]
    fn test_tiny_negative_function_result_shows_zero() {
        let (calc, log) = run("0-180=[sin]");
        assert_eq!(calc.display(), "0");
        assert_eq!(log.last(), Some(&("sin(-180)".to_string(), "0".to_string())));
    }
}
