//! Intent classification for natural-language queries.
//!
//! Classification is an ordered rule table. Each rule looks for marker
//! substrings in the normalized query and the first rule that fires decides
//! the intent. Queries matching several rules always resolve to the earliest
//! one; nothing is scored.

use std::fmt;

use serde::Serialize;

/// Arithmetic operation named by words such as "plus" or "divided by".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Subtract => "subtract",
            ArithmeticOp::Multiply => "multiply",
            ArithmeticOp::Divide => "divide",
        }
    }

    /// Display symbol used in formula strings.
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "×",
            ArithmeticOp::Divide => "÷",
        }
    }

    /// Division by zero yields an infinite or `NaN` value, never a panic.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Subtract => a - b,
            ArithmeticOp::Multiply => a * b,
            ArithmeticOp::Divide => a / b,
        }
    }
}

/// Trigonometric function, argument in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

impl TrigFn {
    /// Tie-break order when a query names more than one function.
    pub const ALL: [TrigFn; 3] = [TrigFn::Sin, TrigFn::Cos, TrigFn::Tan];

    pub fn name(&self) -> &'static str {
        match self {
            TrigFn::Sin => "sin",
            TrigFn::Cos => "cos",
            TrigFn::Tan => "tan",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrigFn::Sin => "Sin",
            TrigFn::Cos => "Cosine",
            TrigFn::Tan => "Tangent",
        }
    }

    pub fn apply(&self, radians: f64) -> f64 {
        match self {
            TrigFn::Sin => radians.sin(),
            TrigFn::Cos => radians.cos(),
            TrigFn::Tan => radians.tan(),
        }
    }
}

/// Logarithm flavour. `ln` is checked before `log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFn {
    Natural,
    Common,
}

impl LogFn {
    pub const ALL: [LogFn; 2] = [LogFn::Natural, LogFn::Common];

    pub fn name(&self) -> &'static str {
        match self {
            LogFn::Natural => "ln",
            LogFn::Common => "log",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            LogFn::Natural => "Natural logarithm (base e)",
            LogFn::Common => "Logarithm (base 10)",
        }
    }

    /// Non-positive input gives `NaN` or `-inf`.
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            LogFn::Natural => x.ln(),
            LogFn::Common => x.log10(),
        }
    }
}

/// The category a query falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "intent", content = "function")]
pub enum Intent {
    Percentage,
    TemperatureConversion,
    SquareRoot,
    Power,
    WordArithmetic(ArithmeticOp),
    Trigonometry(TrigFn),
    Logarithm(LogFn),
    RawExpression,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Percentage => "percentage",
            Intent::TemperatureConversion => "temperature",
            Intent::SquareRoot => "square_root",
            Intent::Power => "power",
            Intent::WordArithmetic(_) => "arithmetic",
            Intent::Trigonometry(_) => "trigonometry",
            Intent::Logarithm(_) => "logarithm",
            Intent::RawExpression => "expression",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::WordArithmetic(op) => write!(f, "{}({})", self.label(), op.name()),
            Intent::Trigonometry(func) => write!(f, "{}({})", self.label(), func.name()),
            Intent::Logarithm(func) => write!(f, "{}({})", self.label(), func.name()),
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// One entry of the classification table.
pub struct Rule {
    pub name: &'static str,
    detect: fn(&str) -> Option<Intent>,
}

impl Rule {
    /// Runs the rule against an already normalized query.
    pub fn detect(&self, normalized: &str) -> Option<Intent> {
        (self.detect)(normalized)
    }
}

/// Classification rules in priority order. The raw-expression fallback is
/// implied when none of them fire.
pub const RULES: &[Rule] = &[
    Rule { name: "percentage", detect: detect_percentage },
    Rule { name: "temperature", detect: detect_temperature },
    Rule { name: "square_root", detect: detect_square_root },
    Rule { name: "power", detect: detect_power },
    Rule { name: "add", detect: detect_add },
    Rule { name: "subtract", detect: detect_subtract },
    Rule { name: "multiply", detect: detect_multiply },
    Rule { name: "divide", detect: detect_divide },
    Rule { name: "trigonometry", detect: detect_trigonometry },
    Rule { name: "logarithm", detect: detect_logarithm },
];

/// Lowercases and trims a query for matching.
pub fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Classifies a raw query.
pub fn classify(query: &str) -> Intent {
    classify_normalized(&normalize(query))
}

/// Classifies a query that has already gone through [`normalize`].
pub fn classify_normalized(normalized: &str) -> Intent {
    RULES
        .iter()
        .find_map(|rule| rule.detect(normalized))
        .unwrap_or(Intent::RawExpression)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn detect_percentage(q: &str) -> Option<Intent> {
    contains_any(q, &["% of", "percent of"]).then_some(Intent::Percentage)
}

fn detect_temperature(q: &str) -> Option<Intent> {
    (q.contains("convert") && contains_any(q, &["celsius", "fahrenheit"]))
        .then_some(Intent::TemperatureConversion)
}

fn detect_square_root(q: &str) -> Option<Intent> {
    contains_any(q, &["square root", "sqrt"]).then_some(Intent::SquareRoot)
}

fn detect_power(q: &str) -> Option<Intent> {
    contains_any(q, &["power", "^", "to the"]).then_some(Intent::Power)
}

fn detect_add(q: &str) -> Option<Intent> {
    contains_any(q, &["plus", "add"]).then_some(Intent::WordArithmetic(ArithmeticOp::Add))
}

fn detect_subtract(q: &str) -> Option<Intent> {
    contains_any(q, &["minus", "subtract"])
        .then_some(Intent::WordArithmetic(ArithmeticOp::Subtract))
}

fn detect_multiply(q: &str) -> Option<Intent> {
    contains_any(q, &["times", "multiply", "multiplied by"])
        .then_some(Intent::WordArithmetic(ArithmeticOp::Multiply))
}

fn detect_divide(q: &str) -> Option<Intent> {
    contains_any(q, &["divided by", "divide"])
        .then_some(Intent::WordArithmetic(ArithmeticOp::Divide))
}

fn detect_trigonometry(q: &str) -> Option<Intent> {
    TrigFn::ALL
        .into_iter()
        .find(|f| q.contains(f.name()))
        .map(Intent::Trigonometry)
}

fn detect_logarithm(q: &str) -> Option<Intent> {
    LogFn::ALL
        .into_iter()
        .find(|f| q.contains(f.name()))
        .map(Intent::Logarithm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static Rule {
        RULES.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn test_rules_in_isolation() {
        assert_eq!(rule("percentage").detect("what's 20% of 500?"), Some(Intent::Percentage));
        assert_eq!(rule("percentage").detect("20 percent of 50"), Some(Intent::Percentage));
        assert_eq!(rule("percentage").detect("20 percent"), None);

        assert_eq!(
            rule("temperature").detect("convert 45°f to celsius"),
            Some(Intent::TemperatureConversion)
        );
        assert_eq!(rule("temperature").detect("45°f in celsius"), None);

        assert_eq!(rule("square_root").detect("sqrt 16"), Some(Intent::SquareRoot));
        assert_eq!(rule("power").detect("2 to the 8th"), Some(Intent::Power));
        assert_eq!(rule("power").detect("2^8"), Some(Intent::Power));

        assert_eq!(
            rule("divide").detect("10 divided by 4"),
            Some(Intent::WordArithmetic(ArithmeticOp::Divide))
        );
        assert_eq!(rule("divide").detect("10 plus 4"), None);

        assert_eq!(
            rule("trigonometry").detect("tan 45"),
            Some(Intent::Trigonometry(TrigFn::Tan))
        );
        assert_eq!(
            rule("logarithm").detect("log 100"),
            Some(Intent::Logarithm(LogFn::Common))
        );
    }

    #[test]
    fn test_rule_table_order() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "percentage",
                "temperature",
                "square_root",
                "power",
                "add",
                "subtract",
                "multiply",
                "divide",
                "trigonometry",
                "logarithm"
            ]
        );
    }

    #[test]
    fn test_percentage_beats_temperature() {
        assert_eq!(
            classify("Convert 50% of 80 fahrenheit to celsius"),
            Intent::Percentage
        );
    }

    #[test]
    fn test_earlier_rules_win() {
        // "add" outranks "times" and "divide".
        assert_eq!(
            classify("add 2 and 3 times"),
            Intent::WordArithmetic(ArithmeticOp::Add)
        );
        assert_eq!(classify("square root of 2 to the power"), Intent::SquareRoot);
        assert_eq!(
            classify("multiply 3 by sin 4"),
            Intent::WordArithmetic(ArithmeticOp::Multiply)
        );
        assert_eq!(classify("log of sin 30"), Intent::Trigonometry(TrigFn::Sin));
    }

    #[test]
    fn test_function_tie_breaks() {
        assert_eq!(classify("cos 30 or sin 60"), Intent::Trigonometry(TrigFn::Sin));
        assert_eq!(classify("tan 10 cos 20"), Intent::Trigonometry(TrigFn::Cos));
        assert_eq!(classify("LN 5"), Intent::Logarithm(LogFn::Natural));
    }

    #[test]
    fn test_normalization_and_fallback() {
        assert_eq!(normalize("  Square ROOT of 9  "), "square root of 9");
        assert_eq!(classify("  SQRT 9 "), Intent::SquareRoot);
        assert_eq!(classify("12 * (3 + 4)"), Intent::RawExpression);
        assert_eq!(classify(""), Intent::RawExpression);
    }

    #[test]
    fn test_display() {
        assert_eq!(Intent::Trigonometry(TrigFn::Cos).to_string(), "trigonometry(cos)");
        assert_eq!(Intent::Percentage.to_string(), "percentage");
    }

    #[test]
    fn test_tagged_json_shape() {
        use serde_json::json;

        assert_eq!(
            serde_json::to_value(classify("10 divided by 4")).unwrap(),
            json!({"intent": "word_arithmetic", "function": "divide"})
        );
        assert_eq!(
            serde_json::to_value(Intent::Trigonometry(TrigFn::Cos)).unwrap(),
            json!({"intent": "trigonometry", "function": "cos"})
        );
        assert_eq!(
            serde_json::to_value(Intent::Logarithm(LogFn::Natural)).unwrap(),
            json!({"intent": "logarithm", "function": "natural"})
        );
        assert_eq!(
            serde_json::to_value(Intent::Percentage).unwrap(),
            json!({"intent": "percentage"})
        );
    }
}
