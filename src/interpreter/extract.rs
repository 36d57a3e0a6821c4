//! Operand extraction and evaluation, one handler per intent.
//!
//! Handlers receive the normalized query (the fallback receives the original
//! text). They never fail loudly: an unmatched pattern becomes a structured
//! failure response.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::intent::{ArithmeticOp, LogFn, TrigFn};
use super::{Answer, Response, GUIDANCE};
use crate::expr::{evaluate_in, Dialect};
use crate::format::{fixed, format_number as n};

/// A run of ASCII digits with an optional fractional part, e.g. `45`, `4.5`, `4.`.
const NUMBER: &str = r"([0-9]+\.?[0-9]*)";

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("extractor pattern is valid")
}

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| compile(NUMBER));
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"{NUMBER}\s*%?\s*of\s*{NUMBER}")));
static FAHRENHEIT_RE: LazyLock<Regex> = LazyLock::new(|| compile(&format!(r"(?i){NUMBER}\s*°?f")));
static CELSIUS_RE: LazyLock<Regex> = LazyLock::new(|| compile(&format!(r"(?i){NUMBER}\s*°?c")));
static POWER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"{NUMBER}\s*(?:to the power of|\^|power)\s*{NUMBER}")));
static SIN_RE: LazyLock<Regex> = LazyLock::new(|| function_pattern("sin"));
static COS_RE: LazyLock<Regex> = LazyLock::new(|| function_pattern("cos"));
static TAN_RE: LazyLock<Regex> = LazyLock::new(|| function_pattern("tan"));
static LN_RE: LazyLock<Regex> = LazyLock::new(|| function_pattern("ln"));
static LOG_RE: LazyLock<Regex> = LazyLock::new(|| function_pattern("log"));

/// `name 30`, `name(30)` or `name (30)`.
fn function_pattern(name: &str) -> Regex {
    compile(&format!(r"{name}\s*\(?{NUMBER}\)?"))
}

fn trig_regex(func: TrigFn) -> &'static Regex {
    match func {
        TrigFn::Sin => &SIN_RE,
        TrigFn::Cos => &COS_RE,
        TrigFn::Tan => &TAN_RE,
    }
}

fn log_regex(func: LogFn) -> &'static Regex {
    match func {
        LogFn::Natural => &LN_RE,
        LogFn::Common => &LOG_RE,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim_end_matches('.').parse().ok()
}

fn capture(re: &Regex, query: &str, group: usize) -> Option<f64> {
    re.captures(query)
        .and_then(|caps| caps.get(group))
        .and_then(|m| parse_number(m.as_str()))
}

fn capture_pair(re: &Regex, query: &str) -> Option<(f64, f64)> {
    let caps = re.captures(query)?;
    let first = parse_number(caps.get(1)?.as_str())?;
    let second = parse_number(caps.get(2)?.as_str())?;
    Some((first, second))
}

pub(crate) fn percentage(query: &str) -> Response {
    let Some((percent, number)) = capture_pair(&PERCENT_RE, query) else {
        return Response::failure("Couldn't parse percentage query");
    };

    let ratio = percent / 100.0;
    let result = ratio * number;
    Response::solved(
        Answer::Number(result),
        format!(
            "To find {}% of {}, multiply {} by {}",
            n(percent),
            n(number),
            n(number),
            n(ratio)
        ),
        format!("{} × {} = {}", n(number), n(ratio), n(result)),
    )
}

/// The source unit comes from the suffix on the captured number, the target
/// from the other unit keyword. A Fahrenheit reading is tried first.
pub(crate) fn temperature(query: &str) -> Response {
    if let Some(fahrenheit) = capture(&FAHRENHEIT_RE, query, 1).filter(|_| query.contains("celsius")) {
        let celsius = (fahrenheit - 32.0) * 5.0 / 9.0;
        let shown = fixed(celsius, 2);
        return Response::solved(
            Answer::Text(format!("{shown}°C")),
            "To convert Fahrenheit to Celsius: (F - 32) × 5/9".to_string(),
            format!("({} - 32) × 5/9 = {shown}°C", n(fahrenheit)),
        );
    }

    if let Some(celsius) = capture(&CELSIUS_RE, query, 1).filter(|_| query.contains("fahrenheit")) {
        let fahrenheit = (celsius * 9.0 / 5.0) + 32.0;
        let shown = fixed(fahrenheit, 2);
        return Response::solved(
            Answer::Text(format!("{shown}°F")),
            "To convert Celsius to Fahrenheit: (C × 9/5) + 32".to_string(),
            format!("({} × 9/5) + 32 = {shown}°F", n(celsius)),
        );
    }

    Response::failure("Couldn't parse temperature conversion")
}

pub(crate) fn square_root(query: &str) -> Response {
    let Some(number) = capture(&NUMBER_RE, query, 1) else {
        return Response::failure("Couldn't parse square root query");
    };

    let result = number.sqrt();
    Response::solved(
        Answer::Number(result),
        format!(
            "The square root of {} is the number that, when multiplied by itself, equals {}",
            n(number),
            n(number)
        ),
        format!("√{} = {}", n(number), n(result)),
    )
}

pub(crate) fn power(query: &str) -> Response {
    let Some((base, exponent)) = capture_pair(&POWER_RE, query) else {
        return Response::failure("Couldn't parse power query");
    };

    let result = base.powf(exponent);
    Response::solved(
        Answer::Number(result),
        format!("{} raised to the power of {}", n(base), n(exponent)),
        format!("{}^{} = {}", n(base), n(exponent), n(result)),
    )
}

/// Uses the first two numbers in the query, wherever they appear.
pub(crate) fn word_arithmetic(query: &str, op: ArithmeticOp) -> Response {
    let mut numbers = NUMBER_RE
        .find_iter(query)
        .filter_map(|m| parse_number(m.as_str()));

    let (Some(a), Some(b)) = (numbers.next(), numbers.next()) else {
        return Response::failure("Couldn't parse arithmetic query");
    };

    let result = op.apply(a, b);
    Response::solved(
        Answer::Number(result),
        format!("Basic {} operation", op.name()),
        format!("{} {} {} = {}", n(a), op.symbol(), n(b), n(result)),
    )
}

/// Tries `first` and every function after it in tie-break order.
pub(crate) fn trigonometry(query: &str, first: TrigFn) -> Response {
    let found = TrigFn::ALL
        .into_iter()
        .skip_while(|f| *f != first)
        .find_map(|f| capture(trig_regex(f), query, 1).map(|angle| (f, angle)));

    let Some((func, angle)) = found else {
        return Response::failure("Couldn't parse trigonometry query");
    };
    if func != first {
        debug!(classified = first.name(), used = func.name(), "Trig argument found on a later function");
    }

    let radians = angle.to_radians();
    let shown = fixed(func.apply(radians), 6);
    Response::solved(
        Answer::Text(shown.clone()),
        format!(
            "{} of {}° (converted to radians: {})",
            func.label(),
            n(angle),
            fixed(radians, 4)
        ),
        format!("{}({}°) = {shown}", func.name(), n(angle)),
    )
}

pub(crate) fn logarithm(query: &str, first: LogFn) -> Response {
    let found = LogFn::ALL
        .into_iter()
        .skip_while(|f| *f != first)
        .find_map(|f| capture(log_regex(f), query, 1).map(|x| (f, x)));

    let Some((func, number)) = found else {
        return Response::failure("Couldn't parse logarithm query");
    };

    let shown = fixed(func.apply(number), 6);
    Response::solved(
        Answer::Text(shown.clone()),
        format!("{} of {}", func.describe(), n(number)),
        format!("{}({}) = {shown}", func.name(), n(number)),
    )
}

/// Evaluates the original query text as an arithmetic expression.
pub(crate) fn raw_expression(query: &str) -> Response {
    match evaluate_in(query, Dialect::Query) {
        Ok(value) if !value.is_nan() => Response::solved(
            Answer::Number(value),
            format!("Evaluated the expression: {query}"),
            query.to_string(),
        ),
        Ok(_) => {
            debug!("Expression evaluated to NaN");
            Response::failure(GUIDANCE)
        }
        Err(err) => {
            debug!(error = %err, "Expression rejected");
            Response::failure(GUIDANCE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_pattern() {
        assert_eq!(capture(&NUMBER_RE, "take 4. apples", 1), Some(4.0));
        assert_eq!(capture(&NUMBER_RE, "about 12.5 units", 1), Some(12.5));
        assert_eq!(capture(&NUMBER_RE, "no digits here", 1), None);
        assert_eq!(capture(&NUMBER_RE, "minus -7", 1), Some(7.0));
    }

    #[test]
    fn test_percentage_variants() {
        let resp = percentage("12.5 % of 80");
        assert_eq!(resp.result, Answer::Number(10.0));
        assert_eq!(resp.formula.as_deref(), Some("80 × 0.125 = 10"));
        assert_eq!(
            resp.explanation.as_deref(),
            Some("To find 12.5% of 80, multiply 80 by 0.125")
        );

        // The regex needs a number right before "of".
        assert!(!percentage("20 percent of 50").success);
    }

    #[test]
    fn test_temperature_direction_follows_keywords() {
        let resp = temperature("convert 100 fahrenheit to celsius");
        assert_eq!(resp.result, Answer::Text("37.78°C".to_string()));

        let resp = temperature("convert 100°c to fahrenheit");
        assert_eq!(resp.result, Answer::Text("212.00°F".to_string()));
        assert_eq!(resp.formula.as_deref(), Some("(100 × 9/5) + 32 = 212.00°F"));

        // Celsius reading but no Fahrenheit target.
        assert!(!temperature("convert 100°c to celsius").success);
    }

    #[test]
    fn test_power_markers() {
        assert_eq!(power("2 to the power of 10").result, Answer::Number(1024.0));
        assert_eq!(power("3^4").result, Answer::Number(81.0));
        assert_eq!(power("2 power 5").result, Answer::Number(32.0));
        assert_eq!(power("2 to the 8th").result, Answer::Text("Couldn't parse power query".into()));
    }

    #[test]
    fn test_word_arithmetic_uses_first_two_numbers() {
        let resp = word_arithmetic("add 1 and 2 and 3", ArithmeticOp::Add);
        assert_eq!(resp.result, Answer::Number(3.0));
        assert_eq!(resp.formula.as_deref(), Some("1 + 2 = 3"));

        let resp = word_arithmetic("7 times 6", ArithmeticOp::Multiply);
        assert_eq!(resp.formula.as_deref(), Some("7 × 6 = 42"));

        assert!(!word_arithmetic("add 5", ArithmeticOp::Add).success);
    }

    #[test]
    fn test_trig_falls_through_in_order() {
        // Classified as sin, but only cos has an argument.
        let resp = trigonometry("sin or cos 60", TrigFn::Sin);
        assert_eq!(resp.result, Answer::Text("0.500000".to_string()));
        assert_eq!(resp.formula.as_deref(), Some("cos(60°) = 0.500000"));

        let resp = trigonometry("tan(45)", TrigFn::Tan);
        assert_eq!(resp.result, Answer::Text("1.000000".to_string()));
        assert_eq!(
            resp.explanation.as_deref(),
            Some("Tangent of 45° (converted to radians: 0.7854)")
        );
    }

    #[test]
    fn test_logarithm_edge_values() {
        assert_eq!(logarithm("log 0", LogFn::Common).result, Answer::Text("-Infinity".into()));
        assert_eq!(logarithm("ln(1)", LogFn::Natural).result, Answer::Text("0.000000".into()));
        assert!(!logarithm("natural log of 10", LogFn::Common).success);
    }

    #[test]
    fn test_raw_expression() {
        let resp = raw_expression("3 × (4 + 2)");
        assert_eq!(resp.result, Answer::Number(18.0));
        assert_eq!(resp.formula.as_deref(), Some("3 × (4 + 2)"));

        assert_eq!(raw_expression("1/0").result, Answer::Number(f64::INFINITY));
        assert!(!raw_expression("0/0").success);
        assert!(!raw_expression("hello").success);
    }
}
