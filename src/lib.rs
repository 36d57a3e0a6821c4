//! Calculator engine: a keypad expression evaluator and an interpreter for
//! simple English math questions ("what's 20% of 500?", "convert 45°F to
//! celsius", "sin 30").

pub mod calculator;
pub mod config;
pub mod error;
pub mod expr;
pub mod format;
pub mod history;
pub mod interpreter;
pub mod suggest;
pub mod tricks;

pub use calculator::Calculator;
pub use error::CalcError;
pub use expr::evaluate_expression;
pub use interpreter::{explain_last_calculation, interpret_query, Answer, Intent, Response};
pub use tricks::{random_math_trick, random_math_trick_with, MathTrick};
