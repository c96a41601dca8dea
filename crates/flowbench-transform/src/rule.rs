//! Rule conditions for Sheets Automation.
//!
//! A condition is `<column> <operator> <value...>`. Evaluation is total:
//! malformed conditions, unknown operators, missing columns and Null cells
//! all evaluate to `false` instead of raising.

use std::fmt;
use std::str::FromStr;

use flowbench_model::{Row, Value};

/// Closed set of comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    StartsWith,
    EndsWith,
}

impl Operator {
    pub const ALL: [Operator; 9] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterOrEqual,
        Operator::LessOrEqual,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
    ];

    /// Canonical token for the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "==",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
        }
    }

    /// Returns true for operators that compare both sides as numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::LessThan
                | Operator::GreaterOrEqual
                | Operator::LessOrEqual
        )
    }

    fn apply(self, cell: &Value, expected: &str) -> bool {
        if self.is_numeric() {
            let left = cell.as_number();
            let right = Value::text(expected).as_number();
            // NaN on either side makes every comparison false.
            return match self {
                Operator::GreaterThan => left > right,
                Operator::LessThan => left < right,
                Operator::GreaterOrEqual => left >= right,
                Operator::LessOrEqual => left <= right,
                _ => false,
            };
        }

        let left = cell.as_text().to_lowercase();
        let right = expected.to_lowercase();
        match self {
            Operator::Equals => left == right,
            Operator::NotEquals => left != right,
            Operator::Contains => left.contains(&right),
            Operator::StartsWith => left.starts_with(&right),
            Operator::EndsWith => left.ends_with(&right),
            _ => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    /// Tokens match exactly; `EQUALS` is not `equals`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" | "equals" => Ok(Operator::Equals),
            "!=" | "not_equals" => Ok(Operator::NotEquals),
            ">" => Ok(Operator::GreaterThan),
            "<" => Ok(Operator::LessThan),
            ">=" => Ok(Operator::GreaterOrEqual),
            "<=" => Ok(Operator::LessOrEqual),
            "contains" => Ok(Operator::Contains),
            "starts_with" => Ok(Operator::StartsWith),
            "ends_with" => Ok(Operator::EndsWith),
            _ => Err(format!("Unknown operator: {s}")),
        }
    }
}

/// A successfully tokenized condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: String,
}

impl Condition {
    /// Tokenizes a condition string; `None` when it cannot be evaluated.
    pub fn parse(condition: &str) -> Option<Self> {
        let mut tokens = condition.split_whitespace();
        let column = tokens.next()?;
        let operator = tokens.next()?.parse::<Operator>().ok()?;
        let rest: Vec<&str> = tokens.collect();
        if rest.is_empty() {
            return None;
        }
        let value = strip_quotes(&rest.join(" ")).to_string();
        Some(Self {
            column: column.to_string(),
            operator,
            value,
        })
    }

    pub fn matches(&self, row: &Row) -> bool {
        match row.get(&self.column) {
            None | Some(Value::Null) => false,
            Some(cell) => self.operator.apply(cell, &self.value),
        }
    }
}

/// Evaluates `condition` against `row`. Never fails.
pub fn evaluate_rule(row: &Row, condition: &str) -> bool {
    Condition::parse(condition).is_some_and(|parsed| parsed.matches(row))
}

/// Removes one pair of matching surrounding quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        Row::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn numeric_comparison() {
        assert!(evaluate_rule(&row(&[("amount", "150")]), "amount > 100"));
        assert!(!evaluate_rule(&row(&[("amount", "abc")]), "amount > 100"));
        assert!(evaluate_rule(&row(&[("amount", "100")]), "amount >= 100"));
        assert!(evaluate_rule(&row(&[("amount", " 99.5 ")]), "amount < 100"));
        assert!(!evaluate_rule(&row(&[("amount", "100")]), "amount <= abc"));
    }

    #[test]
    fn string_operators_ignore_case() {
        let data = row(&[("status", "Pending Review")]);
        assert!(evaluate_rule(&data, "status contains review"));
        assert!(evaluate_rule(&data, "status starts_with PENDING"));
        assert!(evaluate_rule(&data, "status ends_with Review"));
        assert!(evaluate_rule(&data, "status == \"pending review\""));
        assert!(evaluate_rule(&data, "status equals 'Pending Review'"));
        assert!(evaluate_rule(&data, "status not_equals done"));
        assert!(evaluate_rule(&data, "status != done"));
    }

    #[test]
    fn operator_tokens_are_case_sensitive() {
        let data = row(&[("status", "Pending Review")]);
        assert!(!evaluate_rule(&data, "status EQUALS 'Pending Review'"));
        assert!(!evaluate_rule(&data, "status Contains review"));
        assert!("Starts_With".parse::<Operator>().is_err());
    }

    #[test]
    fn non_finite_numbers_never_compare() {
        for cell in ["inf", "-inf", "NaN", "infinity"] {
            let data = row(&[("amount", cell)]);
            assert!(!evaluate_rule(&data, "amount > 100"), "{cell}");
            assert!(!evaluate_rule(&data, "amount < 100"), "{cell}");
        }
        assert!(!evaluate_rule(&row(&[("amount", "5")]), "amount < inf"));
    }

    #[test]
    fn number_cells_compare_as_rendered() {
        let data = Row::from_pairs([("qty", Value::Number(3.0))]);
        assert!(evaluate_rule(&data, "qty == 3"));
        assert!(evaluate_rule(&data, "qty > 2"));
    }

    #[test]
    fn malformed_conditions_are_false() {
        let data = row(&[("a", "1")]);
        for condition in ["", "a", "a ==", "a ~= 1", "  ", "missing == 1"] {
            assert!(!evaluate_rule(&data, condition), "{condition:?}");
        }
    }

    #[test]
    fn null_cell_is_false_even_for_not_equals() {
        let data = Row::from_pairs([("a", Value::Null)]);
        assert!(!evaluate_rule(&data, "a != x"));
    }

    #[test]
    fn quotes_are_stripped_once() {
        let parsed = Condition::parse("name == \"'x'\"").unwrap();
        assert_eq!(parsed.value, "'x'");
        let unmatched = Condition::parse("name == \"x'").unwrap();
        assert_eq!(unmatched.value, "\"x'");
        let lone = Condition::parse("name == \"").unwrap();
        assert_eq!(lone.value, "\"");
    }

    #[test]
    fn operator_tokens_round_trip() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>(), Ok(op));
        }
    }
}
