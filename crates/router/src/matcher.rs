use pathmodel_schema::{Branch, BranchMap};
use serde_json::Value;

/// Select the branch an attribute value routes into.
///
/// Passes run in a fixed order regardless of declaration order:
///
/// 1. categorical: a string value equal to a label
/// 2. numeric: first predicate label (in branch order) satisfied by a number
/// 3. pattern: first `r/…/` label (in branch order) prefix-matching a string
///
/// A number never equals a label textually, so `0.8` does not select `"0.8"`.
#[must_use]
pub fn match_branch<'a>(value: &Value, branches: &'a BranchMap) -> Option<&'a Branch> {
    match value {
        Value::String(text) => branches
            .iter()
            .find(|b| b.label().as_str() == text)
            .or_else(|| {
                branches
                    .iter()
                    .find(|b| b.label().pattern().is_some_and(|re| re.is_match(text)))
            }),
        Value::Number(number) => {
            let number = number.as_f64()?;
            branches
                .iter()
                .find(|b| b.label().predicate().is_some_and(|p| p.matches(number)))
        }
        _ => None,
    }
}
