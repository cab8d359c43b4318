//! Rule evaluators: the extension trait and the built-in set.

mod builtin;

pub use builtin::BuiltinRule;

use crate::Data;
use serde_json::Value;

/// Capability interface for a named rule evaluator.
///
/// Implementations registered on a [`RuleRegistry`](crate::RuleRegistry)
/// are dispatched by name before built-in rules, so a registered name may
/// shadow a built-in of the same text.
///
/// ## Example
///
/// ```
/// use formval::{Data, Rule};
/// use serde_json::Value;
///
/// struct UppercaseRule;
///
/// impl Rule for UppercaseRule {
///     fn passes(&self, _field: &str, value: &Value, _parameters: &[String], _data: &Data) -> bool {
///         value
///             .as_str()
///             .is_some_and(|s| !s.is_empty() && s.chars().all(char::is_uppercase))
///     }
///
///     fn message(&self) -> &str {
///         "The :attribute field must be uppercase."
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Whether `value` satisfies the rule. `data` is the full input
    /// mapping, for rules that inspect sibling fields.
    fn passes(&self, field: &str, value: &Value, parameters: &[String], data: &Data) -> bool;

    /// Default message template, with `:attribute` and `:paramN`
    /// placeholders. Used when no custom message is registered for the
    /// rule.
    fn message(&self) -> &str;
}

/// Letters-and-numbers rule, offered as a registerable extension.
///
/// Same grammar as the built-in `alpha_num` rule; useful for registering
/// the check under a domain-specific name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaNumericRule;

impl Rule for AlphaNumericRule {
    fn passes(&self, _field: &str, value: &Value, _parameters: &[String], _data: &Data) -> bool {
        value.as_str().is_some_and(builtin::is_alpha_numeric)
    }

    fn message(&self) -> &str {
        "The :attribute field must only contain letters and numbers."
    }
}
