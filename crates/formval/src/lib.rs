//! # formval
//!
//! Rule-based validation for flat field → value mappings, with
//! human-readable per-field error messages.
//!
//! Rules are declared in a compact string grammar (`|` separates rules,
//! `:` introduces a comma-separated parameter list) and evaluated
//! against `serde_json` values:
//!
//! ```
//! use formval::{Ruleset, Validator};
//! use serde_json::json;
//!
//! let data = json!({"name": "John", "email": "john@example.com"})
//!     .as_object()
//!     .cloned()
//!     .unwrap();
//!
//! let rules = Ruleset::new()
//!     .field("name", "required|string")
//!     .field("email", "required|email");
//!
//! let mut validator = Validator::new(data, rules);
//! assert!(validator.passes().unwrap());
//! ```
//!
//! A failing sweep collects every violation, not just the first, into an
//! ordered [`MessageBag`]:
//!
//! ```
//! # use formval::{Ruleset, Validator};
//! # use serde_json::json;
//! let data = json!({"name": ""}).as_object().cloned().unwrap();
//! let rules = Ruleset::new().field("name", "required|min:3");
//!
//! let mut validator = Validator::new(data, rules);
//! assert!(validator.fails().unwrap());
//! assert_eq!(validator.errors().unwrap().get("name").len(), 2);
//! ```
//!
//! Custom rules implement [`Rule`] and are registered on a
//! [`RuleRegistry`] handed to the validator at construction. Extension
//! lookups take precedence over built-in dispatch, so a registered name
//! may shadow a built-in rule. Referencing a name with neither an
//! extension nor a built-in behind it is a configuration error that
//! aborts the whole validation call.
//!
//! The [`Form`] / [`FormRequest`] layer on top pairs a rule declaration
//! with raw request input and an optional [`Sanitizer`] pre-pass.

mod error;
mod message_bag;
mod registry;
mod request;
mod rule;
mod rules;
mod sanitize;
mod validator;

pub use error::ValidationError;
pub use message_bag::MessageBag;
pub use registry::RuleRegistry;
pub use request::{Form, FormRequest, Request};
pub use rule::{RuleToken, Ruleset};
pub use rules::{AlphaNumericRule, BuiltinRule, Rule};
pub use sanitize::{sanitize_all, Sanitizer, UnknownSanitizer};
pub use validator::{Translator, Validator};

/// Input mapping validated by the engine: field name to dynamic value.
pub type Data = serde_json::Map<String, serde_json::Value>;

/// Prelude module re-exporting the commonly used types.
pub mod prelude {
    pub use crate::error::ValidationError;
    pub use crate::message_bag::MessageBag;
    pub use crate::registry::RuleRegistry;
    pub use crate::request::{Form, FormRequest, Request};
    pub use crate::rule::{RuleToken, Ruleset};
    pub use crate::rules::{BuiltinRule, Rule};
    pub use crate::sanitize::Sanitizer;
    pub use crate::validator::{Translator, Validator};
    pub use crate::Data;
}
