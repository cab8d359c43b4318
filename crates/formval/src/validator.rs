//! The validation engine.

use crate::error::ValidationError;
use crate::message_bag::MessageBag;
use crate::registry::RuleRegistry;
use crate::rule::{RuleToken, Ruleset};
use crate::rules::BuiltinRule;
use crate::Data;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Localizes default message templates before placeholder substitution.
///
/// Only templates resolved from the built-in default table pass through
/// the translator; custom messages and extension defaults are used as-is.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str) -> String;
}

/// Explicit two-state machine for the memoized sweep outcome.
enum State {
    Unevaluated,
    Evaluated(MessageBag),
}

/// Validates one input mapping against one ruleset.
///
/// Built per validation request and discarded after use; the sweep runs at
/// most once unless [`validate`](Validator::validate) forces a recompute.
/// Not meant to be shared across threads.
///
/// ## Example
///
/// ```
/// use formval::{Ruleset, Validator};
/// use serde_json::json;
///
/// let data = json!({"status": "unknown"}).as_object().cloned().unwrap();
/// let rules = Ruleset::new().field("status", "in:active,inactive");
///
/// let mut validator = Validator::new(data, rules);
/// assert!(validator.fails().unwrap());
/// assert_eq!(
///     validator.errors().unwrap().first("status"),
///     Some("The status field must be one of: active, inactive."),
/// );
/// ```
pub struct Validator {
    data: Data,
    rules: Ruleset,
    custom_messages: HashMap<String, String>,
    custom_attributes: HashMap<String, String>,
    translator: Option<Arc<dyn Translator>>,
    registry: RuleRegistry,
    state: State,
}

impl Validator {
    /// Create a validator over `data` with the parsed `rules`.
    pub fn new(data: Data, rules: Ruleset) -> Self {
        Self {
            data,
            rules,
            custom_messages: HashMap::new(),
            custom_attributes: HashMap::new(),
            translator: None,
            registry: RuleRegistry::new(),
            state: State::Unevaluated,
        }
    }

    /// Custom error messages, keyed `"field.rule"` or `"rule"`.
    pub fn with_messages(mut self, messages: HashMap<String, String>) -> Self {
        self.custom_messages = messages;
        self
    }

    /// Add one custom message under a `"field.rule"` or `"rule"` key.
    pub fn message(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.custom_messages.insert(key.into(), text.into());
        self
    }

    /// Display labels substituted for `:attribute`, keyed by field name.
    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.custom_attributes = attributes;
        self
    }

    /// Add one display label for a field.
    pub fn attribute(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.custom_attributes.insert(field.into(), label.into());
        self
    }

    /// Localize default message templates through `translator`.
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Use `registry` for extension rule dispatch.
    pub fn with_registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The input mapping under validation.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Run the full rule sweep, recomputing even if it already ran.
    ///
    /// Every field and every rule is evaluated; failures accumulate
    /// rather than short-circuiting, so one call reports every violation.
    /// Returns whether the data passed.
    pub fn validate(&mut self) -> Result<bool, ValidationError> {
        let bag = self.sweep()?;
        let passed = !bag.has_errors();
        self.state = State::Evaluated(bag);
        Ok(passed)
    }

    /// Whether validation fails. Runs the sweep once, memoized.
    pub fn fails(&mut self) -> Result<bool, ValidationError> {
        Ok(self.evaluated()?.has_errors())
    }

    /// Whether validation passes. Logical negation of [`fails`](Self::fails).
    pub fn passes(&mut self) -> Result<bool, ValidationError> {
        Ok(!self.fails()?)
    }

    /// The accumulated error bag. Runs the sweep once, memoized.
    pub fn errors(&mut self) -> Result<&MessageBag, ValidationError> {
        self.evaluated()
    }

    /// The input restricted to fields that have rules declared.
    ///
    /// Fields without rules are dropped silently even when present in the
    /// input. Fails with [`ValidationError::Invalid`] carrying the error
    /// bag when validation fails.
    pub fn validated(&mut self) -> Result<Data, ValidationError> {
        let bag = self.evaluated()?;
        if bag.has_errors() {
            return Err(ValidationError::Invalid(bag.clone()));
        }

        let mut subset = Data::new();
        for (field, _) in self.rules.iter() {
            if let Some(value) = self.data.get(field) {
                subset.insert(field.to_string(), value.clone());
            }
        }
        Ok(subset)
    }

    fn evaluated(&mut self) -> Result<&MessageBag, ValidationError> {
        if let State::Unevaluated = self.state {
            let bag = self.sweep()?;
            self.state = State::Evaluated(bag);
        }
        match &self.state {
            State::Evaluated(bag) => Ok(bag),
            State::Unevaluated => unreachable!("sweep stored an outcome above"),
        }
    }

    fn sweep(&self) -> Result<MessageBag, ValidationError> {
        let mut bag = MessageBag::new();
        for (field, tokens) in self.rules.iter() {
            self.validate_field(field, tokens, &mut bag)?;
        }
        debug!(
            fields = self.rules.len(),
            errors = bag.count(),
            "validation sweep complete"
        );
        Ok(bag)
    }

    fn validate_field(
        &self,
        field: &str,
        tokens: &[RuleToken],
        bag: &mut MessageBag,
    ) -> Result<(), ValidationError> {
        let value = self.data.get(field).unwrap_or(&Value::Null);

        // The nullable gate: an empty value bypasses every other rule.
        let nullable = tokens.iter().any(RuleToken::is_nullable);
        if nullable && is_empty_value(value) {
            trace!(field, "nullable field is empty, skipping rules");
            return Ok(());
        }

        for token in tokens.iter().filter(|token| !token.is_nullable()) {
            self.apply_rule(field, value, token, bag)?;
        }
        Ok(())
    }

    fn apply_rule(
        &self,
        field: &str,
        value: &Value,
        token: &RuleToken,
        bag: &mut MessageBag,
    ) -> Result<(), ValidationError> {
        // Extensions shadow built-ins of the same name.
        if let Some(rule) = self.registry.get(&token.name) {
            if !rule.passes(field, value, &token.parameters, &self.data) {
                trace!(field, rule = %token.name, "extension rule failed");
                let message = self.resolve_message(field, token, Some(rule.message()), None);
                bag.add(field, message);
            }
            return Ok(());
        }

        if let Some(builtin) = BuiltinRule::from_name(&token.name) {
            if !builtin.passes(field, value, &token.parameters, &self.data) {
                trace!(field, rule = %token.name, "rule failed");
                let message = self.resolve_message(field, token, None, Some(builtin));
                bag.add(field, message);
            }
            return Ok(());
        }

        // A name with nothing behind it is a configuration error, not a
        // field failure; it aborts the whole call.
        Err(ValidationError::UnknownRule {
            field: field.to_string(),
            rule: token.name.clone(),
        })
    }

    /// Resolve the message template and substitute its placeholders.
    ///
    /// Precedence, first match wins: custom `"field.rule"`, custom
    /// `"rule"`, the extension's own default, then the built-in default
    /// table. Only the last step passes through the translator.
    fn resolve_message(
        &self,
        field: &str,
        token: &RuleToken,
        extension_default: Option<&str>,
        builtin: Option<BuiltinRule>,
    ) -> String {
        let template = self.message_template(field, token, extension_default, builtin);
        self.substitute_placeholders(&template, field, &token.parameters)
    }

    fn message_template(
        &self,
        field: &str,
        token: &RuleToken,
        extension_default: Option<&str>,
        builtin: Option<BuiltinRule>,
    ) -> String {
        let compound = format!("{field}.{}", token.name);
        if let Some(message) = self.custom_messages.get(&compound) {
            return message.clone();
        }
        if let Some(message) = self.custom_messages.get(&token.name) {
            return message.clone();
        }
        if let Some(message) = extension_default {
            return message.to_string();
        }

        let template = builtin
            .map(|rule| rule.default_message(&token.parameters))
            .unwrap_or_else(|| "The :attribute field is invalid.".to_string());
        match &self.translator {
            Some(translator) => translator.translate(&template),
            None => template,
        }
    }

    fn substitute_placeholders(&self, template: &str, field: &str, parameters: &[String]) -> String {
        let attribute = self
            .custom_attributes
            .get(field)
            .cloned()
            .unwrap_or_else(|| field.replace('_', " "));
        let mut message = template.replace(":attribute", &attribute);

        // Highest index first, so :param1 never clobbers :param10.
        for (index, parameter) in parameters.iter().enumerate().rev() {
            message = message.replace(&format!(":param{index}"), parameter);
        }
        message
    }
}

/// Empty for the purposes of the nullable gate: null or `""`.
fn is_empty_value(value: &Value) -> bool {
    value.is_null() || value.as_str() == Some("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use serde_json::json;

    fn data_of(value: serde_json::Value) -> Data {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn field_specific_custom_message_wins() {
        let rules = Ruleset::new().field("email", "required|email");
        let mut validator = Validator::new(data_of(json!({"email": "nope"})), rules)
            .message("email.email", "Give us a real address.")
            .message("email", "Generic email message.");

        assert!(validator.fails().unwrap());
        assert_eq!(
            validator.errors().unwrap().first("email"),
            Some("Give us a real address.")
        );
    }

    #[test]
    fn rule_level_custom_message_beats_default() {
        let rules = Ruleset::new().field("name", "required");
        let mut validator = Validator::new(data_of(json!({"name": ""})), rules)
            .message("required", "You forgot :attribute.");

        assert_eq!(
            validator.errors().unwrap().first("name"),
            Some("You forgot name.")
        );
    }

    #[test]
    fn attribute_label_replaces_placeholder() {
        let rules = Ruleset::new().field("first_name", "required");
        let mut validator = Validator::new(data_of(json!({})), rules.clone())
            .attribute("first_name", "given name");
        assert_eq!(
            validator.errors().unwrap().first("first_name"),
            Some("The given name field is required.")
        );

        // Without a label, underscores become spaces.
        let mut plain = Validator::new(data_of(json!({})), rules);
        assert_eq!(
            plain.errors().unwrap().first("first_name"),
            Some("The first name field is required.")
        );
    }

    #[test]
    fn parameters_substitute_positionally() {
        let rules = Ruleset::new().field("age", "between:18,65");
        let mut validator = Validator::new(data_of(json!({"age": 70})), rules);

        assert_eq!(
            validator.errors().unwrap().first("age"),
            Some("The age field must be between 18 and 65.")
        );
    }

    struct FauxFrench;

    impl Translator for FauxFrench {
        fn translate(&self, text: &str) -> String {
            text.replace("is required", "est requis")
        }
    }

    #[test]
    fn translator_applies_to_default_templates_only() {
        let rules = Ruleset::new()
            .field("name", "required")
            .field("email", "required");
        let data = data_of(json!({}));
        let mut validator = Validator::new(data, rules)
            .message("email.required", "email is missing")
            .with_translator(Arc::new(FauxFrench));

        let errors = validator.errors().unwrap().clone();
        // :attribute is substituted after translation.
        assert_eq!(errors.first("name"), Some("The name field est requis."));
        assert_eq!(errors.first("email"), Some("email is missing"));
    }

    struct Rejecting;

    impl Rule for Rejecting {
        fn passes(&self, _: &str, _: &Value, _: &[String], _: &Data) -> bool {
            false
        }

        fn message(&self) -> &str {
            "The :attribute field was rejected."
        }
    }

    #[test]
    fn extension_default_message_is_not_translated() {
        let mut registry = RuleRegistry::new();
        registry.register("rejected", Rejecting);

        let rules = Ruleset::new().field("name", "rejected");
        let mut validator = Validator::new(data_of(json!({"name": "x"})), rules)
            .with_registry(registry)
            .with_translator(Arc::new(FauxFrench));

        assert_eq!(
            validator.errors().unwrap().first("name"),
            Some("The name field was rejected.")
        );
    }

    #[test]
    fn validate_recomputes_while_queries_memoize() {
        let rules = Ruleset::new().field("name", "required");
        let mut validator = Validator::new(data_of(json!({"name": "John"})), rules);

        assert!(validator.passes().unwrap());
        assert!(validator.validate().unwrap());
        assert!(!validator.fails().unwrap());
    }

    #[test]
    fn rules_run_against_absent_fields_as_null() {
        let rules = Ruleset::new().field("name", "required");
        let mut validator = Validator::new(data_of(json!({})), rules);

        assert!(validator.fails().unwrap());
        assert!(validator.errors().unwrap().has("name"));
    }
}
