//! Form request plumbing: raw input, sanitization pre-pass, validation.

use crate::error::ValidationError;
use crate::message_bag::MessageBag;
use crate::registry::RuleRegistry;
use crate::rule::Ruleset;
use crate::sanitize::{sanitize_all, Sanitizer};
use crate::validator::{Translator, Validator};
use crate::Data;
use std::collections::HashMap;
use std::sync::Arc;

/// Raw input collaborator.
pub trait Request {
    /// Every raw field value supplied with the request.
    fn all(&self) -> Data;
}

/// Declarative description of how one request is sanitized and validated.
///
/// ## Example
///
/// ```
/// use formval::{FormRequest, Ruleset, Sanitizer};
/// use std::collections::HashMap;
///
/// struct StoreUser;
///
/// impl FormRequest for StoreUser {
///     fn rules(&self) -> Ruleset {
///         Ruleset::new()
///             .field("name", "required|string|min:2")
///             .field("email", "required|email")
///     }
///
///     fn sanitizers(&self) -> HashMap<String, Sanitizer> {
///         HashMap::from([
///             ("name".to_string(), Sanitizer::Text),
///             ("email".to_string(), Sanitizer::Email),
///         ])
///     }
/// }
/// ```
pub trait FormRequest {
    /// Validation rules per field.
    fn rules(&self) -> Ruleset;

    /// Per-field transforms applied before validation.
    fn sanitizers(&self) -> HashMap<String, Sanitizer> {
        HashMap::new()
    }

    /// Custom error messages, keyed `"field.rule"` or `"rule"`.
    fn messages(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Display labels for fields, used for the `:attribute` placeholder.
    fn attributes(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Whether the caller is allowed to perform this request.
    fn authorize(&self) -> bool {
        true
    }
}

/// Drives one request through sanitization and validation.
///
/// The sanitization pre-pass runs at most once per request; its result
/// and the constructed validator are cached for the lifetime of the form.
pub struct Form<D: FormRequest> {
    definition: D,
    raw: Data,
    translator: Option<Arc<dyn Translator>>,
    registry: RuleRegistry,
    sanitized: Option<Data>,
    validator: Option<Validator>,
}

impl<D: FormRequest> Form<D> {
    /// Pair a form definition with a request's raw input.
    pub fn new(definition: D, request: &dyn Request) -> Self {
        Self {
            definition,
            raw: request.all(),
            translator: None,
            registry: RuleRegistry::new(),
            sanitized: None,
            validator: None,
        }
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

    /// Whether the caller is authorized for this request.
    pub fn authorized(&self) -> bool {
        self.definition.authorize()
    }

    /// Sanitized input data. The pre-pass runs once and is cached.
    pub fn data(&mut self) -> &Data {
        let Self {
            definition,
            raw,
            sanitized,
            ..
        } = self;
        sanitized.get_or_insert_with(|| {
            let transforms = definition.sanitizers();
            if transforms.is_empty() {
                raw.clone()
            } else {
                sanitize_all(raw, &transforms)
            }
        })
    }

    /// Whether the sanitized data passes validation.
    pub fn validate(&mut self) -> Result<bool, ValidationError> {
        self.validator().passes()
    }

    /// Whether validation fails.
    pub fn fails(&mut self) -> Result<bool, ValidationError> {
        self.validator().fails()
    }

    /// The accumulated error bag.
    pub fn errors(&mut self) -> Result<&MessageBag, ValidationError> {
        self.validator().errors()
    }

    /// The sanitized input restricted to fields with declared rules.
    pub fn validated(&mut self) -> Result<Data, ValidationError> {
        self.validator().validated()
    }

    fn validator(&mut self) -> &mut Validator {
        if self.validator.is_none() {
            let data = self.data().clone();
            let mut validator = Validator::new(data, self.definition.rules())
                .with_messages(self.definition.messages())
                .with_attributes(self.definition.attributes())
                .with_registry(self.registry.clone());
            if let Some(translator) = &self.translator {
                validator = validator.with_translator(translator.clone());
            }
            self.validator = Some(validator);
        }
        match &mut self.validator {
            Some(validator) => validator,
            None => unreachable!("validator constructed above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FakeRequest(Data);

    impl Request for FakeRequest {
        fn all(&self) -> Data {
            self.0.clone()
        }
    }

    fn request_of(value: serde_json::Value) -> FakeRequest {
        FakeRequest(value.as_object().cloned().unwrap())
    }

    struct StoreUser;

    impl FormRequest for StoreUser {
        fn rules(&self) -> Ruleset {
            Ruleset::new()
                .field("name", "required|string|min:2")
                .field("email", "required|email")
        }

        fn sanitizers(&self) -> HashMap<String, Sanitizer> {
            HashMap::from([
                ("name".to_string(), Sanitizer::Text),
                ("email".to_string(), Sanitizer::Email),
            ])
        }

        fn messages(&self) -> HashMap<String, String> {
            HashMap::from([("email.email".to_string(), "Bad address.".to_string())])
        }
    }

    #[test]
    fn sanitizes_before_validating() {
        let request = request_of(json!({
            "name": "  <b>Ann</b>  ",
            "email": "ann @example.com",
        }));
        let mut form = Form::new(StoreUser, &request);

        assert!(form.validate().unwrap());
        assert_eq!(form.data().get("name"), Some(&json!("Ann")));
        assert_eq!(form.data().get("email"), Some(&json!("ann@example.com")));
    }

    #[test]
    fn sanitized_data_is_cached() {
        let request = request_of(json!({"name": "Ann", "email": "a@b.com"}));
        let mut form = Form::new(StoreUser, &request);

        let first = form.data().clone();
        let second = form.data().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn errors_flow_through_the_form() {
        let request = request_of(json!({"name": "A", "email": "nope"}));
        let mut form = Form::new(StoreUser, &request);

        assert!(form.fails().unwrap());
        let errors = form.errors().unwrap();
        assert!(errors.has("name"));
        assert_eq!(errors.first("email"), Some("Bad address."));
    }

    #[test]
    fn validated_drops_unruled_fields() {
        let request = request_of(json!({
            "name": "Ann",
            "email": "ann@example.com",
            "extra": "ignored",
        }));
        let mut form = Form::new(StoreUser, &request);

        let validated = form.validated().unwrap();
        assert!(validated.contains_key("name"));
        assert!(validated.contains_key("email"));
        assert!(!validated.contains_key("extra"));
    }

    struct Open;

    impl FormRequest for Open {
        fn rules(&self) -> Ruleset {
            Ruleset::new().field("note", "string")
        }
    }

    #[test]
    fn no_declared_sanitizers_passes_input_through() {
        let request = request_of(json!({"note": "  <i>kept raw</i>  "}));
        let mut form = Form::new(Open, &request);

        assert_eq!(form.data().get("note"), Some(&json!("  <i>kept raw</i>  ")));
        assert!(form.authorized());
    }
}
