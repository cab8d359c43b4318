//! The rule specification grammar and its parsed form.
//!
//! A field's rules arrive either as a single `|`-delimited string
//! (`"required|min:3"`) or as an explicit list of token strings. Both are
//! parsed once, at [`Ruleset`] construction, into [`RuleToken`]s; the
//! engine never re-parses the grammar during a sweep.

/// One parsed rule token, e.g. `min:5` → name `min`, parameters `["5"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleToken {
    /// Rule name, never empty.
    pub name: String,
    /// Positional string parameters, possibly empty.
    pub parameters: Vec<String>,
}

impl RuleToken {
    /// Parse one token text, splitting on the first `:`.
    ///
    /// The parameter string splits on `,` with no escaping, so a literal
    /// `,` or `:` cannot appear inside a parameter. This is a known
    /// limitation of the grammar, carried forward deliberately.
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            None => Self {
                name: token.to_string(),
                parameters: Vec::new(),
            },
            Some((name, params)) => Self {
                name: name.to_string(),
                parameters: params.split(',').map(str::to_string).collect(),
            },
        }
    }

    /// Whether this is the special `nullable` token, which gates the rest
    /// of a field's spec instead of being evaluated itself.
    pub fn is_nullable(&self) -> bool {
        self.name == "nullable"
    }
}

/// Ordered mapping of field name to its parsed rule tokens.
///
/// Iteration order is declaration order, which is also the order the
/// engine sweeps fields in. The keyset defines which fields count as
/// "validated": input keys absent from the ruleset are ignored entirely.
///
/// A `Ruleset` parses its grammar once and is cheap to clone, so the same
/// parsed ruleset can serve many validation runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ruleset {
    fields: Vec<(String, Vec<RuleToken>)>,
}

impl Ruleset {
    /// Create an empty ruleset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare rules for a field from a single `|`-delimited spec string.
    ///
    /// An empty spec string declares the field with zero rules.
    pub fn field(mut self, name: impl Into<String>, spec: &str) -> Self {
        let tokens = spec
            .split('|')
            .filter(|token| !token.is_empty())
            .map(RuleToken::parse)
            .collect();
        self.insert(name.into(), tokens);
        self
    }

    /// Declare rules for a field from an explicit list of token strings.
    pub fn field_list<S: AsRef<str>>(mut self, name: impl Into<String>, specs: &[S]) -> Self {
        let tokens = specs
            .iter()
            .map(|spec| RuleToken::parse(spec.as_ref()))
            .collect();
        self.insert(name.into(), tokens);
        self
    }

    fn insert(&mut self, name: String, tokens: Vec<RuleToken>) {
        // Re-declaring a field replaces its earlier spec in place.
        if let Some(slot) = self.fields.iter_mut().find(|(field, _)| *field == name) {
            slot.1 = tokens;
        } else {
            self.fields.push((name, tokens));
        }
    }

    /// Whether the field has rules declared.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// Number of fields with declared rules.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleToken])> {
        self.fields
            .iter()
            .map(|(field, tokens)| (field.as_str(), tokens.as_slice()))
    }
}
