// Form validation engine
// Field-level rules with per-field error state, shared by the sign-in and register forms

use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required { message: String },
    MinLength { min: usize, message: String },
    // Compared against the other field's value at validation time
    Matches { field: &'static str, message: String },
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required {
            message: message.into(),
        }
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Rule::MinLength {
            min,
            message: message.into(),
        }
    }

    pub fn matches(field: &'static str, message: impl Into<String>) -> Self {
        Rule::Matches {
            field,
            message: message.into(),
        }
    }

    fn check(&self, value: &str, form: &Form) -> Option<String> {
        match self {
            Rule::Required { message } if value.is_empty() => Some(message.clone()),
            // Length only applies once something has been typed
            Rule::MinLength { min, message }
                if !value.is_empty() && value.chars().count() < *min =>
            {
                Some(message.clone())
            }
            Rule::Matches { field, message } if form.value(field) != Some(value) => {
                Some(message.clone())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Text,
    Email,
    Password,
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Password => "password",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: InputType,
    pub placeholder: &'static str,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, input_type: InputType) -> Self {
        Self {
            name,
            label,
            input_type,
            placeholder: "",
            rules: Vec::new(),
        }
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Shorthand for a `Required` rule with the usual "<Label> is required" text
    pub fn required(self) -> Self {
        let message = format!("{} is required", self.label);
        self.rule(Rule::required(message))
    }
}

/// Everything a UI needs to draw one validated input.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: InputType,
    pub placeholder: &'static str,
    pub value: String,
    pub error: Option<String>,
    // Error styling: the field's own error or a form-wide server rejection
    pub invalid: bool,
    pub aria_invalid: bool,
    pub error_id: String,
}

#[derive(Debug, Clone)]
struct FieldState {
    spec: FieldSpec,
    value: String,
    error: Option<String>,
}

/// One form instance. Fields validate in declaration order; after the first
/// submit attempt, edits re-validate the touched field and its dependents.
#[derive(Debug, Clone)]
pub struct Form {
    fields: Vec<FieldState>,
    submitted: bool,
    server_rejected: bool,
}

impl Form {
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        Self {
            fields: specs
                .into_iter()
                .map(|spec| FieldState {
                    spec,
                    value: String::new(),
                    error: None,
                })
                .collect(),
            submitted: false,
            server_rejected: false,
        }
    }

    fn index_of(&self, name: &str) -> Result<usize, FormError> {
        self.fields
            .iter()
            .position(|f| f.spec.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .map(|f| f.value.as_str())
    }

    pub(crate) fn value_or_empty(&self, name: &str) -> String {
        self.value(name).unwrap_or_default().to_string()
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .and_then(|f| f.error.as_deref())
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let index = self.index_of(name)?;
        self.fields[index].value = value.into();

        if self.submitted {
            self.revalidate(index);
            let dependents: Vec<usize> = self
                .fields
                .iter()
                .enumerate()
                .filter(|(_, f)| {
                    f.spec
                        .rules
                        .iter()
                        .any(|r| matches!(r, Rule::Matches { field, .. } if *field == name))
                })
                .map(|(i, _)| i)
                .collect();
            for i in dependents {
                self.revalidate(i);
            }
        }
        Ok(())
    }

    /// Forces an error onto a field regardless of its rules.
    pub fn set_error(&mut self, name: &str, message: impl Into<String>) -> Result<(), FormError> {
        let index = self.index_of(name)?;
        self.fields[index].error = Some(message.into());
        Ok(())
    }

    fn first_failure(&self, index: usize) -> Option<String> {
        let field = &self.fields[index];
        field
            .spec
            .rules
            .iter()
            .find_map(|rule| rule.check(&field.value, self))
    }

    fn revalidate(&mut self, index: usize) {
        self.fields[index].error = self.first_failure(index);
    }

    /// Runs every field's rules. Returns true when no field has an error.
    pub fn validate(&mut self) -> bool {
        self.submitted = true;
        let results: Vec<Option<String>> =
            (0..self.fields.len()).map(|i| self.first_failure(i)).collect();
        for (field, error) in self.fields.iter_mut().zip(results) {
            field.error = error;
        }

        let valid = self.is_valid();
        if !valid {
            debug!(errors = ?self.errors(), "form validation failed");
        }
        valid
    }

    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|f| f.error.is_none())
    }

    pub fn errors(&self) -> Vec<(&'static str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.error.as_deref().map(|e| (f.spec.name, e)))
            .collect()
    }

    pub fn server_rejected(&self) -> bool {
        self.server_rejected
    }

    pub(crate) fn set_server_rejected(&mut self, rejected: bool) {
        self.server_rejected = rejected;
    }

    pub fn field_view(&self, name: &str) -> Option<FieldView> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .map(|f| self.view_of(f))
    }

    pub fn field_views(&self) -> Vec<FieldView> {
        self.fields.iter().map(|f| self.view_of(f)).collect()
    }

    fn view_of(&self, field: &FieldState) -> FieldView {
        FieldView {
            name: field.spec.name,
            label: field.spec.label,
            input_type: field.spec.input_type,
            placeholder: field.spec.placeholder,
            value: field.value.clone(),
            error: field.error.clone(),
            invalid: field.error.is_some() || self.server_rejected,
            aria_invalid: field.error.is_some(),
            error_id: format!("{}-error", field.spec.name),
        }
    }
}
