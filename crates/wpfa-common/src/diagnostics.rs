//! Diagnostic types and the rule message catalogue.
//!
//! Every rule owns exactly one `DiagnosticMessage` (code, title, message template).
//! Templates use `{0}`, `{1}`, ... placeholders filled in by `format_message`.

use crate::span::{FileId, Location, Span};
use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// A rule definition with code, category, title and message template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: &'static str,
    pub category: DiagnosticCategory,
    /// Rule family the message belongs to.
    pub area: &'static str,
    pub title: &'static str,
    pub message: &'static str,
}

/// A structural violation reported by a rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub category: DiagnosticCategory,
    pub location: Location,
    pub message_text: String,
    /// The arguments substituted into the message template, in order.
    pub args: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic for `message` at `location`, formatting the template with `args`.
    #[must_use]
    pub fn new(message: &DiagnosticMessage, location: Location, args: &[&str]) -> Self {
        Self {
            code: message.code,
            category: message.category,
            location,
            message_text: format_message(message.message, args),
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
        }
    }

    #[inline]
    pub const fn file(&self) -> FileId {
        self.location.file
    }

    #[inline]
    pub const fn span(&self) -> Span {
        self.location.span
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
///
/// Placeholders are substituted in one pass over the template, so braces inside an
/// argument are copied verbatim. Placeholders without a matching argument are kept.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let arg = (digits > 0 && after[digits..].starts_with('}'))
            .then(|| after[..digits].parse::<usize>().ok())
            .flatten()
            .and_then(|index| args.get(index));
        match arg {
            Some(arg) => {
                result.push_str(arg);
                rest = &after[digits + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

// =============================================================================
// Catalogue
// =============================================================================

pub mod areas {
    pub const DEPENDENCY_PROPERTIES: &str = "WpfAnalyzers.DependencyProperties";
    pub const PROPERTY_CHANGED: &str = "WpfAnalyzers.PropertyChanged";
}

pub mod diagnostic_codes {
    pub const CLR_PROPERTY_MUST_MATCH_REGISTERED_TYPE: &str = "WPF0012";
    pub const CLR_METHOD_MUST_MATCH_REGISTERED_TYPE: &str = "WPF0013";
    pub const KEY_FIELD_MUST_COME_BEFORE_PROPERTY_FIELD: &str = "WPF0031";
    pub const PROPERTY_MUST_NOTIFY: &str = "WPF1010";
    pub const PROPERTY_MUST_NOTIFY_WITH_OWN_NAME: &str = "WPF1012";
    pub const DONT_RAISE_CHANGE_FOR_MISSING_PROPERTY: &str = "WPF1014";
}

pub mod diagnostic_messages {
    use super::{DiagnosticCategory, DiagnosticMessage, areas, diagnostic_codes};

    pub const CLR_PROPERTY_MUST_MATCH_REGISTERED_TYPE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::CLR_PROPERTY_MUST_MATCH_REGISTERED_TYPE,
        category: DiagnosticCategory::Error,
        area: areas::DEPENDENCY_PROPERTIES,
        title: "CLR property type must match registered type.",
        message: "Registered type {0} must match the CLR property type {1}",
    };

    pub const CLR_METHOD_MUST_MATCH_REGISTERED_TYPE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::CLR_METHOD_MUST_MATCH_REGISTERED_TYPE,
        category: DiagnosticCategory::Error,
        area: areas::DEPENDENCY_PROPERTIES,
        title: "CLR accessor for attached property must match registered type.",
        message: "Registered type {0} must match the CLR accessor type {1}",
    };

    pub const KEY_FIELD_MUST_COME_BEFORE_PROPERTY_FIELD: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::KEY_FIELD_MUST_COME_BEFORE_PROPERTY_FIELD,
        category: DiagnosticCategory::Error,
        area: areas::DEPENDENCY_PROPERTIES,
        title: "DependencyPropertyKey field must come before DependencyProperty field.",
        message: "Field '{0}' must come before '{1}'",
    };

    pub const PROPERTY_MUST_NOTIFY: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::PROPERTY_MUST_NOTIFY,
        category: DiagnosticCategory::Warning,
        area: areas::PROPERTY_CHANGED,
        title: "Property must notify when its value changes.",
        message: "Property '{0}' must notify when its value changes",
    };

    pub const PROPERTY_MUST_NOTIFY_WITH_OWN_NAME: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::PROPERTY_MUST_NOTIFY_WITH_OWN_NAME,
        category: DiagnosticCategory::Warning,
        area: areas::PROPERTY_CHANGED,
        title: "Property must notify with its own name.",
        message: "Property '{0}' notifies for '{1}'",
    };

    pub const DONT_RAISE_CHANGE_FOR_MISSING_PROPERTY: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::DONT_RAISE_CHANGE_FOR_MISSING_PROPERTY,
        category: DiagnosticCategory::Warning,
        area: areas::PROPERTY_CHANGED,
        title: "Don't raise PropertyChanged for missing property.",
        message: "The type '{1}' does not have a property named '{0}'",
    };
}

/// All rule messages, in code order.
pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    diagnostic_messages::CLR_PROPERTY_MUST_MATCH_REGISTERED_TYPE,
    diagnostic_messages::CLR_METHOD_MUST_MATCH_REGISTERED_TYPE,
    diagnostic_messages::KEY_FIELD_MUST_COME_BEFORE_PROPERTY_FIELD,
    diagnostic_messages::PROPERTY_MUST_NOTIFY,
    diagnostic_messages::PROPERTY_MUST_NOTIFY_WITH_OWN_NAME,
    diagnostic_messages::DONT_RAISE_CHANGE_FOR_MISSING_PROPERTY,
];

/// Look up a rule message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: &str) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a rule code.
#[must_use]
pub fn get_message_template(code: &str) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
