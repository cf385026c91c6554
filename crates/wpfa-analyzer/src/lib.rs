//! Structural rules for dependency-property and change-notification declarations.
//!
//! This crate provides:
//! - `classifier`: structural roles of fields and methods (descriptor, key, accessor, raiser)
//! - `locator`: declaring syntax of a symbol in a deterministic order
//! - `name_argument`: the property name a name argument denotes
//! - `invocation_tracer`: confirmation that a call raises `PropertyChanged`
//! - `rules`: the rule catalogue (`WPF0012`, `WPF0013`, `WPF0031`, `WPF1010`, `WPF1012`, `WPF1014`)
//! - `sink` and `analyzer`: result collection and a whole-compilation driver

pub mod context;
pub use context::AnalysisContext;

mod known_types;

// Components queried by the rules
pub mod classifier;
pub use classifier::{DescriptorRole, RegistrationInfo, RegistrationKind};

pub mod locator;
pub use locator::SyntaxRef;

pub mod name_argument;
pub use name_argument::{NameArgument, NameForm};

pub mod invocation_tracer;
pub use invocation_tracer::{RaiseSite, Receiver};

// Rules
pub mod rules;
pub use rules::{Rule, RuleBox, all_rules};

// Results and driver
pub mod sink;
pub use sink::DiagnosticSink;

pub mod options;
pub use options::AnalyzerOptions;

pub mod analyzer;
pub use analyzer::{AnalysisResult, Analyzer};

#[cfg(test)]
mod test_fixtures;

#[cfg(test)]
#[path = "../tests/classifier_tests.rs"]
mod classifier_tests;

#[cfg(test)]
#[path = "../tests/name_argument_tests.rs"]
mod name_argument_tests;

#[cfg(test)]
#[path = "../tests/invocation_tracer_tests.rs"]
mod invocation_tracer_tests;

#[cfg(test)]
#[path = "../tests/field_order_tests.rs"]
mod field_order_tests;

#[cfg(test)]
#[path = "../tests/registered_type_tests.rs"]
mod registered_type_tests;

#[cfg(test)]
#[path = "../tests/property_notifies_tests.rs"]
mod property_notifies_tests;

#[cfg(test)]
#[path = "../tests/missing_property_tests.rs"]
mod missing_property_tests;

#[cfg(test)]
#[path = "../tests/analyzer_tests.rs"]
mod analyzer_tests;

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod options_tests;
