//! wpfa: structural analyzer for WPF dependency-property and change-notification
//! declarations.
//!
//! The facade re-exports the workspace crates:
//! - `common`: spans, the diagnostic catalogue, cancellation, limits
//! - `syntax`: the syntax tree, `SemanticModel`, and the in-memory `Compilation`
//! - `analyzer`: the rules and the whole-compilation driver
//!
//! A host with its own resolved tree implements `SemanticModel` and either calls
//! `Rule::check` per node or hands the whole model to `Analyzer::analyze`.

pub use wpfa_analyzer as analyzer;
pub use wpfa_common as common;
pub use wpfa_syntax as syntax;

pub use wpfa_analyzer::{AnalysisResult, Analyzer, AnalyzerOptions, DiagnosticSink, Rule, all_rules};
pub use wpfa_common::{CancellationToken, Cancelled, Diagnostic, DiagnosticCategory, Location};
pub use wpfa_syntax::{Compilation, CompilationBuilder, SemanticModel};

pub mod tracing_config;

/// Analyze `model` with every built-in rule.
pub fn analyze(
    model: &dyn SemanticModel,
    options: AnalyzerOptions,
    cancellation: &CancellationToken,
) -> AnalysisResult {
    Analyzer::new(options).analyze(model, cancellation)
}
