//! Analyzer options, loaded from a JSON file such as:
//!
//! ```json
//! {
//!   "disabledRules": ["WPF1014"],
//!   "analyzeGeneratedCode": "false",
//!   "parallel": true
//! }
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use wpfa_common::diagnostics::get_diagnostic_message;

/// File suffixes of tool-generated source units.
const GENERATED_SUFFIXES: &[&str] = &[".g.cs", ".g.i.cs", ".designer.cs", ".generated.cs"];

/// Custom deserializer for boolean options that accepts both bool and string values.
/// This handles option files containing `"parallel": "true"` instead of `"parallel": true`.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => {
            let normalized = s.trim().to_lowercase();
            match normalized.as_str() {
                "true" | "1" | "yes" | "on" => Ok(Some(true)),
                "false" | "0" | "no" | "off" => Ok(Some(false)),
                _ => Err(Error::custom(format!(
                    "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
                ))),
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerOptions {
    /// Rule ids (`WPF0031`, ...) that never report.
    #[serde(default)]
    pub disabled_rules: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub analyze_generated_code: Option<bool>,
    /// Analyze source units on the rayon pool.
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub parallel: Option<bool>,
}

impl AnalyzerOptions {
    pub fn from_json_str(source: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(source).context("failed to parse analyzer options JSON")?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analyzer options: {}", path.display()))?;
        Self::from_json_str(&source)
            .with_context(|| format!("failed to load analyzer options: {}", path.display()))
    }

    /// Reject rule ids that are not in the catalogue.
    pub fn validate(&self) -> Result<()> {
        for code in &self.disabled_rules {
            if get_diagnostic_message(code).is_none() {
                bail!("unknown rule id '{}' in disabledRules", code);
            }
        }
        Ok(())
    }

    pub fn analyze_generated_code(&self) -> bool {
        self.analyze_generated_code.unwrap_or(false)
    }

    pub fn parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    pub fn is_rule_enabled(&self, code: &str) -> bool {
        !self.disabled_rules.iter().any(|disabled| disabled == code)
    }

    /// True for designer and tool output, recognized by file name.
    pub fn is_generated_path(path: &str) -> bool {
        let lower = path.to_lowercase();
        GENERATED_SUFFIXES
            .iter()
            .any(|suffix| lower.ends_with(suffix))
    }
}
