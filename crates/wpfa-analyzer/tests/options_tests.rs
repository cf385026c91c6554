use super::*;
use std::io::Write;

#[test]
fn test_parse_accepts_string_booleans() {
    let options = AnalyzerOptions::from_json_str(
        r#"{
            "disabledRules": ["WPF1014"],
            "analyzeGeneratedCode": "yes",
            "parallel": "false"
        }"#,
    )
    .expect("valid options");
    assert_eq!(options.disabled_rules, vec!["WPF1014".to_string()]);
    assert!(options.analyze_generated_code());
    assert!(!options.parallel());
    assert!(!options.is_rule_enabled("WPF1014"));
    assert!(options.is_rule_enabled("WPF1010"));
}

#[test]
fn test_defaults() {
    let options = AnalyzerOptions::from_json_str("{}").expect("valid options");
    assert_eq!(options, AnalyzerOptions::default());
    assert!(!options.analyze_generated_code());
    assert!(options.parallel());
    assert!(options.disabled_rules.is_empty());
}

#[test]
fn test_invalid_boolean_is_rejected() {
    let err = AnalyzerOptions::from_json_str(r#"{"parallel": "sometimes"}"#)
        .expect_err("invalid boolean");
    assert!(format!("{err:#}").contains("invalid boolean value: 'sometimes'"));
}

#[test]
fn test_unknown_rule_id_is_rejected() {
    let err = AnalyzerOptions::from_json_str(r#"{"disabledRules": ["WPF9999"]}"#)
        .expect_err("unknown rule");
    assert_eq!(err.to_string(), "unknown rule id 'WPF9999' in disabledRules");
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, r#"{{"disabledRules": ["WPF0031"], "parallel": false}}"#).expect("write");
    let options = AnalyzerOptions::load(file.path()).expect("load");
    assert!(!options.is_rule_enabled("WPF0031"));
    assert!(!options.parallel());

    let missing = file.path().with_extension("missing");
    let err = AnalyzerOptions::load(&missing).expect_err("missing file");
    assert!(err.to_string().starts_with("failed to read analyzer options"));
}

#[test]
fn test_load_reports_path_of_bad_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "not json").expect("write");
    let err = AnalyzerOptions::load(file.path()).expect_err("bad json");
    assert!(err.to_string().starts_with("failed to load analyzer options"));
    assert!(format!("{err:#}").contains("failed to parse analyzer options JSON"));
}

#[test]
fn test_generated_paths() {
    for path in [
        "obj/MainWindow.g.cs",
        "obj/MainWindow.g.i.cs",
        "Properties/Resources.Designer.cs",
        "Model.generated.cs",
    ] {
        assert!(AnalyzerOptions::is_generated_path(path), "{path}");
    }
    for path in ["MainWindow.xaml.cs", "Program.cs", "Designer.cs.txt"] {
        assert!(!AnalyzerOptions::is_generated_path(path), "{path}");
    }
}
