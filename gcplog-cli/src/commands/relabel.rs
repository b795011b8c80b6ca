//! `gcplog relabel` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use gcplog_core::relabel::{RelabelConfig, RelabelRules};

use crate::cli::{RelabelArgs, RelabelCommand};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `relabel` command.
pub async fn execute(args: RelabelArgs, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        RelabelCommand::Check { file } => execute_check(&file, writer).await,
    }
}

/// Read a YAML relabel rule file (a sequence of rule mappings).
///
/// Rules are parsed but not compiled; compilation happens when they are
/// handed to [`RelabelRules::compile`].
pub async fn load_relabel_file(path: &Path) -> Result<Vec<RelabelConfig>, CliError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        CliError::Relabel(format!("failed to read {}: {}", path.display(), e))
    })?;

    parse_relabel_yaml(&content)
        .map_err(|e| CliError::Relabel(format!("failed to parse {}: {}", path.display(), e)))
}

/// Parse relabel rules from a YAML string. An empty document yields no rules.
pub fn parse_relabel_yaml(content: &str) -> Result<Vec<RelabelConfig>, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(content)
}

async fn execute_check(path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %path.display(), "checking relabel rules");

    let report = match load_relabel_file(path).await {
        Ok(configs) => check_rules(path, &configs),
        Err(e) => RelabelCheckReport {
            path: path.display().to_string(),
            total: 0,
            valid: false,
            rules: Vec::new(),
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Relabel(format!(
            "{} is not a valid relabel rule file",
            path.display()
        )));
    }

    Ok(())
}

/// Compile parsed rules and summarize the outcome.
pub fn check_rules(path: &Path, configs: &[RelabelConfig]) -> RelabelCheckReport {
    let rules = configs
        .iter()
        .enumerate()
        .map(|(index, c)| RuleSummary {
            index,
            action: c.action.to_string(),
            source_labels: c.source_labels.clone(),
            target_label: c.target_label.clone(),
        })
        .collect();

    let errors = match RelabelRules::compile(configs) {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    };

    RelabelCheckReport {
        path: path.display().to_string(),
        total: configs.len(),
        valid: errors.is_empty(),
        rules,
        errors,
    }
}

/// Result of `gcplog relabel check`.
#[derive(Serialize)]
pub struct RelabelCheckReport {
    pub path: String,
    pub total: usize,
    pub valid: bool,
    pub rules: Vec<RuleSummary>,
    pub errors: Vec<String>,
}

#[derive(Serialize)]
pub struct RuleSummary {
    pub index: usize,
    pub action: String,
    pub source_labels: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target_label: String,
}

impl Render for RelabelCheckReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Relabel Rules: {}", self.path.bold())?;
        writeln!(w, "  Rules: {}", self.total)?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
        }

        if !self.rules.is_empty() {
            writeln!(w)?;
            writeln!(w, "{:<6} {:<12} {:<40} Target", "#", "Action", "Sources")?;
            writeln!(w, "{}", "-".repeat(72))?;
            for r in &self.rules {
                writeln!(
                    w,
                    "{:<6} {:<12} {:<40} {}",
                    r.index,
                    r.action,
                    r.source_labels.join(","),
                    r.target_label
                )?;
            }
        }

        for err in &self.errors {
            writeln!(w, "  Error: {}", err.red())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcplog_core::relabel::RelabelAction;

    #[test]
    fn test_parse_relabel_yaml_full_rule() {
        let yaml = r#"
- source_labels: [__gcp_resource_labels_zone]
  target_label: zone
  action: replace
- source_labels: [__gcp_severity]
  regex: DEBUG
  action: drop
"#;
        let configs = parse_relabel_yaml(yaml).expect("valid yaml");
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].action, RelabelAction::Replace);
        assert_eq!(configs[0].target_label, "zone");
        assert_eq!(configs[1].action, RelabelAction::Drop);
        assert_eq!(configs[1].regex, "DEBUG");
    }

    #[test]
    fn test_parse_relabel_yaml_applies_defaults() {
        let yaml = "- source_labels: [a]\n  target_label: b\n";
        let configs = parse_relabel_yaml(yaml).expect("valid yaml");
        let defaults = RelabelConfig::default();
        assert_eq!(configs[0].separator, defaults.separator);
        assert_eq!(configs[0].regex, defaults.regex);
        assert_eq!(configs[0].replacement, defaults.replacement);
        assert_eq!(configs[0].action, defaults.action);
    }

    #[test]
    fn test_parse_relabel_yaml_empty_document() {
        assert!(parse_relabel_yaml("").expect("empty is fine").is_empty());
        assert!(parse_relabel_yaml("  \n").expect("blank is fine").is_empty());
    }

    #[test]
    fn test_parse_relabel_yaml_unknown_action_fails() {
        let yaml = "- source_labels: [a]\n  action: explode\n";
        assert!(parse_relabel_yaml(yaml).is_err());
    }

    #[test]
    fn test_check_rules_reports_invalid_regex() {
        let configs = vec![RelabelConfig {
            source_labels: vec!["__gcp_severity".to_owned()],
            regex: "(unclosed".to_owned(),
            action: RelabelAction::Keep,
            ..Default::default()
        }];

        let report = check_rules(Path::new("rules.yaml"), &configs);
        assert!(!report.valid);
        assert_eq!(report.total, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("(unclosed"));
    }

    #[test]
    fn test_check_rules_valid_summary() {
        let configs = vec![RelabelConfig {
            source_labels: vec!["__gcp_resource_type".to_owned()],
            target_label: "resource".to_owned(),
            ..Default::default()
        }];

        let report = check_rules(Path::new("rules.yaml"), &configs);
        assert!(report.valid);
        assert_eq!(report.rules[0].action, "replace");
        assert_eq!(report.rules[0].target_label, "resource");

        let mut buf = Vec::new();
        report.render_text(&mut buf).expect("render");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("VALID"));
        assert!(output.contains("__gcp_resource_type"));
    }
}
