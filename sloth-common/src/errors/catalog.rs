//! Error catalog for the Sloth rules generator.
//!
//! Each variant maps to a unique code in the `SLOTH-Exxx` format, and carries
//! a message, remediation steps, and a documentation URL. Unlike the six
//! `thiserror` enums in `sloth-core` (which carry the actual offending SLO
//! id and source chain), this catalog exists purely to give the CLI a
//! stable, user-facing vocabulary for "what category of thing went wrong" —
//! the same split the daemon's error catalog uses for its own subsystems.
//!
//! # Example
//!
//! ```rust
//! use sloth_common::errors::catalog::ErrorCode;
//!
//! let entry = ErrorCode::ParseUnknownSpecType.entry();
//! println!("{}: {}", entry.code, entry.message);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code enumeration covering all Sloth error scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // Parse (E001-E099)
    ParseUnknownSpecType,
    ParseYamlSyntax,
    ParseSchemaMismatch,
    ParseOpenSloUnsupportedIndicator,
    ParseOpenSloUnsupportedWindowUnit,

    // Validation (E100-E199)
    ValidationObjectiveOutOfRange,
    ValidationWindowUnsupported,
    ValidationDuplicateSloId,
    ValidationReservedLabel,
    ValidationMissingSli,
    ValidationInvalidIdentifier,
    ValidationPromqlSyntax,

    // Compile (E200-E299)
    CompileUnknownPlugin,
    CompilePluginRecursion,
    CompileTemplateExecution,
    CompileMissingWindowPlaceholder,

    // Generation (E300-E399)
    GenerationMissingBurnRateTable,
    GenerationInternal,

    // Encoding (E400-E499)
    EncodingSerializeFailed,
    EncodingUnsupportedSli,

    // Plugin (E500-E599)
    PluginDuplicateId,
    PluginManifestInvalid,
    PluginDiscoveryIoError,
}

impl ErrorCode {
    /// Returns the numeric error code (without prefix).
    #[must_use]
    pub const fn code_number(&self) -> u16 {
        match self {
            Self::ParseUnknownSpecType => 1,
            Self::ParseYamlSyntax => 2,
            Self::ParseSchemaMismatch => 3,
            Self::ParseOpenSloUnsupportedIndicator => 4,
            Self::ParseOpenSloUnsupportedWindowUnit => 5,

            Self::ValidationObjectiveOutOfRange => 100,
            Self::ValidationWindowUnsupported => 101,
            Self::ValidationDuplicateSloId => 102,
            Self::ValidationReservedLabel => 103,
            Self::ValidationMissingSli => 104,
            Self::ValidationInvalidIdentifier => 105,
            Self::ValidationPromqlSyntax => 106,

            Self::CompileUnknownPlugin => 200,
            Self::CompilePluginRecursion => 201,
            Self::CompileTemplateExecution => 202,
            Self::CompileMissingWindowPlaceholder => 203,

            Self::GenerationMissingBurnRateTable => 300,
            Self::GenerationInternal => 301,

            Self::EncodingSerializeFailed => 400,
            Self::EncodingUnsupportedSli => 401,

            Self::PluginDuplicateId => 500,
            Self::PluginManifestInvalid => 501,
            Self::PluginDiscoveryIoError => 502,
        }
    }

    /// Returns the formatted error code string (e.g., "SLOTH-E001").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("SLOTH-E{:03}", self.code_number())
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self.code_number() {
            1..=99 => ErrorCategory::Parse,
            100..=199 => ErrorCategory::Validation,
            200..=299 => ErrorCategory::Compile,
            300..=399 => ErrorCategory::Generation,
            400..=499 => ErrorCategory::Encoding,
            _ => ErrorCategory::Plugin,
        }
    }

    /// Returns the full error entry with all metadata.
    #[must_use]
    pub fn entry(&self) -> ErrorEntry {
        ErrorEntry {
            code: self.code_string(),
            category: self.category(),
            message: self.message().to_string(),
            remediation: self
                .remediation()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            doc_url: self.doc_url().map(String::from),
        }
    }

    /// Returns the error message template.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ParseUnknownSpecType => "No loader claimed this document",
            Self::ParseYamlSyntax => "Document contains invalid YAML syntax",
            Self::ParseSchemaMismatch => "Document matched a dialect but failed schema parsing",
            Self::ParseOpenSloUnsupportedIndicator => {
                "OpenSLO indicator source/type is not ratio or threshold over prometheus/sloth"
            }
            Self::ParseOpenSloUnsupportedWindowUnit => {
                "OpenSLO time window is not expressed as a single rolling day duration"
            }

            Self::ValidationObjectiveOutOfRange => "Objective is not in the open interval (0, 100)",
            Self::ValidationWindowUnsupported => {
                "Time window is not a whole number of days in the supported set"
            }
            Self::ValidationDuplicateSloId => "Duplicate (service, name) pair within an SLO group",
            Self::ValidationReservedLabel => "User labels collide with a generator-owned label",
            Self::ValidationMissingSli => "Exactly one SLI variant must be populated",
            Self::ValidationInvalidIdentifier => "Name or service does not match the identifier pattern",
            Self::ValidationPromqlSyntax => "Query failed a syntactic PromQL sanity check",

            Self::CompileUnknownPlugin => "Referenced plugin id is not registered",
            Self::CompilePluginRecursion => "Plugin-to-plugin invocation exceeded the recursion limit",
            Self::CompileTemplateExecution => "Window-template substitution failed",
            Self::CompileMissingWindowPlaceholder => {
                "Query is required to contain the {{.window}} placeholder"
            }

            Self::GenerationMissingBurnRateTable => "No burn-rate table for the requested window",
            Self::GenerationInternal => "Internal rules-generator failure",

            Self::EncodingSerializeFailed => "Failed to serialize the rule group",
            Self::EncodingUnsupportedSli => "SLI variant cannot be losslessly encoded in this format",

            Self::PluginDuplicateId => "Two plugin manifests declared the same id",
            Self::PluginManifestInvalid => "Plugin manifest is malformed or missing required fields",
            Self::PluginDiscoveryIoError => "Failed to read a plugin discovery directory",
        }
    }

    /// Returns remediation steps for this error.
    #[must_use]
    pub const fn remediation(&self) -> &'static [&'static str] {
        match self {
            Self::ParseUnknownSpecType => &[
                "Check the apiVersion/kind lines at the top of the document",
                "Supported dialects: sloth.slok.dev/v1, the Kubernetes CRD wrapper, openslo/v1",
            ],
            Self::ParseYamlSyntax => &[
                "Run the document through a YAML linter",
                "Check indentation and quoting of string values",
            ],
            Self::ParseSchemaMismatch => &[
                "Compare the document against the dialect's field list",
                "Check for typos in required field names",
            ],
            Self::ParseOpenSloUnsupportedIndicator => &[
                "Use a ratioMetric or thresholdMetric indicator",
                "Set the metric source type to prometheus or sloth",
            ],
            Self::ParseOpenSloUnsupportedWindowUnit => &[
                "Express the time window as a single rolling Day duration (e.g. 30d)",
                "Calendar-aligned windows are not supported",
            ],
            Self::ValidationObjectiveOutOfRange => &[
                "Set objective strictly between 0 and 100 (or 0 and 1 for OpenSLO ratios)",
            ],
            Self::ValidationWindowUnsupported => &[
                "Use one of the supported windows: 7, 14, 28, 30, 90 days",
            ],
            Self::ValidationDuplicateSloId => &[
                "Rename one of the conflicting SLOs",
                "Each (service, name) pair must be unique within a group",
            ],
            Self::ValidationReservedLabel => &[
                "Remove the reserved sloth_* label from your SLO's labels map",
                "Reserved labels: sloth_id, sloth_service, sloth_slo, sloth_window, sloth_target, sloth_objective",
            ],
            Self::ValidationMissingSli => &[
                "Populate exactly one of events, raw, or plugin in the SLI block",
            ],
            Self::ValidationInvalidIdentifier => &[
                "Use lowercase alphanumerics and hyphens only, max 63 characters",
            ],
            Self::ValidationPromqlSyntax => &[
                "Check balanced parentheses and braces in the query",
                "Verify the {{.window}} placeholder is present where required",
            ],
            Self::CompileUnknownPlugin => &[
                "Register the plugin via --plugins-path before compiling",
                "Check for typos in the plugin id",
            ],
            Self::CompilePluginRecursion => &[
                "A plugin ultimately invoking itself (directly or transitively) is not allowed",
                "Recursion depth is capped at 10",
            ],
            Self::CompileTemplateExecution => &[
                "Verify the query template's {{.window}} placeholders are well-formed",
            ],
            Self::CompileMissingWindowPlaceholder => &[
                "Add the literal {{.window}} substring to the query template",
            ],
            Self::GenerationMissingBurnRateTable => &[
                "Use a supported window (7, 14, 28, 30, 90 days)",
                "Report a bug if the window is supported but the table is missing",
            ],
            Self::GenerationInternal => &["Report this as a bug with reproduction steps"],
            Self::EncodingSerializeFailed => &["Check for invalid UTF-8 or cyclic structures in labels"],
            Self::EncodingUnsupportedSli => &[
                "Plugin SLIs are materialized to raw error-ratio queries on OpenSLO export",
                "This is expected and lossy by design",
            ],
            Self::PluginDuplicateId => &["Rename one of the two plugin manifests declaring the same id"],
            Self::PluginManifestInvalid => &[
                "Ensure the manifest declares id and a recognized kind",
                "Check plugin.toml syntax",
            ],
            Self::PluginDiscoveryIoError => &[
                "Verify the --plugins-path directory exists and is readable",
            ],
        }
    }

    /// Returns documentation URL for this error, if available.
    #[must_use]
    pub const fn doc_url(&self) -> Option<&'static str> {
        match self.category() {
            ErrorCategory::Parse => Some("https://sloth.dev/docs/loaders"),
            ErrorCategory::Validation => Some("https://sloth.dev/docs/validation"),
            ErrorCategory::Compile => Some("https://sloth.dev/docs/sli-compiler"),
            ErrorCategory::Generation => Some("https://sloth.dev/docs/rules-generator"),
            ErrorCategory::Encoding => Some("https://sloth.dev/docs/encoders"),
            ErrorCategory::Plugin => Some("https://sloth.dev/docs/plugins"),
        }
    }

    /// Returns all error codes.
    #[must_use]
    pub const fn all() -> &'static [ErrorCode] {
        &[
            Self::ParseUnknownSpecType,
            Self::ParseYamlSyntax,
            Self::ParseSchemaMismatch,
            Self::ParseOpenSloUnsupportedIndicator,
            Self::ParseOpenSloUnsupportedWindowUnit,
            Self::ValidationObjectiveOutOfRange,
            Self::ValidationWindowUnsupported,
            Self::ValidationDuplicateSloId,
            Self::ValidationReservedLabel,
            Self::ValidationMissingSli,
            Self::ValidationInvalidIdentifier,
            Self::ValidationPromqlSyntax,
            Self::CompileUnknownPlugin,
            Self::CompilePluginRecursion,
            Self::CompileTemplateExecution,
            Self::CompileMissingWindowPlaceholder,
            Self::GenerationMissingBurnRateTable,
            Self::GenerationInternal,
            Self::EncodingSerializeFailed,
            Self::EncodingUnsupportedSli,
            Self::PluginDuplicateId,
            Self::PluginManifestInvalid,
            Self::PluginDiscoveryIoError,
        ]
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_string(), self.message())
    }
}

/// Error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Spec loader / YAML schema errors (E001-E099)
    Parse,
    /// Normalized-model invariant violations (E100-E199)
    Validation,
    /// SLI compilation failures (E200-E299)
    Compile,
    /// Rules generator failures (E300-E399)
    Generation,
    /// Output encoder failures (E400-E499)
    Encoding,
    /// Plugin discovery/invocation failures (E500-E599)
    Plugin,
}

impl ErrorCategory {
    /// Returns a human-readable name for the category.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Parse => "Parse",
            Self::Validation => "Validation",
            Self::Compile => "Compile",
            Self::Generation => "Generation",
            Self::Encoding => "Encoding",
            Self::Plugin => "Plugin",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Complete error entry with all metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Error code string (e.g., "SLOTH-E001")
    pub code: String,
    /// Error category
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Steps to remediate the error
    pub remediation: Vec<String>,
    /// Documentation URL, if available
    pub doc_url: Option<String>,
}

impl ErrorEntry {
    /// Formats the error for display with full remediation steps.
    #[must_use]
    pub fn format_full(&self) -> String {
        let mut output = format!("[{}] {}\n\n", self.code, self.message);
        if !self.remediation.is_empty() {
            output.push_str("Remediation steps:\n");
            for (i, step) in self.remediation.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }
        if let Some(url) = &self.doc_url {
            output.push_str(&format!("\nFor more information: {}\n", url));
        }
        output
    }

    /// Formats the error as a single line.
    #[must_use]
    pub fn format_brief(&self) -> String {
        format!("[{}] {}", self.code, self.message)
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_brief())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_numbers_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::all() {
            let num = code.code_number();
            assert!(seen.insert(num), "duplicate error code number: {num}");
        }
    }

    #[test]
    fn error_code_format() {
        assert_eq!(ErrorCode::ParseUnknownSpecType.code_string(), "SLOTH-E001");
        assert_eq!(
            ErrorCode::ValidationObjectiveOutOfRange.code_string(),
            "SLOTH-E100"
        );
        assert_eq!(ErrorCode::CompileUnknownPlugin.code_string(), "SLOTH-E200");
        assert_eq!(
            ErrorCode::GenerationMissingBurnRateTable.code_string(),
            "SLOTH-E300"
        );
        assert_eq!(
            ErrorCode::EncodingSerializeFailed.code_string(),
            "SLOTH-E400"
        );
        assert_eq!(ErrorCode::PluginDuplicateId.code_string(), "SLOTH-E500");
    }

    #[test]
    fn categories_match_ranges() {
        assert_eq!(
            ErrorCode::ParseUnknownSpecType.category(),
            ErrorCategory::Parse
        );
        assert_eq!(
            ErrorCode::ValidationReservedLabel.category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            ErrorCode::CompilePluginRecursion.category(),
            ErrorCategory::Compile
        );
        assert_eq!(
            ErrorCode::GenerationInternal.category(),
            ErrorCategory::Generation
        );
        assert_eq!(
            ErrorCode::EncodingUnsupportedSli.category(),
            ErrorCategory::Encoding
        );
        assert_eq!(
            ErrorCode::PluginManifestInvalid.category(),
            ErrorCategory::Plugin
        );
    }
}
