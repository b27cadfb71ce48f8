//! SLO document loaders and dialect dispatch.

pub mod kubernetes;
pub mod native;
pub mod openslo;

use regex::Regex;
use std::sync::OnceLock;

use crate::errors::ParseError;
use crate::model::SloGroup;

fn document_separator() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^---\s*$").expect("static pattern"))
}

/// Splits a multi-document YAML stream on `---` separator lines, routing
/// each sub-document independently; skips empty leading/trailing documents.
pub fn split_documents(content: &str) -> Vec<&str> {
    document_separator()
        .split(content)
        .map(|doc| doc.trim())
        .filter(|doc| !doc.is_empty())
        .collect()
}

/// Tries each loader's `matches` pre-check in a fixed order, first match
/// wins, then fully parses with that loader.
pub fn load(path: &str, document: &str) -> Result<SloGroup, ParseError> {
    load_with_default_window(path, document, native::DEFAULT_TIME_WINDOW_DAYS)
}

/// [`load`], defaulting any native/Kubernetes-dialect SLO that omits
/// `timeWindow` to `default_window_days`; the OpenSLO dialect always
/// requires an explicit window, so this has no effect there.
pub fn load_with_default_window(
    path: &str,
    document: &str,
    default_window_days: u32,
) -> Result<SloGroup, ParseError> {
    if kubernetes::matches(document) {
        return kubernetes::load_with_default_window(path, document, default_window_days);
    }
    if native::matches(document) {
        return native::load_with_default_window(path, document, default_window_days);
    }
    if openslo::matches(document) {
        return openslo::load(path, document);
    }
    Err(ParseError::UnknownSpecType {
        path: path.to_string(),
    })
}

/// Loads every `---`-separated sub-document in `content`, routing each
/// independently and aggregating their SLOs into groups keyed by document
/// order (callers that want a single flattened group should merge the
/// results themselves; this function does not assume every sub-document
/// shares one service).
pub fn load_all(path: &str, content: &str) -> Result<Vec<SloGroup>, ParseError> {
    load_all_with_default_window(path, content, native::DEFAULT_TIME_WINDOW_DAYS)
}

/// [`load_all`], defaulting any SLO that omits `timeWindow` to
/// `default_window_days`.
pub fn load_all_with_default_window(
    path: &str,
    content: &str,
    default_window_days: u32,
) -> Result<Vec<SloGroup>, ParseError> {
    split_documents(content)
        .into_iter()
        .map(|doc| load_with_default_window(path, doc, default_window_days))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_document_is_rejected() {
        let err = load("x.yaml", "apiVersion: other/v1\nkind: Unknown").unwrap_err();
        assert!(matches!(err, ParseError::UnknownSpecType { .. }));
    }

    #[test]
    fn split_documents_drops_empty_parts() {
        let content = "---\nfoo: 1\n---\nbar: 2\n";
        let docs = split_documents(content);
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn kubernetes_takes_priority_over_native_when_both_markers_present() {
        let doc = r#"
apiVersion: sloth.slok.dev/v1
kind: PrometheusServiceLevel
metadata:
  name: "x"
spec:
  service: "svc"
  slos:
    - name: "a"
      objective: 99.9
      sli:
        raw:
          errorRatioQuery: sum(rate(e[{{.window}}]))/sum(rate(t[{{.window}}]))
"#;
        assert!(kubernetes::matches(doc));
        let group = load("x.yaml", doc).unwrap();
        assert!(group.k8s_meta.is_some());
    }
}
