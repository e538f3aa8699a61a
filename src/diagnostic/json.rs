//! One-line JSON form of a [`Diagnostic`], for `--json`.

use serde::Serialize;

use super::{Diagnostic, Label, registry};
use crate::ast::SourceMap;

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    /// Registry one-liner for `code`.
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'static str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<JsonLabel<'a>>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    notes: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonLabel<'a> {
    start: usize,
    end: usize,
    message: &'a str,
    // 1-based, present when the diagnostic carries its source
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    col: Option<usize>,
}

impl<'a> JsonLabel<'a> {
    fn new(label: &'a Label, source: Option<&str>) -> Self {
        let position = source.map(|src| SourceMap::new(src).lookup(label.span.start));
        JsonLabel {
            start: label.span.start,
            end: label.span.end,
            message: &label.message,
            line: position.map(|(line, _)| line),
            col: position.map(|(_, col)| col),
        }
    }
}

pub fn render(d: &Diagnostic) -> String {
    let out = JsonDiagnostic {
        code: d.code,
        summary: d.code.and_then(registry::lookup).map(|e| e.short),
        message: &d.message,
        label: d.label.as_ref().map(|l| JsonLabel::new(l, d.source.as_deref())),
        notes: &d.notes,
        suggestion: d.suggestion.as_deref(),
    };
    serde_json::to_string(&out)
        .unwrap_or_else(|e| serde_json::json!({ "message": format!("cannot serialize diagnostic: {e}") }).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;

    fn parse_json(s: &str) -> serde_json::Value {
        serde_json::from_str(s).expect("valid JSON")
    }

    #[test]
    fn bare_error_has_only_a_message() {
        let v = parse_json(&render(&Diagnostic::error("stack overflow")));
        assert_eq!(v, serde_json::json!({ "message": "stack overflow" }));
    }

    #[test]
    fn code_and_registry_summary() {
        let v = parse_json(&render(&Diagnostic::error("heap exhausted").with_code("CVD-V004")));
        assert_eq!(v["code"], "CVD-V004");
        assert_eq!(v["summary"], "heap exhausted");
        let v = parse_json(&render(&Diagnostic::error("x").with_code("CVD-Z000")));
        assert_eq!(v["code"], "CVD-Z000");
        assert!(v.get("summary").is_none());
    }

    #[test]
    fn label_gets_line_and_col_from_source() {
        let d = Diagnostic::error("bad token")
            .with_span(Span { start: 13, end: 14 }, "here")
            .with_source("var a = 1;\nb = #;".to_string());
        let v = parse_json(&render(&d));
        let label = &v["label"];
        assert_eq!(label["start"], 13);
        assert_eq!(label["end"], 14);
        assert_eq!(label["message"], "here");
        assert_eq!(label["line"], 2);
        assert_eq!(label["col"], 3);
    }

    #[test]
    fn label_without_source_has_no_position() {
        let d = Diagnostic::error("bad").with_span(Span { start: 5, end: 8 }, "here");
        let v = parse_json(&render(&d));
        assert_eq!(v["label"]["start"], 5);
        assert!(v["label"].get("line").is_none());
    }

    #[test]
    fn notes_and_suggestion() {
        let d = Diagnostic::error("stack overflow").with_note("first").with_note("second").with_suggestion("raise --stack-slots");
        let v = parse_json(&render(&d));
        assert_eq!(v["notes"], serde_json::json!(["first", "second"]));
        assert_eq!(v["suggestion"], "raise --stack-slots");
    }
}
