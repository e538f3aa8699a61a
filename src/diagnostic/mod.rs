pub mod ansi;
pub mod json;
pub mod registry;

use crate::ast::Span;
use crate::compiler::CompileError;
use crate::config::ConfigError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::vm::{LoadError, STARTUP_SCRIPT, VmError};

/// The source location an error points at.
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

/// A fatal error ready to show to a user. Every corvid error stops the
/// run, so there is no severity.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<&'static str>,
    pub message: String,
    pub label: Option<Label>,
    pub notes: Vec<String>,
    pub suggestion: Option<String>,
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            code: None,
            message: message.into(),
            label: None,
            notes: Vec::new(),
            suggestion: None,
            source: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_span(mut self, span: Span, label: impl Into<String>) -> Self {
        self.label = Some(Label { span, message: label.into() });
        self
    }

    /// Span of the label, if any.
    pub fn span(&self) -> Option<Span> {
        self.label.as_ref().map(|l| l.span)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// ---- From impls for the error types ----

impl From<&LexError> for Diagnostic {
    fn from(e: &LexError) -> Self {
        let span = Span { start: e.position, end: e.position + e.snippet.len().max(1) };
        let mut d = Diagnostic::error(format!("unexpected token '{}'", e.snippet))
            .with_code(e.code)
            .with_span(span, "here");
        if !e.suggestion.is_empty() {
            d = d.with_suggestion(e.suggestion.clone());
        }
        d
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(e: &ParseError) -> Self {
        Diagnostic::error(&e.message).with_code(e.code).with_span(e.span, "here")
    }
}

impl From<&CompileError> for Diagnostic {
    fn from(e: &CompileError) -> Self {
        let mut d = Diagnostic::error(e.to_string()).with_code(e.code());
        if let Some(span) = e.span() {
            d = d.with_span(span, "declared here");
        }
        if matches!(e, CompileError::NestedFunction { .. }) {
            d = d.with_suggestion("move the function out to the top level and pass values as arguments");
        }
        d
    }
}

impl From<&VmError> for Diagnostic {
    fn from(e: &VmError) -> Self {
        let d = Diagnostic::error(e.to_string()).with_code(e.code());
        match e {
            VmError::StackOverflow { .. } => d.with_note("the operand stack is full; deep or unbounded recursion is the usual cause")
                .with_suggestion("raise --stack-slots or make the recursion shallower"),
            VmError::HeapExhausted { .. } => d.with_note("the heap is a bump allocator and never frees")
                .with_suggestion("raise --heap-bytes"),
            VmError::UndefinedGlobal { .. } => d.with_suggestion("declare it with `var` or `function` before reading it"),
            VmError::CallDepth { .. } => d.with_suggestion("call the function directly instead of through `call`"),
            VmError::Startup(inner) => {
                let mut d = Diagnostic::from(inner.as_ref());
                d.message = format!("startup script: {}", d.message);
                if d.label.is_some() {
                    d = d.with_source(STARTUP_SCRIPT);
                }
                d.with_note("the built-in startup script failed; --no-startup skips it")
            }
            _ => d,
        }
    }
}

impl From<&LoadError> for Diagnostic {
    fn from(e: &LoadError) -> Self {
        match e {
            LoadError::Lex(e) => e.into(),
            LoadError::Parse(e) => e.into(),
            LoadError::Compile(e) => e.into(),
            LoadError::Vm(e) => e.into(),
            LoadError::Io { .. } => Diagnostic::error(e.to_string()),
        }
    }
}

impl From<&ConfigError> for Diagnostic {
    fn from(e: &ConfigError) -> Self {
        let d = Diagnostic::error(e.to_string());
        match e {
            ConfigError::Parse { .. } => d.with_note("known keys: stack_slots, heap_bytes, startup"),
            ConfigError::Io { .. } => d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_error_builder() {
        let d = Diagnostic::error("something went wrong");
        assert_eq!(d.message, "something went wrong");
        assert!(d.code.is_none());
        assert!(d.label.is_none());
        assert!(d.suggestion.is_none());
    }

    #[test]
    fn later_span_replaces_earlier() {
        let d = Diagnostic::error("bad token")
            .with_span(Span { start: 0, end: 1 }, "first")
            .with_span(Span { start: 5, end: 8 }, "here");
        assert_eq!(d.span(), Some(Span { start: 5, end: 8 }));
        assert_eq!(d.label.unwrap().message, "here");
    }

    #[test]
    fn from_lex_error() {
        let e = LexError { code: "CVD-L001", position: 3, snippet: "#".to_string(), suggestion: "remove it".to_string() };
        let d = Diagnostic::from(&e);
        assert_eq!(d.code, Some("CVD-L001"));
        assert!(d.message.contains('#'));
        assert_eq!(d.span(), Some(Span { start: 3, end: 4 }));
        assert_eq!(d.suggestion.as_deref(), Some("remove it"));
    }

    #[test]
    fn from_parse_error() {
        let e = ParseError { code: "CVD-P002", position: 2, span: Span { start: 10, end: 15 }, message: "expected identifier".to_string() };
        let d = Diagnostic::from(&e);
        assert_eq!(d.code, Some("CVD-P002"));
        assert_eq!(d.span(), Some(Span { start: 10, end: 15 }));
    }

    #[test]
    fn from_compile_error() {
        let e = CompileError::NestedFunction { name: "inner".to_string(), span: Span { start: 4, end: 20 } };
        let d = Diagnostic::from(&e);
        assert_eq!(d.code, Some("CVD-C001"));
        assert!(d.message.contains("inner"));
        assert!(d.suggestion.is_some());
    }

    #[test]
    fn from_vm_error_carries_code_and_hint() {
        let e = VmError::StackOverflow { requested: 1, available: 0 };
        let d = Diagnostic::from(&e);
        assert_eq!(d.code, Some("CVD-V001"));
        assert!(d.label.is_none());
        assert!(d.suggestion.as_deref().is_some_and(|s| s.contains("--stack-slots")));
    }

    #[test]
    fn startup_failure_reports_inner_code_against_startup_source() {
        let inner = LoadError::Vm(VmError::HeapExhausted { requested: 64, free: 8 });
        let d = Diagnostic::from(&VmError::Startup(Box::new(inner)));
        assert_eq!(d.code, Some("CVD-V004"));
        assert!(d.message.starts_with("startup script: heap exhausted"), "{}", d.message);
        assert!(d.notes.iter().any(|n| n.contains("--no-startup")));

        let parse = ParseError { code: "CVD-P001", position: 0, span: Span { start: 0, end: 3 }, message: "expected expression".to_string() };
        let d = Diagnostic::from(&VmError::Startup(Box::new(LoadError::Parse(parse))));
        assert_eq!(d.code, Some("CVD-P001"));
        assert_eq!(d.source.as_deref(), Some(STARTUP_SCRIPT));
    }

    #[test]
    fn from_load_error_unwraps_layer() {
        let e = LoadError::Vm(VmError::UndefinedGlobal { name: "foo".to_string() });
        let d = Diagnostic::from(&e);
        assert_eq!(d.code, Some("CVD-V014"));
        assert!(d.message.contains("foo"));
    }

    #[test]
    fn every_emitted_code_is_registered() {
        let vm_errors = [
            VmError::StackOverflow { requested: 0, available: 0 },
            VmError::StackUnderflow { requested: 0, depth: 0 },
            VmError::InvalidSlot { slot: 0, depth: 0 },
            VmError::HeapExhausted { requested: 0, free: 0 },
            VmError::Construction { reason: String::new() },
            VmError::UnsupportedOpcode { op: "x" },
            VmError::PostCondition { expected: 0, found: 0 },
            VmError::UnsupportedTag { tag: 0 },
            VmError::UnsupportedValue { bits: 0 },
            VmError::MalformedUnit { name: String::new() },
            VmError::InvalidHeapAccess { addr: 0, len: 0 },
            VmError::TypeError { op: "x", found: "y" },
            VmError::NotCallable { found: "x" },
            VmError::UndefinedGlobal { name: String::new() },
            VmError::UnknownFunction { id: 0 },
            VmError::CallDepth { limit: 0 },
        ];
        let mut codes: Vec<&str> = vm_errors.iter().map(VmError::code).collect();
        codes.extend(["CVD-L001", "CVD-P001", "CVD-P002", "CVD-P003", "CVD-P004", "CVD-C001", "CVD-C002", "CVD-C003"]);
        for code in &codes {
            assert!(registry::lookup(code).is_some(), "{code} missing from registry");
        }
        let mut unique = codes.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
    }
}
