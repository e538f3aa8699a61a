//! Terminal form of a [`Diagnostic`]: heading, source snippet with carets,
//! then `=` lines for notes, the suggestion and the `--explain` hint.

use std::fmt::Write;

use super::{Diagnostic, Label, registry};
use crate::ast::SourceMap;

const RED: &str = "1;31";
const BOLD: &str = "1";
const CYAN: &str = "36";
const DIM: &str = "2";

pub struct AnsiRenderer {
    pub use_color: bool,
}

impl AnsiRenderer {
    fn paint(&self, style: &str, s: &str) -> String {
        if self.use_color { format!("\x1b[{style}m{s}\x1b[0m") } else { s.to_string() }
    }

    pub fn render(&self, d: &Diagnostic) -> String {
        let mut out = String::new();
        let heading = match d.code {
            Some(code) => format!("error[{code}]"),
            None => "error".to_string(),
        };
        let _ = writeln!(out, "{}: {}", self.paint(RED, &heading), self.paint(BOLD, &d.message));

        if let (Some(label), Some(source)) = (&d.label, &d.source) {
            self.snippet(&mut out, label, source);
        }

        let eq = self.paint(DIM, "=");
        for note in &d.notes {
            let _ = writeln!(out, "  {eq} note: {note}");
        }
        if let Some(suggestion) = &d.suggestion {
            let _ = writeln!(out, "  {eq} suggestion: {suggestion}");
        }
        if let Some(code) = d.code.filter(|c| registry::lookup(c).is_some()) {
            let _ = writeln!(out, "  {eq} run `corvid --explain {code}` for details");
        }
        out
    }

    //   --> 2:7
    //   |
    // 2 | print(b);
    //   |       ^ here
    //   |
    fn snippet(&self, out: &mut String, label: &Label, source: &str) {
        let map = SourceMap::new(source);
        let (line, col) = map.lookup(label.span.start);
        let width = line.to_string().len();
        let pad = " ".repeat(width);
        let bar = self.paint(CYAN, "|");

        let _ = writeln!(out, "{pad}{} {line}:{col}", self.paint(CYAN, "-->"));
        let _ = writeln!(out, "{pad} {bar}");
        let _ = writeln!(out, "{} {bar} {}", self.paint(CYAN, &line.to_string()), map.line_text(source, line));

        let carets = "^".repeat(label.span.end.saturating_sub(label.span.start).max(1));
        let marker = if label.message.is_empty() { carets } else { format!("{carets} {}", label.message) };
        let _ = writeln!(out, "{pad} {bar} {}{}", " ".repeat(col - 1), self.paint(RED, &marker));
        let _ = writeln!(out, "{pad} {bar}");
    }
}
