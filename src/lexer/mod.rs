use logos::Logos;

use crate::ast::Span;

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip(r"//[^\n]*", allow_greedy = true))]
pub enum Token {
    // Keywords
    #[token("var")]
    Var,
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("=")]
    Assign,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEq,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),
}

fn unescape(quoted: &str) -> Option<String> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        out.push(match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '"' => '"',
            '\\' => '\\',
            _ => return None,
        });
    }
    Some(out)
}

/// Lex source code into a stream of tokens with positions.
pub fn lex(source: &str) -> Result<Vec<(Token, Span)>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        match result {
            Ok(token) => tokens.push((token, Span { start: range.start, end: range.end })),
            Err(()) => {
                let snippet = source[range.clone()].to_string();
                return Err(LexError {
                    code: "CVD-L001",
                    position: range.start,
                    suggestion: suggest_fix(&snippet),
                    snippet,
                });
            }
        }
    }

    Ok(tokens)
}

fn suggest_fix(bad: &str) -> String {
    if bad.starts_with('"') {
        "Close the string on the same line; supported escapes are \\n \\t \\r \\0 \\\" \\\\".to_string()
    } else if bad.starts_with(|c: char| c.is_ascii_digit()) {
        "Integer literals must fit in 64 bits; write large numbers with a decimal point".to_string()
    } else if bad == "&" || bad == "|" {
        "Logical operators are not supported; use nested if statements".to_string()
    } else {
        format!("Unexpected character(s): '{bad}'")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Lex error at position {position}: '{snippet}'. {suggestion}")]
pub struct LexError {
    pub code: &'static str,
    pub position: usize,
    pub snippet: String,
    pub suggestion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn lex_function_declaration() {
        let toks = kinds("function add(a, b) { return a + b; }");
        assert_eq!(toks[0], Token::Function);
        assert_eq!(toks[1], Token::Ident("add".into()));
        assert_eq!(toks[2], Token::LParen);
        assert!(toks.contains(&Token::Return));
        assert!(toks.contains(&Token::Plus));
        assert_eq!(toks.last(), Some(&Token::RBrace));
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(kinds("42"), vec![Token::Int(42)]);
        assert_eq!(kinds("2.5"), vec![Token::Float(2.5)]);
        assert_eq!(kinds("1e3"), vec![Token::Float(1000.0)]);
    }

    #[test]
    fn lex_two_char_operators() {
        assert_eq!(
            kinds("<= >= == != < > = !"),
            vec![
                Token::LessEq,
                Token::GreaterEq,
                Token::EqEq,
                Token::NotEq,
                Token::Less,
                Token::Greater,
                Token::Assign,
                Token::Bang
            ]
        );
    }

    #[test]
    fn lex_string_escapes() {
        assert_eq!(kinds(r#""a\n\"b\"""#), vec![Token::Str("a\n\"b\"".into())]);
    }

    #[test]
    fn keywords_are_not_identifiers() {
        assert_eq!(kinds("var variable"), vec![Token::Var, Token::Ident("variable".into())]);
    }

    #[test]
    fn comments_and_newlines_skipped() {
        let toks = kinds("// header\nvar x = 1; // trailing\n");
        assert_eq!(toks, vec![Token::Var, Token::Ident("x".into()), Token::Assign, Token::Int(1), Token::Semi]);
    }

    #[test]
    fn spans_are_byte_ranges() {
        let toks = lex("var  xy").unwrap();
        assert_eq!(toks[1].1, Span { start: 5, end: 7 });
    }

    #[test]
    fn bad_character_reports_position() {
        let err = lex("var x = 1 # 2").unwrap_err();
        assert_eq!(err.code, "CVD-L001");
        assert_eq!(err.position, 10);
        assert_eq!(err.snippet, "#");
    }

    #[test]
    fn unterminated_string_suggests_closing() {
        let err = lex("\"abc").unwrap_err();
        assert!(err.suggestion.contains("Close the string"), "{}", err.suggestion);
    }
}
