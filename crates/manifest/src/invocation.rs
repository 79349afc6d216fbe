//! Symbolic function-call tokens embedded in attribute values.
//!
//! A token has the form `@NAME(arg, ...).path.suffix`, for example
//! `@UC_MANIFEST_ID("col1").id` or `@FILE("./manifest_values/fn.js")`.
//! `NAME` is upper case, arguments are string, bool or number literals, and
//! the path suffix is a possibly empty list of dot-prefixed segments.
//!
//! A string is treated as a token only when it starts with `@`, a name and
//! an opening parenthesis. Anything else is a plain literal. Candidates that
//! then fail to parse are errors rather than literals, so a typo in a
//! manifest never silently turns into a string value.

use std::fmt;
use thiserror::Error;

/// Resolves to a reference to another manifest entry's block.
pub const MANIFEST_ID_FUNCTION: &str = "UC_MANIFEST_ID";
/// Resolves to the identifier of a system-owned object.
pub const SYSTEM_OBJECT_FUNCTION: &str = "UC_SYSTEM_OBJECT";
/// Resolves to the contents of a file.
pub const FILE_FUNCTION: &str = "FILE";

/// Literal argument of a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// Parsed `@NAME(args).path` token.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<Arg>,
    pub path: Vec<String>,
}

/// Token looked like a function call but is malformed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid function call {input:?} at offset {offset}: {message}")]
pub struct InvocationError {
    pub input: String,
    pub offset: usize,
    pub message: String,
}

impl Invocation {
    pub fn new(name: &str, args: Vec<Arg>, path: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            args,
            path: path.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// `@UC_MANIFEST_ID("<id>").id`
    pub fn manifest_id(manifest_id: &str) -> Self {
        Self::new(
            MANIFEST_ID_FUNCTION,
            vec![Arg::Str(manifest_id.to_string())],
            &["id"],
        )
    }

    /// `@UC_SYSTEM_OBJECT("<type>", "<name>")`
    pub fn system_object(type_tag: &str, name: &str) -> Self {
        Self::new(
            SYSTEM_OBJECT_FUNCTION,
            vec![Arg::Str(type_tag.to_string()), Arg::Str(name.to_string())],
            &[],
        )
    }

    /// `@FILE("<path>")`
    pub fn file(path: &str) -> Self {
        Self::new(FILE_FUNCTION, vec![Arg::Str(path.to_string())], &[])
    }

    /// Parse `input` if it is a function-call candidate.
    ///
    /// Returns `None` for plain literals.
    pub fn detect(input: &str) -> Option<Result<Self, InvocationError>> {
        if !is_candidate(input) {
            return None;
        }
        Some(Self::parse(input))
    }

    /// Parse a token, failing on anything that is not a well-formed call.
    pub fn parse(input: &str) -> Result<Self, InvocationError> {
        Scanner::new(input).invocation()
    }

    /// String argument at `index`, if present and a string.
    pub fn str_arg(&self, index: usize) -> Option<&str> {
        match self.args.get(index) {
            Some(Arg::Str(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Arg::Bool(b) => write!(f, "{b}"),
            Arg::Int(i) => write!(f, "{i}"),
            // Debug keeps the fractional part, so 1.0 does not read back as an int
            Arg::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")?;
        for segment in &self.path {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_uppercase() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_candidate(input: &str) -> bool {
    let Some(rest) = input.strip_prefix('@') else {
        return false;
    };
    rest.chars().next().is_some_and(is_name_start)
        && rest.trim_start_matches(is_name_char).starts_with('(')
}

/// Recursive-descent scanner over the token text.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), InvocationError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}'")))
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn error(&self, message: impl Into<String>) -> InvocationError {
        InvocationError {
            input: self.input.to_string(),
            offset: self.pos,
            message: message.into(),
        }
    }

    fn invocation(&mut self) -> Result<Invocation, InvocationError> {
        self.expect('@')?;
        if !self.peek().is_some_and(is_name_start) {
            return Err(self.error("expected function name"));
        }
        let name = self.take_while(is_name_char).to_string();
        self.expect('(')?;
        let args = self.args()?;
        let path = self.path()?;
        if self.pos < self.input.len() {
            return Err(self.error("unexpected trailing characters"));
        }
        Ok(Invocation { name, args, path })
    }

    fn args(&mut self) -> Result<Vec<Arg>, InvocationError> {
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.eat(')') {
            return Ok(args);
        }
        loop {
            self.skip_whitespace();
            args.push(self.arg()?);
            self.skip_whitespace();
            if self.eat(')') {
                return Ok(args);
            }
            self.expect(',')?;
        }
    }

    fn arg(&mut self) -> Result<Arg, InvocationError> {
        match self.peek() {
            Some('"') => self.string().map(Arg::Str),
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.pos;
                match self.take_while(|c| c.is_ascii_alphanumeric()) {
                    "true" => Ok(Arg::Bool(true)),
                    "false" => Ok(Arg::Bool(false)),
                    word => {
                        let word = word.to_string();
                        self.pos = start;
                        Err(self.error(format!("unexpected argument {word:?}")))
                    }
                }
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(_) => Err(self.error("expected argument")),
            None => Err(self.error("unterminated argument list")),
        }
    }

    fn string(&mut self) -> Result<String, InvocationError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn number(&mut self) -> Result<Arg, InvocationError> {
        let start = self.pos;
        let text =
            self.take_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Arg::Int(i));
        }
        if let Ok(x) = text.parse::<f64>() {
            return Ok(Arg::Float(x));
        }
        let text = text.to_string();
        self.pos = start;
        Err(self.error(format!("invalid number {text:?}")))
    }

    fn path(&mut self) -> Result<Vec<String>, InvocationError> {
        let mut path = Vec::new();
        while self.eat('.') {
            let segment = self.take_while(is_segment_char);
            if segment.is_empty() {
                return Err(self.error("empty path segment"));
            }
            path.push(segment.to_string());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_id() {
        let invocation = Invocation::parse(r#"@UC_MANIFEST_ID("examplecol").id"#).unwrap();
        assert_eq!(invocation, Invocation::manifest_id("examplecol"));
    }

    #[test]
    fn test_parse_multiple_args_and_literals() {
        let invocation =
            Invocation::parse(r#"@UC_SYSTEM_OBJECT( "userstore_column" ,"syscol", true, -3, 1.5)"#)
                .unwrap();
        assert_eq!(invocation.name, SYSTEM_OBJECT_FUNCTION);
        assert_eq!(
            invocation.args,
            vec![
                Arg::Str("userstore_column".into()),
                Arg::Str("syscol".into()),
                Arg::Bool(true),
                Arg::Int(-3),
                Arg::Float(1.5),
            ]
        );
        assert!(invocation.path.is_empty());
    }

    #[test]
    fn test_parse_no_args_and_long_suffix() {
        let invocation = Invocation::parse("@NOW().a.b-c.d_1").unwrap();
        assert!(invocation.args.is_empty());
        assert_eq!(invocation.path, vec!["a", "b-c", "d_1"]);
    }

    #[test]
    fn test_string_escapes() {
        let invocation = Invocation::parse(r#"@FILE("a \"quoted\" \\ path")"#).unwrap();
        assert_eq!(invocation.str_arg(0), Some(r#"a "quoted" \ path"#));
    }

    #[test]
    fn test_display_round_trips() {
        for token in [
            r#"@UC_MANIFEST_ID("examplecol").id"#,
            r#"@UC_SYSTEM_OBJECT("access_policy", "AllowAll")"#,
            r#"@FILE("./manifest_values/transformer_upper_function.js")"#,
            r#"@FN("a \"b\"", false, 42, 1.0).x.y"#,
        ] {
            let invocation = Invocation::parse(token).unwrap();
            assert_eq!(invocation.to_string(), token);
            assert_eq!(Invocation::parse(&invocation.to_string()).unwrap(), invocation);
        }
    }

    #[test]
    fn test_detect_ignores_plain_literals() {
        for literal in [
            "hello",
            "user@example.com",
            "@mention",
            "@lower(1)",
            "@UC_MANIFEST_ID",
            "",
            "{id} = ?",
        ] {
            assert!(Invocation::detect(literal).is_none(), "{literal}");
        }
    }

    #[test]
    fn test_detect_rejects_malformed_candidates() {
        for bad in [
            r#"@UC_MANIFEST_ID("col1""#,
            r#"@UC_MANIFEST_ID("col1").id extra"#,
            r#"@UC_MANIFEST_ID("col1")."#,
            r#"@UC_MANIFEST_ID(col1)"#,
            r#"@UC_MANIFEST_ID("a" "b")"#,
            r#"@UC_MANIFEST_ID(1.2.3)"#,
        ] {
            let result = Invocation::detect(bad).unwrap();
            assert!(result.is_err(), "{bad}");
        }
    }

    #[test]
    fn test_error_reports_offset() {
        let err = Invocation::parse(r#"@FILE("x")?"#).unwrap_err();
        assert_eq!(err.offset, 10);
        assert!(err.to_string().contains("trailing"));
    }
}
