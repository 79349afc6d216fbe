//! Minimal HCL writer.
//!
//! Covers what generated Terraform configuration needs: blocks with quoted
//! labels, attributes, and literal, tuple, object and traversal expressions.
//! Output follows `terraform fmt` layout: two-space indentation, and the `=`
//! of consecutive single-line attributes aligned. A multi-line value ends the
//! aligned run.

use serde_json::Number;

/// Object key.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Bare identifier, e.g. `source`
    Ident(String),
    /// Quoted string, e.g. `"name"`
    Quoted(String),
}

/// HCL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Dotted reference such as `userclouds_transformer.manifestid-x.id`
    Traversal(Vec<String>),
    Tuple(Vec<Expr>),
    Object(Vec<(Key, Expr)>),
}

impl Expr {
    /// Render with `indent` as the indentation of the line the expression
    /// starts on.
    pub fn render(&self, indent: usize) -> String {
        match self {
            Expr::Null => "null".to_string(),
            Expr::Bool(b) => b.to_string(),
            Expr::Number(n) => n.to_string(),
            Expr::String(s) => quote(s),
            Expr::Traversal(parts) => parts.join("."),
            Expr::Tuple(items) => {
                let items: Vec<String> = items.iter().map(|item| item.render(indent)).collect();
                format!("[{}]", items.join(", "))
            }
            Expr::Object(entries) if entries.is_empty() => "{}".to_string(),
            Expr::Object(entries) => {
                let mut out = String::from("{\n");
                let rendered: Vec<(String, &Expr)> = entries
                    .iter()
                    .map(|(key, value)| (key.render(), value))
                    .collect();
                write_assignments(&mut out, &rendered, indent + 2);
                out.push_str(&pad(indent));
                out.push('}');
                out
            }
        }
    }
}

impl Key {
    fn render(&self) -> String {
        match self {
            Key::Ident(name) => name.clone(),
            Key::Quoted(name) => quote(name),
        }
    }
}

/// Block such as `resource "type" "name" { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: String,
    pub labels: Vec<String>,
    pub body: Body,
}

impl Block {
    pub fn new(kind: &str, labels: &[&str]) -> Self {
        Self {
            kind: kind.to_string(),
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            body: Body::default(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: Expr) -> Self {
        self.body.attribute(name, value);
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.body.block(block);
        self
    }

    fn write(&self, out: &mut String, indent: usize) {
        out.push_str(&pad(indent));
        out.push_str(&self.kind);
        for label in &self.labels {
            out.push(' ');
            out.push_str(&quote(label));
        }
        out.push_str(" {\n");
        self.body.write(out, indent + 2);
        out.push_str(&pad(indent));
        out.push_str("}\n");
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Attribute(String, Expr),
    Block(Block),
    Blank,
}

/// Sequence of attributes, blocks and blank lines; also the top level of a
/// file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    items: Vec<Item>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&mut self, name: &str, value: Expr) -> &mut Self {
        self.items.push(Item::Attribute(name.to_string(), value));
        self
    }

    pub fn block(&mut self, block: Block) -> &mut Self {
        self.items.push(Item::Block(block));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.items.push(Item::Blank);
        self
    }

    /// Render as a top-level file.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, 0);
        out
    }

    fn write(&self, out: &mut String, indent: usize) {
        let mut run: Vec<(String, &Expr)> = Vec::new();
        for item in &self.items {
            match item {
                Item::Attribute(name, value) => run.push((name.clone(), value)),
                Item::Block(block) => {
                    write_assignments(out, &run, indent);
                    run.clear();
                    block.write(out, indent);
                }
                Item::Blank => {
                    write_assignments(out, &run, indent);
                    run.clear();
                    out.push('\n');
                }
            }
        }
        write_assignments(out, &run, indent);
    }
}

/// Write `key = value` lines, aligning runs of single-line values.
fn write_assignments(out: &mut String, entries: &[(String, &Expr)], indent: usize) {
    let rendered: Vec<(&str, String)> = entries
        .iter()
        .map(|(key, value)| (key.as_str(), value.render(indent)))
        .collect();

    let mut start = 0;
    while start < rendered.len() {
        let (key, value) = &rendered[start];
        if value.contains('\n') {
            out.push_str(&format!("{}{key} = {value}\n", pad(indent)));
            start += 1;
            continue;
        }
        let end = rendered[start..]
            .iter()
            .position(|(_, v)| v.contains('\n'))
            .map_or(rendered.len(), |offset| start + offset);
        let width = rendered[start..end]
            .iter()
            .map(|(k, _)| k.chars().count())
            .max()
            .unwrap_or(0);
        for (key, value) in &rendered[start..end] {
            out.push_str(&format!("{}{key:<width$} = {value}\n", pad(indent)));
        }
        start = end;
    }
}

fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

/// Quote a string literal, escaping template sequences.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(s: &str) -> Expr {
        Expr::String(s.to_string())
    }

    fn quoted_object(entries: &[(&str, Expr)]) -> Expr {
        Expr::Object(
            entries
                .iter()
                .map(|(k, v)| (Key::Quoted((*k).to_string()), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_literals() {
        assert_eq!(Expr::Null.render(0), "null");
        assert_eq!(Expr::Bool(true).render(0), "true");
        assert_eq!(Expr::Number((-42).into()).render(0), "-42");
        assert_eq!(
            Expr::Number(Number::from_f64(1.23).unwrap()).render(0),
            "1.23"
        );
    }

    #[test]
    fn test_string_escapes_templates() {
        assert_eq!(
            string("function hi() { return `${\"hello\"}`; }").render(0),
            "\"function hi() { return `$${\\\"hello\\\"}`; }\""
        );
        assert_eq!(string("a\nb\t%{x}").render(0), "\"a\\nb\\t%%{x}\"");
        assert_eq!(string("$5 and 100%").render(0), "\"$5 and 100%\"");
        assert_eq!(quote("bell\u{7}"), "\"bell\\u0007\"");
    }

    #[test]
    fn test_object() {
        let object = quoted_object(&[
            ("a", string("hello")),
            ("b", Expr::Number(2.into())),
            ("c", Expr::Bool(false)),
        ]);
        assert_eq!(
            object.render(0),
            "{\n  \"a\" = \"hello\"\n  \"b\" = 2\n  \"c\" = false\n}"
        );
    }

    #[test]
    fn test_tuples() {
        let ints = Expr::Tuple((1..=3).map(|i| Expr::Number(i.into())).collect());
        assert_eq!(ints.render(0), "[1, 2, 3]");

        let objects = Expr::Tuple(vec![quoted_object(&[("a", string("hi"))])]);
        assert_eq!(objects.render(0), "[{\n  \"a\" = \"hi\"\n}]");

        assert_eq!(Expr::Tuple(Vec::new()).render(0), "[]");
        assert_eq!(Expr::Object(Vec::new()).render(0), "{}");
    }

    #[test]
    fn test_alignment_breaks_at_multiline_values() {
        let block = Block::new("resource", &["userclouds_userstore_accessor", "manifestid-a"])
            .with_attribute("id", string("x"))
            .with_attribute(
                "columns",
                Expr::Tuple(vec![quoted_object(&[
                    ("column", Expr::Traversal(vec!["a".into(), "b".into()])),
                    ("transformer", Expr::Null),
                ])]),
            )
            .with_attribute("name", string("GetEmail"))
            .with_attribute("description", string(""));

        let mut body = Body::new();
        body.block(block);
        assert_eq!(
            body.render(),
            r#"resource "userclouds_userstore_accessor" "manifestid-a" {
  id = "x"
  columns = [{
    "column"      = a.b
    "transformer" = null
  }]
  name        = "GetEmail"
  description = ""
}
"#
        );
    }

    #[test]
    fn test_empty_block() {
        let mut body = Body::new();
        body.block(Block::new("provider", &["userclouds"])).blank();
        assert_eq!(body.render(), "provider \"userclouds\" {\n}\n\n");
    }

    #[test]
    fn test_nested_blocks_with_bare_keys() {
        let mut body = Body::new();
        body.block(Block::new("terraform", &[]).with_block(
            Block::new("required_providers", &[]).with_attribute(
                "userclouds",
                Expr::Object(vec![
                    (Key::Ident("source".into()), string("userclouds/userclouds")),
                    (Key::Ident("version".into()), string(">= 0.1.8")),
                ]),
            ),
        ));
        assert_eq!(
            body.render(),
            r#"terraform {
  required_providers {
    userclouds = {
      source  = "userclouds/userclouds"
      version = ">= 0.1.8"
    }
  }
}
"#
        );
    }
}
