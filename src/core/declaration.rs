//! core::declaration
//!
//! Reading the namespace declaration from a source file header.
//!
//! # Header Grammar
//!
//! Only the file header is inspected. Before the `package` line a file may
//! contain:
//! - blank lines
//! - `//` line comments and `/* ... */` block comments (nested, as Kotlin
//!   allows)
//! - a `#!` shebang on the first line (Kotlin scripts)
//! - file annotations (`@file:JvmName("Utils")`), whose arguments may span
//!   several lines
//!
//! The first other line must be `package <name>`, optionally terminated by
//! `;` (Java). Anything else, such as an `import` or a class, means the file
//! lives in the default package and has no namespace.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::NamespacePath;

static PACKAGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^package\s+(?P<name>[^;]+?)\s*;?\s*$").expect("package regex is valid")
});

/// Extract the declared namespace of `source`.
///
/// Returns `None` when the file has no `package` line or the declared name
/// is malformed (the latter is logged).
///
/// # Example
///
/// ```
/// use flatlayout::core::declaration::read_namespace;
///
/// let source = "// Copyright\n@file:JvmName(\"Foo\")\n\npackage ch.frankel.blog\n\nclass Foo\n";
/// assert_eq!(read_namespace(source, '.').unwrap().to_string(), "ch.frankel.blog");
///
/// assert!(read_namespace("class Foo\n", '.').is_none());
/// ```
pub fn read_namespace(source: &str, delimiter: char) -> Option<NamespacePath> {
    let mut comment_depth = 0usize;
    // Unclosed parentheses of the current file annotation.
    let mut annotation_depth = 0usize;

    for (index, raw_line) in source.lines().enumerate() {
        if index == 0 && raw_line.starts_with("#!") {
            continue;
        }

        let line = strip_comments(raw_line, &mut comment_depth);
        let line = line.trim();
        if annotation_depth > 0 {
            annotation_depth = track_parens(line, annotation_depth);
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if line.starts_with("@file:") {
            annotation_depth = track_parens(line, 0);
            continue;
        }

        let captures = PACKAGE_LINE.captures(line)?;
        let name = unquote(&captures["name"]);

        return match NamespacePath::parse(&name, delimiter) {
            Ok(path) if !path.is_empty() => Some(path),
            Ok(_) => None,
            Err(e) => {
                log::warn!("ignoring malformed package declaration '{name}': {e}");
                None
            }
        };
    }

    None
}

/// Drop backticks and the whitespace outside them.
///
/// Whitespace inside a quoted segment is kept so that validation rejects
/// the name instead of silently joining the words.
fn unquote(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut quoted = false;
    for c in name.chars() {
        match c {
            '`' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {}
            c => out.push(c),
        }
    }
    out
}

/// Update the open-parenthesis count with one line, ignoring string literals.
fn track_parens(line: &str, mut depth: usize) -> usize {
    let mut in_string = false;
    let mut escaped = false;
    for c in line.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

/// Remove comment text from one line, tracking block comment nesting
/// across lines in `depth`.
fn strip_comments(line: &str, depth: &mut usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('/', Some('*')) => {
                chars.next();
                *depth += 1;
            }
            ('*', Some('/')) if *depth > 0 => {
                chars.next();
                *depth -= 1;
            }
            ('/', Some('/')) if *depth == 0 => break,
            _ if *depth > 0 => {}
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(source: &str) -> Option<String> {
        read_namespace(source, '.').map(|ns| ns.to_string())
    }

    #[test]
    fn plain_kotlin_package() {
        assert_eq!(
            read("package ch.frankel.blog.foo\n\nclass Foo\n").as_deref(),
            Some("ch.frankel.blog.foo")
        );
    }

    #[test]
    fn indented_header() {
        let source = "\n            package ch.frankel.blog\n\n            class Foo\n";
        assert_eq!(read(source).as_deref(), Some("ch.frankel.blog"));
    }

    #[test]
    fn java_semicolon() {
        assert_eq!(
            read("package com.example.app;\n\npublic class App {}\n").as_deref(),
            Some("com.example.app")
        );
    }

    #[test]
    fn skips_license_block_and_annotations() {
        let source = "/*\n * Licensed under MIT\n * package not.this.one\n */\n\
                      @file:JvmName(\"Utils\")\n\
                      package com.example // trailing comment\n";
        assert_eq!(read(source).as_deref(), Some("com.example"));
    }

    #[test]
    fn nested_block_comments() {
        let source = "/* outer /* inner */ still comment package x */\npackage a.b\n";
        assert_eq!(read(source).as_deref(), Some("a.b"));
    }

    #[test]
    fn shebang_script() {
        let source = "#!/usr/bin/env kotlin\npackage scripts.tools\n";
        assert_eq!(read(source).as_deref(), Some("scripts.tools"));
    }

    #[test]
    fn backticked_segments() {
        assert_eq!(read("package a.`in`.b\n").as_deref(), Some("a.in.b"));
    }

    #[test]
    fn multi_line_file_annotation() {
        let source = "@file:Suppress(\n    \"UNUSED\",\n    \"unclosed ( in string\"\n)\n\
                      @file:JvmName(\"Utils\")\n\
                      package com.example.util\n";
        assert_eq!(read(source).as_deref(), Some("com.example.util"));
    }

    #[test]
    fn whitespace_inside_backticks_is_rejected() {
        assert_eq!(read("package a.`my pkg`.b\n"), None);
        assert_eq!(read("package a . b\n").as_deref(), Some("a.b"));
    }

    #[test]
    fn default_package() {
        assert_eq!(read("import kotlin.math.max\n\nfun main() {}\n"), None);
        assert_eq!(read(""), None);
        assert_eq!(read("// only a comment\n"), None);
    }

    #[test]
    fn package_after_code_is_ignored() {
        assert_eq!(read("class Foo\npackage a.b\n"), None);
    }

    #[test]
    fn malformed_name() {
        assert_eq!(read("package a..b\n"), None);
    }

    #[test]
    fn packaged_identifier_is_not_keyword() {
        assert_eq!(read("packaged.thing\n"), None);
    }
}
