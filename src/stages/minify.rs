//! Output compaction
//!
//! Stylesheets are minified with lightningcss. JavaScript is only compacted:
//! whole-line `//` comments, blank lines and indentation are dropped, and
//! every other line is kept as written. Lines that continue a multi-line
//! template literal are kept untouched, since their whitespace is part of
//! the string. Quoted strings are not tracked, so a backtick inside a `'` or
//! `"` string can throw the template tracking off.

use std::path::Path;

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};

use crate::pipeline::StageError;

/// Compacts a JavaScript bundle line by line
pub fn compact_js(source: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(source.len());
    let mut in_template = false;

    for line in source.split(|byte| *byte == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if in_template {
            out.extend_from_slice(line);
            out.push(b'\n');
        } else {
            let trimmed = line.trim_ascii();
            if !trimmed.is_empty() && !trimmed.starts_with(b"//") {
                out.extend_from_slice(trimmed);
                out.push(b'\n');
            }
        }

        if opens_or_closes_template(line) {
            in_template = !in_template;
        }
    }
    out
}

/// Returns true if the line has an odd number of unescaped backticks
fn opens_or_closes_template(line: &[u8]) -> bool {
    let mut count = 0;
    let mut escaped = false;
    for &byte in line {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' => escaped = true,
            b'`' => count += 1,
            _ => {}
        }
    }
    count % 2 == 1
}

/// Minifies one stylesheet; `path` names it in errors
pub fn minify_css(path: &Path, source: &str) -> Result<String, StageError> {
    let failed = |message: String| StageError::Minify {
        path: path.to_path_buf(),
        message,
    };

    let options = ParserOptions {
        filename: path.display().to_string(),
        ..ParserOptions::default()
    };
    let mut sheet = StyleSheet::parse(source, options).map_err(|e| failed(e.to_string()))?;

    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| failed(e.to_string()))?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| failed(e.to_string()))?;

    Ok(printed.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(source: &str) -> String {
        String::from_utf8(compact_js(source.as_bytes())).unwrap()
    }

    #[test]
    fn compact_drops_comments_blank_lines_and_indentation() {
        let source = "// header\n\nfunction a() {\n    return 1; // keep\n}\n\n";
        assert_eq!(compact(source), "function a() {\nreturn 1; // keep\n}\n");
    }

    #[test]
    fn compact_keeps_urls_inside_strings() {
        let source = "    var u = \"http://example.com\";\n";
        assert_eq!(compact(source), "var u = \"http://example.com\";\n");
    }

    #[test]
    fn compact_leaves_template_literals_alone() {
        let source = "    var page = `\n  <p>\n\n  // not a comment\n`;\n    done();\n";
        assert_eq!(
            compact(source),
            "var page = `\n  <p>\n\n  // not a comment\n`;\ndone();\n"
        );
    }

    #[test]
    fn compact_ignores_escaped_backticks() {
        let source = "  var s = `a \\` b`;\n  next();\n";
        assert_eq!(compact(source), "var s = `a \\` b`;\nnext();\n");
    }

    #[test]
    fn compact_keeps_non_utf8_bytes() {
        assert_eq!(compact_js(b"  var s = '\xe9';\n"), b"var s = '\xe9';\n".to_vec());
    }

    #[test]
    fn css_is_minified() {
        let css = "body {\n    margin: 0px;\n    color: #ff0000;\n}\n";
        let out = minify_css(Path::new("style.css"), css).unwrap();

        assert!(!out.contains('\n'));
        assert!(out.starts_with("body{"));
        assert!(out.contains("margin:0"));
    }

    #[test]
    fn broken_css_is_minify_failed() {
        let err = minify_css(Path::new("broken.css"), "..bad { color: red; }").unwrap_err();

        assert_eq!(err.kind(), "MinifyFailed");
        assert!(err.to_string().contains("broken.css"));
    }
}
