//! Glob-style file name patterns.
//!
//! Supports `*`, `?` and bracket classes (`[abc]`, `[a-z]`, `[!0-9]`).
//! Patterns match bare file names, so path separators are rejected.

use regex::Regex;

use crate::domain::errors::{AdapterError, AdapterResult};

/// A compiled file name pattern.
#[derive(Debug, Clone)]
pub struct FilePattern {
    glob: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(glob: &str) -> AdapterResult<Self> {
        let source = glob_to_regex(glob)
            .map_err(|reason| AdapterError::config(format!("Invalid file pattern '{glob}': {reason}")))?;
        let regex = Regex::new(&source)
            .map_err(|err| AdapterError::config(format!("Invalid file pattern '{glob}': {err}")))?;
        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    pub fn as_str(&self) -> &str {
        &self.glob
    }
}

fn glob_to_regex(glob: &str) -> Result<String, String> {
    if glob.is_empty() {
        return Err("pattern is empty".to_string());
    }

    let mut out = String::from("^");
    let mut chars = glob.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                let mut first = true;
                for c in chars.by_ref() {
                    match c {
                        ']' if !first => {
                            closed = true;
                            break;
                        }
                        '!' if first => class.push('^'),
                        '\\' | '[' | ']' | '^' | '&' | '~' => {
                            class.push('\\');
                            class.push(c);
                        }
                        _ => class.push(c),
                    }
                    first = false;
                }
                if !closed {
                    return Err("unclosed '[' character class".to_string());
                }
                out.push('[');
                out.push_str(&class);
                out.push(']');
            }
            '/' | '\\' => return Err("pattern must not contain path separators".to_string()),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    Ok(out)
}
