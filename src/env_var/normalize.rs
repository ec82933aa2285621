//! Path normalization for values stored in environment variables
//!
//! Steps run in a fixed order: short/long form resolution on the raw input,
//! then variable expansion against the process environment, then separator
//! canonicalization.

use crate::application::ports::PathResolver;
use crate::domain::errors::Result;

/// Options for [`normalize_path`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Expand `%VAR%`, `$VAR` and `${VAR}` from the process environment
    pub expand_variables: bool,
    /// `Some(true)`: short (8.3) form. `Some(false)`: long form. `None`:
    /// leave as is. Either conversion requires the path to exist.
    pub short_long_form: Option<bool>,
    /// Canonicalize separators and `.`/`..` segments
    pub canonicalize_separators: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            expand_variables: true,
            short_long_form: None,
            canonicalize_separators: true,
        }
    }
}

impl NormalizeOptions {
    pub fn expand_variables(mut self, expand: bool) -> Self {
        self.expand_variables = expand;
        self
    }

    pub fn short_long_form(mut self, form: Option<bool>) -> Self {
        self.short_long_form = form;
        self
    }

    pub fn canonicalize_separators(mut self, canonicalize: bool) -> Self {
        self.canonicalize_separators = canonicalize;
        self
    }
}

/// Normalize a path string
pub fn normalize_path(
    path: &str,
    options: &NormalizeOptions,
    resolver: &dyn PathResolver,
) -> Result<String> {
    let mut path = match options.short_long_form {
        Some(true) => resolver.short_path(path)?,
        Some(false) => resolver.long_path(path)?,
        None => path.to_string(),
    };

    if options.expand_variables {
        path = expand_vars(&path);
    }

    if options.canonicalize_separators {
        path = normalize_separators(&path);
    }

    Ok(path)
}

/// Expand variables from the process environment
pub fn expand_vars(path: &str) -> String {
    expand_vars_with(path, |name| std::env::var(name).ok())
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn find_from(chars: &[char], start: usize, needle: char) -> Option<usize> {
    chars
        .get(start..)?
        .iter()
        .position(|&c| c == needle)
        .map(|offset| start + offset)
}

/// Expand `%VAR%`, `${VAR}` and `$VAR` using `lookup`.
///
/// Unknown variables are left as written. `%%` and `$$` produce a single
/// literal character. Text between single quotes is copied untouched.
pub fn expand_vars_with<F>(path: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !path.contains('%') && !path.contains('$') {
        return path.to_string();
    }

    let lookup = |name: &str| if name.is_empty() { None } else { lookup(name) };
    let chars: Vec<char> = path.chars().collect();
    let mut out = String::with_capacity(path.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\'' => match find_from(&chars, i + 1, '\'') {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end + 1;
                }
                None => {
                    out.extend(&chars[i..]);
                    i = chars.len();
                }
            },
            '%' if chars.get(i + 1) == Some(&'%') => {
                out.push('%');
                i += 2;
            }
            '%' => match find_from(&chars, i + 1, '%') {
                Some(end) => {
                    let name: String = chars[i + 1..end].iter().collect();
                    match lookup(&name) {
                        Some(value) => out.push_str(&value),
                        None => {
                            out.push('%');
                            out.push_str(&name);
                            out.push('%');
                        }
                    }
                    i = end + 1;
                }
                None => {
                    out.extend(&chars[i..]);
                    i = chars.len();
                }
            },
            '$' => match chars.get(i + 1) {
                Some('$') => {
                    out.push('$');
                    i += 2;
                }
                Some('{') => match find_from(&chars, i + 2, '}') {
                    Some(end) => {
                        let name: String = chars[i + 2..end].iter().collect();
                        match lookup(&name) {
                            Some(value) => out.push_str(&value),
                            None => {
                                out.push_str("${");
                                out.push_str(&name);
                                out.push('}');
                            }
                        }
                        i = end + 1;
                    }
                    None => {
                        out.extend(&chars[i..]);
                        i = chars.len();
                    }
                },
                _ => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && is_var_char(chars[end]) {
                        end += 1;
                    }
                    let name: String = chars[start..end].iter().collect();
                    match lookup(&name) {
                        Some(value) => out.push_str(&value),
                        None => {
                            out.push('$');
                            out.push_str(&name);
                        }
                    }
                    i = end;
                }
            },
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Split a Windows path into its drive or UNC share prefix and the rest
fn split_drive(path: &str) -> (&str, &str) {
    if let Some(rest) = path.strip_prefix("\\\\") {
        if !rest.starts_with('\\') {
            // \\server\share\rest
            let Some(server_end) = rest.find('\\') else {
                return (path, "");
            };
            let share = &rest[server_end + 1..];
            let prefix_len = match share.find('\\') {
                Some(share_end) => 2 + server_end + 1 + share_end,
                None => path.len(),
            };
            return path.split_at(prefix_len);
        }
    }

    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return path.split_at(2);
    }
    ("", path)
}

/// Lexical Windows path normalization: `/` becomes `\`, repeated separators
/// collapse, `.` segments drop and `..` removes the previous segment. Never
/// touches the file system.
pub fn normalize_separators(path: &str) -> String {
    let path = path.replace('/', "\\");
    let (drive, rest) = split_drive(&path);

    let mut prefix = drive.to_string();
    let rooted = rest.starts_with('\\');
    if rooted {
        prefix.push('\\');
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('\\') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                // `..` at the root of a rooted path goes nowhere
                _ if rooted && parts.is_empty() => {}
                _ => parts.push(".."),
            },
            part => parts.push(part),
        }
    }

    if prefix.is_empty() && parts.is_empty() {
        return ".".to_string();
    }
    prefix + &parts.join("\\")
}
