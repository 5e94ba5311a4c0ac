//! Conversion between the two path notations used by an agent.
//!
//! Applications address YANG nodes with XPath-like paths:
//! `/network-instance[name=default]/protocols`
//!
//! The NDK daemon addresses the same nodes with JSPaths:
//! `.network_instance{.name=="default"}.protocols`
//!
//! Both conversions are single-pass scanners. Everything between a list key
//! predicate's delimiters is copied byte-for-byte, so key values such as
//! `ethernet-1/1` survive in both directions.

#[cfg(test)]
mod path_test;

use std::collections::BTreeMap;

/// JSPath of the notification that closes a configuration commit.
pub const COMMIT_END_JS_PATH: &str = ".commit.end";

/// Converts an XPath into a JSPath.
///
/// - `/` becomes `.`
/// - `-` in node names becomes `_`
/// - `[key=value]` becomes `{.key=="value"}`
///
/// Returns an empty string for empty input.
pub fn to_internal(xpath: &str) -> String {
    if xpath.is_empty() {
        return String::new();
    }

    // Pre-allocate some extra space for the predicate rewrites
    let mut out = String::with_capacity(xpath.len() + 10);
    let mut in_key = false;
    let mut in_value = false;

    for ch in xpath.chars() {
        if in_key {
            match ch {
                ']' => {
                    out.push_str("\"}");
                    in_key = false;
                    in_value = false;
                }
                '=' if !in_value => {
                    out.push_str("==\"");
                    in_value = true;
                }
                _ => out.push(ch),
            }
            continue;
        }

        match ch {
            '[' => {
                out.push_str("{.");
                in_key = true;
            }
            '/' => out.push('.'),
            '-' => out.push('_'),
            _ => out.push(ch),
        }
    }

    out
}

/// Converts a JSPath into an XPath.
///
/// Inverse of [`to_internal`]: `.` becomes `/`, `_` in node names becomes
/// `-`, and `{.key=="value"}` becomes `[key=value]`. The input is scanned two
/// characters at a time to recognise the `{.`, `==` and `"}` tokens; every
/// other character, including the last one, passes through.
pub fn to_external(js_path: &str) -> String {
    if js_path.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = js_path.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut in_key = false;
    let mut in_value = false;
    let mut quoted = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();

        if in_key {
            let close = match (ch, next) {
                ('"', Some('}')) if quoted => 2,
                ('}', _) if !quoted => 1,
                _ => 0,
            };
            if close > 0 {
                out.push(']');
                in_key = false;
                in_value = false;
                quoted = false;
                i += close;
                continue;
            }

            if !in_value && ch == '=' && next == Some('=') {
                out.push('=');
                in_value = true;
                quoted = chars.get(i + 2) == Some(&'"');
                i += if quoted { 3 } else { 2 };
                continue;
            }

            out.push(ch);
            i += 1;
            continue;
        }

        match (ch, next) {
            ('{', Some('.')) => {
                out.push('[');
                in_key = true;
                i += 2;
            }
            ('.', _) => {
                out.push('/');
                i += 1;
            }
            ('_', _) => {
                out.push('-');
                i += 1;
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }

    out
}

/// One element of a parsed XPath: the node name and its list keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XPathElem {
    pub name: String,
    pub keys: BTreeMap<String, String>,
}

/// Splits an XPath into its elements.
///
/// Separators inside `[...]` predicates are not treated as element
/// boundaries. Used to build structured paths for the config query service.
pub fn parse_elems(xpath: &str) -> Vec<XPathElem> {
    let mut elems = Vec::new();
    let mut current = XPathElem::default();
    let mut key = String::new();
    let mut value = String::new();
    let mut in_key = false;
    let mut in_value = false;

    for ch in xpath.chars() {
        if in_key {
            match ch {
                ']' => {
                    current.keys.insert(std::mem::take(&mut key), std::mem::take(&mut value));
                    in_key = false;
                    in_value = false;
                }
                '=' if !in_value => in_value = true,
                _ if in_value => value.push(ch),
                _ => key.push(ch),
            }
            continue;
        }

        match ch {
            '[' => in_key = true,
            '/' => {
                if !current.name.is_empty() {
                    elems.push(std::mem::take(&mut current));
                }
            }
            _ => current.name.push(ch),
        }
    }

    if !current.name.is_empty() {
        elems.push(current);
    }

    elems
}

/// Returns true when `path` is `root` or a node below it.
pub(crate) fn is_descendant_or_self(
    path: &str,
    root: &str,
) -> bool {
    if path == root {
        return true;
    }
    match path.strip_prefix(root) {
        Some(rest) => rest.starts_with('/') || rest.starts_with('['),
        None => false,
    }
}
