//! Service and resource path normalization

const SEPARATOR: char = '/';

/// Joins raw base-path tokens into an absolute service path.
///
/// `/` tokens become separators, `.` tokens become literal dots, quoted string
/// literals are taken verbatim and identifier escapes (`'name`, `\-`) are removed.
/// The result always starts with `/` and never ends with one, except the root path.
pub fn normalize_service_path<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut raw = String::new();
    for token in tokens {
        let token = token.as_ref().trim();
        match token {
            "/" => raw.push(SEPARATOR),
            "." => raw.push('.'),
            t if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') => {
                raw.push_str(&t[1..t.len() - 1]);
            }
            t => raw.push_str(&unescape_identifier(t)),
        }
    }
    normalize(&raw)
}

/// Canonical form of an already-joined path
pub fn normalize(raw: &str) -> String {
    let segments: Vec<&str> = raw.split(SEPARATOR).filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return SEPARATOR.to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Absolute path of a resource declared under `service_path`.
///
/// A single `.` segment denotes the service root itself.
pub fn resource_path<S: AsRef<str>>(service_path: &str, segments: &[S]) -> String {
    let relative: Vec<String> = segments
        .iter()
        .map(|s| unescape_identifier(s.as_ref().trim()))
        .filter(|s| !s.is_empty() && s != ".")
        .collect();
    if relative.is_empty() {
        return normalize(service_path);
    }
    normalize(&format!("{}/{}", service_path, relative.join("/")))
}

/// True when `path` equals `base` or continues it after a separator
pub fn is_under(base: &str, path: &str) -> bool {
    let base = normalize(base);
    let path = normalize(path);
    if base == "/" {
        return true;
    }
    path == base
        || path
            .strip_prefix(base.as_str())
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

fn unescape_identifier(token: &str) -> String {
    let token = token.strip_prefix('\'').unwrap_or(token);
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
