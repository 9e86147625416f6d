//! Small text helpers for literal values lifted out of PHP source

/// Strip one pair of surrounding quotes (`'...'` or `"..."`)
pub fn strip_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.len() >= 2 {
        let bytes = trimmed.as_bytes();
        let first = bytes[0];
        let last = bytes[trimmed.len() - 1];
        if (first == b'\'' || first == b'"') && first == last {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Remove every quote character from a literal
pub fn remove_quotes(value: &str) -> String {
    value.trim().replace(['"', '\''], "")
}

/// Cut a view path at its first `.` (`Bundle:Ctrl:view.html.twig` -> `Bundle:Ctrl:view`)
pub fn truncate_view_path(view_path: &str) -> &str {
    match view_path.find('.') {
        Some(index) => &view_path[..index],
        None => view_path,
    }
}

/// Last segment of a backslash separated name
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Everything before the last backslash, or an empty string
pub fn namespace_of(name: &str) -> &str {
    match name.rfind('\\') {
        Some(index) => &name[..index],
        None => "",
    }
}
