/// Normalizes a display value into the form stored in `safe_*` columns.
///
/// ASCII letters, digits, `-` and `.` are kept; every other run of
/// characters collapses into a single `_`. Leading and trailing separators
/// are dropped.
pub fn safe_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_sep = false;
    for ch in input.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '.' {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Canonical form for package locations and project roots: forward slashes,
/// no trailing separator.
pub fn normalize_location(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let trimmed = unified.trim_end_matches('/');
    if trimmed.is_empty() && unified.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn safe_name_collapses_separators() {
        assert_eq!(safe_name("Tools/UI"), "Tools_UI");
        assert_eq!(safe_name("  Mega  Pack!! "), "Mega_Pack");
        assert_eq!(safe_name("com.unity.textmeshpro"), "com.unity.textmeshpro");
        assert_eq!(safe_name("///"), "");
    }

    #[test]
    fn normalize_location_unifies_separators() {
        assert_eq!(normalize_location("C:\\Projects\\Game\\"), "C:/Projects/Game");
        assert_eq!(normalize_location("/srv/assets/"), "/srv/assets");
        assert_eq!(normalize_location("/"), "/");
    }
}
