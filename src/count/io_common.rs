use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Resolves a path from a configuration file against the directory of that file.
pub fn resolve_path(root: Option<&Path>, path: &str) -> String {
    match root {
        Some(r) if Path::new(path).is_relative() => r.join(path).display().to_string(),
        _ => path.to_string(),
    }
}

/// A marker cell. Empty and unreadable cells count as 0.
pub fn parse_marker(cell: &str) -> u32 {
    cell.trim().parse::<u32>().unwrap_or(0)
}
