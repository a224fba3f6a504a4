use std::path::Path;

/// The file name without its directory, as it should appear in a summary.
pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name(Path::new("/tmp/a/b.csv")), "b.csv");
        assert_eq!(simplify_file_name(Path::new("b.csv")), "b.csv");
        assert_eq!(simplify_file_name(Path::new("/")), "/");
    }
}
