use std::path::Path;

/// Format a byte count as kilobytes with two decimals, e.g. `"488.28 KB"`
pub fn format_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Name a compressed download after its source file
pub fn download_name(prefix: &str, filename: &str, normalize_extension: bool) -> String {
    let filename = sanitize_filename(filename);
    if !normalize_extension {
        return format!("{}{}", prefix, filename);
    }

    let stem = Path::new(&filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or(filename);
    format!("{}{}.jpg", prefix, stem)
}

/// Browser-style variant for a taken name: `photo.png` -> `photo (2).png`
pub fn numbered_name(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }

    let path = Path::new(filename);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{} ({}).{}",
            stem.to_string_lossy(),
            n,
            ext.to_string_lossy()
        ),
        _ => format!("{} ({})", filename, n),
    }
}
