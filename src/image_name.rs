/// Derives a display name from a file path.
///
/// Both `/` and `\` count as directory separators. The name is everything in
/// the last path segment before its final `.`, so `a/b/c.photo.jpg` yields
/// `c.photo`. A segment without an extension is returned whole.
pub fn extract_image_name(file_path: &str) -> String {
    let segment = file_path
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_path);

    match segment.rfind('.') {
        Some(dot) if has_word_extension(&segment[dot + 1..]) => segment[..dot].to_string(),
        _ => segment.to_string(),
    }
}

// An extension is one or more word characters, e.g. `png` or `jpeg2`.
fn has_word_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric() || c == '_')
}
