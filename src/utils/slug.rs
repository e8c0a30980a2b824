/// Lowercases `name` and joins its whitespace-separated words with single
/// hyphens. Leading and trailing whitespace is dropped.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
