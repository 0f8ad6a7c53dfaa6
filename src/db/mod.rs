pub mod admins;
pub mod contacts;
pub mod projects;
pub mod quotes;

/// Build a case-insensitive substring pattern for `ILIKE`, escaping the
/// pattern metacharacters in user input.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
