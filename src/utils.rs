//! Small text and naming helpers shared by the class pipeline.

/// Placeholder used when a class has neither a description nor doc text.
pub const NO_DESCRIPTION: &str = "No description.";

/// Prefix of the generated per-class accessor names.
pub const PRIVATE_ACCESSOR_PREFIX: &str = "_accessor_";

/// Collapses every line break, together with the whitespace after it, into
/// one space. Whitespace elsewhere is left alone.
pub fn normalize_description(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            while chars.next_if(|next| next.is_whitespace()).is_some() {}
            normalized.push(' ');
        } else {
            normalized.push(c);
        }
    }
    normalized
}

/// Greedy word wrap. The first line starts at column 0, continuation lines
/// get `subsequent_indent`. Words longer than `width` are kept whole.
pub fn wrap(text: &str, width: usize, subsequent_indent: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let indent = if lines.is_empty() { "" } else { subsequent_indent };
        if current.is_empty() {
            current = format!("{}{}", indent, word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = format!("{}{}", subsequent_indent, word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Prefixes every non-empty line with `prefix`.
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `true` for names usable as an accessor or method: ASCII letters, digits and
/// underscores, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// `true` for the reserved `__name__` convention.
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// A fresh `_accessor_<16 hex digits>` name.
pub fn private_accessor_name() -> String {
    format!("{}{:016x}", PRIVATE_ACCESSOR_PREFIX, rand::random::<u64>())
}
