//! Identifier case conversion.

/// Words the target dialect reserves.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

/// Convert a PascalCase or camelCase identifier to snake_case.
///
/// - All-caps names (`MAX_SIZE`, `HP2`) are constants and only lowercase.
/// - Names that already contain `_` are returned unchanged.
/// - Otherwise an `_` goes before each uppercase letter that starts a word:
///   after a non-uppercase character, or at the end of an acronym
///   (`HTTPServer` -> `http_server`).
///
/// `to_snake_case(to_snake_case(x)) == to_snake_case(x)` for every `x`.
pub fn to_snake_case(name: &str) -> String {
    if name
        .chars()
        .all(|c| c.is_uppercase() || c.is_ascii_digit() || c == '_')
    {
        return name.to_lowercase();
    }
    if name.contains('_') {
        return name.to_string();
    }

    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev_upper = chars[i - 1].is_uppercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if !prev_upper || next_lower {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Snake-case a name and keep it clear of dialect keywords.
pub fn to_target_name(name: &str) -> String {
    let name = name.strip_prefix('@').unwrap_or(name);
    let snake = to_snake_case(name);
    if is_keyword(&snake) {
        format!("_{}", snake)
    } else {
        snake
    }
}

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}
