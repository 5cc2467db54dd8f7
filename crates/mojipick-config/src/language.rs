//! Resolving the configured language

/// Language used when the locale gives nothing usable
pub const FALLBACK_LANGUAGE: &str = "en";

/// Resolve a configured language to a language code
///
/// `"system"` (or an empty value) reads the locale from the environment.
pub fn resolve_language(configured: &str) -> String {
    let configured = configured.trim();
    if !configured.is_empty() && !configured.eq_ignore_ascii_case("system") {
        return configured.to_lowercase();
    }

    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| language_from_locale(&value))
        .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
}

/// Language part of a locale string such as `it_IT.UTF-8`
///
/// The `C` and `POSIX` locales carry no language.
pub fn language_from_locale(locale: &str) -> Option<String> {
    let language = locale
        .split(['_', '.', '@', '-'])
        .next()
        .unwrap_or_default()
        .trim();

    if language.is_empty() || language == "C" || language == "POSIX" {
        return None;
    }
    Some(language.to_lowercase())
}
