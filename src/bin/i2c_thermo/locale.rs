use std::env;

/// Codeset of the "C" / "POSIX" locale.
const POSIX_CODESET: &str = "ANSI_X3.4-1968";

/// Codeset glibc assumes for a locale name without one.
const IMPLIED_CODESET: &str = "ISO-8859-1";

/// Name of the character encoding selected by the environment, following the
/// `LC_ALL`, `LC_CTYPE`, `LANG` precedence.
pub fn codeset() -> String {
    let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
        .into_iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.is_empty())
        .unwrap_or_default();

    codeset_of(&locale).to_owned()
}

/// Extracts the codeset from a locale name such as `en_US.UTF-8@euro`.
pub fn codeset_of(locale: &str) -> &str {
    if locale.is_empty() || locale == "C" || locale == "POSIX" {
        return POSIX_CODESET;
    }

    let locale = locale.split('@').next().unwrap_or(locale);
    match locale.split_once('.') {
        Some((_, codeset)) if !codeset.is_empty() => codeset,
        _ => IMPLIED_CODESET,
    }
}
