//! Flag and environment overrides for values the host CLI would otherwise supply.

/// Return the first non-empty value among `names` in the process environment.
#[must_use]
pub fn first_env(names: &[&str]) -> Option<String> {
    first_env_with(names, |name| std::env::var(name).ok())
}

/// Return the first non-empty value among `names` using `lookup`.
pub fn first_env_with<F>(names: &[&str], lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
