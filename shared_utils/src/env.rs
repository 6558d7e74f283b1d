use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// An empty value counts as missing, so `APCA_API_KEY_ID=` in a `.env` file
/// is reported instead of producing an unauthenticated client.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MissingEnvVarError(name.to_string())),
    }
}

/// Reads an optional environment variable, falling back to `default` when it
/// is unset or blank.
pub fn get_env_var_or(name: &str, default: &str) -> String {
    get_env_var(name).unwrap_or_else(|_| default.to_string())
}
