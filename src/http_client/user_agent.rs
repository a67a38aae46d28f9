//! User agent handling for HTTP requests.

pub const USER_AGENT: &str =
    "census-catalog/0.1 (metadata research; github.com/monokrome/census-catalog)";

/// Resolve user agent from config value.
/// - None or empty => default census-catalog user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}
