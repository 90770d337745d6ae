//! Provider payload parsing

use crate::ProviderError;
use serde::Serialize;
use serde_json::Value;

/// One organic result kept from the provider payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedLink {
    pub link: String,

    /// Provider's display name for the site, when it gave a non-empty one
    pub source: Option<String>,
}

/// Provider response: the verbatim payload plus the links extracted from it
#[derive(Debug, Clone)]
pub struct ProviderResults {
    pub raw: Value,
    pub links: Vec<RankedLink>,
}

/// Extracts the ranked links from a search payload
///
/// Entries whose `link` is not a string are dropped before ranking, then the
/// first `max` are kept. A missing `organic_results` list is an empty ranking;
/// an `error` field is an upstream failure regardless of HTTP status.
pub fn parse_organic_results(payload: &Value, max: usize) -> Result<Vec<RankedLink>, ProviderError> {
    let object = payload
        .as_object()
        .ok_or_else(|| ProviderError::Malformed("expected a JSON object".to_string()))?;

    if let Some(error) = object.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(ProviderError::Api(message));
    }

    let entries = match object.get("organic_results") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ProviderError::Malformed(
                "organic_results is not an array".to_string(),
            ))
        }
    };

    let links = entries
        .iter()
        .filter_map(|entry| {
            let link = entry.get("link")?.as_str()?;
            let source = entry
                .get("source")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
            Some(RankedLink {
                link: link.to_string(),
                source,
            })
        })
        .take(max)
        .collect();

    Ok(links)
}
