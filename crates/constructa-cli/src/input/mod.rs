pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Request document from `--input`, falling back to piped stdin.
/// Returns `None` when neither was supplied.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_document(path)?));
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Like [`load`] but an input is mandatory.
pub fn require<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    load(path)?.ok_or_else(|| format!("--input <file> or stdin required for {what}").into())
}
