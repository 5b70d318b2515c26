use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a request document, YAML when the extension says so, JSON otherwise.
pub fn read_document<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let parsed = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

/// Read every record of a CSV file with a header row.
pub fn read_csv<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut reader = csv::Reader::from_path(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let mut records = Vec::new();
    for (line, record) in reader.deserialize().enumerate() {
        let record: T = record.map_err(|e| {
            format!("Failed to parse '{}' record {}: {}", canonical.display(), line + 1, e)
        })?;
        records.push(record);
    }
    Ok(records)
}

pub fn has_extension(path: &str, ext: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
