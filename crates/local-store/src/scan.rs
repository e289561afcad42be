//! Quick metadata scan over a session JSONL file.
//!
//! Listings touch every session file, so the scan pulls out the handful of
//! fields it needs with plain string matching instead of deserializing every
//! line.

use chrono::{DateTime, Utc};
use std::io::BufRead;
use std::path::Path;

/// Fields collected by one pass over a session file.
#[derive(Debug, Default)]
pub struct ScannedMeta {
    pub slug: Option<String>,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub line_count: usize,
    pub first_message: Option<String>,
    pub project_path: Option<String>,
}

/// Scan a session file for listing metadata without parsing every event.
pub fn scan_metadata(path: &Path) -> std::io::Result<ScannedMeta> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut meta = ScannedMeta::default();

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        meta.line_count += 1;

        if meta.slug.is_none() {
            meta.slug = extract_json_string(&line, "slug");
        }
        if let Some(ts) = extract_json_string(&line, "timestamp") {
            if let Ok(parsed) = ts.parse::<DateTime<Utc>>() {
                if meta.first_timestamp.is_none() {
                    meta.first_timestamp = Some(parsed);
                }
                meta.last_timestamp = Some(parsed);
            }
        }
        if meta.project_path.is_none() {
            meta.project_path = extract_json_string(&line, "cwd");
        }
        // First plain user prompt; tool-result echoes are not prompts.
        if meta.first_message.is_none()
            && line.contains(r#""type":"user""#)
            && !line.contains(r#""toolUseResult""#)
        {
            meta.first_message = extract_user_content_text(&line);
        }
    }

    Ok(meta)
}

/// Extract a `"key":"value"` string field from a JSON line without parsing.
/// Misses values containing escaped quotes, which is acceptable for the
/// metadata fields this is used on (ids, timestamps, paths).
pub fn extract_json_string(line: &str, key: &str) -> Option<String> {
    let pattern = format!("\"{key}\":\"");
    let start = line.find(&pattern)? + pattern.len();
    let rest = &line[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Extract the plain-string `content` of a user message line, handling
/// escaped characters inside the value.
pub fn extract_user_content_text(line: &str) -> Option<String> {
    let pattern = "\"content\":\"";
    let start = line.find(pattern)? + pattern.len();
    let rest = &line[start..];

    let bytes = rest.as_bytes();
    let mut end = 0;
    while end < bytes.len() {
        match bytes[end] {
            b'\\' => end += 2,
            b'"' => break,
            _ => end += 1,
        }
    }
    if end == 0 || end >= bytes.len() {
        return None;
    }

    let raw = &rest[..end];
    let unescaped = raw
        .replace("\\n", " ")
        .replace("\\t", " ")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\");
    Some(unescaped)
}
