use std::path::Path;

use crate::error::{AppError, Result};

/// Prints `msg` and reads one trimmed line from stdin
pub fn prompt(msg: &str) -> Result<String> {
    use std::io::{self, Write};

    print!("{}: ", msg);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

/// Splits a `key=value` command line argument
pub fn parse_pair(s: &str) -> Result<(String, String)> {
    s.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| AppError::InvalidArgument(format!("expected key=value, got `{}`", s)))
}

/// Best-effort mime type from a file extension
pub fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("aif") | Some("aiff") => "audio/aiff",
        Some("m4a") | Some("aac") => "audio/mp4",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
