use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// An LRC line: `[mm:ss.xx]` followed by the lyric text.
static LRC_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[\d{2}:\d{2}\.\d{2}\].*$").unwrap());

/// Keep only timestamped LRC lines from generated lyrics.
///
/// Lines are returned in their original order, trimmed, with empty results
/// dropped. `None` yields an empty list.
pub fn clean_lyric_lines(lyrics: Option<&str>) -> Vec<String> {
    LRC_LINE
        .find_iter(lyrics.unwrap_or_default())
        .map(|m| m.as_str().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write lyric lines as an `.lrc` file for `--lrc-path`.
pub fn write_lrc(path: &Path, lines: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    std::fs::write(path, contents)?;
    log::debug!("Wrote {} lyric lines to {}", lines.len(), path.display());
    Ok(())
}
