use std::path::Path;

use af_core::Result;

/// One URL per line. Blank lines and `#` comments are skipped.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_url_list(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_url_list() {
        let text = "# reading list\nhttps://socket.dev/blog/a\n\n   https://example.com/b  \r\n  # skipped\nhttps://x.substack.com/p/c";
        assert_eq!(
            parse_url_list(text),
            vec![
                "https://socket.dev/blog/a",
                "https://example.com/b",
                "https://x.substack.com/p/c"
            ]
        );
        assert!(parse_url_list("\n\n# nothing\n").is_empty());
    }

    #[test]
    fn test_read_url_list() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "https://example.com/a").unwrap();
        assert_eq!(read_url_list(file.path()).unwrap(), vec!["https://example.com/a"]);
        assert!(read_url_list(Path::new("/definitely/not/here.txt")).is_err());
    }
}
