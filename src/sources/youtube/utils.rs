pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

fn cut<'a>(s: &'a str, marker: &str, terminators: &[char]) -> Option<&'a str> {
    let rest = s.split_once(marker)?.1;
    let end = rest.find(terminators).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Value of the `key` query parameter, if present.
fn query_param<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(key)?.strip_prefix('='))
}

/// Reduces a watch/short/live/youtu.be URL to its video id. Anything that
/// does not look like a URL is returned trimmed as-is.
pub fn extract_video_id(identifier: &str) -> String {
    let identifier = identifier.trim();
    let id = if let Some(id) = query_param(identifier, "v") {
        Some(id)
    } else if identifier.contains("youtu.be/") {
        cut(identifier, "youtu.be/", &['?', '&', '#', '/'])
    } else if identifier.contains("/shorts/") {
        cut(identifier, "/shorts/", &['?', '&', '#', '/'])
    } else if identifier.contains("/live/") {
        cut(identifier, "/live/", &['?', '&', '#', '/'])
    } else if identifier.contains("://") {
        identifier
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .map(|last| last.split(['?', '&', '#']).next().unwrap_or(last))
    } else {
        None
    };

    id.unwrap_or(identifier).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let cases = [
            ("dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("  dQw4w9WgXcQ ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s", "dQw4w9WgXcQ"),
            ("https://music.youtube.com/watch?list=RD&v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/watch?dev=1&v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ#t=10", "dQw4w9WgXcQ"),
            ("https://youtu.be/dQw4w9WgXcQ?si=abc", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/shorts/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/live/dQw4w9WgXcQ?feature=share", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0", "dQw4w9WgXcQ"),
        ];
        for (input, expected) in cases {
            assert_eq!(extract_video_id(input), expected, "input {}", input);
        }
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("abc"), "https://www.youtube.com/watch?v=abc");
    }
}
