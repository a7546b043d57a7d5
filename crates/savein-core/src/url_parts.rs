//! Pieces of a URL used as filename hints and domain tokens.

/// Percent-decoded last path segment, used as the filename of media and link
/// downloads. `None` for unparsable URLs, a bare root, or `.`/`..`.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(percent_decode(segment))
}

/// Host part of a URL (`www.example.com`), without port.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed.host_str().map(str::to_string)
}

/// Lossy percent-decode of a single path segment.
fn percent_decode(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment() {
        assert_eq!(
            filename_from_url_path("https://example.com/a/b/photo.jpeg").as_deref(),
            Some("photo.jpeg")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/file.zip?token=abc").as_deref(),
            Some("file.zip")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/dir/").as_deref(),
            Some("dir")
        );
    }

    #[test]
    fn root_or_unparseable() {
        assert_eq!(filename_from_url_path("https://example.com/"), None);
        assert_eq!(filename_from_url_path("https://example.com"), None);
        assert_eq!(filename_from_url_path("not a url"), None);
    }

    #[test]
    fn decodes_percent_escapes() {
        assert_eq!(
            filename_from_url_path("https://example.com/caf%C3%A9%20menu.pdf").as_deref(),
            Some("café menu.pdf")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/100%25").as_deref(),
            Some("100%")
        );
    }

    #[test]
    fn domains() {
        assert_eq!(
            domain_of("https://img.example.com:8443/x.png").as_deref(),
            Some("img.example.com")
        );
        assert_eq!(domain_of("data:text/plain,hi"), None);
        assert_eq!(domain_of(""), None);
    }
}
