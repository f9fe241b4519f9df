use std::collections::HashMap;

/// Decodes an `application/x-www-form-urlencoded` body such as the token
/// responses from the OAuth endpoints.
///
/// Pairs without a key or without a value are dropped. Returns `None` when
/// no usable pair remains.
pub fn parse_form(body: &str) -> Option<HashMap<String, String>> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body.trim()).ok()?;

    let map: HashMap<String, String> = pairs
        .into_iter()
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .collect();

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_pair() {
        let map = parse_form("oauth_token=abc&oauth_token_secret=xyz").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["oauth_token"], "abc");
        assert_eq!(map["oauth_token_secret"], "xyz");
    }

    #[test]
    fn skips_malformed_pairs() {
        let map = parse_form("oauth_token=abc&broken&=orphan&empty=").unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["oauth_token"], "abc");
    }

    #[test]
    fn decodes_escapes() {
        let map = parse_form("oauth_callback_confirmed=true&name=a%20b+c").unwrap();
        assert_eq!(map["name"], "a b c");
    }

    #[test]
    fn nothing_usable_is_none() {
        assert!(parse_form("").is_none());
        assert!(parse_form("novalue&=nokey").is_none());
    }
}
