//! User-agent classification for click enrichment.

use woothee::parser::Parser;

/// Device, OS and browser derived from a `User-Agent` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAgentInfo {
    /// Woothee category: `pc`, `smartphone`, `mobilephone`, `appliance`,
    /// `crawler` or `misc`.
    pub device_family: Option<String>,
    pub os: Option<String>,
    /// Browser name with version when known, e.g. `Chrome 120.0.0.0`.
    pub browser: Option<String>,
    pub is_bot: bool,
}

const UNKNOWN: &str = "UNKNOWN";

/// Classifies a raw user-agent string.
///
/// A client is a bot when the parser files it under `crawler`, or when its
/// description (the browser descriptor, or the raw string if the parser
/// does not recognise it) contains `bot` in any case.
pub fn classify_user_agent(ua: &str) -> UserAgentInfo {
    let ua = ua.trim();
    if ua.is_empty() {
        return UserAgentInfo::default();
    }

    let parser = Parser::new();
    let result = parser.parse(ua).unwrap_or_default();

    let known = |value: &str| (!value.is_empty() && value != UNKNOWN).then(|| value.to_string());

    let browser = known(result.name).map(|name| match known(result.version) {
        Some(version) => format!("{name} {version}"),
        None => name,
    });

    let os = known(result.os).map(|os| match known(&*result.os_version) {
        Some(version) => format!("{os} {version}"),
        None => os,
    });

    let device_family = known(result.category);

    let description = browser.as_deref().unwrap_or(ua);
    let is_bot = result.category == "crawler"
        || contains_bot(description)
        || (browser.is_none() && contains_bot(ua));

    UserAgentInfo {
        device_family,
        os,
        browser,
        is_bot,
    }
}

fn contains_bot(s: &str) -> bool {
    s.to_ascii_lowercase().contains("bot")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_googlebot_is_bot() {
        let info = classify_user_agent(
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
        );
        assert!(info.is_bot);
        assert_eq!(info.device_family.as_deref(), Some("crawler"));
    }

    #[test]
    fn test_desktop_chrome() {
        let info = classify_user_agent(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        );
        assert!(!info.is_bot);
        assert_eq!(info.device_family.as_deref(), Some("pc"));
        assert!(info.browser.as_deref().unwrap().starts_with("Chrome"));
        assert!(info.os.as_deref().unwrap().starts_with("Windows"));
    }

    #[test]
    fn test_iphone_safari() {
        let info = classify_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
        );
        assert!(!info.is_bot);
        assert_eq!(info.device_family.as_deref(), Some("smartphone"));
        assert!(info.browser.as_deref().unwrap().starts_with("Safari"));
    }

    #[test]
    fn test_unrecognised_bot_string() {
        let info = classify_user_agent("AcmeLinkCheckerBot/0.1");
        assert!(info.is_bot);
    }

    #[test]
    fn test_empty_user_agent() {
        assert_eq!(classify_user_agent("   "), UserAgentInfo::default());
    }
}
