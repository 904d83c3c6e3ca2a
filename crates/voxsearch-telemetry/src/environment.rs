//! Runtime environment identification.
//!
//! Classification is best-effort substring matching over identification
//! strings (a user-agent style string and an optional platform hint).
//! Anything unrecognized is `Unknown`.

use voxsearch_core::{BrowserFamily, Platform};

/// Environment variable read by [`ProcessEnvironment`] for the browser
/// identification string.
pub const USER_AGENT_ENV: &str = "VOXSEARCH_USER_AGENT";

/// Source of identification strings, consulted each time an outcome is
/// recorded.
pub trait EnvironmentProbe: Send + Sync {
    /// Browser identification string (user agent).
    fn user_agent(&self) -> Option<String>;
    /// Platform hint, when the runtime exposes one separately.
    fn platform_hint(&self) -> Option<String>;

    /// Classified browser family.
    fn browser_family(&self) -> BrowserFamily {
        self.user_agent()
            .map_or(BrowserFamily::Unknown, |ua| classify_browser(&ua))
    }

    /// Classified platform. The hint wins when it classifies.
    fn platform(&self) -> Platform {
        let from_hint = self
            .platform_hint()
            .map_or(Platform::Unknown, |hint| classify_platform(&hint));
        if from_hint != Platform::Unknown {
            return from_hint;
        }
        self.user_agent()
            .map_or(Platform::Unknown, |ua| classify_platform(&ua))
    }
}

/// Fixed identification strings, typically from settings.
#[derive(Clone, Debug, Default)]
pub struct StaticEnvironment {
    user_agent: Option<String>,
    platform_hint: Option<String>,
}

impl StaticEnvironment {
    /// Environment reporting the given strings.
    pub fn new(user_agent: Option<String>, platform_hint: Option<String>) -> Self {
        Self {
            user_agent,
            platform_hint,
        }
    }
}

impl EnvironmentProbe for StaticEnvironment {
    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn platform_hint(&self) -> Option<String> {
        self.platform_hint.clone()
    }
}

/// Reads [`USER_AGENT_ENV`] on every probe; the platform hint is the
/// compile target OS.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl EnvironmentProbe for ProcessEnvironment {
    fn user_agent(&self) -> Option<String> {
        std::env::var(USER_AGENT_ENV).ok().filter(|s| !s.trim().is_empty())
    }

    fn platform_hint(&self) -> Option<String> {
        Some(std::env::consts::OS.to_owned())
    }
}

/// Classify a user-agent string into a browser family.
///
/// Order matters: Chromium derivatives carry `Chrome/` and `Safari/` tokens,
/// and Chrome carries `Safari/`.
pub fn classify_browser(user_agent: &str) -> BrowserFamily {
    let ua = user_agent.to_ascii_lowercase();
    let has = |needle: &str| ua.contains(needle);

    if has("edg/") || has("edge/") || has("edga/") || has("edgios/") {
        BrowserFamily::Edge
    } else if has("opr/") || has("opera") {
        BrowserFamily::Opera
    } else if has("samsungbrowser") {
        BrowserFamily::Samsung
    } else if has("chrome/") || has("crios/") || has("chromium/") {
        BrowserFamily::Chrome
    } else if has("firefox/") || has("fxios/") {
        BrowserFamily::Firefox
    } else if has("safari/") || has("applewebkit/") {
        BrowserFamily::Safari
    } else {
        BrowserFamily::Unknown
    }
}

/// Classify a user-agent string or platform hint into a platform.
///
/// iOS is checked before macOS (iOS agents say "like Mac OS X") and Android
/// before Linux.
pub fn classify_platform(identification: &str) -> Platform {
    let s = identification.to_ascii_lowercase();
    let has = |needle: &str| s.contains(needle);

    if has("iphone") || has("ipad") || has("ipod") || s == "ios" {
        Platform::Ios
    } else if has("android") {
        Platform::Android
    } else if has("mac os") || has("macintosh") || has("macos") || has("darwin") || s == "macintel" {
        Platform::Macos
    } else if has("windows") || has("win32") || has("win64") {
        Platform::Windows
    } else if has("linux") || has("cros") || has("x11") {
        Platform::Linux
    } else {
        Platform::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const SAMSUNG_ANDROID: &str = "Mozilla/5.0 (Linux; Android 13; SM-S918B) AppleWebKit/537.36 \
        (KHTML, like Gecko) SamsungBrowser/23.0 Chrome/115.0.0.0 Mobile Safari/537.36";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const OPERA_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 OPR/106.0.0.0";

    #[test]
    fn browser_families() {
        assert_eq!(classify_browser(CHROME_MAC), BrowserFamily::Chrome);
        assert_eq!(classify_browser(EDGE_WIN), BrowserFamily::Edge);
        assert_eq!(classify_browser(SAFARI_IPHONE), BrowserFamily::Safari);
        assert_eq!(classify_browser(SAMSUNG_ANDROID), BrowserFamily::Samsung);
        assert_eq!(classify_browser(FIREFOX_LINUX), BrowserFamily::Firefox);
        assert_eq!(classify_browser(OPERA_WIN), BrowserFamily::Opera);
        assert_eq!(classify_browser("curl/8.4.0"), BrowserFamily::Unknown);
        assert_eq!(classify_browser(""), BrowserFamily::Unknown);
    }

    #[test]
    fn platforms() {
        assert_eq!(classify_platform(CHROME_MAC), Platform::Macos);
        assert_eq!(classify_platform(EDGE_WIN), Platform::Windows);
        assert_eq!(classify_platform(SAFARI_IPHONE), Platform::Ios);
        assert_eq!(classify_platform(SAMSUNG_ANDROID), Platform::Android);
        assert_eq!(classify_platform(FIREFOX_LINUX), Platform::Linux);
        assert_eq!(classify_platform("plan9"), Platform::Unknown);
    }

    #[test]
    fn target_os_names_classify() {
        assert_eq!(classify_platform("macos"), Platform::Macos);
        assert_eq!(classify_platform("linux"), Platform::Linux);
        assert_eq!(classify_platform("windows"), Platform::Windows);
        assert_eq!(classify_platform("ios"), Platform::Ios);
        assert_eq!(classify_platform("android"), Platform::Android);
        assert_eq!(classify_platform("MacIntel"), Platform::Macos);
    }

    #[test]
    fn hint_wins_over_user_agent() {
        let env = StaticEnvironment::new(Some(CHROME_MAC.into()), Some("Win32".into()));
        assert_eq!(env.platform(), Platform::Windows);
        assert_eq!(env.browser_family(), BrowserFamily::Chrome);
    }

    #[test]
    fn unclassified_hint_falls_back_to_user_agent() {
        let env = StaticEnvironment::new(Some(SAFARI_IPHONE.into()), Some("unknown".into()));
        assert_eq!(env.platform(), Platform::Ios);
    }

    #[test]
    fn empty_environment_is_unknown() {
        let env = StaticEnvironment::default();
        assert_eq!(env.browser_family(), BrowserFamily::Unknown);
        assert_eq!(env.platform(), Platform::Unknown);
    }

    #[test]
    fn process_environment_reports_target_os() {
        assert_eq!(
            ProcessEnvironment.platform_hint().as_deref(),
            Some(std::env::consts::OS)
        );
    }
}
