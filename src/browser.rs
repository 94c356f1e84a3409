//! Browser and OS identity resolution from navigator strings.
//!
//! A [`BrowserIdentity`] is computed once per session from the strings the
//! host navigator exposes, by walking an ordered table of substring
//! patterns. The first matching entry wins, so specific signatures (e.g.
//! `Trident`) are listed before generic fallbacks (`Gecko`, `Mozilla`).
//! Resolution never fails: unrecognized runtimes get sentinel identities.

/// Identity reported when no browser pattern matches.
pub const UNKNOWN_BROWSER: &str = "An unknown browser";

/// Version reported when no version marker can be located.
pub const UNKNOWN_VERSION: &str = "an unknown version";

/// Identity reported when no OS pattern matches.
pub const UNKNOWN_OS: &str = "an unknown OS";

/// Navigator string which a [`BrowserPattern`] is matched against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PatternSource {
    /// `navigator.userAgent` equivalent.
    UserAgent,

    /// `navigator.vendor` equivalent.
    Vendor,

    /// `navigator.platform` equivalent.
    Platform,
}

/// One entry of an identity resolution table.
#[derive(Clone, Copy, Debug)]
pub struct BrowserPattern {
    /// Navigator string to inspect.
    pub source: PatternSource,

    /// Substring whose presence in the [`source`] string selects this
    /// entry.
    ///
    /// [`source`]: BrowserPattern::source
    pub substring: &'static str,

    /// Identity reported when this entry matches.
    pub identity: &'static str,

    /// Marker preceding the version number in the version source strings.
    ///
    /// Falls back to [`identity`] when absent.
    ///
    /// [`identity`]: BrowserPattern::identity
    pub version_marker: Option<&'static str>,
}

/// Default browser resolution table.
///
/// Order is the tie-break: `Trident` must precede the generic `Gecko` and
/// `Mozilla` fallbacks, and `MSIE` precedes `Trident` for ancient Explorer
/// versions that advertise both.
pub static BROWSER_PATTERNS: &[BrowserPattern] = &[
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "Chrome",
        identity: "Chrome",
        version_marker: None,
    },
    BrowserPattern {
        source: PatternSource::Vendor,
        substring: "Apple",
        identity: "Safari",
        version_marker: Some("Version"),
    },
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "Opera",
        identity: "Opera",
        version_marker: Some("Version"),
    },
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "Firefox",
        identity: "Firefox",
        version_marker: None,
    },
    // Newer Netscapes (6+).
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "Netscape",
        identity: "Netscape",
        version_marker: None,
    },
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "MSIE",
        identity: "Explorer",
        version_marker: Some("MSIE"),
    },
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "Trident",
        identity: "Explorer",
        version_marker: Some("rv"),
    },
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "Edge",
        identity: "Edge",
        version_marker: None,
    },
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "Gecko",
        identity: "Mozilla",
        version_marker: Some("rv"),
    },
    // Older Netscapes (4-).
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "Mozilla",
        identity: "Netscape",
        version_marker: Some("Mozilla"),
    },
];

/// Default OS resolution table.
pub static OS_PATTERNS: &[BrowserPattern] = &[
    BrowserPattern {
        source: PatternSource::Platform,
        substring: "Win",
        identity: "Windows",
        version_marker: None,
    },
    BrowserPattern {
        source: PatternSource::Platform,
        substring: "Mac",
        identity: "Mac",
        version_marker: None,
    },
    BrowserPattern {
        source: PatternSource::UserAgent,
        substring: "iPhone",
        identity: "iPhone/iPod",
        version_marker: None,
    },
    BrowserPattern {
        source: PatternSource::Platform,
        substring: "Linux",
        identity: "Linux",
        version_marker: None,
    },
];

/// Raw navigator strings an identity is resolved from.
#[derive(Clone, Debug, Default)]
pub struct NavigatorInfo {
    /// `navigator.userAgent` string.
    pub user_agent: String,

    /// `navigator.vendor` string.
    pub vendor: String,

    /// `navigator.platform` string.
    pub platform: String,

    /// `navigator.appVersion` string.
    pub app_version: String,
}

impl NavigatorInfo {
    /// Returns the string selected by the provided [`PatternSource`].
    fn select(&self, source: PatternSource) -> &str {
        match source {
            PatternSource::UserAgent => &self.user_agent,
            PatternSource::Vendor => &self.vendor,
            PatternSource::Platform => &self.platform,
        }
    }
}

/// Immutable classification of the runtime's browser family, browser
/// version and operating system family.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BrowserIdentity {
    browser: String,
    version: String,
    os: String,
}

impl BrowserIdentity {
    /// Resolves a [`BrowserIdentity`] from the provided navigator strings
    /// using the default pattern tables.
    #[must_use]
    pub fn detect(info: &NavigatorInfo) -> Self {
        Self::detect_with(info, BROWSER_PATTERNS, OS_PATTERNS)
    }

    /// Resolves a [`BrowserIdentity`] against custom pattern tables.
    ///
    /// Pure and deterministic: identical inputs always produce identical
    /// results, and unmatched inputs produce sentinel identities rather
    /// than errors.
    #[must_use]
    pub fn detect_with(
        info: &NavigatorInfo,
        browser_table: &[BrowserPattern],
        os_table: &[BrowserPattern],
    ) -> Self {
        let matched = search_table(info, browser_table);
        let browser = matched
            .map_or(UNKNOWN_BROWSER, |pat| pat.identity)
            .to_owned();
        let version = matched
            .and_then(|pat| {
                let marker = pat.version_marker.unwrap_or(pat.identity);
                search_version(&info.user_agent, marker)
                    .or_else(|| search_version(&info.app_version, marker))
            })
            .unwrap_or_else(|| UNKNOWN_VERSION.to_owned());
        let os = search_table(info, os_table)
            .map_or(UNKNOWN_OS, |pat| pat.identity)
            .to_owned();

        Self {
            browser,
            version,
            os,
        }
    }

    /// Returns the resolved browser family.
    #[inline]
    #[must_use]
    pub fn browser(&self) -> &str {
        &self.browser
    }

    /// Returns the resolved browser version, raw and unparsed.
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the resolved operating system family.
    #[inline]
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Indicates whether the runtime was classified as Firefox.
    #[inline]
    #[must_use]
    pub fn is_firefox(&self) -> bool {
        self.browser == "Firefox"
    }

    /// Indicates whether the runtime was classified as Chrome.
    #[inline]
    #[must_use]
    pub fn is_chrome(&self) -> bool {
        self.browser == "Chrome"
    }

    /// Indicates whether the runtime was classified as Safari.
    #[inline]
    #[must_use]
    pub fn is_safari(&self) -> bool {
        self.browser == "Safari"
    }

    /// Indicates whether the runtime was classified as Opera.
    #[inline]
    #[must_use]
    pub fn is_opera(&self) -> bool {
        self.browser == "Opera"
    }
}

/// Returns the first table entry whose selected navigator string contains
/// its substring.
fn search_table<'t>(
    info: &NavigatorInfo,
    table: &'t [BrowserPattern],
) -> Option<&'t BrowserPattern> {
    table
        .iter()
        .find(|pat| info.select(pat.source).contains(pat.substring))
}

/// Extracts the version substring following the provided marker and its
/// trailing separator character.
///
/// Returns [`None`] when the marker (or anything after its separator) is
/// absent from the source string.
fn search_version(source: &str, marker: &str) -> Option<String> {
    let idx = source.find(marker)?;
    source
        .get((idx + marker.len() + 1)..)
        .filter(|rest| !rest.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(user_agent: &str) -> NavigatorInfo {
        NavigatorInfo {
            user_agent: user_agent.to_owned(),
            ..NavigatorInfo::default()
        }
    }

    #[test]
    fn trident_precedes_gecko_fallback() {
        let identity = BrowserIdentity::detect(&info(
            "Mozilla/5.0 (Windows NT 10.0; Trident/7.0; rv:11.0) like Gecko",
        ));

        assert_eq!(identity.browser(), "Explorer");
        assert_eq!(identity.version(), "11.0) like Gecko");
    }

    #[test]
    fn chrome_wins_over_safari_vendor() {
        let identity = BrowserIdentity::detect(&NavigatorInfo {
            user_agent: "Mozilla/5.0 AppleWebKit/537.36 Chrome/120.0.0.0 \
                         Safari/537.36"
                .to_owned(),
            vendor: "Google Inc.".to_owned(),
            ..NavigatorInfo::default()
        });

        assert_eq!(identity.browser(), "Chrome");
        assert!(identity.is_chrome());
    }

    #[test]
    fn safari_resolved_through_vendor() {
        let identity = BrowserIdentity::detect(&NavigatorInfo {
            user_agent: "Mozilla/5.0 (Macintosh) AppleWebKit/605.1.15 \
                         Version/17.1 Safari/605.1.15"
                .to_owned(),
            vendor: "Apple Computer, Inc.".to_owned(),
            platform: "MacIntel".to_owned(),
            ..NavigatorInfo::default()
        });

        assert_eq!(identity.browser(), "Safari");
        assert_eq!(identity.version(), "17.1 Safari/605.1.15");
        assert_eq!(identity.os(), "Mac");
    }

    #[test]
    fn version_accessor_returns_version_not_family() {
        let identity = BrowserIdentity::detect(&info(
            "Mozilla/5.0 (X11; Linux x86_64) Firefox/122.0",
        ));

        assert_eq!(identity.browser(), "Firefox");
        assert_eq!(identity.version(), "122.0");
        assert!(identity.is_firefox());
    }

    #[test]
    fn missing_marker_yields_unknown_version() {
        // Safari resolves through the vendor string, but its `Version`
        // marker is absent from both version sources here.
        let identity = BrowserIdentity::detect(&NavigatorInfo {
            user_agent: "Mozilla/5.0 (Macintosh) AppleWebKit/605.1.15"
                .to_owned(),
            vendor: "Apple Computer, Inc.".to_owned(),
            ..NavigatorInfo::default()
        });

        assert_eq!(identity.browser(), "Safari");
        assert_eq!(identity.version(), UNKNOWN_VERSION);
    }

    #[test]
    fn marker_at_string_end_yields_unknown_version() {
        // The marker is present, but nothing follows its separator.
        let identity = BrowserIdentity::detect(&info("abc Chrome"));

        assert_eq!(identity.browser(), "Chrome");
        assert_eq!(identity.version(), UNKNOWN_VERSION);
    }

    #[test]
    fn unmatched_input_is_not_an_error() {
        let identity = BrowserIdentity::detect(&NavigatorInfo::default());

        assert_eq!(identity.browser(), UNKNOWN_BROWSER);
        assert_eq!(identity.version(), UNKNOWN_VERSION);
        assert_eq!(identity.os(), UNKNOWN_OS);
    }

    #[test]
    fn version_falls_back_to_app_version_string() {
        let identity = BrowserIdentity::detect(&NavigatorInfo {
            user_agent: "Edge".to_owned(),
            app_version: "5.0 Edge/18.18363".to_owned(),
            ..NavigatorInfo::default()
        });

        assert_eq!(identity.browser(), "Edge");
        assert_eq!(identity.version(), "18.18363");
    }

    #[test]
    fn os_resolved_from_platform_string() {
        let identity = BrowserIdentity::detect(&NavigatorInfo {
            platform: "Win32".to_owned(),
            ..NavigatorInfo::default()
        });

        assert_eq!(identity.os(), "Windows");
    }

    #[test]
    fn detection_is_deterministic() {
        let inputs = NavigatorInfo {
            user_agent: "Mozilla/5.0 Firefox/115.0".to_owned(),
            platform: "Linux x86_64".to_owned(),
            ..NavigatorInfo::default()
        };

        assert_eq!(
            BrowserIdentity::detect(&inputs),
            BrowserIdentity::detect(&inputs),
        );
    }
}
