// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! User-agent string parsing.
//!
//! A user agent is read as a list of products (`name/version`), each optionally
//! followed by a parenthesised comment whose entries are separated by `"; "`. The
//! first product carries the platform comment, the second one names the rendering
//! engine and the remaining ones identify the browser.

use crate::message::Value;

/// Field names accepted by [`UserAgent::field`].
pub const AGENT_FIELDS: &[&str] = &[
    "mozilla",
    "platform",
    "os",
    "localization",
    "engine",
    "engine-version",
    "browser",
    "browser-version",
    "bot",
    "mobile",
];

/// Fields written by the `agent` directive of `process_json` and `process_tsv`
/// when no fields are listed.
pub const DIRECTIVE_AGENT_FIELDS: &[&str] = &[
    "mozilla",
    "platform",
    "os",
    "localization",
    "engine",
    "engine_version",
    "browser",
    "version",
];

const BOT_MARKERS: &[&str] = &["bot", "spider", "crawler", "slurp"];

#[derive(Debug, Clone, Default, PartialEq)]
struct Section {
    name: String,
    version: String,
    comment: Vec<String>,
}

/// The parts of a user-agent string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAgent {
    pub mozilla: String,
    pub platform: String,
    pub os: String,
    pub localization: String,
    pub engine: String,
    pub engine_version: String,
    pub browser: String,
    pub browser_version: String,
    pub bot: bool,
    pub mobile: bool,
}

impl UserAgent {
    pub fn parse(ua: &str) -> UserAgent {
        let sections = parse_sections(ua.trim());
        let mut agent = UserAgent {
            mobile: sections.iter().any(|s| s.name == "Mobile"),
            ..Default::default()
        };
        let Some(first) = sections.first() else {
            return agent;
        };

        if first.name == "Mozilla" {
            agent.mozilla = first.version.clone();
        }
        agent.detect_browser(&sections);
        agent.detect_os(first);
        agent.bot = is_bot(ua, &sections);
        agent
    }

    /// Value of a named field.
    ///
    /// Besides the names in [`AGENT_FIELDS`], `engine_version` and `version` are
    /// accepted as aliases for the engine and browser versions.
    pub fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "mozilla" => Value::from(self.mozilla.as_str()),
            "platform" => Value::from(self.platform.as_str()),
            "os" => Value::from(self.os.as_str()),
            "localization" => Value::from(self.localization.as_str()),
            "engine" => Value::from(self.engine.as_str()),
            "engine-version" | "engine_version" => Value::from(self.engine_version.as_str()),
            "browser" => Value::from(self.browser.as_str()),
            "browser-version" | "browser_version" | "version" => {
                Value::from(self.browser_version.as_str())
            }
            "bot" => Value::Bool(self.bot),
            "mobile" => Value::Bool(self.mobile),
            _ => return None,
        };
        Some(value)
    }

    pub fn is_known_field(name: &str) -> bool {
        UserAgent::default().field(name).is_some()
    }

    fn detect_browser(&mut self, sections: &[Section]) {
        let first = &sections[0];
        if first.name == "Opera" {
            self.browser = "Opera".to_string();
            self.engine = "Presto".to_string();
            self.browser_version = sections
                .iter()
                .find(|s| s.name == "Version")
                .map(|s| s.version.clone())
                .unwrap_or_else(|| first.version.clone());
            if let Some(presto) = sections.iter().find(|s| s.name == "Presto") {
                self.engine_version = presto.version.clone();
            }
            return;
        }

        if sections.len() == 1 {
            let comment = &first.comment;
            if comment.len() > 1 && comment[0] == "compatible" && comment[1].starts_with("MSIE") {
                self.engine = "Trident".to_string();
                self.browser = "Internet Explorer".to_string();
                self.browser_version = comment[1].trim_start_matches("MSIE").trim().to_string();
            }
            return;
        }

        let engine = &sections[1];
        self.engine = engine.name.clone();
        self.engine_version = engine.version.clone();
        if sections.len() < 3 {
            return;
        }

        let mut index = 2;
        if sections.len() > 3 && sections[2].version.is_empty() {
            index = 3;
        }
        self.browser_version = sections[index].version.clone();

        match engine.name.as_str() {
            "AppleWebKit" => {
                let last = &sections[sections.len() - 1];
                match last.name.as_str() {
                    "Edge" | "Edg" | "EdgA" => {
                        self.browser = "Edge".to_string();
                        self.browser_version = last.version.clone();
                    }
                    "OPR" => {
                        self.browser = "Opera".to_string();
                        self.browser_version = last.version.clone();
                    }
                    _ => {
                        self.browser = match sections[index].name.as_str() {
                            "Chrome" | "CriOS" => "Chrome",
                            "HeadlessChrome" => "Headless Chrome",
                            "Chromium" => "Chromium",
                            "FxiOS" => "Firefox",
                            _ => "Safari",
                        }
                        .to_string();
                    }
                }
            }
            "Gecko" => {
                let mut browser = &sections[2];
                if browser.name == "MRA" && sections.len() > 4 {
                    browser = &sections[4];
                }
                self.browser = browser.name.clone();
                self.browser_version = browser.version.clone();
            }
            "like" if sections[2].name == "Gecko" => {
                self.engine = "Trident".to_string();
                self.browser = "Internet Explorer".to_string();
                self.browser_version = first
                    .comment
                    .iter()
                    .find_map(|c| c.strip_prefix("rv:"))
                    .unwrap_or_default()
                    .to_string();
            }
            _ => {}
        }
    }

    fn detect_os(&mut self, first: &Section) {
        let comment = &first.comment;
        match first.name.as_str() {
            "Mozilla" => {
                self.platform = platform_of(comment);
                if self.platform == "Windows" {
                    if let Some(os) = comment.first() {
                        self.os = normalize_os(os);
                    }
                }
                match self.engine.as_str() {
                    "Gecko" => self.gecko(comment),
                    "AppleWebKit" => self.webkit(comment),
                    "Trident" => self.trident(comment),
                    _ => {}
                }
            }
            "Opera" => {
                if let Some(platform) = comment.first() {
                    self.platform = platform.clone();
                }
                if let Some(os) = comment.get(1) {
                    self.os = normalize_os(os);
                }
                if let Some(localization) = comment.get(2) {
                    self.localization = localization.clone();
                }
            }
            _ => {}
        }
    }

    fn gecko(&mut self, comment: &[String]) {
        if comment.len() < 2 {
            return;
        }
        if comment[1] == "U" || comment[1] == "arm_64" {
            self.os = normalize_os(comment.get(2).unwrap_or(&comment[1]));
        } else if self.platform.contains("Android") {
            self.mobile = true;
            self.os = std::mem::replace(&mut self.platform, normalize_os(&comment[1]));
        } else if comment[0] == "Mobile" || comment[0] == "Tablet" {
            self.mobile = true;
            self.os = "FirefoxOS".to_string();
        } else if self.os.is_empty() {
            self.os = normalize_os(&comment[1]);
        }
        if let Some(localization) = comment.get(3) {
            if !localization.starts_with("rv:") {
                self.localization = localization.clone();
            }
        }
    }

    fn webkit(&mut self, comment: &[String]) {
        if self.platform == "Linux" {
            self.mobile = true;
            if self.browser == "Safari" {
                self.browser = "Android".to_string();
            }
            if comment.len() > 1 {
                if comment[1] == "U" || comment[1] == "arm_64" {
                    match comment.get(2) {
                        Some(os) => self.os = os.clone(),
                        None => {
                            self.mobile = false;
                            self.os = comment[0].clone();
                        }
                    }
                } else {
                    self.os = comment[1].clone();
                }
            }
            if let Some(localization) = comment.get(3) {
                self.localization = localization.clone();
            }
            return;
        }

        if comment.is_empty() {
            return;
        }
        if let Some(localization) = comment.get(3) {
            self.localization = localization.clone();
        }
        if comment[0].starts_with("Windows NT") {
            self.os = normalize_os(&comment[0]);
        } else if comment.len() < 2 {
            self.localization = comment[0].clone();
        } else if comment.len() < 3 {
            self.os = normalize_os(&comment[1]);
        } else {
            self.os = normalize_os(&comment[2]);
        }
    }

    fn trident(&mut self, comment: &[String]) {
        self.platform = "Windows".to_string();
        if self.os.is_empty() {
            self.os = match comment.get(2) {
                Some(os) => normalize_os(os),
                None => "Windows".to_string(),
            };
        }
        if comment.iter().any(|c| c.starts_with("IEMobile")) {
            self.mobile = true;
        }
    }
}

/// Split a user agent into its product sections.
fn parse_sections(ua: &str) -> Vec<Section> {
    let bytes = ua.as_bytes();
    let mut sections = Vec::new();
    let mut index = 0;
    while index < bytes.len() {
        let product = read_until(ua, &mut index, b' ', false);
        let (name, version) = match product.split_once('/') {
            Some((name, version)) => (name.to_string(), version.to_string()),
            None => (product.to_string(), String::new()),
        };
        let mut comment = Vec::new();
        if index < bytes.len() && bytes[index] == b'(' {
            index += 1;
            let text = read_until(ua, &mut index, b')', true);
            comment = text.split("; ").map(str::to_string).collect();
            if bytes.get(index) == Some(&b' ') {
                index += 1;
            }
        }
        sections.push(Section {
            name,
            version,
            comment,
        });
    }
    sections
}

/// Read up to `delimiter`, moving `index` past it. With `nested` set, parentheses
/// opened inside the text have to be closed before the delimiter counts.
fn read_until<'a>(ua: &'a str, index: &mut usize, delimiter: u8, nested: bool) -> &'a str {
    let bytes = ua.as_bytes();
    let start = *index;
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        if bytes[i] == delimiter {
            if depth == 0 {
                *index = i + 1;
                return &ua[start..i];
            }
            depth -= 1;
        } else if nested && bytes[i] == b'(' {
            depth += 1;
        }
        i += 1;
    }
    *index = bytes.len() + 1;
    &ua[start..]
}

fn platform_of(comment: &[String]) -> String {
    let Some(first) = comment.first() else {
        return String::new();
    };
    if first == "compatible" {
        String::new()
    } else if first.starts_with("Windows") {
        "Windows".to_string()
    } else if first.starts_with("Symbian") {
        "Symbian".to_string()
    } else if first.starts_with("webOS") {
        "webOS".to_string()
    } else if first == "BB10" {
        "BlackBerry".to_string()
    } else {
        first.clone()
    }
}

/// Map `Windows NT x.y` to the marketing name.
fn normalize_os(name: &str) -> String {
    let Some(version) = name.strip_prefix("Windows NT ") else {
        return name.to_string();
    };
    let friendly = match version {
        "5.0" => "Windows 2000",
        "5.01" => "Windows 2000, Service Pack 1 (SP1)",
        "5.1" => "Windows XP",
        "5.2" => "Windows XP x64 Edition",
        "6.0" => "Windows Vista",
        "6.1" => "Windows 7",
        "6.2" => "Windows 8",
        "6.3" => "Windows 8.1",
        "10.0" => "Windows 10",
        _ => return name.to_string(),
    };
    friendly.to_string()
}

fn is_bot(ua: &str, sections: &[Section]) -> bool {
    let lower = ua.to_ascii_lowercase();
    if BOT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }
    sections
        .iter()
        .flat_map(|s| s.comment.iter())
        .any(|c| c.starts_with("+http"))
}
