//! Media type version reader
//!
//! Versions can ride on the `Content-Type` and `Accept` headers, either as a
//! media type parameter (`application/json;v=2.0`) or inside the media type
//! itself (`application/vnd.example.v2+json`).

use super::{ApiVersionReader, ApiVersionSource, RawApiVersions};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::request::Parts;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::OnceLock;

static TEMPLATE_PARAMETER_REGEX: OnceLock<Regex> = OnceLock::new();

fn template_parameter_regex() -> &'static Regex {
    TEMPLATE_PARAMETER_REGEX.get_or_init(|| Regex::new(r"\{([^{}]+)\}").unwrap())
}

/// Which extracted values a media type reader reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaTypeSelection {
    /// Every value, letting the dispatcher detect ambiguity
    #[default]
    All,
    /// The first value in header order
    First,
    /// The last value in header order
    Last,
    /// The values of the media types with the highest quality (`q`)
    Quality,
}

/// One media type from a header, split into its parts.
#[derive(Debug)]
struct MediaTypeValue<'a> {
    media_type: &'a str,
    parameters: SmallVec<[(&'a str, &'a str); 4]>,
    quality: f32,
}

/// Malformed or non-finite weights count as 1; others are clamped to 0..=1.
fn parse_quality(value: &str) -> f32 {
    value
        .parse::<f32>()
        .ok()
        .filter(|q| q.is_finite())
        .map_or(1.0, |q| q.clamp(0.0, 1.0))
}

impl<'a> MediaTypeValue<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let mut parts = split_outside_quotes(text, ';').into_iter();
        let media_type = parts.next()?.trim();
        if media_type.is_empty() {
            return None;
        }

        let mut parameters = SmallVec::new();
        let mut quality = 1.0;
        for parameter in parts {
            let Some((name, value)) = parameter.split_once('=') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim().trim_matches('"');
            if name.eq_ignore_ascii_case("q") {
                quality = parse_quality(value);
            } else {
                parameters.push((name, value));
            }
        }

        Some(Self {
            media_type,
            parameters,
            quality,
        })
    }

    fn parameter(&self, name: &str) -> Option<&'a str> {
        self.parameters
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }
}

/// Split on `separator`, ignoring separators inside double quotes.
fn split_outside_quotes(text: &str, separator: char) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quoted = false;
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        if ch == '"' {
            quoted = !quoted;
        } else if ch == separator && !quoted {
            items.push(&text[start..index]);
            start = index + ch.len_utf8();
        }
    }
    items.push(&text[start..]);
    items
}

#[derive(Debug, Clone)]
enum Extractor {
    /// A named media type parameter
    Parameter(String),
    /// A regular expression over the media type; the `version` group or
    /// group 1 when the pattern has groups, else the whole match
    Pattern(Regex),
}

impl Extractor {
    fn extract(&self, value: &MediaTypeValue<'_>) -> Option<String> {
        match self {
            Self::Parameter(name) => value.parameter(name).map(str::to_string),
            Self::Pattern(regex) => {
                let captures = regex.captures(value.media_type)?;
                let matched = if regex.captures_len() > 1 {
                    captures.name("version").or_else(|| captures.get(1))
                } else {
                    captures.get(0)
                };
                matched.map(|m| m.as_str().to_string())
            }
        }
    }
}

/// Reads versions from the `Content-Type` and `Accept` media types.
///
/// `Content-Type` is read before `Accept`.
#[derive(Debug, Clone)]
pub struct MediaTypeApiVersionReader {
    extractors: Vec<Extractor>,
    included: Vec<String>,
    excluded: Vec<String>,
    selection: MediaTypeSelection,
    read_content_type: bool,
    read_accept: bool,
}

impl MediaTypeApiVersionReader {
    /// Read the `v` parameter, preferring the highest quality value.
    pub fn new() -> Self {
        Self::with_parameter("v")
    }

    /// Read a named media type parameter, preferring the highest quality
    /// value.
    pub fn with_parameter(name: impl Into<String>) -> Self {
        Self {
            extractors: vec![Extractor::Parameter(name.into())],
            included: Vec::new(),
            excluded: Vec::new(),
            selection: MediaTypeSelection::Quality,
            read_content_type: true,
            read_accept: true,
        }
    }

    pub fn builder() -> MediaTypeApiVersionReaderBuilder {
        MediaTypeApiVersionReaderBuilder::default()
    }

    fn accepts(&self, media_type: &str) -> bool {
        if self
            .excluded
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(media_type))
        {
            return false;
        }
        self.included.is_empty()
            || self
                .included
                .iter()
                .any(|included| included.eq_ignore_ascii_case(media_type))
    }

    fn collect<'a>(
        &self,
        header_values: impl Iterator<Item = &'a str>,
        source: ApiVersionSource,
        found: &mut Vec<(String, f32, ApiVersionSource)>,
    ) {
        for header in header_values {
            for item in split_outside_quotes(header, ',') {
                let Some(value) = MediaTypeValue::parse(item) else {
                    continue;
                };
                if !self.accepts(value.media_type) {
                    continue;
                }
                for extractor in &self.extractors {
                    if let Some(version) = extractor.extract(&value) {
                        found.push((version, value.quality, source));
                    }
                }
            }
        }
    }
}

impl Default for MediaTypeApiVersionReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiVersionReader for MediaTypeApiVersionReader {
    fn read(&self, request: &Parts) -> RawApiVersions {
        let mut found = Vec::new();

        if self.read_content_type {
            let values = request
                .headers
                .get_all(CONTENT_TYPE)
                .iter()
                .filter_map(|v| v.to_str().ok());
            self.collect(values, ApiVersionSource::ContentType, &mut found);
        }
        if self.read_accept {
            let values = request
                .headers
                .get_all(ACCEPT)
                .iter()
                .filter_map(|v| v.to_str().ok());
            self.collect(values, ApiVersionSource::Accept, &mut found);
        }

        let selected: Vec<_> = match self.selection {
            MediaTypeSelection::All => found,
            MediaTypeSelection::First => found.into_iter().take(1).collect(),
            MediaTypeSelection::Last => found.pop().into_iter().collect(),
            MediaTypeSelection::Quality => {
                let best = found
                    .iter()
                    .map(|(_, quality, _)| *quality)
                    .max_by(f32::total_cmp);
                match best {
                    Some(best) => found
                        .into_iter()
                        .filter(|(_, quality, _)| *quality == best)
                        .collect(),
                    None => found,
                }
            }
        };

        let mut versions = RawApiVersions::new();
        for (value, _, source) in selected {
            versions.insert(&value, source);
        }
        versions
    }
}

/// Builder for [`MediaTypeApiVersionReader`].
///
/// # Example
///
/// ```
/// use verso_http::{ApiVersionReader, MediaTypeApiVersionReader};
///
/// let reader = MediaTypeApiVersionReader::builder()
///     .template("application/vnd.example.v{version}+json")
///     .parameter("v")
///     .select_by_quality()
///     .build()
///     .unwrap();
///
/// let request = http::Request::builder()
///     .header("accept", "application/vnd.example.v2.0+json")
///     .body(())
///     .unwrap();
/// let (parts, _) = request.into_parts();
///
/// assert_eq!(reader.read(&parts).values(), vec!["2.0"]);
/// ```
#[derive(Debug, Clone)]
pub struct MediaTypeApiVersionReaderBuilder {
    parameters: Vec<String>,
    templates: Vec<(String, Option<String>)>,
    patterns: Vec<Regex>,
    included: Vec<String>,
    excluded: Vec<String>,
    selection: MediaTypeSelection,
    read_content_type: bool,
    read_accept: bool,
}

impl Default for MediaTypeApiVersionReaderBuilder {
    fn default() -> Self {
        Self {
            parameters: Vec::new(),
            templates: Vec::new(),
            patterns: Vec::new(),
            included: Vec::new(),
            excluded: Vec::new(),
            selection: MediaTypeSelection::All,
            read_content_type: true,
            read_accept: true,
        }
    }
}

impl MediaTypeApiVersionReaderBuilder {
    /// Read a media type parameter such as `v` in `application/json;v=1.0`.
    pub fn parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }

    /// Read the version embedded in a media type template. The first
    /// `{parameter}` in the template holds the version.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.templates.push((template.into(), None));
        self
    }

    /// Read the version embedded in a media type template, naming the
    /// template parameter that holds it.
    pub fn template_with_parameter(
        mut self,
        template: impl Into<String>,
        parameter: impl Into<String>,
    ) -> Self {
        self.templates.push((template.into(), Some(parameter.into())));
        self
    }

    /// Read the version matched by a regular expression over the media type.
    /// The `version` group (or group 1) is used when the pattern has groups,
    /// otherwise the whole match.
    pub fn matches(mut self, pattern: Regex) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Only read media types in the include list.
    pub fn include(mut self, media_type: impl Into<String>) -> Self {
        self.included.push(media_type.into());
        self
    }

    /// Never read the given media type.
    pub fn exclude(mut self, media_type: impl Into<String>) -> Self {
        self.excluded.push(media_type.into());
        self
    }

    pub fn select(mut self, selection: MediaTypeSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn select_first(self) -> Self {
        self.select(MediaTypeSelection::First)
    }

    pub fn select_last(self) -> Self {
        self.select(MediaTypeSelection::Last)
    }

    pub fn select_by_quality(self) -> Self {
        self.select(MediaTypeSelection::Quality)
    }

    /// Read only the `Accept` header.
    pub fn accept_only(mut self) -> Self {
        self.read_content_type = false;
        self.read_accept = true;
        self
    }

    /// Read only the `Content-Type` header.
    pub fn content_type_only(mut self) -> Self {
        self.read_content_type = true;
        self.read_accept = false;
        self
    }

    pub fn build(self) -> Result<MediaTypeApiVersionReader, regex::Error> {
        let mut extractors: Vec<Extractor> =
            self.parameters.into_iter().map(Extractor::Parameter).collect();

        for (template, parameter) in &self.templates {
            let pattern = compile_template(template, parameter.as_deref())?;
            extractors.push(Extractor::Pattern(pattern));
        }
        extractors.extend(self.patterns.into_iter().map(Extractor::Pattern));

        Ok(MediaTypeApiVersionReader {
            extractors,
            included: self.included,
            excluded: self.excluded,
            selection: self.selection,
            read_content_type: self.read_content_type,
            read_accept: self.read_accept,
        })
    }
}

/// Turn `application/vnd.example.v{version}+json` into an anchored,
/// case-insensitive regex with a `version` group for the chosen parameter.
fn compile_template(template: &str, parameter: Option<&str>) -> Result<Regex, regex::Error> {
    let mut pattern = String::from("(?i)^");
    let mut last = 0;
    let mut version_bound = false;

    for captures in template_parameter_regex().captures_iter(template) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        pattern.push_str(&regex::escape(&template[last..whole.start()]));

        let is_version = !version_bound
            && parameter.map_or(true, |p| p.eq_ignore_ascii_case(name.as_str()));
        if is_version {
            pattern.push_str("(?P<version>[^/;+]+?)");
            version_bound = true;
        } else {
            pattern.push_str("[^/;+]+?");
        }
        last = whole.end();
    }

    pattern.push_str(&regex::escape(&template[last..]));
    pattern.push('$');
    Regex::new(&pattern)
}
