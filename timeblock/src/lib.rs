//! Timeblock domain library: time intervals embedded in outline text, category
//! inheritance along the outline hierarchy, and a column layout for concurrent blocks.
//! The core is pure: it takes record snapshots and configuration, and returns plain
//! structured results. Only `config::TimeblockConfig::load` and the binary touch disk.

pub mod core {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Serialize};
    use std::ops::Range;

    pub const MINUTES_PER_DAY: u32 = 1440;

    /* ------------------------------ Intervals ------------------------------ */

    /// A parsed time range in minutes since local midnight.
    ///
    /// `end_minute >= start_minute` always holds. Values past 1440 only appear after the
    /// pipeline shifts a following period onto the end of the primary one.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TimeInterval {
        pub start_minute: u32,
        pub end_minute: u32,
        /// Exact substring the interval was parsed from.
        pub source_text: String,
        /// Byte range of `source_text` within the parsed text.
        #[serde(default)]
        pub span: Range<usize>,
    }

    impl TimeInterval {
        pub fn duration(&self) -> u32 {
            self.end_minute.saturating_sub(self.start_minute)
        }

        pub fn is_marker(&self) -> bool {
            self.start_minute == self.end_minute
        }

        /// Copy of this interval moved `minutes` later (saturating); text and span are kept.
        pub fn shifted(&self, minutes: u32) -> Self {
            Self {
                start_minute: self.start_minute.saturating_add(minutes),
                end_minute: self.end_minute.saturating_add(minutes),
                source_text: self.source_text.clone(),
                span: self.span.clone(),
            }
        }

        /// Half-open containment; zero-duration markers contain only their own minute.
        pub fn contains_minute(&self, minute: u32) -> bool {
            if self.is_marker() {
                minute == self.start_minute
            } else {
                self.start_minute <= minute && minute < self.end_minute
            }
        }

        pub fn start_time(&self) -> Option<NaiveTime> {
            time_of_minute(self.start_minute)
        }

        pub fn end_time(&self) -> Option<NaiveTime> {
            time_of_minute(self.end_minute)
        }
    }

    /// Minutes since midnight for a wall-clock time (seconds are dropped).
    pub fn minute_of_day(time: NaiveTime) -> u32 {
        time.hour() * 60 + time.minute()
    }

    fn time_of_minute(minute: u32) -> Option<NaiveTime> {
        let minute = minute % MINUTES_PER_DAY;
        NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)
    }

    /* ------------------------------- Records ------------------------------- */

    /// Immutable snapshot of one outline line, owned by the host document store.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Record {
        pub id: String,
        pub text: String,
        #[serde(default)]
        pub parent_id: Option<String>,
        /// Sibling order key as reported by the store.
        #[serde(default)]
        pub order: f64,
    }

    impl Record {
        pub fn new(id: impl Into<String>, text: impl Into<String>, parent_id: Option<&str>) -> Self {
            Self {
                id: id.into(),
                text: text.into(),
                parent_id: parent_id.map(str::to_string),
                order: 0.0,
            }
        }
    }

    /// What a single-lookup store hands back for one id.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct StoredNode {
        pub text: String,
        pub parent_id: Option<String>,
    }

    /* ------------------------------ Categories ------------------------------ */

    /// A labelled, coloured classification selected by surface forms found in text.
    ///
    /// `patterns` accepts `#tag`, `[[Page]]`, `#[[Page]]`, or a bare name that stands for
    /// both `[[name]]` and `#name`.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Category {
        pub id: String,
        pub label: String,
        #[serde(default)]
        pub color: String,
        #[serde(default)]
        pub patterns: Vec<String>,
    }

    impl Category {
        pub fn new(id: &str, label: &str, color: &str, patterns: &[&str]) -> Self {
            Self {
                id: id.to_string(),
                label: label.to_string(),
                color: color.to_string(),
                patterns: patterns.iter().map(|p| p.to_string()).collect(),
            }
        }
    }

    /* ------------------------------- Output ------------------------------- */

    /// Final unit handed to renderers. `column < total_columns` and `total_columns >= 1`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PositionedInterval {
        pub record: Record,
        pub interval: TimeInterval,
        pub category: Option<Category>,
        pub column: usize,
        pub total_columns: usize,
    }

    /* ---------------------------- Errors (domain) ---------------------------- */

    /// Batch-level configuration problems; everything per-record is absorbed instead.
    #[derive(Debug, thiserror::Error)]
    pub enum ConfigError {
        #[error("category {category:?}: pattern {pattern:?} does not compile")]
        InvalidPattern {
            category: String,
            pattern: String,
            #[source]
            source: regex::Error,
        },
        #[error("duplicate category id {0:?}")]
        DuplicateCategory(String),
        #[error("max depth must be at least 1 (got {0})")]
        InvalidMaxDepth(usize),
        #[error("boundary minute {0} is past the end of the day (1440)")]
        InvalidBoundary(u32),
        #[error("granularity of {0} minutes must be in 1..=60 and divide an hour")]
        InvalidGranularity(u32),
    }

}

pub mod storage {
    use super::core::StoredNode;
    use anyhow::Result;

    /// Read access to the host's outline records, used by single-lookup resolution.
    ///
    /// `Ok(None)` means the id is unknown to the store; errors end the ancestor walk
    /// without a category.
    pub trait RecordStore {
        fn fetch(&self, id: &str) -> Result<Option<StoredNode>>;
    }
}

pub mod config {
    //! Invocation configuration. Validated once at batch entry; the algorithms below
    //! assume a validated config.

    use super::core::{Category, ConfigError, MINUTES_PER_DAY};
    use anyhow::{Context, Result};
    use serde::{Deserialize, Serialize};
    use std::{collections::BTreeSet, fs, path::Path};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TimeblockConfig {
        /// Ordered; the first matching category wins at each ancestor.
        #[serde(default)]
        pub categories: Vec<Category>,

        /// Number of ancestors inspected above a record before giving up.
        #[serde(default = "TimeblockConfig::default_max_depth")]
        pub max_depth: usize,

        /// Following-period intervals starting at or after this minute are not carried over.
        #[serde(default = "TimeblockConfig::default_boundary_minute")]
        pub boundary_minute: u32,

        /// Grid used by `snap_minute` for drag/resize collaborators.
        #[serde(default = "TimeblockConfig::default_granularity")]
        pub granularity_minutes: u32,
    }

    impl Default for TimeblockConfig {
        fn default() -> Self {
            Self {
                categories: vec![],
                max_depth: Self::default_max_depth(),
                boundary_minute: Self::default_boundary_minute(),
                granularity_minutes: Self::default_granularity(),
            }
        }
    }

    impl TimeblockConfig {
        fn default_max_depth() -> usize {
            50
        }

        fn default_boundary_minute() -> u32 {
            5 * 60
        }

        fn default_granularity() -> u32 {
            15
        }

        pub fn with_categories(categories: Vec<Category>) -> Self {
            Self {
                categories,
                ..Self::default()
            }
        }

        pub fn validate(&self) -> Result<(), ConfigError> {
            if self.max_depth == 0 {
                return Err(ConfigError::InvalidMaxDepth(self.max_depth));
            }
            if self.boundary_minute > MINUTES_PER_DAY {
                return Err(ConfigError::InvalidBoundary(self.boundary_minute));
            }
            let g = self.granularity_minutes;
            if g == 0 || g > 60 || 60 % g != 0 {
                return Err(ConfigError::InvalidGranularity(g));
            }
            let mut seen = BTreeSet::new();
            for category in &self.categories {
                if !seen.insert(category.id.as_str()) {
                    return Err(ConfigError::DuplicateCategory(category.id.clone()));
                }
            }
            Ok(())
        }

        pub fn from_json_str(text: &str) -> Result<Self> {
            let config: Self = serde_json::from_str(text).context("decoding timeblock config")?;
            config.validate()?;
            Ok(config)
        }

        pub fn load(path: &Path) -> Result<Self> {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            Self::from_json_str(&text).with_context(|| format!("loading config {:?}", path))
        }
    }

    /// Round `minute` to the nearest multiple of `granularity` (halves round up).
    pub fn snap_minute(minute: u32, granularity: u32) -> u32 {
        if granularity <= 1 {
            return minute;
        }
        minute.saturating_add(granularity / 2) / granularity * granularity
    }

}

pub mod parser {
    //! Interval extraction built on `nom`.
    //!
    //! Three forms are tried in a fixed order, most specific first. For each form only
    //! its leftmost occurrence counts; if that occurrence fails validation the next form
    //! is tried. A match may not start right after a digit.

    use crate::core::TimeInterval;
    use log::trace;
    use nom::{
        IResult,
        branch::alt,
        bytes::complete::{tag_no_case, take_while},
        character::complete::{char, space0},
        combinator::{map, map_res, not, value},
        error::{VerboseError, VerboseErrorKind},
        sequence::{preceded, tuple},
    };
    use serde::{Deserialize, Serialize};
    use std::ops::Range;

    /* ------------------------ Public entry points ------------------------ */

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum IntervalPattern {
        /// `H:MM-H:MM`, not followed by am/pm.
        TwentyFourHour,
        /// `H:MMam-H:MMpm`.
        TwelveHourWithMinutes,
        /// `Ham-Hpm`.
        TwelveHour,
    }

    impl IntervalPattern {
        pub const ORDERED: [IntervalPattern; 3] = [
            IntervalPattern::TwentyFourHour,
            IntervalPattern::TwelveHourWithMinutes,
            IntervalPattern::TwelveHour,
        ];

        fn recognize(self, i: &str) -> PResult<'_, (Clock, Clock)> {
            match self {
                IntervalPattern::TwentyFourHour => range_24h(i),
                IntervalPattern::TwelveHourWithMinutes => range_12h_minutes(i),
                IntervalPattern::TwelveHour => range_12h(i),
            }
        }
    }

    /// Extract the first valid interval from `text`.
    pub fn parse_interval(text: &str) -> Option<TimeInterval> {
        parse_interval_with_pattern(text).map(|(_, interval)| interval)
    }

    /// Like `parse_interval`, also reporting which form matched.
    pub fn parse_interval_with_pattern(text: &str) -> Option<(IntervalPattern, TimeInterval)> {
        IntervalPattern::ORDERED.into_iter().find_map(|pattern| {
            let (start, end, (from, to)) = find_first(text, pattern)?;
            let interval = validate(from, to, text, start..end);
            if interval.is_none() {
                trace!("{:?} matched {:?} but failed validation", pattern, &text[start..end]);
            }
            interval.map(|interval| (pattern, interval))
        })
    }

    /* ------------------------------- Scanning ------------------------------- */

    type PResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

    /// Wall-clock reading, already converted to 24-hour form but not yet validated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Clock {
        hour: u32,
        minute: u32,
    }

    impl Clock {
        fn to_24h(self, meridiem: Meridiem) -> Self {
            let hour = match (meridiem, self.hour) {
                (Meridiem::Am, 12) => 0,
                (Meridiem::Pm, 12) => 12,
                (Meridiem::Am, h) => h,
                (Meridiem::Pm, h) => h + 12,
            };
            Self { hour, ..self }
        }

        fn in_range(self) -> bool {
            self.hour <= 23 && self.minute <= 59
        }

        fn minutes(self) -> u32 {
            self.hour * 60 + self.minute
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Meridiem {
        Am,
        Pm,
    }

    /// Leftmost byte range where `pattern` matches, with its raw clocks.
    fn find_first(text: &str, pattern: IntervalPattern) -> Option<(usize, usize, (Clock, Clock))> {
        let mut prev: Option<char> = None;
        for (idx, ch) in text.char_indices() {
            let after_digit = prev.is_some_and(|p| p.is_ascii_digit());
            prev = Some(ch);
            if after_digit || !ch.is_ascii_digit() {
                continue;
            }
            let candidate = &text[idx..];
            if let Ok((rest, clocks)) = pattern.recognize(candidate) {
                let end = idx + (candidate.len() - rest.len());
                return Some((idx, end, clocks));
            }
        }
        None
    }

    fn validate(from: Clock, to: Clock, text: &str, span: Range<usize>) -> Option<TimeInterval> {
        if !from.in_range() || !to.in_range() {
            return None;
        }
        let (start_minute, end_minute) = (from.minutes(), to.minutes());
        if end_minute < start_minute {
            return None;
        }
        Some(TimeInterval {
            start_minute,
            end_minute,
            source_text: text[span.clone()].to_string(),
            span,
        })
    }

    /* ------------------------------- Grammar ------------------------------- */

    fn range_24h(i: &str) -> PResult<'_, (Clock, Clock)> {
        let (i, (from, _, to)) = tuple((clock, dash, clock))(i)?;
        // Leave `10:00-12:00pm` to the 12-hour forms.
        let (i, _) = not(meridiem)(i)?;
        Ok((i, (from, to)))
    }

    fn range_12h_minutes(i: &str) -> PResult<'_, (Clock, Clock)> {
        let (i, (from, from_m, _, to, to_m)) =
            tuple((clock, meridiem, dash, clock, meridiem))(i)?;
        Ok((i, (from.to_24h(from_m), to.to_24h(to_m))))
    }

    fn range_12h(i: &str) -> PResult<'_, (Clock, Clock)> {
        let (i, (from, from_m, _, to, to_m)) =
            tuple((number(1, 2), meridiem, dash, number(1, 2), meridiem))(i)?;
        let from = Clock { hour: from, minute: 0 }.to_24h(from_m);
        let to = Clock { hour: to, minute: 0 }.to_24h(to_m);
        Ok((i, (from, to)))
    }

    fn clock(i: &str) -> PResult<'_, Clock> {
        map(
            tuple((number(1, 2), char(':'), number(2, 2))),
            |(hour, _, minute)| Clock { hour, minute },
        )(i)
    }

    fn meridiem(i: &str) -> PResult<'_, Meridiem> {
        preceded(
            space0,
            alt((
                value(Meridiem::Am, tag_no_case("am")),
                value(Meridiem::Pm, tag_no_case("pm")),
            )),
        )(i)
    }

    fn dash(i: &str) -> PResult<'_, ()> {
        value((), tuple((space0, char('-'), space0)))(i)
    }

    fn number(min: usize, max: usize) -> impl Fn(&str) -> PResult<'_, u32> {
        move |i: &str| map_res(digits(min, max), |s: &str| s.parse::<u32>())(i)
    }

    /// Greedy digit run whose length must fall in `min..=max`.
    fn digits(min: usize, max: usize) -> impl Fn(&str) -> PResult<'_, &str> {
        move |i: &str| {
            let (rest, out) =
                take_while::<_, &str, VerboseError<&str>>(|c: char| c.is_ascii_digit())(i)?;
            if out.len() < min || out.len() > max {
                Err(nom::Err::Error(VerboseError {
                    errors: vec![(i, VerboseErrorKind::Context("digits"))],
                }))
            } else {
                Ok((rest, out))
            }
        }
    }

}

pub mod category {
    //! Category inheritance along the outline hierarchy.
    //!
    //! A record takes the category of the nearest node in its ancestor chain (itself
    //! included) whose text mentions one of the category's surface forms. Two lookup
    //! strategies share one walk: a `RecordStore` queried per hop, or a `ChainSnapshot`
    //! of maps prepared by the caller for whole-batch scans.

    use crate::config::TimeblockConfig;
    use crate::core::{Category, ConfigError, Record, StoredNode};
    use crate::storage::RecordStore;
    use anyhow::Result;
    use indexmap::IndexMap;
    use log::{debug, warn};
    use regex::Regex;
    use serde::{Deserialize, Serialize};
    use std::{borrow::Cow, collections::HashSet};

    pub const DEFAULT_MAX_DEPTH: usize = 50;

    /* ----------------------------- Batch snapshot ----------------------------- */

    /// Content and parent-pointer maps for batch resolution.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChainSnapshot {
        #[serde(default)]
        pub content_by_id: IndexMap<String, String>,
        /// Ids missing from this map are treated as roots.
        #[serde(default)]
        pub parent_by_id: IndexMap<String, Option<String>>,
    }

    impl ChainSnapshot {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, id: &str, text: &str, parent_id: Option<&str>) {
            self.content_by_id.insert(id.to_string(), text.to_string());
            self.parent_by_id
                .insert(id.to_string(), parent_id.map(str::to_string));
        }

        pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
            let mut snapshot = Self::new();
            for r in records {
                snapshot.insert(&r.id, &r.text, r.parent_id.as_deref());
            }
            snapshot
        }

        /// Add records whose ids are not present yet; existing entries win.
        pub fn fill_from<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) {
            for r in records {
                if !self.content_by_id.contains_key(&r.id) {
                    self.insert(&r.id, &r.text, r.parent_id.as_deref());
                }
            }
        }

        pub fn len(&self) -> usize {
            self.content_by_id.len()
        }

        pub fn is_empty(&self) -> bool {
            self.content_by_id.is_empty()
        }

        fn view(&self, id: &str) -> Option<NodeView<'_>> {
            let text = self.content_by_id.get(id)?;
            let parent_id = self
                .parent_by_id
                .get(id)
                .and_then(|p| p.as_deref())
                .map(Cow::Borrowed);
            Some(NodeView {
                text: Cow::Borrowed(text.as_str()),
                parent_id,
            })
        }
    }

    impl RecordStore for ChainSnapshot {
        fn fetch(&self, id: &str) -> Result<Option<StoredNode>> {
            Ok(self.view(id).map(|v| StoredNode {
                text: v.text.into_owned(),
                parent_id: v.parent_id.map(Cow::into_owned),
            }))
        }
    }

    struct NodeView<'a> {
        text: Cow<'a, str>,
        parent_id: Option<Cow<'a, str>>,
    }

    /* ----------------------------- Surface forms ----------------------------- */

    /// One literal that selects a category when it appears in text.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SurfaceForm {
        /// `[[Page]]`
        PageRef(String),
        /// `#tag`, not followed by a word character or `-`.
        Tag(String),
    }

    impl SurfaceForm {
        /// Expand one configured pattern. Blank patterns expand to nothing.
        pub fn expand(pattern: &str) -> Vec<SurfaceForm> {
            let p = pattern.trim();
            if let Some(page) = p
                .strip_prefix("#[[")
                .or_else(|| p.strip_prefix("[["))
                .and_then(|rest| rest.strip_suffix("]]"))
            {
                return non_blank(page).map(SurfaceForm::PageRef).into_iter().collect();
            }
            if let Some(tag) = p.strip_prefix('#') {
                return non_blank(tag).map(SurfaceForm::Tag).into_iter().collect();
            }
            let Some(name) = non_blank(p) else {
                return vec![];
            };
            let mut forms = vec![SurfaceForm::PageRef(name.clone())];
            if !name.contains(char::is_whitespace) {
                forms.push(SurfaceForm::Tag(name));
            }
            forms
        }

        fn regex_source(&self) -> String {
            match self {
                SurfaceForm::PageRef(page) => format!(r"\[\[{}\]\]", regex::escape(page)),
                SurfaceForm::Tag(tag) => format!(r"#{}(?:$|[^\w-])", regex::escape(tag)),
            }
        }
    }

    fn non_blank(s: &str) -> Option<String> {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    }

    /* -------------------------------- Resolver -------------------------------- */

    struct CategoryMatcher {
        category: Category,
        regex: Option<Regex>,
    }

    impl CategoryMatcher {
        fn build(category: &Category) -> Result<Self, ConfigError> {
            let alternatives: Vec<String> = category
                .patterns
                .iter()
                .flat_map(|p| SurfaceForm::expand(p))
                .map(|form| form.regex_source())
                .collect();
            if alternatives.is_empty() {
                warn!("category {:?} has no usable patterns; it will never match", category.id);
                return Ok(Self {
                    category: category.clone(),
                    regex: None,
                });
            }
            let source = format!("(?i)(?:{})", alternatives.join("|"));
            let regex = Regex::new(&source).map_err(|source| ConfigError::InvalidPattern {
                category: category.id.clone(),
                pattern: category.patterns.join(", "),
                source,
            })?;
            Ok(Self {
                category: category.clone(),
                regex: Some(regex),
            })
        }

        fn matches(&self, text: &str) -> bool {
            self.regex.as_ref().is_some_and(|r| r.is_match(text))
        }
    }

    /// Compiled category list plus the walk bound; build once per invocation.
    pub struct CategoryResolver {
        matchers: Vec<CategoryMatcher>,
        max_depth: usize,
    }

    impl CategoryResolver {
        pub fn new(categories: &[Category], max_depth: usize) -> Result<Self, ConfigError> {
            let matchers = categories
                .iter()
                .map(CategoryMatcher::build)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Self {
                matchers,
                max_depth,
            })
        }

        pub fn from_config(config: &TimeblockConfig) -> Result<Self, ConfigError> {
            Self::new(&config.categories, config.max_depth)
        }

        /// True when at least one category can ever match.
        pub fn has_categories(&self) -> bool {
            self.matchers.iter().any(|m| m.regex.is_some())
        }

        /// First category, in configured order, mentioned by `text`.
        pub fn match_text(&self, text: &str) -> Option<&Category> {
            self.matchers
                .iter()
                .find(|m| m.matches(text))
                .map(|m| &m.category)
        }

        /// Resolve by fetching each ancestor from `store`.
        pub fn resolve<S>(&self, record_id: &str, store: &S) -> Option<&Category>
        where
            S: RecordStore + ?Sized,
        {
            self.walk(record_id, |id| match store.fetch(id) {
                Ok(node) => node.map(|n| NodeView {
                    text: Cow::Owned(n.text),
                    parent_id: n.parent_id.map(Cow::Owned),
                }),
                Err(err) => {
                    debug!("lookup of {:?} failed, treating as root: {err:#}", id);
                    None
                }
            })
        }

        /// Resolve against caller-supplied maps, without store round-trips.
        pub fn resolve_batch(&self, record_id: &str, snapshot: &ChainSnapshot) -> Option<&Category> {
            self.walk(record_id, |id| snapshot.view(id))
        }

        /// Inspect the record and then up to `max_depth` ancestors, nearest first.
        fn walk<'s, F>(&self, record_id: &str, mut lookup: F) -> Option<&Category>
        where
            F: FnMut(&str) -> Option<NodeView<'s>>,
        {
            if !self.has_categories() {
                return None;
            }
            let mut visited: HashSet<String> = HashSet::new();
            let mut current = record_id.to_string();
            let mut hops = 0;
            loop {
                if !visited.insert(current.clone()) {
                    debug!("ancestor cycle at {:?} while resolving {:?}", current, record_id);
                    return None;
                }
                let node = lookup(&current)?;
                if let Some(category) = self.match_text(&node.text) {
                    return Some(category);
                }
                let parent = node.parent_id?;
                if hops == self.max_depth {
                    debug!(
                        "no category within {} ancestors of {:?}",
                        self.max_depth, record_id
                    );
                    return None;
                }
                hops += 1;
                current = parent.into_owned();
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::cell::Cell;
        use std::collections::HashMap;

        fn work_personal() -> Vec<Category> {
            vec![
                Category::new("work", "Work", "#3366ff", &["#work"]),
                Category::new("personal", "Personal", "#33aa55", &["#personal"]),
            ]
        }

        fn resolver(categories: &[Category]) -> CategoryResolver {
            CategoryResolver::new(categories, DEFAULT_MAX_DEPTH).expect("resolver")
        }

        /// Chain `n0 -> n1 -> ... -> n{len-1}` with `text` placed on one node.
        fn linear_chain(len: usize, tagged: usize, text: &str) -> ChainSnapshot {
            let mut snapshot = ChainSnapshot::new();
            for k in 0..len {
                let parent = (k + 1 < len).then(|| format!("n{}", k + 1));
                let body = if k == tagged { text } else { "plain" };
                snapshot.insert(&format!("n{k}"), body, parent.as_deref());
            }
            snapshot
        }

        struct CountingStore {
            nodes: HashMap<String, StoredNode>,
            calls: Cell<usize>,
        }

        impl RecordStore for CountingStore {
            fn fetch(&self, id: &str) -> Result<Option<StoredNode>> {
                self.calls.set(self.calls.get() + 1);
                Ok(self.nodes.get(id).cloned())
            }
        }

        struct BrokenStore;

        impl RecordStore for BrokenStore {
            fn fetch(&self, id: &str) -> Result<Option<StoredNode>> {
                anyhow::bail!("store offline while fetching {id}")
            }
        }

        #[test]
        fn nearest_ancestor_wins() {
            let mut snapshot = ChainSnapshot::new();
            snapshot.insert("gp", "Saturday #personal", None);
            snapshot.insert("p", "Sprint tasks #work", Some("gp"));
            snapshot.insert("r", "10:00-11:00 review PR", Some("p"));

            let r = resolver(&work_personal());
            assert_eq!(r.resolve_batch("r", &snapshot).map(|c| c.id.as_str()), Some("work"));
            assert_eq!(r.resolve_batch("gp", &snapshot).map(|c| c.id.as_str()), Some("personal"));
        }

        #[test]
        fn configured_order_breaks_ties_on_one_node() {
            let mut snapshot = ChainSnapshot::new();
            snapshot.insert("r", "both #personal and #work", None);
            let r = resolver(&work_personal());
            assert_eq!(r.resolve_batch("r", &snapshot).map(|c| c.id.as_str()), Some("work"));
        }

        #[test]
        fn depth_limit_bounds_the_walk() {
            let r = resolver(&[Category::new("deep", "Deep", "", &["#deep"])]);
            let far = linear_chain(61, 55, "#deep");
            assert_eq!(r.resolve_batch("n0", &far), None);

            let edge = linear_chain(61, 50, "#deep");
            assert!(r.resolve_batch("n0", &edge).is_some());
            let past = linear_chain(61, 51, "#deep");
            assert_eq!(r.resolve_batch("n0", &past), None);
        }

        #[test]
        fn cycles_terminate_without_match() {
            let mut snapshot = ChainSnapshot::new();
            snapshot.insert("a", "alpha", Some("b"));
            snapshot.insert("b", "beta", Some("c"));
            snapshot.insert("c", "gamma", Some("a"));
            let r = resolver(&work_personal());
            assert_eq!(r.resolve_batch("a", &snapshot), None);

            // A match reached before the cycle closes still counts.
            snapshot.insert("c", "gamma #work", Some("a"));
            assert!(r.resolve_batch("a", &snapshot).is_some());
        }

        #[test]
        fn hash_form_respects_word_boundary() {
            let r = resolver(&[Category::new("tag", "Tag", "", &["#tag"])]);
            assert!(r.match_text("see #tag").is_some());
            assert!(r.match_text("see #TAG, later").is_some());
            assert!(r.match_text("see #tag2").is_none());
            assert!(r.match_text("see #tag-extra").is_none());
            assert!(r.match_text("see #tag_x").is_none());
        }

        #[test]
        fn page_refs_and_bare_names() {
            let r = resolver(&[
                Category::new("proj", "Project", "", &["[[Project X]]"]),
                Category::new("gym", "Gym", "", &["gym"]),
            ]);
            assert_eq!(r.match_text("on [[project x]] today").map(|c| c.id.as_str()), Some("proj"));
            assert_eq!(r.match_text("on #[[Project X]]").map(|c| c.id.as_str()), Some("proj"));
            assert_eq!(r.match_text("legs #gym").map(|c| c.id.as_str()), Some("gym"));
            assert_eq!(r.match_text("legs [[Gym]]").map(|c| c.id.as_str()), Some("gym"));
            assert_eq!(r.match_text("gym without marker"), None);
        }

        #[test]
        fn surface_form_expansion() {
            assert!(SurfaceForm::expand("  ").is_empty());
            assert!(SurfaceForm::expand("#").is_empty());
            assert_eq!(
                SurfaceForm::expand("#[[Deep Work]]"),
                vec![SurfaceForm::PageRef("Deep Work".into())]
            );
            assert_eq!(
                SurfaceForm::expand("deep work"),
                vec![SurfaceForm::PageRef("deep work".into())]
            );
            assert_eq!(
                SurfaceForm::expand("a.b"),
                vec![
                    SurfaceForm::PageRef("a.b".into()),
                    SurfaceForm::Tag("a.b".into())
                ]
            );
        }

        #[test]
        fn categories_without_patterns_count_as_unconfigured() {
            let r = resolver(&[Category::new("empty", "Empty", "", &["", " "])]);
            assert!(!r.has_categories());
            let r = resolver(&[]);
            assert!(!r.has_categories());
            let snapshot = linear_chain(3, 0, "#anything");
            assert_eq!(r.resolve_batch("n0", &snapshot), None);
        }

        #[test]
        fn single_and_batch_modes_agree() {
            let snapshot = linear_chain(8, 5, "block #work");
            let store = CountingStore {
                nodes: snapshot
                    .content_by_id
                    .keys()
                    .map(|id| (id.clone(), snapshot.fetch(id).unwrap().unwrap()))
                    .collect(),
                calls: Cell::new(0),
            };
            let r = resolver(&work_personal());
            let single = r.resolve("n0", &store).map(|c| c.id.clone());
            let batch = r.resolve_batch("n0", &snapshot).map(|c| c.id.clone());
            assert_eq!(single, batch);
            assert_eq!(single.as_deref(), Some("work"));
            assert_eq!(store.calls.get(), 6);

            // The snapshot is itself a store.
            assert_eq!(r.resolve("n0", &snapshot).map(|c| c.id.as_str()), Some("work"));
        }

        #[test]
        fn store_failures_resolve_to_none() {
            let r = resolver(&work_personal());
            assert_eq!(r.resolve("anything", &BrokenStore), None);
            assert_eq!(r.resolve_batch("missing", &ChainSnapshot::new()), None);
        }

        #[test]
        fn repeated_resolution_is_stable() {
            let snapshot = linear_chain(5, 3, "#personal #work");
            let r = resolver(&work_personal());
            let first = r.resolve_batch("n0", &snapshot).cloned();
            for _ in 0..10 {
                assert_eq!(r.resolve_batch("n0", &snapshot).cloned(), first);
            }
        }
    }
}

pub mod layout {
    //! Column placement for concurrent intervals.
    //!
    //! Step 1 colours the interval graph greedily: by start, longer first, input order on
    //! exact ties, each interval taking the leftmost column that is free at its start.
    //! Step 2 sweeps start/end events (ends before starts at equal times) and gives every
    //! member of an overlap group the width of that group's widest column span.

    use log::warn;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LayoutInput {
        pub id: String,
        pub start: u32,
        pub end: u32,
    }

    impl LayoutInput {
        pub fn new(id: impl Into<String>, start: u32, end: u32) -> Self {
            Self {
                id: id.into(),
                start,
                end,
            }
        }

        /// `(start, end)` with inverted input clamped to a zero-length span.
        fn span(&self) -> (u32, u32) {
            (self.start, self.end.max(self.start))
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LayoutSlot {
        pub id: String,
        pub column: usize,
        pub total_columns: usize,
    }

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    pub enum LayoutBreach {
        #[error("{inputs} inputs but {slots} slots")]
        LengthMismatch { inputs: usize, slots: usize },
        #[error("{id:?} sits in column {column} of {total_columns}")]
        ColumnOutOfRange {
            id: String,
            column: usize,
            total_columns: usize,
        },
        #[error("{first:?} and {second:?} overlap in column {column}")]
        SharedColumnOverlap {
            first: String,
            second: String,
            column: usize,
        },
    }

    /// Place `inputs`; slots come back in input order.
    pub fn layout(inputs: &[LayoutInput]) -> Vec<LayoutSlot> {
        let columns = assign_columns(inputs);
        let widths = group_widths(inputs, &columns);
        let slots: Vec<LayoutSlot> = inputs
            .iter()
            .zip(columns.into_iter().zip(widths))
            .map(|(input, (column, total_columns))| LayoutSlot {
                id: input.id.clone(),
                column,
                total_columns,
            })
            .collect();

        if let Err(breach) = verify(inputs, &slots) {
            debug_assert!(false, "layout invariant breached: {breach}");
            warn!("layout invariant breached ({breach}); using one column per interval");
            return one_column_each(inputs);
        }
        slots
    }

    fn assign_columns(inputs: &[LayoutInput]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..inputs.len()).collect();
        order.sort_by(|&a, &b| {
            let (sa, ea) = inputs[a].span();
            let (sb, eb) = inputs[b].span();
            sa.cmp(&sb)
                .then_with(|| (eb - sb).cmp(&(ea - sa)))
                .then_with(|| a.cmp(&b))
        });

        let mut frontiers: Vec<u32> = Vec::new();
        let mut columns = vec![0; inputs.len()];
        for idx in order {
            let (start, end) = inputs[idx].span();
            let column = match frontiers.iter().position(|&f| f <= start) {
                Some(c) => {
                    frontiers[c] = end;
                    c
                }
                None => {
                    frontiers.push(end);
                    frontiers.len() - 1
                }
            };
            columns[idx] = column;
        }
        columns
    }

    /// Processing order at equal times.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum EventKind {
        End,
        Start,
        /// End of a zero-length interval, after every start at that minute.
        MarkerEnd,
    }

    fn group_widths(inputs: &[LayoutInput], columns: &[usize]) -> Vec<usize> {
        let mut events: Vec<(u32, EventKind, usize)> = Vec::with_capacity(inputs.len() * 2);
        for (idx, input) in inputs.iter().enumerate() {
            let (start, end) = input.span();
            events.push((start, EventKind::Start, idx));
            let kind = if start == end {
                EventKind::MarkerEnd
            } else {
                EventKind::End
            };
            events.push((end, kind, idx));
        }
        events.sort_unstable();

        let mut widths = vec![1; inputs.len()];
        let mut active = 0usize;
        let mut group: Vec<usize> = Vec::new();
        let mut group_max = 0usize;
        for (_, kind, idx) in events {
            match kind {
                EventKind::Start => {
                    active += 1;
                    group.push(idx);
                    group_max = group_max.max(columns[idx]);
                }
                EventKind::End | EventKind::MarkerEnd => {
                    active -= 1;
                    // Widths flush per overlap group, so chained overlaps share one width.
                    if active == 0 {
                        for member in group.drain(..) {
                            widths[member] = group_max + 1;
                        }
                        group_max = 0;
                    }
                }
            }
        }
        widths
    }

    /// Check that shared columns never overlap and every column fits its width.
    pub fn verify(inputs: &[LayoutInput], slots: &[LayoutSlot]) -> Result<(), LayoutBreach> {
        if inputs.len() != slots.len() {
            return Err(LayoutBreach::LengthMismatch {
                inputs: inputs.len(),
                slots: slots.len(),
            });
        }
        for slot in slots {
            if slot.total_columns == 0 || slot.column >= slot.total_columns {
                return Err(LayoutBreach::ColumnOutOfRange {
                    id: slot.id.clone(),
                    column: slot.column,
                    total_columns: slot.total_columns,
                });
            }
        }

        let mut by_column: Vec<(usize, u32, u32, usize)> = slots
            .iter()
            .zip(inputs)
            .enumerate()
            .map(|(idx, (slot, input))| {
                let (start, end) = input.span();
                (slot.column, start, end, idx)
            })
            .collect();
        by_column.sort_unstable();

        // (column, end, owner) of the previous positive-length interval; markers never clash.
        let mut previous: Option<(usize, u32, usize)> = None;
        for (column, start, end, idx) in by_column {
            if start == end {
                continue;
            }
            if let Some((c, until, owner)) = previous {
                if c == column && start < until {
                    return Err(LayoutBreach::SharedColumnOverlap {
                        first: inputs[owner].id.clone(),
                        second: inputs[idx].id.clone(),
                        column,
                    });
                }
            }
            previous = Some((column, end, idx));
        }
        Ok(())
    }

    fn one_column_each(inputs: &[LayoutInput]) -> Vec<LayoutSlot> {
        let total_columns = inputs.len().max(1);
        inputs
            .iter()
            .enumerate()
            .map(|(column, input)| LayoutSlot {
                id: input.id.clone(),
                column,
                total_columns,
            })
            .collect()
    }

}

pub mod format {
    //! Rendering intervals back to text, and span helpers for callers that rewrite
    //! the original record text. Only the parsed `source_text` span is touched.

    use super::core::{MINUTES_PER_DAY, TimeInterval};
    use std::ops::Range;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum ClockStyle {
        /// `09:30-17:00`
        #[default]
        TwentyFourHour,
        /// `9:30am-5:00pm`
        TwelveHour,
    }

    pub fn format_interval(interval: &TimeInterval, style: ClockStyle) -> String {
        format_range(interval.start_minute, interval.end_minute, style)
    }

    pub fn format_range(start_minute: u32, end_minute: u32, style: ClockStyle) -> String {
        format!(
            "{}-{}",
            render_clock(start_minute, style),
            render_clock(end_minute, style)
        )
    }

    fn render_clock(minute: u32, style: ClockStyle) -> String {
        let minute = minute % MINUTES_PER_DAY;
        let (hour, min) = (minute / 60, minute % 60);
        match style {
            ClockStyle::TwentyFourHour => format!("{hour:02}:{min:02}"),
            ClockStyle::TwelveHour => {
                let suffix = if hour < 12 { "am" } else { "pm" };
                let display = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                format!("{display}:{min:02}{suffix}")
            }
        }
    }

    /// The parsed span, if `text` still holds `source_text` at that byte range.
    fn located(text: &str, interval: &TimeInterval) -> Option<Range<usize>> {
        let span = interval.span.clone();
        let found = text.get(span.clone())?;
        (!found.is_empty() && found == interval.source_text).then_some(span)
    }

    /// Replace the interval's span in `text` with a new range, leaving the rest intact.
    /// Text that no longer holds the span at its recorded position comes back unchanged.
    pub fn rewrite_interval(
        text: &str,
        interval: &TimeInterval,
        start_minute: u32,
        end_minute: u32,
        style: ClockStyle,
    ) -> String {
        let Some(span) = located(text, interval) else {
            return text.to_string();
        };
        let mut out = text.to_string();
        out.replace_range(span, &format_range(start_minute, end_minute, style));
        out
    }

    /// Remove the interval's span, joining the remaining halves with one space.
    pub fn strip_interval(text: &str, interval: &TimeInterval) -> String {
        let Some(span) = located(text, interval) else {
            return text.to_string();
        };
        let before = text[..span.start].trim_end();
        let after = text[span.end..].trim_start();
        match (before.is_empty(), after.is_empty()) {
            (true, _) => after.to_string(),
            (_, true) => before.to_string(),
            _ => format!("{before} {after}"),
        }
    }

}

pub mod pipeline {
    //! Batch orchestration: parse, classify, shift, sort, lay out.

    use crate::category::{CategoryResolver, ChainSnapshot};
    use crate::config::TimeblockConfig;
    use crate::core::{
        Category, ConfigError, MINUTES_PER_DAY, PositionedInterval, Record, TimeInterval,
    };
    use crate::layout::{LayoutInput, layout};
    use crate::parser::parse_interval;
    use log::debug;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ScopeRole {
        /// Shown as-is.
        #[default]
        Primary,
        /// Early entries of the next period, appended after the primary day.
        FollowingPeriod,
    }

    /// Records of one scope (a day page, a week's pages, ...).
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ScopeBatch {
        pub label: String,
        #[serde(default)]
        pub role: ScopeRole,
        #[serde(default)]
        pub records: Vec<Record>,
    }

    impl ScopeBatch {
        pub fn primary(label: &str, records: Vec<Record>) -> Self {
            Self {
                label: label.to_string(),
                role: ScopeRole::Primary,
                records,
            }
        }

        pub fn following(label: &str, records: Vec<Record>) -> Self {
            Self {
                label: label.to_string(),
                role: ScopeRole::FollowingPeriod,
                records,
            }
        }
    }

    struct Candidate<'a> {
        scope_index: usize,
        record: &'a Record,
        interval: TimeInterval,
        category: Option<Category>,
    }

    /// Run the whole pipeline over `batches`.
    ///
    /// `snapshot` supplies ancestors that are not part of the batches; batch records fill
    /// any gaps. Per-record problems exclude that record; only configuration errors
    /// are returned.
    pub fn run(
        config: &TimeblockConfig,
        batches: &[ScopeBatch],
        snapshot: Option<&ChainSnapshot>,
    ) -> Result<Vec<PositionedInterval>, ConfigError> {
        config.validate()?;
        let resolver = CategoryResolver::from_config(config)?;
        let require_category = resolver.has_categories();

        let mut chain = snapshot.cloned().unwrap_or_default();
        chain.fill_from(batches.iter().flat_map(|b| &b.records));

        let mut candidates = Vec::new();
        for (scope_index, batch) in batches.iter().enumerate() {
            for record in &batch.records {
                let Some(interval) = parse_interval(&record.text) else {
                    continue;
                };
                let interval = match batch.role {
                    ScopeRole::Primary => interval,
                    ScopeRole::FollowingPeriod => {
                        if interval.start_minute >= config.boundary_minute {
                            debug!(
                                "{:?}: {:?} starts past the carry-over boundary",
                                batch.label, record.id
                            );
                            continue;
                        }
                        interval.shifted(MINUTES_PER_DAY)
                    }
                };
                let category = resolver.resolve_batch(&record.id, &chain).cloned();
                if require_category && category.is_none() {
                    debug!("{:?}: {:?} has no category, skipped", batch.label, record.id);
                    continue;
                }
                candidates.push(Candidate {
                    scope_index,
                    record,
                    interval,
                    category,
                });
            }
        }

        candidates.sort_by(|a, b| {
            a.interval
                .start_minute
                .cmp(&b.interval.start_minute)
                .then_with(|| a.interval.end_minute.cmp(&b.interval.end_minute))
                .then_with(|| a.scope_index.cmp(&b.scope_index))
                .then_with(|| a.record.order.total_cmp(&b.record.order))
                .then_with(|| a.record.id.cmp(&b.record.id))
        });

        let inputs: Vec<LayoutInput> = candidates
            .iter()
            .map(|c| {
                LayoutInput::new(
                    c.record.id.clone(),
                    c.interval.start_minute,
                    c.interval.end_minute,
                )
            })
            .collect();
        let slots = layout(&inputs);

        Ok(candidates
            .into_iter()
            .zip(slots)
            .map(|(c, slot)| PositionedInterval {
                record: c.record.clone(),
                interval: c.interval,
                category: c.category,
                column: slot.column,
                total_columns: slot.total_columns,
            })
            .collect())
    }

    /// Entries running at `minute` (the caller's "now").
    pub fn active_at(results: &[PositionedInterval], minute: u32) -> Vec<&PositionedInterval> {
        results
            .iter()
            .filter(|p| p.interval.contains_minute(minute))
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn rec(id: &str, text: &str, parent: Option<&str>) -> Record {
            Record::new(id, text, parent)
        }

        fn ids(results: &[PositionedInterval]) -> Vec<&str> {
            results.iter().map(|p| p.record.id.as_str()).collect()
        }

        fn day() -> ScopeBatch {
            ScopeBatch::primary(
                "2025-03-03",
                vec![
                    rec("root", "Monday #work", None),
                    rec("b", "9:30-11:00 review", Some("root")),
                    rec("a", "9:00-10:00 standup", Some("root")),
                    rec("c", "11:40-12:00 lunch #personal", None),
                    rec("d", "14:00-15:00 untagged errand", None),
                    rec("e", "no time, just notes", Some("root")),
                ],
            )
        }

        fn categories() -> Vec<Category> {
            vec![
                Category::new("work", "Work", "#3366ff", &["#work"]),
                Category::new("personal", "Personal", "#33aa55", &["#personal"]),
            ]
        }

        #[test]
        fn uncategorized_entries_dropped_when_categories_exist() {
            let config = TimeblockConfig::with_categories(categories());
            let out = run(&config, &[day()], None).expect("run");
            assert_eq!(ids(&out), vec!["a", "b", "c"]);
            assert_eq!(out[0].category.as_ref().map(|c| c.id.as_str()), Some("work"));
            assert_eq!(out[2].category.as_ref().map(|c| c.id.as_str()), Some("personal"));
            assert_eq!((out[0].column, out[0].total_columns), (0, 2));
            assert_eq!((out[1].column, out[1].total_columns), (1, 2));
            assert_eq!((out[2].column, out[2].total_columns), (0, 1));
        }

        #[test]
        fn no_categories_accepts_everything() {
            let out = run(&TimeblockConfig::default(), &[day()], None).expect("run");
            assert_eq!(ids(&out), vec!["a", "b", "c", "d"]);
            assert!(out.iter().all(|p| p.category.is_none()));
        }

        #[test]
        fn following_period_is_shifted_and_bounded() {
            let next = ScopeBatch::following(
                "2025-03-04",
                vec![
                    rec("early", "1:00-2:00 night shift", None),
                    rec("edge", "5:00-6:00 too late", None),
                    rec("late", "13:00-14:00 afternoon", None),
                ],
            );
            let out = run(&TimeblockConfig::default(), &[day(), next], None).expect("run");
            let last = out.last().expect("entries");
            assert_eq!(last.record.id, "early");
            assert_eq!(
                (last.interval.start_minute, last.interval.end_minute),
                (1500, 1560)
            );
            assert_eq!(last.interval.source_text, "1:00-2:00");
            assert!(!ids(&out).contains(&"edge"));
            assert!(!ids(&out).contains(&"late"));
        }

        #[test]
        fn caller_snapshot_supplies_missing_ancestors() {
            let batch = ScopeBatch::primary("day", vec![rec("x", "8:00-9:00 emails", Some("parent"))]);
            let config = TimeblockConfig::with_categories(categories());
            assert!(run(&config, &[batch.clone()], None).expect("run").is_empty());

            let mut snapshot = ChainSnapshot::new();
            snapshot.insert("parent", "Admin #work", None);
            let out = run(&config, &[batch], Some(&snapshot)).expect("run");
            assert_eq!(ids(&out), vec!["x"]);
        }

        #[test]
        fn invalid_config_is_reported() {
            let mut config = TimeblockConfig::default();
            config.max_depth = 0;
            assert!(matches!(
                run(&config, &[day()], None),
                Err(ConfigError::InvalidMaxDepth(0))
            ));
        }

        #[test]
        fn repeated_runs_are_byte_identical() {
            let config = TimeblockConfig::with_categories(categories());
            let batches = [day(), ScopeBatch::following("next", vec![rec("n", "0:30-1:00 #work", None)])];
            let first = serde_json::to_string(&run(&config, &batches, None).expect("run")).unwrap();
            let second = serde_json::to_string(&run(&config, &batches, None).expect("run")).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn ties_sort_by_scope_then_order() {
            let mut one = rec("one", "10:00-11:00", None);
            one.order = 2.0;
            let mut two = rec("two", "10:00-11:00", None);
            two.order = 1.0;
            let out = run(
                &TimeblockConfig::default(),
                &[ScopeBatch::primary("day", vec![one, two])],
                None,
            )
            .expect("run");
            assert_eq!(ids(&out), vec!["two", "one"]);
            assert_eq!(out[0].column, 0);
            assert_eq!(out[1].column, 1);
        }

        #[test]
        fn active_entries_at_a_minute() {
            let out = run(&TimeblockConfig::default(), &[day()], None).expect("run");
            let now: Vec<&str> = active_at(&out, 9 * 60 + 45)
                .into_iter()
                .map(|p| p.record.id.as_str())
                .collect();
            assert_eq!(now, vec!["a", "b"]);
            assert!(active_at(&out, 10 * 60 + 59).iter().any(|p| p.record.id == "b"));
            assert!(active_at(&out, 11 * 60).is_empty());
        }
    }
}

pub use category::{CategoryResolver, ChainSnapshot};
pub use config::TimeblockConfig;
pub use layout::layout;
pub use parser::parse_interval;
pub use pipeline::{ScopeBatch, ScopeRole, run};
