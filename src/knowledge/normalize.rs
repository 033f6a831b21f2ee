//! Converts the many ways a record can name its date into one year interval.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::chronology::{Dynasty, REIGNS, Reign};
use super::numerals::parse_numeral;
use super::record::Record;

/// Canonical `[start_year, end_year]` of a record.
///
/// Either both years are present with `start_year <= end_year`, or both are absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
	/// First year; BCE years are negative.
	pub start_year: Option<i32>,
	/// Last year, never before `start_year`.
	pub end_year: Option<i32>,
	/// Dynasty the date was resolved through, if any.
	pub dynasty: Option<Dynasty>,
}

impl TimeInterval {
	/// Interval covering the given years; reversed input is swapped.
	pub fn span(a: i32, b: i32) -> Self {
		if a > b {
			debug!("reversed year range {}-{}, swapping", a, b);
		}
		Self {
			start_year: Some(a.min(b)),
			end_year: Some(a.max(b)),
			dynasty: None,
		}
	}

	/// Interval of a single year.
	pub fn year(year: i32) -> Self {
		Self::span(year, year)
	}

	fn of_dynasty(dynasty: Dynasty) -> Self {
		let (start, end) = dynasty.span();
		Self::span(start, end).with_dynasty(dynasty)
	}

	fn with_dynasty(mut self, dynasty: Dynasty) -> Self {
		self.dynasty = Some(dynasty);
		self
	}

	/// Both bounds, when the record could be dated at all.
	pub fn bounds(&self) -> Option<(i32, i32)> {
		match (self.start_year, self.end_year) {
			(Some(start), Some(end)) => Some((start, end)),
			(Some(start), None) => Some((start, start)),
			_ => None,
		}
	}

	/// True when the record could not be dated.
	pub fn is_empty(&self) -> bool {
		self.start_year.is_none()
	}
}

static REIGN_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
	let names: Vec<&str> = REIGNS.iter().map(|r| r.name).collect();
	Regex::new(&format!(
		r"({})(元|[零〇一二两三四五六七八九十百]+|\d+)\s*年",
		names.join("|")
	))
	.expect("reign names form a valid pattern")
});

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(前)?(\d+)\s*[-–—－~到至]\s*(前)?(\d+)").expect("valid range pattern")
});

static PAREN_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[(（]\s*(前)?(\d+)\s*[-–—－~到至]\s*(前)?(\d+)\s*[)）]")
		.expect("valid parenthesized range pattern")
});

static SINGLE_YEAR_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(前)?(\d+)\s*年").expect("valid year pattern"));

static LEADING_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*(?:(公元前|前|-)|公元)?\s*(\d+)").expect("valid leading year pattern")
});

fn signed(bce: Option<regex::Match<'_>>, digits: &str) -> Option<i32> {
	let value: i32 = digits.parse().ok()?;
	Some(if bce.is_some() { -value } else { value })
}

/// "光绪十年" style phrase: era name followed by a year number.
pub fn reign_year(text: &str) -> Option<(i32, Dynasty)> {
	let caps = REIGN_YEAR_RE.captures(text)?;
	let reign = Reign::named(caps.get(1)?.as_str())?;
	let numeral = caps.get(2)?.as_str();
	let n = if numeral == "元" {
		1
	} else {
		parse_numeral(numeral)?
	};
	let Some(year) = reign.year(n) else {
		debug!("{}{}年 is not a usable year", reign.name, numeral);
		return None;
	};
	if year > reign.end {
		debug!("{}{}年 runs past the end of the era", reign.name, numeral);
	}
	Some((year, reign.dynasty))
}

/// Two explicit years, e.g. "1276-1293" or "前256到前251".
pub fn explicit_range(text: &str) -> Option<(i32, i32)> {
	let caps = RANGE_RE.captures(text)?;
	Some((
		signed(caps.get(1), caps.get(2)?.as_str())?,
		signed(caps.get(3), caps.get(4)?.as_str())?,
	))
}

fn parenthesized_range(text: &str) -> Option<(i32, i32)> {
	let caps = PAREN_RANGE_RE.captures(text)?;
	Some((
		signed(caps.get(1), caps.get(2)?.as_str())?,
		signed(caps.get(3), caps.get(4)?.as_str())?,
	))
}

/// "N年" anywhere in the text.
pub fn marked_year(text: &str) -> Option<i32> {
	let caps = SINGLE_YEAR_RE.captures(text)?;
	signed(caps.get(1), caps.get(2)?.as_str())
}

/// Integer at the start of the text ("1276", "-256", "公元前256年").
pub fn leading_year(text: &str) -> Option<i32> {
	let caps = LEADING_YEAR_RE.captures(text)?;
	signed(caps.get(1), caps.get(2)?.as_str())
}

fn reign_interval(text: &str) -> Option<TimeInterval> {
	reign_year(text).map(|(year, dynasty)| TimeInterval::year(year).with_dynasty(dynasty))
}

/// A dynasty named in free text, refined by a parenthesized range and then by
/// an explicit "N年" when `with_marked_year` is set.
fn dynasty_interval(text: &str, with_marked_year: bool) -> Option<TimeInterval> {
	let dynasty = Dynasty::find_in(text)?;
	let mut interval = TimeInterval::of_dynasty(dynasty);
	if let Some((a, b)) = parenthesized_range(text) {
		interval = TimeInterval::span(a, b).with_dynasty(dynasty);
	}
	if with_marked_year {
		if let Some(year) = marked_year(text) {
			interval = TimeInterval::year(year).with_dynasty(dynasty);
		}
	}
	Some(interval)
}

fn field(text: &Option<String>) -> Option<&str> {
	text.as_deref().filter(|t| !t.trim().is_empty())
}

/// Normalizes the date of a record.
///
/// Sources are tried from the most specific to the coarsest and the first one
/// that yields a year wins: reign year in the label, then the `year` field
/// (reign year, explicit range, leading integer, dynasty), the `period` field
/// (reign year, dynasty, range), an exact `dynasty` field, the label (dynasty,
/// "N年", range) and finally a dynasty mentioned in the description.
pub fn normalize(record: &Record) -> TimeInterval {
	let label = field(&record.label).or(field(&record.label_alt));

	if let Some(found) = label.and_then(reign_interval) {
		return found;
	}

	if let Some(year) = field(&record.year) {
		if let Some(found) = reign_interval(year) {
			return found;
		}
		if let Some((a, b)) = explicit_range(year) {
			return TimeInterval::span(a, b);
		}
		if let Some(single) = leading_year(year) {
			return TimeInterval::year(single);
		}
		if let Some(found) = dynasty_interval(year, true) {
			return found;
		}
	}

	if let Some(period) = field(&record.period) {
		if let Some(found) = reign_interval(period) {
			return found;
		}
		if let Some(found) = dynasty_interval(period, false) {
			return found;
		}
		if let Some((a, b)) = explicit_range(period) {
			return TimeInterval::span(a, b);
		}
	}

	if let Some(dynasty) = field(&record.dynasty).and_then(Dynasty::from_alias) {
		return TimeInterval::of_dynasty(dynasty);
	}

	if let Some(label) = label {
		if let Some(found) = dynasty_interval(label, true) {
			return found;
		}
		if let Some(year) = marked_year(label) {
			return TimeInterval::year(year);
		}
		if let Some((a, b)) = explicit_range(label) {
			return TimeInterval::span(a, b);
		}
	}

	if let Some(found) = field(&record.description).and_then(|d| dynasty_interval(d, true)) {
		return found;
	}

	TimeInterval::default()
}
