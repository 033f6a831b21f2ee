//! Chinese numeral conversion for "year N of an era" phrases.

/// Converts a Chinese or Arabic numeral to its value.
///
/// Handles the digits 〇/零 through 九 (and 两), the units 十 and 百 with
/// positional composition (十五 = 15, 二十 = 20, 一百一十八 = 118, 一百零五 = 105),
/// and plain ASCII digit strings. Returns `None` for empty or unrecognised input.
pub fn parse_numeral(text: &str) -> Option<u32> {
	let text = text.trim();
	if text.is_empty() {
		return None;
	}
	if text.bytes().all(|b| b.is_ascii_digit()) {
		return text.parse().ok();
	}

	let mut total = 0u32;
	let mut pending: Option<u32> = None;
	for c in text.chars() {
		match c {
			'十' => {
				total += pending.take().unwrap_or(1) * 10;
			}
			'百' => {
				total += pending.take().unwrap_or(1) * 100;
			}
			_ => pending = Some(digit(c)?),
		}
	}
	Some(total + pending.unwrap_or(0))
}

fn digit(c: char) -> Option<u32> {
	Some(match c {
		'零' | '〇' => 0,
		'一' => 1,
		'二' | '两' => 2,
		'三' => 3,
		'四' => 4,
		'五' => 5,
		'六' => 6,
		'七' => 7,
		'八' => 8,
		'九' => 9,
		_ => return None,
	})
}

#[cfg(test)]
mod tests {
	use super::parse_numeral;

	const DIGITS: [&str; 10] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

	fn spell(n: u32) -> String {
		match n {
			0..=9 => DIGITS[n as usize].to_string(),
			10 => "十".into(),
			11..=19 => format!("十{}", DIGITS[(n % 10) as usize]),
			_ if n % 10 == 0 => format!("{}十", DIGITS[(n / 10) as usize]),
			_ => format!("{}十{}", DIGITS[(n / 10) as usize], DIGITS[(n % 10) as usize]),
		}
	}

	#[test]
	fn one_through_ninety_nine() {
		for n in 1..=99 {
			assert_eq!(parse_numeral(&spell(n)), Some(n), "{}", spell(n));
		}
	}

	#[test]
	fn explicit_ten_prefix() {
		assert_eq!(parse_numeral("一十"), Some(10));
		assert_eq!(parse_numeral("一十五"), Some(15));
	}

	#[test]
	fn hundreds() {
		assert_eq!(parse_numeral("百"), Some(100));
		assert_eq!(parse_numeral("一百"), Some(100));
		assert_eq!(parse_numeral("一百零五"), Some(105));
		assert_eq!(parse_numeral("一百一十八"), Some(118));
		assert_eq!(parse_numeral("两百"), Some(200));
	}

	#[test]
	fn arabic_digits() {
		assert_eq!(parse_numeral("13"), Some(13));
		assert_eq!(parse_numeral(" 7 "), Some(7));
	}

	#[test]
	fn rejects_other_text() {
		assert_eq!(parse_numeral(""), None);
		assert_eq!(parse_numeral("元"), None);
		assert_eq!(parse_numeral("十a"), None);
	}
}
