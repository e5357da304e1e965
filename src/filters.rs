//! Input filters for numeric, money, and phone fields.
//!
//! These are pure text transforms. Callers apply them on every input event
//! so the control only ever displays an accepted shape; the validator then
//! sees already-filtered values (a money control holds `$ 1.234,56` or
//! nothing, never half-typed garbage).

/// Strips every character that is not a digit or in `keep`.
///
/// # Examples
///
/// ```
/// use stepform::filters::filter_number;
///
/// assert_eq!(filter_number("a1b2-c3", &[]), "123");
/// assert_eq!(filter_number("1.234,56", &[',']), "1234,56");
/// ```
pub fn filter_number(value: &str, keep: &[char]) -> String {
	value
		.chars()
		.filter(|c| c.is_ascii_digit() || keep.contains(c))
		.collect()
}

/// Groups the integer part in thousands and truncates the decimal part.
///
/// The value is split once on `decimals`; anything after a second decimal
/// separator is discarded. A `decimal_steps` of zero drops the decimal part
/// entirely.
///
/// # Examples
///
/// ```
/// use stepform::filters::filter_formatted_quantity;
///
/// assert_eq!(filter_formatted_quantity("1234567", '.', ',', 0), "1.234.567");
/// assert_eq!(filter_formatted_quantity("1234,5678", '.', ',', 2), "1.234,56");
/// ```
pub fn filter_formatted_quantity(
	value: &str,
	thousands: char,
	decimals: char,
	decimal_steps: usize,
) -> String {
	let mut parts = value.split(decimals);
	let root = group_thousands(parts.next().unwrap_or_default(), thousands);
	let decimal_part = parts.next().unwrap_or_default();

	if decimal_steps > 0 && !decimal_part.is_empty() {
		let truncated: String = decimal_part.chars().take(decimal_steps).collect();
		format!("{root}{decimals}{truncated}")
	} else {
		root
	}
}

/// Renders a raw amount as `currency amount`, e.g. `$ 1.234.567`.
///
/// An empty value or a bare currency symbol clears the control, which is
/// what lets the validator treat it as never typed.
///
/// # Examples
///
/// ```
/// use stepform::filters::filter_money_amount;
///
/// assert_eq!(filter_money_amount("1234567", "$", '.', ',', 0), "$ 1.234.567");
/// assert_eq!(filter_money_amount("$", "$", '.', ',', 0), "");
/// ```
pub fn filter_money_amount(
	value: &str,
	currency: &str,
	thousands: char,
	decimals: char,
	decimal_steps: usize,
) -> String {
	if value.is_empty() || value == currency {
		return String::new();
	}

	let digits = filter_number(value, &[decimals]);
	let amount = filter_formatted_quantity(&digits, thousands, decimals, decimal_steps);
	format!("{currency} {amount}")
}

/// Strips everything that cannot appear in a phone number.
///
/// Digits, `+`, `-`, parentheses, and spaces survive.
///
/// # Examples
///
/// ```
/// use stepform::filters::filter_phone_number;
///
/// assert_eq!(filter_phone_number("+54 (11) 4444-5555x"), "+54 (11) 4444-5555");
/// ```
pub fn filter_phone_number(value: &str) -> String {
	value
		.chars()
		.filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
		.collect()
}

// Inserts `thousands` between digit triplets, counting from the right.
fn group_thousands(root: &str, thousands: char) -> String {
	let chars: Vec<char> = root.chars().collect();
	let mut grouped = String::with_capacity(chars.len() + chars.len() / 3);

	for (i, c) in chars.iter().enumerate() {
		if i > 0
			&& (chars.len() - i) % 3 == 0
			&& c.is_ascii_digit()
			&& chars[i - 1].is_ascii_digit()
		{
			grouped.push(thousands);
		}
		grouped.push(*c);
	}

	grouped
}
