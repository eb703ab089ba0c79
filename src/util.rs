/// Price with thousands separators and two decimals, followed by the currency
/// code when one is known.
pub fn format_price(value: f64, currency: &str) -> String {
    if !value.is_finite() {
        return "n/a".to_owned();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let currency = currency.trim();
    if currency.is_empty() {
        format!("{sign}{grouped}.{fraction}")
    } else {
        format!("{sign}{grouped}.{fraction} {currency}")
    }
}

/// Signed percentage for a price-change ratio (`1.0` means unchanged).
pub fn format_change(ratio: f64) -> String {
    if !ratio.is_finite() {
        return "n/a".to_owned();
    }
    let percent = (ratio - 1.0) * 100.0;
    if percent.abs() < 0.005 {
        "0.00%".to_owned()
    } else {
        format!("{percent:+.2}%")
    }
}
