/// Formats a phone number the way the CRM expects (`+7XXXXXXXXXX`).
///
/// - 11 digits starting with the `8` trunk prefix: `8` becomes `+7`
/// - 11 digits starting with `7`: `+` is prepended
/// - 10 digits: `+7` is prepended
/// - input already starting with `+` is kept as is
/// - otherwise `+7` plus the last 10 digits, or the input unchanged when
///   it has fewer than 10 digits
pub fn format_international(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 && digits.starts_with('8') {
        format!("+7{}", &digits[1..])
    } else if digits.len() == 11 && digits.starts_with('7') {
        format!("+{}", digits)
    } else if digits.len() == 10 {
        format!("+7{}", digits)
    } else if phone.starts_with('+') {
        phone.to_string()
    } else if digits.len() >= 10 {
        format!("+7{}", &digits[digits.len() - 10..])
    } else {
        phone.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trunk_prefix_becomes_country_code() {
        assert_eq!(format_international("8 (937) 123-43-78"), "+79371234378");
    }

    #[test]
    fn country_code_gets_plus() {
        assert_eq!(format_international("79371234378"), "+79371234378");
    }

    #[test]
    fn national_number_gets_country_code() {
        assert_eq!(format_international("937-123-43-78"), "+79371234378");
    }

    #[test]
    fn already_international_is_kept() {
        assert_eq!(format_international("+79371234378"), "+79371234378");
        assert_eq!(format_international("+44 20 7946 0958"), "+44 20 7946 0958");
    }

    #[test]
    fn long_number_keeps_last_ten_digits() {
        assert_eq!(format_international("0079371234378"), "+79371234378");
    }

    #[test]
    fn short_input_is_returned_unchanged() {
        assert_eq!(format_international("12345"), "12345");
    }
}
