/// Normalizes a Kenyan mobile number to the `254[17]XXXXXXXX` MSISDN form
/// Safaricom expects on STK push requests.
///
/// Accepted input forms: `07XXXXXXXX`, `01XXXXXXXX`, `2547XXXXXXXX`,
/// `2541XXXXXXXX`. Anything else is rejected so callers can fail before
/// contacting the gateway.
pub fn normalize_kenyan_msisdn(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    match trimmed.len() {
        10 if trimmed.starts_with("07") || trimmed.starts_with("01") => {
            Some(format!("254{}", &trimmed[1..]))
        }
        12 if trimmed.starts_with("2547") || trimmed.starts_with("2541") => {
            Some(trimmed.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_local_safaricom_form() {
        assert_eq!(
            normalize_kenyan_msisdn("0712345678").as_deref(),
            Some("254712345678")
        );
    }

    #[test]
    fn normalizes_local_airtel_form() {
        assert_eq!(
            normalize_kenyan_msisdn("0112345678").as_deref(),
            Some("254112345678")
        );
    }

    #[test]
    fn accepts_already_normalized_forms() {
        assert_eq!(
            normalize_kenyan_msisdn("254712345678").as_deref(),
            Some("254712345678")
        );
        assert_eq!(
            normalize_kenyan_msisdn("254112345678").as_deref(),
            Some("254112345678")
        );
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            normalize_kenyan_msisdn(" 0712345678 ").as_deref(),
            Some("254712345678")
        );
    }

    #[test]
    fn rejects_everything_else() {
        for input in [
            "",
            "0712345",
            "07123456789",
            "0812345678",
            "255712345678",
            "2546123456789",
            "+254712345678",
            "07 12345678",
            "notaphone",
        ] {
            assert!(
                normalize_kenyan_msisdn(input).is_none(),
                "expected {input:?} to be rejected"
            );
        }
    }
}
