use crate::{
    error::{AppError, AppResult},
    models::{PaymentDetails, PaymentMethod},
};

/// Payment declaration as submitted. No money moves; this only records
/// which method the customer picked.
#[derive(Debug, Clone, Default)]
pub struct PaymentInput {
    pub method: Option<String>,
    pub card_brand: Option<String>,
    pub card_last4: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn validate_payment(input: &PaymentInput) -> AppResult<PaymentDetails> {
    let method = match non_blank(input.method.as_deref()) {
        None => PaymentMethod::Mock,
        Some(tag) => tag
            .parse::<PaymentMethod>()
            .map_err(|_| AppError::InvalidPaymentMethod)?,
    };

    match method {
        PaymentMethod::Card => {
            let card_brand = non_blank(input.card_brand.as_deref()).map(str::to_string);
            let card_last4 = match non_blank(input.card_last4.as_deref()) {
                None => None,
                Some(raw) => {
                    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
                    if digits.len() != 4 {
                        return Err(AppError::InvalidCardDigits);
                    }
                    Some(digits)
                }
            };
            Ok(PaymentDetails {
                method,
                card_brand,
                card_last4,
            })
        }
        PaymentMethod::Cash | PaymentMethod::Mock => Ok(PaymentDetails {
            method,
            card_brand: None,
            card_last4: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(method: Option<&str>, brand: Option<&str>, last4: Option<&str>) -> PaymentInput {
        PaymentInput {
            method: method.map(String::from),
            card_brand: brand.map(String::from),
            card_last4: last4.map(String::from),
        }
    }

    #[test]
    fn missing_or_blank_method_defaults_to_mock() {
        for method in [None, Some(""), Some("   ")] {
            let details = validate_payment(&input(method, None, None)).unwrap();
            assert_eq!(details.method, PaymentMethod::Mock);
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        for method in ["Bitcoin", "card", "CASH"] {
            assert!(matches!(
                validate_payment(&input(Some(method), None, None)),
                Err(AppError::InvalidPaymentMethod)
            ));
        }
    }

    #[test]
    fn card_digits_are_normalized() {
        let details =
            validate_payment(&input(Some("Card"), Some("  Visa "), Some("4-4-1-2"))).unwrap();
        assert_eq!(details.method, PaymentMethod::Card);
        assert_eq!(details.card_brand.as_deref(), Some("Visa"));
        assert_eq!(details.card_last4.as_deref(), Some("4412"));
    }

    #[test]
    fn card_digits_must_be_exactly_four() {
        for last4 in ["ab12", "123", "12345", "1 2 3 4 5"] {
            assert!(matches!(
                validate_payment(&input(Some("Card"), None, Some(last4))),
                Err(AppError::InvalidCardDigits)
            ));
        }
    }

    #[test]
    fn card_without_details_is_allowed() {
        let details = validate_payment(&input(Some(" Card "), Some(" "), None)).unwrap();
        assert_eq!(details.method, PaymentMethod::Card);
        assert_eq!(details.card_brand, None);
        assert_eq!(details.card_last4, None);
    }

    #[test]
    fn non_card_methods_discard_card_details() {
        let details = validate_payment(&input(Some("Cash"), Some("Visa"), Some("ab12"))).unwrap();
        assert_eq!(details.method, PaymentMethod::Cash);
        assert_eq!(details.card_brand, None);
        assert_eq!(details.card_last4, None);
    }
}
