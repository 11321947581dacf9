//! Pure text conversions between what the storefront renders and typed values.

use crate::error::{E2eError, Result};

/// Convert a catalog display name into the suffix used by its button ids.
///
/// `"Sauce Labs Backpack"` becomes `"sauce-labs-backpack"`: lowercased, with
/// each space replaced by a hyphen. Only an empty name has no id.
pub fn slugify(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(E2eError::format_error("cannot slugify an empty item name"));
    }
    Ok(name.to_lowercase().replace(' ', "-"))
}

/// Parse a `"Label: $X.XX"` summary line into its amount.
pub fn parse_money_label(text: &str) -> Result<f64> {
    let (_, amount) = text
        .rsplit_once('$')
        .ok_or_else(|| E2eError::format_error(format!("no '$' amount in {:?}", text)))?;
    parse_amount(amount, text)
}

/// Parse a bare price such as `"$29.99"`.
pub fn parse_price(text: &str) -> Result<f64> {
    let amount = text
        .trim()
        .strip_prefix('$')
        .ok_or_else(|| E2eError::format_error(format!("price {:?} does not start with '$'", text)))?;
    parse_amount(amount, text)
}

fn parse_amount(amount: &str, original: &str) -> Result<f64> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| E2eError::format_error(format!("invalid amount {:?} in {:?}", amount, original)))
}

/// Parse the cart badge text into an item count.
pub fn parse_badge(text: &str) -> Result<usize> {
    text.trim()
        .parse::<usize>()
        .map_err(|_| E2eError::format_error(format!("cart badge {:?} is not a count", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_catalog_names() {
        assert_eq!(slugify("Sauce Labs Backpack").unwrap(), "sauce-labs-backpack");
        assert_eq!(slugify("Sauce Labs Bolt T-Shirt").unwrap(), "sauce-labs-bolt-t-shirt");
        assert_eq!(
            slugify("Test.allTheThings() T-Shirt (Red)").unwrap(),
            "test.allthethings()-t-shirt-(red)"
        );
    }

    #[test]
    fn test_slugify_keeps_punctuation() {
        assert_eq!(slugify("Bob's \"Best\" <Pack>").unwrap(), "bob's-\"best\"-<pack>");
        assert_eq!(slugify("Sauce  Labs").unwrap(), "sauce--labs");
    }

    #[test]
    fn test_slugify_rejects_empty_names() {
        assert!(matches!(slugify(""), Err(E2eError::Format(_))));
        assert!(matches!(slugify("  "), Err(E2eError::Format(_))));
    }

    #[test]
    fn test_parse_money_label() {
        assert_eq!(parse_money_label("Item total: $29.99").unwrap(), 29.99);
        assert_eq!(parse_money_label("Tax: $2.40").unwrap(), 2.40);
        assert_eq!(parse_money_label("Total: $32.39").unwrap(), 32.39);
    }

    #[test]
    fn test_parse_money_label_format_errors() {
        assert!(matches!(parse_money_label("Total: 32.39"), Err(E2eError::Format(_))));
        assert!(matches!(parse_money_label("Total: $"), Err(E2eError::Format(_))));
        assert!(matches!(parse_money_label("Total: $abc"), Err(E2eError::Format(_))));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$7.99").unwrap(), 7.99);
        assert!(parse_price("7.99").is_err());
    }

    #[test]
    fn test_parse_badge() {
        assert_eq!(parse_badge("3").unwrap(), 3);
        assert_eq!(parse_badge(" 1\n").unwrap(), 1);
        assert!(matches!(parse_badge("one"), Err(E2eError::Format(_))));
    }
}
