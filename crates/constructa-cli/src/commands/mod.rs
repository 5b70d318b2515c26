pub mod consortium;
pub mod financing;
pub mod market;
pub mod metrics;
pub mod scenarios;

use rust_decimal::Decimal;

/// Parse "MONTH:AMOUNT[:AGIO]" into its parts.
pub(crate) fn parse_event(
    raw: &str,
) -> Result<(u32, Decimal, Decimal), Box<dyn std::error::Error>> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("Dropdown must be MONTH:AMOUNT[:AGIO], got '{}'", raw).into());
    }
    let month: u32 = parts[0]
        .trim()
        .parse()
        .map_err(|_| format!("Invalid dropdown month '{}'", parts[0]))?;
    let amount: Decimal = parts[1]
        .trim()
        .parse()
        .map_err(|_| format!("Invalid dropdown amount '{}'", parts[1]))?;
    let agio: Decimal = match parts.get(2) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("Invalid dropdown agio '{}'", raw))?,
        None => Decimal::ZERO,
    };
    Ok((month, amount, agio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_event_with_and_without_agio() {
        assert_eq!(
            parse_event("12:100000:20").unwrap(),
            (12, dec!(100000), dec!(20))
        );
        assert_eq!(
            parse_event("24:5000.50").unwrap(),
            (24, dec!(5000.50), Decimal::ZERO)
        );
        assert!(parse_event("12").is_err());
        assert!(parse_event("x:100").is_err());
    }
}
