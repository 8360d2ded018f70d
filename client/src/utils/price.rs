use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use types::{NativeCurrency, U256};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("{0:?} is not a number")]
    Invalid(String),
    #[error("price cannot be negative")]
    Negative,
    #[error("at most {0} decimals are allowed")]
    TooPrecise(u8),
    #[error("price is too large")]
    Overflow,
}

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exp))
}

/// Parse a decimal amount (e.g `"0.25"`) into the smallest unit
/// of a currency with `decimals` decimals
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, PriceError> {
    let amount = amount.trim();
    let value = Decimal::from_str(amount).map_err(|_| PriceError::Invalid(amount.into()))?;
    if value.is_zero() {
        return Ok(U256::ZERO);
    }
    if value.is_sign_negative() {
        return Err(PriceError::Negative);
    }

    let value = value.normalize();
    let scale = value.scale();
    if scale > decimals as u32 {
        return Err(PriceError::TooPrecise(decimals));
    }

    let mantissa = U256::from(value.mantissa().unsigned_abs());
    pow10(decimals as u32 - scale)
        .and_then(|factor| mantissa.checked_mul(factor))
        .ok_or(PriceError::Overflow)
}

/// Inverse of [`parse_units`], trailing zeros are dropped
pub fn format_units(value: U256, decimals: u8) -> String {
    let Some(divisor) = pow10(decimals as u32) else {
        return value.to_string();
    };
    let whole = value / divisor;
    let frac = value % divisor;
    if frac.is_zero() {
        return whole.to_string();
    }

    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Human friendly price, e.g `1.5 Flow`
pub fn price_label(price: U256, currency: &NativeCurrency) -> String {
    format!("{} {}", format_units(price, currency.decimals), currency.name)
}
