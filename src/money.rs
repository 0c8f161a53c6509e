use anyhow::{Context, Error, Result, bail};
use num_traits::Zero;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Currency amount as reported by the POS export.
///
/// Arithmetic never rounds; call [`Money::round_cents`] where a cent value is required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Money(pub Decimal);

impl Money {
    pub fn new(num: i64, scale: u32) -> Self {
        Money(Decimal::new(num, scale))
    }

    /// Rounds to two places, midpoints away from zero.
    pub fn round_cents(&self) -> Self {
        let mut cents = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        cents.rescale(2);
        Money(cents)
    }

    /// `self * pct / 100`, unrounded. The factor is at most one so this never overflows.
    pub fn percent(&self, pct: u8) -> Self {
        Money(self.0 * (Decimal::from(pct) / Decimal::ONE_HUNDRED))
    }

    /// `None` when the sum does not fit in a `Decimal`.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            bail!("Empty money amount");
        }
        // accounting style "($2.00)" is negative
        let (negative, body) = match trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => (true, inner.trim()),
            None => (false, trimmed),
        };
        // one minus sign, either side of the currency symbol: "-$2.00" or "$-2.00"
        let (signed, body) = match body.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, body),
        };
        let body = body.strip_prefix('$').unwrap_or(body);
        let (signed, body) = match body.strip_prefix('-') {
            Some(rest) if !signed => (true, rest),
            _ => (signed, body),
        };
        let negative = negative != signed;
        let digits: String = body
            .chars()
            .filter(|c| *c != ',')
            .collect();
        if digits.is_empty() || digits.starts_with(['-', '+']) {
            bail!("Failed to parse money amount: '{}'", s);
        }
        let amount = Decimal::from_str(&digits)
            .with_context(|| format!("Failed to parse money amount: '{}'", s))?;
        Ok(Money(if negative { -amount } else { amount }))
    }
}

/// Groups the integer part by thousands: 1234567 -> "1,234,567"
fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    int_part
        .chars()
        .enumerate()
        .fold(String::with_capacity(len + len / 3), |mut out, (i, c)| {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
            out
        })
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut abs = self.0.abs();
        if abs.scale() < 2 {
            abs.rescale(2);
        }
        let text = abs.to_string();
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let body = format!("${}.{}", group_thousands(int_part), frac_part);
        // pad against the whole string so `{:>12}` aligns columns
        if self.is_negative() {
            f.pad(&format!("({})", body))
        } else {
            f.pad(&body)
        }
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl<'a> Add<&'a Money> for &'a Money {
    type Output = Money;

    fn add(self, other: &Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl Zero for Money {
    fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod money_tests {
    use super::*;

    #[test]
    fn money_from_pos_text() -> Result<()> {
        assert_eq!("$25.00".parse::<Money>()?, Money::new(2500, 2));
        assert_eq!("-$2.00".parse::<Money>()?, Money::new(-200, 2));
        assert_eq!("$-2.00".parse::<Money>()?, Money::new(-200, 2));
        assert_eq!("-2.00".parse::<Money>()?, Money::new(-200, 2));
        assert_eq!("$1,234.50".parse::<Money>()?, Money::new(123450, 2));
        assert_eq!("($3.00)".parse::<Money>()?, Money::new(-300, 2));
        assert_eq!(" 12 ".parse::<Money>()?, Money::new(12, 0));
        Ok(())
    }

    #[test]
    fn money_parse_errs() {
        assert!("".parse::<Money>().is_err());
        assert!("$".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("--5".parse::<Money>().is_err());
        assert!("-$-5".parse::<Money>().is_err());
        assert!("$$5".parse::<Money>().is_err());
    }

    #[test]
    fn money_display() -> Result<()> {
        assert_eq!(Money::new(1, 0).to_string(), "$1.00");
        assert_eq!(Money::new(11, 1).to_string(), "$1.10");
        assert_eq!(Money::new(123456789, 2).to_string(), "$1,234,567.89");
        assert_eq!(Money::new(-200, 2).to_string(), "($2.00)");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(format!("{:>10}", Money::new(500, 2)), "     $5.00");
        Ok(())
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(Money::new(12345, 3).round_cents(), Money::new(1235, 2));
        assert_eq!(Money::new(12344, 3).round_cents(), Money::new(1234, 2));
        assert_eq!(Money::new(-12345, 3).round_cents(), Money::new(-1235, 2));
    }

    #[test]
    fn test_add() -> Result<()> {
        let add = Money::new(10000, 2) + Money::new(100, 0);
        assert_eq!(add.to_string(), "$200.00");
        let mut total = Money::zero();
        total += Money::new(150, 2);
        total += Money::new(-50, 2);
        assert_eq!(total, Money::new(100, 2));
        Ok(())
    }

    #[test]
    fn checked_add_overflow() {
        let max = Money(Decimal::MAX);
        assert_eq!(max.checked_add(Money::new(1, 0)), None);
        assert_eq!(max.checked_add(Money::new(-1, 0)), Some(Money(Decimal::MAX - Decimal::ONE)));
        // scaling down by a percentage never overflows
        assert_eq!(max.percent(100), max);
        assert!(max.percent(30) < max);
    }
}
