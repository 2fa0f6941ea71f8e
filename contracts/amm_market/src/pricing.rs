//! Linear bonding-curve pricing.
//!
//! Each option carries an explicit stored unit price (SCALE fixed-point)
//! that moves after every trade by
//!
//!   delta = quantity * SCALE / (shares_outstanding + k)
//!
//! where `k` is a damping constant. Buys add the delta, sells subtract it,
//! flooring at half the current price so the price stays strictly positive.
//! This is an intentional approximation, not a conserved-quantity curve:
//! prices across options are not guaranteed to sum to one.
//!
//! Trades execute at the pre-trade quote (`cost = price * quantity / SCALE`);
//! the stored price updates only after the trade is recorded, so a single
//! trade sees no intra-trade slippage.

use crate::error::AmmError;
use crate::storage::{BPS_DENOMINATOR, FEE_BPS, SCALE};

/// Collateral value of `quantity` shares at unit price `price`.
pub fn spot_cost(price: i128, quantity: i128) -> Result<i128, AmmError> {
    if quantity <= 0 {
        return Err(AmmError::InvalidAmount);
    }
    price
        .checked_mul(quantity)
        .ok_or(AmmError::Overflow)?
        .checked_div(SCALE)
        .ok_or(AmmError::Overflow)
}

/// Platform fee on a trade's collateral value.
pub fn fee_amount(cost: i128) -> Result<i128, AmmError> {
    cost.checked_mul(FEE_BPS)
        .ok_or(AmmError::Overflow)?
        .checked_div(BPS_DENOMINATOR)
        .ok_or(AmmError::Overflow)
}

/// Price movement for a trade of `quantity` shares against pre-trade
/// `shares_outstanding`.
fn delta(shares_outstanding: i128, quantity: i128, k: i128) -> Result<i128, AmmError> {
    if k <= 0 {
        return Err(AmmError::InvalidLiquidity);
    }
    let depth = shares_outstanding
        .checked_add(k)
        .ok_or(AmmError::Overflow)?;
    quantity
        .checked_mul(SCALE)
        .ok_or(AmmError::Overflow)?
        .checked_div(depth)
        .ok_or(AmmError::Overflow)
}

/// New unit price after buying `quantity` shares.
pub fn price_after_buy(
    price: i128,
    shares_outstanding: i128,
    quantity: i128,
    k: i128,
) -> Result<i128, AmmError> {
    let d = delta(shares_outstanding, quantity, k)?;
    price.checked_add(d).ok_or(AmmError::Overflow)
}

/// New unit price after selling `quantity` shares.
///
/// If the delta would consume the whole price, the price floors at half its
/// current value instead, keeping it strictly positive.
pub fn price_after_sell(
    price: i128,
    shares_outstanding: i128,
    quantity: i128,
    k: i128,
) -> Result<i128, AmmError> {
    let d = delta(shares_outstanding, quantity, k)?;
    if d >= price {
        // Integer halving of price 1 would hit zero; hold the floor at 1.
        Ok((price / 2).max(1))
    } else {
        Ok(price - d)
    }
}

/// Equal initial price for each of `option_count` options.
pub fn initial_price(option_count: u32) -> Result<i128, AmmError> {
    if option_count == 0 {
        return Err(AmmError::InvalidOptionCount);
    }
    Ok(SCALE / option_count as i128)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example: price 1.0, k = 1000, 0 shares outstanding, buy 100
    // -> delta = 100 * SCALE / 1000 = 0.1 -> new price 1.1; cost at the
    // pre-trade quote is exactly 100.
    #[test]
    fn test_buy_moves_price_up_by_delta() {
        let new_price = price_after_buy(SCALE, 0, 100, 1_000).unwrap();
        assert_eq!(new_price, SCALE + SCALE / 10);
        assert_eq!(spot_cost(SCALE, 100).unwrap(), 100);
    }

    #[test]
    fn test_sell_moves_price_down_by_delta() {
        let price = SCALE + SCALE / 10;
        let new_price = price_after_sell(price, 100, 100, 1_000).unwrap();
        // delta = 100 * SCALE / 1100
        assert_eq!(new_price, price - 100 * SCALE / 1_100);
        assert!(new_price > 0);
    }

    #[test]
    fn test_sell_floors_at_half_price() {
        // Tiny depth, huge sell: delta exceeds the price.
        let price = SCALE / 100;
        let new_price = price_after_sell(price, 0, 1_000_000, 1_000).unwrap();
        assert_eq!(new_price, price / 2);
    }

    #[test]
    fn test_sell_floor_never_reaches_zero() {
        // Even at the smallest representable price the floor holds at 1.
        let new_price = price_after_sell(1, 0, 1_000_000, 1_000).unwrap();
        assert_eq!(new_price, 1);

        let mut price = 1_000i128;
        for _ in 0..64 {
            price = price_after_sell(price, 0, i128::from(u32::MAX), 1).unwrap();
            assert!(price > 0);
        }
    }

    #[test]
    fn test_deeper_markets_move_less() {
        let shallow = price_after_buy(SCALE, 0, 100, 1_000).unwrap();
        let deep = price_after_buy(SCALE, 10_000, 100, 1_000).unwrap();
        assert!(shallow - SCALE > deep - SCALE);
    }

    #[test]
    fn test_initial_price_splits_evenly() {
        assert_eq!(initial_price(2).unwrap(), SCALE / 2);
        assert_eq!(initial_price(4).unwrap(), SCALE / 4);
        assert_eq!(initial_price(10).unwrap(), SCALE / 10);
    }

    #[test]
    fn test_fee_is_two_percent() {
        assert_eq!(fee_amount(10_000).unwrap(), 200);
        // Truncates to zero on dust-level values.
        assert_eq!(fee_amount(49).unwrap(), 0);
    }

    #[test]
    fn test_spot_cost_rejects_non_positive_quantity() {
        assert!(matches!(spot_cost(SCALE, 0), Err(AmmError::InvalidAmount)));
        assert!(matches!(spot_cost(SCALE, -5), Err(AmmError::InvalidAmount)));
    }

    #[test]
    fn test_delta_requires_positive_k() {
        assert!(matches!(
            price_after_buy(SCALE, 0, 100, 0),
            Err(AmmError::InvalidLiquidity)
        ));
    }
}
