//! Bond yield and duration math.
//!
//! Plain f64 root-finding; callers convert from `Decimal` at the boundary.
//! Pricing assumes a level semiannual coupon and redemption at face. The
//! numbers only need to be finite and monotonic — risk figures downstream are
//! asserted for linearity in position, not for absolute level.

/// Coupons per year on every traded tenor.
pub const COUPON_FREQUENCY: f64 = 2.0;

/// Face value matching the ~100 clean-price quote convention.
pub const FACE_VALUE: f64 = 100.0;

/// Dirty-free price of a level-coupon bond at the given periodic yield.
pub fn price_for_yield(coupon_rate: f64, periods: u32, yield_rate: f64) -> f64 {
    let c = coupon_rate * FACE_VALUE / COUPON_FREQUENCY;
    let r = 1.0 + yield_rate / COUPON_FREQUENCY;
    let mut price = 0.0;
    for k in 1..=periods {
        price += c / r.powi(k as i32);
    }
    price + FACE_VALUE / r.powi(periods as i32)
}

/// Solve the yield implied by a clean price, by bisection.
///
/// Price is strictly decreasing in yield, so the bracket below always
/// contains the root for any sane treasury price.
pub fn yield_from_price(coupon_rate: f64, periods: u32, price: f64) -> f64 {
    let mut lo = -0.5;
    let mut hi = 2.0;
    for _ in 0..200 {
        let mid = (lo + hi) / 2.0;
        if price_for_yield(coupon_rate, periods, mid) > price {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-12 {
            break;
        }
    }
    (lo + hi) / 2.0
}

/// Modified duration at the given yield (years per unit yield).
pub fn modified_duration(coupon_rate: f64, periods: u32, yield_rate: f64) -> f64 {
    let c = coupon_rate * FACE_VALUE / COUPON_FREQUENCY;
    let r = 1.0 + yield_rate / COUPON_FREQUENCY;

    let mut price = 0.0;
    let mut weighted = 0.0;
    for k in 1..=periods {
        let mut cf = c;
        if k == periods {
            cf += FACE_VALUE;
        }
        let pv = cf / r.powi(k as i32);
        price += pv;
        weighted += (k as f64 / COUPON_FREQUENCY) * pv;
    }

    let macaulay = weighted / price;
    macaulay / r
}
