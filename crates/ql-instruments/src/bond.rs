//! Fixed-rate bullet bonds.
//!
//! All times are year fractions measured from the valuation date.  The
//! coupon schedule is generated backwards from maturity at the coupon
//! frequency, so a broken period (if any) falls at the front.

use ql_core::{compounding::MAX_SCHEDULE_PERIODS, errors::Result, Frequency, Rate, Real, Time};

/// Tolerance below which a schedule time counts as "today".
const TIME_EPSILON: Time = 1.0e-10;

/// A bullet bond paying a fixed coupon and the face amount at maturity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedRateBond {
    /// Face (notional) amount redeemed at maturity.
    pub face: Real,
    /// Annual coupon rate; zero for a zero-coupon bond.
    pub coupon_rate: Rate,
    /// Coupon payments per year.
    pub frequency: Frequency,
    /// Years to maturity.
    pub maturity: Time,
    /// Years since the bond was issued; caps accrual in the first period.
    pub time_since_issue: Time,
}

impl FixedRateBond {
    /// Build a validated bond.
    pub fn new(
        face: Real,
        coupon_rate: Rate,
        frequency: Frequency,
        maturity: Time,
        time_since_issue: Time,
    ) -> Result<Self> {
        let bond = Self {
            face,
            coupon_rate,
            frequency,
            maturity,
            time_since_issue,
        };
        bond.validate()?;
        Ok(bond)
    }

    /// A zero-coupon bond issued today.
    pub fn zero_coupon(face: Real, maturity: Time) -> Result<Self> {
        Self::new(face, 0.0, Frequency::Annual, maturity, 0.0)
    }

    /// Check the bond's terms.
    pub fn validate(&self) -> Result<()> {
        ql_core::ensure!(
            self.face.is_finite() && self.face > 0.0,
            InvalidParameter,
            "bond face must be positive, got {}",
            self.face
        );
        ql_core::ensure!(
            self.coupon_rate.is_finite() && self.coupon_rate >= 0.0,
            InvalidParameter,
            "coupon rate must be non-negative, got {}",
            self.coupon_rate
        );
        ql_core::ensure!(
            self.maturity.is_finite() && self.maturity > 0.0,
            InvalidParameter,
            "bond maturity must be positive, got {}",
            self.maturity
        );
        ql_core::ensure!(
            self.time_since_issue.is_finite() && self.time_since_issue >= 0.0,
            InvalidParameter,
            "time since issue must be non-negative, got {}",
            self.time_since_issue
        );
        if !self.is_zero_coupon() {
            self.frequency.schedule_periods(self.maturity)?;
        }
        Ok(())
    }

    /// `true` if the bond pays no coupons.
    pub fn is_zero_coupon(&self) -> bool {
        self.coupon_rate == 0.0
    }

    /// Cash amount of one regular coupon.
    pub fn coupon_amount(&self) -> Real {
        self.face * self.coupon_rate * self.frequency.period()
    }

    /// Remaining coupon payment times, ascending.  Empty for a zero-coupon
    /// bond; at most [`MAX_SCHEDULE_PERIODS`] for a validated one.
    pub fn coupon_times(&self) -> Vec<Time> {
        if self.is_zero_coupon() {
            return Vec::new();
        }
        let period = self.frequency.period();
        let mut times: Vec<Time> = (0..MAX_SCHEDULE_PERIODS)
            .map(|k| self.maturity - k as Real * period)
            .take_while(|&t| t > TIME_EPSILON)
            .collect();
        times.reverse();
        times
    }

    /// Start of the current coupon period (≤ 0), never before issue.
    pub fn previous_coupon_time(&self) -> Time {
        let period = self.frequency.period();
        let periods_left = (self.maturity / period - TIME_EPSILON).floor();
        let previous = self.maturity - (periods_left + 1.0) * period;
        let previous = if previous > -TIME_EPSILON { 0.0 } else { previous };
        previous.max(-self.time_since_issue)
    }

    /// Coupon accrued since the previous coupon date.
    pub fn accrued_interest(&self) -> Real {
        if self.is_zero_coupon() {
            return 0.0;
        }
        self.face * self.coupon_rate * (-self.previous_coupon_time())
    }
}
