//! Core types for the order book: fixed-point scalars, ids, and enums.
//!
//! [`Price`] and [`Quantity`] are integer-backed decimals with a fixed scale
//! of 10000 (four decimal places). All arithmetic is exact integer arithmetic
//! on the raw value, so replays produce bit-identical results.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::OnceLock;
use std::time::Instant;

/// Unique order identifier. `OrderId(0)` is reserved as invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub u64);

/// Reserved id for orders that carry no identity.
pub const INVALID_ORDER_ID: OrderId = OrderId(0);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instrument identifier. Compared by equality only.
pub type Symbol = String;

/// Scale factor shared by [`Price`] and [`Quantity`]: four decimal places.
pub const SCALE_FACTOR: i64 = 10_000;

/// Limit price as a fixed-point decimal.
///
/// A raw value `v` represents `v / 10000`, so `Price::from_raw(1_023_400)`
/// is 102.34. Ordering and equality are the raw integer's.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub const SCALE_FACTOR: i64 = SCALE_FACTOR;
    pub const ZERO: Price = Price(0);
    /// Sentinel for "no price"; never compares equal to a representable value.
    pub const INVALID: Price = Price(i64::MIN);
    pub const MAX_VALUE: Price = Price(i64::MAX);
    /// Smallest representable price. One above [`Price::INVALID`] so the two
    /// stay distinguishable.
    pub const MIN_VALUE: Price = Price(i64::MIN + 1);

    /// Builds a price from its raw fixed-point value.
    pub const fn from_raw(raw: i64) -> Self {
        Price(raw)
    }

    /// Converts a floating value, truncating toward zero after scaling.
    pub fn from_f64(value: f64) -> Self {
        Price((value * Self::SCALE_FACTOR as f64) as i64)
    }

    /// Raw fixed-point value.
    pub const fn raw(&self) -> i64 {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / Self::SCALE_FACTOR as f64
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        Price(self.0 - rhs.0)
    }
}

impl Mul<i64> for Price {
    type Output = Price;

    fn mul(self, rhs: i64) -> Price {
        Price(self.0 * rhs)
    }
}

impl Div<i64> for Price {
    type Output = Price;

    fn div(self, rhs: i64) -> Price {
        Price(self.0 / rhs)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_fixed_point(f, self.0, Self::SCALE_FACTOR)
    }
}

/// Order size as a fixed-point decimal with the same scale as [`Price`].
///
/// Quantities handled by the engine are `>= 0`; negative raw values are
/// reserved for sentinels and rejected at order entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Quantity(i64);

impl Quantity {
    pub const SCALE_FACTOR: i64 = SCALE_FACTOR;
    pub const ZERO: Quantity = Quantity(0);
    pub const INVALID: Quantity = Quantity(i64::MIN);
    pub const MAX_VALUE: Quantity = Quantity(i64::MAX);
    pub const MIN_VALUE: Quantity = Quantity(i64::MIN + 1);

    /// Builds a quantity from its raw fixed-point value.
    pub const fn from_raw(raw: i64) -> Self {
        Quantity(raw)
    }

    /// Converts a floating value, truncating toward zero after scaling.
    pub fn from_f64(value: f64) -> Self {
        Quantity((value * Self::SCALE_FACTOR as f64) as i64)
    }

    /// Raw fixed-point value.
    pub const fn raw(&self) -> i64 {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / Self::SCALE_FACTOR as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The smaller of two quantities.
    pub fn min(self, other: Quantity) -> Quantity {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 - rhs.0)
    }
}

impl Mul<i64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: i64) -> Quantity {
        Quantity(self.0 * rhs)
    }
}

impl Div<i64> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: i64) -> Quantity {
        Quantity(self.0 / rhs)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_fixed_point(f, self.0, Self::SCALE_FACTOR)
    }
}

/// Sentinels render as names; everything else as sign, integer part, and
/// exactly four zero-padded fractional digits.
fn fmt_fixed_point(f: &mut fmt::Formatter<'_>, raw: i64, scale: i64) -> fmt::Result {
    if raw == i64::MIN {
        return write!(f, "INVALID");
    }
    if raw == i64::MAX {
        return write!(f, "MAX");
    }
    if raw == i64::MIN + 1 {
        return write!(f, "MIN");
    }
    let abs = raw.unsigned_abs();
    let int_part = abs / scale as u64;
    let frac_part = abs % scale as u64;
    if raw < 0 {
        write!(f, "-")?;
    }
    write!(f, "{}.{:04}", int_part, frac_part)
}

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type. `Cancel` and `Modify` are request kinds carried by order
/// messages; they never rest in the book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    Limit,
    Market,
    Cancel,
    Modify,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Cancel => write!(f, "CANCEL"),
            OrderType::Modify => write!(f, "MODIFY"),
        }
    }
}

/// Time-in-force: how long the order stays active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TimeInForce {
    /// Good-Till-Cancel: rest on the book until filled or cancelled.
    Gtc,
    /// Immediate-or-Cancel: fill what is immediately available; discard the rest.
    Ioc,
    /// Fill-or-Kill: fill entirely and immediately, or not at all.
    Fok,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInForce::Gtc => write!(f, "GTC"),
            TimeInForce::Ioc => write!(f, "IOC"),
            TimeInForce::Fok => write!(f, "FOK"),
        }
    }
}

/// Order lifecycle status.
///
/// Terminal states are `Filled`, `Cancelled`, and `Rejected`. `Replaced`
/// marks an in-place quantity decrease; the order remains active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderStatus {
    New,
    Accepted,
    Rejected,
    Filled,
    PartiallyFilled,
    Cancelled,
    Replaced,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::Accepted => write!(f, "ACCEPTED"),
            OrderStatus::Rejected => write!(f, "REJECTED"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
            OrderStatus::Replaced => write!(f, "REPLACED"),
        }
    }
}

/// Monotonic timestamp in nanoseconds since an arbitrary per-process epoch.
pub type Timestamp = i64;

static CLOCK_ANCHOR: OnceLock<Instant> = OnceLock::new();

/// Current monotonic timestamp in nanoseconds.
pub fn now_ns() -> Timestamp {
    let anchor = CLOCK_ANCHOR.get_or_init(Instant::now);
    anchor.elapsed().as_nanos() as Timestamp
}
