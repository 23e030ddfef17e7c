//! Assembly tiling units (ATUs) and their merge/reduce algebra.
//!
//! An ATU is a half-open bin range `[start, end)` within one stripe, read
//! either forward or reverse. A list of ATUs, in order, spells out the whole
//! assembly.

use crate::libs::error::{HictError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn inverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    pub fn strand(self) -> &'static str {
        match self {
            Direction::Forward => "+",
            Direction::Reverse => "-",
        }
    }
}

impl FromStr for Direction {
    type Err = HictError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" | "FWD" | "forward" => Ok(Direction::Forward),
            "-" | "REV" | "reverse" => Ok(Direction::Reverse),
            _ => Err(HictError::invalid_atu(format!("unknown direction: {}", s))),
        }
    }
}

/// Oriented range `[start, end)` inside stripe `stripe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atu {
    stripe: u64,
    start: u64,
    end: u64,
    direction: Direction,
}

impl Atu {
    pub fn new(stripe: u64, start: u64, end: u64, direction: Direction) -> Result<Self> {
        if start >= end {
            return Err(HictError::invalid_atu(format!(
                "empty range {}-{} in stripe {}",
                start, end, stripe
            )));
        }
        Ok(Self {
            stripe,
            start,
            end,
            direction,
        })
    }

    pub fn stripe(&self) -> u64 {
        self.stripe
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of bins covered; always positive
    pub fn length(&self) -> u64 {
        self.end - self.start
    }

    /// Same range, opposite orientation
    pub fn reversed(&self) -> Self {
        Self {
            direction: self.direction.inverse(),
            ..*self
        }
    }

    /// Cut after the first `k` bins in reading order.
    ///
    /// A reverse ATU is read from `end` down to `start`, so its head is the
    /// upper part of the range. Returns `None` unless `0 < k < length`.
    ///
    /// ```
    /// use hict::libs::atu::{Atu, Direction};
    /// let atu = Atu::new(1, 0, 10, Direction::Reverse).unwrap();
    /// let (head, tail) = atu.split_at(3).unwrap();
    /// assert_eq!((head.start(), head.end()), (7, 10));
    /// assert_eq!((tail.start(), tail.end()), (0, 7));
    /// ```
    pub fn split_at(&self, k: u64) -> Option<(Atu, Atu)> {
        if k == 0 || k >= self.length() {
            return None;
        }
        let cut = match self.direction {
            Direction::Forward => self.start + k,
            Direction::Reverse => self.end - k,
        };
        let lower = Self { end: cut, ..*self };
        let upper = Self {
            start: cut,
            ..*self
        };
        match self.direction {
            Direction::Forward => Some((lower, upper)),
            Direction::Reverse => Some((upper, lower)),
        }
    }
}

impl fmt::Display for Atu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}):{}-{}",
            self.stripe,
            self.direction.strand(),
            self.start,
            self.end
        )
    }
}

lazy_static! {
    static ref RE_ATU: Regex = Regex::new(
        r"(?x)
        ^\s*
        (?P<stripe>\d+)
        (?:\((?P<strand>[+-])\))?
        :
        (?P<start>\d+)
        -
        (?P<end>\d+)
        \s*$
        "
    )
    .unwrap();
}

/// Parse `stripe(strand):start-end`; the strand defaults to `+`.
impl FromStr for Atu {
    type Err = HictError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = RE_ATU
            .captures(s)
            .ok_or_else(|| HictError::invalid_atu(format!("cannot parse: {}", s)))?;

        let number = |name: &str| -> Result<u64> {
            caps[name]
                .parse::<u64>()
                .map_err(|e| HictError::invalid_atu(format!("{}: {}", s, e)))
        };
        let direction = match caps.name("strand") {
            Some(m) => m.as_str().parse()?,
            None => Direction::Forward,
        };

        Atu::new(number("stripe")?, number("start")?, number("end")?, direction)
    }
}

/// Outcome of [`merge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merged {
    Combined(Atu),
    /// Not adjacent; both inputs, first operand first
    Separate(Atu, Atu),
}

/// Combine two ATUs of the same stripe and direction whose ranges touch.
pub fn merge(a: &Atu, b: &Atu) -> Merged {
    if a.stripe == b.stripe && a.direction == b.direction {
        if a.end == b.start {
            debug_assert!(a.start < b.end, "L start < R end");
            return Merged::Combined(Atu {
                stripe: a.stripe,
                start: a.start,
                end: b.end,
                direction: a.direction,
            });
        } else if b.end == a.start {
            return merge(b, a);
        }
    }
    Merged::Separate(*a, *b)
}

/// Collapse runs of consecutive mergeable ATUs in one left-to-right pass.
///
/// Only neighbours are compared; earlier output is never revisited.
pub fn reduce(atus: &[Atu]) -> Vec<Atu> {
    let Some((first, rest)) = atus.split_first() else {
        return Vec::new();
    };

    let mut result = Vec::with_capacity(atus.len());
    let mut last = *first;

    for atu in rest {
        match merge(&last, atu) {
            Merged::Combined(combined) => last = combined,
            Merged::Separate(done, next) => {
                result.push(done);
                last = next;
            }
        }
    }
    result.push(last);

    result
}

pub fn reverse(a: &Atu) -> Atu {
    a.reversed()
}

pub fn length(a: &Atu) -> u64 {
    a.length()
}

/// Build ATUs from parallel columns, rejecting columns of unequal length.
pub fn atus_from_columns(
    stripes: &[u64],
    starts: &[u64],
    ends: &[u64],
    directions: &[Direction],
) -> Result<Vec<Atu>> {
    let n = stripes.len();
    if starts.len() != n || ends.len() != n || directions.len() != n {
        return Err(HictError::invalid_atu(format!(
            "column lengths differ: {} stripes, {} starts, {} ends, {} directions",
            n,
            starts.len(),
            ends.len(),
            directions.len()
        )));
    }

    (0..n)
        .map(|i| Atu::new(stripes[i], starts[i], ends[i], directions[i]))
        .collect()
}
