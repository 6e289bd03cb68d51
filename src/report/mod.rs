// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Reporting sinks.
//!
//! A [`Reporter`] receives every finished shot, every miss and, on request, the raw capture for
//! bench calibration. [`JsonReporter`] writes one line per event to anything implementing
//! [`core::fmt::Write`], which on the board is the USART console:
//!
//! ```text
//! {"shot":1, "x":-0.64, "y":-0.43, "r":0.77, "a":-146.31}
//! {"shot":2, "miss":1, "mask":1, "reason":"sensors"}
//! {"timer":[1000, 1050, 980, 1020], "status":15}
//! ```
//!
//! Which score fields go out is fixed at build time by [`SCORE_FIELDS`]; counters, diagnostics
//! and the score estimate are behind the `report-counters`, `report-misc` and `report-score`
//! cargo features.

use core::fmt::{self, Write};

use crate::shot::{MissRecord, ShotRecord};
use crate::timing::{Capture, RawTimers};

/// Field groups included in a score line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScoreFields {
    pub shot: bool,
    pub xy: bool,
    pub polar: bool,
    pub counters: bool,
    pub misc: bool,
    pub score: bool,
}

impl ScoreFields {
    pub const ALL: ScoreFields = ScoreFields {
        shot: true,
        xy: true,
        polar: true,
        counters: true,
        misc: true,
        score: true,
    };
}

/// Build-time field selection.
pub const SCORE_FIELDS: ScoreFields = ScoreFields {
    shot: true,
    xy: true,
    polar: true,
    counters: cfg!(feature = "report-counters"),
    misc: cfg!(feature = "report-misc"),
    score: cfg!(feature = "report-score"),
};

/// Destination for shot results.
pub trait Reporter {
    fn send_score(&mut self, shot: &ShotRecord) -> fmt::Result;
    fn send_miss(&mut self, miss: &MissRecord) -> fmt::Result;
    /// Raw capture counts and status, independent of scoring.
    fn send_timer(&mut self, capture: &Capture) -> fmt::Result;
}

/// Line-oriented JSON reporter.
pub struct JsonReporter<W: Write> {
    out: W,
    fields: ScoreFields,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self::with_fields(out, SCORE_FIELDS)
    }

    pub fn with_fields(out: W, fields: ScoreFields) -> Self {
        Self { out, fields }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Writes `, ` between fields of one object.
struct Fields<'a, W: Write> {
    out: &'a mut W,
    first: bool,
}

impl<'a, W: Write> Fields<'a, W> {
    fn open(out: &'a mut W) -> Result<Self, fmt::Error> {
        out.write_char('{')?;
        Ok(Self { out, first: true })
    }

    fn field(&mut self, key: &str, value: fmt::Arguments<'_>) -> fmt::Result {
        if !self.first {
            self.out.write_str(", ")?;
        }
        self.first = false;
        write!(self.out, "\"{}\":{}", key, value)
    }

    fn close(self) -> fmt::Result {
        self.out.write_str("}\r\n")
    }
}

struct Counts<'a>(&'a RawTimers);

impl fmt::Display for Counts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        for (i, n) in self.0 .0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", n)?;
        }
        f.write_char(']')
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn send_score(&mut self, shot: &ShotRecord) -> fmt::Result {
        let sel = self.fields;
        let mut line = Fields::open(&mut self.out)?;
        if sel.shot {
            line.field("shot", format_args!("{}", shot.shot))?;
        }
        if sel.xy {
            line.field("x", format_args!("{:.2}", shot.x))?;
            line.field("y", format_args!("{:.2}", shot.y))?;
        }
        if sel.polar {
            line.field("r", format_args!("{:.2}", shot.radius))?;
            line.field("a", format_args!("{:.2}", shot.angle))?;
        }
        if sel.counters {
            line.field("counters", format_args!("{}", Counts(&shot.counters)))?;
        }
        if sel.misc {
            line.field("loc", format_args!("{}", shot.location.code()))?;
            line.field("est", format_args!("{:.2}", shot.estimate))?;
            line.field("iter", format_args!("{}", shot.iterations))?;
            line.field("fix", format_args!("\"{}\"", shot.correction.label()))?;
        }
        if sel.score {
            line.field("score", format_args!("{:.1}", shot.score))?;
        }
        line.close()
    }

    fn send_miss(&mut self, miss: &MissRecord) -> fmt::Result {
        let mut line = Fields::open(&mut self.out)?;
        line.field("shot", format_args!("{}", miss.shot))?;
        line.field("miss", format_args!("1"))?;
        line.field("mask", format_args!("{}", miss.status.bits()))?;
        line.field("reason", format_args!("\"{}\"", miss.reason.tag()))?;
        line.close()
    }

    fn send_timer(&mut self, capture: &Capture) -> fmt::Result {
        let mut line = Fields::open(&mut self.out)?;
        line.field("timer", format_args!("{}", Counts(&capture.timers)))?;
        line.field("status", format_args!("{}", capture.status.bits()))?;
        line.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShotError;
    use crate::geometry::{Location, Quadrant};
    use crate::shot::Correction;
    use crate::timing::SensorStatus;

    fn record() -> ShotRecord {
        ShotRecord {
            shot: 1,
            x: -0.6435,
            y: -0.429,
            radius: 0.7734,
            angle: -146.3105,
            correction: Correction::Flat,
            location: Location {
                quadrant: Quadrant::South,
                sensors: SensorStatus::ALL,
            },
            counters: RawTimers([1000, 1050, 980, 1020]),
            estimate: 113.6,
            iterations: 23,
            score: 10.98,
        }
    }

    #[test]
    fn default_score_line() {
        let mut r = JsonReporter::with_fields(String::new(), ScoreFields {
            counters: false,
            misc: false,
            score: false,
            ..ScoreFields::ALL
        });
        r.send_score(&record()).unwrap();
        assert_eq!(
            r.into_inner(),
            "{\"shot\":1, \"x\":-0.64, \"y\":-0.43, \"r\":0.77, \"a\":-146.31}\r\n"
        );
    }

    #[test]
    fn every_field() {
        let mut r = JsonReporter::with_fields(String::new(), ScoreFields::ALL);
        r.send_score(&record()).unwrap();
        assert_eq!(
            r.into_inner(),
            "{\"shot\":1, \"x\":-0.64, \"y\":-0.43, \"r\":0.77, \"a\":-146.31, \
             \"counters\":[1000, 1050, 980, 1020], \"loc\":242, \"est\":113.60, \"iter\":23, \
             \"fix\":\"flat\", \"score\":11.0}\r\n"
        );
    }

    #[test]
    fn fields_can_be_dropped() {
        let mut r = JsonReporter::with_fields(String::new(), ScoreFields {
            shot: false,
            xy: false,
            polar: true,
            counters: false,
            misc: false,
            score: true,
        });
        r.send_score(&record()).unwrap();
        assert_eq!(r.into_inner(), "{\"r\":0.77, \"a\":-146.31, \"score\":11.0}\r\n");
    }

    #[test]
    fn miss_line() {
        let mut r = JsonReporter::new(String::new());
        let capture = Capture::new(SensorStatus::from_bits(0b0001), [5, 0, 0, 0]);
        r.send_miss(&crate::shot::build_miss(2, &capture, ShotError::InsufficientSensors { valid: 1 }))
            .unwrap();
        assert_eq!(
            r.into_inner(),
            "{\"shot\":2, \"miss\":1, \"mask\":1, \"reason\":\"sensors\"}\r\n"
        );
    }

    #[test]
    fn timer_line() {
        let mut r = JsonReporter::new(String::new());
        r.send_timer(&Capture::new(SensorStatus::ALL, [1000, 1050, 980, 1020]))
            .unwrap();
        assert_eq!(
            r.into_inner(),
            "{\"timer\":[1000, 1050, 980, 1020], \"status\":15}\r\n"
        );
    }
}
