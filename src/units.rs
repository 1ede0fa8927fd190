//! Numeric unit model
//!
//! Every numeric leaf carries a [`NumericKind`], a magnitude and a lower-cased
//! unit string. Each kind knows how to normalize itself to its canonical unit
//! (`px`, `rad`, `ms`); lengths additionally know how to turn a percentage
//! into pixels against the element box.
//!
//! # Example
//!
//! ```
//! use cssexpr::units::Numeric;
//! use cssexpr::StaticContext;
//!
//! let ctx = StaticContext::new().with_font_size(20.0);
//! let px = Numeric::length(1.5, "EM").norm(&ctx).unwrap();
//! assert_eq!(px, Numeric::length(30.0, "px"));
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::context::{Dimension, EvalContext};
use crate::error::{ExprError, Result};

/// Category of a numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// Unitless number
    Count,
    /// Percentage (`%`)
    Percent,
    /// `px`, `em`, `rem`, `vw`, `vh`, `vmin`, `vmax`, ...
    Length,
    /// `rad`, `deg`, `grad`, ...
    Angle,
    /// `ms`, `s`
    Time,
}

impl NumericKind {
    /// Unit every value of this kind normalizes to.
    pub fn canonical_units(self) -> &'static str {
        match self {
            NumericKind::Count => "",
            NumericKind::Percent => "%",
            NumericKind::Length => "px",
            NumericKind::Angle => "rad",
            NumericKind::Time => "ms",
        }
    }

    /// Kind implied by a unit suffix, for literal parsing.
    pub fn from_units(units: &str) -> Option<Self> {
        let kind = match units {
            "" => NumericKind::Count,
            "%" => NumericKind::Percent,
            "px" | "em" | "rem" | "vw" | "vh" | "vmin" | "vmax" | "cm" | "mm" | "q" | "in"
            | "pt" | "pc" => NumericKind::Length,
            "deg" | "rad" | "grad" | "turn" => NumericKind::Angle,
            "s" | "ms" => NumericKind::Time,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumericKind::Count => "number",
            NumericKind::Percent => "percent",
            NumericKind::Length => "length",
            NumericKind::Angle => "angle",
            NumericKind::Time => "time",
        };
        f.write_str(name)
    }
}

/// A numeric leaf: kind, magnitude, lower-cased units.
#[derive(Debug, Clone, PartialEq)]
pub struct Numeric {
    kind: NumericKind,
    value: f64,
    units: String,
}

impl Numeric {
    pub fn new(kind: NumericKind, value: f64, units: &str) -> Self {
        Self {
            kind,
            value,
            units: units.to_ascii_lowercase(),
        }
    }

    pub fn count(value: f64) -> Self {
        Self::new(NumericKind::Count, value, "")
    }

    pub fn percent(value: f64) -> Self {
        Self::new(NumericKind::Percent, value, "%")
    }

    pub fn length(value: f64, units: &str) -> Self {
        Self::new(NumericKind::Length, value, units)
    }

    pub fn angle(value: f64, units: &str) -> Self {
        Self::new(NumericKind::Angle, value, units)
    }

    pub fn time(value: f64, units: &str) -> Self {
        Self::new(NumericKind::Time, value, units)
    }

    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn is_count(&self) -> bool {
        self.kind == NumericKind::Count
    }

    pub fn is_percent(&self) -> bool {
        self.kind == NumericKind::Percent
    }

    /// Same kind and units, different magnitude.
    pub fn with_value(&self, value: f64) -> Self {
        Self {
            kind: self.kind,
            value,
            units: self.units.clone(),
        }
    }

    /// Convert to the kind's canonical unit.
    ///
    /// Counts and percentages are returned unchanged. Physical lengths
    /// (`cm`, `in`, ...) and other units without a known conversion fail
    /// with [`ExprError::UnknownUnits`].
    pub fn norm(&self, ctx: &dyn EvalContext) -> Result<Numeric> {
        match self.kind {
            NumericKind::Count | NumericKind::Percent => Ok(self.clone()),
            NumericKind::Length => self.norm_length(ctx),
            NumericKind::Angle => {
                let rad = match self.units.as_str() {
                    "rad" => return Ok(self.clone()),
                    "deg" => self.value * 2.0 * PI / 360.0,
                    "grad" => self.value * PI / 200.0,
                    _ => return Err(self.unknown_units()),
                };
                Ok(Numeric::angle(rad, "rad"))
            }
            NumericKind::Time => {
                let ms = match self.units.as_str() {
                    "ms" => return Ok(self.clone()),
                    "s" => self.value * 1000.0,
                    _ => return Err(self.unknown_units()),
                };
                Ok(Numeric::time(ms, "ms"))
            }
        }
    }

    fn norm_length(&self, ctx: &dyn EvalContext) -> Result<Numeric> {
        let px = match self.units.as_str() {
            "px" => return Ok(self.clone()),
            "em" => self.value * ctx.current_font_size(),
            "rem" => self.value * ctx.root_font_size(),
            "vw" | "vh" | "vmin" | "vmax" => {
                let viewport = ctx.viewport_size();
                let vw = viewport.width * self.value / 100.0;
                let vh = viewport.height * self.value / 100.0;
                match self.units.as_str() {
                    "vw" => vw,
                    "vh" => vh,
                    "vmin" => vw.min(vh),
                    _ => vw.max(vh),
                }
            }
            // Physical units would need the display's DPI
            _ => return Err(self.unknown_units()),
        };
        Ok(Numeric::length(px, "px"))
    }

    /// Value of `percent`% expressed in this value's kind.
    ///
    /// Only lengths define this: the percentage applies to the element's
    /// width or height depending on `dim`, and to 0 outside a tagged
    /// argument or for the `z` axis.
    pub fn calc_percent(
        &self,
        percent: f64,
        ctx: &dyn EvalContext,
        dim: Option<Dimension>,
    ) -> Result<Numeric> {
        if self.kind != NumericKind::Length {
            return Err(ExprError::PercentUnsupported(self.kind));
        }
        let size = ctx.current_element_size();
        let side = match dim {
            Some(Dimension::W) => size.width,
            Some(Dimension::H) => size.height,
            _ => 0.0,
        };
        Ok(Numeric::length(side * percent / 100.0, "px"))
    }

    fn unknown_units(&self) -> ExprError {
        ExprError::UnknownUnits {
            kind: self.kind,
            units: self.units.clone(),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // -0 prints as "0"
        let value = if self.value == 0.0 { 0.0 } else { self.value };
        write!(f, "{}{}", value, self.units)
    }
}

impl FromStr for Numeric {
    type Err = ExprError;

    /// Parse a single numeric token such as `10px`, `-2.5em`, `50%` or `1e3ms`.
    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        let invalid = || ExprError::InvalidLiteral(s.to_string());
        let bytes = token.as_bytes();

        let mut end = 0;
        if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
            end += 1;
        }
        let digits_start = end;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }
        if end == digits_start {
            return Err(invalid());
        }
        // Exponent only when followed by digits, so `2em` stays em
        if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
            let mut exp_end = end + 1;
            if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
                exp_end += 1;
            }
            if exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                    exp_end += 1;
                }
                end = exp_end;
            }
        }

        let value: f64 = token[..end].parse().map_err(|_| invalid())?;
        let units = token[end..].to_ascii_lowercase();
        let kind = NumericKind::from_units(&units).ok_or_else(invalid)?;
        Ok(Numeric::new(kind, value, &units))
    }
}
