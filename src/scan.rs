//! Quick check for values that need evaluation
//!
//! Most animated values are plain (`10px`, `rotate(45deg)`) and can be used
//! as written. [`needs_resolution`] tells a host, without parsing, whether a
//! raw value must go through parse and [`resolve`](crate::resolve) first.

use regex::Regex;
use std::sync::LazyLock;

/// Functions whose result depends on the context
static DYNAMIC_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(var|calc|num|index|url)\(").unwrap());

/// Numbers in units that normalize to something else
static RELATIVE_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d(em|rem|vw|vh|vmin|vmax|deg|grad|s)\b").unwrap());

/// Whether `css` contains anything resolution would change.
///
/// With `normalize` set, values in relative or non-canonical units
/// (`2em`, `50vw`, `90deg`, `1s`) also count.
///
/// # Example
///
/// ```
/// use cssexpr::scan::needs_resolution;
///
/// assert!(needs_resolution("translateX(var(--x))", false));
/// assert!(!needs_resolution("translateX(2em)", false));
/// assert!(needs_resolution("translateX(2em)", true));
/// ```
pub fn needs_resolution(css: &str, normalize: bool) -> bool {
    DYNAMIC_FUNCTION.is_match(css) || (normalize && RELATIVE_UNIT.is_match(css))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_functions() {
        assert!(needs_resolution("var(--a)", false));
        assert!(needs_resolution("CALC(1px + 2px)", false));
        assert!(needs_resolution("rotate(calc(num(1s) * 1deg))", false));
        assert!(needs_resolution("translateX(calc(index() * 10px))", false));
        assert!(needs_resolution("url(a.png)", false));
    }

    #[test]
    fn test_plain_values() {
        assert!(!needs_resolution("10px", false));
        assert!(!needs_resolution("rotate(45deg)", false));
        assert!(!needs_resolution("ease-in-out", true));
        assert!(!needs_resolution("translate(10px, 20px)", true));
        assert!(!needs_resolution("100ms", true));
    }

    #[test]
    fn test_normalize_units() {
        assert!(needs_resolution("2em", true));
        assert!(needs_resolution("translate(50vw)", true));
        assert!(needs_resolution("rotate(90deg)", true));
        assert!(needs_resolution("1.5s", true));
        assert!(!needs_resolution("1.5s", false));
    }

    #[test]
    fn test_function_name_boundaries() {
        assert!(!needs_resolution("novar(1)", false));
        assert!(!needs_resolution("recalc(1)", false));
    }
}
