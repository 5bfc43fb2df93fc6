use crate::f;

/// Extends floats with more specific formatting options
pub trait ValueExt {
    /// Better scientific number formatting
    ///
    /// The default `LowerExp` output is inconsistent about signs and
    /// exponent padding, which makes columns of solver diagnostics a pain
    /// to read. This pins both down.
    ///
    /// ```rust
    /// # use rmx_utils::ValueExt;
    /// assert_eq!((-1.0).sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!(1250.0.sci(2, 2), "1.25e+03".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;

    /// Format a fraction as a padded percentage
    ///
    /// ```rust
    /// # use rmx_utils::ValueExt;
    /// assert_eq!(0.1234.pct(1), "12.3%".to_string());
    /// ```
    fn pct(&self, precision: usize) -> String;
}

impl ValueExt for f64 {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let formatted = f!("{:.*e}", precision, self);

        // guaranteed to contain 'e' from the format above
        let (mantissa, exponent) = formatted.split_once('e').unwrap();

        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };

        f!("{mantissa}e{sign}{digits:0>exp_pad$}")
    }

    fn pct(&self, precision: usize) -> String {
        f!("{:.*}%", precision, self * 100.0)
    }
}
