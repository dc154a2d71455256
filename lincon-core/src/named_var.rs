//! Named variable sets used as states and actions.
use crate::error::LinconError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Properties of a single named variable.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct VarProperties {
    /// Name of the variable.
    pub name: String,

    /// Lower bound of the value range.
    pub min: f64,

    /// Upper bound of the value range.
    pub max: f64,

    /// If `true`, values wrap around at the range limits (e.g. angles).
    #[serde(default)]
    pub circular: bool,
}

impl VarProperties {
    /// Creates the properties of a non-circular variable.
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            circular: false,
        }
    }

    /// Marks the variable as circular.
    pub fn circular(mut self, v: bool) -> Self {
        self.circular = v;
        self
    }

    /// Width of the value range.
    pub fn range_width(&self) -> f64 {
        self.max - self.min
    }

    /// Brings `value` into the range, clamping or wrapping.
    fn bound(&self, value: f64) -> f64 {
        if self.circular {
            wrap(value, self.min, self.max)
        } else {
            value.max(self.min).min(self.max)
        }
    }
}

/// Wraps `value` into `[min, max]` with period `max - min`.
///
/// Positive multiples of the period above `min` map to `max`. Non-finite values are
/// clamped.
pub(crate) fn wrap(value: f64, min: f64, max: f64) -> f64 {
    let width = max - min;
    if width <= 0.0 {
        return min;
    }
    if !value.is_finite() {
        return value.max(min).min(max);
    }
    let r = (value - min).rem_euclid(width);
    if r == 0.0 && value > min {
        max
    } else {
        (min + r).min(max)
    }
}

/// An ordered set of named variables with their current values.
///
/// States and actions are both represented by this type.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedVarSet {
    properties: Vec<VarProperties>,
    values: Vec<f64>,
}

/// A state of the environment.
pub type State = NamedVarSet;

/// An action applied to the environment.
pub type Action = NamedVarSet;

impl NamedVarSet {
    /// Creates a set of variables with initial values at the lower bound of each range.
    pub fn new(properties: Vec<VarProperties>) -> Self {
        let values = properties.iter().map(|p| p.min).collect();
        Self { properties, values }
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the set has no variables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the variable with the given name.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.properties
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| LinconError::UnknownVariable(name.to_string()).into())
    }

    /// Properties of the variable with the given name.
    pub fn properties(&self, name: &str) -> Result<&VarProperties> {
        let i = self.index_of(name)?;
        Ok(&self.properties[i])
    }

    /// Current value of the variable with the given name.
    pub fn get(&self, name: &str) -> Result<f64> {
        let i = self.index_of(name)?;
        Ok(self.values[i])
    }

    /// Sets the value of a variable.
    ///
    /// Non-circular variables are clamped to their range, circular ones wrapped into it.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let i = self.index_of(name)?;
        self.set_at(i, value);
        Ok(())
    }

    /// Current value of the `i`-th variable.
    pub fn get_at(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Sets the value of the `i`-th variable, see [`NamedVarSet::set`].
    pub fn set_at(&mut self, i: usize, value: f64) {
        self.values[i] = self.properties[i].bound(value);
    }

    /// Values of all variables, in declaration order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates over the properties of all variables.
    pub fn iter_properties(&self) -> impl Iterator<Item = &VarProperties> {
        self.properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> NamedVarSet {
        NamedVarSet::new(vec![
            VarProperties::new("position", -1.0, 1.0),
            VarProperties::new("angle", -3.0, 3.0).circular(true),
        ])
    }

    #[test]
    fn test_set_clamps_and_wraps() -> Result<()> {
        let mut s = state();
        s.set("position", 2.5)?;
        assert_eq!(s.get("position")?, 1.0);
        s.set("angle", 4.0)?;
        assert!((s.get("angle")? - (-2.0)).abs() < 1e-12);
        s.set("angle", -3.5)?;
        assert!((s.get("angle")? - 2.5).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_wrap_large_and_non_finite() -> Result<()> {
        let mut s = state();
        s.set("angle", 1e17)?;
        let v = s.get("angle")?;
        assert!((-3.0..=3.0).contains(&v));

        s.set("angle", f64::INFINITY)?;
        assert_eq!(s.get("angle")?, 3.0);
        s.set("angle", f64::NEG_INFINITY)?;
        assert_eq!(s.get("angle")?, -3.0);
        s.set("angle", f64::NAN)?;
        assert_eq!(s.get("angle")?, -3.0);
        Ok(())
    }

    #[test]
    fn test_wrap_keeps_upper_limit() {
        assert_eq!(wrap(3.0, -3.0, 3.0), 3.0);
        assert_eq!(wrap(9.0, -3.0, 3.0), 3.0);
        assert_eq!(wrap(-9.0, -3.0, 3.0), -3.0);
        assert!(wrap(-1e-300, 0.0, 1.0) <= 1.0);
    }

    #[test]
    fn test_unknown_variable() {
        let s = state();
        let err = s.get("velocity").unwrap_err();
        assert_eq!(
            err.downcast_ref::<LinconError>(),
            Some(&LinconError::UnknownVariable("velocity".to_string()))
        );
    }
}
