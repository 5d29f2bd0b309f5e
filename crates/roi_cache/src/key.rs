//! Canonical cache keys.
//!
//! Inputs are serialised to a JSON value, then written out with object
//! keys sorted, floats at a fixed ten decimal places and `-0` folded into
//! `0`. The canonical text is hashed with SHA-256 together with the
//! calculation kind. Semantically identical inputs therefore share a key
//! regardless of field order or float noise below 1e-10.

use std::fmt::{self, Write as _};

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::CacheError;

/// Decimal places kept when canonicalising floats.
const FLOAT_DECIMALS: usize = 10;

/// Calculation families with independent caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    /// Net present value
    Npv,
    /// Internal rate of return
    Irr,
    /// Monte Carlo simulation
    MonteCarlo,
    /// Sensitivity analysis
    Sensitivity,
}

impl CalculationKind {
    /// Stable name used in key derivation and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationKind::Npv => "npv",
            CalculationKind::Irr => "irr",
            CalculationKind::MonteCarlo => "monte_carlo",
            CalculationKind::Sensitivity => "sensitivity",
        }
    }
}

impl fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hex SHA-256 digest identifying one calculation input.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for `input` under `kind`.
    ///
    /// ```
    /// use roi_cache::{CacheKey, CalculationKind};
    ///
    /// let a = CacheKey::derive(CalculationKind::Npv, &(vec![-1.0, 2.0], 0.1)).unwrap();
    /// let b = CacheKey::derive(CalculationKind::Npv, &(vec![-1.0, 2.0], 0.1 + 1e-13)).unwrap();
    /// let c = CacheKey::derive(CalculationKind::Irr, &(vec![-1.0, 2.0], 0.1)).unwrap();
    /// assert_eq!(a, b);
    /// assert_ne!(a, c);
    /// ```
    pub fn derive<T: Serialize + ?Sized>(
        kind: CalculationKind,
        input: &T,
    ) -> Result<Self, CacheError> {
        let canonical = canonicalize(input)?;
        let mut hasher = Sha256::new();
        hasher.update(kind.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(canonical.as_bytes());
        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical text form of `input`.
///
/// ```
/// use roi_cache::key::canonicalize;
/// use std::collections::HashMap;
///
/// let mut m = HashMap::new();
/// m.insert("b", 2.0);
/// m.insert("a", -0.0);
/// assert_eq!(canonicalize(&m).unwrap(), r#"{"a":0.0000000000,"b":2.0000000000}"#);
/// ```
pub fn canonicalize<T: Serialize + ?Sized>(input: &T) -> Result<String, CacheError> {
    let value =
        serde_json::to_value(input).map_err(|e| CacheError::KeySerialisation(e.to_string()))?;
    let mut out = String::new();
    write_canonical(&value, &mut out);
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                let _ = write!(out, "{u}");
            } else if let Some(i) = n.as_i64() {
                let _ = write!(out, "{i}");
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                write_float(f, out);
            }
        }
        Value::String(s) => out.push_str(&Value::String(s.clone()).to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
    }
}

fn write_float(f: f64, out: &mut String) {
    let rounded = format!("{:.*}", FLOAT_DECIMALS, f);
    // "-0.0000000000" and "0.0000000000" must collide
    if rounded.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        let _ = write!(out, "{:.*}", FLOAT_DECIMALS, 0.0);
    } else {
        out.push_str(&rounded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Ab {
        a: f64,
        b: u64,
    }

    #[derive(Serialize)]
    struct Ba {
        b: u64,
        a: f64,
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let k1 = CacheKey::derive(CalculationKind::MonteCarlo, &Ab { a: 1.5, b: 7 }).unwrap();
        let k2 = CacheKey::derive(CalculationKind::MonteCarlo, &Ba { b: 7, a: 1.5 }).unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_float_noise_is_absorbed() {
        assert_eq!(
            canonicalize(&0.1_f64).unwrap(),
            canonicalize(&(0.3_f64 - 0.2)).unwrap()
        );
    }

    #[test]
    fn test_distinct_values_differ() {
        let k1 = CacheKey::derive(CalculationKind::Npv, &[1.0, 2.0]).unwrap();
        let k2 = CacheKey::derive(CalculationKind::Npv, &[2.0, 1.0]).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_negative_zero_folds() {
        assert_eq!(canonicalize(&-0.0_f64).unwrap(), canonicalize(&0.0_f64).unwrap());
        assert_eq!(
            canonicalize(&-1e-12_f64).unwrap(),
            canonicalize(&0.0_f64).unwrap()
        );
    }

    #[test]
    fn test_large_integers_stay_exact() {
        let a = canonicalize(&u64::MAX).unwrap();
        let b = canonicalize(&(u64::MAX - 1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_is_hex_sha256() {
        let key = CacheKey::derive(CalculationKind::Irr, &"x").unwrap();
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unserialisable_input_errors() {
        use std::collections::HashMap;
        // JSON object keys must be strings
        let mut m = HashMap::new();
        m.insert(vec![1u8], 1.0);
        assert!(matches!(
            canonicalize(&m),
            Err(CacheError::KeySerialisation(_))
        ));
    }
}
