//! 64-bit integer strategies.
//!
//! The codec never decides on its own how wide a 64-bit field may be on the
//! host side. An [`IntegerStrategy`] is injected at construction time and
//! consulted at every boundary where a 64-bit value enters or leaves a
//! record: wire decode, wire encode, JSON coercion and partial construction.
//!
//! - [`NativeIntegers`] accepts the full `u64` / `i64` range.
//! - [`SafeIntegers`] limits magnitudes to `2^53 - 1`, the range a JavaScript
//!   `number` (or any IEEE-754 double consumer) can hold without loss.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// `Number.MAX_SAFE_INTEGER`.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Range policy for 64-bit integer fields.
pub trait IntegerStrategy: Send + Sync + fmt::Debug {
    /// Short name used in overflow messages, e.g. `"safe"`.
    fn name(&self) -> &'static str;

    fn max_unsigned(&self) -> u64;

    fn min_signed(&self) -> i64;

    fn max_signed(&self) -> i64;

    fn check_unsigned(&self, field: &str, v: u64) -> Result<u64, CodecError> {
        if v > self.max_unsigned() {
            return Err(CodecError::overflow(
                field,
                v,
                format!("uint64 ({} integers)", self.name()),
            ));
        }
        Ok(v)
    }

    fn check_signed(&self, field: &str, v: i64) -> Result<i64, CodecError> {
        if v < self.min_signed() || v > self.max_signed() {
            return Err(CodecError::overflow(
                field,
                v,
                format!("int64 ({} integers)", self.name()),
            ));
        }
        Ok(v)
    }
}

/// Full-width 64-bit integers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeIntegers;

impl IntegerStrategy for NativeIntegers {
    fn name(&self) -> &'static str {
        "native"
    }

    fn max_unsigned(&self) -> u64 {
        u64::MAX
    }

    fn min_signed(&self) -> i64 {
        i64::MIN
    }

    fn max_signed(&self) -> i64 {
        i64::MAX
    }
}

/// Integers limited to the IEEE-754 double safe range.
#[derive(Debug, Default, Clone, Copy)]
pub struct SafeIntegers;

impl IntegerStrategy for SafeIntegers {
    fn name(&self) -> &'static str {
        "safe"
    }

    fn max_unsigned(&self) -> u64 {
        MAX_SAFE_INTEGER
    }

    fn min_signed(&self) -> i64 {
        -(MAX_SAFE_INTEGER as i64)
    }

    fn max_signed(&self) -> i64 {
        MAX_SAFE_INTEGER as i64
    }
}

/// Serializable selector for the built-in strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerMode {
    #[default]
    Native,
    Safe,
}

impl IntegerMode {
    pub fn strategy(self) -> Arc<dyn IntegerStrategy> {
        match self {
            IntegerMode::Native => Arc::new(NativeIntegers),
            IntegerMode::Safe => Arc::new(SafeIntegers),
        }
    }
}

impl fmt::Display for IntegerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegerMode::Native => write!(f, "native"),
            IntegerMode::Safe => write!(f, "safe"),
        }
    }
}
