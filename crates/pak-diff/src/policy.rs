//! Leaf equality policy: per-payload-kind comparison rules.
//!
//! Composite payloads are never compared here; the differ recurses into
//! them. Everything else matches exhaustively, so a payload kind added to
//! the model cannot silently fall through.

use pak_node::{ImageValue, Value};

use crate::config::{CompareConfig, ImageComparison};

/// Compare two leaf payloads under the configured strictness.
///
/// Link payloads are compared as raw strings; the differ substitutes
/// resolved targets before calling in when link resolution is enabled.
pub fn values_equal(config: &CompareConfig, new: &Value, old: &Value) -> bool {
    match (new, old) {
        (Value::Vector { x: nx, y: ny }, Value::Vector { x: ox, y: oy }) => {
            nx == ox && ny == oy
        }
        (Value::Link(n), Value::Link(o)) => n == o,
        (Value::Sound(n), Value::Sound(o)) => {
            n.duration_ms == o.duration_ms && n.data_len == o.data_len
        }
        (Value::Image(n), Value::Image(o)) => {
            images_equal(config.image_comparison, n, o)
        }
        // Atomic archive boundary: declared metadata only.
        (Value::Archive(n), Value::Archive(o)) => n == o,
        // Composite markers carry no payload of their own.
        (Value::SubTree, Value::SubTree) => true,
        (
            n @ (Value::Null | Value::Int(_) | Value::Float(_) | Value::Text(_)),
            o @ (Value::Null | Value::Int(_) | Value::Float(_) | Value::Text(_)),
        ) => scalars_equal(n, o),
        // Kind mismatch.
        _ => false,
    }
}

/// Scalar equality with numeric normalization: an integer, a float, and a
/// string-encoded number are equal when they denote the same number.
fn scalars_equal(new: &Value, old: &Value) -> bool {
    match (new, old) {
        (Value::Null, Value::Null) => true,
        (Value::Int(n), Value::Int(o)) => n == o,
        // NaN payloads on both sides are the same value for diffing
        // purposes; IEEE inequality would break compare-with-self.
        (Value::Float(n), Value::Float(o)) => n == o || (n.is_nan() && o.is_nan()),
        (Value::Text(n), Value::Text(o)) if n == o => true,
        _ => match (new.as_number(), old.as_number()) {
            (Some(n), Some(o)) => n == o,
            _ => false,
        },
    }
}

fn images_equal(mode: ImageComparison, new: &ImageValue, old: &ImageValue) -> bool {
    if new.width != old.width || new.height != old.height {
        return false;
    }
    match mode {
        ImageComparison::SizeOnly => new.data_len == old.data_len,
        ImageComparison::PixelExact => match (&new.pixels, &old.pixels) {
            (Some(n), Some(o)) => n == o,
            // No decoded buffer to compare on at least one side.
            _ => new.data_len == old.data_len,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pak_node::SoundValue;
    use std::sync::Arc;

    fn config() -> CompareConfig {
        CompareConfig::default()
    }

    #[test]
    fn numeric_forms_normalize() {
        let config = config();
        assert!(values_equal(&config, &Value::Int(10), &Value::Int(10)));
        assert!(values_equal(&config, &Value::Int(10), &Value::Float(10.0)));
        assert!(values_equal(
            &config,
            &Value::Text("10".into()),
            &Value::Int(10)
        ));
        assert!(!values_equal(&config, &Value::Int(10), &Value::Int(12)));
        assert!(!values_equal(
            &config,
            &Value::Text("ten".into()),
            &Value::Int(10)
        ));
    }

    #[test]
    fn nan_compares_equal_to_itself() {
        let config = config();
        assert!(values_equal(
            &config,
            &Value::Float(f64::NAN),
            &Value::Float(f64::NAN)
        ));
        assert!(!values_equal(
            &config,
            &Value::Float(f64::NAN),
            &Value::Float(1.0)
        ));
        assert!(!values_equal(&config, &Value::Float(f64::NAN), &Value::Int(1)));
    }

    #[test]
    fn text_equality_is_not_numeric_only() {
        let config = config();
        assert!(values_equal(
            &config,
            &Value::Text("abc".into()),
            &Value::Text("abc".into())
        ));
        assert!(!values_equal(
            &config,
            &Value::Text("abc".into()),
            &Value::Text("abd".into())
        ));
    }

    #[test]
    fn null_equals_only_null() {
        let config = config();
        assert!(values_equal(&config, &Value::Null, &Value::Null));
        assert!(!values_equal(&config, &Value::Null, &Value::Int(0)));
    }

    #[test]
    fn vectors_compare_componentwise() {
        let config = config();
        assert!(values_equal(
            &config,
            &Value::Vector { x: 1, y: 2 },
            &Value::Vector { x: 1, y: 2 }
        ));
        assert!(!values_equal(
            &config,
            &Value::Vector { x: 1, y: 2 },
            &Value::Vector { x: 2, y: 1 }
        ));
    }

    #[test]
    fn sounds_compare_by_duration_and_length() {
        let config = config();
        let a = Value::Sound(SoundValue {
            duration_ms: 1200,
            data_len: 4096,
        });
        let b = Value::Sound(SoundValue {
            duration_ms: 1200,
            data_len: 4096,
        });
        let c = Value::Sound(SoundValue {
            duration_ms: 1300,
            data_len: 4096,
        });
        assert!(values_equal(&config, &a, &b));
        assert!(!values_equal(&config, &a, &c));
    }

    #[test]
    fn size_only_images_ignore_pixels() {
        let config = config();
        let mut a = ImageValue::sized(32, 32, 100);
        let mut b = ImageValue::sized(32, 32, 100);
        a.pixels = Some(Arc::from(vec![1u8, 2, 3]));
        b.pixels = Some(Arc::from(vec![9u8, 9, 9]));
        assert!(values_equal(
            &config,
            &Value::Image(a),
            &Value::Image(b)
        ));
    }

    #[test]
    fn pixel_exact_images_compare_buffers() {
        let config = CompareConfig {
            image_comparison: ImageComparison::PixelExact,
            ..CompareConfig::default()
        };
        let mut a = ImageValue::sized(32, 32, 100);
        let mut b = ImageValue::sized(32, 32, 200);
        a.pixels = Some(Arc::from(vec![1u8, 2, 3]));
        b.pixels = Some(Arc::from(vec![1u8, 2, 3]));
        // Same decoded buffers win over differing encoded lengths.
        assert!(values_equal(
            &config,
            &Value::Image(a.clone()),
            &Value::Image(b)
        ));

        // Without buffers, fall back to encoded length.
        let c = ImageValue::sized(32, 32, 100);
        let d = ImageValue::sized(32, 32, 200);
        assert!(!values_equal(
            &config,
            &Value::Image(c),
            &Value::Image(d)
        ));
    }

    #[test]
    fn dimension_mismatch_is_never_equal() {
        let config = config();
        assert!(!values_equal(
            &config,
            &Value::Image(ImageValue::sized(32, 32, 100)),
            &Value::Image(ImageValue::sized(32, 64, 100))
        ));
    }

    #[test]
    fn links_compare_as_raw_strings() {
        let config = config();
        assert!(values_equal(
            &config,
            &Value::Link("../a/b".into()),
            &Value::Link("../a/b".into())
        ));
        assert!(!values_equal(
            &config,
            &Value::Link("../a/b".into()),
            &Value::Link("../a/c".into())
        ));
    }

    #[test]
    fn kind_mismatch_is_never_equal() {
        let config = config();
        assert!(!values_equal(
            &config,
            &Value::Vector { x: 1, y: 2 },
            &Value::Text("(1, 2)".into())
        ));
        assert!(!values_equal(
            &config,
            &Value::Sound(SoundValue {
                duration_ms: 1,
                data_len: 1
            }),
            &Value::Null
        ));
    }
}
