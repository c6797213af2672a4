//! Content transformations applied by the worker pool
//!
//! A transformation is a pure, deterministic `bytes -> bytes` mapping. The
//! pipeline only relies on two properties:
//!
//! - **Purity**: same input, same output, no I/O and no hidden state. Workers
//!   share a single instance without locking.
//! - **Idempotence**: `apply(apply(x)) == apply(x)`. A file whose content
//!   already equals its transformed form is skipped and never written.
//!
//! Implementations must not panic on malformed input; they return best-effort
//! output or the input unchanged.

pub mod tidy;

pub use tidy::Tidy;

/// A pure content transformation
pub trait Transform: Send + Sync {
    /// Transform file content
    fn apply(&self, input: &[u8]) -> Vec<u8>;

    /// Name used in logs
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Transform for F
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync,
{
    fn apply(&self, input: &[u8]) -> Vec<u8> {
        self(input)
    }
}

/// Returns content unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn apply(&self, input: &[u8]) -> Vec<u8> {
        input.to_vec()
    }

    fn name(&self) -> &str {
        "identity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_transform() {
        let upper = |input: &[u8]| input.to_ascii_uppercase();
        assert_eq!(upper.apply(b"abc"), b"ABC".to_vec());
        assert_eq!(Transform::name(&upper), "custom");
    }

    #[test]
    fn test_identity() {
        assert_eq!(Identity.apply(b"<p>x</p>"), b"<p>x</p>".to_vec());
        assert_eq!(Identity.name(), "identity");
    }

    #[test]
    fn test_trait_object() {
        let t: Box<dyn Transform> = Box::new(Tidy::default());
        assert_eq!(t.apply(b"a  \n"), b"a\n".to_vec());
    }
}
