//! Function signatures.

use alloc::vec::Vec;

use crate::types::Type;

/// A function signature (parameter and return types).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Parameter types.
    pub params: Vec<Type>,
    /// Return types.
    pub returns: Vec<Type>,
}

impl Signature {
    /// Create a new signature with the given parameters and returns.
    pub fn new(params: Vec<Type>, returns: Vec<Type>) -> Self {
        Self { params, returns }
    }

    /// Create a signature with no parameters and no returns.
    pub fn empty() -> Self {
        Self {
            params: Vec::new(),
            returns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn test_signature_creation() {
        let sig = Signature::new(vec![Type::I32, Type::I32], vec![Type::I32]);
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.returns.len(), 1);
    }

    #[test]
    fn test_empty_signature() {
        let sig = Signature::empty();
        assert!(sig.params.is_empty());
        assert!(sig.returns.is_empty());
    }
}
