//! Fallback handler for encodings with no recognisable prefix

use std::sync::Arc;

use crate::domain::{DomainError, HashOptions, PasswordHandler};

/// Tries each legacy handler in order until one accepts the credential
#[derive(Debug, Clone)]
pub struct ChainedHandler {
    handlers: Vec<Arc<dyn PasswordHandler>>,
}

impl ChainedHandler {
    pub fn new(handlers: Vec<Arc<dyn PasswordHandler>>) -> Self {
        Self { handlers }
    }
}

impl PasswordHandler for ChainedHandler {
    fn hash(&self, _plaintext: &str, _options: &HashOptions) -> Result<String, DomainError> {
        Err(DomainError::unsupported_algorithm("chained"))
    }

    fn verify(&self, plaintext: &str, encoded: &str) -> bool {
        self.handlers.iter().any(|h| h.verify(plaintext, encoded))
    }

    /// Anything that only the chain can read is a legacy format
    fn needs_rehash(&self, _encoded: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::password::{Md5Handler, PhpassHandler};

    fn chain() -> ChainedHandler {
        ChainedHandler::new(vec![
            Arc::new(PhpassHandler::new(8).unwrap()),
            Arc::new(Md5Handler::new()),
        ])
    }

    #[test]
    fn test_verifies_md5() {
        assert!(chain().verify("password", "5f4dcc3b5aa765d61d8327deb882cf99"));
        assert!(!chain().verify("wrong", "5f4dcc3b5aa765d61d8327deb882cf99"));
    }

    #[test]
    fn test_verifies_phpass_h_variant() {
        let phpass = PhpassHandler::new(8).unwrap();
        let hash = phpass
            .hash("password", &HashOptions::default())
            .unwrap()
            .replacen("$P$", "$H$", 1);

        // The digest does not depend on the marker, so the swapped hash still verifies
        assert!(chain().verify("password", &hash));
    }

    #[test]
    fn test_cannot_hash() {
        let result = chain().hash("password", &HashOptions::default());
        assert!(matches!(result, Err(DomainError::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn test_empty_chain_rejects_everything() {
        let empty = ChainedHandler::new(Vec::new());
        assert!(!empty.verify("password", "5f4dcc3b5aa765d61d8327deb882cf99"));
    }
}
