//! Round-robin NewsAPI key rotation.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::NewsError;

/// A fixed set of API keys handed out in rotation, one per request.
pub struct KeyRing {
    keys: Vec<String>,
    next: AtomicUsize,
}

impl KeyRing {
    /// Blank keys are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::NoApiKeys`] if no usable key remains.
    pub fn new<I, S>(keys: I) -> Result<Self, NewsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            return Err(NewsError::NoApiKeys);
        }
        Ok(Self {
            keys,
            next: AtomicUsize::new(0),
        })
    }

    /// The next key in rotation.
    pub fn next_key(&self) -> &str {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        &self.keys[i]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRing")
            .field("keys", &format_args!("[{} redacted]", self.keys.len()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_in_order_and_wraps() {
        let ring = KeyRing::new(["a", "b", "c"]).unwrap();
        let seen: Vec<&str> = (0..7).map(|_| ring.next_key()).collect();
        assert_eq!(seen, vec!["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[test]
    fn blank_keys_are_ignored() {
        let ring = KeyRing::new(["", "  k1 ", " "]).unwrap();
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.next_key(), "k1");
    }

    #[test]
    fn empty_key_list_is_rejected() {
        assert!(matches!(
            KeyRing::new(Vec::<String>::new()),
            Err(NewsError::NoApiKeys)
        ));
    }

    #[test]
    fn debug_output_hides_keys() {
        let ring = KeyRing::new(["secret-key"]).unwrap();
        let debug = format!("{ring:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("1 redacted"));
    }
}
