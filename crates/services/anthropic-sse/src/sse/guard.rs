use crate::error::AnthropicError;

/// Cumulative counter of stream lines that carried no usable event
///
/// The count never resets: a stream that keeps interleaving noise with real
/// events is still aborted once the total passes the limit.
#[derive(Debug, Clone, Copy)]
pub struct EmptyFrameGuard {
    limit: usize,
    count: usize,
}

impl EmptyFrameGuard {
    /// Guard that tolerates `limit` unmatched lines
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { limit, count: 0 }
    }

    /// Record one unmatched line
    ///
    /// # Errors
    ///
    /// Returns [`AnthropicError::TooManyEmptyStreamMessages`] once the count
    /// exceeds the limit.
    pub fn record(&mut self) -> Result<(), AnthropicError> {
        self.count += 1;
        if self.count > self.limit {
            return Err(AnthropicError::TooManyEmptyStreamMessages { limit: self.limit });
        }
        Ok(())
    }

    /// Unmatched lines seen so far
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborts_on_first_line_past_limit() {
        let mut g = EmptyFrameGuard::new(3);
        for _ in 0..3 {
            g.record().unwrap();
        }
        assert!(matches!(
            g.record(),
            Err(AnthropicError::TooManyEmptyStreamMessages { limit: 3 })
        ));
        assert_eq!(g.count(), 4);
    }

    #[test]
    fn zero_limit_rejects_everything() {
        let mut g = EmptyFrameGuard::new(0);
        assert!(g.record().is_err());
    }
}
