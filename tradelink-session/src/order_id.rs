/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Client order id allocation.
//!
//! Each session owns one generator. Ids start at 1, increase by one per
//! allocation, and are never reused. Running past the 32-bit wire ceiling is
//! an error rather than a silent wrap.

use tradelink_core::error::SessionError;
use tradelink_core::types::ClientOrderId;

/// Allocates client order ids for one session.
#[derive(Debug, Clone)]
pub struct OrderIdGenerator {
    /// Next id to hand out, `None` once the range is used up.
    next: Option<ClientOrderId>,
}

impl OrderIdGenerator {
    /// Creates a generator starting at [`ClientOrderId::FIRST`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: Some(ClientOrderId::FIRST),
        }
    }

    /// Creates a generator starting at `first`.
    ///
    /// # Arguments
    /// * `first` - The first id to allocate
    #[must_use]
    pub const fn with_initial(first: ClientOrderId) -> Self {
        Self { next: Some(first) }
    }

    /// Returns the id the next allocation would return.
    #[inline]
    #[must_use]
    pub const fn peek(&self) -> Option<ClientOrderId> {
        self.next
    }

    /// Returns true if no ids remain.
    #[inline]
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    /// Allocates the next id.
    ///
    /// # Errors
    /// Returns `SessionError::OrderIdExhausted` once every id has been used.
    pub fn allocate(&mut self) -> Result<ClientOrderId, SessionError> {
        let id = self.next.ok_or(SessionError::OrderIdExhausted)?;
        self.next = id.next();
        Ok(id)
    }
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_one_and_increments() {
        let mut ids = OrderIdGenerator::new();
        assert_eq!(ids.peek(), Some(ClientOrderId::new(1)));
        assert_eq!(ids.allocate().unwrap(), ClientOrderId::new(1));
        assert_eq!(ids.allocate().unwrap(), ClientOrderId::new(2));
        assert_eq!(ids.peek(), Some(ClientOrderId::new(3)));
    }

    #[test]
    fn test_independent_generators() {
        let mut a = OrderIdGenerator::new();
        let mut b = OrderIdGenerator::new();
        a.allocate().unwrap();
        a.allocate().unwrap();
        assert_eq!(b.allocate().unwrap(), ClientOrderId::FIRST);
    }

    #[test]
    fn test_exhaustion_is_signalled() {
        let mut ids = OrderIdGenerator::with_initial(ClientOrderId::new(u32::MAX));
        assert_eq!(ids.allocate().unwrap(), ClientOrderId::new(u32::MAX));
        assert!(ids.is_exhausted());
        assert_eq!(ids.allocate(), Err(SessionError::OrderIdExhausted));
        assert_eq!(ids.allocate(), Err(SessionError::OrderIdExhausted));
    }
}
