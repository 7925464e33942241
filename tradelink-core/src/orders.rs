/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Order instruction value objects.
//!
//! Each instruction is validated once, before it is handed to the session;
//! a validation failure performs no encoding and never touches session
//! state. The structs here are plain data; the wire crate owns their
//! payload representation.

use crate::error::ValidationError;
use crate::types::{
    MAX_PRICE, MAX_QUANTITY, MIN_PRICE, MIN_QUANTITY, Side, TimeInForce, Uuid128,
};

/// Instruction to create a limit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCreate {
    /// Order quantity.
    pub quantity: u32,
    /// Limit price in venue ticks.
    pub price: u32,
    /// Buy or sell.
    pub side: Side,
    /// Market the order belongs to.
    pub market: Uuid128,
    /// Contract within the market.
    pub contract: Uuid128,
    /// Optional lifetime; the venue default applies when absent.
    pub time_in_force: Option<TimeInForce>,
    /// Optional client-supplied reference echoed back in reports.
    pub reference: Option<u64>,
}

impl OrderCreate {
    /// Creates a new order instruction with the required fields.
    #[must_use]
    pub const fn new(
        quantity: u32,
        price: u32,
        side: Side,
        market: Uuid128,
        contract: Uuid128,
    ) -> Self {
        Self {
            quantity,
            price,
            side,
            market,
            contract,
            time_in_force: None,
            reference: None,
        }
    }

    /// Sets the time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    /// Sets the client reference.
    #[must_use]
    pub const fn with_reference(mut self, reference: u64) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Validates this instruction against the venue bounds.
    ///
    /// # Errors
    /// Returns the first violated bound as a [`ValidationError`]. Nothing is
    /// encoded on failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.price < MIN_PRICE {
            return Err(ValidationError::PriceTooLow {
                got: self.price,
                min: MIN_PRICE,
            });
        }
        if self.price > MAX_PRICE {
            return Err(ValidationError::PriceTooHigh {
                got: self.price,
                max: MAX_PRICE,
            });
        }
        if self.quantity < MIN_QUANTITY {
            return Err(ValidationError::QuantityTooLow {
                got: self.quantity,
                min: MIN_QUANTITY,
            });
        }
        if self.quantity > MAX_QUANTITY {
            return Err(ValidationError::QuantityTooHigh {
                got: self.quantity,
                max: MAX_QUANTITY,
            });
        }
        Ok(())
    }
}

/// Instruction to cancel a single order by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCancel {
    /// Identifier of the order to cancel.
    pub order: Uuid128,
    /// Optional client-supplied reference.
    pub reference: Option<u64>,
}

impl OrderCancel {
    /// Creates a cancel instruction for the given order.
    #[must_use]
    pub const fn new(order: Uuid128) -> Self {
        Self {
            order,
            reference: None,
        }
    }

    /// Sets the client reference.
    #[must_use]
    pub const fn with_reference(mut self, reference: u64) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Validates this instruction.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidId`] for the nil identifier.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.order == Uuid128::default() {
            return Err(ValidationError::InvalidId {
                reason: "order id must not be nil".to_string(),
            });
        }
        Ok(())
    }
}

/// Instruction to cancel every resting order in a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdersForMarket {
    /// Market whose orders are cancelled.
    pub market: Uuid128,
}

impl OrdersForMarket {
    /// Creates a market-scoped cancel instruction.
    #[must_use]
    pub const fn new(market: Uuid128) -> Self {
        Self { market }
    }

    /// Validates this instruction.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidId`] for the nil identifier.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.market == Uuid128::default() {
            return Err(ValidationError::InvalidId {
                reason: "market id must not be nil".to_string(),
            });
        }
        Ok(())
    }
}

/// Returns true when both instructions carry a reference and they match.
#[must_use]
pub const fn references_match(a: &OrderCreate, b: &OrderCreate) -> bool {
    matches!((a.reference, b.reference), (Some(x), Some(y)) if x == y)
}
