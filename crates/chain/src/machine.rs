//! The transfer state machine.
//!
//! One operation: move value between two accounts. Business-rule
//! failures (short gas, unknown sender, insufficient balance) fail
//! closed: the transaction gets a failure receipt and state is left
//! exactly as it was. Only storage trouble surfaces as an error.

use crate::statedb::{Result, StateDb};
use nanoledger_core::{Receipt, Transaction, TRANSFER_GAS};
use tracing::debug;

/// Executes transfer transactions against a [`StateDb`].
#[derive(Debug, Default)]
pub struct StateMachine;

impl StateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Execute one transfer.
    ///
    /// The sender is charged `value + TRANSFER_GAS * gas_price` and has
    /// its nonce bumped; the recipient is credited `value`, springing
    /// into existence on first credit. The gas fee is burned.
    pub fn execute<S: StateDb>(&self, state: &mut S, tx: &Transaction) -> Result<Receipt> {
        let tx_hash = tx.hash();

        if tx.gas_limit < TRANSFER_GAS {
            debug!(%tx_hash, gas_limit = tx.gas_limit, "gas below transfer cost");
            return Ok(Receipt::failure(tx_hash));
        }
        let fee = TRANSFER_GAS.saturating_mul(tx.gas_price);
        let cost = tx.value.saturating_add(fee);

        let Some(mut sender) = state.account(&tx.from)? else {
            debug!(%tx_hash, from = %tx.from, "sender has no account");
            return Ok(Receipt::failure(tx_hash));
        };
        if !sender.has_balance(cost) {
            debug!(
                %tx_hash,
                required = cost,
                available = sender.balance,
                "insufficient balance"
            );
            return Ok(Receipt::failure(tx_hash));
        }

        sender.debit(cost);
        sender.increment_nonce();
        state.put_account(&tx.from, &sender)?;

        let mut recipient = state.account(&tx.to)?.unwrap_or_default();
        recipient.credit(tx.value);
        state.put_account(&tx.to, &recipient)?;

        Ok(Receipt::success(tx_hash, TRANSFER_GAS))
    }
}
