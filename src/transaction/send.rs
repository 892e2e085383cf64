use log::debug;

use super::{Message, Transaction};
use crate::blockchain::{Blockchain, TESTING_VIRTUAL_COINS};
use crate::error::CryptoError;
use crate::wallet::KeyPair;

/// Sign a transfer from `sender` and hand it to the ledger's mempool.
///
/// Returns `Ok(false)` when the sender cannot afford it or the ledger drops
/// the message; nothing is retried.
pub fn send_virtual_coins(
    ledger: &Blockchain,
    sender: &str,
    receiver: &str,
    amount: u64,
    keys: &KeyPair,
) -> Result<bool, CryptoError> {
    let balance = ledger.get_virtual_coins_amount(sender);

    if balance < -TESTING_VIRTUAL_COINS {
        debug!("SEND - {sender} is over-extended (balance={balance})");
        return Ok(false);
    }
    let spendable = balance.saturating_add(TESTING_VIRTUAL_COINS);
    if i64::try_from(amount).map_or(true, |a| a > spendable) {
        debug!("SEND - {sender} cannot afford {amount} (balance={balance})");
        return Ok(false);
    }

    let message = Message::signed(
        ledger.next_message_id(),
        Transaction::new(sender, receiver, amount),
        keys,
    );
    ledger.receive_message(message)
}
