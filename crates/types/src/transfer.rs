//! ERC-20 transfer detection and decoding.

use alloy::primitives::{Address, U256};

use crate::{TokenTransfer, Transaction};

/// Four-byte selector of `transfer(address,uint256)`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Selector plus two 32-byte ABI words.
const TRANSFER_CALL_LEN: usize = 4 + 32 + 32;

impl Transaction {
    /// Whether the call data is a well-formed `transfer(address,uint256)`
    /// invocation against a contract.
    pub fn is_token_transfer(&self) -> bool {
        self.to.is_some()
            && self.input.len() >= TRANSFER_CALL_LEN
            && self.input[..4] == TRANSFER_SELECTOR
    }

    /// Decodes the token transfer carried by this transaction, if any.
    ///
    /// The recipient is the low 20 bytes of the first ABI word; the amount is
    /// the full second word. The token contract is the transaction recipient.
    pub fn token_transfer(&self) -> Option<TokenTransfer> {
        if !self.is_token_transfer() {
            return None;
        }
        let to = Address::from_slice(&self.input[16..36]);
        let value = U256::from_be_slice(&self.input[36..68]);
        Some(TokenTransfer {
            block_number: self.block_number,
            hash: self.hash,
            timestamp: self.timestamp,
            contract: self.to?,
            from: self.from,
            to,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Bytes};
    use proptest::prelude::*;

    fn transfer_input(to: Address, value: U256) -> Bytes {
        let mut input = Vec::with_capacity(TRANSFER_CALL_LEN);
        input.extend_from_slice(&TRANSFER_SELECTOR);
        input.extend_from_slice(&[0u8; 12]);
        input.extend_from_slice(to.as_slice());
        input.extend_from_slice(&value.to_be_bytes::<32>());
        input.into()
    }

    #[test]
    fn decodes_a_transfer() {
        let recipient = address!("0x000000000000000000000000000000000000abcd");
        let tx = Transaction {
            block_number: 7,
            to: Some(address!("0xcafe000000000000000000000000000000000000")),
            from: address!("0xab5801a7d398351b8be11c439e05c5b3259aec9b"),
            input: transfer_input(recipient, U256::from(100u64)),
            timestamp: 1485656000,
            ..Default::default()
        };
        assert!(tx.is_token_transfer());

        let transfer = tx.token_transfer().unwrap();
        assert_eq!(transfer.contract, tx.to.unwrap());
        assert_eq!(transfer.from, tx.from);
        assert_eq!(transfer.to, recipient);
        assert_eq!(transfer.value, U256::from(100u64));
        assert_eq!(transfer.block_number, 7);
        assert_eq!(transfer.timestamp, 1485656000);
    }

    #[test]
    fn rejects_short_and_foreign_inputs() {
        let mut tx = Transaction {
            to: Some(Address::repeat_byte(1)),
            input: Bytes::from_static(&[0xa9, 0x05, 0x9c, 0xbb, 0x00]),
            ..Default::default()
        };
        assert!(!tx.is_token_transfer());

        tx.input = transfer_input(Address::ZERO, U256::ZERO);
        let mut foreign = tx.clone();
        let mut raw = foreign.input.to_vec();
        raw[0] = 0xa8;
        foreign.input = raw.into();
        assert!(!foreign.is_token_transfer());

        // contract creation carries no recipient
        tx.to = None;
        assert!(!tx.is_token_transfer());
    }

    proptest! {
        #[test]
        fn round_trips_any_address_and_value(to in any::<[u8; 20]>(), value in any::<[u8; 32]>()) {
            let to = Address::from(to);
            let value = U256::from_be_bytes(value);
            let tx = Transaction {
                to: Some(Address::repeat_byte(0xee)),
                input: transfer_input(to, value),
                ..Default::default()
            };
            let transfer = tx.token_transfer().unwrap();
            prop_assert_eq!(transfer.to, to);
            prop_assert_eq!(transfer.value, value);
        }
    }
}
