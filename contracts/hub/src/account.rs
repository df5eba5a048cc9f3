//! Account state, derived on every read from the reservation list and the
//! ledger clock. Nothing here is stored.

use soroban_sdk::{contracttype, Bytes, BytesN, Env};

use crate::reservations;
use crate::storage;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccountState {
    /// No unexpired, non-zero hold. Free to take on a new commitment.
    Null,
    /// Bound by at least one active hold.
    Committed,
}

pub fn state_of(list: &Bytes, now: u64) -> AccountState {
    if reservations::iter(list).any(|r| r.is_active(now)) {
        AccountState::Committed
    } else {
        AccountState::Null
    }
}

pub fn state(e: &Env, account: &BytesN<20>) -> AccountState {
    state_of(&storage::reservations(e, account), reservations::now(e))
}

pub fn is_in_null_state(e: &Env, account: &BytesN<20>) -> bool {
    state(e, account) == AccountState::Null
}
