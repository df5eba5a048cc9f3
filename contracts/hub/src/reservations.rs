//! Per-account reservation ledger.
//!
//! A list is the concatenation of 30-byte records in creation order. Records
//! are never edited in place; expired holds stay in the list and simply stop
//! counting until `compact` rewrites it.

use soroban_sdk::{log, Bytes, BytesN, Env};

use crate::codec::{Reservation, RESERVATION_SIZE};
use crate::error::HubError;
use crate::events;
use crate::storage;
use crate::wallet;

const RECORD: u32 = RESERVATION_SIZE as u32;

/// Number of whole records; trailing partial bytes are ignored.
pub fn count(list: &Bytes) -> u32 {
    list.len() / RECORD
}

fn raw_at(list: &Bytes, index: u32) -> Bytes {
    let start = index * RECORD;
    list.slice(start..start + RECORD)
}

pub fn get(list: &Bytes, index: u32) -> Result<Reservation, HubError> {
    if index >= count(list) {
        return Err(HubError::InvalidRecord);
    }
    let mut raw = [0u8; RESERVATION_SIZE];
    raw_at(list, index).copy_into_slice(&mut raw);
    Reservation::decode(&raw)
}

pub fn iter(list: &Bytes) -> impl Iterator<Item = Reservation> + '_ {
    (0..count(list)).filter_map(move |i| get(list, i).ok())
}

/// Sum of values still held at `now`.
pub fn total_on_hold(list: &Bytes, now: u64) -> u64 {
    iter(list).fold(0u64, |total, r| total.saturating_add(r.on_hold_at(now)))
}

/// Drops every record that is expired or zero-valued, keeping order.
/// Returns the rewritten list and how many records were dropped.
pub fn compact(e: &Env, list: &Bytes, now: u64) -> (Bytes, u32) {
    let mut kept = Bytes::new(e);
    let mut removed = 0u32;
    for index in 0..count(list) {
        match get(list, index) {
            Ok(r) if r.is_active(now) => kept.append(&raw_at(list, index)),
            _ => removed += 1,
        }
    }
    (kept, removed)
}

pub fn now(e: &Env) -> u64 {
    e.ledger().timestamp()
}

/// On-hold value for `account` as of the current ledger time.
pub fn on_hold(e: &Env, account: &BytesN<20>) -> u64 {
    let list = storage::reservations(e, account);
    if list.is_empty() {
        return 0;
    }
    total_on_hold(&list, now(e))
}

/// Places a new hold of `value` on `account` until `expiry`.
///
/// The balance must strictly exceed `value`, and the balance left after
/// current holds must cover it.
pub fn reserve_funds(
    e: &Env,
    account: &BytesN<20>,
    expiry: u32,
    value: u64,
) -> Result<Reservation, HubError> {
    let balance = wallet::balance(e, account)?;
    let to_reserve = i128::from(value);
    if balance <= to_reserve {
        log!(e, "insufficient balance", balance, value);
        events::err(e, "InsufficientFunds1", account.clone());
        return Err(HubError::InsufficientFunds);
    }

    let list = storage::reservations(e, account);
    let held = total_on_hold(&list, now(e));
    let effective = balance - i128::from(held);
    if effective < to_reserve {
        log!(e, "insufficient balance after holds", balance, held, value);
        events::err(e, "InsufficientFunds2", account.clone());
        return Err(HubError::InsufficientFundsAfterHolds);
    }

    let reservation = Reservation::hold(expiry, value);
    let raw = reservation.encode()?;
    let mut list = list;
    list.extend_from_array(&raw);
    storage::put_reservations(e, account, &list);

    events::ok(e, "ReservedFunds", Bytes::from_array(e, &raw));
    Ok(reservation)
}

/// Rewrites `account`'s list without its inactive records.
pub fn compact_account(e: &Env, account: &BytesN<20>) -> u32 {
    let list = storage::reservations(e, account);
    let (kept, removed) = compact(e, &list, now(e));
    if removed > 0 {
        storage::put_reservations(e, account, &kept);
    }
    log!(e, "compacted reservations", account.clone(), removed);
    events::ok(e, "CompactedReservations", (account.clone(), removed));
    removed
}
