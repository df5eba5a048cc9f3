#![no_std]
//! Courier hub contract.
//!
//! Travelers list spare carrying capacity, requesters list items to move, and
//! the hub holds part of each lister's balance so both sides honour a match.
//! Holds, demands and travels are fixed-width byte records kept in flat lists.

use soroban_sdk::{contract, contractimpl, log, Address, Bytes, BytesN, Env};

pub mod account;
pub mod codec;
pub mod error;
pub mod escrow;
pub mod events;
pub mod reservations;
pub mod storage;
pub mod wallet;

pub use account::AccountState;
pub use error::HubError;

use codec::{Demand, Reservation, Travel, DEMAND_SIZE, RESERVATION_SIZE, TRAVEL_SIZE};

/// The `HubNotInitialized` event only survives on entries that swallow the
/// error into a bool or empty result; a returned `Err` rolls it back, so the
/// refusal is also written to the diagnostic log.
fn ensure_initialized(e: &Env) -> Result<(), HubError> {
    if storage::is_initialized(e) {
        return Ok(());
    }
    log!(e, "hub not initialized");
    events::err(e, "HubNotInitialized", ());
    Err(HubError::NotInitialized)
}

/// Copies `bytes` into a fixed array, failing on any length mismatch.
fn fixed<const N: usize>(bytes: &Bytes) -> Result<[u8; N], HubError> {
    if bytes.len() as usize != N {
        return Err(HubError::InvalidRecord);
    }
    let mut out = [0u8; N];
    bytes.copy_into_slice(&mut out);
    Ok(out)
}

fn narrow<T: TryFrom<u32>>(value: u32) -> Result<T, HubError> {
    T::try_from(value).map_err(|_| HubError::InvalidRecord)
}

/// Encoded record, or the empty sequence when encoding failed.
fn or_empty<const N: usize>(e: &Env, encoded: Result<[u8; N], HubError>) -> Bytes {
    match encoded {
        Ok(raw) => Bytes::from_array(e, &raw),
        Err(_) => Bytes::new(e),
    }
}

fn demand_from_args(
    city_hash: &Bytes,
    rep_required: u32,
    item_size: u32,
    item_value: u64,
    info_blob: &Bytes,
) -> Result<Demand, HubError> {
    Ok(Demand {
        city_hash: fixed(city_hash)?,
        rep_required: narrow(rep_required)?,
        item_size: narrow(item_size)?,
        item_value,
        info_blob: fixed(info_blob)?,
    })
}

fn travel_from_args(
    pickup_city_hash: &Bytes,
    drop_off_city_hash: &Bytes,
    rep_required: u32,
    carry_space: u32,
) -> Result<Travel, HubError> {
    Ok(Travel {
        pickup_city_hash: fixed(pickup_city_hash)?,
        drop_off_city_hash: fixed(drop_off_city_hash)?,
        rep_required: narrow(rep_required)?,
        carry_space: narrow(carry_space)?,
    })
}

#[contract]
pub struct HubContract;

#[contractimpl]
impl HubContract {
    /// One-time setup. Returns false if the hub is already initialized.
    pub fn initialize(
        e: Env,
        asset_id: Bytes,
        oracle: Address,
        wallet_script_p1: Bytes,
        wallet_script_p2: Bytes,
        wallet_script_p3: Bytes,
    ) -> bool {
        if storage::is_initialized(&e) {
            return false;
        }
        storage::put_config(
            &e,
            &asset_id,
            &oracle,
            [&wallet_script_p1, &wallet_script_p2, &wallet_script_p3],
        );
        events::ok(&e, "HubInitialized", ());
        true
    }

    pub fn is_initialized(e: Env) -> bool {
        storage::is_initialized(&e)
    }

    // -- wallets --

    /// Checks that `script_hash` is the hub wallet built around `pub_key`.
    pub fn wallet_validate(e: Env, script_hash: BytesN<20>, pub_key: Bytes) -> bool {
        ensure_initialized(&e)
            .and_then(|_| wallet::validate(&e, &script_hash, &pub_key))
            .is_ok()
    }

    pub fn wallet_get_balance(e: Env, script_hash: BytesN<20>) -> Result<i128, HubError> {
        ensure_initialized(&e)?;
        wallet::balance(&e, &script_hash)
    }

    /// Value currently held against `script_hash` at the ledger time.
    pub fn wallet_get_balance_on_hold(e: Env, script_hash: BytesN<20>) -> Result<u64, HubError> {
        ensure_initialized(&e)?;
        Ok(reservations::on_hold(&e, &script_hash))
    }

    // -- accounts --

    pub fn account_state(e: Env, script_hash: BytesN<20>) -> Result<AccountState, HubError> {
        ensure_initialized(&e)?;
        Ok(account::state(&e, &script_hash))
    }

    /// Lists a demand and holds its value plus the reward fee. `pub_key` must
    /// rebuild the wallet behind `script_hash`. A committed account is left
    /// untouched and the call still returns true.
    pub fn account_store_demand(
        e: Env,
        script_hash: BytesN<20>,
        pub_key: Bytes,
        demand: Bytes,
        expiry: u32,
    ) -> bool {
        ensure_initialized(&e)
            .and_then(|_| wallet::validate(&e, &script_hash, &pub_key))
            .and_then(|_| fixed::<DEMAND_SIZE>(&demand))
            .and_then(|raw| Demand::decode(&raw))
            .and_then(|demand| escrow::store_demand(&e, &script_hash, &demand, expiry))
            .is_ok()
    }

    /// Lists a travel and holds the security deposit, under the same wallet
    /// check as demands.
    pub fn account_store_travel(
        e: Env,
        script_hash: BytesN<20>,
        pub_key: Bytes,
        travel: Bytes,
        expiry: u32,
    ) -> bool {
        ensure_initialized(&e)
            .and_then(|_| wallet::validate(&e, &script_hash, &pub_key))
            .and_then(|_| fixed::<TRAVEL_SIZE>(&travel))
            .and_then(|raw| Travel::decode(&raw))
            .and_then(|travel| escrow::store_travel(&e, &script_hash, &travel, expiry))
            .is_ok()
    }

    /// Drops expired and zero-valued holds from the account's list.
    /// Returns how many were dropped.
    pub fn account_compact_reservations(
        e: Env,
        script_hash: BytesN<20>,
    ) -> Result<u32, HubError> {
        ensure_initialized(&e)?;
        Ok(reservations::compact_account(&e, &script_hash))
    }

    pub fn demands_for_city(e: Env, city_hash: BytesN<20>) -> Result<Bytes, HubError> {
        ensure_initialized(&e)?;
        Ok(escrow::demands_for_city(&e, &city_hash))
    }

    pub fn travels_for_route(
        e: Env,
        pickup_city_hash: BytesN<20>,
        drop_off_city_hash: BytesN<20>,
    ) -> Result<Bytes, HubError> {
        ensure_initialized(&e)?;
        Ok(escrow::travels_for_route(&e, &pickup_city_hash, &drop_off_city_hash))
    }

    // -- records --

    pub fn reservation_create(
        e: Env,
        expiry: u32,
        value: u64,
        destination: Bytes,
        multi_sig_unlocked: bool,
    ) -> Bytes {
        let encoded = fixed(&destination).and_then(|destination| {
            Reservation {
                expiry,
                value,
                destination,
                multi_sig_unlocked,
            }
            .encode()
        });
        or_empty(&e, encoded)
    }

    pub fn reservation_get_expiry(_e: Env, reservation: Bytes) -> Result<u32, HubError> {
        Ok(Reservation::decode(&fixed::<RESERVATION_SIZE>(&reservation)?)?.expiry)
    }

    pub fn reservation_get_value(_e: Env, reservation: Bytes) -> Result<u64, HubError> {
        Ok(Reservation::decode(&fixed::<RESERVATION_SIZE>(&reservation)?)?.value)
    }

    pub fn reservation_get_destination(
        e: Env,
        reservation: Bytes,
    ) -> Result<BytesN<20>, HubError> {
        let r = Reservation::decode(&fixed::<RESERVATION_SIZE>(&reservation)?)?;
        Ok(BytesN::from_array(&e, &r.destination))
    }

    pub fn reservation_is_unlocked(_e: Env, reservation: Bytes) -> Result<bool, HubError> {
        Ok(Reservation::decode(&fixed::<RESERVATION_SIZE>(&reservation)?)?.multi_sig_unlocked)
    }

    /// On-hold total of a raw reservation list as of `now`.
    pub fn reservations_get_total_on_hold(_e: Env, list: Bytes, now: u64) -> u64 {
        reservations::total_on_hold(&list, now)
    }

    pub fn demand_create(
        e: Env,
        city_hash: Bytes,
        rep_required: u32,
        item_size: u32,
        item_value: u64,
        info_blob: Bytes,
    ) -> Bytes {
        let demand = demand_from_args(&city_hash, rep_required, item_size, item_value, &info_blob);
        or_empty(&e, demand.and_then(|d| d.encode()))
    }

    pub fn demand_get_item_value(_e: Env, demand: Bytes) -> Result<u64, HubError> {
        Ok(Demand::decode(&fixed::<DEMAND_SIZE>(&demand)?)?.item_value)
    }

    pub fn demand_get_info_blob(e: Env, demand: Bytes) -> Result<Bytes, HubError> {
        let d = Demand::decode(&fixed::<DEMAND_SIZE>(&demand)?)?;
        Ok(Bytes::from_array(&e, &d.info_blob))
    }

    pub fn travel_create(
        e: Env,
        pickup_city_hash: Bytes,
        drop_off_city_hash: Bytes,
        rep_required: u32,
        carry_space: u32,
    ) -> Bytes {
        let travel =
            travel_from_args(&pickup_city_hash, &drop_off_city_hash, rep_required, carry_space);
        or_empty(&e, travel.and_then(|t| t.encode()))
    }

    pub fn travel_get_carry_space(_e: Env, travel: Bytes) -> Result<u32, HubError> {
        Ok(Travel::decode(&fixed::<TRAVEL_SIZE>(&travel)?)?.carry_space.into())
    }
}
