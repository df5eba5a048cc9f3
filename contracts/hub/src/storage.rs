//! Every read and write of contract state goes through here.
//!
//! Configuration sits in instance storage under fixed names. Lists sit in
//! persistent storage under a typed [`DataKey`], so a city hash can never
//! address an account's reservations even when the 20 bytes coincide.

use soroban_sdk::{contracttype, Address, Bytes, BytesN, Env, Symbol};

use crate::error::HubError;

pub fn k_asset_id(e: &Env) -> Symbol { Symbol::new(e, "AssetID") }
pub fn k_oracle(e: &Env) -> Symbol { Symbol::new(e, "BalanceOracle") }
pub fn k_initialized(e: &Env) -> Symbol { Symbol::new(e, "Initialized") }

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WalletScriptPart {
    P1,
    P2,
    P3,
}

impl WalletScriptPart {
    fn key(self, e: &Env) -> Symbol {
        match self {
            WalletScriptPart::P1 => Symbol::new(e, "WalletScriptP1"),
            WalletScriptPart::P2 => Symbol::new(e, "WalletScriptP2"),
            WalletScriptPart::P3 => Symbol::new(e, "WalletScriptP3"),
        }
    }
}

pub fn is_initialized(e: &Env) -> bool {
    e.storage().instance().has(&k_initialized(e))
}

pub fn put_config(e: &Env, asset_id: &Bytes, oracle: &Address, parts: [&Bytes; 3]) {
    let store = e.storage().instance();
    store.set(&k_asset_id(e), asset_id);
    store.set(&k_oracle(e), oracle);
    store.set(&WalletScriptPart::P1.key(e), parts[0]);
    store.set(&WalletScriptPart::P2.key(e), parts[1]);
    store.set(&WalletScriptPart::P3.key(e), parts[2]);
    store.set(&k_initialized(e), &true);
}

pub fn asset_id(e: &Env) -> Result<Bytes, HubError> {
    e.storage()
        .instance()
        .get(&k_asset_id(e))
        .ok_or(HubError::NotInitialized)
}

pub fn oracle(e: &Env) -> Result<Address, HubError> {
    e.storage()
        .instance()
        .get(&k_oracle(e))
        .ok_or(HubError::NotInitialized)
}

pub fn wallet_script(e: &Env, part: WalletScriptPart) -> Result<Bytes, HubError> {
    e.storage()
        .instance()
        .get(&part.key(e))
        .ok_or(HubError::NotInitialized)
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Holds against an account script hash.
    Reservations(BytesN<20>),
    /// Demands filed under a city hash.
    Demands(BytesN<20>),
    /// Travels filed under a pickup ++ drop-off route key.
    Travels(BytesN<40>),
}

/// List read; a missing key reads as an empty list.
fn get(e: &Env, key: &DataKey) -> Bytes {
    e.storage()
        .persistent()
        .get(key)
        .unwrap_or_else(|| Bytes::new(e))
}

fn put(e: &Env, key: &DataKey, value: &Bytes) {
    e.storage().persistent().set(key, value);
}

pub fn reservations(e: &Env, account: &BytesN<20>) -> Bytes {
    get(e, &DataKey::Reservations(account.clone()))
}

pub fn put_reservations(e: &Env, account: &BytesN<20>, list: &Bytes) {
    put(e, &DataKey::Reservations(account.clone()), list);
}

pub fn demands(e: &Env, city_hash: &BytesN<20>) -> Bytes {
    get(e, &DataKey::Demands(city_hash.clone()))
}

pub fn put_demands(e: &Env, city_hash: &BytesN<20>, list: &Bytes) {
    put(e, &DataKey::Demands(city_hash.clone()), list);
}

pub fn travels(e: &Env, route: &BytesN<40>) -> Bytes {
    get(e, &DataKey::Travels(route.clone()))
}

pub fn put_travels(e: &Env, route: &BytesN<40>, list: &Bytes) {
    put(e, &DataKey::Travels(route.clone()), list);
}
