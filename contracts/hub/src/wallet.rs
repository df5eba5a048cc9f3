//! Wallet gate and balance lookups.
//!
//! A hub wallet is a script built from three fragments recorded at
//! initialization, the owner's public key and this contract's identity:
//! `P1 ++ pubKey ++ P2 ++ contract ++ P3`. Its script hash is
//! `RIPEMD160(SHA256(script))`.

use ripemd::{Digest, Ripemd160};
use soroban_sdk::{contractclient, log, xdr::ToXdr, Bytes, BytesN, Env};

use crate::error::HubError;
use crate::events;
use crate::storage::{self, WalletScriptPart};

/// Balance oracle collaborator, called cross-contract.
#[contractclient(name = "BalanceOracleClient")]
pub trait BalanceOracle {
    fn balance(env: Env, asset_id: Bytes, script_hash: BytesN<20>) -> i128;
}

pub fn hash160(e: &Env, data: &Bytes) -> BytesN<20> {
    let sha = e.crypto().sha256(data).to_array();
    let digest = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    BytesN::from_array(e, &out)
}

/// Identity of the executing contract as embedded in wallet scripts.
pub fn executing_script(e: &Env) -> Bytes {
    e.current_contract_address().to_xdr(e)
}

pub fn expected_script(e: &Env, pub_key: &Bytes) -> Result<Bytes, HubError> {
    let mut script = storage::wallet_script(e, WalletScriptPart::P1)?;
    script.append(pub_key);
    script.append(&storage::wallet_script(e, WalletScriptPart::P2)?);
    script.append(&executing_script(e));
    script.append(&storage::wallet_script(e, WalletScriptPart::P3)?);
    Ok(script)
}

pub fn expected_script_hash(e: &Env, pub_key: &Bytes) -> Result<BytesN<20>, HubError> {
    Ok(hash160(e, &expected_script(e, pub_key)?))
}

pub fn validate(e: &Env, candidate: &BytesN<20>, pub_key: &Bytes) -> Result<(), HubError> {
    let script = expected_script(e, pub_key)?;
    let expected = hash160(e, &script);
    if *candidate == expected {
        return Ok(());
    }
    events::err(e, "WalletValidateFail", (expected, script));
    Err(HubError::WalletValidationFailed)
}

/// Balance of `account` in the configured asset.
pub fn balance(e: &Env, account: &BytesN<20>) -> Result<i128, HubError> {
    let oracle = BalanceOracleClient::new(e, &storage::oracle(e)?);
    let balance = oracle.balance(&storage::asset_id(e)?, account);
    log!(e, "wallet balance", account.clone(), balance);
    events::ok(e, "FoundWallet", account.clone());
    Ok(balance)
}
