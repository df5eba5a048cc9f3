#![no_std]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, panic_with_error, symbol_short, Address,
    Bytes, BytesN, Env,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum OracleError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NegativeBalance = 3,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    /// (asset id, account script hash)
    Balance(Bytes, BytesN<20>),
}

#[contract]
pub struct BalanceOracle;

#[contractimpl]
impl BalanceOracle {
    pub fn init(e: Env, admin: Address) {
        // one-time init
        if e.storage().instance().has(&DataKey::Admin) {
            panic_with_error!(&e, OracleError::AlreadyInitialized);
        }
        e.storage().instance().set(&DataKey::Admin, &admin);
    }

    pub fn admin(e: Env) -> Address {
        e.storage()
            .instance()
            .get(&DataKey::Admin)
            .unwrap_or_else(|| panic_with_error!(&e, OracleError::NotInitialized))
    }

    /// Records the balance of `script_hash` in `asset_id`. Admin only.
    pub fn set_balance(e: Env, asset_id: Bytes, script_hash: BytesN<20>, amount: i128) {
        let admin = Self::admin(e.clone());
        admin.require_auth();

        if amount < 0 {
            panic_with_error!(&e, OracleError::NegativeBalance);
        }

        let key = DataKey::Balance(asset_id, script_hash.clone());
        e.storage().persistent().set(&key, &amount);
        e.events().publish((symbol_short!("balance"), script_hash), amount);
    }

    /// Unknown accounts read as zero.
    pub fn balance(e: Env, asset_id: Bytes, script_hash: BytesN<20>) -> i128 {
        e.storage()
            .persistent()
            .get(&DataKey::Balance(asset_id, script_hash))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{testutils::Address as _, Env};

    fn asset(e: &Env, tag: u8) -> Bytes {
        Bytes::from_array(e, &[tag; 32])
    }

    fn account(e: &Env, tag: u8) -> BytesN<20> {
        BytesN::from_array(e, &[tag; 20])
    }

    #[test]
    fn test_init_and_set_balance() {
        let e = Env::default();
        let admin = Address::generate(&e);

        e.mock_all_auths();

        let contract_id = e.register(BalanceOracle, ());
        let client = BalanceOracleClient::new(&e, &contract_id);

        client.init(&admin);
        assert_eq!(client.admin(), admin);

        client.set_balance(&asset(&e, 1), &account(&e, 7), &1_000);
        assert_eq!(client.balance(&asset(&e, 1), &account(&e, 7)), 1_000);
    }

    #[test]
    fn test_double_init_fails() {
        let e = Env::default();
        let admin = Address::generate(&e);

        e.mock_all_auths();

        let contract_id = e.register(BalanceOracle, ());
        let client = BalanceOracleClient::new(&e, &contract_id);

        client.init(&admin);
        assert_eq!(
            client.try_init(&admin),
            Err(Ok(OracleError::AlreadyInitialized))
        );
    }

    #[test]
    fn test_set_balance_without_init_fails() {
        let e = Env::default();

        e.mock_all_auths();

        let contract_id = e.register(BalanceOracle, ());
        let client = BalanceOracleClient::new(&e, &contract_id);

        assert_eq!(
            client.try_set_balance(&asset(&e, 1), &account(&e, 7), &5),
            Err(Ok(OracleError::NotInitialized))
        );
    }

    #[test]
    fn test_negative_balance_rejected() {
        let e = Env::default();
        let admin = Address::generate(&e);

        e.mock_all_auths();

        let contract_id = e.register(BalanceOracle, ());
        let client = BalanceOracleClient::new(&e, &contract_id);

        client.init(&admin);
        assert_eq!(
            client.try_set_balance(&asset(&e, 1), &account(&e, 7), &-1),
            Err(Ok(OracleError::NegativeBalance))
        );
    }

    #[test]
    fn test_unknown_account_reads_zero() {
        let e = Env::default();
        let admin = Address::generate(&e);

        e.mock_all_auths();

        let contract_id = e.register(BalanceOracle, ());
        let client = BalanceOracleClient::new(&e, &contract_id);

        client.init(&admin);
        assert_eq!(client.balance(&asset(&e, 1), &account(&e, 9)), 0);
    }

    #[test]
    fn test_balances_are_per_asset() {
        let e = Env::default();
        let admin = Address::generate(&e);

        e.mock_all_auths();

        let contract_id = e.register(BalanceOracle, ());
        let client = BalanceOracleClient::new(&e, &contract_id);

        client.init(&admin);
        client.set_balance(&asset(&e, 1), &account(&e, 7), &300);
        client.set_balance(&asset(&e, 2), &account(&e, 7), &50);
        client.set_balance(&asset(&e, 1), &account(&e, 7), &320);

        assert_eq!(client.balance(&asset(&e, 1), &account(&e, 7)), 320);
        assert_eq!(client.balance(&asset(&e, 2), &account(&e, 7)), 50);
    }

    #[test]
    fn test_set_balance_requires_admin_auth() {
        let e = Env::default();
        let admin = Address::generate(&e);

        let contract_id = e.register(BalanceOracle, ());
        let client = BalanceOracleClient::new(&e, &contract_id);

        client.init(&admin);
        assert!(client
            .try_set_balance(&asset(&e, 1), &account(&e, 7), &5)
            .is_err());
    }
}
