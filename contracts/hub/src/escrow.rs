//! Demand and travel listings, each backed by a hold on the lister's funds.
//!
//! Listing only happens from the Null state. A committed account is skipped
//! without any error or event. The record is filed before the hold is taken
//! and stays filed if the hold is refused. A demand whose value plus reward
//! fee could never be held is refused before anything is filed.

use soroban_sdk::{Bytes, BytesN, Env};

use crate::account;
use crate::codec::{Demand, Travel, MAX_VALUE};
use crate::error::HubError;
use crate::events;
use crate::reservations;
use crate::storage;

/// 3 units at 8 decimals, held on top of the item value.
pub const FEE_DEMAND_REWARD: u64 = 300_000_000;
/// 1 unit at 8 decimals.
pub const FEE_TRAVEL_DEPOSIT: u64 = 100_000_000;

pub fn store_demand(
    e: &Env,
    account: &BytesN<20>,
    demand: &Demand,
    expiry: u32,
) -> Result<(), HubError> {
    let raw = demand.encode()?;
    if demand.total_reserve() > MAX_VALUE {
        return Err(HubError::ValueTooHigh);
    }
    if !account::is_in_null_state(e, account) {
        return Ok(());
    }
    events::dbg(e, "StoringDemand", ());

    let city_hash = BytesN::from_array(e, &demand.city_hash);
    let mut demands = storage::demands(e, &city_hash);
    demands.extend_from_array(&raw);
    storage::put_demands(e, &city_hash, &demands);
    events::ok(e, "StoredDemand", city_hash);

    reservations::reserve_funds(e, account, expiry, demand.total_reserve())?;
    events::ok(e, "ReservedDemandValueAndFee", ());
    Ok(())
}

pub fn store_travel(
    e: &Env,
    account: &BytesN<20>,
    travel: &Travel,
    expiry: u32,
) -> Result<(), HubError> {
    let raw = travel.encode()?;
    if !account::is_in_null_state(e, account) {
        return Ok(());
    }
    events::dbg(e, "StoringTravel", ());

    let route = BytesN::from_array(e, &travel.route_key());
    let mut travels = storage::travels(e, &route);
    travels.extend_from_array(&raw);
    storage::put_travels(e, &route, &travels);
    events::ok(e, "StoredTravel", route.clone());

    reservations::reserve_funds(e, account, expiry, FEE_TRAVEL_DEPOSIT)?;
    events::ok(e, "ReservedTravelDeposit", route);
    Ok(())
}

pub fn demands_for_city(e: &Env, city_hash: &BytesN<20>) -> Bytes {
    storage::demands(e, city_hash)
}

pub fn travels_for_route(e: &Env, pickup: &BytesN<20>, drop_off: &BytesN<20>) -> Bytes {
    let route = crate::codec::route_key(&pickup.to_array(), &drop_off.to_array());
    storage::travels(e, &BytesN::from_array(e, &route))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::account::AccountState;
    use crate::codec::{DEMAND_INFO_SIZE, DEMAND_SIZE, RESERVATION_SIZE, TRAVEL_SIZE};
    use crate::test::{setup, Setup};
    use soroban_sdk::testutils::Ledger as _;

    const UNIT: i128 = 100_000_000;

    fn demand(city: u8, item_value: u64) -> Demand {
        Demand {
            city_hash: [city; 20],
            rep_required: 1,
            item_size: 2,
            item_value,
            info_blob: [0x5A; DEMAND_INFO_SIZE],
        }
    }

    fn travel(pickup: u8, drop_off: u8) -> Travel {
        Travel {
            pickup_city_hash: [pickup; 20],
            drop_off_city_hash: [drop_off; 20],
            rep_required: 3,
            carry_space: 2,
        }
    }

    #[test]
    fn test_store_demand_files_and_holds() {
        let e = Env::default();
        let Setup { hub, oracle, account, asset, .. } = setup(&e);
        e.ledger().set_timestamp(1_000);
        oracle.set_balance(&asset, &account, &(10 * UNIT));

        e.as_contract(&hub.address, || {
            let d = demand(1, 100_000_000);
            store_demand(&e, &account, &d, 5_000).unwrap();

            let city = BytesN::from_array(&e, &[1u8; 20]);
            let filed = demands_for_city(&e, &city);
            assert_eq!(filed.len() as usize, DEMAND_SIZE);
            assert_eq!(filed, Bytes::from_array(&e, &d.encode().unwrap()));
            assert_eq!(reservations::on_hold(&e, &account), 400_000_000);
            assert_eq!(account::state(&e, &account), AccountState::Committed);
        });
    }

    #[test]
    fn test_committed_account_is_skipped() {
        let e = Env::default();
        let Setup { hub, oracle, account, asset, .. } = setup(&e);
        e.ledger().set_timestamp(1_000);
        oracle.set_balance(&asset, &account, &(10 * UNIT));

        e.as_contract(&hub.address, || {
            store_demand(&e, &account, &demand(1, 100_000_000), 5_000).unwrap();
            let reservations_before = storage::reservations(&e, &account);

            assert_eq!(store_demand(&e, &account, &demand(1, 1), 5_000), Ok(()));
            assert_eq!(store_travel(&e, &account, &travel(1, 2), 5_000), Ok(()));

            let city = BytesN::from_array(&e, &[1u8; 20]);
            assert_eq!(demands_for_city(&e, &city).len() as usize, DEMAND_SIZE);
            let pickup = BytesN::from_array(&e, &[1u8; 20]);
            let drop_off = BytesN::from_array(&e, &[2u8; 20]);
            assert!(travels_for_route(&e, &pickup, &drop_off).is_empty());
            assert_eq!(storage::reservations(&e, &account), reservations_before);
        });
    }

    #[test]
    fn test_store_travel_after_expiry() {
        let e = Env::default();
        let Setup { hub, oracle, account, asset, .. } = setup(&e);
        e.ledger().set_timestamp(1_000);
        oracle.set_balance(&asset, &account, &(10 * UNIT));

        e.as_contract(&hub.address, || {
            store_demand(&e, &account, &demand(1, 100_000_000), 2_000).unwrap();
        });

        e.ledger().set_timestamp(2_000);
        e.as_contract(&hub.address, || {
            assert_eq!(account::state(&e, &account), AccountState::Null);
            store_travel(&e, &account, &travel(3, 4), 9_000).unwrap();

            let pickup = BytesN::from_array(&e, &[3u8; 20]);
            let drop_off = BytesN::from_array(&e, &[4u8; 20]);
            let filed = travels_for_route(&e, &pickup, &drop_off);
            assert_eq!(filed.len() as usize, TRAVEL_SIZE);
            assert_eq!(reservations::on_hold(&e, &account), FEE_TRAVEL_DEPOSIT);
            assert_eq!(reservations::count(&storage::reservations(&e, &account)), 2);
        });
    }

    #[test]
    fn test_refused_hold_leaves_record_filed() {
        let e = Env::default();
        let Setup { hub, oracle, account, asset, .. } = setup(&e);
        e.ledger().set_timestamp(1_000);
        oracle.set_balance(&asset, &account, &(2 * UNIT));

        e.as_contract(&hub.address, || {
            assert_eq!(
                store_demand(&e, &account, &demand(7, 100_000_000), 5_000),
                Err(HubError::InsufficientFunds)
            );
            let city = BytesN::from_array(&e, &[7u8; 20]);
            assert_eq!(demands_for_city(&e, &city).len() as usize, DEMAND_SIZE);
            assert!(storage::reservations(&e, &account).is_empty());
            assert_eq!(account::state(&e, &account), AccountState::Null);
        });
    }

    #[test]
    fn test_invalid_demand_stores_nothing() {
        let e = Env::default();
        let Setup { hub, oracle, account, asset, .. } = setup(&e);
        oracle.set_balance(&asset, &account, &(10 * UNIT));

        e.as_contract(&hub.address, || {
            let mut d = demand(1, 100_000_000);
            d.item_size = 0;
            assert_eq!(store_demand(&e, &account, &d, 5_000), Err(HubError::InvalidRecord));
            assert!(demands_for_city(&e, &BytesN::from_array(&e, &[1u8; 20])).is_empty());
        });
    }

    #[test]
    fn test_demand_reserve_ceiling() {
        let e = Env::default();
        let Setup { hub, oracle, account, asset, .. } = setup(&e);
        e.ledger().set_timestamp(1_000);
        oracle.set_balance(&asset, &account, &(MAX_VALUE as i128 + 1));

        e.as_contract(&hub.address, || {
            let over = demand(1, MAX_VALUE - FEE_DEMAND_REWARD + 1);
            assert!(over.encode().is_ok());
            assert_eq!(store_demand(&e, &account, &over, 5_000), Err(HubError::ValueTooHigh));
            assert!(demands_for_city(&e, &BytesN::from_array(&e, &[1u8; 20])).is_empty());
            assert!(storage::reservations(&e, &account).is_empty());

            let at = demand(2, MAX_VALUE - FEE_DEMAND_REWARD);
            store_demand(&e, &account, &at, 5_000).unwrap();
            assert_eq!(
                demands_for_city(&e, &BytesN::from_array(&e, &[2u8; 20])).len() as usize,
                DEMAND_SIZE
            );
            assert_eq!(reservations::on_hold(&e, &account), MAX_VALUE);
        });
    }

    #[test]
    fn test_demand_under_account_hash_keeps_reservations() {
        let e = Env::default();
        let Setup { hub, oracle, account, asset, .. } = setup(&e);
        e.ledger().set_timestamp(1_000);
        let other = BytesN::from_array(&e, &[0xBB; 20]);
        oracle.set_balance(&asset, &other, &(10 * UNIT));

        e.as_contract(&hub.address, || {
            let mut d = demand(0, 1);
            d.city_hash = account.to_array();
            d.info_blob = [0xFF; DEMAND_INFO_SIZE];
            store_demand(&e, &other, &d, 5_000).unwrap();

            assert_eq!(demands_for_city(&e, &account).len() as usize, DEMAND_SIZE);
            assert!(storage::reservations(&e, &account).is_empty());
            assert_eq!(account::state(&e, &account), AccountState::Null);
            assert_eq!(
                storage::reservations(&e, &other).len() as usize,
                RESERVATION_SIZE
            );
        });
    }
}
