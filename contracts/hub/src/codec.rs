//! Fixed-width record layouts for reservations, demands and travels.
//!
//! Records are positional: no tags, no length prefixes. Integers are unsigned
//! little-endian and zero-padded to their slot. Any change to a layout below
//! is a breaking change for every stored list.

use crate::error::HubError;
use crate::escrow::FEE_DEMAND_REWARD;

pub const TIMESTAMP_SIZE: usize = 4;
pub const VALUE_SIZE: usize = 5;
pub const SCRIPT_HASH_SIZE: usize = 20; // 160 bits
pub const BOOL_SIZE: usize = 1;
pub const REP_REQUIRED_SIZE: usize = 2;
pub const CARRY_SPACE_SIZE: usize = 1;
pub const DEMAND_INFO_SIZE: usize = 128;

pub const RESERVATION_SIZE: usize = TIMESTAMP_SIZE + VALUE_SIZE + SCRIPT_HASH_SIZE + BOOL_SIZE;
pub const DEMAND_SIZE: usize =
    SCRIPT_HASH_SIZE + REP_REQUIRED_SIZE + CARRY_SPACE_SIZE + VALUE_SIZE + DEMAND_INFO_SIZE;
pub const TRAVEL_SIZE: usize = SCRIPT_HASH_SIZE * 2 + REP_REQUIRED_SIZE + CARRY_SPACE_SIZE;
pub const ROUTE_KEY_SIZE: usize = SCRIPT_HASH_SIZE * 2;

/// Roughly 2^40 / 2, keeps the top bit of the 5-byte value slot clear.
pub const MAX_VALUE: u64 = 549_750_000_000;
/// Size classes share one byte and must stay below 0x80.
pub const MAX_SIZE_CLASS: u8 = 127;

/// A byte range inside a record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Field {
    pub offset: usize,
    pub size: usize,
}

impl Field {
    pub const fn new(offset: usize, size: usize) -> Self {
        Field { offset, size }
    }

    /// The field laid out directly behind this one.
    pub const fn after(self, size: usize) -> Self {
        Field::new(self.offset + self.size, size)
    }

    pub const fn end(self) -> usize {
        self.offset + self.size
    }
}

pub mod layout {
    pub mod reservation {
        use super::super::*;
        pub const EXPIRY: Field = Field::new(0, TIMESTAMP_SIZE);
        pub const VALUE: Field = EXPIRY.after(VALUE_SIZE);
        pub const DESTINATION: Field = VALUE.after(SCRIPT_HASH_SIZE);
        pub const MULTI_SIG_UNLOCKED: Field = DESTINATION.after(BOOL_SIZE);
    }

    pub mod demand {
        use super::super::*;
        pub const CITY_HASH: Field = Field::new(0, SCRIPT_HASH_SIZE);
        pub const REP_REQUIRED: Field = CITY_HASH.after(REP_REQUIRED_SIZE);
        pub const ITEM_SIZE: Field = REP_REQUIRED.after(CARRY_SPACE_SIZE);
        pub const ITEM_VALUE: Field = ITEM_SIZE.after(VALUE_SIZE);
        pub const INFO_BLOB: Field = ITEM_VALUE.after(DEMAND_INFO_SIZE);
    }

    pub mod travel {
        use super::super::*;
        pub const PICKUP_CITY_HASH: Field = Field::new(0, SCRIPT_HASH_SIZE);
        pub const DROP_OFF_CITY_HASH: Field = PICKUP_CITY_HASH.after(SCRIPT_HASH_SIZE);
        pub const REP_REQUIRED: Field = DROP_OFF_CITY_HASH.after(REP_REQUIRED_SIZE);
        pub const CARRY_SPACE: Field = REP_REQUIRED.after(CARRY_SPACE_SIZE);
    }
}

const _: () = assert!(layout::reservation::MULTI_SIG_UNLOCKED.end() == RESERVATION_SIZE);
const _: () = assert!(layout::demand::INFO_BLOB.end() == DEMAND_SIZE);
const _: () = assert!(layout::travel::CARRY_SPACE.end() == TRAVEL_SIZE);

/// Writes `value` little-endian into `field`, zero-padding the slot.
/// Fails if the value needs more bytes than the slot has.
pub fn write_uint(buf: &mut [u8], field: Field, value: u64) -> Result<(), HubError> {
    if field.size > 8 || (field.size < 8 && value >> (8 * field.size) != 0) {
        return Err(HubError::InvalidRecord);
    }
    let slot = buf
        .get_mut(field.offset..field.end())
        .ok_or(HubError::InvalidRecord)?;
    slot.copy_from_slice(&value.to_le_bytes()[..field.size]);
    Ok(())
}

pub fn write_bytes(buf: &mut [u8], field: Field, bytes: &[u8]) -> Result<(), HubError> {
    if bytes.len() != field.size {
        return Err(HubError::InvalidRecord);
    }
    let slot = buf
        .get_mut(field.offset..field.end())
        .ok_or(HubError::InvalidRecord)?;
    slot.copy_from_slice(bytes);
    Ok(())
}

/// Reads `field` as an unsigned little-endian integer.
pub fn read_uint(raw: &[u8], field: Field) -> Result<u64, HubError> {
    if field.size > 8 {
        return Err(HubError::InvalidRecord);
    }
    let bytes = raw
        .get(field.offset..field.end())
        .ok_or(HubError::InvalidRecord)?;
    let mut le = [0u8; 8];
    le[..field.size].copy_from_slice(bytes);
    Ok(u64::from_le_bytes(le))
}

pub fn read_bytes<const N: usize>(raw: &[u8], field: Field) -> Result<[u8; N], HubError> {
    if field.size != N {
        return Err(HubError::InvalidRecord);
    }
    let bytes = raw
        .get(field.offset..field.end())
        .ok_or(HubError::InvalidRecord)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn narrow<T: TryFrom<u64>>(value: u64) -> Result<T, HubError> {
    T::try_from(value).map_err(|_| HubError::InvalidRecord)
}

fn check_size_class(size: u8) -> Result<(), HubError> {
    if size == 0 || size > MAX_SIZE_CLASS {
        return Err(HubError::InvalidRecord);
    }
    Ok(())
}

/// A time-bounded hold against an account's spendable balance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reservation {
    pub expiry: u32,
    pub value: u64,
    pub destination: [u8; SCRIPT_HASH_SIZE],
    pub multi_sig_unlocked: bool,
}

impl Reservation {
    /// A fresh hold: no destination chosen yet, multisig still locked.
    pub const fn hold(expiry: u32, value: u64) -> Self {
        Reservation {
            expiry,
            value,
            destination: [0u8; SCRIPT_HASH_SIZE],
            multi_sig_unlocked: false,
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        u64::from(self.expiry) <= now
    }

    /// Value still held at `now`; expired holds count for nothing.
    pub fn on_hold_at(&self, now: u64) -> u64 {
        if self.is_expired(now) { 0 } else { self.value }
    }

    /// Unexpired and non-zero.
    pub fn is_active(&self, now: u64) -> bool {
        self.on_hold_at(now) > 0
    }

    pub fn encode(&self) -> Result<[u8; RESERVATION_SIZE], HubError> {
        use layout::reservation::*;
        if self.value > MAX_VALUE {
            return Err(HubError::ValueTooHigh);
        }
        let mut raw = [0u8; RESERVATION_SIZE];
        write_uint(&mut raw, EXPIRY, u64::from(self.expiry))?;
        write_uint(&mut raw, VALUE, self.value)?;
        write_bytes(&mut raw, DESTINATION, &self.destination)?;
        write_uint(&mut raw, MULTI_SIG_UNLOCKED, u64::from(self.multi_sig_unlocked))?;
        Ok(raw)
    }

    pub fn decode(raw: &[u8]) -> Result<Self, HubError> {
        use layout::reservation::*;
        if raw.len() != RESERVATION_SIZE {
            return Err(HubError::InvalidRecord);
        }
        Ok(Reservation {
            expiry: narrow(read_uint(raw, EXPIRY)?)?,
            value: read_uint(raw, VALUE)?,
            destination: read_bytes(raw, DESTINATION)?,
            multi_sig_unlocked: read_uint(raw, MULTI_SIG_UNLOCKED)? != 0,
        })
    }
}

/// A request to carry an item to a city.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Demand {
    pub city_hash: [u8; SCRIPT_HASH_SIZE],
    pub rep_required: u16,
    pub item_size: u8,
    pub item_value: u64,
    pub info_blob: [u8; DEMAND_INFO_SIZE],
}

impl Demand {
    /// Item value plus the flat reward fee, the amount held while listed.
    pub fn total_reserve(&self) -> u64 {
        self.item_value.saturating_add(FEE_DEMAND_REWARD)
    }

    pub fn encode(&self) -> Result<[u8; DEMAND_SIZE], HubError> {
        use layout::demand::*;
        if self.item_value > MAX_VALUE {
            return Err(HubError::ValueTooHigh);
        }
        check_size_class(self.item_size)?;
        let mut raw = [0u8; DEMAND_SIZE];
        write_bytes(&mut raw, CITY_HASH, &self.city_hash)?;
        write_uint(&mut raw, REP_REQUIRED, u64::from(self.rep_required))?;
        write_uint(&mut raw, ITEM_SIZE, u64::from(self.item_size))?;
        write_uint(&mut raw, ITEM_VALUE, self.item_value)?;
        write_bytes(&mut raw, INFO_BLOB, &self.info_blob)?;
        Ok(raw)
    }

    pub fn decode(raw: &[u8]) -> Result<Self, HubError> {
        use layout::demand::*;
        if raw.len() != DEMAND_SIZE {
            return Err(HubError::InvalidRecord);
        }
        Ok(Demand {
            city_hash: read_bytes(raw, CITY_HASH)?,
            rep_required: narrow(read_uint(raw, REP_REQUIRED)?)?,
            item_size: narrow(read_uint(raw, ITEM_SIZE)?)?,
            item_value: read_uint(raw, ITEM_VALUE)?,
            info_blob: read_bytes(raw, INFO_BLOB)?,
        })
    }
}

/// An offer of carrying capacity between two cities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Travel {
    pub pickup_city_hash: [u8; SCRIPT_HASH_SIZE],
    pub drop_off_city_hash: [u8; SCRIPT_HASH_SIZE],
    pub rep_required: u16,
    pub carry_space: u8,
}

impl Travel {
    /// Pickup hash followed by drop-off hash; the index key for this route.
    pub fn route_key(&self) -> [u8; ROUTE_KEY_SIZE] {
        route_key(&self.pickup_city_hash, &self.drop_off_city_hash)
    }

    pub fn encode(&self) -> Result<[u8; TRAVEL_SIZE], HubError> {
        use layout::travel::*;
        check_size_class(self.carry_space)?;
        let mut raw = [0u8; TRAVEL_SIZE];
        write_bytes(&mut raw, PICKUP_CITY_HASH, &self.pickup_city_hash)?;
        write_bytes(&mut raw, DROP_OFF_CITY_HASH, &self.drop_off_city_hash)?;
        write_uint(&mut raw, REP_REQUIRED, u64::from(self.rep_required))?;
        write_uint(&mut raw, CARRY_SPACE, u64::from(self.carry_space))?;
        Ok(raw)
    }

    pub fn decode(raw: &[u8]) -> Result<Self, HubError> {
        use layout::travel::*;
        if raw.len() != TRAVEL_SIZE {
            return Err(HubError::InvalidRecord);
        }
        Ok(Travel {
            pickup_city_hash: read_bytes(raw, PICKUP_CITY_HASH)?,
            drop_off_city_hash: read_bytes(raw, DROP_OFF_CITY_HASH)?,
            rep_required: narrow(read_uint(raw, REP_REQUIRED)?)?,
            carry_space: narrow(read_uint(raw, CARRY_SPACE)?)?,
        })
    }
}

pub fn route_key(
    pickup: &[u8; SCRIPT_HASH_SIZE],
    drop_off: &[u8; SCRIPT_HASH_SIZE],
) -> [u8; ROUTE_KEY_SIZE] {
    let mut key = [0u8; ROUTE_KEY_SIZE];
    key[..SCRIPT_HASH_SIZE].copy_from_slice(pickup);
    key[SCRIPT_HASH_SIZE..].copy_from_slice(drop_off);
    key
}
