use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum HubError {
    NotInitialized = 1,
    /// Wrong record length or a field that does not fit its slot.
    InvalidRecord = 2,
    /// Value above `codec::MAX_VALUE`.
    ValueTooHigh = 3,
    /// Balance does not exceed the requested hold.
    InsufficientFunds = 4,
    /// Balance left after existing holds is below the requested hold.
    InsufficientFundsAfterHolds = 5,
    WalletValidationFailed = 6,
}
