pub const BYTE_SHANNONS: u64 = 100_000_000;
pub const DEFAULT_FEE_RATE: u64 = 1000;
pub const MIN_DAO_LOCK_PERIOD: u64 = 180;
pub const SIGNATURE_PLACEHOLDER_LEN: usize = 65;
pub const DEFAULT_TX_TIMEOUT_SECS: u64 = 600;
pub const TX_POLL_INTERVAL_SECS: u64 = 1;

// a dao deposit cell carries 8 zero bytes, a withdrawing cell the
// little-endian deposit block number
pub const DAO_DATA_LEN: usize = 8;

pub const fn ckb(num: u64) -> u64 {
    num * BYTE_SHANNONS
}
