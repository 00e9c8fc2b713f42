//! Security-code prefix sent with reveals.

use shared_types::{Address, U256};

/// Decimal digit of the account address, as an unsigned integer, mod 10.
pub fn security_code_prefix(account: &Address) -> String {
    let value = U256::from_big_endian(account) % U256::from(10u8);
    value.low_u64().to_string()
}
