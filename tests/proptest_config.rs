/// Case count for property tests, overridable through `PROPTEST_CASES`.
pub fn cases() -> u32 {
    match std::env::var("PROPTEST_CASES") {
        Ok(value) => value.parse().unwrap_or(DEFAULT_CASES),
        Err(_) => DEFAULT_CASES,
    }
}

const DEFAULT_CASES: u32 = 256;
