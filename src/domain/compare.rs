use crate::domain::model::Address;
use serde::{Deserialize, Serialize};

/// 掃描地址與承運商地址的比對規則
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// line1, line2, city, state/province and postal code must all be equal
    /// ignoring case. Country is not compared.
    #[default]
    Strict,
    /// Scanned line1 only needs to appear inside the expected line1.
    Lenient,
}

pub fn compare_addresses(scanned: &Address, expected: &Address, policy: MatchPolicy) -> bool {
    match policy {
        MatchPolicy::Strict => {
            eq_ignore_case(&scanned.address_line1, &expected.address_line1)
                && eq_ignore_case(&scanned.address_line2, &expected.address_line2)
                && eq_ignore_case(&scanned.city, &expected.city)
                && eq_ignore_case(&scanned.state_province, &expected.state_province)
                && eq_ignore_case(&scanned.postal_code, &expected.postal_code)
        }
        MatchPolicy::Lenient => expected
            .address_line1
            .to_lowercase()
            .contains(&scanned.address_line1.to_lowercase()),
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
