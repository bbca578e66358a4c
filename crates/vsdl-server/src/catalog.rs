//! Seeds a small fixed record and policy catalog at startup so the HTTP
//! surface is exercisable without an external record/policy store (spec
//! §4.5's Issue/Dispense consume these by id; out-of-band storage of either
//! is explicitly out of scope — §1).

use vsdl_core::{Policy, Record};

pub const CITIZEN_RECORD_ID: &str = "citizen-001";

fn citizen_001() -> Record {
    let mut r = Record::new();
    r.insert("name", "Jane Citizen").unwrap();
    r.insert("nationalId", "AB123456C").unwrap();
    r.insert("dateOfBirth", "1990-01-01").unwrap();
    r.insert("address", "1 Example Road, Springfield").unwrap();
    r.insert("income", "52000").unwrap();
    r.insert("employer", "Acme Municipal Works").unwrap();
    r.insert("maritalStatus", "married").unwrap();
    r.insert("nationality", "Exampland").unwrap();
    r.insert("phoneNumber", "+1-555-0100").unwrap();
    r.insert("email", "jane.citizen@example.test").unwrap();
    r
}

fn id_renewal() -> Policy {
    Policy::new(
        "id-renewal",
        ["name", "nationalId", "dateOfBirth", "address"].map(String::from),
        ["income", "employer", "maritalStatus", "nationality", "phoneNumber", "email"].map(String::from),
        ["view"].map(String::from),
    )
}

fn tax_filing() -> Policy {
    Policy::new(
        "tax-filing",
        ["name", "nationalId", "income", "employer"].map(String::from),
        ["dateOfBirth", "address", "maritalStatus", "nationality", "phoneNumber", "email"].map(String::from),
        ["view", "export"].map(String::from),
    )
}

fn medical_proxy() -> Policy {
    Policy::new(
        "medical-proxy",
        ["name", "dateOfBirth", "nationality"].map(String::from),
        ["nationalId", "address", "income", "employer", "maritalStatus", "phoneNumber", "email"].map(String::from),
        ["view"].map(String::from),
    )
}

/// Populate `state.records` and `state.policies` with the reference
/// scenario data from spec §8.
pub fn seed(state: &mut crate::state::ServerState) {
    state.records.insert(CITIZEN_RECORD_ID.to_string(), citizen_001());

    for policy in [id_renewal(), tax_filing(), medical_proxy()] {
        state.policies.insert(policy.id.clone(), policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_policies_cover_the_seeded_record_exactly() {
        let record = citizen_001();
        for policy in [id_renewal(), tax_filing(), medical_proxy()] {
            policy.check_covers(&record).unwrap_or_else(|e| panic!("{}: {e}", policy.id));
        }
    }
}
