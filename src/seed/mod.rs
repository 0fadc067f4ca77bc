//! Built-in seed data used until the remote store holds a collection.
//!
//! Only the worker roster ships with defaults; every other collection starts empty.

use std::collections::HashMap;

use serde_json::{json, Map};

use crate::models::{CollectionName, Record, Role, User};

/// Default worker roster.
pub fn workers() -> Vec<Record> {
    [
        json!({
            "id": "w-1001",
            "workerId": "FW-1001",
            "name": "Ahmed Karim",
            "role": "worker",
            "trade": "Mason",
            "phone": "+971500000101"
        }),
        json!({
            "id": "w-1002",
            "workerId": "FW-1002",
            "name": "Ravi Menon",
            "role": "worker",
            "trade": "Electrician",
            "phone": "+971500000102"
        }),
        json!({
            "id": "w-1003",
            "workerId": "FW-1003",
            "name": "Joseph Mensah",
            "role": "worker",
            "trade": "Steel fixer",
            "phone": "+971500000103"
        }),
    ]
    .into_iter()
    .filter_map(Record::from_value)
    .collect()
}

/// Seed defaults for every collection.
pub fn collections() -> HashMap<CollectionName, Vec<Record>> {
    CollectionName::ALL
        .into_iter()
        .map(|name| {
            let records = match name {
                CollectionName::Workers => workers(),
                _ => Vec::new(),
            };
            (name, records)
        })
        .collect()
}

/// The fixed administrator identity.
pub fn administrator(email: &str) -> User {
    User {
        id: "admin".to_string(),
        worker_id: None,
        email: Some(email.to_string()),
        name: Some("Site Administrator".to_string()),
        role: Role::Admin,
        extra: Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_workers_have_ids() {
        let workers = workers();
        assert!(!workers.is_empty());
        assert!(workers.iter().all(|w| w.id().is_some()));
        assert!(workers.iter().all(|w| !User::from_record(w).id.is_empty()));
    }

    #[test]
    fn test_only_workers_are_seeded() {
        let seed = collections();
        assert_eq!(seed.len(), 6);
        assert!(!seed[&CollectionName::Workers].is_empty());
        assert!(seed[&CollectionName::Shifts].is_empty());
    }
}
