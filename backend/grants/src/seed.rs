//! Demo data bootstrap for local runs.

use rand::Rng;
use tracing::info;

use crate::errors::Result;
use crate::model::Grant;
use crate::store::GrantStore;

const DEMO_AMOUNT: &str = "2000";
const DEMO_CONTRIBUTOR: &str =
    "0x01489AF266B02AF5C727E0C0AF76d36Ea63CE1971Cd24A5A234d6E485b8c9d65";
const DEMO_CONTRIBUTION: f64 = 100.0;

/// 32 random bytes, hex encoded.
pub fn random_grant_id() -> String {
    let mut data = [0u8; 32];
    rand::thread_rng().fill(&mut data);
    hex::encode(data)
}

/// Insert `count` open demo grants, each with a single contribution.
/// Returns the ids that were written.
pub async fn seed_demo_grants(store: &GrantStore, count: usize) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let mut grant = Grant::new(random_grant_id(), DEMO_AMOUNT);
        grant
            .contributions
            .insert(DEMO_CONTRIBUTOR, DEMO_CONTRIBUTION);
        store.insert_grant(&grant).await?;
        ids.push(grant.grant_id);
    }
    info!("Seeded {count} demo grants");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Contributions;
    use crate::model::GrantStatus;

    #[test]
    fn random_ids_are_64_hex_chars() {
        let id = random_grant_id();
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, random_grant_id());
    }

    #[tokio::test]
    async fn seeds_requested_number_of_open_grants() {
        let store = GrantStore::in_memory().await.unwrap();
        let ids = seed_demo_grants(&store, 10).await.unwrap();
        assert_eq!(ids.len(), 10);

        let all = store.get_all_grants().await.unwrap();
        assert_eq!(all.len(), 10);
        for grant in &all {
            assert!(ids.contains(&grant.grant_id));
            assert_eq!(grant.status, GrantStatus::Open);
            assert_eq!(grant.grant_amount, DEMO_AMOUNT);
            assert_eq!(
                grant.contributions,
                [(DEMO_CONTRIBUTOR, DEMO_CONTRIBUTION)].into_iter().collect::<Contributions>()
            );
        }
    }
}
