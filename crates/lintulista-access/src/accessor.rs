// ABOUTME: Token-gated reads and writes of one list's observation log.
// ABOUTME: Mutations rewrite the log column after validating and encoding the change.

use std::sync::Arc;

use lintulista_core::observation::split_log;
use lintulista_core::{ListKey, ObservationCodec, ObservationRecord, SpeciesCatalog};
use lintulista_store::{Column, ColumnStore, ColumnValue};

use crate::clock::Clock;
use crate::config::SessionPolicy;
use crate::error::AccessError;
use crate::session::{LoginOutcome, SessionManager};

/// Facade over a single list identified by its key.
///
/// Every call goes to the store; no list state is cached. Mutations are
/// read-modify-write without a spanning transaction, so two concurrent writers
/// to the same list can lose an update.
#[derive(Clone)]
pub struct ListAccessor {
    key: ListKey,
    store: Arc<dyn ColumnStore>,
    codec: ObservationCodec,
    session: SessionManager,
}

impl ListAccessor {
    pub fn new(
        key: ListKey,
        store: Arc<dyn ColumnStore>,
        catalog: Arc<SpeciesCatalog>,
        clock: Arc<dyn Clock>,
        policy: SessionPolicy,
    ) -> Self {
        let session = SessionManager::new(store.clone(), key.clone(), clock, policy);
        Self {
            key,
            store,
            codec: ObservationCodec::new(catalog),
            session,
        }
    }

    pub fn key(&self) -> &ListKey {
        &self.key
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Whether the store holds a list under this key.
    pub async fn exists(&self) -> Result<bool, AccessError> {
        Ok(self.store.list_exists(&self.key).await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AccessError> {
        self.session.login(username, password).await
    }

    pub async fn logout(&self, token: &str) -> Result<(), AccessError> {
        self.session.logout(token).await
    }

    /// Decode the full observation log in stored order.
    pub async fn get_observations(&self) -> Result<Vec<ObservationRecord>, AccessError> {
        let log = self.read_log().await?;
        Ok(self.codec.decode_log(&log)?)
    }

    /// Record a sighting. Any earlier sighting of the same species is replaced.
    pub async fn add_observation(
        &self,
        token: &str,
        record: &ObservationRecord,
    ) -> Result<(), AccessError> {
        self.authorize(token).await?;
        let block = self.codec.encode(record)?;

        let log = self.read_log().await?;
        let mut kept = String::with_capacity(log.len() + block.len());
        let mut replaced = 0;
        for existing in split_log(&log)? {
            if self.codec.decode_one(existing)?.species == record.species {
                replaced += 1;
            } else {
                kept.push_str(existing);
            }
        }
        kept.push_str(&block);

        self.write_log(kept).await?;
        tracing::info!(
            "added {} ({}.{}.{}) to list {}, replacing {} earlier sighting(s)",
            record.species,
            record.day,
            record.month,
            record.year,
            self.key,
            replaced
        );
        Ok(())
    }

    /// Remove the first sighting of `species`.
    pub async fn delete_observation(&self, token: &str, species: &str) -> Result<(), AccessError> {
        self.authorize(token).await?;

        let log = self.read_log().await?;
        let mut blocks = split_log(&log)?;
        let mut position = None;
        for (index, block) in blocks.iter().enumerate() {
            if self.codec.decode_one(block)?.species == species {
                position = Some(index);
                break;
            }
        }
        let Some(position) = position else {
            return Err(AccessError::NotFound(format!(
                "no observation of {species:?} on list {}",
                self.key
            )));
        };

        blocks.remove(position);
        self.write_log(blocks.concat()).await?;
        tracing::info!("deleted {} from list {}", species, self.key);
        Ok(())
    }

    async fn authorize(&self, token: &str) -> Result<(), AccessError> {
        if self.session.validate(token).await? {
            Ok(())
        } else {
            tracing::debug!("rejected token for list {}", self.key);
            Err(AccessError::Auth("invalid or expired token".to_string()))
        }
    }

    async fn read_log(&self) -> Result<String, AccessError> {
        Ok(self
            .store
            .get_column(Column::Observations, &self.key)
            .await?
            .into_text(Column::Observations)?)
    }

    async fn write_log(&self, log: String) -> Result<(), AccessError> {
        self.store
            .set_column(Column::Observations, &self.key, ColumnValue::Text(log))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lintulista_store::{MemoryStore, NewList, StoreError};

    use super::*;
    use crate::clock::ManualClock;
    use crate::password::hash_password;

    const START: i64 = 1_700_000_000;

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        accessor: ListAccessor,
        catalog: Arc<SpeciesCatalog>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let key = ListKey::parse("testeihin").unwrap();
        store
            .create_list(NewList {
                key: key.clone(),
                username: "tester".to_string(),
                password_hash: hash_password("salasana").unwrap(),
            })
            .await
            .unwrap();

        let catalog = Arc::new(SpeciesCatalog::builtin().unwrap());
        let clock = Arc::new(ManualClock::new(START));
        let accessor = ListAccessor::new(
            key,
            store.clone(),
            catalog.clone(),
            clock.clone(),
            SessionPolicy::default(),
        );
        Fixture {
            store,
            clock,
            accessor,
            catalog,
        }
    }

    async fn token(accessor: &ListAccessor) -> String {
        match accessor.login("tester", "salasana").await.unwrap() {
            LoginOutcome::Granted(grant) => grant.token,
            LoginOutcome::InvalidCredentials => panic!("expected login to succeed"),
        }
    }

    async fn raw_log(store: &MemoryStore) -> String {
        store
            .get_column(Column::Observations, &ListKey::parse("testeihin").unwrap())
            .await
            .unwrap()
            .into_text(Column::Observations)
            .unwrap()
    }

    async fn set_raw_log(store: &MemoryStore, log: &str) {
        store
            .set_column(
                Column::Observations,
                &ListKey::parse("testeihin").unwrap(),
                log.into(),
            )
            .await
            .unwrap();
    }

    fn species(catalog: &SpeciesCatalog, index: usize) -> String {
        catalog.name_of(index).unwrap().to_string()
    }

    #[tokio::test]
    async fn existence_follows_the_store() {
        let f = fixture().await;
        assert!(f.accessor.exists().await.unwrap());

        let other = ListAccessor::new(
            ListKey::parse("eiolemass").unwrap(),
            f.store.clone(),
            f.catalog.clone(),
            f.clock.clone(),
            SessionPolicy::default(),
        );
        assert!(!other.exists().await.unwrap());
        assert!(matches!(
            other.get_observations().await,
            Err(AccessError::Store(StoreError::ListNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn add_appends_the_scenario_block() {
        let f = fixture().await;
        let token = token(&f.accessor).await;
        let record = ObservationRecord::new(species(&f.catalog, 5), 24, 3, 2005);

        f.accessor.add_observation(&token, &record).await.unwrap();

        assert_eq!(raw_log(&f.store).await, "#-@+G=");
        assert_eq!(f.accessor.get_observations().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn reads_need_no_token() {
        let f = fixture().await;
        set_raw_log(&f.store, "#-@+G=").await;
        let records = f.accessor.get_observations().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2005);
    }

    #[tokio::test]
    async fn add_keeps_order_and_overwrites_same_species() {
        let f = fixture().await;
        let token = token(&f.accessor).await;
        let first = ObservationRecord::new(species(&f.catalog, 0), 1, 1, 2020);
        let second = ObservationRecord::new(species(&f.catalog, 1), 2, 2, 2021);
        let replacement = ObservationRecord::new(species(&f.catalog, 0), 3, 3, 2022);

        f.accessor.add_observation(&token, &first).await.unwrap();
        f.accessor.add_observation(&token, &second).await.unwrap();
        assert_eq!(
            f.accessor.get_observations().await.unwrap(),
            vec![first.clone(), second.clone()]
        );

        f.accessor.add_observation(&token, &replacement).await.unwrap();
        assert_eq!(
            f.accessor.get_observations().await.unwrap(),
            vec![second, replacement]
        );
        assert_eq!(raw_log(&f.store).await.len(), 12);
    }

    #[tokio::test]
    async fn invalid_records_are_rejected_without_writing() {
        let f = fixture().await;
        let token = token(&f.accessor).await;
        let name = species(&f.catalog, 5);

        let bad = [
            ObservationRecord::new("Lohikäärme", 1, 1, 2020),
            ObservationRecord::new(name.clone(), 0, 1, 2020),
            ObservationRecord::new(name.clone(), 32, 1, 2020),
            ObservationRecord::new(name.clone(), 1, 13, 2020),
            ObservationRecord::new(name.clone(), 1, 1, 2000),
        ];
        for record in &bad {
            assert!(
                matches!(
                    f.accessor.add_observation(&token, record).await,
                    Err(AccessError::Validation(_))
                ),
                "{record:?}"
            );
        }
        assert_eq!(raw_log(&f.store).await, "");
    }

    #[tokio::test]
    async fn years_past_the_field_width_overflow() {
        let f = fixture().await;
        let token = token(&f.accessor).await;
        let record = ObservationRecord::new(species(&f.catalog, 5), 1, 1, 4096);

        assert!(matches!(
            f.accessor.add_observation(&token, &record).await,
            Err(AccessError::Overflow { value: 4096, width: 2 })
        ));
        assert_eq!(raw_log(&f.store).await, "");
    }

    #[tokio::test]
    async fn mutations_require_a_valid_token() {
        let f = fixture().await;
        let record = ObservationRecord::new(species(&f.catalog, 5), 24, 3, 2005);

        assert!(matches!(
            f.accessor.add_observation(&"q".repeat(30), &record).await,
            Err(AccessError::Auth(_))
        ));
        assert!(matches!(
            f.accessor.delete_observation("", &record.species).await,
            Err(AccessError::Auth(_))
        ));

        let token = token(&f.accessor).await;
        f.accessor.add_observation(&token, &record).await.unwrap();

        f.clock.advance(21_601);
        assert!(matches!(
            f.accessor.delete_observation(&token, &record.species).await,
            Err(AccessError::Auth(_))
        ));
        assert_eq!(raw_log(&f.store).await, "#-@+G=");
    }

    #[tokio::test]
    async fn delete_removes_first_match_only() {
        let f = fixture().await;
        let token = token(&f.accessor).await;
        let a = ObservationRecord::new(species(&f.catalog, 0), 1, 1, 2020);
        let b = ObservationRecord::new(species(&f.catalog, 1), 2, 2, 2021);
        let a_again = ObservationRecord::new(species(&f.catalog, 0), 3, 3, 2022);

        // Duplicate species can only appear in logs written elsewhere.
        let log = [&a, &b, &a_again]
            .iter()
            .map(|r| ObservationCodec::new(f.catalog.clone()).encode(r).unwrap())
            .collect::<String>();
        set_raw_log(&f.store, &log).await;

        f.accessor.delete_observation(&token, &a.species).await.unwrap();
        assert_eq!(
            f.accessor.get_observations().await.unwrap(),
            vec![b.clone(), a_again]
        );

        f.accessor.delete_observation(&token, &a.species).await.unwrap();
        assert_eq!(f.accessor.get_observations().await.unwrap(), vec![b]);

        assert!(matches!(
            f.accessor.delete_observation(&token, &a.species).await,
            Err(AccessError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn corrupt_logs_surface_as_encoding_errors() {
        let f = fixture().await;
        let token = token(&f.accessor).await;

        set_raw_log(&f.store, "#-@+G").await;
        assert!(matches!(
            f.accessor.get_observations().await,
            Err(AccessError::Encoding(_))
        ));

        set_raw_log(&f.store, "#-@+G=#-@+G~").await;
        assert!(matches!(
            f.accessor.get_observations().await,
            Err(AccessError::Encoding(_))
        ));
        assert!(matches!(
            f.accessor.delete_observation(&token, "Kuikka").await,
            Err(AccessError::Encoding(_))
        ));
        assert_eq!(raw_log(&f.store).await, "#-@+G=#-@+G~");
    }
}
