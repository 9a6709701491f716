//! Bulk import of existing external contacts into the platform.
//!
//! The import walks the external system page by page, bulk-creates each page
//! on the platform, and links identities by pairing records with response
//! entries positionally. Failures of one page or one record never abort the
//! rest of the run; they are collected and reported at the end.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use liaison_connector::ids::{ExternalId, PlatformId, ScopeToken};
use liaison_connector::mapping::SchemaSide;
use liaison_connector::record::ContactRecord;

use crate::engine::ContactSyncEngine;

/// Records fetched from the external system per page.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// One failure collected during an import run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportFailure {
    /// Page the failure happened on, counted from 1.
    pub page: u32,

    /// Index of the failed record within its page, when the failure is
    /// record-level rather than page-level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_index: Option<usize>,

    /// What went wrong.
    pub message: String,
}

impl ImportFailure {
    fn page_level(page: u32, message: impl Into<String>) -> Self {
        Self {
            page,
            record_index: None,
            message: message.into(),
        }
    }

    fn record_level(page: u32, record_index: usize, message: impl Into<String>) -> Self {
        Self {
            page,
            record_index: Some(record_index),
            message: message.into(),
        }
    }
}

/// Result of an import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// True when every page and every record went through.
    pub success: bool,

    /// Collected page- and record-level failures, in encounter order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ImportFailure>,
}

impl BulkOutcome {
    fn from_failures(errors: Vec<ImportFailure>) -> Self {
        Self {
            success: errors.is_empty(),
            errors,
        }
    }
}

impl ContactSyncEngine {
    /// Import every contact the external system has into the platform.
    ///
    /// Listing stops at the first empty page or the first listing error; a
    /// listing error is recorded as a page-level failure. A rejected bulk
    /// call is recorded for its page and the walk moves on to the next one.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn import_all(&self, scope: &ScopeToken, page_size: u32) -> BulkOutcome {
        let mut failures = Vec::new();
        let mut page: u32 = 1;
        loop {
            let records = match self.consumer().list_contacts(page, page_size).await {
                Ok(records) => records,
                Err(err) => {
                    warn!(page, error = %err, "listing external contacts failed");
                    failures.push(ImportFailure::page_level(page, err.to_string()));
                    break;
                }
            };
            if records.is_empty() {
                debug!(page, "external listing exhausted");
                break;
            }
            self.import_page(scope, page, &records, &mut failures).await;
            page += 1;
        }
        BulkOutcome::from_failures(failures)
    }

    async fn import_page(
        &self,
        scope: &ScopeToken,
        page: u32,
        records: &[ContactRecord],
        failures: &mut Vec<ImportFailure>,
    ) {
        let mapped: Vec<ContactRecord> = records
            .iter()
            .map(|record| self.mapper().map_to(record, SchemaSide::Platform))
            .collect();

        let response = match self.platform().create_contacts(&mapped, scope).await {
            Ok(response) => response,
            Err(err) => {
                warn!(page, error = %err, "bulk create failed");
                failures.push(ImportFailure::page_level(page, err.to_string()));
                return;
            }
        };

        if response.contacts.is_empty() && !response.success {
            let message = response
                .error
                .unwrap_or_else(|| "bulk create rejected".to_string());
            failures.push(ImportFailure::page_level(page, message));
            return;
        }

        // Positional pairing is only sound when the response covers the page.
        if response.contacts.len() != records.len() {
            warn!(
                page,
                sent = records.len(),
                received = response.contacts.len(),
                "bulk response does not match the page"
            );
            failures.push(ImportFailure::page_level(
                page,
                format!(
                    "bulk response has {} entries for {} records",
                    response.contacts.len(),
                    records.len()
                ),
            ));
            return;
        }

        let mut entry_failed = false;
        for (index, (record, entry)) in records.iter().zip(response.contacts.iter()).enumerate()
        {
            if !entry.success {
                entry_failed = true;
                let message = entry
                    .error
                    .clone()
                    .unwrap_or_else(|| "contact creation failed".to_string());
                failures.push(ImportFailure::record_level(page, index, message));
                continue;
            }
            let ext_id = record.get_text(self.mapper().ext_id_key());
            match (ext_id, entry.id.as_ref()) {
                (Some(ext_id), Some(platform_id)) => {
                    self.link_imported(scope, platform_id, &ExternalId::new(ext_id))
                        .await;
                }
                _ => warn!(page, index, "created entry carries no id pair"),
            }
        }

        // A whole-call failure flag with no failed entry explaining it still
        // counts against the page.
        if !response.success && !entry_failed {
            failures.push(ImportFailure::page_level(
                page,
                response
                    .error
                    .unwrap_or_else(|| "bulk create reported failure".to_string()),
            ));
        }
    }

    async fn link_imported(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
        ext_id: &ExternalId,
    ) {
        if let Err(err) = self.store().save_ids(scope, platform_id, ext_id).await {
            warn!(error = %err, "failed to persist identity link");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::{sample_mappings, scope, MockConsumer, MockPlatform};
    use liaison_store::{IdentityStore, InMemoryIdentityStore};
    use std::sync::Arc;

    struct Fixture {
        consumer: Arc<MockConsumer>,
        platform: Arc<MockPlatform>,
        store: Arc<InMemoryIdentityStore>,
        engine: ContactSyncEngine,
    }

    fn fixture_with(consumer: MockConsumer, platform: MockPlatform) -> Fixture {
        let consumer = Arc::new(consumer);
        let platform = Arc::new(platform);
        let store = Arc::new(InMemoryIdentityStore::new());
        let engine = ContactSyncEngine::builder()
            .consumer(consumer.clone())
            .platform(platform.clone())
            .store(store.clone())
            .mappings(sample_mappings())
            .build()
            .unwrap();
        Fixture {
            consumer,
            platform,
            store,
            engine,
        }
    }

    fn external_contact(id: i64) -> ContactRecord {
        ContactRecord::new()
            .with("id", id)
            .with("prenom", format!("contact-{id}"))
    }

    fn pages(sizes: &[usize]) -> Vec<Vec<ContactRecord>> {
        let mut next_id = 100;
        sizes
            .iter()
            .map(|&size| {
                (0..size)
                    .map(|_| {
                        next_id += 1;
                        external_contact(next_id)
                    })
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_import_walks_pages_until_empty() {
        let fx = fixture_with(
            MockConsumer {
                pages: pages(&[3, 2]),
                ..MockConsumer::new()
            },
            MockPlatform::new(),
        );

        let outcome = fx.engine.import_all(&scope(), DEFAULT_PAGE_SIZE).await;
        assert!(outcome.success);
        assert!(outcome.errors.is_empty());

        // Pages 1 and 2 had records, page 3 was empty and stopped the walk.
        assert_eq!(fx.consumer.list_calls.lock().unwrap().as_slice(), &[1, 2, 3]);
        let bulk = fx.platform.bulk_calls.lock().unwrap();
        assert_eq!(bulk.len(), 2);
        assert_eq!(bulk[0].len(), 3);
        assert_eq!(bulk[1].len(), 2);
        // The bulk payload is mapped to the platform schema.
        assert!(bulk[0][0].has("firstname"));
        assert!(!bulk[0][0].has("prenom"));
        drop(bulk);

        // Every record got linked.
        for ext in ["101", "102", "103", "104", "105"] {
            let linked = fx
                .store
                .platform_id(&scope(), &ExternalId::new(ext))
                .await
                .unwrap();
            assert!(linked.is_some(), "missing link for external id {ext}");
        }
    }

    #[tokio::test]
    async fn test_import_pairs_records_positionally() {
        let fx = fixture_with(
            MockConsumer {
                pages: pages(&[3]),
                ..MockConsumer::new()
            },
            MockPlatform {
                bulk_entry_failures: vec![1],
                ..MockPlatform::new()
            },
        );

        let outcome = fx.engine.import_all(&scope(), DEFAULT_PAGE_SIZE).await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.errors,
            vec![ImportFailure {
                page: 1,
                record_index: Some(1),
                message: "invalid record".to_string(),
            }]
        );

        // Records 0 and 2 are linked, the rejected one is not.
        assert!(fx
            .store
            .platform_id(&scope(), &ExternalId::new("101"))
            .await
            .unwrap()
            .is_some());
        assert!(fx
            .store
            .platform_id(&scope(), &ExternalId::new("102"))
            .await
            .unwrap()
            .is_none());
        assert!(fx
            .store
            .platform_id(&scope(), &ExternalId::new("103"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_import_stops_on_listing_error() {
        let fx = fixture_with(
            MockConsumer {
                pages: pages(&[3, 2]),
                fail_list_at: Some(2),
                ..MockConsumer::new()
            },
            MockPlatform::new(),
        );

        let outcome = fx.engine.import_all(&scope(), DEFAULT_PAGE_SIZE).await;
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].page, 2);
        assert_eq!(outcome.errors[0].record_index, None);

        // Page 1 was still imported before the walk stopped.
        assert_eq!(fx.platform.bulk_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_continues_past_rejected_pages() {
        let fx = fixture_with(
            MockConsumer {
                pages: pages(&[2, 2]),
                ..MockConsumer::new()
            },
            MockPlatform {
                fail_bulk: true,
                ..MockPlatform::new()
            },
        );

        let outcome = fx.engine.import_all(&scope(), DEFAULT_PAGE_SIZE).await;
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors.iter().all(|e| e.record_index.is_none()));
        assert_eq!(fx.platform.bulk_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_import_continues_past_bulk_transport_errors() {
        let fx = fixture_with(
            MockConsumer {
                pages: pages(&[1, 1]),
                ..MockConsumer::new()
            },
            MockPlatform {
                error_bulk: true,
                ..MockPlatform::new()
            },
        );

        let outcome = fx.engine.import_all(&scope(), DEFAULT_PAGE_SIZE).await;
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors.iter().all(|e| e.record_index.is_none()));
        assert!(outcome.errors[0].message.contains("bulk transport failed"));

        // Both pages were still submitted.
        assert_eq!(fx.platform.bulk_calls.lock().unwrap().len(), 2);
        assert!(fx
            .store
            .platform_id(&scope(), &ExternalId::new("101"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_import_counts_contradictory_bulk_verdict() {
        let fx = fixture_with(
            MockConsumer {
                pages: pages(&[2]),
                ..MockConsumer::new()
            },
            MockPlatform {
                contradict_bulk_success: true,
                ..MockPlatform::new()
            },
        );

        let outcome = fx.engine.import_all(&scope(), DEFAULT_PAGE_SIZE).await;

        // Every entry succeeded, but the call-level verdict said otherwise;
        // the page counts as failed.
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].page, 1);
        assert_eq!(outcome.errors[0].record_index, None);

        // The entries themselves are still trusted for identity links.
        for ext in ["101", "102"] {
            assert!(fx
                .store
                .platform_id(&scope(), &ExternalId::new(ext))
                .await
                .unwrap()
                .is_some());
        }
    }

    #[tokio::test]
    async fn test_import_rejects_mismatched_response() {
        let fx = fixture_with(
            MockConsumer {
                pages: pages(&[3]),
                ..MockConsumer::new()
            },
            MockPlatform {
                truncate_bulk_response: true,
                ..MockPlatform::new()
            },
        );

        let outcome = fx.engine.import_all(&scope(), DEFAULT_PAGE_SIZE).await;
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("2 entries for 3 records"));

        // No link can be trusted when pairing breaks down.
        for ext in ["101", "102", "103"] {
            assert!(fx
                .store
                .platform_id(&scope(), &ExternalId::new(ext))
                .await
                .unwrap()
                .is_none());
        }
    }

    #[tokio::test]
    async fn test_import_of_empty_system() {
        let fx = fixture_with(MockConsumer::new(), MockPlatform::new());
        let outcome = fx.engine.import_all(&scope(), DEFAULT_PAGE_SIZE).await;
        assert!(outcome.success);
        assert!(fx.platform.bulk_calls.lock().unwrap().is_empty());
        assert_eq!(fx.consumer.list_calls.lock().unwrap().as_slice(), &[1]);
    }
}
