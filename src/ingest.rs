//! Sync job orchestration.
//!
//! Loads the whole catalog, then maps and reconciles one record at a time in
//! input order. A record that fails to map or to reach the store is reported
//! as skipped and the run continues; only setup failures (config, input file,
//! store connection) abort the job.

use std::path::PathBuf;

use anyhow::Result;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db;
use crate::error::RecordError;
use crate::mapper::map_product;
use crate::migrate;
use crate::models::ProductDocument;
use crate::progress::{ProgressFormat, SyncEvent, SyncReporter, SyncSummary};
use crate::reconcile::{reconcile, Outcome};
use crate::sqlite_store::SqliteStore;
use crate::store::Store;
use crate::xml::{self, XmlNode};

pub async fn run_sync(
    config: &Config,
    file: Option<PathBuf>,
    dry_run: bool,
    format: ProgressFormat,
) -> Result<()> {
    let path = file.unwrap_or_else(|| config.source.path.clone());
    let records = xml::load_catalog(&path)?;
    let reporter = format.reporter();

    if dry_run {
        let summary = check_records(&records, &SystemClock, reporter.as_ref());
        match format {
            ProgressFormat::Human => {
                println!("sync {} (dry-run)", path.display());
                println!("  records found: {}", summary.total);
                println!("  mappable: {}", summary.total - summary.skipped);
                println!("  rejected: {}", summary.skipped);
            }
            ProgressFormat::Json => reporter.report(SyncEvent::Complete(summary)),
        }
        return Ok(());
    }

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool, &config.db.collection);
    if let Err(e) = migrate::create_collection(store.pool(), &config.db.collection).await {
        store.close().await;
        return Err(e);
    }

    sync_records(&store, &records, &SystemClock, reporter.as_ref()).await;

    store.close().await;
    Ok(())
}

/// Map and reconcile every record in order.
///
/// Never fails as a whole: each record's error is reported and counted.
pub async fn sync_records<S: Store + ?Sized>(
    store: &S,
    records: &[XmlNode],
    clock: &dyn Clock,
    reporter: &dyn SyncReporter,
) -> SyncSummary {
    let mut summary = SyncSummary::default();

    for record in records {
        summary.total += 1;
        let event = match sync_one(store, record, clock).await {
            Ok((doc, outcome)) => {
                let ProductDocument {
                    stock_code, name, ..
                } = doc;
                match outcome {
                    Outcome::Inserted => {
                        summary.inserted += 1;
                        SyncEvent::Inserted { stock_code, name }
                    }
                    Outcome::Updated { fields } => {
                        summary.updated += 1;
                        SyncEvent::Updated {
                            stock_code,
                            name,
                            fields,
                        }
                    }
                    Outcome::Unchanged => {
                        summary.unchanged += 1;
                        SyncEvent::Unchanged { stock_code, name }
                    }
                }
            }
            Err(e) => {
                summary.skipped += 1;
                skipped(record, &e)
            }
        };
        reporter.report(event);
    }

    reporter.report(SyncEvent::Complete(summary.clone()));
    summary
}

async fn sync_one<S: Store + ?Sized>(
    store: &S,
    record: &XmlNode,
    clock: &dyn Clock,
) -> Result<(ProductDocument, Outcome), RecordError> {
    let doc = map_product(record, clock.now())?;
    let outcome = reconcile(store, &doc, clock.now()).await?;
    Ok((doc, outcome))
}

/// Map every record without touching a store, reporting the failures.
pub fn check_records(
    records: &[XmlNode],
    clock: &dyn Clock,
    reporter: &dyn SyncReporter,
) -> SyncSummary {
    let mut summary = SyncSummary::default();
    for record in records {
        summary.total += 1;
        if let Err(e) = map_product(record, clock.now()) {
            summary.skipped += 1;
            reporter.report(skipped(record, &RecordError::from(e)));
        }
    }
    summary
}

fn skipped(record: &XmlNode, err: &RecordError) -> SyncEvent {
    SyncEvent::Skipped {
        stock_code: record.attr("ProductId").map(str::to_string),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::memory::InMemoryStore;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Mutex;

    struct Collect(Mutex<Vec<SyncEvent>>);

    impl Collect {
        fn new() -> Self {
            Collect(Mutex::new(Vec::new()))
        }

        fn events(&self) -> Vec<SyncEvent> {
            self.0.lock().unwrap().clone()
        }
    }

    impl SyncReporter for Collect {
        fn report(&self, event: SyncEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap()
    }

    fn product_xml(id: &str, name: &str, price: &str, discounted: &str, quantity: &str) -> String {
        format!(
            r#"<Product ProductId="{id}" Name="{name}">
                 <Images><Image Path="https://cdn.example.com/{id}/1.jpg"/></Images>
                 <ProductDetails>
                   <ProductDetail Name="Price" Value="{price}"/>
                   <ProductDetail Name="DiscountedPrice" Value="{discounted}"/>
                   <ProductDetail Name="ProductType" Value="Gömlek"/>
                   <ProductDetail Name="Quantity" Value="{quantity}"/>
                   <ProductDetail Name="Color" Value="Beyaz"/>
                   <ProductDetail Name="Series" Value="1S-1M"/>
                 </ProductDetails>
                 <Description>Nice shirt</Description>
               </Product>"#
        )
    }

    fn catalog(products: &[String]) -> Vec<XmlNode> {
        xml::parse_catalog(&format!("<Products>{}</Products>", products.concat())).unwrap()
    }

    #[tokio::test]
    async fn insert_then_update_round_trip() {
        let store = InMemoryStore::new();
        let clock = FixedClock::new(t0());
        let reporter = Collect::new();

        let first = catalog(&[product_xml("A1", "shirt", "10,00", "8,50", "4")]);
        let summary = sync_records(&store, &first, &clock, &reporter).await;
        assert_eq!(summary.inserted, 1);

        let stored = store.get("A1").unwrap();
        assert_eq!(stored.price, 10.0);
        assert_eq!(stored.discounted_price, 8.5);
        assert!(stored.is_discounted);
        assert_eq!(stored.created_at, t0());

        clock.advance(Duration::hours(1));
        let second = catalog(&[product_xml("A1", "shirt", "10,00", "12,00", "4")]);
        let summary = sync_records(&store, &second, &clock, &reporter).await;
        assert_eq!(summary.updated, 1);

        let patch = store.last_patch().unwrap();
        assert_eq!(
            patch.fields(),
            vec!["discounted_price", "is_discounted", "updatedAt"]
        );
        let stored = store.get("A1").unwrap();
        assert_eq!(stored.price, 10.0);
        assert_eq!(stored.discounted_price, 12.0);
        assert!(!stored.is_discounted);
        assert_eq!(stored.updated_at, t0() + Duration::hours(1));
        assert_eq!(stored.created_at, t0());
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let store = InMemoryStore::new();
        let clock = FixedClock::new(t0());
        let records = catalog(&[
            product_xml("A1", "shirt", "10,00", "8,50", "4"),
            product_xml("B2", "dress", "30,00", "30,00", "1"),
        ]);

        sync_records(&store, &records, &clock, &Collect::new()).await;
        clock.advance(Duration::minutes(10));
        let reporter = Collect::new();
        let summary = sync_records(&store, &records, &clock, &reporter).await;

        assert_eq!(summary.unchanged, 2);
        assert_eq!(store.insert_count(), 2);
        assert_eq!(store.update_count(), 0);
        assert_eq!(
            reporter.events()[0],
            SyncEvent::Unchanged {
                stock_code: "A1".into(),
                name: "Shirt".into()
            }
        );
    }

    #[tokio::test]
    async fn bad_record_does_not_stop_the_run() {
        let store = InMemoryStore::new();
        let clock = FixedClock::new(t0());
        let short = r#"<Product ProductId="BAD" Name="broken">
                         <ProductDetails><ProductDetail Value="1"/></ProductDetails>
                       </Product>"#
            .to_string();
        let records = catalog(&[
            product_xml("A1", "shirt", "10,00", "8,50", "4"),
            short,
            product_xml("C3", "coat", "1.234,56", "9,00", "2"),
            product_xml("D4", "skirt", "20,00", "15,00", "3"),
        ]);
        let reporter = Collect::new();
        let summary = sync_records(&store, &records, &clock, &reporter).await;

        assert_eq!(
            summary,
            SyncSummary {
                total: 4,
                inserted: 2,
                updated: 0,
                unchanged: 0,
                skipped: 2,
            }
        );
        assert!(store.get("A1").is_some());
        assert!(store.get("D4").is_some());
        assert!(store.get("BAD").is_none());
        assert!(store.get("C3").is_none());

        let events = reporter.events();
        assert_eq!(events.len(), 5);
        assert!(matches!(
            &events[1],
            SyncEvent::Skipped { stock_code: Some(code), .. } if code == "BAD"
        ));
        assert!(matches!(events[4], SyncEvent::Complete(_)));
    }

    #[tokio::test]
    async fn store_failure_is_isolated_to_its_record() {
        let store = InMemoryStore::new();
        store.fail_writes_for("A1");
        let clock = FixedClock::new(t0());
        let records = catalog(&[
            product_xml("A1", "shirt", "10,00", "8,50", "4"),
            product_xml("B2", "dress", "30,00", "25,00", "1"),
        ]);
        let reporter = Collect::new();
        let summary = sync_records(&store, &records, &clock, &reporter).await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.inserted, 1);
        match &reporter.events()[0] {
            SyncEvent::Skipped { reason, .. } => assert!(reason.starts_with("store failed")),
            other => panic!("expected skipped event, got {:?}", other),
        }
    }

    #[test]
    fn dry_run_check_counts_rejections() {
        let clock = FixedClock::new(t0());
        let records = catalog(&[
            product_xml("A1", "shirt", "10,00", "8,50", "4"),
            product_xml("B2", "dress", "abc", "8,50", "4"),
        ]);
        let reporter = Collect::new();
        let summary = check_records(&records, &clock, &reporter);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(reporter.events().len(), 1);
    }
}
