//! Synthetic document provider.
//!
//! Stands in for a real fiscal-document provider: every run produces a random batch of
//! NF-e/NFC-e records and writes each body as a small XML file under
//! `<downloads_dir>/<cnpj>/<chave>.xml`.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use rand::seq::IndexedRandom as _;
use tracing::debug;

use webnotas_core::{Company, Direction, NewDocument};

use super::worker::{DocumentSink, SyncWorker, WorkerError};

const MODELS: [&str; 2] = ["55", "65"];
const DIRECTIONS: [Direction; 2] = [Direction::Inbound, Direction::Outbound];

/// Mock worker configuration.
#[derive(Debug, Clone)]
pub struct MockWorkerConfig {
    /// Root directory for per-company artifact folders
    pub downloads_dir: PathBuf,
    /// How many documents one run produces
    pub documents: RangeInclusive<u32>,
    /// Issue dates fall within this many days before today
    pub max_age_days: u64,
    /// Document amounts (rounded to cents)
    pub amount_min: f64,
    pub amount_max: f64,
}

impl MockWorkerConfig {
    pub fn new(downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
            documents: 18..=32,
            max_age_days: 45,
            amount_min: 18.50,
            amount_max: 1499.90,
        }
    }

    pub fn with_documents(mut self, documents: RangeInclusive<u32>) -> Self {
        self.documents = documents;
        self
    }
}

/// Worker that synthesizes random documents.
#[derive(Debug, Clone)]
pub struct MockSyncWorker {
    config: MockWorkerConfig,
}

/// One document's randomized fields, before its artifact is written.
#[derive(Debug, Clone)]
struct Draft {
    model: &'static str,
    direction: Direction,
    chave: String,
    issue_date: NaiveDate,
    amount: f64,
}

impl Draft {
    fn render_xml(&self) -> String {
        format!(
            "<nfe><chave>{}</chave><modelo>{}</modelo><direcao>{}</direcao><valor>{:.2}</valor><emissao>{}</emissao></nfe>",
            self.chave, self.model, self.direction, self.amount, self.issue_date
        )
    }
}

impl MockSyncWorker {
    pub const SOURCE: &'static str = "mock_provider";

    pub fn new(config: MockWorkerConfig) -> Self {
        Self { config }
    }

    fn draft_documents(&self) -> Vec<Draft> {
        let mut rng = rand::rng();
        let today = Utc::now().date_naive();
        let count = rng.random_range(self.config.documents.clone());

        (0..count)
            .map(|_| {
                let age = rng.random_range(0..=self.config.max_age_days);
                let amount = rng.random_range(self.config.amount_min..=self.config.amount_max);
                Draft {
                    model: MODELS.choose(&mut rng).copied().unwrap_or(MODELS[0]),
                    direction: DIRECTIONS.choose(&mut rng).copied().unwrap_or(Direction::Inbound),
                    chave: random_key(&mut rng),
                    issue_date: today.checked_sub_days(Days::new(age)).unwrap_or(today),
                    amount: (amount * 100.0).round() / 100.0,
                }
            })
            .collect()
    }
}

fn random_key(rng: &mut impl Rng) -> String {
    (0..NewDocument::KEY_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

#[async_trait]
impl SyncWorker for MockSyncWorker {
    fn source(&self) -> &str {
        Self::SOURCE
    }

    async fn sync(&self, company: &Company, sink: &mut dyn DocumentSink) -> Result<(), WorkerError> {
        let company_dir = self.config.downloads_dir.join(company.tax_id.as_str());
        tokio::fs::create_dir_all(&company_dir).await?;

        let drafts = self.draft_documents();
        debug!(company_id = %company.id, documents = drafts.len(), "synthesizing documents");

        for draft in drafts {
            let path = company_dir.join(format!("{}.xml", draft.chave));
            tokio::fs::write(&path, draft.render_xml()).await?;

            sink.insert_document(NewDocument {
                company_id: company.id,
                model: draft.model.to_string(),
                direction: draft.direction,
                chave: draft.chave,
                issue_date: draft.issue_date,
                amount: draft.amount,
                xml_path: path.display().to_string(),
                source: Self::SOURCE.to_string(),
            })
            .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use webnotas_core::{CompanyId, DocumentId};

    use super::*;
    use crate::store::StoreError;

    /// Collects documents in memory.
    #[derive(Default)]
    struct VecSink(Vec<NewDocument>);

    #[async_trait]
    impl DocumentSink for VecSink {
        async fn insert_document(&mut self, doc: NewDocument) -> Result<DocumentId, StoreError> {
            self.0.push(doc);
            Ok(DocumentId::new(self.0.len() as i64))
        }
    }

    fn company() -> Company {
        Company {
            id: CompanyId::new(1),
            name: "Acme".into(),
            tax_id: webnotas_core::TaxId::parse("12345678000199").unwrap(),
            region: "GO".into(),
            strategy: "api".into(),
            credential_alias: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn produces_documents_within_configured_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let worker = MockSyncWorker::new(MockWorkerConfig::new(dir.path()));
        let mut sink = VecSink::default();

        worker.sync(&company(), &mut sink).await.unwrap();

        let docs = sink.0;
        assert!((18..=32).contains(&docs.len()), "got {} documents", docs.len());

        let oldest = Utc::now().date_naive() - Duration::days(45);
        for doc in &docs {
            assert_eq!(doc.company_id, CompanyId::new(1));
            assert!(MODELS.contains(&doc.model.as_str()));
            assert!((18.50..=1499.90).contains(&doc.amount), "amount {}", doc.amount);
            assert_eq!((doc.amount * 100.0).round() / 100.0, doc.amount);
            assert_eq!(doc.chave.len(), NewDocument::KEY_LEN);
            assert!(doc.chave.chars().all(|c| c.is_ascii_digit()));
            assert!(doc.issue_date >= oldest && doc.issue_date <= Utc::now().date_naive());
            assert_eq!(doc.source, MockSyncWorker::SOURCE);
        }
    }

    #[tokio::test]
    async fn writes_one_artifact_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let worker = MockSyncWorker::new(MockWorkerConfig::new(dir.path()).with_documents(3..=3));
        let mut sink = VecSink::default();

        worker.sync(&company(), &mut sink).await.unwrap();

        assert_eq!(sink.0.len(), 3);
        for doc in &sink.0 {
            let path = std::path::Path::new(&doc.xml_path);
            assert!(path.starts_with(dir.path().join("12345678000199")));
            let body = std::fs::read_to_string(path).unwrap();
            assert!(body.contains(&format!("<chave>{}</chave>", doc.chave)));
        }
    }
}
