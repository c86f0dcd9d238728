use chrono::Utc;
use sqlx::Sqlite;

use webnotas_core::{CompanyId, Document, DocumentId, NewDocument};

use super::{classify, document_from_row, Store, StoreError, DOCUMENTS_LIMIT};

/// Insert one document row on any executor (pool or open transaction).
pub(super) async fn insert_document<'c, E>(exe: E, doc: &NewDocument) -> Result<DocumentId, StoreError>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO documents (
            company_id, model, direction, chave, issue_date, amount, xml_path, source, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(doc.company_id.get())
    .bind(&doc.model)
    .bind(doc.direction.as_str())
    .bind(&doc.chave)
    .bind(doc.issue_date)
    .bind(doc.amount)
    .bind(&doc.xml_path)
    .bind(&doc.source)
    .bind(Utc::now())
    .execute(exe)
    .await
    .map_err(|e| classify(e, || format!("company {}", doc.company_id)))?;

    Ok(DocumentId::new(result.last_insert_rowid()))
}

impl Store {
    /// Insert a single document outside of any sync batch.
    pub async fn insert_document(&self, doc: &NewDocument) -> Result<DocumentId, StoreError> {
        insert_document(&self.pool, doc).await
    }

    /// Most recent documents of a company.
    pub async fn list_documents(&self, company_id: CompanyId) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, model, direction, chave, issue_date, amount, xml_path, source, created_at
            FROM documents
            WHERE company_id = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )
        .bind(company_id.get())
        .bind(DOCUMENTS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    pub async fn count_documents(&self, company_id: CompanyId) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE company_id = ?1")
            .bind(company_id.get())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{seed_company, temp_store};
    use chrono::NaiveDate;
    use webnotas_core::Direction;

    fn doc(company_id: CompanyId, n: u32) -> NewDocument {
        NewDocument {
            company_id,
            model: "55".into(),
            direction: Direction::Outbound,
            chave: format!("{n:044}"),
            issue_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            amount: 100.25,
            xml_path: format!("downloads/{n}.xml"),
            source: "test".into(),
        }
    }

    #[tokio::test]
    async fn insert_and_list() {
        let (_dir, store) = temp_store().await;
        let company = seed_company(&store, "Acme", "12345678000199").await;

        store.insert_document(&doc(company, 1)).await.unwrap();
        let second = store.insert_document(&doc(company, 2)).await.unwrap();

        let docs = store.list_documents(company).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, second);
        assert_eq!(docs[0].direction, Direction::Outbound);
        assert_eq!(docs[0].chave.len(), NewDocument::KEY_LEN);
        assert_eq!(docs[0].issue_date, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert!((docs[0].amount - 100.25).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn listing_is_capped() {
        let (_dir, store) = temp_store().await;
        let company = seed_company(&store, "Acme", "12345678000199").await;

        for n in 0..(DOCUMENTS_LIMIT as u32 + 5) {
            store.insert_document(&doc(company, n)).await.unwrap();
        }

        assert_eq!(store.list_documents(company).await.unwrap().len(), DOCUMENTS_LIMIT as usize);
        assert_eq!(store.count_documents(company).await.unwrap(), DOCUMENTS_LIMIT + 5);
    }

    #[tokio::test]
    async fn documents_are_scoped_to_their_company() {
        let (_dir, store) = temp_store().await;
        let acme = seed_company(&store, "Acme", "12345678000199").await;
        let other = seed_company(&store, "Other", "98765432000198").await;

        store.insert_document(&doc(acme, 1)).await.unwrap();

        assert!(store.list_documents(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn document_for_unknown_company_is_rejected() {
        let (_dir, store) = temp_store().await;
        let err = store.insert_document(&doc(CompanyId::new(5), 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
    }
}
