use chrono::Utc;
use tracing::debug;

use webnotas_core::{Company, CompanyId, NewCompany};

use super::{classify, company_from_row, Store, StoreError};

const COMPANY_COLUMNS: &str = "id, name, cnpj, state, strategy, cert_alias, created_at";

impl Store {
    /// Register a company. Fails with `DuplicateKey` if the tax id is taken.
    pub async fn create_company(&self, company: NewCompany) -> Result<CompanyId, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO companies (name, cnpj, state, strategy, cert_alias, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&company.name)
        .bind(company.tax_id.as_str())
        .bind(&company.region)
        .bind(&company.strategy)
        .bind(&company.credential_alias)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, || format!("cnpj {}", company.tax_id)))?;

        let id = CompanyId::new(result.last_insert_rowid());
        debug!(company_id = %id, cnpj = %company.tax_id, "company created");
        Ok(id)
    }

    pub async fn get_company(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(company_from_row).transpose()
    }

    /// All companies, most recent first.
    pub async fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(company_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{seed_company, temp_store};

    #[tokio::test]
    async fn create_and_read_back() {
        let (_dir, store) = temp_store().await;

        let new = NewCompany::new("Acme", "12.345.678/0001-99", Some("api"), Some("acme-cert")).unwrap();
        let id = store.create_company(new).await.unwrap();

        let company = store.get_company(id).await.unwrap().unwrap();
        assert_eq!(company.name, "Acme");
        assert_eq!(company.tax_id.as_str(), "12345678000199");
        assert_eq!(company.region, "GO");
        assert_eq!(company.credential_alias.as_deref(), Some("acme-cert"));
    }

    #[tokio::test]
    async fn duplicate_tax_id_is_rejected_and_original_row_kept() {
        let (_dir, store) = temp_store().await;
        let id = seed_company(&store, "Acme", "12345678000199").await;

        let dup = NewCompany::new("Other Name", "12.345.678/0001-99", Some("scraper"), None).unwrap();
        let err = store.create_company(dup).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)), "got {err:?}");

        let companies = store.list_companies().await.unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].id, id);
        assert_eq!(companies[0].name, "Acme");
        assert_eq!(companies[0].strategy, "api");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (_dir, store) = temp_store().await;
        let first = seed_company(&store, "First", "11111111000111").await;
        let second = seed_company(&store, "Second", "22222222000122").await;

        let ids: Vec<_> = store
            .list_companies()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn unknown_company_is_none() {
        let (_dir, store) = temp_store().await;
        assert!(store.get_company(CompanyId::new(99)).await.unwrap().is_none());
    }
}
