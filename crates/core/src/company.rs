//! Companies: the tenants that own sync jobs and documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::CompanyId;

/// Region code assigned to every new company.
pub const DEFAULT_REGION: &str = "GO";

/// Sync strategy used when the caller does not pick one.
pub const DEFAULT_STRATEGY: &str = "api";

/// Brazilian company tax identifier (CNPJ), normalized to its 14 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxId(String);

impl TaxId {
    pub const LEN: usize = 14;

    /// Parse a tax id, ignoring formatting characters (`.`, `/`, `-`, spaces).
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != Self::LEN {
            return Err(DomainError::validation(format!(
                "cnpj must have {} digits, got {}",
                Self::LEN,
                digits.len()
            )));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TaxId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered company. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    #[serde(rename = "cnpj")]
    pub tax_id: TaxId,
    #[serde(rename = "state")]
    pub region: String,
    pub strategy: String,
    #[serde(rename = "cert_alias")]
    pub credential_alias: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for registering a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub tax_id: TaxId,
    pub region: String,
    pub strategy: String,
    pub credential_alias: Option<String>,
}

impl NewCompany {
    /// Validate raw registration input.
    ///
    /// The name must be non-blank and the tax id must contain exactly 14 digits.
    /// A blank strategy falls back to [`DEFAULT_STRATEGY`].
    pub fn new(
        name: &str,
        tax_id: &str,
        strategy: Option<&str>,
        credential_alias: Option<&str>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        let tax_id = TaxId::parse(tax_id)?;

        let strategy = strategy
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_STRATEGY);
        let credential_alias = credential_alias
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            tax_id,
            region: DEFAULT_REGION.to_string(),
            strategy: strategy.to_string(),
            credential_alias,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_cnpj_formatting() {
        let id = TaxId::parse("12.345.678/0001-99").unwrap();
        assert_eq!(id.as_str(), "12345678000199");
    }

    #[test]
    fn rejects_short_cnpj() {
        assert!(matches!(
            TaxId::parse("12.345.678/0001"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn new_company_applies_defaults() {
        let c = NewCompany::new("  Acme ", "12345678000199", None, Some("  ")).unwrap();
        assert_eq!(c.name, "Acme");
        assert_eq!(c.strategy, DEFAULT_STRATEGY);
        assert_eq!(c.region, DEFAULT_REGION);
        assert_eq!(c.credential_alias, None);
    }

    #[test]
    fn new_company_requires_name() {
        let err = NewCompany::new("   ", "12345678000199", Some("api"), None).unwrap_err();
        assert_eq!(err, DomainError::validation("name is required"));
    }

    #[test]
    fn company_serializes_with_wire_names() {
        let company = Company {
            id: CompanyId::new(1),
            name: "Acme".into(),
            tax_id: TaxId::parse("12345678000199").unwrap(),
            region: DEFAULT_REGION.into(),
            strategy: "api".into(),
            credential_alias: None,
            created_at: Utc::now(),
        };
        let v = serde_json::to_value(&company).unwrap();
        assert_eq!(v["cnpj"], "12345678000199");
        assert_eq!(v["state"], "GO");
        assert!(v["cert_alias"].is_null());
    }

    proptest! {
        #[test]
        fn formatting_never_changes_the_digits(digits in "[0-9]{14}", sep in "[./ -]{0,3}") {
            let mut formatted = String::new();
            for (i, c) in digits.chars().enumerate() {
                if i % 3 == 2 {
                    formatted.push_str(&sep);
                }
                formatted.push(c);
            }
            let parsed = TaxId::parse(&formatted).unwrap();
            prop_assert_eq!(parsed.as_str(), digits.as_str());
        }

        #[test]
        fn wrong_digit_counts_are_rejected(digits in "[0-9]{0,13}|[0-9]{15,20}") {
            prop_assert!(TaxId::parse(&digits).is_err());
        }
    }
}
