// src/models/parties.rs

use serde::Serialize;
use sqlx::{query_builder::Separated, Postgres};

use crate::{
    common::error::AppError,
    models::sync::{EntityKind, SyncEntity},
    netsuite::Row,
};

// --- CLIENTES ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub netsuite_internal_id: i64,
    pub entity_id: Option<String>, // Código do cliente no NetSuite
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subsidiary_id: Option<i64>,
    pub currency_id: Option<i64>,
    pub terms_id: Option<i64>,
    pub is_person: bool,
    pub is_inactive: bool,
}

impl SyncEntity for Customer {
    const KIND: EntityKind = EntityKind::Customers;
    const TABLE: &'static str = "netsuite_customers";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "entity_id",
        "company_name",
        "email",
        "phone",
        "subsidiary_id",
        "currency_id",
        "terms_id",
        "is_person",
        "is_inactive",
    ];
    const SUITEQL: &'static str = "SELECT id, entityid, companyname, email, phone, subsidiary, currency, \
        terms, isperson, isinactive FROM customer";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            entity_id: row.opt_str("entityid"),
            company_name: row.opt_str("companyname"),
            email: row.opt_str("email"),
            phone: row.opt_str("phone"),
            subsidiary_id: row.opt_i64("subsidiary")?,
            currency_id: row.opt_i64("currency")?,
            terms_id: row.opt_i64("terms")?,
            is_person: row.flag("isperson"),
            is_inactive: row.flag("isinactive"),
        })
    }

    fn internal_id(&self) -> i64 {
        self.netsuite_internal_id
    }

    fn push_binds<'qb, 'args>(&self, b: &mut Separated<'qb, 'args, Postgres, &'static str>)
    where
        'args: 'qb,
    {
        b.push_bind(self.netsuite_internal_id)
            .push_bind(self.entity_id.clone())
            .push_bind(self.company_name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.phone.clone())
            .push_bind(self.subsidiary_id)
            .push_bind(self.currency_id)
            .push_bind(self.terms_id)
            .push_bind(self.is_person)
            .push_bind(self.is_inactive);
    }
}

// --- FORNECEDORES ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub netsuite_internal_id: i64,
    pub entity_id: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subsidiary_id: Option<i64>,
    pub currency_id: Option<i64>,
    pub terms_id: Option<i64>,
    pub is_1099_eligible: bool,
    pub is_inactive: bool,
}

impl SyncEntity for Vendor {
    const KIND: EntityKind = EntityKind::Vendors;
    const TABLE: &'static str = "netsuite_vendors";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "entity_id",
        "company_name",
        "email",
        "phone",
        "subsidiary_id",
        "currency_id",
        "terms_id",
        "is_1099_eligible",
        "is_inactive",
    ];
    const SUITEQL: &'static str = "SELECT id, entityid, companyname, email, phone, subsidiary, currency, \
        terms, is1099eligible, isinactive FROM vendor";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            entity_id: row.opt_str("entityid"),
            company_name: row.opt_str("companyname"),
            email: row.opt_str("email"),
            phone: row.opt_str("phone"),
            subsidiary_id: row.opt_i64("subsidiary")?,
            currency_id: row.opt_i64("currency")?,
            terms_id: row.opt_i64("terms")?,
            is_1099_eligible: row.flag("is1099eligible"),
            is_inactive: row.flag("isinactive"),
        })
    }

    fn internal_id(&self) -> i64 {
        self.netsuite_internal_id
    }

    fn push_binds<'qb, 'args>(&self, b: &mut Separated<'qb, 'args, Postgres, &'static str>)
    where
        'args: 'qb,
    {
        b.push_bind(self.netsuite_internal_id)
            .push_bind(self.entity_id.clone())
            .push_bind(self.company_name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.phone.clone())
            .push_bind(self.subsidiary_id)
            .push_bind(self.currency_id)
            .push_bind(self.terms_id)
            .push_bind(self.is_1099_eligible)
            .push_bind(self.is_inactive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn customer_references_are_plain_ids() {
        let value = json!({
            "id": "1503",
            "entityid": "CUST-0042",
            "companyname": "Acme Ltda",
            "email": "compras@acme.com",
            "subsidiary": "2",
            "currency": "1",
            "terms": "4",
            "isperson": "F",
            "isinactive": "T",
        });
        let customer = Customer::from_row(&Row::new(&value).unwrap()).unwrap();

        assert_eq!(customer.netsuite_internal_id, 1503);
        assert_eq!(customer.entity_id.as_deref(), Some("CUST-0042"));
        assert_eq!(customer.subsidiary_id, Some(2));
        assert_eq!(customer.terms_id, Some(4));
        assert_eq!(customer.phone, None);
        assert!(customer.is_inactive);
    }

    #[test]
    fn vendor_flags_default_to_false() {
        let value = json!({ "id": "88", "companyname": "Parafusos SA" });
        let vendor = Vendor::from_row(&Row::new(&value).unwrap()).unwrap();

        assert!(!vendor.is_1099_eligible);
        assert!(!vendor.is_inactive);
        assert_eq!(vendor.currency_id, None);
    }

    #[test]
    fn columns_match_bind_count() {
        assert_eq!(Customer::COLUMNS.len(), 10);
        assert_eq!(Vendor::COLUMNS.len(), 10);
    }
}
