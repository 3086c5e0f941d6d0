// src/models/finance.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{query_builder::Separated, Postgres};

use crate::{
    common::error::AppError,
    models::sync::{EntityKind, SyncEntity},
    netsuite::Row,
};

// --- PLANO DE CONTAS ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub netsuite_internal_id: i64,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
    pub full_name: Option<String>,
    pub account_type: Option<String>, // Ex: "Bank", "AcctRec", "Expense"
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub currency_id: Option<i64>,
    pub is_summary: bool,
    pub is_inactive: bool,
}

impl SyncEntity for Account {
    const KIND: EntityKind = EntityKind::Accounts;
    const TABLE: &'static str = "netsuite_accounts";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "account_number",
        "account_name",
        "full_name",
        "account_type",
        "description",
        "parent_id",
        "currency_id",
        "is_summary",
        "is_inactive",
    ];
    const SUITEQL: &'static str = "SELECT id, acctnumber, accountsearchdisplayname AS acctname, fullname, \
        accttype, description, parent, currency, issummary, isinactive FROM account";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            account_number: row.opt_str("acctnumber"),
            account_name: row.opt_str("acctname"),
            full_name: row.opt_str("fullname"),
            account_type: row.opt_str("accttype"),
            description: row.opt_str("description"),
            parent_id: row.opt_i64("parent")?,
            currency_id: row.opt_i64("currency")?,
            is_summary: row.flag("issummary"),
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
            .push_bind(self.account_number.clone())
            .push_bind(self.account_name.clone())
            .push_bind(self.full_name.clone())
            .push_bind(self.account_type.clone())
            .push_bind(self.description.clone())
            .push_bind(self.parent_id)
            .push_bind(self.currency_id)
            .push_bind(self.is_summary)
            .push_bind(self.is_inactive);
    }
}

// --- MOEDAS ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub netsuite_internal_id: i64,
    pub name: Option<String>,
    pub symbol: Option<String>, // Código ISO. Ex: "BRL"
    pub display_symbol: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub is_base_currency: bool,
    pub is_inactive: bool,
}

impl SyncEntity for Currency {
    const KIND: EntityKind = EntityKind::Currencies;
    const TABLE: &'static str = "netsuite_currencies";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "name",
        "symbol",
        "display_symbol",
        "exchange_rate",
        "is_base_currency",
        "is_inactive",
    ];
    const SUITEQL: &'static str =
        "SELECT id, name, symbol, displaysymbol, exchangerate, isbasecurrency, isinactive FROM currency";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            name: row.opt_str("name"),
            symbol: row.opt_str("symbol"),
            display_symbol: row.opt_str("displaysymbol"),
            exchange_rate: row.opt_decimal("exchangerate")?,
            is_base_currency: row.flag("isbasecurrency"),
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
            .push_bind(self.name.clone())
            .push_bind(self.symbol.clone())
            .push_bind(self.display_symbol.clone())
            .push_bind(self.exchange_rate)
            .push_bind(self.is_base_currency)
            .push_bind(self.is_inactive);
    }
}

// --- CÓDIGOS DE IMPOSTO ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCode {
    pub netsuite_internal_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub rate: Option<Decimal>, // Em pontos percentuais: 7.25 = 7,25%
    pub tax_type_id: Option<i64>,
    pub is_inactive: bool,
}

impl SyncEntity for TaxCode {
    const KIND: EntityKind = EntityKind::TaxCodes;
    const TABLE: &'static str = "netsuite_tax_codes";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "name",
        "description",
        "rate",
        "tax_type_id",
        "is_inactive",
    ];
    const SUITEQL: &'static str =
        "SELECT id, itemid, description, rate, taxtype, isinactive FROM salestaxitem";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            name: row.opt_str("itemid"),
            description: row.opt_str("description"),
            rate: row.opt_percent("rate")?,
            tax_type_id: row.opt_i64("taxtype")?,
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
            .push_bind(self.name.clone())
            .push_bind(self.description.clone())
            .push_bind(self.rate)
            .push_bind(self.tax_type_id)
            .push_bind(self.is_inactive);
    }
}

// --- CONDIÇÕES DE PAGAMENTO ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub netsuite_internal_id: i64,
    pub name: Option<String>, // Ex: "Net 30"
    pub days_until_net_due: Option<i32>,
    pub discount_percent: Option<Decimal>,
    pub days_until_expiry: Option<i32>,
    pub is_inactive: bool,
}

impl SyncEntity for Term {
    const KIND: EntityKind = EntityKind::Terms;
    const TABLE: &'static str = "netsuite_terms";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "name",
        "days_until_net_due",
        "discount_percent",
        "days_until_expiry",
        "is_inactive",
    ];
    const SUITEQL: &'static str =
        "SELECT id, name, daysuntilnetdue, discountpercent, daysuntilexpiry, isinactive FROM term";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            name: row.opt_str("name"),
            days_until_net_due: row.opt_i32("daysuntilnetdue")?,
            discount_percent: row.opt_percent("discountpercent")?,
            days_until_expiry: row.opt_i32("daysuntilexpiry")?,
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
            .push_bind(self.name.clone())
            .push_bind(self.days_until_net_due)
            .push_bind(self.discount_percent)
            .push_bind(self.days_until_expiry)
            .push_bind(self.is_inactive);
    }
}
