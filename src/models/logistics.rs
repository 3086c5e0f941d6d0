// src/models/logistics.rs

use serde::Serialize;
use sqlx::{query_builder::Separated, Postgres};

use crate::{
    common::error::AppError,
    models::sync::{EntityKind, SyncEntity},
    netsuite::Row,
};

// --- MÉTODOS DE ENVIO (SCM) ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipMethod {
    pub netsuite_internal_id: i64,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub is_inactive: bool,
}

impl SyncEntity for ShipMethod {
    const KIND: EntityKind = EntityKind::ShipMethods;
    const TABLE: &'static str = "netsuite_ship_methods";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "name",
        "display_name",
        "description",
        "is_inactive",
    ];
    const SUITEQL: &'static str = "SELECT id, itemid, displayname, description, isinactive FROM shipitem";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            name: row.opt_str("itemid"),
            display_name: row.opt_str("displayname"),
            description: row.opt_str("description"),
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
            .push_bind(self.display_name.clone())
            .push_bind(self.description.clone())
            .push_bind(self.is_inactive);
    }
}

// --- CENTROS DE TRABALHO (MES) ---

// No NetSuite um centro de trabalho é um grupo de entidades marcado como
// "manufacturing work center".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkCenter {
    pub netsuite_internal_id: i64,
    pub name: Option<String>,
    pub subsidiary_id: Option<i64>,
    pub is_inactive: bool,
}

impl SyncEntity for WorkCenter {
    const KIND: EntityKind = EntityKind::WorkCenters;
    const TABLE: &'static str = "netsuite_work_centers";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "name",
        "subsidiary_id",
        "is_inactive",
    ];
    const SUITEQL: &'static str = "SELECT id, groupname, subsidiary, isinactive FROM entitygroup";
    const SUITEQL_FILTER: Option<&'static str> = Some("ismanufacturingworkcenter = 'T'");

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            name: row.opt_str("groupname"),
            subsidiary_id: row.opt_i64("subsidiary")?,
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
            .push_bind(self.subsidiary_id)
            .push_bind(self.is_inactive);
    }
}
