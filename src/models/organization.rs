// src/models/organization.rs

use serde::Serialize;
use sqlx::{query_builder::Separated, Postgres};

use crate::{
    common::error::AppError,
    models::sync::{EntityKind, SyncEntity},
    netsuite::Row,
};

// --- DEPARTAMENTOS ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub netsuite_internal_id: i64,
    pub name: Option<String>,
    pub full_name: Option<String>, // Hierarquia completa. Ex: "Operações : Expedição"
    pub parent_id: Option<i64>,
    pub is_inactive: bool,
}

impl SyncEntity for Department {
    const KIND: EntityKind = EntityKind::Departments;
    const TABLE: &'static str = "netsuite_departments";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "name",
        "full_name",
        "parent_id",
        "is_inactive",
    ];
    const SUITEQL: &'static str = "SELECT id, name, fullname, parent, isinactive FROM department";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            name: row.opt_str("name"),
            full_name: row.opt_str("fullname"),
            parent_id: row.opt_i64("parent")?,
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
            .push_bind(self.full_name.clone())
            .push_bind(self.parent_id)
            .push_bind(self.is_inactive);
    }
}

// --- FUNCIONÁRIOS (HCM) ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub netsuite_internal_id: i64,
    pub entity_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub job_title: Option<String>,
    pub department_id: Option<i64>,
    pub location_id: Option<i64>,
    pub subsidiary_id: Option<i64>,
    pub supervisor_id: Option<i64>,
    pub is_inactive: bool,
}

impl SyncEntity for Employee {
    const KIND: EntityKind = EntityKind::Employees;
    const TABLE: &'static str = "netsuite_employees";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "entity_id",
        "first_name",
        "last_name",
        "email",
        "job_title",
        "department_id",
        "location_id",
        "subsidiary_id",
        "supervisor_id",
        "is_inactive",
    ];
    const SUITEQL: &'static str = "SELECT id, entityid, firstname, lastname, email, title, department, \
        location, subsidiary, supervisor, isinactive FROM employee";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            entity_id: row.opt_str("entityid"),
            first_name: row.opt_str("firstname"),
            last_name: row.opt_str("lastname"),
            email: row.opt_str("email"),
            job_title: row.opt_str("title"),
            department_id: row.opt_i64("department")?,
            location_id: row.opt_i64("location")?,
            subsidiary_id: row.opt_i64("subsidiary")?,
            supervisor_id: row.opt_i64("supervisor")?,
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
            .push_bind(self.first_name.clone())
            .push_bind(self.last_name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.job_title.clone())
            .push_bind(self.department_id)
            .push_bind(self.location_id)
            .push_bind(self.subsidiary_id)
            .push_bind(self.supervisor_id)
            .push_bind(self.is_inactive);
    }
}

// --- LOCAIS ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub netsuite_internal_id: i64,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub parent_id: Option<i64>,
    pub subsidiary_id: Option<i64>,
    pub location_type_id: Option<i64>,
    pub is_inactive: bool,
}

impl SyncEntity for Location {
    const KIND: EntityKind = EntityKind::Locations;
    const TABLE: &'static str = "netsuite_locations";
    const COLUMNS: &'static [&'static str] = &[
        "netsuite_internal_id",
        "name",
        "full_name",
        "parent_id",
        "subsidiary_id",
        "location_type_id",
        "is_inactive",
    ];
    const SUITEQL: &'static str =
        "SELECT id, name, fullname, parent, subsidiary, locationtype, isinactive FROM location";

    fn from_row(row: &Row<'_>) -> Result<Self, AppError> {
        Ok(Self {
            netsuite_internal_id: row.internal_id()?,
            name: row.opt_str("name"),
            full_name: row.opt_str("fullname"),
            parent_id: row.opt_i64("parent")?,
            subsidiary_id: row.opt_i64("subsidiary")?,
            location_type_id: row.opt_i64("locationtype")?,
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
            .push_bind(self.full_name.clone())
            .push_bind(self.parent_id)
            .push_bind(self.subsidiary_id)
            .push_bind(self.location_type_id)
            .push_bind(self.is_inactive);
    }
}
