use super::schema::{entourage, guests, principal_sponsors};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// An invited party. `attending` stays NULL until a reply is recorded, which
/// is the "Pending" state on the wire. `party_size` counts the whole party,
/// the invitee included.
#[derive(Insertable, Selectable, Queryable, Serialize, Deserialize, AsChangeset, Clone)]
#[diesel(table_name = guests)]
pub struct Guest {
    pub id: String,
    pub guest_name: String,
    pub email: Option<String>,
    pub attending: Option<bool>,
    pub party_size: Option<i32>,
    pub message: Option<String>,
    pub date_of_rsvp: Option<NaiveDateTime>,
    pub last_modified: Option<NaiveDateTime>,
}

/// One wedding-party role assignment. Rows read in id order, which is the
/// order they were entered.
#[derive(Queryable, Selectable, Serialize, Clone)]
#[diesel(table_name = entourage)]
pub struct EntourageMember {
    pub id: i32,
    pub name: String,
    pub role_category: String,
    pub role_title: Option<String>,
    pub email: Option<String>,
}

/// A principal sponsor couple. Either side may be blank.
#[derive(Queryable, Selectable, Serialize, Clone)]
#[diesel(table_name = principal_sponsors)]
pub struct PrincipalSponsor {
    pub id: i32,
    pub male_sponsor: Option<String>,
    pub female_sponsor: Option<String>,
}
