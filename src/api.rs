//! JSON endpoints the invitation page polls. Field names match the
//! spreadsheet columns the site was originally built against.

use chrono::Utc;
use log::error;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use rocket_db_pools::diesel::prelude::*;
use rocket_db_pools::diesel::RunQueryDsl;
use rocket_db_pools::Connection;
use serde::Serialize;

use crate::countdown::{self, TimeLeft};
use crate::guestbook;
use crate::models::{EntourageMember, Guest, PrincipalSponsor};
use crate::site::SiteConfig;
use crate::Db;

#[derive(Serialize)]
pub struct GuestRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "RSVP")]
    pub rsvp: String,
    #[serde(rename = "Guest")]
    pub guest: i32,
    #[serde(rename = "Message")]
    pub message: String,
}

impl From<Guest> for GuestRecord {
    fn from(g: Guest) -> GuestRecord {
        GuestRecord {
            name: g.guest_name,
            email: g.email.unwrap_or_default(),
            rsvp: guestbook::reply_label(g.attending).to_string(),
            guest: guestbook::seats(g.party_size),
            message: g.message.unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
pub struct EntourageRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "RoleCategory")]
    pub role_category: String,
    #[serde(rename = "RoleTitle")]
    pub role_title: String,
    #[serde(rename = "Email")]
    pub email: String,
}

impl From<EntourageMember> for EntourageRecord {
    fn from(m: EntourageMember) -> EntourageRecord {
        EntourageRecord {
            name: m.name,
            role_category: m.role_category,
            role_title: m.role_title.unwrap_or_default(),
            email: m.email.unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
pub struct SponsorRecord {
    #[serde(rename = "MalePrincipalSponsor")]
    pub male: String,
    #[serde(rename = "FemalePrincipalSponsor")]
    pub female: String,
}

impl From<PrincipalSponsor> for SponsorRecord {
    fn from(s: PrincipalSponsor) -> SponsorRecord {
        SponsorRecord {
            male: s.male_sponsor.unwrap_or_default(),
            female: s.female_sponsor.unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
pub struct CountdownSnapshot {
    pub target: String,
    pub time_left: TimeLeft,
}

#[get("/guests")]
pub async fn guest_list(mut db: Connection<Db>) -> Result<Json<Vec<GuestRecord>>, Status> {
    use crate::schema::guests::dsl::*;

    let rows: Vec<Guest> = guests
        .select(Guest::as_select())
        .order(guest_name)
        .load(&mut db)
        .await
        .map_err(|e| {
            error!("guest list read failed: {e}");
            Status::InternalServerError
        })?;
    Ok(Json(rows.into_iter().map(GuestRecord::from).collect()))
}

#[get("/entourage")]
pub async fn entourage_list(mut db: Connection<Db>) -> Result<Json<Vec<EntourageRecord>>, Status> {
    use crate::schema::entourage::dsl::*;

    let rows: Vec<EntourageMember> = entourage
        .select(EntourageMember::as_select())
        .order(id)
        .load(&mut db)
        .await
        .map_err(|e| {
            error!("entourage read failed: {e}");
            Status::InternalServerError
        })?;
    Ok(Json(rows.into_iter().map(EntourageRecord::from).collect()))
}

#[get("/principal-sponsor")]
pub async fn sponsor_list(mut db: Connection<Db>) -> Result<Json<Vec<SponsorRecord>>, Status> {
    use crate::schema::principal_sponsors::dsl::*;

    let rows: Vec<PrincipalSponsor> = principal_sponsors
        .select(PrincipalSponsor::as_select())
        .order(id)
        .load(&mut db)
        .await
        .map_err(|e| {
            error!("principal sponsor read failed: {e}");
            Status::InternalServerError
        })?;
    Ok(Json(rows.into_iter().map(SponsorRecord::from).collect()))
}

/// Time remaining to the ceremony; the page polls this once a second.
#[get("/countdown")]
pub fn countdown_now(site: &State<SiteConfig>) -> Json<CountdownSnapshot> {
    let target = countdown::target_or_default(&site.ceremony.date, &site.ceremony.time);
    Json(CountdownSnapshot {
        target: target.to_rfc3339(),
        time_left: countdown::time_left(target, Utc::now()),
    })
}
