#[macro_use] extern crate rocket;
extern crate diesel;

use chrono::prelude::*;
use lettre::message::header::ContentType;
use lettre::message::{header, Mailbox, Mailboxes};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{error, info, warn};
use models::Guest;
use rand::{distributions::Alphanumeric, Rng};
use rocket::form::Form;
use rocket::http::{CookieJar, Status};
use rocket::response::Redirect;
use rocket::State;
use rocket_db_pools::deadpool_redis::redis::AsyncCommands;
use rocket_db_pools::diesel::prelude::*;
use rocket_db_pools::diesel::MysqlPool;
use rocket_db_pools::diesel::{dsl::*, RunQueryDsl};
use rocket_db_pools::{deadpool_redis, Connection, Database};
use rocket_dyn_templates::{context, Template};
use std::env;
use std::net::IpAddr;

pub mod api;
pub mod countdown;
pub mod guestbook;
pub mod models;
pub mod roster;
pub mod schema;
pub mod site;

use site::SiteConfig;

#[derive(Database)]
#[database("rsvp")]
pub struct Db(MysqlPool);

#[derive(Database)]
#[database("redis")]
pub struct Redis(deadpool_redis::Pool);

#[derive(FromForm)]
struct InvitationForm {
    code: String,
}

#[derive(FromForm)]
struct RsvpForm {
    attending: String,
    #[field(validate = range(1..))]
    party_size: i32,
    message: Option<String>,
}

#[derive(FromForm)]
struct AdminGuestForm {
    guest_name: String,
    email: Option<String>,
    attending: String,
    #[field(validate = range(1..))]
    party_size: i32,
    message: Option<String>,
}

const THROTTLE_LIMIT: i32 = 5;
const THROTTLE_WINDOW_SECS: i64 = 86_400;

fn invite_cookie(cookies: &CookieJar<'_>) -> String {
    cookies
        .get_private("invite_code")
        .map(|c| c.value().to_string())
        .unwrap_or_default()
}

/// Throttle key for a client address. IPv6 clients are keyed per /64.
fn ip_key(client_ip: Option<IpAddr>) -> Option<String> {
    match client_ip? {
        IpAddr::V4(ip4) => Some(format!("ipfail:{ip4}")),
        IpAddr::V6(ip6) => {
            let s = ip6.segments();
            Some(format!(
                "ipfail:{:04x}:{:04x}:{:04x}:{:04x}::/64",
                s[0], s[1], s[2], s[3]
            ))
        }
    }
}

async fn counter(r: &mut Connection<Redis>, key: &str) -> i32 {
    r.get::<_, i32>(key).await.unwrap_or(0)
}

/// Counter failures never block a request.
async fn bump_counter(r: &mut Connection<Redis>, key: &str) {
    if let Err(e) = r.incr::<_, _, i64>(key, 1).await {
        warn!("throttle counter {key} not bumped: {e}");
        return;
    }
    if let Err(e) = r.expire::<_, i64>(key, THROTTLE_WINDOW_SECS).await {
        warn!("no expiry set on {key}: {e}");
    }
}

async fn ip_ban(r: &mut Connection<Redis>, client_ip: Option<IpAddr>) -> Option<Template> {
    let key = ip_key(client_ip)?;
    let failures = counter(r, &key).await;
    if failures >= THROTTLE_LIMIT {
        Some(Template::render("banned", context! { failures }))
    } else {
        None
    }
}

async fn submission_ban(r: &mut Connection<Redis>, code: &str) -> Option<Template> {
    let submissions = counter(r, &format!("submit:{code}")).await;
    if submissions >= THROTTLE_LIMIT {
        Some(Template::render("slowdown", context! {}))
    } else {
        None
    }
}

async fn record_code_failure(r: &mut Connection<Redis>, client_ip: Option<IpAddr>) {
    if let Some(key) = ip_key(client_ip) {
        bump_counter(r, &key).await;
    }
}

async fn record_submission(r: &mut Connection<Redis>, code: &str) {
    bump_counter(r, &format!("submit:{code}")).await;
}

fn parse_reply(s: &str) -> Option<bool> {
    match s {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

fn blank_to_none(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Mails the couple about a reply. Failures are logged and swallowed; the
/// RSVP itself is already saved by the time this runs.
fn notify_couple(site: &SiteConfig, guest: &Guest) {
    let Ok(password) = env::var("SMTP_PASSWORD") else {
        warn!("SMTP_PASSWORD not set, skipping RSVP notification");
        return;
    };

    let reply = guestbook::reply_label(guest.attending);
    let subject = format!("{} has replied: {}", guest.guest_name, reply);
    let mut body = format!(
        "{} has replied \"{}\" to your invitation.\nParty size: {}\n",
        guest.guest_name,
        reply,
        guestbook::seats(guest.party_size),
    );
    if let Some(message) = guest.message.as_deref().filter(|m| !m.trim().is_empty()) {
        body.push_str(&format!("Message: {message}\n"));
    }

    let mailboxes: Mailboxes = match site.mail.to.parse() {
        Ok(m) => m,
        Err(e) => {
            warn!("notification recipients misconfigured: {e}");
            return;
        }
    };
    let to_header: header::To = mailboxes.into();
    let from: Mailbox = match site.mail.from.parse() {
        Ok(m) => m,
        Err(e) => {
            warn!("notification sender misconfigured: {e}");
            return;
        }
    };
    let reply_to: Mailbox = match site.mail.reply_to.parse() {
        Ok(m) => m,
        Err(e) => {
            warn!("notification reply-to misconfigured: {e}");
            return;
        }
    };

    let email = match Message::builder()
        .mailbox(to_header)
        .from(from)
        .reply_to(reply_to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
    {
        Ok(m) => m,
        Err(e) => {
            warn!("notification not built: {e}");
            return;
        }
    };

    let mailer = match SmtpTransport::starttls_relay(&site.mail.relay) {
        Ok(builder) => builder
            .credentials(Credentials::new(site.mail.username.clone(), password))
            .build(),
        Err(e) => {
            warn!("SMTP relay {} unreachable: {e}", site.mail.relay);
            return;
        }
    };

    match mailer.send(&email) {
        Ok(_) => info!("RSVP notification sent for {}", guest.id),
        Err(e) => warn!("RSVP notification not sent: {e}"),
    }
}

/// The invitation page. A failed table read degrades that section to its
/// empty state instead of failing the page.
#[get("/")]
async fn invitation(mut db: Connection<Db>, site: &State<SiteConfig>) -> Template {
    let target = countdown::target_or_default(&site.ceremony.date, &site.ceremony.time);
    let time_left = countdown::time_left(target, Utc::now());
    let date_parts = countdown::date_parts(&site.ceremony.date);

    let guest_rows: Vec<Guest> = {
        use self::schema::guests::dsl::*;
        match guests
            .select(Guest::as_select())
            .order(guest_name)
            .load(&mut db)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                error!("guest list read failed: {e}");
                Vec::new()
            }
        }
    };
    let entourage_rows: Vec<models::EntourageMember> = {
        use self::schema::entourage::dsl::*;
        match entourage
            .select(models::EntourageMember::as_select())
            .order(id)
            .load(&mut db)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                error!("entourage read failed: {e}");
                Vec::new()
            }
        }
    };
    let sponsor_rows: Vec<models::PrincipalSponsor> = {
        use self::schema::principal_sponsors::dsl::*;
        match principal_sponsors
            .select(models::PrincipalSponsor::as_select())
            .order(id)
            .load(&mut db)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                error!("principal sponsor read failed: {e}");
                Vec::new()
            }
        }
    };

    Template::render(
        "index",
        context! {
            site: site.inner(),
            date_parts,
            time_left,
            book: guestbook::entries(&guest_rows),
            entry_count: guestbook::attending(&guest_rows).len(),
            headcount: guestbook::headcount(&guest_rows),
            sections: roster::build_sections(&entourage_rows),
            sponsors: roster::sponsor_pairs(&sponsor_rows),
        },
    )
}

#[get("/rsvp")]
async fn rsvp_login(mut r: Connection<Redis>, client_ip: Option<IpAddr>) -> Template {
    if let Some(banned) = ip_ban(&mut r, client_ip).await {
        return banned;
    }
    Template::render("login", context! {})
}

#[get("/rsvp/banned")]
async fn banned_page(mut r: Connection<Redis>, client_ip: Option<IpAddr>) -> Template {
    let failures = match ip_key(client_ip) {
        Some(key) => counter(&mut r, &key).await,
        None => 0,
    };
    Template::render("banned", context! { failures })
}

#[post("/rsvp/authenticate", data = "<invitation>")]
async fn authenticate(
    invitation: Form<InvitationForm>,
    cookies: &CookieJar<'_>,
    mut db: Connection<Db>,
    mut r: Connection<Redis>,
    client_ip: Option<IpAddr>,
) -> Redirect {
    if ip_ban(&mut r, client_ip).await.is_some() {
        return Redirect::to(uri!(banned_page));
    }

    let code = invitation.code.replace('-', "").to_ascii_uppercase();

    use self::schema::guests::dsl::*;
    let on_guest_list = select(exists(guests.filter(id.eq(&code))))
        .get_result(&mut db)
        .await;

    match on_guest_list {
        Ok(true) => {
            cookies.add_private(("invite_code", code));
            Redirect::to(uri!(rsvp_form))
        }
        Ok(false) => {
            record_code_failure(&mut r, client_ip).await;
            Redirect::to(uri!(banned_page))
        }
        Err(e) => {
            error!("invite lookup failed: {e}");
            Redirect::to(uri!(rsvp_login))
        }
    }
}

#[get("/rsvp/form")]
async fn rsvp_form(
    cookies: &CookieJar<'_>,
    mut db: Connection<Db>,
    mut r: Connection<Redis>,
    client_ip: Option<IpAddr>,
    site: &State<SiteConfig>,
) -> Result<Template, Redirect> {
    if let Some(banned) = ip_ban(&mut r, client_ip).await {
        return Ok(banned);
    }
    let code = invite_cookie(cookies);
    if code.is_empty() {
        return Err(Redirect::to(uri!(rsvp_login)));
    }
    if let Some(slow) = submission_ban(&mut r, &code).await {
        return Ok(slow);
    }

    use self::schema::guests::dsl::guests;
    let guest = guests
        .find(&code)
        .select(Guest::as_select())
        .first(&mut db)
        .await;
    match guest {
        Ok(guest) => Ok(Template::render(
            "form",
            context! {
                invite_code: &code,
                name: &guest.guest_name,
                email: guest.email.clone().unwrap_or_default(),
                reply: guestbook::reply_label(guest.attending),
                party_size: guestbook::seats(guest.party_size),
                message: guest.message.clone().unwrap_or_default(),
                deadline: &site.rsvp_deadline,
            },
        )),
        Err(e) => {
            warn!("no guest for cookie code {code}: {e}");
            Err(Redirect::to(uri!(rsvp_login)))
        }
    }
}

#[get("/rsvp/submit")]
fn submit_redirect() -> Redirect {
    Redirect::temporary("/")
}

#[post("/rsvp/submit", data = "<rsvp>")]
async fn rsvp_submit(
    rsvp: Form<RsvpForm>,
    cookies: &CookieJar<'_>,
    mut r: Connection<Redis>,
    mut db: Connection<Db>,
    site: &State<SiteConfig>,
) -> Result<Template, Redirect> {
    let code = invite_cookie(cookies);
    if code.len() != 12 {
        return Err(Redirect::to(uri!(rsvp_login)));
    }
    if let Some(slow) = submission_ban(&mut r, &code).await {
        return Ok(slow);
    }
    record_submission(&mut r, &code).await;

    let current_time = Utc::now().naive_utc();

    use self::schema::guests::dsl::*;
    let prior = guests
        .find(&code)
        .select(Guest::as_select())
        .first(&mut db)
        .await;
    let prior = match prior {
        Ok(g) => g,
        Err(e) => {
            warn!("no guest for cookie code {code}: {e}");
            return Err(Redirect::to(uri!(rsvp_login)));
        }
    };
    // the first reply's timestamp survives later edits
    let first_reply = prior.date_of_rsvp.unwrap_or(current_time);
    let accept = rsvp.attending == "yes";

    let saved = diesel::update(guests.find(&code))
        .set((
            attending.eq(Some(accept)),
            party_size.eq(Some(rsvp.party_size)),
            message.eq(blank_to_none(rsvp.message.as_deref())),
            date_of_rsvp.eq(first_reply),
            last_modified.eq(now),
        ))
        .execute(&mut db)
        .await;
    if let Err(e) = saved {
        error!("rsvp for {code} not saved: {e}");
        return Err(Redirect::to(uri!(rsvp_login)));
    }

    let guest = guests
        .find(&code)
        .select(Guest::as_select())
        .first(&mut db)
        .await;
    match guest {
        Ok(guest) => {
            notify_couple(site.inner(), &guest);
            Ok(Template::render(
                "thankyou",
                context! {
                    name: &guest.guest_name,
                    reply: guestbook::reply_label(guest.attending),
                    seats: guestbook::seats(guest.party_size),
                    message: guest.message.clone().unwrap_or_default(),
                },
            ))
        }
        Err(e) => {
            error!("saved rsvp for {code} not read back: {e}");
            Err(Redirect::to(uri!(rsvp_login)))
        }
    }
}

#[get("/rsvp/admin")]
async fn admin(mut db: Connection<Db>) -> Template {
    use self::schema::guests::dsl::*;

    let all: Vec<Guest> = match guests
        .select(Guest::as_select())
        .order(guest_name)
        .load(&mut db)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!("admin roster read failed: {e}");
            return Template::render(
                "admin",
                context! {
                    attending_guests: Vec::<Guest>::new(),
                    declined: Vec::<Guest>::new(),
                    no_reply: Vec::<Guest>::new(),
                    headcount: 0,
                    entry_count: 0,
                    load_failed: true,
                },
            );
        }
    };

    let headcount = guestbook::headcount(&all);
    let attending_guests = guestbook::attending(&all);
    let declined: Vec<&Guest> = all.iter().filter(|g| g.attending == Some(false)).collect();
    let no_reply: Vec<&Guest> = all.iter().filter(|g| g.attending.is_none()).collect();

    Template::render(
        "admin",
        context! {
            entry_count: attending_guests.len(),
            attending_guests,
            declined,
            no_reply,
            headcount,
            load_failed: false,
        },
    )
}

#[get("/rsvp/admin/add")]
fn add_guest_form() -> Template {
    Template::render("add", context! {})
}

#[post("/rsvp/admin/add", data = "<form>")]
async fn add_guest(
    form: Form<AdminGuestForm>,
    mut db: Connection<Db>,
) -> Result<Template, Status> {
    use self::schema::guests::dsl::*;

    let code = loop {
        let candidate = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect::<String>()
            .to_ascii_uppercase();

        let code_exists: bool = select(exists(guests.filter(id.eq(&candidate))))
            .get_result(&mut db)
            .await
            .map_err(|e| {
                error!("invite code lookup failed: {e}");
                Status::InternalServerError
            })?;
        if !code_exists {
            break candidate;
        }
    };

    let new_guest = Guest {
        id: code.clone(),
        guest_name: form.guest_name.clone(),
        email: blank_to_none(form.email.as_deref()),
        attending: parse_reply(&form.attending),
        party_size: Some(form.party_size),
        message: blank_to_none(form.message.as_deref()),
        date_of_rsvp: None,
        last_modified: None,
    };

    diesel::insert_into(guests)
        .values(&new_guest)
        .execute(&mut db)
        .await
        .map_err(|e| {
            error!("guest {code} not added: {e}");
            Status::InternalServerError
        })?;

    Ok(Template::render(
        "saved",
        context! {
            invite_code: &code,
            name: &new_guest.guest_name,
            reply: guestbook::reply_label(new_guest.attending),
            party_size: guestbook::seats(new_guest.party_size),
        },
    ))
}

#[get("/rsvp/admin/edit/<code>")]
async fn edit_guest_form(code: &str, mut db: Connection<Db>) -> Result<Template, Status> {
    use self::schema::guests::dsl::guests;

    let guest = guests
        .find(code)
        .select(Guest::as_select())
        .first(&mut db)
        .await;
    match guest {
        Ok(guest) => Ok(Template::render(
            "edit",
            context! {
                invite_code: code,
                name: &guest.guest_name,
                email: guest.email.clone().unwrap_or_default(),
                reply: guestbook::reply_label(guest.attending),
                party_size: guestbook::seats(guest.party_size),
                message: guest.message.clone().unwrap_or_default(),
            },
        )),
        Err(diesel::result::Error::NotFound) => Err(Status::NotFound),
        Err(e) => {
            error!("guest {code} read failed: {e}");
            Err(Status::InternalServerError)
        }
    }
}

#[post("/rsvp/admin/edit/<code>", data = "<form>")]
async fn edit_guest(
    code: &str,
    form: Form<AdminGuestForm>,
    mut db: Connection<Db>,
) -> Result<Template, Status> {
    let current_time = Utc::now().naive_utc();

    use self::schema::guests::dsl::*;
    let prior = guests
        .find(code)
        .select(Guest::as_select())
        .first(&mut db)
        .await;
    let prior = match prior {
        Ok(g) => g,
        Err(diesel::result::Error::NotFound) => return Err(Status::NotFound),
        Err(e) => {
            error!("guest {code} read failed: {e}");
            return Err(Status::InternalServerError);
        }
    };
    let first_reply = prior.date_of_rsvp.unwrap_or(current_time);

    diesel::update(guests.find(code))
        .set((
            guest_name.eq(&form.guest_name),
            email.eq(blank_to_none(form.email.as_deref())),
            attending.eq(parse_reply(&form.attending)),
            party_size.eq(Some(form.party_size)),
            message.eq(blank_to_none(form.message.as_deref())),
            date_of_rsvp.eq(first_reply),
            last_modified.eq(now),
        ))
        .execute(&mut db)
        .await
        .map_err(|e| {
            error!("guest {code} not updated: {e}");
            Status::InternalServerError
        })?;

    Ok(Template::render(
        "saved",
        context! {
            invite_code: code,
            name: &form.guest_name,
            reply: guestbook::reply_label(parse_reply(&form.attending)),
            party_size: form.party_size,
        },
    ))
}

#[launch]
fn rocket() -> _ {
    let rocket = rocket::build();
    let site: SiteConfig = rocket
        .figment()
        .extract_inner("site")
        .expect("site configuration in Rocket.toml");

    rocket
        .mount(
            "/",
            routes![
                invitation,
                rsvp_login,
                banned_page,
                authenticate,
                rsvp_form,
                submit_redirect,
                rsvp_submit,
                admin,
                add_guest_form,
                add_guest,
                edit_guest_form,
                edit_guest,
            ],
        )
        .mount(
            "/api",
            routes![
                api::guest_list,
                api::entourage_list,
                api::sponsor_list,
                api::countdown_now,
            ],
        )
        .manage(site)
        .attach(Template::fairing())
        .attach(Db::init())
        .attach(Redis::init())
}
