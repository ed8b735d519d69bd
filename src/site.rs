//! Site copy and settings, extracted from `[default.site]` in `Rocket.toml`
//! at launch and handed to routes as managed state.

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    pub couple: Couple,
    pub ceremony: Ceremony,
    pub reception: Reception,
    pub rsvp_deadline: String,
    pub dress_code: DressCode,
    pub snap_share: SnapShare,
    #[serde(default)]
    pub faq: Vec<FaqItem>,
    pub mail: Mail,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct Couple {
    pub bride: String,
    pub bride_nickname: String,
    pub groom: String,
    pub groom_nickname: String,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct Ceremony {
    pub venue: String,
    pub location: String,
    pub date: String,
    pub day: String,
    pub time: String,
    pub entourage_time: String,
    pub guests_time: String,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct Reception {
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct DressCode {
    pub theme: String,
    #[serde(default)]
    pub colors: Vec<String>,
    pub sponsors: Attire,
    pub guests: Attire,
    pub note: String,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct Attire {
    pub ladies: String,
    pub gentlemen: String,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct SnapShare {
    pub drive_link: String,
    pub instructions: String,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// SMTP settings for the RSVP notification. The password stays out of the
/// config file and comes from the `SMTP_PASSWORD` environment variable.
#[derive(Deserialize, Serialize, Clone)]
pub struct Mail {
    pub relay: String,
    pub username: String,
    pub from: String,
    pub to: String,
    pub reply_to: String,
}
