//! Book-of-guests aggregation: who is coming and how many seats they take.

use serde::Serialize;

use crate::models::Guest;

/// One confirmed entry as the book of guests displays it.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GuestEntry {
    pub name: String,
    pub email: Option<String>,
    pub seats: i32,
    pub message: Option<String>,
}

/// Wire label for the tri-state reply column.
pub fn reply_label(attending: Option<bool>) -> &'static str {
    match attending {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "Pending",
    }
}

/// Seats one entry contributes. A missing or sub-1 party size counts as one.
pub fn seats(party_size: Option<i32>) -> i32 {
    party_size.filter(|n| *n >= 1).unwrap_or(1)
}

/// Attendance counts only recorded yes replies.
pub fn attending(guests: &[Guest]) -> Vec<&Guest> {
    guests.iter().filter(|g| g.attending == Some(true)).collect()
}

/// Total headcount across attending entries.
pub fn headcount(guests: &[Guest]) -> i64 {
    attending(guests)
        .iter()
        .map(|g| i64::from(seats(g.party_size)))
        .sum()
}

/// Attending entries shaped for display, in input order.
pub fn entries(guests: &[Guest]) -> Vec<GuestEntry> {
    attending(guests)
        .into_iter()
        .map(|g| GuestEntry {
            name: g.guest_name.clone(),
            email: g.email.clone(),
            seats: seats(g.party_size),
            message: g.message.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(name: &str, attending: Option<bool>, party_size: Option<i32>) -> Guest {
        Guest {
            id: format!("{name:A<12.12}"),
            guest_name: name.to_string(),
            email: None,
            attending,
            party_size,
            message: None,
            date_of_rsvp: None,
            last_modified: None,
        }
    }

    #[test]
    fn headcount_sums_attending_party_sizes() {
        let guests = vec![
            guest("Ana", Some(true), Some(2)),
            guest("Ben", Some(true), Some(3)),
            guest("Cara", Some(false), Some(4)),
            guest("Dan", None, Some(5)),
        ];
        assert_eq!(headcount(&guests), 5);
        assert_eq!(attending(&guests).len(), 2);
    }

    #[test]
    fn missing_or_sub_one_sizes_count_one_seat() {
        assert_eq!(seats(None), 1);
        assert_eq!(seats(Some(0)), 1);
        assert_eq!(seats(Some(-3)), 1);
        assert_eq!(seats(Some(1)), 1);
        assert_eq!(seats(Some(7)), 7);

        let guests = vec![
            guest("Ana", Some(true), None),
            guest("Ben", Some(true), Some(0)),
        ];
        assert_eq!(headcount(&guests), 2);
    }

    #[test]
    fn entries_keep_order_and_skip_non_attending() {
        let guests = vec![
            guest("Ben", Some(true), Some(2)),
            guest("Ana", None, None),
            guest("Cara", Some(true), None),
        ];
        let entries = entries(&guests);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Ben");
        assert_eq!(entries[0].seats, 2);
        assert_eq!(entries[1].name, "Cara");
        assert_eq!(entries[1].seats, 1);
    }

    #[test]
    fn reply_labels() {
        assert_eq!(reply_label(Some(true)), "Yes");
        assert_eq!(reply_label(Some(false)), "No");
        assert_eq!(reply_label(None), "Pending");
    }

    #[test]
    fn no_guests_means_empty_book() {
        assert_eq!(headcount(&[]), 0);
        assert!(entries(&[]).is_empty());
    }
}
