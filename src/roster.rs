//! Entourage display grouping.
//!
//! The flat role list partitions into titled sections laid out as two
//! columns. Some pairs of categories share one section (groom side left,
//! bride side right); every other category flows its own members two per
//! row. Every input member lands in exactly one cell.

use serde::Serialize;

use crate::models::{EntourageMember, PrincipalSponsor};

/// Display order for the categories the layout knows. Categories outside
/// this list render after it, in the order they first appear.
pub const ROLE_CATEGORY_ORDER: [&str; 12] = [
    "The Couple",
    "Parents of the Groom",
    "Parents of the Bride",
    "Best Man",
    "Maid/Matron of Honor",
    "Candle Sponsors",
    "Veil Sponsors",
    "Cord Sponsors",
    "Groomsmen",
    "Bridesmaids",
    "Flower Girls",
    "Ring/Coin Bearers",
];

/// Category pairs that share a section, left column first.
const PAIRED_CATEGORIES: [(&str, &str); 3] = [
    ("Parents of the Groom", "Parents of the Bride"),
    ("Best Man", "Maid/Matron of Honor"),
    ("Groomsmen", "Bridesmaids"),
];

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Cell {
    pub name: String,
    pub role_title: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Row {
    pub left: Option<Cell>,
    pub right: Option<Cell>,
}

/// A titled block of the roster. Paired sections carry a heading per
/// column; everything else carries a single centered title.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Section {
    pub title: Option<String>,
    pub left_title: Option<String>,
    pub right_title: Option<String>,
    pub rows: Vec<Row>,
}

impl Section {
    fn single(title: &str, rows: Vec<Row>) -> Section {
        Section {
            title: Some(title.to_string()),
            left_title: None,
            right_title: None,
            rows,
        }
    }

    fn paired(left_title: &str, right_title: &str, rows: Vec<Row>) -> Section {
        Section {
            title: None,
            left_title: Some(left_title.to_string()),
            right_title: Some(right_title.to_string()),
            rows,
        }
    }
}

/// A principal sponsor couple ready for the two-column listing. Rows where
/// both names are blank are dropped.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SponsorPair {
    pub male: String,
    pub female: String,
}

pub fn sponsor_pairs(rows: &[PrincipalSponsor]) -> Vec<SponsorPair> {
    rows.iter()
        .map(|r| SponsorPair {
            male: r.male_sponsor.as_deref().unwrap_or("").trim().to_string(),
            female: r.female_sponsor.as_deref().unwrap_or("").trim().to_string(),
        })
        .filter(|p| !p.male.is_empty() || !p.female.is_empty())
        .collect()
}

/// Partitions members by category, preserving member order within each.
/// Known categories come out in display order, unknown ones after, in the
/// order they were first seen.
pub fn group_by_category(members: &[EntourageMember]) -> Vec<(String, Vec<Cell>)> {
    let mut groups: Vec<(String, Vec<Cell>)> = Vec::new();
    for member in members {
        let category = if member.role_category.trim().is_empty() {
            "Other"
        } else {
            member.role_category.as_str()
        };
        let cell = Cell {
            name: member.name.clone(),
            role_title: member.role_title.clone(),
        };
        match groups.iter_mut().find(|(c, _)| c == category) {
            Some((_, cells)) => cells.push(cell),
            None => groups.push((category.to_string(), vec![cell])),
        }
    }

    let mut ordered = Vec::with_capacity(groups.len());
    for known in ROLE_CATEGORY_ORDER {
        if let Some(i) = groups.iter().position(|(c, _)| c == known) {
            ordered.push(groups.remove(i));
        }
    }
    ordered.append(&mut groups);
    ordered
}

/// Builds the full roster layout from the flat member list.
pub fn build_sections(members: &[EntourageMember]) -> Vec<Section> {
    let mut groups = group_by_category(members);
    let mut sections = Vec::new();

    let couple = take(&mut groups, "The Couple");
    if !couple.is_empty() {
        sections.push(Section::single("The Couple", couple_rows(couple)));
    }

    // Remaining categories keep display order; paired categories emit at
    // the position of whichever side appears first.
    while let Some((category, cells)) = pop_front(&mut groups) {
        if let Some(&(left_cat, right_cat)) = PAIRED_CATEGORIES
            .iter()
            .find(|(l, r)| *l == category || *r == category)
        {
            let (mut left, mut right) = if category == left_cat {
                (cells, take(&mut groups, right_cat))
            } else {
                (take(&mut groups, left_cat), cells)
            };
            if left_cat == "Parents of the Groom" {
                father_first(&mut left);
                father_first(&mut right);
            }
            sections.push(Section::paired(left_cat, right_cat, zip_rows(left, right)));
        } else {
            sections.push(Section::single(&category, chunk_rows(cells)));
        }
    }
    sections
}

fn take(groups: &mut Vec<(String, Vec<Cell>)>, category: &str) -> Vec<Cell> {
    groups
        .iter()
        .position(|(c, _)| c == category)
        .map(|i| groups.remove(i).1)
        .unwrap_or_default()
}

fn pop_front(groups: &mut Vec<(String, Vec<Cell>)>) -> Option<(String, Vec<Cell>)> {
    if groups.is_empty() {
        None
    } else {
        Some(groups.remove(0))
    }
}

fn title_contains(cell: &Cell, needle: &str) -> bool {
    cell.role_title
        .as_deref()
        .map(|t| t.to_lowercase().contains(needle))
        .unwrap_or(false)
}

/// Groom left of bride; any further couple rows flow in pairs below.
fn couple_rows(mut cells: Vec<Cell>) -> Vec<Row> {
    let groom = pluck(&mut cells, |c| title_contains(c, "groom"));
    let bride = pluck(&mut cells, |c| title_contains(c, "bride"));
    let mut rows = Vec::new();
    if groom.is_some() || bride.is_some() {
        rows.push(Row { left: groom, right: bride });
    }
    rows.extend(chunk_rows(cells));
    rows
}

fn pluck(cells: &mut Vec<Cell>, pred: impl Fn(&Cell) -> bool) -> Option<Cell> {
    cells.iter().position(pred).map(|i| cells.remove(i))
}

/// Stable: fathers float to the top, everything else keeps its order.
fn father_first(cells: &mut [Cell]) {
    cells.sort_by_key(|c| !title_contains(c, "father"));
}

/// Columns of unequal length pad with empty cells.
fn zip_rows(left: Vec<Cell>, right: Vec<Cell>) -> Vec<Row> {
    let len = left.len().max(right.len());
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    (0..len)
        .map(|_| Row {
            left: left.next(),
            right: right.next(),
        })
        .collect()
}

/// One category's members flowed two per row.
fn chunk_rows(cells: Vec<Cell>) -> Vec<Row> {
    let mut rows = Vec::with_capacity(cells.len().div_ceil(2));
    let mut it = cells.into_iter();
    while let Some(first) = it.next() {
        rows.push(Row {
            left: Some(first),
            right: it.next(),
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i32, name: &str, category: &str, title: Option<&str>) -> EntourageMember {
        EntourageMember {
            id,
            name: name.to_string(),
            role_category: category.to_string(),
            role_title: title.map(str::to_string),
            email: None,
        }
    }

    fn cell_count(sections: &[Section]) -> usize {
        sections
            .iter()
            .flat_map(|s| &s.rows)
            .map(|r| usize::from(r.left.is_some()) + usize::from(r.right.is_some()))
            .sum()
    }

    #[test]
    fn every_member_lands_in_exactly_one_cell() {
        let members = vec![
            member(1, "G", "The Couple", Some("Groom")),
            member(2, "B", "The Couple", Some("Bride")),
            member(3, "Mae", "Bridesmaids", None),
            member(4, "Leo", "Groomsmen", None),
            member(5, "Ivy", "Bridesmaids", None),
            member(6, "Kirsten", "Flower Girls", None),
            member(7, "Paige", "Little Bride", None),
            member(8, "Red", "Best Man", None),
        ];
        let sections = build_sections(&members);
        assert_eq!(cell_count(&sections), members.len());
    }

    #[test]
    fn unknown_categories_are_kept_after_known_ones() {
        let members = vec![
            member(1, "Paige", "Little Bride", None),
            member(2, "Kirsten", "Flower Girls", None),
        ];
        let sections = build_sections(&members);
        assert_eq!(sections[0].title.as_deref(), Some("Flower Girls"));
        assert_eq!(sections[1].title.as_deref(), Some("Little Bride"));
        assert_eq!(cell_count(&sections), 2);
    }

    #[test]
    fn blank_category_defaults_to_other() {
        let members = vec![member(1, "Stray", "  ", None)];
        let groups = group_by_category(&members);
        assert_eq!(groups[0].0, "Other");
    }

    #[test]
    fn paired_sections_pad_the_short_side() {
        let members = vec![
            member(1, "Leo", "Groomsmen", None),
            member(2, "Mae", "Bridesmaids", None),
            member(3, "Ivy", "Bridesmaids", None),
        ];
        let sections = build_sections(&members);
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.left_title.as_deref(), Some("Groomsmen"));
        assert_eq!(section.right_title.as_deref(), Some("Bridesmaids"));
        assert_eq!(section.rows.len(), 2);
        assert!(section.rows[1].left.is_none());
        assert_eq!(section.rows[1].right.as_ref().unwrap().name, "Ivy");
    }

    #[test]
    fn one_sided_pair_still_renders() {
        let members = vec![member(1, "Leo", "Groomsmen", None)];
        let sections = build_sections(&members);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].left_title.as_deref(), Some("Groomsmen"));
        assert_eq!(cell_count(&sections), 1);
    }

    #[test]
    fn parents_list_father_before_mother() {
        let members = vec![
            member(1, "Eloida", "Parents of the Bride", Some("Mother")),
            member(2, "Jaime", "Parents of the Bride", Some("Father (Uncle)")),
            member(3, "Felicitas", "Parents of the Groom", Some("Mother")),
        ];
        let sections = build_sections(&members);
        let rows = &sections[0].rows;
        assert_eq!(rows[0].right.as_ref().unwrap().name, "Jaime");
        assert_eq!(rows[1].right.as_ref().unwrap().name, "Eloida");
        assert_eq!(rows[0].left.as_ref().unwrap().name, "Felicitas");
    }

    #[test]
    fn couple_renders_groom_left_bride_right() {
        let members = vec![
            member(1, "Hazel", "The Couple", Some("The Bride")),
            member(2, "Jonarelh", "The Couple", Some("The Groom")),
        ];
        let sections = build_sections(&members);
        let row = &sections[0].rows[0];
        assert_eq!(row.left.as_ref().unwrap().name, "Jonarelh");
        assert_eq!(row.right.as_ref().unwrap().name, "Hazel");
    }

    #[test]
    fn untitled_couple_members_still_surface() {
        let members = vec![
            member(1, "Jonarelh", "The Couple", Some("The Groom")),
            member(2, "Mystery", "The Couple", None),
        ];
        let sections = build_sections(&members);
        assert_eq!(cell_count(&sections), 2);
    }

    #[test]
    fn single_sections_flow_two_per_row() {
        let members = vec![
            member(1, "Kirsten", "Flower Girls", None),
            member(2, "Blake", "Flower Girls", None),
            member(3, "Reign", "Flower Girls", None),
        ];
        let sections = build_sections(&members);
        assert_eq!(sections[0].rows.len(), 2);
        assert!(sections[0].rows[1].right.is_none());
    }

    #[test]
    fn display_order_follows_known_list() {
        let members = vec![
            member(1, "Reign", "Flower Girls", None),
            member(2, "Red", "Best Man", None),
            member(3, "Romela", "Candle Sponsors", None),
        ];
        let sections = build_sections(&members);
        let titles: Vec<_> = sections
            .iter()
            .map(|s| {
                s.title
                    .as_deref()
                    .or(s.left_title.as_deref())
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(titles, ["Best Man", "Candle Sponsors", "Flower Girls"]);
    }

    #[test]
    fn sponsor_pairs_drop_blank_rows() {
        let rows = vec![
            PrincipalSponsor {
                id: 1,
                male_sponsor: Some("Mr. Jony Balao".to_string()),
                female_sponsor: Some("Mrs. Conception Balao".to_string()),
            },
            PrincipalSponsor {
                id: 2,
                male_sponsor: None,
                female_sponsor: Some("Mrs. Carina C. Watanabe".to_string()),
            },
            PrincipalSponsor {
                id: 3,
                male_sponsor: Some("  ".to_string()),
                female_sponsor: None,
            },
        ];
        let pairs = sponsor_pairs(&rows);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].male, "Mr. Jony Balao");
        assert_eq!(pairs[1].male, "");
        assert_eq!(pairs[1].female, "Mrs. Carina C. Watanabe");
    }
}
