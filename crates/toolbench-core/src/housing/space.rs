//! Family space needs projection.
//!
//! Straight-line: a fixed area per adult plus a per-child area that grows
//! once the child reaches [`GROWN_AGE`]. Planned children arrive in one lump.

use serde::{Deserialize, Serialize};

use super::{HousingInput, MAX_TERM_YEARS};

/// Square metres per adult.
pub const AREA_PER_ADULT: f64 = 20.0;
/// Square metres per child younger than [`GROWN_AGE`].
pub const AREA_PER_YOUNG_CHILD: f64 = 10.0;
/// Square metres per grown child.
pub const AREA_PER_GROWN_CHILD: f64 = 15.0;
/// Age at which a child needs the larger area.
pub const GROWN_AGE: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceNeed {
    pub year: u32,
    pub family_size: u32,
    pub young_children: u32,
    pub grown_children: u32,
    /// Square metres
    pub required_area: f64,
}

/// Project family size and required floor area for years `0..=horizon`.
pub fn project_space_needs(input: &HousingInput) -> Vec<SpaceNeed> {
    (0..=input.horizon_years.min(MAX_TERM_YEARS))
        .map(|year| {
            let mut young: u32 = 0;
            let mut grown: u32 = 0;
            let mut count = |children: u32, age: u32| {
                if age >= GROWN_AGE {
                    grown = grown.saturating_add(children);
                } else {
                    young = young.saturating_add(children);
                }
            };
            count(input.children, input.children_age.saturating_add(year));
            if input.planned_children > 0 && year >= input.planned_children_year {
                count(input.planned_children, year - input.planned_children_year);
            }

            let required_area = f64::from(input.adults) * AREA_PER_ADULT
                + f64::from(young) * AREA_PER_YOUNG_CHILD
                + f64::from(grown) * AREA_PER_GROWN_CHILD;

            SpaceNeed {
                year,
                family_size: input.adults.saturating_add(young).saturating_add(grown),
                young_children: young,
                grown_children: grown,
                required_area,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn couple_without_children_is_flat() {
        let input = HousingInput {
            horizon_years: 3,
            ..HousingInput::default()
        };
        let needs = project_space_needs(&input);
        assert_eq!(needs.len(), 4);
        assert!(needs.iter().all(|n| n.family_size == 2 && n.required_area == 40.0));
    }

    #[test]
    fn planned_children_arrive_in_one_lump() {
        let input = HousingInput {
            planned_children: 2,
            planned_children_year: 3,
            horizon_years: 5,
            ..HousingInput::default()
        };
        let needs = project_space_needs(&input);
        assert_eq!(needs[2].family_size, 2);
        assert_eq!(needs[3].family_size, 4);
        assert_eq!(needs[3].young_children, 2);
        assert_eq!(needs[3].required_area, 60.0);
    }

    #[test]
    fn children_grow_into_larger_rooms() {
        let input = HousingInput {
            adults: 1,
            children: 1,
            children_age: 10,
            horizon_years: 4,
            ..HousingInput::default()
        };
        let needs = project_space_needs(&input);
        assert_eq!(needs[1].required_area, 30.0);
        assert_eq!(needs[2].grown_children, 1);
        assert_eq!(needs[2].required_area, 35.0);
    }

    #[test]
    fn extreme_counts_saturate() {
        let input = HousingInput {
            adults: u32::MAX,
            children: u32::MAX,
            children_age: u32::MAX,
            planned_children: u32::MAX,
            planned_children_year: 0,
            horizon_years: u32::MAX,
            ..HousingInput::default()
        };
        let needs = project_space_needs(&input);
        assert_eq!(needs.len(), MAX_TERM_YEARS as usize + 1);
        assert_eq!(needs[1].family_size, u32::MAX);
        assert_eq!(needs[1].grown_children, u32::MAX);
    }
}
