//! Month grid and statistics views over a [`ContentCalendar`].

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use super::{ContentCalendar, Platform, PostStatus, WeekStart};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for leading and trailing days of the neighbouring months
    pub in_month: bool,
    pub post_count: usize,
}

/// Weeks of a month, each exactly seven cells starting on the configured
/// week start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub week_start: WeekStart,
    pub weeks: Vec<Vec<DayCell>>,
}

impl MonthGrid {
    /// Column headers in display order.
    pub fn weekday_labels(&self) -> [&'static str; 7] {
        match self.week_start {
            WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        }
    }

    pub fn total_posts(&self) -> usize {
        self.weeks
            .iter()
            .flatten()
            .filter(|cell| cell.in_month)
            .map(|cell| cell.post_count)
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalendarStats {
    pub total: usize,
    pub by_platform: BTreeMap<Platform, usize>,
    pub by_status: BTreeMap<PostStatus, usize>,
    /// Posts dated today or later that are not yet published
    pub upcoming: usize,
}

impl ContentCalendar {
    /// Grid for `month` of `year` with a post count per day.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] for a month outside 1..=12
    /// or a month whose grid runs past the dates chrono can represent.
    pub fn month_grid(&self, year: i32, month: u32) -> Result<MonthGrid, ValidationError> {
        let out_of_range = || ValidationError::invalid("month", format!("{year}-{month}"));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
        let week_start = self.settings.week_start;
        let lead = match week_start {
            WeekStart::Monday => first.weekday().num_days_from_monday(),
            WeekStart::Sunday => first.weekday().num_days_from_sunday(),
        };
        let mut day = first
            .checked_sub_days(Days::new(u64::from(lead)))
            .ok_or_else(out_of_range)?;

        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for post in &self.posts {
            *counts.entry(post.date).or_default() += 1;
        }

        let mut weeks = Vec::new();
        loop {
            let mut week = Vec::with_capacity(7);
            for _ in 0..7 {
                week.push(DayCell {
                    date: day,
                    in_month: day.month() == month && day.year() == year,
                    post_count: counts.get(&day).copied().unwrap_or(0),
                });
                // the grid must end on a real day after the month
                day = day.succ_opt().ok_or_else(out_of_range)?;
            }
            weeks.push(week);
            if day.month() != month || day.year() != year {
                break;
            }
        }

        Ok(MonthGrid {
            year,
            month,
            week_start,
            weeks,
        })
    }

    /// Post counts by platform and status. Platforms and statuses with no
    /// posts are omitted.
    pub fn stats(&self, today: NaiveDate) -> CalendarStats {
        let mut stats = CalendarStats {
            total: self.posts.len(),
            ..CalendarStats::default()
        };
        for post in &self.posts {
            *stats.by_platform.entry(post.platform).or_default() += 1;
            *stats.by_status.entry(post.status).or_default() += 1;
            if post.date >= today && post.status != PostStatus::Published {
                stats.upcoming += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::NewPost;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grid_rows_are_full_weeks() {
        let calendar = ContentCalendar::new();
        // May 2024 starts on a Wednesday and ends on a Friday
        let grid = calendar.month_grid(2024, 5).unwrap();
        assert_eq!(grid.weeks.len(), 5);
        assert!(grid.weeks.iter().all(|w| w.len() == 7));
        assert_eq!(grid.weeks[0][0].date, date(2024, 4, 29));
        assert!(!grid.weeks[0][0].in_month);
        assert_eq!(grid.weeks[0][2].date, date(2024, 5, 1));
        assert_eq!(grid.weeks[4][6].date, date(2024, 6, 2));
    }

    #[test]
    fn months_at_the_date_limits_are_rejected() {
        let calendar = ContentCalendar::new();
        let last = NaiveDate::MAX;
        assert!(matches!(
            calendar.month_grid(last.year(), last.month()),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert!(calendar.month_grid(last.year() + 1, 1).is_err());
        assert!(calendar.month_grid(2024, 13).is_err());
    }

    #[test]
    fn grid_respects_sunday_week_start() {
        let mut calendar = ContentCalendar::new();
        calendar.settings.week_start = WeekStart::Sunday;
        let grid = calendar.month_grid(2024, 9).unwrap();
        // September 2024 starts on a Sunday
        assert_eq!(grid.weeks[0][0].date, date(2024, 9, 1));
        assert_eq!(grid.weekday_labels()[0], "Sun");
        assert_eq!(grid.weeks.len(), 5);
    }

    #[test]
    fn grid_counts_posts_per_day() {
        let mut calendar = ContentCalendar::new();
        for title in ["a", "b"] {
            calendar
                .add(NewPost {
                    title: title.into(),
                    date: Some(date(2024, 5, 10)),
                    ..NewPost::default()
                })
                .unwrap();
        }
        let grid = calendar.month_grid(2024, 5).unwrap();
        let cell = grid
            .weeks
            .iter()
            .flatten()
            .find(|c| c.date == date(2024, 5, 10))
            .unwrap();
        assert_eq!(cell.post_count, 2);
        assert_eq!(grid.total_posts(), 2);
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(ContentCalendar::new().month_grid(2024, 13).is_err());
    }

    #[test]
    fn stats_group_by_platform_and_status() {
        let mut calendar = ContentCalendar::new();
        calendar
            .add(NewPost {
                title: "a".into(),
                date: Some(date(2024, 5, 1)),
                platform: Some(Platform::Blog),
                status: PostStatus::Published,
                ..NewPost::default()
            })
            .unwrap();
        calendar
            .add(NewPost {
                title: "b".into(),
                date: Some(date(2024, 6, 1)),
                platform: Some(Platform::Blog),
                ..NewPost::default()
            })
            .unwrap();
        let stats = calendar.stats(date(2024, 5, 15));
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_platform[&Platform::Blog], 2);
        assert_eq!(stats.by_status[&PostStatus::Draft], 1);
        assert_eq!(stats.upcoming, 1);
        assert!(!stats.by_platform.contains_key(&Platform::Twitter));
    }
}
