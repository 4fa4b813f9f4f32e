//! Content calendar commands for CLI.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, NaiveTime};
use clap::Subcommand;
use toolbench_core::calendar::{
    ContentCalendar, MonthGrid, NewPost, Platform, Post, PostPatch, PostStatus, WeekStart,
};
use toolbench_core::{JsonStore, ToolKey};

use super::{
    export_state, import_state, parse_date, parse_time, print_json, split_list, today, CliResult,
    ImportModeArg,
};

fn parse_platform(raw: &str) -> Result<Platform, String> {
    Platform::parse(raw).ok_or_else(|| format!("unknown platform '{raw}'"))
}

fn parse_status(raw: &str) -> Result<PostStatus, String> {
    PostStatus::parse(raw).ok_or_else(|| format!("unknown status '{raw}'"))
}

fn parse_week_start(raw: &str) -> Result<WeekStart, String> {
    WeekStart::parse(raw).ok_or_else(|| format!("unknown week start '{raw}'"))
}

/// `YYYY-MM`.
fn parse_month(raw: &str) -> Result<(i32, u32), String> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map(|d| (d.year(), d.month()))
        .map_err(|_| format!("invalid month '{raw}', expected YYYY-MM"))
}

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Schedule a post
    Add {
        /// Post title
        title: String,
        /// Publication date (YYYY-MM-DD, today, tomorrow)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// Publication time (HH:MM)
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// Platform; defaults to the calendar setting
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
        /// Post body
        #[arg(long, default_value = "")]
        content: String,
        /// draft, scheduled or published
        #[arg(long, value_parser = parse_status, default_value = "draft")]
        status: PostStatus,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List posts
    List {
        /// Only posts on this day
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Only posts in this month (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
        #[arg(long)]
        json: bool,
    },
    /// Show one post
    Get {
        /// Post ID or unique prefix
        id: String,
    },
    /// Change a post
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_time, conflicts_with = "clear_time")]
        time: Option<NaiveTime>,
        /// Remove the publication time
        #[arg(long)]
        clear_time: bool,
        #[arg(long, value_parser = parse_status)]
        status: Option<PostStatus>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a post
    Delete { id: String },
    /// Month grid with post counts
    Month {
        /// YYYY-MM; defaults to the current month
        #[arg(value_parser = parse_month)]
        month: Option<(i32, u32)>,
        #[arg(long)]
        json: bool,
    },
    /// Post counts by platform and status
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Show or change calendar settings
    Settings {
        /// monday or sunday
        #[arg(long, value_parser = parse_week_start)]
        week_start: Option<WeekStart>,
        #[arg(long, value_parser = parse_platform)]
        default_platform: Option<Platform>,
    },
    /// Export posts and settings to a file
    Export { path: PathBuf },
    /// Import posts from a file
    Import {
        path: PathBuf,
        #[arg(long, value_enum, default_value = "merge")]
        mode: ImportModeArg,
    },
}

fn print_post_line(post: &Post) {
    let time = post
        .time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());
    println!(
        "{}  {} {}  {} {:<10} {:<9} {}",
        post.id.get(..8).unwrap_or(post.id.as_str()),
        post.date,
        time,
        post.platform.icon(),
        post.platform.label(),
        post.status.label(),
        post.title
    );
}

fn print_grid(grid: &MonthGrid) {
    println!("{:04}-{:02}", grid.year, grid.month);
    println!(
        "{}",
        grid.weekday_labels()
            .iter()
            .map(|l| format!("{l:>6}"))
            .collect::<String>()
    );
    for week in &grid.weeks {
        let row: String = week
            .iter()
            .map(|cell| match (cell.in_month, cell.post_count) {
                (false, _) => format!("{:>6}", ""),
                (true, 0) => format!("{:>6}", cell.date.day()),
                (true, n) => format!("{:>3}({n})", cell.date.day()),
            })
            .collect();
        println!("{row}");
    }
}

pub fn run(action: CalendarAction) -> CliResult {
    let store: JsonStore<ContentCalendar> = JsonStore::open(ToolKey::Calendar)?;
    let mut calendar = store.load()?;

    match action {
        CalendarAction::Add {
            title,
            date,
            time,
            platform,
            content,
            status,
            tags,
        } => {
            let post = calendar.add(NewPost {
                title,
                content,
                platform,
                date: Some(date),
                time,
                status,
                tags: tags.as_deref().map(split_list).unwrap_or_default(),
            })?;
            println!("Post created: {}", post.id);
            store.save(&calendar)?;
        }
        CalendarAction::List { date, month, json } => {
            let posts = match (date, month) {
                (Some(day), _) => calendar.posts_on(day),
                (None, Some((year, month))) => calendar.posts_in_month(year, month),
                (None, None) => calendar.sorted_posts(),
            };
            if json {
                print_json(&posts)?;
            } else if posts.is_empty() {
                println!("no posts");
            } else {
                posts.into_iter().for_each(print_post_line);
            }
        }
        CalendarAction::Get { id } => match calendar.get(&id) {
            Some(post) => print_json(post)?,
            None => return Err(format!("post not found: {id}").into()),
        },
        CalendarAction::Update {
            id,
            title,
            content,
            platform,
            date,
            time,
            clear_time,
            status,
            tags,
        } => {
            let patch = PostPatch {
                title,
                content,
                platform,
                date,
                time: if clear_time { Some(None) } else { time.map(Some) },
                status,
                tags: tags.as_deref().map(split_list),
            };
            let post = calendar.update(&id, patch)?;
            println!("Post updated: {}", post.id);
            store.save(&calendar)?;
        }
        CalendarAction::Delete { id } => {
            let post = calendar.delete(&id)?;
            println!("Post deleted: {}", post.id);
            store.save(&calendar)?;
        }
        CalendarAction::Month { month, json } => {
            let now = today();
            let (year, month) = month.unwrap_or((now.year(), now.month()));
            let grid = calendar.month_grid(year, month)?;
            if json {
                print_json(&grid)?;
            } else {
                print_grid(&grid);
            }
        }
        CalendarAction::Stats { json } => {
            let stats = calendar.stats(today());
            if json {
                print_json(&stats)?;
            } else {
                println!("Total: {}  Upcoming: {}", stats.total, stats.upcoming);
                for (platform, count) in &stats.by_platform {
                    println!("  {} {:<12} {count}", platform.icon(), platform.label());
                }
                for (status, count) in &stats.by_status {
                    println!("  {:<14} {count}", status.label());
                }
            }
        }
        CalendarAction::Settings {
            week_start,
            default_platform,
        } => {
            if let Some(week_start) = week_start {
                calendar.settings.week_start = week_start;
            }
            if let Some(platform) = default_platform {
                calendar.settings.default_platform = platform;
            }
            if week_start.is_some() || default_platform.is_some() {
                store.save(&calendar)?;
            }
            print_json(&calendar.settings)?;
        }
        CalendarAction::Export { path } => export_state::<ContentCalendar>(&path)?,
        CalendarAction::Import { path, mode } => import_state::<ContentCalendar>(&path, mode)?,
    }
    Ok(())
}
