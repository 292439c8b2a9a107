//! Display utilities for formatting statistics output.
//!
//! This module provides the terminal rendering of every text report.
//!
//! # Functions
//!
//! - [`truncate`] - Truncate strings to a maximum length with ellipsis
//! - [`make_bar`] - Create visual bar charts for relative values
//! - [`format_listening_time`] - Human-readable duration
//! - [`print_section`] / [`print_section_simple`] - Print section headers
//! - [`display_overview`] / [`display_yearly_top_artists`] / [`display_genre_counts`] - Display formatted stats

use std::time::Duration;

use crate::analytics::{ArtistStats, GenreCount, Overview, TrackStats, YearlyRank};
use crate::types::Milliseconds;

/// Truncate a string to a maximum length, adding "..." if truncated.
///
/// Counts characters rather than bytes, so multi-byte names are cut safely.
/// For `max_len < 3`, truncates without ellipsis since there's no room for "...".
///
/// # Examples
///
/// ```
/// use spotify_stats::display::truncate;
///
/// assert_eq!(truncate("hello", 10), "hello");
/// assert_eq!(truncate("hello world", 8), "hello...");
/// assert_eq!(truncate("hello", 2), "he");
/// ```
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len < 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

/// Create a visual bar for displaying relative values.
///
/// Uses Unicode block characters to create a proportional bar chart.
#[must_use]
pub fn make_bar(value: u64, max_value: u64, width: usize) -> String {
    if max_value == 0 || value == 0 {
        return " ".repeat(width);
    }
    let ratio = (value as f64 / max_value as f64).clamp(0.0, 1.0);
    let filled = (ratio * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Format a listening time like `3days 4h 12m`, dropping seconds.
#[must_use]
pub fn format_listening_time(total: Milliseconds) -> String {
    let whole_minutes = Duration::from_secs(total.whole_minutes() * 60);
    if whole_minutes.is_zero() {
        return total.to_string();
    }
    humantime::format_duration(whole_minutes).to_string()
}

/// Print a section header with equals signs.
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!("  {title}");
    println!("{}", "=".repeat(50));
}

/// Print a simple section header with dashes.
pub fn print_section_simple(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(30));
}

/// Display the overview report: totals followed by the three top lists.
pub fn display_overview(overview: &Overview, limit: usize) {
    print_section_simple("OVERVIEW");
    println!(
        "  Listening time:   {:>10} minutes ({:.1} hours)",
        overview.total.whole_minutes(),
        overview.total.as_hours_f64()
    );
    println!(
        "                    {:>10}",
        format_listening_time(overview.total)
    );
    println!("  Total plays:      {:>10}", overview.total_plays);
    println!("  Unique artists:   {:>10}", overview.unique_artists);

    print_section_simple(&format!("TOP {limit} ARTISTS (BY PLAYS)"));
    display_artists_by_plays(&overview.top_artists_by_plays);

    print_section_simple(&format!("TOP {limit} ARTISTS (BY MINUTES)"));
    display_artists_by_time(&overview.top_artists_by_time);

    print_section_simple(&format!("TOP {limit} TRACKS (BY MINUTES)"));
    display_top_tracks(&overview.top_tracks);
}

/// Display top artists by play count.
pub fn display_artists_by_plays(artists: &[ArtistStats]) {
    let max_plays = artists.first().map_or(1, |a| a.play_count.get());

    for (i, artist) in artists.iter().enumerate() {
        let bar = make_bar(artist.play_count.get(), max_plays, 20);
        println!(
            "  {:2}. {:<30} {} {:>5} plays",
            i + 1,
            truncate(&artist.artist, 30),
            bar,
            artist.play_count
        );
    }
}

/// Display top artists by listening time.
pub fn display_artists_by_time(artists: &[ArtistStats]) {
    for (i, artist) in artists.iter().enumerate() {
        println!(
            "  {:2}. {:<30} {:>7} min",
            i + 1,
            truncate(&artist.artist, 30),
            artist.total.whole_minutes()
        );
    }
}

/// Display top tracks by listening time.
pub fn display_top_tracks(tracks: &[TrackStats]) {
    for (i, track) in tracks.iter().enumerate() {
        let artist = track.artist.as_deref().unwrap_or("Unknown");
        println!(
            "  {:2}. {:<30} - {:<20} {:>6} min",
            i + 1,
            truncate(&track.title, 30),
            truncate(artist, 20),
            track.total.whole_minutes()
        );
    }
}

/// Display the per-year artist ranking, one block per year.
pub fn display_yearly_top_artists(ranks: &[YearlyRank]) {
    let mut current_year = None;
    for row in ranks {
        if current_year != Some(row.year) {
            print_section_simple(&row.year.to_string());
            current_year = Some(row.year);
        }
        println!(
            "  {:2}. {:<30} {:>7} min",
            row.rank,
            truncate(&row.artist, 30),
            row.total.whole_minutes()
        );
    }
}

/// Display the genre frequency table.
pub fn display_genre_counts(genres: &[GenreCount]) {
    let max_count = genres.first().map_or(1, |g| g.count.get());

    for (i, genre) in genres.iter().enumerate() {
        let bar = make_bar(genre.count.get(), max_count, 20);
        println!(
            "  {:2}. {:<30} {} {:>5}",
            i + 1,
            truncate(&genre.genre, 30),
            bar,
            genre.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate("日本語テスト", 5), "日本...");
    }

    #[test]
    fn test_truncate_small_max_len() {
        assert_eq!(truncate("hello", 2), "he");
        assert_eq!(truncate("hello", 0), "");
    }

    #[test]
    fn test_make_bar_full() {
        assert_eq!(make_bar(100, 100, 10), "██████████");
    }

    #[test]
    fn test_make_bar_half() {
        assert_eq!(make_bar(50, 100, 10), "█████░░░░░");
    }

    #[test]
    fn test_make_bar_zero_max() {
        assert_eq!(make_bar(50, 0, 10), "          ");
    }

    #[test]
    fn test_format_listening_time() {
        assert_eq!(format_listening_time(Milliseconds::from_mins(90)), "1h 30m");
        assert_eq!(format_listening_time(Milliseconds::new(30_000)), "30s");
        assert_eq!(
            format_listening_time(Milliseconds::new(90_500)),
            "1m"
        );
    }
}
