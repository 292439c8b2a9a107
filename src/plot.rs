//! SVG charts
//!
//! Two charts, both in Spotify colours: minutes played per year as bars, and
//! the yearly artist ranking as a rank-over-time scatter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::RGBAColor;
use tracing::info;

use crate::analytics::{YearTotal, YearlyRank};
use crate::error::{Error, Result};

/// File name of the minutes-by-year chart.
pub const LISTEN_TIME_FILE: &str = "listen_time_by_year.svg";

/// File name of the top-artists-by-year chart.
pub const TOP_ARTISTS_FILE: &str = "top_artists_by_year.svg";

const BACKGROUND: RGBColor = RGBColor(0x19, 0x14, 0x14);
const SPOTIFY_GREEN: RGBColor = RGBColor(0x1E, 0xD7, 0x60);
const FONT: &str = "sans-serif";
const LINE_HEIGHT: i32 = 14;

/// Render minutes played per year as a bar chart with value labels.
///
/// Returns the path of the written SVG.
pub fn listen_time_by_year(years: &[YearTotal], output_dir: &Path) -> Result<PathBuf> {
    if years.is_empty() {
        return Err(Error::plot("no listening data to plot"));
    }

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(LISTEN_TIME_FILE);
    draw_listen_time(years, &path)?;

    info!("Wrote {}", path.display());
    Ok(path)
}

fn draw_listen_time(years: &[YearTotal], path: &Path) -> Result<()> {
    let first = years.iter().map(|y| y.year).min().unwrap_or_default();
    let last = years.iter().map(|y| y.year).max().unwrap_or_default();
    let max_minutes = years
        .iter()
        .map(|y| y.total.as_minutes_f64())
        .fold(0.0, f64::max);

    let root = SVGBackend::new(path, (1280, 720)).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Minutes played by year", white_text(28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(
            (first - 1..last + 1).into_segmented(),
            0f64..(max_minutes * 1.15).max(1.0),
        )?;

    let year_label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(year) if (first..=last).contains(year) => year.to_string(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("year")
        .y_desc("Minutes played")
        .x_label_formatter(&year_label)
        .axis_style(&WHITE)
        .label_style(white_text(16))
        .axis_desc_style(white_text(16))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(SPOTIFY_GREEN.filled())
            .margin(12)
            .data(years.iter().map(|y| (y.year, y.total.as_minutes_f64()))),
    )?;

    let value_style = white_text(16).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(years.iter().map(|y| {
        Text::new(
            y.total.whole_minutes().to_string(),
            (SegmentValue::CenterOf(y.year), y.total.as_minutes_f64()),
            value_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Render the yearly artist ranking: one dot per (year, artist), rank 1 on top.
///
/// Returns the path of the written SVG.
pub fn top_artists_by_year(
    ranks: &[YearlyRank],
    limit: usize,
    output_dir: &Path,
) -> Result<PathBuf> {
    if ranks.is_empty() {
        return Err(Error::plot("no ranked artists to plot"));
    }

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(TOP_ARTISTS_FILE);
    draw_top_artists(ranks, limit, &path)?;

    info!("Wrote {}", path.display());
    Ok(path)
}

fn draw_top_artists(ranks: &[YearlyRank], limit: usize, path: &Path) -> Result<()> {
    let first = ranks.iter().map(|r| r.year).min().unwrap_or_default();
    let last = ranks.iter().map(|r| r.year).max().unwrap_or_default();
    let max_rank = ranks.iter().map(|r| r.rank).max().unwrap_or(1);
    let colors = artist_colors(ranks);

    let years_shown = usize::try_from(last - first).unwrap_or(0) + 1;
    let width = u32::try_from(years_shown.max(4) * 220).unwrap_or(u32::MAX);
    let height = max_rank.max(4) * 90 + 120;

    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Top {limit} artists since {first}"), white_text(28))
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(first - 1..last + 1, rank_y(max_rank) - 1..0)?;

    let year_label = |x: &i32| {
        if (first..=last).contains(x) {
            x.to_string()
        } else {
            String::new()
        }
    };
    let rank_label = |y: &i32| if *y < 0 { format!("#{}", -y) } else { String::new() };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(years_shown + 2)
        .y_labels(max_rank as usize + 2)
        .x_label_formatter(&year_label)
        .y_label_formatter(&rank_label)
        .axis_style(&WHITE)
        .label_style(white_text(16))
        .draw()?;

    chart.draw_series(ranks.iter().map(|r| {
        let color = colors
            .get(r.artist.as_str())
            .copied()
            .unwrap_or_else(|| WHITE.to_rgba());
        Circle::new((r.year, rank_y(r.rank)), 8, color.filled())
    }))?;

    let name_style = white_text(13).pos(Pos::new(HPos::Center, VPos::Top));
    let labels = ranks.iter().flat_map(|r| {
        let point = (r.year, rank_y(r.rank));
        wrap_name(&r.artist)
            .into_iter()
            .zip(0..)
            .map(move |(line, i)| (point, line, 12 + LINE_HEIGHT * i))
    });
    chart.draw_series(labels.map(|(point, line, dy)| {
        EmptyElement::at(point) + Text::new(line, (0, dy), name_style.clone())
    }))?;

    root.present()?;
    Ok(())
}

/// One colour per distinct artist, in order of first appearance.
fn artist_colors(ranks: &[YearlyRank]) -> HashMap<&str, RGBAColor> {
    let mut colors = HashMap::new();
    for row in ranks {
        let next = colors.len();
        colors
            .entry(row.artist.as_str())
            .or_insert_with(|| Palette99::pick(next).to_rgba());
    }
    colors
}

/// Split a multi-word name into one line per word.
fn wrap_name(name: &str) -> Vec<String> {
    let words: Vec<String> = name.split_whitespace().map(str::to_string).collect();
    if words.is_empty() {
        vec![name.to_string()]
    } else {
        words
    }
}

/// Ranks grow downwards, so rank 1 is the highest y value.
fn rank_y(rank: u32) -> i32 {
    -i32::try_from(rank).unwrap_or(i32::MAX)
}

fn white_text(size: u32) -> TextStyle<'static> {
    (FONT, size).into_font().color(&WHITE)
}
