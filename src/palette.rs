//! Per-year line colours for the plotting front-end
//!
//! Each year of the processed series gets a colour from a handful of palettes:
//! two perceptual colormaps (forward and reversed) sampled evenly over the
//! years, two fixed cycles, and a decadal scheme where every decade has its own
//! hue fading from dark to light.

use colorous::{Color, BLUES, GREENS, PLASMA, PURPLES, REDS, VIRIDIS};

const CYCLIC_8: [&str; 8] = [
    "#ffe119", "#4363d8", "#f58231", "#dcbeff", "#800000", "#000075", "#a9a9a9", "#000000",
];

const CYCLIC_17: [&str; 17] = [
    "#e6194B", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#42d4f4", "#f032e6", "#fabed4",
    "#469990", "#dcbeff", "#9A6324", "#fffac8", "#800000", "#aaffc3", "#000075", "#a9a9a9",
    "#000000",
];

/// Anchors of the yellow-orange Wistia map at 0, 0.25, 0.5, 0.75 and 1
const WISTIA: [(u8, u8, u8); 5] = [
    (228, 255, 122),
    (255, 232, 26),
    (255, 189, 0),
    (255, 160, 0),
    (252, 127, 0),
];

/// Upper end of the decadal sampling; only the dark half of each map is used
const DECADE_SPAN: f64 = 0.5;

/// Colours of one year, as `#rrggbb` strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearColours {
    pub year: i32,
    pub viridis: String,
    pub viridis_r: String,
    pub plasma: String,
    pub plasma_r: String,
    pub cyclic_8: String,
    pub cyclic_17: String,
    /// Empty for years outside 1970-2029
    pub decadal: Option<String>,
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn wistia(t: f64) -> Color {
    let scaled = t.clamp(0.0, 1.0) * (WISTIA.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(WISTIA.len() - 2);
    let frac = scaled - lower as f64;
    let (r0, g0, b0) = WISTIA[lower];
    let (r1, g1, b1) = WISTIA[lower + 1];
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
    Color {
        r: mix(r0, r1),
        g: mix(g0, g1),
        b: mix(b0, b1),
    }
}

/// Reversed decade map sampled at `t`; `None` outside the mapped decades
fn decade_colour(year: i32, t: f64) -> Option<Color> {
    let gradient = match year.div_euclid(10) * 10 {
        1970 | 1980 => PURPLES,
        1990 => BLUES,
        2000 => GREENS,
        2010 => REDS,
        2020 => return Some(wistia(1.0 - t)),
        _ => return None,
    };
    Some(gradient.eval_continuous(1.0 - t))
}

/// Year `k` of a decade takes sample `k` of ten evenly spaced points in `[0, 0.5]`
fn decadal(year: i32) -> Option<String> {
    let t = f64::from(year.rem_euclid(10)) * DECADE_SPAN / 9.0;
    decade_colour(year, t).map(hex)
}

/// Colours for `years`, in the order given.
///
/// The colormaps are sampled at evenly spaced points from 0 to 1 over the
/// list; the cycles restart from their first colour once exhausted.
pub fn year_palette(years: &[i32]) -> Vec<YearColours> {
    let last = years.len().saturating_sub(1).max(1) as f64;
    years
        .iter()
        .enumerate()
        .map(|(i, &year)| {
            let t = i as f64 / last;
            YearColours {
                year,
                viridis: hex(VIRIDIS.eval_continuous(t)),
                viridis_r: hex(VIRIDIS.eval_continuous(1.0 - t)),
                plasma: hex(PLASMA.eval_continuous(t)),
                plasma_r: hex(PLASMA.eval_continuous(1.0 - t)),
                cyclic_8: CYCLIC_8[i % CYCLIC_8.len()].to_string(),
                cyclic_17: CYCLIC_17[i % CYCLIC_17.len()].to_string(),
                decadal: decadal(year),
            }
        })
        .collect()
}
