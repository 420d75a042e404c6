//! Colormaps for heatmaps and summary matrices.

use dxai_analysis::KeywordStatus;

fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

fn to_u8(x: f32) -> u8 {
    (clamp01(x) * 255.0).round() as u8
}

/// Jet colormap: blue at 0, green in the middle, red at 1.
pub fn jet(x: f32) -> [u8; 3] {
    let x = clamp01(x);
    let r = 1.5 - (4.0 * x - 3.0).abs();
    let g = 1.5 - (4.0 * x - 2.0).abs();
    let b = 1.5 - (4.0 * x - 1.0).abs();
    [to_u8(r), to_u8(g), to_u8(b)]
}

const YL_GN_BU: [[u8; 3]; 9] = [
    [0xff, 0xff, 0xd9],
    [0xed, 0xf8, 0xb1],
    [0xc7, 0xe9, 0xb4],
    [0x7f, 0xcd, 0xbb],
    [0x41, 0xb6, 0xc4],
    [0x1d, 0x91, 0xc0],
    [0x22, 0x5e, 0xa8],
    [0x25, 0x34, 0x94],
    [0x08, 0x1d, 0x58],
];

/// Yellow-green-blue sequential colormap.
pub fn yl_gn_bu(x: f32) -> [u8; 3] {
    let pos = clamp01(x) * (YL_GN_BU.len() - 1) as f32;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(YL_GN_BU.len() - 1);
    let t = pos - lo as f32;

    let mut out = [0u8; 3];
    for (c, o) in out.iter_mut().enumerate() {
        let a = f32::from(YL_GN_BU[lo][c]);
        let b = f32::from(YL_GN_BU[hi][c]);
        *o = (a + (b - a) * t).round() as u8;
    }
    out
}

/// Cell colour for a keyword status.
pub fn status_color(status: KeywordStatus) -> &'static str {
    match status {
        KeywordStatus::NotApplicable => "#E0E0E0",
        KeywordStatus::Omission => "#FFC107",
        KeywordStatus::Mentioned => "#4CAF50",
    }
}

/// `#rrggbb` for an RGB triple.
pub fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Black or white text, whichever reads better on `rgb`.
pub fn text_color(rgb: [u8; 3]) -> &'static str {
    let luminance =
        0.299 * f32::from(rgb[0]) + 0.587 * f32::from(rgb[1]) + 0.114 * f32::from(rgb[2]);
    if luminance > 140.0 {
        "black"
    } else {
        "white"
    }
}
