//! Scroll geometry for subsection backgrounds.
//!
//! Every function here is a pure projection of one element rect and the
//! viewport height. Nothing is remembered between calls, so a tick can be
//! recomputed at any time and in any order across subsections.

use backdrop_protocol::{ElementRect, LayerStyle, SubsectionId};

/// Height of the fixed page header. The content band (where backgrounds are
/// shown) starts here.
pub const CONTENT_TOP_PX: f64 = 64.0;

/// Progress at which an entering layer has fully slid into place.
pub const ENTER_END: f64 = 0.12;

/// Progress at which a leaving layer starts sliding out upward.
pub const LEAVE_START: f64 = 0.88;

/// Opacity of a fully visible layer.
pub const OPACITY_MAX: f64 = 0.5;

/// Scroll progress of a section through the viewport.
///
/// `0` when the section's top edge sits on the viewport's bottom edge, `1`
/// when its bottom edge sits on the viewport's top edge. A non-positive
/// scroll range yields `0`.
pub fn section_progress(rect: &ElementRect, vh: f64) -> f64 {
    let range = vh + rect.height;
    if range <= 0.0 {
        return 0.0;
    }
    ((vh - rect.top) / range).clamp(0.0, 1.0)
}

/// Whether the section overlaps the content band `[CONTENT_TOP_PX, vh)`.
pub fn section_overlaps_content(rect: &ElementRect, vh: f64) -> bool {
    rect.bottom > CONTENT_TOP_PX && rect.top < vh
}

/// Vertical offset of a layer, in percent of its height.
///
/// `100` parks the layer below the viewport, `0` puts it in place and `-100`
/// parks it above. Between those, the layer slides in over the first
/// [`ENTER_END`] of progress and out over the last `1 - LEAVE_START`.
pub fn progress_to_y_percent(p: f64, rect: &ElementRect, vh: f64) -> f64 {
    if let Some(y) = parked_or_in_place(rect, vh) {
        return y;
    }
    if p <= ENTER_END {
        return 100.0 - (p / ENTER_END) * 100.0;
    }
    if p >= LEAVE_START {
        return leave_offset(p);
    }
    0.0
}

/// Hero variant of [`progress_to_y_percent`]: no slide-in, only slide-out.
pub fn about_progress_to_y_percent(p: f64, rect: &ElementRect, vh: f64) -> f64 {
    if let Some(y) = parked_or_in_place(rect, vh) {
        return y;
    }
    if p >= LEAVE_START {
        return leave_offset(p);
    }
    0.0
}

/// Progress distance covered by half a viewport height of scrolling.
pub fn progress_delta_for_half_vh(rect: &ElementRect, vh: f64) -> f64 {
    let range = vh + rect.height;
    if range <= 0.0 {
        return 0.0;
    }
    (0.5 * vh) / range
}

/// Layer opacity in `[0, OPACITY_MAX]`.
///
/// Fades in over the half viewport of scroll that ends at [`ENTER_END`] and
/// fades out over the half viewport that starts at [`LEAVE_START`].
pub fn section_opacity(p: f64, rect: &ElementRect, vh: f64) -> f64 {
    let half_vh = progress_delta_for_half_vh(rect, vh);
    let enter_fade_end = ENTER_END;
    let enter_fade_start = (enter_fade_end - half_vh).max(0.0);
    let leave_fade_start = LEAVE_START;
    let leave_fade_end = (leave_fade_start + half_vh).min(1.0);

    if p <= enter_fade_start {
        return 0.0;
    }
    if p < enter_fade_end {
        return OPACITY_MAX * (p - enter_fade_start) / (enter_fade_end - enter_fade_start);
    }
    if p <= leave_fade_start {
        return OPACITY_MAX;
    }
    if p < leave_fade_end {
        return OPACITY_MAX * (1.0 - (p - leave_fade_start) / (leave_fade_end - leave_fade_start));
    }
    0.0
}

/// Full style of a subsection's layer for the given rect.
///
/// The hero subsection uses [`about_progress_to_y_percent`]; the others use
/// [`progress_to_y_percent`].
pub fn layer_style(id: SubsectionId, rect: &ElementRect, vh: f64) -> LayerStyle {
    let p = section_progress(rect, vh);
    let y_percent = if id.is_hero() {
        about_progress_to_y_percent(p, rect, vh)
    } else {
        progress_to_y_percent(p, rect, vh)
    };
    LayerStyle::new(y_percent, section_opacity(p, rect, vh))
}

fn parked_or_in_place(rect: &ElementRect, vh: f64) -> Option<f64> {
    if rect.bottom <= CONTENT_TOP_PX {
        Some(-100.0)
    } else if rect.top >= vh {
        Some(100.0)
    } else if section_overlaps_content(rect, vh) {
        Some(0.0)
    } else {
        None
    }
}

fn leave_offset(p: f64) -> f64 {
    ((p - LEAVE_START) / (1.0 - LEAVE_START)) * -100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_protocol::StackLevel;

    const VH: f64 = 800.0;

    fn rect(top: f64, bottom: f64) -> ElementRect {
        ElementRect::new(top, bottom)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn progress_is_zero_for_degenerate_range() {
        assert_eq!(section_progress(&rect(100.0, 150.0), -200.0), 0.0);
        assert_eq!(section_progress(&rect(0.0, 0.0), 0.0), 0.0);
    }

    #[test]
    fn progress_spans_entry_to_exit() {
        assert_eq!(section_progress(&rect(800.0, 1000.0), VH), 0.0);
        assert_eq!(section_progress(&rect(-200.0, 0.0), VH), 1.0);
        assert!(approx(section_progress(&rect(400.0, 600.0), VH), 0.4));
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(section_progress(&rect(-500.0, -400.0), VH), 1.0);
        assert_eq!(section_progress(&rect(900.0, 1000.0), VH), 0.0);
        for top in [-5000.0, -800.0, -1.0, 0.0, 300.0, 799.0, 5000.0] {
            let p = section_progress(&ElementRect::from_top(top, 350.0), VH);
            assert!((0.0..=1.0).contains(&p), "top={top} p={p}");
        }
    }

    #[test]
    fn progress_boundaries_hold_for_any_height() {
        for h in [1.0, 250.0, 800.0, 4000.0] {
            for vh in [320.0, 800.0, 1440.0] {
                assert_eq!(section_progress(&ElementRect::from_top(vh, h), vh), 0.0);
                assert_eq!(section_progress(&rect(-h, 0.0), vh), 1.0);
            }
        }
    }

    #[test]
    fn overlap_respects_header_band() {
        assert!(!section_overlaps_content(&rect(0.0, 50.0), VH));
        assert!(!section_overlaps_content(&rect(0.0, 64.0), VH));
        assert!(!section_overlaps_content(&rect(900.0, 1000.0), VH));
        assert!(!section_overlaps_content(&rect(800.0, 1000.0), VH));
        assert!(section_overlaps_content(&rect(100.0, 400.0), VH));
        assert!(section_overlaps_content(&rect(0.0, 65.0), VH));
    }

    #[test]
    fn y_percent_short_circuits_ignore_progress() {
        for p in [0.0, ENTER_END, 0.5, LEAVE_START, 1.0] {
            assert_eq!(progress_to_y_percent(p, &rect(0.0, 50.0), VH), -100.0);
            assert_eq!(progress_to_y_percent(p, &rect(-200.0, 64.0), VH), -100.0);
            assert_eq!(progress_to_y_percent(p, &rect(900.0, 1000.0), VH), 100.0);
            assert_eq!(progress_to_y_percent(p, &rect(800.0, 1000.0), VH), 100.0);
            assert_eq!(progress_to_y_percent(p, &rect(100.0, 400.0), VH), 0.0);
        }
    }

    #[test]
    fn hero_y_percent_short_circuits_match_standard() {
        assert_eq!(about_progress_to_y_percent(0.5, &rect(0.0, 50.0), VH), -100.0);
        assert_eq!(about_progress_to_y_percent(0.5, &rect(900.0, 1000.0), VH), 100.0);
        assert_eq!(about_progress_to_y_percent(0.5, &rect(100.0, 400.0), VH), 0.0);
        assert_eq!(about_progress_to_y_percent(1.0, &rect(-200.0, 0.0), VH), -100.0);
    }

    #[test]
    fn hero_never_slides_in() {
        for i in 0..=100 {
            let p = f64::from(i) / 100.0 * LEAVE_START;
            if p >= LEAVE_START {
                continue;
            }
            let y = about_progress_to_y_percent(p, &rect(100.0, 400.0), VH);
            assert!(y <= 0.0, "p={p} y={y}");
        }
    }

    #[test]
    fn opacity_endpoints_and_plateau() {
        assert_eq!(section_opacity(0.0, &rect(800.0, 1000.0), VH), 0.0);
        assert_eq!(section_opacity(0.5, &rect(100.0, 400.0), VH), OPACITY_MAX);
        assert_eq!(section_opacity(1.0, &rect(-200.0, 0.0), VH), 0.0);

        // Tall section: fade zones are narrow, plateau covers [ENTER_END, LEAVE_START].
        let tall = ElementRect::from_top(0.0, 20_000.0);
        for p in [ENTER_END, 0.3, 0.5, 0.7, LEAVE_START] {
            assert_eq!(section_opacity(p, &tall, VH), OPACITY_MAX, "p={p}");
        }
    }

    #[test]
    fn opacity_ramps_during_enter_fade() {
        let r = rect(750.0, 950.0);
        let opacity = section_opacity(ENTER_END / 2.0, &r, VH);
        assert!(opacity > 0.0);
        assert!(opacity <= OPACITY_MAX);
        assert!(approx(opacity, 0.25));
    }

    #[test]
    fn opacity_is_bounded_and_monotonic_per_zone() {
        let tall = ElementRect::from_top(0.0, 20_000.0);
        let half = progress_delta_for_half_vh(&tall, VH);
        let enter_start = ENTER_END - half;
        let leave_end = LEAVE_START + half;

        let samples: Vec<(f64, f64)> = (0..=1000)
            .map(|i| {
                let p = f64::from(i) / 1000.0;
                (p, section_opacity(p, &tall, VH))
            })
            .collect();

        for &(p, o) in &samples {
            assert!((0.0..=OPACITY_MAX).contains(&o), "p={p} o={o}");
        }
        for pair in samples.windows(2) {
            let (p0, o0) = pair[0];
            let (p1, o1) = pair[1];
            if p1 <= ENTER_END {
                assert!(o1 >= o0, "rising zone broke at p={p0}");
            } else if p0 >= LEAVE_START {
                assert!(o1 <= o0, "falling zone broke at p={p0}");
            }
            // Ramps are linear in p; adjacent samples never jump.
            assert!((o1 - o0).abs() <= OPACITY_MAX * (p1 - p0) / half + 1e-9);
        }
        assert_eq!(section_opacity(enter_start, &tall, VH), 0.0);
        assert_eq!(section_opacity(leave_end, &tall, VH), 0.0);
    }

    #[test]
    fn half_vh_delta() {
        assert_eq!(progress_delta_for_half_vh(&rect(100.0, 150.0), -200.0), 0.0);
        let delta = progress_delta_for_half_vh(&rect(0.0, 400.0), VH);
        assert!(delta > 0.0 && delta < 1.0);
        assert!(approx(delta, 400.0 / 1200.0));
    }

    #[test]
    fn scenario_section_below_viewport() {
        let r = ElementRect {
            top: 800.0,
            bottom: 1200.0,
            height: 400.0,
        };
        let p = section_progress(&r, VH);
        assert_eq!(p, 0.0);
        assert_eq!(progress_to_y_percent(p, &r, VH), 100.0);
    }

    #[test]
    fn scenario_section_in_content_band() {
        let r = rect(100.0, 400.0);
        let style = layer_style(SubsectionId::Posts, &r, VH);
        assert_eq!(style.y_percent, 0.0);
        assert_eq!(style.opacity, OPACITY_MAX);
        assert_eq!(style.stack, StackLevel::InView);
    }

    #[test]
    fn scenario_section_above_content_band() {
        let r = rect(-200.0, 0.0);
        let p = section_progress(&r, VH);
        assert_eq!(p, 1.0);
        let style = layer_style(SubsectionId::Gigs, &r, VH);
        assert_eq!(style.y_percent, -100.0);
        assert_eq!(style.opacity, 0.0);
        assert_eq!(style.stack, StackLevel::Parked);
    }

    #[test]
    fn measured_rects_always_short_circuit() {
        // A measured rect is either above the band, below it, or overlapping it,
        // so hero and standard variants agree on every real measurement.
        for top in (-2000..=1200).step_by(50) {
            let r = ElementRect::from_top(f64::from(top), 600.0);
            let p = section_progress(&r, VH);
            let hero = about_progress_to_y_percent(p, &r, VH);
            let other = progress_to_y_percent(p, &r, VH);
            assert_eq!(hero, other, "top={top}");
            assert!(hero == -100.0 || hero == 0.0 || hero == 100.0, "top={top}");
        }
    }

    #[test]
    fn unmeasurable_rect_falls_back_to_progress_zones() {
        // NaN edges fail every band comparison, leaving only the progress zones.
        let r = ElementRect::from_top(f64::NAN, 400.0);
        assert!(approx(progress_to_y_percent(ENTER_END / 2.0, &r, VH), 50.0));
        assert!(approx(progress_to_y_percent(0.5, &r, VH), 0.0));
        assert!(approx(progress_to_y_percent(0.94, &r, VH), -50.0));
        assert_eq!(progress_to_y_percent(1.0, &r, VH), -100.0);

        assert_eq!(about_progress_to_y_percent(ENTER_END / 2.0, &r, VH), 0.0);
        assert!(approx(about_progress_to_y_percent(0.94, &r, VH), -50.0));
    }
}
