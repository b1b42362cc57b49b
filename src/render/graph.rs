//! Graph scene renderer
//!
//! Edge lines ramp green -> cyan -> magenta with proximity; nodes carry a
//! glow halo scaled by the same intensity; the UFO draws over everything
//! with its beam, warp rings, and charge glow.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::{palette, RenderOptions};
use crate::sim::graph::{ColorTag, GraphState, WarpPhase};

const TAU: f64 = std::f64::consts::TAU;

/// Line color ramp: green to cyan below half intensity, cyan to magenta above
fn edge_color(intensity: f32) -> (u8, u8, u8) {
    if intensity < 0.5 {
        let t = intensity * 2.0;
        (0, (160.0 + 95.0 * t) as u8, (90.0 + 165.0 * t) as u8)
    } else {
        let t = (intensity - 0.5) * 2.0;
        ((255.0 * t) as u8, (255.0 - 255.0 * t) as u8, 255)
    }
}

/// Node color ramp: dim green when isolated, cyan then magenta as neighbors
/// close in
fn node_color(intensity: f32) -> (u8, u8, u8) {
    if intensity < 0.3 {
        let t = intensity / 0.3;
        (0, (100.0 + 100.0 * t) as u8, 0)
    } else if intensity < 0.7 {
        let t = (intensity - 0.3) / 0.4;
        (0, 200, (200.0 * t) as u8)
    } else {
        let t = (intensity - 0.7) / 0.3;
        ((255.0 * t) as u8, (200.0 - 200.0 * t) as u8, 200)
    }
}

fn rgba(r: u8, g: u8, b: u8, a: f32) -> String {
    format!("rgba({r}, {g}, {b}, {a:.3})")
}

/// Draw the whole scene
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    state: &GraphState,
    opts: &RenderOptions,
) -> Result<(), JsValue> {
    let (w, h) = (state.width as f64, state.height as f64);
    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.set_fill_style(&JsValue::from_str(palette::BG));
    ctx.fill_rect(0.0, 0.0, w, h);

    draw_edges(ctx, state)?;
    draw_nodes(ctx, state, opts)?;
    if state.ufo_enabled {
        draw_ufo(ctx, state, opts)?;
    }
    Ok(())
}

fn draw_edges(ctx: &CanvasRenderingContext2d, state: &GraphState) -> Result<(), JsValue> {
    for edge in &state.edges {
        let (r, g, b) = edge_color(edge.intensity);
        let opacity = edge.intensity * 0.3;
        let gradient = ctx.create_linear_gradient(
            edge.from.x as f64,
            edge.from.y as f64,
            edge.to.x as f64,
            edge.to.y as f64,
        );
        gradient.add_color_stop(0.0, &rgba(r, g, b, opacity * 0.8))?;
        gradient.add_color_stop(
            1.0,
            &rgba(r.saturating_sub(30), g.saturating_sub(30), b.saturating_sub(30), opacity * 0.8),
        )?;
        ctx.begin_path();
        ctx.move_to(edge.from.x as f64, edge.from.y as f64);
        ctx.line_to(edge.to.x as f64, edge.to.y as f64);
        ctx.set_stroke_style(&gradient);
        ctx.set_line_width(1.0 + (edge.intensity * 2.0) as f64);
        ctx.stroke();
    }
    Ok(())
}

fn draw_nodes(
    ctx: &CanvasRenderingContext2d,
    state: &GraphState,
    opts: &RenderOptions,
) -> Result<(), JsValue> {
    for node in &state.nodes {
        let (x, y) = (node.pos.x as f64, node.pos.y as f64);
        let pulse = 0.9 + node.pulse_phase.sin() * 0.1;
        let intensity = node.glow * pulse;

        let color = match &node.rainbow {
            Some(rainbow) => {
                // Rainbow members shimmer through the hue wheel out of phase
                let hue = ((state.time * 0.4 + rainbow.hue) % 1.0) * 360.0;
                format!("hsl({hue:.0}, 100%, 60%)")
            }
            None => {
                let (r, g, b) = node_color(intensity);
                format!("rgb({r}, {g}, {b})")
            }
        };

        // Glow halo grows with proximity intensity
        if opts.glow {
            let glow_size = (5.0 + intensity * 25.0) as f64;
            let gradient = ctx.create_radial_gradient(
                x,
                y,
                node.size as f64,
                x,
                y,
                node.size as f64 + glow_size,
            )?;
            gradient.add_color_stop(0.0, &color)?;
            gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)")?;
            ctx.begin_path();
            ctx.arc(x, y, node.size as f64 + glow_size, 0.0, TAU)?;
            ctx.set_fill_style(&gradient);
            ctx.fill();
        }

        ctx.begin_path();
        ctx.arc(x, y, node.size as f64, 0.0, TAU)?;
        ctx.set_fill_style(&JsValue::from_str(&color));
        ctx.fill();

        // Fallback tint for near-isolated nodes so the two-color scheme
        // stays visible
        if node.rainbow.is_none() && intensity < 0.05 {
            let tint = match node.color {
                ColorTag::Cyan => palette::CYAN,
                ColorTag::Magenta => palette::MAGENTA,
            };
            ctx.begin_path();
            ctx.arc(x, y, (node.size * 0.6) as f64, 0.0, TAU)?;
            ctx.set_fill_style(&JsValue::from_str(tint));
            ctx.fill();
        }
    }
    Ok(())
}

fn draw_ufo(
    ctx: &CanvasRenderingContext2d,
    state: &GraphState,
    opts: &RenderOptions,
) -> Result<(), JsValue> {
    let ufo = &state.ufo;

    if let Some(warp) = &ufo.warp {
        if !opts.reduced_motion {
            draw_warp_rings(ctx, warp)?;
        }
        if warp.phase == WarpPhase::Out {
            // The sprite fades out in place during the out phase
            draw_saucer(ctx, state, 1.0 - warp.progress.min(1.0))?;
        }
        return Ok(());
    }

    draw_beam(ctx, state)?;
    draw_saucer(ctx, state, 1.0)?;

    if let Some(charge) = &ufo.charge {
        let intensity = charge.intensity();
        let (x, y) = (ufo.pos.x as f64, ufo.pos.y as f64);
        let radius = (crate::sim::graph::state::UFO_SCALE as f64) * (1.5 + intensity as f64);
        let gradient = ctx.create_radial_gradient(x, y, 2.0, x, y, radius)?;
        gradient.add_color_stop(0.0, &rgba(255, 255, 255, 0.8 * intensity))?;
        gradient.add_color_stop(0.5, &rgba(255, 0, 255, 0.4 * intensity))?;
        gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)")?;
        ctx.begin_path();
        ctx.arc(x, y, radius, 0.0, TAU)?;
        ctx.set_fill_style(&gradient);
        ctx.fill();
    }
    Ok(())
}

fn draw_saucer(
    ctx: &CanvasRenderingContext2d,
    state: &GraphState,
    alpha: f32,
) -> Result<(), JsValue> {
    use crate::sim::graph::state::UFO_SCALE;
    let ufo = &state.ufo;
    let (x, y) = (ufo.pos.x as f64, ufo.pos.y as f64);
    let scale = UFO_SCALE as f64;

    // Hull
    ctx.begin_path();
    ctx.ellipse(x, y, scale, scale * 0.36, 0.0, 0.0, TAU)?;
    ctx.set_fill_style(&JsValue::from_str(&rgba(170, 180, 200, 0.9 * alpha)));
    ctx.fill();

    // Dome
    ctx.begin_path();
    ctx.ellipse(x, y - scale * 0.25, scale * 0.45, scale * 0.4, 0.0, TAU / 2.0, TAU)?;
    ctx.set_fill_style(&JsValue::from_str(&rgba(120, 255, 240, 0.7 * alpha)));
    ctx.fill();

    // Running lights along the rim, phased off the simulation clock
    for i in 0..5 {
        let t = i as f64 / 4.0 - 0.5;
        let lx = x + t * scale * 1.5;
        let blink = ((state.time as f64 * 4.0 + i as f64).sin() + 1.0) / 2.0;
        ctx.begin_path();
        ctx.arc(lx, y + scale * 0.18, 1.6, 0.0, TAU)?;
        ctx.set_fill_style(&JsValue::from_str(&rgba(
            255,
            0,
            255,
            (0.3 + 0.7 * blink) as f32 * alpha,
        )));
        ctx.fill();
    }
    Ok(())
}

fn draw_beam(ctx: &CanvasRenderingContext2d, state: &GraphState) -> Result<(), JsValue> {
    let Some(beam) = &state.ufo.beam else {
        return Ok(());
    };
    let Some(node) = state.node(beam.target) else {
        return Ok(());
    };
    let anchor = state.ufo.anchor();
    let dist = crate::safe_dist(anchor, node.pos);
    let spread = (beam.reach / dist).clamp(0.0, 1.0);

    // Translucent cone from the anchor toward the target, widening with reach
    let tip = anchor + (node.pos - anchor) * spread;
    let half_width = 4.0 + spread * 14.0;
    let gradient = ctx.create_linear_gradient(
        anchor.x as f64,
        anchor.y as f64,
        tip.x as f64,
        tip.y as f64,
    );
    gradient.add_color_stop(0.0, "rgba(120, 255, 240, 0.55)")?;
    gradient.add_color_stop(1.0, "rgba(120, 255, 240, 0.08)")?;
    ctx.begin_path();
    ctx.move_to((anchor.x - 4.0) as f64, anchor.y as f64);
    ctx.line_to((anchor.x + 4.0) as f64, anchor.y as f64);
    ctx.line_to((tip.x + half_width) as f64, tip.y as f64);
    ctx.line_to((tip.x - half_width) as f64, tip.y as f64);
    ctx.close_path();
    ctx.set_fill_style(&gradient);
    ctx.fill();

    // Center line bows while extending and straightens as alignment eases in
    let bow = (1.0 - beam.align) * 18.0;
    let mid = (anchor + tip) / 2.0 + glam::Vec2::new(bow, 0.0);
    ctx.begin_path();
    ctx.move_to(anchor.x as f64, anchor.y as f64);
    ctx.quadratic_curve_to(mid.x as f64, mid.y as f64, tip.x as f64, tip.y as f64);
    ctx.set_stroke_style(&JsValue::from_str("rgba(255, 255, 255, 0.5)"));
    ctx.set_line_width(if beam.locked { 2.5 } else { 1.5 });
    ctx.stroke();
    Ok(())
}

fn draw_warp_rings(
    ctx: &CanvasRenderingContext2d,
    warp: &crate::sim::graph::WarpEffect,
) -> Result<(), JsValue> {
    let (center, t) = match warp.phase {
        WarpPhase::Out => (warp.from, warp.progress),
        WarpPhase::In => (warp.to, 1.0 - warp.progress),
    };
    let (x, y) = (center.x as f64, center.y as f64);
    for i in 0..3 {
        let ring_t = (t + i as f32 * 0.2).min(1.0) as f64;
        let radius = 6.0 + ring_t * 40.0;
        ctx.begin_path();
        ctx.arc(x, y, radius, 0.0, TAU)?;
        ctx.set_stroke_style(&JsValue::from_str(&rgba(
            0,
            255,
            255,
            (1.0 - ring_t as f32) * 0.6,
        )));
        ctx.set_line_width(2.0);
        ctx.stroke();
    }
    Ok(())
}
