//! Loader spinner renderer

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::palette;
use crate::sim::loader::LoaderScene;

const TAU: f64 = std::f64::consts::TAU;

pub fn draw(ctx: &CanvasRenderingContext2d, scene: &LoaderScene) -> Result<(), JsValue> {
    let size = scene.size as f64;
    ctx.clear_rect(0.0, 0.0, size, size);
    ctx.set_fill_style(&JsValue::from_str(palette::BG));
    ctx.fill_rect(0.0, 0.0, size, size);

    let (cx, cy) = (scene.center.x as f64, scene.center.y as f64);

    // Arms
    for branch in &scene.branches {
        if branch.length <= 1.0 {
            continue;
        }
        let gradient =
            ctx.create_linear_gradient(cx, cy, branch.tip.x as f64, branch.tip.y as f64);
        gradient.add_color_stop(0.0, "rgba(0, 255, 255, 0.6)")?;
        gradient.add_color_stop(
            1.0,
            if branch.cyan {
                "rgba(0, 255, 255, 0.8)"
            } else {
                "rgba(255, 0, 255, 0.8)"
            },
        )?;
        ctx.begin_path();
        ctx.move_to(cx, cy);
        ctx.line_to(branch.tip.x as f64, branch.tip.y as f64);
        ctx.set_stroke_style(&gradient);
        ctx.set_line_width((size * 0.003).max(2.0));
        ctx.stroke();
    }

    // Tip nodes
    for branch in &scene.branches {
        if branch.length <= 1.0 {
            continue;
        }
        let level = (255.0 * branch.color_intensity) as u8;
        let color = if branch.cyan {
            format!("rgb(0, {level}, {level})")
        } else {
            format!("rgb({level}, 0, {level})")
        };
        draw_node(
            ctx,
            branch.tip.x as f64,
            branch.tip.y as f64,
            branch.tip_radius as f64,
            &color,
            false,
        )?;
    }

    // Center node with the breathing pulse
    let level = (255.0 * scene.center_intensity) as u8;
    let color = format!("rgb(0, {level}, {level})");
    draw_node(
        ctx,
        cx,
        cy,
        scene.pulsed_center_radius() as f64,
        &color,
        true,
    )?;
    Ok(())
}

fn draw_node(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    radius: f64,
    color: &str,
    is_center: bool,
) -> Result<(), JsValue> {
    // Outer glow
    let gradient = ctx.create_radial_gradient(x, y, 0.0, x, y, radius * 2.0)?;
    gradient.add_color_stop(0.0, color)?;
    gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)")?;
    ctx.begin_path();
    ctx.arc(x, y, radius * 2.0, 0.0, TAU)?;
    ctx.set_fill_style(&gradient);
    ctx.fill();

    // Core
    ctx.begin_path();
    ctx.arc(x, y, radius, 0.0, TAU)?;
    ctx.set_fill_style(&JsValue::from_str(color));
    ctx.fill();

    // Inner highlight
    if is_center {
        ctx.begin_path();
        ctx.arc(x - radius * 0.3, y - radius * 0.3, radius * 0.4, 0.0, TAU)?;
        ctx.set_fill_style(&JsValue::from_str("rgba(255, 255, 255, 0.6)"));
        ctx.fill();
    }
    Ok(())
}
