//! Flappy Node renderer
//!
//! Neon backdrop, glowing pipes and player, particle burst, HUD score line,
//! and the Ready/GameOver overlays.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::palette;
use crate::sim::flappy::{FlappyState, GamePhase};

const TAU: f64 = std::f64::consts::TAU;

/// Draw the whole scene
pub fn draw(ctx: &CanvasRenderingContext2d, state: &FlappyState) -> Result<(), JsValue> {
    let (w, h) = (state.width as f64, state.height as f64);
    ctx.set_fill_style(&JsValue::from_str(palette::BG));
    ctx.fill_rect(0.0, 0.0, w, h);

    draw_backdrop(ctx, state)?;
    draw_pipes(ctx, state);
    if state.phase == GamePhase::Exploding || state.phase == GamePhase::GameOver {
        draw_particles(ctx, state)?;
    } else {
        draw_player(ctx, state)?;
    }
    draw_hud(ctx, state)?;

    match state.phase {
        GamePhase::Ready => draw_center_prompt(ctx, state, "Flappy Node", "Space or tap to start")?,
        GamePhase::GameOver => {
            draw_center_prompt(ctx, state, "Game Over", "Space to retry or Esc to exit")?
        }
        _ => {}
    }
    Ok(())
}

fn draw_backdrop(ctx: &CanvasRenderingContext2d, state: &FlappyState) -> Result<(), JsValue> {
    ctx.set_line_width(1.0);
    for edge in &state.backdrop_edges {
        ctx.begin_path();
        ctx.move_to(edge.from.x as f64, edge.from.y as f64);
        ctx.line_to(edge.to.x as f64, edge.to.y as f64);
        ctx.set_stroke_style(&JsValue::from_str(&format!(
            "rgba(0, 200, 255, {:.3})",
            edge.opacity
        )));
        ctx.stroke();
    }

    for node in &state.backdrop {
        let color = if node.cyan {
            palette::CYAN
        } else {
            palette::MAGENTA
        };
        ctx.begin_path();
        ctx.arc(node.pos.x as f64, node.pos.y as f64, node.size as f64, 0.0, TAU)?;
        ctx.set_fill_style(&JsValue::from_str(color));
        ctx.set_shadow_color(color);
        ctx.set_shadow_blur(8.0);
        ctx.fill();
        ctx.set_shadow_blur(0.0);
    }
    Ok(())
}

fn draw_pipes(ctx: &CanvasRenderingContext2d, state: &FlappyState) {
    let h = state.height as f64;
    for pipe in &state.pipes {
        ctx.set_fill_style(&JsValue::from_str(palette::CYAN));
        ctx.set_shadow_color(palette::CYAN);
        ctx.set_shadow_blur(10.0);
        // Upper bar
        ctx.fill_rect(pipe.x as f64, 0.0, pipe.width as f64, pipe.gap_y as f64);
        // Lower bar
        let bottom_y = (pipe.gap_y + pipe.gap_h) as f64;
        ctx.fill_rect(pipe.x as f64, bottom_y, pipe.width as f64, h - bottom_y);
        ctx.set_shadow_blur(0.0);
    }
}

fn draw_player(ctx: &CanvasRenderingContext2d, state: &FlappyState) -> Result<(), JsValue> {
    let p = &state.player;
    ctx.begin_path();
    ctx.arc(p.pos.x as f64, p.pos.y as f64, p.radius as f64, 0.0, TAU)?;
    ctx.set_fill_style(&JsValue::from_str(palette::MAGENTA));
    ctx.set_shadow_color(palette::MAGENTA);
    ctx.set_shadow_blur(15.0);
    ctx.fill();
    ctx.set_shadow_blur(0.0);
    Ok(())
}

fn draw_particles(ctx: &CanvasRenderingContext2d, state: &FlappyState) -> Result<(), JsValue> {
    for particle in &state.particles {
        let fade = 1.0 - (particle.age / particle.lifetime).clamp(0.0, 1.0);
        ctx.begin_path();
        ctx.arc(
            particle.pos.x as f64,
            particle.pos.y as f64,
            (particle.size * fade).max(0.3) as f64,
            0.0,
            TAU,
        )?;
        ctx.set_fill_style(&JsValue::from_str(&format!(
            "rgba(255, 0, 255, {:.3})",
            fade
        )));
        ctx.fill();
    }
    Ok(())
}

fn draw_hud(ctx: &CanvasRenderingContext2d, state: &FlappyState) -> Result<(), JsValue> {
    ctx.set_fill_style(&JsValue::from_str(palette::TEXT));
    ctx.set_font(palette::HUD_FONT);
    ctx.set_text_align("left");
    ctx.fill_text(&format!("Score: {}", state.score), 16.0, 28.0)?;
    ctx.set_text_align("right");
    ctx.fill_text(
        &format!("Best: {}", state.best_score),
        state.width as f64 - 16.0,
        28.0,
    )?;
    Ok(())
}

fn draw_center_prompt(
    ctx: &CanvasRenderingContext2d,
    state: &FlappyState,
    title: &str,
    prompt: &str,
) -> Result<(), JsValue> {
    let (w, h) = (state.width as f64, state.height as f64);
    ctx.set_fill_style(&JsValue::from_str("rgba(0, 0, 0, 0.5)"));
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.set_fill_style(&JsValue::from_str("#fff"));
    ctx.set_text_align("center");
    ctx.set_font(palette::OVERLAY_FONT);
    ctx.fill_text(title, w / 2.0, h / 2.0 - 10.0)?;
    ctx.set_font(palette::PROMPT_FONT);
    ctx.fill_text(prompt, w / 2.0, h / 2.0 + 20.0)?;
    Ok(())
}
