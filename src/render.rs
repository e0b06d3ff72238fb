//! Canvas drawing for one frame. Reads the session, never mutates it.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use crate::game::{ITEM_RADIUS, ItemKind, Session};

const BACKGROUND: &str = "#0b1026";
const BASKET_COLOR: &str = "brown";
const STAR_COLOR: &str = "yellow";
const DANGER_COLOR: &str = "#ff4d4d";
const TEXT_COLOR: &str = "white";
const HUD_FONT: &str = "20px sans-serif";

pub(crate) fn draw_frame<S, R>(ctx: &CanvasRenderingContext2d, session: &Session<S, R>) {
    let rules = session.rules();
    let (w, h) = (rules.field_width, rules.field_height);

    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);

    let basket = session.basket();
    ctx.set_fill_style_str(BASKET_COLOR);
    ctx.fill_rect(basket.x, basket.y, basket.width, basket.height);

    for item in session.items() {
        match item.kind {
            ItemKind::Star => draw_star(ctx, item.x, item.y, 5, ITEM_RADIUS, ITEM_RADIUS / 2.0),
            ItemKind::Danger => draw_danger(ctx, item.x, item.y),
        }
    }

    draw_hud(ctx, session);

    if session.is_over() {
        draw_game_over(ctx, session);
    } else if session.is_paused() {
        shade(ctx, w, h);
        ctx.set_fill_style_str(TEXT_COLOR);
        ctx.set_font("40px sans-serif");
        ctx.set_text_align("center");
        ctx.fill_text("Paused", w / 2.0, h / 2.0).ok();
        ctx.set_font(HUD_FONT);
        ctx.fill_text("Press P to resume", w / 2.0, h / 2.0 + 30.0).ok();
    }
}

fn draw_hud<S, R>(ctx: &CanvasRenderingContext2d, session: &Session<S, R>) {
    let w = session.rules().field_width;
    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_font(HUD_FONT);
    ctx.set_text_align("left");
    ctx.fill_text(&format!("Score: {}", session.score()), 10.0, 30.0)
        .ok();
    ctx.fill_text(
        &format!("High Score: {}", session.high_score()),
        w - 160.0,
        30.0,
    )
    .ok();
    let time = match session.remaining() {
        Some(secs) => format!("Time: {secs}"),
        None => "Time: ∞".to_string(),
    };
    ctx.fill_text(&time, w / 2.0 - 40.0, 30.0).ok();
    if session.rules().dangers {
        ctx.fill_text(
            &format!("Hits: {}/{}", session.hits(), session.rules().max_hits),
            10.0,
            60.0,
        )
        .ok();
    }
}

fn draw_game_over<S, R>(ctx: &CanvasRenderingContext2d, session: &Session<S, R>) {
    let rules = session.rules();
    let (cx, cy) = (rules.field_width / 2.0, rules.field_height / 2.0);
    shade(ctx, rules.field_width, rules.field_height);

    ctx.set_text_align("center");
    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_font("40px sans-serif");
    ctx.fill_text("Game Over", cx, cy).ok();
    ctx.set_font(HUD_FONT);
    let mut line_y = cy + 30.0;
    if session.is_new_record() {
        ctx.set_fill_style_str(STAR_COLOR);
        ctx.fill_text(&format!("New High Score! {}", session.high_score()), cx, line_y)
            .ok();
        ctx.set_fill_style_str(TEXT_COLOR);
        line_y += 30.0;
    }
    ctx.fill_text("Press R to play again", cx, line_y).ok();
}

fn shade(ctx: &CanvasRenderingContext2d, w: f64, h: f64) {
    ctx.set_fill_style_str("rgba(0,0,0,0.55)");
    ctx.fill_rect(0.0, 0.0, w, h);
}

/// Filled star with `spikes` points alternating between the two radii.
fn draw_star(
    ctx: &CanvasRenderingContext2d,
    cx: f64,
    cy: f64,
    spikes: u32,
    outer_r: f64,
    inner_r: f64,
) {
    let step = PI / spikes as f64;
    let mut rot = PI / 2.0 * 3.0;
    ctx.begin_path();
    ctx.move_to(cx, cy - outer_r);
    for _ in 0..spikes {
        ctx.line_to(cx + rot.cos() * outer_r, cy + rot.sin() * outer_r);
        rot += step;
        ctx.line_to(cx + rot.cos() * inner_r, cy + rot.sin() * inner_r);
        rot += step;
    }
    ctx.line_to(cx, cy - outer_r);
    ctx.close_path();
    ctx.set_fill_style_str(STAR_COLOR);
    ctx.fill();
}

fn draw_danger(ctx: &CanvasRenderingContext2d, cx: f64, cy: f64) {
    ctx.begin_path();
    ctx.arc(cx, cy, ITEM_RADIUS, 0.0, std::f64::consts::TAU).ok();
    ctx.set_fill_style_str(DANGER_COLOR);
    ctx.fill();
    // dark cross marker
    ctx.set_stroke_style_str("#330000");
    ctx.set_line_width(2.0);
    let r = ITEM_RADIUS * 0.5;
    ctx.begin_path();
    ctx.move_to(cx - r, cy - r);
    ctx.line_to(cx + r, cy + r);
    ctx.move_to(cx + r, cy - r);
    ctx.line_to(cx - r, cy + r);
    ctx.stroke();
}
