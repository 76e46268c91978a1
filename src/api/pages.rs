//! Server-rendered HTML for the prediction form and its result.

use std::fmt::Write;

use crate::error::AppError;
use crate::input::{bounds, VehicleForm};
use crate::predictor::PredictionOutcome;
use crate::types::{Currency, FuelType};

pub fn form_page(form: &VehicleForm) -> String {
    layout(&render_form(form))
}

pub fn result_page(form: &VehicleForm, outcome: &PredictionOutcome) -> String {
    let mut body = render_form(form);
    for w in &outcome.warnings {
        let _ = write!(body, r#"<p class="warning">⚠️ {}</p>"#, escape(&w.to_string()));
    }
    let _ = write!(body, r#"<p class="success">✅ {}</p>"#, escape(&outcome.headline));
    if let Some(note) = &outcome.exchange_rate_note {
        let _ = write!(body, "<p>💱 {}</p>", escape(note));
    }
    body.push_str("<h3>📋 Prediction Result</h3><table>");
    for (label, value) in outcome.echo.rows() {
        let _ = write!(body, "<tr><th>{label}</th><td>{}</td></tr>", escape(value));
    }
    body.push_str("</table>");
    layout(&body)
}

pub fn failure_page(form: &VehicleForm, err: &AppError) -> String {
    let mut body = render_form(form);
    let _ = write!(
        body,
        r#"<p class="error">❌ Prediction failed: {}</p>"#,
        escape(&err.to_string())
    );
    layout(&body)
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Car Price Prediction</title></head>
<body>
<h1 style="text-align:center">CARS PREDICTION</h1>
<h5 style="text-align:center"><em>Estimate car prices based on technical specifications</em></h5>
<hr>
{body}
</body></html>"#
    )
}

fn render_form(form: &VehicleForm) -> String {
    let mut out = String::from(r#"<form method="post" action="/predict">"#);
    text_input(&mut out, "company_names", "Company Name", &form.company_names);
    text_input(&mut out, "cars_names", "Car Model", &form.cars_names);
    text_input(&mut out, "engines", "Engine Type", &form.engines);
    number_input(&mut out, "horsepower", "Horsepower (hp)", &form.horsepower, "1");
    number_input(&mut out, "total_speed", "Top Speed (km/h)", &form.total_speed, "1");
    number_input(
        &mut out,
        "performance0__100_km_h",
        "0-100 km/h Performance (sec)",
        &form.performance_0_100_km_h,
        "0.1",
    );
    select(
        &mut out,
        "fuel_types",
        "Fuel Type",
        FuelType::all().iter().map(|f| f.as_str()),
        &form.fuel_types,
    );
    number_input(&mut out, "seats", "Number of Seats", &form.seats, "1");
    number_input(&mut out, "torque", "Torque (Nm)", &form.torque, "1");
    number_input(&mut out, "engine_cc", "Engine CC (0 if electric)", &form.engine_cc, "0.1");
    number_input(
        &mut out,
        "battery_capacity_kwh",
        "Battery Capacity (kWh, 0 if not electric)",
        &form.battery_capacity_kwh,
        "0.1",
    );
    select(
        &mut out,
        "currency",
        "Currency Output",
        Currency::all().iter().map(|c| c.code()),
        &form.currency,
    );
    number_input(
        &mut out,
        "exchange_rate",
        "Exchange Rate (1 USD to selected currency)",
        &form.exchange_rate,
        "any",
    );
    out.push_str(r#"<button type="submit">🔍 Predict</button></form>"#);
    out
}

fn text_input(out: &mut String, name: &str, label: &str, value: &str) {
    let _ = write!(
        out,
        r#"<label>{label} <input type="text" name="{name}" value="{}"></label><br>"#,
        escape(value)
    );
}

fn number_input(out: &mut String, name: &str, label: &str, value: &str, step: &str) {
    let range = bounds(name)
        .map(|(lo, hi)| format!(r#" min="{lo}" max="{hi}""#))
        .unwrap_or_default();
    let _ = write!(
        out,
        r#"<label>{label} <input type="number" name="{name}" step="{step}"{range} value="{}"></label><br>"#,
        escape(value)
    );
}

fn select<'a>(
    out: &mut String,
    name: &str,
    label: &str,
    options: impl Iterator<Item = &'a str>,
    selected: &str,
) {
    let _ = write!(out, r#"<label>{label} <select name="{name}">"#);
    for opt in options {
        let sel = if opt == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{opt}"{sel}>{opt}</option>"#);
    }
    out.push_str("</select></label><br>");
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
