//! HTML pages
//!
//! Every string that originates from the model or the form goes through
//! `escape_html` before it reaches the page, including attribute values.

use axum::http::StatusCode;

use crate::core::constants::APP_NAME;
use crate::domain::itinerary::{MealPick, PlanView, Recommendation, TravelInstruction};
use crate::utils::string::{escape_html, truncate_preview};

const NODE_RADIUS: i32 = 22;
const NODE_OFFSET_Y: i32 = 50;
const LABEL_MAX_CHARS: usize = 22;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header><a href="/" class="brand">{app}</a></header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
        app = APP_NAME,
    )
}

fn flash_block(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape_html(m)))
        .collect();
    format!(r#"<ul class="flashes">{items}</ul>"#)
}

fn link(href: &str, label: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
        escape_html(href),
        escape_html(label)
    )
}

/// The trip request form. `debug` carries `?debug=1` through to the plan page.
pub fn index_page(messages: &[String], debug: bool) -> String {
    let action = if debug { "/plan?debug=1" } else { "/plan" };
    let body = format!(
        r#"{flashes}
<h1>Plan a trip</h1>
<form method="post" action="{action}" class="plan-form">
<label>Destination <input name="destination" required placeholder="Kyoto, Japan"></label>
<label>Preferences <input name="preferences" placeholder="temples, street food"></label>
<label>Days <input name="days" inputmode="numeric" placeholder="3"></label>
<label>Budget <input name="budget" placeholder="moderate"></label>
<label>Starting point <input name="origin" placeholder="hotel or lat,lon (optional)"></label>
<button type="submit">Generate itinerary</button>
</form>"#,
        flashes = flash_block(messages),
    );
    page(&format!("{APP_NAME} - plan a trip"), &body)
}

/// Minimal page for request failures on browser-facing routes
pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<h1>{}</h1>
<p>{}</p>
<p><a href="/">Back to the form</a></p>"#,
        status,
        escape_html(message)
    );
    page(&format!("{APP_NAME} - error"), &body)
}

fn recommendation_item(rec: &Recommendation) -> String {
    let mut out = format!(
        "<li><strong>{}</strong>",
        escape_html(rec.name.as_deref().unwrap_or("Unnamed"))
    );
    if let Some(rating) = rec.rating {
        out.push_str(&format!(r#" <span class="rating">★ {rating:.1}</span>"#));
    }
    if let Some(price) = &rec.price_level {
        out.push_str(&format!(r#" <span class="price">{}</span>"#, escape_html(price)));
    }
    if let Some(distance) = rec.distance_m {
        out.push_str(&format!(r#" <span class="distance">{distance:.0} m</span>"#));
    }
    if let Some(reason) = &rec.reason {
        out.push_str(&format!("<br><small>{}</small>", escape_html(reason)));
    }
    out.push_str("</li>");
    out
}

fn meal_item(meal: &MealPick) -> String {
    let mut out = format!(
        "<li><strong>{}</strong> <small>near {}</small>",
        escape_html(meal.name.as_deref().unwrap_or("Unnamed")),
        escape_html(&meal.visit_location)
    );
    if let Some(rating) = meal.rating {
        out.push_str(&format!(r#" <span class="rating">★ {rating:.1}</span>"#));
    }
    if let Some(price) = &meal.price_level {
        out.push_str(&format!(r#" <span class="price">{}</span>"#, escape_html(price)));
    }
    if let Some(reason) = &meal.reason {
        out.push_str(&format!("<br><small>{}</small>", escape_html(reason)));
    }
    out.push_str("</li>");
    out
}

fn instruction_item(leg: &TravelInstruction) -> String {
    let mut out = String::from("<li>");
    if !leg.from.is_empty() || !leg.to.is_empty() {
        out.push_str(&format!(
            "<strong>{} → {}</strong> ",
            escape_html(&leg.from),
            escape_html(&leg.to)
        ));
    }
    let details: Vec<String> = [&leg.transport, &leg.approx_time]
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(|s| escape_html(s))
        .collect();
    if !details.is_empty() {
        out.push_str(&format!("<span>{}</span> ", details.join(" · ")));
    }
    if !leg.notes.is_empty() {
        out.push_str(&format!("<br><small>{}</small>", escape_html(&leg.notes)));
    }
    if let Some(href) = &leg.map_link {
        out.push_str(&format!(" {}", link(href, "directions")));
    }
    out.push_str("</li>");
    out
}

/// Grid roadmap of the visit order, drawn from the precomputed node positions
fn roadmap_svg(view: &PlanView) -> String {
    let grid = view.grid;
    let mut out = format!(
        r#"<svg class="roadmap" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img" aria-label="Visit order">"#,
        w = grid.width,
        h = grid.height
    );

    for pair in view.visit_nodes.windows(2) {
        out.push_str(&format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="edge"/>"#,
            pair[0].x,
            pair[0].y + NODE_OFFSET_Y,
            pair[1].x,
            pair[1].y + NODE_OFFSET_Y
        ));
    }

    for node in &view.visit_nodes {
        let cy = node.y + NODE_OFFSET_Y;
        out.push_str(&format!(
            r#"<g class="node"><title>{title}</title><circle cx="{x}" cy="{cy}" r="{r}"/><text x="{x}" y="{ty}" class="order">{order}</text><text x="{x}" y="{ly}" class="label">{label}</text></g>"#,
            title = escape_html(&node.location_name),
            x = node.x,
            r = NODE_RADIUS,
            ty = cy + 5,
            order = node.order,
            ly = cy + NODE_RADIUS + 18,
            label = escape_html(&truncate_preview(&node.location_name, LABEL_MAX_CHARS)),
        ));
    }

    out.push_str("</svg>");
    out
}

fn itinerary_section(view: &PlanView) -> String {
    let mut out = String::from(r#"<section class="itinerary"><h2>Itinerary</h2>"#);
    for day in &view.itinerary {
        out.push_str(&format!(
            r#"<article class="day"><h3>Day {}</h3><p>{}</p>"#,
            day.day_number,
            escape_html(&day.summary)
        ));
        if !day.activities.is_empty() {
            out.push_str("<ul>");
            for activity in &day.activities {
                out.push_str(&format!("<li>{}</li>", escape_html(activity)));
            }
            out.push_str("</ul>");
        }
        if let Some(cost) = day.approximate_cost {
            out.push_str(&format!(r#"<p class="cost">Approx. cost: {cost}</p>"#));
        }
        if let Some(meals) = view.daily_meals.iter().find(|m| m.day_number as i64 == day.day_number)
            && !meals.meals.is_empty()
        {
            out.push_str("<h4>Where to eat</h4><ul>");
            for meal in &meals.meals {
                out.push_str(&meal_item(meal));
            }
            out.push_str("</ul>");
        }
        out.push_str("</article>");
    }
    out.push_str("</section>");
    out
}

fn visits_section(view: &PlanView) -> String {
    if view.visit_nodes.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<section class="visits"><h2>Route</h2>"#);
    out.push_str(&roadmap_svg(view));
    out.push_str("<ol>");
    for node in &view.visit_nodes {
        out.push_str(&format!(
            "<li><strong>{}</strong>",
            escape_html(&node.location_name)
        ));
        let details: Vec<String> = [&node.suggested_time, &node.estimated_duration]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| escape_html(s))
            .collect();
        if !details.is_empty() {
            out.push_str(&format!(" <span>{}</span>", details.join(" · ")));
        }
        if !node.note.is_empty() {
            out.push_str(&format!("<br><small>{}</small>", escape_html(&node.note)));
        }
        out.push_str("</li>");
    }
    out.push_str("</ol>");

    if !view.legs.is_empty() {
        out.push_str(r#"<h3>Leg estimates</h3><ul class="legs">"#);
        for leg in &view.legs {
            out.push_str(&format!(
                "<li>{} → {}: {:.1} km, about {} min</li>",
                escape_html(&leg.from),
                escape_html(&leg.to),
                leg.distance_km,
                leg.minutes
            ));
        }
        out.push_str("</ul>");
    }
    out.push_str("</section>");
    out
}

fn list_section(title: &str, class: &str, items: &[Recommendation]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let list: String = items.iter().map(recommendation_item).collect();
    format!(r#"<section class="{class}"><h2>{title}</h2><ul>{list}</ul></section>"#)
}

fn maps_section(view: &PlanView) -> String {
    let links = &view.links;
    let mut out = String::from(r#"<section class="maps"><h2>Maps</h2><p>"#);
    let anchors: Vec<String> = [
        (links.maps_search_link.as_deref(), "Open in Google Maps"),
        (links.maps_directions_link.as_deref(), "Full route"),
        (links.maps_link.as_deref(), "Directions"),
    ]
    .into_iter()
    .filter_map(|(href, label)| href.map(|h| link(h, label)))
    .collect();
    out.push_str(&anchors.join(" | "));
    out.push_str("</p>");
    if let Some(src) = &links.maps_iframe_src {
        out.push_str(&format!(
            r#"<iframe class="map" src="{}&output=embed" loading="lazy" title="Map"></iframe>"#,
            escape_html(src)
        ));
    }
    if !view.travel_instructions.is_empty() {
        out.push_str("<h3>Getting around</h3><ul>");
        for leg in &view.travel_instructions {
            out.push_str(&instruction_item(leg));
        }
        out.push_str("</ul>");
    }
    out.push_str("</section>");
    out
}

fn debug_section(view: &PlanView) -> String {
    let parsed = serde_json::to_string_pretty(&view.parsed).unwrap_or_default();
    format!(
        r#"<section class="debug"><h2>Raw model output</h2><pre>{}</pre><h2>Parsed JSON</h2><pre>{}</pre></section>"#,
        escape_html(&view.raw_response),
        escape_html(&parsed)
    )
}

/// The generated plan
pub fn result_page(view: &PlanView, messages: &[String], show_debug: bool) -> String {
    let request = &view.request;
    let mut summary = vec![format!("{} day(s)", view.days_n)];
    for (label, value) in [
        ("Budget", &request.budget),
        ("Preferences", &request.preferences),
        ("From", &request.origin),
    ] {
        if !value.is_empty() {
            summary.push(format!("{label}: {}", escape_html(value)));
        }
    }

    let mut body = flash_block(messages);
    body.push_str(&format!(
        r#"<h1>{}</h1><p class="summary">{}</p>"#,
        escape_html(&view.destination_name),
        summary.join(" · ")
    ));
    body.push_str(&itinerary_section(view));
    body.push_str(&visits_section(view));
    body.push_str(&list_section(
        "Popular dinner spots",
        "dinners",
        &view.popular_dinner_recommendations,
    ));
    body.push_str(&list_section("Where to stay", "stays", &view.popular_stays));
    body.push_str(&maps_section(view));
    if show_debug {
        body.push_str(&debug_section(view));
    }
    body.push_str(r#"<p><a href="/">Plan another trip</a></p>"#);

    page(
        &format!("{APP_NAME} - {}", view.destination_name),
        &body,
    )
}
