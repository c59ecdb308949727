//! SVG output.
//!
//! [`render_svg`] writes an animated document: every timeline becomes a SMIL
//! element and hover is a CSS rule, so the viewer drives the clock.
//! [`render_still`] writes the same scene frozen at one instant, for PNG/PDF
//! export where nothing animates.
//!
//! SVG paints in document order and has no z-index, so a cell under the
//! pointer in a viewer grows and glows but does not rise above its
//! neighbours. Raising it is the host's job: call [`Scene::hover_start`] and
//! re-render, and the hovered cell is written last.

use super::connector::{ConnectorFrame, ConnectorView, STROKE_WIDTH};
use super::particle::{HOVER_SCALE, ParticleFrame, ParticleView};
use super::scene::Scene;
use super::timeline::Keyframe;
use super::types::Point;
use crate::fonts::LabelMeasure;
use crate::svg::{element_id, escape, num, sanitize_text};
use crate::theme::Theme;

const DASH_PATTERN: &str = "6,4";

/// Hover glow and scale. Hover lives on its own group so it composes with the
/// SMIL pulse on the inner groups instead of replacing it.
fn stylesheet() -> String {
    format!(
        r#"<style>
.cell-hover {{ transform-box: fill-box; transform-origin: center; transition: transform 0.2s ease-out, filter 0.2s ease-out; filter: drop-shadow(0 0 var(--glow) var(--glow-color)); }}
.cell:hover {{ cursor: pointer; }}
.cell:hover .cell-hover, .cell.is-hovered .cell-hover {{ transform: scale({scale}); filter: drop-shadow(0 0 var(--glow-hover) var(--glow-color)); }}
</style>"#,
        scale = num(HOVER_SCALE)
    )
}

fn document(scene: &Scene, theme: &Theme, head: &str, body: &str) -> String {
    let width = num(scene.width());
    let height = num(scene.height());
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
{head}<rect width="{width}" height="{height}" fill="{background}" />
{body}</svg>
"#,
        background = escape(&theme.background_color),
    )
}

/// Render a mounted scene as an animated SVG document. Rendering the same
/// scene twice yields identical text.
pub fn render_svg<M: LabelMeasure>(scene: &Scene, theme: &Theme, measure: &mut M) -> String {
    let mut body = String::new();

    body.push_str(r#"<g class="connectors">"#);
    for (index, view) in scene.connectors().iter().enumerate() {
        body.push_str(&render_connector(view, index, theme, measure));
    }
    body.push_str("</g>\n");

    body.push_str(r#"<g class="cells">"#);
    for index in scene.stacking_order() {
        body.push_str(&render_particle(&scene.particles()[index], index));
    }
    body.push_str("</g>\n");

    document(scene, theme, &stylesheet(), &body)
}

/// Render the scene frozen at `t` seconds after mount.
pub fn render_still<M: LabelMeasure>(
    scene: &Scene,
    theme: &Theme,
    measure: &mut M,
    t: f32,
) -> String {
    let Some(frame) = scene.sample(t) else {
        return document(scene, theme, "", "");
    };

    let mut defs = String::new();
    let mut body = String::new();

    body.push_str(r#"<g class="connectors">"#);
    for (index, (view, state)) in scene.connectors().iter().zip(&frame.connectors).enumerate() {
        body.push_str(&render_connector_still(view, state, index, theme, measure));
    }
    body.push_str("</g>\n");

    body.push_str(r#"<g class="cells">"#);
    for index in scene.stacking_order() {
        let view = &scene.particles()[index];
        let glow_id = format!("glow-{index}");
        defs.push_str(&format!(
            r#"<filter id="{glow_id}" x="-100%" y="-100%" width="300%" height="300%"><feDropShadow dx="0" dy="0" stdDeviation="{}" flood-color="{}" /></filter>"#,
            num(view.glow_radius() / 2.0),
            view.palette().body,
        ));
        body.push_str(&render_particle_still(view, &frame.particles[index], &glow_id));
    }
    body.push_str("</g>\n");

    document(scene, theme, &format!("<defs>{defs}</defs>\n"), &body)
}

fn particle_element_id(view: &ParticleView, index: usize) -> String {
    match &view.particle().id {
        Some(id) => element_id("cell", id),
        None => format!("cell-{index}"),
    }
}

/// One animated cell. Group nesting, outside in: base position, drift,
/// hover, fixed rotation. Inside the rotation the body pulse and the nucleus
/// pulse are siblings, so each runs on its own clock.
pub fn render_particle(view: &ParticleView, index: usize) -> String {
    let particle = view.particle();
    let palette = view.palette();
    let mut svg = String::new();

    let hovered = if view.is_hovered() { " is-hovered" } else { "" };
    svg.push_str(&format!(
        r#"<g id="{}" class="cell cell-{}{}" transform="translate({} {})">"#,
        particle_element_id(view, index),
        view.variant().name(),
        hovered,
        num(particle.position.x),
        num(particle.position.y),
    ));

    svg.push_str("<g>");
    svg.push_str(&view.drift().to_smil());

    svg.push_str(&format!(
        r#"<g class="cell-hover" style="--glow: {}px; --glow-hover: {}px; --glow-color: {}">"#,
        num(view.base_glow_radius()),
        num(view.base_glow_radius() * 2.0),
        palette.body,
    ));
    svg.push_str(&format!(r#"<g transform="rotate({})">"#, num(view.rotation())));

    svg.push_str(&format!(
        r#"<g class="body" opacity="{}">"#,
        num(particle.opacity)
    ));
    svg.push_str(&view.pulse_scale().to_smil());
    svg.push_str(&view.pulse_opacity().to_smil());
    svg.push_str(&format!(
        r#"<circle cx="0" cy="0" r="{}" fill="{}" />"#,
        num(view.radius()),
        palette.body
    ));
    svg.push_str("</g>");

    if particle.has_nucleus {
        svg.push_str(&format!(
            r#"<g class="nucleus" opacity="{}">"#,
            num(particle.opacity)
        ));
        svg.push_str(&view.nucleus_pulse().to_smil());
        svg.push_str(&format!(
            r#"<circle cx="0" cy="0" r="{}" fill="{}" />"#,
            num(view.nucleus_radius()),
            palette.nucleus
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</g></g></g></g>");
    svg
}

fn render_particle_still(view: &ParticleView, frame: &ParticleFrame, glow_id: &str) -> String {
    let palette = view.palette();
    let mut svg = format!(
        r#"<g class="cell cell-{}" transform="translate({} {}) rotate({}) scale({})" filter="url(#{})">"#,
        view.variant().name(),
        num(frame.center.x),
        num(frame.center.y),
        num(view.rotation()),
        num(view.rendered_scale()),
        glow_id,
    );
    svg.push_str(&format!(
        r#"<circle class="body" cx="0" cy="0" r="{}" fill="{}" opacity="{}" />"#,
        num(view.radius() * frame.body_scale),
        palette.body,
        num(frame.opacity),
    ));
    if view.particle().has_nucleus {
        svg.push_str(&format!(
            r#"<circle class="nucleus" cx="0" cy="0" r="{}" fill="{}" opacity="{}" />"#,
            num(view.nucleus_radius() * frame.nucleus_scale),
            palette.nucleus,
            num(view.particle().opacity),
        ));
    }
    svg.push_str("</g>");
    svg
}

fn connector_element_id(view: &ConnectorView, index: usize) -> String {
    match &view.connector().id {
        Some(id) => element_id("arrow", id),
        None => format!("arrow-{index}"),
    }
}

fn arrowhead_points(points: &[Point; 3]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", num(p.x), num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One animated connector: the line grows from `start`, then the arrowhead
/// fades in at `end`; the label fades in partway through.
pub fn render_connector<M: LabelMeasure>(
    view: &ConnectorView,
    index: usize,
    theme: &Theme,
    measure: &mut M,
) -> String {
    let connector = view.connector();
    let geometry = view.geometry();
    let color = escape(&connector.color);
    let dash = if connector.dashed {
        format!(r#" stroke-dasharray="{DASH_PATTERN}""#)
    } else {
        String::new()
    };

    let mut svg = format!(
        r#"<g id="{}" class="connector">"#,
        connector_element_id(view, index)
    );

    let growth = view.line_growth();
    svg.push_str(&format!(
        r#"<g transform="translate({} {}) rotate({})"><g transform="scale({})">{}<line x1="0" y1="0" x2="{}" y2="0" stroke="{}" stroke-width="{}"{} /></g></g>"#,
        num(geometry.start.x),
        num(geometry.start.y),
        num(geometry.angle_degrees()),
        growth.initial().map_or_else(|| "1 1".to_string(), |p| p.smil()),
        growth.to_smil(),
        num(geometry.length),
        color,
        num(STROKE_WIDTH),
        dash,
    ));

    if let Some(points) = geometry.arrowhead() {
        svg.push_str(&format!(
            r#"<polygon class="arrowhead" points="{}" fill="{}" opacity="0">{}</polygon>"#,
            arrowhead_points(&points),
            color,
            view.arrowhead_fade().to_smil(),
        ));
    }

    if let Some(label) = view.label() {
        svg.push_str(r#"<g class="connector-label" opacity="0">"#);
        svg.push_str(&view.label_fade().to_smil());
        svg.push_str(&render_label(label, geometry.label_anchor, theme, measure));
        svg.push_str("</g>");
    }

    svg.push_str("</g>");
    svg
}

fn render_connector_still<M: LabelMeasure>(
    view: &ConnectorView,
    frame: &ConnectorFrame,
    index: usize,
    theme: &Theme,
    measure: &mut M,
) -> String {
    let connector = view.connector();
    let geometry = view.geometry();
    let color = escape(&connector.color);
    let dash = if connector.dashed {
        format!(r#" stroke-dasharray="{DASH_PATTERN}""#)
    } else {
        String::new()
    };

    let mut svg = format!(
        r#"<g id="{}" class="connector">"#,
        connector_element_id(view, index)
    );
    svg.push_str(&format!(
        r#"<g transform="translate({} {}) rotate({})"><line x1="0" y1="0" x2="{}" y2="0" stroke="{}" stroke-width="{}"{} /></g>"#,
        num(geometry.start.x),
        num(geometry.start.y),
        num(geometry.angle_degrees()),
        num(geometry.length * frame.extent),
        color,
        num(STROKE_WIDTH),
        dash,
    ));

    if let Some(points) = geometry.arrowhead() {
        if frame.arrowhead_opacity > 0.0 {
            svg.push_str(&format!(
                r#"<polygon class="arrowhead" points="{}" fill="{}" opacity="{}" />"#,
                arrowhead_points(&points),
                color,
                num(frame.arrowhead_opacity),
            ));
        }
    }

    if let Some(label) = view.label() {
        if frame.label_opacity > 0.0 {
            svg.push_str(&format!(
                r#"<g class="connector-label" opacity="{}">"#,
                num(frame.label_opacity)
            ));
            svg.push_str(&render_label(label, geometry.label_anchor, theme, measure));
            svg.push_str("</g>");
        }
    }

    svg.push_str("</g>");
    svg
}

/// Label text centered above its anchor, with an optional backdrop sized to
/// the measured text.
fn render_label<M: LabelMeasure>(
    label: &str,
    anchor: Point,
    theme: &Theme,
    measure: &mut M,
) -> String {
    let x = anchor.x;
    let y = anchor.y - theme.label_offset;
    let mut svg = String::new();

    if theme.has_label_backdrop() {
        let monospace = theme.label_font_family.contains("mono");
        let (width, height) =
            measure.measure_label(&sanitize_text(label), theme.label_font_size, monospace);
        let pad = theme.label_padding;
        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" />"#,
            num(x - width / 2.0 - pad),
            num(y - height / 2.0 - pad / 2.0),
            num(width + pad * 2.0),
            num(height + pad),
            num(pad),
            escape(&theme.label_backdrop_color),
        ));
    }

    svg.push_str(&format!(
        r#"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
        num(x),
        num(y),
        escape(&theme.label_font_family),
        num(theme.label_font_size),
        escape(&theme.label_color),
        escape(label),
    ));
    svg
}

#[cfg(test)]
mod tests {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    use super::*;
    use crate::diagram::types::{Connector, LabelPosition, Particle, Variant};
    use crate::fonts::ApproxMeasure;

    fn scene() -> Scene {
        Scene::mount(
            400.0,
            300.0,
            &[
                Particle::new(Variant::Tumor, (100.0, 100.0)).with_id("tumor core"),
                Particle::new(Variant::Immune, (250.0, 120.0)).without_nucleus(),
            ],
            &[
                Connector::new((100.0, 100.0), (250.0, 120.0))
                    .with_label("kill <rate>", LabelPosition::Middle)
                    .dashed(),
                Connector::new((10.0, 10.0), (10.0, 10.0)).with_label("self", LabelPosition::End),
            ],
            Some(11),
        )
    }

    fn assert_well_formed(svg: &str) {
        let mut reader = Reader::from_str(svg);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed SVG at {}: {e}", reader.buffer_position()),
            }
        }
    }

    #[test]
    fn animated_document_is_well_formed_and_stable() {
        let scene = scene();
        let theme = Theme::default();
        let first = render_svg(&scene, &theme, &mut ApproxMeasure::default());
        let second = render_svg(&scene, &theme, &mut ApproxMeasure::default());
        assert_eq!(first, second);
        assert_well_formed(&first);
        assert!(first.contains(r#"id="cell-tumor_core""#));
        assert!(first.contains("kill &lt;rate&gt;"));
        assert!(first.contains(r#"stroke-dasharray="6,4""#));
        assert!(first.contains("repeatCount=\"indefinite\""));
    }

    #[test]
    fn particle_carries_its_timelines() {
        let scene = scene();
        let view = &scene.particles()[0];
        let svg = render_particle(view, 0);
        assert!(svg.contains(r#"type="translate" values="0 0;15 10;0 0""#));
        assert!(svg.contains(r#"type="scale" values="1;1.15;1""#));
        assert!(svg.contains(r#"type="scale" values="1;1.1;1""#));
        assert!(svg.contains(r#"dur="3s" begin="0.5s""#));
        assert!(svg.contains(&format!("rotate({})", num(view.rotation()))));
        assert!(svg.contains("--glow: 10px; --glow-hover: 20px"));
    }

    #[test]
    fn nucleus_pulse_is_not_nested_in_body_pulse() {
        let scene = scene();
        let svg = render_particle(&scene.particles()[0], 0);
        let body = svg.find(r#"<g class="body""#).unwrap();
        let nucleus = svg.find(r#"<g class="nucleus""#).unwrap();
        // The body group closes before the nucleus group opens.
        let body_close = body + svg[body..].find("</g>").unwrap();
        assert!(body_close < nucleus);
        assert!(!svg[body..body_close].contains("nucleus"));
        assert_eq!(svg[nucleus..].matches("<animateTransform").count(), 1);
    }

    #[test]
    fn still_nucleus_ignores_body_pulse() {
        let scene = scene();
        let view = &scene.particles()[0];
        let frame = view.sample(1.25);
        let svg = render_particle_still(view, &frame, "glow-0");
        assert!(svg.contains(&format!(
            r#"class="body" cx="0" cy="0" r="{}""#,
            num(view.radius() * 1.15)
        )));
        assert!(svg.contains(&format!(
            r#"class="nucleus" cx="0" cy="0" r="{}""#,
            num(view.nucleus_radius() * frame.nucleus_scale)
        )));
    }

    #[test]
    fn label_text_is_centered_on_anchor() {
        let scene = scene();
        let view = &scene.connectors()[0];
        let anchor = view.geometry().label_anchor;
        let svg = render_connector(view, 0, &Theme::default(), &mut ApproxMeasure::default());
        assert!(svg.contains(&format!(
            r#"<text x="{}" y="{}""#,
            num(anchor.x),
            num(anchor.y)
        )));
    }

    #[test]
    fn cell_without_nucleus_has_one_circle() {
        let scene = scene();
        let svg = render_particle(&scene.particles()[1], 1);
        assert_eq!(svg.matches("<circle").count(), 1);
        assert!(!svg.contains("nucleus"));
    }

    #[test]
    fn degenerate_connector_has_no_arrowhead() {
        let scene = scene();
        let theme = Theme::default();
        let svg = render_connector(&scene.connectors()[1], 1, &theme, &mut ApproxMeasure::default());
        assert!(!svg.contains("arrowhead"));
        assert!(svg.contains("rotate(0)"));
        assert!(svg.contains(">self</text>"));
    }

    #[test]
    fn connector_entrance_is_ordered() {
        let scene = scene();
        let theme = Theme::default();
        let svg = render_connector(&scene.connectors()[0], 0, &theme, &mut ApproxMeasure::default());
        assert!(svg.contains(r#"transform="scale(0 1)""#));
        assert!(svg.contains(r#"values="0 1;1 1""#));
        assert!(svg.contains(r#"dur="0.8s" begin="0s""#));
        assert!(svg.contains(r#"dur="0.3s" begin="0.8s""#));
        assert!(svg.contains(r#"dur="0.5s" begin="0.5s""#));
    }

    #[test]
    fn hovered_cell_is_marked_and_painted_last() {
        let mut scene = scene();
        scene.hover_start(0);
        let svg = render_svg(&scene, &Theme::default(), &mut ApproxMeasure::default());
        let tumor = svg.find("cell-tumor_core").unwrap();
        let immune = svg.find("cell cell-immune").unwrap();
        assert!(immune < tumor);
        assert!(svg.contains("cell cell-tumor is-hovered"));
    }

    #[test]
    fn still_frame_reflects_sampled_state() {
        let scene = scene();
        let theme = Theme::default();
        let early = render_still(&scene, &theme, &mut ApproxMeasure::default(), 0.0);
        assert_well_formed(&early);
        assert!(!early.contains("<animate"));
        assert!(!early.contains("arrowhead"));
        assert!(early.contains("feDropShadow"));

        let late = render_still(&scene, &theme, &mut ApproxMeasure::default(), 5.0);
        assert!(late.contains(r#"class="arrowhead""#));
        assert!(late.contains("kill &lt;rate&gt;"));
    }

    #[test]
    fn unmounted_scene_renders_empty_surface() {
        let mut scene = scene();
        scene.unmount();
        let theme = Theme::default();
        let svg = render_svg(&scene, &theme, &mut ApproxMeasure::default());
        assert!(!svg.contains("<circle"));
        let still = render_still(&scene, &theme, &mut ApproxMeasure::default(), 1.0);
        assert!(!still.contains("<circle"));
        assert_well_formed(&still);
    }

    #[test]
    fn bare_labels_skip_backdrop() {
        let scene = scene();
        let theme = Theme::from_builtin("blueprint").unwrap();
        let svg = render_connector(&scene.connectors()[0], 0, &theme, &mut ApproxMeasure::default());
        assert!(!svg.contains("<rect"));
    }
}
