//! End-to-end drawing scenarios exercised through the public API,
//! checked against the serialized SVG output.

use silk_canvas::{
    ImageBitmap, Path2D, PatternRepetition, SvgRenderingContext2D, TextAlign,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn ctx(width: u32, height: u32) -> SvgRenderingContext2D {
    init_tracing();
    SvgRenderingContext2D::new(width, height)
}

#[test]
fn serialization_is_idempotent() {
    let mut c = ctx(200, 200);
    c.set_fill_style("#ff0000");
    c.fill_rect(10.0, 10.0, 50.0, 50.0);
    c.begin_path();
    c.move_to(0.0, 0.0);
    c.line_to(100.0, 100.0);
    c.stroke();

    let first = c.serialized_svg();
    let second = c.serialized_svg();
    assert_eq!(first, second);
}

#[test]
fn empty_document_shape() {
    let c = ctx(120, 80);
    let svg = c.serialized_svg();
    assert!(svg.starts_with("<svg version=\"1.1\""));
    assert!(svg.contains("xmlns:xlink=\"http://www.w3.org/1999/xlink\""));
    assert!(svg.contains("width=\"120\""));
    assert!(svg.contains("height=\"80\""));
    assert!(svg.ends_with("<defs/><g/></svg>"));
}

#[test]
fn geometry_is_frozen_through_the_current_transform() {
    let mut c = ctx(100, 100);
    c.translate(10.0, 0.0);
    c.scale(2.0, 2.0);
    c.begin_path();
    c.move_to(1.0, 1.0);
    c.line_to(2.0, 2.0);
    c.stroke();

    // translation applied outermost: (1,1) -> (12,2), (2,2) -> (14,4)
    assert!(c.serialized_svg().contains("d=\"M 12 2 L 14 4\""));
}

#[test]
fn later_transforms_do_not_move_recorded_geometry() {
    let mut c = ctx(100, 100);
    c.begin_path();
    c.move_to(5.0, 5.0);
    c.line_to(10.0, 10.0);
    c.translate(50.0, 50.0);
    c.line_to(10.0, 20.0);
    c.stroke();

    assert!(c
        .serialized_svg()
        .contains("d=\"M 5 5 L 10 10 L 60 70\""));
}

#[test]
fn stroke_width_is_written_in_device_terms() {
    let mut c = ctx(100, 100);
    c.scale(2.0, 1.0);
    c.set_line_width(1.0);
    c.begin_path();
    c.move_to(0.0, 0.0);
    c.line_to(10.0, 0.0);
    c.stroke();

    // user width 1 under scale(2,1) is device width 2
    assert!(c.serialized_svg().contains("stroke-width=\"2\""));
}

#[test]
fn default_stroke_omits_the_svg_defaults() {
    let mut c = ctx(100, 100);
    c.begin_path();
    c.move_to(0.0, 0.0);
    c.line_to(10.0, 0.0);
    c.stroke();

    let svg = c.serialized_svg();
    assert!(!svg.contains("stroke-width"));
    assert!(!svg.contains("stroke-linecap"));
    assert!(!svg.contains("stroke-linejoin"));
    // the context default miter limit differs from the SVG default
    assert!(svg.contains("stroke-miterlimit=\"10\""));
}

#[test]
fn save_restore_round_trips_state_and_nests_groups() {
    let mut c = ctx(100, 100);
    c.set_fill_style("#ff0000");
    c.save();
    c.set_fill_style("#0000ff");
    c.translate(30.0, 0.0);
    c.fill_rect(1.0, 1.0, 2.0, 2.0);
    c.restore();

    assert!(matches!(
        c.style().fill_style,
        silk_canvas::Paint::Color(ref col) if col == "#ff0000"
    ));
    assert_eq!(c.get_transform(), silk_canvas::Matrix::IDENTITY);

    let svg = c.serialized_svg();
    // the saved scope is a nested group holding the blue rect
    assert!(svg.contains("<g><rect"));
    assert!(svg.contains("fill=\"#0000ff\""));
    assert!(svg.contains("matrix(1 0 0 1 30 0)"));
}

#[test]
fn drawing_after_restore_lands_outside_the_saved_group() {
    let mut c = ctx(100, 100);
    c.save();
    c.fill_rect(1.0, 1.0, 2.0, 2.0);
    c.restore();
    c.fill_rect(5.0, 5.0, 2.0, 2.0);

    let doc = c.svg_document();
    let content = doc.content_group();
    let children = doc.tree().children(content);
    // one group from save, one rect drawn afterwards
    assert_eq!(children.len(), 2);
    assert_eq!(
        doc.tree().kind(children[0]),
        Some(silk_dom::ElementKind::Group)
    );
    assert_eq!(
        doc.tree().kind(children[1]),
        Some(silk_dom::ElementKind::Rect)
    );
}

#[test]
fn full_surface_clear_drops_the_content_tree() {
    let mut c = ctx(100, 100);
    c.fill_rect(10.0, 10.0, 20.0, 20.0);
    assert!(c.serialized_svg().contains("<rect"));

    c.clear_rect(0.0, 0.0, 100.0, 100.0);
    let svg = c.serialized_svg();
    assert!(!svg.contains("<rect"));
    assert!(svg.ends_with("<defs/><g/></svg>"));
}

#[test]
fn full_surface_fill_clears_then_draws() {
    let mut c = ctx(100, 100);
    c.fill_rect(10.0, 10.0, 20.0, 20.0);
    c.set_fill_style("#00ff00");
    c.fill_rect(0.0, 0.0, 100.0, 100.0);

    let doc = c.svg_document();
    let children = doc.tree().children(doc.content_group());
    // only the covering rect survives
    assert_eq!(children.len(), 1);
    assert!(c.serialized_svg().contains("fill=\"#00ff00\""));
}

#[test]
fn explicit_path_objects_round_trip() {
    let mut c = ctx(100, 100);
    let m = silk_canvas::Matrix::identity();
    let mut p = Path2D::new();
    p.move_to(&m, 0.0, 0.0);
    p.bezier_curve_to(&m, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0);
    p.close_path();

    c.fill_path(&p);
    let rebuilt = Path2D::from_commands(p.commands().to_vec());
    c.fill_path(&rebuilt);

    let svg = c.serialized_svg();
    let d = "d=\"M 0 0 C 10 0 10 10 0 10 Z\"";
    assert_eq!(svg.matches(d).count(), 2);
    // explicit paths always paint fill-before-stroke
    assert_eq!(
        svg.matches("paint-order=\"fill stroke markers\"").count(),
        2
    );
}

#[test]
fn rounded_corner_arc_emits_the_tangent_arc() {
    let mut c = ctx(300, 150);
    c.begin_path();
    c.move_to(150.0, 20.0);
    c.arc_to(150.0, 100.0, 250.0, 20.0, 20.0).unwrap();
    c.stroke();

    let svg = c.serialized_svg();
    // corner circle of radius 20, swept clockwise-on-screen as a small arc
    assert!(svg.contains("A 20 20 0 0 0"));
    assert!(svg.contains("M 150 20 L 150 58.38"));
}

#[test]
fn gradient_is_materialized_once_under_defs() {
    let mut c = ctx(100, 100);
    let mut g = c.create_linear_gradient(0.0, 0.0, 100.0, 0.0);
    g.add_color_stop(0.0, "#ff0000");
    g.add_color_stop(1.0, "rgba(0,0,255,0.5)");
    c.set_fill_style(g);
    c.fill_rect(0.0, 0.0, 10.0, 10.0);
    c.fill_rect(20.0, 0.0, 10.0, 10.0);

    let svg = c.serialized_svg();
    assert_eq!(svg.matches("<linearGradient").count(), 1);
    assert!(svg.contains("x2=\"100px\""));
    assert!(svg.contains("gradientUnits=\"userSpaceOnUse\""));
    assert!(svg.contains("stop-color=\"rgb(0,0,255)\""));
    assert!(svg.contains("stop-opacity=\"0.5\""));
    assert_eq!(svg.matches("url(#").count(), 2);
}

#[test]
fn radial_gradient_maps_focus_and_outer_circle() {
    let mut c = ctx(100, 100);
    let mut g = c.create_radial_gradient(10.0, 20.0, 5.0, 50.0, 60.0, 40.0);
    g.add_color_stop(0.0, "#ffffff");
    c.set_fill_style(g);
    c.fill_rect(0.0, 0.0, 10.0, 10.0);

    let svg = c.serialized_svg();
    assert!(svg.contains("<radialGradient"));
    assert!(svg.contains("fx=\"10px\""));
    assert!(svg.contains("fy=\"20px\""));
    assert!(svg.contains("cx=\"50px\""));
    assert!(svg.contains("cy=\"60px\""));
    assert!(svg.contains("r=\"40px\""));
}

#[test]
fn rgba_paint_splits_into_color_and_opacity() {
    let mut c = ctx(100, 100);
    c.set_fill_style("rgba(255, 0, 0, 0.5)");
    c.set_global_alpha(0.5);
    c.fill_rect(0.0, 0.0, 10.0, 10.0);

    let svg = c.serialized_svg();
    assert!(svg.contains("fill=\"rgb(255,0,0)\""));
    // the split alpha folds the global alpha in
    assert!(svg.contains("fill-opacity=\"0.25\""));
}

#[test]
fn global_alpha_applies_to_plain_colors() {
    let mut c = ctx(100, 100);
    c.set_global_alpha(0.3);
    c.fill_rect(0.0, 0.0, 10.0, 10.0);

    assert!(c.serialized_svg().contains("fill-opacity=\"0.3\""));
}

#[test]
fn clip_moves_the_path_under_defs() {
    let mut c = ctx(100, 100);
    c.begin_path();
    c.rect(10.0, 10.0, 50.0, 50.0);
    c.clip();
    c.fill_rect(0.0, 0.0, 20.0, 20.0);

    let svg = c.serialized_svg();
    assert!(svg.contains("<clipPath id=\""));
    assert!(svg.contains("clip-path=\"url(#"));
    // clipped drawing continues inside a wrapper group
    assert!(svg.contains("<g><rect"));
}

#[test]
fn text_is_positioned_not_shaped() {
    let mut c = ctx(200, 100);
    c.set_font("italic bold 12px Arial");
    c.set_text_align(TextAlign::Center);
    c.fill_text("hello", 100.0, 50.0);

    let svg = c.serialized_svg();
    assert!(svg.contains("font-family=\"Arial\""));
    assert!(svg.contains("font-size=\"12px\""));
    assert!(svg.contains("font-style=\"italic\""));
    assert!(svg.contains("font-weight=\"bold\""));
    assert!(svg.contains("x=\"100\""));
    assert!(svg.contains("y=\"50\""));
    assert!(svg.contains("text-anchor=\"middle\""));
    assert!(svg.contains("dominant-baseline=\"alphabetic\""));
    assert!(svg.contains(">hello</text>"));
}

#[test]
fn linked_text_is_wrapped_in_an_anchor() {
    let mut c = ctx(200, 100);
    c.set_font_href(Some("https://example.com".to_string()));
    c.fill_text("link", 10.0, 10.0);

    let svg = c.serialized_svg();
    assert!(svg.contains("<a xlink:href=\"https://example.com\"><text"));
    assert!(svg.contains("</text></a>"));
}

#[test]
fn draw_image_references_the_source() {
    let mut c = ctx(200, 200);
    let img = ImageBitmap::new(40, 30, "photo.png");
    c.translate(5.0, 5.0);
    c.draw_image(&img, 10.0, 20.0);

    let svg = c.serialized_svg();
    assert!(svg.contains("<image width=\"40\" height=\"30\""));
    assert!(svg.contains("preserveAspectRatio=\"none\""));
    assert!(svg.contains("xlink:href=\"photo.png\""));
    // destination offset folds into the transform
    assert!(svg.contains("transform=\"matrix(1 0 0 1 15 25)\""));
}

#[test]
fn draw_image_context_merges_defs_and_content() {
    let mut source = ctx(50, 50);
    let mut g = source.create_linear_gradient(0.0, 0.0, 50.0, 0.0);
    g.add_color_stop(0.0, "#123456");
    source.set_fill_style(g);
    source.fill_rect(0.0, 0.0, 10.0, 10.0);

    let mut c = ctx(200, 200);
    c.draw_image_context(&source, 30.0, 40.0);

    let svg = c.serialized_svg();
    assert!(svg.contains("<linearGradient"));
    assert!(svg.contains("<g transform=\"matrix(1 0 0 1 30 40)\""));
    assert!(svg.contains("<rect"));
}

#[test]
fn pattern_snapshots_another_surface() {
    let mut tile = ctx(16, 16);
    tile.set_fill_style("#00ff00");
    tile.fill_rect(0.0, 0.0, 8.0, 8.0);

    let mut c = ctx(100, 100);
    let pattern = c.create_pattern_from_context(&tile, PatternRepetition::Repeat);
    c.set_fill_style(pattern);
    c.fill_rect(0.0, 0.0, 100.0, 100.0);

    let svg = c.serialized_svg();
    assert!(svg.contains("<pattern id=\""));
    assert!(svg.contains("width=\"16\""));
    assert!(svg.contains("patternUnits=\"userSpaceOnUse\""));
    // the tile's content group was copied into the pattern
    assert!(svg.contains("fill=\"#00ff00\""));
}

#[test]
fn pattern_from_image_tiles_the_bitmap() {
    let mut c = ctx(100, 100);
    let img = ImageBitmap::new(8, 8, "tile.png");
    let pattern = c.create_pattern_from_image(&img, PatternRepetition::Repeat);
    c.set_fill_style(pattern);
    c.fill_rect(0.0, 0.0, 100.0, 100.0);

    let svg = c.serialized_svg();
    assert!(svg.contains("<pattern id=\""));
    assert!(svg.contains("<image width=\"8\" height=\"8\" xlink:href=\"tile.png\"/>"));
}
