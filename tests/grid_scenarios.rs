// End-to-end grid scenarios: generation, merge rendering and culling
// Everything goes through GridLayer the way a map would drive it.

use hexgrid_geomock::error::GridError;
use hexgrid_geomock::grid_config::GridConfig;
use hexgrid_geomock::grid_layer::{GridLayer, GridOptions, GridSpec, MapEvent, StaticView};
use hexgrid_geomock::hex_coords::{AxialCoord, GeoPoint};
use hexgrid_geomock::render::{LayerGroup, Primitive, PrimitiveKind};
use hexgrid_geomock::hex_grid::Hexagon;

const BEIJING: GeoPoint = GeoPoint { lat: 39.9042, lng: 116.4074 };

fn wide_view() -> StaticView {
    StaticView::around(BEIJING, 1.0)
}

fn beijing_layer(merge_areas: Vec<Vec<&str>>) -> GridLayer {
    let mut config = GridConfig::new("beijing", BEIJING);
    config.area_radius = 1500.0;
    config.grid_radius = 500.0;
    config.merge_areas = merge_areas
        .into_iter()
        .map(|group| group.into_iter().map(str::to_string).collect())
        .collect();

    let mut layer = GridLayer::new();
    layer.apply_config(&config, &wide_view()).unwrap();
    layer
}

/// (weight, opacity) of each drawn edge, in edge order.
fn edge_strokes(hex: &Hexagon, layer: &LayerGroup) -> Vec<(f64, f64)> {
    hex.handles
        .edges
        .iter()
        .filter_map(|id| match layer.get(*id) {
            Some(Primitive::Polyline { style, .. }) => Some((style.weight, style.opacity)),
            _ => None,
        })
        .collect()
}

fn hex<'a>(layer: &'a GridLayer, q: i32, r: i32) -> &'a Hexagon {
    layer.find_hexagon(&AxialCoord::new(q, r)).unwrap()
}

const REGULAR: (f64, f64) = (0.6, 0.6);
const OUTER: (f64, f64) = (0.6, 0.8);
const INNER: (f64, f64) = (0.06, 0.1);

#[test]
fn test_beijing_grid_without_merges() {
    println!("🔷 Beijing, R=500 m, area 1500 m");
    let layer = beijing_layer(vec![]);

    let summary = layer.summary();
    assert_eq!(summary.hexagon_count, 19);
    assert!(layer.merge_info().is_empty());

    let drawn = layer.layer().unwrap();
    assert_eq!(drawn.count_kind(PrimitiveKind::Polygon), 19);
    assert_eq!(drawn.count_kind(PrimitiveKind::Label), 19);
    assert_eq!(drawn.count_kind(PrimitiveKind::Polyline), 19 * 6);

    for h in layer.hexagons() {
        assert_eq!(edge_strokes(h, drawn), vec![REGULAR; 6], "hexagon {}", h.id());
    }

    let origin = hex(&layer, 0, 0);
    assert_eq!(origin.center, BEIJING);
    println!("   ✅ 19 hexagons, all edges regular");
}

#[test]
fn test_merged_pair_draws_outer_and_inner_edges() {
    let layer = beijing_layer(vec![vec!["0,0", "1,-1"]]);
    let drawn = layer.layer().unwrap();

    let a = hex(&layer, 0, 0);
    let b = hex(&layer, 1, -1);
    assert_eq!(a.edge_info[4].neighbor, Some(AxialCoord::new(1, -1)));
    assert!(!a.edge_info[4].visible);
    assert_eq!(b.edge_info[1].neighbor, Some(AxialCoord::ORIGIN));

    let mut expected_a = vec![OUTER; 6];
    expected_a[4] = INNER;
    let mut expected_b = vec![OUTER; 6];
    expected_b[1] = INNER;
    assert_eq!(edge_strokes(a, drawn), expected_a);
    assert_eq!(edge_strokes(b, drawn), expected_b);

    // everyone else is untouched
    let untouched = hex(&layer, -1, 0);
    assert_eq!(edge_strokes(untouched, drawn), vec![REGULAR; 6]);
    assert_eq!(drawn.count_kind(PrimitiveKind::Polyline), 19 * 6);
}

#[test]
fn test_display_ids_merge_the_same_way() {
    let internal = beijing_layer(vec![vec!["0,0", "1,-1"]]);
    let display = beijing_layer(vec![vec!["p0p0", "p1n1"]]);

    for (q, r) in [(0, 0), (1, -1)] {
        assert_eq!(hex(&internal, q, r).edge_info, hex(&display, q, r).edge_info);
    }
    assert_eq!(display.find_hexagon_by_id("p1n1").unwrap().id(), "1,-1");
}

#[test]
fn test_group_of_three_merges_every_adjacent_pair() {
    let layer = beijing_layer(vec![vec!["0,0", "1,0", "0,1"]]);

    let inner_edges = |q, r| -> Vec<usize> {
        hex(&layer, q, r)
            .edge_info
            .iter()
            .enumerate()
            .filter(|(_, e)| e.neighbor.is_some())
            .map(|(i, _)| i)
            .collect()
    };
    assert_eq!(inner_edges(0, 0), vec![0, 5]);
    assert_eq!(inner_edges(1, 0), vec![1, 2]);
    assert_eq!(inner_edges(0, 1), vec![3, 4]);
    assert_eq!(layer.merge_info().total_entries(), 6);
}

#[test]
fn test_invalid_pairs_are_skipped() {
    let layer = beijing_layer(vec![
        vec!["0,0", "2,0"],
        vec!["0,0", "garbage"],
        vec!["0,0", "9,9"],
        vec!["0,0"],
        vec!["1,0", "1,0"],
    ]);

    assert_eq!(layer.summary().hexagon_count, 19);
    assert!(layer.merge_info().is_empty());
    let drawn = layer.layer().unwrap();
    assert!(layer.hexagons().iter().all(|h| edge_strokes(h, drawn) == vec![REGULAR; 6]));
}

#[test]
fn test_reshowing_is_idempotent() {
    let mut layer = beijing_layer(vec![vec!["0,0", "1,-1"]]);
    let before: Vec<_> = layer.hexagons().iter().map(|h| (h.coord, h.edge_info)).collect();

    layer.show_grid(&wide_view()).unwrap();
    layer.show_grid(&wide_view()).unwrap();

    let after: Vec<_> = layer.hexagons().iter().map(|h| (h.coord, h.edge_info)).collect();
    assert_eq!(before, after);
    assert_eq!(layer.layer().unwrap().len(), 19 * (2 + 6));
}

#[test]
fn test_culling_follows_the_map() {
    println!("🗺️ Culling while panning away and back");
    let mut layer = GridLayer::new();
    let tight = StaticView::around(BEIJING, 0.001);
    layer
        .create_hexagon_grid(
            GridSpec {
                name: "cull".into(),
                center: Some(BEIJING),
                area_radius_m: Some(1500.0),
                hex_radius_m: Some(500.0),
            },
            &tight,
        )
        .unwrap();

    let visible: Vec<_> = layer.visible_hexagons().map(|h| h.coord).collect();
    assert_eq!(visible, vec![AxialCoord::ORIGIN]);
    let drawn = layer.layer().unwrap();
    assert!(hex(&layer, 0, 0).handles.is_attached(drawn));
    assert!(!hex(&layer, 2, 0).handles.is_attached(drawn));

    let elsewhere = StaticView::around(GeoPoint::new(0.0, 0.0), 0.01);
    let stats = layer.handle_map_event(MapEvent::MoveEnd, &elsewhere).unwrap();
    assert_eq!(stats.visible, 0);
    assert_eq!(stats.detached, 1);
    assert_eq!(layer.layer().unwrap().attached_count(), 0);

    let stats = layer.handle_map_event(MapEvent::ZoomEnd, &wide_view()).unwrap();
    assert_eq!(stats.visible, 19);
    assert_eq!(stats.attached, 19);
    assert_eq!(layer.layer().unwrap().attached_count(), layer.layer().unwrap().len());
    println!("   ✅ culled to 1, then 0, then all 19");
}

#[test]
fn test_merged_edges_stay_culled_with_their_hexagon() {
    let mut config = GridConfig::new("cull-merge", BEIJING);
    config.area_radius = 1500.0;
    config.grid_radius = 500.0;
    config.merge_areas = vec![vec!["1,0".into(), "2,0".into()]];

    let mut layer = GridLayer::new();
    layer.apply_config(&config, &StaticView::around(BEIJING, 0.001)).unwrap();

    let drawn = layer.layer().unwrap();
    for coord in [(1, 0), (2, 0)] {
        let h = hex(&layer, coord.0, coord.1);
        assert!(h.has_any_neighbor());
        assert!(h.handles.ids().all(|id| !drawn.is_attached(id)));
    }
}

#[test]
fn test_larger_areas() {
    let mut layer = GridLayer::new();
    let view = wide_view();
    for (area, expected) in [(800.0, 7), (1000.0, 19), (5000.0, 127), (0.0, 1)] {
        let summary = layer
            .create_hexagon_grid(
                GridSpec {
                    name: format!("area {area}"),
                    center: Some(BEIJING),
                    area_radius_m: Some(area),
                    hex_radius_m: Some(500.0),
                },
                &view,
            )
            .unwrap();
        assert_eq!(summary.hexagon_count, expected, "area {area}");
        assert_eq!(layer.layer().unwrap().count_kind(PrimitiveKind::Polygon), expected);
    }
}

#[test]
fn test_oversize_rebuild_keeps_the_shown_grid() {
    println!("🧱 Rebuilding with an area no cap allows");
    let mut layer = beijing_layer(vec![vec!["0,0", "1,-1"]]);
    let before: Vec<_> = layer.hexagons().iter().map(|h| (h.coord, h.edge_info)).collect();
    let drawn_before = layer.layer().unwrap().len();

    for area in [1.0e12, 1.0e300] {
        let err = layer
            .set_grid_options(GridOptions::new().area_radius(area), &wide_view())
            .unwrap_err();
        assert!(matches!(err, GridError::TooManyHexagons { .. }), "area {area}");
    }
    let err = layer
        .merge_adjacent_hexagons(vec![vec!["0,0".into(), "1,0".into()]], &wide_view())
        .and_then(|_| layer.set_grid_options(GridOptions::new().hex_radius(1.0e-6), &wide_view()))
        .unwrap_err();
    assert!(matches!(err, GridError::TooManyHexagons { .. }));

    assert!(layer.is_shown());
    assert_eq!(layer.area_radius_m(), 1500.0);
    assert_eq!(layer.hex_radius_m(), 500.0);
    assert_eq!(layer.summary().hexagon_count, 19);
    assert_eq!(layer.layer().unwrap().len(), drawn_before);

    // the merge change before the failed resize did go through
    let after: Vec<_> = layer.hexagons().iter().map(|h| (h.coord, h.edge_info)).collect();
    assert_ne!(before, after);
    assert!(layer.merge_info().has_neighbor(&AxialCoord::ORIGIN, &AxialCoord::new(1, 0)));
    println!("   ✅ previous grid still drawn");
}

#[test]
fn test_grid_exactly_at_the_cap_is_drawn() {
    let mut layer = GridLayer::new().with_max_hexagons(19);
    let summary = layer
        .create_hexagon_grid(
            GridSpec {
                name: "at cap".into(),
                center: Some(BEIJING),
                area_radius_m: Some(1500.0),
                hex_radius_m: Some(500.0),
            },
            &wide_view(),
        )
        .unwrap();
    assert_eq!(summary.hexagon_count, 19);

    let err = layer
        .set_grid_options(GridOptions::new().area_radius(1800.0), &wide_view())
        .unwrap_err();
    assert_eq!(err, GridError::TooManyHexagons { count: 37, limit: 19 });
    assert_eq!(layer.summary(), summary);
    assert_eq!(layer.name(), "at cap");
}
