#![allow(missing_docs)]
//! Host-level tests for layouts, rows, mapping tables, and the canvas.

use embassy_time::Instant;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{Point, RgbColor};
use embedded_graphics::Pixel as GraphicsPixel;
use embedded_graphics::Drawable;
use led_projector::color::{Palette, RGB8, colors};
use led_projector::controls::{ControlTarget, ControlValue};
use led_projector::effect::effect_index;
use led_projector::fixture::{Fixture, Layout, MapEntry, OutputRange, RowConfig};
use led_projector::frame::FrameContext;
use led_projector::leds::Leds;
use led_projector::projection::{Dims, NOT_SHOWN, PixelTransform, projection_index};
use led_projector::{Coord3D, Dimension, Error};

fn effect(name: &str) -> u8 {
    effect_index(name).unwrap() as u8
}

fn projection(name: &str) -> u8 {
    projection_index(name).unwrap() as u8
}

fn physical_at<const N: usize>(layout: &Layout<N>, position: Coord3D) -> u16 {
    layout
        .pixels()
        .iter()
        .position(|pixel| pixel.position == position)
        .unwrap() as u16
}

#[test]
fn serpentine_panel_positions() {
    let panel = Layout::<12>::serpentine_row_major(4, 3, 0).unwrap();
    let positions: Vec<(i32, i32)> = panel
        .pixels()
        .iter()
        .map(|pixel| (pixel.position.x, pixel.position.y))
        .collect();
    assert_eq!(
        positions,
        [
            (0, 0), (1, 0), (2, 0), (3, 0),
            (3, 1), (2, 1), (1, 1), (0, 1),
            (0, 2), (1, 2), (2, 2), (3, 2),
        ]
    );
    assert_eq!(panel.size(), Coord3D::new(4, 3, 1));
}

#[test]
fn serpentine_column_major_positions() {
    let panel = Layout::<6>::serpentine_column_major(2, 3, 0).unwrap();
    let positions: Vec<(i32, i32)> = panel
        .pixels()
        .iter()
        .map(|pixel| (pixel.position.x, pixel.position.y))
        .collect();
    assert_eq!(positions, [(0, 0), (0, 1), (0, 2), (1, 2), (1, 1), (1, 0)]);
}

#[test]
fn rotate_and_flip_keep_the_panel_in_bounds() {
    let panel = Layout::<6>::row_major(3, 2, 0).unwrap();
    let rotated = panel.clone().rotate_cw();
    assert_eq!(rotated.size(), Coord3D::new(2, 3, 1));
    assert_eq!(rotated.pixels()[0].position, Coord3D::new(1, 0, 0));

    let flipped = panel.flip_h();
    assert_eq!(flipped.pixels()[0].position, Coord3D::new(2, 0, 0));
}

#[test]
fn ring_and_cube_layouts() {
    let ring = Layout::<12>::ring(12, 9, 0).unwrap();
    assert_eq!(ring.len(), 12);
    assert_eq!(ring.pixels()[0].position, Coord3D::new(4, 0, 0));
    assert_eq!(ring.size(), Coord3D::new(9, 9, 1));

    let cube = Layout::<27>::cube(3, 3, 3, 0).unwrap();
    assert_eq!(cube.size(), Coord3D::new(3, 3, 3));
    assert_eq!(cube.pixels()[26].position, Coord3D::new(2, 2, 2));
}

#[test]
fn layout_rejects_negative_positions_and_overflow() {
    let mut layout = Layout::<2>::new();
    assert_eq!(layout.push(Coord3D::new(-1, 0, 0), 0), Err(Error::NegativePosition));
    layout.push(Coord3D::ZERO, 0).unwrap();
    layout.push(Coord3D::ONE, 0).unwrap();
    assert_eq!(layout.push(Coord3D::ZERO, 0), Err(Error::LayoutCapacity));
}

#[test]
fn outputs_are_contiguous_runs_per_pin() {
    let layout = Layout::<9>::linear_x(4, 0)
        .unwrap()
        .concat(&Layout::<3>::linear_x(3, 1).unwrap(), Coord3D::new(0, 1, 0))
        .unwrap()
        .concat(&Layout::<2>::linear_x(2, 0).unwrap(), Coord3D::new(0, 2, 0))
        .unwrap();
    let fixture = Fixture::<9, 1>::new(layout).unwrap();
    assert_eq!(
        fixture.outputs(),
        [
            OutputRange { pin: 0, start: 0, len: 4 },
            OutputRange { pin: 1, start: 4, len: 3 },
            OutputRange { pin: 0, start: 7, len: 2 },
        ]
    );
}

#[test]
fn line_along_depth_maps_by_distance_from_midpoint() {
    let mut fixture = Fixture::<10, 1>::new(Layout::linear_z(10, 0).unwrap()).unwrap();
    let config = RowConfig::new(effect("Solid"), projection("Default"), Coord3D::ZERO, Coord3D::new(0, 0, 9))
        .with_midpoint(Coord3D::ZERO);
    fixture.add_row(config).unwrap();
    fixture.project_and_map().unwrap();

    let row = fixture.row(0).unwrap();
    assert_eq!(row.size(), Coord3D::new(10, 1, 1));
    for physical in 0..10 {
        assert_eq!(row.mapping().logical(physical), physical);
    }
}

#[test]
fn rectangular_panel_maps_one_to_one() {
    let layout = Layout::<32>::serpentine_row_major(8, 4, 0).unwrap();
    let mut fixture = Fixture::<32, 1>::new(layout.clone()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Lines"), projection("Default"), Coord3D::ZERO, Coord3D::new(7, 3, 0)))
        .unwrap();
    fixture.project_and_map().unwrap();

    let row = fixture.row(0).unwrap();
    assert_eq!(row.size(), Coord3D::new(8, 4, 1));
    assert_eq!(row.mapping().len(), 32);
    for (physical, pixel) in layout.pixels().iter().enumerate() {
        let expected = (pixel.position.x + 8 * pixel.position.y) as u16;
        assert_eq!(row.mapping().logical(physical as u16), expected);
        assert_eq!(row.mapping().physical(expected).collect::<Vec<_>>(), [physical as u16]);
    }
}

#[test]
fn multiply_tiles_share_logical_pixels() {
    let layout = Layout::<64>::row_major(8, 8, 0).unwrap();
    let mut fixture = Fixture::<64, 1>::new(layout.clone()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Lines"), projection("Multiply"), Coord3D::ZERO, Coord3D::new(7, 7, 0)))
        .unwrap();
    fixture.project_and_map().unwrap();

    let row = fixture.row(0).unwrap();
    assert_eq!(row.size(), Coord3D::new(4, 4, 1));
    let tiled = row.mapping().logical(physical_at(&layout, Coord3D::new(5, 1, 0)));
    let home = row.mapping().logical(physical_at(&layout, Coord3D::new(1, 1, 0)));
    assert_eq!(tiled, home);
    assert_eq!(home, 5);
    assert_eq!(row.mapping().physical(5).count(), 4);
}

#[test]
fn projection_control_edits_change_the_mapping() {
    let layout = Layout::<64>::row_major(8, 8, 0).unwrap();
    let mut fixture = Fixture::<64, 1>::new(layout.clone()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Lines"), projection("Multiply"), Coord3D::ZERO, Coord3D::new(7, 7, 0)))
        .unwrap();
    fixture.project_and_map().unwrap();
    assert!(fixture.take_remap());

    fixture
        .set_control(0, ControlTarget::Projection, "mirror", ControlValue::Checkbox(true))
        .unwrap();
    assert!(fixture.remap_flag().is_set());
    fixture.project_and_map().unwrap();

    let row = fixture.row(0).unwrap();
    assert_eq!(row.mapping().logical(physical_at(&layout, Coord3D::new(5, 1, 0))), 6);
    assert_eq!(row.mapping().logical(physical_at(&layout, Coord3D::new(1, 1, 0))), 5);
}

#[test]
fn transpose_turns_a_wide_panel_tall() {
    let layout = Layout::<8>::row_major(4, 2, 0).unwrap();
    let mut fixture = Fixture::<8, 1>::new(layout.clone()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Lines"), projection("Transpose"), Coord3D::ZERO, Coord3D::new(3, 1, 0)))
        .unwrap();
    fixture.project_and_map().unwrap();
    assert_eq!(fixture.row(0).unwrap().size(), Coord3D::new(4, 2, 1));

    fixture
        .set_control(0, ControlTarget::Projection, "transpose xy", ControlValue::Checkbox(true))
        .unwrap();
    fixture.project_and_map().unwrap();

    let row = fixture.row(0).unwrap();
    assert_eq!(row.size(), Coord3D::new(2, 4, 1));
    for pixel in layout.pixels() {
        let physical = physical_at(&layout, pixel.position);
        let expected = pixel.position.y + 2 * pixel.position.x;
        assert_eq!(i32::from(row.mapping().logical(physical)), expected);
    }
}

#[test]
fn preset1_tiles_like_multiply() {
    let layout = Layout::<64>::row_major(8, 8, 0).unwrap();
    let mut fixture = Fixture::<64, 2>::new(layout).unwrap();
    for name in ["Multiply", "Preset1"] {
        fixture
            .add_row(RowConfig::new(effect("Lines"), projection(name), Coord3D::ZERO, Coord3D::new(7, 7, 0)))
            .unwrap();
    }
    fixture.project_and_map().unwrap();

    let multiply = fixture.row(0).unwrap();
    let preset = fixture.row(1).unwrap();
    assert_eq!(preset.size(), Coord3D::new(4, 4, 1));
    assert_eq!(preset.mapping().entries(), multiply.mapping().entries());
    fixture.render(&FrameContext::new(Instant::from_millis(1270), 0)).unwrap();
}

#[test]
fn effect_dimension_changes_rebuild_projection_controls() {
    let mut fixture = Fixture::<64, 1>::new(Layout::cube(4, 4, 4, 0).unwrap()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Lines"), projection("Transpose"), Coord3D::ZERO, Coord3D::splat(3)))
        .unwrap();
    let names = |fixture: &Fixture<64, 1>| {
        let row = fixture.row(0).unwrap();
        row.projection_controls().iter().map(|control| control.name).collect::<Vec<_>>()
    };
    assert_eq!(names(&fixture), ["transpose xy"]);
    fixture
        .set_control(0, ControlTarget::Projection, "transpose xy", ControlValue::Checkbox(true))
        .unwrap();

    fixture.set_effect(0, usize::from(effect("Ripples"))).unwrap();
    assert_eq!(names(&fixture), ["transpose xy", "transpose xz", "transpose yz"]);
    fixture
        .set_control(0, ControlTarget::Projection, "transpose xz", ControlValue::Checkbox(true))
        .unwrap();
    fixture.project_and_map().unwrap();
    let row = fixture.row(0).unwrap();
    assert_eq!(row.dims(), Dims::new(Dimension::D3, Dimension::D3));
    assert_eq!(
        row.control(ControlTarget::Projection, "transpose xy"),
        Ok(ControlValue::Checkbox(true))
    );

    fixture.set_effect(0, usize::from(effect("Lines"))).unwrap();
    assert_eq!(names(&fixture), ["transpose xy"]);
    assert_eq!(
        fixture.row(0).unwrap().control(ControlTarget::Projection, "transpose xy"),
        Ok(ControlValue::Checkbox(true))
    );
}

#[test]
fn geometry_edits_keep_projection_settings() {
    let mut fixture = Fixture::<64, 1>::new(Layout::row_major(8, 8, 0).unwrap()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Lines"), projection("Multiply"), Coord3D::ZERO, Coord3D::new(7, 7, 0)))
        .unwrap();
    let factor = ControlValue::Coord(Coord3D::new(4, 1, 1));
    fixture
        .set_control(0, ControlTarget::Projection, "multiply", factor)
        .unwrap();
    fixture.project_and_map().unwrap();
    assert_eq!(fixture.row(0).unwrap().size(), Coord3D::new(2, 8, 1));

    fixture.set_bounds(0, Coord3D::ZERO, Coord3D::new(7, 0, 0)).unwrap();
    fixture.project_and_map().unwrap();

    let row = fixture.row(0).unwrap();
    assert_eq!(row.dims().projection, Dimension::D1);
    assert_eq!(row.control(ControlTarget::Projection, "multiply"), Ok(factor));
    assert_eq!(row.size(), Coord3D::new(1, 2, 1));
}

#[test]
fn palette_selector_recolors_bouncing_balls() {
    let mut fixture = Fixture::<30, 1>::new(Layout::linear_x(30, 0).unwrap()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Bouncing Balls"), projection("None"), Coord3D::ZERO, Coord3D::new(29, 0, 0)))
        .unwrap();
    fixture.project_and_map().unwrap();
    assert_eq!(
        fixture.row(0).unwrap().control(ControlTarget::Effect, "palette"),
        Ok(ControlValue::Select(Palette::Rainbow as u8))
    );

    fixture
        .set_control(0, ControlTarget::Effect, "palette", ControlValue::Select(200))
        .unwrap();
    assert_eq!(
        fixture.row(0).unwrap().control(ControlTarget::Effect, "palette"),
        Ok(ControlValue::Select(Palette::Heat as u8))
    );

    // Every ball starts on the floor, so the last of the eight (palette index 7 * 32) owns it.
    fixture.render(&FrameContext::new(Instant::from_millis(0), 0)).unwrap();
    let floor = fixture.row(0).unwrap().mapping().physical(0).next().unwrap();
    assert_eq!(fixture.pixels()[usize::from(floor)], Palette::Heat.color(224, 255));
    assert_ne!(Palette::Heat.color(224, 255), Palette::Rainbow.color(224, 255));
}

#[test]
fn unit_multiply_and_grouping_match_default() {
    let layout = Layout::<48>::serpentine_row_major(8, 6, 0).unwrap();
    let mut fixture = Fixture::<48, 3>::new(layout).unwrap();
    let whole = (Coord3D::ZERO, Coord3D::new(7, 5, 0));
    for name in ["Default", "Multiply", "Grouping"] {
        fixture
            .add_row(RowConfig::new(effect("Lines"), projection(name), whole.0, whole.1))
            .unwrap();
    }
    fixture
        .set_control(1, ControlTarget::Projection, "multiply", ControlValue::Coord(Coord3D::ONE))
        .unwrap();
    fixture.project_and_map().unwrap();

    let reference = fixture.row(0).unwrap();
    for index in 1..3 {
        let row = fixture.row(index).unwrap();
        assert_eq!(row.size(), reference.size());
        assert_eq!(row.mapping().entries(), reference.mapping().entries());
    }
}

#[test]
fn grouping_gangs_neighbours() {
    let layout = Layout::<64>::row_major(8, 8, 0).unwrap();
    let mut fixture = Fixture::<64, 1>::new(layout.clone()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Lines"), projection("Grouping"), Coord3D::ZERO, Coord3D::new(7, 7, 0)))
        .unwrap();
    fixture
        .set_control(0, ControlTarget::Projection, "grouping", ControlValue::Coord(Coord3D::new(2, 2, 1)))
        .unwrap();
    fixture.project_and_map().unwrap();

    let row = fixture.row(0).unwrap();
    assert_eq!(row.size(), Coord3D::new(4, 4, 1));
    assert_eq!(row.mapping().logical(physical_at(&layout, Coord3D::new(5, 3, 0))), 6);
    assert_eq!(row.mapping().physical(6).count(), 4);
}

#[test]
fn pinwheel_buckets_a_panel_by_angle() {
    let mut fixture = Fixture::<256, 1>::new(Layout::row_major(16, 16, 0).unwrap()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Solid"), projection("Pinwheel"), Coord3D::ZERO, Coord3D::new(15, 15, 0)))
        .unwrap();
    fixture
        .set_control(0, ControlTarget::Projection, "petals", ControlValue::Slider(12))
        .unwrap();
    fixture.project_and_map().unwrap();

    let row = fixture.row(0).unwrap();
    assert_eq!(row.size(), Coord3D::new(12, 1, 1));
    assert_eq!(row.mapping().len(), 256);
    assert!(row.mapping().entries().iter().all(|entry| entry.logical < 12));
}

#[test]
fn ring_is_not_surjective_onto_its_grid() {
    let mut fixture = Fixture::<24, 1>::new(Layout::ring(24, 9, 0).unwrap()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Lines"), projection("Default"), Coord3D::ZERO, Coord3D::new(8, 8, 0)))
        .unwrap();
    fixture.project_and_map().unwrap();

    let row = fixture.row(0).unwrap();
    assert_eq!(row.size(), Coord3D::new(9, 9, 1));
    assert_eq!(row.mapping().len(), 24);
    assert_eq!(row.mapping().physical(40).count(), 0);
    fixture.render(&FrameContext::new(Instant::from_millis(500), 0)).unwrap();
}

#[test]
fn oversized_logical_grid_is_a_configuration_error() {
    let layout = Layout::<2>::from_positions(&[Coord3D::ZERO, Coord3D::new(299, 299, 0)], 0).unwrap();
    let mut fixture = Fixture::<2, 1>::new(layout).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Solid"), projection("None"), Coord3D::ZERO, Coord3D::new(299, 299, 0)))
        .unwrap();
    assert_eq!(
        fixture.project_and_map(),
        Err(Error::LogicalGridTooLarge { cells: 90_000 })
    );
}

#[test]
fn unknown_selectors_and_rows_are_rejected() {
    let mut fixture = Fixture::<4, 1>::new(Layout::linear_x(4, 0).unwrap()).unwrap();
    assert_eq!(
        fixture.add_row(RowConfig::new(200, 1, Coord3D::ZERO, Coord3D::ONE)),
        Err(Error::EffectIndexOutOfRange(200))
    );
    fixture.add_row(RowConfig::default()).unwrap();
    assert_eq!(
        fixture.add_row(RowConfig::default()),
        Err(Error::RowCapacity)
    );
    assert_eq!(fixture.set_projection(0, 99), Err(Error::ProjectionIndexOutOfRange(99)));
    assert_eq!(fixture.set_effect(3, 0), Err(Error::RowIndexOutOfRange(3)));
    assert_eq!(
        fixture.set_control(0, ControlTarget::Effect, "nope", ControlValue::Slider(1)),
        Err(Error::UnknownControl)
    );
    assert_eq!(
        fixture.set_control(0, ControlTarget::Effect, "red", ControlValue::Checkbox(true)),
        Err(Error::ControlTypeMismatch)
    );
}

#[test]
fn solid_effect_follows_its_controls() {
    let mut fixture = Fixture::<8, 1>::new(Layout::linear_x(8, 0).unwrap()).unwrap();
    fixture.add_row(RowConfig::default()).unwrap();
    fixture.project_and_map().unwrap();
    let frame = FrameContext::new(Instant::from_millis(0), 0);

    fixture.render(&frame).unwrap();
    assert!(fixture.pixels().iter().all(|pixel| *pixel == RGB8::new(182, 15, 98)));

    fixture
        .set_control(0, ControlTarget::Effect, "red", ControlValue::Slider(0))
        .unwrap();
    fixture.render(&frame).unwrap();
    assert!(fixture.pixels().iter().all(|pixel| *pixel == RGB8::new(0, 15, 98)));
    assert_eq!(
        fixture.row(0).unwrap().control(ControlTarget::Effect, "red"),
        Ok(ControlValue::Slider(0))
    );
}

#[test]
fn moving_a_row_blanks_what_it_drew() {
    let mut fixture = Fixture::<8, 1>::new(Layout::linear_x(8, 0).unwrap()).unwrap();
    fixture
        .add_row(RowConfig::new(effect("Solid"), projection("Default"), Coord3D::ZERO, Coord3D::new(3, 0, 0)))
        .unwrap();
    fixture.project_and_map().unwrap();
    fixture.render(&FrameContext::new(Instant::from_millis(0), 0)).unwrap();
    assert_ne!(fixture.pixels()[0], colors::BLACK);
    assert_eq!(fixture.pixels()[5], colors::BLACK);

    fixture.set_bounds(0, Coord3D::new(4, 0, 0), Coord3D::new(7, 0, 0)).unwrap();
    assert!(fixture.pixels().iter().all(|pixel| *pixel == colors::BLACK));
    fixture.project_and_map().unwrap();
    fixture.render(&FrameContext::new(Instant::from_millis(20), 1)).unwrap();
    assert_eq!(fixture.pixels()[0], colors::BLACK);
    assert_ne!(fixture.pixels()[5], colors::BLACK);
}

#[test]
fn row_config_survives_postcard() {
    let config = RowConfig::new(3, 8, Coord3D::new(1, 2, 0), Coord3D::new(9, 9, 0))
        .with_midpoint(Coord3D::new(4, 4, 0));
    let mut buffer = [0_u8; 64];
    let bytes = config.to_bytes(&mut buffer).unwrap();
    assert_eq!(RowConfig::from_bytes(bytes), Ok(config));
    assert_eq!(RowConfig::from_bytes(&[0xff]), Err(Error::ConfigEncoding));
}

#[test]
fn canvas_writes_reach_every_physical_pixel_of_a_logical_pixel() {
    let entries = [
        MapEntry { logical: 0, physical: 0 },
        MapEntry { logical: 0, physical: 3 },
        MapEntry { logical: 2, physical: 1 },
    ];
    let mut buffer = [colors::BLACK; 4];
    let mut leds = Leds::new(&mut buffer, &entries, Coord3D::new(3, 1, 1), PixelTransform::Identity);
    assert_eq!(leds.len(), 3);

    leds.set_pixel_color(0, colors::RED);
    leds.set_pixel_color(1, colors::GREEN);
    leds.set_pixel_color(NOT_SHOWN, colors::BLUE);
    leds.add_pixel_color(2, RGB8::new(0, 0, 200));
    leds.add_pixel_color(2, RGB8::new(0, 0, 200));
    assert_eq!(leds.get_pixel_color(0), colors::RED);
    assert_eq!(leds.get_pixel_color(1), colors::BLACK);

    leds.fade_to_black_by(255);
    assert_eq!(leds.get_pixel_color(2), RGB8::new(0, 0, 0));

    assert_eq!(buffer[0], colors::BLACK);
    assert_eq!(buffer[2], colors::BLACK);
}

#[test]
fn canvas_saturates_and_draws_with_embedded_graphics() {
    let entries = [
        MapEntry { logical: 0, physical: 1 },
        MapEntry { logical: 1, physical: 0 },
    ];
    let mut buffer = [colors::BLACK; 2];
    {
        let mut leds = Leds::new(&mut buffer, &entries, Coord3D::new(2, 1, 1), PixelTransform::Identity);
        leds.add_pixel_color(0, RGB8::new(200, 0, 0));
        leds.add_pixel_color(0, RGB8::new(200, 0, 0));
        GraphicsPixel(Point::new(1, 0), Rgb888::GREEN).draw(&mut leds).unwrap();
        GraphicsPixel(Point::new(5, 0), Rgb888::BLUE).draw(&mut leds).unwrap();
    }
    assert_eq!(buffer, [RGB8::new(0, 255, 0), RGB8::new(255, 0, 0)]);
}
