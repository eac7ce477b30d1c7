use layout_engine::{
    compute_layout, place_panels, Arrangement, ContainerSize, FitMode, GridShape, LayoutConfig,
    LayoutRequest,
};
use proptest::prelude::*;

fn arb_request() -> impl Strategy<Value = LayoutRequest> {
    (
        400.0..2400.0f64,
        600.0..2000.0f64,
        1..6usize,
        1..6usize,
        0.5..2.0f64,
        0..4usize,
        any::<bool>(),
    )
        .prop_map(|(width, height, nrow, ncol, aspect, labels, by_row)| {
            let arrange = if by_row { Arrangement::Row } else { Arrangement::Column };
            LayoutRequest::new(
                ContainerSize::new(width.floor(), height.floor()),
                GridShape::new(nrow, ncol, arrange),
                aspect,
                labels,
            )
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn grid_fits_container(request in arb_request()) {
        let config = LayoutConfig::default();
        let geo = compute_layout(&request, &config).unwrap();
        let nrow = request.grid.nrow as f64;
        let ncol = request.grid.ncol as f64;
        let aspect = request.aspect_ratio;

        let used_height = nrow * geo.panel_height
            + nrow * geo.label_area_height
            + config.gutter() * (nrow + 1.0);
        let used_width = ncol * geo.panel_width + config.gutter() * (ncol + 1.0);

        let (height_eps, width_eps) = match geo.fit {
            FitMode::WidthFirst => (0.0, 0.5 * ncol),
            FitMode::HeightFirst => (0.5 * nrow, ncol * (1.0 + 0.5 / aspect)),
        };
        prop_assert!(used_height <= request.container.height + height_eps + 1e-9);
        prop_assert!(used_width <= request.container.width + width_eps + 1e-9);

        prop_assert!(geo.label_height >= 13.0 && geo.label_height <= 26.0);
        prop_assert_eq!(geo.vertical_offset, config.header_height);
        if geo.fit == FitMode::WidthFirst {
            prop_assert_eq!(geo.horizontal_offset, 0.0);
        }
    }

    #[test]
    fn placements_fill_distinct_cells(request in arb_request(), count in 0..40usize) {
        let keys: Vec<String> = (0..count).map(|i| format!("k{:03}", (i * 17) % 101)).collect();
        let mut unique = keys.clone();
        unique.sort();
        unique.dedup();
        prop_assume!(unique.len() == keys.len());

        let grid = request.grid;
        let placements = place_panels(keys.iter().map(String::as_str), &grid).unwrap();
        prop_assert_eq!(placements.len(), count.min(grid.panels_per_page()));

        let mut cells: Vec<(usize, usize)> = placements.iter().map(|p| (p.row, p.col)).collect();
        cells.sort_unstable();
        cells.dedup();
        prop_assert_eq!(cells.len(), placements.len());

        for p in &placements {
            prop_assert!(p.row < grid.nrow && p.col < grid.ncol);
            prop_assert_eq!(p.col + p.inverse_col, grid.ncol - 1);
            prop_assert_eq!(&keys[p.rank], &p.panel_key);
        }
        prop_assert!(placements.windows(2).all(|w| w[0].panel_key < w[1].panel_key));
    }
}
