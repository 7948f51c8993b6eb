//! Property tests over randomly generated DAGs with join nodes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use join_graph::geometry::Size;
use join_graph::graph::{GraphModel, NodeId};
use join_graph::layout::{compute_layout, soft_grid_point};
use join_graph::viewport::clamp_origin;
use join_graph::LayoutConfig;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// One generated node: whether it is a join, and raw parent picks that are
/// reduced modulo the number of earlier nodes.
type NodeSpec = (bool, Vec<usize>);

fn dag_specs() -> impl Strategy<Value = Vec<NodeSpec>> {
	prop::collection::vec(
		(prop::bool::weighted(0.4), prop::collection::vec(any::<usize>(), 1..4)),
		1..40,
	)
}

/// Node 0 is the head. Every other node gets at least one earlier parent, so
/// the whole graph is reachable and acyclic.
fn build(specs: &[NodeSpec]) -> (GraphModel, NodeId) {
	let mut graph = GraphModel::new();
	let head = graph.add_node("head");
	let mut ids = vec![head];
	for (i, (join, parents)) in specs.iter().enumerate() {
		let id = if *join {
			graph.add_join()
		} else {
			graph.add_node(format!("n{i}"))
		};
		for pick in parents {
			let parent = ids[pick % ids.len()];
			graph.attach(parent, id).unwrap();
		}
		ids.push(id);
	}
	(graph, head)
}

fn edge_set(graph: &GraphModel) -> BTreeSet<(NodeId, NodeId)> {
	graph.edges().collect()
}

fn seeded(seed: u64) -> LayoutConfig {
	LayoutConfig {
		seed: Some(seed),
		..LayoutConfig::default()
	}
}

proptest! {
	#[test]
	fn normalized_graphs_have_no_redundancies(specs in dag_specs()) {
		let (mut graph, head) = build(&specs);
		graph.normalize(head).unwrap();
		prop_assert!(graph.redundancies(head).is_empty(), "{:?}", graph.redundancies(head));
		prop_assert!(graph.contains(head));
	}

	#[test]
	fn normalize_is_idempotent(specs in dag_specs()) {
		let (mut graph, head) = build(&specs);
		graph.normalize(head).unwrap();
		let once = edge_set(&graph);
		let nodes = graph.len();

		let again = graph.normalize(head).unwrap();
		prop_assert_eq!(again.removed(), 0);
		prop_assert_eq!(edge_set(&graph), once);
		prop_assert_eq!(graph.len(), nodes);
	}

	#[test]
	fn normalize_keeps_named_nodes_reachable(specs in dag_specs()) {
		let (mut graph, head) = build(&specs);
		let named_before: BTreeSet<NodeId> =
			graph.ids().filter(|&id| !graph[id].is_join()).collect();
		graph.normalize(head).unwrap();
		let reachable: BTreeSet<NodeId> = graph.reachable(head).into_iter().collect();
		prop_assert!(named_before.is_subset(&reachable));
	}

	#[test]
	fn edges_point_to_later_columns(specs in dag_specs(), seed in any::<u64>()) {
		let (mut graph, head) = build(&specs);
		graph.normalize(head).unwrap();
		let result = compute_layout(&graph, head, Size::new(1440.0, 900.0), &seeded(seed)).unwrap();
		prop_assert_eq!(result.len(), graph.reachable(head).len());
		for (from, to) in graph.edges() {
			let (Some(u), Some(v)) = (result.point(from), result.point(to)) else {
				continue;
			};
			prop_assert!(v.x_region > u.x_region, "{} -> {}", from, to);
		}
		prop_assert!(result.diagnostics().is_empty());
	}

	#[test]
	fn rows_are_dense_per_column(specs in dag_specs(), seed in any::<u64>()) {
		let (graph, head) = build(&specs);
		let result = compute_layout(&graph, head, Size::new(1440.0, 900.0), &seeded(seed)).unwrap();
		let mut columns: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
		for point in result.points().values() {
			columns.entry(point.x_region).or_default().push(point.y_region);
		}
		for rows in columns.values_mut() {
			rows.sort_unstable();
			let expected: Vec<usize> = (1..=rows.len()).collect();
			prop_assert_eq!(&*rows, &expected);
		}
	}

	#[test]
	fn rows_follow_discovery_order(specs in dag_specs(), seed in any::<u64>()) {
		let (graph, head) = build(&specs);
		let result = compute_layout(&graph, head, Size::new(1440.0, 900.0), &seeded(seed)).unwrap();
		let discovered: HashMap<NodeId, usize> = graph
			.reachable(head)
			.into_iter()
			.enumerate()
			.map(|(index, id)| (id, index))
			.collect();

		let mut columns: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
		for (id, point) in result.points() {
			columns
				.entry(point.x_region)
				.or_default()
				.push((point.y_region, discovered[id]));
		}
		for (column, mut rows) in columns {
			rows.sort_unstable();
			let order: Vec<usize> = rows.iter().map(|&(_, index)| index).collect();
			prop_assert!(order.windows(2).all(|w| w[0] < w[1]), "column {}: {:?}", column, order);
		}
	}

	#[test]
	fn every_point_is_on_canvas(specs in dag_specs(), seed in any::<u64>()) {
		let (graph, head) = build(&specs);
		let bounds = Size::new(1024.0, 768.0);
		let result = compute_layout(&graph, head, bounds, &seeded(seed)).unwrap();
		for point in result.points().values() {
			let p = point.position().unwrap();
			prop_assert!(p.x >= 0.0 && p.x <= bounds.width);
			prop_assert!(p.y >= 0.0 && p.y <= bounds.height);
		}
	}

	#[test]
	fn soft_grid_stays_in_margins_and_slot(
		total in 1usize..40,
		pick in any::<usize>(),
		extent in 50.0f64..3000.0,
		seed in any::<u64>(),
	) {
		let region = pick % total + 1;
		let config = LayoutConfig::default();
		let mut rng = StdRng::seed_from_u64(seed);
		let p = soft_grid_point(region, total, extent, &config, &mut rng).unwrap();

		let low = config.edge_margin.min(extent / 2.0);
		let high = (extent - config.edge_margin).max(extent / 2.0);
		prop_assert!(p >= low && p <= high);

		let slot = extent / total as f64;
		let center = slot / 2.0 + (region - 1) as f64 * slot;
		if center - slot / 2.0 >= low && center + slot / 2.0 <= high {
			prop_assert!((p - center).abs() < slot / 2.0);
		}
	}

	#[test]
	fn soft_grid_rejects_out_of_range_regions(total in 1usize..40, over in 1usize..10) {
		let config = LayoutConfig::default();
		let mut rng = StdRng::seed_from_u64(0);
		prop_assert!(soft_grid_point(0, total, 900.0, &config, &mut rng).is_err());
		prop_assert!(soft_grid_point(total + over, total, 900.0, &config, &mut rng).is_err());
	}

	#[test]
	fn clamped_origin_never_shows_past_canvas(
		x in -5000.0f64..5000.0,
		y in -5000.0f64..5000.0,
		width in 100.0f64..3000.0,
		height in 100.0f64..3000.0,
		zoom in 0.8f64..5.0,
	) {
		let natural = Size::new(width, height);
		let window = Size::new(1000.0, 600.0);
		let origin = clamp_origin(x, y, natural, zoom, window);
		prop_assert!(origin.x >= 0.0 && origin.y >= 0.0);
		prop_assert!(origin.x <= (natural.width * zoom - window.width).max(0.0));
		prop_assert!(origin.y <= (natural.height * zoom - window.height).max(0.0));
	}
}
