//! Neon Graph entry point
//!
//! The real product is the wasm library; the native binary runs the
//! simulations headless for a quick sanity pass and some timing output.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use neon_graph::sim::flappy::{FlappyInput, FlappyState, GamePhase, tick as flappy_tick};
    use neon_graph::sim::graph::{GraphInput, GraphState, tick as graph_tick};

    env_logger::init();
    log::info!("neon-graph (native) starting headless run...");

    const DT: f32 = 1.0 / 60.0;

    // Graph scene: one simulated minute on a desktop-sized canvas
    let mut graph = GraphState::new(0xC0FFEE, 1280.0, 720.0);
    let input = GraphInput::default();
    for _ in 0..3600 {
        graph_tick(&mut graph, &input, DT);
    }
    println!(
        "graph: {} nodes, {} edges, {} clusters, {} abductions after 60s",
        graph.nodes.len(),
        graph.edges.len(),
        graph.clusters.len(),
        graph.ufo.total_abductions
    );
    assert!(graph.nodes.iter().all(|n| n.pos.is_finite()));

    // Flappy: let gravity win once, then verify the restart path
    let mut game = FlappyState::new(0xF1A9, 800.0, 480.0);
    flappy_tick(&mut game, &FlappyInput { flap: true }, DT);
    let mut ticks_to_game_over = 0u32;
    while game.phase != GamePhase::GameOver && ticks_to_game_over < 3600 {
        flappy_tick(&mut game, &FlappyInput::default(), DT);
        ticks_to_game_over += 1;
    }
    println!(
        "flappy: game over after {:.2}s with score {}",
        ticks_to_game_over as f32 * DT,
        game.score
    );
    assert_eq!(game.phase, GamePhase::GameOver);
    assert!(game.player.pos != Vec2::ZERO);

    println!("✓ headless smoke run passed");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is app::wasm_start; this satisfies the bin target
}
