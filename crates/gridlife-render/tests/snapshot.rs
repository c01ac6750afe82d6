use gridlife_core::{Agent, AgentId, Genome, Position, SimulationConfig, WorldState};
use gridlife_render::{RenderOptions, render_png};

fn empty_world(size: u32) -> WorldState {
    WorldState::new(SimulationConfig {
        size,
        population: 0,
        food_units: 0,
        rng_seed: Some(1),
        ..SimulationConfig::default()
    })
    .expect("world")
}

#[test]
fn renders_agents_food_and_border() {
    let mut world = empty_world(4);
    let genome = Genome::new(0x0F08);
    world
        .insert_agent(Agent::founder(AgentId(1), genome, Position::new(1, 2), 5))
        .expect("agent");
    world.place_food(Position::new(3, 0)).expect("food");

    let options = RenderOptions {
        cell_pixels: 5,
        border_width: 1,
    };
    let png = render_png(&world, &options).expect("render");
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let frame = image::load_from_memory(&png).expect("decode").to_rgba8();
    assert_eq!(frame.dimensions(), (22, 22));
    assert_eq!(frame.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(frame.get_pixel(21, 10).0, [0, 0, 0, 255]);
    assert_eq!(frame.get_pixel(1, 1).0, [255, 255, 255, 255]);

    let color = genome.color();
    let agent_px = frame.get_pixel(1 + 5 + 2, 1 + 10 + 2).0;
    assert_eq!(agent_px, [color.r, color.g, color.b, 255]);

    let food_px = frame.get_pixel(1 + 15 + 2, 1 + 2).0;
    assert_ne!(food_px, [255, 255, 255, 255]);
    assert_ne!(food_px, [0, 0, 0, 255]);
}

#[test]
fn populated_world_renders_at_expected_size() {
    let mut world = WorldState::new(SimulationConfig {
        size: 20,
        population: 15,
        food_units: 30,
        rng_seed: Some(42),
        ..SimulationConfig::default()
    })
    .expect("world");
    world.populate().expect("populate");
    world.step().expect("step");

    let png = render_png(&world, &RenderOptions::default()).expect("render");
    let frame = image::load_from_memory(&png).expect("decode");
    assert_eq!(frame.width(), 20 * 4 + 4);
    assert_eq!(frame.height(), 20 * 4 + 4);
}
