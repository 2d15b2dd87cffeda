use xwing_flow::{
    clock::{FrameClock, FrameTime},
    config::{DemoConfig, MovementMode},
    data_structures::{
        instance::Instance,
        scene_graph::{NodeCaps, SceneNode},
    },
    particles::ParticleField,
    session::SceneSession,
    viewport::Viewport,
};

pub const SEED: u64 = 7;
/// One 60 Hz frame.
pub const FRAME: f32 = 1.0 / 60.0;

pub fn small_config() -> DemoConfig {
    let mut config = DemoConfig::default();
    config.particles.count = 64;
    config
}

pub fn config_with_mode(mode: MovementMode) -> DemoConfig {
    let mut config = small_config();
    config.movement.mode = mode;
    config
}

/// A model root shaped like the X-Wing: a hull and four wings at the top level.
pub fn ship_tree() -> SceneNode {
    let mut root = SceneNode::new("xWing");
    let hull = SceneNode::new("Hull").with_mesh(0, NodeCaps::STANDARD_MATERIAL);
    root.add_child(hull);
    for (idx, name) in ["WingRT", "WingLT", "WingRB", "WingLB"].iter().enumerate() {
        let mut wing = SceneNode::new(*name)
            .with_transform(Instance::new())
            .with_mesh(1, NodeCaps::STANDARD_MATERIAL);
        wing.gltf_index = Some(idx + 1);
        root.add_child(wing);
    }
    root.assign_ids(0);
    root
}

pub fn session(config: &DemoConfig) -> SceneSession {
    let viewport = Viewport::new(800, 600, 1.0);
    let particles = ParticleField::with_seed(&config.particles, SEED);
    SceneSession::with_particles(config, &viewport, particles).unwrap()
}

/// A session whose ship and wings are bound to [`ship_tree`].
pub fn bound_session(config: &DemoConfig) -> (SceneSession, SceneNode) {
    let mut session = session(config);
    let mut root = ship_tree();
    session.bind_ship(&mut root, Vec::new());
    (session, root)
}

/// Ticks `session` at 60 Hz for `seconds`.
pub fn run_for(session: &mut SceneSession, clock: &mut FrameClock, seconds: f32) -> FrameTime {
    let frames = (seconds / FRAME).ceil() as usize;
    let mut time = FrameTime::default();
    for _ in 0..frames {
        time = clock.advance_to(clock.elapsed() + FRAME);
        session.tick(time);
    }
    time
}
