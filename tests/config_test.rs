use xwing_flow::{
    config::{CONFIG_FILE, DemoConfig, MovementMode, parse_hex_color},
    tween::Ease,
};

#[tokio::test]
async fn should_load_the_bundled_config() {
    let config = DemoConfig::load(CONFIG_FILE).await.unwrap();

    assert_eq!(config.model.path, "models/xWing/xWing-separate-wings.glb");
    assert_eq!(config.model.clip_index, 1);
    assert_eq!(config.particles.count, 3000);
    assert_eq!(config.movement.mode, MovementMode::Bank);
    assert_eq!(config.wings.open_angle, 0.3);
    assert_eq!(config.lights.directional.len(), 2);
    assert_eq!(config.tween.ease, Ease::Power1Out);
}

#[test]
fn should_read_a_linear_ease() {
    let config = DemoConfig::from_json(r#"{ "tween": { "ease": "linear" } }"#).unwrap();

    assert_eq!(config.tween.ease, Ease::Linear);
    assert_eq!(config.tween.duration, 0.5);
    assert!(DemoConfig::from_json(r#"{ "tween": { "ease": "bounce" } }"#).is_err());
}

#[tokio::test]
async fn should_fall_back_to_defaults_for_a_missing_file() {
    let config = DemoConfig::load_or_default("does-not-exist.json").await;

    assert_eq!(config.particles.count, DemoConfig::default().particles.count);
    assert_eq!(config.tween.duration, 0.5);
}

#[test]
fn should_reject_bad_light_colours() {
    let text = r##"{ "lights": {
        "ambient": { "color": "purple", "intensity": 0.8 },
        "directional": [
            { "color": "#78AFFF", "intensity": 1.6 },
            { "color": "#78AFFF", "intensity": 0.6 }
        ],
        "point": { "color": "#8EDBFF", "intensity": 0.5 }
    } }"##;
    assert!(DemoConfig::from_json(text).is_err());
}

#[test]
fn should_parse_colours_with_or_without_hash() {
    assert_eq!(parse_hex_color("#FFFFFF").unwrap(), [1.0, 1.0, 1.0]);
    assert_eq!(parse_hex_color("000000").unwrap(), [0.0, 0.0, 0.0]);
}
