use super::*;
use serde_json::json;

fn parse(kind: &str, params: serde_json::Value) -> FxResult<EffectSpec> {
    parse_effect(&EffectInstance::new(kind, params))
}

#[test]
fn kind_aliases() {
    for k in ["reverse", "Reverse", " REVERSE "] {
        assert_eq!(parse(k, json!({})).unwrap(), EffectSpec::Reverse);
    }
    for k in ["fadeInOut", "fade_in_out", "fade-in-out"] {
        assert!(matches!(
            parse(k, json!({"fade_in_secs": 1, "fade_out_secs": 2})).unwrap(),
            EffectSpec::FadeInOut { .. }
        ));
    }
    for k in ["earthquake", "jitter", "Earthquake"] {
        assert_eq!(
            parse(k, json!({"strength": 4})).unwrap(),
            EffectSpec::Jitter {
                strength: 4,
                seed: None
            }
        );
    }
    assert_eq!(
        parse("crossFade", json!({"duration_secs": 0.5})).unwrap(),
        EffectSpec::CrossFade { duration_secs: 0.5 }
    );
    assert_eq!(
        parse("motion_blur", json!({"blur_frames": 3})).unwrap(),
        EffectSpec::MotionBlur { blur_frames: 3 }
    );
}

#[test]
fn numeric_strings_are_accepted() {
    assert_eq!(
        parse("motionBlur", json!({"blur_frames": "5"})).unwrap(),
        EffectSpec::MotionBlur { blur_frames: 5 }
    );
    assert_eq!(
        parse("jitter", json!({"strength": "2", "seed": "99"})).unwrap(),
        EffectSpec::Jitter {
            strength: 2,
            seed: Some(99)
        }
    );
}

#[test]
fn bad_params_are_config_errors() {
    let cases = [
        ("fadeInOut", json!({"fade_in_secs": 1})),
        ("fadeInOut", json!({"fade_in_secs": -1, "fade_out_secs": 1})),
        ("motionBlur", json!({"blur_frames": 0})),
        ("motionBlur", json!({"blur_frames": 1.5})),
        ("motionBlur", json!({"blur_frames": "lots"})),
        ("jitter", json!({"strength": -3})),
        ("jitter", json!({"strength": 5_000_000_000u64})),
        ("crossFade", json!({"duration_secs": true})),
        ("crossFade", json!({})),
        ("sparkle", json!({})),
        ("", json!({})),
    ];
    for (kind, params) in cases {
        let err = parse(kind, params.clone()).unwrap_err();
        assert!(err.is_config(), "{kind} {params}: {err}");
    }
}

#[test]
fn deserializes_without_params() {
    let inst: EffectInstance = serde_json::from_str(r#"{"kind":"reverse"}"#).unwrap();
    assert_eq!(inst.params, serde_json::Value::Null);
    assert_eq!(parse_effect(&inst).unwrap(), EffectSpec::Reverse);
}

#[test]
fn build_matches_kind() {
    let specs = [
        (EffectSpec::Reverse, "reverse"),
        (
            EffectSpec::FadeInOut {
                fade_in_secs: 1.0,
                fade_out_secs: 1.0,
            },
            "fade_in_out",
        ),
        (EffectSpec::MotionBlur { blur_frames: 2 }, "motion_blur"),
        (
            EffectSpec::Jitter {
                strength: 1,
                seed: None,
            },
            "jitter",
        ),
        (EffectSpec::CrossFade { duration_secs: 1.0 }, "cross_fade"),
    ];
    for (spec, name) in specs {
        assert_eq!(build_effect(&spec).name(), name);
        assert_eq!(spec.requires_secondary(), name == "cross_fade");
    }
}
