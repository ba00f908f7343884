use blocs_atlas_core::prelude::*;

fn layout() -> Atlas {
    let cfg = AtlasConfig::builder().size(256).build();
    let items = vec![
        LayoutItem {
            key: "a".into(),
            w: 32,
            h: 16,
        },
        LayoutItem {
            key: "b".into(),
            w: 10,
            h: 10,
        },
    ];
    pack_layout(&items, &cfg).expect("pack")
}

#[test]
fn export_json_matches_manifest_layout() {
    let manifest = layout().manifest();
    let v = to_json(&manifest);
    let obj = v.as_object().expect("object");
    assert_eq!(obj["w"], 256);
    assert_eq!(obj["h"], 256);
    assert_eq!(obj["n"], 2);

    let textures = obj["textures"].as_array().expect("array");
    assert_eq!(textures.len(), 2);
    assert_eq!(textures[0]["n"], "a");
    assert_eq!(textures[0]["w"], 32);
    assert_eq!(textures[0]["h"], 16);
    assert_eq!(textures[1]["n"], "b");
    for t in textures {
        for field in ["n", "x", "y", "w", "h"] {
            assert!(t.get(field).is_some(), "missing {field}");
        }
    }

    // serde derive and the hand-built value agree
    assert_eq!(serde_json::to_value(&manifest).expect("serde"), v);
}

#[test]
fn export_json_hash_keys_by_name() {
    let manifest = layout().manifest();
    let v = to_json_hash(&manifest);
    let obj = v.as_object().expect("object");
    assert_eq!(obj["size"]["w"], 256);
    let frames = obj["frames"].as_object().expect("frames");
    assert_eq!(frames.len(), 2);
    assert_eq!(frames["a"]["w"], 32);
    assert_eq!(frames["b"]["h"], 10);
}

#[test]
fn manifest_round_trips_through_serde() {
    let manifest = layout().manifest();
    let text = serde_json::to_string_pretty(&to_json(&manifest)).expect("text");
    let back: Manifest = serde_json::from_str(&text).expect("parse");
    assert_eq!(back, manifest);
}
