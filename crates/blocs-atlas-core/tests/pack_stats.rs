use blocs_atlas_core::prelude::*;

fn tiles(n: usize, w: u32, h: u32) -> Vec<PixelImage> {
    (0..n)
        .map(|i| PixelImage::filled(format!("tex_{}", i), w, h, [0, 0, 0, 255]).expect("image"))
        .collect()
}

#[test]
fn test_pack_stats_basic() {
    let cfg = AtlasConfig::builder().size(256).build();
    let result = pack_images(&tiles(4, 64, 64), &cfg).expect("packing should succeed");
    let stats = result.stats();

    assert_eq!(stats.num_textures, 4);
    assert_eq!(stats.atlas_area, 256 * 256);
    // Each texture is 64x64 = 4096 pixels
    assert_eq!(stats.used_area, 4 * 64 * 64);
    assert_eq!(stats.padded_area, stats.used_area);
    assert!((stats.occupancy - 0.25).abs() < 1e-9, "Occupancy: {}", stats.occupancy);
    assert_eq!((stats.max_texture_width, stats.max_texture_height), (64, 64));
}

#[test]
fn test_pack_stats_counts_padding() {
    // padding = 2 * 1 + 2 = 4
    let cfg = AtlasConfig::builder().size(256).expand(1).border(2).build();
    let result = pack_images(&tiles(4, 64, 64), &cfg).expect("pack");
    let stats = result.stats();
    assert_eq!(stats.used_area, 4 * 64 * 64);
    assert_eq!(stats.padded_area, 4 * 68 * 68);
}

#[test]
fn test_wasted_area() {
    let cfg = AtlasConfig::builder().size(100).build();
    let result = pack_images(&tiles(2, 50, 50), &cfg).expect("pack");
    let stats = result.stats();

    assert_eq!(stats.wasted_area(), 10_000 - 5_000);
    assert!((stats.waste_percentage() - 50.0).abs() < 1e-9);
}

#[test]
fn test_summary_mentions_counts() {
    let cfg = AtlasConfig::builder().size(128).build();
    let result = pack_images(&tiles(3, 16, 16), &cfg).expect("pack");
    let summary = result.stats().summary();
    assert!(summary.contains("Textures: 3"), "{}", summary);
    assert!(summary.contains("Occupancy:"), "{}", summary);
}

#[test]
fn test_stats_serialize() {
    let cfg = AtlasConfig::builder().size(64).build();
    let result = pack_images(&tiles(1, 8, 8), &cfg).expect("pack");
    let value = serde_json::to_value(result.stats()).expect("json");
    assert_eq!(value["num_textures"], 1);
    assert_eq!(value["used_area"], 64);
}
