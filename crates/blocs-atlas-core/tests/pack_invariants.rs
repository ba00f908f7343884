use blocs_atlas_core::config::UTILIZATION_CEILING;
use blocs_atlas_core::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

fn cfg(size: u32, expand: u32, border: u32) -> AtlasConfig {
    AtlasConfig::builder()
        .size(size)
        .expand(expand)
        .border(border)
        .build()
}

fn assert_disjoint(rects: &[Rect], expand: u32, border: u32) {
    let slots: Vec<Rect> = rects.iter().map(|r| r.padded_extent(expand, border)).collect();
    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            assert!(
                !slots[i].intersects(&slots[j]),
                "padded slots {:?} and {:?} overlap",
                slots[i],
                slots[j]
            );
        }
    }
}

fn assert_contained(rects: &[Rect], size: u32, expand: u32) {
    for r in rects {
        assert!(r.x >= expand && r.y >= expand, "{:?} starts inside the margin", r);
        assert!(r.x + r.w + expand <= size, "{:?} leaves the atlas on the right", r);
        assert!(r.y + r.h + expand <= size, "{:?} leaves the atlas at the bottom", r);
    }
}

fn random_sizes(seed: u64, size: u32, padding: u32, fill: f64) -> Vec<Size> {
    let mut rng = StdRng::seed_from_u64(seed);
    let budget = (size as f64) * (size as f64) * UTILIZATION_CEILING * fill;
    let mut area = 0.0;
    let mut out = Vec::new();
    while area < budget {
        let s = Size::new(rng.gen_range(1..=48), rng.gen_range(1..=48));
        area += s.padded(padding).area() as f64;
        out.push(s);
    }
    out
}

#[test]
fn three_rectangles_fit_in_960() {
    let sizes = [Size::new(400, 80), Size::new(80, 400), Size::new(250, 250)];
    let placed = pack_rects(&sizes, &cfg(960, 0, 0)).expect("pack");

    // tallest first: 80x400 at the origin, then 250x250 and 400x80 along its shelf
    assert_eq!(placed[0], Rect::new(330, 0, 400, 80));
    assert_eq!(placed[1], Rect::new(0, 0, 80, 400));
    assert_eq!(placed[2], Rect::new(80, 0, 250, 250));

    assert_disjoint(&placed, 0, 0);
    let bounds = Rect::new(0, 0, 960, 960);
    for r in &placed {
        assert!(bounds.contains(r));
    }
}

#[test]
fn sizes_are_preserved_in_input_order() {
    let sizes = [Size::new(7, 3), Size::new(2, 9), Size::new(5, 5)];
    let placed = pack_rects(&sizes, &cfg(64, 1, 1)).expect("pack");
    for (s, r) in sizes.iter().zip(&placed) {
        assert_eq!(r.size(), *s);
    }
}

#[test]
fn equal_heights_keep_input_order() {
    let sizes = [Size::new(10, 20), Size::new(30, 20), Size::new(5, 20)];
    let placed = pack_rects(&sizes, &cfg(100, 0, 0)).expect("pack");
    let xs: Vec<u32> = placed.iter().map(|r| r.x).collect();
    assert_eq!(xs, vec![0, 10, 40]);
    assert!(placed.iter().all(|r| r.y == 0));
}

#[test]
fn layout_is_deterministic() {
    let sizes = random_sizes(11, 512, 3, 0.5);
    let c = cfg(512, 1, 1);
    let a = pack_rects(&sizes, &c).expect("first");
    let b = pack_rects(&sizes, &c).expect("second");
    assert_eq!(a, b);
}

#[test]
fn random_sets_are_disjoint_and_contained() {
    for seed in 0..8u64 {
        let (size, expand, border) = (1024, 1, 2);
        let sizes = random_sizes(seed, size, expand * 2 + border, 0.4);
        let placed = pack_rects(&sizes, &cfg(size, expand, border))
            .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
        assert_eq!(placed.len(), sizes.len());
        assert_disjoint(&placed, expand, border);
        assert_contained(&placed, size, expand);

        let used: u64 = placed.iter().map(|r| r.area()).sum();
        assert!(used <= (size as u64) * (size as u64));
    }
}

#[test]
fn border_only_padding_leaves_gaps() {
    let sizes = [Size::new(10, 10), Size::new(10, 10)];
    let placed = pack_rects(&sizes, &cfg(64, 0, 3)).expect("pack");
    assert_eq!(placed[0], Rect::new(0, 0, 10, 10));
    // second lands on the shelf right of the first, after the 3px border
    assert_eq!(placed[1], Rect::new(13, 0, 10, 10));
    assert_disjoint(&placed, 0, 3);
}
