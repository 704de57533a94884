//! Behavioral properties of the compositor, timing and encoder driver.

use anim_core::prelude::*;
use anim_core::{derive_rate, encoder::EncoderProfile, VecSource};

const RED: Rgba8 = Rgba8 { r: 255, g: 0, b: 0, a: 255 };

fn checker(w: u32, h: u32, seed: u8) -> Vec<u8> {
    (0..w * h)
        .flat_map(|i| {
            let v = (i as u8).wrapping_mul(31).wrapping_add(seed);
            [v, v.wrapping_add(7), v.wrapping_add(13), 255]
        })
        .collect()
}

#[test]
fn pure_overwrite_reproduces_input() {
    let inputs: Vec<Vec<u8>> = (0..3).map(|i| checker(5, 3, i * 40)).collect();
    let patches = inputs
        .iter()
        .map(|d| Patch::new(0, 0, 5, 3, d.clone()).unwrap())
        .collect::<Vec<_>>();

    let frames = composite(patches, 5, 3).unwrap();
    assert_eq!(frames.len(), 3);
    for (frame, input) in frames.iter().zip(&inputs) {
        assert_eq!(frame.pixels(), input.as_slice());
    }
}

#[test]
fn opaque_alpha_blend_equals_source() {
    let under = Patch::solid(0, 0, 4, 4, Rgba8::new(1, 2, 3, 200)).unwrap();
    let over = Patch::new(0, 0, 4, 4, checker(4, 4, 9))
        .unwrap()
        .with_blend(BlendMethod::AlphaBlend);
    let expected = over.data().to_vec();

    let frames = composite(vec![under, over], 4, 4).unwrap();
    assert_eq!(frames[1].pixels(), expected.as_slice());
}

#[test]
fn compositing_is_deterministic() {
    let build = || {
        vec![
            Patch::solid(0, 0, 6, 6, RED).unwrap().with_duration(30),
            Patch::solid(2, -1, 3, 4, Rgba8::new(0, 0, 255, 90))
                .unwrap()
                .with_blend(BlendMethod::AlphaBlend)
                .with_dispose(DisposeMethod::Background),
            Patch::solid(4, 4, 5, 5, Rgba8::new(10, 200, 10, 255)).unwrap(),
        ]
    };
    assert_eq!(composite(build(), 6, 6).unwrap(), composite(build(), 6, 6).unwrap());
}

#[test]
fn off_canvas_patch_repeats_background() {
    let patches = vec![
        Patch::solid(0, 0, 3, 3, RED).unwrap(),
        Patch::solid(10, 10, 2, 2, Rgba8::new(0, 255, 0, 255)).unwrap(),
        Patch::solid(-5, 0, 2, 2, Rgba8::new(0, 255, 0, 255)).unwrap(),
    ];
    let frames = composite(patches, 3, 3).unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1].canvas, frames[0].canvas);
    assert_eq!(frames[2].canvas, frames[0].canvas);
}

#[test]
fn empty_sequence_yields_empty_store() {
    let store = decode(VecSource::new(16, 16, Vec::new()), &mut NoProgress).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.rate(), 0.0);
}

#[test]
fn red_then_half_green_scenario() {
    let red = Patch::solid(0, 0, 4, 4, RED).unwrap().with_duration(50);
    let green = Patch::solid(1, 1, 2, 2, Rgba8::new(0, 255, 0, 128))
        .unwrap()
        .with_blend(BlendMethod::AlphaBlend)
        .with_dispose(DisposeMethod::Background)
        .with_duration(50);

    let state = Compositor::new(4, 4).unwrap();
    let (state, first) = state.step(&red);
    let (state, second) = state.step(&green);

    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(first.canvas.pixel_at(x, y).unwrap(), RED);

            let inside = (1..3).contains(&x) && (1..3).contains(&y);
            let px = second.canvas.pixel_at(x, y).unwrap();
            let bg = state.background().pixel_at(x, y).unwrap();
            if inside {
                assert_eq!(px, Rgba8::new(127, 128, 0, 255));
                assert_eq!(bg, Rgba8::TRANSPARENT);
            } else {
                assert_eq!(px, RED);
                assert_eq!(bg, RED);
            }
        }
    }

    assert_eq!(derive_rate(&[first, second]), 20.0);
}

#[test]
fn decode_then_encode_drives_session() {
    struct Count(usize, Option<EncoderProfile>);

    impl PatchEncoder for &mut Count {
        type Error = std::convert::Infallible;

        fn add(
            &mut self,
            _frame: &Canvas,
            _timestamp_ms: u64,
            profile: &EncoderProfile,
        ) -> std::result::Result<(), Self::Error> {
            self.0 += 1;
            self.1 = Some(*profile);
            Ok(())
        }

        fn assemble(self, _end: u64) -> std::result::Result<Vec<u8>, Self::Error> {
            Ok(vec![self.0 as u8])
        }
    }

    let patches = vec![
        Patch::solid(0, 0, 2, 2, RED).unwrap().with_duration(100),
        Patch::solid(1, 1, 1, 1, Rgba8::new(0, 0, 0, 255)).unwrap().with_duration(100),
    ];
    let store = decode(VecSource::new(2, 2, patches), &mut NoProgress).unwrap();
    assert_eq!(store.rate(), 10.0);

    let mut count = Count(0, None);
    let config = EncodeConfig::default().with_quality(100).with_rate(store.rate());
    let bytes = encode(&store, &config, &mut count, &mut NoProgress).unwrap();
    assert_eq!(bytes, vec![2]);
    assert!(count.1.unwrap().lossless);
}
