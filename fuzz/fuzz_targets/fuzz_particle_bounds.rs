#![no_main]

use flashreveal::config::{Bounds, ParticleBounds};
use flashreveal::particles::ParticleFieldGenerator;
use flashreveal::random::RngSource;
use libfuzzer_sys::fuzz_target;

fn read_f64(data: &[u8], i: usize) -> f64 {
    let mut bytes = [0u8; 8];
    for (j, b) in bytes.iter_mut().enumerate() {
        *b = data.get(i * 8 + j).copied().unwrap_or(0);
    }
    f64::from_le_bytes(bytes)
}

// Arbitrary (even NaN or inverted) bounds must never panic the sampler
fuzz_target!(|data: &[u8]| {
    let bounds = ParticleBounds {
        position: Bounds::new(read_f64(data, 0), read_f64(data, 1)),
        size: Bounds::new(read_f64(data, 2), read_f64(data, 3)),
        duration: Bounds::new(read_f64(data, 4), read_f64(data, 5)),
        delay: Bounds::new(read_f64(data, 6), read_f64(data, 7)),
    };
    let seed = u64::from_le_bytes(read_f64(data, 8).to_le_bytes());
    let palette = vec!["#fecdd3".to_string()];

    if let Ok(generator) = ParticleFieldGenerator::new(8, bounds, palette) {
        let field = generator.generate(&mut RngSource::seeded(seed));
        assert_eq!(field.len(), 8);
    }
});
