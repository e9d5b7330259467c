#![no_main]

use flashreveal::config::{ConfigLoader, LoaderOptions};
use flashreveal::particles::ParticleFieldGenerator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };
    let loader = ConfigLoader::new(LoaderOptions {
        ignore_env: true,
        ..LoaderOptions::default()
    });

    // Anything that validates must yield a usable generator
    if let Ok(loaded) = loader.load_str(yaml, "<fuzz>") {
        assert!(ParticleFieldGenerator::from_config(&loaded.config).is_ok());
    }
});
