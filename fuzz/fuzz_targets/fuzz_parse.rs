// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;
use mdexport_core::{normalize, parse, RenderConfig, RendererRegistry, TargetFormat};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let line_count = text.split('\n').count();
    let blocks = parse(text);

    let mut cursor = 0;
    for block in &blocks {
        let span = block.span();
        assert!(span.start >= cursor && span.start < span.end && span.end <= line_count);
        cursor = span.end;
    }

    assert!(normalize(text).len() <= text.len());

    let registry = RendererRegistry::default();
    for target in TargetFormat::ALL {
        let _ = registry.render(&blocks, target, &RenderConfig::default());
    }
});
