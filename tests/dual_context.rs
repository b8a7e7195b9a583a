//! The dual-context contract: the interactive path and the background
//! worker path must produce byte-identical blobs for the same inputs.

use std::io::Cursor;
use std::time::Duration;

use enframe::{
    BackendKind, BatchProgress, FrameConfig, FrameWorker, InMemoryExport, OutputFormat, SourceFile,
    WorkResponse, create_backend, decode_image, decode_raw_rgba8, export_all, process_batch,
    process_batch_with, render_blob,
};

fn png_fixture(w: u32, h: u32, seed: u8) -> Vec<u8> {
    let rgba: Vec<u8> = (0..w * h * 4)
        .map(|i| seed.wrapping_add((i % 249) as u8))
        .collect();
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn decorated_config() -> FrameConfig {
    FrameConfig {
        width: 64,
        height: 64,
        background: "#f5f5f5".to_owned(),
        padding: 8,
        border_radius: 6,
        shadow: true,
        shadow_spread: 5,
        border: true,
        border_color: "#333333".to_owned(),
        border_width: 2,
        ..FrameConfig::default()
    }
}

#[test]
fn worker_output_matches_interactive_output_byte_for_byte() {
    let png = png_fixture(24, 18, 7);
    let config = decorated_config();

    // Interactive path: decode directly, render on the calling thread.
    let image = decode_image(&png).unwrap();
    let mut backend = create_backend(BackendKind::Cpu).unwrap();
    let interactive = render_blob(&image, &config, backend.as_mut()).unwrap();

    // Worker path: raw pixel buffer through the background context.
    let raw = decode_raw_rgba8(&png).unwrap();
    let mut worker = FrameWorker::spawn().unwrap();
    let id = worker.submit(raw, config).unwrap();
    let response = loop {
        if let Some(r) = worker.recv_timeout(Duration::from_secs(10)).unwrap() {
            break r;
        }
    };

    match response {
        WorkResponse::Result { id: rid, blob } => {
            assert_eq!(rid, id);
            assert_eq!(blob.bytes, interactive.bytes);
            assert_eq!(blob.format, interactive.format);
        }
        WorkResponse::Error { message, .. } => panic!("worker failed: {message}"),
    }
}

#[test]
fn batch_with_one_undecodable_file_completes_partially() {
    let files = vec![
        SourceFile {
            name: "Sunset Beach.png".to_owned(),
            bytes: png_fixture(12, 12, 1),
        },
        SourceFile {
            name: "corrupt.png".to_owned(),
            bytes: vec![0xde, 0xad, 0xbe, 0xef],
        },
        SourceFile {
            name: "city at night.jpeg".to_owned(),
            bytes: png_fixture(12, 12, 2),
        },
    ];
    let config = FrameConfig {
        width: 32,
        height: 32,
        format: OutputFormat::Jpeg,
        ..FrameConfig::default()
    };

    let outcome = process_batch(&files, &config).unwrap();
    assert_eq!(outcome.items.len(), 2);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.items[0].filename, "sunset_beach.jpg");
    assert_eq!(outcome.items[1].filename, "city_at_night.jpg");
    assert_eq!(outcome.errors[0].filename, "corrupt.png");

    // Finished items flow into the export boundary unchanged.
    let mut sink = InMemoryExport::new();
    export_all(&outcome.items, &mut sink).unwrap();
    assert_eq!(sink.total(), Some(2));
    assert!(sink.is_ended());
    assert_eq!(sink.items().len(), 2);
    for item in sink.items() {
        assert_eq!(item.result.mime(), "image/jpeg");
        assert!(!item.result.bytes.is_empty());
    }
}

#[test]
fn batch_progress_reaches_total_even_with_failures() {
    let files = vec![
        SourceFile {
            name: "ok.png".to_owned(),
            bytes: png_fixture(8, 8, 3),
        },
        SourceFile {
            name: "nope".to_owned(),
            bytes: vec![1],
        },
    ];
    let config = FrameConfig {
        width: 16,
        height: 16,
        ..FrameConfig::default()
    };

    let mut last = None;
    let outcome = process_batch_with(&files, &config, |p| last = Some(p)).unwrap();
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(
        last,
        Some(BatchProgress {
            completed: 2,
            total: 2
        })
    );
}

#[test]
fn batch_results_are_deterministic_across_runs() {
    let files = vec![
        SourceFile {
            name: "a.png".to_owned(),
            bytes: png_fixture(20, 14, 11),
        },
        SourceFile {
            name: "b.png".to_owned(),
            bytes: png_fixture(10, 30, 23),
        },
    ];
    let config = decorated_config();

    let first = process_batch(&files, &config).unwrap();
    let second = process_batch(&files, &config).unwrap();

    assert_eq!(first.items.len(), second.items.len());
    for (x, y) in first.items.iter().zip(second.items.iter()) {
        assert_eq!(x.filename, y.filename);
        assert_eq!(x.result.bytes, y.result.bytes);
    }
}
