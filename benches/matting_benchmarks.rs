//! Performance benchmarks for deep-image-matting
//!
//! Measures trimap generation, crop selection, cropping and the metrics on
//! photograph-sized masks, plus a forward pass of a small network.

use candle_core::{Device, Tensor};
use criterion::*;
use deep_image_matting::config::CROP_SIZE;
use deep_image_matting::{
    compute_mse_loss, compute_sad_loss, crop_top_left, ComposeWithTrimap, GenerateTrimap, Image,
    MattingNet, NetworkConfig, SafeCrop, TrimapConfig,
};
use image::{Luma, Rgb};
use itertools::iproduct;
use std::hint::black_box;

/// Alpha mask with an opaque disc and a soft edge
fn create_alpha_mask(width: u32, height: u32) -> Image<Luma<u8>> {
    let mut mask: Image<Luma<u8>> = Image::new(width, height);

    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = (width.min(height) as f32) / 3.0;

    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let distance = (x as f32 - center_x).hypot(y as f32 - center_y);
        let coverage = ((radius + 4.0 - distance) / 4.0).clamp(0.0, 1.0);
        mask.put_pixel(x, y, Luma([(coverage * 255.0) as u8]));
    });

    mask
}

fn create_rgb_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| {
        Rgb([((x * 255) / width) as u8, ((y * 255) / height) as u8, 128])
    })
}

const SIZES: [(u32, u32); 3] = [
    (320, 320),   // Network input
    (800, 600),   // Medium
    (1920, 1080), // HD
];

fn bench_generate_trimap(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_trimap");
    group.sample_size(10);

    for (width, height) in SIZES {
        group.throughput(Throughput::Elements(u64::from(width * height)));
        let alpha = create_alpha_mask(width, height);

        for band_width in [5u8, 10, 20] {
            group.bench_with_input(
                BenchmarkId::new(format!("band{band_width}"), format!("{width}x{height}")),
                &alpha,
                |b, alpha| {
                    let config = TrimapConfig::new(band_width);
                    b.iter(|| black_box(alpha.generate_trimap(&config).unwrap()))
                },
            );
        }
    }

    group.finish();
}

fn bench_crop_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("crop_top_left");
    group.sample_size(10);

    for (width, height) in SIZES {
        let trimap = create_alpha_mask(width, height)
            .generate_trimap(&TrimapConfig::default())
            .unwrap();

        // Large masks exercise the densest-window scan, small ones the centred path.
        group.bench_with_input(
            BenchmarkId::new("crop_320", format!("{width}x{height}")),
            &trimap,
            |b, trimap| b.iter(|| black_box(crop_top_left(trimap, CROP_SIZE))),
        );
    }

    group.finish();
}

fn bench_safe_crop(c: &mut Criterion) {
    let mut group = c.benchmark_group("safe_crop");

    let image = create_rgb_image(1920, 1080);
    for crop_size in [(320, 320), (480, 480), (640, 640)] {
        group.bench_with_input(
            BenchmarkId::new("rgb", format!("{}x{}", crop_size.0, crop_size.1)),
            &crop_size,
            |b, &crop_size| b.iter(|| black_box(image.safe_crop(1700, 900, crop_size).unwrap())),
        );
    }

    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");

    let alpha = create_alpha_mask(320, 320);
    let trimap = alpha.generate_trimap(&TrimapConfig::default()).unwrap();
    let guess: Image<Luma<u8>> = Image::from_pixel(320, 320, Luma([128]));
    let prediction = guess.compose_with_trimap(&trimap).unwrap();

    group.bench_function("mse_320", |b| {
        b.iter(|| black_box(compute_mse_loss(&prediction, &alpha, &trimap).unwrap()))
    });
    group.bench_function("sad_320", |b| {
        b.iter(|| black_box(compute_sad_loss(&prediction, &alpha, &trimap).unwrap()))
    });
    group.bench_function("compose_320", |b| {
        b.iter(|| black_box(guess.compose_with_trimap(&trimap).unwrap()))
    });

    group.finish();
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("matting_net");
    group.sample_size(10);

    let device = Device::Cpu;
    for size in [32usize, 64] {
        let config = NetworkConfig::new(size, size, 4).unwrap();
        let network = MattingNet::new(config, &device).unwrap();
        let input = Tensor::rand(0f32, 1f32, (1, 4, size, size), &device).unwrap();

        group.bench_with_input(
            BenchmarkId::new("forward", format!("{size}x{size}")),
            &input,
            |b, input| b.iter(|| black_box(network.forward(input).unwrap())),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_generate_trimap,
    bench_crop_selection,
    bench_safe_crop,
    bench_metrics,
    bench_forward,
);
criterion_main!(benches);
