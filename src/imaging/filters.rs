//! Parameterless filters.
//!
//! Kernel sizes and thresholds are fixed constants, chosen to match the
//! look of the classic desktop operations (15×15 Gaussian blur, 3×3
//! sharpen, Canny with 100/200 hysteresis, 11×11 Gaussian adaptive
//! threshold). Neighborhood kernels replicate edge pixels at the border.
//!
//! Callers go through [`super::transform::apply`], which has already
//! rejected empty and indexed buffers.

use super::buffer::{ChannelLayout, ImageBuffer};
use super::color::{luma, rgb_to_ycbcr, saturate_u8, ycbcr_to_rgb};
use super::transform::{map_color_channels, map_pixels};
use rayon::prelude::*;

const BLUR_KSIZE: usize = 15;
/// Sigma OpenCV derives for a 15-tap kernel: `0.3 * ((k - 1) / 2 - 1) + 0.8`.
const BLUR_SIGMA: f32 = 2.6;

const CANNY_LOW: i32 = 100;
const CANNY_HIGH: i32 = 200;

const THRESHOLD_BLOCK: usize = 11;
const THRESHOLD_SIGMA: f32 = 2.0;
const THRESHOLD_C: f32 = 2.0;

fn copy_of(input: &ImageBuffer) -> ImageBuffer {
    ImageBuffer::from_parts(input.width(), input.height(), input.layout(), input.pixels().to_vec())
}

/// Luminance-only conversion. Already-gray buffers come back unchanged,
/// which makes the filter idempotent.
pub(crate) fn grayscale(input: &ImageBuffer) -> ImageBuffer {
    match input.layout() {
        ChannelLayout::Rgb => map_pixels(input, ChannelLayout::Gray, |p, o| {
            o[0] = luma(p[0], p[1], p[2]);
        }),
        ChannelLayout::Rgba => map_pixels(input, ChannelLayout::GrayAlpha, |p, o| {
            o[0] = luma(p[0], p[1], p[2]);
            o[1] = p[3];
        }),
        ChannelLayout::Gray | ChannelLayout::GrayAlpha | ChannelLayout::Indexed => copy_of(input),
    }
}

/// Normalized 1-D Gaussian of odd length `ksize`.
fn gaussian_kernel(ksize: usize, sigma: f32) -> Vec<f32> {
    let radius = (ksize / 2) as f32;
    let s2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let x = i as f32 - radius;
            (-x * x / s2).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable convolution of interleaved `c`-channel data. Returns unrounded
/// values so callers can threshold against them precisely.
fn separable_blur(src: &[u8], w: usize, h: usize, c: usize, kernel: &[f32]) -> Vec<f32> {
    let radius = (kernel.len() / 2) as isize;
    let stride = w * c;

    let mut horizontal = vec![0.0f32; stride * h];
    horizontal
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src[y * stride..(y + 1) * stride];
            for x in 0..w {
                for ch in 0..c {
                    let mut acc = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        let sx = (x as isize + ki as isize - radius).clamp(0, w as isize - 1) as usize;
                        acc += row_in[sx * c + ch] as f32 * kv;
                    }
                    row_out[x * c + ch] = acc;
                }
            }
        });

    let mut vertical = vec![0.0f32; stride * h];
    vertical
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for (i, out) in row_out.iter_mut().enumerate() {
                let mut acc = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sy = (y as isize + ki as isize - radius).clamp(0, h as isize - 1) as usize;
                    acc += horizontal[sy * stride + i] * kv;
                }
                *out = acc;
            }
        });

    vertical
}

/// Gaussian blur over every channel, alpha included.
pub(crate) fn blur(input: &ImageBuffer) -> ImageBuffer {
    let (w, h) = (input.width() as usize, input.height() as usize);
    let kernel = gaussian_kernel(BLUR_KSIZE, BLUR_SIGMA);
    let blurred = separable_blur(input.pixels(), w, h, input.channels(), &kernel);
    let pixels = blurred.into_par_iter().map(saturate_u8).collect();
    ImageBuffer::from_parts(input.width(), input.height(), input.layout(), pixels)
}

/// 3×3 sharpen (`9` center, `-1` around). Alpha is copied.
pub(crate) fn sharpen(input: &ImageBuffer) -> ImageBuffer {
    let (w, h) = (input.width() as usize, input.height() as usize);
    let c = input.channels();
    let color = input.layout().color_channels();
    let src = input.pixels();
    let stride = w * c;
    let mut dst = vec![0u8; stride * h];

    dst.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        for x in 0..w {
            for ch in 0..c {
                let center = src[y * stride + x * c + ch] as i32;
                if ch >= color {
                    row_out[x * c + ch] = center as u8;
                    continue;
                }
                let mut acc = 0i32;
                for dy in -1isize..=1 {
                    let sy = (y as isize + dy).clamp(0, h as isize - 1) as usize;
                    for dx in -1isize..=1 {
                        let sx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
                        acc -= src[sy * stride + sx * c + ch] as i32;
                    }
                }
                // The loop subtracted the center once; the kernel weight is +9.
                acc += 10 * center;
                row_out[x * c + ch] = acc.clamp(0, 255) as u8;
            }
        }
    });

    ImageBuffer::from_parts(input.width(), input.height(), input.layout(), dst)
}

/// One luminance byte per pixel.
fn luma_plane(input: &ImageBuffer) -> Vec<u8> {
    let c = input.channels();
    match input.layout() {
        ChannelLayout::Rgb | ChannelLayout::Rgba => input
            .pixels()
            .par_chunks_exact(c)
            .map(|p| luma(p[0], p[1], p[2]))
            .collect(),
        _ => input.pixels().par_chunks_exact(c).map(|p| p[0]).collect(),
    }
}

/// Canny edge map: Sobel gradient (L1 magnitude), non-maximum suppression,
/// then hysteresis between the low and high thresholds. Output is a
/// single-channel map of 0 and 255.
pub(crate) fn edge_detection(input: &ImageBuffer) -> ImageBuffer {
    let (w, h) = (input.width() as usize, input.height() as usize);
    let gray = luma_plane(input);
    let at = |x: isize, y: isize| -> i32 {
        let sx = x.clamp(0, w as isize - 1) as usize;
        let sy = y.clamp(0, h as isize - 1) as usize;
        gray[sy * w + sx] as i32
    };

    let mut gx = vec![0i32; w * h];
    let mut gy = vec![0i32; w * h];
    gx.par_chunks_mut(w)
        .zip(gy.par_chunks_mut(w))
        .enumerate()
        .for_each(|(y, (row_x, row_y))| {
            let y = y as isize;
            for x in 0..w {
                let xi = x as isize;
                row_x[x] = (at(xi + 1, y - 1) + 2 * at(xi + 1, y) + at(xi + 1, y + 1))
                    - (at(xi - 1, y - 1) + 2 * at(xi - 1, y) + at(xi - 1, y + 1));
                row_y[x] = (at(xi - 1, y + 1) + 2 * at(xi, y + 1) + at(xi + 1, y + 1))
                    - (at(xi - 1, y - 1) + 2 * at(xi, y - 1) + at(xi + 1, y - 1));
            }
        });
    let magnitude: Vec<i32> = gx.par_iter().zip(gy.par_iter()).map(|(a, b)| a.abs() + b.abs()).collect();

    let mag = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            magnitude[y as usize * w + x as usize]
        }
    };

    // 0 = suppressed, 1 = weak candidate, 2 = strong.
    let mut class = vec![0u8; w * h];
    class.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let yi = y as isize;
        for x in 0..w {
            let i = y * w + x;
            let m = magnitude[i];
            if m <= CANNY_LOW {
                continue;
            }
            let (ax, ay) = (gx[i].abs() as i64, gy[i].abs() as i64);
            let xi = x as isize;
            let (n1, n2) = if ay * 1000 < ax * 414 {
                (mag(xi - 1, yi), mag(xi + 1, yi))
            } else if ay * 1000 > ax * 2414 {
                (mag(xi, yi - 1), mag(xi, yi + 1))
            } else if (gx[i] >= 0) == (gy[i] >= 0) {
                (mag(xi - 1, yi - 1), mag(xi + 1, yi + 1))
            } else {
                (mag(xi + 1, yi - 1), mag(xi - 1, yi + 1))
            };
            if m > n1 && m >= n2 {
                row[x] = if m > CANNY_HIGH { 2 } else { 1 };
            }
        }
    });

    let mut out = vec![0u8; w * h];
    let mut stack: Vec<usize> = (0..w * h).filter(|&i| class[i] == 2).collect();
    for &i in &stack {
        out[i] = 255;
    }
    while let Some(i) = stack.pop() {
        let (x, y) = ((i % w) as isize, (i / w) as isize);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                if class[n] == 1 && out[n] == 0 {
                    out[n] = 255;
                    stack.push(n);
                }
            }
        }
    }

    ImageBuffer::from_parts(input.width(), input.height(), ChannelLayout::Gray, out)
}

/// Sepia tone matrix. Gray input is promoted to RGB first.
pub(crate) fn sepia(input: &ImageBuffer) -> ImageBuffer {
    let layout = input.layout();
    let out_layout = if layout.has_alpha() {
        ChannelLayout::Rgba
    } else {
        ChannelLayout::Rgb
    };
    let gray = layout.is_gray();
    map_pixels(input, out_layout, move |p, o| {
        let (r, g, b) = if gray {
            (p[0] as f32, p[0] as f32, p[0] as f32)
        } else {
            (p[0] as f32, p[1] as f32, p[2] as f32)
        };
        o[0] = saturate_u8(0.393 * r + 0.769 * g + 0.189 * b);
        o[1] = saturate_u8(0.349 * r + 0.686 * g + 0.168 * b);
        o[2] = saturate_u8(0.272 * r + 0.534 * g + 0.131 * b);
        if out_layout.has_alpha() {
            o[3] = p[p.len() - 1];
        }
    })
}

/// Photographic negative of the color channels. An involution.
pub(crate) fn invert(input: &ImageBuffer) -> ImageBuffer {
    map_color_channels(input, |v| 255 - v)
}

fn histogram(values: impl Iterator<Item = u8>) -> [u32; 256] {
    let mut hist = [0u32; 256];
    for v in values {
        hist[v as usize] += 1;
    }
    hist
}

/// Cumulative-distribution lookup table. A single-valued histogram maps to
/// the identity so flat images pass through unchanged.
fn equalization_lut(hist: &[u32; 256]) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = i as u8;
    }
    let total: u32 = hist.iter().sum();
    let Some(first) = hist.iter().position(|&n| n > 0) else {
        return lut;
    };
    if hist[first] == total {
        return lut;
    }
    let scale = 255.0 / (total - hist[first]) as f32;
    let mut cumulative = 0u32;
    lut[first] = 0;
    for i in first + 1..256 {
        cumulative += hist[i];
        lut[i] = saturate_u8(cumulative as f32 * scale);
    }
    lut
}

/// Histogram equalization. Color images equalize only the luma channel of
/// YCbCr so hues are preserved; gray images equalize directly.
pub(crate) fn equalize_histogram(input: &ImageBuffer) -> ImageBuffer {
    let c = input.channels();
    if input.layout().is_gray() {
        let lut = equalization_lut(&histogram(input.pixels().iter().step_by(c).copied()));
        return map_pixels(input, input.layout(), |p, o| {
            o.copy_from_slice(p);
            o[0] = lut[p[0] as usize];
        });
    }

    let y_of = |p: &[u8]| saturate_u8(rgb_to_ycbcr(p[0] as f32, p[1] as f32, p[2] as f32).0);
    let lut = equalization_lut(&histogram(input.pixels().chunks_exact(c).map(y_of)));
    map_pixels(input, input.layout(), |p, o| {
        o.copy_from_slice(p);
        let (y, cb, cr) = rgb_to_ycbcr(p[0] as f32, p[1] as f32, p[2] as f32);
        let y = lut[saturate_u8(y) as usize] as f32;
        let (r, g, b) = ycbcr_to_rgb(y, cb, cr);
        o[0] = saturate_u8(r);
        o[1] = saturate_u8(g);
        o[2] = saturate_u8(b);
    })
}

/// Binary threshold against a Gaussian-weighted local mean minus a small
/// constant. Output is single-channel 0/255.
pub(crate) fn adaptive_threshold(input: &ImageBuffer) -> ImageBuffer {
    let (w, h) = (input.width() as usize, input.height() as usize);
    let gray = luma_plane(input);
    let kernel = gaussian_kernel(THRESHOLD_BLOCK, THRESHOLD_SIGMA);
    let mean = separable_blur(&gray, w, h, 1, &kernel);
    let out = gray
        .par_iter()
        .zip(mean.par_iter())
        .map(|(&v, &m)| if v as f32 > m.round() - THRESHOLD_C { 255 } else { 0 })
        .collect();
    ImageBuffer::from_parts(input.width(), input.height(), ChannelLayout::Gray, out)
}
