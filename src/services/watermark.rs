// src/services/watermark.rs
//
// Prévia de venda: reduz a foto e aplica listras diagonais translúcidas.

use std::io::Cursor;

use image::{
    imageops::FilterType, io::Reader, DynamicImage, GenericImageView, ImageFormat, ImageOutputFormat,
    Rgb, RgbImage,
};

use crate::common::error::AppError;

// Maior lado da prévia, em pixels
pub const PREVIEW_MAX_SIDE: u32 = 1200;
const PREVIEW_JPEG_QUALITY: u8 = 75;

// Acima disso a decodificação não cabe em memória com folga
pub const MAX_UPLOAD_PIXELS: u64 = 60_000_000;

// Largura de cada listra e do espaço entre elas
const STRIPE_WIDTH: u32 = 48;
// Opacidade da listra (0..=255)
const STRIPE_ALPHA: u16 = 96;

pub struct ProcessedPhoto {
    // Bytes do upload, sem recodificar
    pub original: Vec<u8>,
    // Extensão do original ("jpg", "png", ...)
    pub extension: &'static str,
    pub preview: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Confere formato e dimensões pelo cabeçalho e gera a prévia com marca
/// d'água. O original é devolvido intacto.
/// Trabalho de CPU: chamar dentro de `spawn_blocking`.
pub fn process_upload(bytes: Vec<u8>) -> Result<ProcessedPhoto, AppError> {
    let invalid = |e: image::ImageError| AppError::InvalidImage(e.to_string());

    let format = image::guess_format(&bytes).map_err(invalid)?;
    let (width, height) = Reader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
        .map_err(invalid)?;

    if u64::from(width) * u64::from(height) > MAX_UPLOAD_PIXELS {
        return Err(AppError::InvalidImage(format!(
            "imagem grande demais: {}x{} pixels",
            width, height
        )));
    }

    let img = image::load_from_memory_with_format(&bytes, format).map_err(invalid)?;
    let preview = encode_jpeg(&watermarked_preview(&img), PREVIEW_JPEG_QUALITY)?;

    Ok(ProcessedPhoto {
        original: bytes,
        extension: extension_for(format),
        preview,
        width,
        height,
    })
}

pub fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        _ => "img",
    }
}

pub fn watermarked_preview(img: &DynamicImage) -> DynamicImage {
    let (width, height) = img.dimensions();
    let resized = if width > PREVIEW_MAX_SIDE || height > PREVIEW_MAX_SIDE {
        img.resize(PREVIEW_MAX_SIDE, PREVIEW_MAX_SIDE, FilterType::Triangle)
    } else {
        img.clone()
    };

    let mut rgb = resized.to_rgb8();
    apply_stripes(&mut rgb);
    DynamicImage::ImageRgb8(rgb)
}

fn apply_stripes(canvas: &mut RgbImage) {
    let white = Rgb([255u8, 255, 255]);
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        if is_on_stripe(x, y) {
            *pixel = blend(*pixel, white, STRIPE_ALPHA);
        }
    }
}

// Listras a 45°: faixas alternadas ao longo de x + y
fn is_on_stripe(x: u32, y: u32) -> bool {
    ((x + y) / STRIPE_WIDTH) % 2 == 0
}

fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: u16) -> Rgb<u8> {
    let mix = |b: u8, o: u8| -> u8 {
        ((u16::from(b) * (255 - alpha) + u16::from(o) * alpha) / 255) as u8
    };
    Rgb([mix(base[0], over[0]), mix(base[1], over[1]), mix(base[2], over[2])])
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, AppError> {
    let mut out = Vec::new();
    img.write_to(&mut out, ImageOutputFormat::Jpeg(quality))
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Falha ao codificar JPEG: {}", e)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn preview_is_downscaled_keeping_aspect_ratio() {
        let processed = process_upload(png_bytes(2400, 1600, [10, 10, 10])).unwrap();
        assert_eq!((processed.width, processed.height), (2400, 1600));

        let preview = image::load_from_memory(&processed.preview).unwrap();
        assert_eq!(preview.dimensions(), (1200, 800));
    }

    #[test]
    fn small_images_keep_their_size() {
        let processed = process_upload(png_bytes(300, 200, [10, 10, 10])).unwrap();
        let preview = image::load_from_memory(&processed.preview).unwrap();
        assert_eq!(preview.dimensions(), (300, 200));
    }

    #[test]
    fn original_is_stored_exactly_as_uploaded() {
        let png = png_bytes(64, 64, [200, 30, 90]);
        let processed = process_upload(png.clone()).unwrap();

        assert_eq!(processed.original, png);
        assert_eq!(processed.extension, "png");
        // Só a prévia vira JPEG
        assert_eq!(image::guess_format(&processed.preview).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_decoding() {
        // Cabeçalho PPM declarando 100000x100000 sem nenhum pixel
        let header = b"P6\n100000 100000\n255\n".to_vec();
        match process_upload(header) {
            Err(AppError::InvalidImage(message)) => assert!(message.contains("100000x100000")),
            Err(other) => panic!("erro inesperado: {:?}", other),
            Ok(_) => panic!("imagem gigante aceita"),
        }
    }

    #[test]
    fn stripes_lighten_the_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 200, Rgb([0, 0, 0])));
        let marked = watermarked_preview(&img).to_rgb8();

        // (0,0) está numa listra, (STRIPE_WIDTH, 0) no intervalo
        assert!(marked.get_pixel(0, 0)[0] > 60);
        assert_eq!(marked.get_pixel(STRIPE_WIDTH, 0)[0], 0);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            process_upload(b"definitivamente nao sou uma imagem".to_vec()),
            Err(AppError::InvalidImage(_))
        ));
    }

    #[test]
    fn blend_extremes() {
        assert_eq!(blend(Rgb([0, 0, 0]), Rgb([255, 255, 255]), 0), Rgb([0, 0, 0]));
        assert_eq!(blend(Rgb([0, 0, 0]), Rgb([255, 255, 255]), 255), Rgb([255, 255, 255]));
    }
}
