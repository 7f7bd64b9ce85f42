use std::{fs, fs::File, io::Read, path::Path};

use featrack_image::{FrameData, Image, ImageSize, RawFrame};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};

use crate::error::IoError;

/// Read a PNG file as a raw frame.
///
/// Palette and sub-byte images are expanded to 8 bits per sample. Eight bit
/// images produce [`FrameData::U8`] samples and sixteen bit images
/// [`FrameData::U16`], with as many channels as the PNG color type carries.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// The decoded frame with interleaved channels.
pub fn read_frame_png(file_path: impl AsRef<Path>) -> Result<RawFrame, IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // verify the file extension
    match file_path.extension() {
        Some(extension) if extension.eq_ignore_ascii_case("png") => {}
        _ => return Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }

    let file = fs::File::open(file_path)?;
    decode_frame_impl(file)
}

/// Decode a PNG image held in memory as a raw frame.
///
/// # Arguments
///
/// * `bytes` - Raw bytes of the png file.
pub fn decode_frame_png(bytes: &[u8]) -> Result<RawFrame, IoError> {
    decode_frame_impl(bytes)
}

fn decode_frame_impl<R: Read>(source: R) -> Result<RawFrame, IoError> {
    let mut decoder = Decoder::new(source);
    decoder.set_transformations(Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let channels = match info.color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Indexed => {
            return Err(IoError::UnsupportedPng("indexed color".to_string()));
        }
    };

    let data = match info.bit_depth {
        BitDepth::Eight => FrameData::U8(buf),
        BitDepth::Sixteen => FrameData::U16(
            buf.chunks_exact(2)
                .map(|b| u16::from_be_bytes([b[0], b[1]]))
                .collect(),
        ),
        depth => {
            return Err(IoError::UnsupportedPng(format!("bit depth {depth:?}")));
        }
    };

    let size = ImageSize {
        width: info.width as usize,
        height: info.height as usize,
    };
    log::debug!(
        "decoded png frame {}x{} with {} channels ({:?})",
        size.width,
        size.height,
        channels,
        info.bit_depth
    );

    Ok(RawFrame::new(size, channels, data)?)
}

/// Writes the given PNG _(grayscale 8-bit)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image to encode.
pub fn write_image_png_gray8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Grayscale,
    )
}

fn write_png_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    image_size: ImageSize,
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(), IoError> {
    let file = File::create(file_path)?;

    let mut encoder = Encoder::new(file, image_size.width as u32, image_size.height as u32);
    encoder.set_color(color_type);
    encoder.set_depth(depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    Ok(())
}
