use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

use crate::landmark::FrameSize;

const RGB3: &[u8; 4] = b"RGB3";
const YUYV: &[u8; 4] = b"YUYV";
const GREY: &[u8; 4] = b"GREY";

/// Anything that produces RGB video frames at a fixed native size.
pub trait FrameSource {
    /// Native frame dimensions; unknown (zero) until the device is ready.
    fn frame_size(&self) -> FrameSize;
    fn frame(&mut self) -> Result<RgbImage>;
}

/// V4L2 capture device delivering RGB frames.
pub struct Camera {
    stream: Stream<'static>,
    size: FrameSize,
    fourcc: FourCC,
}

impl Camera {
    pub fn open(device: &str) -> Result<Self> {
        let dev = Device::with_path(device).with_context(|| format!("open camera {}", device))?;
        let mut fmt = dev.format().context("query camera format")?;

        // Keep the native resolution; negotiate the pixel format only.
        let rgb = Format::new(fmt.width, fmt.height, FourCC::new(RGB3));
        fmt = dev.set_format(&rgb).unwrap_or(fmt);
        if fmt.fourcc != FourCC::new(RGB3) {
            let yuyv = Format::new(fmt.width, fmt.height, FourCC::new(YUYV));
            fmt = dev.set_format(&yuyv).unwrap_or(fmt);
        }

        let stream = Stream::with_buffers(&dev, Type::VideoCapture, 4).context("start capture stream")?;
        log::info!(
            "camera {} ready: {}x{} {:?}",
            device,
            fmt.width,
            fmt.height,
            fmt.fourcc
        );

        Ok(Self {
            stream,
            size: FrameSize::new(fmt.width, fmt.height),
            fourcc: fmt.fourcc,
        })
    }
}

impl FrameSource for Camera {
    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn frame(&mut self) -> Result<RgbImage> {
        let (data, meta) = self.stream.next().context("capture frame")?;
        log::trace!("frame seq={} len={}", meta.sequence, data.len());

        let FrameSize { width, height } = self.size;
        let buf = match &self.fourcc.repr {
            RGB3 => data.to_vec(),
            YUYV => yuyv_to_rgb(width, height, data)?,
            GREY => grey_to_rgb(width, height, data)?,
            other => {
                return Err(anyhow!(
                    "unsupported pixel format {}",
                    String::from_utf8_lossy(other)
                ))
            }
        };

        let expected = (width * height * 3) as usize;
        if buf.len() < expected {
            return Err(anyhow!(
                "short frame: got {} bytes, expected {}",
                buf.len(),
                expected
            ));
        }

        let mut buf = buf;
        buf.truncate(expected);
        RgbImage::from_raw(width, height, buf).ok_or_else(|| anyhow!("failed to build frame buffer"))
    }
}

fn yuyv_to_rgb(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let expected = (width * height * 2) as usize;
    if data.len() < expected {
        return Err(anyhow!("short YUYV buffer"));
    }
    let mut out = Vec::with_capacity((width * height * 3) as usize);
    for chunk in data[..expected].chunks_exact(4) {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;
        for y in [chunk[0] as f32, chunk[2] as f32] {
            out.push(clamp(y + 1.402 * v));
            out.push(clamp(y - 0.344136 * u - 0.714136 * v));
            out.push(clamp(y + 1.772 * u));
        }
    }
    Ok(out)
}

fn grey_to_rgb(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let expected = (width * height) as usize;
    if data.len() < expected {
        return Err(anyhow!("short GREY buffer"));
    }
    Ok(data[..expected].iter().flat_map(|&y| [y, y, y]).collect())
}

fn clamp(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grey_expands() {
        let out = grey_to_rgb(2, 1, &[7, 200]).unwrap();
        assert_eq!(out, vec![7, 7, 7, 200, 200, 200]);
    }

    #[test]
    fn test_yuyv_neutral_chroma() {
        // u = v = 128 means no color: both pixels come out grey
        let out = yuyv_to_rgb(2, 1, &[50, 128, 100, 128]).unwrap();
        assert_eq!(out, vec![50, 50, 50, 100, 100, 100]);
    }

    #[test]
    fn test_short_buffers() {
        assert!(yuyv_to_rgb(4, 4, &[0; 8]).is_err());
        assert!(grey_to_rgb(4, 4, &[0; 8]).is_err());
    }
}
