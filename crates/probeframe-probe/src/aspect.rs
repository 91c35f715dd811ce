//! Aspect-ratio repair for video stream descriptors.

use crate::metadata::StreamDescriptor;

/// Ratio the tool reports when it could not determine one.
pub const UNDEFINED_RATIO: &str = "0:1";

/// Square pixels.
pub const SQUARE_PIXELS: &str = "1:1";

/// Greatest common divisor. `gcd(a, 0) == a`, and so `gcd(0, 0) == 0`.
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Reduce `width:height` to lowest terms.
///
/// Returns `None` when both are zero, where no ratio exists.
pub fn reduce_ratio(width: u32, height: u32) -> Option<(u32, u32)> {
    match gcd(width, height) {
        0 => None,
        g => Some((width / g, height / g)),
    }
}

/// Replace undefined aspect ratios on a video descriptor.
///
/// If either ratio is `0:1`, the sample ratio becomes `1:1` and the display
/// ratio is recomputed from the frame size. Audio and well-formed video
/// descriptors are returned unchanged. When the frame size is unknown the
/// display ratio is left as reported.
pub fn normalize(mut video: StreamDescriptor) -> StreamDescriptor {
    if !video.is_video() {
        return video;
    }

    let undefined = |ratio: &Option<String>| ratio.as_deref() == Some(UNDEFINED_RATIO);
    if !undefined(&video.sample_aspect_ratio) && !undefined(&video.display_aspect_ratio) {
        return video;
    }

    let width = video.width.unwrap_or(0);
    let height = video.height.unwrap_or(0);

    video.sample_aspect_ratio = Some(SQUARE_PIXELS.to_string());
    match reduce_ratio(width, height) {
        Some((w, h)) => video.display_aspect_ratio = Some(format!("{w}:{h}")),
        None => tracing::warn!(
            index = video.index,
            "video stream has no frame size; display aspect ratio left as reported"
        ),
    }
    video
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(width: u32, height: u32, sar: &str, dar: &str) -> StreamDescriptor {
        StreamDescriptor {
            codec_type: "video".into(),
            width: Some(width),
            height: Some(height),
            sample_aspect_ratio: Some(sar.into()),
            display_aspect_ratio: Some(dar.into()),
            ..StreamDescriptor::default()
        }
    }

    #[test]
    fn gcd_values() {
        assert_eq!(gcd(1920, 1080), 120);
        assert_eq!(gcd(1080, 1920), 120);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(gcd(17, 13), 1);
        assert_eq!(gcd(u32::MAX, u32::MAX - 1), 1);
    }

    #[test]
    fn full_hd_undefined_ratio() {
        let out = normalize(video(1920, 1080, "0:1", "0:1"));
        assert_eq!(out.sample_aspect_ratio.as_deref(), Some("1:1"));
        assert_eq!(out.display_aspect_ratio.as_deref(), Some("16:9"));
    }

    #[test]
    fn either_ratio_undefined_triggers_repair() {
        let out = normalize(video(720, 576, "16:15", "0:1"));
        assert_eq!(out.sample_aspect_ratio.as_deref(), Some("1:1"));
        assert_eq!(out.display_aspect_ratio.as_deref(), Some("5:4"));

        let out = normalize(video(1280, 720, "0:1", "4:3"));
        assert_eq!(out.display_aspect_ratio.as_deref(), Some("16:9"));
    }

    #[test]
    fn well_formed_video_is_untouched() {
        let input = video(720, 480, "8:9", "4:3");
        assert_eq!(normalize(input.clone()), input);
    }

    #[test]
    fn audio_is_untouched() {
        let input = StreamDescriptor {
            codec_type: "audio".into(),
            sample_aspect_ratio: Some("0:1".into()),
            ..StreamDescriptor::default()
        };
        assert_eq!(normalize(input.clone()), input);
    }

    #[test]
    fn one_zero_dimension_uses_other_side() {
        let out = normalize(video(0, 1080, "0:1", "0:1"));
        assert_eq!(out.display_aspect_ratio.as_deref(), Some("0:1"));

        let out = normalize(video(640, 0, "0:1", "0:1"));
        assert_eq!(out.display_aspect_ratio.as_deref(), Some("1:0"));
    }

    #[test]
    fn zero_by_zero_is_guarded() {
        let out = normalize(video(0, 0, "0:1", "0:1"));
        assert_eq!(out.sample_aspect_ratio.as_deref(), Some("1:1"));
        assert_eq!(out.display_aspect_ratio.as_deref(), Some("0:1"));
        assert_eq!(reduce_ratio(0, 0), None);
    }

    #[test]
    fn missing_dimensions_are_guarded() {
        let input = StreamDescriptor {
            codec_type: "video".into(),
            sample_aspect_ratio: Some("0:1".into()),
            ..StreamDescriptor::default()
        };
        let out = normalize(input);
        assert_eq!(out.sample_aspect_ratio.as_deref(), Some("1:1"));
        assert!(out.display_aspect_ratio.is_none());
    }
}
