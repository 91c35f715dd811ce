//! Stream descriptors from the tool's one-shot JSON output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aspect::normalize;
use crate::error::{ProbeError, Result};

/// One entry of the `streams` array.
///
/// Fields not modeled here are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub codec_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_aspect_ratio: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StreamDescriptor {
    pub fn is_video(&self) -> bool {
        self.codec_type == "video"
    }

    pub fn is_audio(&self) -> bool {
        self.codec_type == "audio"
    }
}

/// Streams of one target, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaStreams {
    pub videos: Vec<StreamDescriptor>,
    pub audios: Vec<StreamDescriptor>,
}

/// Parse the tool's JSON output.
///
/// Video descriptors are passed through [`normalize`]; streams that are
/// neither video nor audio are skipped.
pub fn parse_streams(json: &[u8], target: &str) -> Result<MediaStreams> {
    let mut root: Value =
        serde_json::from_slice(json).map_err(|source| ProbeError::MalformedOutput {
            target: target.to_string(),
            source,
        })?;

    let streams = match root.get_mut("streams").map(Value::take) {
        Some(Value::Array(streams)) => streams,
        _ => {
            return Err(ProbeError::MissingStreams {
                target: target.to_string(),
            })
        }
    };

    let mut out = MediaStreams::default();
    for stream in streams {
        let descriptor: StreamDescriptor =
            serde_json::from_value(stream).map_err(|source| ProbeError::MalformedOutput {
                target: target.to_string(),
                source,
            })?;

        if descriptor.is_video() {
            out.videos.push(normalize(descriptor));
        } else if descriptor.is_audio() {
            out.audios.push(descriptor);
        } else {
            tracing::debug!(
                index = descriptor.index,
                codec_type = %descriptor.codec_type,
                "skipping non audio/video stream"
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "sample_aspect_ratio": "0:1",
                "display_aspect_ratio": "0:1",
                "r_frame_rate": "30000/1001"
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "sample_rate": "48000",
                "channels": 2
            },
            {
                "index": 2,
                "codec_name": "mov_text",
                "codec_type": "subtitle"
            }
        ]
    }"#;

    #[test]
    fn splits_and_normalizes() {
        let streams = parse_streams(SAMPLE.as_bytes(), "clip.mp4").unwrap();

        assert_eq!(streams.videos.len(), 1);
        assert_eq!(streams.audios.len(), 1);

        let video = &streams.videos[0];
        assert_eq!(video.sample_aspect_ratio.as_deref(), Some("1:1"));
        assert_eq!(video.display_aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(
            video.extra.get("r_frame_rate").and_then(Value::as_str),
            Some("30000/1001")
        );

        let audio = &streams.audios[0];
        assert_eq!(audio.codec_name.as_deref(), Some("aac"));
        assert_eq!(audio.extra.get("channels").and_then(Value::as_u64), Some(2));
    }

    #[test]
    fn extra_fields_survive_serialization() {
        let streams = parse_streams(SAMPLE.as_bytes(), "clip.mp4").unwrap();
        let json = serde_json::to_value(&streams).unwrap();

        assert_eq!(json["videos"][0]["r_frame_rate"], "30000/1001");
        assert_eq!(json["audios"][0]["sample_rate"], "48000");
        assert!(json["audios"][0].get("width").is_none());
    }

    #[test]
    fn empty_streams_array() {
        let streams = parse_streams(br#"{"streams": []}"#, "empty.mp4").unwrap();
        assert_eq!(streams, MediaStreams::default());
    }

    #[test]
    fn malformed_json_names_target() {
        let err = parse_streams(b"{not json", "broken.mp4").unwrap_err();
        assert!(matches!(err, ProbeError::MalformedOutput { ref target, .. } if target == "broken.mp4"));
        assert!(err.to_string().contains("broken.mp4"));
    }

    #[test]
    fn missing_or_wrong_streams_field() {
        for body in [r#"{}"#, r#"{"streams": {}}"#, r#"{"streams": null}"#, "[]"] {
            let err = parse_streams(body.as_bytes(), "x.mp4").unwrap_err();
            assert!(
                matches!(err, ProbeError::MissingStreams { .. }),
                "body {body}: {err}"
            );
        }
    }

    #[test]
    fn wrong_typed_descriptor_field_is_malformed() {
        let body = r#"{"streams": [{"codec_type": "video", "width": "wide"}]}"#;
        let err = parse_streams(body.as_bytes(), "x.mp4").unwrap_err();
        assert!(matches!(err, ProbeError::MalformedOutput { .. }));
    }
}
