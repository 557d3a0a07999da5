//! ffmpeg invocation builder for continuous live relay.
//!
//! The argument set reads the source file, loops it indefinitely at native
//! rate, re-encodes to a fixed bitrate/cadence, and pushes FLV to the RTMP
//! ingest endpoint. Encoder tuning is opaque configuration.

use loopcast_core::Config;
use std::path::Path;

/// Fixed vertical/shorts transform (720x1280 portrait).
pub const VERTICAL_SCALE: &str = "scale=720:1280";

/// Encoder settings carried from [`Config`] into each relay invocation.
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    pub ffmpeg_path: String,
    pub ingest_url: String,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub keyframe_interval: u32,
    pub preset: String,
    pub log_capacity: usize,
}

impl EncoderConfig {
    pub fn from_config(config: &Config) -> Self {
        EncoderConfig {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ingest_url: config.rtmp_ingest_url.clone(),
            video_bitrate_kbps: config.video_bitrate_kbps,
            audio_bitrate_kbps: config.audio_bitrate_kbps,
            keyframe_interval: config.keyframe_interval,
            preset: config.ffmpeg_preset.clone(),
            log_capacity: config.relay_log_capacity,
        }
    }
}

/// Join the ingest URL base and the opaque stream key.
pub fn stream_url(ingest_url: &str, stream_key: &str) -> String {
    format!("{}/{}", ingest_url.trim_end_matches('/'), stream_key)
}

/// Build the full ffmpeg argument vector for one relay session.
///
/// The `-vf scale=720:1280` pair is present exactly when `vertical` is set.
pub fn build_args(
    source: &Path,
    stream_url: &str,
    vertical: bool,
    encoder: &EncoderConfig,
) -> Vec<String> {
    let mut args = vec![
        "-re".to_string(),
        "-stream_loop".to_string(),
        "-1".to_string(),
        "-i".to_string(),
        source.to_string_lossy().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        encoder.preset.clone(),
        "-b:v".to_string(),
        format!("{}k", encoder.video_bitrate_kbps),
        "-maxrate".to_string(),
        format!("{}k", encoder.video_bitrate_kbps),
        "-bufsize".to_string(),
        format!("{}k", encoder.video_bitrate_kbps * 2),
        "-g".to_string(),
        encoder.keyframe_interval.to_string(),
        "-keyint_min".to_string(),
        encoder.keyframe_interval.to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        format!("{}k", encoder.audio_bitrate_kbps),
    ];

    if vertical {
        args.push("-vf".to_string());
        args.push(VERTICAL_SCALE.to_string());
    }

    args.push("-f".to_string());
    args.push("flv".to_string());
    args.push(stream_url.to_string());

    args
}

/// Render the command for logging with the stream key blanked out.
pub fn redacted_command_line(ffmpeg_path: &str, args: &[String], stream_key: &str) -> String {
    let rendered = args
        .iter()
        .map(|a| a.replace(stream_key, "<stream-key>"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{} {}", ffmpeg_path, rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_encoder() -> EncoderConfig {
        EncoderConfig {
            ffmpeg_path: "ffmpeg".to_string(),
            ingest_url: "rtmp://a.rtmp.youtube.com/live2".to_string(),
            video_bitrate_kbps: 2500,
            audio_bitrate_kbps: 128,
            keyframe_interval: 60,
            preset: "veryfast".to_string(),
            log_capacity: 500,
        }
    }

    #[test]
    fn test_stream_url_joins_key() {
        assert_eq!(
            stream_url("rtmp://a.rtmp.youtube.com/live2", "abcd-1234"),
            "rtmp://a.rtmp.youtube.com/live2/abcd-1234"
        );
        assert_eq!(
            stream_url("rtmp://a.rtmp.youtube.com/live2/", "k"),
            "rtmp://a.rtmp.youtube.com/live2/k"
        );
    }

    #[test]
    fn test_build_args_standard() {
        let encoder = test_encoder();
        let url = stream_url(&encoder.ingest_url, "key");
        let args = build_args(&PathBuf::from("/data/loop.mp4"), &url, false, &encoder);

        let head: Vec<&str> = args[..5].iter().map(String::as_str).collect();
        assert_eq!(head, ["-re", "-stream_loop", "-1", "-i", "/data/loop.mp4"]);
        assert!(!args.contains(&"-vf".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "-b:v" && w[1] == "2500k"));
        assert!(args.windows(2).any(|w| w[0] == "-bufsize" && w[1] == "5000k"));
        assert!(args.windows(2).any(|w| w[0] == "-g" && w[1] == "60"));
        // Output spec is the tail of the invocation.
        let tail: Vec<&str> = args[args.len() - 3..].iter().map(String::as_str).collect();
        assert_eq!(tail, ["-f", "flv", "rtmp://a.rtmp.youtube.com/live2/key"]);
    }

    #[test]
    fn test_build_args_vertical_adds_scale_filter() {
        let encoder = test_encoder();
        let url = stream_url(&encoder.ingest_url, "key");
        let args = build_args(&PathBuf::from("a.mp4"), &url, true, &encoder);

        let vf = args.iter().position(|a| a == "-vf").expect("-vf present");
        assert_eq!(args[vf + 1], VERTICAL_SCALE);
    }

    #[test]
    fn test_redacted_command_line_hides_key() {
        let encoder = test_encoder();
        let url = stream_url(&encoder.ingest_url, "secret-key");
        let args = build_args(&PathBuf::from("a.mp4"), &url, false, &encoder);
        let line = redacted_command_line(&encoder.ffmpeg_path, &args, "secret-key");

        assert!(!line.contains("secret-key"));
        assert!(line.contains("<stream-key>"));
    }
}
