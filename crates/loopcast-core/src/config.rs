//! Configuration module
//!
//! All settings are read from environment variables with sensible defaults so
//! the service can run with no configuration at all in a trusted local
//! environment.

use std::env;

const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_CHUNK_SIZE_BYTES: usize = 4 * 1024 * 1024;
const DEFAULT_VIDEO_BITRATE_KBPS: u32 = 2500;
const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 128;
const DEFAULT_KEYFRAME_INTERVAL: u32 = 60;
const DEFAULT_RELAY_LOG_CAPACITY: usize = 500;

/// Service configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    // Storage configuration
    pub storage_path: String,
    pub upload_chunk_size_bytes: usize,
    // Relay configuration
    pub ffmpeg_path: String,
    pub rtmp_ingest_url: String,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub keyframe_interval: u32,
    pub ffmpeg_preset: String,
    pub relay_log_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "*")
            .collect();

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SERVER_PORT: {}", e))?,
            cors_origins,
            storage_path: env::var("STORAGE_PATH").unwrap_or_else(|_| "./uploads".to_string()),
            upload_chunk_size_bytes: env::var("UPLOAD_CHUNK_SIZE_BYTES")
                .unwrap_or_else(|_| DEFAULT_CHUNK_SIZE_BYTES.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid UPLOAD_CHUNK_SIZE_BYTES: {}", e))?,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            rtmp_ingest_url: env::var("RTMP_INGEST_URL")
                .unwrap_or_else(|_| "rtmp://a.rtmp.youtube.com/live2".to_string()),
            video_bitrate_kbps: env::var("VIDEO_BITRATE_KBPS")
                .unwrap_or_else(|_| DEFAULT_VIDEO_BITRATE_KBPS.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid VIDEO_BITRATE_KBPS: {}", e))?,
            audio_bitrate_kbps: env::var("AUDIO_BITRATE_KBPS")
                .unwrap_or_else(|_| DEFAULT_AUDIO_BITRATE_KBPS.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid AUDIO_BITRATE_KBPS: {}", e))?,
            keyframe_interval: env::var("KEYFRAME_INTERVAL")
                .unwrap_or_else(|_| DEFAULT_KEYFRAME_INTERVAL.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid KEYFRAME_INTERVAL: {}", e))?,
            ffmpeg_preset: env::var("FFMPEG_PRESET").unwrap_or_else(|_| "veryfast".to_string()),
            relay_log_capacity: env::var("RELAY_LOG_CAPACITY")
                .unwrap_or_else(|_| DEFAULT_RELAY_LOG_CAPACITY.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid RELAY_LOG_CAPACITY: {}", e))?,
        })
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn storage_path(&self) -> &str {
        &self.storage_path
    }

    pub fn upload_chunk_size_bytes(&self) -> usize {
        self.upload_chunk_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }
}
