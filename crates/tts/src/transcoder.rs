use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, process::Command};

use crate::{error::TtsError, format::AudioFormat};

const MP3_ARGS: &[&str] = &["-f", "mp3", "-codec:a", "libmp3lame", "-q:a", "2"];
const OGG_ARGS: &[&str] = &["-f", "ogg", "-codec:a", "libopus", "-b:a", "96k"];

/// Converts a complete WAV buffer into another container
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn encode(&self, wav: Vec<u8>, format: AudioFormat) -> crate::Result<Vec<u8>>;
}

/// Produce `format` from WAV bytes; wav is returned untouched
pub async fn convert(transcoder: &dyn Transcoder, wav: Vec<u8>, format: AudioFormat) -> crate::Result<Vec<u8>> {
    match format {
        AudioFormat::Wav => Ok(wav),
        AudioFormat::Mp3 | AudioFormat::Ogg => transcoder.encode(wav, format).await,
    }
}

/// Transcoder backed by an `ffmpeg` subprocess over stdin/stdout
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    const fn codec_args(format: AudioFormat) -> Option<&'static [&'static str]> {
        match format {
            AudioFormat::Mp3 => Some(MP3_ARGS),
            AudioFormat::Ogg => Some(OGG_ARGS),
            AudioFormat::Wav => None,
        }
    }

    fn command(&self, codec_args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-y", "-f", "wav", "-i", "pipe:0"])
            .args(codec_args)
            .arg("pipe:1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn encode(&self, wav: Vec<u8>, format: AudioFormat) -> crate::Result<Vec<u8>> {
        let codec_args =
            Self::codec_args(format).ok_or_else(|| TtsError::UnsupportedEncoding(format.to_string()))?;

        tracing::debug!(
            program = %self.program.display(),
            %format,
            input_bytes = wav.len(),
            "spawning transcoder"
        );

        let mut child = self.command(codec_args).spawn().map_err(|e| {
            TtsError::TranscoderIo(format!("failed to spawn {}: {e}", self.program.display()))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TtsError::TranscoderIo("transcoder stdin unavailable".to_string()))?;

        // Fed from a separate task so a full stdout pipe cannot stall the write
        let feeder = tokio::spawn(async move {
            let result = stdin.write_all(&wav).await;
            drop(stdin);
            result
        });

        // Dropping the child on timeout kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::error!(timeout = ?self.timeout, "transcoder timed out, killed");
                TtsError::TranscodeTimeout(self.timeout)
            })?
            .map_err(|e| TtsError::TranscoderIo(format!("failed to collect transcoder output: {e}")))?;

        let fed = feeder
            .await
            .map_err(|e| TtsError::TranscoderIo(format!("stdin feeder panicked: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(status = %output.status, "transcoder failed: {stderr}");

            return Err(TtsError::TranscodeFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        // The encoder may stop reading once it has what it needs
        if let Err(e) = fed
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(TtsError::TranscoderIo(format!("failed to write transcoder input: {e}")));
        }

        tracing::debug!(%format, output_bytes = output.stdout.len(), "transcode complete");

        Ok(output.stdout)
    }
}
