//! WAV file export

use super::{apply_fade_out, Decimator, ExportConfig};
use crate::audio::StereoSample;
use crate::session::Session;
use crate::{CoreError, Result};
use log::info;
use std::path::Path;

/// Run a session for `ticks` master ticks and write its audio to a WAV file
///
/// Returns the number of stereo frames written.
pub fn export_session_to_wav<P: AsRef<Path>>(
    session: &mut Session,
    tick_rate_hz: u32,
    ticks: u64,
    output_path: P,
    config: &ExportConfig,
) -> Result<usize> {
    let samples = render_session(session, tick_rate_hz, ticks, config.sample_rate)?;
    write_wav(output_path, samples, config)
}

/// Run a session and collect its decimated stereo output
pub fn render_session(
    session: &mut Session,
    tick_rate_hz: u32,
    ticks: u64,
    sample_rate: u32,
) -> Result<Vec<StereoSample>> {
    let mut decimator = Decimator::new(tick_rate_hz, sample_rate);
    let expected = ticks.saturating_mul(u64::from(sample_rate)) / u64::from(tick_rate_hz.max(1));
    let mut samples = Vec::with_capacity(expected as usize + 1);
    session.run(ticks, |_, out| {
        if let Some(sample) = decimator.push(out.sample) {
            samples.push(sample);
        }
        Ok(())
    })?;
    Ok(samples)
}

/// Write stereo samples to a 16-bit WAV file, applying the configured fade
///
/// Returns the number of stereo frames written.
pub fn write_wav<P: AsRef<Path>>(
    output_path: P,
    mut samples: Vec<StereoSample>,
    config: &ExportConfig,
) -> Result<usize> {
    apply_fade_out(&mut samples, config.fade_out_duration, config.sample_rate);

    let path = output_path.as_ref();
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| CoreError::AudioFileError(format!("Failed to create WAV file: {e}")))?;

    for sample in &samples {
        for value in [sample.left, sample.right] {
            writer
                .write_sample(value)
                .map_err(|e| CoreError::AudioFileError(format!("Failed to write sample: {e}")))?;
        }
    }

    writer
        .finalize()
        .map_err(|e| CoreError::AudioFileError(format!("Failed to finalize WAV file: {e}")))?;

    info!(
        "wrote {} frames ({:.2}s) to {}",
        samples.len(),
        samples.len() as f64 / f64::from(config.sample_rate),
        path.display()
    );
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::stimulus::PressSchedule;

    #[test]
    fn test_write_wav_roundtrip_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples = vec![
            StereoSample {
                left: 1,
                right: -1
            };
            100
        ];
        let written = write_wav(&path, samples, &ExportConfig::with_sample_rate(8_000)).unwrap();
        assert_eq!(written, 100);

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 8_000);
        assert_eq!(spec.bits_per_sample, 16);
        let data: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(data.len(), 200);
        assert_eq!(&data[..2], &[1, -1]);
    }

    #[test]
    fn test_render_session_produces_tone() {
        let config = CoreConfig::default().with_sample_rate(48_000);
        let mut session = Session::new(&config, PressSchedule::default()).unwrap();
        let ticks = u64::from(config.tick_rate_hz) / 50;
        let samples = render_session(&mut session, config.tick_rate_hz, ticks, 48_000).unwrap();
        let expected = ticks * 48_000 / u64::from(config.tick_rate_hz);
        assert_eq!(samples.len() as u64, expected);
        let peak = samples.iter().map(|s| s.left.unsigned_abs()).max().unwrap();
        assert!(peak > 0x3000, "peak {peak:#x}");
        assert!(samples.iter().any(|s| s.left < 0));
    }

    #[test]
    fn test_create_in_missing_dir_fails() {
        let err = write_wav(
            "/nonexistent/dir/out.wav",
            Vec::new(),
            &ExportConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::AudioFileError(_)));
    }
}
