// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Frequency analysis of the playing track.
//!
//! mpv renders the audio but does not hand samples back, so the analyser
//! decodes the same file itself with Symphonia on a background worker. Only a
//! window of [`WINDOW_SECONDS`] around the playback position is held in
//! memory as mono samples; the next window is requested as playback nears
//! the end of the current one, or straight away after a seek. Each frame the
//! analyser takes a short Hann-windowed slice at the current position and
//! runs a real FFT over it.
//!
//! Only the most recent decode request matters: when the listener skips
//! through tracks quickly, stale requests are dropped unprocessed.

use std::{
    f32::consts::PI,
    fs::File,
    io,
    path::Path,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender, TryRecvError},
    },
    thread,
};

use realfft::{RealFftPlanner, RealToComplex, num_complex::Complex32};
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{CODEC_TYPE_NULL, DecoderOptions},
    errors::Error as SymphoniaError,
    formats::{FormatOptions, SeekMode, SeekTo},
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
    units::Time,
};
use thiserror::Error;

use crate::visualizer::{FrequencySource, Snapshot};

/// Samples per analysis window.
pub(crate) const FFT_SIZE: usize = 256;

/// Frequency bins produced per window.
pub(crate) const BIN_COUNT: usize = FFT_SIZE / 2;

/// Length of decoded audio held at once.
pub(crate) const WINDOW_SECONDS: f64 = 30.0;

/// How close to the end of the held window playback gets before the next one
/// is requested.
const PREFETCH_SECONDS: f64 = 5.0;

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

#[derive(Debug, Error)]
pub(crate) enum AnalysisError {
    #[error("{0} is not a local file")]
    Remote(String),

    #[error("failed to open {path}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode {path}")]
    Decode {
        path: String,
        #[source]
        source: SymphoniaError,
    },

    #[error("{0} has no audio track")]
    NoAudio(String),

    #[error("spectrum computation failed: {0}")]
    Fft(#[from] realfft::FftError),
}

/// A stretch of a track, mixed down to mono.
#[derive(Debug)]
pub(crate) struct DecodedAudio {
    pub(crate) sample_rate: u32,
    /// Track time of the first sample, in seconds.
    pub(crate) start: f64,
    pub(crate) samples: Vec<f32>,
    /// Decoding reached the end of the track.
    pub(crate) reaches_end: bool,
}

impl DecodedAudio {
    fn end(&self) -> f64 {
        self.start + self.samples.len() as f64 / f64::from(self.sample_rate.max(1))
    }
}

type DecodeRequest = (String, f64);
type DecodeResult = (String, Result<DecodedAudio, AnalysisError>);

#[derive(Debug)]
enum AudioState {
    None,
    Pending,
    Ready(DecodedAudio),
    Failed,
}

/// The production [`FrequencySource`].
pub(crate) struct TrackAnalyser {
    request_tx: Sender<DecodeRequest>,
    result_rx: Receiver<DecodeResult>,

    source: Option<String>,
    audio: AudioState,
    refilling: bool,

    position: f64,
    playing: bool,

    spectrum: Spectrum,
    window: Vec<f32>,
}

impl TrackAnalyser {
    /// Creates the analyser and starts its decode worker.
    pub(crate) fn new() -> Self {
        let (request_tx, request_rx) = mpsc::channel::<DecodeRequest>();
        let (result_tx, result_rx) = mpsc::channel::<DecodeResult>();

        thread::spawn(move || decode_worker(request_rx, result_tx));

        Self {
            request_tx,
            result_rx,
            source: None,
            audio: AudioState::None,
            refilling: false,
            position: 0.0,
            playing: false,
            spectrum: Spectrum::new(),
            window: vec![0.0; FFT_SIZE],
        }
    }

    /// Points the analyser at a new source; decoding happens in the
    /// background.
    pub(crate) fn track_changed(&mut self, source: Option<&str>) {
        if self.source.as_deref() == source {
            return;
        }

        self.source = source.map(str::to_string);
        self.refilling = false;
        self.audio = match source {
            Some(source) => {
                if self.request(source.to_string(), 0.0) {
                    AudioState::Pending
                } else {
                    AudioState::Failed
                }
            }
            None => AudioState::None,
        };
    }

    fn request(&self, source: String, from: f64) -> bool {
        if self.request_tx.send((source, from)).is_err() {
            tracing::warn!("analysis worker has stopped");
            return false;
        }
        true
    }

    /// Asks for the window starting at the playback position when the held
    /// one does not cover it, or will not for much longer. Returns whether
    /// the held window covers the position now.
    fn keep_window_ahead(&mut self) -> bool {
        let AudioState::Ready(audio) = &self.audio else {
            return false;
        };

        let before = self.position < audio.start;
        let after = self.position >= audio.end();
        let covered = !before && !after;
        let nearly_spent = self.position >= audio.end() - PREFETCH_SECONDS;
        let wanted = before || (!audio.reaches_end && (after || nearly_spent));

        if wanted && !self.refilling {
            if let Some(source) = self.source.clone() {
                tracing::trace!(source = %source, from = self.position, "requesting analysis window");
                if self.request(source, self.position) {
                    self.refilling = true;
                } else {
                    self.audio = AudioState::Failed;
                    return false;
                }
            }
        }

        covered
    }

    /// Records where playback is, so the next snapshot reflects it.
    pub(crate) fn set_position(&mut self, seconds: f64, playing: bool) {
        self.position = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.playing = playing;
    }

    fn collect_results(&mut self) {
        loop {
            match self.result_rx.try_recv() {
                Ok((source, result)) => {
                    if self.source.as_deref() != Some(source.as_str()) {
                        continue;
                    }

                    self.refilling = false;
                    self.audio = match result {
                        Ok(audio) => {
                            tracing::debug!(
                                source = %source,
                                sample_rate = audio.sample_rate,
                                start = audio.start,
                                samples = audio.samples.len(),
                                "track decoded for analysis"
                            );
                            AudioState::Ready(audio)
                        }
                        Err(e) => {
                            tracing::warn!(source = %source, error = %e, "track cannot be analysed");
                            AudioState::Failed
                        }
                    };
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if matches!(self.audio, AudioState::Pending) {
                        self.audio = AudioState::Failed;
                    }
                    break;
                }
            }
        }
    }
}

impl FrequencySource for TrackAnalyser {
    fn bin_count(&self) -> usize {
        BIN_COUNT
    }

    fn frequency_data(&mut self, bins: &mut [f32]) -> Snapshot {
        self.collect_results();

        match &self.audio {
            AudioState::Ready(_) => {}
            AudioState::Failed => return Snapshot::Unavailable,
            AudioState::None | AudioState::Pending => return Snapshot::Silent,
        }

        if !self.playing || !self.keep_window_ahead() {
            return Snapshot::Silent;
        }

        let AudioState::Ready(audio) = &self.audio else {
            return Snapshot::Silent;
        };
        if audio.sample_rate == 0 {
            return Snapshot::Silent;
        }

        let start = ((self.position - audio.start) * f64::from(audio.sample_rate)) as usize;
        if start >= audio.samples.len() {
            return Snapshot::Silent;
        }

        let end = (start + FFT_SIZE).min(audio.samples.len());
        self.window.fill(0.0);
        self.window[..end - start].copy_from_slice(&audio.samples[start..end]);

        match self.spectrum.compute(&self.window, bins) {
            Ok(()) => Snapshot::Live,
            Err(e) => {
                tracing::warn!(error = %e, "spectrum computation failed");
                Snapshot::Unavailable
            }
        }
    }
}

/// FFT plan and buffers, reused across frames.
struct Spectrum {
    plan: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    output: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl Spectrum {
    fn new() -> Self {
        let plan = RealFftPlanner::<f32>::new().plan_fft_forward(FFT_SIZE);

        Self {
            input: plan.make_input_vec(),
            output: plan.make_output_vec(),
            scratch: plan.make_scratch_vec(),
            plan,
        }
    }

    /// Writes `[0, 1]` intensities for `window` (of [`FFT_SIZE`] samples) into
    /// `bins`, mapping the decibel range linearly like a browser analyser does.
    fn compute(&mut self, window: &[f32], bins: &mut [f32]) -> Result<(), AnalysisError> {
        for (i, (slot, sample)) in self.input.iter_mut().zip(window).enumerate() {
            *slot = sample * hann(i, FFT_SIZE);
        }

        self.plan
            .process_with_scratch(&mut self.input, &mut self.output, &mut self.scratch)?;

        for (bin, value) in bins.iter_mut().zip(&self.output) {
            let magnitude = value.norm() / FFT_SIZE as f32;
            let decibels = 20.0 * magnitude.max(1e-12).log10();
            *bin = ((decibels - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS)).clamp(0.0, 1.0);
        }

        Ok(())
    }
}

fn hann(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

fn decode_worker(request_rx: Receiver<DecodeRequest>, result_tx: Sender<DecodeResult>) {
    while let Ok(mut request) = request_rx.recv() {
        // Skip straight to the newest request.
        while let Ok(newer) = request_rx.try_recv() {
            request = newer;
        }

        let (source, from) = request;
        let result = decode(&source, from, WINDOW_SECONDS);
        if result_tx.send((source, result)).is_err() {
            break;
        }
    }

    tracing::debug!("analysis worker stopped");
}

/// Decodes about `seconds` of `source` into mono samples, starting at or just
/// before `from`.
pub(crate) fn decode(source: &str, from: f64, seconds: f64) -> Result<DecodedAudio, AnalysisError> {
    if source.contains("://") {
        return Err(AnalysisError::Remote(source.to_string()));
    }

    let path = Path::new(source);
    let decode_error = |source_err| AnalysisError::Decode {
        path: source.to_string(),
        source: source_err,
    };

    let file = File::open(path).map_err(|e| AnalysisError::Open {
        path: source.to_string(),
        source: e,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(decode_error)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::NoAudio(source.to_string()))?;
    let track_id = track.id;
    let time_base = track.codec_params.time_base;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(decode_error)?;

    // Without timestamps the first sample is wherever the seek landed.
    let mut assumed_start = 0.0;
    if from > 0.0 {
        let target = SeekTo::Time {
            time: Time::from(from),
            track_id: Some(track_id),
        };
        match format.seek(SeekMode::Coarse, target) {
            Ok(_) => assumed_start = from,
            Err(e) => tracing::debug!(source, error = %e, "seek failed, decoding from the start"),
        }
        decoder.reset();
    }

    let mut start: Option<f64> = None;
    let mut samples = vec![];
    let mut reaches_end = false;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                reaches_end = true;
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                reaches_end = true;
                break;
            }
            Err(e) => return Err(decode_error(e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let packet_time = time_base.map(|tb| {
            let time = tb.calc_time(packet.ts());
            time.seconds as f64 + time.frac
        });

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                tracing::trace!(source, reason, "skipping corrupt packet");
                continue;
            }
            Err(e) => return Err(decode_error(e)),
        };

        let spec = *decoded.spec();
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }

        // Packets wholly before `from`, when seeking was not possible.
        if start.is_none()
            && let Some(time) = packet_time
            && sample_rate > 0
            && time + decoded.frames() as f64 / f64::from(sample_rate) <= from
        {
            continue;
        }

        let channels = spec.channels.count().max(1);
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);

        start.get_or_insert(packet_time.unwrap_or(assumed_start));
        samples.extend(
            buf.samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );

        if sample_rate > 0 && samples.len() as f64 >= seconds * f64::from(sample_rate) {
            break;
        }
    }

    Ok(DecodedAudio {
        sample_rate,
        start: start.unwrap_or(from),
        samples,
        reaches_end,
    })
}
